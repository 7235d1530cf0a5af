use pretty_assertions::assert_eq;

use stagescript_rs::disasm::{disassemble, DisasmOptions};
use stagescript_rs::stream::Record;
use stagescript_rs::ReferenceTable;

const CATALOG: &str = r#"{
    "1": ["jmp(time, offset)", "Jumps to a byte offset in the script."],
    "2": ["Wait(frames)", "Pauses script execution."],
    "4": ["Quiet()", ""]
}"#;

#[test]
fn documented_listing() {
    let table = ReferenceTable::from_json(CATALOG).unwrap();
    let records = vec![
        Record::Marker("SCRIPT:".into()),
        Record::Marker("0:".into()),
        Record::instr(2, &["60"]),
        Record::instr(1, &["24", "0"]),
        Record::instr(9, &["5"]),
    ];
    let text = disassemble(&records, &table, &DisasmOptions { verbose: true });
    assert_eq!(
        text,
        concat!(
            "SCRIPT:\n",
            "0:\n",
            "    Wait(60);\n",
            "    // Pauses script execution.\n",
            "    jmp(0, 24);\n",
            "    // Jumps to a byte offset in the script.\n",
            "    ins_9(5);\n",
        )
    );
}

#[test]
fn clean_listing_has_no_comments() {
    let table = ReferenceTable::from_json(CATALOG).unwrap();
    let records = vec![Record::instr(2, &["60"])];
    let text = disassemble(&records, &table, &DisasmOptions { verbose: false });
    assert_eq!(text, "    Wait(60);\n");
}

#[test]
fn empty_descriptions_emit_no_comment_line() {
    let table = ReferenceTable::from_json(CATALOG).unwrap();
    let records = vec![Record::instr(4, &[])];
    let text = disassemble(&records, &table, &DisasmOptions { verbose: true });
    assert_eq!(text, "    Quiet();\n");
}

#[test]
fn raw_records_pass_through_verbatim() {
    let table = ReferenceTable::empty();
    let records = vec![Record::Raw("??? unparsed".into())];
    let text = disassemble(&records, &table, &DisasmOptions::default());
    assert_eq!(text, "??? unparsed\n");
}

#[test]
fn jump_with_unexpected_arity_uses_the_generic_path() {
    let table = ReferenceTable::from_json(CATALOG).unwrap();
    let records = vec![Record::instr(1, &["7"])];
    let text = disassemble(&records, &table, &DisasmOptions { verbose: false });
    assert_eq!(text, "    jmp(7);\n");
}
