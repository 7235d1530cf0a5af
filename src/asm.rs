use crate::reference::ReferenceTable;
use crate::resolver::{count_args, parse_call, parse_label};
use crate::stream::{Record, Warning};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertAt {
    Front,
    Back,
}

/// Documented per-ID argument-count correction. The external encoder
/// rejects under-supplied argument lists for these opcodes; the inserted
/// default is always the literal `0`.
#[derive(Debug, Clone, Copy)]
pub struct Fixup {
    pub id: u32,
    pub min_args: usize,
    pub insert: InsertAt,
}

pub const FIXUPS: &[Fixup] = &[
    Fixup { id: 7, min_args: 1, insert: InsertAt::Back },
    Fixup { id: 14, min_args: 2, insert: InsertAt::Front },
    Fixup { id: 19, min_args: 1, insert: InsertAt::Back },
];

#[derive(Debug, Clone)]
pub struct AssembleOutput {
    pub records: Vec<Record>,
    pub warnings: Vec<Warning>,
}

/// Translate label-resolved readable text back into the intermediate
/// instruction stream.
///
/// Line policy is warn-and-pass-through: a structurally invalid indented
/// line becomes `Record::Raw` plus a collected warning; the operation never
/// aborts on shape errors. Comments are dropped, unindented lines and
/// labels travel as structural markers.
pub fn assemble(text: &str, table: &ReferenceTable) -> AssembleOutput {
    let quirks = table.quirks();
    let mut records = Vec::new();
    let mut warnings = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let content = line.trim();
        if content.is_empty() || content.starts_with("//") {
            continue;
        }
        if !line.starts_with(' ') && !line.starts_with('\t') {
            records.push(Record::Marker(content.to_string()));
            continue;
        }
        if parse_label(content).is_some() {
            // Labels contribute zero bytes; the encoder sees them as structure.
            records.push(Record::Marker(content.to_string()));
            continue;
        }

        let Some((name, inner)) = parse_call(content) else {
            warnings.push(Warning {
                line: i + 1,
                text: content.to_string(),
                reason: "indented line is not a `name(args);` call".into(),
            });
            records.push(Record::Raw(content.to_string()));
            continue;
        };
        let mut args: Vec<String> = if count_args(inner) == 0 {
            Vec::new()
        } else {
            inner.split(',').map(|a| a.trim().to_string()).collect()
        };

        let id = if name == quirks.jump_mnemonic {
            Some(quirks.jump_id)
        } else {
            table.resolve_id(name)
        };
        let Some(id) = id else {
            warnings.push(Warning {
                line: i + 1,
                text: content.to_string(),
                reason: format!("unknown mnemonic '{name}'"),
            });
            records.push(Record::Raw(content.to_string()));
            continue;
        };

        if id == quirks.jump_id {
            // Readable (time, offset) -> low-level (offset, time).
            if args.len() == 2 {
                args.swap(0, 1);
            } else {
                warnings.push(Warning {
                    line: i + 1,
                    text: content.to_string(),
                    reason: format!(
                        "{} expects (time, offset), got {} argument(s)",
                        quirks.jump_mnemonic,
                        args.len()
                    ),
                });
                records.push(Record::Raw(content.to_string()));
                continue;
            }
        }

        apply_fixups(id, &mut args);
        records.push(Record::Instr { id, args });
    }

    AssembleOutput { records, warnings }
}

fn apply_fixups(id: u32, args: &mut Vec<String>) {
    for fixup in FIXUPS {
        if fixup.id != id {
            continue;
        }
        while args.len() < fixup.min_args {
            match fixup.insert {
                InsertAt::Front => args.insert(0, "0".to_string()),
                InsertAt::Back => args.push("0".to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceTable;

    #[test]
    fn fixups_insert_default_arguments() {
        let mut args = Vec::new();
        apply_fixups(7, &mut args);
        assert_eq!(args, vec!["0"]);

        let mut args = vec!["5".to_string()];
        apply_fixups(14, &mut args);
        assert_eq!(args, vec!["0", "5"]);

        let mut args = vec!["1".to_string(), "2".to_string()];
        apply_fixups(14, &mut args);
        assert_eq!(args, vec!["1", "2"]);
    }

    #[test]
    fn malformed_jump_passes_through_with_warning() {
        let table = ReferenceTable::empty();
        let out = assemble("    jmp(10);\n", &table);
        assert_eq!(out.records, vec![Record::Raw("jmp(10);".into())]);
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].line, 1);
    }

    #[test]
    fn labels_become_markers() {
        let table = ReferenceTable::empty();
        let out = assemble("SCRIPT:\n    24:\n    @loop:\n    ins_2();\n", &table);
        assert_eq!(
            out.records,
            vec![
                Record::Marker("SCRIPT:".into()),
                Record::Marker("24:".into()),
                Record::Marker("@loop:".into()),
                Record::instr(2, &[]),
            ]
        );
        assert!(out.warnings.is_empty());
    }
}
