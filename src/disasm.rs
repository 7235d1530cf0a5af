use crate::reference::ReferenceTable;
use crate::stream::Record;

/// Fixed one-level indent for instruction lines.
pub const INDENT: &str = "    ";

#[derive(Debug, Clone, Copy)]
pub struct DisasmOptions {
    /// Append a `// description` line after each documented instruction.
    pub verbose: bool,
}

impl Default for DisasmOptions {
    fn default() -> Self {
        Self { verbose: true }
    }
}

/// Render an instruction stream as indented readable text. Pure one-pass
/// transform: mnemonic substitution plus the jump argument-order special
/// case; jump targets are already absolute in the source stream.
pub fn disassemble(records: &[Record], table: &ReferenceTable, opts: &DisasmOptions) -> String {
    let quirks = table.quirks();
    let mut out = String::new();

    for rec in records {
        match rec {
            Record::Marker(s) | Record::Raw(s) => {
                out.push_str(s);
                out.push('\n');
            }
            Record::Instr { id, args } => {
                out.push_str(INDENT);
                if *id == quirks.jump_id && args.len() == 2 {
                    // Low-level (offset, time) -> readable (time, offset).
                    out.push_str(quirks.jump_mnemonic);
                    out.push('(');
                    out.push_str(&args[1]);
                    out.push_str(", ");
                    out.push_str(&args[0]);
                } else {
                    out.push_str(&table.resolve_name(*id));
                    out.push('(');
                    out.push_str(&args.join(", "));
                }
                out.push_str(");\n");
                if opts.verbose {
                    if let Some(desc) = table.description(*id).filter(|d| !d.is_empty()) {
                        out.push_str(INDENT);
                        out.push_str("// ");
                        out.push_str(desc);
                        out.push('\n');
                    }
                }
            }
        }
    }
    out
}
