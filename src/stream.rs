use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved token prefixing structural passthrough lines in the
/// intermediate stream exchanged with the external codec.
pub const MARKER_TOKEN: char = '!';

/// Opcode whose low-level argument order `(offset, time)` differs from the
/// readable order `(time, offset)`.
pub const JUMP_ID: u32 = 1;
/// Readable mnemonic of the jump opcode. Fixed by the text format, not by
/// the catalog.
pub const JUMP_MNEMONIC: &str = "jmp";

/// One line of the intermediate stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// Opcode ID plus its ordered, string-encoded arguments.
    Instr { id: u32, args: Vec<String> },
    /// Structural line (section marker, label). Stored without the marker token.
    Marker(String),
    /// A line neither direction could understand, carried unchanged.
    Raw(String),
}

impl Record {
    pub fn instr(id: u32, args: &[&str]) -> Self {
        Record::Instr {
            id,
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Non-fatal translation problem, always surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// 1-based line in the offending source.
    pub line: usize,
    pub text: String,
    pub reason: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} ({:?})", self.line, self.reason, self.text)
    }
}

/// Parse the `id;arg1;...` line format produced by the external decoder.
/// Lines that fit neither the instruction nor the marker shape pass through
/// as `Record::Raw` with a collected warning.
pub fn parse(text: &str) -> (Vec<Record>, Vec<Warning>) {
    let mut records = Vec::new();
    let mut warnings = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix(MARKER_TOKEN) {
            records.push(Record::Marker(rest.to_string()));
            continue;
        }
        let mut parts = line.split(';');
        let head = parts.next().unwrap_or_default();
        match head.trim().parse::<u32>() {
            Ok(id) => records.push(Record::Instr {
                id,
                args: parts.map(|a| a.to_string()).collect(),
            }),
            Err(_) => {
                warnings.push(Warning {
                    line: i + 1,
                    text: line.to_string(),
                    reason: "not an instruction or marker line".into(),
                });
                records.push(Record::Raw(line.to_string()));
            }
        }
    }
    (records, warnings)
}

/// Serialize records back to the line format expected by the external encoder.
pub fn serialize(records: &[Record]) -> String {
    let mut out = String::new();
    for rec in records {
        match rec {
            Record::Instr { id, args } => {
                out.push_str(&id.to_string());
                for a in args {
                    out.push(';');
                    out.push_str(a);
                }
            }
            Record::Marker(s) => {
                out.push(MARKER_TOKEN);
                out.push_str(s);
            }
            Record::Raw(s) => out.push_str(s),
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_instr_and_marker() {
        let (recs, warns) = parse("!SCRIPT:\n1;42;10\n5\n");
        assert!(warns.is_empty());
        assert_eq!(
            recs,
            vec![
                Record::Marker("SCRIPT:".into()),
                Record::instr(1, &["42", "10"]),
                Record::instr(5, &[]),
            ]
        );
    }

    #[test]
    fn parse_bad_line_passes_through() {
        let (recs, warns) = parse("what is this\n");
        assert_eq!(recs, vec![Record::Raw("what is this".into())]);
        assert_eq!(warns.len(), 1);
        assert_eq!(warns[0].line, 1);
    }

    #[test]
    fn serialize_inverts_parse() {
        let text = "!SCRIPT:\n1;42;10\n5\n7;0\n";
        let (recs, _) = parse(text);
        assert_eq!(serialize(&recs), text);
    }
}
