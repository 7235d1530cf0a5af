use std::collections::HashMap;

use crate::stream::JUMP_MNEMONIC;

/// Section marker opening a script body. Compared case-insensitively.
pub const SCRIPT_MARKER: &str = "SCRIPT:";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("line {line}: undefined label '{label}'")]
    UndefinedLabel { label: String, line: usize },
}

/// Every instruction occupies an 8-byte header plus 4 bytes per argument,
/// regardless of argument textual width.
pub const fn size_bytes(arg_count: usize) -> u32 {
    8 + 4 * arg_count as u32
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Label at statement position: `42:` or `@name:`, leading whitespace
/// allowed. Returns the label spelling without the colon.
pub(crate) fn parse_label(line: &str) -> Option<&str> {
    let s = line.trim_start();
    let body_len = if let Some(rest) = s.strip_prefix('@') {
        let n = rest.chars().take_while(|&c| is_ident_continue(c)).count();
        if n == 0 || !rest.starts_with(is_ident_start) {
            return None;
        }
        1 + n
    } else {
        let n = s.chars().take_while(|c| c.is_ascii_digit()).count();
        if n == 0 {
            return None;
        }
        n
    };
    if s[body_len..].starts_with(':') {
        Some(&s[..body_len])
    } else {
        None
    }
}

/// Instruction call: `name(args);`, trailing text after the `;` ignored.
/// Returns the mnemonic and the raw text between the parentheses.
pub(crate) fn parse_call(line: &str) -> Option<(&str, &str)> {
    let s = line.trim();
    if !s.starts_with(is_ident_start) {
        return None;
    }
    let name_len = s.chars().take_while(|&c| is_ident_continue(c)).count();
    let (name, rest) = s.split_at(name_len);
    let rest = rest.trim_start().strip_prefix('(')?;
    // Last `)` that is still followed by `;`, so trailing comments may
    // contain parentheses of their own.
    let close = rest
        .match_indices(')')
        .filter(|(i, _)| rest[i + 1..].trim_start().starts_with(';'))
        .map(|(i, _)| i)
        .last()?;
    Some((name, &rest[..close]))
}

/// Comma-token count of an argument list; an empty list has zero arguments.
pub(crate) fn count_args(inner: &str) -> usize {
    if inner.trim().is_empty() {
        0
    } else {
        inner.split(',').count()
    }
}

/// Top-level section marker: an unindented `Identifier:` line. Numeric and
/// `@` spellings are labels, not section markers.
fn is_section_marker(line: &str) -> bool {
    if line.starts_with(' ') || line.starts_with('\t') {
        return false;
    }
    let s = line.trim_end();
    match s.strip_suffix(':') {
        Some(name) => {
            !name.is_empty()
                && name.starts_with(is_ident_start)
                && name.chars().all(is_ident_continue)
        }
        None => false,
    }
}

/// Rewrite symbolic jump targets in one script body to absolute byte
/// offsets. Input with no script marker is returned unchanged.
///
/// Two passes over the body: the first accumulates offsets (labels bind to
/// the current offset and contribute zero bytes; calls contribute
/// `size_bytes(argc)`; anything else is inert), the second rewrites
/// `jmp(time, target)` argument pairs. Offsets depend on argument counts
/// only, so no catalog is consulted.
pub fn resolve(source: &str) -> Result<String, ResolveError> {
    let lines: Vec<&str> = source.lines().collect();
    let Some(marker) = lines
        .iter()
        .position(|l| l.trim().eq_ignore_ascii_case(SCRIPT_MARKER))
    else {
        return Ok(source.to_string());
    };
    let body_start = marker + 1;
    let body_end = lines[body_start..]
        .iter()
        .position(|l| is_section_marker(l))
        .map(|i| body_start + i)
        .unwrap_or(lines.len());

    // Pass 1: label -> accumulated offset.
    let mut offsets: HashMap<&str, u32> = HashMap::new();
    let mut current: u32 = 0;
    for line in &lines[body_start..body_end] {
        let clean = line.trim();
        if clean.is_empty() || clean.starts_with("//") {
            continue;
        }
        if let Some(label) = parse_label(clean) {
            offsets.insert(label, current);
        } else if let Some((_, inner)) = parse_call(clean) {
            current += size_bytes(count_args(inner));
        }
    }

    // Pass 2: rewrite jump targets, preserving indentation and time verbatim.
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        if i < body_start || i >= body_end {
            out.push(line.to_string());
            continue;
        }
        match jump_target(line) {
            Some((time, target)) => {
                let resolved = match offsets.get(target) {
                    Some(&off) => Some(off),
                    // A bare numeric target that names no label is already
                    // an absolute offset and stays as written.
                    None if target.starts_with('@') => {
                        return Err(ResolveError::UndefinedLabel {
                            label: target.to_string(),
                            line: i + 1,
                        });
                    }
                    None => None,
                };
                match resolved {
                    Some(off) => {
                        let indent = &line[..line.len() - line.trim_start().len()];
                        out.push(format!("{indent}{JUMP_MNEMONIC}({time}, {off});"));
                    }
                    None => out.push(line.to_string()),
                }
            }
            None => out.push(line.to_string()),
        }
    }
    Ok(out.join("\n"))
}

/// `jmp(time, @label);` or `jmp(time, 24);` are the only shapes pass 2
/// rewrites. Other jump spellings are left for the assembler to judge.
fn jump_target(line: &str) -> Option<(&str, &str)> {
    let (name, inner) = parse_call(line)?;
    if name != JUMP_MNEMONIC {
        return None;
    }
    let (time, target) = inner.split_once(',')?;
    let target = target.trim();
    if target.contains(',') {
        return None;
    }
    let symbolic = target.strip_prefix('@').is_some_and(|r| {
        r.starts_with(is_ident_start) && r.chars().all(is_ident_continue)
    });
    let numeric = !target.is_empty() && target.chars().all(|c| c.is_ascii_digit());
    if symbolic || numeric {
        Some((time.trim(), target))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_accumulate_per_argument_count() {
        assert_eq!(size_bytes(0), 8);
        assert_eq!(size_bytes(2), 16);
        assert_eq!(size_bytes(5), 28);
    }

    #[test]
    fn label_grammar() {
        assert_eq!(parse_label("42:"), Some("42"));
        assert_eq!(parse_label("  @loop:"), Some("@loop"));
        assert_eq!(parse_label("@loop_2:  "), Some("@loop_2"));
        assert_eq!(parse_label("@:"), None);
        assert_eq!(parse_label("@2bad:"), None);
        assert_eq!(parse_label("loop:"), None);
        assert_eq!(parse_label("42"), None);
    }

    #[test]
    fn call_grammar() {
        assert_eq!(parse_call("    Fog(1, 2, 3);"), Some(("Fog", "1, 2, 3")));
        assert_eq!(parse_call("Wait();"), Some(("Wait", "")));
        assert_eq!(parse_call("Wait()"), None);
        assert_eq!(parse_call("Wait(1);  // note"), Some(("Wait", "1")));
        assert_eq!(parse_call("Wait(1); // (note)"), Some(("Wait", "1")));
        assert_eq!(count_args(""), 0);
        assert_eq!(count_args("  "), 0);
        assert_eq!(count_args("1"), 1);
        assert_eq!(count_args("1, 2, 3"), 3);
    }

    #[test]
    fn section_markers_are_not_labels() {
        assert!(is_section_marker("SCRIPT:"));
        assert!(is_section_marker("ENTRY:"));
        assert!(!is_section_marker("42:"));
        assert!(!is_section_marker("@loop:"));
        assert!(!is_section_marker("    SCRIPT:"));
    }
}
