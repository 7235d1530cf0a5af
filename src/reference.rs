use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
use tracing::warn;

use crate::stream::{JUMP_ID, JUMP_MNEMONIC};

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog {path} is not a JSON object: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One catalog entry: `{"<id>": ["Name(params)", "description"]}`.
#[derive(Debug, Clone)]
pub struct RefEntry {
    pub id: u32,
    /// Bare mnemonic, extracted from the signature up to the first `(`.
    pub name: String,
    /// Full signature string as written in the catalog.
    pub signature: String,
    pub description: String,
}

/// Opcodes with documented special-case behavior. Resolved once when the
/// table is built; per-line dispatch is by numeric ID, never by re-matching
/// mnemonic strings against the catalog.
#[derive(Debug, Clone, Copy)]
pub struct Quirks {
    pub jump_id: u32,
    pub jump_mnemonic: &'static str,
}

impl Default for Quirks {
    fn default() -> Self {
        Self {
            jump_id: JUMP_ID,
            jump_mnemonic: JUMP_MNEMONIC,
        }
    }
}

/// Instruction ID <-> name/description catalog. Read-only after load and
/// freely shareable by reference across pipeline invocations.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    entries: HashMap<u32, RefEntry>,
    by_name: HashMap<String, u32>,
    quirks: Quirks,
}

impl ReferenceTable {
    /// A table with no entries; every ID degrades to the `ins_<id>` form.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| match source {
            CatalogError::Parse { source, .. } => CatalogError::Parse {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    /// Parse a catalog document. Fatal only when the whole document is not a
    /// JSON object; individual malformed entries are skipped and degrade
    /// only themselves.
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let doc: serde_json::Map<String, Value> =
            serde_json::from_str(text).map_err(|source| CatalogError::Parse {
                path: "<inline>".into(),
                source,
            })?;

        let mut table = Self::default();
        for (key, value) in &doc {
            let Ok(id) = key.parse::<u32>() else {
                warn!(%key, "catalog entry skipped: key is not a numeric ID");
                continue;
            };
            let fields = value.as_array();
            let signature = fields
                .and_then(|f| f.first())
                .and_then(Value::as_str);
            let description = fields
                .and_then(|f| f.get(1))
                .and_then(Value::as_str);
            let (Some(signature), Some(description)) = (signature, description) else {
                warn!(%key, "catalog entry skipped: expected [signature, description]");
                continue;
            };
            let name = signature
                .split('(')
                .next()
                .unwrap_or(signature)
                .trim()
                .to_string();
            if name.is_empty() {
                warn!(%key, signature, "catalog entry skipped: empty mnemonic");
                continue;
            }
            // Reverse map: last-loaded entry wins on mnemonic collisions.
            table.by_name.insert(name.clone(), id);
            table.entries.insert(
                id,
                RefEntry {
                    id,
                    name,
                    signature: signature.to_string(),
                    description: description.to_string(),
                },
            );
        }
        Ok(table)
    }

    /// Forward lookup. Unknown IDs get the synthetic `ins_<id>` name, which
    /// `resolve_id` maps back losslessly.
    pub fn resolve_name(&self, id: u32) -> String {
        match self.entries.get(&id) {
            Some(e) => e.name.clone(),
            None => format!("ins_{id}"),
        }
    }

    /// Reverse lookup: known mnemonic or `ins_<id>` placeholder. `None`
    /// signals the caller to pass the text through unchanged.
    pub fn resolve_id(&self, name: &str) -> Option<u32> {
        if let Some(&id) = self.by_name.get(name) {
            return Some(id);
        }
        name.strip_prefix("ins_")?.parse().ok()
    }

    pub fn description(&self, id: u32) -> Option<&str> {
        self.entries.get(&id).map(|e| e.description.as_str())
    }

    pub fn signature(&self, id: u32) -> Option<&str> {
        self.entries.get(&id).map(|e| e.signature.as_str())
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "0": ["SetViewpoint(x, y, z)", "Moves the camera anchor."],
        "1": ["jmp(time, offset)", "Jumps to a byte offset in the script."],
        "3": ["Fog(r, g, b)", "Sets fog color."]
    }"#;

    #[test]
    fn forward_and_reverse() {
        let t = ReferenceTable::from_json(CATALOG).unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t.resolve_name(0), "SetViewpoint");
        assert_eq!(t.resolve_id("Fog"), Some(3));
        assert_eq!(t.resolve_id("SetViewpoint"), Some(0));
    }

    #[test]
    fn unknown_id_degrades_and_round_trips() {
        let t = ReferenceTable::from_json(CATALOG).unwrap();
        assert_eq!(t.resolve_name(99), "ins_99");
        assert_eq!(t.resolve_id("ins_99"), Some(99));
        assert_eq!(t.resolve_id("NotAThing"), None);
    }

    #[test]
    fn malformed_entries_degrade_individually() {
        let text = r#"{
            "2": ["Ok()", "fine"],
            "nope": ["Bad()", "non-numeric key"],
            "4": "not a list",
            "5": ["OnlySignature()"]
        }"#;
        let t = ReferenceTable::from_json(text).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.resolve_name(2), "Ok");
        assert_eq!(t.resolve_name(4), "ins_4");
    }

    #[test]
    fn whole_document_failure_is_fatal() {
        assert!(ReferenceTable::from_json("[1, 2, 3]").is_err());
        assert!(ReferenceTable::from_json("garbage").is_err());
    }
}
