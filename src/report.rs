//! Analysis report input
//!
//! The extraction tree of a sandboxed submission, as written by the unpacker:
//! a forest of entries keyed by path (or a plain array), each entry carrying
//! its fingerprint and nested children.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::error::Result;

/// Kind tag marking a directory entry
pub const DIRECTORY_KIND: &str = "dir";

/// Per-file MIME and magic data, raw and human-readable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    #[serde(default)]
    pub magic: Option<String>,
    #[serde(default)]
    pub magic_human: Option<String>,
    #[serde(default)]
    pub mime: Option<String>,
    #[serde(default)]
    pub mime_human: Option<String>,
}

/// One node of the report's file tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub filepath: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filename: String,
    /// Base kind ("file", "container", ...)
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Kind tag; `"dir"` marks a directory
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub duplicate: bool,
    #[serde(default)]
    pub finger: Option<Fingerprint>,
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<ReportEntry>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ReportEntry {
    /// Create a plain file entry
    pub fn file(filepath: impl Into<String>) -> Self {
        let filepath = filepath.into();
        let filename = filepath
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            filepath,
            filename,
            kind: Some("file".to_string()),
            ..Self::default()
        }
    }

    /// Create a directory entry
    pub fn directory(filepath: impl Into<String>) -> Self {
        Self {
            kind: Some("directory".to_string()),
            description: Some(DIRECTORY_KIND.to_string()),
            ..Self::file(filepath)
        }
    }

    pub fn with_children(mut self, children: Vec<ReportEntry>) -> Self {
        self.children = children;
        self
    }

    pub fn with_duplicate(mut self, duplicate: bool) -> Self {
        self.duplicate = duplicate;
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_finger(mut self, finger: Fingerprint) -> Self {
        self.finger = Some(finger);
        self
    }

    pub fn with_sha256(mut self, sha256: impl Into<String>) -> Self {
        self.sha256 = Some(sha256.into());
        self
    }

    /// Whether the kind tag marks this entry as a directory
    pub fn is_directory(&self) -> bool {
        self.description.as_deref() == Some(DIRECTORY_KIND)
    }

    /// Number of entries in this subtree, including this one
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(ReportEntry::count).sum::<usize>()
    }
}

/// Parse a report forest from JSON
///
/// Accepts either a mapping (path → entry, insertion order kept) or an array
/// of entries.
pub fn parse_forest(json: &str) -> Result<Vec<ReportEntry>> {
    let value: Value = serde_json::from_str(json)?;
    let entries = match value {
        Value::Object(map) => map
            .into_iter()
            .map(|(_, v)| serde_json::from_value(v))
            .collect::<std::result::Result<Vec<_>, _>>()?,
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<_>, _>>()?,
        other => {
            return Err(<serde_json::Error as serde::de::Error>::custom(format!(
                "report tree must be an object or an array, found {}",
                value_kind(&other)
            ))
            .into())
        }
    };
    tracing::debug!(entries = entries.len(), "parsed report forest");
    Ok(entries)
}

/// Read and parse a report forest from a file
pub fn load_forest(path: &Path) -> Result<Vec<ReportEntry>> {
    let contents = std::fs::read_to_string(path)?;
    parse_forest(&contents)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
