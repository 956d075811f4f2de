//! Widget-ready tree nodes
//!
//! The shape matches jstree's JSON data format, so a normalized forest can be
//! handed to the browser as-is:
//!
//! ```json
//! { "text": "run.exe", "type": "exec",
//!   "state": { "selected": true, "opened": false },
//!   "a_attr": { "filepath": "zip/run.exe", "sha256": "..", "filetree_type": "exec" },
//!   "data": { "mime": "..", "size": 512, "magic": ".." } }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Display classification of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Directory,
    File,
    Exec,
    Office,
    Container,
    Duplicate,
}

impl Classification {
    pub const ALL: [Classification; 6] = [
        Classification::Directory,
        Classification::File,
        Classification::Exec,
        Classification::Office,
        Classification::Container,
        Classification::Duplicate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Directory => "directory",
            Classification::File => "file",
            Classification::Exec => "exec",
            Classification::Office => "office",
            Classification::Container => "container",
            Classification::Duplicate => "duplicate",
        }
    }

    /// Map a report's base kind onto the tag set; unknown kinds are files.
    /// A `directory` kind alone is a file: only the `dir` description makes
    /// an entry a directory.
    pub fn from_kind(kind: Option<&str>) -> Self {
        match kind {
            Some("container") => Classification::Container,
            Some("exec") => Classification::Exec,
            Some("office") => Classification::Office,
            Some("duplicate") => Classification::Duplicate,
            _ => Classification::File,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Initial checkbox and expansion state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeState {
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub opened: bool,
}

/// Attributes attached to the rendered anchor of a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAttributes {
    #[serde(default)]
    pub filepath: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    pub filetree_type: Classification,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filetree_duplicate: Option<String>,
}

impl NodeAttributes {
    pub fn is_duplicate(&self) -> bool {
        self.filetree_duplicate.as_deref() == Some("true")
    }
}

/// Grid columns shown next to a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    pub magic: String,
}

/// A classified node, ready for a tree widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedNode {
    pub text: String,
    #[serde(rename = "type")]
    pub node_type: Classification,
    #[serde(default)]
    pub state: NodeState,
    pub a_attr: NodeAttributes,
    /// Absent for directories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<NodeData>,
    /// Absent (not empty) when the source entry had no children
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NormalizedNode>>,
}

impl NormalizedNode {
    pub fn children(&self) -> &[NormalizedNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    /// Number of nodes in this subtree, including this one
    pub fn count(&self) -> usize {
        1 + self.children().iter().map(NormalizedNode::count).sum::<usize>()
    }

    /// Pre-order walk over this subtree with each node's depth
    pub fn walk<'a, F>(&'a self, depth: usize, f: &mut F)
    where
        F: FnMut(&'a NormalizedNode, usize),
    {
        f(self, depth);
        for child in self.children() {
            child.walk(depth + 1, f);
        }
    }
}

/// Total node count of a forest
pub fn forest_count(nodes: &[NormalizedNode]) -> usize {
    nodes.iter().map(NormalizedNode::count).sum()
}
