//! Category highlighting of rendered nodes

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::node::{Classification, NormalizedNode};

/// Class toggled on highlighted nodes
pub const HIGHLIGHT_CLASS: &str = "highlight";

/// Visual handle of one rendered node
pub trait NodeHandle {
    /// Attribute previously attached to the node (`filetree_type`, ...)
    fn attr(&self, name: &str) -> Option<&str>;
    fn add_class(&mut self, class: &str);
    fn remove_class(&mut self, class: &str);
}

/// Groups of nodes the page can highlight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HighlightCategory {
    /// Anything that is not a directory
    Files,
    /// Executables only
    Exec,
    /// Containers and office documents
    Containers,
    /// Duplicates, whatever their tag
    Duplicates,
}

impl HighlightCategory {
    pub const ALL: [HighlightCategory; 4] = [
        HighlightCategory::Files,
        HighlightCategory::Exec,
        HighlightCategory::Containers,
        HighlightCategory::Duplicates,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "files" => Some(HighlightCategory::Files),
            "exec" => Some(HighlightCategory::Exec),
            "containers" => Some(HighlightCategory::Containers),
            "duplicates" => Some(HighlightCategory::Duplicates),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HighlightCategory::Files => "files",
            HighlightCategory::Exec => "exec",
            HighlightCategory::Containers => "containers",
            HighlightCategory::Duplicates => "duplicates",
        }
    }

    /// Whether a node with these attributes belongs to the category
    pub fn matches<H: NodeHandle + ?Sized>(&self, handle: &H) -> bool {
        let item_type = handle.attr("filetree_type");
        match self {
            HighlightCategory::Files => item_type != Some(Classification::Directory.as_str()),
            HighlightCategory::Exec => item_type == Some(Classification::Exec.as_str()),
            HighlightCategory::Containers => matches!(item_type, Some("container") | Some("office")),
            HighlightCategory::Duplicates => handle.attr("filetree_duplicate") == Some("true"),
        }
    }
}

impl fmt::Display for HighlightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Add or remove the highlight class when the node matches `category`
///
/// Returns whether the node matched; non-matching nodes are left untouched.
pub fn highlight<H: NodeHandle + ?Sized>(
    handle: &mut H,
    category: HighlightCategory,
    enable: bool,
) -> bool {
    if !category.matches(handle) {
        return false;
    }
    if enable {
        handle.add_class(HIGHLIGHT_CLASS);
    } else {
        handle.remove_class(HIGHLIGHT_CLASS);
    }
    true
}

/// In-memory node handle: an attribute map and a class set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedNode {
    attrs: BTreeMap<String, String>,
    classes: BTreeSet<String>,
}

impl RenderedNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn is_highlighted(&self) -> bool {
        self.has_class(HIGHLIGHT_CLASS)
    }
}

impl From<&NormalizedNode> for RenderedNode {
    fn from(node: &NormalizedNode) -> Self {
        let mut rendered = RenderedNode::new()
            .with_attr("filepath", &node.a_attr.filepath)
            .with_attr("filetree_type", node.a_attr.filetree_type.as_str());
        if let Some(sha256) = node.a_attr.sha256.as_deref() {
            rendered = rendered.with_attr("sha256", sha256);
        }
        if let Some(dup) = node.a_attr.filetree_duplicate.as_deref() {
            rendered = rendered.with_attr("filetree_duplicate", dup);
        }
        rendered
    }
}

impl NodeHandle for RenderedNode {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    fn add_class(&mut self, class: &str) {
        self.classes.insert(class.to_string());
    }

    fn remove_class(&mut self, class: &str) {
        self.classes.remove(class);
    }
}
