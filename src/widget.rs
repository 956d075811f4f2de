//! Tree widget capability
//!
//! The facade never talks to a concrete toolkit. Anything that can take a
//! schema and a forest, re-render on request and report its checked nodes
//! can back a [`crate::FileTree`]: the browser viewer ([`crate::jstree`]) and
//! the terminal tree ([`crate::tui`]) both do.

use serde::{Deserialize, Serialize};

use crate::node::{Classification, NodeAttributes, NormalizedNode};
use crate::prefs::Theme;

/// Called once the widget has finished its own (possibly deferred) setup
pub type ReadyHook = Box<dyn FnMut()>;

/// A checkbox tree that renders normalized nodes
pub trait TreeWidget {
    /// Set up the widget with its schema and initial data
    fn configure(&mut self, settings: WidgetSettings, data: Vec<NormalizedNode>);

    /// Replace the backing data without re-rendering
    fn set_data(&mut self, data: Vec<NormalizedNode>);

    /// Re-render from the backing data
    fn refresh(&mut self);

    /// Checked nodes in display order
    fn checked_nodes(&self) -> Vec<CheckedNode>;

    /// Register a hook for the widget's ready notification
    fn on_ready(&mut self, hook: ReadyHook);
}

/// Icon for one node type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeIcon {
    pub node_type: Classification,
    pub icon: String,
}

/// One grid column; `value` names the `data` field shown, `None` is the label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridColumn {
    pub width: String,
    pub header: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl GridColumn {
    pub fn new(width: &str, header: &str, value: Option<&str>) -> Self {
        Self {
            width: width.to_string(),
            header: header.to_string(),
            value: value.map(str::to_string),
        }
    }

    /// Text of this column for a node
    pub fn cell(&self, node: &NormalizedNode) -> String {
        let Some(field) = self.value.as_deref() else {
            return node.text.clone();
        };
        let Some(data) = node.data.as_ref() else {
            return String::new();
        };
        match field {
            "mime" => data.mime.clone().unwrap_or_default(),
            "size" => data.size.map(|s| s.to_string()).unwrap_or_default(),
            "magic" => data.magic.clone(),
            _ => String::new(),
        }
    }
}

/// Widget schema: behavior, theme, type icons and grid columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSettings {
    pub multiple: bool,
    pub animation: u32,
    pub theme: Theme,
    pub types: Vec<TypeIcon>,
    pub columns: Vec<GridColumn>,
    pub resizable: bool,
    pub plugins: Vec<String>,
}

impl WidgetSettings {
    /// The file tree schema: multi-select, no animation, File/Mime/Size/Magic grid
    pub fn standard(theme: Theme) -> Self {
        let types = [
            (Classification::Container, "fa fa-file-archive-o"),
            (Classification::File, "fa fa-file-o"),
            (Classification::Exec, "fa fa-file-text"),
            (Classification::Office, "fa fa-file-word-o"),
            (Classification::Duplicate, "fa fa-ban"),
        ]
        .into_iter()
        .map(|(node_type, icon)| TypeIcon {
            node_type,
            icon: icon.to_string(),
        })
        .collect();

        Self {
            multiple: true,
            animation: 0,
            theme,
            types,
            columns: vec![
                GridColumn::new("auto", "File", None),
                GridColumn::new("auto", "Mime", Some("mime")),
                GridColumn::new("auto", "Size", Some("size")),
                GridColumn::new("10px", "Magic", Some("magic")),
            ],
            resizable: true,
            plugins: ["themes", "types", "checkbox", "grid", "wholerow"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn icon_for(&self, node_type: Classification) -> Option<&str> {
        self.types
            .iter()
            .find(|t| t.node_type == node_type)
            .map(|t| t.icon.as_str())
    }
}

/// A checked node as reported by a widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckedNode {
    pub text: String,
    pub a_attr: NodeAttributes,
}

impl From<&NormalizedNode> for CheckedNode {
    fn from(node: &NormalizedNode) -> Self {
        Self {
            text: node.text.clone(),
            a_attr: node.a_attr.clone(),
        }
    }
}

/// Pre-order `(index path, node, checked)` with three-state checkbox cascade
///
/// A node is checked when it is selected, when an ancestor is selected, or
/// when every one of its children is checked.
pub fn cascade_checked(data: &[NormalizedNode]) -> Vec<(Vec<usize>, &NormalizedNode, bool)> {
    fn visit<'a>(
        node: &'a NormalizedNode,
        path: Vec<usize>,
        inherited: bool,
        out: &mut Vec<(Vec<usize>, &'a NormalizedNode, bool)>,
    ) -> bool {
        let slot = out.len();
        let own = inherited || node.state.selected;
        out.push((path.clone(), node, own));

        let mut all_children = node.has_children();
        for (i, child) in node.children().iter().enumerate() {
            let mut child_path = path.clone();
            child_path.push(i);
            all_children &= visit(child, child_path, own, out);
        }

        let checked = own || all_children;
        out[slot].2 = checked;
        checked
    }

    let mut out = Vec::new();
    for (i, node) in data.iter().enumerate() {
        visit(node, vec![i], false, &mut out);
    }
    out
}

/// Nodes a freshly loaded widget shows as checked
pub fn initial_checked(data: &[NormalizedNode]) -> Vec<CheckedNode> {
    cascade_checked(data)
        .into_iter()
        .filter(|(_, _, checked)| *checked)
        .map(|(_, node, _)| CheckedNode::from(node))
        .collect()
}
