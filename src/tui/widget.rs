//! Terminal checkbox tree
//!
//! Keeps checked leaves and expanded branches keyed by index path, and
//! flattens the visible part of the tree into rows for rendering. Branch
//! checkboxes are derived from their leaves (checked, partial, unchecked).

use std::collections::{HashMap, HashSet};

use crate::highlight::RenderedNode;
use crate::node::{Classification, NormalizedNode};
use crate::widget::{cascade_checked, CheckedNode, ReadyHook, TreeWidget, WidgetSettings};

/// Index path from the forest root to a node
pub type NodePath = Vec<usize>;

/// Checkbox state of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Checked,
    Partial,
    Unchecked,
}

impl CheckState {
    pub fn checkbox(&self) -> &'static str {
        match self {
            CheckState::Checked => "[x]",
            CheckState::Partial => "[-]",
            CheckState::Unchecked => "[ ]",
        }
    }
}

/// One visible line of the tree
#[derive(Debug, Clone)]
pub struct TreeRow {
    pub path: NodePath,
    pub depth: usize,
    pub node_type: Classification,
    pub has_children: bool,
    pub expanded: bool,
    pub check: CheckState,
    pub icon: Option<String>,
    /// One cell per grid column
    pub cells: Vec<String>,
    pub handle: RenderedNode,
}

#[derive(Default)]
pub struct TerminalTreeWidget {
    settings: Option<WidgetSettings>,
    data: Vec<NormalizedNode>,
    checked_leaves: HashSet<NodePath>,
    expanded: HashSet<NodePath>,
    rows: Vec<TreeRow>,
    cursor: usize,
    hooks: Vec<ReadyHook>,
    ready: bool,
}

impl TerminalTreeWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(&self) -> Option<&WidgetSettings> {
        self.settings.as_ref()
    }

    pub fn rows(&self) -> &[TreeRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [TreeRow] {
        &mut self.rows
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&TreeRow> {
        self.rows.get(self.cursor)
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// First frame is on screen; runs the ready hooks once
    pub fn mark_ready(&mut self) {
        if self.ready {
            return;
        }
        self.ready = true;
        for hook in self.hooks.iter_mut() {
            hook();
        }
    }

    // === Navigation ===

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.rows.len() {
            self.cursor += 1;
        }
    }

    pub fn page_up(&mut self, page: usize) {
        self.cursor = self.cursor.saturating_sub(page);
    }

    pub fn page_down(&mut self, page: usize) {
        if !self.rows.is_empty() {
            self.cursor = (self.cursor + page).min(self.rows.len() - 1);
        }
    }

    pub fn jump_to_top(&mut self) {
        self.cursor = 0;
    }

    pub fn jump_to_bottom(&mut self) {
        self.cursor = self.rows.len().saturating_sub(1);
    }

    // === Expansion ===

    /// Expand the current branch
    pub fn expand(&mut self) {
        let Some(row) = self.current() else { return };
        if row.has_children && !row.expanded {
            let path = row.path.clone();
            self.expanded.insert(path);
            self.rebuild_rows();
        }
    }

    /// Collapse the current branch, or move to the parent row
    pub fn collapse(&mut self) {
        let Some(row) = self.current() else { return };
        if row.has_children && row.expanded {
            let path = row.path.clone();
            self.expanded.remove(&path);
            self.rebuild_rows();
        } else if row.path.len() > 1 {
            let parent = row.path[..row.path.len() - 1].to_vec();
            if let Some(idx) = self.rows.iter().position(|r| r.path == parent) {
                self.cursor = idx;
            }
        }
    }

    pub fn toggle_expand(&mut self) {
        let Some(expanded) = self.current().map(|row| row.expanded) else { return };
        if expanded {
            self.collapse();
        } else {
            self.expand();
        }
    }

    // === Checkboxes ===

    /// Check the current subtree, or uncheck it when fully checked
    pub fn toggle_check(&mut self) {
        let Some(row) = self.current() else { return };
        let path = row.path.clone();
        let check = row.check != CheckState::Checked;
        let Some(node) = self.node_at(&path) else { return };

        let mut leaves = Vec::new();
        collect_leaves(node, path, &mut leaves);
        for leaf in leaves {
            if check {
                self.checked_leaves.insert(leaf);
            } else {
                self.checked_leaves.remove(&leaf);
            }
        }
        self.rebuild_rows();
    }

    /// Check or uncheck everything
    pub fn check_all(&mut self, check: bool) {
        self.checked_leaves.clear();
        if check {
            let mut leaves = Vec::new();
            for (i, node) in self.data.iter().enumerate() {
                collect_leaves(node, vec![i], &mut leaves);
            }
            self.checked_leaves.extend(leaves);
        }
        self.rebuild_rows();
    }

    fn node_at(&self, path: &[usize]) -> Option<&NormalizedNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.data.get(*first)?;
        for idx in rest {
            node = node.children().get(*idx)?;
        }
        Some(node)
    }

    /// Reset checkboxes and expansion from the data's default state
    fn reset_state(&mut self) {
        let mut checked_leaves = HashSet::new();
        let mut expanded = HashSet::new();
        for (path, node, checked) in cascade_checked(&self.data) {
            if !node.has_children() {
                if checked {
                    checked_leaves.insert(path);
                }
            } else if node.state.opened {
                expanded.insert(path);
            }
        }
        self.checked_leaves = checked_leaves;
        self.expanded = expanded;
        self.rebuild_rows();
    }

    fn rebuild_rows(&mut self) {
        let states: HashMap<NodePath, CheckState> = check_states(&self.data, &self.checked_leaves)
            .into_iter()
            .map(|(path, _, state)| (path, state))
            .collect();
        let mut rows = Vec::new();
        for (i, node) in self.data.iter().enumerate() {
            self.flatten(node, vec![i], 0, &states, &mut rows);
        }
        self.rows = rows;
        self.cursor = self.cursor.min(self.rows.len().saturating_sub(1));
    }

    fn flatten(
        &self,
        node: &NormalizedNode,
        path: NodePath,
        depth: usize,
        states: &HashMap<NodePath, CheckState>,
        rows: &mut Vec<TreeRow>,
    ) {
        let expanded = self.expanded.contains(&path);
        let cells = match &self.settings {
            Some(settings) => settings.columns.iter().map(|c| c.cell(node)).collect(),
            None => vec![node.text.clone()],
        };
        let icon = self
            .settings
            .as_ref()
            .and_then(|s| s.icon_for(node.node_type))
            .map(str::to_string);
        let check = states.get(&path).copied().unwrap_or(CheckState::Unchecked);

        rows.push(TreeRow {
            path: path.clone(),
            depth,
            node_type: node.node_type,
            has_children: node.has_children(),
            expanded,
            check,
            icon,
            cells,
            handle: RenderedNode::from(node),
        });

        if expanded {
            for (i, child) in node.children().iter().enumerate() {
                let mut child_path = path.clone();
                child_path.push(i);
                self.flatten(child, child_path, depth + 1, states, rows);
            }
        }
    }
}

/// Check state of every node in pre-order, from one post-order count of
/// checked leaves per subtree.
fn check_states<'a>(
    data: &'a [NormalizedNode],
    checked_leaves: &HashSet<NodePath>,
) -> Vec<(NodePath, &'a NormalizedNode, CheckState)> {
    fn visit<'a>(
        node: &'a NormalizedNode,
        path: NodePath,
        checked_leaves: &HashSet<NodePath>,
        out: &mut Vec<(NodePath, &'a NormalizedNode, CheckState)>,
    ) -> (usize, usize) {
        let slot = out.len();
        out.push((path.clone(), node, CheckState::Unchecked));

        let (checked, total) = if node.has_children() {
            node.children()
                .iter()
                .enumerate()
                .map(|(i, child)| {
                    let mut child_path = path.clone();
                    child_path.push(i);
                    visit(child, child_path, checked_leaves, out)
                })
                .fold((0, 0), |(c, t), (cc, ct)| (c + cc, t + ct))
        } else {
            (usize::from(checked_leaves.contains(&path)), 1)
        };

        out[slot].2 = if total > 0 && checked == total {
            CheckState::Checked
        } else if checked > 0 {
            CheckState::Partial
        } else {
            CheckState::Unchecked
        };
        (checked, total)
    }

    let mut out = Vec::new();
    for (i, node) in data.iter().enumerate() {
        visit(node, vec![i], checked_leaves, &mut out);
    }
    out
}

fn collect_leaves(node: &NormalizedNode, path: NodePath, out: &mut Vec<NodePath>) {
    if !node.has_children() {
        out.push(path);
        return;
    }
    for (i, child) in node.children().iter().enumerate() {
        let mut child_path = path.clone();
        child_path.push(i);
        collect_leaves(child, child_path, out);
    }
}

impl TreeWidget for TerminalTreeWidget {
    fn configure(&mut self, settings: WidgetSettings, data: Vec<NormalizedNode>) {
        self.settings = Some(settings);
        self.data = data;
        self.cursor = 0;
        self.hooks.clear();
        self.ready = false;
        self.reset_state();
    }

    fn set_data(&mut self, data: Vec<NormalizedNode>) {
        self.data = data;
    }

    fn refresh(&mut self) {
        self.reset_state();
    }

    fn checked_nodes(&self) -> Vec<CheckedNode> {
        check_states(&self.data, &self.checked_leaves)
            .into_iter()
            .filter(|(_, _, state)| *state == CheckState::Checked)
            .map(|(_, node, _)| CheckedNode::from(node))
            .collect()
    }

    fn on_ready(&mut self, hook: ReadyHook) {
        self.hooks.push(hook);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{normalize_forest, Filters};
    use crate::prefs::Theme;
    use crate::report::ReportEntry;

    fn widget() -> TerminalTreeWidget {
        let forest = vec![
            ReportEntry::file("bundle.zip").with_children(vec![
                ReportEntry::file("bundle.zip/run.exe"),
                ReportEntry::file("bundle.zip/readme.txt"),
            ]),
            ReportEntry::directory("docs").with_children(vec![ReportEntry::file("docs/a.doc")]),
            ReportEntry::file("notes.txt").with_size(7),
        ];
        let (nodes, _) = normalize_forest(&forest, &Filters::default());
        let mut widget = TerminalTreeWidget::new();
        widget.configure(WidgetSettings::standard(Theme::Default), nodes);
        widget
    }

    fn labels(widget: &TerminalTreeWidget) -> Vec<String> {
        widget.rows().iter().map(|r| r.cells[0].clone()).collect()
    }

    fn checked(widget: &TerminalTreeWidget) -> Vec<String> {
        widget.checked_nodes().into_iter().map(|n| n.text).collect()
    }

    #[test]
    fn test_containers_and_directories_start_expanded() {
        let widget = widget();
        assert_eq!(
            labels(&widget),
            vec!["bundle.zip", "run.exe", "readme.txt", "docs", "a.doc", "notes.txt"]
        );
        assert_eq!(widget.rows()[1].depth, 1);
        assert_eq!(widget.rows()[5].cells[2], "7");
    }

    #[test]
    fn test_initial_checks_follow_defaults() {
        let widget = widget();
        assert_eq!(checked(&widget), vec!["run.exe", "docs", "a.doc"]);
        assert_eq!(widget.rows()[0].check, CheckState::Partial);
        assert_eq!(widget.rows()[3].check, CheckState::Checked);
        assert_eq!(widget.rows()[5].check, CheckState::Unchecked);
    }

    #[test]
    fn test_toggle_branch_checks_all_leaves() {
        let mut widget = widget();
        widget.toggle_check();
        assert_eq!(widget.rows()[0].check, CheckState::Checked);
        assert_eq!(checked(&widget), vec!["bundle.zip", "run.exe", "readme.txt", "docs", "a.doc"]);

        widget.toggle_check();
        assert_eq!(widget.rows()[0].check, CheckState::Unchecked);
        assert_eq!(checked(&widget), vec!["docs", "a.doc"]);
    }

    #[test]
    fn test_collapse_and_expand() {
        let mut widget = widget();
        widget.collapse();
        assert_eq!(labels(&widget), vec!["bundle.zip", "docs", "a.doc", "notes.txt"]);
        widget.expand();
        assert_eq!(widget.rows().len(), 6);
    }

    #[test]
    fn test_collapse_on_leaf_moves_to_parent() {
        let mut widget = widget();
        widget.move_down();
        widget.move_down();
        assert_eq!(widget.current().unwrap().cells[0], "readme.txt");
        widget.collapse();
        assert_eq!(widget.cursor(), 0);
    }

    #[test]
    fn test_collapsed_state_keeps_hidden_checks() {
        let mut widget = widget();
        widget.collapse();
        assert_eq!(checked(&widget), vec!["run.exe", "docs", "a.doc"]);
    }

    #[test]
    fn test_check_all() {
        let mut widget = widget();
        widget.check_all(true);
        assert_eq!(checked(&widget).len(), 6);
        widget.check_all(false);
        assert!(checked(&widget).is_empty());
    }

    #[test]
    fn test_refresh_resets_to_defaults() {
        let mut widget = widget();
        widget.check_all(false);
        widget.refresh();
        assert_eq!(checked(&widget), vec!["run.exe", "docs", "a.doc"]);
    }

    #[test]
    fn test_cursor_clamped() {
        let mut widget = widget();
        widget.page_down(100);
        assert_eq!(widget.cursor(), 5);
        widget.move_down();
        assert_eq!(widget.cursor(), 5);
        widget.jump_to_top();
        widget.move_up();
        assert_eq!(widget.cursor(), 0);
        widget.jump_to_bottom();
        widget.set_data(Vec::new());
        widget.refresh();
        assert!(widget.rows().is_empty());
        assert!(widget.current().is_none());
    }

    #[test]
    fn test_nested_check_states_propagate_to_every_ancestor() {
        let forest = vec![ReportEntry::directory("top").with_children(vec![
            ReportEntry::directory("top/mid").with_children(vec![ReportEntry::file("top/mid/a.zip")
                .with_children(vec![
                    ReportEntry::file("top/mid/a.zip/x.txt"),
                    ReportEntry::file("top/mid/a.zip/y.txt"),
                ])]),
            ReportEntry::file("top/z.txt"),
        ])];
        let (nodes, _) = normalize_forest(&forest, &Filters::default());
        let mut widget = TerminalTreeWidget::new();
        widget.configure(WidgetSettings::standard(Theme::Default), nodes);
        assert_eq!(labels(&widget), vec!["top", "mid", "a.zip", "x.txt", "y.txt", "z.txt"]);
        assert!(widget.rows().iter().all(|r| r.check == CheckState::Unchecked));

        widget.page_down(3);
        widget.toggle_check();
        let states: Vec<_> = widget.rows().iter().map(|r| r.check).collect();
        assert_eq!(
            states,
            vec![
                CheckState::Partial,
                CheckState::Partial,
                CheckState::Partial,
                CheckState::Checked,
                CheckState::Unchecked,
                CheckState::Unchecked,
            ]
        );
        assert_eq!(checked(&widget), vec!["x.txt"]);

        widget.move_down();
        widget.toggle_check();
        assert_eq!(widget.rows()[0].check, CheckState::Partial);
        assert_eq!(widget.rows()[1].check, CheckState::Checked);
        assert_eq!(widget.rows()[2].check, CheckState::Checked);
        assert_eq!(checked(&widget), vec!["mid", "a.zip", "x.txt", "y.txt"]);

        widget.jump_to_bottom();
        widget.toggle_check();
        assert_eq!(widget.rows()[0].check, CheckState::Checked);
        assert_eq!(checked(&widget).len(), 6);
    }

    #[test]
    fn test_rows_carry_icons_and_handles() {
        let widget = widget();
        assert_eq!(widget.rows()[0].icon.as_deref(), Some("fa fa-file-archive-o"));
        assert_eq!(widget.rows()[3].icon, None);
        use crate::highlight::NodeHandle;
        assert_eq!(widget.rows()[1].handle.attr("filetree_type"), Some("exec"));
    }
}
