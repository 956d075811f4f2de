//! Tree facade
//!
//! Owns the render target, the data source, the filters and the widget.
//! Every draw or refresh re-normalizes from scratch; nothing is patched.

use serde::Serialize;
use std::path::Path;

use crate::classify::{normalize_forest, Filters, Stats};
use crate::error::{FileTreeError, Result};
use crate::node::NormalizedNode;
use crate::prefs::{Preferences, Theme};
use crate::report::{load_forest, ReportEntry};
use crate::widget::{TreeWidget, WidgetSettings};

/// Where the widget data comes from
#[derive(Debug, Clone)]
pub enum TreeSource {
    /// A report forest, normalized on every draw/refresh
    Report(Vec<ReportEntry>),
    /// Widget data shaped by the caller, used as-is
    Prenormalized(Vec<NormalizedNode>),
}

impl TreeSource {
    /// Read a source from disk; `prenormalized` files hold widget nodes
    pub fn load(path: &Path, prenormalized: bool) -> Result<Self> {
        if prenormalized {
            let contents = std::fs::read_to_string(path)?;
            Ok(TreeSource::Prenormalized(serde_json::from_str(&contents)?))
        } else {
            Ok(TreeSource::Report(load_forest(path)?))
        }
    }
}

/// Completion callback, invoked after every draw and refresh
pub type DrawCallback = Box<dyn FnMut(&Stats)>;

/// One selected file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedFile {
    pub filepath: String,
    pub filename: String,
    pub sha256: Option<String>,
}

/// A report file tree bound to a widget
pub struct FileTree<W: TreeWidget> {
    target: String,
    source: TreeSource,
    widget: W,
    filters: Filters,
    stats: Stats,
    on_draw: Option<DrawCallback>,
}

impl<W: TreeWidget> FileTree<W> {
    pub fn new(target: impl Into<String>, source: TreeSource, widget: W) -> Self {
        Self {
            target: target.into(),
            source,
            widget,
            filters: Filters::default(),
            stats: Stats::default(),
            on_draw: None,
        }
    }

    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    pub fn on_draw<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&Stats) + 'static,
    {
        self.on_draw = Some(Box::new(callback));
        self
    }

    /// Initialize the widget: schema, theme from `prefs`, and the data
    ///
    /// The completion callback runs right after the widget is configured;
    /// the widget's own readiness is signalled separately.
    pub fn draw(&mut self, prefs: &dyn Preferences) -> Result<()> {
        if self.target.is_empty() {
            return Err(FileTreeError::MissingTarget);
        }

        let data = self.produce_data();
        let theme = Theme::resolve(prefs);
        tracing::debug!(render_target = %self.target, theme = theme.name(), "drawing file tree");

        self.widget.configure(WidgetSettings::standard(theme), data);

        let target = self.target.clone();
        self.widget.on_ready(Box::new(move || {
            tracing::debug!(render_target = %target, "tree widget ready");
        }));

        self.notify_drawn();
        Ok(())
    }

    /// Re-normalize and re-render without touching the widget schema
    pub fn refresh(&mut self) {
        let data = self.produce_data();
        self.widget.set_data(data);
        self.widget.refresh();
        self.notify_drawn();
    }

    /// Switch mime, magic and size simplification together
    pub fn simplify(&mut self, enabled: bool) {
        self.filters.set_simplify(enabled);
        self.refresh();
    }

    /// Switch deselection of duplicates
    pub fn deselect_duplicates(&mut self, enabled: bool) {
        self.filters.deselect_duplicates = enabled;
        self.refresh();
    }

    /// Replace the data source (e.g. a regenerated report) and refresh
    pub fn reload(&mut self, source: TreeSource) {
        self.source = source;
        self.refresh();
    }

    /// Files the widget reports as checked, in widget order
    pub fn selected(&self) -> Vec<SelectedFile> {
        self.widget
            .checked_nodes()
            .into_iter()
            .map(|node| SelectedFile {
                filepath: node.a_attr.filepath,
                filename: node.text,
                sha256: node.a_attr.sha256,
            })
            .collect()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    fn produce_data(&mut self) -> Vec<NormalizedNode> {
        self.stats = Stats::default();
        match &self.source {
            TreeSource::Report(entries) => {
                let (nodes, stats) = normalize_forest(entries, &self.filters);
                self.stats = stats;
                nodes
            }
            TreeSource::Prenormalized(nodes) => nodes.clone(),
        }
    }

    fn notify_drawn(&mut self) {
        if let Some(callback) = self.on_draw.as_mut() {
            callback(&self.stats);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Classification;
    use crate::prefs::NoPreferences;
    use crate::widget::{CheckedNode, ReadyHook};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    /// Widget double that records every call
    #[derive(Default)]
    struct RecordingWidget {
        calls: Vec<&'static str>,
        settings: Option<WidgetSettings>,
        data: Vec<NormalizedNode>,
        checked: Vec<CheckedNode>,
        hooks: Vec<ReadyHook>,
    }

    impl TreeWidget for RecordingWidget {
        fn configure(&mut self, settings: WidgetSettings, data: Vec<NormalizedNode>) {
            self.calls.push("configure");
            self.settings = Some(settings);
            self.data = data;
        }

        fn set_data(&mut self, data: Vec<NormalizedNode>) {
            self.calls.push("set_data");
            self.data = data;
        }

        fn refresh(&mut self) {
            self.calls.push("refresh");
        }

        fn checked_nodes(&self) -> Vec<CheckedNode> {
            self.checked.clone()
        }

        fn on_ready(&mut self, hook: ReadyHook) {
            self.calls.push("on_ready");
            self.hooks.push(hook);
        }
    }

    fn report() -> Vec<ReportEntry> {
        vec![
            ReportEntry::file("copy.exe").with_duplicate(true),
            ReportEntry::file("a.zip").with_children(vec![ReportEntry::file("a.zip/b.doc")]),
        ]
    }

    fn tree() -> FileTree<RecordingWidget> {
        FileTree::new("#filetree", TreeSource::Report(report()), RecordingWidget::default())
    }

    #[test]
    fn test_draw_requires_target() {
        let mut tree = FileTree::new("", TreeSource::Report(report()), RecordingWidget::default());
        let err = tree.draw(&NoPreferences).unwrap_err();
        assert!(matches!(err, FileTreeError::MissingTarget));
        assert!(tree.widget().calls.is_empty());
        assert_eq!(tree.stats(), &Stats::default());
    }

    #[test]
    fn test_draw_configures_widget() {
        let mut tree = tree();
        let mut prefs = HashMap::new();
        prefs.insert("theme".to_string(), "night".to_string());
        tree.draw(&prefs).unwrap();

        let widget = tree.widget();
        assert_eq!(widget.calls, vec!["configure", "on_ready"]);
        let settings = widget.settings.as_ref().unwrap();
        assert_eq!(settings.theme, Theme::DefaultDark);
        assert_eq!(widget.data.len(), 2);
        assert_eq!(tree.stats().duplicates, 1);
        assert_eq!(tree.stats().containers, 1);
    }

    #[test]
    fn test_callback_runs_on_draw_and_refresh() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut tree = tree().on_draw(move |stats| sink.borrow_mut().push(stats.files));

        tree.draw(&NoPreferences).unwrap();
        tree.refresh();
        assert_eq!(*seen.borrow(), vec![3, 3]);
    }

    #[test]
    fn test_refresh_does_not_reconfigure() {
        let mut tree = tree();
        tree.draw(&NoPreferences).unwrap();
        tree.refresh();
        assert_eq!(
            tree.widget().calls,
            vec!["configure", "on_ready", "set_data", "refresh"]
        );
    }

    #[test]
    fn test_deselect_duplicates_toggle_refreshes() {
        let mut tree = tree();
        tree.draw(&NoPreferences).unwrap();
        assert!(!tree.widget().data[0].state.selected);

        tree.deselect_duplicates(false);
        assert!(!tree.filters().deselect_duplicates);
        assert!(tree.widget().data[0].state.selected);
        assert_eq!(tree.widget().data[0].node_type, Classification::Duplicate);
    }

    #[test]
    fn test_simplify_sets_all_three() {
        let mut tree = tree();
        tree.draw(&NoPreferences).unwrap();
        tree.simplify(false);
        let filters = tree.filters();
        assert!(!filters.simplify_mime && !filters.simplify_magic && !filters.simplify_sizes);
        assert_eq!(tree.widget().calls.last(), Some(&"refresh"));
    }

    #[test]
    fn test_stats_not_accumulated_across_refreshes() {
        let mut tree = tree();
        tree.draw(&NoPreferences).unwrap();
        let first = *tree.stats();
        tree.refresh();
        tree.refresh();
        assert_eq!(*tree.stats(), first);
    }

    #[test]
    fn test_prenormalized_data_used_as_is() {
        let (nodes, _) = normalize_forest(&report(), &Filters::default());
        let mut tree = FileTree::new(
            "#filetree",
            TreeSource::Prenormalized(nodes.clone()),
            RecordingWidget::default(),
        )
        .with_filters(Filters::raw());
        tree.draw(&NoPreferences).unwrap();
        assert_eq!(tree.widget().data, nodes);
        assert_eq!(tree.stats(), &Stats::default());
    }

    #[test]
    fn test_reload_replaces_source() {
        let mut tree = tree();
        tree.draw(&NoPreferences).unwrap();
        tree.reload(TreeSource::Report(vec![ReportEntry::directory("empty")]));
        assert_eq!(tree.widget().data.len(), 1);
        assert_eq!(tree.stats().directories, 1);
        assert_eq!(tree.stats().files, 0);
    }

    #[test]
    fn test_selected_projects_in_widget_order() {
        let mut tree = tree();
        tree.draw(&NoPreferences).unwrap();
        let (nodes, _) = normalize_forest(&report(), &Filters::default());
        let inner = &nodes[1].children()[0];
        tree.widget_mut().checked = vec![CheckedNode::from(inner), CheckedNode::from(&nodes[0])];

        let selected = tree.selected();
        assert_eq!(
            selected,
            vec![
                SelectedFile {
                    filepath: "a.zip/b.doc".to_string(),
                    filename: "b.doc".to_string(),
                    sha256: None,
                },
                SelectedFile {
                    filepath: "copy.exe".to_string(),
                    filename: "copy.exe".to_string(),
                    sha256: None,
                },
            ]
        );
    }

    #[test]
    fn test_ready_hook_registered_not_awaited() {
        let mut tree = tree();
        tree.draw(&NoPreferences).unwrap();
        let widget = tree.widget_mut();
        assert_eq!(widget.hooks.len(), 1);
        for hook in widget.hooks.iter_mut() {
            hook();
        }
    }

    #[test]
    fn test_load_source_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let report_path = dir.path().join("tree.json");
        std::fs::write(&report_path, r#"{"a.exe": {"filepath": "a.exe", "filename": "a.exe"}}"#).unwrap();
        match TreeSource::load(&report_path, false).unwrap() {
            TreeSource::Report(entries) => assert_eq!(entries[0].filepath, "a.exe"),
            other => panic!("expected report source, got {:?}", other),
        }

        let (nodes, _) = normalize_forest(&report(), &Filters::default());
        let nodes_path = dir.path().join("nodes.json");
        std::fs::write(&nodes_path, serde_json::to_string(&nodes).unwrap()).unwrap();
        match TreeSource::load(&nodes_path, true).unwrap() {
            TreeSource::Prenormalized(loaded) => assert_eq!(loaded, nodes),
            other => panic!("expected prenormalized source, got {:?}", other),
        }

        assert!(TreeSource::load(&dir.path().join("missing.json"), false).is_err());
        assert!(TreeSource::load(&report_path, true).is_err());
    }
}
