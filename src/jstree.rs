//! Browser tree widget backed by jstree
//!
//! Holds the schema and data the viewer page feeds to
//! `$(target).jstree(config)`. Checked state lives in the browser: the page
//! posts `get_checked(true)` back and the widget keeps the last report.

use serde_json::{json, Map, Value};

use crate::node::NormalizedNode;
use crate::widget::{initial_checked, CheckedNode, ReadyHook, TreeWidget, WidgetSettings};

#[derive(Default)]
pub struct JsTreeWidget {
    settings: Option<WidgetSettings>,
    data: Vec<NormalizedNode>,
    reported: Option<Vec<CheckedNode>>,
    hooks: Vec<ReadyHook>,
    ready: bool,
    revision: u64,
}

impl JsTreeWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(&self) -> Option<&WidgetSettings> {
        self.settings.as_ref()
    }

    pub fn data(&self) -> &[NormalizedNode] {
        &self.data
    }

    /// Bumped on every configure/refresh so the page can tell stale data apart
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Record the checked nodes reported by the page
    pub fn set_checked(&mut self, nodes: Vec<CheckedNode>) {
        tracing::debug!(checked = nodes.len(), "browser reported checked nodes");
        self.reported = Some(nodes);
    }

    /// The page finished rendering; runs the ready hooks once
    pub fn mark_ready(&mut self) {
        if self.ready {
            return;
        }
        self.ready = true;
        for hook in self.hooks.iter_mut() {
            hook();
        }
    }

    /// The `core.data` array
    pub fn data_document(&self) -> Value {
        serde_json::to_value(&self.data).unwrap_or_else(|_| Value::Array(Vec::new()))
    }

    /// Full jstree initialization object, `None` until configured
    pub fn config_document(&self) -> Option<Value> {
        let settings = self.settings.as_ref()?;

        let mut types = Map::new();
        for t in &settings.types {
            types.insert(t.node_type.as_str().to_string(), json!({ "icon": t.icon }));
        }

        Some(json!({
            "core": {
                "data": self.data_document(),
                "multiple": settings.multiple,
                "animation": settings.animation,
                "themes": { "name": settings.theme.name() },
            },
            "types": types,
            "grid": {
                "columns": settings.columns,
                "resizable": settings.resizable,
            },
            "plugins": settings.plugins,
        }))
    }
}

impl TreeWidget for JsTreeWidget {
    fn configure(&mut self, settings: WidgetSettings, data: Vec<NormalizedNode>) {
        self.settings = Some(settings);
        self.data = data;
        self.reported = None;
        self.hooks.clear();
        self.ready = false;
        self.revision += 1;
    }

    fn set_data(&mut self, data: Vec<NormalizedNode>) {
        self.data = data;
    }

    fn refresh(&mut self) {
        self.reported = None;
        self.revision += 1;
    }

    fn checked_nodes(&self) -> Vec<CheckedNode> {
        match &self.reported {
            Some(nodes) => nodes.clone(),
            None => initial_checked(&self.data),
        }
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
    use std::cell::Cell;
    use std::rc::Rc;

    fn configured() -> JsTreeWidget {
        let forest = vec![
            ReportEntry::file("run.exe"),
            ReportEntry::directory("d").with_children(vec![ReportEntry::file("d/a.txt")]),
        ];
        let (nodes, _) = normalize_forest(&forest, &Filters::default());
        let mut widget = JsTreeWidget::new();
        widget.configure(WidgetSettings::standard(Theme::DefaultDark), nodes);
        widget
    }

    #[test]
    fn test_unconfigured_has_no_config() {
        assert!(JsTreeWidget::new().config_document().is_none());
    }

    #[test]
    fn test_config_document_shape() {
        let config = configured().config_document().unwrap();
        assert_eq!(config["core"]["multiple"], true);
        assert_eq!(config["core"]["animation"], 0);
        assert_eq!(config["core"]["themes"]["name"], "default-dark");
        assert_eq!(config["core"]["data"][0]["type"], "exec");
        assert_eq!(config["types"]["container"]["icon"], "fa fa-file-archive-o");
        assert!(config["types"].get("directory").is_none());
        assert_eq!(config["grid"]["columns"][0]["header"], "File");
        assert!(config["grid"]["columns"][0].get("value").is_none());
        assert_eq!(config["grid"]["columns"][3]["value"], "magic");
        assert_eq!(config["grid"]["resizable"], true);
        assert_eq!(config["plugins"][2], "checkbox");
    }

    #[test]
    fn test_checked_defaults_until_reported() {
        let mut widget = configured();
        let defaults: Vec<_> = widget.checked_nodes().into_iter().map(|n| n.text).collect();
        assert_eq!(defaults, vec!["run.exe"]);

        widget.set_checked(Vec::new());
        assert!(widget.checked_nodes().is_empty());

        widget.refresh();
        assert_eq!(widget.checked_nodes().len(), 1);
    }

    #[test]
    fn test_ready_hooks_run_once() {
        let mut widget = configured();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        widget.on_ready(Box::new(move || c.set(c.get() + 1)));

        assert!(!widget.is_ready());
        widget.mark_ready();
        widget.mark_ready();
        assert!(widget.is_ready());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_revision_bumps() {
        let mut widget = configured();
        let before = widget.revision();
        widget.set_data(Vec::new());
        assert_eq!(widget.revision(), before);
        widget.refresh();
        assert_eq!(widget.revision(), before + 1);
        assert!(widget.data().is_empty());
    }
}
