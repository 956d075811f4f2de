//! Application state for the TUI

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::Config;
use crate::error::Result;
use crate::filetree::{FileTree, SelectedFile, TreeSource};
use crate::highlight::{highlight, HighlightCategory};
use crate::prefs::Theme;

use super::widget::TerminalTreeWidget;

/// Main application state
pub struct App {
    pub tree: FileTree<TerminalTreeWidget>,
    report_path: PathBuf,
    prenormalized: bool,
    pub theme: Theme,

    /// Categories currently highlighted
    pub highlights: BTreeSet<HighlightCategory>,

    /// Rows moved by PageUp/PageDown
    pub page_size: usize,

    pub show_help: bool,
    pub refresh_shown_at: Option<Instant>,
    pub status_message: Option<(String, Instant)>,

    /// Set when the user confirms the selection on exit
    pub confirmed: Option<Vec<SelectedFile>>,
}

impl App {
    pub fn new(report_path: PathBuf, prenormalized: bool, config: &Config) -> Result<Self> {
        let source = TreeSource::load(&report_path, prenormalized)?;
        let mut tree = FileTree::new(
            config.server.target.clone(),
            source,
            TerminalTreeWidget::new(),
        )
        .with_filters(config.filters);
        tree.draw(&config.preferences)?;

        Ok(Self {
            tree,
            report_path,
            prenormalized,
            theme: Theme::resolve(&config.preferences),
            highlights: BTreeSet::new(),
            page_size: 10,
            show_help: false,
            refresh_shown_at: None,
            status_message: None,
            confirmed: None,
        })
    }

    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    pub fn widget(&self) -> &TerminalTreeWidget {
        self.tree.widget()
    }

    /// Apply a change to the tree widget, then restore highlights on the new rows
    pub fn with_widget(&mut self, f: impl FnOnce(&mut TerminalTreeWidget)) {
        f(self.tree.widget_mut());
        self.reapply_highlights();
    }

    /// Re-read the report from disk
    pub fn reload_report(&mut self) {
        match TreeSource::load(&self.report_path, self.prenormalized) {
            Ok(source) => {
                self.tree.reload(source);
                self.reapply_highlights();
                self.show_refresh_indicator();
                tracing::info!(path = %self.report_path.display(), "report reloaded");
            }
            Err(e) => {
                tracing::warn!(path = %self.report_path.display(), error = %e, "report reload failed");
                self.set_status(format!("Reload failed: {}", e));
            }
        }
    }

    pub fn toggle_simplify(&mut self) {
        let enabled = !self.tree.filters().simplify_mime;
        self.tree.simplify(enabled);
        self.reapply_highlights();
        self.set_status(format!("Simplify {}", on_off(enabled)));
    }

    pub fn toggle_deselect_duplicates(&mut self) {
        let enabled = !self.tree.filters().deselect_duplicates;
        self.tree.deselect_duplicates(enabled);
        self.reapply_highlights();
        self.set_status(format!("Deselect duplicates {}", on_off(enabled)));
    }

    /// Turn a highlight category on or off
    pub fn toggle_highlight(&mut self, category: HighlightCategory) {
        let enable = !self.highlights.contains(&category);
        if enable {
            self.highlights.insert(category);
        } else {
            self.highlights.remove(&category);
        }

        let mut matched = 0;
        for row in self.tree.widget_mut().rows_mut() {
            if highlight(&mut row.handle, category, enable) {
                matched += 1;
            }
        }
        // Other active categories may cover rows this one just cleared
        if !enable {
            self.reapply_highlights();
        }
        self.set_status(format!("Highlight {} {} ({} rows)", category, on_off(enable), matched));
    }

    /// Rows are rebuilt on every expand/check/refresh; put the marks back
    fn reapply_highlights(&mut self) {
        let active: Vec<HighlightCategory> = self.highlights.iter().copied().collect();
        for row in self.tree.widget_mut().rows_mut() {
            for category in &active {
                highlight(&mut row.handle, *category, true);
            }
        }
    }

    /// Finish with the current selection
    pub fn confirm(&mut self) {
        self.confirmed = Some(self.tree.selected());
    }

    pub fn show_refresh_indicator(&mut self) {
        self.refresh_shown_at = Some(Instant::now());
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Periodic tick for transient indicators
    pub fn tick(&mut self) {
        if let Some(shown_at) = self.refresh_shown_at {
            if shown_at.elapsed().as_secs() >= 2 {
                self.refresh_shown_at = None;
            }
        }

        if let Some((_, shown_at)) = &self.status_message {
            if shown_at.elapsed().as_secs() >= 3 {
                self.status_message = None;
            }
        }
    }

    pub fn resize(&mut self, _width: u16, height: u16) {
        // header, filter bar, table header, borders, footer
        self.page_size = usize::from(height.saturating_sub(6)).max(1);
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}
