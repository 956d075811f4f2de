//! filetree - Extracted-file trees for sandbox analysis reports
//!
//! Turns the file tree of an analysis report into checkbox-tree data, with
//! every node tagged so the interesting ones stand out.
//!
//! # Overview
//!
//! A report describes what was unpacked from a submission: directories,
//! archives and the files inside them, each with MIME and magic data. The
//! classifier tags every entry, picks a default selection (executables and
//! office documents) and counts what it saw. A [`FileTree`] binds that data
//! to a [`TreeWidget`] and keeps it in sync with the display filters.
//!
//! # Tags
//!
//! | Tag | Meaning |
//! |------|---------|
//! | `directory` | Directory entry, always expanded |
//! | `file` | Anything without a more specific tag |
//! | `exec` | Executable or script suffix, checked by default |
//! | `office` | Office document suffix, checked by default |
//! | `container` | File with extracted children (archives, documents) |
//! | `duplicate` | Content already seen elsewhere in the tree |
//!
//! # Quick Start
//!
//! ```no_run
//! use filetree::{FileTree, JsTreeWidget, NoPreferences, TreeSource};
//!
//! let forest = filetree::report::load_forest(std::path::Path::new("tree.json")).unwrap();
//! let mut tree = FileTree::new("filetree", TreeSource::Report(forest), JsTreeWidget::new());
//! tree.draw(&NoPreferences).unwrap();
//!
//! let stats = tree.stats();
//! println!("{} files, {} executables", stats.files, stats.executables);
//! for file in tree.selected() {
//!     println!("{}", file.filepath);
//! }
//! ```

pub mod classify;
pub mod config;
pub mod error;
pub mod filetree;
pub mod highlight;
pub mod jstree;
pub mod node;
pub mod prefs;
pub mod report;
pub mod serve;
pub mod tui;
pub mod widget;

pub use classify::{normalize, normalize_forest, Filters, Stats};
pub use config::Config;
pub use error::{FileTreeError, Result};
pub use filetree::{FileTree, SelectedFile, TreeSource};
pub use highlight::{highlight, HighlightCategory, NodeHandle, RenderedNode};
pub use jstree::JsTreeWidget;
pub use node::{Classification, NormalizedNode};
pub use prefs::{CookiePreferences, NoPreferences, Preferences, Theme};
pub use report::{Fingerprint, ReportEntry};
pub use tui::TerminalTreeWidget;
pub use widget::{CheckedNode, TreeWidget, WidgetSettings};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Verify core types are re-exported from crate root
        let tree = FileTree::new("filetree", TreeSource::Report(Vec::new()), JsTreeWidget::new());
        assert_eq!(tree.target(), "filetree");
        assert_eq!(Classification::ALL.len(), 6);
    }
}
