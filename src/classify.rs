//! Classification and normalization of report trees
//!
//! Pure transform from [`ReportEntry`] forests to [`NormalizedNode`] forests.
//! Nothing here touches a widget or keeps state between calls: the filters
//! come in as a value and the counters come back as [`Stats`].
//!
//! Tag precedence, later rules overriding earlier ones:
//!
//! ```text
//! base kind -> executable suffix -> office suffix -> duplicate -> directory -> container
//! ```

use serde::{Deserialize, Serialize};

use crate::node::{Classification, NodeAttributes, NodeData, NodeState, NormalizedNode};
use crate::report::{Fingerprint, ReportEntry};

/// Path suffixes that mark a file as executable content
///
/// `js` has no leading dot, so any path ending in those two letters matches.
pub const EXECUTABLE_SUFFIXES: &[&str] = &[
    ".exe", ".pdf", ".vbs", ".vba", ".bat", ".py", ".pyc", ".pl", ".rb", "js", ".jse",
];

/// Path suffixes that mark a file as an office document
pub const OFFICE_SUFFIXES: &[&str] = &[
    ".doc", ".docx", ".docm", ".dotx", ".dotm", ".docb", ".xltm", ".xls", ".xltx", ".xlsm",
    ".xlsx", ".xlt", ".ppt", ".pps", ".pot",
];

/// Magic strings longer than this many characters are cut
pub const MAGIC_MAX_CHARS: usize = 170;

/// Shown in place of a missing magic string
pub const EMPTY_MAGIC: &str = "empty";

/// Display filters applied during normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    /// Show the human-readable MIME instead of the raw one
    #[serde(default = "default_true")]
    pub simplify_mime: bool,
    /// Show the human-readable magic instead of the raw one
    #[serde(default = "default_true")]
    pub simplify_magic: bool,
    /// Toggled with the other simplify filters; not consulted by the transform
    #[serde(default = "default_true")]
    pub simplify_sizes: bool,
    /// Uncheck duplicates even when their suffix would check them
    #[serde(default = "default_true")]
    pub deselect_duplicates: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            simplify_mime: true,
            simplify_magic: true,
            simplify_sizes: true,
            deselect_duplicates: true,
        }
    }
}

impl Filters {
    /// Everything raw, duplicates left alone
    pub fn raw() -> Self {
        Self {
            simplify_mime: false,
            simplify_magic: false,
            simplify_sizes: false,
            deselect_duplicates: false,
        }
    }

    /// Set all three simplify filters at once
    pub fn set_simplify(&mut self, enabled: bool) {
        self.simplify_mime = enabled;
        self.simplify_sizes = enabled;
        self.simplify_magic = enabled;
    }
}

/// Counters gathered during one normalization pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub duplicates: usize,
    pub files: usize,
    pub containers: usize,
    pub directories: usize,
    /// Executable and office suffix matches combined
    pub executables: usize,
}

/// Normalize a whole forest, counting from zero
pub fn normalize_forest(entries: &[ReportEntry], filters: &Filters) -> (Vec<NormalizedNode>, Stats) {
    let mut stats = Stats::default();
    let nodes = entries
        .iter()
        .map(|entry| normalize(entry, filters, &mut stats))
        .collect();
    tracing::debug!(
        roots = entries.len(),
        files = stats.files,
        directories = stats.directories,
        containers = stats.containers,
        duplicates = stats.duplicates,
        executables = stats.executables,
        "normalized report forest"
    );
    (nodes, stats)
}

/// Normalize one entry and its descendants, adding to `stats`
pub fn normalize(entry: &ReportEntry, filters: &Filters, stats: &mut Stats) -> NormalizedNode {
    let is_directory = entry.is_directory();

    let (mime, magic) = if is_directory {
        (None, None)
    } else {
        display_fingerprint(entry.finger.as_ref(), filters)
    };
    let magic = sanitize_magic(magic);

    let mut tag = Classification::from_kind(entry.kind.as_deref());
    let mut selected = false;
    let mut opened = false;

    let exec_hits = suffix_matches(&entry.filepath, EXECUTABLE_SUFFIXES);
    if exec_hits > 0 {
        tag = Classification::Exec;
        selected = true;
        stats.executables += exec_hits;
    }

    let office_hits = suffix_matches(&entry.filepath, OFFICE_SUFFIXES);
    if office_hits > 0 {
        tag = Classification::Office;
        selected = true;
        stats.executables += office_hits;
    }

    let mut filetree_duplicate = None;
    if entry.duplicate {
        tag = Classification::Duplicate;
        if filters.deselect_duplicates {
            selected = false;
        }
        filetree_duplicate = Some("true".to_string());
        stats.duplicates += 1;
    }

    if is_directory {
        opened = true;
        tag = Classification::Directory;
        stats.directories += 1;
    }

    let mut data = None;
    if tag != Classification::Directory {
        data = Some(NodeData {
            mime,
            size: entry.size,
            magic,
        });
        stats.files += 1;

        if !entry.children.is_empty() {
            tag = Classification::Container;
            opened = true;
            stats.containers += 1;
        }
    }

    let children = if entry.children.is_empty() {
        None
    } else {
        Some(
            entry
                .children
                .iter()
                .map(|child| normalize(child, filters, stats))
                .collect(),
        )
    };

    NormalizedNode {
        text: entry.filename.clone(),
        node_type: tag,
        state: NodeState { selected, opened },
        a_attr: NodeAttributes {
            filepath: entry.filepath.clone(),
            sha256: entry.sha256.clone(),
            filetree_type: tag,
            filetree_duplicate,
        },
        data,
        children,
    }
}

/// Pick raw or human-readable (mime, magic) per the simplify filters
fn display_fingerprint(
    finger: Option<&Fingerprint>,
    filters: &Filters,
) -> (Option<String>, Option<String>) {
    let Some(finger) = finger else {
        return (None, None);
    };
    let magic = if filters.simplify_magic {
        finger.magic_human.clone()
    } else {
        finger.magic.clone()
    };
    let mime = if filters.simplify_mime {
        finger.mime_human.clone()
    } else {
        finger.mime.clone()
    };
    (mime, magic)
}

/// Cut overlong magic and substitute the sentinel for missing magic
pub fn sanitize_magic(magic: Option<String>) -> String {
    match magic {
        Some(m) if !m.is_empty() => {
            if m.chars().count() > MAGIC_MAX_CHARS {
                let cut: String = m.chars().take(MAGIC_MAX_CHARS).collect();
                format!("{}...", cut)
            } else {
                m
            }
        }
        _ => EMPTY_MAGIC.to_string(),
    }
}

fn suffix_matches(path: &str, suffixes: &[&str]) -> usize {
    suffixes.iter().filter(|s| path.ends_with(*s)).count()
}
