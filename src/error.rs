//! Error types for filetree

use thiserror::Error;

/// Result type for filetree operations
pub type Result<T> = std::result::Result<T, FileTreeError>;

/// Errors surfaced by the facade, the report loader and the viewer
#[derive(Error, Debug)]
pub enum FileTreeError {
    /// The tree was drawn without a render target
    #[error("drawtarget needed")]
    MissingTarget,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Report or widget data could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config file could not be parsed
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Viewer server failed to bind or respond
    #[error("server error: {0}")]
    Server(String),
}
