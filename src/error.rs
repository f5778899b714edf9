//! Error types for snapcheck.
//!
//! Only root-level failures surface as errors: a missing or unreadable export
//! root, and serialization failures in the output layer. Per-file problems
//! while loading an export tree are soft-skipped by the loader and never
//! reach this type.

use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SnapcheckError>;

/// Errors produced by snapcheck.
#[derive(Debug, Error)]
pub enum SnapcheckError {
    /// The export root could not be read at all.
    #[error("cannot read export root {path}: {source}")]
    ExportRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The export root exists but is not a directory.
    #[error("export root {0} is not a directory")]
    NotADirectory(PathBuf),

    /// An `--output` value that is not one of the supported formats.
    #[error("unsupported output format: {0} (expected table, json, or yaml)")]
    UnknownFormat(String),

    /// JSON rendering of a result failed.
    #[error("failed to render JSON output: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML rendering of a result failed.
    #[error("failed to render YAML output: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
