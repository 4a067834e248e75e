//! Error types for merge operations
//!
//! Only conditions that make the run itself impossible end up here. Per-entry
//! problems (type mismatches, failed strategies) are recorded as mismatches
//! and never surface as a `MergeError`.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a merge
#[derive(Debug, Error)]
pub enum MergeError {
    /// Filesystem operation failed on a specific path
    #[error("{action} '{path}': {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source tree root is missing or not a directory
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// An external tool could not be launched
    #[error("Failed to run '{tool}': {source}")]
    ToolLaunch {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// An external tool ran but reported trouble
    #[error("'{tool}' failed on '{path}': {reason}")]
    ToolFailed {
        tool: &'static str,
        path: PathBuf,
        reason: String,
    },

    /// The header condition is spliced into a diff format string
    #[error("--header_condition value cannot include \"%\"")]
    InvalidHeaderCondition,

    /// Project rules file could not be read
    #[error("Failed to read project rules '{path}': {source}")]
    RulesRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Project rules file is not valid JSON for the expected shape
    #[error("Invalid project rules '{path}': {source}")]
    RulesParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A project rule line pattern failed to compile
    #[error("Invalid line pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Result type alias using MergeError
pub type Result<T> = std::result::Result<T, MergeError>;

/// Attach the failing action and path to an `io::Error`.
pub(crate) trait IoContext<T> {
    fn io_context(self, action: &'static str, path: &std::path::Path) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context(self, action: &'static str, path: &std::path::Path) -> Result<T> {
        self.map_err(|source| MergeError::Io {
            action,
            path: path.to_path_buf(),
            source,
        })
    }
}
