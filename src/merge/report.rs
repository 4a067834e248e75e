//! Outcome of a merge run

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Mismatches and deferred warnings collected over a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Errors-tree path of every entry that fell back to the mismatch handler,
    /// in traversal order
    pub mismatches: Vec<PathBuf>,

    /// Differing config headers were found but no header condition was given
    pub missing_header_condition: bool,
}

impl MergeReport {
    pub(crate) fn record_mismatch(&mut self, errors_path: &Path) {
        self.mismatches.push(errors_path.to_path_buf());
    }

    /// No entry needed a fallback
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }
}
