//! Fallback for entries that cannot be merged
//!
//! Always leaves something in the merged tree so later entries (and the build
//! consuming the tree) still see a complete layout:
//!
//! - only one side exists: that side is copied, and an empty marker is
//!   created in the errors tree
//! - both exist: the first side is copied as the default, and the second
//!   side is copied into the errors tree for comparison

use super::engine::{EntryPair, Merger};
use super::error::{IoContext, Result};
use super::fsutil::{copy_entry, entry_exists, remove_file_if_present, touch};

impl Merger<'_> {
    pub(crate) fn record_mismatch(&mut self, pair: &EntryPair) -> Result<()> {
        tracing::warn!(path = %pair.errors.display(), "could not merge");
        self.report.record_mismatch(&pair.errors);

        // The errors tree only gets directories where something is placed
        if let Some(parent) = pair.errors.parent() {
            std::fs::create_dir_all(parent).io_context("Failed to create directory", parent)?;
        }
        // A failed strategy (e.g. the combiner) may have left a partial file
        remove_file_if_present(&pair.merged)?;

        if !entry_exists(&pair.first) {
            copy_entry(&pair.second, &pair.merged)?;
            touch(&pair.errors)
        } else if !entry_exists(&pair.second) {
            copy_entry(&pair.first, &pair.merged)?;
            touch(&pair.errors)
        } else {
            copy_entry(&pair.first, &pair.merged)?;
            copy_entry(&pair.second, &pair.errors)
        }
    }
}
