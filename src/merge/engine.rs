//! Merger - walks both trees in lock-step and dispatches each entry
//!
//! Strategies live in sibling modules as further `impl Merger` blocks:
//! - text.rs: install-path and project-file substitution strategies
//! - header.rs: config header conditionalization
//! - mismatch.rs: the fallback used whenever a strategy gives up

use super::classify::classify;
use super::error::{IoContext, MergeError, Result};
use super::fsutil::{copy_entry, copy_symlink, remove_tree_if_present};
use super::options::MergeOptions;
use super::report::MergeReport;
use super::substitution::SubstitutionTable;
use super::text::LinePatterns;
use super::MergeType;
use crate::tools::Tools;
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// macOS Finder metadata, never merged
const IGNORED_ENTRIES: &[&str] = &[".DS_Store"];

/// Suffix appended to the merged directory name for the errors tree
const ERRORS_SUFFIX: &str = "_errors";

/// Paths of one entry in each of the four trees
#[derive(Debug, Clone)]
pub(crate) struct EntryPair {
    pub(crate) first: PathBuf,
    pub(crate) second: PathBuf,
    pub(crate) merged: PathBuf,
    pub(crate) errors: PathBuf,
}

/// What a strategy did with an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// The merged tree holds the final result
    Merged,
    /// The strategy gave up; the mismatch handler takes over
    Mismatch,
    /// Headers differ and there is no condition to toggle them with
    NeedsHeaderCondition,
}

/// Merges two trees according to a fixed set of options
///
/// Options and tables are immutable for the life of a `Merger`; the only
/// state that grows during a run is the report.
pub struct Merger<'t> {
    pub(crate) options: MergeOptions,
    pub(crate) tools: &'t dyn Tools,
    pub(crate) patterns: LinePatterns,
    pub(crate) install_first: SubstitutionTable,
    pub(crate) install_second: SubstitutionTable,
    pub(crate) report: MergeReport,
}

impl<'t> Merger<'t> {
    pub fn new(options: MergeOptions, tools: &'t dyn Tools) -> Result<Self> {
        options.validate()?;
        let (install_first, install_second) = options.install_tables();

        Ok(Self {
            options,
            tools,
            patterns: LinePatterns::compile()?,
            install_first,
            install_second,
            report: MergeReport::default(),
        })
    }

    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Merge `first` and `second` into `merged`, recreating `merged` and its
    /// errors tree from scratch.
    pub fn run(mut self, first: &Path, second: &Path, merged: &Path) -> Result<MergeReport> {
        for root in [first, second] {
            if !root.is_dir() {
                return Err(MergeError::NotADirectory {
                    path: root.to_path_buf(),
                });
            }
        }

        let errors = errors_dir_for(merged);
        remove_tree_if_present(merged)?;
        remove_tree_if_present(&errors)?;

        self.merge_tree(first, second, merged, &errors)?;
        Ok(self.report)
    }

    /// Merge two directories that both exist.
    pub(crate) fn merge_tree(
        &mut self,
        first: &Path,
        second: &Path,
        merged: &Path,
        errors: &Path,
    ) -> Result<()> {
        tracing::info!("entering: {}", first.display());
        std::fs::create_dir_all(merged).io_context("Failed to create directory", merged)?;

        for name in union_entries(first, second)? {
            let pair = EntryPair {
                first: first.join(&name),
                second: second.join(&name),
                merged: merged.join(&name),
                errors: errors.join(&name),
            };
            self.merge_entry(&pair)?;
        }
        Ok(())
    }

    fn merge_entry(&mut self, pair: &EntryPair) -> Result<()> {
        let merge_type = classify(&pair.first, self.tools)?;
        let second_type = classify(&pair.second, self.tools)?;

        // Includes one side missing
        if merge_type != second_type {
            tracing::debug!(
                path = %pair.first.display(),
                first = %merge_type,
                second = %second_type,
                "entry types differ"
            );
            return self.record_mismatch(pair);
        }

        let outcome = match merge_type {
            MergeType::Directory => {
                return self.merge_tree(&pair.first, &pair.second, &pair.merged, &pair.errors);
            }
            MergeType::Missing => {
                // Listed a moment ago but gone from both sides now
                tracing::debug!(path = %pair.first.display(), "entry vanished");
                return Ok(());
            }
            MergeType::Symlink => self.merge_symlinks(pair)?,
            // Every binary subtype combines the same way, but the subtypes
            // had to match to get here
            MergeType::Binary(_) => self.merge_binaries(pair)?,
            MergeType::Text(_) | MergeType::Other
                if self.tools.identical(&pair.first, &pair.second)? =>
            {
                copy_entry(&pair.first, &pair.merged)?;
                Outcome::Merged
            }
            MergeType::Text(kind) => self.merge_text(kind, pair)?,
            MergeType::Other => Outcome::Mismatch,
        };

        match outcome {
            Outcome::Merged => Ok(()),
            Outcome::Mismatch => self.record_mismatch(pair),
            Outcome::NeedsHeaderCondition => {
                self.report.missing_header_condition = true;
                self.record_mismatch(pair)
            }
        }
    }

    // ========================================================================
    // Link and binary strategies
    // ========================================================================

    /// Links merge only if their raw targets are identical.
    fn merge_symlinks(&self, pair: &EntryPair) -> Result<Outcome> {
        let first = std::fs::read_link(&pair.first).io_context("Failed to read link", &pair.first)?;
        let second =
            std::fs::read_link(&pair.second).io_context("Failed to read link", &pair.second)?;

        if first != second {
            return Ok(Outcome::Mismatch);
        }
        copy_symlink(&pair.first, &pair.merged)?;
        Ok(Outcome::Merged)
    }

    fn merge_binaries(&self, pair: &EntryPair) -> Result<Outcome> {
        if self.tools.combine(&pair.first, &pair.second, &pair.merged)? {
            Ok(Outcome::Merged)
        } else {
            Ok(Outcome::Mismatch)
        }
    }
}

/// The errors tree that accompanies `merged`: `<merged>_errors`.
pub fn errors_dir_for(merged: &Path) -> PathBuf {
    // Drop any trailing separator so the suffix lands on the name
    let mut name = merged.components().as_path().as_os_str().to_owned();
    name.push(ERRORS_SUFFIX);
    PathBuf::from(name)
}

/// Sorted union of entry names in both directories, hidden entries included.
fn union_entries(first: &Path, second: &Path) -> Result<BTreeSet<OsString>> {
    let mut names = BTreeSet::new();
    for dir in [first, second] {
        for entry in std::fs::read_dir(dir).io_context("Failed to read directory", dir)? {
            let name = entry.io_context("Failed to read directory", dir)?.file_name();
            if !IGNORED_ENTRIES.iter().any(|ignored| name == *ignored) {
                names.insert(name);
            }
        }
    }
    Ok(names)
}
