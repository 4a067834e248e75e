//! External tools used by the merge strategies
//!
//! Classification, binary combining, byte comparison and header diffing are
//! all delegated to command line tools. The [`Tools`] trait is the seam
//! between the merge engine and those processes so the engine can be driven
//! by a fake in tests.

mod system;

pub use system::SystemTools;

use crate::merge::MergeResult as Result;
use std::path::Path;

/// Output templates for the four kinds of diff hunk, in `diff(1)` group
/// format syntax
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupFormats {
    /// Lines common to both files
    pub unchanged: String,
    /// Lines only in the first file
    pub old: String,
    /// Lines only in the second file
    pub new: String,
    /// Lines replaced between the files
    pub changed: String,
}

/// Black-box collaborators the merge engine relies on
pub trait Tools {
    /// Human-readable type description of a file, as printed by `file --brief`.
    fn describe_file(&self, path: &Path) -> Result<String>;

    /// Combine two binaries into `output`.
    ///
    /// Returns `Ok(false)` if the objects could not be combined. A partial
    /// file may have been left at `output` in that case.
    fn combine(&self, first: &Path, second: &Path, output: &Path) -> Result<bool>;

    /// Whether two files have byte-identical contents.
    fn identical(&self, first: &Path, second: &Path) -> Result<bool>;

    /// Line diff of two files rendered through `formats`.
    fn diff_groups(&self, first: &Path, second: &Path, formats: &GroupFormats) -> Result<Vec<u8>>;
}
