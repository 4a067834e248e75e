//! Recursive merge of two architecture-specific trees
//!
//! Each directory entry is classified on both sides. Entries of the same kind
//! are handed to a strategy for that kind; anything that cannot be merged is
//! routed to the mismatch handler, which always leaves a file in the merged
//! tree and a record in the errors tree so the walk can continue.

mod classify;
mod engine;
mod error;
mod fsutil;
mod header;
mod mismatch;
mod options;
mod report;
mod substitution;
mod text;

pub use classify::classify;
pub use engine::{Merger, errors_dir_for};
pub use error::{MergeError, Result as MergeResult};
pub use header::group_formats;
pub use options::{InstallSubstitution, MergeOptions, ProjectRules};
pub use report::MergeReport;
pub use substitution::{Replacement, SubstitutionTable};
pub use text::substitute_and_compare;

/// Text files handled by a substitution or header strategy, chosen by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    /// qmake `.prl` library metadata
    Prl,
    /// qmake `.pri` project include
    Pri,
    /// CMake config/target files
    Cmake,
    /// `qconfig.h` and `*config_p.h` feature headers
    ConfigHeader,
    /// libtool `.la` archives
    Libtool,
    /// pkg-config `.pc` files
    PkgConfig,
}

/// Objects that can be combined by the binary combiner, detected by content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryKind {
    Executable,
    SharedLibrary,
    DebugSymbols,
    StaticArchive,
}

/// Merge strategy selected for one side of an entry
///
/// Both sides must classify identically for an entry to be merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeType {
    Missing,
    Symlink,
    Directory,
    Text(TextKind),
    Binary(BinaryKind),
    Other,
}

impl std::fmt::Display for MergeType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MergeType::Missing => write!(f, "missing"),
            MergeType::Symlink => write!(f, "symlink"),
            MergeType::Directory => write!(f, "directory"),
            MergeType::Text(kind) => write!(f, "text ({kind:?})"),
            MergeType::Binary(kind) => write!(f, "binary ({kind:?})"),
            MergeType::Other => write!(f, "other"),
        }
    }
}
