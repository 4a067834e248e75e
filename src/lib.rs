//! Unimerge - Combine two architecture-specific install trees
//!
//! This library merges two builds of the same software (e.g. an x86_64 and an
//! arm64 build of Qt for macOS) into a single universal install tree. Each
//! entry is merged with a strategy chosen from its type, and entries that
//! cannot be merged fall back to a copy plus a record in a parallel
//! `<merged>_errors` tree, so a run always completes.
//!
//! # Architecture
//!
//! - **merge** - Classification, the recursive walk, and the per-type strategies
//! - **tools** - The external `file`, `lipo`, `cmp` and `diff` collaborators
//!
//! # Strategies
//!
//! | Entry | Strategy |
//! |-------|----------|
//! | Mach-O executables, dylibs, dSYMs, static archives | combined with `lipo` |
//! | Symlinks | targets must be identical; the link is duplicated |
//! | `qconfig.h`, `*config_p.h` | differing lines toggled with the header condition |
//! | `.prl`, `.pri`, `.cmake` | verified to differ only in feature flags; one side is kept |
//! | `.la`, `.pc` | install prefixes substituted; the result is written |
//! | Anything else | must be byte-identical |
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use unimerge::{MergeOptions, Merger, SystemTools};
//!
//! let options = MergeOptions::new()
//!     .with_header_condition("#ifndef __aarch64__")
//!     .expect("valid condition")
//!     .with_install_substitution("/build/x86_64", "/build/arm64", "/build/universal");
//!
//! let tools = SystemTools::new();
//! let merger = Merger::new(options, &tools).expect("Failed to set up merge");
//! let report = merger
//!     .run(Path::new("qt-x86_64"), Path::new("qt-arm64"), Path::new("qt-universal"))
//!     .expect("Merge failed");
//!
//! for path in &report.mismatches {
//!     println!("could not merge: {}", path.display());
//! }
//! ```

pub mod merge;
pub mod tools;

pub use merge::*;
pub use tools::{GroupFormats, SystemTools, Tools};
