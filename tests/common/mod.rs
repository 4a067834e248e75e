//! Shared fixtures for merge integration tests.
//!
//! `FakeTools` stands in for `file` and `lipo` so binaries can be modelled as
//! small text files with a magic prefix. Byte comparison is done in-process
//! and diffs go to the real `diff`.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use unimerge::{GroupFormats, MergeResult, SystemTools, Tools};

pub const EXE_MAGIC: &str = "MACHO-EXE";
pub const DYLIB_MAGIC: &str = "MACHO-DYLIB";
pub const ARCHIVE_MAGIC: &str = "!<arch>";
/// Binaries containing this marker refuse to combine
pub const UNCOMBINABLE: &str = "same-arch";

#[derive(Debug, Default)]
pub struct FakeTools;

impl Tools for FakeTools {
    fn describe_file(&self, path: &Path) -> MergeResult<String> {
        let content = fs::read(path).unwrap_or_default();
        let description = if content.starts_with(EXE_MAGIC.as_bytes()) {
            "Mach-O 64-bit executable x86_64"
        } else if content.starts_with(DYLIB_MAGIC.as_bytes()) {
            "Mach-O 64-bit dynamically linked shared library x86_64"
        } else if content.starts_with(ARCHIVE_MAGIC.as_bytes()) {
            "current ar archive random library"
        } else if content.is_empty() {
            "empty"
        } else {
            "ASCII text"
        };
        Ok(description.to_string())
    }

    fn combine(&self, first: &Path, second: &Path, output: &Path) -> MergeResult<bool> {
        let a = fs::read_to_string(first).unwrap_or_default();
        let b = fs::read_to_string(second).unwrap_or_default();
        if a.contains(UNCOMBINABLE) || b.contains(UNCOMBINABLE) {
            // Like lipo, leave a partial output behind
            fs::write(output, "partial").unwrap();
            return Ok(false);
        }
        fs::write(output, format!("universal[{a}|{b}]")).unwrap();
        Ok(true)
    }

    fn identical(&self, first: &Path, second: &Path) -> MergeResult<bool> {
        Ok(fs::read(first).unwrap() == fs::read(second).unwrap())
    }

    fn diff_groups(
        &self,
        first: &Path,
        second: &Path,
        formats: &GroupFormats,
    ) -> MergeResult<Vec<u8>> {
        SystemTools::new().diff_groups(first, second, formats)
    }
}

/// A scratch area with `first/`, `second/` and a `merged` destination.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        fs::create_dir(dir.path().join("first")).unwrap();
        fs::create_dir(dir.path().join("second")).unwrap();
        Self { dir }
    }

    pub fn first(&self) -> PathBuf {
        self.dir.path().join("first")
    }

    pub fn second(&self) -> PathBuf {
        self.dir.path().join("second")
    }

    pub fn merged(&self) -> PathBuf {
        self.dir.path().join("merged")
    }

    pub fn errors(&self) -> PathBuf {
        self.dir.path().join("merged_errors")
    }

    /// Write the same relative file into both trees.
    pub fn both(&self, rel: &str, content: &str) {
        write(&self.first().join(rel), content);
        write(&self.second().join(rel), content);
    }
}

pub fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()))
}

pub fn symlink(target: &str, link: &Path) {
    fs::create_dir_all(link.parent().unwrap()).unwrap();
    std::os::unix::fs::symlink(target, link).unwrap();
}

/// Every file and symlink under `root`, relative and sorted.
pub fn list_files(root: &Path) -> Vec<PathBuf> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            let meta = fs::symlink_metadata(&path).unwrap();
            if meta.is_dir() {
                walk(root, &path, out);
            } else {
                out.push(path.strip_prefix(root).unwrap().to_path_buf());
            }
        }
    }

    let mut out = Vec::new();
    if root.exists() {
        walk(root, root, &mut out);
    }
    out.sort();
    out
}
