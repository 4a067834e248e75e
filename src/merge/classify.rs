//! Entry classification
//!
//! Name-based text kinds are checked before asking the file-type inspector,
//! so a file matching both is classified by its name.

use super::error::{IoContext, Result};
use super::{BinaryKind, MergeType, TextKind};
use crate::tools::Tools;
use std::io::ErrorKind;
use std::path::Path;

/// `file --brief` prefixes for objects the combiner understands
const BINARY_PREFIXES: &[(&str, BinaryKind)] = &[
    ("Mach-O 64-bit executable ", BinaryKind::Executable),
    (
        "Mach-O 64-bit dynamically linked shared library ",
        BinaryKind::SharedLibrary,
    ),
    ("Mach-O 64-bit dSYM companion file ", BinaryKind::DebugSymbols),
    // "current ar archive" or "current ar archive random library" depending
    // on whether ranlib ran
    ("current ar archive", BinaryKind::StaticArchive),
];

/// Determine the merge strategy for `path`.
pub fn classify(path: &Path, tools: &dyn Tools) -> Result<MergeType> {
    // lstat so that links are never followed
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(MergeType::Missing),
        Err(e) => return Err(e).io_context("Failed to inspect", path),
    };

    if meta.file_type().is_symlink() {
        return Ok(MergeType::Symlink);
    }
    if meta.is_dir() {
        return Ok(MergeType::Directory);
    }

    if let Some(kind) = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(text_kind_for_name)
    {
        return Ok(MergeType::Text(kind));
    }

    let description = tools.describe_file(path)?;
    Ok(binary_kind_for_description(&description)
        .map(MergeType::Binary)
        .unwrap_or(MergeType::Other))
}

fn text_kind_for_name(name: &str) -> Option<TextKind> {
    if name.ends_with(".prl") {
        Some(TextKind::Prl)
    } else if name.ends_with(".pri") {
        Some(TextKind::Pri)
    } else if name.ends_with(".cmake") {
        Some(TextKind::Cmake)
    } else if name.ends_with("config_p.h") || name == "qconfig.h" {
        Some(TextKind::ConfigHeader)
    } else if name.ends_with(".la") {
        Some(TextKind::Libtool)
    } else if name.ends_with(".pc") {
        Some(TextKind::PkgConfig)
    } else {
        None
    }
}

fn binary_kind_for_description(description: &str) -> Option<BinaryKind> {
    BINARY_PREFIXES
        .iter()
        .find(|(prefix, _)| description.starts_with(prefix))
        .map(|(_, kind)| *kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_kinds_by_name() {
        assert_eq!(text_kind_for_name("libQt5Core.prl"), Some(TextKind::Prl));
        assert_eq!(text_kind_for_name("qmodule.pri"), Some(TextKind::Pri));
        assert_eq!(
            text_kind_for_name("Qt5CoreConfig.cmake"),
            Some(TextKind::Cmake)
        );
        assert_eq!(
            text_kind_for_name("qtcore-config_p.h"),
            Some(TextKind::ConfigHeader)
        );
        assert_eq!(text_kind_for_name("qconfig.h"), Some(TextKind::ConfigHeader));
        assert_eq!(text_kind_for_name("libz.la"), Some(TextKind::Libtool));
        assert_eq!(text_kind_for_name("zlib.pc"), Some(TextKind::PkgConfig));
    }

    #[test]
    fn other_headers_are_not_config_headers() {
        assert_eq!(text_kind_for_name("qglobal.h"), None);
        assert_eq!(text_kind_for_name("myqconfig.h"), None);
        assert_eq!(text_kind_for_name("libfoo.dylib"), None);
    }

    #[test]
    fn binary_descriptions() {
        assert_eq!(
            binary_kind_for_description("Mach-O 64-bit executable x86_64"),
            Some(BinaryKind::Executable)
        );
        assert_eq!(
            binary_kind_for_description(
                "Mach-O 64-bit dynamically linked shared library arm64"
            ),
            Some(BinaryKind::SharedLibrary)
        );
        assert_eq!(
            binary_kind_for_description("Mach-O 64-bit dSYM companion file arm64"),
            Some(BinaryKind::DebugSymbols)
        );
        assert_eq!(
            binary_kind_for_description("current ar archive random library"),
            Some(BinaryKind::StaticArchive)
        );
        assert_eq!(binary_kind_for_description("ASCII text"), None);
        // Universal binaries are not re-combined
        assert_eq!(
            binary_kind_for_description("Mach-O universal binary with 2 architectures"),
            None
        );
    }
}
