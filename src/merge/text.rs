//! Substitution-based strategies for text files
//!
//! Install files (`.la`, `.pc`) are rewritten so both sides point at the
//! merged install prefix, and the rewritten text becomes the output. Project
//! files (`.prl`, `.pri`, `.cmake`) go through the same comparison only to
//! prove that the sides differ in nothing but known feature flags; the output
//! is then an untouched copy of one side so qmake/CMake see the exact format
//! they wrote.

use super::engine::{EntryPair, Merger, Outcome};
use super::error::{IoContext, MergeError, Result};
use super::fsutil::copy_entry;
use super::substitution::SubstitutionTable;
use super::TextKind;
use regex_lite::Regex;
use std::path::Path;

const LIBTOOL_LINES: &str = r"(?m)^(dependency_libs|libdir)=.*$";
const PKG_CONFIG_LINES: &str = r"(?m)^(prefix=|Libs.private: ).*$";
const PRL_LINES: &str = r"(?m)^QMAKE_PRL_CONFIG = .*$";
const PRI_LINES: &str = r"(?m)^ *(QT\.[a-zA-Z0-9_]+\.(en|dis)abled_features|QT_ARCH|QT_BUILDABI|QMAKE_APPLE_DEVICE_ARCHS|QT_CPU_FEATURES.[a-zA-Z0-9_]+|CONFIG)[ =+].*$";
// The property name is on a preceding line; the feature identifiers are
// specific enough that matching any indented value list is fine
const CMAKE_LINES: &str = r"(?m)^ +[^()]+\)$";

/// Compiled line selectors for each substitution strategy
#[derive(Debug, Clone)]
pub(crate) struct LinePatterns {
    libtool: Regex,
    pkg_config: Regex,
    prl: Regex,
    pri: Regex,
    cmake: Regex,
}

impl LinePatterns {
    pub(crate) fn compile() -> Result<Self> {
        Ok(Self {
            libtool: compile(LIBTOOL_LINES)?,
            pkg_config: compile(PKG_CONFIG_LINES)?,
            prl: compile(PRL_LINES)?,
            pri: compile(PRI_LINES)?,
            cmake: compile(CMAKE_LINES)?,
        })
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| MergeError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// Normalize both texts and check that they agree.
///
/// Each table is applied only inside the regions matched by `lines`. Returns
/// the normalized first text if the two results are equal, or, when
/// `tolerate_reordering` is set, if they contain the same lines in some order.
/// Returns `None` when the texts still differ.
pub fn substitute_and_compare(
    lines: &Regex,
    first_table: &SubstitutionTable,
    second_table: &SubstitutionTable,
    first_text: &str,
    second_text: &str,
    tolerate_reordering: bool,
) -> Option<String> {
    let first = first_table.apply_in_lines(lines, first_text);
    let second = second_table.apply_in_lines(lines, second_text);

    if first == second {
        return Some(first);
    }

    // Use with caution: this also hides reorderings that matter
    if tolerate_reordering && sorted_lines(&first) == sorted_lines(&second) {
        return Some(first);
    }

    None
}

fn sorted_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.split_inclusive('\n').collect();
    lines.sort_unstable();
    lines
}

/// Which original a verified project file is taken from
#[derive(Debug, Clone, Copy)]
enum KeepSide {
    First,
    Second,
}

// ============================================================================
// Merger text strategies
// ============================================================================

impl Merger<'_> {
    /// Dispatch a text kind whose two sides are not byte-identical.
    pub(crate) fn merge_text(&self, kind: TextKind, pair: &EntryPair) -> Result<Outcome> {
        let rules = &self.options.project_rules;
        match kind {
            TextKind::Libtool => self.merge_install_file(&self.patterns.libtool, pair),
            TextKind::PkgConfig => self.merge_install_file(&self.patterns.pkg_config, pair),
            TextKind::Prl => verify_project_file(
                &self.patterns.prl,
                &rules.flag_substitutions,
                false,
                KeepSide::First,
                pair,
            ),
            TextKind::Pri => {
                let tolerate =
                    file_name(&pair.first).is_some_and(|name| rules.tolerates_reordering(name));
                verify_project_file(
                    &self.patterns.pri,
                    &rules.flag_substitutions,
                    tolerate,
                    KeepSide::First,
                    pair,
                )
            }
            TextKind::Cmake => verify_project_file(
                &self.patterns.cmake,
                &rules.cmake_substitutions,
                false,
                KeepSide::Second,
                pair,
            ),
            TextKind::ConfigHeader => self.merge_config_header(pair),
        }
    }

    /// Rewrite install prefixes on both sides; write the result if they agree.
    fn merge_install_file(&self, lines: &Regex, pair: &EntryPair) -> Result<Outcome> {
        let merged = match read_pair(pair)? {
            Some((first, second)) => substitute_and_compare(
                lines,
                &self.install_first,
                &self.install_second,
                &first,
                &second,
                false,
            ),
            None => None,
        };

        match merged {
            Some(text) => {
                std::fs::write(&pair.merged, text).io_context("Failed to write", &pair.merged)?;
                Ok(Outcome::Merged)
            }
            None => {
                tracing::debug!(path = %pair.first.display(), "install substitutions did not converge");
                Ok(Outcome::Mismatch)
            }
        }
    }
}

/// Verify that only known feature flags differ, then keep one original.
fn verify_project_file(
    lines: &Regex,
    table: &SubstitutionTable,
    tolerate_reordering: bool,
    keep: KeepSide,
    pair: &EntryPair,
) -> Result<Outcome> {
    let consistent = match read_pair(pair)? {
        Some((first, second)) => {
            substitute_and_compare(lines, table, table, &first, &second, tolerate_reordering)
                .is_some()
        }
        None => false,
    };

    if !consistent {
        tracing::debug!(path = %pair.first.display(), "unexpected project file differences");
        return Ok(Outcome::Mismatch);
    }

    // The normalized text is discarded on purpose
    let source = match keep {
        KeepSide::First => &pair.first,
        KeepSide::Second => &pair.second,
    };
    copy_entry(source, &pair.merged)?;
    Ok(Outcome::Merged)
}

/// Read both sides as UTF-8. `None` if either side is not valid text.
fn read_pair(pair: &EntryPair) -> Result<Option<(String, String)>> {
    let first = std::fs::read(&pair.first).io_context("Failed to read", &pair.first)?;
    let second = std::fs::read(&pair.second).io_context("Failed to read", &pair.second)?;
    match (String::from_utf8(first), String::from_utf8(second)) {
        (Ok(first), Ok(second)) => Ok(Some((first, second))),
        _ => Ok(None),
    }
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::options::ProjectRules;

    fn install_tables() -> (SubstitutionTable, SubstitutionTable) {
        let mut first = SubstitutionTable::new();
        first.insert("/build/x86_64", "/opt/qt");
        let mut second = SubstitutionTable::new();
        second.insert("/build/arm64", "/opt/qt");
        (first, second)
    }

    #[test]
    fn libtool_prefixes_converge() {
        let patterns = LinePatterns::compile().unwrap();
        let (first, second) = install_tables();

        let a = "# libz.la\nlibdir='/build/x86_64/lib'\ndependency_libs=' -L/build/x86_64/lib'\n";
        let b = "# libz.la\nlibdir='/build/arm64/lib'\ndependency_libs=' -L/build/arm64/lib'\n";

        assert_eq!(
            substitute_and_compare(&patterns.libtool, &first, &second, a, b, false).as_deref(),
            Some("# libz.la\nlibdir='/opt/qt/lib'\ndependency_libs=' -L/opt/qt/lib'\n")
        );
    }

    #[test]
    fn prefixes_outside_matched_lines_still_differ() {
        let patterns = LinePatterns::compile().unwrap();
        let (first, second) = install_tables();

        let a = "prefix=/build/x86_64\nLibs: -L/build/x86_64/lib\n";
        let b = "prefix=/build/arm64\nLibs: -L/build/arm64/lib\n";

        assert_eq!(
            substitute_and_compare(&patterns.pkg_config, &first, &second, a, b, false),
            None
        );
    }

    #[test]
    fn pkg_config_private_libs_are_rewritten() {
        let patterns = LinePatterns::compile().unwrap();
        let (first, second) = install_tables();

        let a = "prefix=/build/x86_64\nLibs.private: -L/build/x86_64/lib -lz\n";
        let b = "prefix=/build/arm64\nLibs.private: -L/build/arm64/lib -lz\n";

        assert!(substitute_and_compare(&patterns.pkg_config, &first, &second, a, b, false).is_some());
    }

    #[test]
    fn pri_feature_lists_verify() {
        let patterns = LinePatterns::compile().unwrap();
        let table = ProjectRules::default().flag_substitutions;

        let a = "QT.core.enabled_features = shared sse2 avx\nQT_ARCH = x86_64\nQT.core.name = QtCore\n";
        let b = "QT.core.enabled_features = shared neon\nQT_ARCH = arm64\nQT.core.name = QtCore\n";

        assert!(substitute_and_compare(&patterns.pri, &table, &table, a, b, false).is_some());
    }

    #[test]
    fn unexpected_feature_is_rejected() {
        let patterns = LinePatterns::compile().unwrap();
        let table = ProjectRules::default().flag_substitutions;

        let a = "QT.gui.enabled_features = opengl vulkan\n";
        let b = "QT.gui.enabled_features = opengl\n";

        assert_eq!(
            substitute_and_compare(&patterns.pri, &table, &table, a, b, false),
            None
        );
    }

    #[test]
    fn reordering_only_accepted_when_tolerated() {
        let patterns = LinePatterns::compile().unwrap();
        let table = ProjectRules::default().flag_substitutions;

        let a = "CONFIG += release sse2\nQT_BUILD_PARTS += libs\n";
        let b = "QT_BUILD_PARTS += libs\nCONFIG += release neon\n";

        assert_eq!(
            substitute_and_compare(&patterns.pri, &table, &table, a, b, false),
            None
        );
        assert!(substitute_and_compare(&patterns.pri, &table, &table, a, b, true).is_some());
    }

    #[test]
    fn cmake_feature_values_verify() {
        let patterns = LinePatterns::compile().unwrap();
        let table = ProjectRules::default().cmake_substitutions;

        let a = "set_target_properties(Qt5::3DCore PROPERTIES\n  QT_ENABLED_PUBLIC_FEATURES \"foo;qt3d-simd-sse2\")\n";
        let b = "set_target_properties(Qt5::3DCore PROPERTIES\n  QT_ENABLED_PUBLIC_FEATURES \"foo\")\n";

        assert!(substitute_and_compare(&patterns.cmake, &table, &table, a, b, false).is_some());
    }
}
