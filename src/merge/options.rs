//! Run configuration: header test, install substitutions and project rules

use super::error::{MergeError, Result};
use super::substitution::{Replacement, SubstitutionTable};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// CPU feature flags and architecture names that legitimately differ between
/// the x86_64 and arm64 builds of Qt. Many are prefixes of later entries, so
/// the order matters.
const DEFAULT_FLAG_SUBSTITUTIONS: &[(&str, &str)] = &[
    (" sse2", ""),
    (" aesni", ""),
    (" ssse3", ""),
    (" sse3", ""),
    (" sse4_1", ""),
    (" sse4_2", ""),
    (" avx512f", ""),
    (" avx512bw", ""),
    (" avx512cd", ""),
    (" avx512dq", ""),
    (" avx512er", ""),
    (" avx512ifma", ""),
    (" avx512pf", ""),
    (" avx512vbmi", ""),
    (" avx512vl", ""),
    (" avx512common", ""),
    (" avx512core", ""),
    (" avx2", ""),
    (" avx", ""),
    (" f16c", ""),
    (" rdrnd", ""),
    (" rdseed", ""),
    (" shani", ""),
    (" x86SimdAlways", ""),
    (" simd", ""),
    (" arch_haswell", ""),
    (" cx16", ""),
    (" mmx", ""),
    (" sse4.1", ""),
    (" sse", ""),
    (" neon", ""),
    (" crc32", ""),
    // QT_ARCH / QT_BUILDABI in qconfig.pri
    ("x86_64", "universal"),
    ("arm64", "universal"),
    // Enabled on x86_64 only
    (" qt3d-simd-sse2", ""),
    (" qml-jit", ""),
];

/// The same two features as they appear in CMake feature lists
const DEFAULT_CMAKE_SUBSTITUTIONS: &[(&str, &str)] = &[
    (";qt3d-simd-sse2", ""),
    ("qt3d-simd-sse2", ""),
    (";qml-jit", ""),
    ("qml-jit", ""),
];

/// `QT_BUILD_PARTS` and `CONFIG` swap places between the two builds
const DEFAULT_REORDER_TOLERANT: &[&str] = &["qmodule.pri"];

/// One `--install_subst` triple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallSubstitution {
    /// Install prefix as it appears in the first tree
    pub first: String,
    /// Install prefix as it appears in the second tree
    pub second: String,
    /// Prefix written to the merged tree
    pub merged: String,
}

/// Tables used to verify qmake/CMake project files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectRules {
    /// Applied to `.prl` and `.pri` files
    pub flag_substitutions: SubstitutionTable,
    /// Applied to `.cmake` files
    pub cmake_substitutions: SubstitutionTable,
    /// `.pri` file names whose lines may appear in a different order
    pub reorder_tolerant: Vec<String>,
}

impl Default for ProjectRules {
    fn default() -> Self {
        Self {
            flag_substitutions: table_from(DEFAULT_FLAG_SUBSTITUTIONS),
            cmake_substitutions: table_from(DEFAULT_CMAKE_SUBSTITUTIONS),
            reorder_tolerant: DEFAULT_REORDER_TOLERANT
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ProjectRules {
    /// Load rules from a JSON document. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| MergeError::RulesRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| MergeError::RulesParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn tolerates_reordering(&self, file_name: &str) -> bool {
        self.reorder_tolerant.iter().any(|n| n == file_name)
    }
}

/// Everything that configures a merge, fixed before traversal starts
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Preprocessor line selecting the first architecture, e.g. `#ifndef __aarch64__`
    pub header_condition: Option<String>,
    pub install_substitutions: Vec<InstallSubstitution>,
    pub project_rules: ProjectRules,
}

impl MergeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header_condition(mut self, condition: impl Into<String>) -> Result<Self> {
        let condition = condition.into();
        // Spliced into a diff format string
        if condition.contains('%') {
            return Err(MergeError::InvalidHeaderCondition);
        }
        self.header_condition = Some(condition);
        Ok(self)
    }

    pub fn with_install_substitution(
        mut self,
        first: impl Into<String>,
        second: impl Into<String>,
        merged: impl Into<String>,
    ) -> Self {
        self.install_substitutions.push(InstallSubstitution {
            first: first.into(),
            second: second.into(),
            merged: merged.into(),
        });
        self
    }

    pub fn with_project_rules(mut self, rules: ProjectRules) -> Self {
        self.project_rules = rules;
        self
    }

    /// Check invariants that the builder methods cannot enforce on their own
    /// (fields are public).
    pub fn validate(&self) -> Result<()> {
        match &self.header_condition {
            Some(condition) if condition.contains('%') => Err(MergeError::InvalidHeaderCondition),
            _ => Ok(()),
        }
    }

    /// Per-side install tables: `first -> merged` and `second -> merged`.
    pub(crate) fn install_tables(&self) -> (SubstitutionTable, SubstitutionTable) {
        let mut first = SubstitutionTable::new();
        let mut second = SubstitutionTable::new();
        for subst in &self.install_substitutions {
            first.insert(subst.first.as_str(), subst.merged.as_str());
            second.insert(subst.second.as_str(), subst.merged.as_str());
        }
        (first, second)
    }
}

fn table_from(pairs: &[(&str, &str)]) -> SubstitutionTable {
    pairs
        .iter()
        .map(|(pattern, replacement)| Replacement::new(*pattern, *replacement))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_condition_rejects_percent() {
        let err = MergeOptions::new()
            .with_header_condition("#if FOO % 2")
            .unwrap_err();
        assert!(matches!(err, MergeError::InvalidHeaderCondition));

        let opts = MergeOptions {
            header_condition: Some("%d".into()),
            ..Default::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn install_tables_split_by_side() {
        let opts = MergeOptions::new()
            .with_install_substitution("/build/x86_64", "/build/arm64", "/build/universal");
        let (first, second) = opts.install_tables();

        assert_eq!(first.apply("libdir=/build/x86_64/lib"), "libdir=/build/universal/lib");
        assert_eq!(second.apply("libdir=/build/arm64/lib"), "libdir=/build/universal/lib");
        // Each side only knows its own prefix
        assert_eq!(first.apply("/build/arm64"), "/build/arm64");
    }

    #[test]
    fn default_rules_strip_feature_tokens() {
        let rules = ProjectRules::default();
        assert_eq!(
            rules
                .flag_substitutions
                .apply("QMAKE_PRL_CONFIG = lib_bundle sse2 sse4_2 avx512vl avx simd"),
            "QMAKE_PRL_CONFIG = lib_bundle"
        );
        assert_eq!(
            rules.flag_substitutions.apply("QT_ARCH = arm64"),
            "QT_ARCH = universal"
        );
        assert!(rules.tolerates_reordering("qmodule.pri"));
        assert!(!rules.tolerates_reordering("qconfig.pri"));
    }

    #[test]
    fn rules_file_overrides_only_given_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(
            &path,
            r#"{ "reorder_tolerant": ["qconfig.pri"],
                 "cmake_substitutions": [{ "pattern": ";foo", "replacement": "" }] }"#,
        )
        .unwrap();

        let rules = ProjectRules::from_file(&path).unwrap();
        assert_eq!(rules.reorder_tolerant, ["qconfig.pri"]);
        assert_eq!(rules.cmake_substitutions.len(), 1);
        assert_eq!(
            rules.flag_substitutions,
            ProjectRules::default().flag_substitutions
        );
    }

    #[test]
    fn malformed_rules_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            ProjectRules::from_file(&path),
            Err(MergeError::RulesParse { .. })
        ));
    }
}
