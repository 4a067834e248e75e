//! Preprocessor-conditional merge of config headers
//!
//! `diff` finds the differing line groups; its group formats wrap each one in
//! the configured test, `#else` and `#endif` so both variants survive and the
//! compiler picks one per architecture.

use super::engine::{EntryPair, Merger, Outcome};
use super::error::{IoContext, Result};
use crate::tools::GroupFormats;

/// A newline in diff's format syntax
const NEWLINE: &str = "%c'\\012'";

/// Group formats that wrap first-only lines in `condition` and second-only
/// lines in its `#else` branch.
///
/// `condition` must not contain `%`.
pub fn group_formats(condition: &str) -> GroupFormats {
    let if_marker = format!("{condition}{NEWLINE}");
    let else_marker = format!("#else{NEWLINE}");
    let endif_marker = format!("#endif{NEWLINE}");

    GroupFormats {
        unchanged: "%=".to_string(),
        old: format!("{if_marker}%<{endif_marker}"),
        // Only the #else branch has content
        new: format!("{if_marker}{else_marker}%>{endif_marker}"),
        changed: format!("{if_marker}%<{else_marker}%>{endif_marker}"),
    }
}

impl Merger<'_> {
    pub(crate) fn merge_config_header(&self, pair: &EntryPair) -> Result<Outcome> {
        let Some(condition) = self.options.header_condition.as_deref() else {
            return Ok(Outcome::NeedsHeaderCondition);
        };

        let merged = self
            .tools
            .diff_groups(&pair.first, &pair.second, &group_formats(condition))?;
        std::fs::write(&pair.merged, merged).io_context("Failed to write", &pair.merged)?;
        Ok(Outcome::Merged)
    }
}
