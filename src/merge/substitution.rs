//! Ordered literal substitutions applied to matched lines
//!
//! Tables are applied pattern by pattern, in insertion order, replacing every
//! occurrence of one pattern before moving on to the next. Several of the
//! built-in feature tokens are prefixes of one another (` sse` vs ` sse4_2`),
//! so the order a table was built in is part of its meaning.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// A single `pattern -> replacement` rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub pattern: String,
    pub replacement: String,
}

impl Replacement {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }
}

/// Ordered table of literal replacements
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubstitutionTable {
    rules: Vec<Replacement>,
}

impl SubstitutionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule at the end of the table.
    ///
    /// If `pattern` is already present its replacement is updated and it keeps
    /// its original position.
    pub fn insert(&mut self, pattern: impl Into<String>, replacement: impl Into<String>) {
        let pattern = pattern.into();
        let replacement = replacement.into();
        match self.rules.iter_mut().find(|r| r.pattern == pattern) {
            Some(existing) => existing.replacement = replacement,
            None => self.rules.push(Replacement {
                pattern,
                replacement,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Replacement> {
        self.rules.iter()
    }

    /// Apply every rule, in order, to `text`.
    pub fn apply(&self, text: &str) -> String {
        let mut out = text.to_string();
        for rule in &self.rules {
            // Empty patterns would match between every character
            if rule.pattern.is_empty() {
                continue;
            }
            out = out.replace(&rule.pattern, &rule.replacement);
        }
        out
    }

    /// Apply the table only inside the regions of `text` matched by `lines`.
    ///
    /// Everything outside a match is passed through untouched.
    pub fn apply_in_lines(&self, lines: &Regex, text: &str) -> String {
        lines
            .replace_all(text, |caps: &regex_lite::Captures<'_>| self.apply(&caps[0]))
            .into_owned()
    }
}

impl FromIterator<Replacement> for SubstitutionTable {
    fn from_iter<I: IntoIterator<Item = Replacement>>(iter: I) -> Self {
        let mut table = Self::new();
        for rule in iter {
            table.insert(rule.pattern, rule.replacement);
        }
        table
    }
}

impl<'a> IntoIterator for &'a SubstitutionTable {
    type Item = &'a Replacement;
    type IntoIter = std::slice::Iter<'a, Replacement>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
