//! Suspicious-token matching.
//!
//! # Responsibilities
//! - Flag text containing SQL metacharacters or keywords
//! - Report the category of the first match
//!
//! # Design Decisions
//! - Case-insensitive substring search, no regex
//! - First match short-circuits; only one category is ever reported
//! - No false-positive suppression: an apostrophe in prose is flagged

use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

/// Tokens that mark text as a SQL injection attempt. Keywords are stored
/// lowercase and compared against lowercased input.
pub const SQL_TOKENS: [&str; 11] = [
    "'", ";", "--", "/*", "*/", "union", "select", "drop", "delete", "update", "insert",
];

/// Category label attached to a flagged request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttackCategory {
    SqlInjection,
}

impl AttackCategory {
    pub fn label(self) -> &'static str {
        match self {
            AttackCategory::SqlInjection => "SQL Injection",
        }
    }
}

impl fmt::Display for AttackCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for AttackCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Outcome of classifying one or more pieces of text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    categories: BTreeSet<AttackCategory>,
}

impl Verdict {
    pub fn clean() -> Self {
        Self::default()
    }

    pub fn is_attack(&self) -> bool {
        !self.categories.is_empty()
    }

    pub fn categories(&self) -> &BTreeSet<AttackCategory> {
        &self.categories
    }

    pub fn into_categories(self) -> BTreeSet<AttackCategory> {
        self.categories
    }

    /// Combine two verdicts; the result is an attack if either is.
    pub fn union(mut self, other: Verdict) -> Verdict {
        self.categories.extend(other.categories);
        self
    }
}

/// Classify a single piece of text.
pub fn classify(text: &str) -> Verdict {
    let lowered = text.to_lowercase();
    let mut verdict = Verdict::clean();
    if SQL_TOKENS.iter().any(|token| lowered.contains(token)) {
        verdict.categories.insert(AttackCategory::SqlInjection);
    }
    verdict
}

/// Whether a comment looks like a stored-XSS attempt. Used for warnings
/// only; it never affects [`classify`].
pub fn contains_script_tag(text: &str) -> bool {
    text.to_lowercase().contains("<script>")
}
