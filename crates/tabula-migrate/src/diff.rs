//! Column set differences between a record and the live table.

use std::collections::HashSet;

/// Returns the items of `a` missing from `b`, in the order of `a`.
#[must_use]
pub fn difference(a: &[String], b: &[String]) -> Vec<String> {
    let present: HashSet<&str> = b.iter().map(String::as_str).collect();
    a.iter()
        .filter(|item| !present.contains(item.as_str()))
        .cloned()
        .collect()
}

/// Columns to add and to remove to turn the live table into the declared one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnDiff {
    /// Declared but not live, in declaration order.
    pub added: Vec<String>,
    /// Live but not declared, in live order.
    pub removed: Vec<String>,
}

impl ColumnDiff {
    /// Compares declared columns against live ones.
    #[must_use]
    pub fn between(declared: &[String], live: &[String]) -> Self {
        Self {
            added: difference(declared, live),
            removed: difference(live, declared),
        }
    }

    /// Returns `true` if both column sets match.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
