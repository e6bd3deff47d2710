//! Label interning shared by vertex (service) and edge (operation) labels.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A simple string-to-int table: each label is assigned a new integer the
/// first time it is seen, in insertion order. Used for both `vLabels` and
/// `eLabels`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelTable {
    by_label: HashMap<String, i64>,
}

impl LabelTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the integer assigned to `label`, assigning a new one (equal
    /// to the table's current size) if this is the first time it is seen.
    pub fn intern(&mut self, label: &str) -> i64 {
        if let Some(&index) = self.by_label.get(label) {
            return index;
        }
        let index = i64::try_from(self.by_label.len()).unwrap_or(i64::MAX);
        self.by_label.insert(label.to_string(), index);
        index
    }

    /// Returns the integer assigned to `label`, if any, without assigning
    /// a new one.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<i64> {
        self.by_label.get(label).copied()
    }

    /// Builds the reverse (index to label) map.
    #[must_use]
    pub fn reverse(&self) -> HashMap<i64, String> {
        self.by_label
            .iter()
            .map(|(label, &index)| (index, label.clone()))
            .collect()
    }

    /// The number of distinct labels interned so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    /// Returns true if no labels have been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_assigns_stable_indices() {
        let mut table = LabelTable::new();
        assert_eq!(table.intern("frontend"), 0);
        assert_eq!(table.intern("cartservice"), 1);
        assert_eq!(table.intern("frontend"), 0);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn reverse_is_inverse_of_intern() {
        let mut table = LabelTable::new();
        let a = table.intern("a");
        let b = table.intern("b");
        let reverse = table.reverse();
        assert_eq!(reverse.get(&a).map(String::as_str), Some("a"));
        assert_eq!(reverse.get(&b).map(String::as_str), Some("b"));
    }
}
