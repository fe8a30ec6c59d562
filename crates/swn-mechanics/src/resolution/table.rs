//! Breakpoint tables read by roll total.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A table of ascending breakpoints, each with an entry text.
///
/// A total reads the entry of the highest breakpoint at or below it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LookupTable {
    entries: BTreeMap<i32, String>,
}

impl LookupTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(breakpoint, text)` pairs. Later duplicates win.
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (i32, S)>) -> Self {
        Self {
            entries: pairs.into_iter().map(|(k, v)| (k, v.into())).collect(),
        }
    }

    /// Add or replace a breakpoint.
    pub fn insert(&mut self, breakpoint: i32, text: impl Into<String>) {
        self.entries.insert(breakpoint, text.into());
    }

    /// The highest breakpoint at or below `total`, with its text.
    pub fn lookup(&self, total: i32) -> Option<(i32, &str)> {
        self.entries
            .range(..=total)
            .next_back()
            .map(|(k, v)| (*k, v.as_str()))
    }

    /// Number of breakpoints.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no breakpoints.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The standard 2d6 NPC reaction table.
    pub fn reaction() -> Self {
        Self::from_pairs([
            (2, "Hostile, reacting as badly as is plausible"),
            (3, "Negative, unfriendly and unhelpful"),
            (6, "Neutral, reacting predictably or warily"),
            (9, "Positive, potentially cooperative"),
            (12, "Friendly, helpful as is plausible"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_between_breakpoints() {
        let table = LookupTable::from_pairs([(1, "A"), (5, "B"), (10, "C")]);
        assert_eq!(table.lookup(1), Some((1, "A")));
        assert_eq!(table.lookup(4), Some((1, "A")));
        assert_eq!(table.lookup(7), Some((5, "B")));
        assert_eq!(table.lookup(100), Some((10, "C")));
        assert_eq!(table.lookup(0), None);
    }

    #[test]
    fn empty_table() {
        let table = LookupTable::new();
        assert!(table.is_empty());
        assert_eq!(table.lookup(5), None);
    }

    #[test]
    fn insert_replaces() {
        let mut table = LookupTable::from_pairs([(3, "old")]);
        table.insert(3, "new");
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup(3), Some((3, "new")));
    }

    #[test]
    fn reaction_table_extremes() {
        let table = LookupTable::reaction();
        assert!(table.lookup(2).unwrap().1.starts_with("Hostile"));
        assert!(table.lookup(7).unwrap().1.starts_with("Neutral"));
        assert!(table.lookup(12).unwrap().1.starts_with("Friendly"));
    }

    #[test]
    fn json_keys_round_trip() {
        let table = LookupTable::from_pairs([(1, "A"), (2, "B")]);
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"1":"A","2":"B"}"#);
        let back: LookupTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }
}
