//! Raw input rows as seen before field mapping.
//!
//! A [`RawRow`] is an explicit label-to-cell-text mapping: whatever labels
//! the upstream spreadsheet header or JSON object carried, with cell values
//! already rendered as strings. Absent cells are simply absent keys; the
//! pipeline never sees placeholder values for them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow(BTreeMap<String, String>);

impl RawRow {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.0.insert(label.into(), value.into());
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.0.get(label).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every cell is empty after trimming; such rows are
    /// discarded before they reach the pipeline.
    pub fn is_blank(&self) -> bool {
        self.0.values().all(|v| v.trim().is_empty())
    }
}

impl FromIterator<(String, String)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[(&str, &str); N]> for RawRow {
    fn from(pairs: [(&str, &str); N]) -> Self {
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_detection_ignores_whitespace_cells() {
        let row = RawRow::from([("name", "  "), ("id", "")]);
        assert!(row.is_blank());

        let row = RawRow::from([("name", "  x ")]);
        assert!(!row.is_blank());
    }

    #[test]
    fn round_trips_through_json() {
        let row = RawRow::from([("学号", "2024001"), ("姓名", "张三")]);
        let json = serde_json::to_string(&row).expect("serialize row");
        let back: RawRow = serde_json::from_str(&json).expect("deserialize row");
        assert_eq!(row, back);
    }
}
