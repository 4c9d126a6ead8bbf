//! In-memory dataset model shared by readers, writers and the generalizer.

use std::collections::BTreeMap;

use serde_json::Value;

/// A single record, keyed by column name.
///
/// Cells missing from a short CSV row or a sparse JSON record are simply
/// absent from the map.
pub type Row = BTreeMap<String, Value>;

/// Ordered columns plus ordered rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    /// Register a column if not already present, keeping first-seen order.
    pub fn observe_column(&mut self, name: &str) {
        if !self.has_column(name) {
            self.columns.push(name.to_string());
        }
    }

    /// Append a row, registering any columns it introduces.
    pub fn push_row(&mut self, row: Row) {
        for key in row.keys() {
            if !self.has_column(key) {
                self.columns.push(key.clone());
            }
        }
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_push_row_tracks_columns_in_first_seen_order() {
        let mut dataset = Dataset::new(vec!["id".to_string()]);
        dataset.push_row(row(&[("id", json!(1)), ("zip", json!("10115"))]));
        dataset.push_row(row(&[("id", json!(2)), ("age", json!(34))]));

        assert_eq!(dataset.columns(), ["id", "zip", "age"]);
        assert_eq!(dataset.len(), 2);
        assert!(dataset.has_column("age"));
        assert!(!dataset.has_column("name"));
    }

    #[test]
    fn test_observe_column_is_idempotent() {
        let mut dataset = Dataset::default();
        dataset.observe_column("a");
        dataset.observe_column("a");
        assert_eq!(dataset.columns(), ["a"]);
        assert!(dataset.is_empty());
    }
}
