//! Ordered column-to-value mappings.

use rusqlite::types::Value;
use std::fmt::{Debug, Formatter};

/// Reads one column value out of an entity.
pub type ValueExtractor<T> = fn(&T) -> Value;

/// Ordered `(column name, extractor)` pairs for one entity type.
///
/// Order is significant: it is both the column order of the generated insert
/// statement and the positional bind order of its parameters.
pub struct ColumnMapping<T> {
    columns: Vec<(String, ValueExtractor<T>)>,
}

impl<T> ColumnMapping<T> {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Appends a column after the ones already mapped.
    pub fn column(mut self, name: impl Into<String>, extract: ValueExtractor<T>) -> Self {
        self.columns.push((name.into(), extract));
        self
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names in mapping order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Extracted values of `entity`, in mapping order.
    pub fn values<'a>(&'a self, entity: &'a T) -> impl Iterator<Item = Value> + 'a {
        self.columns.iter().map(move |(_, extract)| extract(entity))
    }
}

impl<T> Default for ColumnMapping<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ColumnMapping<T> {
    fn clone(&self) -> Self {
        Self {
            columns: self.columns.clone(),
        }
    }
}

impl<T> Debug for ColumnMapping<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::ColumnMapping;
    use rusqlite::types::Value;

    struct Point {
        x: i64,
        label: Option<String>,
    }

    fn point_columns() -> ColumnMapping<Point> {
        ColumnMapping::new()
            .column("x", |point: &Point| Value::Integer(point.x))
            .column("label", |point: &Point| point.label.clone().into())
    }

    #[test]
    fn names_and_values_follow_insertion_order() {
        let columns = point_columns();
        let point = Point {
            x: 4,
            label: Some("four".to_string()),
        };

        assert_eq!(columns.names().collect::<Vec<_>>(), vec!["x", "label"]);
        assert_eq!(
            columns.values(&point).collect::<Vec<_>>(),
            vec![Value::Integer(4), Value::Text("four".to_string())]
        );
    }

    #[test]
    fn absent_optional_value_extracts_as_null() {
        let point = Point { x: 1, label: None };
        let values = point_columns().values(&point).collect::<Vec<_>>();
        assert_eq!(values[1], Value::Null);
    }

    #[test]
    fn debug_lists_column_names() {
        assert_eq!(format!("{:?}", point_columns()), r#"["x", "label"]"#);
    }
}
