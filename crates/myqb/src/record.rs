//! Ordered column/value records for INSERT and UPDATE statements.

use mysql_async::Value;

/// An ordered list of column/value pairs.
///
/// Column order is declaration order and drives both the rendered column list
/// and the positional parameters, so two records with the same columns in the
/// same order are shape-compatible for batch inserts.
#[derive(Clone, Debug, Default)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Create a new empty record.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Set a column value.
    ///
    /// `Option` values are accepted directly; `None` becomes SQL `NULL`.
    pub fn set<T: Into<Value>>(mut self, column: &str, value: T) -> Self {
        self.fields.push((column.to_string(), value.into()));
        self
    }

    /// Set an optional column value (`None` => column is skipped entirely).
    ///
    /// Skipping changes the record's shape; do not mix with batch inserts
    /// unless every row skips the same columns.
    pub fn set_opt<T: Into<Value>>(self, column: &str, value: Option<T>) -> Self {
        if let Some(v) = value {
            self.set(column, v)
        } else {
            self
        }
    }

    /// Set a JSON column, serialized to its text form.
    pub fn set_json<T: serde::Serialize>(self, column: &str, value: &T) -> serde_json::Result<Self> {
        let text = serde_json::to_string(value)?;
        Ok(self.set(column, text))
    }

    /// Column names in declaration order.
    pub fn columns(&self) -> Vec<&str> {
        self.fields.iter().map(|(c, _)| c.as_str()).collect()
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no columns.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> From<Vec<(K, V)>> for Record {
    fn from(fields: Vec<(K, V)>) -> Self {
        fields.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_in_declaration_order() {
        let record = Record::new()
            .set("username", "alice")
            .set("email", "alice@example.com")
            .set("links_count", 3i64);
        assert_eq!(record.columns(), vec!["username", "email", "links_count"]);
    }

    #[test]
    fn test_none_value_becomes_null() {
        let record = Record::new().set("deleted_at", Option::<String>::None);
        assert_eq!(record.fields()[0].1, Value::NULL);
    }

    #[test]
    fn test_set_opt_skips_column() {
        let record = Record::new()
            .set("username", "alice")
            .set_opt("location", Option::<String>::None);
        assert_eq!(record.columns(), vec!["username"]);
    }

    #[test]
    fn test_set_json_serializes_to_text() {
        let record = Record::new()
            .set_json("settings", &serde_json::json!({"theme": "dark"}))
            .unwrap();
        assert_eq!(record.fields()[0].1, Value::from(r#"{"theme":"dark"}"#));
    }

    #[test]
    fn test_record_from_pairs() {
        let record: Record = vec![("a", 1i32), ("b", 2i32)].into();
        assert_eq!(record.len(), 2);
        assert_eq!(record.columns(), vec!["a", "b"]);
    }
}
