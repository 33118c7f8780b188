//! Ordered positional parameter storage for rendered statements.

use mysql_async::{Params, Value};

/// An ordered list of positional parameters.
///
/// Each value is bound to a `?` placeholder by left-to-right order in the
/// rendered SQL text, so the list length must always equal the placeholder
/// count of the fragment it was rendered with.
#[derive(Clone, Debug, Default)]
pub struct ParamList {
    values: Vec<Value>,
}

impl ParamList {
    /// Create a new empty parameter list.
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Append a parameter.
    pub fn push<T: Into<Value>>(&mut self, value: T) {
        self.values.push(value.into());
    }

    /// Get the current parameter count.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the collected values in declaration order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Extend this list with another list's parameters.
    pub fn extend(&mut self, other: &ParamList) {
        self.values.extend(other.values.iter().cloned());
    }

    /// Convert into driver parameters for execution.
    pub fn into_params(self) -> Params {
        if self.values.is_empty() {
            Params::Empty
        } else {
            Params::Positional(self.values)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_preserves_order() {
        let mut params = ParamList::new();
        params.push(1i64);
        params.push("two");
        assert_eq!(params.len(), 2);
        assert_eq!(params.values()[0], Value::from(1i64));
        assert_eq!(params.values()[1], Value::from("two"));
    }

    #[test]
    fn test_empty_list_converts_to_empty_params() {
        let params = ParamList::new();
        assert!(matches!(params.into_params(), Params::Empty));
    }

    #[test]
    fn test_into_positional_params() {
        let mut params = ParamList::new();
        params.push(5i32);
        match params.into_params() {
            Params::Positional(values) => assert_eq!(values, vec![Value::from(5i32)]),
            other => panic!("expected positional params, got {other:?}"),
        }
    }

    #[test]
    fn test_extend_appends_in_order() {
        let mut set_values = ParamList::new();
        set_values.push("alice");
        let mut where_values = ParamList::new();
        where_values.push(7i64);
        set_values.extend(&where_values);
        assert_eq!(set_values.values().len(), 2);
        assert_eq!(set_values.values()[1], Value::from(7i64));
    }
}
