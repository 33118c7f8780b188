//! WHERE condition groups and rendering.
//!
//! A [`Condition`] is one AND-joined group of `column = ?` equality checks,
//! kept in declaration order. [`IntoWhere`] lets the builder accept either a
//! single group, a sequence of groups (joined by OR), or an `Option` of
//! either, where `None` is a no-op that leaves prior where state untouched.

use crate::param::ParamList;
use mysql_async::Value;

/// One AND-joined group of `column = ?` conditions, in declaration order.
///
/// # Example
/// ```ignore
/// let cond = Condition::new().eq("status", "active").eq("role", "admin");
/// // renders: status = ? AND role = ?  with values ["active", "admin"]
/// ```
#[derive(Clone, Debug, Default)]
pub struct Condition {
    fields: Vec<(String, Value)>,
}

impl Condition {
    /// Create a new empty condition group.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Add an equality check: `column = ?`.
    pub fn eq<T: Into<Value>>(mut self, column: &str, value: T) -> Self {
        self.fields.push((column.to_string(), value.into()));
        self
    }

    /// Check if the group has no conditions.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of conditions in the group.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub(crate) fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Condition {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> From<Vec<(K, V)>> for Condition {
    fn from(fields: Vec<(K, V)>) -> Self {
        fields.into_iter().collect()
    }
}

/// Input accepted by `StatementBuilder::where_`.
pub trait IntoWhere {
    /// Convert into a sequence of OR-joined condition groups.
    fn into_groups(self) -> Vec<Condition>;
}

impl IntoWhere for Condition {
    fn into_groups(self) -> Vec<Condition> {
        vec![self]
    }
}

impl IntoWhere for Vec<Condition> {
    fn into_groups(self) -> Vec<Condition> {
        self
    }
}

impl<W: IntoWhere> IntoWhere for Option<W> {
    fn into_groups(self) -> Vec<Condition> {
        match self {
            Some(inner) => inner.into_groups(),
            None => Vec::new(),
        }
    }
}

/// Render condition groups into a `WHERE ...` fragment plus its values.
///
/// Fields within a group are joined by AND; groups are joined by OR with no
/// per-group parentheses (a flat OR of ANDs). Values are collected group by
/// group, field order within each group. Empty groups contribute nothing; if
/// every group is empty the fragment is empty.
pub(crate) fn render_where(groups: &[Condition]) -> (String, ParamList) {
    let mut params = ParamList::new();
    let mut rendered = Vec::new();

    for group in groups.iter().filter(|g| !g.is_empty()) {
        let parts: Vec<String> = group
            .fields()
            .iter()
            .map(|(column, _)| format!("{column} = ?"))
            .collect();
        for (_, value) in group.fields() {
            params.push(value.clone());
        }
        rendered.push(parts.join(" AND "));
    }

    if rendered.is_empty() {
        return (String::new(), params);
    }
    (format!("WHERE {}", rendered.join(" OR ")), params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_group_joined_by_and() {
        let cond = Condition::new().eq("user_id", 5i64).eq("status", "active");
        let (clause, params) = render_where(&cond.into_groups());
        assert_eq!(clause, "WHERE user_id = ? AND status = ?");
        assert_eq!(
            params.values(),
            &[Value::from(5i64), Value::from("active")]
        );
    }

    #[test]
    fn test_placeholder_count_matches_field_count() {
        let cond = Condition::new().eq("a", 1i32).eq("b", 2i32).eq("c", 3i32);
        let (clause, params) = render_where(&cond.into_groups());
        assert_eq!(clause.matches('?').count(), params.len());
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_groups_joined_by_or_flat() {
        let groups = vec![
            Condition::new().eq("role", "admin").eq("active", true),
            Condition::new().eq("role", "owner"),
        ];
        let (clause, params) = render_where(&groups);
        assert_eq!(clause, "WHERE role = ? AND active = ? OR role = ?");
        assert_eq!(
            params.values(),
            &[
                Value::from("admin"),
                Value::from(true),
                Value::from("owner")
            ]
        );
    }

    #[test]
    fn test_values_flattened_group_major() {
        let groups = vec![
            Condition::new().eq("a", 1i32).eq("b", 2i32),
            Condition::new().eq("c", 3i32),
        ];
        let (_, params) = render_where(&groups);
        assert_eq!(
            params.values(),
            &[Value::from(1i32), Value::from(2i32), Value::from(3i32)]
        );
    }

    #[test]
    fn test_empty_groups_render_nothing() {
        let (clause, params) = render_where(&[]);
        assert!(clause.is_empty());
        assert!(params.is_empty());

        let (clause, _) = render_where(&[Condition::new()]);
        assert!(clause.is_empty());
    }

    #[test]
    fn test_condition_from_pairs() {
        let cond: Condition = vec![("id", 1i64)].into();
        let (clause, _) = render_where(&cond.into_groups());
        assert_eq!(clause, "WHERE id = ?");
    }

    #[test]
    fn test_option_none_yields_no_groups() {
        let groups = None::<Condition>.into_groups();
        assert!(groups.is_empty());
    }
}
