//! Fluent statement builder.
//!
//! [`StatementBuilder`] accumulates clause fragments through chained calls and
//! renders them into SQL text plus a positional parameter list when a terminal
//! operation runs. Rendering is pure (`state -> (sql, params)`); execution is
//! delegated to an injected [`Executor`].
//!
//! A builder is single-use per logical statement. Nothing blocks calling a
//! terminal operation twice, but the second call re-renders from the
//! accumulated (possibly stale) state - obtain a fresh builder per statement.
//!
//! # Example
//! ```ignore
//! use myqb::{statement, Condition, Order};
//!
//! let rows = statement()
//!     .select("user_id, username")
//!     .from("users")
//!     .where_(Condition::new().eq("status", "active"))
//!     .order_by("username", Order::Asc)
//!     .limit(20)
//!     .get(&pool)
//!     .await?;
//! ```

use crate::condition::{Condition, IntoWhere, render_where};
use crate::error::{DbError, DbResult};
use crate::executor::{ExecOutcome, Executor};
use crate::param::ParamList;
use crate::record::Record;
use futures_util::future::join_all;
use mysql_async::{Row, Value};
use std::fmt;

/// Sort direction for `order_by`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Order::Asc => f.write_str("ASC"),
            Order::Desc => f.write_str("DESC"),
        }
    }
}

/// Create a fresh statement builder.
pub fn statement() -> StatementBuilder {
    StatementBuilder::new()
}

/// Stateful, chainable statement-assembly engine.
///
/// Config setters consume and return the builder; terminal operations render
/// the accumulated state and submit it through an [`Executor`]. Clause
/// fragments are only ever added or overwritten, never individually cleared.
#[derive(Clone, Debug, Default)]
pub struct StatementBuilder {
    /// Projection list or `*`, possibly aliased
    columns: String,
    /// Target table
    table: String,
    /// Rendered `WHERE ...` fragment or empty
    where_clause: String,
    /// Positional values matching `?` placeholders in `where_clause`
    where_values: ParamList,
    /// Rendered `LIMIT n` fragment or empty
    limit_value: String,
    /// Rendered `ORDER BY col dir` fragment or empty
    order_by_value: String,
    /// Rendered `UNION (...)` fragment or empty
    union_query: String,
    /// Rendered `UNION ALL (...)` fragment or empty
    union_all_query: String,
    /// Rendered `MAX(col)` fragment or empty
    max_column: String,
    /// Rendered `EXISTS (...)` fragment or empty
    exists_query: String,
    /// Rendered `NOT EXISTS (...)` fragment or empty
    not_exists_query: String,
    /// Staged rows for `insert_batch_get_id`
    insert_batch_data: Vec<Record>,
}

impl StatementBuilder {
    /// Create a new builder with an empty table and `*` projection.
    pub fn new() -> Self {
        Self {
            columns: "*".to_string(),
            ..Self::default()
        }
    }

    // ==================== Config setters ====================

    /// Set the projection; a single column name or a comma-joined list.
    ///
    /// Surrounding whitespace is trimmed. Blank input keeps the current
    /// projection (default `*`).
    pub fn select(mut self, columns: &str) -> Self {
        let trimmed = columns.trim();
        if !trimmed.is_empty() {
            self.columns = trimmed.to_string();
        }
        self
    }

    /// Append ` AS alias` to the current projection.
    pub fn alias(mut self, alias: &str) -> Self {
        self.columns = format!("{} AS {}", self.columns, alias);
        self
    }

    /// Set the target table.
    pub fn from(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    /// Set the target table; alias of [`from`](Self::from) conventionally
    /// used before mutating statements (`in` is a reserved word).
    pub fn in_table(self, table: &str) -> Self {
        self.from(table)
    }

    /// Set the WHERE clause from one or more condition groups.
    ///
    /// Accepts a single [`Condition`] (AND-joined), a `Vec<Condition>`
    /// (groups OR-joined, flat), or an `Option` of either. `None` or empty
    /// input is a no-op that leaves any existing where state untouched.
    /// Non-empty input overwrites the clause and its values together.
    pub fn where_<W: IntoWhere>(mut self, conditions: W) -> Self {
        let groups = conditions.into_groups();
        let (clause, values) = render_where(&groups);
        if !clause.is_empty() {
            self.where_clause = clause;
            self.where_values = values;
        }
        self
    }

    /// Set `ORDER BY column direction`.
    pub fn order_by(mut self, column: &str, order: Order) -> Self {
        self.order_by_value = format!("ORDER BY {column} {order}");
        self
    }

    /// Set `LIMIT n`.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit_value = format!("LIMIT {limit}");
        self
    }

    /// Shorthand for `limit(1)`.
    pub fn first(self) -> Self {
        self.limit(1)
    }

    /// Shorthand for `ORDER BY id DESC` plus `LIMIT 1`.
    ///
    /// The ordering key is the column literally named `id`.
    pub fn last(mut self) -> Self {
        self.order_by_value = "ORDER BY id DESC".to_string();
        self.limit(1)
    }

    /// Wrap raw SQL text in `UNION (...)`.
    pub fn union(mut self, query: &str) -> Self {
        self.union_query = format!("UNION ({query})");
        self
    }

    /// Wrap raw SQL text in `UNION ALL (...)`.
    pub fn union_all(mut self, query: &str) -> Self {
        self.union_all_query = format!("UNION ALL ({query})");
        self
    }

    /// Set the aggregate fragment `MAX(column)` for [`max_get`](Self::max_get).
    pub fn max(mut self, column: &str) -> Self {
        self.max_column = format!("MAX({column})");
        self
    }

    /// Wrap raw SQL text in `EXISTS (...)`.
    ///
    /// The subquery must be fully self-contained; table and WHERE context of
    /// this builder are not added.
    pub fn exists(mut self, sub_query: &str) -> Self {
        self.exists_query = format!("EXISTS ({sub_query})");
        self
    }

    /// Wrap raw SQL text in `NOT EXISTS (...)`.
    pub fn not_exists(mut self, sub_query: &str) -> Self {
        self.not_exists_query = format!("NOT EXISTS ({sub_query})");
        self
    }

    /// Stage rows for [`insert_batch_get_id`](Self::insert_batch_get_id).
    pub fn stage(mut self, records: Vec<Record>) -> Self {
        self.insert_batch_data = records;
        self
    }

    // ==================== Rendering ====================

    fn require_table(&self) -> DbResult<()> {
        if self.table.is_empty() {
            return Err(DbError::configuration(
                "no table set; call from() or in_table() first",
            ));
        }
        Ok(())
    }

    /// Render the SELECT statement from the accumulated state.
    ///
    /// Clause order is fixed regardless of call order: WHERE, ORDER BY,
    /// LIMIT, UNION, UNION ALL. Empty fragments are omitted.
    fn build_select(&self) -> (String, ParamList) {
        let mut sql = format!("SELECT {} FROM {}", self.columns, self.table);
        for fragment in [
            &self.where_clause,
            &self.order_by_value,
            &self.limit_value,
            &self.union_query,
            &self.union_all_query,
        ] {
            if !fragment.is_empty() {
                sql.push(' ');
                sql.push_str(fragment);
            }
        }
        (sql, self.where_values.clone())
    }

    fn build_insert(&self, record: &Record) -> DbResult<(String, ParamList)> {
        self.require_table()?;
        if record.is_empty() {
            return Err(DbError::configuration(
                "insert requires at least one column",
            ));
        }
        let columns = record.columns();
        let placeholders = vec!["?"; columns.len()].join(", ");
        let mut params = ParamList::new();
        for (_, value) in record.fields() {
            params.push(value.clone());
        }
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            columns.join(", "),
            placeholders
        );
        Ok((sql, params))
    }

    /// Render a multi-row insert: column list from the first record, one
    /// parenthesized placeholder group per record, values flattened row-major.
    fn build_insert_batch(&self, records: &[Record]) -> DbResult<(String, ParamList)> {
        self.require_table()?;
        let first = records.first().ok_or_else(|| {
            DbError::configuration("insert_batch requires at least one record")
        })?;
        if first.is_empty() {
            return Err(DbError::configuration(
                "insert_batch requires at least one column",
            ));
        }
        let columns = first.columns();
        let group = format!("({})", vec!["?"; columns.len()].join(", "));

        let mut params = ParamList::new();
        let mut groups = Vec::with_capacity(records.len());
        for (row, record) in records.iter().enumerate() {
            let found = record.columns();
            if found != columns {
                return Err(DbError::shape_mismatch(row, &columns, &found));
            }
            for (_, value) in record.fields() {
                params.push(value.clone());
            }
            groups.push(group.as_str());
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            self.table,
            columns.join(", "),
            groups.join(", ")
        );
        Ok((sql, params))
    }

    fn build_update(&self, record: &Record) -> DbResult<(String, ParamList)> {
        self.require_table()?;
        if record.is_empty() {
            return Err(DbError::configuration(
                "update requires at least one SET column",
            ));
        }
        let set_parts: Vec<String> = record
            .columns()
            .iter()
            .map(|column| format!("{column} = ?"))
            .collect();

        // SET values first, WHERE values after.
        let mut params = ParamList::new();
        for (_, value) in record.fields() {
            params.push(value.clone());
        }
        params.extend(&self.where_values);

        let mut sql = format!("UPDATE {} SET {}", self.table, set_parts.join(", "));
        if !self.where_clause.is_empty() {
            sql.push(' ');
            sql.push_str(&self.where_clause);
        }
        Ok((sql, params))
    }

    fn build_delete(&self) -> DbResult<(String, ParamList)> {
        self.require_table()?;
        if self.where_clause.is_empty() {
            return Err(DbError::configuration(
                "delete requires where conditions; pass them via where_()",
            ));
        }
        let sql = format!("DELETE FROM {} {}", self.table, self.where_clause);
        Ok((sql, self.where_values.clone()))
    }

    fn build_max(&self) -> DbResult<String> {
        self.require_table()?;
        if self.max_column.is_empty() {
            return Err(DbError::configuration("max_get requires max() to be set"));
        }
        Ok(format!("SELECT {} FROM {}", self.max_column, self.table))
    }

    /// Get the rendered SELECT SQL (for debugging).
    pub fn to_sql(&self) -> String {
        self.build_select().0
    }

    /// Current WHERE parameter values, in placeholder order.
    pub fn params(&self) -> &[Value] {
        self.where_values.values()
    }

    // ==================== Terminal operations ====================

    /// Execute the accumulated SELECT and return the row set.
    pub async fn get(&self, conn: &impl Executor) -> DbResult<Vec<Row>> {
        self.require_table()?;
        let (sql, params) = self.build_select();
        conn.query(&sql, params.into_params()).await
    }

    /// Insert one record; column list and values follow the record's
    /// declaration order.
    pub async fn insert(&self, record: &Record, conn: &impl Executor) -> DbResult<ExecOutcome> {
        let (sql, params) = self.build_insert(record)?;
        conn.execute(&sql, params.into_params()).await
    }

    /// Insert many records with a single multi-row VALUES clause.
    ///
    /// Records whose columns differ from the first record's (set or order)
    /// fail fast with [`DbError::ShapeMismatch`] instead of emitting
    /// misaligned SQL.
    pub async fn insert_batch(
        &self,
        records: &[Record],
        conn: &impl Executor,
    ) -> DbResult<ExecOutcome> {
        let (sql, params) = self.build_insert_batch(records)?;
        conn.execute(&sql, params.into_params()).await
    }

    /// Insert the staged batch (see [`stage`](Self::stage)) and return the
    /// driver-reported identifier of the first inserted row.
    pub async fn insert_batch_get_id(&self, conn: &impl Executor) -> DbResult<Option<u64>> {
        if self.insert_batch_data.is_empty() {
            return Err(DbError::configuration(
                "insert_batch_get_id requires staged records; call stage() first",
            ));
        }
        let (sql, params) = self.build_insert_batch(&self.insert_batch_data)?;
        let outcome = conn.execute(&sql, params.into_params()).await?;
        Ok(outcome.last_insert_id)
    }

    /// Update rows matching the accumulated WHERE state.
    ///
    /// Without a prior `where_()` the statement is unconditioned and updates
    /// every row - guarding against that is the caller's responsibility.
    pub async fn update(&self, record: &Record, conn: &impl Executor) -> DbResult<ExecOutcome> {
        let (sql, params) = self.build_update(record)?;
        conn.execute(&sql, params.into_params()).await
    }

    /// Delete rows matching the accumulated WHERE state.
    ///
    /// Reuses the same rendered clause and values as [`get`](Self::get). A
    /// missing WHERE fails with a configuration error rather than deleting
    /// every row.
    pub async fn delete(&self, conn: &impl Executor) -> DbResult<ExecOutcome> {
        let (sql, params) = self.build_delete()?;
        conn.execute(&sql, params.into_params()).await
    }

    /// Execute `SELECT MAX(col) FROM table`, no parameters.
    pub async fn max_get(&self, conn: &impl Executor) -> DbResult<Vec<Row>> {
        let sql = self.build_max()?;
        conn.query(&sql, ParamList::new().into_params()).await
    }

    /// Execute `SELECT EXISTS (...)`, no parameters.
    ///
    /// The subquery passed to [`exists`](Self::exists) runs as-is; this
    /// builder's table and WHERE state are not included.
    pub async fn exists_get(&self, conn: &impl Executor) -> DbResult<Vec<Row>> {
        if self.exists_query.is_empty() {
            return Err(DbError::configuration(
                "exists_get requires exists() to be set",
            ));
        }
        let sql = format!("SELECT {}", self.exists_query);
        conn.query(&sql, ParamList::new().into_params()).await
    }

    /// Execute `SELECT NOT EXISTS (...)`, no parameters.
    pub async fn not_exists_get(&self, conn: &impl Executor) -> DbResult<Vec<Row>> {
        if self.not_exists_query.is_empty() {
            return Err(DbError::configuration(
                "not_exists_get requires not_exists() to be set",
            ));
        }
        let sql = format!("SELECT {}", self.not_exists_query);
        conn.query(&sql, ParamList::new().into_params()).await
    }
}

/// Delete concurrently: one DELETE per condition group, all dispatched at
/// once and joined.
///
/// Results are ordered as the input. If any delete fails the whole call fails
/// with [`DbError::Aggregate`] carrying every individual failure; deletes that
/// were already issued are not rolled back (no transaction wraps them).
pub async fn delete_batch(
    conn: &impl Executor,
    table: &str,
    conditions: Vec<Condition>,
) -> DbResult<Vec<ExecOutcome>> {
    let deletes = conditions.into_iter().map(|condition| {
        let stmt = StatementBuilder::new().in_table(table).where_(condition);
        async move { stmt.delete(conn).await }
    });

    let mut outcomes = Vec::new();
    let mut failures = Vec::new();
    for result in join_all(deletes).await {
        match result {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) => failures.push(err),
        }
    }
    if failures.is_empty() {
        Ok(outcomes)
    } else {
        Err(DbError::Aggregate(failures))
    }
}
