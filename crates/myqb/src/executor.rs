//! Executor trait for submitting rendered statements to the database.
//!
//! The builder never talks to the driver directly: every terminal operation
//! takes an `&impl Executor`, which keeps the builder testable in isolation
//! and lets callers choose between the plain pool and [`PoolExecutor`] with a
//! pass-through statement timeout.

use crate::error::{DbError, DbResult};
use mysql_async::prelude::Queryable;
use mysql_async::{Params, Pool, Row};
use std::time::{Duration, Instant};

/// Driver-reported outcome of a mutating statement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecOutcome {
    /// Number of rows the statement affected.
    pub affected_rows: u64,
    /// Identifier of the first row inserted by the statement, if any.
    pub last_insert_id: Option<u64>,
}

/// A trait that turns `(sql, params)` into rows or driver metadata.
///
/// Implementations check a connection out of a shared pool per statement and
/// hand it back on completion; acquisition suspends the caller when the pool
/// is exhausted.
pub trait Executor: Send + Sync {
    /// Execute a query and return all rows.
    fn query(
        &self,
        sql: &str,
        params: Params,
    ) -> impl std::future::Future<Output = DbResult<Vec<Row>>> + Send;

    /// Execute a mutating statement and return affected rows plus the
    /// driver-reported insert id.
    fn execute(
        &self,
        sql: &str,
        params: Params,
    ) -> impl std::future::Future<Output = DbResult<ExecOutcome>> + Send;
}

async fn pool_query(pool: &Pool, sql: &str, params: Params) -> DbResult<Vec<Row>> {
    let started = Instant::now();
    let mut conn = pool.get_conn().await.map_err(DbError::from_db_error)?;
    let rows: Vec<Row> = conn
        .exec(sql, params)
        .await
        .map_err(DbError::from_db_error)?;
    tracing::debug!(
        sql,
        rows = rows.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "query executed"
    );
    Ok(rows)
}

async fn pool_execute(pool: &Pool, sql: &str, params: Params) -> DbResult<ExecOutcome> {
    let started = Instant::now();
    let mut conn = pool.get_conn().await.map_err(DbError::from_db_error)?;
    let result = conn
        .exec_iter(sql, params)
        .await
        .map_err(DbError::from_db_error)?;
    let outcome = ExecOutcome {
        affected_rows: result.affected_rows(),
        last_insert_id: result.last_insert_id(),
    };
    result.drop_result().await.map_err(DbError::from_db_error)?;
    tracing::debug!(
        sql,
        affected_rows = outcome.affected_rows,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "statement executed"
    );
    Ok(outcome)
}

impl Executor for Pool {
    async fn query(&self, sql: &str, params: Params) -> DbResult<Vec<Row>> {
        pool_query(self, sql, params).await
    }

    async fn execute(&self, sql: &str, params: Params) -> DbResult<ExecOutcome> {
        pool_execute(self, sql, params).await
    }
}

/// Executor wrapper with an optional max statement duration.
///
/// The default inner executor is the pool; the timeout covers one statement
/// round trip. When it fires against a pool the checked-out connection is
/// dropped mid-stream and the pool discards it.
pub struct PoolExecutor<E = Pool> {
    inner: E,
    statement_timeout: Option<Duration>,
}

impl<E: Executor> PoolExecutor<E> {
    /// Wrap an executor with no statement timeout.
    pub fn wrap(inner: E) -> Self {
        Self {
            inner,
            statement_timeout: None,
        }
    }

    /// Set the max duration a single statement may take.
    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = Some(timeout);
        self
    }
}

impl PoolExecutor<Pool> {
    /// Wrap a pool with no statement timeout.
    pub fn new(pool: Pool) -> Self {
        Self::wrap(pool)
    }

    /// Access the underlying pool.
    pub fn pool(&self) -> &Pool {
        &self.inner
    }

    /// Close the pool, waiting for checked-out connections to finish.
    pub async fn disconnect(self) -> DbResult<()> {
        self.inner
            .disconnect()
            .await
            .map_err(DbError::from_db_error)
    }
}

impl<E: Executor> Executor for PoolExecutor<E> {
    async fn query(&self, sql: &str, params: Params) -> DbResult<Vec<Row>> {
        match self.statement_timeout {
            Some(limit) => tokio::time::timeout(limit, self.inner.query(sql, params))
                .await
                .map_err(|_| DbError::Timeout(limit))?,
            None => self.inner.query(sql, params).await,
        }
    }

    async fn execute(&self, sql: &str, params: Params) -> DbResult<ExecOutcome> {
        match self.statement_timeout {
            Some(limit) => tokio::time::timeout(limit, self.inner.execute(sql, params))
                .await
                .map_err(|_| DbError::Timeout(limit))?,
            None => self.inner.execute(sql, params).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts submissions; stalls forever once the configured number of
    /// statements has gone out.
    struct StallingExecutor {
        submitted: AtomicUsize,
        stall_after: usize,
    }

    impl StallingExecutor {
        fn new(stall_after: usize) -> Self {
            Self {
                submitted: AtomicUsize::new(0),
                stall_after,
            }
        }

        async fn submit(&self) -> DbResult<()> {
            let seen = self.submitted.fetch_add(1, Ordering::SeqCst);
            if seen >= self.stall_after {
                std::future::pending::<()>().await;
            }
            Ok(())
        }

        fn submitted(&self) -> usize {
            self.submitted.load(Ordering::SeqCst)
        }
    }

    impl Executor for StallingExecutor {
        async fn query(&self, _sql: &str, _params: Params) -> DbResult<Vec<Row>> {
            self.submit().await?;
            Ok(Vec::new())
        }

        async fn execute(&self, _sql: &str, _params: Params) -> DbResult<ExecOutcome> {
            self.submit().await?;
            Ok(ExecOutcome::default())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_surfaces_without_issuing_further_statements() {
        let exec = PoolExecutor::wrap(StallingExecutor::new(0))
            .with_statement_timeout(Duration::from_millis(5));

        let err = exec.query("SELECT 1", Params::Empty).await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(exec.inner.submitted(), 1);

        let err = exec.execute("DELETE FROM t WHERE id = 1", Params::Empty)
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(exec.inner.submitted(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_statement_under_limit_passes_through() {
        let exec = PoolExecutor::wrap(StallingExecutor::new(1))
            .with_statement_timeout(Duration::from_millis(5));

        let rows = exec.query("SELECT 1", Params::Empty).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_no_timeout_configured_delegates_untouched() {
        let exec = PoolExecutor::wrap(StallingExecutor::new(1));
        let outcome = exec.execute("UPDATE t SET a = 1", Params::Empty).await.unwrap();
        assert_eq!(outcome, ExecOutcome::default());
        assert_eq!(exec.inner.submitted(), 1);
    }
}
