//! Convenient imports for typical `myqb` usage.
//!
//! This module is intentionally small and focused on the most common APIs so
//! examples can start with:
//!
//! ```ignore
//! use myqb::prelude::*;
//! ```

pub use crate::{
    Condition, DbConfig, DbError, DbResult, ExecOutcome, Executor, Order, PoolExecutor, Record,
    StatementBuilder, delete_batch, statement,
};

pub use crate::{create_pool, create_pool_from_config, create_pool_with_config};

pub use mysql_async::{Pool, Row, Value};
