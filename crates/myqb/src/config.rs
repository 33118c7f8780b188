//! Environment-driven connection configuration.
//!
//! Settings are read once at process start from the environment (a local
//! `.env` file is honored via `dotenvy`). Variable names follow the deployed
//! service's convention: `HOST`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`, with
//! optional `DB_PORT` and `DB_POOL_MAX`.

use crate::error::{DbError, DbResult};
use mysql_async::OptsBuilder;

/// Default MySQL server port.
pub const DEFAULT_PORT: u16 = 3306;

/// Default pool max size.
pub const DEFAULT_POOL_MAX: usize = 16;

/// Connection settings for the database pool.
#[derive(Clone, Debug)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub pool_max: usize,
}

impl DbConfig {
    /// Load configuration from the environment.
    ///
    /// Fails with [`DbError::Configuration`] when a required variable is
    /// missing or a numeric variable does not parse.
    pub fn from_env() -> DbResult<Self> {
        dotenvy::dotenv().ok();
        Ok(Self {
            host: require("HOST")?,
            port: optional_parsed("DB_PORT")?.unwrap_or(DEFAULT_PORT),
            user: require("DB_USER")?,
            password: require("DB_PASSWORD")?,
            database: require("DB_NAME")?,
            pool_max: optional_parsed("DB_POOL_MAX")?.unwrap_or(DEFAULT_POOL_MAX),
        })
    }

    /// Driver options for these settings, without pool tuning applied.
    pub(crate) fn opts(&self) -> OptsBuilder {
        OptsBuilder::default()
            .ip_or_hostname(self.host.clone())
            .tcp_port(self.port)
            .user(Some(self.user.clone()))
            .pass(Some(self.password.clone()))
            .db_name(Some(self.database.clone()))
    }
}

fn require(name: &str) -> DbResult<String> {
    std::env::var(name)
        .map_err(|_| DbError::configuration(format!("missing environment variable {name}")))
}

fn optional_parsed<T: std::str::FromStr>(name: &str) -> DbResult<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| DbError::configuration(format!("invalid value for {name}: {raw}"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serializes env mutation across tests in this module.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn with_var<R>(name: &str, value: Option<&str>, body: impl FnOnce() -> R) -> R {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe {
            match value {
                Some(v) => std::env::set_var(name, v),
                None => std::env::remove_var(name),
            }
        }
        let result = body();
        unsafe {
            std::env::remove_var(name);
        }
        result
    }

    #[test]
    fn test_require_fails_on_missing_variable() {
        let err = with_var("MYQB_TEST_REQUIRED", None, || {
            require("MYQB_TEST_REQUIRED").unwrap_err()
        });
        assert!(err.is_configuration());
        assert!(err.to_string().contains("MYQB_TEST_REQUIRED"));
    }

    #[test]
    fn test_require_returns_set_value() {
        let value = with_var("MYQB_TEST_REQUIRED", Some("db.internal"), || {
            require("MYQB_TEST_REQUIRED").unwrap()
        });
        assert_eq!(value, "db.internal");
    }

    #[test]
    fn test_optional_parsed_unset_is_none() {
        let port = with_var("MYQB_TEST_PORT", None, || {
            optional_parsed::<u16>("MYQB_TEST_PORT").unwrap()
        });
        assert_eq!(port, None);
    }

    #[test]
    fn test_optional_parsed_rejects_non_numeric() {
        let err = with_var("MYQB_TEST_PORT", Some("not-a-port"), || {
            optional_parsed::<u16>("MYQB_TEST_PORT").unwrap_err()
        });
        assert!(err.is_configuration());
        assert!(err.to_string().contains("not-a-port"));
    }

    #[test]
    fn test_optional_parsed_reads_numeric_value() {
        let size = with_var("MYQB_TEST_POOL_MAX", Some("32"), || {
            optional_parsed::<usize>("MYQB_TEST_POOL_MAX").unwrap()
        });
        assert_eq!(size, Some(32));
    }
}
