//! sqlshim - a bounded query executor.
//!
//! Wraps connection acquisition, statement preparation, parameter binding,
//! row mapping and resource cleanup behind two calls: queries, which map
//! rows and enforce a row ceiling, and updates, which report an
//! affected-row count.
//!
//! # Feature Flags
//!
//! - `sqlite` (default): SQLite driver adapter using `rusqlite`
//! - `pool`: SQLite provider backed by an `r2d2` pool
//! - `mock`: scriptable in-memory driver for tests
//!
//! # Examples
//!
//! ```no_run
//! # #[cfg(feature = "sqlite")]
//! # fn main() -> Result<(), sqlshim::ExecutorError> {
//! use std::sync::Arc;
//!
//! use sqlshim::sqlite::SqliteProvider;
//! use sqlshim::{Executor, QueryOperation};
//!
//! let executor = Executor::new("app", Arc::new(SqliteProvider::open("app.db")))?;
//! let op = QueryOperation::new(
//!     "SELECT id FROM t WHERE id = ?",
//!     |p| p.bind(1, 42),
//!     |row| row.get::<i64>("id"),
//! )?;
//! let id: Option<i64> = executor.execute_query_unique(&op)?;
//! # let _ = id;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "sqlite"))]
//! # fn main() {}
//! ```

mod executor;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use executor::Executor;

pub use sqlshim_core::driver::{
    ColumnIndex, Connection, ConnectionProvider, Cursor, FromValue, Parameters, Row, Statement,
    Value,
};
pub use sqlshim_core::operation::{Command, Operation, QueryOperation, UpdateOperation};
pub use sqlshim_core::{
    BindError, DriverError, DriverResult, ExecutorConfig, ExecutorError, ParseError, Result,
    DEFAULT_QUERY_LIMIT, SLOW_ACQUIRE_THRESHOLD,
};
