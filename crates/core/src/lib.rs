//! Core types for sqlshim.
//!
//! Everything in this crate is free of I/O: operation definitions, the
//! traits a database driver implements, SQL values, error types, executor
//! configuration, and the bounded row collection logic. The executor and
//! the concrete drivers live in the `sqlshim` crate.

pub mod config;
pub mod driver;
pub mod error;
pub mod operation;

pub use config::{ExecutorConfig, DEFAULT_QUERY_LIMIT, SLOW_ACQUIRE_THRESHOLD};
pub use error::{BindError, DriverError, DriverResult, ExecutorError, ParseError, Result};
