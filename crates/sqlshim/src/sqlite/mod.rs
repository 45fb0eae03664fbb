//! SQLite driver adapter.
//!
//! This module implements the driver traits from `sqlshim_core::driver`
//! on top of `rusqlite`. Connections come either straight from a database
//! file or shared in-memory database ([`SqliteProvider`]), or from an
//! external `r2d2` pool ([`SqlitePoolProvider`], `pool` feature).

mod connection;
mod conversions;
mod error;
mod provider;

pub use connection::{SqliteConnection, SqliteCursor, SqliteStatement};
#[cfg(feature = "pool")]
pub use provider::SqlitePoolProvider;
pub use provider::SqliteProvider;
