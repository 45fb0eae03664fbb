//! SQLite connection providers.

use std::path::PathBuf;
use std::sync::Mutex;

use sqlshim_core::driver::ConnectionProvider;
use sqlshim_core::DriverResult;

use super::connection::SqliteConnection;
use super::error::map_driver_error;

enum Target {
    File(PathBuf),
    SharedMemory(String),
}

/// Opens a new SQLite connection on every acquisition.
pub struct SqliteProvider {
    target: Target,
    // Keeps a shared in-memory database alive between acquisitions.
    _anchor: Option<Mutex<rusqlite::Connection>>,
}

impl SqliteProvider {
    /// Provider for a database file. The file is created on first use.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            target: Target::File(path.into()),
            _anchor: None,
        }
    }

    /// Provider for a named in-memory database shared by all connections it
    /// hands out. The database lives as long as the provider.
    pub fn in_memory(name: &str) -> DriverResult<Self> {
        let uri = shared_memory_uri(name);
        let anchor = rusqlite::Connection::open(&uri).map_err(map_driver_error)?;

        Ok(Self {
            target: Target::SharedMemory(uri),
            _anchor: Some(Mutex::new(anchor)),
        })
    }
}

fn shared_memory_uri(name: &str) -> String {
    format!("file:{name}?mode=memory&cache=shared")
}

impl ConnectionProvider for SqliteProvider {
    type Connection = SqliteConnection;

    fn acquire(&self) -> DriverResult<SqliteConnection> {
        let connection = match &self.target {
            Target::File(path) => rusqlite::Connection::open(path),
            Target::SharedMemory(uri) => rusqlite::Connection::open(uri),
        }
        .map_err(map_driver_error)?;

        Ok(SqliteConnection::owned(connection))
    }

    fn describe(&self) -> String {
        match &self.target {
            Target::File(path) => format!("sqlite file {}", path.display()),
            Target::SharedMemory(uri) => format!("sqlite {uri}"),
        }
    }
}

/// Hands out connections from an external r2d2 pool.
#[cfg(feature = "pool")]
pub struct SqlitePoolProvider {
    pool: r2d2::Pool<r2d2_sqlite::SqliteConnectionManager>,
}

#[cfg(feature = "pool")]
impl SqlitePoolProvider {
    pub fn new(pool: r2d2::Pool<r2d2_sqlite::SqliteConnectionManager>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &r2d2::Pool<r2d2_sqlite::SqliteConnectionManager> {
        &self.pool
    }
}

#[cfg(feature = "pool")]
impl ConnectionProvider for SqlitePoolProvider {
    type Connection = SqliteConnection;

    fn acquire(&self) -> DriverResult<SqliteConnection> {
        self.pool
            .get()
            .map(SqliteConnection::pooled)
            .map_err(|e| sqlshim_core::DriverError::new(format!("pool: {e}")))
    }

    fn describe(&self) -> String {
        format!("r2d2 sqlite pool (max_size: {})", self.pool.max_size())
    }
}
