//! Driver trait implementations over `rusqlite`.
//!
//! Statements use rusqlite's raw API so binding, querying and executing can
//! happen as separate steps.

use sqlshim_core::driver::{Connection, Cursor, Parameters, Row, Statement, Value};
use sqlshim_core::{BindError, DriverResult, ParseError};

use super::conversions::{from_value_ref, to_sqlite_value};
use super::error::{map_bind_error, map_driver_error, map_row_error};

enum Handle {
    Owned(rusqlite::Connection),
    #[cfg(feature = "pool")]
    Pooled(r2d2::PooledConnection<r2d2_sqlite::SqliteConnectionManager>),
}

/// A SQLite connection, either opened directly or borrowed from a pool.
pub struct SqliteConnection {
    handle: Handle,
}

impl SqliteConnection {
    pub(crate) fn owned(connection: rusqlite::Connection) -> Self {
        Self {
            handle: Handle::Owned(connection),
        }
    }

    #[cfg(feature = "pool")]
    pub(crate) fn pooled(
        connection: r2d2::PooledConnection<r2d2_sqlite::SqliteConnectionManager>,
    ) -> Self {
        Self {
            handle: Handle::Pooled(connection),
        }
    }

    fn raw(&self) -> &rusqlite::Connection {
        match &self.handle {
            Handle::Owned(connection) => connection,
            #[cfg(feature = "pool")]
            Handle::Pooled(connection) => &**connection,
        }
    }
}

impl Connection for SqliteConnection {
    type Statement<'c>
        = SqliteStatement<'c>
    where
        Self: 'c;

    fn prepare(&mut self, command: &str) -> DriverResult<SqliteStatement<'_>> {
        let inner = self.raw().prepare(command).map_err(map_driver_error)?;
        Ok(SqliteStatement { inner })
    }

    /// File URL of the main database. In-memory databases report none.
    fn url(&self) -> Option<String> {
        self.raw()
            .path()
            .filter(|path| !path.is_empty())
            .map(|path| format!("sqlite://{path}"))
    }

    fn close(self) -> DriverResult<()> {
        match self.handle {
            Handle::Owned(connection) => connection.close().map_err(|(_, e)| map_driver_error(e)),
            // Dropping a pooled connection hands it back to the pool.
            #[cfg(feature = "pool")]
            Handle::Pooled(connection) => {
                drop(connection);
                Ok(())
            }
        }
    }
}

/// A prepared SQLite statement.
pub struct SqliteStatement<'c> {
    inner: rusqlite::Statement<'c>,
}

impl Parameters for SqliteStatement<'_> {
    fn parameter_count(&self) -> usize {
        self.inner.parameter_count()
    }

    fn set(&mut self, index: usize, value: Value) -> Result<(), BindError> {
        let count = self.parameter_count();
        if index == 0 || index > count {
            return Err(BindError::IndexOutOfRange { index, count });
        }
        self.inner
            .raw_bind_parameter(index, to_sqlite_value(value))
            .map_err(|e| map_bind_error(e, index, count))
    }

    fn set_named(&mut self, name: &str, value: Value) -> Result<(), BindError> {
        let index = self
            .inner
            .parameter_index(name)
            .map_err(|e| map_bind_error(e, 0, self.parameter_count()))?
            .ok_or_else(|| BindError::UnknownName(name.to_string()))?;
        self.set(index, value)
    }
}

impl Statement for SqliteStatement<'_> {
    type Cursor<'s>
        = SqliteCursor<'s>
    where
        Self: 's;

    fn query(&mut self) -> DriverResult<SqliteCursor<'_>> {
        Ok(SqliteCursor {
            rows: self.inner.raw_query(),
            current: None,
        })
    }

    fn execute(&mut self) -> DriverResult<usize> {
        self.inner.raw_execute().map_err(map_driver_error)
    }

    fn close(self) -> DriverResult<()> {
        self.inner.finalize().map_err(map_driver_error)
    }
}

/// Result cursor of a SQLite statement.
///
/// Each fetched row is copied into `current`, which stays valid until the
/// next call to `next_row`.
pub struct SqliteCursor<'s> {
    rows: rusqlite::Rows<'s>,
    current: Option<SqliteRow>,
}

impl Cursor for SqliteCursor<'_> {
    fn next_row(&mut self) -> DriverResult<Option<&dyn Row>> {
        let Some(row) = self.rows.next().map_err(map_driver_error)? else {
            self.current = None;
            return Ok(None);
        };

        let columns = match self.current.take() {
            Some(previous) => previous.columns,
            None => {
                let statement: &rusqlite::Statement<'_> = row.as_ref();
                statement
                    .column_names()
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            }
        };
        let values = (0..columns.len())
            .map(|index| {
                row.get_ref(index)
                    .map_err(map_row_error)
                    .and_then(|value| from_value_ref(value, index))
            })
            .collect();

        let current = self.current.insert(SqliteRow { columns, values });
        Ok(Some(&*current as &dyn Row))
    }

    /// Rows reset their statement when dropped; nothing can fail here.
    fn close(self) -> DriverResult<()> {
        drop(self.rows);
        Ok(())
    }
}

/// An owned copy of one result row.
///
/// Conversion failures are kept per column and surface when that column is read.
struct SqliteRow {
    columns: Vec<String>,
    values: Vec<Result<Value, ParseError>>,
}

impl Row for SqliteRow {
    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.eq_ignore_ascii_case(name))
    }

    fn value(&self, index: usize) -> Result<Value, ParseError> {
        self.values
            .get(index)
            .cloned()
            .unwrap_or_else(|| Err(ParseError::MissingColumn(format!("#{index}"))))
    }
}
