use crate::error::{BindError, DriverResult, ParseError};

use super::value::{FromValue, Value};

/// Source of database connections, typically an external pool.
///
/// Implementations must be safe to share between threads; an executor holds
/// one provider and may be used from many callers at once.
pub trait ConnectionProvider: Send + Sync {
    type Connection: Connection;

    /// Acquires a connection. May block and may fail.
    fn acquire(&self) -> DriverResult<Self::Connection>;

    /// Human readable description, used when the connection metadata
    /// carries no URL.
    fn describe(&self) -> String;
}

/// A live database connection.
pub trait Connection {
    type Statement<'c>: Statement
    where
        Self: 'c;

    /// Prepares a statement from command text.
    fn prepare(&mut self, command: &str) -> DriverResult<Self::Statement<'_>>;

    /// URL reported by the connection metadata, if any.
    fn url(&self) -> Option<String> {
        None
    }

    /// Releases the connection back to its provider.
    fn close(self) -> DriverResult<()>;
}

/// A prepared statement.
pub trait Statement: Parameters {
    type Cursor<'s>: Cursor
    where
        Self: 's;

    /// Executes the statement, producing a result cursor.
    fn query(&mut self) -> DriverResult<Self::Cursor<'_>>;

    /// Executes the statement as a mutation, returning the affected-row count.
    fn execute(&mut self) -> DriverResult<usize>;

    fn close(self) -> DriverResult<()>;
}

/// Parameter sink of a prepared statement, as seen by binders.
///
/// Positional indexes are 1-based.
pub trait Parameters {
    fn parameter_count(&self) -> usize;

    fn set(&mut self, index: usize, value: Value) -> Result<(), BindError>;

    fn set_named(&mut self, name: &str, value: Value) -> Result<(), BindError>;
}

impl dyn Parameters + '_ {
    /// Binds a positional (1-based) parameter.
    pub fn bind(&mut self, index: usize, value: impl Into<Value>) -> Result<(), BindError> {
        self.set(index, value.into())
    }

    /// Binds a named parameter, including its prefix (`:id`, `@id`, `$id`).
    pub fn bind_named(&mut self, name: &str, value: impl Into<Value>) -> Result<(), BindError> {
        self.set_named(name, value.into())
    }
}

/// Forward-only result cursor.
pub trait Cursor {
    /// Advances to the next row. `None` once the cursor is exhausted.
    fn next_row(&mut self) -> DriverResult<Option<&dyn Row>>;

    fn close(self) -> DriverResult<()>;
}

/// The current row of a cursor, as seen by mappers.
///
/// Column indexes are 0-based.
pub trait Row {
    fn column_count(&self) -> usize;

    fn column_index(&self, name: &str) -> Option<usize>;

    fn value(&self, index: usize) -> Result<Value, ParseError>;
}

impl dyn Row + '_ {
    /// Reads and converts a column by 0-based index or by name.
    pub fn get<V: FromValue>(&self, column: impl ColumnIndex) -> Result<V, ParseError> {
        let index = column.resolve(self)?;
        V::from_value(self.value(index)?, &column.label())
    }
}

/// Anything that can address a column: a 0-based index or a column name.
pub trait ColumnIndex {
    fn resolve(&self, row: &dyn Row) -> Result<usize, ParseError>;

    fn label(&self) -> String;
}

impl ColumnIndex for usize {
    fn resolve(&self, row: &dyn Row) -> Result<usize, ParseError> {
        if *self < row.column_count() {
            Ok(*self)
        } else {
            Err(ParseError::MissingColumn(self.label()))
        }
    }

    fn label(&self) -> String {
        format!("#{self}")
    }
}

impl ColumnIndex for &str {
    fn resolve(&self, row: &dyn Row) -> Result<usize, ParseError> {
        row.column_index(self)
            .ok_or_else(|| ParseError::MissingColumn(self.to_string()))
    }

    fn label(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRow {
        columns: Vec<&'static str>,
        values: Vec<Value>,
    }

    impl Row for FixedRow {
        fn column_count(&self) -> usize {
            self.columns.len()
        }

        fn column_index(&self, name: &str) -> Option<usize> {
            self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
        }

        fn value(&self, index: usize) -> Result<Value, ParseError> {
            self.values
                .get(index)
                .cloned()
                .ok_or_else(|| ParseError::MissingColumn(index.label()))
        }
    }

    #[derive(Default)]
    struct RecordingParameters {
        bound: Vec<(usize, Value)>,
    }

    impl Parameters for RecordingParameters {
        fn parameter_count(&self) -> usize {
            2
        }

        fn set(&mut self, index: usize, value: Value) -> Result<(), BindError> {
            if index == 0 || index > self.parameter_count() {
                return Err(BindError::IndexOutOfRange { index, count: 2 });
            }
            self.bound.push((index, value));
            Ok(())
        }

        fn set_named(&mut self, name: &str, _value: Value) -> Result<(), BindError> {
            Err(BindError::UnknownName(name.to_string()))
        }
    }

    fn sample_row() -> FixedRow {
        FixedRow {
            columns: vec!["id", "name"],
            values: vec![Value::Integer(42), Value::Text("alice".to_string())],
        }
    }

    #[test]
    fn test_get_by_index_and_name() {
        let row = sample_row();
        let row: &dyn Row = &row;
        assert_eq!(row.get::<i64>(0).unwrap(), 42);
        assert_eq!(row.get::<String>("NAME").unwrap(), "alice");
    }

    #[test]
    fn test_get_missing_column() {
        let row = sample_row();
        let row: &dyn Row = &row;
        assert_eq!(
            row.get::<i64>("email"),
            Err(ParseError::MissingColumn("email".to_string()))
        );
        assert_eq!(
            row.get::<i64>(5),
            Err(ParseError::MissingColumn("#5".to_string()))
        );
    }

    #[test]
    fn test_get_wrong_type_names_column() {
        let row = sample_row();
        let row: &dyn Row = &row;
        let err = row.get::<i64>("name").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid type for column name: expected integer, found text"
        );
    }

    #[test]
    fn test_bind_helpers_convert_values() {
        let mut params = RecordingParameters::default();
        {
            let sink: &mut dyn Parameters = &mut params;
            sink.bind(1, 42).unwrap();
            sink.bind(2, "x").unwrap();
            assert!(matches!(
                sink.bind(3, 1),
                Err(BindError::IndexOutOfRange { index: 3, count: 2 })
            ));
            assert!(sink.bind_named(":id", 1).is_err());
        }
        assert_eq!(
            params.bound,
            vec![(1, Value::Integer(42)), (2, Value::Text("x".to_string()))]
        );
    }
}
