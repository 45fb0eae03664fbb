//! SQLite error mapping.
//!
//! Maps `rusqlite::Error` to the driver-neutral error types from
//! `sqlshim_core`. Binding and row-reading failures get their own semantic
//! variants; everything else becomes an opaque `DriverError`.

use sqlshim_core::{BindError, DriverError, ParseError};

/// Maps a rusqlite error to a DriverError, keeping the SQLite error code.
pub fn map_driver_error(err: rusqlite::Error) -> DriverError {
    match &err {
        rusqlite::Error::SqliteFailure(sqlite_err, _) => {
            DriverError::new(format!("{err} (code: {:?})", sqlite_err.code))
        }
        _ => DriverError::new(err.to_string()),
    }
}

/// Maps a rusqlite error raised while binding a parameter to a BindError.
///
/// # Error Mapping
///
/// - `SQLITE_RANGE` → `BindError::IndexOutOfRange`
/// - `InvalidParameterName` → `BindError::UnknownName`
/// - `InvalidParameterCount` → `BindError::IndexOutOfRange`
/// - `ToSqlConversionFailure` → `BindError::TypeMismatch`
/// - All other errors → `BindError::Driver`
pub fn map_bind_error(err: rusqlite::Error, index: usize, count: usize) -> BindError {
    match err {
        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.code == rusqlite::ErrorCode::ParameterOutOfRange =>
        {
            BindError::IndexOutOfRange { index, count }
        }
        rusqlite::Error::InvalidParameterName(name) => BindError::UnknownName(name),
        rusqlite::Error::InvalidParameterCount(given, expected) => BindError::IndexOutOfRange {
            index: given,
            count: expected,
        },
        rusqlite::Error::ToSqlConversionFailure(e) => BindError::TypeMismatch(e.to_string()),
        other => BindError::Driver(other.to_string()),
    }
}

/// Maps a rusqlite error raised while reading a column to a ParseError.
///
/// # Error Mapping
///
/// - `InvalidColumnIndex` → `ParseError::MissingColumn`
/// - `InvalidColumnName` → `ParseError::MissingColumn`
/// - `InvalidColumnType` → `ParseError::Invalid`
/// - `FromSqlConversionFailure` → `ParseError::Invalid`
/// - All other errors → `ParseError::Driver`
pub fn map_row_error(err: rusqlite::Error) -> ParseError {
    match err {
        rusqlite::Error::InvalidColumnIndex(index) => {
            ParseError::MissingColumn(format!("#{index}"))
        }
        rusqlite::Error::InvalidColumnName(name) => ParseError::MissingColumn(name),
        rusqlite::Error::InvalidColumnType(index, name, ty) => {
            ParseError::Invalid(format!("column {name} (#{index}) has unexpected type {ty}"))
        }
        rusqlite::Error::FromSqlConversionFailure(index, ty, e) => {
            ParseError::Invalid(format!("column #{index} of type {ty}: {e}"))
        }
        other => ParseError::Driver(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::ffi;

    #[test]
    fn test_range_error_maps_to_index_out_of_range() {
        let sqlite_err = ffi::Error {
            code: rusqlite::ErrorCode::ParameterOutOfRange,
            extended_code: ffi::SQLITE_RANGE,
        };
        let err = rusqlite::Error::SqliteFailure(sqlite_err, None);

        assert_eq!(
            map_bind_error(err, 4, 2),
            BindError::IndexOutOfRange { index: 4, count: 2 }
        );
    }

    #[test]
    fn test_invalid_parameter_name_maps_to_unknown_name() {
        let err = rusqlite::Error::InvalidParameterName(":missing".to_string());
        assert_eq!(
            map_bind_error(err, 0, 1),
            BindError::UnknownName(":missing".to_string())
        );
    }

    #[test]
    fn test_other_bind_errors_map_to_driver() {
        let err = rusqlite::Error::InvalidQuery;
        assert!(matches!(map_bind_error(err, 1, 1), BindError::Driver(_)));
    }

    #[test]
    fn test_invalid_column_index_maps_to_missing_column() {
        assert_eq!(
            map_row_error(rusqlite::Error::InvalidColumnIndex(3)),
            ParseError::MissingColumn("#3".to_string())
        );
    }

    #[test]
    fn test_invalid_column_name_maps_to_missing_column() {
        assert_eq!(
            map_row_error(rusqlite::Error::InvalidColumnName("email".to_string())),
            ParseError::MissingColumn("email".to_string())
        );
    }

    #[test]
    fn test_constraint_failure_keeps_code() {
        let sqlite_err = ffi::Error {
            code: rusqlite::ErrorCode::ConstraintViolation,
            extended_code: ffi::SQLITE_CONSTRAINT_UNIQUE,
        };
        let message = Some("UNIQUE constraint failed".to_string());
        let err = rusqlite::Error::SqliteFailure(sqlite_err, message);

        let mapped = map_driver_error(err);
        assert!(mapped.0.contains("UNIQUE constraint failed"));
        assert!(mapped.0.contains("ConstraintViolation"));
    }
}
