//! SQLite value conversion functions.
//!
//! Pure functions for converting between SQLite values and driver-neutral
//! values. These are testable in isolation without database access.

use rusqlite::types::{Value as SqliteValue, ValueRef};
use sqlshim_core::driver::Value;
use sqlshim_core::ParseError;

/// Convert a bound value into an owned SQLite value.
pub fn to_sqlite_value(value: Value) -> SqliteValue {
    match value {
        Value::Null => SqliteValue::Null,
        Value::Integer(v) => SqliteValue::Integer(v),
        Value::Real(v) => SqliteValue::Real(v),
        Value::Text(v) => SqliteValue::Text(v),
        Value::Blob(v) => SqliteValue::Blob(v),
    }
}

/// Convert a borrowed column value into an owned value.
///
/// Text columns must hold valid UTF-8.
pub fn from_value_ref(value: ValueRef<'_>, index: usize) -> Result<Value, ParseError> {
    match value {
        ValueRef::Null => Ok(Value::Null),
        ValueRef::Integer(v) => Ok(Value::Integer(v)),
        ValueRef::Real(v) => Ok(Value::Real(v)),
        ValueRef::Text(bytes) => String::from_utf8(bytes.to_vec())
            .map(Value::Text)
            .map_err(|e| ParseError::Invalid(format!("column #{index} is not valid UTF-8: {e}"))),
        ValueRef::Blob(bytes) => Ok(Value::Blob(bytes.to_vec())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_sqlite_value() {
        assert_eq!(to_sqlite_value(Value::Null), SqliteValue::Null);
        assert_eq!(to_sqlite_value(Value::Integer(7)), SqliteValue::Integer(7));
        assert_eq!(
            to_sqlite_value(Value::Text("a".to_string())),
            SqliteValue::Text("a".to_string())
        );
        assert_eq!(
            to_sqlite_value(Value::Blob(vec![1, 2])),
            SqliteValue::Blob(vec![1, 2])
        );
    }

    #[test]
    fn test_from_value_ref() {
        assert_eq!(from_value_ref(ValueRef::Null, 0), Ok(Value::Null));
        assert_eq!(from_value_ref(ValueRef::Real(1.5), 0), Ok(Value::Real(1.5)));
        assert_eq!(
            from_value_ref(ValueRef::Text(b"hello"), 0),
            Ok(Value::Text("hello".to_string()))
        );
    }

    #[test]
    fn test_invalid_utf8_text() {
        let result = from_value_ref(ValueRef::Text(&[0xff, 0xfe]), 2);
        assert!(matches!(result, Err(ParseError::Invalid(msg)) if msg.contains("#2")));
    }
}
