//! Driver-neutral SQL values and the conversions used by binders and mappers.

use crate::error::ParseError;

/// A single SQL value as exchanged between operations and drivers.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Name of the value's storage class, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Conversion from a column value into a Rust type.
///
/// `column` is only used to build error messages.
pub trait FromValue: Sized {
    fn from_value(value: Value, column: &str) -> Result<Self, ParseError>;
}

fn invalid_type(column: &str, expected: &'static str, found: &Value) -> ParseError {
    ParseError::InvalidType {
        column: column.to_string(),
        expected,
        found: found.type_name(),
    }
}

impl FromValue for Value {
    fn from_value(value: Value, _column: &str) -> Result<Self, ParseError> {
        Ok(value)
    }
}

impl FromValue for i64 {
    fn from_value(value: Value, column: &str) -> Result<Self, ParseError> {
        match value {
            Value::Integer(v) => Ok(v),
            other => Err(invalid_type(column, "integer", &other)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: Value, column: &str) -> Result<Self, ParseError> {
        let wide = i64::from_value(value, column)?;
        i32::try_from(wide).map_err(|_| ParseError::OutOfRange {
            column: column.to_string(),
            value: wide.to_string(),
        })
    }
}

impl FromValue for u32 {
    fn from_value(value: Value, column: &str) -> Result<Self, ParseError> {
        let wide = i64::from_value(value, column)?;
        u32::try_from(wide).map_err(|_| ParseError::OutOfRange {
            column: column.to_string(),
            value: wide.to_string(),
        })
    }
}

impl FromValue for bool {
    fn from_value(value: Value, column: &str) -> Result<Self, ParseError> {
        i64::from_value(value, column).map(|v| v != 0)
    }
}

impl FromValue for f64 {
    fn from_value(value: Value, column: &str) -> Result<Self, ParseError> {
        match value {
            Value::Real(v) => Ok(v),
            // Integer affinity columns are widened, as SQLite itself does.
            Value::Integer(v) => Ok(v as f64),
            other => Err(invalid_type(column, "real", &other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value, column: &str) -> Result<Self, ParseError> {
        match value {
            Value::Text(v) => Ok(v),
            other => Err(invalid_type(column, "text", &other)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value, column: &str) -> Result<Self, ParseError> {
        match value {
            Value::Blob(v) => Ok(v),
            other => Err(invalid_type(column, "blob", &other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value, column: &str) -> Result<Self, ParseError> {
        if value.is_null() {
            return Ok(None);
        }
        T::from_value(value, column).map(Some)
    }
}
