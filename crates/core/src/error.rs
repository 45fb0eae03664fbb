use thiserror::Error;

/// Errors raised while writing parameters onto a prepared statement.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BindError {
    #[error("Parameter index {index} out of range (statement has {count} parameters)")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("Unknown parameter name: {0}")]
    UnknownName(String),
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),
    #[error("Driver rejected parameter: {0}")]
    Driver(String),
}

/// Errors raised while converting a result row into a value.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("Missing column: {0}")]
    MissingColumn(String),
    #[error("Invalid type for column {column}: expected {expected}, found {found}")]
    InvalidType {
        column: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("Value out of range for column {column}: {value}")]
    OutOfRange { column: String, value: String },
    #[error("Driver failed to read row: {0}")]
    Driver(String),
    #[error("Invalid row: {0}")]
    Invalid(String),
}

/// Opaque failure reported by a database driver.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct DriverError(pub String);

impl DriverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors surfaced by executor calls.
///
/// Every variant is terminal for the call that produced it. Nothing is
/// retried internally.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExecutorError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Parameter binding failed: {0}")]
    Bind(#[from] BindError),
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
    #[error("Row mapping failed: {0}")]
    Parse(#[from] ParseError),
    /// More rows were available than the caller allowed. This is a policy
    /// violation on the caller's side, not a database malfunction.
    #[error("Result set too big, command: {command}, limit: {limit}")]
    ExceedLimit { command: String, limit: usize },
}

impl ExecutorError {
    /// Returns true when the call failed because the row ceiling was exceeded.
    pub fn is_exceed_limit(&self) -> bool {
        matches!(self, ExecutorError::ExceedLimit { .. })
    }
}

/// Result type for executor operations.
pub type Result<T> = std::result::Result<T, ExecutorError>;

/// Result type for driver calls.
pub type DriverResult<T> = std::result::Result<T, DriverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exceed_limit_display() {
        let error = ExecutorError::ExceedLimit {
            command: "SELECT id FROM t".to_string(),
            limit: 10,
        };
        assert_eq!(
            error.to_string(),
            "Result set too big, command: SELECT id FROM t, limit: 10"
        );
        assert!(error.is_exceed_limit());
    }

    #[test]
    fn test_bind_error_converts_into_executor_error() {
        let error: ExecutorError = BindError::IndexOutOfRange { index: 3, count: 1 }.into();
        assert_eq!(
            error.to_string(),
            "Parameter binding failed: Parameter index 3 out of range (statement has 1 parameters)"
        );
        assert!(!error.is_exceed_limit());
    }

    #[test]
    fn test_parse_error_converts_into_executor_error() {
        let error: ExecutorError = ParseError::InvalidType {
            column: "id".to_string(),
            expected: "integer",
            found: "text",
        }
        .into();
        assert!(matches!(
            error,
            ExecutorError::Parse(ParseError::InvalidType { .. })
        ));
        assert_eq!(
            error.to_string(),
            "Row mapping failed: Invalid type for column id: expected integer, found text"
        );
    }

    #[test]
    fn test_connection_failed_display() {
        let error = ExecutorError::ConnectionFailed("pool exhausted".to_string());
        assert_eq!(error.to_string(), "Connection failed: pool exhausted");
    }

    #[test]
    fn test_driver_error_display() {
        assert_eq!(DriverError::new("disk I/O error").to_string(), "disk I/O error");
    }
}
