use std::fmt;

use crate::driver::{Parameters, Row};
use crate::error::{BindError, ExecutorError, ParseError, Result};

type BindResult = std::result::Result<(), BindError>;
type MapResult<T> = std::result::Result<T, ParseError>;

/// Callback writing parameters onto a prepared statement.
pub type Binder = Box<dyn Fn(&mut dyn Parameters) -> BindResult + Send + Sync>;

/// Callback converting the current row into a value.
pub type Mapper<T> = Box<dyn Fn(&dyn Row) -> MapResult<T> + Send + Sync>;

/// Capability shared by every operation: command text plus parameter binding.
pub trait Command {
    fn command(&self) -> &str;

    fn bind_parameters(&self, parameters: &mut dyn Parameters) -> BindResult;
}

/// A parameterized command together with its binder.
///
/// Used directly for updates; wrapped by [`QueryOperation`] for queries.
pub struct Operation {
    command: String,
    binder: Binder,
}

/// An operation that only mutates and reports an affected-row count.
pub type UpdateOperation = Operation;

impl Operation {
    /// Creates an operation. Fails when the command text is blank.
    pub fn new<F>(command: impl Into<String>, binder: F) -> Result<Self>
    where
        F: Fn(&mut dyn Parameters) -> BindResult + Send + Sync + 'static,
    {
        let command = command.into();
        if command.trim().is_empty() {
            return Err(ExecutorError::InvalidArgument(
                "command must not be empty".to_string(),
            ));
        }

        Ok(Self {
            command,
            binder: Box::new(binder),
        })
    }

    /// Creates an operation for a command with no placeholders.
    pub fn without_parameters(command: impl Into<String>) -> Result<Self> {
        Self::new(command, |_| Ok(()))
    }
}

impl Command for Operation {
    fn command(&self) -> &str {
        &self.command
    }

    fn bind_parameters(&self, parameters: &mut dyn Parameters) -> BindResult {
        (self.binder)(parameters)
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

/// An operation whose result rows are mapped into values of type `T`.
pub struct QueryOperation<T> {
    operation: Operation,
    mapper: Mapper<T>,
}

impl<T> QueryOperation<T> {
    /// Creates a query operation. Fails when the command text is blank.
    pub fn new<B, M>(command: impl Into<String>, binder: B, mapper: M) -> Result<Self>
    where
        B: Fn(&mut dyn Parameters) -> BindResult + Send + Sync + 'static,
        M: Fn(&dyn Row) -> MapResult<T> + Send + Sync + 'static,
    {
        Ok(Self::from_operation(Operation::new(command, binder)?, mapper))
    }

    /// Attaches a row mapper to an existing operation.
    pub fn from_operation<M>(operation: Operation, mapper: M) -> Self
    where
        M: Fn(&dyn Row) -> MapResult<T> + Send + Sync + 'static,
    {
        Self {
            operation,
            mapper: Box::new(mapper),
        }
    }

    pub fn map_row(&self, row: &dyn Row) -> MapResult<T> {
        (self.mapper)(row)
    }
}

impl<T> Command for QueryOperation<T> {
    fn command(&self) -> &str {
        self.operation.command()
    }

    fn bind_parameters(&self, parameters: &mut dyn Parameters) -> BindResult {
        self.operation.bind_parameters(parameters)
    }
}

impl<T> fmt::Debug for QueryOperation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOperation")
            .field("command", &self.operation.command)
            .finish_non_exhaustive()
    }
}
