//! Bounded query executor.
//!
//! Each call acquires one connection from the provider, prepares one
//! statement, binds it, runs it, and releases everything it opened before
//! returning. Release happens in reverse order of acquisition (cursor,
//! statement, connection) on every path. Release failures are logged and
//! swallowed so they never replace the call's own outcome.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use sqlshim_core::driver::{Connection, ConnectionProvider, Cursor, Statement};
use sqlshim_core::operation::{collect_bounded, Command, Operation, QueryOperation};
use sqlshim_core::{DriverError, DriverResult, ExecutorConfig, ExecutorError, Result};

/// Runs operations against connections from a shared provider.
///
/// The executor keeps no per-call state, so one instance can serve many
/// threads as long as the provider itself is thread safe.
pub struct Executor<P: ConnectionProvider> {
    name: String,
    url: Option<String>,
    info: String,
    provider: Arc<P>,
    config: ExecutorConfig,
}

impl<P: ConnectionProvider> Executor<P> {
    /// Creates an executor with the default configuration.
    pub fn new(name: impl Into<String>, provider: Arc<P>) -> Result<Self> {
        Self::with_config(name, provider, ExecutorConfig::default())
    }

    /// Creates an executor.
    ///
    /// Acquires one connection to read the database URL from its metadata.
    /// Failing to do so is logged, not returned: the provider may simply be
    /// unavailable at startup.
    pub fn with_config(
        name: impl Into<String>,
        provider: Arc<P>,
        config: ExecutorConfig,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ExecutorError::InvalidArgument(
                "executor name must not be empty".to_string(),
            ));
        }

        let url = probe_url(provider.as_ref());
        let info = format!(
            "name: {}, url: {}",
            name,
            url.clone().unwrap_or_else(|| provider.describe())
        );

        Ok(Self {
            name,
            url,
            info,
            provider,
            config,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Database URL reported at construction, if any.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Name and URL (or provider description) used in log entries.
    pub fn info(&self) -> &str {
        &self.info
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Runs a query with the configured default row ceiling.
    pub fn execute_query<T>(&self, op: &QueryOperation<T>) -> Result<Vec<T>> {
        self.execute_query_with_limit(op, self.config.default_limit)
    }

    /// Runs a query and maps at most `limit` rows, in cursor order.
    ///
    /// Fails with [`ExecutorError::ExceedLimit`] when the result holds more
    /// than `limit` rows. No partial result is returned in that case.
    pub fn execute_query_with_limit<T>(
        &self,
        op: &QueryOperation<T>,
        limit: usize,
    ) -> Result<Vec<T>> {
        tracing::debug!(executor = %self.name, command = op.command(), limit, "Executing query");

        let mut connection = self.acquire()?;
        let outcome = query_on(&mut connection, op, limit);
        release("connection", connection.close());
        outcome
    }

    /// Runs a query expected to yield at most one row.
    ///
    /// Zero rows give `None`. More than one row fails with
    /// [`ExecutorError::ExceedLimit`] with a limit of 1.
    pub fn execute_query_unique<T>(&self, op: &QueryOperation<T>) -> Result<Option<T>> {
        let rows = self.execute_query_with_limit(op, 1)?;
        Ok(rows.into_iter().next())
    }

    /// Runs a mutation and returns the affected-row count reported by the driver.
    pub fn execute_update(&self, op: &Operation) -> Result<usize> {
        tracing::debug!(executor = %self.name, command = op.command(), "Executing update");

        let mut connection = self.acquire()?;
        let outcome = update_on(&mut connection, op);
        release("connection", connection.close());
        outcome
    }

    /// Acquires a connection, warning when the provider is slow to hand one out.
    fn acquire(&self) -> Result<P::Connection> {
        let started = Instant::now();
        let connection = self
            .provider
            .acquire()
            .map_err(|e| ExecutorError::ConnectionFailed(e.to_string()))?;
        let elapsed = started.elapsed();

        if elapsed > self.config.slow_acquire_threshold {
            tracing::warn!(
                executor = %self.info,
                elapsed_ms = millis(elapsed),
                threshold_ms = millis(self.config.slow_acquire_threshold),
                "Too slow to get connection"
            );
        }

        Ok(connection)
    }
}

impl<P: ConnectionProvider> Clone for Executor<P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            url: self.url.clone(),
            info: self.info.clone(),
            provider: Arc::clone(&self.provider),
            config: self.config.clone(),
        }
    }
}

impl<P: ConnectionProvider> fmt::Debug for Executor<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("info", &self.info)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Reads the URL from one connection's metadata, then releases it.
fn probe_url<P: ConnectionProvider>(provider: &P) -> Option<String> {
    match provider.acquire() {
        Ok(connection) => {
            let url = connection.url();
            release("connection", connection.close());
            url
        }
        Err(e) => {
            tracing::error!(
                provider = %provider.describe(),
                error = %e,
                "Failed to get info from connection provider"
            );
            None
        }
    }
}

fn prepare<'c, C: Connection>(connection: &'c mut C, command: &str) -> Result<C::Statement<'c>> {
    connection
        .prepare(command)
        .map_err(|e| execution_failed("prepare", e))
}

fn query_on<C: Connection, T>(
    connection: &mut C,
    op: &QueryOperation<T>,
    limit: usize,
) -> Result<Vec<T>> {
    let mut statement = prepare(connection, op.command())?;
    let outcome = query_statement(&mut statement, op, limit);
    release("statement", statement.close());
    outcome
}

fn query_statement<S: Statement, T>(
    statement: &mut S,
    op: &QueryOperation<T>,
    limit: usize,
) -> Result<Vec<T>> {
    op.bind_parameters(statement)?;

    let mut cursor = statement.query().map_err(|e| execution_failed("query", e))?;
    let outcome = collect_bounded(&mut cursor, op, limit);
    release("cursor", cursor.close());
    outcome
}

fn update_on<C: Connection>(connection: &mut C, op: &Operation) -> Result<usize> {
    let mut statement = prepare(connection, op.command())?;
    let outcome = update_statement(&mut statement, op);
    release("statement", statement.close());
    outcome
}

fn update_statement<S: Statement>(statement: &mut S, op: &Operation) -> Result<usize> {
    op.bind_parameters(statement)?;

    statement
        .execute()
        .map_err(|e| execution_failed("execute", e))
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn execution_failed(step: &str, err: DriverError) -> ExecutorError {
    ExecutorError::ExecutionFailed(format!("{step}: {err}"))
}

/// Best-effort release: failures are logged and dropped.
fn release(resource: &'static str, result: DriverResult<()>) {
    if let Err(e) = result {
        tracing::warn!(resource, error = %e, "Failed to release resource");
    }
}
