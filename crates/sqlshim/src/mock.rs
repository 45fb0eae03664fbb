//! Scriptable in-memory driver for tests.
//!
//! This module provides a mock implementation of the driver traits whose
//! behaviour is fixed up front: the rows a query yields, the count an
//! update reports, how long acquisition takes, and where the call should
//! fail. Every resource it hands out is tracked in a shared [`MockLedger`]
//! so callers can assert that each one was released exactly once.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use sqlshim_core::driver::{
    Connection, ConnectionProvider, Cursor, Parameters, Row, Statement, Value,
};
use sqlshim_core::{BindError, DriverError, DriverResult, ParseError};

/// Step at which a mock call is told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailurePoint {
    Acquire,
    Prepare,
    Bind,
    Query,
    Execute,
    /// Fetching the row at this 0-based position, including the overflow probe.
    Fetch(usize),
    CloseCursor,
    CloseStatement,
    CloseConnection,
}

/// Counters and recordings shared by every resource of one provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerState {
    pub connections_acquired: usize,
    pub connections_closed: usize,
    pub statements_prepared: usize,
    pub statements_closed: usize,
    pub cursors_opened: usize,
    pub cursors_closed: usize,
    pub commands: Vec<String>,
    pub bound: Vec<(usize, Value)>,
    pub bound_named: Vec<(String, Value)>,
}

impl LedgerState {
    /// True when every acquired resource has been closed.
    pub fn is_balanced(&self) -> bool {
        self.connections_acquired == self.connections_closed
            && self.statements_prepared == self.statements_closed
            && self.cursors_opened == self.cursors_closed
    }
}

/// Handle on the shared ledger of a [`MockProvider`].
#[derive(Debug, Clone, Default)]
pub struct MockLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl MockLedger {
    /// Copy of the current counters.
    pub fn snapshot(&self) -> LedgerState {
        self.lock().clone()
    }

    /// Clears all counters and recordings.
    pub fn reset(&self) {
        *self.lock() = LedgerState::default();
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, f: impl FnOnce(&mut LedgerState)) {
        f(&mut self.lock());
    }
}

#[derive(Debug, Clone, Default)]
struct Script {
    columns: Arc<[String]>,
    rows: Vec<Vec<Value>>,
    affected: usize,
    acquire_delay: Option<Duration>,
    failures: HashSet<FailurePoint>,
    url: Option<String>,
}

impl Script {
    fn fails_at(&self, point: FailurePoint) -> bool {
        self.failures.contains(&point)
    }
}

fn injected(point: FailurePoint) -> DriverError {
    DriverError::new(format!("injected failure at {point:?}"))
}

/// Mock connection provider.
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    script: Arc<Script>,
    ledger: MockLedger,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Column names of the scripted result set.
    pub fn with_columns(mut self, columns: &[&str]) -> Self {
        self.script_mut().columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Rows every query yields, in order.
    pub fn with_rows(mut self, rows: Vec<Vec<Value>>) -> Self {
        self.script_mut().rows = rows;
        self
    }

    /// Affected-row count every update reports.
    pub fn with_affected(mut self, affected: usize) -> Self {
        self.script_mut().affected = affected;
        self
    }

    /// Blocks each acquisition for `delay`.
    pub fn with_acquire_delay(mut self, delay: Duration) -> Self {
        self.script_mut().acquire_delay = Some(delay);
        self
    }

    /// URL reported by connection metadata.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.script_mut().url = Some(url.into());
        self
    }

    /// Makes every call fail at `point`. May be combined.
    pub fn failing_at(mut self, point: FailurePoint) -> Self {
        self.script_mut().failures.insert(point);
        self
    }

    pub fn ledger(&self) -> MockLedger {
        self.ledger.clone()
    }

    fn script_mut(&mut self) -> &mut Script {
        Arc::make_mut(&mut self.script)
    }
}

impl ConnectionProvider for MockProvider {
    type Connection = MockConnection;

    fn acquire(&self) -> DriverResult<MockConnection> {
        if let Some(delay) = self.script.acquire_delay {
            std::thread::sleep(delay);
        }
        if self.script.fails_at(FailurePoint::Acquire) {
            return Err(injected(FailurePoint::Acquire));
        }
        self.ledger.record(|s| s.connections_acquired += 1);

        Ok(MockConnection {
            script: Arc::clone(&self.script),
            ledger: self.ledger.clone(),
        })
    }

    fn describe(&self) -> String {
        "mock provider".to_string()
    }
}

/// Connection handed out by [`MockProvider`].
#[derive(Debug)]
pub struct MockConnection {
    script: Arc<Script>,
    ledger: MockLedger,
}

impl Connection for MockConnection {
    type Statement<'c>
        = MockStatement
    where
        Self: 'c;

    fn prepare(&mut self, command: &str) -> DriverResult<MockStatement> {
        self.ledger.record(|s| s.commands.push(command.to_string()));
        if self.script.fails_at(FailurePoint::Prepare) {
            return Err(injected(FailurePoint::Prepare));
        }
        self.ledger.record(|s| s.statements_prepared += 1);

        Ok(MockStatement {
            script: Arc::clone(&self.script),
            ledger: self.ledger.clone(),
            command: command.to_string(),
        })
    }

    fn url(&self) -> Option<String> {
        self.script.url.clone()
    }

    fn close(self) -> DriverResult<()> {
        self.ledger.record(|s| s.connections_closed += 1);
        if self.script.fails_at(FailurePoint::CloseConnection) {
            return Err(injected(FailurePoint::CloseConnection));
        }
        Ok(())
    }
}

/// Statement prepared by a [`MockConnection`].
///
/// Positional placeholders are the `?` characters of the command; a named
/// parameter is accepted when the command contains it.
#[derive(Debug)]
pub struct MockStatement {
    script: Arc<Script>,
    ledger: MockLedger,
    command: String,
}

impl Parameters for MockStatement {
    fn parameter_count(&self) -> usize {
        self.command.matches('?').count()
    }

    fn set(&mut self, index: usize, value: Value) -> Result<(), BindError> {
        if self.script.fails_at(FailurePoint::Bind) {
            return Err(BindError::Driver(injected(FailurePoint::Bind).to_string()));
        }
        let count = self.parameter_count();
        if index == 0 || index > count {
            return Err(BindError::IndexOutOfRange { index, count });
        }
        self.ledger.record(|s| s.bound.push((index, value)));
        Ok(())
    }

    fn set_named(&mut self, name: &str, value: Value) -> Result<(), BindError> {
        if self.script.fails_at(FailurePoint::Bind) {
            return Err(BindError::Driver(injected(FailurePoint::Bind).to_string()));
        }
        if !self.command.contains(name) {
            return Err(BindError::UnknownName(name.to_string()));
        }
        self.ledger
            .record(|s| s.bound_named.push((name.to_string(), value)));
        Ok(())
    }
}

impl Statement for MockStatement {
    type Cursor<'s>
        = MockCursor
    where
        Self: 's;

    fn query(&mut self) -> DriverResult<MockCursor> {
        if self.script.fails_at(FailurePoint::Query) {
            return Err(injected(FailurePoint::Query));
        }
        self.ledger.record(|s| s.cursors_opened += 1);

        let rows = self
            .script
            .rows
            .iter()
            .map(|values| MockRow {
                columns: Arc::clone(&self.script.columns),
                values: values.clone(),
            })
            .collect();

        Ok(MockCursor {
            script: Arc::clone(&self.script),
            ledger: self.ledger.clone(),
            rows,
            position: 0,
        })
    }

    fn execute(&mut self) -> DriverResult<usize> {
        if self.script.fails_at(FailurePoint::Execute) {
            return Err(injected(FailurePoint::Execute));
        }
        Ok(self.script.affected)
    }

    fn close(self) -> DriverResult<()> {
        self.ledger.record(|s| s.statements_closed += 1);
        if self.script.fails_at(FailurePoint::CloseStatement) {
            return Err(injected(FailurePoint::CloseStatement));
        }
        Ok(())
    }
}

/// Cursor over the scripted rows.
#[derive(Debug)]
pub struct MockCursor {
    script: Arc<Script>,
    ledger: MockLedger,
    rows: Vec<MockRow>,
    position: usize,
}

impl Cursor for MockCursor {
    fn next_row(&mut self) -> DriverResult<Option<&dyn Row>> {
        let position = self.position;
        if self.script.fails_at(FailurePoint::Fetch(position)) {
            return Err(injected(FailurePoint::Fetch(position)));
        }
        self.position += 1;
        Ok(self.rows.get(position).map(|row| row as &dyn Row))
    }

    fn close(self) -> DriverResult<()> {
        self.ledger.record(|s| s.cursors_closed += 1);
        if self.script.fails_at(FailurePoint::CloseCursor) {
            return Err(injected(FailurePoint::CloseCursor));
        }
        Ok(())
    }
}

/// One scripted row.
#[derive(Debug, Clone)]
pub struct MockRow {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row for MockRow {
    fn column_count(&self) -> usize {
        self.values.len()
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
            .ok_or_else(|| ParseError::MissingColumn(format!("#{index}")))
    }
}
