//! Bounded row collection.
//!
//! Pulls at most `limit` rows from a cursor through a query operation's
//! mapper, then probes for one more row. A surplus row is an error: the
//! caller asked for a ceiling, and truncating would silently drop data.

use crate::driver::Cursor;
use crate::error::{ExecutorError, Result};

use super::types::{Command, QueryOperation};

/// Collects up to `limit` mapped rows in cursor order.
///
/// Fails with [`ExecutorError::ExceedLimit`] when the cursor holds more than
/// `limit` rows; no partial data is returned in that case.
pub fn collect_bounded<C, T>(cursor: &mut C, op: &QueryOperation<T>, limit: usize) -> Result<Vec<T>>
where
    C: Cursor,
{
    let mut rows = Vec::with_capacity(limit.min(64));

    while rows.len() < limit {
        match cursor.next_row().map_err(fetch_failed)? {
            Some(row) => rows.push(op.map_row(row)?),
            None => return Ok(rows),
        }
    }

    if cursor.next_row().map_err(fetch_failed)?.is_some() {
        return Err(ExecutorError::ExceedLimit {
            command: op.command().to_string(),
            limit,
        });
    }

    Ok(rows)
}

fn fetch_failed(err: crate::error::DriverError) -> ExecutorError {
    ExecutorError::ExecutionFailed(format!("failed to fetch row: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{Row, Value};
    use crate::error::{DriverError, DriverResult, ParseError};

    struct IntRow(i64);

    impl Row for IntRow {
        fn column_count(&self) -> usize {
            1
        }

        fn column_index(&self, name: &str) -> Option<usize> {
            (name == "n").then_some(0)
        }

        fn value(&self, _index: usize) -> std::result::Result<Value, ParseError> {
            Ok(Value::Integer(self.0))
        }
    }

    /// Cursor over `0..total`, optionally failing when asked for row `fail_at`.
    struct CountingCursor {
        rows: Vec<IntRow>,
        position: usize,
        fetches: usize,
        fail_at: Option<usize>,
    }

    impl CountingCursor {
        fn new(total: i64) -> Self {
            Self {
                rows: (0..total).map(IntRow).collect(),
                position: 0,
                fetches: 0,
                fail_at: None,
            }
        }
    }

    impl Cursor for CountingCursor {
        fn next_row(&mut self) -> DriverResult<Option<&dyn Row>> {
            self.fetches += 1;
            if self.fail_at == Some(self.position) {
                return Err(DriverError::new("connection reset"));
            }
            let row = self.rows.get(self.position);
            self.position += 1;
            Ok(row.map(|r| r as &dyn Row))
        }

        fn close(self) -> DriverResult<()> {
            Ok(())
        }
    }

    fn numbers() -> QueryOperation<i64> {
        QueryOperation::new("SELECT n FROM numbers", |_| Ok(()), |row| row.get("n")).unwrap()
    }

    #[test]
    fn test_fewer_rows_than_limit() {
        let mut cursor = CountingCursor::new(3);
        let rows = collect_bounded(&mut cursor, &numbers(), 10).unwrap();
        assert_eq!(rows, vec![0, 1, 2]);
    }

    #[test]
    fn test_exactly_limit_rows_probes_once() {
        let mut cursor = CountingCursor::new(3);
        let rows = collect_bounded(&mut cursor, &numbers(), 3).unwrap();
        assert_eq!(rows, vec![0, 1, 2]);
        assert_eq!(cursor.fetches, 4);
    }

    #[test]
    fn test_one_row_over_limit_fails() {
        let mut cursor = CountingCursor::new(4);
        let result = collect_bounded(&mut cursor, &numbers(), 3);
        assert_eq!(
            result,
            Err(ExecutorError::ExceedLimit {
                command: "SELECT n FROM numbers".to_string(),
                limit: 3,
            })
        );
    }

    #[test]
    fn test_zero_limit() {
        let mut empty = CountingCursor::new(0);
        assert_eq!(collect_bounded(&mut empty, &numbers(), 0), Ok(vec![]));

        let mut one = CountingCursor::new(1);
        assert!(collect_bounded(&mut one, &numbers(), 0)
            .unwrap_err()
            .is_exceed_limit());
    }

    #[test]
    fn test_mapping_failure_stops_collection() {
        let op: QueryOperation<i64> = QueryOperation::new(
            "SELECT n FROM numbers",
            |_| Ok(()),
            |row| {
                let n: i64 = row.get(0)?;
                if n == 1 {
                    return Err(ParseError::Invalid("odd row".to_string()));
                }
                Ok(n)
            },
        )
        .unwrap();

        let mut cursor = CountingCursor::new(5);
        let result = collect_bounded(&mut cursor, &op, 10);
        assert_eq!(
            result,
            Err(ExecutorError::Parse(ParseError::Invalid("odd row".to_string())))
        );
        assert_eq!(cursor.fetches, 2);
    }

    #[test]
    fn test_fetch_failure_is_execution_error() {
        let mut cursor = CountingCursor::new(5);
        cursor.fail_at = Some(2);
        let result = collect_bounded(&mut cursor, &numbers(), 10);
        assert!(matches!(result, Err(ExecutorError::ExecutionFailed(_))));
    }

    #[test]
    fn test_fetch_failure_during_probe_is_execution_error() {
        let mut cursor = CountingCursor::new(2);
        cursor.fail_at = Some(2);
        let result = collect_bounded(&mut cursor, &numbers(), 2);
        assert!(matches!(result, Err(ExecutorError::ExecutionFailed(_))));
    }
}
