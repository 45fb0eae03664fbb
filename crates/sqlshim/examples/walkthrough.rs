//! Runs a few queries and updates against a shared in-memory SQLite database.
//!
//! ```bash
//! cargo run -p sqlshim --example walkthrough
//! RUST_LOG=sqlshim=debug cargo run -p sqlshim --example walkthrough
//! ```

use std::sync::Arc;

use anyhow::Result;
use sqlshim::sqlite::SqliteProvider;
use sqlshim::{Executor, ExecutorConfig, ExecutorError, Operation, QueryOperation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug)]
struct Task {
    id: i64,
    title: String,
    done: bool,
}

fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sqlshim=info,walkthrough=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let provider = Arc::new(SqliteProvider::in_memory("walkthrough")?);
    let executor = Executor::with_config("walkthrough", provider, ExecutorConfig::from_env())?;
    tracing::info!(info = executor.info(), "Executor ready");

    executor.execute_update(&Operation::without_parameters(
        "CREATE TABLE tasks (id INTEGER PRIMARY KEY, title TEXT NOT NULL, done INTEGER NOT NULL DEFAULT 0)",
    )?)?;

    for title in ["write docs", "review pool settings", "ship it"] {
        let insert = Operation::new("INSERT INTO tasks (title) VALUES (:title)", move |p| {
            p.bind_named(":title", title)
        })?;
        executor.execute_update(&insert)?;
    }

    let finish = Operation::new("UPDATE tasks SET done = 1 WHERE id = ?", |p| p.bind(1, 1))?;
    let changed = executor.execute_update(&finish)?;
    tracing::info!(changed, "Marked tasks done");

    let all_tasks = QueryOperation::new(
        "SELECT id, title, done FROM tasks ORDER BY id",
        |_| Ok(()),
        |row| {
            Ok(Task {
                id: row.get("id")?,
                title: row.get("title")?,
                done: row.get("done")?,
            })
        },
    )?;

    for task in executor.execute_query(&all_tasks)? {
        tracing::info!(id = task.id, title = %task.title, done = task.done, "Task");
    }

    match executor.execute_query_with_limit(&all_tasks, 2) {
        Err(ExecutorError::ExceedLimit { limit, .. }) => {
            tracing::info!(limit, "Ceiling enforced: more rows than allowed")
        }
        other => anyhow::bail!("expected the row ceiling to trip, got {other:?}"),
    }

    let by_id = |id: i64| {
        QueryOperation::new(
            "SELECT title FROM tasks WHERE id = ?",
            move |p| p.bind(1, id),
            |row| row.get::<String>(0),
        )
    };
    tracing::info!(title = ?executor.execute_query_unique(&by_id(2)?)?, "Lookup of task 2");
    tracing::info!(title = ?executor.execute_query_unique(&by_id(99)?)?, "Lookup of task 99");

    Ok(())
}
