//! Database bootstrap.

use anyhow::Result;
use sqlx::SqlitePool;

/// Schema statements, embedded at compile time.
const INIT_SQL: &str = include_str!("../migrations/0001_init.sql");

/// Run the schema migration statement by statement (SQLite executes a single
/// statement per call). All statements are idempotent, so this is safe to
/// run on every startup.
pub async fn run_migrations(db: &SqlitePool) -> Result<()> {
    let statements = INIT_SQL
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    tracing::debug!("Running {} migration statements...", statements.len());

    for stmt in statements {
        sqlx::query(stmt).execute(db).await?;
    }

    Ok(())
}
