//! Database connection pool management.
//!
//! Pools are created with:
//! - the database file created on first use
//! - WAL journaling, so the store and concurrent consumers can share a file
//! - a busy timeout, so competing writers wait instead of failing
//! - the schema migrations applied

use std::str::FromStr;
use std::time::Duration;

use log::{debug, error};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use super::migrations::run_migrations;
use crate::error_handling::DatabaseError;

/// Connections per pool for file-backed databases.
const DEFAULT_MAX_CONNECTIONS: u32 = 8;
/// How long a writer waits for a competing writer's lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a migrated pool for `database_url` (`sqlite://path` or `sqlite::memory:`).
///
/// # Errors
///
/// Returns `DatabaseError::InvalidUrl` for an unparseable URL, or the
/// connection/migration error.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool, DatabaseError> {
    // Each in-memory connection would otherwise see a different database
    let max_connections = if database_url.contains(":memory:") {
        1
    } else {
        DEFAULT_MAX_CONNECTIONS
    };
    init_pool_with(database_url, max_connections).await
}

/// Like `init_pool`, with an explicit connection limit.
///
/// # Errors
///
/// See `init_pool`.
pub async fn init_pool_with(
    database_url: &str,
    max_connections: u32,
) -> Result<SqlitePool, DatabaseError> {
    if !database_url.starts_with("sqlite:") {
        return Err(DatabaseError::InvalidUrl(database_url.to_string()));
    }
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|_| DatabaseError::InvalidUrl(database_url.to_string()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .map_err(|e| {
            error!("Failed to connect to database {}: {e}", database_url);
            DatabaseError::SqlError(e)
        })?;

    run_migrations(&pool).await?;
    debug!("Database {} ready", database_url);
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_pool_creates_file_and_schema() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested.db");
        let url = format!("sqlite://{}", path.display());

        let pool = init_pool(&url).await.expect("pool should open");
        assert!(path.exists());

        let tables: Vec<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
                .fetch_all(&pool)
                .await
                .expect("list tables");
        for table in ["queue_jobs", "queues", "url_analysis"] {
            assert!(tables.iter().any(|t| t == table), "missing table {}", table);
        }
        pool.close().await;
    }

    #[tokio::test]
    async fn test_init_pool_is_idempotent() {
        let dir = tempfile::tempdir().expect("temp dir");
        let url = format!("sqlite://{}", dir.path().join("twice.db").display());
        init_pool(&url).await.expect("first open").close().await;
        init_pool(&url).await.expect("second open").close().await;
    }

    #[tokio::test]
    async fn test_init_pool_rejects_bad_url() {
        let err = init_pool("postgres://localhost/db").await.unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidUrl(_)));
    }
}
