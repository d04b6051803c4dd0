// storage/migrations.rs
// Schema migrations

use sqlx::migrate::Migrator;
use sqlx::{Pool, Sqlite};

use crate::error_handling::DatabaseError;

/// The SQL files under `migrations/`, embedded at build time.
static MIGRATOR: Migrator = sqlx::migrate!();

/// Applies the embedded migrations. Already-applied versions are skipped, so
/// every pool can run this on open.
pub async fn run_migrations(pool: &Pool<Sqlite>) -> Result<(), DatabaseError> {
    MIGRATOR.run(pool).await?;
    Ok(())
}
