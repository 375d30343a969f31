//! Persistence for analysis records.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub mod models;
pub mod repositories;

pub use models::{AnalysisRecord, CreateAnalysis};
pub use repositories::{AnalysisRepository, HISTORY_LIMIT};

/// Creates a connection pool to the SQLite database, creating the file if needed.
///
/// An in-memory URL (`sqlite::memory:`) gives every pooled connection its own
/// database, so such pools should be created with `max_connections = 1`.
///
/// # Errors
///
/// Returns an error if the URL is invalid or the connection fails.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

/// Runs all pending migrations.
///
/// # Errors
///
/// Returns an error if running migrations fails.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
