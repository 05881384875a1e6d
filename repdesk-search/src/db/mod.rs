//! Database access for the search service
//!
//! SQLite file `repdesk.db` in the root folder holds the saved-records
//! collection.

pub mod saved_records;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // mode=rwc: read, write, create
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create the service's tables if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS saved_records (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            ipi_number TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('writer', 'publisher', 'performer')),
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_saved_records_created_at ON saved_records (created_at)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (saved_records)");

    Ok(())
}
