//! Database schema management for `urban-sensors`.
//!
//! Ensures the `Data` table and its timestamp index exist before serving
//! requests. Applied once on startup when the store is opened.

use anyhow::{anyhow, Result};
use sqlx::SqlitePool;

// ---

/// Create the database schema (idempotent).
///
/// One append-only `Data` table holds every reading. Metric columns are
/// `NOT NULL DEFAULT 0`: absent data is stored as 0, never as `NULL`. The
/// `timestamp` column defaults to the local insertion time in the
/// `YYYY-MM-DD HH:MM:SS` format the read path compares against.
///
/// Any failure is returned to the caller as a startup error.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    // ---
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| anyhow!("Could not open schema transaction: {}", e))?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS Data (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            latitude    REAL NOT NULL DEFAULT 0,
            longitude   REAL NOT NULL DEFAULT 0,
            timestamp   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%S', 'now', 'localtime')),
            temperature REAL NOT NULL DEFAULT 0,
            humidity    REAL NOT NULL DEFAULT 0,
            airQuality  REAL NOT NULL DEFAULT 0,
            noise       REAL NOT NULL DEFAULT 0
        );
        "#,
    )
    .execute(&mut *tx)
    .await
    .map_err(|e| anyhow!("Could not create table Data: {}", e))?;

    // Every read is a timestamp range scan
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_data_timestamp
            ON Data (timestamp);
        "#,
    )
    .execute(&mut *tx)
    .await
    .map_err(|e| anyhow!("Could not create index on Data.timestamp: {}", e))?;

    tx.commit().await?;
    Ok(())
}
