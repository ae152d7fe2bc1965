//! The sensor store: one SQLite pool plus its prepared statements.
//!
//! A [`SensorStore`] is built once at startup and cloned into every request
//! handler. Cloning is cheap (the pool is reference counted) and there is no
//! global state. Concurrent inserts and reads run as independent statements;
//! isolation is left to SQLite.

use std::path::Path;

use anyhow::{anyhow, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::models::{Metric, NewReading, ResponseRecord};
use crate::schema;
use crate::statements::Statements;
use crate::window::TimeWindow;

// ---

#[derive(Debug, Clone)]
pub struct SensorStore {
    // ---
    pool: SqlitePool,
    statements: Statements,
}

impl SensorStore {
    /// Open (creating if absent) the database at `path`, ensure the schema,
    /// and prepare every statement. Any failure here is a startup error.
    pub async fn open(path: &Path, pool_max: u32) -> Result<Self> {
        // ---
        tracing::info!("Opening sensor store at {}", path.display());

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_max)
            .connect_with(options)
            .await
            .map_err(|e| anyhow!("Failed to open database '{}': {}", path.display(), e))?;

        schema::create_schema(&pool).await?;
        let statements = Statements::prepare(&pool).await?;

        tracing::info!("Sensor store ready");
        Ok(Self { pool, statements })
    }

    /// Append a reading stamped with the store's current local time.
    /// Returns the new row id.
    pub async fn insert(&self, reading: &NewReading) -> Result<i64, sqlx::Error> {
        // ---
        let result = sqlx::query(self.statements.insert())
            .bind(reading.latitude)
            .bind(reading.longitude)
            .bind(reading.temperature)
            .bind(reading.humidity)
            .bind(reading.air_quality)
            .bind(reading.noise)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    /// Append a reading with an explicit `YYYY-MM-DD HH:MM:SS` timestamp.
    #[cfg(test)]
    pub async fn insert_at(&self, reading: &NewReading, timestamp: &str) -> Result<i64, sqlx::Error> {
        // ---
        let result = self.bind_at(reading, timestamp).execute(&self.pool).await?;
        Ok(result.last_insert_rowid())
    }

    /// Append many timestamped readings in a single transaction.
    ///
    /// Either every row is written or none is.
    pub async fn insert_batch(&self, readings: &[(NewReading, String)]) -> Result<u64, sqlx::Error> {
        // ---
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for (reading, timestamp) in readings {
            inserted += self
                .bind_at(reading, timestamp)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Every reading inside `window` (bounds inclusive), projected onto
    /// `metric`, in the order the store yields them.
    pub async fn fetch_window(
        &self,
        metric: Metric,
        window: &TimeWindow,
    ) -> Result<Vec<ResponseRecord>, sqlx::Error> {
        // ---
        tracing::debug!(
            "Reading {} between {} and {}",
            metric.column(),
            window.start,
            window.end
        );

        sqlx::query_as::<_, ResponseRecord>(self.statements.select(metric))
            .bind(&window.start)
            .bind(&window.end)
            .fetch_all(&self.pool)
            .await
    }

    /// Total number of stored readings.
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        // ---
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM Data")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn bind_at<'q>(
        &self,
        reading: &NewReading,
        timestamp: &'q str,
    ) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
        // ---
        sqlx::query(self.statements.insert_at())
            .bind(reading.latitude)
            .bind(reading.longitude)
            .bind(timestamp)
            .bind(reading.temperature)
            .bind(reading.humidity)
            .bind(reading.air_quality)
            .bind(reading.noise)
    }
}
