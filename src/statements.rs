//! Parameterized statements used by the write and read paths.
//!
//! The four per-metric reads share one shape; the metric only chooses which
//! column is projected as `value`. Every statement is prepared once against
//! the live store when the registry is built, so a typo in SQL or a schema
//! mismatch stops the service before it accepts traffic. After that check the
//! registry only hands out SQL text: sqlx keeps the prepared handles in its
//! per-connection statement cache.

use anyhow::{anyhow, Result};
use sqlx::{Executor, SqlitePool};

use crate::models::Metric;

/// Insert with the store-assigned timestamp (lat, lng, temp, humidity, air, noise).
const INSERT_READING: &str = "INSERT INTO Data (latitude, longitude, temperature, humidity, airQuality, noise) \
     VALUES (?, ?, ?, ?, ?, ?)";

/// Insert with an explicit timestamp; only the test-mode loader uses it.
const INSERT_READING_AT: &str = "INSERT INTO Data (latitude, longitude, timestamp, temperature, humidity, airQuality, noise) \
     VALUES (?, ?, ?, ?, ?, ?, ?)";

/// Range read for `$column`, binding `start` then `end`, both inclusive.
macro_rules! select_window {
    ($column:literal) => {
        concat!(
            "SELECT latitude AS lat, longitude AS lng, timestamp, ",
            $column,
            " AS value FROM Data WHERE timestamp BETWEEN ? AND ?"
        )
    };
}

const SELECT_TEMPERATURE: &str = select_window!("temperature");
const SELECT_HUMIDITY: &str = select_window!("humidity");
const SELECT_AIR_QUALITY: &str = select_window!("airQuality");
const SELECT_NOISE: &str = select_window!("noise");

// ---

/// Zero-sized handle; only obtainable through [`Statements::prepare`].
#[derive(Debug, Clone, Copy)]
pub struct Statements {
    // ---
    _checked: (),
}

impl Statements {
    /// Prepare every statement against `pool`.
    pub async fn prepare(pool: &SqlitePool) -> Result<Self> {
        // ---
        check(pool, "reading insert", INSERT_READING).await?;
        check(pool, "timestamped reading insert", INSERT_READING_AT).await?;
        for metric in Metric::ALL {
            check(pool, metric.column(), select_sql(metric)).await?;
        }

        tracing::debug!("Prepared {} statements", 2 + Metric::ALL.len());
        Ok(Statements { _checked: () })
    }

    pub fn insert(&self) -> &'static str {
        INSERT_READING
    }

    pub fn insert_at(&self) -> &'static str {
        INSERT_READING_AT
    }

    /// Range read for one metric: binds `start` then `end`, both inclusive.
    pub fn select(&self, metric: Metric) -> &'static str {
        select_sql(metric)
    }
}

fn select_sql(metric: Metric) -> &'static str {
    // ---
    match metric {
        Metric::Temperature => SELECT_TEMPERATURE,
        Metric::Humidity => SELECT_HUMIDITY,
        Metric::AirQuality => SELECT_AIR_QUALITY,
        Metric::Noise => SELECT_NOISE,
    }
}

async fn check(pool: &SqlitePool, name: &str, sql: &str) -> Result<()> {
    // ---
    pool.prepare(sql)
        .await
        .map_err(|e| anyhow!("Could not prepare {} statement: {}", name, e))?;
    Ok(())
}
