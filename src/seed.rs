//! Synthetic readings for local test mode.
//!
//! Test mode throws away the previous test database, recreates it, and fills
//! it with uniformly random readings over the Valencia area spread across the
//! trailing five days, so the dashboard has something to draw.

use std::path::Path;

use anyhow::{anyhow, Result};
use chrono::{Duration, NaiveDateTime};
use rand::Rng;

use crate::models::NewReading;
use crate::store::SensorStore;
use crate::window::TIMESTAMP_FORMAT;

pub const LATITUDE_RANGE: (f64, f64) = (39.40, 39.50);
pub const LONGITUDE_RANGE: (f64, f64) = (-0.45, -0.32);
pub const TEMPERATURE_MAX: f64 = 40.0;
pub const PERCENT_MAX: f64 = 100.0;

/// Width of the trailing window synthetic timestamps are drawn from.
pub const HISTORY_SECONDS: i64 = 5 * 24 * 60 * 60;

// ---

/// Generate `count` readings with timestamps in `(now - 5 days, now]`.
pub fn generate<R: Rng>(count: usize, now: NaiveDateTime, rng: &mut R) -> Vec<(NewReading, String)> {
    // ---
    (0..count)
        .map(|_| {
            let reading = NewReading {
                latitude: rng.gen_range(LATITUDE_RANGE.0..LATITUDE_RANGE.1),
                longitude: rng.gen_range(LONGITUDE_RANGE.0..LONGITUDE_RANGE.1),
                temperature: rng.gen_range(0.0..TEMPERATURE_MAX),
                humidity: rng.gen_range(0.0..PERCENT_MAX),
                air_quality: rng.gen_range(0.0..PERCENT_MAX),
                noise: rng.gen_range(0.0..PERCENT_MAX),
            };
            let age = Duration::seconds(rng.gen_range(0..HISTORY_SECONDS));
            let timestamp = (now - age).format(TIMESTAMP_FORMAT).to_string();
            (reading, timestamp)
        })
        .collect()
}

/// Recreate the test database at `path` and load `rows` synthetic readings.
pub async fn bootstrap_test_store(path: &Path, rows: usize, pool_max: u32) -> Result<SensorStore> {
    // ---
    // The store runs in WAL mode, so stale sidecar files go too
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.as_os_str().to_owned();
        file.push(suffix);

        match tokio::fs::remove_file(&file).await {
            Ok(()) => tracing::info!("Removed previous test file {}", Path::new(&file).display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(anyhow!(
                    "Could not remove existing database '{}': {}",
                    Path::new(&file).display(),
                    e
                ))
            }
        }
    }

    let store = SensorStore::open(path, pool_max).await?;

    tracing::info!("Generating {} synthetic readings", rows);
    let now = chrono::Local::now().naive_local();
    let readings = generate(rows, now, &mut rand::thread_rng());

    let inserted = store
        .insert_batch(&readings)
        .await
        .map_err(|e| anyhow!("Could not insert synthetic readings: {}", e))?;
    tracing::info!("Inserted {} synthetic readings", inserted);

    Ok(store)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::NaiveDate;
    use rand::{rngs::StdRng, SeedableRng};

    fn fixed_now() -> NaiveDateTime {
        // ---
        NaiveDate::from_ymd_opt(2024, 3, 6)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_generated_values_stay_in_range() {
        // ---
        let now = fixed_now();
        let oldest = now - Duration::seconds(HISTORY_SECONDS);
        let readings = generate(2_000, now, &mut StdRng::seed_from_u64(7));

        assert_eq!(readings.len(), 2_000);
        for (r, ts) in &readings {
            assert!((LATITUDE_RANGE.0..=LATITUDE_RANGE.1).contains(&r.latitude));
            assert!((LONGITUDE_RANGE.0..=LONGITUDE_RANGE.1).contains(&r.longitude));
            assert!((0.0..TEMPERATURE_MAX).contains(&r.temperature));
            assert!((0.0..PERCENT_MAX).contains(&r.humidity));
            assert!((0.0..PERCENT_MAX).contains(&r.air_quality));
            assert!((0.0..PERCENT_MAX).contains(&r.noise));

            let stamped = NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).unwrap();
            assert!(stamped <= now && stamped > oldest, "timestamp {} out of window", ts);
        }
    }

    #[tokio::test]
    async fn test_bootstrap_loads_exact_row_count() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");

        let store = bootstrap_test_store(&path, 10_000, 2).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 10_000);

        let bounds: (f64, f64, f64, f64, f64, f64, f64, f64, f64) = sqlx::query_as(
            "SELECT MIN(latitude), MAX(latitude), MIN(longitude), MAX(longitude), \
             MAX(temperature), MAX(humidity), MAX(airQuality), MAX(noise), \
             MIN(MIN(temperature), MIN(humidity), MIN(airQuality), MIN(noise)) FROM Data",
        )
        .fetch_one(store.pool())
        .await
        .unwrap();

        assert!(bounds.0 >= 39.40 && bounds.1 <= 39.50);
        assert!(bounds.2 >= -0.45 && bounds.3 <= -0.32);
        assert!(bounds.4 < TEMPERATURE_MAX);
        assert!(bounds.5 < PERCENT_MAX && bounds.6 < PERCENT_MAX && bounds.7 < PERCENT_MAX);
        assert!(bounds.8 >= 0.0);
    }

    #[tokio::test]
    async fn test_bootstrap_replaces_previous_test_data() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");

        let first = bootstrap_test_store(&path, 50, 1).await.unwrap();
        first.pool().close().await;

        let second = bootstrap_test_store(&path, 20, 1).await.unwrap();
        assert_eq!(second.count().await.unwrap(), 20);
    }
}
