use std::net::SocketAddr;

use anyhow::Result;
use chrono::{Duration, Local, NaiveDateTime, Timelike};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tempfile::TempDir;

use urban_sensors::{router, Config, SensorStore};

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Record {
    lat: f64,
    lng: f64,
    timestamp: String,
    value: f64,
}

/// Boot the full app on an ephemeral port backed by a throwaway database.
async fn spawn_app() -> Result<(TempDir, String)> {
    // ---
    let dir = tempfile::tempdir()?;
    let store = SensorStore::open(&dir.path().join("urban.db"), 4).await?;
    let app = router(store, &Config::default())?;

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let base = format!("http://{}", listener.local_addr()?);
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    Ok((dir, base))
}

/// `(date, hour)` query values of the bucket that contains `at`.
fn bucket_of(at: NaiveDateTime) -> (String, u32) {
    // ---
    let end = at + Duration::hours(1);
    (end.format("%Y-%m-%d").to_string(), end.hour())
}

async fn read_bucket(
    client: &Client,
    base: &str,
    data_type: &str,
    bucket: &(String, u32),
) -> Result<Vec<Record>> {
    // ---
    let url = format!(
        "{}/data?data_type={}&date={}&hour={}",
        base, data_type, bucket.0, bucket.1
    );
    let response = client.get(&url).send().await?;
    assert_eq!(response.status(), StatusCode::OK, "GET {} failed", url);
    Ok(response.json().await?)
}

#[tokio::test]
async fn posted_reading_is_served_for_every_metric() -> Result<()> {
    // ---
    let (_dir, base) = spawn_app().await?;
    let client = Client::new();

    let before = Local::now().naive_local();
    let response = client
        .post(format!(
            "{}/data?lat=39.4712&lng=-0.3791&temp=22.5&humidity=61&air=38.5&noise=54",
            base
        ))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let after = Local::now().naive_local();

    // The insert may straddle an hour boundary, so look in both candidate buckets
    let mut buckets = vec![bucket_of(before)];
    if bucket_of(after) != buckets[0] {
        buckets.push(bucket_of(after));
    }

    for (data_type, expected) in [("temp", 22.5), ("humidity", 61.0), ("air", 38.5), ("noise", 54.0)] {
        let mut found = Vec::new();
        for bucket in &buckets {
            found.extend(read_bucket(&client, &base, data_type, bucket).await?);
        }
        let matching: Vec<_> = found
            .iter()
            .filter(|r| r.lat == 39.4712 && r.lng == -0.3791)
            .collect();

        assert!(!matching.is_empty(), "{} reading not found in {:?}", data_type, buckets);
        assert!(matching.iter().all(|r| r.value == expected), "{} value mismatch", data_type);
    }

    Ok(())
}

#[tokio::test]
async fn repeated_reads_are_identical() -> Result<()> {
    // ---
    let (_dir, base) = spawn_app().await?;
    let client = Client::new();

    for i in 0..3 {
        let response = client
            .post(format!("{}/data?lat=39.45&lng=-0.40&temp={}&humidity=50&air=20&noise=30", base, 20 + i))
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let bucket = bucket_of(Local::now().naive_local());
    let first = read_bucket(&client, &base, "temp", &bucket).await?;
    let second = read_bucket(&client, &base, "temp", &bucket).await?;
    assert_eq!(first, second);

    Ok(())
}

#[tokio::test]
async fn errors_are_client_errors_with_cors_headers() -> Result<()> {
    // ---
    let (_dir, base) = spawn_app().await?;
    let client = Client::new();

    let cases = [
        (format!("{}/data?data_type=pressure&date=2024-03-01&hour=15", base), "GET"),
        (format!("{}/data?data_type=temp&date=2024-03-01&hour=x", base), "GET"),
        (format!("{}/data?lat=abc&lng=-0.38", base), "POST"),
    ];

    for (url, method) in cases {
        let response = match method {
            "GET" => client.get(&url).send().await?,
            _ => client.post(&url).send().await?,
        };
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{} {}", method, url);
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*",
            "{} {}",
            method,
            url
        );

        let body: String = response.json().await?;
        assert!(body.starts_with("error:"), "unexpected body {:?}", body);
    }

    Ok(())
}
