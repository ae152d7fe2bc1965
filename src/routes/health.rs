// src/routes/health.rs
//! Health check endpoint for the urban sensor backend.
//!
//! `GET /health` is used by container orchestrators and the dashboard to see
//! whether the service is up *and* can still reach its SQLite store. Unlike
//! the `/data` endpoints it never answers `400`: the store being unreachable
//! is reported as `503 Service Unavailable`.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use crate::SensorStore;

/// JSON response body for the `/health` endpoint.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    /// Number of stored readings, absent when the store could not be queried.
    readings: Option<i64>,
}

/// Handle `GET /health`.
async fn health(State(store): State<SensorStore>) -> (StatusCode, Json<HealthResponse>) {
    // ---
    match store.count().await {
        Ok(count) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                readings: Some(count),
            }),
        ),
        Err(e) => {
            tracing::error!("Health check could not reach store: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable",
                    readings: None,
                }),
            )
        }
    }
}

/// Create a subrouter containing the `/health` route.
pub fn router() -> Router<SensorStore> {
    Router::new().route("/health", get(health))
}
