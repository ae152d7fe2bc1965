// src/routes/data.rs
//! `/data` endpoints: reading ingestion (`POST`) and hourly metric windows (`GET`).

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{ApiError, IngestParams, Metric, SensorStore, TimeWindow};

// ---

pub fn router() -> Router<SensorStore> {
    // ---
    Router::new().route(
        "/data",
        get(read_handler).post(ingest_handler).options(preflight),
    )
}

#[derive(Debug, Serialize)]
struct IngestResponse {
    message: &'static str,
    id: i64,
}

/// Handle `POST /data?lat=..&lng=..&temp=..&humidity=..&air=..&noise=..`.
async fn ingest_handler(
    State(store): State<SensorStore>,
    params: Result<Query<IngestParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    // ---
    let Query(params) = params?;
    debug!("POST /data - {:?}", params);

    let reading = params.parse()?;
    let id = store.insert(&reading).await?;

    info!("Stored reading {}", id);
    Ok((
        StatusCode::OK,
        Json(IngestResponse {
            message: "Data stored successfully",
            id,
        }),
    ))
}

/// Query parameters for `GET /data`.
#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    data_type: Option<String>,
    /// Calendar day, `YYYY-MM-DD`
    date: Option<String>,
    /// Hour the bucket ends at, `0`-`23`
    hour: Option<String>,
}

/// Handle `GET /data?data_type=..&date=..&hour=..`.
///
/// Any failure aborts the whole request; partial results are never sent.
async fn read_handler(
    State(store): State<SensorStore>,
    params: Result<Query<WindowQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    // ---
    let Query(params) = params?;
    debug!("GET /data - {:?}", params);

    let data_type = params
        .data_type
        .as_deref()
        .ok_or(ApiError::MissingParameter("data_type"))?;
    let date = params
        .date
        .as_deref()
        .ok_or(ApiError::MissingParameter("date"))?;
    let hour = params
        .hour
        .as_deref()
        .ok_or(ApiError::MissingParameter("hour"))?;

    let metric = Metric::from_param(data_type)?;
    let window = TimeWindow::resolve(date, hour)?;
    let records = store.fetch_window(metric, &window).await?;

    info!(
        "GET /data - {} readings of {} in [{}, {}]",
        records.len(),
        data_type,
        window.start,
        window.end
    );
    Ok((StatusCode::OK, Json(records)))
}

/// Browser preflight; the CORS headers are added by the router layers.
async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}
