//! Request-level error taxonomy.
//!
//! Startup failures are plain `anyhow` errors surfaced from `main`. Everything
//! that can go wrong while serving one request is an [`ApiError`]: it aborts
//! that request only, is logged, and is returned to the caller as
//! `400 Bad Request` with a JSON string body.

use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

// ---

#[derive(Debug, Error)]
pub enum ApiError {
    // ---
    #[error("malformed query string: {0}")]
    Query(#[from] QueryRejection),

    #[error("missing query parameter '{0}'")]
    MissingParameter(&'static str),

    #[error("invalid query parameter '{field}': {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("unrecognized data_type '{0}' (expected one of: temp, humidity, air, noise)")]
    UnknownMetric(String),

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
}

impl ApiError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ApiError::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // ---
        match &self {
            ApiError::Store(e) => tracing::error!("Request failed in store: {}", e),
            other => tracing::warn!("Request rejected: {}", other),
        }

        (StatusCode::BAD_REQUEST, Json(format!("error: {}", self))).into_response()
    }
}
