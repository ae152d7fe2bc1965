use anyhow::{anyhow, Result};
use axum::{
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
        HeaderValue,
    },
    Router,
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::{Config, SensorStore};

mod data;
mod health;

pub const ALLOWED_METHODS: &str = "GET, POST";
pub const ALLOWED_HEADERS: &str =
    "Origin, Content-Type, Content-Length, Accept-Encoding, X-CSRF-Token, Authorization";

// ---

/// Build the full application router.
///
/// Every response, errors included, carries the permissive CORS headers.
pub fn router(store: SensorStore, config: &Config) -> Result<Router> {
    // ---
    let allow_origin = HeaderValue::from_str(&config.cors_allow_origin)
        .map_err(|e| anyhow!("Invalid CORS_ALLOW_ORIGIN '{}': {}", config.cors_allow_origin, e))?;

    Ok(Router::new()
        .merge(data::router())
        .merge(health::router())
        .with_state(store)
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            allow_origin,
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        ))
        .layer(TraceLayer::new_for_http()))
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_cors_headers_on_success_and_error() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        let store = SensorStore::open(&dir.path().join("cors.db"), 1)
            .await
            .unwrap();
        let app = router(store, &Config::default()).unwrap();

        for uri in [
            "/health",
            "/data?data_type=temp&date=2024-03-01&hour=15",
            "/data?data_type=pressure&date=2024-03-01&hour=15",
        ] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            let headers = response.headers();

            assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*", "{}", uri);
            assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], ALLOWED_METHODS, "{}", uri);
            assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], ALLOWED_HEADERS, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_configured_origin_is_used() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        let store = SensorStore::open(&dir.path().join("cors.db"), 1)
            .await
            .unwrap();
        let config = Config {
            cors_allow_origin: "https://dashboard.example".to_string(),
            ..Config::default()
        };
        let app = router(store, &config).unwrap();

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(
            response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://dashboard.example"
        );
    }

    #[tokio::test]
    async fn test_invalid_origin_is_rejected() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        let store = SensorStore::open(&dir.path().join("cors.db"), 1)
            .await
            .unwrap();
        let config = Config {
            cors_allow_origin: "bad\norigin".to_string(),
            ..Config::default()
        };

        let err = router(store, &config).unwrap_err();
        assert!(err.to_string().contains("CORS_ALLOW_ORIGIN"));
    }
}
