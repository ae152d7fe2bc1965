//! Application entry point for the `urban-sensors` backend service.
//!
//! This binary orchestrates the full startup sequence:
//! - Parsing the command line (`--test` selects the synthetic test store)
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Opening the SQLite store, creating the schema and preparing statements
//! - Mounting the API routes and serving requests with Axum
//!
//! Any startup failure is returned from `main`, so the process exits with a
//! non-zero status instead of serving traffic against a broken store.
//!
//! # Environment Variables
//! - `DATA_DB_PATH`, `TEST_DB_PATH`, `DB_POOL_MAX`, `BIND_ADDR`, `TEST_ROWS`,
//!   `CORS_ALLOW_ORIGIN` – see [`urban_sensors::config`]
//! - `AXUM_LOG_LEVEL` (optional) – log verbosity (default: `info`)
//! - `AXUM_SPAN_EVENTS` (optional) – span event mode for tracing
use std::{env, io::IsTerminal};

use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use urban_sensors::{config, seed, SensorStore};

#[derive(Parser)]
#[command(name = "urban-sensors", about = "Urban environmental sensor backend")]
#[command(version)]
struct Cli {
    /// Recreate the test database and fill it with synthetic readings
    #[arg(long)]
    test: bool,
}

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    let cli = Cli::parse();
    dotenv().ok();
    init_tracing();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let store = if cli.test {
        tracing::info!("Initializing in TEST mode");
        seed::bootstrap_test_store(&cfg.test_db_path, cfg.test_rows as usize, cfg.db_pool_max)
            .await?
    } else {
        SensorStore::open(&cfg.data_db_path, cfg.db_pool_max).await?
    };

    let app = urban_sensors::router(store, &cfg)?;

    tracing::info!("Listening on {}", cfg.bind_addr);
    let listener = tokio::net::TcpListener::bind(cfg.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// - Colors follow `FORCE_COLOR` (`1|true|yes` on, `0|false|no` off) and
///   otherwise TTY detection.
/// - `AXUM_SPAN_EVENTS` = `"full"` or `"enter_exit"` selects span events;
///   anything else emits CLOSE events only.
/// - `RUST_LOG` wins when set; otherwise `AXUM_LOG_LEVEL` picks the level
///   (default `info`) with sqlx statement logging held at `warn`.
fn init_tracing() {
    // ---
    let span_events = match env::var("AXUM_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("AXUM_LOG_LEVEL").ok().as_deref() {
            Some(level @ ("trace" | "debug" | "info" | "warn" | "error")) => level.to_string(),
            _ => "info".to_string(),
        };
        EnvFilter::new(format!("{level},sqlx::query=warn,tower_http=debug"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
