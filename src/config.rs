//! Configuration loader for the `urban-sensors` backend service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). Nothing else in the crate reads `env::var`.
//!
use std::{env, net::SocketAddr, path::PathBuf};

use anyhow::{anyhow, Result};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Read an optional string environment variable with a default value.
macro_rules! env_or {
    ($var_name:expr, $default:expr) => {
        env::var($var_name).unwrap_or_else(|_| $default.to_string())
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// SQLite file used in normal (production) mode.
    pub data_db_path: PathBuf,

    /// SQLite file recreated on every start in test mode.
    pub test_db_path: PathBuf,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,

    /// Number of synthetic readings inserted in test mode.
    pub test_rows: u32,

    /// Value sent in `Access-Control-Allow-Origin` on every response.
    pub cors_allow_origin: String,
}

impl Default for Config {
    fn default() -> Self {
        // ---
        Self {
            data_db_path: PathBuf::from("urban.db"),
            test_db_path: PathBuf::from("test.db"),
            db_pool_max: 5,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            test_rows: 10_000,
            cors_allow_origin: "*".to_string(),
        }
    }
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `DATA_DB_PATH` – production database file (default: `urban.db`)
/// - `TEST_DB_PATH` – test-mode database file (default: `test.db`)
/// - `DB_POOL_MAX` – max DB connections (default: 5)
/// - `BIND_ADDR` – listen address (default: `0.0.0.0:8080`)
/// - `TEST_ROWS` – synthetic readings generated in test mode (default: 10000)
/// - `CORS_ALLOW_ORIGIN` – allowed origin (default: `*`)
///
/// Returns an error if any variable is present but invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let defaults = Config::default();

    let data_db_path = PathBuf::from(env_or!("DATA_DB_PATH", defaults.data_db_path.display()));
    let test_db_path = PathBuf::from(env_or!("TEST_DB_PATH", defaults.test_db_path.display()));
    let db_pool_max = parse_env_u32!("DB_POOL_MAX", defaults.db_pool_max);
    let test_rows = parse_env_u32!("TEST_ROWS", defaults.test_rows);
    let cors_allow_origin = env_or!("CORS_ALLOW_ORIGIN", defaults.cors_allow_origin);

    let bind_addr = match env::var("BIND_ADDR") {
        Ok(v) => v
            .parse::<SocketAddr>()
            .map_err(|e| anyhow!("Invalid BIND_ADDR '{}': {}", v, e))?,
        Err(_) => defaults.bind_addr,
    };

    if db_pool_max == 0 {
        return Err(anyhow!("Invalid DB_POOL_MAX: must be at least 1"));
    }

    Ok(Config {
        data_db_path,
        test_db_path,
        db_pool_max,
        bind_addr,
        test_rows,
        cors_allow_origin,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  DATA_DB_PATH      : {}", self.data_db_path.display());
        tracing::info!("  TEST_DB_PATH      : {}", self.test_db_path.display());
        tracing::info!("  DB_POOL_MAX       : {}", self.db_pool_max);
        tracing::info!("  BIND_ADDR         : {}", self.bind_addr);
        tracing::info!("  TEST_ROWS         : {}", self.test_rows);
        tracing::info!("  CORS_ALLOW_ORIGIN : {}", self.cors_allow_origin);
    }
}
