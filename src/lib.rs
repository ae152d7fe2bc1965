//! Data-access core of the urban sensor backend.
//!
//! Readings (position, timestamp, temperature, humidity, air quality, noise)
//! are appended to a single SQLite table and served back one metric at a
//! time, bucketed by hour, as `{lat, lng, timestamp, value}` records.
//!
//! Module boundaries follow the Explicit Module Boundary Pattern (EMBP):
//! sibling modules only reach each other through the re-exports below, and
//! `main.rs` only needs [`config`], [`seed`], [`SensorStore`] and [`router`].

pub mod config;
mod error;
mod models;
mod routes;
mod schema;
pub mod seed;
mod statements;
mod store;
mod window;

pub use config::Config;
pub use error::ApiError;
pub use models::{IngestParams, Metric, NewReading, ResponseRecord};
pub use routes::router;
pub use store::SensorStore;
pub use window::{TimeWindow, TIMESTAMP_FORMAT};
