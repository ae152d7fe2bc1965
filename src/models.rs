//! Data models for urban sensor readings.
//!
//! A [`NewReading`] is what the write path persists; a [`ResponseRecord`] is
//! the uniform shape the read path returns no matter which [`Metric`] was
//! requested.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ---

/// One of the four measured quantities a read request can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    // ---
    Temperature,
    Humidity,
    AirQuality,
    Noise,
}

impl Metric {
    // ---
    pub const ALL: [Metric; 4] = [
        Metric::Temperature,
        Metric::Humidity,
        Metric::AirQuality,
        Metric::Noise,
    ];

    /// Resolve the `data_type` query value (`temp`, `humidity`, `air`, `noise`).
    pub fn from_param(value: &str) -> Result<Self, ApiError> {
        // ---
        match value {
            "temp" => Ok(Metric::Temperature),
            "humidity" => Ok(Metric::Humidity),
            "air" => Ok(Metric::AirQuality),
            "noise" => Ok(Metric::Noise),
            other => Err(ApiError::UnknownMetric(other.to_string())),
        }
    }

    /// Storage column holding this metric.
    pub fn column(self) -> &'static str {
        // ---
        match self {
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
            Metric::AirQuality => "airQuality",
            Metric::Noise => "noise",
        }
    }
}

/// A typed reading, ready to be bound to the insert statements.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NewReading {
    // ---
    pub latitude: f64,
    pub longitude: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub air_quality: f64,
    pub noise: f64,
}

/// Raw `POST /data` query parameters, exactly as the client sent them.
#[derive(Debug, Default, Deserialize)]
pub struct IngestParams {
    // ---
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub temp: Option<String>,
    pub humidity: Option<String>,
    pub air: Option<String>,
    pub noise: Option<String>,
}

impl IngestParams {
    /// Parse every field into a [`NewReading`].
    ///
    /// Absent fields become 0, the column default. A field that is present
    /// but is not a finite number is rejected. No range checks are applied.
    pub fn parse(&self) -> Result<NewReading, ApiError> {
        // ---
        Ok(NewReading {
            latitude: parse_field("lat", self.lat.as_deref())?,
            longitude: parse_field("lng", self.lng.as_deref())?,
            temperature: parse_field("temp", self.temp.as_deref())?,
            humidity: parse_field("humidity", self.humidity.as_deref())?,
            air_quality: parse_field("air", self.air.as_deref())?,
            noise: parse_field("noise", self.noise.as_deref())?,
        })
    }
}

fn parse_field(field: &'static str, raw: Option<&str>) -> Result<f64, ApiError> {
    // ---
    let Some(raw) = raw else {
        return Ok(0.0);
    };

    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| ApiError::invalid(field, format!("'{}' is not a number", raw)))?;

    if !value.is_finite() {
        return Err(ApiError::invalid(field, format!("'{}' is not a finite number", raw)));
    }
    Ok(value)
}

/// One row of a metric window, renamed generically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ResponseRecord {
    // ---
    pub lat: f64,
    pub lng: f64,
    pub timestamp: String,
    pub value: f64,
}
