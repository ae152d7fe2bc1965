//! Hour-bucket resolution for the read path.
//!
//! A `(date, hour)` selector names the one-hour bucket that *ends* at
//! `date hour:00:00`. `hour = 0` therefore ends at midnight and starts at
//! 23:00 of the previous calendar day. Both bounds are inclusive, so a
//! reading stamped exactly on the hour belongs to the two buckets that share
//! that boundary.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::ApiError;

/// Storage format of the `timestamp` column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---

/// Inclusive `[start, end]` bounds, formatted for comparison against the
/// stored `timestamp` strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    // ---
    pub start: String,
    pub end: String,
}

impl TimeWindow {
    /// Resolve the raw `date` and `hour` query values into a window.
    pub fn resolve(date: &str, hour: &str) -> Result<Self, ApiError> {
        // ---
        let trimmed = date.trim();
        if !is_plain_iso_date(trimmed) {
            return Err(ApiError::invalid("date", format!("'{}' is not YYYY-MM-DD", date)));
        }
        let day = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map_err(|e| ApiError::invalid("date", format!("'{}' is not YYYY-MM-DD: {}", date, e)))?;

        let hour = hour
            .trim()
            .parse::<u32>()
            .map_err(|_| ApiError::invalid("hour", format!("'{}' is not an integer", hour)))?;

        Self::for_bucket(day, hour)
    }

    /// Window for the bucket ending at `day hour:00:00`.
    pub fn for_bucket(day: NaiveDate, hour: u32) -> Result<Self, ApiError> {
        // ---
        let time = NaiveTime::from_hms_opt(hour, 0, 0)
            .ok_or_else(|| ApiError::invalid("hour", format!("{} is outside 0-23", hour)))?;

        let end = NaiveDateTime::new(day, time);
        let start = end
            .checked_sub_signed(Duration::hours(1))
            .ok_or_else(|| ApiError::invalid("date", format!("{} has no previous hour", day)))?;

        Ok(TimeWindow {
            start: start.format(TIMESTAMP_FORMAT).to_string(),
            end: end.format(TIMESTAMP_FORMAT).to_string(),
        })
    }
}

/// Four-digit year, two-digit month and day: `chrono`'s `%Y` alone also
/// accepts signed and longer years.
fn is_plain_iso_date(date: &str) -> bool {
    // ---
    let bytes = date.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}
