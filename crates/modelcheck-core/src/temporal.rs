//! # Temporal Types: UTC Timestamps
//!
//! Defines `Timestamp`, the datetime carried by `datetime` fields. Every
//! timestamp is held in UTC with microsecond precision.
//!
//! ## Accepted Inputs
//!
//! - RFC 3339 strings with any offset (`2026-01-15T17:00:00+05:00`),
//!   converted to UTC.
//! - Naive ISO-8601 strings (`2026-01-15T12:00:00`, optional fraction,
//!   `T` or space separator), assumed UTC.
//! - Unix epoch seconds.
//!
//! ## Rendering
//!
//! `to_iso8601()` always ends in `Z`. Sub-second digits appear only when
//! the timestamp has them: `2026-01-15T12:00:00Z`,
//! `2026-01-15T12:00:00.250Z`.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelcheckError;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A UTC timestamp, truncated to microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time.
    pub fn now() -> Self {
        Self::from_utc(Utc::now())
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating to
    /// microseconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_micros(dt))
    }

    /// Parse an RFC 3339 or naive ISO-8601 string.
    ///
    /// Offsets are converted to UTC; naive inputs are taken as UTC.
    ///
    /// # Errors
    ///
    /// Returns `ModelcheckError::InvalidTimestamp` if no accepted format
    /// matches.
    pub fn parse(s: &str) -> Result<Self, ModelcheckError> {
        let trimmed = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self::from_utc(dt.with_timezone(&Utc)));
        }
        for fmt in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
                return Ok(Self::from_utc(naive.and_utc()));
            }
        }
        Err(ModelcheckError::InvalidTimestamp(format!(
            "{s:?} is not an ISO-8601 datetime"
        )))
    }

    /// Create a timestamp from a Unix epoch timestamp (seconds).
    pub fn from_epoch_secs(secs: i64) -> Result<Self, ModelcheckError> {
        let dt = DateTime::from_timestamp(secs, 0).ok_or_else(|| {
            ModelcheckError::InvalidTimestamp(format!("epoch seconds out of range: {secs}"))
        })?;
        Ok(Self(dt))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the Unix epoch timestamp in seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Render as ISO-8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate_to_micros(dt: DateTime<Utc>) -> DateTime<Utc> {
    let nanos = dt.nanosecond() / 1_000 * 1_000;
    dt.with_nanosecond(nanos).unwrap_or(dt)
}
