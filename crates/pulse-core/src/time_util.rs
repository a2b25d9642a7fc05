//! Wall-clock helpers.
//!
//! Candle timestamps are **seconds** since Unix epoch (the exchange's unit);
//! everything else that needs a clock reads it through here so tests can pass
//! a fixed `DateTime<Utc>` instead.

use chrono::{DateTime, Utc};

/// Current UTC time.
#[inline]
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Build a UTC instant from epoch seconds, clamping invalid input to the epoch.
pub fn from_secs(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}
