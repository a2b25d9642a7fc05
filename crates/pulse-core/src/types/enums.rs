//! Enumerations used throughout the pulse pipeline.
//!
//! [`DataKind`] is the closed set of sources the pipeline tracks. [`Currency`]
//! and [`TimeRange`] together form the user's selection, which decides which
//! exchange pair and candle interval a fetch asks for.

use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PulseError;

// ---------------------------------------------------------------------------
// Data kinds
// ---------------------------------------------------------------------------

/// The four categories of external data the pipeline tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    Price,
    History,
    Sentiment,
    FxRate,
}

impl DataKind {
    /// Number of kinds.
    pub const COUNT: usize = 4;

    /// All kinds, in startup submission order.
    pub const ALL: [DataKind; Self::COUNT] = [Self::Price, Self::History, Self::Sentiment, Self::FxRate];

    /// Dense index for per-kind arrays.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::Price => 0,
            Self::History => 1,
            Self::Sentiment => 2,
            Self::FxRate => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::History => "history",
            Self::Sentiment => "sentiment",
            Self::FxRate => "fx_rate",
        }
    }
}

impl std::fmt::Display for DataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Currency
// ---------------------------------------------------------------------------

/// Fiat currency the BTC price is quoted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    #[default]
    Eur,
}

impl Currency {
    /// ISO code (`"USD"` / `"EUR"`).
    pub fn code(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
        }
    }

    /// Display symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Usd => "$",
            Self::Eur => "€",
        }
    }

    /// The other supported currency.
    pub fn opposite(self) -> Self {
        match self {
            Self::Usd => Self::Eur,
            Self::Eur => Self::Usd,
        }
    }

    /// Kraken request pair for BTC in this currency.
    pub fn kraken_pair(self) -> &'static str {
        match self {
            Self::Usd => "XBTUSD",
            Self::Eur => "XBTEUR",
        }
    }

    /// Key Kraken uses for the pair inside `result`.
    pub fn kraken_result_key(self) -> &'static str {
        match self {
            Self::Usd => "XXBTZUSD",
            Self::Eur => "XXBTZEUR",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            other => Err(PulseError::Config(format!("unknown currency: {other}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Time ranges
// ---------------------------------------------------------------------------

/// Named history ranges. Each fixes the candle interval requested from the
/// exchange and the trailing window used for the mid-price average.
///
/// | Range | Interval (min) | Window            |
/// |-------|----------------|-------------------|
/// | 12h   | 1              | 12 hours          |
/// | 31d   | 60             | 31 days           |
/// | 90d   | 240            | 90 days           |
/// | 365d  | 1440           | 365 days          |
/// | YTD   | 1440           | since Jan 1 (UTC) |
/// | ALL   | 10080          | unbounded         |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "12h")]
    H12,
    #[serde(rename = "31d")]
    D31,
    #[serde(rename = "90d")]
    D90,
    #[serde(rename = "365d")]
    D365,
    #[serde(rename = "YTD")]
    Ytd,
    #[serde(rename = "ALL")]
    All,
}

impl TimeRange {
    pub const ALL: [TimeRange; 6] = [Self::H12, Self::D31, Self::D90, Self::D365, Self::Ytd, Self::All];

    pub fn label(self) -> &'static str {
        match self {
            Self::H12 => "12h",
            Self::D31 => "31d",
            Self::D90 => "90d",
            Self::D365 => "365d",
            Self::Ytd => "YTD",
            Self::All => "ALL",
        }
    }

    /// Candle interval in minutes for the OHLC request.
    pub fn interval_minutes(self) -> u32 {
        match self {
            Self::H12 => 1,
            Self::D31 => 60,
            Self::D90 => 240,
            Self::D365 | Self::Ytd => 1440,
            Self::All => 10080,
        }
    }

    /// Start of the trailing window in epoch seconds, or `None` when the
    /// window is unbounded.
    pub fn window_start(self, now: DateTime<Utc>) -> Option<i64> {
        let lookback = match self {
            Self::H12 => Duration::hours(12),
            Self::D31 => Duration::days(31),
            Self::D90 => Duration::days(90),
            Self::D365 => Duration::days(365),
            Self::Ytd => {
                return Utc
                    .with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0)
                    .single()
                    .map(|start| start.timestamp());
            }
            Self::All => return None,
        };
        Some((now - lookback).timestamp())
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeRange {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| PulseError::Config(format!("unknown time range: {s}")))
    }
}
