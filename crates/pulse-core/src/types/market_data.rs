//! Payloads flowing from fetchers to the aggregator.
//!
//! A [`FetchResult`] pairs a kind-specific [`FetchPayload`] with the
//! [`Selection`] it was requested under, so the consumer can tell whether the
//! answer still matches what the user is looking at.
//!
//! # Timestamp convention
//!
//! Candle timestamps are **seconds since Unix epoch**, as the exchange sends them.

use serde::{Deserialize, Serialize};

use super::enums::{Currency, DataKind, TimeRange};

/// FX rate (EUR per USD) reported whenever the rate fetch fails.
pub const FX_FALLBACK_RATE: f64 = 0.92;

// ---------------------------------------------------------------------------
// Candle
// ---------------------------------------------------------------------------

/// One OHLC record for a time bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    /// Mid-price: mean of high and low.
    #[inline]
    pub fn mid(&self) -> f64 {
        (self.high + self.low) / 2.0
    }
}

/// Sort candles by timestamp and drop later duplicates of a timestamp.
pub fn normalize_candles(mut candles: Vec<Candle>) -> Vec<Candle> {
    candles.sort_by_key(|c| c.timestamp);
    candles.dedup_by_key(|c| c.timestamp);
    candles
}

// ---------------------------------------------------------------------------
// Price / sentiment
// ---------------------------------------------------------------------------

/// Last-trade price of BTC in a fiat currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub amount: f64,
    pub currency: Currency,
}

/// Fear & Greed reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentiment {
    /// 0 (extreme fear) ..= 100 (extreme greed).
    pub index: u8,
    /// Provider classification, e.g. `"Greed"`.
    pub label: String,
}

/// Coarse band of a sentiment index, used by presenters for colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SentimentBand {
    Fear,
    Neutral,
    Greed,
}

impl Sentiment {
    pub fn band(&self) -> SentimentBand {
        match self.index {
            0..=44 => SentimentBand::Fear,
            45..=59 => SentimentBand::Neutral,
            _ => SentimentBand::Greed,
        }
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// What the user currently looks at. Fetches are tagged with the selection
/// they were issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Selection {
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub time_range: TimeRange,
}

impl Selection {
    /// Whether a result of `kind` issued under `self` is still valid for the
    /// `current` selection. Sentiment and FX rate do not depend on it.
    pub fn still_applies(&self, kind: DataKind, current: &Selection) -> bool {
        match kind {
            DataKind::Price => self.currency == current.currency,
            DataKind::History => self == current,
            DataKind::Sentiment | DataKind::FxRate => true,
        }
    }
}

// ---------------------------------------------------------------------------
// FetchPayload / FetchResult: tagged union for channel passing
// ---------------------------------------------------------------------------

/// Normalized outcome of one fetch. Failures are already folded into the
/// kind's fallback: `None` price/sentiment, empty history, [`FX_FALLBACK_RATE`].
#[derive(Debug, Clone, PartialEq)]
pub enum FetchPayload {
    Price(Option<PriceQuote>),
    History(Vec<Candle>),
    Sentiment(Option<Sentiment>),
    FxRate(f64),
}

impl FetchPayload {
    pub fn kind(&self) -> DataKind {
        match self {
            Self::Price(_) => DataKind::Price,
            Self::History(_) => DataKind::History,
            Self::Sentiment(_) => DataKind::Sentiment,
            Self::FxRate(_) => DataKind::FxRate,
        }
    }

    /// The payload a fetch of `kind` produces when anything goes wrong.
    pub fn fallback(kind: DataKind) -> Self {
        match kind {
            DataKind::Price => Self::Price(None),
            DataKind::History => Self::History(Vec::new()),
            DataKind::Sentiment => Self::Sentiment(None),
            DataKind::FxRate => Self::FxRate(FX_FALLBACK_RATE),
        }
    }
}

/// A payload plus the selection its request was issued under.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    pub issued_under: Selection,
    pub payload: FetchPayload,
}

impl FetchResult {
    pub fn new(issued_under: Selection, payload: FetchPayload) -> Self {
        Self { issued_under, payload }
    }

    #[inline]
    pub fn kind(&self) -> DataKind {
        self.payload.kind()
    }

    /// Whether this result was requested under a selection that is no longer
    /// current for its kind.
    pub fn is_stale(&self, current: &Selection) -> bool {
        !self.issued_under.still_applies(self.kind(), current)
    }
}
