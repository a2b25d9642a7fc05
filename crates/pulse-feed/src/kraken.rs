//! Kraken public REST endpoints: ticker and OHLC.
//!
//! | Data     | Method | Path                | Query                  |
//! |----------|--------|---------------------|------------------------|
//! | Price/FX | GET    | `/0/public/Ticker`  | `pair`                 |
//! | History  | GET    | `/0/public/OHLC`    | `pair`, `interval`     |
//!
//! Responses are `{"error": [...], "result": {<pair key>: ...}}`. A non-empty
//! `error` array is treated as a protocol failure.

use pulse_core::error::PulseError;
use pulse_core::types::{Candle, normalize_candles};
use serde_json::Value;
use tracing::trace;

use crate::json_util::{parse_str_f64, parse_str_i64};

pub fn ticker_url(base_url: &str) -> String {
    format!("{}/0/public/Ticker", base_url.trim_end_matches('/'))
}

pub fn ohlc_url(base_url: &str) -> String {
    format!("{}/0/public/OHLC", base_url.trim_end_matches('/'))
}

/// Locate `result[key]`, failing on API-reported errors.
fn result_entry<'a>(body: &'a Value, key: &str) -> Result<&'a Value, PulseError> {
    if let Some(errors) = body.get("error").and_then(Value::as_array) {
        if !errors.is_empty() {
            let joined: Vec<&str> = errors.iter().filter_map(Value::as_str).collect();
            return Err(PulseError::Protocol(format!("kraken error: {}", joined.join(", "))));
        }
    }
    body.get("result")
        .and_then(|r| r.get(key))
        .ok_or_else(|| PulseError::Protocol(format!("result.{key} missing")))
}

/// Last-trade price: `result[key].c[0]`.
pub fn parse_ticker_last(body: &Value, key: &str) -> Result<f64, PulseError> {
    let last = result_entry(body, key)?
        .get("c")
        .and_then(|c| c.get(0))
        .ok_or_else(|| PulseError::Protocol(format!("result.{key}.c[0] missing")))?;
    parse_str_f64(Some(last)).ok_or_else(|| PulseError::Data(format!("unparsable last price: {last}")))
}

/// OHLC rows: `result[key] = [[time, open, high, low, close, vwap, volume, count], ...]`.
///
/// Malformed rows are skipped. The output is ascending by timestamp with no
/// duplicate timestamps; it may be empty.
pub fn parse_ohlc(body: &Value, key: &str) -> Result<Vec<Candle>, PulseError> {
    let rows = result_entry(body, key)?
        .as_array()
        .ok_or_else(|| PulseError::Protocol(format!("result.{key} is not an array")))?;

    let candles = rows
        .iter()
        .filter_map(|row| {
            let candle = parse_ohlc_row(row);
            if candle.is_none() {
                trace!("[kraken] skipping malformed OHLC row: {row}");
            }
            candle
        })
        .collect();

    Ok(normalize_candles(candles))
}

fn parse_ohlc_row(row: &Value) -> Option<Candle> {
    let arr = row.as_array()?;
    Some(Candle {
        timestamp: parse_str_i64(arr.first())?,
        open: parse_str_f64(arr.get(1))?,
        high: parse_str_f64(arr.get(2))?,
        low: parse_str_f64(arr.get(3))?,
        close: parse_str_f64(arr.get(4))?,
    })
}
