//! alternative.me Fear & Greed index.
//!
//! `GET <url>?limit=1` returns
//! `{"data": [{"value": "70", "value_classification": "Greed", ...}]}`.

use pulse_core::error::PulseError;
use pulse_core::types::Sentiment;
use serde_json::Value;

use crate::json_util::parse_str_i64;

/// Extract the latest reading.
pub fn parse_latest(body: &Value) -> Result<Sentiment, PulseError> {
    let entry = body
        .get("data")
        .and_then(Value::as_array)
        .and_then(|data| data.first())
        .ok_or_else(|| PulseError::Protocol("data[0] missing".into()))?;

    let raw = parse_str_i64(entry.get("value"))
        .ok_or_else(|| PulseError::Data(format!("unparsable index value: {entry}")))?;
    let index = u8::try_from(raw)
        .ok()
        .filter(|i| *i <= 100)
        .ok_or_else(|| PulseError::Data(format!("index out of range: {raw}")))?;

    let label = entry
        .get("value_classification")
        .and_then(Value::as_str)
        .ok_or_else(|| PulseError::Protocol("value_classification missing".into()))?
        .to_string();

    Ok(Sentiment { index, label })
}
