//! Live [`FetchSource`] backed by the Kraken and alternative.me REST APIs.
//!
//! Each fetch is one GET with the kind's timeout. Any failure is logged and
//! folded into the kind's fallback payload. Nothing is retried here; the next
//! scheduled fetch is the retry.

use std::time::Duration;

use async_trait::async_trait;
use pulse_core::config::EndpointConfig;
use pulse_core::error::PulseError;
use pulse_core::types::{Candle, DataKind, FetchPayload, PriceQuote, Selection, Sentiment};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{FetchSource, fear_greed, kraken};

/// HTTP fetch source. Cheap to share: `reqwest::Client` pools connections.
pub struct HttpSource {
    http: reqwest::Client,
    endpoints: EndpointConfig,
}

impl HttpSource {
    pub fn new(endpoints: EndpointConfig) -> Self {
        Self { http: reqwest::Client::new(), endpoints }
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)], timeout: Duration) -> Result<Value, PulseError> {
        let resp = self
            .http
            .get(url)
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .map_err(transport_error)?
            .error_for_status()
            .map_err(transport_error)?;

        resp.json::<Value>().await.map_err(|e| {
            if e.is_decode() {
                PulseError::Protocol(format!("invalid JSON body: {e}"))
            } else {
                transport_error(e)
            }
        })
    }

    async fn fetch_price(&self, selection: Selection) -> Result<PriceQuote, PulseError> {
        let currency = selection.currency;
        let body = self
            .get_json(
                &kraken::ticker_url(&self.endpoints.kraken_base_url),
                &[("pair", currency.kraken_pair().to_string())],
                self.endpoints.timeout(DataKind::Price),
            )
            .await?;
        let amount = kraken::parse_ticker_last(&body, currency.kraken_result_key())?;
        Ok(PriceQuote { amount, currency })
    }

    async fn fetch_history(&self, selection: Selection) -> Result<Vec<Candle>, PulseError> {
        let currency = selection.currency;
        let body = self
            .get_json(
                &kraken::ohlc_url(&self.endpoints.kraken_base_url),
                &[
                    ("pair", currency.kraken_pair().to_string()),
                    ("interval", selection.time_range.interval_minutes().to_string()),
                ],
                self.endpoints.timeout(DataKind::History),
            )
            .await?;
        kraken::parse_ohlc(&body, currency.kraken_result_key())
    }

    async fn fetch_sentiment(&self) -> Result<Sentiment, PulseError> {
        let body = self
            .get_json(
                &self.endpoints.fear_greed_url,
                &[("limit", "1".to_string())],
                self.endpoints.timeout(DataKind::Sentiment),
            )
            .await?;
        fear_greed::parse_latest(&body)
    }

    async fn fetch_fx_rate(&self) -> Result<f64, PulseError> {
        let pair = &self.endpoints.fx_pair;
        let body = self
            .get_json(
                &kraken::ticker_url(&self.endpoints.kraken_base_url),
                &[("pair", pair.clone())],
                self.endpoints.timeout(DataKind::FxRate),
            )
            .await?;
        kraken::parse_ticker_last(&body, pair)
    }
}

fn transport_error(e: reqwest::Error) -> PulseError {
    PulseError::Transport(e.to_string())
}

#[async_trait]
impl FetchSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, kind: DataKind, selection: Selection) -> FetchPayload {
        let outcome = match kind {
            DataKind::Price => self.fetch_price(selection).await.map(|q| FetchPayload::Price(Some(q))),
            DataKind::History => self.fetch_history(selection).await.map(FetchPayload::History),
            DataKind::Sentiment => self.fetch_sentiment().await.map(|s| FetchPayload::Sentiment(Some(s))),
            DataKind::FxRate => self.fetch_fx_rate().await.map(FetchPayload::FxRate),
        };

        match outcome {
            Ok(payload) => {
                debug!("[http] {kind} fetched");
                payload
            }
            Err(e) => {
                warn!("[http] {kind} fetch failed, using fallback: {e}");
                FetchPayload::fallback(kind)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Nothing listens on port 9 locally; connection is refused immediately.
    fn unreachable_source() -> HttpSource {
        let endpoints = EndpointConfig {
            kraken_base_url: "http://127.0.0.1:9".into(),
            fear_greed_url: "http://127.0.0.1:9/fng/".into(),
            price_timeout_ms: 500,
            history_timeout_ms: 500,
            sentiment_timeout_ms: 500,
            fx_timeout_ms: 500,
            ..EndpointConfig::default()
        };
        HttpSource::new(endpoints)
    }

    #[tokio::test]
    async fn transport_failure_yields_fallbacks() {
        let source = unreachable_source();
        let sel = Selection::default();
        for kind in DataKind::ALL {
            assert_eq!(source.fetch(kind, sel).await, FetchPayload::fallback(kind));
        }
    }
}
