//! Headless presenter: writes every update to the log.

use pulse_core::gate::Visibility;
use pulse_core::time_util::from_secs;
use pulse_core::types::{Sentiment, SentimentBand};
use pulse_feed::presenter::{FxView, HistoryView, PortfolioView, PriceChange, Presenter};
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct LogPresenter;

impl Presenter for LogPresenter {
    fn price_changed(&mut self, change: &PriceChange) {
        let symbol = change.currency.symbol();
        match change.transition() {
            Some(t) => {
                let from = change.from.unwrap_or(change.to);
                info!("[price] {symbol}{from:.2} -> {symbol}{:.2}", change.to);
                debug!("[price] transition {} frames, {:?} apart", t.frames().count(), t.step_delay());
            }
            None => info!("[price] {symbol}{:.2}", change.to),
        }
    }

    fn history_changed(&mut self, view: &HistoryView) {
        if view.candles.is_empty() {
            info!("[history] {}: no data", view.range.label());
            return;
        }
        let first = view.candles.first().map_or(0, |c| c.timestamp);
        let last = view.candles.last().map_or(0, |c| c.timestamp);
        info!(
            "[history] {}: {} candles {} .. {}, mid avg={:?} top={:?} change={:?}%",
            view.range.label(),
            view.candles.len(),
            from_secs(first).format("%Y-%m-%d %H:%M"),
            from_secs(last).format("%Y-%m-%d %H:%M"),
            view.mid_average,
            view.top,
            view.window_change,
        );
    }

    fn sentiment_changed(&mut self, sentiment: Option<&Sentiment>) {
        match sentiment {
            Some(s) => {
                let band = match s.band() {
                    SentimentBand::Fear => "fear",
                    SentimentBand::Neutral => "neutral",
                    SentimentBand::Greed => "greed",
                };
                info!("[sentiment] {} ({}, band={band})", s.index, s.label);
            }
            None => info!("[sentiment] N/A"),
        }
    }

    fn fx_rate_changed(&mut self, view: &FxView) {
        match view.cross_price {
            Some(cross) => info!("[fx] 1 USD = {:.4} EUR, cross price {cross:.2}", view.rate),
            None => info!("[fx] 1 USD = {:.4} EUR", view.rate),
        }
    }

    fn portfolio_changed(&mut self, view: &PortfolioView) {
        match view.profit_pct {
            Some(pct) => info!("[portfolio] value={:.2} profit={pct:+.2}%", view.holdings_value),
            None => info!("[portfolio] value={:.2}", view.holdings_value),
        }
    }

    fn loading_progress(&mut self, progress: f64) {
        info!("[gate] loading {:.0}%", progress * 100.0);
    }

    fn visibility_changed(&mut self, visibility: Visibility) {
        info!("[gate] window {visibility:?}");
    }
}
