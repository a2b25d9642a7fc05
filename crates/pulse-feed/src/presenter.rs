//! The contract between the aggregator and whatever draws the widget.
//!
//! Every method is called on the UI thread, from [`Aggregator::tick`], once per
//! applied result. Price is the exception: an unchanged or failed price is not
//! pushed. FX is also re-pushed after each price change so the cross price
//! follows it.
//!
//! [`Aggregator::tick`]: crate::aggregator::Aggregator::tick

use std::time::Duration;

use pulse_core::gate::Visibility;
use pulse_core::types::{Candle, Currency, Sentiment, TimeRange};

/// Length of the animated price transition.
pub const TRANSITION_DURATION: Duration = Duration::from_millis(150);
/// Frames in the animated price transition.
pub const TRANSITION_STEPS: u32 = 50;

/// A price update. `from` is `None` for the first price after startup or after
/// a currency change; presenters show `to` directly in that case.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceChange {
    pub from: Option<f64>,
    pub to: f64,
    pub currency: Currency,
}

impl PriceChange {
    /// Interpolated frames for this change, or `None` when there is nothing
    /// to animate from.
    pub fn transition(&self) -> Option<PriceTransition> {
        self.from.map(|from| PriceTransition::new(from, self.to))
    }
}

/// Linear interpolation between two prices over [`TRANSITION_STEPS`] frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceTransition {
    from: f64,
    to: f64,
    steps: u32,
}

impl PriceTransition {
    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to, steps: TRANSITION_STEPS }
    }

    /// Delay between frames (3 ms at the stock settings).
    pub fn step_delay(&self) -> Duration {
        TRANSITION_DURATION / self.steps
    }

    /// Frame values `1..=steps`; the last one is exactly `to`.
    pub fn frames(&self) -> impl Iterator<Item = f64> + '_ {
        let delta = self.to - self.from;
        (1..=self.steps).map(move |i| {
            if i == self.steps { self.to } else { self.from + delta * f64::from(i) / f64::from(self.steps) }
        })
    }
}

/// History for the selected range plus its summary figures.
///
/// A failed fetch and an empty series look the same: no candles, no figures.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryView {
    pub range: TimeRange,
    pub candles: Vec<Candle>,
    /// Mean of candle mid prices inside the range window.
    pub mid_average: Option<f64>,
    /// Highest candle open.
    pub top: Option<f64>,
    /// Change from the first open to the last known price, in percent.
    pub window_change: Option<f64>,
}

/// FX rate (EUR per USD) and the BTC price in the other currency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FxView {
    pub rate: f64,
    /// Derived from the last price and `rate`, not fetched. `None` until a
    /// price is known.
    pub cross_price: Option<f64>,
}

/// Value of the configured holdings at the current price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioView {
    pub holdings_value: f64,
    /// `None` when no average cost is configured.
    pub profit_pct: Option<f64>,
}

pub trait Presenter {
    fn price_changed(&mut self, change: &PriceChange);

    fn history_changed(&mut self, view: &HistoryView);

    /// `None` when the sentiment fetch failed.
    fn sentiment_changed(&mut self, sentiment: Option<&Sentiment>);

    fn fx_rate_changed(&mut self, view: &FxView);

    fn portfolio_changed(&mut self, _view: &PortfolioView) {}

    /// Fraction of sources that have reported, while the window is hidden.
    fn loading_progress(&mut self, _progress: f64) {}

    fn visibility_changed(&mut self, visibility: Visibility);
}
