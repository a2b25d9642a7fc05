//! Single-threaded aggregation loop.
//!
//! Runs on the UI thread. Each tick drains every result channel without
//! blocking, applies results in arrival order, updates the [`Snapshot`] and
//! tells the [`Presenter`] what changed. It also drives the startup gate from
//! control events posted by worker threads.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, select};
use pulse_core::calc;
use pulse_core::config::{AppConfig, PortfolioConfig};
use pulse_core::gate::{StartupGate, Visibility};
use pulse_core::readiness::ReadinessTracker;
use pulse_core::time_util::now_utc;
use pulse_core::types::{Candle, DataKind, FetchPayload, FetchResult, PriceQuote, Selection, Sentiment};
use tokio::sync::watch;
use tracing::{debug, info, trace};

use crate::channels::ResultReceivers;
use crate::presenter::{FxView, HistoryView, PortfolioView, PriceChange, Presenter};

/// Events posted to the UI thread from elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// Every kind has completed at least once.
    AllLoaded,
}

/// Latest applied value per kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Last good price. Failed fetches keep it; a currency change clears it.
    pub price: Option<PriceQuote>,
    /// `None` until the first History result; a failed fetch applies as empty.
    pub history: Option<Vec<Candle>>,
    /// Last sentiment result. A failed fetch resets it to `None` (shown as N/A).
    pub sentiment: Option<Sentiment>,
    /// `None` until the first FX result; a failed fetch applies the fallback rate.
    pub fx_rate: Option<f64>,
}

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub applied: usize,
    pub discarded: usize,
}

pub struct Aggregator<P: Presenter> {
    presenter: P,
    receivers: ResultReceivers,
    control: Receiver<ControlEvent>,
    selection: watch::Receiver<Selection>,
    current: Selection,
    readiness: Arc<ReadinessTracker>,
    gate: StartupGate,
    portfolio: PortfolioConfig,
    drop_stale: bool,
    snapshot: Snapshot,
    last_progress: Option<f64>,
}

impl<P: Presenter> Aggregator<P> {
    pub fn new(
        presenter: P,
        receivers: ResultReceivers,
        control: Receiver<ControlEvent>,
        selection: watch::Receiver<Selection>,
        readiness: Arc<ReadinessTracker>,
        config: &AppConfig,
        started: Instant,
    ) -> Self {
        let current = *selection.borrow();
        Self {
            presenter,
            receivers,
            control,
            selection,
            current,
            readiness,
            gate: StartupGate::new(started, config.startup.min_display(), config.startup.max_wait()),
            portfolio: config.portfolio.clone(),
            drop_stale: config.drop_stale_results,
            snapshot: Snapshot::default(),
            last_progress: None,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn visibility(&self) -> Visibility {
        self.gate.state()
    }

    /// One pass: selection sync, control events, channel drain, gate.
    pub fn tick(&mut self, now: Instant) -> TickStats {
        self.sync_selection();

        for event in self.control.try_iter() {
            match event {
                ControlEvent::AllLoaded => {
                    info!("[aggregator] all sources loaded");
                    self.gate.mark_loaded(now);
                }
            }
        }

        let mut stats = TickStats::default();
        for kind in DataKind::ALL {
            let results: Vec<FetchResult> = self.receivers.drain(kind).collect();
            for result in results {
                if self.drop_stale && result.is_stale(&self.current) {
                    debug!("[aggregator] discarding stale {kind} result (issued under {:?})", result.issued_under);
                    stats.discarded += 1;
                    continue;
                }
                self.apply(result);
                stats.applied += 1;
            }
        }

        self.update_gate(now);

        if stats.applied + stats.discarded > 0 {
            trace!("[aggregator] tick applied={} discarded={}", stats.applied, stats.discarded);
        }
        stats
    }

    /// Tick every `interval` until `shutdown` receives or disconnects.
    pub fn run(mut self, interval: Duration, shutdown: Receiver<()>) -> Self {
        let ticker = crossbeam_channel::tick(interval);
        info!("[aggregator] running (tick={}ms)", interval.as_millis());
        loop {
            select! {
                recv(ticker) -> at => {
                    if let Ok(at) = at {
                        self.tick(at);
                    }
                }
                recv(shutdown) -> _ => break,
            }
        }
        info!("[aggregator] stopped");
        self
    }

    fn sync_selection(&mut self) {
        let latest = *self.selection.borrow();
        if latest == self.current {
            return;
        }
        if latest.currency != self.current.currency {
            // The next price is shown directly, not animated from the old currency.
            self.snapshot.price = None;
        }
        debug!("[aggregator] selection {:?} -> {:?}", self.current, latest);
        self.current = latest;
    }

    fn apply(&mut self, result: FetchResult) {
        match result.payload {
            FetchPayload::Price(Some(quote)) => self.apply_price(quote),
            FetchPayload::Price(None) => debug!("[aggregator] price unavailable, keeping last"),
            FetchPayload::History(candles) => self.apply_history(result.issued_under, candles),
            FetchPayload::Sentiment(sentiment) => {
                self.presenter.sentiment_changed(sentiment.as_ref());
                self.snapshot.sentiment = sentiment;
            }
            FetchPayload::FxRate(rate) => {
                self.snapshot.fx_rate = Some(rate);
                let view = FxView { rate, cross_price: self.cross_price() };
                self.presenter.fx_rate_changed(&view);
            }
        }
    }

    fn apply_price(&mut self, quote: PriceQuote) {
        let from = self.snapshot.price.map(|p| p.amount);
        if from == Some(quote.amount) {
            return;
        }
        self.snapshot.price = Some(quote);
        self.presenter.price_changed(&PriceChange { from, to: quote.amount, currency: quote.currency });

        if let Some(rate) = self.snapshot.fx_rate {
            let view = FxView { rate, cross_price: self.cross_price() };
            self.presenter.fx_rate_changed(&view);
        }

        let PortfolioConfig { held_amount, average_cost } = self.portfolio;
        if held_amount > 0.0 || average_cost > 0.0 {
            let view = PortfolioView {
                holdings_value: calc::holdings_value(held_amount, quote.amount),
                profit_pct: (average_cost > 0.0)
                    .then(|| calc::profit_percentage(average_cost, quote.amount))
                    .flatten(),
            };
            self.presenter.portfolio_changed(&view);
        }
    }

    fn apply_history(&mut self, issued_under: Selection, candles: Vec<Candle>) {
        let range = issued_under.time_range;
        let view = HistoryView {
            range,
            mid_average: calc::mid_price_average(&candles, range, now_utc()),
            top: calc::period_top(&candles),
            window_change: self.snapshot.price.and_then(|p| calc::window_change(&candles, p.amount)),
            candles,
        };
        self.presenter.history_changed(&view);
        self.snapshot.history = Some(view.candles);
    }

    fn cross_price(&self) -> Option<f64> {
        let price = self.snapshot.price?;
        let rate = self.snapshot.fx_rate?;
        calc::cross_price(price.amount, price.currency, rate)
    }

    fn update_gate(&mut self, now: Instant) {
        if self.gate.state() == Visibility::Visible {
            return;
        }
        let progress = self.readiness.progress();
        if self.last_progress != Some(progress) {
            self.last_progress = Some(progress);
            self.presenter.loading_progress(progress);
        }
        if self.gate.poll(now).is_some() {
            self.presenter.visibility_changed(Visibility::Visible);
        }
    }
}
