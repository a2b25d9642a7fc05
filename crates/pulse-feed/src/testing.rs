//! Scripted [`FetchSource`] and recording [`Presenter`] for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use pulse_core::gate::Visibility;
use pulse_core::types::{DataKind, FetchPayload, Selection, Sentiment};
use tokio::time::Instant;

use crate::FetchSource;
use crate::presenter::{FxView, HistoryView, PortfolioView, PriceChange, Presenter};

/// Returns a fixed payload per kind (fallback when unset), optionally after a
/// delay, and records when each fetch started.
pub struct StubSource {
    payloads: HashMap<DataKind, FetchPayload>,
    delay: Duration,
    origin: Instant,
    started: Mutex<Vec<(DataKind, Selection, Duration)>>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl StubSource {
    pub fn new() -> Self {
        Self {
            payloads: HashMap::new(),
            delay: Duration::ZERO,
            origin: Instant::now(),
            started: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, payload: FetchPayload) -> Self {
        self.payloads.insert(payload.kind(), payload);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// `(kind, selection, offset from construction)` per fetch, in start order.
    pub fn started(&self) -> Vec<(DataKind, Selection, Duration)> {
        self.started.lock().unwrap().clone()
    }

    pub fn calls(&self, kind: DataKind) -> usize {
        self.started.lock().unwrap().iter().filter(|(k, _, _)| *k == kind).count()
    }

    /// Highest number of fetches observed running at once.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FetchSource for StubSource {
    fn name(&self) -> &str {
        "stub"
    }

    async fn fetch(&self, kind: DataKind, selection: Selection) -> FetchPayload {
        self.started.lock().unwrap().push((kind, selection, self.origin.elapsed()));
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now_active, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.active.fetch_sub(1, Ordering::SeqCst);
        self.payloads.get(&kind).cloned().unwrap_or_else(|| FetchPayload::fallback(kind))
    }
}

/// Everything a [`RecordingPresenter`] was told, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Price(PriceChange),
    History(HistoryView),
    Sentiment(Option<Sentiment>),
    Fx(FxView),
    Portfolio(PortfolioView),
    Progress(f64),
    Visibility(Visibility),
}

#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub events: Vec<Event>,
}

impl Presenter for RecordingPresenter {
    fn price_changed(&mut self, change: &PriceChange) {
        self.events.push(Event::Price(*change));
    }

    fn history_changed(&mut self, view: &HistoryView) {
        self.events.push(Event::History(view.clone()));
    }

    fn sentiment_changed(&mut self, sentiment: Option<&Sentiment>) {
        self.events.push(Event::Sentiment(sentiment.cloned()));
    }

    fn fx_rate_changed(&mut self, view: &FxView) {
        self.events.push(Event::Fx(*view));
    }

    fn portfolio_changed(&mut self, view: &PortfolioView) {
        self.events.push(Event::Portfolio(*view));
    }

    fn loading_progress(&mut self, progress: f64) {
        self.events.push(Event::Progress(progress));
    }

    fn visibility_changed(&mut self, visibility: Visibility) {
        self.events.push(Event::Visibility(visibility));
    }
}
