//! Wires the fetch pipeline together and owns its lifecycle.
//!
//! ```text
//! Pipeline::build()  ──► channels + readiness + selection + dispatcher,
//!                        and the Aggregator handed back for the UI thread
//! Pipeline::start()  ──► startup burst + periodic timers
//! Pipeline::select_*()──► update selection, submit the affected kinds
//! Pipeline::stop()   ──► dispatcher shutdown
//! ```

use std::sync::Arc;
use std::time::Instant;

use pulse_core::config::AppConfig;
use pulse_core::readiness::ReadinessTracker;
use pulse_core::types::{Currency, DataKind, Selection, TimeRange};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::FetchSource;
use crate::aggregator::{Aggregator, ControlEvent};
use crate::channels::result_channels;
use crate::dispatcher::Dispatcher;
use crate::presenter::Presenter;

pub struct Pipeline {
    name: String,
    config: AppConfig,
    dispatcher: Dispatcher,
    readiness: Arc<ReadinessTracker>,
    selection: watch::Sender<Selection>,
    running: bool,
}

impl Pipeline {
    /// Build the pipeline around `source`, spawning work on `handle`.
    ///
    /// Returns the aggregator for the caller to drive on its UI thread.
    pub fn build<P: Presenter>(
        handle: Handle,
        source: Arc<dyn FetchSource>,
        config: AppConfig,
        presenter: P,
    ) -> (Self, Aggregator<P>) {
        let (senders, receivers) = result_channels();
        let (control_tx, control_rx) = crossbeam_channel::unbounded();
        let (selection_tx, selection_rx) = watch::channel(config.selection);
        let readiness = Arc::new(ReadinessTracker::new());

        readiness.register_callback(move || {
            if control_tx.send(ControlEvent::AllLoaded).is_err() {
                warn!("[pipeline] aggregator gone, all-loaded event dropped");
            }
        });

        let name = format!("{}:{}", config.module_name(), source.name());
        let dispatcher = Dispatcher::new(
            handle,
            source,
            senders,
            readiness.clone(),
            selection_rx.clone(),
            config.schedule.workers,
        );
        let aggregator =
            Aggregator::new(presenter, receivers, control_rx, selection_rx, readiness.clone(), &config, Instant::now());

        let pipeline = Self { name, config, dispatcher, readiness, selection: selection_tx, running: false };
        (pipeline, aggregator)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kick off the startup burst and the periodic timers. Idempotent.
    pub fn start(&mut self) {
        if self.running {
            warn!("[pipeline] {} already started", self.name);
            return;
        }
        self.running = true;
        self.dispatcher.schedule_startup(self.config.schedule.stagger());
        self.dispatcher.schedule_periodic(&self.config.schedule);
        info!("[pipeline] {} started (selection={:?})", self.name, self.selection());
    }

    /// Stop scheduling. In-flight fetches finish on their own.
    pub fn stop(&mut self) {
        self.running = false;
        self.dispatcher.shutdown();
        info!("[pipeline] {} stopped", self.name);
    }

    pub fn selection(&self) -> Selection {
        *self.selection.borrow()
    }

    pub fn readiness(&self) -> &Arc<ReadinessTracker> {
        &self.readiness
    }

    /// Switch the display currency and refetch Price, History and FX.
    pub fn select_currency(&self, currency: Currency) {
        if !self.selection.send_if_modified(|s| std::mem::replace(&mut s.currency, currency) != currency) {
            return;
        }
        info!("[pipeline] currency -> {}", currency.code());
        for kind in [DataKind::Price, DataKind::History, DataKind::FxRate] {
            self.dispatcher.submit(kind);
        }
    }

    /// Switch the history range and refetch History.
    pub fn select_time_range(&self, range: TimeRange) {
        if !self.selection.send_if_modified(|s| std::mem::replace(&mut s.time_range, range) != range) {
            return;
        }
        info!("[pipeline] time range -> {}", range.label());
        self.dispatcher.submit(DataKind::History);
    }
}
