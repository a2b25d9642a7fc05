//! Work dispatcher: bounded fetch pool plus the two scheduling regimes.
//!
//! - **Startup burst**: each kind submitted once, staggered by a fixed step so
//!   the first requests do not hit the same host at the same instant.
//! - **Periodic refresh**: an independent timer per kind. Each firing submits
//!   a fetch whether or not the previous one finished; overlapping fetches of
//!   one kind are neither coalesced nor cancelled.
//!
//! Submission spawns a task and returns immediately. The task waits for one of
//! `workers` permits (FIFO), runs the fetch, sends the result to its channel,
//! and marks the kind complete in the readiness tracker. That order holds on
//! every path.
//!
//! Shutdown stops accepting work and cancels timers. In-flight fetches are not
//! awaited.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use pulse_core::config::ScheduleConfig;
use pulse_core::readiness::ReadinessTracker;
use pulse_core::types::{DataKind, FetchResult, Selection};
use tokio::runtime::Handle;
use tokio::sync::{Semaphore, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, trace};

use crate::FetchSource;
use crate::channels::ResultSenders;

/// Marks the kind complete when dropped, so readiness is reported even if the
/// fetch task unwinds.
struct CompletionGuard<'a> {
    readiness: &'a ReadinessTracker,
    kind: DataKind,
}

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        self.readiness.mark_complete(self.kind);
    }
}

struct Worker {
    source: Arc<dyn FetchSource>,
    senders: ResultSenders,
    readiness: Arc<ReadinessTracker>,
    permits: Semaphore,
    accepting: AtomicBool,
}

impl Worker {
    async fn run(&self, kind: DataKind, selection: Selection) {
        let Ok(_permit) = self.permits.acquire().await else {
            debug!("[dispatcher] pool closed, dropping queued {kind} fetch");
            return;
        };
        let _complete = CompletionGuard { readiness: &self.readiness, kind };

        trace!("[dispatcher] {kind} fetch started ({})", self.source.name());
        let payload = self.source.fetch(kind, selection).await;
        self.senders.send(FetchResult::new(selection, payload));
    }
}

/// Cloneable submission handle shared with the timer tasks.
///
/// Captures the current [`Selection`] at submission time and tags the result
/// with it.
#[derive(Clone)]
struct Submitter {
    handle: Handle,
    worker: Arc<Worker>,
    selection: watch::Receiver<Selection>,
}

impl Submitter {
    /// Queue one fetch of `kind`. Returns `None` after shutdown.
    fn submit(&self, kind: DataKind) -> Option<JoinHandle<()>> {
        if !self.worker.accepting.load(Ordering::Acquire) {
            debug!("[dispatcher] shut down, ignoring {kind} submission");
            return None;
        }
        let selection = *self.selection.borrow();
        let worker = self.worker.clone();
        Some(self.handle.spawn(async move { worker.run(kind, selection).await }))
    }

    /// Fetches currently holding a pool permit.
    fn busy_workers(&self, pool_size: usize) -> usize {
        pool_size.saturating_sub(self.worker.permits.available_permits())
    }
}

/// Owns the pool and the scheduling timers.
pub struct Dispatcher {
    submitter: Submitter,
    workers: usize,
    timers: Vec<JoinHandle<()>>,
}

impl Dispatcher {
    /// Create a dispatcher whose tasks run on `handle`.
    pub fn new(
        handle: Handle,
        source: Arc<dyn FetchSource>,
        senders: ResultSenders,
        readiness: Arc<ReadinessTracker>,
        selection: watch::Receiver<Selection>,
        workers: usize,
    ) -> Self {
        let worker = Arc::new(Worker {
            source,
            senders,
            readiness,
            permits: Semaphore::new(workers),
            accepting: AtomicBool::new(true),
        });
        Self { submitter: Submitter { handle, worker, selection }, workers, timers: Vec::new() }
    }

    /// Queue one fetch of `kind`. Returns `None` after shutdown.
    pub fn submit(&self, kind: DataKind) -> Option<JoinHandle<()>> {
        self.submitter.submit(kind)
    }

    pub fn busy_workers(&self) -> usize {
        self.submitter.busy_workers(self.workers)
    }

    /// Submit every kind once, kind `i` (in [`DataKind::ALL`] order) after
    /// `stagger * (i + 1)`.
    pub fn schedule_startup(&mut self, stagger: Duration) {
        for (i, kind) in DataKind::ALL.into_iter().enumerate() {
            let delay = stagger * (i as u32 + 1);
            let submitter = self.submitter.clone();
            self.timers.push(self.submitter.handle.spawn(async move {
                tokio::time::sleep(delay).await;
                submitter.submit(kind);
            }));
        }
        info!("[dispatcher] startup burst scheduled (stagger={}ms)", stagger.as_millis());
    }

    /// Start one repeating timer per kind. The first firing is one period
    /// from now; the startup burst covers time zero.
    pub fn schedule_periodic(&mut self, schedule: &ScheduleConfig) {
        for kind in DataKind::ALL {
            let period = schedule.period(kind);
            let submitter = self.submitter.clone();
            self.timers.push(self.submitter.handle.spawn(async move {
                let mut interval = tokio::time::interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    interval.tick().await;
                    if submitter.submit(kind).is_none() {
                        break;
                    }
                }
            }));
            info!("[dispatcher] {kind} refresh every {}ms", period.as_millis());
        }
    }

    /// Stop accepting work, drop queued fetches, cancel timers.
    pub fn shutdown(&mut self) {
        let worker = &self.submitter.worker;
        worker.accepting.store(false, Ordering::Release);
        worker.permits.close();
        for timer in self.timers.drain(..) {
            timer.abort();
        }
        info!("[dispatcher] stopped");
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        for timer in self.timers.drain(..) {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use pulse_core::types::{Currency, FetchPayload, PriceQuote};

    use super::*;
    use crate::channels::{ResultReceivers, result_channels};
    use crate::testing::StubSource;

    struct Fixture {
        dispatcher: Dispatcher,
        source: Arc<StubSource>,
        rx: ResultReceivers,
        readiness: Arc<ReadinessTracker>,
        selection_tx: watch::Sender<Selection>,
    }

    fn fixture(source: StubSource, workers: usize) -> Fixture {
        let source = Arc::new(source);
        let (tx, rx) = result_channels();
        let readiness = Arc::new(ReadinessTracker::new());
        let (selection_tx, selection_rx) = watch::channel(Selection::default());
        let dispatcher =
            Dispatcher::new(Handle::current(), source.clone(), tx, readiness.clone(), selection_rx, workers);
        Fixture { dispatcher, source, rx, readiness, selection_tx }
    }

    #[tokio::test(start_paused = true)]
    async fn startup_burst_respects_offsets() {
        let mut f = fixture(StubSource::new(), 4);
        f.dispatcher.schedule_startup(Duration::from_millis(100));
        tokio::time::sleep(Duration::from_secs(1)).await;

        let started = f.source.started();
        assert_eq!(started.len(), DataKind::COUNT);
        for (i, kind) in DataKind::ALL.into_iter().enumerate() {
            let offset = Duration::from_millis(100 * (i as u64 + 1));
            let (_, _, at) = started.iter().find(|(k, _, _)| *k == kind).unwrap();
            assert!(*at >= offset, "{kind} started at {at:?}, before {offset:?}");
        }
        assert!(f.readiness.all_loaded());
    }

    #[tokio::test(start_paused = true)]
    async fn pool_bounds_concurrency_and_keeps_overlaps() {
        let f = fixture(StubSource::new().with_delay(Duration::from_millis(50)), 4);
        let handles: Vec<_> = (0..10).map(|_| f.dispatcher.submit(DataKind::Price).unwrap()).collect();
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(f.source.peak_concurrency(), 4);
        assert_eq!(f.source.calls(DataKind::Price), 10);
        // No coalescing: every overlapping fetch delivered a result.
        assert_eq!(f.rx.pending(DataKind::Price), 10);
        assert_eq!(f.dispatcher.busy_workers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_timers_run_independently() {
        let mut f = fixture(StubSource::new(), 4);
        f.dispatcher.schedule_periodic(&ScheduleConfig::default());
        tokio::time::sleep(Duration::from_secs(65)).await;

        assert_eq!(f.source.calls(DataKind::Price), 6);
        assert_eq!(f.source.calls(DataKind::FxRate), 6);
        assert_eq!(f.source.calls(DataKind::History), 1);
        assert_eq!(f.source.calls(DataKind::Sentiment), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_still_mark_readiness() {
        let f = fixture(StubSource::new(), 4);
        for kind in DataKind::ALL {
            f.dispatcher.submit(kind).unwrap().await.unwrap();
        }
        assert!(f.readiness.all_loaded());
        let fx: Vec<_> = f.rx.drain(DataKind::FxRate).collect();
        assert_eq!(fx[0].payload, FetchPayload::FxRate(0.92));
    }

    #[tokio::test(start_paused = true)]
    async fn results_are_tagged_with_submission_selection() {
        let quote = PriceQuote { amount: 1.0, currency: Currency::Usd };
        let f = fixture(StubSource::new().with(FetchPayload::Price(Some(quote))), 4);
        let first = f.dispatcher.submit(DataKind::Price).unwrap();
        f.selection_tx.send_modify(|s| s.currency = Currency::Usd);
        let second = f.dispatcher.submit(DataKind::Price).unwrap();
        first.await.unwrap();
        second.await.unwrap();

        let tags: Vec<Currency> = f.rx.drain(DataKind::Price).map(|r| r.issued_under.currency).collect();
        assert_eq!(tags.len(), 2);
        assert!(tags.contains(&Currency::Eur));
        assert!(tags.contains(&Currency::Usd));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_timers_and_submissions() {
        let mut f = fixture(StubSource::new(), 4);
        f.dispatcher.schedule_startup(Duration::from_millis(100));
        f.dispatcher.schedule_periodic(&ScheduleConfig::default());
        f.dispatcher.shutdown();
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert!(f.dispatcher.submit(DataKind::Price).is_none());
        assert!(f.source.started().is_empty());
        assert_eq!(f.readiness.progress(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_drops_queued_fetches_without_waiting() {
        let mut f = fixture(StubSource::new().with_delay(Duration::from_millis(500)), 2);
        let handles: Vec<_> = (0..6).map(|_| f.dispatcher.submit(DataKind::Price).unwrap()).collect();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(f.dispatcher.busy_workers(), 2);

        let before = Instant::now();
        f.dispatcher.shutdown();
        assert_eq!(Instant::now(), before);
        // In-flight fetches are still running; nothing delivered yet.
        assert_eq!(f.rx.pending(DataKind::Price), 0);

        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(f.source.calls(DataKind::Price), 2);
        assert_eq!(f.rx.pending(DataKind::Price), 2);
        assert!(f.readiness.is_complete(DataKind::Price));
        assert!(!f.readiness.is_complete(DataKind::History));
        assert_eq!(f.readiness.progress(), 0.25);
    }
}
