//! # pulse-feed
//!
//! The multi-source fetch pipeline behind the BTC pulse widget.
//!
//! ## Architecture
//!
//! ```text
//! Dispatcher (startup burst + per-kind timers, bounded pool)
//!     └─► FetchSource::fetch(kind, selection) ──► FetchPayload
//!             ├─► ResultSenders (one crossbeam channel per kind)
//!             └─► ReadinessTracker::mark_complete(kind)
//! Aggregator (UI thread, fixed tick)
//!     └─► drain every channel ──► Snapshot ──► Presenter
//! ```
//!
//! ## Modules
//!
//! - [`pipeline`]: wires the pieces together; `start` / `stop` lifecycle
//! - [`dispatcher`]: worker pool, startup burst, periodic refresh
//! - [`channels`]: per-kind result channels
//! - [`aggregator`]: single-threaded drain loop and snapshot
//! - [`presenter`]: the contract the UI implements
//! - [`http_source`], [`kraken`], [`fear_greed`]: live fetch source
//! - [`json_util`]: JSON parsing helpers

pub mod aggregator;
pub mod channels;
pub mod dispatcher;
pub mod fear_greed;
pub mod http_source;
pub mod json_util;
pub mod kraken;
pub mod pipeline;
pub mod presenter;

#[cfg(test)]
mod testing;

use async_trait::async_trait;
use pulse_core::types::{DataKind, FetchPayload, Selection};

/// Something that can fetch one kind of data.
///
/// Implementations never fail: every error path returns
/// [`FetchPayload::fallback`] for the kind. This keeps the readiness gate
/// correct under partial failure, because the caller always gets a payload
/// to report.
#[async_trait]
pub trait FetchSource: Send + Sync {
    /// Human-readable source name.
    fn name(&self) -> &str;
    /// Perform one fetch of `kind` for the given selection.
    async fn fetch(&self, kind: DataKind, selection: Selection) -> FetchPayload;
}
