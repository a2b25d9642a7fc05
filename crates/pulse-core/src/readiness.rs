//! One-shot readiness tracking across all data kinds.
//!
//! Every fetch reports completion here, success or failure. The first time all
//! [`DataKind`]s have completed, the registered callbacks run once, in
//! registration order, on whichever thread made the completing call.
//!
//! Callbacks registered after that transition are never invoked. Callers that
//! need to touch thread-affine state should register a callback that only
//! enqueues a message for the owning thread.

use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info};

use crate::types::DataKind;

/// Callback fired once when every kind has completed.
pub type ReadyCallback = Box<dyn FnOnce() + Send>;

struct ReadinessState {
    completed: [bool; DataKind::COUNT],
    all_loaded: bool,
    callbacks: Vec<ReadyCallback>,
}

/// Thread-safe record of which kinds have completed at least once.
///
/// # Thread safety
///
/// Shared behind an `Arc` between worker tasks (writers) and the UI thread
/// (reader). Callbacks run after the internal lock is released, so a callback
/// may call back into the tracker.
pub struct ReadinessTracker {
    state: Mutex<ReadinessState>,
}

impl ReadinessTracker {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ReadinessState {
                completed: [false; DataKind::COUNT],
                all_loaded: false,
                callbacks: Vec::new(),
            }),
        }
    }

    // A panicking callback never runs under the lock, so the state is intact
    // even if poisoned.
    fn lock(&self) -> MutexGuard<'_, ReadinessState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record that `kind` completed.
    ///
    /// Idempotent per kind. Returns `true` only for the call that completed the
    /// whole set; that call also runs the registered callbacks.
    pub fn mark_complete(&self, kind: DataKind) -> bool {
        let callbacks = {
            let mut state = self.lock();
            if state.completed[kind.index()] {
                return false;
            }
            state.completed[kind.index()] = true;
            debug!("[readiness] {kind} complete");

            if state.all_loaded || !state.completed.iter().all(|&done| done) {
                return false;
            }
            state.all_loaded = true;
            std::mem::take(&mut state.callbacks)
        };

        info!("[readiness] all {} sources loaded, firing {} callback(s)", DataKind::COUNT, callbacks.len());
        for callback in callbacks {
            callback();
        }
        true
    }

    /// Register a callback for the all-loaded transition.
    ///
    /// Registering after the transition is accepted but the callback never runs.
    pub fn register_callback<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.lock();
        if state.all_loaded {
            debug!("[readiness] callback registered after all sources loaded, it will not fire");
            return;
        }
        state.callbacks.push(Box::new(callback));
    }

    /// Fraction of kinds completed, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        let state = self.lock();
        let done = state.completed.iter().filter(|&&d| d).count();
        done as f64 / DataKind::COUNT as f64
    }

    pub fn is_complete(&self, kind: DataKind) -> bool {
        self.lock().completed[kind.index()]
    }

    pub fn all_loaded(&self) -> bool {
        self.lock().all_loaded
    }
}

impl Default for ReadinessTracker {
    fn default() -> Self {
        Self::new()
    }
}
