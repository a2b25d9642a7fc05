//! Startup gate: the window stays hidden until every source has loaded once,
//! or until a maximum wait elapses.
//!
//! Two states, one transition. Once loaded, the gate still honours a minimum
//! display time for the loading screen so it does not flash.

use std::time::{Duration, Instant};

use tracing::info;

/// Visibility of the main window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Visible,
}

/// Why the gate opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOpened {
    /// All sources reported in.
    Loaded,
    /// The maximum wait elapsed first.
    TimedOut,
}

pub struct StartupGate {
    started: Instant,
    min_display: Duration,
    max_wait: Duration,
    loaded_at: Option<Instant>,
    state: Visibility,
}

impl StartupGate {
    pub fn new(started: Instant, min_display: Duration, max_wait: Duration) -> Self {
        Self { started, min_display, max_wait, loaded_at: None, state: Visibility::Hidden }
    }

    pub fn state(&self) -> Visibility {
        self.state
    }

    /// Record the all-loaded event. Only the first call counts.
    pub fn mark_loaded(&mut self, now: Instant) {
        if self.loaded_at.is_none() {
            self.loaded_at = Some(now);
        }
    }

    /// Advance the state machine. Returns `Some` exactly once, on the tick the
    /// gate opens.
    pub fn poll(&mut self, now: Instant) -> Option<GateOpened> {
        if self.state == Visibility::Visible {
            return None;
        }
        let elapsed = now.saturating_duration_since(self.started);

        let reason = if self.loaded_at.is_some() && elapsed >= self.min_display {
            GateOpened::Loaded
        } else if elapsed >= self.max_wait {
            GateOpened::TimedOut
        } else {
            return None;
        };

        self.state = Visibility::Visible;
        info!("[gate] visible after {:.2}s ({reason:?})", elapsed.as_secs_f64());
        Some(reason)
    }
}
