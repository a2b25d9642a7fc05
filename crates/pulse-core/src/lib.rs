//! # pulse-core
//!
//! Core crate for the BTC pulse widget backend, providing:
//!
//! - **Types** (`types`): data kinds, currencies, time ranges, candles, fetch payloads
//! - **Configuration** (`config`): JSON config deserialization with stock defaults
//! - **Error types** (`error`): domain-specific `PulseError` via thiserror
//! - **Readiness** (`readiness`): one-shot "all sources loaded" tracker
//! - **Startup gate** (`gate`): Hidden/Visible state machine driven by readiness
//! - **Calculations** (`calc`): profit, percentage change, mid-price averages
//! - **Time utilities** (`time_util`): wall-clock helpers
//! - **Logging** (`logging`): tracing-based structured logging

pub mod calc;
pub mod config;
pub mod error;
pub mod gate;
pub mod logging;
pub mod readiness;
pub mod time_util;
pub mod types;

// Re-export types at crate root for convenience.
pub use types::*;
