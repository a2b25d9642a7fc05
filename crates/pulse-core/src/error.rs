//! Typed error definitions for the pulse pipeline.
//!
//! [`PulseError`] mirrors the failure taxonomy of a fetch: the transport can
//! fail, the response can have the wrong shape, or a field can fail to parse.
//! Fetchers never surface these to their caller; they are logged and folded
//! into the kind's fallback payload. Config loading surfaces them through
//! `anyhow::Result`.

use thiserror::Error;

/// Domain-specific errors for the pulse pipeline.
#[derive(Debug, Error)]
pub enum PulseError {
    /// Configuration parsing or validation error.
    #[error("config error: {0}")]
    Config(String),

    /// Timeout, refused connection, non-success HTTP status.
    #[error("transport error: {0}")]
    Transport(String),

    /// Unexpected JSON shape, missing key, or an API-reported error.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A field was present but could not be interpreted (e.g. bad number).
    #[error("data error: {0}")]
    Data(String),
}
