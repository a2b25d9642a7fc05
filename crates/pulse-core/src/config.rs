//! Configuration parsing for the pulse pipeline.
//!
//! Settings are read from a single JSON file. Every section has defaults, so
//! `{}` (or no file at all) yields the stock widget behaviour.
//!
//! # Example config
//!
//! ```json
//! {
//!   "app": { "module_name": "pulse", "log_path": "/tmp/log" },
//!   "selection": { "currency": "USD", "time_range": "31d" },
//!   "schedule": { "workers": 4, "price_period_ms": 10000 },
//!   "portfolio": { "held_amount": 0.25, "average_cost": 42000.0 }
//! }
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::error::PulseError;
use crate::types::{DataKind, Selection};

/// Top-level application config, deserialized from a JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Module metadata (name, log path).
    #[serde(default)]
    pub app: ModuleMeta,

    /// Initial currency and history range.
    #[serde(default)]
    pub selection: Selection,

    /// Upstream URLs and per-kind timeouts.
    #[serde(default)]
    pub endpoints: EndpointConfig,

    /// Worker pool size and refresh cadences.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Loading-screen timing.
    #[serde(default)]
    pub startup: StartupConfig,

    /// Holdings used for value / profit figures.
    #[serde(default)]
    pub portfolio: PortfolioConfig,

    /// Discard results requested under a selection that is no longer current.
    #[serde(default = "default_true")]
    pub drop_stale_results: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: ModuleMeta::default(),
            selection: Selection::default(),
            endpoints: EndpointConfig::default(),
            schedule: ScheduleConfig::default(),
            startup: StartupConfig::default(),
            portfolio: PortfolioConfig::default(),
            drop_stale_results: true,
        }
    }
}

impl AppConfig {
    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), PulseError> {
        let s = &self.schedule;
        if s.workers == 0 {
            return Err(PulseError::Config("schedule.workers must be at least 1".into()));
        }
        if s.tick_ms == 0 {
            return Err(PulseError::Config("schedule.tick_ms must be positive".into()));
        }
        for kind in DataKind::ALL {
            if s.period(kind).is_zero() {
                return Err(PulseError::Config(format!("schedule period for {kind} must be positive")));
            }
            if self.endpoints.timeout(kind).is_zero() {
                return Err(PulseError::Config(format!("endpoint timeout for {kind} must be positive")));
            }
        }
        if self.startup.max_wait_ms < self.startup.min_display_ms {
            return Err(PulseError::Config("startup.max_wait_ms must not be below min_display_ms".into()));
        }
        Ok(())
    }

    /// Returns the module name, defaulting to `"pulse"`.
    pub fn module_name(&self) -> String {
        self.app.module_name.clone().unwrap_or_else(|| "pulse".to_string())
    }

    /// Returns the log path.
    pub fn log_path(&self) -> Option<String> {
        self.app.log_path.clone()
    }
}

/// Module metadata block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModuleMeta {
    pub module_name: Option<String>,
    pub log_path: Option<String>,
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// Upstream endpoints. Only the base URLs are configurable; paths are fixed
/// by the providers.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    /// Kraken REST base URL.
    #[serde(default = "default_kraken_url")]
    pub kraken_base_url: String,

    /// Fear & Greed index URL.
    #[serde(default = "default_fng_url")]
    pub fear_greed_url: String,

    /// Kraken pair used for the USD→EUR rate (also its result key).
    #[serde(default = "default_fx_pair")]
    pub fx_pair: String,

    #[serde(default = "default_short_timeout")]
    pub price_timeout_ms: u64,

    #[serde(default = "default_history_timeout")]
    pub history_timeout_ms: u64,

    #[serde(default = "default_short_timeout")]
    pub sentiment_timeout_ms: u64,

    #[serde(default = "default_short_timeout")]
    pub fx_timeout_ms: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            kraken_base_url: default_kraken_url(),
            fear_greed_url: default_fng_url(),
            fx_pair: default_fx_pair(),
            price_timeout_ms: default_short_timeout(),
            history_timeout_ms: default_history_timeout(),
            sentiment_timeout_ms: default_short_timeout(),
            fx_timeout_ms: default_short_timeout(),
        }
    }
}

impl EndpointConfig {
    /// Request timeout for a fetch of `kind`.
    pub fn timeout(&self, kind: DataKind) -> Duration {
        let ms = match kind {
            DataKind::Price => self.price_timeout_ms,
            DataKind::History => self.history_timeout_ms,
            DataKind::Sentiment => self.sentiment_timeout_ms,
            DataKind::FxRate => self.fx_timeout_ms,
        };
        Duration::from_millis(ms)
    }
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// Worker pool size, startup stagger, refresh periods, and aggregator tick.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Maximum concurrent fetches.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Gap between the startup submissions of consecutive kinds.
    #[serde(default = "default_stagger")]
    pub startup_stagger_ms: u64,

    #[serde(default = "default_fast_period")]
    pub price_period_ms: u64,

    #[serde(default = "default_slow_period")]
    pub history_period_ms: u64,

    #[serde(default = "default_slow_period")]
    pub sentiment_period_ms: u64,

    #[serde(default = "default_fast_period")]
    pub fx_period_ms: u64,

    /// Aggregator drain interval.
    #[serde(default = "default_tick")]
    pub tick_ms: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            startup_stagger_ms: default_stagger(),
            price_period_ms: default_fast_period(),
            history_period_ms: default_slow_period(),
            sentiment_period_ms: default_slow_period(),
            fx_period_ms: default_fast_period(),
            tick_ms: default_tick(),
        }
    }
}

impl ScheduleConfig {
    /// Refresh period for `kind`.
    pub fn period(&self, kind: DataKind) -> Duration {
        let ms = match kind {
            DataKind::Price => self.price_period_ms,
            DataKind::History => self.history_period_ms,
            DataKind::Sentiment => self.sentiment_period_ms,
            DataKind::FxRate => self.fx_period_ms,
        };
        Duration::from_millis(ms)
    }

    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.startup_stagger_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

// ---------------------------------------------------------------------------
// Startup / portfolio
// ---------------------------------------------------------------------------

/// Loading-screen timing.
#[derive(Debug, Clone, Deserialize)]
pub struct StartupConfig {
    /// Minimum time the loading screen stays up.
    #[serde(default = "default_min_display")]
    pub min_display_ms: u64,

    /// Open the main window after this long even if sources are missing.
    #[serde(default = "default_max_wait")]
    pub max_wait_ms: u64,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self { min_display_ms: default_min_display(), max_wait_ms: default_max_wait() }
    }
}

impl StartupConfig {
    pub fn min_display(&self) -> Duration {
        Duration::from_millis(self.min_display_ms)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }
}

/// Holdings. Zero means "not set".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortfolioConfig {
    #[serde(default)]
    pub held_amount: f64,
    #[serde(default)]
    pub average_cost: f64,
}

fn default_true() -> bool {
    true
}
fn default_kraken_url() -> String {
    "https://api.kraken.com".to_string()
}
fn default_fng_url() -> String {
    "https://api.alternative.me/fng/".to_string()
}
fn default_fx_pair() -> String {
    "USDTEUR".to_string()
}
fn default_short_timeout() -> u64 {
    5_000
}
fn default_history_timeout() -> u64 {
    10_000
}
fn default_workers() -> usize {
    4
}
fn default_stagger() -> u64 {
    100
}
fn default_fast_period() -> u64 {
    10_000
}
fn default_slow_period() -> u64 {
    60_000
}
fn default_tick() -> u64 {
    100
}
fn default_min_display() -> u64 {
    2_000
}
fn default_max_wait() -> u64 {
    5_500
}

/// Load, parse and validate a JSON config file.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Currency, TimeRange};

    #[test]
    fn empty_object_gives_defaults() {
        let cfg: AppConfig = serde_json::from_str("{}").unwrap();
        assert!(cfg.validate().is_ok());
        assert!(cfg.drop_stale_results);
        assert_eq!(cfg.schedule.workers, 4);
        assert_eq!(cfg.schedule.period(DataKind::Price), Duration::from_secs(10));
        assert_eq!(cfg.schedule.period(DataKind::History), Duration::from_secs(60));
        assert_eq!(cfg.schedule.period(DataKind::Sentiment), Duration::from_secs(60));
        assert_eq!(cfg.schedule.period(DataKind::FxRate), Duration::from_secs(10));
        assert_eq!(cfg.endpoints.timeout(DataKind::History), Duration::from_secs(10));
        assert_eq!(cfg.endpoints.timeout(DataKind::FxRate), Duration::from_secs(5));
        assert_eq!(cfg.selection, Selection::default());
        assert_eq!(cfg.module_name(), "pulse");
    }

    #[test]
    fn parse_partial_config() {
        let json = r#"{
            "app": { "module_name": "desk", "log_path": "/tmp/pulse" },
            "selection": { "currency": "USD", "time_range": "YTD" },
            "schedule": { "workers": 2, "price_period_ms": 2500 },
            "portfolio": { "held_amount": 0.5, "average_cost": 40000 },
            "drop_stale_results": false
        }"#;
        let cfg: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.module_name(), "desk");
        assert_eq!(cfg.log_path().as_deref(), Some("/tmp/pulse"));
        assert_eq!(cfg.selection.currency, Currency::Usd);
        assert_eq!(cfg.selection.time_range, TimeRange::Ytd);
        assert_eq!(cfg.schedule.workers, 2);
        assert_eq!(cfg.schedule.period(DataKind::Price), Duration::from_millis(2500));
        assert_eq!(cfg.schedule.tick(), Duration::from_millis(100));
        assert_eq!(cfg.portfolio.held_amount, 0.5);
        assert!(!cfg.drop_stale_results);
    }

    #[test]
    fn validate_rejects_zero_workers_and_periods() {
        let mut cfg = AppConfig::default();
        cfg.schedule.workers = 0;
        assert!(matches!(cfg.validate(), Err(PulseError::Config(_))));

        let mut cfg = AppConfig::default();
        cfg.schedule.sentiment_period_ms = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.startup.max_wait_ms = 100;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn unknown_currency_is_an_error() {
        let json = r#"{ "selection": { "currency": "GBP" } }"#;
        assert!(serde_json::from_str::<AppConfig>(json).is_err());
    }
}
