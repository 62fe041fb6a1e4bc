//! Configuration types shared by the orchestrator and connectors.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Exponential backoff configuration for retrying a single remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Delay after the first failed attempt, in milliseconds.
    pub min_backoff_ms: u64,
    /// Upper bound for any single delay, in milliseconds.
    pub max_backoff_ms: u64,
    /// Exponential factor applied after each failure (>= 1).
    pub factor: u32,
    /// Random jitter percentage [0, 100] added to each delay.
    pub jitter_percent: u8,
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            min_backoff_ms: 30_000,
            max_backoff_ms: 3_600_000,
            factor: 2,
            jitter_percent: 0,
            max_attempts: 5,
        }
    }
}

/// Fixed delays that keep the loop under the remote request-rate ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Pause after every processed item.
    pub inter_request_delay: Duration,
    /// Pause after an item failed, before the same item is attempted again.
    pub error_pause: Duration,
    /// Wall-clock window one invocation is sized for.
    pub run_window: Duration,
    /// Bound on a single order-book attempt.
    pub request_timeout: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            inter_request_delay: Duration::from_millis(7_000),
            error_pause: Duration::from_millis(30_000),
            run_window: Duration::from_secs(100),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl PacingConfig {
    /// Maximum number of items one invocation attempts.
    ///
    /// `floor(run_window / inter_request_delay)`; `None` when the delay is zero,
    /// meaning the catalog length is the only bound.
    #[must_use]
    pub fn max_items_per_run(&self) -> Option<usize> {
        let delay_ms = self.inter_request_delay.as_millis();
        if delay_ms == 0 {
            return None;
        }
        let items = self.run_window.as_millis() / delay_ms;
        Some(usize::try_from(items).unwrap_or(usize::MAX))
    }
}

/// What to do with an item that keeps failing at the same cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StallPolicy {
    /// Skip the item after this many consecutive failed iterations.
    ///
    /// `None` retries the item forever.
    pub max_item_failures: Option<u32>,
}

/// Market parameters sent with every order-book request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketLocale {
    /// Two-letter country code.
    pub country: String,
    /// Language name as the marketplace spells it.
    pub language: String,
    /// Marketplace currency code (3 = EUR).
    pub currency: u32,
}

impl Default for MarketLocale {
    fn default() -> Self {
        Self {
            country: "NL".to_string(),
            language: "english".to_string(),
            currency: 3,
        }
    }
}

/// Global configuration for the `Scraper` orchestrator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Retry policy for a single order-book request.
    pub backoff: BackoffConfig,
    /// Steady-state pacing and run budget.
    pub pacing: PacingConfig,
    /// Handling of items that never succeed.
    pub stall: StallPolicy,
    /// Locale for order-book requests.
    pub locale: MarketLocale,
}
