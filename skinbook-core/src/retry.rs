//! Bounded retry with exponential backoff for a single remote call.

use std::time::Duration;

use rand::Rng;

use crate::types::{BackoffConfig, ScrapeError};

/// Add up to `jitter_percent` percent of random delay on top of `base_ms`.
#[must_use]
pub fn jitter_wait(base_ms: u64, jitter_percent: u32) -> u64 {
    if jitter_percent == 0 {
        return base_ms;
    }
    let jitter_range = std::cmp::max(1, (base_ms.saturating_mul(u64::from(jitter_percent))) / 100);
    let mut rng = rand::rng();
    base_ms.saturating_add(rng.random_range(0..jitter_range))
}

/// Delay schedule derived from a [`BackoffConfig`].
///
/// Yields the wait before the second attempt, then before the third, and so on:
/// `min_backoff_ms`, multiplied by `factor` each step and capped at
/// `max_backoff_ms`. The iterator never ends; callers bound it by attempts.
#[derive(Debug, Clone)]
pub struct Backoff {
    next_ms: u64,
    max_ms: u64,
    factor: u64,
    jitter_percent: u32,
}

impl Backoff {
    /// Start a fresh schedule.
    #[must_use]
    pub fn new(cfg: &BackoffConfig) -> Self {
        Self {
            next_ms: cfg.min_backoff_ms.min(cfg.max_backoff_ms),
            max_ms: cfg.max_backoff_ms,
            factor: u64::from(cfg.factor.max(1)),
            jitter_percent: u32::from(cfg.jitter_percent.min(100)),
        }
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let base = self.next_ms;
        self.next_ms = base.saturating_mul(self.factor).min(self.max_ms);
        Some(Duration::from_millis(jitter_wait(base, self.jitter_percent)))
    }
}

/// Run `op` up to `cfg.max_attempts` times, sleeping between failures.
///
/// Every failure is logged with its attempt number and followed by the next
/// backoff delay, the final one included. Success returns at once.
///
/// # Errors
/// Returns a non-transient error (see [`ScrapeError::is_transient`]) as soon as
/// it occurs, and [`ScrapeError::MaxRetriesExceeded`] carrying the last error
/// message when every attempt failed.
pub async fn retry<T, F, Fut>(cfg: &BackoffConfig, label: &str, mut op: F) -> Result<T, ScrapeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScrapeError>>,
{
    let max_attempts = cfg.max_attempts.max(1);
    let mut delays = Backoff::new(cfg);
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_transient() => return Err(err),
            Err(err) => err,
        };

        #[cfg(feature = "tracing")]
        tracing::warn!(
            target: "skinbook::retry",
            label,
            attempt,
            max_attempts,
            error = %err,
            "Retry {attempt}/{max_attempts}: {err}"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = label;

        if let Some(delay) = delays.next() {
            tokio::time::sleep(delay).await;
        }
        if attempt >= max_attempts {
            return Err(ScrapeError::MaxRetriesExceeded {
                attempts: attempt,
                last_error: err.to_string(),
            });
        }
    }
}
