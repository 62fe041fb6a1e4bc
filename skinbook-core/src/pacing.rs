//! Steady-state pacing: the fixed inter-request delay, the post-failure pause
//! and the per-invocation item budget.

use crate::stop::{StopSignal, Wake, sleep_or_stop};
use crate::types::PacingConfig;

/// Fixed-delay pacer.
///
/// Independent of retry backoff: backoff recovers one failing request, the
/// pacer keeps the whole loop under the remote request-rate ceiling.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    cfg: PacingConfig,
}

impl Pacer {
    /// Build a pacer from its configuration.
    #[must_use]
    pub const fn new(cfg: PacingConfig) -> Self {
        Self { cfg }
    }

    /// Maximum items per invocation; `None` when unbounded.
    #[must_use]
    pub fn budget(&self) -> Option<usize> {
        self.cfg.max_items_per_run()
    }

    /// Exclusive catalog index an invocation starting at `cursor` may reach.
    #[must_use]
    pub fn stopping_index(&self, cursor: usize, catalog_len: usize) -> usize {
        match self.budget() {
            Some(budget) => cursor.saturating_add(budget).min(catalog_len),
            None => catalog_len,
        }
    }

    /// Wait out the inter-request delay.
    pub async fn pace(&self, stop: &mut StopSignal) -> Wake {
        sleep_or_stop(self.cfg.inter_request_delay, stop).await
    }

    /// Wait out the longer pause that follows a failed item.
    pub async fn pause_after_error(&self, stop: &mut StopSignal) -> Wake {
        sleep_or_stop(self.cfg.error_pause, stop).await
    }
}
