//! Report envelopes produced by the orchestrator.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ScrapeError;

/// Why an invocation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum RunOutcome {
    /// The per-invocation item budget was used up before the catalog end.
    BudgetExhausted,
    /// The catalog end was reached and the cursor wrapped to zero.
    SweepComplete,
    /// A stop signal ended the run early.
    Cancelled,
}

/// Summary of one scraper invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Cursor the run resumed from.
    pub start_cursor: usize,
    /// Cursor persisted for the next run.
    pub end_cursor: usize,
    /// Exclusive catalog index the run was allowed to reach.
    pub stopping_index: usize,
    /// Number of catalog entries loaded.
    pub catalog_len: usize,
    /// Items fetched and persisted successfully.
    pub fetched: usize,
    /// Loop iterations that ended on the error path.
    pub failed_attempts: usize,
    /// Items skipped by the stall policy.
    pub skipped: usize,
    /// Records held after the run.
    pub records: usize,
    /// How the run ended.
    pub outcome: RunOutcome,
    /// Conversion rate that was in effect for the run.
    pub conversion_rate: Decimal,
    /// Non-fatal issues encountered along the way.
    pub warnings: Vec<ScrapeError>,
}
