//! skinbook runs a resumable, rate-limited order-book sweep over the Steam
//! Community Market's CS2 catalog.
//!
//! Overview
//! - One invocation processes a bounded slice of the catalog (the budget is
//!   `run_window / inter_request_delay` items) starting at a persisted cursor.
//! - Each item's order book is fetched through bounded exponential-backoff
//!   retry, merged into the stored record without losing fields the fetch does
//!   not carry, and the full snapshot is persisted before the cursor advances.
//! - Reaching the catalog end resets the cursor to zero; the next invocation
//!   starts a new sweep.
//! - A failing item is paused on and retried at the same cursor; an optional
//!   stall policy skips it after a number of consecutive failures.
//! - A [`StopSignal`](skinbook_core::StopSignal) ends the run cooperatively at the
//!   next suspension point.
//!
//! Example
//! ```rust,ignore
//! use std::sync::Arc;
//! use skinbook::Scraper;
//! use skinbook_core::{JsonCursorStore, JsonItemStore, stop_channel};
//! use skinbook_steam::SteamConnector;
//!
//! let scraper = Scraper::builder()
//!     .connector(Arc::new(SteamConnector::builder().build()?))
//!     .item_store(Arc::new(JsonItemStore::new("data/cs2_items.json")))
//!     .cursor_store(Arc::new(JsonCursorStore::new("data/start_from.json")))
//!     .build()?;
//!
//! let (_handle, stop) = stop_channel();
//! let out = scraper.run(stop).await?;
//! println!("{:?}: {} records", out.report.outcome, out.items.len());
//! ```
#![warn(missing_docs)]

mod core;
mod ingest;

pub use crate::core::{Scraper, ScraperBuilder};
pub use crate::ingest::RunOutput;

pub use skinbook_core::types::{
    BackoffConfig, MarketLocale, PacingConfig, RunOutcome, RunReport, ScraperConfig, StallPolicy,
};
