//! Skinbook-specific records, configuration primitives and errors.
#![warn(missing_docs)]

mod capability;
mod config;
mod error;
mod records;
mod reports;
pub mod serde_utils;

pub use capability::Capability;
pub use config::{BackoffConfig, MarketLocale, PacingConfig, ScraperConfig, StallPolicy};
pub use error::ScrapeError;
pub use records::{
    CatalogEntry, CursorFile, ItemRecord, ItemStatics, NameIdMap, OrderBookSnapshot,
};
pub use reports::{RunOutcome, RunReport};
