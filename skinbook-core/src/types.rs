//! Re-export of foundational types from `skinbook-types`.
// Consolidated re-exports so downstream crates can depend on `skinbook-core` only

pub use skinbook_types::{Capability, ScrapeError};

pub use skinbook_types::{BackoffConfig, MarketLocale, PacingConfig, ScraperConfig, StallPolicy};

pub use skinbook_types::{
    CatalogEntry, CursorFile, ItemRecord, ItemStatics, NameIdMap, OrderBookSnapshot,
};

pub use skinbook_types::{RunOutcome, RunReport};

pub use skinbook_types::serde_utils;

pub use rust_decimal::Decimal;
