use core::fmt;
use serde::{Deserialize, Serialize};

/// Capability labels for errors and telemetry.
///
/// Each label maps to one connector role trait in `skinbook-core`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Capability {
    /// Order-book histogram for a single item.
    OrderBook,
    /// Ordered item catalog.
    Catalog,
    /// `hash_name` to marketplace id mapping.
    NameIds,
    /// Currency conversion rate.
    ExchangeRate,
}

impl Capability {
    /// Stable, kebab-case identifier for logs/errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OrderBook => "order-book",
            Self::Catalog => "catalog",
            Self::NameIds => "name-ids",
            Self::ExchangeRate => "exchange-rate",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
