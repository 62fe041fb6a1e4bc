use async_trait::async_trait;

use crate::types::{
    CatalogEntry, Decimal, MarketLocale, NameIdMap, OrderBookSnapshot, ScrapeError,
};

/// Focused role trait for connectors that serve per-item order books.
#[async_trait]
pub trait OrderBookProvider: Send + Sync {
    /// Fetch the current order-book snapshot for one item.
    ///
    /// An unknown id (`None`) is still sent to the remote endpoint; the call is
    /// expected to fail there and be handled like any other remote fault.
    async fn order_book(
        &self,
        item_nameid: Option<u64>,
        locale: &MarketLocale,
    ) -> Result<OrderBookSnapshot, ScrapeError>;
}

/// Focused role trait for connectors that serve the ordered item catalog.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch the full catalog, in sweep order.
    async fn catalog(&self) -> Result<Vec<CatalogEntry>, ScrapeError>;
}

/// Focused role trait for connectors that resolve hash names to marketplace ids.
#[async_trait]
pub trait NameIdProvider: Send + Sync {
    /// Fetch the complete `hash_name -> item_nameid` mapping.
    async fn name_ids(&self) -> Result<NameIdMap, ScrapeError>;
}

/// Focused role trait for connectors that provide a currency conversion rate.
#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    /// Fetch the current USD to EUR rate.
    async fn usd_to_eur(&self) -> Result<Decimal, ScrapeError>;
}

/// Primary connector interface.
///
/// A connector advertises each capability by returning a trait object from the
/// matching `as_*_provider` accessor; the defaults advertise nothing.
pub trait MarketConnector: Send + Sync {
    /// A stable identifier used in logs and error messages (e.g. "skinbook-steam").
    fn name(&self) -> &'static str;

    /// Advertise order-book capability.
    fn as_order_book_provider(&self) -> Option<&dyn OrderBookProvider> {
        None
    }

    /// Advertise catalog capability.
    fn as_catalog_provider(&self) -> Option<&dyn CatalogProvider> {
        None
    }

    /// Advertise name-id capability.
    fn as_name_id_provider(&self) -> Option<&dyn NameIdProvider> {
        None
    }

    /// Advertise exchange-rate capability.
    fn as_exchange_rate_provider(&self) -> Option<&dyn ExchangeRateProvider> {
        None
    }
}
