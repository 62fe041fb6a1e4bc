//! skinbook-mock
//!
//! Deterministic connectors for tests, examples and the CLI's mock mode.
//!
//! - [`MockConnector`] serves a small fixed CS2 catalog with stable order books.
//! - [`DynamicMockConnector`] is driven by a [`DynamicMockController`] so tests
//!   can script failures, hangs and per-item results.

use async_trait::async_trait;
use skinbook_core::connector::{
    CatalogProvider, ExchangeRateProvider, MarketConnector, NameIdProvider, OrderBookProvider,
};
use skinbook_core::{
    CatalogEntry, Decimal, MarketLocale, NameIdMap, OrderBookSnapshot, ScrapeError,
};

mod dynamic;
mod fixtures;

pub use dynamic::{DynamicMockConnector, DynamicMockController, MockBehavior};
pub use fixtures::catalog::UNMAPPED;

/// Mock connector for CI-safe runs. Provides deterministic data from static fixtures.
pub struct MockConnector;

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConnector {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// USD to EUR rate served by the mock.
    #[must_use]
    pub fn fx_rate() -> Decimal {
        Decimal::new(92, 2)
    }

    /// The fixture catalog, in sweep order.
    #[must_use]
    pub fn fixture_catalog() -> Vec<CatalogEntry> {
        fixtures::catalog::catalog()
    }

    /// The fixture name-id map.
    #[must_use]
    pub fn fixture_name_ids() -> NameIdMap {
        fixtures::catalog::name_ids()
    }
}

impl MarketConnector for MockConnector {
    fn name(&self) -> &'static str {
        "skinbook-mock"
    }
    fn as_order_book_provider(&self) -> Option<&dyn OrderBookProvider> {
        Some(self as &dyn OrderBookProvider)
    }
    fn as_catalog_provider(&self) -> Option<&dyn CatalogProvider> {
        Some(self as &dyn CatalogProvider)
    }
    fn as_name_id_provider(&self) -> Option<&dyn NameIdProvider> {
        Some(self as &dyn NameIdProvider)
    }
    fn as_exchange_rate_provider(&self) -> Option<&dyn ExchangeRateProvider> {
        Some(self as &dyn ExchangeRateProvider)
    }
}

#[async_trait]
impl OrderBookProvider for MockConnector {
    async fn order_book(
        &self,
        item_nameid: Option<u64>,
        _locale: &MarketLocale,
    ) -> Result<OrderBookSnapshot, ScrapeError> {
        match item_nameid {
            // The marketplace answers a blank id with a server error.
            None => Err(ScrapeError::connector(
                "skinbook-mock",
                "server error 500: order book for item_nameid=",
            )),
            Some(id) => Ok(fixtures::books::by_id(id)),
        }
    }
}

#[async_trait]
impl CatalogProvider for MockConnector {
    async fn catalog(&self) -> Result<Vec<CatalogEntry>, ScrapeError> {
        Ok(Self::fixture_catalog())
    }
}

#[async_trait]
impl NameIdProvider for MockConnector {
    async fn name_ids(&self) -> Result<NameIdMap, ScrapeError> {
        Ok(Self::fixture_name_ids())
    }
}

#[async_trait]
impl ExchangeRateProvider for MockConnector {
    async fn usd_to_eur(&self) -> Result<Decimal, ScrapeError> {
        Ok(Self::fx_rate())
    }
}
