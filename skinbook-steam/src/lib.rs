//! skinbook-steam
//!
//! Public connector that implements `MarketConnector` against the Steam
//! Community Market and the static documents the scraper depends on: the CS2
//! item catalog, the `hash_name -> item_nameid` map and a USD/EUR rate feed.
#![warn(missing_docs)]

/// Adapter definitions and the production adapter backed by `reqwest`.
pub mod adapter;
mod builder;

pub use builder::SteamConnectorBuilder;

use std::sync::Arc;

#[cfg(feature = "test-adapters")]
use adapter::CloneArcAdapters;
#[cfg(not(feature = "test-adapters"))]
use adapter::RealAdapter;
use adapter::{CONNECTOR, FxRates, HistogramPayload, SteamCatalog, SteamHistogram, SteamNameIds};
use async_trait::async_trait;
use skinbook_core::{
    CatalogEntry, Decimal, MarketLocale, NameIdMap, OrderBookSnapshot, ScrapeError,
    connector::{
        CatalogProvider, ExchangeRateProvider, MarketConnector, NameIdProvider,
        OrderBookProvider,
    },
};
use url::Url;

/// Steam Community Market base URL.
pub const STEAM_MARKET_BASE: &str = "https://steamcommunity.com/";
/// CS2 catalog document.
pub const CATALOG_URL: &str = "https://raw.githubusercontent.com/Kastuks/market-information/refs/heads/main/data/cs2_items.json";
/// CS2 `hash_name -> item_nameid` document.
pub const NAME_IDS_URL: &str = "https://raw.githubusercontent.com/somespecialone/steam-item-name-ids/refs/heads/master/data/cs2.json";
/// USD-based exchange-rate feed.
pub const FX_URL: &str = "https://api.fxratesapi.com/latest";

/// Remote locations used by the connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Marketplace base; the histogram path is joined onto it.
    pub market_base: Url,
    /// Catalog document.
    pub catalog: Url,
    /// Name-id document.
    pub name_ids: Url,
    /// Exchange-rate feed.
    pub fx: Url,
    /// Token sent as `Authorization: token <t>` with the catalog request.
    pub github_token: Option<String>,
}

impl Endpoints {
    /// Production endpoints.
    ///
    /// # Errors
    /// Never in practice; the built-in URLs are valid.
    pub fn steam() -> Result<Self, ScrapeError> {
        Ok(Self {
            market_base: parse_url(STEAM_MARKET_BASE)?,
            catalog: parse_url(CATALOG_URL)?,
            name_ids: parse_url(NAME_IDS_URL)?,
            fx: parse_url(FX_URL)?,
            github_token: None,
        })
    }

    /// Every endpoint under one base URL, for local servers and tests.
    ///
    /// Paths: `market/itemordershistogram`, `catalog.json`, `name_ids.json`, `fx.json`.
    ///
    /// # Errors
    /// Returns [`ScrapeError::InvalidArg`] when `base` is not a valid URL.
    pub fn under(base: &str) -> Result<Self, ScrapeError> {
        let root = parse_url(&format!("{}/", base.trim_end_matches('/')))?;
        let join = |path: &str| {
            root.join(path)
                .map_err(|e| ScrapeError::InvalidArg(format!("{base}{path}: {e}")))
        };
        Ok(Self {
            market_base: root.clone(),
            catalog: join("catalog.json")?,
            name_ids: join("name_ids.json")?,
            fx: join("fx.json")?,
            github_token: None,
        })
    }

    /// Full URL of the order-book histogram endpoint.
    ///
    /// # Errors
    /// Returns [`ScrapeError::InvalidArg`] when the base cannot be joined.
    pub fn histogram_url(&self) -> Result<Url, ScrapeError> {
        self.market_base
            .join("market/itemordershistogram")
            .map_err(|e| ScrapeError::InvalidArg(format!("market base {}: {e}", self.market_base)))
    }
}

pub(crate) fn parse_url(s: &str) -> Result<Url, ScrapeError> {
    Url::parse(s).map_err(|e| ScrapeError::InvalidArg(format!("invalid URL {s:?}: {e}")))
}

#[cfg(not(feature = "test-adapters"))]
type AdapterArc = Arc<RealAdapter>;

#[cfg(feature = "test-adapters")]
type HistogramAdapter = Arc<dyn SteamHistogram>;
#[cfg(not(feature = "test-adapters"))]
type HistogramAdapter = AdapterArc;

#[cfg(feature = "test-adapters")]
type CatalogAdapter = Arc<dyn SteamCatalog>;
#[cfg(not(feature = "test-adapters"))]
type CatalogAdapter = AdapterArc;

#[cfg(feature = "test-adapters")]
type NameIdsAdapter = Arc<dyn SteamNameIds>;
#[cfg(not(feature = "test-adapters"))]
type NameIdsAdapter = AdapterArc;

#[cfg(feature = "test-adapters")]
type FxAdapter = Arc<dyn FxRates>;
#[cfg(not(feature = "test-adapters"))]
type FxAdapter = AdapterArc;

/// Public connector type. Production users construct it with `SteamConnector::builder()`.
pub struct SteamConnector {
    histogram: HistogramAdapter,
    catalog: CatalogAdapter,
    name_ids: NameIdsAdapter,
    fx: FxAdapter,
}

impl SteamConnector {
    fn looks_like_not_found(msg: &str) -> bool {
        let m = msg.to_ascii_lowercase();
        m.contains("not found") || m.contains("no such item")
    }

    fn normalize_error(e: ScrapeError, what: &str) -> ScrapeError {
        match e {
            ScrapeError::Connector { connector: _, msg } => {
                if Self::looks_like_not_found(&msg) {
                    ScrapeError::not_found(what.to_string())
                } else {
                    ScrapeError::connector(CONNECTOR, msg)
                }
            }
            other => other,
        }
    }

    fn snapshot_from(
        payload: HistogramPayload,
        item_nameid: Option<u64>,
    ) -> Result<OrderBookSnapshot, ScrapeError> {
        if payload.success != Some(1) {
            return Err(ScrapeError::Data(format!(
                "order book for item_nameid={}: success={}",
                item_nameid.map(|id| id.to_string()).unwrap_or_default(),
                payload
                    .success
                    .map_or_else(|| "missing".to_string(), |s| s.to_string())
            )));
        }
        Ok(OrderBookSnapshot {
            sell_order_count: payload.sell_order_count,
            buy_order_count: payload.buy_order_count,
            lowest_sell_order: payload.lowest_sell_order,
            highest_buy_order: payload.highest_buy_order,
        })
    }

    /// For tests/injection (requires the `test-adapters` feature).
    ///
    /// Accepts a borrowed adapter to avoid unnecessary moves.
    #[cfg(feature = "test-adapters")]
    pub fn from_adapter<A: CloneArcAdapters + 'static>(adapter: &A) -> Self {
        Self {
            histogram: adapter.clone_arc_histogram(),
            catalog: adapter.clone_arc_catalog(),
            name_ids: adapter.clone_arc_name_ids(),
            fx: adapter.clone_arc_fx(),
        }
    }

    #[cfg(not(feature = "test-adapters"))]
    /// Build from a concrete `RealAdapter` by cloning it into shared handles.
    pub fn from_adapter(adapter: &RealAdapter) -> Self {
        let shared = Arc::new(adapter.clone());
        Self {
            histogram: Arc::clone(&shared),
            catalog: Arc::clone(&shared),
            name_ids: Arc::clone(&shared),
            fx: shared,
        }
    }
}

#[async_trait]
impl OrderBookProvider for SteamConnector {
    async fn order_book(
        &self,
        item_nameid: Option<u64>,
        locale: &MarketLocale,
    ) -> Result<OrderBookSnapshot, ScrapeError> {
        let what = format!(
            "order book for item_nameid={}",
            item_nameid.map(|id| id.to_string()).unwrap_or_default()
        );
        let payload = self
            .histogram
            .histogram(item_nameid, locale)
            .await
            .map_err(|e| Self::normalize_error(e, &what))?;
        Self::snapshot_from(payload, item_nameid)
    }
}

#[async_trait]
impl CatalogProvider for SteamConnector {
    async fn catalog(&self) -> Result<Vec<CatalogEntry>, ScrapeError> {
        self.catalog
            .catalog()
            .await
            .map_err(|e| Self::normalize_error(e, "catalog"))
    }
}

#[async_trait]
impl NameIdProvider for SteamConnector {
    async fn name_ids(&self) -> Result<NameIdMap, ScrapeError> {
        self.name_ids
            .name_ids()
            .await
            .map_err(|e| Self::normalize_error(e, "name ids"))
    }
}

#[async_trait]
impl ExchangeRateProvider for SteamConnector {
    async fn usd_to_eur(&self) -> Result<Decimal, ScrapeError> {
        let rate = self
            .fx
            .usd_to_eur()
            .await
            .map_err(|e| Self::normalize_error(e, "exchange rate"))?;
        if rate <= Decimal::ZERO {
            return Err(ScrapeError::Data(format!("non-positive exchange rate {rate}")));
        }
        Ok(rate)
    }
}

impl MarketConnector for SteamConnector {
    fn name(&self) -> &'static str {
        CONNECTOR
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
