#[cfg(feature = "test-adapters")]
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use skinbook_core::types::serde_utils;
use skinbook_core::{CatalogEntry, Decimal, MarketLocale, NameIdMap, ScrapeError};

use crate::Endpoints;

pub(crate) const CONNECTOR: &str = "skinbook-steam";

/// Browser-like user agent; the marketplace throttles obvious bots harder.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// Raw `itemordershistogram` payload.
///
/// Only the summary fields are modelled; the order tables and graphs are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HistogramPayload {
    /// `1` on success; anything else is a marketplace-side failure.
    #[serde(default, deserialize_with = "serde_utils::opt_u64")]
    pub success: Option<u64>,
    /// Outstanding sell orders.
    #[serde(default, deserialize_with = "serde_utils::u64_or_zero")]
    pub sell_order_count: u64,
    /// Outstanding buy orders.
    #[serde(default, deserialize_with = "serde_utils::u64_or_zero")]
    pub buy_order_count: u64,
    /// Cheapest sell order in cents.
    #[serde(default, deserialize_with = "serde_utils::opt_u64")]
    pub lowest_sell_order: Option<u64>,
    /// Highest buy order in cents.
    #[serde(default, deserialize_with = "serde_utils::opt_u64")]
    pub highest_buy_order: Option<u64>,
}

/// Order-book histogram abstraction (so we can inject mocks in tests).
#[async_trait]
pub trait SteamHistogram: Send + Sync {
    /// Fetch the histogram for one item id. `None` is sent as an empty id.
    async fn histogram(
        &self,
        item_nameid: Option<u64>,
        locale: &MarketLocale,
    ) -> Result<HistogramPayload, ScrapeError>;
}

/// Catalog document abstraction.
#[async_trait]
pub trait SteamCatalog: Send + Sync {
    /// Fetch the ordered catalog.
    async fn catalog(&self) -> Result<Vec<CatalogEntry>, ScrapeError>;
}

/// Name-id document abstraction.
#[async_trait]
pub trait SteamNameIds: Send + Sync {
    /// Fetch the `hash_name -> item_nameid` document.
    async fn name_ids(&self) -> Result<NameIdMap, ScrapeError>;
}

/// Exchange-rate abstraction.
#[async_trait]
pub trait FxRates: Send + Sync {
    /// Fetch the USD to EUR rate.
    async fn usd_to_eur(&self) -> Result<Decimal, ScrapeError>;
}

/// Real adapter backed by one shared `reqwest::Client`.
/// The client is `Clone + Send + Sync` and pools connections internally.
#[derive(Clone)]
pub struct RealAdapter {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl RealAdapter {
    /// Wrap an existing client.
    #[must_use]
    pub const fn new(http: reqwest::Client, endpoints: Endpoints) -> Self {
        Self { http, endpoints }
    }

    /// Build a client with the default user agent and the given request timeout.
    ///
    /// # Errors
    /// Returns [`ScrapeError::Connector`] if the TLS backend cannot be initialised.
    pub fn with_defaults(
        endpoints: Endpoints,
        user_agent: &str,
        timeout: std::time::Duration,
    ) -> Result<Self, ScrapeError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| ScrapeError::connector(CONNECTOR, e.to_string()))?;
        Ok(Self::new(http, endpoints))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
        context: &str,
    ) -> Result<T, ScrapeError> {
        let resp = req.send().await.map_err(|e| map_http_err(&e, context))?;
        let status = resp.status();
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "skinbook::steam", %status, context, "response");
        if !status.is_success() {
            return Err(map_status(status, context));
        }
        resp.json::<T>()
            .await
            .map_err(|e| ScrapeError::Data(format!("{context}: {e}")))
    }
}

fn map_status(status: reqwest::StatusCode, context: &str) -> ScrapeError {
    match status.as_u16() {
        404 => ScrapeError::not_found(context.to_string()),
        429 => ScrapeError::connector(CONNECTOR, format!("rate limit: {context}")),
        s if status.is_server_error() => {
            ScrapeError::connector(CONNECTOR, format!("server error {s}: {context}"))
        }
        s => ScrapeError::connector(CONNECTOR, format!("status {s}: {context}")),
    }
}

fn map_http_err(e: &reqwest::Error, context: &str) -> ScrapeError {
    if e.is_timeout() {
        ScrapeError::connector(CONNECTOR, format!("timeout: {context}"))
    } else if let Some(status) = e.status() {
        map_status(status, context)
    } else {
        ScrapeError::connector(CONNECTOR, format!("{context}: {e}"))
    }
}

/// Query string for the histogram endpoint.
///
/// Parameter order follows what the marketplace's own web client sends.
pub(crate) fn histogram_query(
    item_nameid: Option<u64>,
    locale: &MarketLocale,
) -> Vec<(&'static str, String)> {
    vec![
        ("norender", "1".to_string()),
        ("country", locale.country.clone()),
        ("language", locale.language.clone()),
        ("currency", locale.currency.to_string()),
        (
            "item_nameid",
            item_nameid.map(|id| id.to_string()).unwrap_or_default(),
        ),
        ("two_factor", "0".to_string()),
    ]
}

#[async_trait]
impl SteamHistogram for RealAdapter {
    async fn histogram(
        &self,
        item_nameid: Option<u64>,
        locale: &MarketLocale,
    ) -> Result<HistogramPayload, ScrapeError> {
        let url = self.endpoints.histogram_url()?;
        let context = format!(
            "order book for item_nameid={}",
            item_nameid.map(|id| id.to_string()).unwrap_or_default()
        );
        let req = self
            .http
            .get(url)
            .query(&histogram_query(item_nameid, locale));
        self.get_json(req, &context).await
    }
}

#[async_trait]
impl SteamCatalog for RealAdapter {
    async fn catalog(&self) -> Result<Vec<CatalogEntry>, ScrapeError> {
        let mut req = self.http.get(self.endpoints.catalog.clone());
        if let Some(token) = &self.endpoints.github_token {
            req = req.header(reqwest::header::AUTHORIZATION, format!("token {token}"));
        }
        self.get_json(req, "catalog").await
    }
}

#[async_trait]
impl SteamNameIds for RealAdapter {
    async fn name_ids(&self) -> Result<NameIdMap, ScrapeError> {
        let req = self.http.get(self.endpoints.name_ids.clone());
        self.get_json(req, "name ids").await
    }
}

#[derive(Deserialize)]
struct FxPayload {
    rates: std::collections::HashMap<String, serde_json::Number>,
}

#[async_trait]
impl FxRates for RealAdapter {
    async fn usd_to_eur(&self) -> Result<Decimal, ScrapeError> {
        let req = self.http.get(self.endpoints.fx.clone());
        let payload: FxPayload = self.get_json(req, "exchange rate").await?;
        let eur = payload
            .rates
            .get("EUR")
            .ok_or_else(|| ScrapeError::Data("exchange rate: no EUR rate".into()))?;
        eur.to_string()
            .parse::<Decimal>()
            .map_err(|e| ScrapeError::Data(format!("exchange rate {eur}: {e}")))
    }
}

#[cfg(feature = "test-adapters")]
impl dyn SteamHistogram {
    /// Test helper that builds a `SteamHistogram` from a closure.
    pub fn from_fn<F>(f: F) -> Arc<dyn SteamHistogram>
    where
        F: Send + Sync + 'static + Fn(Option<u64>) -> Result<HistogramPayload, ScrapeError>,
    {
        struct FnHistogram<F>(F);
        #[async_trait]
        impl<F> SteamHistogram for FnHistogram<F>
        where
            F: Send + Sync + 'static + Fn(Option<u64>) -> Result<HistogramPayload, ScrapeError>,
        {
            async fn histogram(
                &self,
                item_nameid: Option<u64>,
                _locale: &MarketLocale,
            ) -> Result<HistogramPayload, ScrapeError> {
                (self.0)(item_nameid)
            }
        }
        Arc::new(FnHistogram(f))
    }
}

#[cfg(feature = "test-adapters")]
impl dyn SteamCatalog {
    /// Test helper that builds a `SteamCatalog` from a closure.
    pub fn from_fn<F>(f: F) -> Arc<dyn SteamCatalog>
    where
        F: Send + Sync + 'static + Fn() -> Result<Vec<CatalogEntry>, ScrapeError>,
    {
        struct FnCatalog<F>(F);
        #[async_trait]
        impl<F> SteamCatalog for FnCatalog<F>
        where
            F: Send + Sync + 'static + Fn() -> Result<Vec<CatalogEntry>, ScrapeError>,
        {
            async fn catalog(&self) -> Result<Vec<CatalogEntry>, ScrapeError> {
                (self.0)()
            }
        }
        Arc::new(FnCatalog(f))
    }
}

#[cfg(feature = "test-adapters")]
impl dyn SteamNameIds {
    /// Test helper that builds a `SteamNameIds` from a closure.
    pub fn from_fn<F>(f: F) -> Arc<dyn SteamNameIds>
    where
        F: Send + Sync + 'static + Fn() -> Result<NameIdMap, ScrapeError>,
    {
        struct FnNameIds<F>(F);
        #[async_trait]
        impl<F> SteamNameIds for FnNameIds<F>
        where
            F: Send + Sync + 'static + Fn() -> Result<NameIdMap, ScrapeError>,
        {
            async fn name_ids(&self) -> Result<NameIdMap, ScrapeError> {
                (self.0)()
            }
        }
        Arc::new(FnNameIds(f))
    }
}

#[cfg(feature = "test-adapters")]
impl dyn FxRates {
    /// Test helper that builds an `FxRates` from a closure.
    pub fn from_fn<F>(f: F) -> Arc<dyn FxRates>
    where
        F: Send + Sync + 'static + Fn() -> Result<Decimal, ScrapeError>,
    {
        struct FnFx<F>(F);
        #[async_trait]
        impl<F> FxRates for FnFx<F>
        where
            F: Send + Sync + 'static + Fn() -> Result<Decimal, ScrapeError>,
        {
            async fn usd_to_eur(&self) -> Result<Decimal, ScrapeError> {
                (self.0)()
            }
        }
        Arc::new(FnFx(f))
    }
}

/// Hand out per-capability adapters; defaults answer `unsupported`.
#[cfg(feature = "test-adapters")]
pub trait CloneArcAdapters {
    /// Clone as `Arc<dyn SteamHistogram>`.
    fn clone_arc_histogram(&self) -> Arc<dyn SteamHistogram> {
        <dyn SteamHistogram>::from_fn(|_| {
            Err(ScrapeError::unsupported(skinbook_core::Capability::OrderBook))
        })
    }
    /// Clone as `Arc<dyn SteamCatalog>`.
    fn clone_arc_catalog(&self) -> Arc<dyn SteamCatalog> {
        <dyn SteamCatalog>::from_fn(|| {
            Err(ScrapeError::unsupported(skinbook_core::Capability::Catalog))
        })
    }
    /// Clone as `Arc<dyn SteamNameIds>`.
    fn clone_arc_name_ids(&self) -> Arc<dyn SteamNameIds> {
        <dyn SteamNameIds>::from_fn(|| {
            Err(ScrapeError::unsupported(skinbook_core::Capability::NameIds))
        })
    }
    /// Clone as `Arc<dyn FxRates>`.
    fn clone_arc_fx(&self) -> Arc<dyn FxRates> {
        <dyn FxRates>::from_fn(|| {
            Err(ScrapeError::unsupported(
                skinbook_core::Capability::ExchangeRate,
            ))
        })
    }
}

#[cfg(feature = "test-adapters")]
impl CloneArcAdapters for RealAdapter {
    fn clone_arc_histogram(&self) -> Arc<dyn SteamHistogram> {
        Arc::new(self.clone()) as Arc<dyn SteamHistogram>
    }
    fn clone_arc_catalog(&self) -> Arc<dyn SteamCatalog> {
        Arc::new(self.clone()) as Arc<dyn SteamCatalog>
    }
    fn clone_arc_name_ids(&self) -> Arc<dyn SteamNameIds> {
        Arc::new(self.clone()) as Arc<dyn SteamNameIds>
    }
    fn clone_arc_fx(&self) -> Arc<dyn FxRates> {
        Arc::new(self.clone()) as Arc<dyn FxRates>
    }
}
