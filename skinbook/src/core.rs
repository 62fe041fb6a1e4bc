use std::sync::Arc;

use skinbook_core::types::{BackoffConfig, MarketLocale, PacingConfig, ScraperConfig, StallPolicy};
use skinbook_core::{Capability, CursorStore, ItemStore, MarketConnector, Pacer, ScrapeError};

/// Orchestrator that drives the resumable catalog sweep.
pub struct Scraper {
    pub(crate) connector: Arc<dyn MarketConnector>,
    pub(crate) items: Arc<dyn ItemStore>,
    pub(crate) cursor: Arc<dyn CursorStore>,
    pub(crate) cfg: ScraperConfig,
    pub(crate) pacer: Pacer,
}

/// Builder for constructing a `Scraper` with custom configuration.
pub struct ScraperBuilder {
    connector: Option<Arc<dyn MarketConnector>>,
    items: Option<Arc<dyn ItemStore>>,
    cursor: Option<Arc<dyn CursorStore>>,
    cfg: ScraperConfig,
}

impl Default for ScraperBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScraperBuilder {
    /// Create a new builder with the reference configuration.
    ///
    /// A connector, an item store and a cursor store must be supplied before
    /// [`build`](Self::build).
    #[must_use]
    pub fn new() -> Self {
        Self {
            connector: None,
            items: None,
            cursor: None,
            cfg: ScraperConfig::default(),
        }
    }

    /// Register the market connector.
    ///
    /// It must serve order books, the catalog and name ids; an exchange-rate
    /// capability is optional.
    #[must_use]
    pub fn connector(mut self, c: Arc<dyn MarketConnector>) -> Self {
        self.connector = Some(c);
        self
    }

    /// Where the item snapshot is persisted.
    #[must_use]
    pub fn item_store(mut self, store: Arc<dyn ItemStore>) -> Self {
        self.items = Some(store);
        self
    }

    /// Where the resume cursor is persisted.
    #[must_use]
    pub fn cursor_store(mut self, store: Arc<dyn CursorStore>) -> Self {
        self.cursor = Some(store);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: ScraperConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Retry policy for a single order-book request.
    #[must_use]
    pub const fn backoff(mut self, cfg: BackoffConfig) -> Self {
        self.cfg.backoff = cfg;
        self
    }

    /// Inter-request delay, error pause, run window and request timeout.
    #[must_use]
    pub const fn pacing(mut self, cfg: PacingConfig) -> Self {
        self.cfg.pacing = cfg;
        self
    }

    /// Handling of items that keep failing.
    #[must_use]
    pub const fn stall_policy(mut self, policy: StallPolicy) -> Self {
        self.cfg.stall = policy;
        self
    }

    /// Country, language and currency sent with order-book requests.
    #[must_use]
    pub fn locale(mut self, locale: MarketLocale) -> Self {
        self.cfg.locale = locale;
        self
    }

    /// Build the `Scraper`.
    ///
    /// # Errors
    /// Returns `InvalidArg` when a collaborator is missing or the backoff
    /// configuration allows no attempt, and `Unsupported` when the connector
    /// lacks a required capability.
    pub fn build(self) -> Result<Scraper, ScrapeError> {
        let connector = self.connector.ok_or_else(|| {
            ScrapeError::InvalidArg("no connector registered; add one via connector(...)".into())
        })?;
        let items = self
            .items
            .ok_or_else(|| ScrapeError::InvalidArg("no item store configured".into()))?;
        let cursor = self
            .cursor
            .ok_or_else(|| ScrapeError::InvalidArg("no cursor store configured".into()))?;

        if connector.as_order_book_provider().is_none() {
            return Err(ScrapeError::unsupported(Capability::OrderBook));
        }
        if connector.as_catalog_provider().is_none() {
            return Err(ScrapeError::unsupported(Capability::Catalog));
        }
        if connector.as_name_id_provider().is_none() {
            return Err(ScrapeError::unsupported(Capability::NameIds));
        }
        if self.cfg.backoff.max_attempts == 0 {
            return Err(ScrapeError::InvalidArg("max_attempts must be at least 1".into()));
        }

        Ok(Scraper {
            connector,
            items,
            cursor,
            pacer: Pacer::new(self.cfg.pacing),
            cfg: self.cfg,
        })
    }
}

impl Scraper {
    /// Start building a new `Scraper`.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use skinbook::Scraper;
    /// use skinbook_core::{JsonCursorStore, JsonItemStore};
    ///
    /// let scraper = Scraper::builder()
    ///     .connector(Arc::new(SteamConnector::builder().build()?))
    ///     .item_store(Arc::new(JsonItemStore::new("data/cs2_items.json")))
    ///     .cursor_store(Arc::new(JsonCursorStore::new("data/start_from.json")))
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn builder() -> ScraperBuilder {
        ScraperBuilder::new()
    }

    /// The configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &ScraperConfig {
        &self.cfg
    }

    /// Items one invocation attempts at most; `None` when unbounded.
    #[must_use]
    pub fn budget(&self) -> Option<usize> {
        self.pacer.budget()
    }

    /// Wrap a provider future with a timeout and standardized timeout error mapping.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "skinbook::core::provider_call_with_timeout",
            skip(fut),
            fields(
                connector = connector_name,
                capability = %capability,
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            ),
        )
    )]
    pub(crate) async fn provider_call_with_timeout<T, Fut>(
        connector_name: &'static str,
        capability: Capability,
        timeout: std::time::Duration,
        fut: Fut,
    ) -> Result<T, ScrapeError>
    where
        Fut: core::future::Future<Output = Result<T, ScrapeError>>,
    {
        (tokio::time::timeout(timeout, fut).await)
            .unwrap_or_else(|_| Err(ScrapeError::provider_timeout(connector_name, capability)))
    }
}
