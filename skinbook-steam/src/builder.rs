use std::time::Duration;

use skinbook_core::ScrapeError;

use crate::adapter::{DEFAULT_USER_AGENT, RealAdapter};
use crate::{Endpoints, SteamConnector, parse_url};

/// Builder for [`SteamConnector`].
///
/// Defaults to the production endpoints, the browser user agent and a 30 second
/// per-request timeout.
#[derive(Debug, Clone)]
pub struct SteamConnectorBuilder {
    endpoints: Option<Endpoints>,
    market_base: Option<String>,
    catalog_url: Option<String>,
    name_ids_url: Option<String>,
    fx_url: Option<String>,
    github_token: Option<String>,
    user_agent: String,
    timeout: Duration,
    http: Option<reqwest::Client>,
}

impl Default for SteamConnectorBuilder {
    fn default() -> Self {
        Self {
            endpoints: None,
            market_base: None,
            catalog_url: None,
            name_ids_url: None,
            fx_url: None,
            github_token: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            http: None,
        }
    }
}

impl SteamConnector {
    /// Returns a builder preloaded with the production endpoints.
    #[must_use]
    pub fn builder() -> SteamConnectorBuilder {
        SteamConnectorBuilder::default()
    }
}

impl SteamConnectorBuilder {
    /// Start from a complete endpoint set instead of the production one.
    #[must_use]
    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    /// Override the marketplace base URL.
    #[must_use]
    pub fn market_base(mut self, url: impl Into<String>) -> Self {
        self.market_base = Some(url.into());
        self
    }

    /// Override the catalog document URL.
    #[must_use]
    pub fn catalog_url(mut self, url: impl Into<String>) -> Self {
        self.catalog_url = Some(url.into());
        self
    }

    /// Override the name-id document URL.
    #[must_use]
    pub fn name_ids_url(mut self, url: impl Into<String>) -> Self {
        self.name_ids_url = Some(url.into());
        self
    }

    /// Override the exchange-rate feed URL.
    #[must_use]
    pub fn fx_url(mut self, url: impl Into<String>) -> Self {
        self.fx_url = Some(url.into());
        self
    }

    /// Send `Authorization: token <token>` with the catalog request.
    #[must_use]
    pub fn github_token(mut self, token: Option<String>) -> Self {
        self.github_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Override the user agent.
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    /// Per-request timeout enforced by the HTTP client.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a preconfigured `reqwest::Client`; user agent and timeout are then ignored.
    #[must_use]
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Build the connector.
    ///
    /// # Errors
    /// Returns [`ScrapeError::InvalidArg`] for an unparsable URL or a market base
    /// that cannot carry the histogram path, and [`ScrapeError::Connector`] when
    /// the HTTP client cannot be built.
    pub fn build(self) -> Result<SteamConnector, ScrapeError> {
        let mut endpoints = match self.endpoints {
            Some(e) => e,
            None => Endpoints::steam()?,
        };
        if let Some(u) = &self.market_base {
            endpoints.market_base = parse_url(u)?;
        }
        if let Some(u) = &self.catalog_url {
            endpoints.catalog = parse_url(u)?;
        }
        if let Some(u) = &self.name_ids_url {
            endpoints.name_ids = parse_url(u)?;
        }
        if let Some(u) = &self.fx_url {
            endpoints.fx = parse_url(u)?;
        }
        if self.github_token.is_some() {
            endpoints.github_token = self.github_token;
        }
        // A base that cannot carry a path would fail every order-book request.
        endpoints.histogram_url()?;

        let adapter = match self.http {
            Some(http) => RealAdapter::new(http, endpoints),
            None => RealAdapter::with_defaults(endpoints, &self.user_agent, self.timeout)?,
        };
        Ok(SteamConnector::from_adapter(&adapter))
    }
}
