use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use skinbook_core::connector::{
    CatalogProvider, ExchangeRateProvider, MarketConnector, NameIdProvider, OrderBookProvider,
};
use skinbook_core::{
    Capability, CatalogEntry, Decimal, MarketLocale, NameIdMap, OrderBookSnapshot, ScrapeError,
};

/// Instruction for how a method should behave for a given input.
#[derive(Clone, Debug)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Fail immediately with the provided error.
    Fail(ScrapeError),
    /// Hang indefinitely (simulate a timeout).
    Hang,
}

impl<T> MockBehavior<T> {
    async fn resolve(self) -> Result<T, ScrapeError> {
        match self {
            Self::Return(v) => Ok(v),
            Self::Fail(e) => Err(e),
            Self::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}

#[derive(Default)]
struct InternalState {
    catalog: Option<MockBehavior<Vec<CatalogEntry>>>,
    name_ids: Option<MockBehavior<NameIdMap>>,
    fx: Option<MockBehavior<Decimal>>,
    // One-shot behaviors consumed in order before the standing rule applies.
    book_scripts: HashMap<Option<u64>, VecDeque<MockBehavior<OrderBookSnapshot>>>,
    book_rules: HashMap<Option<u64>, MockBehavior<OrderBookSnapshot>>,
    book_default: Option<MockBehavior<OrderBookSnapshot>>,
    book_requests: Vec<Option<u64>>,
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockController {
    /// Set the catalog served by the mock.
    pub async fn set_catalog(&self, behavior: MockBehavior<Vec<CatalogEntry>>) {
        self.state.lock().await.catalog = Some(behavior);
    }

    /// Set the name-id map served by the mock.
    pub async fn set_name_ids(&self, behavior: MockBehavior<NameIdMap>) {
        self.state.lock().await.name_ids = Some(behavior);
    }

    /// Set the exchange-rate behavior.
    pub async fn set_fx_behavior(&self, behavior: MockBehavior<Decimal>) {
        self.state.lock().await.fx = Some(behavior);
    }

    /// Set the standing behavior for `order_book` calls for one id.
    pub async fn set_order_book_behavior(
        &self,
        item_nameid: Option<u64>,
        behavior: MockBehavior<OrderBookSnapshot>,
    ) {
        let mut guard = self.state.lock().await;
        guard.book_rules.insert(item_nameid, behavior);
    }

    /// Queue behaviors consumed one per call for `item_nameid`, ahead of the standing rule.
    pub async fn script_order_book(
        &self,
        item_nameid: Option<u64>,
        behaviors: impl IntoIterator<Item = MockBehavior<OrderBookSnapshot>>,
    ) {
        let mut guard = self.state.lock().await;
        guard
            .book_scripts
            .entry(item_nameid)
            .or_default()
            .extend(behaviors);
    }

    /// Behavior for ids with neither a script nor a standing rule.
    pub async fn set_default_order_book(&self, behavior: MockBehavior<OrderBookSnapshot>) {
        self.state.lock().await.book_default = Some(behavior);
    }

    /// Every id passed to `order_book`, in call order.
    pub async fn order_book_requests(&self) -> Vec<Option<u64>> {
        self.state.lock().await.book_requests.clone()
    }

    /// Clear all configured behaviors and request logs.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        *guard = InternalState::default();
    }
}

/// A connector that defers all behavior to an external controller.
pub struct DynamicMockConnector {
    name: &'static str,
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockConnector {
    /// Create a new dynamic mock connector and its controller.
    #[must_use]
    pub fn new_with_controller(
        name: &'static str,
    ) -> (Arc<dyn MarketConnector>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = DynamicMockController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self { name, state });
        (me as Arc<dyn MarketConnector>, controller)
    }
}

impl MarketConnector for DynamicMockConnector {
    fn name(&self) -> &'static str {
        self.name
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
impl OrderBookProvider for DynamicMockConnector {
    async fn order_book(
        &self,
        item_nameid: Option<u64>,
        _locale: &MarketLocale,
    ) -> Result<OrderBookSnapshot, ScrapeError> {
        // Pick the behavior without holding the lock across the await below
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.book_requests.push(item_nameid);
            let scripted = guard
                .book_scripts
                .get_mut(&item_nameid)
                .and_then(VecDeque::pop_front);
            scripted
                .or_else(|| guard.book_rules.get(&item_nameid).cloned())
                .or_else(|| guard.book_default.clone())
        };
        match behavior {
            Some(b) => b.resolve().await,
            None => Err(ScrapeError::unsupported(Capability::OrderBook)),
        }
    }
}

#[async_trait]
impl CatalogProvider for DynamicMockConnector {
    async fn catalog(&self) -> Result<Vec<CatalogEntry>, ScrapeError> {
        let behavior = self.state.lock().await.catalog.clone();
        match behavior {
            Some(b) => b.resolve().await,
            None => Err(ScrapeError::unsupported(Capability::Catalog)),
        }
    }
}

#[async_trait]
impl NameIdProvider for DynamicMockConnector {
    async fn name_ids(&self) -> Result<NameIdMap, ScrapeError> {
        let behavior = self.state.lock().await.name_ids.clone();
        match behavior {
            Some(b) => b.resolve().await,
            None => Err(ScrapeError::unsupported(Capability::NameIds)),
        }
    }
}

#[async_trait]
impl ExchangeRateProvider for DynamicMockConnector {
    async fn usd_to_eur(&self) -> Result<Decimal, ScrapeError> {
        let behavior = self.state.lock().await.fx.clone();
        match behavior {
            Some(b) => b.resolve().await,
            None => Err(ScrapeError::unsupported(Capability::ExchangeRate)),
        }
    }
}
