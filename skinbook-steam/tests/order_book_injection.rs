#![cfg(feature = "test-adapters")]

use std::sync::Arc;

use skinbook_core::connector::{ExchangeRateProvider, OrderBookProvider};
use skinbook_core::{Decimal, MarketLocale, ScrapeError};
use skinbook_steam::{SteamConnector, adapter};

struct Combo {
    h: Arc<dyn adapter::SteamHistogram>,
}
impl adapter::CloneArcAdapters for Combo {
    fn clone_arc_histogram(&self) -> Arc<dyn adapter::SteamHistogram> {
        self.h.clone()
    }
}

#[tokio::test]
async fn order_book_uses_injected_adapter() {
    let h = <dyn adapter::SteamHistogram>::from_fn(|id| {
        assert_eq!(id, Some(42));
        Ok(adapter::HistogramPayload {
            success: Some(1),
            sell_order_count: 3,
            buy_order_count: 0,
            lowest_sell_order: Some(7),
            highest_buy_order: None,
        })
    });
    let c = SteamConnector::from_adapter(&Combo { h });
    let book = c.order_book(Some(42), &MarketLocale::default()).await.unwrap();
    assert_eq!(book.sell_order_count, 3);
    assert_eq!(book.highest_buy_order, None);
}

#[tokio::test]
async fn not_found_message_maps_to_not_found() {
    let h = <dyn adapter::SteamHistogram>::from_fn(|_| {
        Err(ScrapeError::connector("upstream", "Item Not Found"))
    });
    let c = SteamConnector::from_adapter(&Combo { h });
    let err = c.order_book(Some(1), &MarketLocale::default()).await.unwrap_err();
    assert!(matches!(err, ScrapeError::NotFound { .. }));
}

#[tokio::test]
async fn other_connector_errors_are_renamed() {
    let h = <dyn adapter::SteamHistogram>::from_fn(|_| {
        Err(ScrapeError::connector("upstream", "connection reset"))
    });
    let c = SteamConnector::from_adapter(&Combo { h });
    match c.order_book(Some(1), &MarketLocale::default()).await.unwrap_err() {
        ScrapeError::Connector { connector, msg } => {
            assert_eq!(connector, "skinbook-steam");
            assert_eq!(msg, "connection reset");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn unset_adapters_are_unsupported() {
    let h = <dyn adapter::SteamHistogram>::from_fn(|_| Ok(adapter::HistogramPayload::default()));
    let c = SteamConnector::from_adapter(&Combo { h });
    let err = c.usd_to_eur().await.unwrap_err();
    assert!(matches!(err, ScrapeError::Unsupported { .. }));
}

struct Fx(Arc<dyn adapter::FxRates>);
impl adapter::CloneArcAdapters for Fx {
    fn clone_arc_fx(&self) -> Arc<dyn adapter::FxRates> {
        self.0.clone()
    }
}

#[tokio::test]
async fn non_positive_rate_is_rejected() {
    let c = SteamConnector::from_adapter(&Fx(<dyn adapter::FxRates>::from_fn(|| {
        Ok(Decimal::ZERO)
    })));
    assert!(matches!(c.usd_to_eur().await, Err(ScrapeError::Data(_))));
}
