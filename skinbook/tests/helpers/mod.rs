#![allow(dead_code)]

use std::sync::Arc;

use skinbook::{Scraper, StallPolicy};
use skinbook_core::{
    CatalogEntry, Decimal, MemoryCursorStore, MemoryItemStore, NameIdMap, OrderBookSnapshot,
};
use skinbook_mock::{DynamicMockConnector, DynamicMockController, MockBehavior};

pub const ID_BASE: u64 = 1_000;

pub fn name(i: usize) -> String {
    format!("Item {i}")
}

pub fn id(i: usize) -> u64 {
    ID_BASE + i as u64
}

pub fn entries(n: usize) -> Vec<CatalogEntry> {
    (0..n)
        .map(|i| {
            let image = format!("img{i}.png");
            CatalogEntry::new(name(i), Some(image.as_str()))
        })
        .collect()
}

pub fn ids(n: usize) -> NameIdMap {
    (0..n).map(|i| (name(i), id(i))).collect()
}

pub fn book(sells: u64) -> OrderBookSnapshot {
    OrderBookSnapshot {
        sell_order_count: sells,
        buy_order_count: sells / 2,
        lowest_sell_order: Some(1_050),
        highest_buy_order: Some(980),
    }
}

pub struct Harness {
    pub scraper: Scraper,
    pub controller: DynamicMockController,
    pub items: Arc<MemoryItemStore>,
    pub cursor: Arc<MemoryCursorStore>,
}

/// Reference configuration (7 s delay, 100 s window, 30 s error pause, 5 attempts)
/// over an `n`-item catalog where every order book succeeds by default.
pub async fn harness(
    n: usize,
    items: MemoryItemStore,
    cursor: MemoryCursorStore,
    stall: StallPolicy,
) -> Harness {
    let (connector, controller) = DynamicMockConnector::new_with_controller("mock");
    controller.set_catalog(MockBehavior::Return(entries(n))).await;
    controller.set_name_ids(MockBehavior::Return(ids(n))).await;
    controller
        .set_fx_behavior(MockBehavior::Return(Decimal::new(92, 2)))
        .await;
    controller
        .set_default_order_book(MockBehavior::Return(book(10)))
        .await;

    let items = Arc::new(items);
    let cursor = Arc::new(cursor);
    let scraper = Scraper::builder()
        .connector(connector)
        .item_store(items.clone())
        .cursor_store(cursor.clone())
        .stall_policy(stall)
        .build()
        .expect("scraper builds");
    Harness {
        scraper,
        controller,
        items,
        cursor,
    }
}

/// A snapshot that already holds records for the first `k` catalog items.
pub fn stored(k: usize) -> MemoryItemStore {
    let records = (0..k)
        .map(|i| {
            let mut rec = skinbook_core::ItemRecord::new(name(i));
            rec.date_modified = 1;
            rec
        })
        .collect();
    MemoryItemStore::with_records(records)
}
