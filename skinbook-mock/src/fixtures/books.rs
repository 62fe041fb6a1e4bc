use skinbook_core::OrderBookSnapshot;

/// Deterministic order book for an item id.
///
/// Cheap items (id ending in 6) have no buy orders, so one side of the book is empty.
pub fn by_id(id: u64) -> OrderBookSnapshot {
    let sells = 50 + id % 950;
    let lowest = 3 + (id / 7) % 25_000;
    let no_buyers = id % 10 == 6;
    OrderBookSnapshot {
        sell_order_count: sells,
        buy_order_count: if no_buyers { 0 } else { sells / 3 + 1 },
        lowest_sell_order: Some(lowest),
        highest_buy_order: (!no_buyers).then(|| lowest.saturating_sub(lowest / 10 + 1)),
    }
}
