use proptest::prelude::*;
use skinbook_core::money::cents_to_major;
use skinbook_core::{
    ItemBook, ItemRecord, ItemStatics, ItemStore, MemoryItemStore, OrderBookSnapshot, merge_record,
};

fn arb_snapshot() -> impl Strategy<Value = OrderBookSnapshot> {
    (
        0u64..1_000_000,
        0u64..1_000_000,
        proptest::option::of(0u64..10_000_000),
        proptest::option::of(0u64..10_000_000),
    )
        .prop_map(|(sells, buys, low, high)| OrderBookSnapshot {
            sell_order_count: sells,
            buy_order_count: buys,
            lowest_sell_order: low,
            highest_buy_order: high,
        })
}

fn arb_statics() -> impl Strategy<Value = ItemStatics> {
    (
        proptest::option::of("[a-z]{1,8}\\.png"),
        proptest::option::of(1u64..1_000_000_000),
    )
        .prop_map(|(image, item_nameid)| ItemStatics { image, item_nameid })
}

proptest! {
    #[test]
    fn cents_parse_back_to_the_same_amount(cents in 0u64..10_000_000_000) {
        let s = cents_to_major(cents);
        let (whole, frac) = s.split_once('.').unwrap();
        prop_assert_eq!(frac.len(), 2);
        let back = whole.parse::<u64>().unwrap() * 100 + frac.parse::<u64>().unwrap();
        prop_assert_eq!(back, cents);
    }

    #[test]
    fn merging_twice_is_idempotent(snap in arb_snapshot(), statics in arb_statics(), now in 0i64..i64::MAX) {
        let once = merge_record(None, "Zeus x27", &snap, &statics, now);
        let twice = merge_record(Some(once.clone()), "Zeus x27", &snap, &statics, now);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn order_book_fields_always_reflect_latest_fetch(
        first in arb_snapshot(),
        second in arb_snapshot(),
        statics in arb_statics(),
    ) {
        let mut book = ItemBook::new();
        book.merge("Zeus x27", &first, &statics, 1);
        let rec = book.merge("Zeus x27", &second, &ItemStatics::default(), 2).clone();
        prop_assert_eq!(rec.sell_order_count, second.sell_order_count);
        prop_assert_eq!(rec.buy_order_count, second.buy_order_count);
        prop_assert_eq!(rec.lowest_sell_order, second.lowest_sell_order.map(cents_to_major));
        prop_assert_eq!(rec.highest_buy_order, second.highest_buy_order.map(cents_to_major));
        prop_assert_eq!(rec.item_nameid, statics.item_nameid);
        prop_assert_eq!(rec.image, statics.image);
        prop_assert_eq!(book.len(), 1);
    }

    #[test]
    fn book_never_holds_duplicate_names(names in proptest::collection::vec("[A-D]", 0..40)) {
        let records: Vec<ItemRecord> = names.iter().map(|n| ItemRecord::new(n.as_str())).collect();
        let book = ItemBook::from_records(records);
        let mut seen: Vec<&str> = book.records().iter().map(|r| r.hash_name.as_str()).collect();
        let before = seen.len();
        seen.sort_unstable();
        seen.dedup();
        prop_assert_eq!(seen.len(), before);
    }

    #[test]
    fn persisted_book_reloads_unchanged(
        fetches in proptest::collection::vec(("[A-F]", arb_snapshot()), 0..30),
    ) {
        let mut book = ItemBook::new();
        for (i, (name, snap)) in fetches.iter().enumerate() {
            book.merge(name, snap, &ItemStatics::default(), i as i64);
        }
        let store = MemoryItemStore::default();
        let reloaded = tokio_test::block_on(async {
            store.save(book.records()).await.unwrap();
            store.load().await.unwrap()
        });
        let rebuilt = ItemBook::from_records(reloaded);
        prop_assert_eq!(rebuilt.records(), book.records());
    }
}
