mod helpers;

use std::time::Duration;

use helpers::{book, harness, id, name};
use skinbook::{RunOutcome, StallPolicy};
use skinbook_core::{
    Decimal, MemoryCursorStore, MemoryItemStore, OrderBookSnapshot, ScrapeError, StopSignal,
    stop_channel,
};
use skinbook_mock::MockBehavior;

fn fail() -> MockBehavior<OrderBookSnapshot> {
    MockBehavior::Fail(ScrapeError::connector("mock", "HTTP 500"))
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_pause_and_retry_the_same_item() {
    let h = harness(
        2,
        MemoryItemStore::default(),
        MemoryCursorStore::with_value(0),
        StallPolicy::default(),
    )
    .await;
    h.controller
        .script_order_book(Some(id(0)), std::iter::repeat_n(fail(), 5))
        .await;

    let started = tokio::time::Instant::now();
    let out = h.scraper.run(StopSignal::never()).await.unwrap();

    let requested = h.controller.order_book_requests().await;
    assert_eq!(requested.iter().filter(|r| **r == Some(id(0))).count(), 6);
    assert_eq!(requested.last().copied(), Some(Some(id(1))));
    assert_eq!(out.report.failed_attempts, 1);
    assert_eq!(out.report.fetched, 2);
    assert_eq!(out.report.skipped, 0);
    // Cursor never moved while item 0 was failing.
    assert_eq!(h.cursor.saves(), vec![1, 0]);
    // Backoff 30+60+120+240 s, error pause 30 s, then two 7 s paces.
    assert!(started.elapsed() >= Duration::from_secs(450 + 30 + 14));
}

#[tokio::test(start_paused = true)]
async fn stall_policy_skips_a_permanently_failing_item() {
    let h = harness(
        3,
        MemoryItemStore::default(),
        MemoryCursorStore::with_value(0),
        StallPolicy {
            max_item_failures: Some(2),
        },
    )
    .await;
    h.controller
        .set_order_book_behavior(Some(id(1)), fail())
        .await;

    let out = h.scraper.run(StopSignal::never()).await.unwrap();

    assert_eq!(out.report.skipped, 1);
    assert_eq!(out.report.failed_attempts, 2);
    assert_eq!(out.report.fetched, 2);
    assert_eq!(out.report.outcome, RunOutcome::SweepComplete);
    assert!(out.items.iter().all(|r| r.hash_name != name(1)));
    assert!(
        out.report
            .warnings
            .iter()
            .any(|w| w.to_string().contains(&name(1)))
    );
    assert_eq!(h.cursor.saves(), vec![1, 2, 0]);
}

#[tokio::test(start_paused = true)]
async fn hanging_request_times_out_per_attempt() {
    let h = harness(
        1,
        MemoryItemStore::default(),
        MemoryCursorStore::with_value(0),
        StallPolicy {
            max_item_failures: Some(1),
        },
    )
    .await;
    h.controller
        .set_order_book_behavior(Some(id(0)), MockBehavior::Hang)
        .await;

    let out = h.scraper.run(StopSignal::never()).await.unwrap();
    assert_eq!(out.report.skipped, 1);
    let w = out.report.warnings.last().unwrap().to_string();
    assert!(w.contains("timed out"), "{w}");
}

#[tokio::test(start_paused = true)]
async fn stop_signal_cancels_during_pacing() {
    let h = harness(
        100,
        MemoryItemStore::default(),
        MemoryCursorStore::with_value(0),
        StallPolicy::default(),
    )
    .await;
    let (handle, stop) = stop_channel();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(10)).await;
        handle.stop();
    });

    let out = h.scraper.run(stop).await.unwrap();

    assert_eq!(out.report.outcome, RunOutcome::Cancelled);
    assert_eq!(out.report.fetched, 2);
    assert_eq!(out.report.end_cursor, 2);
    assert_eq!(h.cursor.value(), Some(2));
    assert_eq!(h.items.snapshot().map(|s| s.len()), Some(2));
}

#[tokio::test(start_paused = true)]
async fn stop_signal_cancels_an_in_flight_retry() {
    let h = harness(
        5,
        MemoryItemStore::default(),
        MemoryCursorStore::with_value(0),
        StallPolicy::default(),
    )
    .await;
    h.controller
        .set_order_book_behavior(Some(id(0)), fail())
        .await;
    let (handle, stop) = stop_channel();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(45)).await;
        handle.stop();
    });

    let out = h.scraper.run(stop).await.unwrap();
    assert_eq!(out.report.outcome, RunOutcome::Cancelled);
    assert_eq!(out.report.fetched, 0);
    assert!(h.cursor.saves().is_empty());
}

#[tokio::test(start_paused = true)]
async fn exchange_rate_failure_falls_back_to_default() {
    let h = harness(
        1,
        MemoryItemStore::default(),
        MemoryCursorStore::with_value(0),
        StallPolicy::default(),
    )
    .await;
    h.controller
        .set_fx_behavior(MockBehavior::Fail(ScrapeError::connector("mock", "down")))
        .await;

    let out = h.scraper.run(StopSignal::never()).await.unwrap();
    assert_eq!(out.report.conversion_rate, Decimal::new(9, 1));
    assert_eq!(out.report.fetched, 1);
    assert_eq!(out.report.warnings.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn exchange_rate_is_threaded_into_the_report() {
    let h = harness(
        1,
        MemoryItemStore::default(),
        MemoryCursorStore::with_value(0),
        StallPolicy::default(),
    )
    .await;
    let out = h.scraper.run(StopSignal::never()).await.unwrap();
    assert_eq!(out.report.conversion_rate, Decimal::new(92, 2));
    assert!(out.report.warnings.is_empty());
}

#[tokio::test(start_paused = true)]
async fn unreachable_catalog_is_a_startup_failure() {
    let h = harness(
        3,
        MemoryItemStore::default(),
        MemoryCursorStore::with_value(0),
        StallPolicy::default(),
    )
    .await;
    h.controller
        .set_catalog(MockBehavior::Fail(ScrapeError::connector("mock", "HTTP 503")))
        .await;

    let err = h.scraper.run(StopSignal::never()).await.unwrap_err();
    assert!(matches!(err, ScrapeError::Connector { .. }));
    assert!(h.controller.order_book_requests().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn unknown_id_is_requested_blank_and_handled_as_failure() {
    let h = harness(
        2,
        MemoryItemStore::default(),
        MemoryCursorStore::with_value(0),
        StallPolicy {
            max_item_failures: Some(1),
        },
    )
    .await;
    // Only item 1 has an id.
    h.controller
        .set_name_ids(MockBehavior::Return(
            [(name(1), id(1))].into_iter().collect(),
        ))
        .await;
    h.controller.set_order_book_behavior(None, fail()).await;
    h.controller
        .set_order_book_behavior(Some(id(1)), MockBehavior::Return(book(4)))
        .await;

    let out = h.scraper.run(StopSignal::never()).await.unwrap();
    let requested = h.controller.order_book_requests().await;
    assert_eq!(requested.iter().filter(|r| r.is_none()).count(), 5);
    assert_eq!(out.report.skipped, 1);
    assert_eq!(out.report.fetched, 1);
}

#[tokio::test(start_paused = true)]
async fn permanent_item_failure_ends_the_run() {
    let h = harness(
        3,
        MemoryItemStore::default(),
        MemoryCursorStore::with_value(0),
        StallPolicy::default(),
    )
    .await;
    h.controller
        .set_order_book_behavior(
            Some(id(1)),
            MockBehavior::Fail(ScrapeError::InvalidArg("cannot-be-a-base URL".into())),
        )
        .await;

    let err = h.scraper.run(StopSignal::never()).await.unwrap_err();

    assert!(matches!(err, ScrapeError::InvalidArg(_)));
    let requested = h.controller.order_book_requests().await;
    assert_eq!(requested, vec![Some(id(0)), Some(id(1))]);
    // The item completed before the abort stays persisted.
    assert_eq!(h.cursor.saves(), vec![1]);
    assert_eq!(h.items.snapshot().map(|s| s.len()), Some(1));
}
