mod helpers;

use helpers::{harness, id, stored};
use skinbook::{RunOutcome, StallPolicy};
use skinbook_core::{MemoryCursorStore, MemoryItemStore, StopSignal};

#[tokio::test(start_paused = true)]
async fn processes_at_most_fourteen_items_per_invocation() {
    let h = harness(
        100,
        MemoryItemStore::default(),
        MemoryCursorStore::with_value(0),
        StallPolicy::default(),
    )
    .await;
    assert_eq!(h.scraper.budget(), Some(14));

    let out = h.scraper.run(StopSignal::never()).await.unwrap();

    assert_eq!(out.report.fetched, 14);
    assert_eq!(out.report.stopping_index, 14);
    assert_eq!(out.report.end_cursor, 14);
    assert_eq!(out.report.outcome, RunOutcome::BudgetExhausted);
    assert_eq!(out.items.len(), 14);

    let requested = h.controller.order_book_requests().await;
    let want: Vec<Option<u64>> = (0..14).map(|i| Some(id(i))).collect();
    assert_eq!(requested, want);
    assert_eq!(h.cursor.saves(), (1..=14).collect::<Vec<_>>());
    assert_eq!(h.cursor.value(), Some(14));
    assert_eq!(h.items.writes(), 14);
}

#[tokio::test(start_paused = true)]
async fn resumes_at_persisted_cursor_not_record_count() {
    let h = harness(
        100,
        stored(3),
        MemoryCursorStore::with_value(40),
        StallPolicy::default(),
    )
    .await;

    let out = h.scraper.run(StopSignal::never()).await.unwrap();

    let requested = h.controller.order_book_requests().await;
    assert_eq!(requested.first().copied(), Some(Some(id(40))));
    assert_eq!(requested.last().copied(), Some(Some(id(53))));
    assert_eq!(out.report.start_cursor, 40);
    assert_eq!(out.report.end_cursor, 54);
    assert_eq!(out.items.len(), 3 + 14);
}

#[tokio::test(start_paused = true)]
async fn missing_snapshot_starts_from_zero() {
    let h = harness(
        30,
        MemoryItemStore::default(),
        MemoryCursorStore::with_value(25),
        StallPolicy::default(),
    )
    .await;

    let out = h.scraper.run(StopSignal::never()).await.unwrap();
    assert_eq!(out.report.start_cursor, 0);
    assert_eq!(
        h.controller.order_book_requests().await.first().copied(),
        Some(Some(id(0)))
    );
}

#[tokio::test(start_paused = true)]
async fn wraps_cursor_to_zero_at_catalog_end() {
    let h = harness(
        20,
        stored(1),
        MemoryCursorStore::with_value(10),
        StallPolicy::default(),
    )
    .await;

    let out = h.scraper.run(StopSignal::never()).await.unwrap();

    assert_eq!(out.report.stopping_index, 20);
    assert_eq!(out.report.fetched, 10);
    assert_eq!(out.report.end_cursor, 0);
    assert_eq!(out.report.outcome, RunOutcome::SweepComplete);
    assert_eq!(h.cursor.value(), Some(0));
    let saves = h.cursor.saves();
    assert_eq!(saves.last().copied(), Some(0));
    assert!(!saves.contains(&20));
}

#[tokio::test(start_paused = true)]
async fn cursor_beyond_shrunken_catalog_resets() {
    let h = harness(
        5,
        stored(2),
        MemoryCursorStore::with_value(50),
        StallPolicy::default(),
    )
    .await;

    let out = h.scraper.run(StopSignal::never()).await.unwrap();

    assert_eq!(out.report.start_cursor, 0);
    assert_eq!(out.report.fetched, 5);
    assert_eq!(out.report.outcome, RunOutcome::SweepComplete);
    assert!(!out.report.warnings.is_empty());
    assert_eq!(h.cursor.saves().first().copied(), Some(0));
}

#[tokio::test(start_paused = true)]
async fn empty_catalog_completes_without_requests() {
    let h = harness(
        0,
        MemoryItemStore::default(),
        MemoryCursorStore::with_value(0),
        StallPolicy::default(),
    )
    .await;

    let out = h.scraper.run(StopSignal::never()).await.unwrap();
    assert_eq!(out.report.fetched, 0);
    assert_eq!(out.report.outcome, RunOutcome::SweepComplete);
    assert!(h.controller.order_book_requests().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn pacing_spaces_requests_by_the_inter_request_delay() {
    let h = harness(
        3,
        MemoryItemStore::default(),
        MemoryCursorStore::with_value(0),
        StallPolicy::default(),
    )
    .await;
    let started = tokio::time::Instant::now();
    let out = h.scraper.run(StopSignal::never()).await.unwrap();
    assert_eq!(out.report.fetched, 3);
    // Three items, each followed by the 7 s delay.
    let elapsed = started.elapsed();
    assert!(elapsed >= std::time::Duration::from_secs(21));
    assert!(elapsed < std::time::Duration::from_millis(21_050));
}
