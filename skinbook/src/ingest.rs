//! The ingestion loop.
//!
//! One invocation walks the catalog from the persisted cursor up to the
//! stopping index, one item at a time:
//!
//! ```text
//! Init -> Fetching -> Merging -> Persisting -> Advancing -> (pace) -> Fetching ...
//!            \-> PausedOnError -> Fetching (same cursor)
//! ```
//!
//! and ends as `BudgetExhausted`, `SweepComplete` or `Cancelled`.

use skinbook_core::connector::OrderBookProvider;
use skinbook_core::money::DEFAULT_USD_TO_EUR;
use skinbook_core::types::{
    CatalogEntry, Decimal, ItemRecord, ItemStatics, NameIdMap, OrderBookSnapshot, RunOutcome,
    RunReport,
};
use skinbook_core::{Capability, ItemBook, ScrapeError, StopSignal, Wake, retry};

use crate::Scraper;

/// Result of one invocation: the working set as persisted, plus a summary.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Every record held after the run, in persisted order.
    pub items: Vec<ItemRecord>,
    /// What the run did.
    pub report: RunReport,
}

#[derive(Debug)]
enum Phase {
    Fetching,
    Merging(OrderBookSnapshot),
    Persisting,
    Advancing,
    PausedOnError(ScrapeError),
    Done(RunOutcome),
}

/// Static inputs and resume state gathered before the first fetch.
struct Init {
    catalog: Vec<CatalogEntry>,
    ids: NameIdMap,
    book: ItemBook,
    cursor: usize,
    rate: Decimal,
    warnings: Vec<ScrapeError>,
}

struct Counters {
    fetched: usize,
    failed_attempts: usize,
    skipped: usize,
    consecutive_failures: u32,
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl Scraper {
    /// Run one invocation of the sweep.
    ///
    /// Loads the catalog, name ids and exchange rate, resumes from the persisted
    /// cursor and processes items until the per-invocation budget or the catalog
    /// end is reached, or `stop` fires. Every processed item is persisted (full
    /// snapshot, then cursor) before the next one starts.
    ///
    /// # Errors
    /// Startup faults are returned: the catalog or name-id source failing, or
    /// the previous snapshot being unreadable. A per-item failure that is not
    /// transient (see [`ScrapeError::is_transient`]) also ends the run; every
    /// other per-item failure is retried and reported in [`RunReport`]. Items
    /// completed before the abort stay persisted.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "skinbook::ingest::run",
            skip(self, stop),
            fields(connector = self.connector.name()),
        )
    )]
    pub async fn run(&self, mut stop: StopSignal) -> Result<RunOutput, ScrapeError> {
        let Init {
            catalog,
            ids,
            mut book,
            cursor: start_cursor,
            rate,
            mut warnings,
        } = self.init().await?;

        let provider = self
            .connector
            .as_order_book_provider()
            .ok_or_else(|| ScrapeError::unsupported(Capability::OrderBook))?;

        let catalog_len = catalog.len();
        let stopping_index = self.pacer.stopping_index(start_cursor, catalog_len);
        #[cfg(feature = "tracing")]
        tracing::info!(
            target: "skinbook::ingest",
            start_cursor,
            stopping_index,
            catalog_len,
            records = book.len(),
            "starting run"
        );

        let mut index = start_cursor;
        let mut persisted_cursor = start_cursor;
        let mut counters = Counters {
            fetched: 0,
            failed_attempts: 0,
            skipped: 0,
            consecutive_failures: 0,
        };

        let mut phase = if index < stopping_index {
            Phase::Fetching
        } else {
            Phase::Done(Self::finished(stopping_index, catalog_len))
        };

        let outcome = loop {
            phase = match phase {
                Phase::Fetching => {
                    if stop.is_stopped() {
                        Phase::Done(RunOutcome::Cancelled)
                    } else {
                        let entry = &catalog[index];
                        #[cfg(feature = "tracing")]
                        tracing::info!(
                            target: "skinbook::ingest",
                            index,
                            hash_name = %entry.hash_name,
                            "processing item"
                        );
                        let id = ids.get(&entry.hash_name);
                        tokio::select! {
                            res = self.fetch(provider, id) => match res {
                                Ok(snapshot) => Phase::Merging(snapshot),
                                Err(e) => Phase::PausedOnError(e),
                            },
                            () = stop.stopped() => Phase::Done(RunOutcome::Cancelled),
                        }
                    }
                }
                Phase::Merging(snapshot) => {
                    let entry = &catalog[index];
                    let statics = ItemStatics::resolve(entry, &ids);
                    book.merge(&entry.hash_name, &snapshot, &statics, now_ms());
                    Phase::Persisting
                }
                Phase::Persisting => match self.items.save(book.records()).await {
                    Ok(()) => {
                        counters.fetched += 1;
                        counters.consecutive_failures = 0;
                        Phase::Advancing
                    }
                    Err(e) => Phase::PausedOnError(e),
                },
                Phase::Advancing => {
                    index += 1;
                    persisted_cursor = self.advance(index, catalog_len, &mut warnings).await;
                    match self.pacer.pace(&mut stop).await {
                        Wake::Stopped => Phase::Done(RunOutcome::Cancelled),
                        Wake::Elapsed if index < stopping_index => Phase::Fetching,
                        Wake::Elapsed => Phase::Done(Self::finished(stopping_index, catalog_len)),
                    }
                }
                Phase::PausedOnError(err) if !err.is_transient() => {
                    #[cfg(feature = "tracing")]
                    tracing::error!(
                        target: "skinbook::ingest",
                        index,
                        hash_name = %catalog[index].hash_name,
                        error = %err,
                        "permanent failure, aborting run"
                    );
                    return Err(err);
                }
                Phase::PausedOnError(err) => {
                    counters.failed_attempts += 1;
                    counters.consecutive_failures += 1;
                    #[cfg(feature = "tracing")]
                    tracing::error!(
                        target: "skinbook::ingest",
                        index,
                        hash_name = %catalog[index].hash_name,
                        error = %err,
                        pause_ms = u64::try_from(self.cfg.pacing.error_pause.as_millis()).unwrap_or(u64::MAX),
                        "item failed, pausing before retry"
                    );
                    if let Wake::Stopped = self.pacer.pause_after_error(&mut stop).await {
                        Phase::Done(RunOutcome::Cancelled)
                    } else if self
                        .cfg
                        .stall
                        .max_item_failures
                        .is_some_and(|cap| counters.consecutive_failures >= cap)
                    {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(
                            target: "skinbook::ingest",
                            index,
                            hash_name = %catalog[index].hash_name,
                            failures = counters.consecutive_failures,
                            "skipping item after repeated failures"
                        );
                        warnings.push(ScrapeError::Data(format!(
                            "skipped {} after {} failures: {err}",
                            catalog[index].hash_name, counters.consecutive_failures
                        )));
                        counters.skipped += 1;
                        counters.consecutive_failures = 0;
                        index += 1;
                        persisted_cursor = self.advance(index, catalog_len, &mut warnings).await;
                        if index < stopping_index {
                            Phase::Fetching
                        } else {
                            Phase::Done(Self::finished(stopping_index, catalog_len))
                        }
                    } else {
                        Phase::Fetching
                    }
                }
                Phase::Done(outcome) => break outcome,
            };
        };

        #[cfg(feature = "tracing")]
        tracing::info!(
            target: "skinbook::ingest",
            ?outcome,
            fetched = counters.fetched,
            failed_attempts = counters.failed_attempts,
            skipped = counters.skipped,
            end_cursor = persisted_cursor,
            "run finished"
        );

        let items = book.into_records();
        Ok(RunOutput {
            report: RunReport {
                start_cursor,
                end_cursor: persisted_cursor,
                stopping_index,
                catalog_len,
                fetched: counters.fetched,
                failed_attempts: counters.failed_attempts,
                skipped: counters.skipped,
                records: items.len(),
                outcome,
                conversion_rate: rate,
                warnings,
            },
            items,
        })
    }

    const fn finished(stopping_index: usize, catalog_len: usize) -> RunOutcome {
        if stopping_index >= catalog_len {
            RunOutcome::SweepComplete
        } else {
            RunOutcome::BudgetExhausted
        }
    }

    /// One order-book request, retried with backoff; each attempt is time-boxed.
    async fn fetch(
        &self,
        provider: &dyn OrderBookProvider,
        item_nameid: Option<u64>,
    ) -> Result<OrderBookSnapshot, ScrapeError> {
        let name = self.connector.name();
        let timeout = self.cfg.pacing.request_timeout;
        let locale = &self.cfg.locale;
        let label = format!(
            "order book for item_nameid={}",
            item_nameid.map(|id| id.to_string()).unwrap_or_default()
        );
        retry(&self.cfg.backoff, &label, move || {
            Self::provider_call_with_timeout(
                name,
                Capability::OrderBook,
                timeout,
                provider.order_book(item_nameid, locale),
            )
        })
        .await
    }

    /// Persist the cursor after moving to `next`; wraps to zero at the catalog end.
    ///
    /// Returns the value that was (or should have been) persisted. Write failures
    /// become warnings; the in-memory position is unaffected.
    async fn advance(
        &self,
        next: usize,
        catalog_len: usize,
        warnings: &mut Vec<ScrapeError>,
    ) -> usize {
        let value = if next >= catalog_len {
            #[cfg(feature = "tracing")]
            tracing::info!(
                target: "skinbook::ingest",
                catalog_len,
                "sweep complete, cursor reset to 0"
            );
            0
        } else {
            next
        };
        if let Err(e) = self.cursor.save(value).await {
            #[cfg(feature = "tracing")]
            tracing::warn!(target: "skinbook::ingest", error = %e, cursor = value, "failed to save cursor");
            warnings.push(e);
        }
        value
    }

    async fn init(&self) -> Result<Init, ScrapeError> {
        let mut warnings = Vec::new();
        let timeout = self.cfg.pacing.request_timeout;
        let name = self.connector.name();

        let rate = self.conversion_rate(&mut warnings).await;

        let catalog_provider = self
            .connector
            .as_catalog_provider()
            .ok_or_else(|| ScrapeError::unsupported(Capability::Catalog))?;
        let catalog = Self::provider_call_with_timeout(
            name,
            Capability::Catalog,
            timeout,
            catalog_provider.catalog(),
        )
        .await?;

        let ids_provider = self
            .connector
            .as_name_id_provider()
            .ok_or_else(|| ScrapeError::unsupported(Capability::NameIds))?;
        let ids = Self::provider_call_with_timeout(
            name,
            Capability::NameIds,
            timeout,
            ids_provider.name_ids(),
        )
        .await?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            target: "skinbook::ingest",
            catalog_len = catalog.len(),
            name_ids = ids.len(),
            "static inputs loaded"
        );

        let (book, mut cursor) = if self.items.exists().await? {
            match self.items.load().await {
                Ok(records) => (ItemBook::from_records(records), self.cursor.load().await),
                Err(e @ ScrapeError::Data(_)) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        target: "skinbook::ingest",
                        error = %e,
                        "previous snapshot is malformed, starting empty"
                    );
                    warnings.push(e);
                    (ItemBook::new(), 0)
                }
                Err(e) => return Err(e),
            }
        } else {
            (ItemBook::new(), 0)
        };

        if cursor >= catalog.len() && cursor != 0 {
            let w = ScrapeError::InvalidArg(format!(
                "cursor {cursor} is beyond the catalog ({} items), reset to 0",
                catalog.len()
            ));
            #[cfg(feature = "tracing")]
            tracing::warn!(target: "skinbook::ingest", "{w}");
            warnings.push(w);
            cursor = 0;
            if let Err(e) = self.cursor.save(0).await {
                warnings.push(e);
            }
        }

        Ok(Init {
            catalog,
            ids,
            book,
            cursor,
            rate,
            warnings,
        })
    }

    /// Fetch the USD to EUR rate, falling back to the default on any failure.
    async fn conversion_rate(&self, warnings: &mut Vec<ScrapeError>) -> Decimal {
        let Some(fx) = self.connector.as_exchange_rate_provider() else {
            return DEFAULT_USD_TO_EUR;
        };
        let res = Self::provider_call_with_timeout(
            self.connector.name(),
            Capability::ExchangeRate,
            self.cfg.pacing.request_timeout,
            fx.usd_to_eur(),
        )
        .await;
        match res {
            Ok(rate) => {
                #[cfg(feature = "tracing")]
                tracing::info!(target: "skinbook::ingest", %rate, "conversion rate loaded");
                rate
            }
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    target: "skinbook::ingest",
                    error = %e,
                    default = %DEFAULT_USD_TO_EUR,
                    "exchange rate unavailable, using default"
                );
                warnings.push(e);
                DEFAULT_USD_TO_EUR
            }
        }
    }
}
