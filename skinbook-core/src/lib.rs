//! skinbook-core
//!
//! Core traits and building blocks shared across the skinbook workspace.
//!
//! - `connector`: the `MarketConnector` trait and its capability role traits.
//! - `retry`: bounded retry with exponential backoff around one remote call.
//! - `pacing`: fixed inter-request delay, error pause and run budget.
//! - `cursor` / `store`: persisted resume cursor and item snapshot.
//! - `merge`: folding fetched order books into stored records.
//! - `money`: minor/major currency unit conversion.
//! - `stop`: cooperative stop signal checked by the ingestion loop.
//!
//! Async runtime (Tokio)
//! ---------------------
//! Sleeps, file access and the stop signal are Tokio primitives; everything
//! here must run under a Tokio 1.x runtime.
#![warn(missing_docs)]

/// Connector capability traits and the primary `MarketConnector` interface.
pub mod connector;
/// Persisted resume cursor.
pub mod cursor;
/// Record merging and the ordered working set.
pub mod merge;
pub mod money;
pub mod pacing;
pub mod retry;
/// Cooperative stop signal and interruptible sleeps.
pub mod stop;
pub mod store;
pub mod types;

pub use connector::MarketConnector;
pub use cursor::{CursorStore, JsonCursorStore, MemoryCursorStore};
pub use merge::{ItemBook, merge_record};
pub use pacing::Pacer;
pub use retry::{Backoff, retry};
pub use stop::{StopHandle, StopSignal, Wake, sleep_or_stop, stop_channel};
pub use store::{ItemStore, JsonItemStore, MemoryItemStore};
pub use types::*;
