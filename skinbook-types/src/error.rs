use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Capability;

/// Unified error type for the skinbook workspace.
///
/// Remote faults, storage faults, malformed payloads and retry exhaustion all
/// surface through this enum so the ingestion loop can classify them in one place.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScrapeError {
    /// The requested capability is not implemented by the target connector.
    #[error("unsupported capability: {capability}")]
    Unsupported {
        /// A capability string describing what was requested (e.g. "order-book").
        capability: String,
    },

    /// Issues with the returned or expected data (missing fields, bad JSON, etc.).
    #[error("data issue: {0}")]
    Data(String),

    /// Invalid input argument or configuration value.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// An individual connector returned an error.
    #[error("{connector} failed: {msg}")]
    Connector {
        /// Connector name that failed.
        connector: String,
        /// Human-readable error message.
        msg: String,
    },

    /// A remote resource could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of missing resource, e.g. "order book for 176288467".
        what: String,
    },

    /// A single provider call exceeded the configured request timeout.
    #[error("provider timed out: {capability} via {connector}")]
    ProviderTimeout {
        /// Connector name that timed out.
        connector: String,
        /// Capability label (e.g. "order-book").
        capability: String,
    },

    /// Every attempt of a retried operation failed.
    #[error("max retries reached after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded {
        /// Number of attempts made.
        attempts: u32,
        /// Display form of the final attempt's error.
        last_error: String,
    },

    /// Reading or writing persisted state failed.
    #[error("storage error at {path}: {msg}")]
    Storage {
        /// File path involved.
        path: String,
        /// Human-readable error message.
        msg: String,
    },
}

impl ScrapeError {
    /// Helper: build an `Unsupported` error for a capability.
    #[must_use]
    pub fn unsupported(cap: Capability) -> Self {
        Self::Unsupported {
            capability: cap.to_string(),
        }
    }

    /// Helper: build a `Connector` error with the connector name and message.
    pub fn connector(connector: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Connector {
            connector: connector.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `ProviderTimeout` error.
    pub fn provider_timeout(connector: impl Into<String>, capability: Capability) -> Self {
        Self::ProviderTimeout {
            connector: connector.into(),
            capability: capability.to_string(),
        }
    }

    /// Helper: build a `Storage` error from a path and any displayable cause.
    pub fn storage(path: impl AsRef<std::path::Path>, msg: impl ToString) -> Self {
        Self::Storage {
            path: path.as_ref().display().to_string(),
            msg: msg.to_string(),
        }
    }

    /// Returns true if the failure may clear up on its own and the same work
    /// should be attempted again later.
    ///
    /// Configuration errors and missing capabilities are permanent; everything
    /// that originates from the network, the remote payload or the disk is not.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        !matches!(self, Self::InvalidArg(_) | Self::Unsupported { .. })
    }
}
