//! Persisted resume cursor.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::types::{CursorFile, ScrapeError};

/// Load and save the catalog offset between invocations.
#[async_trait]
pub trait CursorStore: Send + Sync {
    /// Read the persisted cursor.
    ///
    /// Never fails: a missing, malformed or negative value is reset to zero,
    /// the reset is persisted (best effort) and zero is returned.
    async fn load(&self) -> usize;

    /// Overwrite the persisted cursor.
    ///
    /// # Errors
    /// Returns [`ScrapeError::Storage`] when the value cannot be written.
    async fn save(&self, value: usize) -> Result<(), ScrapeError>;
}

/// Cursor persisted as `{"start_from": n}` in a JSON file.
///
/// By default `save` only updates a file that already exists; a missing file
/// is left missing. [`JsonCursorStore::create_if_missing`] lifts that.
#[derive(Debug, Clone)]
pub struct JsonCursorStore {
    path: PathBuf,
    create_if_missing: bool,
}

enum Read {
    Missing,
    Invalid(String),
    Valid(usize),
}

impl JsonCursorStore {
    /// Store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            create_if_missing: false,
        }
    }

    /// Also create the file (and its parent directory) on save when missing.
    #[must_use]
    pub const fn create_if_missing(mut self, yes: bool) -> Self {
        self.create_if_missing = yes;
        self
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Read {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Read::Missing,
            Err(e) => return Read::Invalid(e.to_string()),
        };
        match serde_json::from_slice::<CursorFile>(&bytes) {
            Ok(CursorFile { start_from }) => match usize::try_from(start_from) {
                Ok(v) => Read::Valid(v),
                Err(_) => Read::Invalid(format!("negative start_from {start_from}")),
            },
            Err(e) => Read::Invalid(e.to_string()),
        }
    }

    async fn reset(&self) {
        if let Err(e) = self.save(0).await {
            #[cfg(feature = "tracing")]
            tracing::error!(target: "skinbook::cursor", error = %e, "failed to reset cursor");
            #[cfg(not(feature = "tracing"))]
            let _ = e;
        }
    }
}

#[async_trait]
impl CursorStore for JsonCursorStore {
    async fn load(&self) -> usize {
        match self.read().await {
            Read::Valid(v) => v,
            Read::Missing => {
                #[cfg(feature = "tracing")]
                tracing::info!(
                    target: "skinbook::cursor",
                    path = %self.path.display(),
                    "no cursor file, starting from 0"
                );
                self.reset().await;
                0
            }
            Read::Invalid(reason) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    target: "skinbook::cursor",
                    path = %self.path.display(),
                    reason = %reason,
                    "invalid start_from, resetting to 0"
                );
                #[cfg(not(feature = "tracing"))]
                let _ = reason;
                self.reset().await;
                0
            }
        }
    }

    async fn save(&self, value: usize) -> Result<(), ScrapeError> {
        let exists = tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| ScrapeError::storage(&self.path, e))?;
        if !exists {
            if !self.create_if_missing {
                return Ok(());
            }
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| ScrapeError::storage(parent, e))?;
            }
        }
        let start_from =
            i64::try_from(value).map_err(|_| ScrapeError::InvalidArg(format!("cursor {value}")))?;
        let body = serde_json::to_vec_pretty(&CursorFile { start_from })
            .map_err(|e| ScrapeError::storage(&self.path, e))?;
        tokio::fs::write(&self.path, body)
            .await
            .map_err(|e| ScrapeError::storage(&self.path, e))
    }
}

/// In-process cursor, for tests and dry runs.
///
/// `None` models a missing store: saves are ignored until a value is seeded.
#[derive(Debug, Default)]
pub struct MemoryCursorStore {
    value: Mutex<Option<usize>>,
    saves: Mutex<Vec<usize>>,
}

impl MemoryCursorStore {
    /// A store that already holds `value`.
    #[must_use]
    pub fn with_value(value: usize) -> Self {
        Self {
            value: Mutex::new(Some(value)),
            saves: Mutex::new(Vec::new()),
        }
    }

    /// Current value, if the store exists.
    ///
    /// # Panics
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn value(&self) -> Option<usize> {
        *self.value.lock().expect("mutex poisoned")
    }

    /// Every value passed to `save`, in order.
    ///
    /// # Panics
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn saves(&self) -> Vec<usize> {
        self.saves.lock().expect("mutex poisoned").clone()
    }
}

#[async_trait]
impl CursorStore for MemoryCursorStore {
    async fn load(&self) -> usize {
        self.value().unwrap_or(0)
    }

    async fn save(&self, value: usize) -> Result<(), ScrapeError> {
        self.saves.lock().expect("mutex poisoned").push(value);
        let mut guard = self.value.lock().expect("mutex poisoned");
        if guard.is_some() {
            *guard = Some(value);
        }
        Ok(())
    }
}
