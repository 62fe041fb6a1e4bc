//! Durable snapshot of the item records.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::types::{ItemRecord, ScrapeError};

/// Full-snapshot persistence for the working item set.
///
/// Every `save` replaces the previous snapshot entirely.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// True when a previous snapshot exists.
    ///
    /// # Errors
    /// Returns [`ScrapeError::Storage`] when existence cannot be determined.
    async fn exists(&self) -> Result<bool, ScrapeError>;

    /// Read the previous snapshot.
    ///
    /// # Errors
    /// Returns [`ScrapeError::Storage`] when the snapshot cannot be read and
    /// [`ScrapeError::Data`] when it is not a list of records.
    async fn load(&self) -> Result<Vec<ItemRecord>, ScrapeError>;

    /// Replace the snapshot with `records`, in order.
    ///
    /// # Errors
    /// Returns [`ScrapeError::Storage`] when the snapshot cannot be written.
    async fn save(&self, records: &[ItemRecord]) -> Result<(), ScrapeError>;
}

/// Snapshot stored as a pretty-printed JSON array.
///
/// Writes go to a sibling temporary file that is renamed over the target, so a
/// crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct JsonItemStore {
    path: PathBuf,
}

impl JsonItemStore {
    /// Store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl ItemStore for JsonItemStore {
    async fn exists(&self) -> Result<bool, ScrapeError> {
        tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| ScrapeError::storage(&self.path, e))
    }

    async fn load(&self) -> Result<Vec<ItemRecord>, ScrapeError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| ScrapeError::storage(&self.path, e))?;
        serde_json::from_slice(&bytes).map_err(|e| {
            ScrapeError::Data(format!("{} is not a record list: {e}", self.path.display()))
        })
    }

    async fn save(&self, records: &[ItemRecord]) -> Result<(), ScrapeError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ScrapeError::storage(parent, e))?;
        }
        let body =
            serde_json::to_vec_pretty(records).map_err(|e| ScrapeError::storage(&self.path, e))?;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| ScrapeError::storage(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| ScrapeError::storage(&self.path, e))
    }
}

/// In-process snapshot, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryItemStore {
    snapshot: Mutex<Option<Vec<ItemRecord>>>,
    writes: Mutex<usize>,
}

impl MemoryItemStore {
    /// A store that already holds `records`.
    #[must_use]
    pub fn with_records(records: Vec<ItemRecord>) -> Self {
        Self {
            snapshot: Mutex::new(Some(records)),
            writes: Mutex::new(0),
        }
    }

    /// Latest snapshot, if any.
    ///
    /// # Panics
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn snapshot(&self) -> Option<Vec<ItemRecord>> {
        self.snapshot.lock().expect("mutex poisoned").clone()
    }

    /// Number of completed saves.
    ///
    /// # Panics
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn writes(&self) -> usize {
        *self.writes.lock().expect("mutex poisoned")
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn exists(&self) -> Result<bool, ScrapeError> {
        Ok(self.snapshot.lock().expect("mutex poisoned").is_some())
    }

    async fn load(&self) -> Result<Vec<ItemRecord>, ScrapeError> {
        self.snapshot()
            .ok_or_else(|| ScrapeError::storage("<memory>", "no snapshot"))
    }

    async fn save(&self, records: &[ItemRecord]) -> Result<(), ScrapeError> {
        *self.snapshot.lock().expect("mutex poisoned") = Some(records.to_vec());
        *self.writes.lock().expect("mutex poisoned") += 1;
        Ok(())
    }
}
