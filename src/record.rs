//! Best-score persistence
//!
//! The simulation only talks to [`RecordStore`]. Storage failures never reach
//! gameplay: they are logged and the store degrades to an in-memory value.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage key / document name shared by all backends
pub const RECORD_KEY: &str = "blockDestroyRecord";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt record: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("storage unavailable")]
    Unavailable,
}

/// Persistent best-score collaborator
pub trait RecordStore {
    /// Stored record, 0 if absent or unreadable
    fn load(&mut self) -> u64;

    /// Persist `score` if it beats the stored record.
    /// Returns true iff it was a new record.
    fn save(&mut self, score: u64) -> bool;
}

/// In-memory record (tests, and the degraded mode of the other stores)
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    pub record: u64,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: u64) -> Self {
        Self { record }
    }
}

impl RecordStore for MemoryRecordStore {
    fn load(&mut self) -> u64 {
        self.record
    }

    fn save(&mut self, score: u64) -> bool {
        if score > self.record {
            self.record = score;
            true
        } else {
            false
        }
    }
}

/// On-disk document
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct RecordDocument {
    record: u64,
}

/// JSON file backed store (native only)
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    path: std::path::PathBuf,
    fallback: MemoryRecordStore,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileRecordStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            path: path.into(),
            fallback: MemoryRecordStore::new(),
        }
    }

    fn try_load(&self) -> Result<u64, StoreError> {
        if !self.path.exists() {
            return Ok(0);
        }
        let json = std::fs::read_to_string(&self.path)?;
        let doc: RecordDocument = serde_json::from_str(&json)?;
        Ok(doc.record)
    }

    fn try_store(&self, record: u64) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(&RecordDocument { record })?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl RecordStore for FileRecordStore {
    fn load(&mut self) -> u64 {
        match self.try_load() {
            Ok(record) => {
                self.fallback.record = self.fallback.record.max(record);
            }
            Err(e) => {
                log::warn!("Record file {} unreadable: {}", self.path.display(), e);
            }
        }
        self.fallback.record
    }

    fn save(&mut self, score: u64) -> bool {
        let stored = self.load();
        if score <= stored {
            return false;
        }
        self.fallback.record = score;
        match self.try_store(score) {
            Ok(()) => log::info!("New record {} saved", score),
            Err(e) => log::warn!("Record {} kept in memory only: {}", score, e),
        }
        true
    }
}

/// Browser LocalStorage backed store (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalStorageRecordStore {
    fallback: MemoryRecordStore,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StoreError::Unavailable)
    }

    fn try_load() -> Result<u64, StoreError> {
        let storage = Self::storage()?;
        match storage.get_item(RECORD_KEY) {
            Ok(Some(value)) => Ok(serde_json::from_str::<u64>(value.trim())?),
            Ok(None) => Ok(0),
            Err(_) => Err(StoreError::Unavailable),
        }
    }

    fn try_store(record: u64) -> Result<(), StoreError> {
        Self::storage()?
            .set_item(RECORD_KEY, &record.to_string())
            .map_err(|_| StoreError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl RecordStore for LocalStorageRecordStore {
    fn load(&mut self) -> u64 {
        match Self::try_load() {
            Ok(record) => self.fallback.record = self.fallback.record.max(record),
            Err(e) => log::warn!("LocalStorage record unreadable: {}", e),
        }
        self.fallback.record
    }

    fn save(&mut self, score: u64) -> bool {
        if score <= self.load() {
            return false;
        }
        self.fallback.record = score;
        if let Err(e) = Self::try_store(score) {
            log::warn!("Record {} kept in memory only: {}", score, e);
        }
        true
    }
}
