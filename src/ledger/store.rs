//! Durable ledger storage

use super::LedgerStats;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Ledger persistence errors
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Ledger I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Ledger record is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("Ledger store unavailable: {0}")]
    Unavailable(String),
}

/// Storage backend for the performance ledger
pub trait LedgerStore: Send + Sync {
    /// Read the stored record, `None` if nothing has been stored yet
    fn load(&self) -> Result<Option<LedgerStats>, LedgerError>;
    /// Replace the stored record
    fn save(&self, stats: &LedgerStats) -> Result<(), LedgerError>;
}

/// Single JSON file, rewritten through a temp file and rename
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store at `path`; parent directories are created on first save
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, source: std::io::Error) -> LedgerError {
        LedgerError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl LedgerStore for JsonFileStore {
    fn load(&self) -> Result<Option<LedgerStats>, LedgerError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, stats: &LedgerStats) -> Result<(), LedgerError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
        }

        let body = serde_json::to_string_pretty(stats)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, body).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }
}

/// In-memory store; clones share the same record
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    record: Arc<Mutex<Option<LedgerStats>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a record
    pub fn with_stats(stats: LedgerStats) -> Self {
        Self {
            record: Arc::new(Mutex::new(Some(stats))),
        }
    }

    /// Last saved record
    pub fn stored(&self) -> Option<LedgerStats> {
        self.record.lock().ok().and_then(|r| r.clone())
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> Result<Option<LedgerStats>, LedgerError> {
        self.record
            .lock()
            .map(|r| r.clone())
            .map_err(|e| LedgerError::Unavailable(e.to_string()))
    }

    fn save(&self, stats: &LedgerStats) -> Result<(), LedgerError> {
        let mut record = self
            .record
            .lock()
            .map_err(|e| LedgerError::Unavailable(e.to_string()))?;
        *record = Some(stats.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> LedgerStats {
        LedgerStats {
            total_trades: 3,
            wins: 2,
            losses: 1,
            net_profit: dec!(12.5),
        }
    }

    #[test]
    fn test_file_store_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("stats.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data").join("stats.json"));

        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample()));
        assert!(!dir.path().join("data").join("stats.json.tmp").exists());
    }

    #[test]
    fn test_file_store_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        JsonFileStore::new(&path).save(&sample()).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["totalTrades"], 3);
        assert_eq!(json["wins"], 2);
        assert_eq!(json["losses"], 1);
        assert_eq!(json["netProfit"], 12.5);
    }

    #[test]
    fn test_file_store_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        std::fs::write(&path, "{ not json").unwrap();
        let result = JsonFileStore::new(&path).load();
        assert!(matches!(result, Err(LedgerError::Corrupt(_))));
    }

    #[test]
    fn test_memory_store_shared() {
        let store = MemoryStore::new();
        let handle = store.clone();
        handle.save(&sample()).unwrap();
        assert_eq!(store.stored(), Some(sample()));
        assert_eq!(MemoryStore::with_stats(sample()).load().unwrap(), Some(sample()));
    }
}
