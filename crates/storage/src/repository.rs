use async_trait::async_trait;
use quiz_core::model::ProblemStats;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Local key-value capability over string keys and JSON values.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read or the value is not valid JSON.
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    async fn set(&self, key: &str, value: &Value) -> Result<(), StorageError>;
}

/// Simple in-memory store for testing and throwaway runs.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<HashMap<String, Value>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.clone());
        Ok(())
    }
}

/// Reads and writes [`ProblemStats`] as the single record under [`PROBLEM_STATS_KEY`].
#[derive(Clone)]
pub struct ProblemStatsStore {
    kv: Arc<dyn KeyValueStore>,
}

/// Well-known key holding every bank's streaks.
pub const PROBLEM_STATS_KEY: &str = "problemStats";

impl ProblemStatsStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Load persisted stats; a missing record is an empty mapping.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be read or decoded.
    pub async fn load(&self) -> Result<ProblemStats, StorageError> {
        match self.kv.get(PROBLEM_STATS_KEY).await? {
            Some(value) => serde_json::from_value(value)
                .map_err(|err| StorageError::Serialization(err.to_string())),
            None => Ok(ProblemStats::new()),
        }
    }

    /// Replace the persisted stats.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be encoded or written.
    pub async fn save(&self, stats: &ProblemStats) -> Result<(), StorageError> {
        let value = serde_json::to_value(stats)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.kv.set(PROBLEM_STATS_KEY, &value).await
    }
}

/// Storage capabilities behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub kv: Arc<dyn KeyValueStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            kv: Arc::new(InMemoryStore::new()),
        }
    }

    #[must_use]
    pub fn problem_stats(&self) -> ProblemStatsStore {
        ProblemStatsStore::new(Arc::clone(&self.kv))
    }
}
