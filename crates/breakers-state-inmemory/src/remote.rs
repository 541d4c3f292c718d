//! In-memory implementation of the RemoteStore interface
//!
//! A single instance can be shared by several strategies to emulate breakers
//! in different processes talking to the same backend. Availability can be
//! toggled to emulate an unreachable backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use breakers_core::{CoreError, RemoteStore};

/// In-memory key-value store implementing RemoteStore
#[derive(Debug, Clone)]
pub struct InMemoryRemoteStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
    available: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryRemoteStore {
    /// Create an empty, available store
    pub fn new() -> Self {
        info!("Creating new InMemoryRemoteStore");
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            available: Arc::new(AtomicBool::new(true)),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make every subsequent call succeed or fail with a transport error
    pub fn set_available(&self, available: bool) {
        debug!("InMemoryRemoteStore available={}", available);
        self.available.store(available, Ordering::SeqCst);
    }

    /// Whether calls currently succeed
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Read a single key, bypassing availability
    pub async fn get(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }

    /// Write a single key, bypassing availability and the write counter
    pub async fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.write().await.insert(key.into(), value.into());
    }

    /// Remove a single key
    pub async fn delete(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no keys
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Number of successful `set_many` calls
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn ensure_available(&self) -> Result<(), CoreError> {
        if self.is_available() {
            Ok(())
        } else {
            Err(CoreError::TransportError("in-memory remote store is unavailable".to_string()))
        }
    }
}

impl Default for InMemoryRemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemoteStore {
    async fn connect(&self) -> Result<(), CoreError> {
        self.ensure_available()
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, CoreError> {
        self.ensure_available()?;
        let entries = self.entries.read().await;
        Ok(keys.iter().map(|key| entries.get(key).cloned()).collect())
    }

    async fn set_many(&self, pairs: &[(String, String)]) -> Result<(), CoreError> {
        self.ensure_available()?;
        let mut entries = self.entries.write().await;
        for (key, value) in pairs {
            entries.insert(key.clone(), value.clone());
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        debug!("Set {} remote keys", pairs.len());
        Ok(())
    }
}
