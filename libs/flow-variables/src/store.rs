//! Settings storage
//!
//! The host owns persistence (Homey's settings manager, a file, ...). The
//! dispatcher only needs to read the raw blob once and write it back after
//! every change.

use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::RwLock;

use crate::error::Result;

/// Key-value store holding JSON settings blobs
pub trait SettingsStore: Send + Sync {
    /// Get the blob stored under `key`
    fn load(&self, key: &str) -> impl Future<Output = Result<Option<Value>>> + Send;

    /// Replace the blob stored under `key`
    fn save(&self, key: &str, value: &Value) -> impl Future<Output = Result<()>> + Send;
}

/// In-memory settings store for testing and embedding
#[derive(Default)]
pub struct MemorySettingsStore {
    data: RwLock<HashMap<String, Value>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one blob
    pub fn with_value(key: impl Into<String>, value: Value) -> Self {
        let mut data = HashMap::new();
        data.insert(key.into(), value);
        Self {
            data: RwLock::new(data),
        }
    }

    /// Current blob under `key`
    pub async fn snapshot(&self, key: &str) -> Option<Value> {
        self.data.read().await.get(key).cloned()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self, key: &str) -> impl Future<Output = Result<Option<Value>>> + Send {
        let key = key.to_string();
        async move {
            let data = self.data.read().await;
            Ok(data.get(&key).cloned())
        }
    }

    fn save(&self, key: &str, value: &Value) -> impl Future<Output = Result<()>> + Send {
        let key = key.to_string();
        let value = value.clone();
        async move {
            let mut data = self.data.write().await;
            data.insert(key, value);
            Ok(())
        }
    }
}
