//! In-process persistent slots.
//!
//! Payloads are kept as serialized text so a corrupt payload behaves exactly
//! as it would on disk.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use worldhire_core::error::Result;
use worldhire_core::PersistentSlot;

#[derive(Debug, Default)]
pub struct MemorySlotStore {
    slots: Mutex<HashMap<String, String>>,
    saves: AtomicUsize,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores raw text under `key`, bypassing serialization.
    pub async fn insert_raw(&self, key: &str, text: impl Into<String>) {
        self.slots.lock().await.insert(key.to_string(), text.into());
    }

    pub async fn raw(&self, key: &str) -> Option<String> {
        self.slots.lock().await.get(key).cloned()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.slots.lock().await.contains_key(key)
    }

    /// Number of successful `save` calls so far, across all keys.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PersistentSlot for MemorySlotStore {
    async fn load(&self, key: &str) -> Option<Value> {
        let slots = self.slots.lock().await;
        let text = slots.get(key)?;
        match serde_json::from_str(text) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Discarding corrupt in-memory slot '{}': {}", key, e);
                None
            }
        }
    }

    async fn save(&self, key: &str, value: &Value) -> Result<()> {
        let text = serde_json::to_string(value)?;
        self.slots.lock().await.insert(key.to_string(), text);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<()> {
        self.slots.lock().await.remove(key);
        Ok(())
    }
}
