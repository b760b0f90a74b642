//! File-backed persistent slots: one JSON file per key.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use worldhire_core::error::{Result, WorldhireError};
use worldhire_core::PersistentSlot;

use super::atomic_json::AtomicJsonFile;

/// Persistent slots stored as `<dir>/<key>.json`.
///
/// File I/O runs on the blocking pool. Keys that are not plain file names
/// are rejected, so distinct keys never share a file.
#[derive(Debug, Clone)]
pub struct FileSlotStore {
    dir: PathBuf,
}

impl FileSlotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    ///
    /// Keys map to file names one to one, so only ASCII alphanumerics, `-`,
    /// `_` and `.` are accepted, and a key may not start with `.`.
    pub fn slot_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.');
        if !valid {
            return Err(WorldhireError::config(format!("Invalid slot key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }

    fn file(&self, key: &str) -> Result<AtomicJsonFile<Value>> {
        Ok(AtomicJsonFile::new(self.slot_path(key)?))
    }
}

#[async_trait]
impl PersistentSlot for FileSlotStore {
    async fn load(&self, key: &str) -> Option<Value> {
        let file = match self.file(key) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!("Cannot load slot: {}", e);
                return None;
            }
        };
        let path = file.path().to_path_buf();
        let loaded = tokio::task::spawn_blocking(move || file.load()).await;

        match loaded {
            Ok(Ok(value)) => {
                tracing::debug!("Loaded slot '{}' from {:?}: present={}", key, path, value.is_some());
                value
            }
            Ok(Err(e)) if e.is_corrupt() => {
                tracing::warn!("Discarding corrupt slot '{}' at {:?}: {}", key, path, e);
                None
            }
            Ok(Err(e)) => {
                tracing::warn!("Failed to read slot '{}' at {:?}: {}", key, path, e);
                None
            }
            Err(e) => {
                tracing::warn!("Slot load task for '{}' failed: {}", key, e);
                None
            }
        }
    }

    async fn save(&self, key: &str, value: &Value) -> Result<()> {
        let file = self.file(key)?;
        let value = value.clone();
        tokio::task::spawn_blocking(move || file.save(&value))
            .await
            .map_err(|e| WorldhireError::internal(format!("Failed to join task: {}", e)))??;
        tracing::debug!("Saved slot '{}'", key);
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<()> {
        let file = self.file(key)?;
        tokio::task::spawn_blocking(move || file.remove())
            .await
            .map_err(|e| WorldhireError::internal(format!("Failed to join task: {}", e)))??;
        tracing::debug!("Cleared slot '{}'", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_load_clear() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSlotStore::new(temp_dir.path());

        assert!(store.load("session").await.is_none());

        store.save("session", &json!({"token": "t"})).await.unwrap();
        assert_eq!(store.load("session").await, Some(json!({"token": "t"})));

        store.save("session", &json!({"token": "u"})).await.unwrap();
        assert_eq!(store.load("session").await, Some(json!({"token": "u"})));

        store.clear("session").await.unwrap();
        assert!(store.load("session").await.is_none());
        store.clear("session").await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_payload_reads_as_absent() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSlotStore::new(temp_dir.path());
        std::fs::write(store.slot_path("data").unwrap(), "{\"users\": [").unwrap();

        assert!(store.load("data").await.is_none());
    }

    #[tokio::test]
    async fn test_keys_are_isolated() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSlotStore::new(temp_dir.path());

        store.save("a", &json!(1)).await.unwrap();
        store.save("b", &json!(2)).await.unwrap();
        store.clear("a").await.unwrap();

        assert!(store.load("a").await.is_none());
        assert_eq!(store.load("b").await, Some(json!(2)));
    }

    #[test]
    fn test_slot_path_maps_plain_keys() {
        let store = FileSlotStore::new("/tmp/slots");
        assert_eq!(
            store.slot_path("worldhire_session").unwrap(),
            PathBuf::from("/tmp/slots/worldhire_session.json")
        );
        assert_eq!(
            store.slot_path("data.v2").unwrap(),
            PathBuf::from("/tmp/slots/data.v2.json")
        );
    }

    #[tokio::test]
    async fn test_keys_needing_escape_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSlotStore::new(temp_dir.path());

        for key in ["a/b", "../etc/passwd", ".hidden", "", "a b"] {
            assert!(
                matches!(store.slot_path(key), Err(WorldhireError::Config(_))),
                "{:?} accepted",
                key
            );
            assert!(store.save(key, &json!(1)).await.is_err());
            assert!(store.load(key).await.is_none());
            assert!(store.clear(key).await.is_err());
        }

        store.save("a_b", &json!(2)).await.unwrap();
        assert!(store.load("a/b").await.is_none());
        assert_eq!(store.load("a_b").await, Some(json!(2)));
    }
}
