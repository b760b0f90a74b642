//! Static seed document sources for the dataset loader.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use worldhire_core::error::{Result, WorldhireError};
use worldhire_core::store::parse_records;
use worldhire_core::{CollectionName, Record, SeedSource};

/// Reads `<dir>/<collection seed file>` for each collection.
#[derive(Debug, Clone)]
pub struct DirSeedSource {
    dir: PathBuf,
}

impl DirSeedSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl SeedSource for DirSeedSource {
    async fn fetch(&self, collection: CollectionName) -> Result<Vec<Record>> {
        let path = self.dir.join(collection.seed_file());
        tracing::debug!("Fetching seed collection '{}' from {:?}", collection, path);

        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            WorldhireError::seed(
                collection.to_string(),
                format!("failed to read {:?}: {}", path, e),
            )
        })?;
        let value: Value = serde_json::from_str(&content).map_err(|e| {
            WorldhireError::seed(
                collection.to_string(),
                format!("invalid JSON in {:?}: {}", path, e),
            )
        })?;

        parse_records(collection, value)
    }
}

/// Seed documents held in memory.
///
/// Counts fetches and can simulate latency or a failing collection, which
/// makes it the source of choice for demos without a seed directory and for
/// loader tests.
#[derive(Debug, Default)]
pub struct StaticSeedSource {
    documents: HashMap<CollectionName, Value>,
    failing: Option<CollectionName>,
    latency: Option<Duration>,
    fetches: AtomicUsize,
}

impl StaticSeedSource {
    /// Every seeded collection present and empty.
    pub fn empty() -> Self {
        let documents = CollectionName::seeded()
            .map(|name| (name, Value::Array(Vec::new())))
            .collect();
        Self {
            documents,
            ..Self::default()
        }
    }

    pub fn with_collection(mut self, name: CollectionName, document: Value) -> Self {
        self.documents.insert(name, document);
        self
    }

    /// Makes every fetch of `name` fail.
    pub fn failing_on(mut self, name: CollectionName) -> Self {
        self.failing = Some(name);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SeedSource for StaticSeedSource {
    async fn fetch(&self, collection: CollectionName) -> Result<Vec<Record>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing == Some(collection) {
            return Err(WorldhireError::seed(collection.to_string(), "simulated fetch failure"));
        }
        let document = self
            .documents
            .get(&collection)
            .cloned()
            .ok_or_else(|| WorldhireError::seed(collection.to_string(), "no seed document"))?;
        parse_records(collection, document)
    }
}
