//! Dataset loader: owns the in-memory demo store and its persisted copy.

use std::sync::Arc;

use futures::future::try_join_all;
use tokio::sync::{Mutex, RwLock};
use worldhire_core::error::{Result, WorldhireError};
use worldhire_core::{CollectionName, PersistentSlot, Record, SeedSource, Store};

/// Loads the demo store once per process and persists it after every
/// mutation.
///
/// Initialization prefers the persisted slot so demo edits survive restarts;
/// only when the slot is absent or malformed are the static seed documents
/// fetched. Concurrent `initialize` calls share a single load.
pub struct DatasetLoader {
    slots: Arc<dyn PersistentSlot>,
    seeds: Arc<dyn SeedSource>,
    store_key: String,
    /// `None` until initialized.
    state: RwLock<Option<Store>>,
    /// Serializes initialize/reset/dispose.
    init_lock: Mutex<()>,
}

impl DatasetLoader {
    pub fn new(
        slots: Arc<dyn PersistentSlot>,
        seeds: Arc<dyn SeedSource>,
        store_key: impl Into<String>,
    ) -> Self {
        Self {
            slots,
            seeds,
            store_key: store_key.into(),
            state: RwLock::new(None),
            init_lock: Mutex::new(()),
        }
    }

    pub fn store_key(&self) -> &str {
        &self.store_key
    }

    pub async fn is_initialized(&self) -> bool {
        self.state.read().await.is_some()
    }

    /// Makes the store available. Idempotent and safe to call concurrently.
    ///
    /// # Errors
    ///
    /// Fails only when the cold path runs and a seed collection cannot be
    /// fetched, or the seeded store cannot be persisted. There is no partial
    /// store in that case.
    pub async fn initialize(&self) -> Result<()> {
        if self.is_initialized().await {
            return Ok(());
        }

        let _guard = self.init_lock.lock().await;
        if self.is_initialized().await {
            return Ok(());
        }

        if let Some(document) = self.slots.load(&self.store_key).await {
            match Store::from_document(document) {
                Ok(store) => {
                    tracing::info!(
                        "Adopted persisted demo store '{}' ({} records)",
                        self.store_key,
                        store.record_count()
                    );
                    *self.state.write().await = Some(store);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(
                        "Persisted demo store '{}' has an unexpected shape, reseeding: {}",
                        self.store_key,
                        e
                    );
                }
            }
        }

        self.seed_from_source().await
    }

    /// Drops all demo changes and reloads the static seed documents.
    pub async fn reset_demo(&self) -> Result<()> {
        let _guard = self.init_lock.lock().await;
        tracing::info!("Resetting demo store '{}'", self.store_key);

        self.slots.clear(&self.store_key).await?;
        *self.state.write().await = None;

        self.seed_from_source().await
    }

    /// Forgets the in-memory store; the persisted copy is left untouched.
    pub async fn dispose(&self) {
        let _guard = self.init_lock.lock().await;
        *self.state.write().await = None;
    }

    /// A copy of the whole store.
    pub async fn snapshot(&self) -> Result<Store> {
        self.state
            .read()
            .await
            .clone()
            .ok_or_else(|| WorldhireError::not_initialized("*"))
    }

    /// Cold path. Caller must hold `init_lock`.
    async fn seed_from_source(&self) -> Result<()> {
        tracing::info!("Seeding demo store '{}' from static documents", self.store_key);

        let fetches = CollectionName::seeded().map(|name| {
            let seeds = Arc::clone(&self.seeds);
            async move { seeds.fetch(name).await.map(|records| (name, records)) }
        });
        let collections = try_join_all(fetches).await.map_err(|e| {
            tracing::error!("Demo store initialization failed: {}", e);
            e
        })?;

        let store = Store::from_collections(collections);
        self.slots
            .save(&self.store_key, &store.to_document())
            .await?;

        tracing::info!(
            "Seeded demo store '{}' ({} records)",
            self.store_key,
            store.record_count()
        );
        *self.state.write().await = Some(store);
        Ok(())
    }

    /// Runs `f` over a collection under the read lock.
    pub(crate) async fn read<R>(
        &self,
        name: CollectionName,
        f: impl FnOnce(&[Record]) -> R,
    ) -> Result<R> {
        let state = self.state.read().await;
        let store = state
            .as_ref()
            .ok_or_else(|| WorldhireError::not_initialized(name.to_string()))?;
        Ok(f(store.collection(name)))
    }

    /// Runs `f` over a collection under the write lock.
    ///
    /// `f` returns its result and whether it changed anything; changes are
    /// persisted before the lock is released.
    pub(crate) async fn mutate<R>(
        &self,
        name: CollectionName,
        f: impl FnOnce(&mut Vec<Record>) -> (R, bool),
    ) -> Result<R> {
        let mut state = self.state.write().await;
        let store = state
            .as_mut()
            .ok_or_else(|| WorldhireError::not_initialized(name.to_string()))?;

        let (result, changed) = f(store.collection_mut(name));
        if changed {
            let document = store.to_document();
            self.slots.save(&self.store_key, &document).await?;
        }
        Ok(result)
    }
}
