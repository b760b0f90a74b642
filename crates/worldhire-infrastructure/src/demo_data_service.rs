//! Demo data service: the dataset loader plus a repository per collection.

use std::sync::Arc;

use worldhire_core::error::Result;
use worldhire_core::{CollectionName, KernelConfig, PersistentSlot, SeedSource};

use crate::collection_repository::CollectionRepository;
use crate::dataset_loader::DatasetLoader;

/// Entry point for local demo data.
///
/// Construct one per process and share it by `Arc`. Call
/// [`initialize`](Self::initialize) before using any repository and
/// [`dispose`](Self::dispose) on shutdown.
///
/// # Example
///
/// ```ignore
/// let data = DemoDataService::new(slots, seeds, &config);
/// data.initialize().await?;
/// let worker = data.users().get_by_email("worker@demo.com").await?;
/// ```
#[derive(Clone)]
pub struct DemoDataService {
    dataset: Arc<DatasetLoader>,
}

impl DemoDataService {
    pub fn new(
        slots: Arc<dyn PersistentSlot>,
        seeds: Arc<dyn SeedSource>,
        config: &KernelConfig,
    ) -> Self {
        Self {
            dataset: Arc::new(DatasetLoader::new(slots, seeds, config.store_key.clone())),
        }
    }

    pub fn from_loader(dataset: Arc<DatasetLoader>) -> Self {
        Self { dataset }
    }

    pub fn loader(&self) -> &Arc<DatasetLoader> {
        &self.dataset
    }

    pub async fn initialize(&self) -> Result<()> {
        self.dataset.initialize().await
    }

    pub async fn reset_demo(&self) -> Result<()> {
        self.dataset.reset_demo().await
    }

    pub async fn dispose(&self) {
        self.dataset.dispose().await
    }

    pub fn collection(&self, name: CollectionName) -> CollectionRepository {
        CollectionRepository::new(Arc::clone(&self.dataset), name)
    }

    pub fn users(&self) -> CollectionRepository {
        self.collection(CollectionName::Users)
    }

    pub fn worker_profiles(&self) -> CollectionRepository {
        self.collection(CollectionName::WorkerProfiles)
    }

    pub fn companies(&self) -> CollectionRepository {
        self.collection(CollectionName::Companies)
    }

    pub fn jobs(&self) -> CollectionRepository {
        self.collection(CollectionName::Jobs)
    }

    pub fn applications(&self) -> CollectionRepository {
        self.collection(CollectionName::Applications)
    }

    pub fn contracts(&self) -> CollectionRepository {
        self.collection(CollectionName::Contracts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed_source::StaticSeedSource;
    use crate::storage::MemorySlotStore;
    use serde_json::json;
    use worldhire_core::Record;

    #[tokio::test]
    async fn test_repositories_share_one_store() {
        let seeds = StaticSeedSource::empty().with_collection(
            CollectionName::Companies,
            json!([{"id": "c1", "userId": "employer-1", "name": "Gulf Build"}]),
        );
        let data = DemoDataService::new(
            Arc::new(MemorySlotStore::new()),
            Arc::new(seeds),
            &KernelConfig::default(),
        );
        data.initialize().await.unwrap();

        data.contracts()
            .create(Record::new("contract-1").with("companyId", "c1"))
            .await
            .unwrap();

        let company = data.companies().get_by_user_id("employer-1").await.unwrap().unwrap();
        let contracts = data
            .collection(CollectionName::Contracts)
            .get_by_company_id(company.id())
            .await
            .unwrap();
        assert_eq!(contracts.len(), 1);
    }
}
