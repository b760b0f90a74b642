//! Generic CRUD over one named collection of the demo store.

use std::sync::Arc;

use serde_json::Value;
use worldhire_core::error::{Result, WorldhireError};
use worldhire_core::{CollectionName, Record};

use crate::dataset_loader::DatasetLoader;

/// CRUD surface over a single collection.
///
/// Lookups are linear scans; every successful mutation persists the whole
/// store before returning. All methods fail with `NotInitialized` until the
/// loader has been initialized.
#[derive(Clone)]
pub struct CollectionRepository {
    dataset: Arc<DatasetLoader>,
    name: CollectionName,
}

impl CollectionRepository {
    pub fn new(dataset: Arc<DatasetLoader>, name: CollectionName) -> Self {
        Self { dataset, name }
    }

    pub fn name(&self) -> CollectionName {
        self.name
    }

    /// All records, in insertion order.
    pub async fn list(&self) -> Result<Vec<Record>> {
        self.dataset.read(self.name, |records| records.to_vec()).await
    }

    pub async fn count(&self) -> Result<usize> {
        self.dataset.read(self.name, |records| records.len()).await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Record>> {
        self.dataset
            .read(self.name, |records| {
                records.iter().find(|record| record.id() == id).cloned()
            })
            .await
    }

    /// Records whose `field` equals `value`.
    pub async fn find_by(&self, field: &str, value: impl Into<Value>) -> Result<Vec<Record>> {
        let value = value.into();
        self.find_where(|record| record.matches(field, &value)).await
    }

    /// First record whose `field` equals `value`.
    pub async fn find_one_by(&self, field: &str, value: impl Into<Value>) -> Result<Option<Record>> {
        let value = value.into();
        self.dataset
            .read(self.name, |records| {
                records
                    .iter()
                    .find(|record| record.matches(field, &value))
                    .cloned()
            })
            .await
    }

    pub async fn find_where(&self, predicate: impl Fn(&Record) -> bool) -> Result<Vec<Record>> {
        self.dataset
            .read(self.name, |records| {
                records
                    .iter()
                    .filter(|&record| predicate(record))
                    .cloned()
                    .collect()
            })
            .await
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<Record>> {
        self.find_one_by("email", email).await
    }

    pub async fn get_by_user_id(&self, user_id: &str) -> Result<Option<Record>> {
        self.find_one_by("userId", user_id).await
    }

    pub async fn get_by_company_id(&self, company_id: &str) -> Result<Vec<Record>> {
        self.find_by("companyId", company_id).await
    }

    pub async fn get_by_status(&self, status: &str) -> Result<Vec<Record>> {
        self.find_by("status", status).await
    }

    pub async fn get_by_worker_id(&self, worker_id: &str) -> Result<Vec<Record>> {
        self.find_by("workerId", worker_id).await
    }

    pub async fn get_by_job_id(&self, job_id: &str) -> Result<Vec<Record>> {
        self.find_by("jobId", job_id).await
    }

    pub async fn get_by_worker_and_job(&self, worker_id: &str, job_id: &str) -> Result<Option<Record>> {
        let worker = Value::from(worker_id);
        let job = Value::from(job_id);
        self.dataset
            .read(self.name, |records| {
                records
                    .iter()
                    .find(|record| record.matches("workerId", &worker) && record.matches("jobId", &job))
                    .cloned()
            })
            .await
    }

    /// Appends `record` and persists. Id uniqueness is the caller's job.
    pub async fn create(&self, record: Record) -> Result<Record> {
        let name = self.name;
        self.dataset
            .mutate(name, |records| {
                if records.iter().any(|existing| existing.id() == record.id()) {
                    tracing::warn!("Creating duplicate id '{}' in '{}'", record.id(), name);
                }
                records.push(record.clone());
                (record, true)
            })
            .await
    }

    /// Shallow-merges `patch` (a JSON object) into the record with `id`.
    ///
    /// Returns `None` without persisting when no such record exists.
    pub async fn update(&self, id: &str, patch: Value) -> Result<Option<Record>> {
        let Value::Object(patch) = patch else {
            return Err(WorldhireError::InvalidRecord(
                "update patch must be a JSON object".to_string(),
            ));
        };

        self.dataset
            .mutate(self.name, |records| {
                match records.iter_mut().find(|record| record.id() == id) {
                    Some(record) => {
                        record.merge(&patch);
                        (Some(record.clone()), true)
                    }
                    None => (None, false),
                }
            })
            .await
    }

    /// Removes the record with `id`. `false` (and no persist) when absent.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        self.dataset
            .mutate(self.name, |records| {
                match records.iter().position(|record| record.id() == id) {
                    Some(index) => {
                        records.remove(index);
                        (true, true)
                    }
                    None => (false, false),
                }
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed_source::StaticSeedSource;
    use crate::storage::MemorySlotStore;
    use serde_json::json;
    use worldhire_core::{PersistentSlot, Store};

    const KEY: &str = "store";

    async fn setup() -> (Arc<MemorySlotStore>, Arc<DatasetLoader>) {
        let slots = Arc::new(MemorySlotStore::new());
        let seeds = StaticSeedSource::empty()
            .with_collection(
                CollectionName::Jobs,
                json!([
                    {"id": "job-1", "title": "Welder", "companyId": "c1", "status": "active"},
                    {"id": "job-2", "title": "Nurse", "companyId": "c2", "status": "closed"},
                    {"id": "job-3", "title": "Chef", "companyId": "c1", "status": "active"}
                ]),
            )
            .with_collection(
                CollectionName::Applications,
                json!([
                    {"id": "app-1", "workerId": "w1", "jobId": "job-1", "status": "pending"},
                    {"id": "app-2", "workerId": "w1", "jobId": "job-3", "status": "offered"}
                ]),
            );
        let loader = Arc::new(DatasetLoader::new(slots.clone(), Arc::new(seeds), KEY));
        loader.initialize().await.unwrap();
        (slots, loader)
    }

    #[tokio::test]
    async fn test_calls_before_initialize_fail_fast() {
        let loader = Arc::new(DatasetLoader::new(
            Arc::new(MemorySlotStore::new()),
            Arc::new(StaticSeedSource::empty()),
            KEY,
        ));
        let jobs = CollectionRepository::new(loader, CollectionName::Jobs);

        assert!(jobs.list().await.unwrap_err().is_not_initialized());
        assert!(jobs.create(Record::new("x")).await.unwrap_err().is_not_initialized());
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let (_, loader) = setup().await;
        let jobs = CollectionRepository::new(loader, CollectionName::Jobs);

        let ids: Vec<String> = jobs
            .list()
            .await
            .unwrap()
            .iter()
            .map(|r| r.id().to_string())
            .collect();
        assert_eq!(ids, ["job-1", "job-2", "job-3"]);
    }

    #[tokio::test]
    async fn test_secondary_lookups() {
        let (_, loader) = setup().await;
        let jobs = CollectionRepository::new(loader.clone(), CollectionName::Jobs);
        let applications = CollectionRepository::new(loader, CollectionName::Applications);

        assert_eq!(jobs.get_by_company_id("c1").await.unwrap().len(), 2);
        assert_eq!(jobs.get_by_status("closed").await.unwrap()[0].id(), "job-2");
        assert_eq!(applications.get_by_worker_id("w1").await.unwrap().len(), 2);
        assert_eq!(
            applications
                .get_by_worker_and_job("w1", "job-3")
                .await
                .unwrap()
                .unwrap()
                .id(),
            "app-2"
        );
        assert!(applications.get_by_worker_and_job("w1", "job-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_then_get_roundtrip_and_persist() {
        let (slots, loader) = setup().await;
        let users = CollectionRepository::new(loader, CollectionName::Users);

        let record = Record::new("user-1700000000000")
            .with("email", "new@demo.com")
            .with("role", "worker")
            .with("tags", json!(["a", "b"]));
        let created = users.create(record.clone()).await.unwrap();

        assert_eq!(created, record);
        assert_eq!(users.get_by_id(record.id()).await.unwrap(), Some(record.clone()));
        assert_eq!(users.get_by_email("new@demo.com").await.unwrap(), Some(record));

        let persisted = Store::from_document(slots.load(KEY).await.unwrap()).unwrap();
        assert_eq!(persisted.collection(CollectionName::Users).len(), 1);
    }

    #[tokio::test]
    async fn test_update_merges_patch() {
        let (_, loader) = setup().await;
        let jobs = CollectionRepository::new(loader, CollectionName::Jobs);
        jobs.create(Record::new("job-9").with("a", 1).with("b", 2))
            .await
            .unwrap();

        let updated = jobs.update("job-9", json!({"b": 3})).await.unwrap().unwrap();
        assert_eq!(updated.to_value(), json!({"id": "job-9", "a": 1, "b": 3}));
        assert_eq!(jobs.get_by_id("job-9").await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_update_missing_is_none_without_persist() {
        let (slots, loader) = setup().await;
        let jobs = CollectionRepository::new(loader, CollectionName::Jobs);
        let saves = slots.save_count();

        assert!(jobs.update("nope", json!({"status": "x"})).await.unwrap().is_none());
        assert_eq!(slots.save_count(), saves);
    }

    #[tokio::test]
    async fn test_update_rejects_non_object_patch() {
        let (_, loader) = setup().await;
        let jobs = CollectionRepository::new(loader, CollectionName::Jobs);
        assert!(jobs.update("job-1", json!(["x"])).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let (slots, loader) = setup().await;
        let jobs = CollectionRepository::new(loader, CollectionName::Jobs);
        let before = jobs.count().await.unwrap();

        assert!(jobs.delete("job-2").await.unwrap());
        let saves = slots.save_count();
        assert!(!jobs.delete("job-2").await.unwrap());

        assert_eq!(slots.save_count(), saves);
        assert_eq!(jobs.count().await.unwrap(), before - 1);
    }

    #[tokio::test]
    async fn test_mutations_survive_reload() {
        let (slots, loader) = setup().await;
        CollectionRepository::new(loader, CollectionName::Jobs)
            .update("job-1", json!({"status": "filled"}))
            .await
            .unwrap();

        let reloaded = Arc::new(DatasetLoader::new(
            slots,
            Arc::new(StaticSeedSource::empty()),
            KEY,
        ));
        reloaded.initialize().await.unwrap();
        let job = CollectionRepository::new(reloaded, CollectionName::Jobs)
            .get_by_id("job-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(job.get_str("status"), Some("filled"));
    }
}
