//! Idempotent provisioning of demo accounts and content in the hosted backend.
//!
//! Every public entry point returns a [`SeedResult`]; backend failures are
//! collected into its error list and never escape. Writes are not rolled
//! back, so a failed result may still have created data.

mod accounts;
mod applications;
pub mod catalog;
mod jobs;
mod worker_profile;

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::Value;
use tokio::sync::Mutex;
use worldhire_core::error::Result;
use worldhire_core::{Filter, RemoteBackend, Role, SeedConfig, SeedResult, SelectQuery};

pub use jobs::{JobDraft, generate_job_corpus};

const PROFILES: &str = "profiles";

pub struct SeedService {
    backend: Arc<dyn RemoteBackend>,
    config: SeedConfig,
    rng: Mutex<StdRng>,
}

impl SeedService {
    pub fn new(backend: Arc<dyn RemoteBackend>, config: SeedConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            backend,
            config,
            rng: Mutex::new(rng),
        }
    }

    pub fn config(&self) -> &SeedConfig {
        &self.config
    }

    /// Runs accounts, jobs, worker profile and applications in order.
    ///
    /// A step that fails does not stop the next one. The job and worker
    /// profile steps need an account to attach to; when none resolves, the
    /// step is recorded as an error and skipped.
    pub async fn seed_all(&self) -> SeedResult {
        tracing::info!("Seeding demo data");
        let mut messages = Vec::new();
        let mut errors = Vec::new();

        let mut record = |step: &str, result: SeedResult| {
            tracing::info!("[seed:{}] {}", step, result.message);
            messages.push(format!("{}: {}", step, result.message));
            errors.extend(
                result
                    .error_list()
                    .iter()
                    .map(|e| format!("{}: {}", step, e)),
            );
        };

        record("accounts", self.seed_demo_accounts().await);

        match self.resolve_profile_id(Filter::new().eq("role", Role::Employer.to_string())).await {
            Ok(Some(employer_id)) => {
                record("jobs", self.seed_jobs(&employer_id, self.config.job_target).await)
            }
            Ok(None) => record(
                "jobs",
                SeedResult::failed(
                    "Skipped",
                    vec!["no employer account found".to_string()],
                ),
            ),
            Err(e) => record(
                "jobs",
                SeedResult::failed("Skipped", vec![format!("employer lookup failed: {}", e)]),
            ),
        }

        match self
            .resolve_profile_id(Filter::new().eq("email", catalog::PRIMARY_WORKER_EMAIL))
            .await
        {
            Ok(Some(worker_id)) => {
                record("worker profile", self.seed_worker_profile(&worker_id).await)
            }
            Ok(None) => record(
                "worker profile",
                SeedResult::failed(
                    "Skipped",
                    vec![format!("{} not found", catalog::PRIMARY_WORKER_EMAIL)],
                ),
            ),
            Err(e) => record(
                "worker profile",
                SeedResult::failed("Skipped", vec![format!("worker lookup failed: {}", e)]),
            ),
        }

        record("applications", self.seed_applications().await);

        if !errors.is_empty() {
            tracing::warn!("Seeding finished with {} error(s)", errors.len());
        }
        SeedResult::from_errors(messages.join("\n"), errors)
    }

    async fn resolve_profile_id(&self, filter: Filter) -> Result<Option<String>> {
        let response = self
            .backend
            .select(PROFILES, SelectQuery::filtered(filter).limit(1))
            .await?;
        Ok(response
            .rows
            .first()
            .and_then(|row| row.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    async fn exists(&self, table: &str, filter: Filter) -> Result<bool> {
        let response = self
            .backend
            .select(table, SelectQuery::count_only(filter))
            .await?;
        Ok(response.total() > 0)
    }

    /// Inserts `rows` in batches, pausing between batches.
    ///
    /// Returns the stored rows (when `returning`) and one error per failed
    /// batch; a failed batch does not stop the others.
    async fn insert_batched(
        &self,
        table: &str,
        rows: Vec<Value>,
        returning: bool,
    ) -> (Vec<Value>, Vec<String>) {
        let batch_size = self.config.batch_size.max(1);
        let batch_count = rows.len().div_ceil(batch_size);
        let mut stored = Vec::new();
        let mut errors = Vec::new();

        for (index, batch) in rows.chunks(batch_size).enumerate() {
            match self.backend.insert(table, batch.to_vec(), returning).await {
                Ok(rows) => stored.extend(rows),
                Err(e) => {
                    tracing::warn!("Batch {}/{} into '{}' failed: {}", index + 1, batch_count, table, e);
                    errors.push(format!("{} batch {}: {}", table, index + 1, e));
                }
            }
            if index + 1 < batch_count {
                tokio::time::sleep(self.config.batch_delay()).await;
            }
        }
        (stored, errors)
    }
}
