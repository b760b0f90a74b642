use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use serde_json::{Value, json};
use worldhire_core::{Filter, SeedResult, SelectQuery};

use super::catalog::{APPLICATION_STATUSES, COVER_LETTERS, DEMO_WORKER_EMAILS};
use super::{PROFILES, SeedService};

const APPLICATIONS: &str = "applications";
const STATUS_HISTORY: &str = "application_status_history";

/// Five to eight applications per worker against distinct jobs, each with a
/// random status and an applied-at date 1 to 30 days before `now`.
pub(crate) fn plan_applications<R: Rng>(
    rng: &mut R,
    worker_ids: &[String],
    job_ids: &[String],
    now: DateTime<Utc>,
) -> Vec<Value> {
    let mut rows = Vec::new();
    for worker_id in worker_ids {
        let count = rng.gen_range(5..=8usize).min(job_ids.len());
        let jobs: Vec<&String> = job_ids.choose_multiple(rng, count).collect();

        for job_id in jobs {
            let status = APPLICATION_STATUSES.choose(rng).copied().unwrap_or("pending");
            let cover_letter = COVER_LETTERS.choose(rng).copied().unwrap_or_default();
            let applied_at = now - Duration::days(rng.gen_range(1..=30));
            rows.push(json!({
                "worker_id": worker_id,
                "job_id": job_id,
                "status": status,
                "cover_letter": cover_letter,
                "applied_at": applied_at,
            }));
        }
    }
    rows
}

fn history_row(application: &Value) -> Option<Value> {
    Some(json!({
        "application_id": application.get("id")?.clone(),
        "status": application.get("status")?.clone(),
        "changed_at": application.get("applied_at").cloned().unwrap_or(Value::Null),
        "notes": "Seeded demo application",
    }))
}

fn ids(rows: &[Value]) -> Vec<String> {
    rows.iter()
        .filter_map(|row| row.get("id").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

impl SeedService {
    /// Creates applications for the demo workers against active jobs.
    ///
    /// Does nothing, successfully, once any of those workers has applied.
    pub async fn seed_applications(&self) -> SeedResult {
        let workers = match self
            .backend
            .select(
                PROFILES,
                SelectQuery::filtered(Filter::new().in_list("email", DEMO_WORKER_EMAILS.iter().copied())),
            )
            .await
        {
            Ok(response) => ids(&response.rows),
            Err(e) => return SeedResult::failed("Could not load demo workers", vec![e.to_string()]),
        };
        if workers.is_empty() {
            return SeedResult::failed(
                "No demo workers to apply with",
                vec!["demo worker accounts not found".to_string()],
            );
        }

        match self
            .exists(APPLICATIONS, Filter::new().in_list("worker_id", workers.clone()))
            .await
        {
            Ok(true) => {
                tracing::info!("Job applications already exist, skipping");
                return SeedResult::ok("Job applications already exist");
            }
            Ok(false) => {}
            Err(e) => {
                return SeedResult::failed(
                    "Could not check for existing applications",
                    vec![e.to_string()],
                );
            }
        }

        let query = SelectQuery::filtered(Filter::new().eq("status", "active"))
            .limit(self.config.application_job_pool);
        let jobs = match self.backend.select("jobs", query).await {
            Ok(response) => ids(&response.rows),
            Err(e) => return SeedResult::failed("Could not load active jobs", vec![e.to_string()]),
        };
        if jobs.is_empty() {
            return SeedResult::failed(
                "No active jobs to apply to",
                vec!["no active jobs found".to_string()],
            );
        }

        let rows = {
            let mut rng = self.rng.lock().await;
            plan_applications(&mut *rng, &workers, &jobs, Utc::now())
        };

        tracing::info!("Inserting {} applications for {} workers", rows.len(), workers.len());
        let applications = match self.backend.insert(APPLICATIONS, rows, true).await {
            Ok(applications) => applications,
            Err(e) => {
                return SeedResult::failed("Failed to create job applications", vec![e.to_string()]);
            }
        };

        let history: Vec<Value> = applications.iter().filter_map(history_row).collect();
        let mut errors = Vec::new();
        if let Err(e) = self.backend.insert(STATUS_HISTORY, history, false).await {
            errors.push(format!("{}: {}", STATUS_HISTORY, e));
        }

        SeedResult::from_errors(
            format!("Created {} job applications", applications.len()),
            errors,
        )
    }
}
