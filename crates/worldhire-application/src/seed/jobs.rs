use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use worldhire_core::{Filter, SeedResult, SelectQuery};

use super::SeedService;
use super::catalog::{self, CATEGORIES, PRIORITY_LOCATIONS, SECONDARY_LOCATIONS};

const EMPLOYER_PROFILES: &str = "employer_profiles";
const JOBS: &str = "jobs";
const JOB_SKILLS: &str = "job_skills";

/// A generated job posting, serialized as a `jobs` row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobDraft {
    pub employer_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub city: String,
    pub country: String,
    pub location: String,
    pub salary_min: u32,
    pub salary_max: u32,
    pub currency: String,
    pub job_type: String,
    pub positions_available: u32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl JobDraft {
    fn new(
        employer_id: &str,
        category: &catalog::JobCategory,
        (city, country): (&str, &str),
        index: usize,
        now: DateTime<Utc>,
    ) -> Self {
        let title = category.titles[index % category.titles.len()];
        let salary_min = category.base_salary + (index % 5) as u32 * 100;
        Self {
            employer_id: employer_id.to_string(),
            title: title.to_string(),
            description: format!(
                "{} needed in {}, {}. Visa sponsorship, accommodation and return flights provided.",
                title, city, country
            ),
            category: category.name.to_string(),
            city: city.to_string(),
            country: country.to_string(),
            location: format!("{}, {}", city, country),
            salary_min,
            salary_max: salary_min + 600,
            currency: "USD".to_string(),
            job_type: "full_time".to_string(),
            positions_available: 1 + (index % 4) as u32,
            status: "active".to_string(),
            created_at: now - Duration::days((index % 21) as i64),
        }
    }
}

/// Builds the job corpus for one employer.
///
/// Every category is posted to every priority location first, so the
/// result always holds at least `categories × priority locations` jobs.
/// Any quota left after that is filled from the secondary locations,
/// cycling through the categories.
pub fn generate_job_corpus(employer_id: &str, target: usize, now: DateTime<Utc>) -> Vec<JobDraft> {
    let mut jobs = Vec::with_capacity(target.max(CATEGORIES.len() * PRIORITY_LOCATIONS.len()));

    for &location in PRIORITY_LOCATIONS {
        for category in CATEGORIES {
            jobs.push(JobDraft::new(employer_id, category, location, jobs.len(), now));
        }
    }

    let filler = target.saturating_sub(jobs.len());
    for i in 0..filler {
        let category = &CATEGORIES[i % CATEGORIES.len()];
        let location = SECONDARY_LOCATIONS[i % SECONDARY_LOCATIONS.len()];
        jobs.push(JobDraft::new(employer_id, category, location, jobs.len(), now));
    }

    jobs
}

/// Two to four skill tags for the `index`-th job, taken from its category.
fn skill_rows(job: &Value, index: usize) -> Vec<Value> {
    let (Some(job_id), Some(category)) = (
        job.get("id").and_then(Value::as_str),
        job.get("category")
            .and_then(Value::as_str)
            .and_then(catalog::category),
    ) else {
        return Vec::new();
    };

    let count = 2 + index % 3;
    category
        .skills
        .iter()
        .cycle()
        .skip(index % category.skills.len())
        .take(count)
        .enumerate()
        .map(|(position, skill)| {
            json!({
                "job_id": job_id,
                "skill_name": skill,
                "required": position == 0,
            })
        })
        .collect()
}

impl SeedService {
    /// Posts at least `target` jobs for `employer_id`, plus their skill tags.
    ///
    /// Does nothing, successfully, once the employer has any job posted. An
    /// employer profile row is created first when missing; if that fails
    /// nothing else is attempted.
    pub async fn seed_jobs(&self, employer_id: &str, target: usize) -> SeedResult {
        match self.exists(JOBS, Filter::new().eq("employer_id", employer_id)).await {
            Ok(true) => {
                tracing::info!("Jobs already exist for employer {}, skipping", employer_id);
                return SeedResult::ok("Jobs already exist for this employer");
            }
            Ok(false) => {}
            Err(e) => {
                return SeedResult::failed("Could not check for existing jobs", vec![e.to_string()]);
            }
        }

        if let Err(e) = self.ensure_employer_profile(employer_id).await {
            return SeedResult::failed("Could not prepare employer profile", vec![e]);
        }

        let drafts = generate_job_corpus(employer_id, target, Utc::now());
        let rows = drafts
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>();
        let rows = match rows {
            Ok(rows) => rows,
            Err(e) => return SeedResult::failed("Could not build job rows", vec![e.to_string()]),
        };

        tracing::info!("Inserting {} jobs for employer {}", rows.len(), employer_id);
        let (jobs, mut errors) = self.insert_batched(JOBS, rows, true).await;

        let skills: Vec<Value> = jobs
            .iter()
            .enumerate()
            .flat_map(|(index, job)| skill_rows(job, index))
            .collect();
        let skill_count = skills.len();
        let (_, skill_errors) = self.insert_batched(JOB_SKILLS, skills, false).await;
        errors.extend(skill_errors);

        SeedResult::from_errors(
            format!("Created {} jobs with {} skill tags", jobs.len(), skill_count),
            errors,
        )
    }

    async fn ensure_employer_profile(&self, employer_id: &str) -> Result<(), String> {
        let existing = self
            .backend
            .select(
                EMPLOYER_PROFILES,
                SelectQuery::filtered(Filter::new().eq("user_id", employer_id)).limit(1),
            )
            .await
            .map_err(|e| e.to_string())?;
        if !existing.rows.is_empty() {
            return Ok(());
        }

        tracing::debug!("Creating employer profile for {}", employer_id);
        let profile = json!({
            "user_id": employer_id,
            "company_name": "Gulf Build Contracting",
            "industry": "Construction",
            "country": "UAE",
            "company_size": "201-500",
            "verified": true,
        });
        self.backend
            .insert(EMPLOYER_PROFILES, vec![profile], false)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}
