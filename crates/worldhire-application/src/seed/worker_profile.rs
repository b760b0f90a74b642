use serde_json::{Value, json};
use worldhire_core::{Filter, SeedResult};

use super::SeedService;

fn profile_rows(worker_id: &str) -> Vec<Value> {
    vec![json!({
        "user_id": worker_id,
        "headline": "Certified welder with 6 years of Gulf experience",
        "bio": "Structural and pipe welder. Worked on high-rise and refinery projects in Dubai and Doha.",
        "nationality": "Philippines",
        "current_country": "Philippines",
        "years_experience": 6,
        "preferred_countries": ["UAE", "Qatar", "Saudi Arabia"],
        "expected_salary": 1800,
        "availability": "immediate",
        "verification_status": "verified",
    })]
}

fn skill_rows(worker_id: &str) -> Vec<Value> {
    [
        ("Welding", "expert", 6),
        ("Blueprint Reading", "intermediate", 4),
        ("Safety Compliance", "expert", 6),
        ("Scaffolding", "beginner", 1),
    ]
    .into_iter()
    .map(|(name, level, years)| {
        json!({
            "worker_id": worker_id,
            "skill_name": name,
            "proficiency": level,
            "years_experience": years,
        })
    })
    .collect()
}

fn certification_rows(worker_id: &str) -> Vec<Value> {
    vec![
        json!({
            "worker_id": worker_id,
            "name": "AWS Certified Welder",
            "issuer": "American Welding Society",
            "issued_on": "2021-04-12",
            "expires_on": "2027-04-12",
            "verified": true,
        }),
        json!({
            "worker_id": worker_id,
            "name": "OSHA 30-Hour Construction",
            "issuer": "OSHA",
            "issued_on": "2022-09-01",
            "verified": false,
        }),
    ]
}

fn experience_rows(worker_id: &str) -> Vec<Value> {
    vec![
        json!({
            "worker_id": worker_id,
            "employer_name": "Al Noor Steel Structures",
            "job_title": "Structural Welder",
            "country": "UAE",
            "start_date": "2019-02-01",
            "end_date": "2022-06-30",
        }),
        json!({
            "worker_id": worker_id,
            "employer_name": "Qatar Refinery Services",
            "job_title": "Pipe Welder",
            "country": "Qatar",
            "start_date": "2022-08-15",
            "end_date": Value::Null,
        }),
    ]
}

impl SeedService {
    /// Fills in the profile, skills, certifications and work history of a
    /// worker. Each part is skipped on its own when already present.
    pub async fn seed_worker_profile(&self, worker_id: &str) -> SeedResult {
        let parts: [(&str, &str, fn(&str) -> Vec<Value>); 4] = [
            ("worker_profiles", "user_id", profile_rows),
            ("worker_skills", "worker_id", skill_rows),
            ("certifications", "worker_id", certification_rows),
            ("work_experience", "worker_id", experience_rows),
        ];

        let mut created = Vec::new();
        let mut present = Vec::new();
        let mut errors = Vec::new();

        for (table, owner_column, rows) in parts {
            match self.exists(table, Filter::new().eq(owner_column, worker_id)).await {
                Ok(true) => {
                    tracing::debug!("{} already present for {}", table, worker_id);
                    present.push(table);
                }
                Ok(false) => match self.backend.insert(table, rows(worker_id), false).await {
                    Ok(_) => created.push(table),
                    Err(e) => errors.push(format!("{}: {}", table, e)),
                },
                Err(e) => errors.push(format!("{}: {}", table, e)),
            }
        }

        let describe = |tables: &[&str]| {
            if tables.is_empty() {
                "none".to_string()
            } else {
                tables.join(", ")
            }
        };
        SeedResult::from_errors(
            format!(
                "Worker profile created: {}; already present: {}",
                describe(&created),
                describe(&present)
            ),
            errors,
        )
    }
}
