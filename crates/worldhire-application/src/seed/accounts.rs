use serde_json::json;
use worldhire_core::{Filter, SeedResult};

use super::catalog::{DEMO_ACCOUNTS, SENTINEL_EMAIL};
use super::{PROFILES, SeedService};

impl SeedService {
    /// Signs up the fixed demo accounts unless the sentinel account exists.
    ///
    /// A skip is reported as `success: false` with an informational message.
    /// One failed signup does not stop the others.
    pub async fn seed_demo_accounts(&self) -> SeedResult {
        match self.exists(PROFILES, Filter::new().eq("email", SENTINEL_EMAIL)).await {
            Ok(true) => {
                tracing::info!("Demo accounts already exist, skipping");
                return SeedResult::skipped("Demo accounts already exist");
            }
            Ok(false) => {}
            Err(e) => {
                return SeedResult::failed(
                    "Could not check for existing demo accounts",
                    vec![e.to_string()],
                );
            }
        }

        let mut created = 0;
        let mut errors = Vec::new();
        for (index, account) in DEMO_ACCOUNTS.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.config.signup_delay()).await;
            }

            let metadata = json!({
                "full_name": account.full_name,
                "phone": account.phone,
                "role": account.role.to_string(),
            });
            match self
                .backend
                .auth()
                .sign_up(account.email, account.password, metadata)
                .await
            {
                Ok(user) => {
                    tracing::debug!("Created demo account {} ({})", account.email, user.id);
                    created += 1;
                }
                Err(e) => {
                    tracing::warn!("Demo account {} failed: {}", account.email, e);
                    errors.push(format!("{}: {}", account.email, e));
                }
            }
        }

        SeedResult::from_errors(
            format!("Created {} of {} demo accounts", created, DEMO_ACCOUNTS.len()),
            errors,
        )
    }
}
