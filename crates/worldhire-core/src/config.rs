//! Kernel configuration model.
//!
//! Every field has a default, so an empty or partial `config.toml` is valid.

use std::path::PathBuf;
use std::time::Duration as StdDuration;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WorldhireError};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct KernelConfig {
    /// Directory holding the persistent slots. `None` uses the platform data dir.
    pub storage_dir: Option<PathBuf>,
    /// Directory holding the static seed documents.
    pub seed_dir: Option<PathBuf>,
    pub store_key: String,
    pub session_key: String,
    pub session_ttl_hours: i64,
    pub otp_code: String,
    pub token_prefix: String,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
    pub remote: RemoteConfig,
    pub seed: SeedConfig,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            storage_dir: None,
            seed_dir: None,
            store_key: "worldhire_mock_data".to_string(),
            session_key: "worldhire_session".to_string(),
            session_ttl_hours: 24,
            otp_code: "000000".to_string(),
            token_prefix: "mock_token".to_string(),
            log_level: "info".to_string(),
            remote: RemoteConfig::default(),
            seed: SeedConfig::default(),
        }
    }
}

impl KernelConfig {
    pub fn session_ttl(&self) -> Result<Duration> {
        Self::ttl_from_hours(self.session_ttl_hours)
    }

    /// Fails with a `Config` error when `hours` does not fit a `Duration`.
    pub fn ttl_from_hours(hours: i64) -> Result<Duration> {
        Duration::try_hours(hours).ok_or_else(|| {
            WorldhireError::config(format!("session_ttl_hours {} is out of range", hours))
        })
    }
}

/// Connection settings for the hosted backend.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl RemoteConfig {
    pub fn timeout(&self) -> StdDuration {
        StdDuration::from_secs(self.timeout_secs)
    }
}

/// Pacing and sizing of the seeding run.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SeedConfig {
    /// Pause between demo account signups.
    pub signup_delay_ms: u64,
    pub batch_size: usize,
    /// Pause between insert batches.
    pub batch_delay_ms: u64,
    /// Number of jobs requested by the aggregate run.
    pub job_target: usize,
    /// Upper bound on active jobs pulled for application seeding.
    pub application_job_pool: usize,
    /// Fixed RNG seed for reproducible runs.
    pub rng_seed: Option<u64>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            signup_delay_ms: 1000,
            batch_size: 10,
            batch_delay_ms: 500,
            job_target: 60,
            application_job_pool: 30,
            rng_seed: None,
        }
    }
}

impl SeedConfig {
    /// Zero delays and a fixed RNG seed.
    pub fn immediate() -> Self {
        Self {
            signup_delay_ms: 0,
            batch_delay_ms: 0,
            rng_seed: Some(7),
            ..Self::default()
        }
    }

    pub fn signup_delay(&self) -> StdDuration {
        StdDuration::from_millis(self.signup_delay_ms)
    }

    pub fn batch_delay(&self) -> StdDuration {
        StdDuration::from_millis(self.batch_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: KernelConfig = toml::from_str(
            r#"
            session_ttl_hours = 2

            [seed]
            batch_size = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.session_ttl().unwrap(), Duration::hours(2));
        assert_eq!(config.seed.batch_size, 5);
        assert_eq!(config.seed.job_target, 60);
        assert_eq!(config.otp_code, "000000");
        assert_eq!(config.remote.timeout_secs, 30);
    }

    #[test]
    fn test_huge_ttl_is_a_config_error() {
        let config: KernelConfig = toml::from_str("session_ttl_hours = 9223372036854775807").unwrap();
        let err = config.session_ttl().unwrap_err();
        assert!(matches!(err, WorldhireError::Config(_)));
    }

    #[test]
    fn test_keys_are_distinct() {
        let config = KernelConfig::default();
        assert_ne!(config.store_key, config.session_key);
    }
}
