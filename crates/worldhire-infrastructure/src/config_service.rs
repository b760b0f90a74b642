//! Loads [`KernelConfig`] from `config.toml`.

use std::path::{Path, PathBuf};

use worldhire_core::error::{Result, WorldhireError};
use worldhire_core::KernelConfig;

use crate::paths::WorldhirePaths;

pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses the platform config file (`~/.config/worldhire/config.toml`).
    pub fn from_default_location() -> Result<Self> {
        Ok(Self::new(WorldhirePaths::config_file()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the config file.
    ///
    /// A missing or blank file yields defaults; a malformed file is a
    /// `Config` error.
    pub async fn load(&self) -> Result<KernelConfig> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {:?}, using defaults", self.path);
                return Ok(KernelConfig::default());
            }
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(KernelConfig::default());
        }

        toml::from_str(&content).map_err(|e| {
            WorldhireError::config(format!("Invalid config at {:?}: {}", self.path, e))
        })
    }

    /// Writes `config` as pretty TOML, creating parent directories.
    pub async fn save(&self, config: &KernelConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = toml::to_string_pretty(config)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(temp_dir.path().join("config.toml"));

        assert_eq!(service.load().await.unwrap(), KernelConfig::default());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(temp_dir.path().join("nested").join("config.toml"));

        let mut config = KernelConfig::default();
        config.session_ttl_hours = 1;
        config.seed.rng_seed = Some(42);
        config.storage_dir = Some(temp_dir.path().join("slots"));
        service.save(&config).await.unwrap();

        assert_eq!(service.load().await.unwrap(), config);
    }

    #[tokio::test]
    async fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "session_ttl_hours = \"soon\"").unwrap();

        let err = ConfigService::new(path).load().await.unwrap_err();
        assert!(matches!(err, WorldhireError::Config(_)));
    }
}
