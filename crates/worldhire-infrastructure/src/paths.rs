//! Unified path management for worldhire files.
//!
//! ```text
//! ~/.config/worldhire/          # Config directory
//! └── config.toml               # Kernel configuration
//!
//! ~/.local/share/worldhire/     # Data directory
//! ├── slots/                    # Persistent slots (store + session)
//! └── seed/                     # Default static seed documents
//! ```

use std::path::PathBuf;

use worldhire_core::KernelConfig;

const APP_DIR: &str = "worldhire";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for worldhire_core::WorldhireError {
    fn from(e: PathError) -> Self {
        Self::config(e.to_string())
    }
}

pub struct WorldhirePaths;

impl WorldhirePaths {
    /// Platform config directory, e.g. `~/.config/worldhire/`.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Platform data directory, e.g. `~/.local/share/worldhire/`.
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Where persistent slots live: the configured directory, or `slots/`
    /// under the data directory.
    pub fn slots_dir(config: &KernelConfig) -> Result<PathBuf, PathError> {
        match &config.storage_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::data_dir()?.join("slots")),
        }
    }

    /// Where static seed documents are read from.
    pub fn seed_dir(config: &KernelConfig) -> Result<PathBuf, PathError> {
        match &config.seed_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::data_dir()?.join("seed")),
        }
    }
}
