//! Error types for the Worldhire kernel.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the whole kernel.
///
/// Authentication failures are ordinary, recoverable variants: callers are
/// expected to branch on them and show them to the user. Everything else
/// signals a storage, remote or configuration problem.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum WorldhireError {
    /// No user is registered under the given email.
    #[error("User not found: {email}")]
    UserNotFound { email: String },

    /// The supplied password does not match the stored credential.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// A user with this email already exists.
    #[error("Email already registered: {email}")]
    EmailTaken { email: String },

    /// The one-time password was rejected.
    #[error("Invalid OTP code")]
    InvalidOtp,

    /// The dataset has not been initialized yet.
    #[error("Dataset not initialized: call initialize() before using collection '{collection}'")]
    NotInitialized { collection: String },

    /// A static seed collection could not be fetched or parsed.
    #[error("Seed error for '{collection}': {message}")]
    Seed { collection: String, message: String },

    /// A record failed validation (e.g. missing or non-string id).
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Data access error (slot/storage layer)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote backend error (HTTP status, transport, or rejected request)
    #[error("Remote error: {0}")]
    Remote(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WorldhireError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn user_not_found(email: impl Into<String>) -> Self {
        Self::UserNotFound {
            email: email.into(),
        }
    }

    pub fn email_taken(email: impl Into<String>) -> Self {
        Self::EmailTaken {
            email: email.into(),
        }
    }

    pub fn not_initialized(collection: impl Into<String>) -> Self {
        Self::NotInitialized {
            collection: collection.into(),
        }
    }

    pub fn seed(collection: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Seed {
            collection: collection.into(),
            message: message.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates a Remote error
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// True for the authentication failures a caller should present to the
    /// user rather than treat as a fault.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound { .. }
                | Self::InvalidCredentials
                | Self::EmailTaken { .. }
                | Self::InvalidOtp
        )
    }

    pub fn is_not_initialized(&self) -> bool {
        matches!(self, Self::NotInitialized { .. })
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for WorldhireError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for WorldhireError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for WorldhireError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for WorldhireError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for WorldhireError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, WorldhireError>`.
pub type Result<T> = std::result::Result<T, WorldhireError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failures_are_recoverable() {
        assert!(WorldhireError::InvalidCredentials.is_auth_failure());
        assert!(WorldhireError::InvalidOtp.is_auth_failure());
        assert!(WorldhireError::user_not_found("a@b.c").is_auth_failure());
        assert!(WorldhireError::email_taken("a@b.c").is_auth_failure());
        assert!(!WorldhireError::io("disk").is_auth_failure());
    }

    #[test]
    fn test_json_error_conversion() {
        let err: WorldhireError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(err.is_serialization());
        assert!(err.to_string().contains("JSON"));
    }

    #[test]
    fn test_display_includes_collection() {
        let err = WorldhireError::not_initialized("users");
        assert!(err.is_not_initialized());
        assert!(err.to_string().contains("users"));
    }
}
