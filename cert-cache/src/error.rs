//! Error types for the certificate cache

use secrets_service::SecretsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    /// The secret store failed; passed through untouched.
    #[error(transparent)]
    Fetch(#[from] SecretsError),

    #[error("Malformed secret {secret}: {reason}")]
    MalformedSecret { secret: String, reason: String },

    #[error("Object metadata is missing {0}")]
    MissingIdentity(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
}

impl CacheError {
    pub(crate) fn malformed(secret: &str, reason: impl Into<String>) -> Self {
        CacheError::MalformedSecret {
            secret: secret.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;
