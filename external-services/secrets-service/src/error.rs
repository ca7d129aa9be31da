//! Error types for secrets service

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SecretsError {
    #[error("Secret not found: {0}")]
    NotFound(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("No backend registered for secret source {source_name} (secret {secret})")]
    UnsupportedSource { source_name: String, secret: String },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Invalid secret format: {0}")]
    InvalidFormat(String),

    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl SecretsError {
    /// Whether the backing store reported the secret as absent, as opposed to
    /// being unreachable or misconfigured.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SecretsError::NotFound(_))
    }
}
