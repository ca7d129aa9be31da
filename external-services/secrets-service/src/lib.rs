//! # Secrets Service
//!
//! Secret fetching for the VerticaDB operator.
//!
//! ## Supported Sources:
//! - Kubernetes Secrets (plain secret names)
//! - AWS Secrets Manager (`awssm://` references)
//! - In-memory store (tests, local development)
//!
//! `gsm://` and `azure://` references are recognised and routed, but only
//! succeed when a backend for that source has been registered.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod providers;
pub mod source;

pub use config::*;
pub use error::*;
pub use fetcher::MultiSourceSecretFetcher;
pub use providers::*;
pub use source::{SecretRef, SecretSource};

use async_trait::async_trait;
use std::collections::BTreeMap;

/// Result type for secrets service
pub type Result<T> = std::result::Result<T, SecretsError>;

/// Raw secret payload: entry name to bytes (`tls.crt`, `password`, ...)
pub type SecretData = BTreeMap<String, Vec<u8>>;

/// Reads a secret by name on behalf of one namespace.
///
/// This is the seam the certificate cache calls on a miss. Implementations
/// must be side-effect free: the cache may call `fetch` for the same secret
/// from several workers at once.
#[async_trait]
pub trait SecretFetcher: Send + Sync {
    async fn fetch(&self, namespace: &str, name: &str) -> Result<SecretData>;
}

/// One concrete secret store.
///
/// `name` has already had its source prefix stripped.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SecretBackend: Send + Sync {
    fn source(&self) -> SecretSource;

    async fn fetch(&self, namespace: &str, name: &str) -> Result<SecretData>;
}
