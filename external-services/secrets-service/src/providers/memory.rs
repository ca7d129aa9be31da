//! In-memory secret backend

use crate::{Result, SecretBackend, SecretData, SecretSource, SecretsError};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Secret store held in process memory.
///
/// Stands in for a real store in tests and local runs. Counts fetches so
/// callers can observe whether a cache in front of it was hit.
pub struct StaticSecretBackend {
    source: SecretSource,
    secrets: RwLock<HashMap<(String, String), SecretData>>,
    fetches: AtomicUsize,
}

impl StaticSecretBackend {
    pub fn new(source: SecretSource) -> Self {
        Self {
            source,
            secrets: RwLock::new(HashMap::new()),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn insert(&self, namespace: &str, name: &str, data: SecretData) {
        self.secrets
            .write()
            .insert((namespace.to_string(), name.to_string()), data);
    }

    pub fn remove(&self, namespace: &str, name: &str) -> Option<SecretData> {
        self.secrets
            .write()
            .remove(&(namespace.to_string(), name.to_string()))
    }

    /// Number of `fetch` calls served so far, including misses.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretBackend for StaticSecretBackend {
    fn source(&self) -> SecretSource {
        self.source
    }

    async fn fetch(&self, namespace: &str, name: &str) -> Result<SecretData> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.secrets
            .read()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| SecretsError::NotFound(format!("{namespace}/{name}")))
    }
}
