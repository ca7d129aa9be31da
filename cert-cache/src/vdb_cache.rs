//! Cache for one VerticaDB: TLS bundles by secret name, plus one password

use crate::certs::HttpsCerts;
use crate::error::Result;
use crate::item_cache::ItemCache;
use logger_redacted::redact;
use secrets_service::{SecretData, SecretFetcher};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const SCALAR_KEY: &str = "password";

pub struct VdbCache {
    /// Secret lookups are namespaced; kept so callers need not pass it
    namespace: String,
    certs: ItemCache<SecretData>,
    scalar: ItemCache<String>,
    fetcher: Arc<dyn SecretFetcher>,
}

impl VdbCache {
    pub fn new(
        namespace: impl Into<String>,
        ttl: Duration,
        fetcher: Arc<dyn SecretFetcher>,
        enabled: bool,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            certs: ItemCache::new(ttl, enabled),
            scalar: ItemCache::new(ttl, enabled),
            fetcher,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn ttl(&self) -> Duration {
        self.certs.ttl()
    }

    pub fn set_ttl(&self, ttl: Duration) {
        self.certs.set_ttl(ttl);
        self.scalar.set_ttl(ttl);
    }

    pub fn is_enabled(&self) -> bool {
        self.certs.is_enabled()
    }

    /// Load the TLS bundle stored in `secret_name`, from cache when possible.
    ///
    /// On a miss the secret is fetched (no lock is held across the fetch),
    /// shaped, and only then cached, so a malformed payload is never stored.
    /// Two workers missing on the same secret may both fetch it.
    ///
    /// # Errors
    ///
    /// Fetch errors are returned unchanged and leave the cache untouched.
    /// A payload without `tls.key`, `tls.crt` and `ca.crt` yields
    /// `MalformedSecret`.
    pub async fn read_cert_bundle(&self, secret_name: &str) -> Result<HttpsCerts> {
        if let Some(data) = self.certs.get(secret_name) {
            debug!(namespace = %self.namespace, secret = secret_name, "TLS secret served from cache");
            return HttpsCerts::from_secret_data(secret_name, &data);
        }

        let data = match self.fetcher.fetch(&self.namespace, secret_name).await {
            Ok(data) => data,
            Err(e) => {
                warn!(
                    namespace = %self.namespace,
                    secret = secret_name,
                    error = %redact(&e.to_string()),
                    "Failed to load TLS secret"
                );
                return Err(e.into());
            }
        };

        let certs = HttpsCerts::from_secret_data(secret_name, &data)?;
        if self.certs.is_enabled() {
            self.certs.set(secret_name, data);
            info!(namespace = %self.namespace, secret = secret_name, "Loaded TLS secret and cached it");
        } else {
            info!(namespace = %self.namespace, secret = secret_name, "Loaded TLS secret");
        }

        Ok(certs)
    }

    /// Seed the cache with a payload the caller already holds, e.g. a
    /// certificate the operator has just generated and written out.
    ///
    /// # Errors
    ///
    /// A payload that would not shape into [`HttpsCerts`] is refused with
    /// `MalformedSecret` and the cache is left as it was.
    pub fn save_cert(&self, secret_name: &str, data: SecretData) -> Result<()> {
        HttpsCerts::from_secret_data(secret_name, &data)?;
        self.certs.set(secret_name, data);
        Ok(())
    }

    /// Forget one secret, typically after it was rotated.
    pub fn clear_entry_by_name(&self, secret_name: &str) {
        self.certs.delete(secret_name);
    }

    pub fn contains_entry(&self, secret_name: &str) -> bool {
        self.certs.contains(secret_name)
    }

    /// Evict every cached bundle whose secret is no longer referenced by the
    /// database's spec or status.
    pub fn prune_unused<I, S>(&self, secrets_in_use: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keep: HashSet<String> = secrets_in_use.into_iter().map(Into::into).collect();
        let removed = self.certs.retain_keys(&keep);
        if removed > 0 {
            debug!(namespace = %self.namespace, removed, "Pruned unused TLS secrets from cache");
        }
    }

    pub fn set_scalar(&self, value: impl Into<String>) {
        self.scalar.set(SCALAR_KEY, value.into());
    }

    pub fn get_scalar(&self) -> Option<String> {
        self.scalar.get(SCALAR_KEY)
    }

    pub fn clear_scalar(&self) {
        self.scalar.delete(SCALAR_KEY);
    }
}

impl fmt::Debug for VdbCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VdbCache")
            .field("namespace", &self.namespace)
            .field("certs", &self.certs)
            .field("scalar", &self.scalar)
            .finish_non_exhaustive()
    }
}
