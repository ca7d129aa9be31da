//! Registry of per-database caches
//!
//! Reconcilers for different VerticaDBs run in parallel and share one
//! `CacheManager`, injected as an `Arc`. The registry lock only guards map
//! membership; it is released before any secret is fetched, so a slow secret
//! store never blocks reconciles of unrelated databases.

use crate::config::CacheConfig;
use crate::identity::{tls_cache_duration_for, VdbIdentity, DEFAULT_TLS_CACHE_DURATION_SECS};
use crate::item_cache::ttl_from_secs;
use crate::vdb_cache::VdbCache;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use parking_lot::Mutex;
use secrets_service::SecretFetcher;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug)]
pub struct CacheManager {
    caches: Mutex<HashMap<VdbIdentity, Arc<VdbCache>>>,
    enabled: bool,
    default_ttl_seconds: i64,
}

impl CacheManager {
    pub fn new(enabled: bool) -> Self {
        Self::with_default_ttl(enabled, DEFAULT_TLS_CACHE_DURATION_SECS)
    }

    pub fn with_default_ttl(enabled: bool, default_ttl_seconds: i64) -> Self {
        info!(enabled, default_ttl_seconds, "Initialized cache manager");
        Self {
            caches: Mutex::new(HashMap::new()),
            enabled,
            default_ttl_seconds,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::with_default_ttl(config.enabled, config.default_ttl_seconds)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// TTL applied to VerticaDBs without a usable cache-duration annotation
    pub fn default_ttl_seconds(&self) -> i64 {
        self.default_ttl_seconds
    }

    /// Cache TTL for a VerticaDB: its annotation, else the configured default.
    pub fn ttl_seconds_for(&self, meta: &ObjectMeta) -> i64 {
        tls_cache_duration_for(meta, self.default_ttl_seconds)
    }

    /// Create the cache for `identity`, or bring an existing one's TTL in
    /// line with `ttl_seconds`. Meant to be called on every reconcile pass.
    ///
    /// An existing cache keeps its fetcher and its cached entries.
    pub fn init_cache_for_vdb(
        &self,
        identity: &VdbIdentity,
        ttl_seconds: i64,
        fetcher: Arc<dyn SecretFetcher>,
    ) -> Arc<VdbCache> {
        let ttl = ttl_from_secs(ttl_seconds);
        let mut caches = self.caches.lock();

        if let Some(cache) = caches.get(identity) {
            if cache.ttl() != ttl {
                cache.set_ttl(ttl);
                info!(vdb = %identity, ttl_seconds, "Cache expire duration has been updated");
            }
            return Arc::clone(cache);
        }

        let cache = Arc::new(VdbCache::new(
            identity.namespace.clone(),
            ttl,
            fetcher,
            self.enabled,
        ));
        caches.insert(identity.clone(), Arc::clone(&cache));
        info!(vdb = %identity, ttl_seconds, enabled = self.enabled, "Initialized cert cache for vdb");
        cache
    }

    /// `None` when `init_cache_for_vdb` was never called for `identity` (or
    /// the cache was destroyed since).
    pub fn get_cert_cache_for_vdb(&self, identity: &VdbIdentity) -> Option<Arc<VdbCache>> {
        self.caches.lock().get(identity).cloned()
    }

    /// Drop the cache of a deleted database. Unknown identities are ignored.
    ///
    /// Handles obtained earlier stay usable but are no longer reachable from
    /// the manager; a later `init_cache_for_vdb` starts from an empty cache.
    pub fn destroy_cache_for_vdb(&self, identity: &VdbIdentity) {
        if self.caches.lock().remove(identity).is_some() {
            info!(vdb = %identity, "Destroyed cert cache for vdb");
        }
    }

    pub fn set_password(&self, identity: &VdbIdentity, password: impl Into<String>) {
        match self.get_cert_cache_for_vdb(identity) {
            Some(cache) => cache.set_scalar(password),
            None => debug!(vdb = %identity, "No cache for vdb, password not cached"),
        }
    }

    pub fn get_password(&self, identity: &VdbIdentity) -> Option<String> {
        self.get_cert_cache_for_vdb(identity)?.get_scalar()
    }

    pub fn delete_password(&self, identity: &VdbIdentity) {
        if let Some(cache) = self.get_cert_cache_for_vdb(identity) {
            cache.clear_scalar();
        }
    }

    pub fn len(&self) -> usize {
        self.caches.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn identities(&self) -> Vec<VdbIdentity> {
        let mut identities: Vec<_> = self.caches.lock().keys().cloned().collect();
        identities.sort();
        identities
    }
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certs::{CA_CERT_KEY, TLS_CERT_KEY, TLS_PRIVATE_KEY_KEY};
    use secrets_service::{MultiSourceSecretFetcher, SecretData, SecretSource, StaticSecretBackend};
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn tls_secret() -> SecretData {
        SecretData::from([
            (TLS_PRIVATE_KEY_KEY.to_string(), b"key".to_vec()),
            (TLS_CERT_KEY.to_string(), b"cert".to_vec()),
            (CA_CERT_KEY.to_string(), b"ca".to_vec()),
        ])
    }

    fn fetcher() -> Arc<dyn SecretFetcher> {
        let store = StaticSecretBackend::new(SecretSource::Kubernetes);
        Arc::new(MultiSourceSecretFetcher::new().with_backend(Arc::new(store)))
    }

    #[test]
    fn test_init_twice_returns_same_cache() {
        let manager = CacheManager::new(true);
        let vdb = VdbIdentity::new("default", "vertica-sample");

        let first = manager.init_cache_for_vdb(&vdb, 60, fetcher());
        let second = manager.init_cache_for_vdb(&vdb, 60, fetcher());

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_reinit_with_new_ttl_reconfigures_in_place() {
        let manager = CacheManager::new(true);
        let vdb = VdbIdentity::new("default", "vertica-sample");

        let first = manager.init_cache_for_vdb(&vdb, 60, fetcher());
        first.set_scalar("pw");
        let second = manager.init_cache_for_vdb(&vdb, 5, fetcher());

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.ttl(), Duration::from_secs(5));
        assert_eq!(second.get_scalar().as_deref(), Some("pw"));
    }

    #[test]
    fn test_unknown_identity_yields_none() {
        let manager = CacheManager::new(true);
        let vdb = VdbIdentity::new("default", "never-initialized");

        assert!(manager.get_cert_cache_for_vdb(&vdb).is_none());
        assert_eq!(manager.get_password(&vdb), None);
        manager.set_password(&vdb, "pw");
        manager.delete_password(&vdb);
        manager.destroy_cache_for_vdb(&vdb);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_destroy_then_init_starts_fresh() {
        let manager = CacheManager::new(true);
        let vdb = VdbIdentity::new("default", "vertica-sample");

        let old = manager.init_cache_for_vdb(&vdb, 60, fetcher());
        old.save_cert("nma-tls", tls_secret()).unwrap();
        manager.set_password(&vdb, "pw");

        manager.destroy_cache_for_vdb(&vdb);
        assert!(manager.get_cert_cache_for_vdb(&vdb).is_none());

        let fresh = manager.init_cache_for_vdb(&vdb, 60, fetcher());
        assert!(!Arc::ptr_eq(&old, &fresh));
        assert!(!fresh.contains_entry("nma-tls"));
        assert_eq!(manager.get_password(&vdb), None);
    }

    #[test]
    fn test_passwords_do_not_leak_across_identities() {
        let manager = CacheManager::new(true);
        let a = VdbIdentity::new("default", "a");
        let b = VdbIdentity::new("default", "b");
        manager.init_cache_for_vdb(&a, 60, fetcher());
        manager.init_cache_for_vdb(&b, 60, fetcher());

        manager.set_password(&a, "pw1");

        assert_eq!(manager.get_password(&a).as_deref(), Some("pw1"));
        assert_eq!(manager.get_password(&b), None);

        manager.delete_password(&a);
        assert_eq!(manager.get_password(&a), None);
    }

    #[test]
    fn test_same_name_in_different_namespaces() {
        let manager = CacheManager::new(true);
        let one = VdbIdentity::new("ns1", "vdb");
        let two = VdbIdentity::new("ns2", "vdb");

        let c1 = manager.init_cache_for_vdb(&one, 60, fetcher());
        let c2 = manager.init_cache_for_vdb(&two, 60, fetcher());

        assert!(!Arc::ptr_eq(&c1, &c2));
        assert_eq!(c2.namespace(), "ns2");
        assert_eq!(manager.identities(), vec![one, two]);
    }

    #[test]
    fn test_disabled_manager_hands_out_disabled_caches() {
        let manager = CacheManager::new(false);
        let vdb = VdbIdentity::new("default", "vertica-sample");
        let cache = manager.init_cache_for_vdb(&vdb, 60, fetcher());

        manager.set_password(&vdb, "pw");

        assert!(!cache.is_enabled());
        assert_eq!(manager.get_password(&vdb), None);
    }

    #[test]
    fn test_configured_default_ttl_applies_without_annotation() {
        let config = CacheConfig {
            enabled: true,
            default_ttl_seconds: 10,
        };
        let manager = CacheManager::from_config(&config);
        let vdb = VdbIdentity::new("default", "vertica-sample");
        let meta = ObjectMeta {
            name: Some(vdb.name.clone()),
            namespace: Some(vdb.namespace.clone()),
            ..Default::default()
        };

        let cache = manager.init_cache_for_vdb(&vdb, manager.ttl_seconds_for(&meta), fetcher());

        assert_eq!(manager.default_ttl_seconds(), 10);
        assert_eq!(cache.ttl(), Duration::from_secs(10));
    }

    #[test]
    fn test_annotation_overrides_configured_default() {
        let manager = CacheManager::with_default_ttl(true, 10);
        let meta = ObjectMeta {
            annotations: Some(BTreeMap::from([(
                crate::identity::TLS_CACHE_DURATION_ANNOTATION.to_string(),
                "90".to_string(),
            )])),
            ..Default::default()
        };

        assert_eq!(manager.ttl_seconds_for(&meta), 90);
        assert_eq!(CacheManager::new(true).ttl_seconds_for(&ObjectMeta::default()), 3600);
    }
}
