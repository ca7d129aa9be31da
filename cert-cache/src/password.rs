//! Superuser password resolution

use crate::error::{CacheError, Result};
use crate::identity::VdbIdentity;
use crate::manager::CacheManager;
use secrets_service::SecretFetcher;
use tracing::debug;

/// Entry in the password secret that holds the superuser password
pub const SUPERUSER_PASSWORD_KEY: &str = "password";

/// Superuser password for a VerticaDB.
///
/// An empty `secret_name` means the database has no password. Otherwise the
/// cached password is used unless `skip_cache` is set; on a fetch the result
/// is cached only when `skip_cache` is unset. Callers reading a rotated
/// secret pass `skip_cache` and store the new password themselves once the
/// database has accepted it.
///
/// # Errors
///
/// Fetch failures pass through; a secret without a UTF-8 `password` entry
/// yields `MalformedSecret`.
pub async fn resolve_superuser_password(
    manager: &CacheManager,
    identity: &VdbIdentity,
    fetcher: &dyn SecretFetcher,
    secret_name: &str,
    skip_cache: bool,
) -> Result<String> {
    if secret_name.is_empty() {
        return Ok(String::new());
    }

    if !skip_cache {
        if let Some(password) = manager.get_password(identity) {
            debug!(vdb = %identity, "Superuser password served from cache");
            return Ok(password);
        }
    }

    let data = fetcher.fetch(&identity.namespace, secret_name).await?;
    let bytes = data.get(SUPERUSER_PASSWORD_KEY).ok_or_else(|| {
        CacheError::malformed(secret_name, format!("missing key {SUPERUSER_PASSWORD_KEY}"))
    })?;
    let password = String::from_utf8(bytes.clone()).map_err(|_| {
        CacheError::malformed(secret_name, format!("key {SUPERUSER_PASSWORD_KEY} is not valid UTF-8"))
    })?;

    if !skip_cache {
        manager.set_password(identity, password.clone());
    }

    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrets_service::{MultiSourceSecretFetcher, SecretData, SecretSource, StaticSecretBackend};
    use std::sync::Arc;

    struct Fixture {
        store: Arc<StaticSecretBackend>,
        fetcher: Arc<dyn SecretFetcher>,
        manager: CacheManager,
        vdb: VdbIdentity,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(StaticSecretBackend::new(SecretSource::Kubernetes));
        let fetcher: Arc<dyn SecretFetcher> =
            Arc::new(MultiSourceSecretFetcher::new().with_backend(store.clone()));
        let manager = CacheManager::new(true);
        let vdb = VdbIdentity::new("default", "vertica-sample");
        manager.init_cache_for_vdb(&vdb, 60, Arc::clone(&fetcher));
        Fixture { store, fetcher, manager, vdb }
    }

    fn password_secret(password: &str) -> SecretData {
        SecretData::from([(SUPERUSER_PASSWORD_KEY.to_string(), password.as_bytes().to_vec())])
    }

    #[tokio::test]
    async fn test_empty_secret_name_means_no_password() {
        let f = fixture();
        let password =
            resolve_superuser_password(&f.manager, &f.vdb, f.fetcher.as_ref(), "", false)
                .await
                .unwrap();

        assert_eq!(password, "");
        assert_eq!(f.store.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_password_is_cached_after_first_read() {
        let f = fixture();
        f.store.insert("default", "su-passwd", password_secret("pw1"));

        for _ in 0..3 {
            let password =
                resolve_superuser_password(&f.manager, &f.vdb, f.fetcher.as_ref(), "su-passwd", false)
                    .await
                    .unwrap();
            assert_eq!(password, "pw1");
        }

        assert_eq!(f.store.fetch_count(), 1);
        assert_eq!(f.manager.get_password(&f.vdb).as_deref(), Some("pw1"));
    }

    #[tokio::test]
    async fn test_skip_cache_reads_new_secret_without_storing() {
        let f = fixture();
        f.manager.set_password(&f.vdb, "old");
        f.store.insert("default", "new-passwd", password_secret("new"));

        let password =
            resolve_superuser_password(&f.manager, &f.vdb, f.fetcher.as_ref(), "new-passwd", true)
                .await
                .unwrap();

        assert_eq!(password, "new");
        assert_eq!(f.manager.get_password(&f.vdb).as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn test_missing_password_key() {
        let f = fixture();
        f.store.insert("default", "su-passwd", SecretData::new());

        let err =
            resolve_superuser_password(&f.manager, &f.vdb, f.fetcher.as_ref(), "su-passwd", false)
                .await
                .unwrap_err();

        assert!(matches!(err, CacheError::MalformedSecret { .. }));
        assert_eq!(f.manager.get_password(&f.vdb), None);
    }

    #[tokio::test]
    async fn test_uninitialized_vdb_still_resolves() {
        let f = fixture();
        let other = VdbIdentity::new("default", "not-initialized");
        f.store.insert("default", "su-passwd", password_secret("pw"));

        let password =
            resolve_superuser_password(&f.manager, &other, f.fetcher.as_ref(), "su-passwd", false)
                .await
                .unwrap();

        assert_eq!(password, "pw");
        assert_eq!(f.manager.get_password(&other), None);
    }
}
