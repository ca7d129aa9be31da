//! Secret fetcher that routes each reference to the store its prefix names

use crate::{
    config::FetcherConfig,
    providers::{AwsSecretsManagerBackend, KubernetesSecretBackend},
    source::{SecretRef, SecretSource},
    Result, SecretBackend, SecretData, SecretFetcher, SecretsError,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Default)]
pub struct MultiSourceSecretFetcher {
    backends: HashMap<SecretSource, Arc<dyn SecretBackend>>,
}

impl MultiSourceSecretFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the backends enabled in `config`.
    ///
    /// # Errors
    ///
    /// Fails when no source is enabled, or when a backend client cannot be
    /// constructed (no kubeconfig / in-cluster service account, bad AWS setup).
    pub async fn from_config(config: &FetcherConfig) -> Result<Self> {
        let mut fetcher = Self::new();

        if config.kubernetes.enabled {
            info!("Initializing Kubernetes secret backend");
            let client = kube::Client::try_default().await?;
            fetcher.register(Arc::new(KubernetesSecretBackend::new(client)));
        }

        if let Some(aws_config) = &config.aws {
            info!(region = %aws_config.region, "Initializing AWS Secrets Manager backend");
            let backend = AwsSecretsManagerBackend::new(aws_config.clone()).await;
            fetcher.register(Arc::new(backend));
        }

        if fetcher.backends.is_empty() {
            return Err(SecretsError::ConfigurationError(
                "No secret sources configured".to_string(),
            ));
        }

        Ok(fetcher)
    }

    #[must_use]
    pub fn with_backend(mut self, backend: Arc<dyn SecretBackend>) -> Self {
        self.register(backend);
        self
    }

    /// Register a backend, replacing any earlier one for the same source.
    pub fn register(&mut self, backend: Arc<dyn SecretBackend>) {
        let source = backend.source();
        if self.backends.insert(source, backend).is_some() {
            debug!(%source, "Replaced secret backend");
        }
    }

    pub fn sources(&self) -> Vec<SecretSource> {
        self.backends.keys().copied().collect()
    }
}

#[async_trait]
impl SecretFetcher for MultiSourceSecretFetcher {
    async fn fetch(&self, namespace: &str, name: &str) -> Result<SecretData> {
        let secret_ref = SecretRef::parse(name);

        let backend = self.backends.get(&secret_ref.source).ok_or_else(|| {
            SecretsError::UnsupportedSource {
                source_name: secret_ref.source.to_string(),
                secret: name.to_string(),
            }
        })?;

        debug!(
            source = %secret_ref.source,
            namespace,
            secret = secret_ref.name,
            "Fetching secret"
        );

        match backend.fetch(namespace, secret_ref.name).await {
            Ok(data) => Ok(data),
            Err(e) => {
                if e.is_not_found() {
                    debug!(source = %secret_ref.source, namespace, secret = secret_ref.name, "Secret not found");
                } else {
                    warn!(source = %secret_ref.source, namespace, secret = secret_ref.name, error = %e, "Secret fetch failed");
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MockSecretBackend, StaticSecretBackend};

    fn tls_data() -> SecretData {
        SecretData::from([("tls.crt".to_string(), b"cert".to_vec())])
    }

    #[tokio::test]
    async fn test_plain_name_routes_to_kubernetes_store() {
        let store = StaticSecretBackend::new(SecretSource::Kubernetes);
        store.insert("default", "nma-tls", tls_data());
        let fetcher = MultiSourceSecretFetcher::new().with_backend(Arc::new(store));

        let data = fetcher.fetch("default", "nma-tls").await.unwrap();
        assert_eq!(data, tls_data());
    }

    #[tokio::test]
    async fn test_prefix_is_stripped_before_backend_lookup() {
        let store = StaticSecretBackend::new(SecretSource::AwsSecretsManager);
        store.insert("default", "my-secret-arn", tls_data());
        let fetcher = MultiSourceSecretFetcher::new().with_backend(Arc::new(store));

        let data = fetcher.fetch("default", "awssm://my-secret-arn").await.unwrap();
        assert_eq!(data, tls_data());
    }

    #[tokio::test]
    async fn test_unregistered_source_is_rejected() {
        let mut k8s = MockSecretBackend::new();
        k8s.expect_source().return_const(SecretSource::Kubernetes);
        k8s.expect_fetch().times(0);
        let fetcher = MultiSourceSecretFetcher::new().with_backend(Arc::new(k8s));

        let err = fetcher
            .fetch("default", "gsm://projects/1/secrets/su/versions/1")
            .await
            .unwrap_err();

        match err {
            SecretsError::UnsupportedSource { source_name, .. } => {
                assert_eq!(source_name, "google-secret-manager");
            }
            other => panic!("Expected UnsupportedSource, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_backend_errors_propagate() {
        let mut k8s = MockSecretBackend::new();
        k8s.expect_source().return_const(SecretSource::Kubernetes);
        k8s.expect_fetch()
            .times(1)
            .returning(|_, _| Err(SecretsError::ProviderError("connection refused".to_string())));
        let fetcher = MultiSourceSecretFetcher::new().with_backend(Arc::new(k8s));

        let err = fetcher.fetch("default", "nma-tls").await.unwrap_err();
        assert!(matches!(err, SecretsError::ProviderError(_)));
    }

    #[tokio::test]
    async fn test_register_replaces_backend_for_same_source() {
        let first = StaticSecretBackend::new(SecretSource::Kubernetes);
        first.insert("default", "s", SecretData::new());
        let second = StaticSecretBackend::new(SecretSource::Kubernetes);
        second.insert("default", "s", tls_data());

        let fetcher = MultiSourceSecretFetcher::new()
            .with_backend(Arc::new(first))
            .with_backend(Arc::new(second));

        assert_eq!(fetcher.sources(), vec![SecretSource::Kubernetes]);
        assert_eq!(fetcher.fetch("default", "s").await.unwrap(), tls_data());
    }
}
