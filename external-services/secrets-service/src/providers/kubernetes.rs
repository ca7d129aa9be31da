//! Kubernetes Secrets backend

use crate::{Result, SecretBackend, SecretData, SecretSource, SecretsError};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use tracing::debug;

pub struct KubernetesSecretBackend {
    client: Client,
}

impl KubernetesSecretBackend {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretBackend for KubernetesSecretBackend {
    fn source(&self) -> SecretSource {
        SecretSource::Kubernetes
    }

    async fn fetch(&self, namespace: &str, name: &str) -> Result<SecretData> {
        debug!("Getting secret from Kubernetes: {}/{}", namespace, name);

        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let secret = api.get(name).await.map_err(|e| match e {
            kube::Error::Api(ref response) if response.code == 404 => {
                SecretsError::NotFound(format!("{namespace}/{name}"))
            }
            other => SecretsError::Kube(other),
        })?;

        Ok(secret_payload(secret))
    }
}

/// Flatten a Secret into its raw entries. `stringData` wins over `data`, the
/// same precedence the API server applies on write.
fn secret_payload(secret: Secret) -> SecretData {
    let mut payload: SecretData = secret
        .data
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, value.0))
        .collect();

    for (key, value) in secret.string_data.unwrap_or_default() {
        payload.insert(key, value.into_bytes());
    }

    payload
}
