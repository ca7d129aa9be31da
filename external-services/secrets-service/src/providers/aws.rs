//! AWS Secrets Manager backend implementation

use crate::config::AwsSecretsManagerConfig;
use crate::{Result, SecretBackend, SecretData, SecretSource, SecretsError};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_secretsmanager::Client;
use tracing::debug;

pub struct AwsSecretsManagerBackend {
    client: Client,
}

impl AwsSecretsManagerBackend {
    pub async fn new(config: AwsSecretsManagerConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_sdk_secretsmanager::config::Region::new(config.region));

        if let Some(endpoint_url) = config.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }

        let sdk_config = loader.load().await;
        Self {
            client: Client::new(&sdk_config),
        }
    }
}

#[async_trait]
impl SecretBackend for AwsSecretsManagerBackend {
    fn source(&self) -> SecretSource {
        SecretSource::AwsSecretsManager
    }

    /// AWS secrets are not namespaced; `namespace` is ignored.
    async fn fetch(&self, _namespace: &str, name: &str) -> Result<SecretData> {
        debug!("Getting secret from AWS Secrets Manager: {}", name);

        let response = self
            .client
            .get_secret_value()
            .secret_id(name)
            .send()
            .await
            .map_err(|e| {
                let not_found = e
                    .as_service_error()
                    .is_some_and(|se| se.is_resource_not_found_exception());
                if not_found {
                    SecretsError::NotFound(name.to_string())
                } else {
                    SecretsError::ProviderError(format!("AWS Secrets Manager error: {e}"))
                }
            })?;

        let value = response.secret_string().ok_or_else(|| {
            SecretsError::InvalidFormat(format!("secret {name} has no string value"))
        })?;

        parse_secret_string(name, value)
    }
}

/// AWS stores multi-entry secrets as a JSON object of key/value pairs.
fn parse_secret_string(name: &str, value: &str) -> Result<SecretData> {
    let parsed: serde_json::Value = serde_json::from_str(value)?;
    let serde_json::Value::Object(entries) = parsed else {
        return Err(SecretsError::InvalidFormat(format!(
            "secret {name} is not a JSON object"
        )));
    };

    Ok(entries
        .into_iter()
        .map(|(key, value)| {
            let bytes = match value {
                serde_json::Value::String(s) => s.into_bytes(),
                other => other.to_string().into_bytes(),
            };
            (key, bytes)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_secret() {
        let data = parse_secret_string(
            "su",
            r#"{"password": "s3cret", "port": 5433}"#,
        )
        .unwrap();

        assert_eq!(data["password"], b"s3cret".to_vec());
        assert_eq!(data["port"], b"5433".to_vec());
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let err = parse_secret_string("su", r#""just-a-string""#).unwrap_err();
        assert!(matches!(err, SecretsError::InvalidFormat(_)));
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let err = parse_secret_string("su", "not json").unwrap_err();
        assert!(matches!(err, SecretsError::Serde(_)));
    }
}
