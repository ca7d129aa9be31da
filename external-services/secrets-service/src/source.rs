//! Secret path references
//!
//! A secret name in a VerticaDB spec either names a Kubernetes Secret in the
//! database's namespace, or carries a path prefix routing it to an external
//! secret manager (`gsm://projects/1/secrets/su/versions/2`).

use serde::{Deserialize, Serialize};
use std::fmt;

pub const GSM_PREFIX: &str = "gsm://";
pub const AWS_SM_PREFIX: &str = "awssm://";
pub const AZURE_KV_PREFIX: &str = "azure://";

/// Backing store a secret reference resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecretSource {
    Kubernetes,
    GoogleSecretManager,
    AwsSecretsManager,
    AzureKeyVault,
}

impl SecretSource {
    pub fn prefix(self) -> Option<&'static str> {
        match self {
            SecretSource::Kubernetes => None,
            SecretSource::GoogleSecretManager => Some(GSM_PREFIX),
            SecretSource::AwsSecretsManager => Some(AWS_SM_PREFIX),
            SecretSource::AzureKeyVault => Some(AZURE_KV_PREFIX),
        }
    }
}

impl fmt::Display for SecretSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SecretSource::Kubernetes => "kubernetes",
            SecretSource::GoogleSecretManager => "google-secret-manager",
            SecretSource::AwsSecretsManager => "aws-secrets-manager",
            SecretSource::AzureKeyVault => "azure-key-vault",
        };
        f.write_str(name)
    }
}

/// A parsed secret reference: where to look, and the name within that store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretRef<'a> {
    pub source: SecretSource,
    pub name: &'a str,
}

impl<'a> SecretRef<'a> {
    pub fn parse(reference: &'a str) -> Self {
        const PREFIXED: [SecretSource; 3] = [
            SecretSource::GoogleSecretManager,
            SecretSource::AwsSecretsManager,
            SecretSource::AzureKeyVault,
        ];

        for source in PREFIXED {
            if let Some(name) = source.prefix().and_then(|p| reference.strip_prefix(p)) {
                return Self { source, name };
            }
        }

        Self {
            source: SecretSource::Kubernetes,
            name: reference,
        }
    }
}
