//! Configuration for secrets service

use serde::{Deserialize, Serialize};

/// Which secret stores the operator may read from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    pub kubernetes: KubernetesConfig,

    /// AWS Secrets Manager, used for `awssm://` references
    pub aws: Option<AwsSecretsManagerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KubernetesConfig {
    /// Read plain secret names from the Kubernetes API server
    pub enabled: bool,
}

impl Default for KubernetesConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsSecretsManagerConfig {
    pub region: String,
    #[serde(default)]
    pub endpoint_url: Option<String>,
}
