//! Secret backend implementations

pub mod aws;
pub mod kubernetes;
pub mod memory;

pub use aws::AwsSecretsManagerBackend;
pub use kubernetes::KubernetesSecretBackend;
pub use memory::StaticSecretBackend;
