//! TLS bundles shaped from raw secret payloads

use crate::error::{CacheError, Result};
use secrecy::SecretString;
use secrets_service::SecretData;

/// `corev1.TLSPrivateKeyKey`
pub const TLS_PRIVATE_KEY_KEY: &str = "tls.key";
/// `corev1.TLSCertKey`
pub const TLS_CERT_KEY: &str = "tls.crt";
pub const CA_CERT_KEY: &str = "ca.crt";

/// Key, certificate and CA used to talk HTTPS to the database agents.
#[derive(Debug)]
pub struct HttpsCerts {
    pub key: SecretString,
    pub cert: String,
    pub ca_cert: String,
}

impl HttpsCerts {
    /// Pick the three well-known entries out of a TLS secret.
    ///
    /// # Errors
    ///
    /// `MalformedSecret` if an entry is missing, empty or not UTF-8.
    pub fn from_secret_data(secret_name: &str, data: &SecretData) -> Result<Self> {
        Ok(Self {
            key: SecretString::new(pem_entry(secret_name, data, TLS_PRIVATE_KEY_KEY)?),
            cert: pem_entry(secret_name, data, TLS_CERT_KEY)?,
            ca_cert: pem_entry(secret_name, data, CA_CERT_KEY)?,
        })
    }
}

fn pem_entry(secret_name: &str, data: &SecretData, key: &str) -> Result<String> {
    let bytes = data
        .get(key)
        .ok_or_else(|| CacheError::malformed(secret_name, format!("missing key {key}")))?;

    if bytes.is_empty() {
        return Err(CacheError::malformed(secret_name, format!("key {key} is empty")));
    }

    String::from_utf8(bytes.clone())
        .map_err(|_| CacheError::malformed(secret_name, format!("key {key} is not valid UTF-8")))
}
