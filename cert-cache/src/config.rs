//! Cache configuration
//!
//! Sources, lowest precedence first: built-in defaults, an optional file
//! (any format the `config` crate understands), then `CERT_CACHE__*`
//! environment variables (`CERT_CACHE__ENABLED=false`).

use crate::error::Result;
use crate::identity::DEFAULT_TLS_CACHE_DURATION_SECS;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_PREFIX: &str = "CERT_CACHE";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Global switch; when off every cache is a pass-through
    pub enabled: bool,

    /// TTL used when a VerticaDB carries no cache-duration annotation
    pub default_ttl_seconds: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl_seconds: DEFAULT_TLS_CACHE_DURATION_SECS,
        }
    }
}

impl CacheConfig {
    /// # Errors
    ///
    /// Fails when `path` is given but unreadable, or a value has the wrong
    /// type.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();
        let mut builder = ::config::Config::builder()
            .set_default("enabled", defaults.enabled)?
            .set_default("default_ttl_seconds", defaults.default_ttl_seconds)?;

        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
