//! VerticaDB identity and cache-related annotations

use crate::error::{CacheError, Result};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;
use std::fmt;

/// Annotation holding the cert cache TTL in seconds
pub const TLS_CACHE_DURATION_ANNOTATION: &str = "vertica.com/tls-cache-duration";
pub const DEFAULT_TLS_CACHE_DURATION_SECS: i64 = 3600;

/// Namespace and name of one VerticaDB resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VdbIdentity {
    pub namespace: String,
    pub name: String,
}

impl VdbIdentity {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for VdbIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl TryFrom<&ObjectMeta> for VdbIdentity {
    type Error = CacheError;

    fn try_from(meta: &ObjectMeta) -> Result<Self> {
        let namespace = meta
            .namespace
            .clone()
            .ok_or_else(|| CacheError::MissingIdentity("namespace".to_string()))?;
        let name = meta
            .name
            .clone()
            .ok_or_else(|| CacheError::MissingIdentity("name".to_string()))?;
        Ok(Self { namespace, name })
    }
}

/// Cert cache TTL from a VerticaDB's annotations.
///
/// Missing or unparsable values fall back to `default_secs`; negative values
/// clamp to 0, which disables expiry.
pub fn tls_cache_duration(annotations: &BTreeMap<String, String>, default_secs: i64) -> i64 {
    annotations
        .get(TLS_CACHE_DURATION_ANNOTATION)
        .and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(default_secs)
        .max(0)
}

pub fn tls_cache_duration_for(meta: &ObjectMeta, default_secs: i64) -> i64 {
    meta.annotations.as_ref().map_or(default_secs.max(0), |annotations| {
        tls_cache_duration(annotations, default_secs)
    })
}
