//! Per-database TLS certificate and password cache for the VerticaDB operator
//!
//! Every reconcile of a VerticaDB needs the TLS bundle used to talk to the
//! database agents, and often the superuser password. Reading those secrets
//! from Kubernetes (or an external secret manager) on every pass is wasteful,
//! so they are cached per database with a configurable TTL.
//!
//! # Layers
//!
//! - [`ItemCache`]: generic mutex-guarded TTL store with lazy eviction
//! - [`VdbCache`]: one per VerticaDB; TLS bundles by secret name plus one
//!   password, backed by an injected [`SecretFetcher`]
//! - [`CacheManager`]: registry from [`VdbIdentity`] to [`VdbCache`], shared by
//!   all reconcilers
//!
//! # Example
//!
//! ```rust,no_run
//! use cert_cache::{CacheManager, VdbIdentity};
//! use secrets_service::{FetcherConfig, MultiSourceSecretFetcher};
//! use std::sync::Arc;
//!
//! # async fn reconcile(manager: Arc<CacheManager>, meta: &k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta) -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Arc::new(MultiSourceSecretFetcher::from_config(&FetcherConfig::default()).await?);
//! let vdb = VdbIdentity::try_from(meta)?;
//!
//! manager.init_cache_for_vdb(&vdb, manager.ttl_seconds_for(meta), fetcher);
//!
//! if let Some(cache) = manager.get_cert_cache_for_vdb(&vdb) {
//!     let certs = cache.read_cert_bundle("nma-tls").await?;
//!     println!("CA is {} bytes", certs.ca_cert.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod certs;
pub mod config;
pub mod error;
pub mod identity;
pub mod item_cache;
pub mod manager;
pub mod password;
pub mod vdb_cache;

pub use certs::HttpsCerts;
pub use crate::config::CacheConfig;
pub use error::{CacheError, Result};
pub use identity::{tls_cache_duration, tls_cache_duration_for, VdbIdentity};
pub use item_cache::ItemCache;
pub use manager::CacheManager;
pub use password::resolve_superuser_password;
pub use vdb_cache::VdbCache;

pub use secrets_service::SecretFetcher;
