//! Configuration for the subgraph pool cache
//!
//! Loaded from an optional TOML file with `POOL_CACHE_*` environment overrides,
//! e.g. `POOL_CACHE_BUCKET=prod-pools` or `POOL_CACHE_STORE__KIND=http`.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::chain::{ChainId, Protocol};
use crate::error::{PoolCacheError, Result};
use crate::local_cache::DEFAULT_POOL_CACHE_TTL;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolCacheConfig {
    /// Bucket holding the published pool snapshots
    pub bucket: String,

    /// Prefix of every snapshot key
    pub base_key: String,

    /// Chains to serve pools for
    pub chains: Vec<ChainId>,

    /// Protocols to warm on startup
    pub protocols: Vec<Protocol>,

    /// Local cache TTL in seconds
    pub cache_ttl_secs: u64,

    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Which client reads the durable store
    pub kind: StoreKind,

    /// Endpoint override. Required for `http`; for `s3` it points the SDK at
    /// an S3-compatible service (path-style addressing) instead of AWS.
    pub endpoint: Option<String>,

    /// AWS region for `s3`; falls back to the ambient AWS configuration
    pub region: Option<String>,

    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
}

/// Durable store client selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// AWS S3 through the SDK, signed with the ambient credential chain
    #[default]
    S3,
    /// Unsigned path-style GETs, for gateways and public buckets
    Http,
}

impl Default for PoolCacheConfig {
    fn default() -> Self {
        Self {
            bucket: "pool-cache".to_string(),
            base_key: "poolCache.json".to_string(),
            chains: vec![ChainId::Mainnet],
            protocols: vec![Protocol::V3, Protocol::V2],
            cache_ttl_secs: DEFAULT_POOL_CACHE_TTL.as_secs(),
            store: StoreConfig::default(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::S3,
            endpoint: None,
            region: None,
            request_timeout_ms: 10000,
        }
    }
}

impl PoolCacheConfig {
    /// Load configuration from an optional file, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading pool cache config: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("POOL_CACHE")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("chains")
                .with_list_parse_key("protocols")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| PoolCacheError::Configuration(format!("failed to build configuration: {}", e)))?;

        config
            .try_deserialize()
            .map_err(|e| PoolCacheError::Configuration(format!("failed to deserialize configuration: {}", e)))
    }

    /// Reject configurations the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            return Err(PoolCacheError::Configuration("bucket must not be empty".to_string()));
        }
        if self.base_key.trim().is_empty() {
            return Err(PoolCacheError::Configuration("base_key must not be empty".to_string()));
        }
        if self.chains.is_empty() {
            return Err(PoolCacheError::Configuration("at least one chain is required".to_string()));
        }
        if self.cache_ttl_secs == 0 {
            return Err(PoolCacheError::Configuration("cache_ttl_secs must be positive".to_string()));
        }
        match (&self.store.endpoint, self.store.kind) {
            (None, StoreKind::Http) => {
                return Err(PoolCacheError::Configuration(
                    "http store requires store.endpoint".to_string(),
                ));
            }
            (Some(endpoint), _) if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) => {
                return Err(PoolCacheError::Configuration(format!(
                    "store endpoint must be an http(s) URL: {}",
                    endpoint
                )));
            }
            _ => {}
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = PoolCacheConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.store.kind, StoreKind::S3);
        assert!(config.store.endpoint.is_none());
        assert_eq!(config.cache_ttl(), Duration::from_secs(240));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("pool_cache.toml");

        let config_content = r#"
bucket = "routing-pools"
base_key = "poolCache.json"
chains = [1, 137, 42161]
protocols = ["V3"]

[store]
kind = "http"
endpoint = "https://pools.example.com"
request_timeout_ms = 5000
"#;

        fs::write(&config_path, config_content).unwrap();

        let config = PoolCacheConfig::load(Some(&config_path)).unwrap();

        assert_eq!(config.bucket, "routing-pools");
        assert_eq!(
            config.chains,
            vec![ChainId::Mainnet, ChainId::Polygon, ChainId::Arbitrum]
        );
        assert_eq!(config.protocols, vec![Protocol::V3]);
        assert_eq!(config.store.kind, StoreKind::Http);
        assert_eq!(config.store.endpoint.as_deref(), Some("https://pools.example.com"));
        assert_eq!(config.store.request_timeout_ms, 5000);
        // Not in the file, falls back to the default
        assert_eq!(config.cache_ttl_secs, 240);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_chain_is_rejected() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("pool_cache.toml");
        fs::write(&config_path, "chains = [999]\n").unwrap();

        let err = PoolCacheConfig::load(Some(&config_path)).unwrap_err();
        assert!(matches!(err, PoolCacheError::Configuration(_)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = PoolCacheConfig {
            bucket: "".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PoolCacheConfig {
            cache_ttl_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PoolCacheConfig {
            store: StoreConfig {
                endpoint: Some("s3://bucket".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PoolCacheConfig {
            store: StoreConfig {
                kind: StoreKind::Http,
                endpoint: None,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
