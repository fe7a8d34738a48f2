//! Read-through fetch of subgraph pools
//!
//! Lookup order is local cache, then the durable store. A durable read is
//! parsed in full and written to the local cache before it is returned; on any
//! failure the local cache is left as it was.
//!
//! Two tasks missing on the same chain and record type at once will both read
//! the store and the later write wins. There is no single-flight guard.

use std::sync::Arc;
use tracing::info;

use crate::chain::{ChainId, Protocol};
use crate::error::{PoolCacheError, RemoteFetchCause, Result};
use crate::keys::{durable_key, local_key};
use crate::local_cache::LocalPoolCache;
use crate::pools::PoolRecord;
use crate::store::ObjectStore;

/// Records included in cache-hit log lines
const LOG_SAMPLE_SIZE: usize = 5;

/// Shared cache state for one process: the local tier plus the durable store client
pub struct PoolCacheCore {
    local: Arc<LocalPoolCache>,
    store: Arc<dyn ObjectStore>,
}

impl PoolCacheCore {
    pub fn new(local: Arc<LocalPoolCache>, store: Arc<dyn ObjectStore>) -> Self {
        Self { local, store }
    }

    pub fn local_cache(&self) -> &Arc<LocalPoolCache> {
        &self.local
    }

    /// Get the pools for `chain`, from the local cache if live, else from the store
    pub async fn fetch_pools<T: PoolRecord>(
        &self,
        chain: ChainId,
        protocol: Protocol,
        bucket: &str,
        base_key: &str,
    ) -> Result<Arc<Vec<T>>> {
        if let Some(pools) = self.local.get::<T>(&local_key(chain)) {
            info!(
                sample = ?&pools[..pools.len().min(LOG_SAMPLE_SIZE)],
                count = pools.len(),
                %protocol,
                %chain,
                "Subgraph pools fetched from local cache for protocol {}. Num: {}",
                protocol,
                pools.len()
            );
            return Ok(pools);
        }

        info!(
            bucket,
            key = base_key,
            %protocol,
            %chain,
            "Subgraph pools local cache miss for protocol {}. Getting subgraph pools from store",
            protocol
        );
        self.cache_pools_from_remote(bucket, base_key, chain, protocol)
            .await
    }

    /// Read the snapshot for (`chain`, `protocol`) from the store and cache it locally.
    ///
    /// Skips the local lookup, so it always costs one store call.
    pub async fn cache_pools_from_remote<T: PoolRecord>(
        &self,
        bucket: &str,
        base_key: &str,
        chain: ChainId,
        protocol: Protocol,
    ) -> Result<Arc<Vec<T>>> {
        let key = durable_key(base_key, chain, protocol);

        let output = self
            .store
            .get_object(bucket, &key)
            .await
            .map_err(|e| remote_fetch_error(bucket, &key, protocol, e.into()))?;

        let body = match output.body {
            Some(body) if !body.is_empty() => body,
            _ => {
                return Err(remote_fetch_error(
                    bucket,
                    &key,
                    protocol,
                    RemoteFetchCause::MissingBody,
                ))
            }
        };

        let pools: Vec<T> =
            serde_json::from_slice(&body).map_err(|source| PoolCacheError::Deserialization {
                bucket: bucket.to_string(),
                key: key.clone(),
                protocol,
                source,
            })?;
        let pools = Arc::new(pools);

        info!(
            bucket,
            key = %key,
            chain = %chain,
            %protocol,
            count = pools.len(),
            "Got subgraph pools from store for protocol {} on {}. Num: {}",
            protocol,
            chain,
            pools.len()
        );

        self.local.set(&local_key(chain), Arc::clone(&pools));

        Ok(pools)
    }
}

fn remote_fetch_error(
    bucket: &str,
    key: &str,
    protocol: Protocol,
    cause: RemoteFetchCause,
) -> PoolCacheError {
    PoolCacheError::RemoteFetch {
        bucket: bucket.to_string(),
        key: key.to_string(),
        protocol,
        cause,
    }
}
