//! Protocol adapters over the pool cache core
//!
//! Each adapter is a fixed (chain, bucket, base key) binding plus the protocol
//! tag of its record type. It holds no cache state of its own.

use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::chain::{ChainId, Protocol};
use crate::error::Result;
use crate::fetcher::PoolCacheCore;
use crate::pools::{SubgraphPool, V2SubgraphPool, V3SubgraphPool};

/// Source of subgraph pools for the routing layer
#[async_trait]
pub trait SubgraphProvider: Send + Sync {
    type Pool: Send + Sync;

    async fn get_pools(&self) -> Result<Arc<Vec<Self::Pool>>>;
}

/// Store-backed provider for one chain and one pool schema
pub struct SubgraphPoolProvider<T> {
    core: Arc<PoolCacheCore>,
    chain: ChainId,
    bucket: String,
    base_key: String,
    _pool: PhantomData<fn() -> T>,
}

pub type V2SubgraphProvider = SubgraphPoolProvider<V2SubgraphPool>;
pub type V3SubgraphProvider = SubgraphPoolProvider<V3SubgraphPool>;

impl<T: SubgraphPool> SubgraphPoolProvider<T> {
    pub fn new(
        core: Arc<PoolCacheCore>,
        chain: ChainId,
        bucket: impl Into<String>,
        base_key: impl Into<String>,
    ) -> Self {
        Self {
            core,
            chain,
            bucket: bucket.into(),
            base_key: base_key.into(),
            _pool: PhantomData,
        }
    }

    /// Warm the local cache from the store, then return a ready provider.
    ///
    /// Fails if the warm-up fetch fails; no provider is returned in that case.
    pub async fn eager_build(
        core: Arc<PoolCacheCore>,
        bucket: &str,
        base_key: &str,
        chain: ChainId,
    ) -> Result<Self> {
        core.cache_pools_from_remote::<T>(bucket, base_key, chain, T::PROTOCOL)
            .await?;

        Ok(Self::new(core, chain, bucket, base_key))
    }

    /// Pools for this provider's chain, local cache first
    pub async fn get_pools(&self) -> Result<Arc<Vec<T>>> {
        self.core
            .fetch_pools::<T>(self.chain, T::PROTOCOL, &self.bucket, &self.base_key)
            .await
    }

    pub fn chain(&self) -> ChainId {
        self.chain
    }

    pub fn protocol(&self) -> Protocol {
        T::PROTOCOL
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn base_key(&self) -> &str {
        &self.base_key
    }
}

impl<T> Clone for SubgraphPoolProvider<T> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            chain: self.chain,
            bucket: self.bucket.clone(),
            base_key: self.base_key.clone(),
            _pool: PhantomData,
        }
    }
}

#[async_trait]
impl<T: SubgraphPool> SubgraphProvider for SubgraphPoolProvider<T> {
    type Pool = T;

    async fn get_pools(&self) -> Result<Arc<Vec<T>>> {
        SubgraphPoolProvider::<T>::get_pools(self).await
    }
}
