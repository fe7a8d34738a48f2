//! Subgraph Pool Cache
//!
//! Serves subgraph pool snapshots to the router from a two-tier cache:
//! a process-local tier with a fixed TTL in front of a durable object store
//! that offline jobs publish snapshots to.
//!
//! Features:
//! - Generic read-through fetch shared by every pool schema
//! - V2 and V3 providers bound to a chain, bucket, and base key
//! - Eager warm-up so the first router request is served locally
//! - Fail-fast store access: one attempt, errors surface to the caller
//! - Signed S3 reads through the AWS SDK, or unsigned HTTP for gateways

pub mod chain;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod keys;
pub mod local_cache;
pub mod pools;
pub mod provider;
pub mod store;

pub use chain::{ChainId, Protocol};
pub use config::{PoolCacheConfig, StoreConfig, StoreKind};
pub use error::{PoolCacheError, RemoteFetchCause, Result};
pub use fetcher::PoolCacheCore;
pub use local_cache::{LocalPoolCache, DEFAULT_POOL_CACHE_TTL};
pub use pools::{PoolRecord, SubgraphPool, SubgraphToken, V2SubgraphPool, V3SubgraphPool};
pub use provider::{SubgraphPoolProvider, SubgraphProvider, V2SubgraphProvider, V3SubgraphProvider};
pub use store::{
    GetObjectOutput, HttpObjectStore, InMemoryObjectStore, ObjectStore, S3ObjectStore, StoreError,
};
