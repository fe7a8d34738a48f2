//! Error types for the subgraph pool cache

use crate::chain::Protocol;
use crate::store::StoreError;
use thiserror::Error;

/// Result type alias for pool cache operations
pub type Result<T> = std::result::Result<T, PoolCacheError>;

/// Main error type for pool cache operations.
///
/// Nothing in the fetch path is retried or swallowed: every variant reaches
/// the caller of `get_pools()`.
#[derive(Debug, Error)]
pub enum PoolCacheError {
    /// The durable store call failed or returned nothing usable
    #[error("Could not get subgraph pool cache from {bucket}/{key} for protocol {protocol}: {cause}")]
    RemoteFetch {
        /// Bucket the object was requested from
        bucket: String,
        /// Durable object key
        key: String,
        /// Protocol the snapshot was requested for
        protocol: Protocol,
        /// What went wrong
        cause: RemoteFetchCause,
    },

    /// The payload is not a JSON array of the expected record type
    #[error("Failed to parse subgraph pools from {bucket}/{key} for protocol {protocol}: {source}")]
    Deserialization {
        /// Bucket the object was read from
        bucket: String,
        /// Durable object key
        key: String,
        /// Protocol the snapshot was requested for
        protocol: Protocol,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Invalid service configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Why a remote fetch produced no pools
#[derive(Debug, Clone, Error)]
pub enum RemoteFetchCause {
    /// The store client call itself failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The object exists but carries no body
    #[error("object has no retrievable body")]
    MissingBody,
}

impl PoolCacheError {
    /// True for failures talking to, or reading from, the durable store
    pub fn is_remote_fetch(&self) -> bool {
        matches!(self, PoolCacheError::RemoteFetch { .. })
    }

    /// True when the snapshot was fetched but could not be parsed
    pub fn is_deserialization(&self) -> bool {
        matches!(self, PoolCacheError::Deserialization { .. })
    }
}
