//! Durable object store boundary
//!
//! The cache core depends only on get-by-key over a byte blob. Implementations:
//! - [`S3ObjectStore`]: AWS S3 through the SDK with signed requests
//! - [`HttpObjectStore`]: unsigned S3-compatible endpoint over HTTP
//! - [`InMemoryObjectStore`]: process-local objects for tests and local runs

pub mod http;
pub mod memory;
pub mod s3;

pub use http::HttpObjectStore;
pub use memory::InMemoryObjectStore;
pub use s3::S3ObjectStore;

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{StoreConfig, StoreKind};

/// Result of a single object read
#[derive(Debug, Clone, Default)]
pub struct GetObjectOutput {
    /// Object payload, absent when the store returned no body
    pub body: Option<Bytes>,
}

/// Failures reported by an object store client
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Network, timeout, or client-side failure
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Object {bucket}/{key} not found")]
    NotFound { bucket: String, key: String },

    #[error("Access denied to {bucket}/{key}")]
    AccessDenied { bucket: String, key: String },

    #[error("Unexpected status {status} for {bucket}/{key}")]
    UnexpectedStatus {
        status: u16,
        bucket: String,
        key: String,
    },
}

/// Get-by-key access to a remote object store
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the object at `bucket`/`key`. Single attempt, no retry.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<GetObjectOutput, StoreError>;
}

/// Build the store client selected by `config.kind`
pub async fn from_config(config: &StoreConfig) -> crate::error::Result<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = match config.kind {
        StoreKind::S3 => Arc::new(S3ObjectStore::from_env(config).await),
        StoreKind::Http => Arc::new(HttpObjectStore::new(config)?),
    };
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PoolCacheError;

    #[tokio::test]
    async fn test_http_kind_requires_endpoint() {
        let config = StoreConfig {
            kind: StoreKind::Http,
            endpoint: None,
            ..Default::default()
        };
        assert!(matches!(
            from_config(&config).await,
            Err(PoolCacheError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_http_kind_builds_http_store() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/b/k")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let store = from_config(&StoreConfig {
            kind: StoreKind::Http,
            endpoint: Some(server.url()),
            ..Default::default()
        })
        .await
        .unwrap();

        store.get_object("b", "k").await.unwrap();
        mock.assert_async().await;
    }
}
