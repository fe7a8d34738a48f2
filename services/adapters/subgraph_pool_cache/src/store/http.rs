//! Unsigned object store client over plain HTTP
//!
//! Issues path-style `GET {endpoint}/{bucket}/{key}` requests for gateways that
//! sign on our behalf and for public-read buckets. Use [`super::S3ObjectStore`]
//! for private buckets.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use tracing::debug;

use super::{GetObjectOutput, ObjectStore, StoreError};
use crate::config::StoreConfig;
use crate::error::{PoolCacheError, Result};

pub struct HttpObjectStore {
    client: Client,
    endpoint: Url,
}

impl HttpObjectStore {
    /// Create a client for the configured endpoint
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let endpoint = config.endpoint.as_deref().ok_or_else(|| {
            PoolCacheError::Configuration("http store requires store.endpoint".to_string())
        })?;
        let endpoint = Url::parse(endpoint)
            .map_err(|e| PoolCacheError::Configuration(format!("invalid store endpoint {}: {}", endpoint, e)))?;
        if endpoint.cannot_be_a_base() {
            return Err(PoolCacheError::Configuration(format!(
                "store endpoint cannot carry a path: {}",
                endpoint
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| PoolCacheError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, endpoint })
    }

    /// Bucket and key each become one percent-encoded path segment
    fn object_url(&self, bucket: &str, key: &str) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(bucket).push(key);
        }
        url
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> std::result::Result<GetObjectOutput, StoreError> {
        let url = self.object_url(bucket, key);
        debug!(%url, "Requesting object");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| StoreError::Transport(e.to_string()))?;
                debug!(%url, bytes = body.len(), "Object received");
                Ok(GetObjectOutput { body: Some(body) })
            }
            StatusCode::NOT_FOUND => Err(StoreError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(StoreError::AccessDenied {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
            status => Err(StoreError::UnexpectedStatus {
                status: status.as_u16(),
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreKind;
    use mockito::Server;

    fn store_for(endpoint: String) -> HttpObjectStore {
        HttpObjectStore::new(&StoreConfig {
            kind: StoreKind::Http,
            endpoint: Some(endpoint),
            request_timeout_ms: 2000,
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_object_returns_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/route-pools/poolCache.json-1-V3")
            .with_status(200)
            .with_body(r#"[{"id":"0xabc"}]"#)
            .create_async()
            .await;

        let store = store_for(format!("{}/", server.url()));
        let output = store
            .get_object("route-pools", "poolCache.json-1-V3")
            .await
            .unwrap();

        assert_eq!(output.body.unwrap().as_ref(), br#"[{"id":"0xabc"}]"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_status_codes_map_to_store_errors() {
        let mut server = Server::new_async().await;
        let _missing = server
            .mock("GET", "/b/missing")
            .with_status(404)
            .create_async()
            .await;
        let _denied = server
            .mock("GET", "/b/denied")
            .with_status(403)
            .create_async()
            .await;
        let _broken = server
            .mock("GET", "/b/broken")
            .with_status(503)
            .create_async()
            .await;

        let store = store_for(server.url());

        assert_eq!(
            store.get_object("b", "missing").await.unwrap_err(),
            StoreError::NotFound {
                bucket: "b".to_string(),
                key: "missing".to_string()
            }
        );
        assert!(matches!(
            store.get_object("b", "denied").await.unwrap_err(),
            StoreError::AccessDenied { .. }
        ));
        assert!(matches!(
            store.get_object("b", "broken").await.unwrap_err(),
            StoreError::UnexpectedStatus { status: 503, .. }
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let store = store_for("http://127.0.0.1:1".to_string());
        let err = store.get_object("b", "k").await.unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)));
    }

    #[tokio::test]
    async fn test_reserved_characters_in_key_are_encoded() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/b/pools%23v-1-V3")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let store = store_for(server.url());
        let output = store.get_object("b", "pools#v-1-V3").await.unwrap();

        assert_eq!(output.body.unwrap().as_ref(), b"[]");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_endpoint_path_prefix_is_kept() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/gateway/b/pools-1-V2")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let store = store_for(format!("{}/gateway/", server.url()));
        store.get_object("b", "pools-1-V2").await.unwrap();

        mock.assert_async().await;
    }

    #[test]
    fn test_missing_endpoint_is_configuration_error() {
        let result = HttpObjectStore::new(&StoreConfig {
            kind: StoreKind::Http,
            endpoint: None,
            ..Default::default()
        });
        assert!(matches!(result, Err(PoolCacheError::Configuration(_))));
    }
}
