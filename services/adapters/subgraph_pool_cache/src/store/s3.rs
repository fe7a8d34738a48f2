//! AWS S3 object store client
//!
//! Signs requests with the ambient AWS credential chain (environment, profile,
//! instance or task role). SDK retries are disabled: one attempt per read.

use async_trait::async_trait;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::{BehaviorVersion, Region};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::Client;
use std::time::Duration;
use tracing::debug;

use super::{GetObjectOutput, ObjectStore, StoreError};
use crate::config::StoreConfig;

pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Build a client from the ambient AWS configuration plus `config` overrides
    pub async fn from_env(config: &StoreConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared)
            .retry_config(RetryConfig::disabled())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(Duration::from_millis(config.request_timeout_ms))
                    .build(),
            );
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self::from_client(Client::from_conf(builder.build()))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<GetObjectOutput, StoreError> {
        debug!(bucket, key, "Requesting S3 object");

        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, bucket, key))?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?
            .into_bytes();
        debug!(bucket, key, bytes = body.len(), "S3 object received");

        Ok(GetObjectOutput { body: Some(body) })
    }
}

fn map_sdk_error(err: SdkError<GetObjectError, HttpResponse>, bucket: &str, key: &str) -> StoreError {
    let not_found = || StoreError::NotFound {
        bucket: bucket.to_string(),
        key: key.to_string(),
    };

    if err.as_service_error().is_some_and(|e| e.is_no_such_key()) {
        return not_found();
    }

    match err.raw_response().map(|response| response.status().as_u16()) {
        Some(404) => not_found(),
        Some(401) | Some(403) => StoreError::AccessDenied {
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        Some(status) => StoreError::UnexpectedStatus {
            status,
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        None => StoreError::Transport(DisplayErrorContext(&err).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::Credentials;
    use mockito::{Matcher, Server};

    fn store_for(endpoint: String) -> S3ObjectStore {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("AKIDTEST", "secret", None, None, "static"))
            .endpoint_url(endpoint)
            .force_path_style(true)
            .retry_config(RetryConfig::disabled())
            .build();
        S3ObjectStore::from_client(Client::from_conf(config))
    }

    #[tokio::test]
    async fn test_get_object_sends_signed_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/route-pools/poolCache.json-1-V3")
            .match_query(Matcher::Any)
            .match_header("authorization", Matcher::Regex("^AWS4-HMAC-SHA256 Credential=AKIDTEST/".to_string()))
            .with_status(200)
            .with_body(r#"[{"id":"0xabc"}]"#)
            .create_async()
            .await;

        let store = store_for(server.url());
        let output = store
            .get_object("route-pools", "poolCache.json-1-V3")
            .await
            .unwrap();

        assert_eq!(output.body.unwrap().as_ref(), br#"[{"id":"0xabc"}]"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_key_is_encoded_in_path() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/b/pools%23v-1-V3")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let store = store_for(server.url());
        store.get_object("b", "pools#v-1-V3").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_statuses_map_to_store_errors() {
        let mut server = Server::new_async().await;
        let missing = server
            .mock("GET", "/b/missing")
            .match_query(Matcher::Any)
            .with_status(404)
            .expect(1)
            .create_async()
            .await;
        let _denied = server
            .mock("GET", "/b/denied")
            .match_query(Matcher::Any)
            .with_status(403)
            .create_async()
            .await;

        let store = store_for(server.url());

        assert!(matches!(
            store.get_object("b", "missing").await.unwrap_err(),
            StoreError::NotFound { .. }
        ));
        assert!(matches!(
            store.get_object("b", "denied").await.unwrap_err(),
            StoreError::AccessDenied { .. }
        ));
        // Retries are disabled
        missing.assert_async().await;
    }
}
