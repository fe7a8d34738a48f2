//! In-process object store
//!
//! Backs tests and offline runs. Every `get_object` call is counted, per key and
//! in total, so callers can assert how often the durable tier was hit.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{GetObjectOutput, ObjectStore, StoreError};

#[derive(Debug, Clone)]
enum StoredObject {
    Body(Bytes),
    NoBody,
    Failure(StoreError),
}

#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: DashMap<(String, String), StoredObject>,
    calls: DashMap<(String, String), usize>,
    total_calls: AtomicUsize,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object with a body, replacing whatever was at the key
    pub fn put(&self, bucket: &str, key: &str, body: impl Into<Bytes>) {
        self.objects
            .insert(object_id(bucket, key), StoredObject::Body(body.into()));
    }

    /// Store an object that the client will report without a body
    pub fn put_without_body(&self, bucket: &str, key: &str) {
        self.objects.insert(object_id(bucket, key), StoredObject::NoBody);
    }

    /// Make reads of the key fail with `error`
    pub fn fail_with(&self, bucket: &str, key: &str, error: StoreError) {
        self.objects
            .insert(object_id(bucket, key), StoredObject::Failure(error));
    }

    /// Number of `get_object` calls across all keys
    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }

    /// Number of `get_object` calls for one key
    pub fn calls_for(&self, bucket: &str, key: &str) -> usize {
        self.calls
            .get(&object_id(bucket, key))
            .map(|count| *count)
            .unwrap_or(0)
    }
}

fn object_id(bucket: &str, key: &str) -> (String, String) {
    (bucket.to_string(), key.to_string())
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<GetObjectOutput, StoreError> {
        let id = object_id(bucket, key);
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        *self.calls.entry(id.clone()).or_insert(0) += 1;

        // Clone out so no map guard is held past this point
        let stored = self.objects.get(&id).map(|entry| entry.value().clone());
        match stored {
            Some(StoredObject::Body(body)) => Ok(GetObjectOutput { body: Some(body) }),
            Some(StoredObject::NoBody) => Ok(GetObjectOutput { body: None }),
            Some(StoredObject::Failure(error)) => Err(error),
            None => Err(StoreError::NotFound {
                bucket: id.0,
                key: id.1,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counts_calls_per_key() {
        let store = InMemoryObjectStore::new();
        store.put("b", "k1", "[]");

        store.get_object("b", "k1").await.unwrap();
        store.get_object("b", "k1").await.unwrap();
        let missing = store.get_object("b", "k2").await;

        assert!(matches!(missing, Err(StoreError::NotFound { .. })));
        assert_eq!(store.calls_for("b", "k1"), 2);
        assert_eq!(store.calls_for("b", "k2"), 1);
        assert_eq!(store.total_calls(), 3);
    }

    #[tokio::test]
    async fn test_objects_without_body_and_failures() {
        let store = InMemoryObjectStore::new();
        store.put_without_body("b", "empty");
        store.fail_with("b", "denied", StoreError::AccessDenied {
            bucket: "b".to_string(),
            key: "denied".to_string(),
        });

        assert!(store.get_object("b", "empty").await.unwrap().body.is_none());
        assert!(matches!(
            store.get_object("b", "denied").await,
            Err(StoreError::AccessDenied { .. })
        ));
    }
}
