//! In-memory `ObjectStore`, for tests and the mock deployment profile.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::traits::{ListPage, ObjectStore, ObjectStoreError, ObjectStoreResult};

#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, Bytes>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        MemoryObjectStore::default()
    }

    /// Test helper: seeds an object directly, as if a client had PUT it to
    /// a presigned URL.
    pub fn seed(&self, key: &str, data: impl Into<Bytes>) {
        self.objects.lock().unwrap().insert(key.to_string(), data.into());
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn presign_put(&self, bucket: &str, key: &str, ttl: Duration) -> ObjectStoreResult<String> {
        Ok(format!(
            "https://{bucket}.mock-presigned.local/{key}?ttl={}",
            ttl.as_secs()
        ))
    }

    async fn head(&self, _bucket: &str, key: &str) -> ObjectStoreResult<bool> {
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    async fn content_length(&self, _bucket: &str, key: &str) -> ObjectStoreResult<u64> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|b| b.len() as u64)
            .ok_or_else(|| ObjectStoreError::NotFound(key.to_string()))
    }

    async fn get_range(&self, _bucket: &str, key: &str, max_bytes: usize) -> ObjectStoreResult<Bytes> {
        let objects = self.objects.lock().unwrap();
        let data = objects
            .get(key)
            .ok_or_else(|| ObjectStoreError::NotFound(key.to_string()))?;
        let end = max_bytes.min(data.len());
        Ok(data.slice(0..end))
    }

    async fn list_prefix(
        &self,
        _bucket: &str,
        prefix: &str,
        _continuation_token: Option<String>,
    ) -> ObjectStoreResult<ListPage> {
        let keys = self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        Ok(ListPage {
            keys,
            continuation_token: None,
        })
    }

    async fn delete_batch(&self, _bucket: &str, keys: &[String]) -> ObjectStoreResult<()> {
        let mut objects = self.objects.lock().unwrap();
        for key in keys {
            objects.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn head_reflects_seeded_object() {
        let store = MemoryObjectStore::new();
        assert!(!store.head("b", "documents/1/a.md").await.unwrap());
        store.seed("documents/1/a.md", "hello");
        assert!(store.head("b", "documents/1/a.md").await.unwrap());
    }

    #[tokio::test]
    async fn get_range_caps_at_max_bytes() {
        let store = MemoryObjectStore::new();
        store.seed("k", "0123456789");
        let data = store.get_range("b", "k", 4).await.unwrap();
        assert_eq!(&data[..], b"0123");
    }

    #[tokio::test]
    async fn list_prefix_filters_by_prefix() {
        let store = MemoryObjectStore::new();
        store.seed("documents/1/a.md", "a");
        store.seed("documents/2/b.md", "b");
        let page = store.list_prefix("b", "documents/1/", None).await.unwrap();
        assert_eq!(page.keys, vec!["documents/1/a.md".to_string()]);
    }

    #[tokio::test]
    async fn delete_batch_removes_all_named_keys() {
        let store = MemoryObjectStore::new();
        store.seed("a", "1");
        store.seed("b", "2");
        store
            .delete_batch("bucket", &["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert!(!store.head("bucket", "a").await.unwrap());
        assert!(!store.head("bucket", "b").await.unwrap());
    }
}
