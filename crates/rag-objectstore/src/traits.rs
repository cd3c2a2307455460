//! Object store abstraction (§6): presign a PUT, HEAD a key, GET an object
//! body, list by prefix with continuation, and batch-delete up to 1000 keys
//! at a time. Modeled on the `Storage` trait pattern: callers never talk to
//! a concrete backend, only through this trait.

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("presign failed: {0}")]
    PresignFailed(String),

    #[error("object store backend error: {0}")]
    BackendError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

pub type ObjectStoreResult<T> = Result<T, ObjectStoreError>;

/// One page of a prefix listing.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub keys: Vec<String>,
    /// Opaque continuation token; `None` means the listing is exhausted.
    pub continuation_token: Option<String>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Presigns a PUT for `key`, content-type `application/octet-stream`,
    /// valid for `ttl` (§4.2: default 15 minutes).
    async fn presign_put(&self, bucket: &str, key: &str, ttl: Duration) -> ObjectStoreResult<String>;

    /// `true` iff an object exists at `key`.
    async fn head(&self, bucket: &str, key: &str) -> ObjectStoreResult<bool>;

    /// Byte size of the object at `key`, if it exists.
    async fn content_length(&self, bucket: &str, key: &str) -> ObjectStoreResult<u64>;

    /// Reads at most `max_bytes` from the start of the object (§4.2.1 preview
    /// extraction reads at most 100 KiB).
    async fn get_range(&self, bucket: &str, key: &str, max_bytes: usize) -> ObjectStoreResult<Bytes>;

    /// Lists keys under `prefix`, continuing from `continuation_token` if given.
    async fn list_prefix(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> ObjectStoreResult<ListPage>;

    /// Deletes up to 1000 keys in one call (§4.1's `DeleteAllObjectsFor`
    /// batches in chunks of this size).
    async fn delete_batch(&self, bucket: &str, keys: &[String]) -> ObjectStoreResult<()>;
}
