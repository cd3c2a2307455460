//! S3-backed `ObjectStore`, built on `object_store`'s `AmazonS3` client —
//! the same crate and signing path the storage layer this was grounded on
//! uses for presigned URLs (`AmazonS3Builder` + `Signer::signed_url`).

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreBackendError;
use futures::StreamExt;
use object_store::{GetOptions, GetRange, ObjectStore as _};

use crate::traits::{ListPage, ObjectStore, ObjectStoreError, ObjectStoreResult};

/// List pages are chunked at this size; the continuation token is the
/// number of entries already returned, encoded as a string.
const LIST_PAGE_SIZE: usize = 1000;

pub struct S3ObjectStore {
    store: AmazonS3,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(bucket: String, region: String, endpoint: Option<String>) -> ObjectStoreResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint {
            let allow_http = endpoint.starts_with("http://");
            builder = builder.with_endpoint(endpoint.clone()).with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| ObjectStoreError::ConfigError(e.to_string()))?;

        Ok(S3ObjectStore { store, bucket })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn presign_put(&self, _bucket: &str, key: &str, ttl: Duration) -> ObjectStoreResult<String> {
        let location = Path::from(key.to_string());
        self.store
            .signed_url(Method::PUT, &location, ttl)
            .await
            .map(|u| u.to_string())
            .map_err(|e| ObjectStoreError::PresignFailed(e.to_string()))
    }

    async fn head(&self, _bucket: &str, key: &str) -> ObjectStoreResult<bool> {
        let location = Path::from(key.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreBackendError::NotFound { .. }) => Ok(false),
            Err(e) => Err(ObjectStoreError::BackendError(e.to_string())),
        }
    }

    async fn content_length(&self, _bucket: &str, key: &str) -> ObjectStoreResult<u64> {
        let location = Path::from(key.to_string());
        let meta = self
            .store
            .head(&location)
            .await
            .map_err(|e| match e {
                ObjectStoreBackendError::NotFound { .. } => ObjectStoreError::NotFound(key.to_string()),
                other => ObjectStoreError::BackendError(other.to_string()),
            })?;
        Ok(meta.size as u64)
    }

    async fn get_range(&self, _bucket: &str, key: &str, max_bytes: usize) -> ObjectStoreResult<Bytes> {
        let location = Path::from(key.to_string());
        let options = GetOptions {
            range: Some(GetRange::Bounded(0..max_bytes as u64)),
            ..Default::default()
        };

        let result = self.store.get_opts(&location, options).await.map_err(|e| match e {
            ObjectStoreBackendError::NotFound { .. } => ObjectStoreError::NotFound(key.to_string()),
            other => ObjectStoreError::BackendError(other.to_string()),
        })?;

        result
            .bytes()
            .await
            .map_err(|e| ObjectStoreError::BackendError(e.to_string()))
    }

    async fn list_prefix(
        &self,
        _bucket: &str,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> ObjectStoreResult<ListPage> {
        let skip: usize = continuation_token
            .as_deref()
            .and_then(|t| t.parse().ok())
            .unwrap_or(0);

        let prefix_path = Path::from(prefix.to_string());
        let mut stream = self.store.list(Some(&prefix_path));

        let mut keys = Vec::new();
        let mut index = 0usize;
        let mut truncated = false;

        while let Some(entry) = stream.next().await {
            let meta = entry.map_err(|e| ObjectStoreError::BackendError(e.to_string()))?;
            if index < skip {
                index += 1;
                continue;
            }
            if keys.len() == LIST_PAGE_SIZE {
                truncated = true;
                break;
            }
            keys.push(meta.location.to_string());
            index += 1;
        }

        Ok(ListPage {
            continuation_token: if truncated { Some(index.to_string()) } else { None },
            keys,
        })
    }

    async fn delete_batch(&self, _bucket: &str, keys: &[String]) -> ObjectStoreResult<()> {
        for key in keys {
            let location = Path::from(key.clone());
            match self.store.delete(&location).await {
                Ok(()) | Err(ObjectStoreBackendError::NotFound { .. }) => {}
                Err(e) => return Err(ObjectStoreError::BackendError(e.to_string())),
            }
        }
        Ok(())
    }
}
