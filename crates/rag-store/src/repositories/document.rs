//! Document persistence (§3, §4.1).

use std::sync::Arc;

use rag_core::models::Document;
use uuid::Uuid;

use crate::repository::Repository;
use crate::traits::{Item, ItemStore, StoreResult};

pub struct DocumentRepository<S: ItemStore + ?Sized> {
    repo: Arc<Repository<S>>,
}

impl<S: ItemStore + ?Sized> Clone for DocumentRepository<S> {
    fn clone(&self) -> Self {
        DocumentRepository {
            repo: self.repo.clone(),
        }
    }
}

impl<S: ItemStore + ?Sized> DocumentRepository<S> {
    pub fn new(store: Arc<S>, table: impl Into<String>) -> Self {
        DocumentRepository {
            repo: Arc::new(Repository::new(store, table)),
        }
    }

    pub async fn create(&self, document: &Document) -> StoreResult<()> {
        self.repo.put(document).await
    }

    pub async fn get(&self, id: Uuid) -> StoreResult<Option<Document>> {
        self.repo.get(&id.to_string()).await
    }

    pub async fn update(&self, id: Uuid, updates: Item) -> StoreResult<()> {
        self.repo.update(&id.to_string(), updates).await
    }

    pub async fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.repo.delete(&id.to_string()).await
    }

    /// Unfiltered scan, paginated in memory after the fetch (§9: scan-based
    /// list, the first thing to replace under load). Fetches all rows, then
    /// slices `[offset, offset + limit]`, leaving the +1 overfetch-for-
    /// `hasMore` trick to the caller by slicing one extra row itself.
    pub async fn list(&self, offset: usize, limit: usize) -> StoreResult<Vec<Document>> {
        let mut all: Vec<Document> = self.repo.scan(None).await?;
        all.sort_by_key(|d| d.uploaded_at);
        all.reverse();
        let end = (offset + limit + 1).min(all.len());
        if offset >= all.len() {
            return Ok(vec![]);
        }
        Ok(all[offset..end].to_vec())
    }
}
