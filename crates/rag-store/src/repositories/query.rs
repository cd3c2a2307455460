//! Query persistence (§3, §4.4).

use std::sync::Arc;

use rag_core::models::Query;
use uuid::Uuid;

use crate::repository::Repository;
use crate::traits::{Item, ItemStore, ScanFilter, StoreResult};

pub struct QueryRepository<S: ItemStore + ?Sized> {
    repo: Arc<Repository<S>>,
}

impl<S: ItemStore + ?Sized> Clone for QueryRepository<S> {
    fn clone(&self) -> Self {
        QueryRepository {
            repo: self.repo.clone(),
        }
    }
}

impl<S: ItemStore + ?Sized> QueryRepository<S> {
    pub fn new(store: Arc<S>, table: impl Into<String>) -> Self {
        QueryRepository {
            repo: Arc::new(Repository::new(store, table)),
        }
    }

    pub async fn create(&self, query: &Query) -> StoreResult<()> {
        self.repo.put(query).await
    }

    pub async fn get(&self, id: Uuid) -> StoreResult<Option<Query>> {
        self.repo.get(&id.to_string()).await
    }

    pub async fn update(&self, id: Uuid, updates: Item) -> StoreResult<()> {
        self.repo.update(&id.to_string(), updates).await
    }

    /// `History`: scan with filter `sessionId = :sid`, overfetched by one
    /// for the caller's `hasMore` flag, newest first.
    pub async fn history(
        &self,
        session_id: &str,
        offset: usize,
        limit: usize,
    ) -> StoreResult<Vec<Query>> {
        let mut matching: Vec<Query> = self
            .repo
            .scan(Some(ScanFilter::new("sessionId", session_id)))
            .await?;
        matching.sort_by_key(|q| q.created_at);
        matching.reverse();
        if offset >= matching.len() {
            return Ok(vec![]);
        }
        let end = (offset + limit + 1).min(matching.len());
        Ok(matching[offset..end].to_vec())
    }
}
