//! UploadSession persistence (§3, §4.2).

use std::sync::Arc;

use rag_core::models::UploadSession;
use uuid::Uuid;

use crate::repository::Repository;
use crate::traits::{Item, ItemStore, StoreResult};

pub struct UploadSessionRepository<S: ItemStore + ?Sized> {
    repo: Arc<Repository<S>>,
}

impl<S: ItemStore + ?Sized> Clone for UploadSessionRepository<S> {
    fn clone(&self) -> Self {
        UploadSessionRepository {
            repo: self.repo.clone(),
        }
    }
}

impl<S: ItemStore + ?Sized> UploadSessionRepository<S> {
    pub fn new(store: Arc<S>, table: impl Into<String>) -> Self {
        UploadSessionRepository {
            repo: Arc::new(Repository::new(store, table)),
        }
    }

    pub async fn create(&self, session: &UploadSession) -> StoreResult<()> {
        self.repo.put(session).await
    }

    pub async fn get(&self, id: Uuid) -> StoreResult<Option<UploadSession>> {
        self.repo.get(&id.to_string()).await
    }

    pub async fn update(&self, id: Uuid, updates: Item) -> StoreResult<()> {
        self.repo.update(&id.to_string(), updates).await
    }
}
