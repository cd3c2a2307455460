//! Response persistence (§3, §4.5).

use std::sync::Arc;

use rag_core::models::Response;
use uuid::Uuid;

use crate::repository::Repository;
use crate::traits::{ItemStore, ScanFilter, StoreResult};

pub struct ResponseRepository<S: ItemStore + ?Sized> {
    repo: Arc<Repository<S>>,
}

impl<S: ItemStore + ?Sized> Clone for ResponseRepository<S> {
    fn clone(&self) -> Self {
        ResponseRepository {
            repo: self.repo.clone(),
        }
    }
}

impl<S: ItemStore + ?Sized> ResponseRepository<S> {
    pub fn new(store: Arc<S>, table: impl Into<String>) -> Self {
        ResponseRepository {
            repo: Arc::new(Repository::new(store, table)),
        }
    }

    pub async fn create(&self, response: &Response) -> StoreResult<()> {
        self.repo.put(response).await
    }

    pub async fn get(&self, id: Uuid) -> StoreResult<Option<Response>> {
        self.repo.get(&id.to_string()).await
    }

    /// `GetResponseByQueryID`: a response carries its owning query's id, not
    /// the other way around, so this is a filtered scan rather than a direct
    /// key lookup (§6).
    pub async fn get_by_query_id(&self, query_id: Uuid) -> StoreResult<Option<Response>> {
        let matches: Vec<Response> = self
            .repo
            .scan(Some(ScanFilter::new("queryId", &query_id.to_string())))
            .await?;
        Ok(matches.into_iter().next())
    }
}
