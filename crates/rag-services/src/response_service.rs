//! Response service (§4.5): persists the RAG answer bound to a query,
//! filling in provenance safeguards before validation.

use chrono::Utc;
use uuid::Uuid;

use rag_core::error::AppError;
use rag_core::models::{Response, Source};
use rag_store::{ItemStore, ResponseRepository};

use crate::errors::from_store_error;

pub struct ResponseService<S: ItemStore + ?Sized> {
    repo: ResponseRepository<S>,
}

impl<S: ItemStore + ?Sized> Clone for ResponseService<S> {
    fn clone(&self) -> Self {
        ResponseService {
            repo: self.repo.clone(),
        }
    }
}

impl<S: ItemStore + ?Sized> ResponseService<S> {
    pub fn new(repo: ResponseRepository<S>) -> Self {
        ResponseService { repo }
    }

    /// `Create`: fills missing source ids/filenames with `doc-{i+1}` /
    /// `document-{i+1}` safeguards, truncates excerpts twice (R3: the
    /// second application is a no-op once the first has run), rounds
    /// confidence to 3 decimals, validates, and persists.
    pub async fn create(
        &self,
        query_id: Uuid,
        answer: &str,
        mut sources: Vec<Source>,
        processing_time_ms: u64,
        model: &str,
        token_count: u64,
    ) -> Result<Response, AppError> {
        for (i, source) in sources.iter_mut().enumerate() {
            if source.document_id.trim().is_empty() {
                source.document_id = format!("doc-{}", i + 1);
            }
            if source.file_name.trim().is_empty() {
                source.file_name = format!("document-{}", i + 1);
            }
            source.truncate_excerpt();
            source.truncate_excerpt();
            source.confidence = source.rounded_confidence();
        }

        let response = Response {
            id: Uuid::new_v4(),
            query_id,
            answer: answer.to_string(),
            sources,
            processing_time_ms,
            model: model.to_string(),
            token_count,
            created_at: Utc::now(),
        };

        response.validate()?;
        self.repo.create(&response).await.map_err(from_store_error)?;
        Ok(response)
    }

    pub async fn get(&self, id: Uuid) -> Result<Response, AppError> {
        self.repo
            .get(id)
            .await
            .map_err(from_store_error)?
            .ok_or_else(|| AppError::not_found("Response"))
    }

    pub async fn get_by_query_id(&self, query_id: Uuid) -> Result<Option<Response>, AppError> {
        self.repo.get_by_query_id(query_id).await.map_err(from_store_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rag_store::MemoryStore;
    use std::sync::Arc;

    fn service() -> ResponseService<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        ResponseService::new(ResponseRepository::new(store, "responses"))
    }

    fn source_missing_ids(confidence: f64) -> Source {
        Source {
            document_id: String::new(),
            file_name: String::new(),
            excerpt: "an excerpt".to_string(),
            confidence,
        }
    }

    #[tokio::test]
    async fn create_fills_missing_source_safeguards() {
        let svc = service();
        let response = svc
            .create(Uuid::new_v4(), "an answer", vec![source_missing_ids(0.9)], 10, "model", 5)
            .await
            .unwrap();

        assert_eq!(response.sources[0].document_id, "doc-1");
        assert_eq!(response.sources[0].file_name, "document-1");
    }

    #[tokio::test]
    async fn create_rounds_confidence_to_three_decimals() {
        let svc = service();
        let mut source = source_missing_ids(0.123456);
        source.document_id = "doc-1".to_string();
        source.file_name = "a.md".to_string();
        let response = svc
            .create(Uuid::new_v4(), "an answer", vec![source], 10, "model", 5)
            .await
            .unwrap();

        assert_eq!(response.sources[0].confidence, 0.123);
    }

    #[tokio::test]
    async fn create_truncates_oversize_excerpt() {
        let svc = service();
        let mut source = source_missing_ids(0.5);
        source.document_id = "doc-1".to_string();
        source.file_name = "a.md".to_string();
        source.excerpt = "x".repeat(600);
        let response = svc
            .create(Uuid::new_v4(), "an answer", vec![source], 10, "model", 5)
            .await
            .unwrap();

        assert_eq!(response.sources[0].excerpt.chars().count(), 500);
    }

    #[tokio::test]
    async fn create_rejects_too_many_sources() {
        let svc = service();
        let sources = (0..6).map(|_| source_missing_ids(0.9)).collect();
        let err = svc
            .create(Uuid::new_v4(), "an answer", sources, 10, "model", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn get_by_query_id_finds_matching_response() {
        let svc = service();
        let query_id = Uuid::new_v4();
        svc.create(query_id, "an answer", vec![], 10, "model", 5).await.unwrap();

        let found = svc.get_by_query_id(query_id).await.unwrap();
        assert!(found.is_some());

        let missing = svc.get_by_query_id(Uuid::new_v4()).await.unwrap();
        assert!(missing.is_none());
    }
}
