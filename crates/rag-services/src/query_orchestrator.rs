//! Query orchestrator (§4.4): drives a query through
//! `pending -> processing -> completed|failed`, binding the RAG result to
//! a persisted response.

use chrono::Utc;
use tracing::error;
use uuid::Uuid;

use rag_core::constants::{HISTORY_DEFAULT_LIMIT, HISTORY_MAX_LIMIT};
use rag_core::error::AppError;
use rag_core::models::{CreateQueryRequest, Page, Query, QueryStatus, Response};
use rag_knowledge::traits::KnowledgeBaseProvider;
use rag_knowledge::KnowledgeService;
use rag_store::{updates, ItemStore, QueryRepository};
use std::sync::Arc;

use crate::document_service::clamp_limit;
use crate::errors::from_store_error;
use crate::response_service::ResponseService;

/// The combined view the HTTP adapter returns for a completed query (§4.4,
/// §6: `POST /queries` returns `{query, response}`).
pub struct QueryWithResponse {
    pub query: Query,
    pub response: Option<Response>,
}

pub struct QueryOrchestrator<S: ItemStore + ?Sized, P: KnowledgeBaseProvider + ?Sized> {
    queries: QueryRepository<S>,
    responses: ResponseService<S>,
    knowledge: Arc<KnowledgeService<P>>,
}

impl<S: ItemStore + ?Sized, P: KnowledgeBaseProvider + ?Sized> Clone for QueryOrchestrator<S, P> {
    fn clone(&self) -> Self {
        QueryOrchestrator {
            queries: self.queries.clone(),
            responses: self.responses.clone(),
            knowledge: self.knowledge.clone(),
        }
    }
}

impl<S: ItemStore + ?Sized, P: KnowledgeBaseProvider + ?Sized> QueryOrchestrator<S, P> {
    pub fn new(queries: QueryRepository<S>, responses: ResponseService<S>, knowledge: Arc<KnowledgeService<P>>) -> Self {
        QueryOrchestrator {
            queries,
            responses,
            knowledge,
        }
    }

    /// `Create`: validates and persists a `pending` query.
    pub async fn create(&self, req: &CreateQueryRequest) -> Result<Query, AppError> {
        let question = req.validate_and_sanitize()?;
        let now = Utc::now();
        let query = Query {
            id: Uuid::new_v4(),
            session_id: req.session_id.clone(),
            question,
            status: QueryStatus::Pending,
            processing_time_ms: 0,
            error_message: None,
            created_at: now,
            updated_at: now,
            processing_started_at: None,
            completed_at: None,
        };
        self.queries.create(&query).await.map_err(from_store_error)?;
        Ok(query)
    }

    pub async fn get(&self, id: Uuid) -> Result<Query, AppError> {
        self.queries
            .get(id)
            .await
            .map_err(from_store_error)?
            .ok_or_else(|| AppError::not_found("Query"))
    }

    pub async fn update_status(&self, id: Uuid, status: QueryStatus) -> Result<(), AppError> {
        let mut fields = updates! {
            "status" => status,
            "updatedAt" => Utc::now(),
        };
        if status == QueryStatus::Processing {
            fields.insert("processingStartedAt".to_string(), serde_json::json!(Utc::now()));
        }
        self.queries.update(id, fields).await.map_err(from_store_error)
    }

    pub async fn mark_completed(&self, id: Uuid, processing_ms: u64) -> Result<(), AppError> {
        let now = Utc::now();
        self.queries
            .update(
                id,
                updates! {
                    "status" => QueryStatus::Completed,
                    "processingTimeMs" => processing_ms,
                    "completedAt" => now,
                    "updatedAt" => now,
                },
            )
            .await
            .map_err(from_store_error)
    }

    pub async fn mark_failed(&self, id: Uuid, message: &str, processing_ms: u64) -> Result<(), AppError> {
        let now = Utc::now();
        self.queries
            .update(
                id,
                updates! {
                    "status" => QueryStatus::Failed,
                    "errorMessage" => message,
                    "processingTimeMs" => processing_ms,
                    "completedAt" => now,
                    "updatedAt" => now,
                },
            )
            .await
            .map_err(from_store_error)
    }

    /// The full `POST /queries` flow (§4.4): `Create` -> `processing` ->
    /// `KnowledgeService.Query`; on success, the response is persisted
    /// *before* `MarkCompleted`; a response-save failure does not fail the
    /// query — the asymmetry is deliberate so history never mislabels a
    /// successful RAG call as failed.
    pub async fn create_and_process(&self, req: &CreateQueryRequest) -> Result<QueryWithResponse, AppError> {
        let query = self.create(req).await?;
        self.update_status(query.id, QueryStatus::Processing).await?;

        let result = self.knowledge.query(&query.question).await;

        let response = self
            .responses
            .create(
                query.id,
                &result.answer,
                result.sources,
                result.processing_time_ms,
                &result.model,
                result.token_count,
            )
            .await;

        match response {
            Ok(response) => {
                self.mark_completed(query.id, result.processing_time_ms).await?;
                let completed = self.get(query.id).await?;
                Ok(QueryWithResponse {
                    query: completed,
                    response: Some(response),
                })
            }
            Err(e) => {
                error!(query_id = %query.id, error = %e, "failed to persist response for completed query");
                self.mark_completed(query.id, result.processing_time_ms).await?;
                let completed = self.get(query.id).await?;
                Ok(QueryWithResponse {
                    query: completed,
                    response: None,
                })
            }
        }
    }

    /// `History`: scan filtered by `sessionId`, joining each query with its
    /// response (best-effort — an absent response is permitted).
    pub async fn history(
        &self,
        session_id: &str,
        offset: u32,
        limit: Option<u32>,
    ) -> Result<Page<QueryWithResponse>, AppError> {
        let limit = clamp_limit(limit, HISTORY_DEFAULT_LIMIT, HISTORY_MAX_LIMIT)?;
        let rows = self
            .queries
            .history(session_id, offset as usize, limit as usize)
            .await
            .map_err(from_store_error)?;

        let has_more = rows.len() > limit as usize;
        let mut rows = rows;
        if has_more {
            rows.truncate(limit as usize);
        }

        let mut items = Vec::with_capacity(rows.len());
        for query in rows {
            let response = self.responses.get_by_query_id(query.id).await?;
            items.push(QueryWithResponse { query, response });
        }

        Ok(Page { items, has_more })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rag_core::config::Config;
    use rag_knowledge::mock::MockKnowledgeProvider;
    use rag_store::{MemoryStore, ResponseRepository};

    fn orchestrator() -> QueryOrchestrator<MemoryStore, MockKnowledgeProvider> {
        let store = Arc::new(MemoryStore::new());
        let queries = QueryRepository::new(store.clone(), "queries");
        let responses = ResponseService::new(ResponseRepository::new(store, "responses"));
        let provider = Arc::new(MockKnowledgeProvider::new());
        let config = Arc::new(Config::from_parts(None, None));
        let knowledge = Arc::new(KnowledgeService::new(provider, config));
        QueryOrchestrator::new(queries, responses, knowledge)
    }

    fn valid_request() -> CreateQueryRequest {
        CreateQueryRequest {
            question: "hello".to_string(),
            session_id: "session_1_abcdef".to_string(),
        }
    }

    #[tokio::test]
    async fn create_and_process_completes_in_mock_mode() {
        let orch = orchestrator();
        let result = orch.create_and_process(&valid_request()).await.unwrap();

        assert_eq!(result.query.status, QueryStatus::Completed);
        assert!(result.query.completed_at.is_some());
        let response = result.response.unwrap();
        assert!(response.answer.contains("hello"));
    }

    #[tokio::test]
    async fn create_rejects_invalid_session_id() {
        let orch = orchestrator();
        let mut req = valid_request();
        req.session_id = "short".to_string();
        let err = orch.create(&req).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn history_joins_query_with_response() {
        let orch = orchestrator();
        orch.create_and_process(&valid_request()).await.unwrap();
        let mut second = valid_request();
        second.question = "a second question".to_string();
        orch.create_and_process(&second).await.unwrap();

        let page = orch.history("session_1_abcdef", 0, None).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.items.iter().all(|item| item.response.is_some()));
    }

    #[tokio::test]
    async fn history_is_scoped_to_session() {
        let orch = orchestrator();
        orch.create_and_process(&valid_request()).await.unwrap();

        let page = orch.history("other_session_xyz", 0, None).await.unwrap();
        assert!(page.items.is_empty());
    }
}
