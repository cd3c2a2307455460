//! Retriever + LLM capability abstraction (§6). Mirrors the
//! `SemanticSearchProvider` shape: one trait, cloud-backed and mock
//! implementations, no coupling from callers to a concrete SDK.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{GenerateResult, JobStatus, RetrievalResult};

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("retrieve failed: {0}")]
    RetrieveFailed(String),

    #[error("generate failed: {0}")]
    GenerateFailed(String),

    #[error("ingestion job error: {0}")]
    JobFailed(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("backend error: {0}")]
    BackendError(String),
}

pub type KnowledgeResult<T> = Result<T, KnowledgeError>;

#[async_trait]
pub trait KnowledgeBaseProvider: Send + Sync {
    /// Retrieves the top `top_k` passages for `question` from `kb_id`.
    async fn retrieve(
        &self,
        kb_id: &str,
        question: &str,
        top_k: u32,
    ) -> KnowledgeResult<Vec<RetrievalResult>>;

    /// Retrieve-and-generate: `prompt` already carries the answer-in-
    /// natural-language instruction prefix (§4.3 step 3).
    async fn retrieve_and_generate(
        &self,
        kb_id: &str,
        model_id: &str,
        prompt: &str,
    ) -> KnowledgeResult<GenerateResult>;

    async fn start_ingestion_job(&self, kb_id: &str, data_source_id: &str) -> KnowledgeResult<String>;

    async fn get_job_status(
        &self,
        kb_id: &str,
        data_source_id: &str,
        job_id: &str,
    ) -> KnowledgeResult<JobStatus>;

    async fn get_job_details(
        &self,
        kb_id: &str,
        data_source_id: &str,
        job_id: &str,
    ) -> KnowledgeResult<(JobStatus, Vec<String>)>;
}
