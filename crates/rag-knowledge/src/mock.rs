//! A test/offline-development implementation of `KnowledgeBaseProvider`.
//! Behavior is fully deterministic and controlled by the fields below so
//! tests can drive every branch of the degradation ladder without a real
//! Bedrock account.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::traits::{KnowledgeBaseProvider, KnowledgeError, KnowledgeResult};
use crate::types::{GenerateResult, JobStatus, RetrievalResult};

pub struct MockKnowledgeProvider {
    pub retrieve_results: Mutex<Vec<RetrievalResult>>,
    pub retrieve_should_fail: Mutex<bool>,
    pub generate_should_fail: Mutex<bool>,
    pub generated_text: Mutex<String>,
    pub job_statuses: Mutex<Vec<JobStatus>>,
}

impl Default for MockKnowledgeProvider {
    fn default() -> Self {
        MockKnowledgeProvider {
            retrieve_results: Mutex::new(Vec::new()),
            retrieve_should_fail: Mutex::new(false),
            generate_should_fail: Mutex::new(false),
            generated_text: Mutex::new("a generated answer".to_string()),
            job_statuses: Mutex::new(vec![JobStatus::Complete]),
        }
    }
}

impl MockKnowledgeProvider {
    pub fn new() -> Self {
        MockKnowledgeProvider::default()
    }
}

#[async_trait]
impl KnowledgeBaseProvider for MockKnowledgeProvider {
    async fn retrieve(
        &self,
        _kb_id: &str,
        _question: &str,
        _top_k: u32,
    ) -> KnowledgeResult<Vec<RetrievalResult>> {
        if *self.retrieve_should_fail.lock().unwrap() {
            return Err(KnowledgeError::RetrieveFailed("mock retrieve failure".to_string()));
        }
        Ok(self.retrieve_results.lock().unwrap().clone())
    }

    async fn retrieve_and_generate(
        &self,
        _kb_id: &str,
        _model_id: &str,
        _prompt: &str,
    ) -> KnowledgeResult<GenerateResult> {
        if *self.generate_should_fail.lock().unwrap() {
            return Err(KnowledgeError::GenerateFailed("mock generate failure".to_string()));
        }
        Ok(GenerateResult {
            output_text: self.generated_text.lock().unwrap().clone(),
        })
    }

    async fn start_ingestion_job(&self, _kb_id: &str, _data_source_id: &str) -> KnowledgeResult<String> {
        Ok("mock-job-1".to_string())
    }

    async fn get_job_status(
        &self,
        _kb_id: &str,
        _data_source_id: &str,
        _job_id: &str,
    ) -> KnowledgeResult<JobStatus> {
        let mut statuses = self.job_statuses.lock().unwrap();
        if statuses.len() > 1 {
            Ok(statuses.remove(0))
        } else {
            Ok(statuses.first().cloned().unwrap_or(JobStatus::Complete))
        }
    }

    async fn get_job_details(
        &self,
        kb_id: &str,
        data_source_id: &str,
        job_id: &str,
    ) -> KnowledgeResult<(JobStatus, Vec<String>)> {
        let status = self.get_job_status(kb_id, data_source_id, job_id).await?;
        let reasons = if status == JobStatus::Failed {
            vec!["mock failure reason".to_string()]
        } else {
            vec![]
        };
        Ok((status, reasons))
    }
}
