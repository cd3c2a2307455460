//! Bedrock-backed `KnowledgeBaseProvider`: retrieval and generation via
//! `aws-sdk-bedrockagentruntime`, ingestion job control via
//! `aws-sdk-bedrockagent`.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_bedrockagent::Client as AgentClient;
use aws_sdk_bedrockagentruntime::types::{
    KnowledgeBaseQuery, KnowledgeBaseRetrievalConfiguration, KnowledgeBaseRetrieveAndGenerateConfiguration,
    KnowledgeBaseVectorSearchConfiguration, RetrieveAndGenerateConfiguration, RetrieveAndGenerateInput,
    RetrieveAndGenerateType,
};
use aws_sdk_bedrockagentruntime::Client as RuntimeClient;
use serde_json::Value;

use crate::traits::{KnowledgeBaseProvider, KnowledgeError, KnowledgeResult};
use crate::types::{GenerateResult, JobStatus, RetrievalResult};

pub struct BedrockKnowledgeProvider {
    runtime: RuntimeClient,
    agent: AgentClient,
}

impl BedrockKnowledgeProvider {
    pub fn new(runtime: RuntimeClient, agent: AgentClient) -> Self {
        BedrockKnowledgeProvider { runtime, agent }
    }

    pub async fn from_env() -> Self {
        let config = aws_config::load_from_env().await;
        BedrockKnowledgeProvider {
            runtime: RuntimeClient::new(&config),
            agent: AgentClient::new(&config),
        }
    }
}

#[async_trait]
impl KnowledgeBaseProvider for BedrockKnowledgeProvider {
    async fn retrieve(
        &self,
        kb_id: &str,
        question: &str,
        top_k: u32,
    ) -> KnowledgeResult<Vec<RetrievalResult>> {
        let output = self
            .runtime
            .retrieve()
            .knowledge_base_id(kb_id)
            .retrieval_query(KnowledgeBaseQuery::builder().text(question).build())
            .retrieval_configuration(
                KnowledgeBaseRetrievalConfiguration::builder()
                    .vector_search_configuration(
                        KnowledgeBaseVectorSearchConfiguration::builder()
                            .number_of_results(top_k as i32)
                            .build(),
                    )
                    .build(),
            )
            .send()
            .await
            .map_err(|e| KnowledgeError::RetrieveFailed(e.to_string()))?;

        let results = output
            .retrieval_results
            .unwrap_or_default()
            .into_iter()
            .map(|r| {
                let content_text = r
                    .content
                    .and_then(|c| c.text)
                    .unwrap_or_default();
                let score = r.score;
                let metadata = r
                    .metadata
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(k, v)| (k, document_to_json(&v)))
                    .collect::<HashMap<String, Value>>();
                RetrievalResult {
                    content_text,
                    score,
                    metadata,
                }
            })
            .collect();

        Ok(results)
    }

    async fn retrieve_and_generate(
        &self,
        kb_id: &str,
        model_id: &str,
        prompt: &str,
    ) -> KnowledgeResult<GenerateResult> {
        let output = self
            .runtime
            .retrieve_and_generate()
            .input(RetrieveAndGenerateInput::builder().text(prompt).build())
            .retrieve_and_generate_configuration(
                RetrieveAndGenerateConfiguration::builder()
                    .r#type(RetrieveAndGenerateType::KnowledgeBase)
                    .knowledge_base_configuration(
                        KnowledgeBaseRetrieveAndGenerateConfiguration::builder()
                            .knowledge_base_id(kb_id)
                            .model_arn(model_id)
                            .build()
                            .map_err(|e| KnowledgeError::GenerateFailed(e.to_string()))?,
                    )
                    .build(),
            )
            .send()
            .await
            .map_err(|e| KnowledgeError::GenerateFailed(e.to_string()))?;

        let output_text = output.output.and_then(|o| o.text).unwrap_or_default();
        Ok(GenerateResult { output_text })
    }

    async fn start_ingestion_job(&self, kb_id: &str, data_source_id: &str) -> KnowledgeResult<String> {
        let output = self
            .agent
            .start_ingestion_job()
            .knowledge_base_id(kb_id)
            .data_source_id(data_source_id)
            .send()
            .await
            .map_err(|e| KnowledgeError::JobFailed(e.to_string()))?;

        output
            .ingestion_job
            .and_then(|j| j.ingestion_job_id)
            .ok_or_else(|| KnowledgeError::JobFailed("start_ingestion_job returned no job id".to_string()))
    }

    async fn get_job_status(
        &self,
        kb_id: &str,
        data_source_id: &str,
        job_id: &str,
    ) -> KnowledgeResult<JobStatus> {
        let (status, _) = self.get_job_details(kb_id, data_source_id, job_id).await?;
        Ok(status)
    }

    async fn get_job_details(
        &self,
        kb_id: &str,
        data_source_id: &str,
        job_id: &str,
    ) -> KnowledgeResult<(JobStatus, Vec<String>)> {
        let output = self
            .agent
            .get_ingestion_job()
            .knowledge_base_id(kb_id)
            .data_source_id(data_source_id)
            .ingestion_job_id(job_id)
            .send()
            .await
            .map_err(|e| KnowledgeError::JobFailed(e.to_string()))?;

        let job = output
            .ingestion_job
            .ok_or_else(|| KnowledgeError::NotFound(job_id.to_string()))?;

        let status = JobStatus::from_wire(job.status.as_ref().map(|s| s.as_str()).unwrap_or(""));
        let reasons = job.failure_reasons.unwrap_or_default();
        Ok((status, reasons))
    }
}

fn document_to_json(doc: &aws_smithy_types::Document) -> Value {
    use aws_smithy_types::Document;
    match doc {
        Document::Null => Value::Null,
        Document::Bool(b) => Value::Bool(*b),
        Document::Number(n) => serde_json::Number::from_f64(n.to_f64())
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Document::String(s) => Value::String(s.clone()),
        Document::Array(items) => Value::Array(items.iter().map(document_to_json).collect()),
        Document::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k.clone(), document_to_json(v));
            }
            Value::Object(out)
        }
    }
}
