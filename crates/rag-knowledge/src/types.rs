//! Wire-level shapes for the retriever + LLM capability (§6).

use std::collections::HashMap;

use serde_json::Value;

/// One hit from a retrieve call: `{content.text, score, metadata}` (§6).
#[derive(Debug, Clone, Default)]
pub struct RetrievalResult {
    pub content_text: String,
    pub score: Option<f64>,
    pub metadata: HashMap<String, Value>,
}

/// The result of a retrieve-and-generate call: `{output.text, citations?}` (§6).
#[derive(Debug, Clone)]
pub struct GenerateResult {
    pub output_text: String,
}

/// Ingestion job status (§4.3.4, §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Starting,
    InProgress,
    Complete,
    Failed,
    Unknown(String),
}

impl JobStatus {
    pub fn from_wire(s: &str) -> Self {
        match s {
            "STARTING" => JobStatus::Starting,
            "IN_PROGRESS" => JobStatus::InProgress,
            "COMPLETE" => JobStatus::Complete,
            "FAILED" => JobStatus::Failed,
            other => JobStatus::Unknown(other.to_string()),
        }
    }
}
