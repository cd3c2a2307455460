//! Configuration module
//!
//! Reads the environment variables named in §6 once at startup and
//! centralizes the "is the knowledge base configured" predicates per the
//! Design Note in §9 ("inject behavior, don't branch per call"): callers
//! read `Config::kb_mode()` / `Config::sync_enabled()` rather than
//! re-parsing `KNOWLEDGE_BASE_ID/DATA_SOURCE_ID` on every request.

use std::env;

use crate::constants::{DATA_SOURCE_ID_PLACEHOLDERS, DEFAULT_MODEL_ID, KB_ID_PLACEHOLDERS};

/// Whether the external knowledge base is configured for this deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnowledgeBaseMode {
    /// `KNOWLEDGE_BASE_ID` unset or a known placeholder: queries are
    /// answered by the mock path (§4.3 step 1).
    Mock,
    /// A real knowledge base id is configured.
    Configured(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub version: String,
    pub s3_bucket_name: String,
    pub documents_table_name: String,
    pub queries_table_name: String,
    pub responses_table_name: String,
    pub upload_sessions_table_name: String,
    knowledge_base_id: Option<String>,
    data_source_id: Option<String>,
    pub model_id: String,
    pub aws_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub cors_allowed_origins: Vec<String>,
    pub server_port: u16,
}

fn is_unset_or_placeholder(value: &Option<String>, placeholders: &[&str]) -> bool {
    match value {
        None => true,
        Some(v) if v.trim().is_empty() => true,
        Some(v) => placeholders.contains(&v.as_str()),
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Loads configuration from the process environment (after `dotenvy`
    /// has had a chance to populate it), applying the same defaults named
    /// in §6.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        Config {
            version: env::var("VERSION").unwrap_or_else(|_| "dev".to_string()),
            s3_bucket_name: env::var("S3_BUCKET_NAME").unwrap_or_default(),
            documents_table_name: env::var("DOCUMENTS_TABLE_NAME")
                .unwrap_or_else(|_| "documents".to_string()),
            queries_table_name: env::var("QUERIES_TABLE_NAME")
                .unwrap_or_else(|_| "queries".to_string()),
            responses_table_name: env::var("RESPONSES_TABLE_NAME")
                .unwrap_or_else(|_| "responses".to_string()),
            upload_sessions_table_name: env::var("UPLOAD_SESSIONS_TABLE_NAME")
                .unwrap_or_else(|_| "upload_sessions".to_string()),
            knowledge_base_id: env_opt("KNOWLEDGE_BASE_ID"),
            data_source_id: env_opt("DATA_SOURCE_ID"),
            model_id: env::var("MODEL_ID").unwrap_or_else(|_| DEFAULT_MODEL_ID.to_string()),
            aws_region: env_opt("AWS_REGION"),
            s3_endpoint: env_opt("S3_ENDPOINT"),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_default(),
            server_port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        }
    }

    /// Single predicate deciding mock vs. real knowledge-base mode (§4.3
    /// step 1, §6's recognized placeholders).
    pub fn kb_mode(&self) -> KnowledgeBaseMode {
        if is_unset_or_placeholder(&self.knowledge_base_id, KB_ID_PLACEHOLDERS) {
            KnowledgeBaseMode::Mock
        } else {
            KnowledgeBaseMode::Configured(self.knowledge_base_id.clone().unwrap())
        }
    }

    /// Whether `Sync` should actually start an ingestion job, or skip
    /// silently (§4.3.4: "skips silently if KB or data-source id is unset").
    pub fn sync_enabled(&self) -> bool {
        matches!(self.kb_mode(), KnowledgeBaseMode::Configured(_))
            && !is_unset_or_placeholder(&self.data_source_id, DATA_SOURCE_ID_PLACEHOLDERS)
    }

    pub fn data_source_id(&self) -> Option<&str> {
        if is_unset_or_placeholder(&self.data_source_id, DATA_SOURCE_ID_PLACEHOLDERS) {
            None
        } else {
            self.data_source_id.as_deref()
        }
    }

    /// Builds a minimal `Config` for tests in downstream crates that only
    /// care about the KB/data-source mode predicates.
    pub fn from_parts(knowledge_base_id: Option<&str>, data_source_id: Option<&str>) -> Self {
        Config {
            version: "dev".to_string(),
            s3_bucket_name: "bucket".to_string(),
            documents_table_name: "documents".to_string(),
            queries_table_name: "queries".to_string(),
            responses_table_name: "responses".to_string(),
            upload_sessions_table_name: "upload_sessions".to_string(),
            knowledge_base_id: knowledge_base_id.map(String::from),
            data_source_id: data_source_id.map(String::from),
            model_id: DEFAULT_MODEL_ID.to_string(),
            aws_region: None,
            s3_endpoint: None,
            cors_allowed_origins: vec![],
            server_port: 8080,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(kb: Option<&str>, ds: Option<&str>) -> Config {
        Config::from_parts(kb, ds)
    }

    #[test]
    fn empty_kb_id_is_mock_mode() {
        assert_eq!(config_with(None, None).kb_mode(), KnowledgeBaseMode::Mock);
        assert_eq!(config_with(Some(""), None).kb_mode(), KnowledgeBaseMode::Mock);
    }

    #[test]
    fn placeholder_kb_id_is_mock_mode() {
        assert_eq!(
            config_with(Some("CHANGE_ME_KNOWLEDGE_BASE_ID"), None).kb_mode(),
            KnowledgeBaseMode::Mock
        );
        assert_eq!(
            config_with(Some("EXAMPLE_KB_ID"), None).kb_mode(),
            KnowledgeBaseMode::Mock
        );
    }

    #[test]
    fn real_kb_id_is_configured_mode() {
        assert_eq!(
            config_with(Some("KB123"), None).kb_mode(),
            KnowledgeBaseMode::Configured("KB123".to_string())
        );
    }

    #[test]
    fn sync_disabled_without_data_source_id() {
        assert!(!config_with(Some("KB123"), None).sync_enabled());
        assert!(!config_with(Some("KB123"), Some("EXAMPLE_DS_ID")).sync_enabled());
        assert!(config_with(Some("KB123"), Some("DS123")).sync_enabled());
    }

    #[test]
    fn sync_disabled_in_mock_mode_even_with_data_source_id() {
        assert!(!config_with(None, Some("DS123")).sync_enabled());
    }
}
