//! Response entity (§3) — the RAG answer to one Query, with attached
//! Sources for provenance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::constants::{MAX_ANSWER_CHARS, MAX_EXCERPT_SCALARS, MAX_SOURCES};
use crate::error::{AppError, ErrorMetadata};
use crate::sanitize::truncate_scalars;

/// A provenance triple extracted from a retrieval result (§4.3.1).
/// Document references are soft: a source may name a document that has
/// since been deleted, and display must tolerate that.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub document_id: String,
    pub file_name: String,
    pub excerpt: String,
    pub confidence: f64,
}

impl Source {
    /// I5 plus non-empty required fields (§3).
    pub fn validate(&self) -> Result<(), AppError> {
        if self.document_id.trim().is_empty() {
            return Err(AppError::validation_global("source documentId is required"));
        }
        if self.file_name.trim().is_empty() {
            return Err(AppError::validation_global("source fileName is required"));
        }
        if self.excerpt.trim().is_empty() {
            return Err(AppError::validation_global("source excerpt is required"));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(AppError::validation_global(
                "source confidence must be within [0.0, 1.0]",
            ));
        }
        Ok(())
    }

    /// I3: truncates the excerpt to at most 500 Unicode scalars.
    pub fn truncate_excerpt(&mut self) {
        self.excerpt = truncate_scalars(&self.excerpt, MAX_EXCERPT_SCALARS);
    }

    /// Stored confidence precision is 3 decimal places (§4.5, §6).
    pub fn rounded_confidence(&self) -> f64 {
        (self.confidence * 1000.0).round() / 1000.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub id: Uuid,
    pub query_id: Uuid,
    pub answer: String,
    pub sources: Vec<Source>,
    pub processing_time_ms: u64,
    pub model: String,
    pub token_count: u64,
    pub created_at: DateTime<Utc>,
}

impl Response {
    /// I4/I3/I5 plus the answer length bound (§3).
    pub fn validate(&self) -> Result<(), AppError> {
        if self.answer.trim().is_empty() {
            return Err(AppError::validation_global("answer is required"));
        }
        if self.answer.chars().count() > MAX_ANSWER_CHARS {
            return Err(AppError::validation_global(format!(
                "answer must be at most {MAX_ANSWER_CHARS} characters"
            )));
        }
        if self.sources.len() > MAX_SOURCES {
            return Err(AppError::validation_global(format!(
                "a response may carry at most {MAX_SOURCES} sources"
            )));
        }
        for source in &self.sources {
            source.validate()?;
        }
        Ok(())
    }

    /// R3 (applied to a whole response): idempotent since `truncate_scalars`
    /// itself is idempotent per source.
    pub fn truncate_all_excerpts(&mut self) {
        for source in &mut self.sources {
            source.truncate_excerpt();
        }
    }

    /// High-quality per §3: at least 2 sources and average confidence >= 0.6.
    pub fn is_high_quality(&self) -> bool {
        if self.sources.len() < 2 {
            return false;
        }
        let avg: f64 =
            self.sources.iter().map(|s| s.confidence).sum::<f64>() / self.sources.len() as f64;
        avg >= 0.6
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(confidence: f64) -> Source {
        Source {
            document_id: "doc-1".to_string(),
            file_name: "a.md".to_string(),
            excerpt: "some excerpt".to_string(),
            confidence,
        }
    }

    fn response(sources: Vec<Source>) -> Response {
        Response {
            id: Uuid::new_v4(),
            query_id: Uuid::new_v4(),
            answer: "an answer".to_string(),
            sources,
            processing_time_ms: 10,
            model: "amazon.titan-embed-text-v2:0".to_string(),
            token_count: 42,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn rejects_more_than_five_sources() {
        let sources = (0..6).map(|_| source(0.9)).collect();
        let err = response(sources).validate().unwrap_err();
        assert!(err.client_message().contains("5"));
    }

    #[test]
    fn accepts_exactly_five_sources() {
        let sources = (0..5).map(|_| source(0.9)).collect();
        assert!(response(sources).validate().is_ok());
    }

    #[test]
    fn rejects_confidence_out_of_bounds() {
        let err = response(vec![source(1.5)]).validate().unwrap_err();
        assert!(err.client_message().contains("confidence"));
    }

    #[test]
    fn high_quality_requires_two_sources_and_average_confidence() {
        assert!(!response(vec![source(0.9)]).is_high_quality());
        assert!(response(vec![source(0.9), source(0.7)]).is_high_quality());
        assert!(!response(vec![source(0.9), source(0.1)]).is_high_quality());
    }

    #[test]
    fn excerpt_501_scalars_truncated_500_accepted_as_is() {
        let mut with_501 = source(0.5);
        with_501.excerpt = "x".repeat(501);
        with_501.truncate_excerpt();
        assert_eq!(with_501.excerpt.chars().count(), 500);

        let mut with_500 = source(0.5);
        with_500.excerpt = "x".repeat(500);
        let before = with_500.excerpt.clone();
        with_500.truncate_excerpt();
        assert_eq!(with_500.excerpt, before);
    }

    #[test]
    fn rounded_confidence_has_three_decimal_places() {
        let s = source(0.123456);
        assert_eq!(s.rounded_confidence(), 0.123);
    }
}
