//! Query entity (§3) — a user question within a session, driven through
//! `pending -> processing -> completed|failed` by the query orchestrator.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::constants::MAX_QUESTION_CHARS;
use crate::constants::{PENDING_STALE_AFTER_SECS, PROCESSING_STALE_AFTER_SECS};
use crate::error::{AppError, ErrorMetadata};
use crate::sanitize::sanitize_question;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl QueryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryStatus::Pending => "pending",
            QueryStatus::Processing => "processing",
            QueryStatus::Completed => "completed",
            QueryStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, QueryStatus::Completed | QueryStatus::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub id: Uuid,
    pub session_id: String,
    pub question: String,
    pub status: QueryStatus,
    pub processing_time_ms: u64,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub processing_started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Query {
    /// I6 (terminal half): `completed`/`failed` implies `completedAt` set.
    pub fn check_terminal_invariant(&self) -> bool {
        if self.status.is_terminal() {
            self.completed_at.is_some()
        } else {
            true
        }
    }

    /// Staleness per §3: `pending` for too long, or `processing` for too
    /// long. Reported, never auto-remediated.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            QueryStatus::Pending => {
                (now - self.created_at).num_seconds() > PENDING_STALE_AFTER_SECS
            }
            QueryStatus::Processing => match self.processing_started_at {
                Some(started) => (now - started).num_seconds() > PROCESSING_STALE_AFTER_SECS,
                None => false,
            },
            QueryStatus::Completed | QueryStatus::Failed => false,
        }
    }
}

/// Validated request body for `POST /queries` (§6).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQueryRequest {
    #[validate(custom(function = "validate_question_length"))]
    pub question: String,
    #[validate(length(
        min = 10,
        max = 50,
        message = "sessionId must be between 10 and 50 characters"
    ))]
    pub session_id: String,
}

/// Measured on the trimmed, pre-escape text per §3 ("non-empty, <= 1000
/// characters after trimming") — not expressible as a declarative `length`
/// bound since the raw field isn't trimmed yet.
fn validate_question_length(question: &str) -> Result<(), ValidationError> {
    let trimmed_len = question.trim().chars().count();
    if trimmed_len == 0 {
        return Err(ValidationError::new("question_required").with_message(Cow::from("question is required")));
    }
    if trimmed_len > MAX_QUESTION_CHARS {
        return Err(ValidationError::new("question_too_long").with_message(Cow::from(
            format!("question must be at most {MAX_QUESTION_CHARS} characters"),
        )));
    }
    Ok(())
}

impl CreateQueryRequest {
    /// Validates, then returns the sanitized question ready for persistence.
    pub fn validate_and_sanitize(&self) -> Result<String, AppError> {
        self.validate()?;
        Ok(sanitize_question(&self.question))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base_query(status: QueryStatus) -> Query {
        let now = Utc::now();
        Query {
            id: Uuid::new_v4(),
            session_id: "session_1_abc".to_string(),
            question: "hello".to_string(),
            status,
            processing_time_ms: 0,
            error_message: None,
            created_at: now,
            updated_at: now,
            processing_started_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn rejects_empty_question() {
        let req = CreateQueryRequest {
            question: "   ".to_string(),
            session_id: "session_1_abc".to_string(),
        };
        assert_eq!(req.validate_and_sanitize().unwrap_err().field(), Some("question"));
    }

    #[test]
    fn accepts_exactly_1000_chars_rejects_1001() {
        let ok = CreateQueryRequest {
            question: "a".repeat(1000),
            session_id: "session_1_abcdef".to_string(),
        };
        assert!(ok.validate_and_sanitize().is_ok());

        let too_long = CreateQueryRequest {
            question: "a".repeat(1001),
            session_id: "session_1_abcdef".to_string(),
        };
        assert!(too_long.validate_and_sanitize().is_err());
    }

    #[test]
    fn rejects_session_id_out_of_bounds() {
        let short = CreateQueryRequest {
            question: "hi".to_string(),
            session_id: "short".to_string(),
        };
        assert_eq!(
            short.validate_and_sanitize().unwrap_err().field(),
            Some("sessionId")
        );

        let long = CreateQueryRequest {
            question: "hi".to_string(),
            session_id: "x".repeat(51),
        };
        assert_eq!(
            long.validate_and_sanitize().unwrap_err().field(),
            Some("sessionId")
        );
    }

    #[test]
    fn pending_query_is_stale_after_ten_minutes() {
        let mut q = base_query(QueryStatus::Pending);
        q.created_at = Utc::now() - Duration::minutes(11);
        assert!(q.is_stale(Utc::now()));
    }

    #[test]
    fn processing_query_is_stale_after_fifteen_minutes() {
        let mut q = base_query(QueryStatus::Processing);
        q.processing_started_at = Some(Utc::now() - Duration::minutes(16));
        assert!(q.is_stale(Utc::now()));
    }

    #[test]
    fn completed_query_is_never_stale() {
        let q = base_query(QueryStatus::Completed);
        assert!(!q.is_stale(Utc::now()));
    }

    #[test]
    fn terminal_status_without_completed_at_violates_invariant() {
        let q = base_query(QueryStatus::Failed);
        assert!(!q.check_terminal_invariant());
    }
}
