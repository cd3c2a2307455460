//! UploadSession entity (§3) — a time-limited one-shot direct upload
//! authorization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::document::ObjectLocator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Used,
    Expired,
    Canceled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Used => "used",
            SessionStatus::Expired => "expired",
            SessionStatus::Canceled => "canceled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadSession {
    pub id: Uuid,
    pub document_id: Uuid,
    pub file_name: String,
    pub file_size: u64,
    pub file_type: String,
    pub upload_url: String,
    pub storage: ObjectLocator,
    pub status: SessionStatus,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

impl UploadSession {
    /// Active iff `status == active` AND `now < expiresAt` — expiry is
    /// implicit, checked on read rather than written back (§4.6).
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.status == SessionStatus::Active && now < self.expires_at
    }

    /// The effective status, resolving the implicit `active -> expired`
    /// transition at read time without mutating the stored record.
    pub fn effective_status(&self, now: DateTime<Utc>) -> SessionStatus {
        if self.status == SessionStatus::Active && now >= self.expires_at {
            SessionStatus::Expired
        } else {
            self.status
        }
    }
}

/// I8: the object-store key is deterministic from the session: document id,
/// creation timestamp (`YYYYMMDDHHMMSS`), and file name.
pub fn deterministic_object_key(
    document_id: Uuid,
    created_at: DateTime<Utc>,
    file_name: &str,
) -> String {
    format!(
        "documents/{document_id}/{}_{file_name}",
        created_at.format("%Y%m%d%H%M%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn deterministic_key_matches_i8_format() {
        let doc_id = Uuid::nil();
        let created = Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 7).unwrap();
        let key = deterministic_object_key(doc_id, created, "notes.md");
        assert_eq!(
            key,
            format!("documents/{doc_id}/20240305093007_notes.md")
        );
    }

    fn session(status: SessionStatus, expires_at: DateTime<Utc>) -> UploadSession {
        let now = Utc::now();
        UploadSession {
            id: Uuid::new_v4(),
            document_id: Uuid::new_v4(),
            file_name: "a.md".to_string(),
            file_size: 1,
            file_type: "md".to_string(),
            upload_url: "https://example.com/put".to_string(),
            storage: ObjectLocator {
                bucket: "b".to_string(),
                key: "documents/x/a.md".to_string(),
            },
            status,
            expires_at,
            created_at: now,
            updated_at: now,
            used_at: None,
        }
    }

    #[test]
    fn active_session_before_expiry_is_active() {
        let now = Utc::now();
        let s = session(SessionStatus::Active, now + Duration::minutes(5));
        assert!(s.is_active(now));
    }

    #[test]
    fn active_session_past_expiry_is_not_active() {
        let now = Utc::now();
        let s = session(SessionStatus::Active, now - Duration::minutes(1));
        assert!(!s.is_active(now));
        assert_eq!(s.effective_status(now), SessionStatus::Expired);
    }

    #[test]
    fn used_session_is_never_active_regardless_of_expiry() {
        let now = Utc::now();
        let s = session(SessionStatus::Used, now + Duration::minutes(5));
        assert!(!s.is_active(now));
    }
}
