//! Document entity (§3) — an uploaded text artifact tracked through
//! `uploading -> processing -> ready` (or `error` / `kb_sync_error`).

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::constants::{ALLOWED_FILE_TYPES, MAX_DOCUMENT_SIZE_BYTES};
use crate::error::{AppError, ErrorMetadata};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Uploading,
    Processing,
    Ready,
    Error,
    KbSyncError,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Uploading => "uploading",
            DocumentStatus::Processing => "processing",
            DocumentStatus::Ready => "ready",
            DocumentStatus::Error => "error",
            DocumentStatus::KbSyncError => "kb_sync_error",
        }
    }
}

impl std::str::FromStr for DocumentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uploading" => Ok(DocumentStatus::Uploading),
            "processing" => Ok(DocumentStatus::Processing),
            "ready" => Ok(DocumentStatus::Ready),
            "error" => Ok(DocumentStatus::Error),
            "kb_sync_error" => Ok(DocumentStatus::KbSyncError),
            other => Err(AppError::validation(
                "status",
                format!("unknown document status '{other}'"),
            )),
        }
    }
}

/// Object-store locator for a document's underlying object.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ObjectLocator {
    pub bucket: String,
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub file_name: String,
    pub file_size: u64,
    pub file_type: String,
    pub storage: ObjectLocator,
    pub status: DocumentStatus,
    pub preview: Option<String>,
    pub preview_lines: Option<u32>,
    pub error_message: Option<String>,
    /// External knowledge-base data-source id, set once indexing succeeds.
    pub data_source_id: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// I6 (ready half): `ready` implies `processedAt` and `dataSourceId` set.
    pub fn check_ready_invariant(&self) -> bool {
        if self.status != DocumentStatus::Ready {
            return true;
        }
        self.processed_at.is_some() && self.data_source_id.is_some()
    }

    /// I6 (error half): `error`/`kb_sync_error` implies an error message.
    pub fn check_error_invariant(&self) -> bool {
        match self.status {
            DocumentStatus::Error | DocumentStatus::KbSyncError => self.error_message.is_some(),
            _ => true,
        }
    }

    /// Business rule: delete is only permitted for `ready`/`error` documents
    /// (§4.1; the HTTP adapter is responsible for enforcing this per §9's
    /// open question — the core only exposes the predicate).
    pub fn deletable(&self) -> bool {
        matches!(self.status, DocumentStatus::Ready | DocumentStatus::Error)
    }
}

/// Validated request body for `POST /documents` (§6). I1/I2: name required,
/// size in `1..=50 MiB`, type in `{txt, md}`.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentRequest {
    #[validate(custom(function = "validate_non_blank_file_name"))]
    pub file_name: String,
    #[validate(range(min = 1, max = 52_428_800, message = "fileSize must be between 1 and 52428800 bytes"))]
    pub file_size: u64,
    #[validate(custom(function = "validate_file_type"))]
    pub file_type: String,
}

fn validate_non_blank_file_name(file_name: &str) -> Result<(), ValidationError> {
    if file_name.trim().is_empty() {
        Err(ValidationError::new("file_name_required").with_message(Cow::from("fileName is required")))
    } else {
        Ok(())
    }
}

fn validate_file_type(file_type: &str) -> Result<(), ValidationError> {
    if ALLOWED_FILE_TYPES.contains(&file_type) {
        Ok(())
    } else {
        Err(ValidationError::new("file_type_not_allowed")
            .with_message(Cow::from("fileType must be one of [\"txt\", \"md\"]")))
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentView {
    pub id: Uuid,
    pub file_name: String,
    pub file_size: u64,
    pub file_type: String,
    pub status: DocumentStatus,
    pub preview: Option<String>,
    pub preview_lines: Option<u32>,
    pub error_message: Option<String>,
    pub data_source_id: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Document> for DocumentView {
    fn from(d: Document) -> Self {
        DocumentView {
            id: d.id,
            file_name: d.file_name,
            file_size: d.file_size,
            file_type: d.file_type,
            status: d.status,
            preview: d.preview,
            preview_lines: d.preview_lines,
            error_message: d.error_message,
            data_source_id: d.data_source_id,
            uploaded_at: d.uploaded_at,
            processed_at: d.processed_at,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_document(status: DocumentStatus) -> Document {
        let now = Utc::now();
        Document {
            id: Uuid::new_v4(),
            file_name: "a.md".to_string(),
            file_size: 12,
            file_type: "md".to_string(),
            storage: ObjectLocator {
                bucket: "bucket".to_string(),
                key: "documents/x/a.md".to_string(),
            },
            status,
            preview: None,
            preview_lines: None,
            error_message: None,
            data_source_id: None,
            uploaded_at: now,
            processed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn create_request_rejects_oversize() {
        let req = CreateDocumentRequest {
            file_name: "big.txt".to_string(),
            file_size: MAX_DOCUMENT_SIZE_BYTES + 1,
            file_type: "txt".to_string(),
        };
        let err: AppError = req.validate().unwrap_err().into();
        assert_eq!(err.field(), Some("fileSize"));
    }

    #[test]
    fn create_request_accepts_exact_max_size() {
        let req = CreateDocumentRequest {
            file_name: "big.txt".to_string(),
            file_size: MAX_DOCUMENT_SIZE_BYTES,
            file_type: "txt".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn create_request_rejects_unsupported_type() {
        let req = CreateDocumentRequest {
            file_name: "doc.pdf".to_string(),
            file_size: 100,
            file_type: "pdf".to_string(),
        };
        let err: AppError = req.validate().unwrap_err().into();
        assert_eq!(err.field(), Some("fileType"));
    }

    #[test]
    fn ready_without_processed_at_violates_invariant() {
        let mut doc = base_document(DocumentStatus::Ready);
        doc.data_source_id = Some("ds-1".to_string());
        assert!(!doc.check_ready_invariant());
        doc.processed_at = Some(Utc::now());
        assert!(doc.check_ready_invariant());
    }

    #[test]
    fn error_without_message_violates_invariant() {
        let doc = base_document(DocumentStatus::Error);
        assert!(!doc.check_error_invariant());
    }

    #[test]
    fn only_ready_or_error_documents_are_deletable() {
        assert!(base_document(DocumentStatus::Ready).deletable());
        assert!(base_document(DocumentStatus::Error).deletable());
        assert!(!base_document(DocumentStatus::Processing).deletable());
        assert!(!base_document(DocumentStatus::Uploading).deletable());
    }
}
