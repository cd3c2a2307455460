//! Document service (§4.1): CRUD over documents and the status
//! transitions driven by the upload coordinator and the background
//! indexer.

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use rag_core::constants::{DOCUMENTS_LIST_DEFAULT_LIMIT, DOCUMENTS_LIST_MAX_LIMIT};
use rag_core::error::AppError;
use rag_core::models::{CreateDocumentRequest, Document, DocumentStatus, ObjectLocator, Page};
use rag_store::{updates, DocumentRepository, Item, ItemStore};

use crate::errors::from_store_error;

/// Clamps a caller-supplied `limit` to `[1, max]`, defaulting to `default`
/// when absent (§4.1: documents list default 20, max 100).
pub fn clamp_limit(limit: Option<u32>, default: u32, max: u32) -> Result<u32, AppError> {
    match limit {
        None => Ok(default),
        Some(l) if l == 0 || l > max => Err(AppError::validation(
            "limit",
            format!("limit must be between 1 and {max}"),
        )),
        Some(l) => Ok(l),
    }
}

pub struct DocumentService<S: ItemStore + ?Sized> {
    repo: DocumentRepository<S>,
}

impl<S: ItemStore + ?Sized> Clone for DocumentService<S> {
    fn clone(&self) -> Self {
        DocumentService {
            repo: self.repo.clone(),
        }
    }
}

impl<S: ItemStore + ?Sized> DocumentService<S> {
    pub fn new(repo: DocumentRepository<S>) -> Self {
        DocumentService { repo }
    }

    /// `Create`: validates the body, assigns a fresh id, and persists the
    /// document in `uploading` status. The object-store locator is filled
    /// in later by the upload coordinator via [`Self::set_storage`].
    pub async fn create(&self, req: &CreateDocumentRequest) -> Result<Document, AppError> {
        req.validate()?;
        let now = Utc::now();
        let document = Document {
            id: Uuid::new_v4(),
            file_name: req.file_name.clone(),
            file_size: req.file_size,
            file_type: req.file_type.clone(),
            storage: ObjectLocator {
                bucket: String::new(),
                key: String::new(),
            },
            status: DocumentStatus::Uploading,
            preview: None,
            preview_lines: None,
            error_message: None,
            data_source_id: None,
            uploaded_at: now,
            processed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.repo.create(&document).await.map_err(from_store_error)?;
        Ok(document)
    }

    pub async fn get(&self, id: Uuid) -> Result<Document, AppError> {
        self.repo
            .get(id)
            .await
            .map_err(from_store_error)?
            .ok_or_else(|| AppError::not_found("Document"))
    }

    /// `List`: fetches `limit + 1` rows to derive `hasMore` without a
    /// separate count query (§4.1, §9).
    pub async fn list(&self, offset: u32, limit: Option<u32>) -> Result<Page<Document>, AppError> {
        let limit = clamp_limit(limit, DOCUMENTS_LIST_DEFAULT_LIMIT, DOCUMENTS_LIST_MAX_LIMIT)?;
        let rows = self
            .repo
            .list(offset as usize, limit as usize)
            .await
            .map_err(from_store_error)?;
        Ok(Page::from_overfetch(rows, limit as usize))
    }

    /// Stamps the object-store locator once the upload coordinator has
    /// computed the deterministic key (§4.2).
    pub async fn set_storage(&self, id: Uuid, bucket: &str, key: &str) -> Result<(), AppError> {
        self.update(
            id,
            updates! {
                "storage" => ObjectLocator { bucket: bucket.to_string(), key: key.to_string() },
                "updatedAt" => Utc::now(),
            },
        )
        .await
    }

    pub async fn update_status(&self, id: Uuid, status: DocumentStatus) -> Result<(), AppError> {
        self.update(
            id,
            updates! {
                "status" => status,
                "updatedAt" => Utc::now(),
            },
        )
        .await
    }

    /// `UpdatePreview` (§4.2.1): best-effort, so callers swallow failures
    /// from this rather than propagate them into `Complete`.
    pub async fn update_preview(
        &self,
        id: Uuid,
        preview: Option<String>,
        lines: u32,
    ) -> Result<(), AppError> {
        self.update(
            id,
            updates! {
                "preview" => preview,
                "previewLines" => lines,
                "updatedAt" => Utc::now(),
            },
        )
        .await
    }

    /// `MarkReady`: sets `processedAt` and the external data-source id
    /// together so I6's ready invariant always holds (§3).
    pub async fn mark_ready(&self, id: Uuid, data_source_id: &str) -> Result<(), AppError> {
        let now = Utc::now();
        self.update(
            id,
            updates! {
                "status" => DocumentStatus::Ready,
                "dataSourceId" => data_source_id,
                "processedAt" => now,
                "updatedAt" => now,
            },
        )
        .await
    }

    pub async fn mark_error(&self, id: Uuid, message: &str) -> Result<(), AppError> {
        self.update(
            id,
            updates! {
                "status" => DocumentStatus::Error,
                "errorMessage" => message,
                "updatedAt" => Utc::now(),
            },
        )
        .await
    }

    pub async fn mark_kb_sync_error(&self, id: Uuid, message: &str) -> Result<(), AppError> {
        self.update(
            id,
            updates! {
                "status" => DocumentStatus::KbSyncError,
                "errorMessage" => message,
                "updatedAt" => Utc::now(),
            },
        )
        .await
    }

    /// Delete is unconditional at the store level (§4.1); the HTTP adapter
    /// is responsible for the id-shape and `deletable()` checks per §9's
    /// open question.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.repo.delete(id).await.map_err(from_store_error)
    }

    async fn update(&self, id: Uuid, updates: Item) -> Result<(), AppError> {
        self.repo.update(id, updates).await.map_err(from_store_error)
    }
}
