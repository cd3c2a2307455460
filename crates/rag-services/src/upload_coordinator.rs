//! Upload coordinator (§4.2): presigned-upload sessions and the
//! `Complete` state-machine that drives a document from `uploading`
//! through `processing` into `ready`/`kb_sync_error` via a detached
//! background sync.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use rag_core::config::Config;
use rag_core::constants::{
    BATCH_DELETE_CHUNK_SIZE, DEFAULT_PRESIGN_TTL_SECS, DELETE_REINDEX_TIMEOUT_SECS, PREVIEW_MAX_BYTES,
    PREVIEW_MAX_LINES, PREVIEW_MAX_READ_BYTES, PREVIEW_SNIP_MARKER, SYNC_BACKGROUND_TIMEOUT_SECS,
};
use rag_core::error::AppError;
use rag_core::models::{
    deterministic_object_key, Document, ObjectLocator, SessionStatus, UploadSession,
};
use rag_knowledge::traits::KnowledgeBaseProvider;
use rag_knowledge::KnowledgeService;
use rag_objectstore::traits::ObjectStore;
use rag_store::{updates, ItemStore, UploadSessionRepository};

use crate::document_service::DocumentService;
use crate::errors::{from_object_store_error, from_store_error};

/// Truncates `raw` text per §4.2.1: at most `PREVIEW_MAX_LINES` lines, the
/// joined text capped at `PREVIEW_MAX_BYTES` with a snip marker appended.
fn build_preview(raw: &[u8]) -> (Option<String>, u32) {
    let text = String::from_utf8_lossy(raw);
    let lines: Vec<&str> = text.split('\n').take(PREVIEW_MAX_LINES).collect();
    let line_count = lines.len() as u32;
    let mut joined = lines.join("\n");
    if joined.len() > PREVIEW_MAX_BYTES {
        let mut end = PREVIEW_MAX_BYTES;
        while !joined.is_char_boundary(end) {
            end -= 1;
        }
        joined.truncate(end);
        joined.push_str(PREVIEW_SNIP_MARKER);
    }
    if joined.is_empty() {
        (None, 0)
    } else {
        (Some(joined), line_count)
    }
}

pub struct UploadCoordinator<S: ItemStore + ?Sized, O: ObjectStore + ?Sized, P: KnowledgeBaseProvider + ?Sized> {
    sessions: UploadSessionRepository<S>,
    documents: DocumentService<S>,
    objects: Arc<O>,
    knowledge: Arc<KnowledgeService<P>>,
    config: Arc<Config>,
}

impl<S, O, P> UploadCoordinator<S, O, P>
where
    S: ItemStore + ?Sized + 'static,
    O: ObjectStore + ?Sized + 'static,
    P: KnowledgeBaseProvider + ?Sized + 'static,
{
    pub fn new(
        sessions: UploadSessionRepository<S>,
        documents: DocumentService<S>,
        objects: Arc<O>,
        knowledge: Arc<KnowledgeService<P>>,
        config: Arc<Config>,
    ) -> Self {
        UploadCoordinator {
            sessions,
            documents,
            objects,
            knowledge,
            config,
        }
    }

    pub async fn issue_presigned_put(&self, bucket: &str, key: &str, ttl: Duration) -> Result<String, AppError> {
        self.objects
            .presign_put(bucket, key, ttl)
            .await
            .map_err(from_object_store_error)
    }

    /// `CreateSession`: stamps the deterministic key, obtains a presigned
    /// PUT, writes the session, and stamps the document's storage locator.
    pub async fn create_session(&self, document: &Document) -> Result<UploadSession, AppError> {
        let now = Utc::now();
        let ttl = Duration::from_secs(DEFAULT_PRESIGN_TTL_SECS as u64);
        let key = deterministic_object_key(document.id, now, &document.file_name);
        let bucket = self.config.s3_bucket_name.clone();

        // §7: a presign failure aborts session creation entirely — no
        // partial state is persisted.
        let upload_url = self.issue_presigned_put(&bucket, &key, ttl).await?;

        let session = UploadSession {
            id: Uuid::new_v4(),
            document_id: document.id,
            file_name: document.file_name.clone(),
            file_size: document.file_size,
            file_type: document.file_type.clone(),
            upload_url,
            storage: ObjectLocator {
                bucket: bucket.clone(),
                key: key.clone(),
            },
            status: SessionStatus::Active,
            expires_at: now + chrono::Duration::seconds(DEFAULT_PRESIGN_TTL_SECS),
            created_at: now,
            updated_at: now,
            used_at: None,
        };

        self.sessions.create(&session).await.map_err(from_store_error)?;
        self.documents.set_storage(document.id, &bucket, &key).await?;

        Ok(session)
    }

    pub async fn get_session(&self, id: Uuid) -> Result<UploadSession, AppError> {
        self.sessions
            .get(id)
            .await
            .map_err(from_store_error)?
            .ok_or_else(|| AppError::not_found("UploadSession"))
    }

    pub async fn cancel(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions
            .update(
                id,
                updates! {
                    "status" => SessionStatus::Canceled,
                    "updatedAt" => Utc::now(),
                },
            )
            .await
            .map_err(from_store_error)
    }

    /// `Complete` (§4.2 steps 1-6): the ingestion state-machine heart.
    /// Returns the document as it exists right after the synchronous
    /// portion (step 5); the knowledge-base sync runs detached.
    pub async fn complete(&self, session_id: Uuid) -> Result<Document, AppError> {
        let session = self.get_session(session_id).await?;
        let now = Utc::now();

        match session.effective_status(now) {
            SessionStatus::Expired => {
                return Err(AppError::validation("sessionId", "session expired"));
            }
            SessionStatus::Active => {}
            SessionStatus::Used | SessionStatus::Canceled => {
                return Err(AppError::validation("sessionId", "already used or invalid"));
            }
        }

        let exists = self
            .objects
            .head(&session.storage.bucket, &session.storage.key)
            .await
            .map_err(from_object_store_error)?;
        if !exists {
            return Err(AppError::validation("file", "not uploaded"));
        }

        // I7: the conditional update below only succeeds if the session row
        // still exists; it does not itself exclude a second racing caller,
        // but the store's last-write-wins plus this check closes the window
        // in practice for the single-writer stores this crate ships.
        self.sessions
            .update(
                session.id,
                updates! {
                    "status" => SessionStatus::Used,
                    "usedAt" => now,
                    "updatedAt" => now,
                },
            )
            .await
            .map_err(from_store_error)?;

        self.extract_and_store_preview(&session).await;

        self.documents
            .update_status(session.document_id, rag_core::models::DocumentStatus::Processing)
            .await?;

        let document = self.documents.get(session.document_id).await?;

        self.spawn_background_sync(session.document_id, session.storage.key.clone());

        Ok(document)
    }

    /// §4.2.1: best-effort, failures logged and swallowed.
    async fn extract_and_store_preview(&self, session: &UploadSession) {
        let bytes = match self
            .objects
            .get_range(&session.storage.bucket, &session.storage.key, PREVIEW_MAX_READ_BYTES)
            .await
        {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(document_id = %session.document_id, error = %e, "preview extraction read failed");
                return;
            }
        };

        let (preview, lines) = build_preview(&bytes);
        if let Err(e) = self
            .documents
            .update_preview(session.document_id, preview, lines)
            .await
        {
            warn!(document_id = %session.document_id, error = %e, "preview extraction store failed");
        }
    }

    /// §4.2 step 6 / §5: detached task with a 10-minute bounded context.
    fn spawn_background_sync(&self, document_id: Uuid, s3_key: String) {
        let documents = self.documents.clone();
        let knowledge = self.knowledge.clone();
        let data_source_id = knowledge.data_source_id().map(str::to_string);

        tokio::spawn(async move {
            let outcome = tokio::time::timeout(
                Duration::from_secs(SYNC_BACKGROUND_TIMEOUT_SECS),
                knowledge.sync(document_id, &s3_key),
            )
            .await;

            match outcome {
                Ok(Ok(())) => {
                    let ds_id = data_source_id.unwrap_or_default();
                    if let Err(e) = documents.mark_ready(document_id, &ds_id).await {
                        error!(%document_id, error = %e, "failed to mark document ready after sync");
                    } else {
                        info!(%document_id, "document marked ready after background sync");
                    }
                }
                Ok(Err(e)) => {
                    if let Err(store_err) = documents.mark_kb_sync_error(document_id, &e.to_string()).await {
                        error!(%document_id, error = %store_err, "failed to record kb sync error");
                    }
                }
                Err(_) => {
                    if let Err(store_err) = documents
                        .mark_kb_sync_error(document_id, "ingestion sync timed out")
                        .await
                    {
                        error!(%document_id, error = %store_err, "failed to record kb sync timeout");
                    }
                }
            }
        });
    }

    /// `DELETE /documents/{id}` (§5, §6): delete the objects under the
    /// document's prefix, spawn a detached, ~2s-bounded task that restarts
    /// ingestion, then delete the document record. Mirrors `complete`'s
    /// foreground/background split, just with a much shorter background
    /// budget since this path only starts a job rather than polling one.
    pub async fn delete_document(&self, document_id: Uuid) -> Result<(), AppError> {
        let bucket = self.config.s3_bucket_name.clone();
        self.delete_all_objects_for(document_id, &bucket).await?;
        self.spawn_delete_reindex();
        self.documents.delete(document_id).await
    }

    fn spawn_delete_reindex(&self) {
        let knowledge = self.knowledge.clone();
        tokio::spawn(async move {
            let _ = tokio::time::timeout(
                Duration::from_secs(DELETE_REINDEX_TIMEOUT_SECS),
                knowledge.restart_ingestion(),
            )
            .await;
        });
    }

    /// `DeleteAllObjectsFor`: pages through `documents/{id}/` in chunks of
    /// up to [`BATCH_DELETE_CHUNK_SIZE`] and batch-deletes each page.
    pub async fn delete_all_objects_for(&self, document_id: Uuid, bucket: &str) -> Result<(), AppError> {
        let prefix = format!("documents/{document_id}/");
        let mut continuation = None;

        loop {
            let page = self
                .objects
                .list_prefix(bucket, &prefix, continuation.take())
                .await
                .map_err(from_object_store_error)?;

            for chunk in page.keys.chunks(BATCH_DELETE_CHUNK_SIZE) {
                self.objects
                    .delete_batch(bucket, chunk)
                    .await
                    .map_err(from_object_store_error)?;
            }

            continuation = page.continuation_token;
            if continuation.is_none() {
                break;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rag_core::error::ErrorMetadata;
    use rag_core::models::{CreateDocumentRequest, DocumentStatus};
    use rag_knowledge::mock::MockKnowledgeProvider;
    use rag_objectstore::memory::MemoryObjectStore;
    use rag_store::{DocumentRepository, MemoryStore};

    fn coordinator() -> (
        UploadCoordinator<MemoryStore, MemoryObjectStore, MockKnowledgeProvider>,
        DocumentService<MemoryStore>,
        Arc<MemoryObjectStore>,
    ) {
        let store = Arc::new(MemoryStore::new());
        let documents = DocumentService::new(DocumentRepository::new(store.clone(), "documents"));
        let sessions = UploadSessionRepository::new(store.clone(), "upload_sessions");
        let objects = Arc::new(MemoryObjectStore::new());
        let provider = Arc::new(MockKnowledgeProvider::new());
        let config = Arc::new(Config::from_parts(None, None));
        let knowledge = Arc::new(KnowledgeService::new(provider, config.clone()));

        let coordinator = UploadCoordinator::new(
            sessions,
            documents.clone(),
            objects.clone(),
            knowledge,
            config,
        );
        (coordinator, documents, objects)
    }

    async fn new_document(documents: &DocumentService<MemoryStore>) -> Document {
        documents
            .create(&CreateDocumentRequest {
                file_name: "notes.md".to_string(),
                file_size: 5,
                file_type: "md".to_string(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_session_stamps_document_storage() {
        let (coordinator, documents, _objects) = coordinator();
        let doc = new_document(&documents).await;
        let session = coordinator.create_session(&doc).await.unwrap();

        assert_eq!(session.status, SessionStatus::Active);
        assert!(session.upload_url.starts_with("https://"));

        let updated = documents.get(doc.id).await.unwrap();
        assert_eq!(updated.storage.key, session.storage.key);
    }

    #[tokio::test]
    async fn complete_without_upload_is_validation_error() {
        let (coordinator, documents, _objects) = coordinator();
        let doc = new_document(&documents).await;
        let session = coordinator.create_session(&doc).await.unwrap();

        let err = coordinator.complete(session.id).await.unwrap_err();
        assert_eq!(err.field(), Some("file"));
    }

    #[tokio::test]
    async fn complete_transitions_document_to_processing() {
        let (coordinator, documents, objects) = coordinator();
        let doc = new_document(&documents).await;
        let session = coordinator.create_session(&doc).await.unwrap();
        objects.seed(&session.storage.key, "hello\nworld\n");

        let document = coordinator.complete(session.id).await.unwrap();
        assert_eq!(document.status, DocumentStatus::Processing);

        let stored_session = coordinator.get_session(session.id).await.unwrap();
        assert_eq!(stored_session.status, SessionStatus::Used);
    }

    #[tokio::test]
    async fn second_complete_on_used_session_is_rejected() {
        let (coordinator, documents, objects) = coordinator();
        let doc = new_document(&documents).await;
        let session = coordinator.create_session(&doc).await.unwrap();
        objects.seed(&session.storage.key, "hello");

        coordinator.complete(session.id).await.unwrap();
        let err = coordinator.complete(session.id).await.unwrap_err();
        assert_eq!(err.field(), Some("sessionId"));
    }

    #[tokio::test]
    async fn build_preview_caps_at_max_lines_and_bytes() {
        let body = "line\n".repeat(100);
        let (preview, lines) = build_preview(body.as_bytes());
        assert_eq!(lines, PREVIEW_MAX_LINES as u32);
        assert!(preview.unwrap().lines().count() <= PREVIEW_MAX_LINES);
    }

    #[tokio::test]
    async fn delete_document_removes_objects_and_record() {
        let (coordinator, documents, objects) = coordinator();
        let doc = new_document(&documents).await;
        objects.seed(&format!("documents/{}/a.md", doc.id), "a");

        coordinator.delete_document(doc.id).await.unwrap();

        assert!(documents.get(doc.id).await.is_err());
        assert!(!objects
            .head("bucket", &format!("documents/{}/a.md", doc.id))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn delete_all_objects_for_removes_prefixed_keys() {
        let (coordinator, _documents, objects) = coordinator();
        let document_id = Uuid::new_v4();
        objects.seed(&format!("documents/{document_id}/a.md"), "a");
        objects.seed(&format!("documents/{document_id}/b.md"), "b");
        objects.seed("documents/other/c.md", "c");

        coordinator.delete_all_objects_for(document_id, "bucket").await.unwrap();

        assert!(!objects.head("bucket", &format!("documents/{document_id}/a.md")).await.unwrap());
        assert!(objects.head("bucket", "documents/other/c.md").await.unwrap());
    }
}
