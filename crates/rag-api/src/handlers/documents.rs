//! `/documents` routes (§6): upload-session issuance, listing, lookup,
//! upload completion, and delete.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use rag_core::error::AppError;
use rag_core::models::{CreateDocumentRequest, DocumentView, UploadSession};
use rag_knowledge::traits::KnowledgeBaseProvider;
use rag_objectstore::traits::ObjectStore;
use rag_store::traits::ItemStore;

use crate::error::{ErrorEnvelope, HttpAppError, ValidatedJson};
use crate::state::AppState;

/// Parses a path segment as a document/session id, surfacing a
/// `ValidationError` (not a bare 400) when it isn't 36 characters long —
/// the shape check §4.1 delegates to the caller.
fn parse_uuid_path(field: &str, raw: &str) -> Result<Uuid, AppError> {
    if raw.len() != 36 {
        return Err(AppError::validation(field, format!("{field} must be a UUID")));
    }
    raw.parse()
        .map_err(|_| AppError::validation(field, format!("{field} must be a UUID")))
}

#[derive(Deserialize, IntoParams)]
pub struct ListQuery {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentListResponse {
    pub items: Vec<DocumentView>,
    pub has_more: bool,
}

/// `POST /documents`: creates the document record (status `uploading`)
/// then issues the presigned-upload session for it, returning the session
/// (§6: "returns UploadSession (201)").
#[utoipa::path(
    post,
    path = "/documents",
    tag = "documents",
    request_body = CreateDocumentRequest,
    responses(
        (status = 201, description = "Upload session issued", body = UploadSession),
        (status = 400, description = "Invalid input", body = ErrorEnvelope)
    )
)]
pub async fn create<S, O, P>(
    State(state): State<Arc<AppState<S, O, P>>>,
    ValidatedJson(body): ValidatedJson<CreateDocumentRequest>,
) -> Result<impl IntoResponse, HttpAppError>
where
    S: ItemStore + ?Sized + 'static,
    O: ObjectStore + ?Sized + 'static,
    P: KnowledgeBaseProvider + ?Sized + 'static,
{
    let document = state.documents.create(&body).await?;
    let session = state.uploads.create_session(&document).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// `GET /documents?offset&limit`.
#[utoipa::path(
    get,
    path = "/documents",
    tag = "documents",
    params(ListQuery),
    responses(
        (status = 200, description = "Documents page", body = DocumentListResponse)
    )
)]
pub async fn list<S, O, P>(
    State(state): State<Arc<AppState<S, O, P>>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, HttpAppError>
where
    S: ItemStore + ?Sized + 'static,
    O: ObjectStore + ?Sized + 'static,
    P: KnowledgeBaseProvider + ?Sized + 'static,
{
    let page = state.documents.list(query.offset.unwrap_or(0), query.limit).await?;
    let items: Vec<DocumentView> = page.items.into_iter().map(DocumentView::from).collect();
    Ok(Json(DocumentListResponse {
        items,
        has_more: page.has_more,
    }))
}

/// `GET /documents/{id}`.
#[utoipa::path(
    get,
    path = "/documents/{id}",
    tag = "documents",
    params(("id" = String, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document found", body = DocumentView),
        (status = 404, description = "Document not found", body = ErrorEnvelope)
    )
)]
pub async fn get<S, O, P>(
    State(state): State<Arc<AppState<S, O, P>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError>
where
    S: ItemStore + ?Sized + 'static,
    O: ObjectStore + ?Sized + 'static,
    P: KnowledgeBaseProvider + ?Sized + 'static,
{
    let id = parse_uuid_path("id", &id)?;
    let document = state.documents.get(id).await?;
    Ok(Json(DocumentView::from(document)))
}

/// `POST /documents/{id}/complete-upload`.
///
/// §9's open question: the path value is treated as a session id (the
/// `sessionId`-preferred half of the documented behavior). A client that
/// sends a document id here gets a `ValidationError` from `UploadSession`
/// lookup, same as the original; we don't silently fall back to a
/// document-id lookup since the spec leaves that as implementer's choice
/// and we'd rather fail loudly than guess.
#[utoipa::path(
    post,
    path = "/documents/{id}/complete-upload",
    tag = "documents",
    params(("id" = String, Path, description = "Upload session id")),
    responses(
        (status = 200, description = "Document marked ready", body = DocumentView),
        (status = 404, description = "Upload session not found", body = ErrorEnvelope)
    )
)]
pub async fn complete_upload<S, O, P>(
    State(state): State<Arc<AppState<S, O, P>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError>
where
    S: ItemStore + ?Sized + 'static,
    O: ObjectStore + ?Sized + 'static,
    P: KnowledgeBaseProvider + ?Sized + 'static,
{
    let session_id = parse_uuid_path("sessionId", &id)?;
    let document = state.uploads.complete(session_id).await?;
    Ok(Json(DocumentView::from(document)))
}

/// `DELETE /documents/{id}`: enforces the `ready`/`error` delete
/// precondition from §3/§4.1 (the other half of §9's open question — we
/// chose to enforce it rather than leave the model's rule unobserved).
#[utoipa::path(
    delete,
    path = "/documents/{id}",
    tag = "documents",
    params(("id" = String, Path, description = "Document id")),
    responses(
        (status = 204, description = "Document deleted"),
        (status = 400, description = "Document not in a deletable state", body = ErrorEnvelope),
        (status = 404, description = "Document not found", body = ErrorEnvelope)
    )
)]
pub async fn delete<S, O, P>(
    State(state): State<Arc<AppState<S, O, P>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError>
where
    S: ItemStore + ?Sized + 'static,
    O: ObjectStore + ?Sized + 'static,
    P: KnowledgeBaseProvider + ?Sized + 'static,
{
    let id = parse_uuid_path("id", &id)?;
    let document = state.documents.get(id).await?;
    if !document.deletable() {
        return Err(AppError::validation(
            "status",
            "document must be ready or error to be deleted",
        )
        .into());
    }

    state.uploads.delete_document(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
