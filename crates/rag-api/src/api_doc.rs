//! OpenAPI documentation (§9's ambient stack).

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use rag_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "RAG Orchestration Core API",
        version = "0.1.0",
        description = "Document ingestion, knowledge-base sync, and question answering over a retrieval-augmented generation pipeline."
    ),
    paths(
        handlers::health::health,
        handlers::documents::create,
        handlers::documents::list,
        handlers::documents::get,
        handlers::documents::complete_upload,
        handlers::documents::delete,
        handlers::queries::create,
        handlers::queries::history,
    ),
    components(
        schemas(
            models::DocumentStatus,
            models::ObjectLocator,
            models::CreateDocumentRequest,
            models::DocumentView,
            models::UploadSession,
            models::SessionStatus,
            models::QueryStatus,
            models::Query,
            models::CreateQueryRequest,
            models::Source,
            models::Response,
            handlers::documents::DocumentListResponse,
            handlers::queries::QueryWithResponseBody,
            handlers::queries::QueryHistoryResponse,
            handlers::health::HealthResponse,
            error::ErrorBody,
            error::ErrorEnvelope,
        )
    ),
    tags(
        (name = "health", description = "Liveness and version reporting"),
        (name = "documents", description = "Document upload, listing, and lifecycle operations"),
        (name = "queries", description = "Question answering and session history")
    )
)]
pub struct ApiDoc;
