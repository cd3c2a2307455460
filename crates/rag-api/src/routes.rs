//! Route table, CORS, and request-logging middleware (§6, §9's ambient
//! stack). Generic over the backend triple so both the production binary
//! and the in-memory test harness build the same router shape.

use std::sync::Arc;

use axum::extract::Request;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use rag_knowledge::traits::KnowledgeBaseProvider;
use rag_objectstore::traits::ObjectStore;
use rag_store::traits::ItemStore;

use crate::api_doc::ApiDoc;
use crate::error::not_found;
use crate::handlers::{documents, health, queries};
use crate::middleware::{get_request_id, request_id_middleware};
use crate::state::AppState;

pub fn build_router<S, O, P>(state: Arc<AppState<S, O, P>>) -> Router
where
    S: ItemStore + ?Sized + 'static,
    O: ObjectStore + ?Sized + 'static,
    P: KnowledgeBaseProvider + ?Sized + 'static,
{
    let cors = cors_layer(&state.config.cors_allowed_origins);

    Router::new()
        .route("/health", get(health::health))
        .route("/documents", post(documents::create).get(documents::list))
        .route("/documents/{id}", get(documents::get).delete(documents::delete))
        .route("/documents/{id}/complete-upload", post(documents::complete_upload))
        .route("/queries", post(queries::create))
        .route("/queries/{sessionId}/history", get(queries::history))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .fallback(not_found)
        .layer(ConcurrencyLimitLayer::new(512))
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(trace_span))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Stamps the request id the upstream `request_id_middleware` left in
/// extensions onto the request's tracing span, so every log line inside the
/// span is correlatable without threading the id through each handler.
fn trace_span(request: &Request) -> tracing::Span {
    let request_id = get_request_id(request).unwrap_or_default();
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

/// Permissive by default, narrowed to the configured allow-list when one
/// is set (§9's supplemented ambient stack).
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

