//! `GET /health` (§6): `{status, timestamp, version, uptime}`.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use rag_knowledge::traits::KnowledgeBaseProvider;
use rag_objectstore::traits::ObjectStore;
use rag_store::traits::ItemStore;

use crate::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: &'static str,
    timestamp: chrono::DateTime<Utc>,
    version: String,
    uptime_seconds: u64,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health<S, O, P>(State(state): State<Arc<AppState<S, O, P>>>) -> impl IntoResponse
where
    S: ItemStore + ?Sized,
    O: ObjectStore + ?Sized,
    P: KnowledgeBaseProvider + ?Sized,
{
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
        version: state.config.version.clone(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}
