//! `/queries` routes (§6): ask a question, browse session history.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use rag_core::models::{CreateQueryRequest, Query as QueryModel, Response};
use rag_knowledge::traits::KnowledgeBaseProvider;
use rag_objectstore::traits::ObjectStore;
use rag_store::traits::ItemStore;

use crate::error::{ErrorEnvelope, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Deserialize, IntoParams)]
pub struct HistoryQuery {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

/// A query paired with its response, if one exists yet (§6: `{query,
/// response}`).
#[derive(Debug, Serialize, ToSchema)]
pub struct QueryWithResponseBody {
    pub query: QueryModel,
    pub response: Option<Response>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryHistoryResponse {
    pub items: Vec<QueryWithResponseBody>,
    pub has_more: bool,
}

/// `POST /queries`: `{query, response}` (§6). Knowledge-service errors
/// that surface after the query row exists are already recorded via
/// `MarkFailed` inside `create_and_process`, so this handler only needs to
/// translate the final `AppError` into the envelope.
#[utoipa::path(
    post,
    path = "/queries",
    tag = "queries",
    request_body = CreateQueryRequest,
    responses(
        (status = 201, description = "Query processed", body = QueryWithResponseBody),
        (status = 400, description = "Invalid input", body = ErrorEnvelope)
    )
)]
pub async fn create<S, O, P>(
    State(state): State<Arc<AppState<S, O, P>>>,
    ValidatedJson(body): ValidatedJson<CreateQueryRequest>,
) -> Result<impl IntoResponse, HttpAppError>
where
    S: ItemStore + ?Sized + 'static,
    O: ObjectStore + ?Sized + 'static,
    P: KnowledgeBaseProvider + ?Sized + 'static,
{
    let result = state.queries.create_and_process(&body).await?;
    Ok((
        StatusCode::CREATED,
        Json(QueryWithResponseBody {
            query: result.query,
            response: result.response,
        }),
    ))
}

/// `GET /queries/{sessionId}/history?offset&limit`.
#[utoipa::path(
    get,
    path = "/queries/{sessionId}/history",
    tag = "queries",
    params(
        ("sessionId" = String, Path, description = "Session id"),
        HistoryQuery,
    ),
    responses(
        (status = 200, description = "Session history page", body = QueryHistoryResponse)
    )
)]
pub async fn history<S, O, P>(
    State(state): State<Arc<AppState<S, O, P>>>,
    Path(session_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, HttpAppError>
where
    S: ItemStore + ?Sized + 'static,
    O: ObjectStore + ?Sized + 'static,
    P: KnowledgeBaseProvider + ?Sized + 'static,
{
    let page = state
        .queries
        .history(&session_id, query.offset.unwrap_or(0), query.limit)
        .await?;
    let items: Vec<_> = page
        .items
        .into_iter()
        .map(|item| QueryWithResponseBody {
            query: item.query,
            response: item.response,
        })
        .collect();
    Ok(Json(QueryHistoryResponse {
        items,
        has_more: page.has_more,
    }))
}
