//! Converts `AppError` into the uniform `{error: {code, message, field?,
//! type}}` envelope (§7). Every handler returns `Result<_, HttpAppError>`
//! so this is the single place that decides status code and body shape.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rag_core::error::{AppError, ErrorMetadata, LogLevel};
use serde::de::DeserializeOwned;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(rename = "type")]
    pub error_type: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::validation_global(format!(
            "invalid request body: {}",
            rejection.body_text()
        )))
    }
}

impl From<QueryRejection> for HttpAppError {
    fn from(rejection: QueryRejection) -> Self {
        HttpAppError(AppError::validation_global(format!(
            "invalid query parameters: {rejection}"
        )))
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match err.log_level() {
            LogLevel::Debug => tracing::debug!(code = err.error_code(), "{}", err),
            LogLevel::Warn => tracing::warn!(code = err.error_code(), "{}", err),
            LogLevel::Error => tracing::error!(code = err.error_code(), "{}", err),
        }

        let body = ErrorEnvelope {
            error: ErrorBody {
                code: err.error_code().to_string(),
                message: err.client_message(),
                field: err.field().map(str::to_string),
                error_type: err.error_type().to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// §6/§7: unknown routes and disallowed methods, produced directly by the
/// adapter rather than any `AppError` variant.
pub async fn not_found() -> Response {
    HttpAppError(AppError::not_found("route")).into_response()
}

/// `Json<T>` that rejects through [`HttpAppError`] so a malformed body
/// renders the same error envelope as every other validation failure,
/// instead of axum's default plaintext rejection body.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ValidatedJson(value))
    }
}
