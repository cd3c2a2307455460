//! Error types module
//!
//! Unifies the taxonomy from the error handling design (§7): validation
//! failures, not-found lookups, session/state-machine conflicts, and
//! internal/store failures. Every variant self-describes its HTTP response
//! shape through [`ErrorMetadata`] so the adapter layer never has to branch
//! on error internals.

/// Log level for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected, client-caused errors (validation, not-found).
    Debug,
    /// Recoverable but noteworthy (session conflicts, degraded KB path).
    Warn,
    /// Unexpected failures (store/backend errors).
    Error,
}

/// How an error should be presented to an HTTP caller.
pub trait ErrorMetadata {
    fn http_status_code(&self) -> u16;
    fn error_code(&self) -> &'static str;
    fn is_recoverable(&self) -> bool;
    fn client_message(&self) -> String;
    fn log_level(&self) -> LogLevel;
    /// Field name, if this error is attributable to one request field.
    fn field(&self) -> Option<&str> {
        None
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request body failed validation, a path parameter was missing, an
    /// enumerated value was invalid, or a size/length limit was exceeded.
    /// §7 also folds session state-machine conflicts into this variant
    /// (reported as 400, not 409) per the spec's documented behavior.
    #[error("validation error{}: {message}", field.as_deref().map(|f| format!(" ({f})")).unwrap_or_default())]
    Validation {
        field: Option<String>,
        message: String,
    },

    #[error("not found: {resource}")]
    NotFound { resource: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub fn validation_global(message: impl Into<String>) -> Self {
        AppError::Validation {
            field: None,
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound {
            resource: resource.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
        }
    }

    /// Machine-readable error family, surfaced in the HTTP envelope's `type`.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "ValidationError",
            AppError::NotFound { .. } => "NotFound",
            AppError::Internal { .. } => "Internal",
        }
    }
}

/// `validator`'s derive keys `field_errors()` by the Rust field identifier
/// (`file_size`), but the HTTP contract's `field` is the request's camelCase
/// JSON name (`fileSize`); this is the one place that translates between them.
fn snake_to_camel(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for ch in field.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        match err.field_errors().into_iter().next() {
            Some((field, errors)) => {
                let message = errors
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid"));
                AppError::validation(snake_to_camel(field), message)
            }
            None => AppError::validation_global(err.to_string()),
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        match self {
            AppError::Validation { .. } => 400,
            AppError::NotFound { .. } => 404,
            AppError::Internal { .. } => 500,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::NotFound { .. } => "NOT_FOUND",
            AppError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, AppError::Internal { .. })
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Validation { message, .. } => message.clone(),
            AppError::NotFound { resource } => format!("{resource} not found"),
            AppError::Internal { .. } => "internal server error".to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            AppError::Validation { .. } => LogLevel::Debug,
            AppError::NotFound { .. } => LogLevel::Debug,
            AppError::Internal { .. } => LogLevel::Error,
        }
    }

    fn field(&self) -> Option<&str> {
        match self {
            AppError::Validation { field, .. } => field.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_carries_field() {
        let err = AppError::validation("fileSize", "must be <= 52428800");
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(err.field(), Some("fileSize"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn not_found_has_no_field() {
        let err = AppError::not_found("Document");
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.field(), None);
        assert_eq!(err.client_message(), "Document not found");
    }

    #[test]
    fn internal_is_recoverable_and_error_level() {
        let err = AppError::internal("store unavailable");
        assert_eq!(err.http_status_code(), 500);
        assert!(err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn validation_errors_field_is_translated_to_camel_case() {
        use validator::ValidationError;

        let mut errors = validator::ValidationErrors::new();
        errors.add(
            "file_size",
            ValidationError::new("range").with_message(std::borrow::Cow::from("out of range")),
        );
        let err: AppError = errors.into();
        assert_eq!(err.field(), Some("fileSize"));
        assert_eq!(err.client_message(), "out of range");
    }
}
