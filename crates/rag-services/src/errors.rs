//! Converts each collaborator's error type into the unified `AppError`
//! taxonomy (§7) so every service method returns one error type regardless
//! of which backend failed underneath it.

use rag_core::error::AppError;
use rag_objectstore::traits::ObjectStoreError;
use rag_store::traits::StoreError;

pub fn from_store_error(err: StoreError) -> AppError {
    match err {
        StoreError::NotFound(resource) => AppError::not_found(resource),
        StoreError::ConditionalCheckFailed(message) => AppError::validation_global(message),
        StoreError::Serialization(e) => AppError::internal(format!("serialization error: {e}")),
        StoreError::BackendError(message) => AppError::internal(message),
    }
}

pub fn from_object_store_error(err: ObjectStoreError) -> AppError {
    match err {
        ObjectStoreError::NotFound(key) => AppError::not_found(format!("object {key}")),
        ObjectStoreError::PresignFailed(message) => AppError::internal(message),
        ObjectStoreError::BackendError(message) => AppError::internal(message),
        ObjectStoreError::ConfigError(message) => AppError::internal(message),
    }
}
