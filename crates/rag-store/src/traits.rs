//! Key-value store abstraction
//!
//! This module defines the `ItemStore` trait that every persistence backend
//! must implement: the capability named in spec §6 — per-item Put/Get, a
//! conditional UpdateItem/DeleteItem requiring `attribute_exists(id)`, and a
//! Scan with an optional equality filter on one attribute (`sessionId` or
//! `queryId` in practice). Modeled on the `Storage` trait pattern: entities
//! never talk to a concrete backend directly, only through this trait.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// A persisted record: a flat map of attribute name to JSON value, matching
/// the "flat record, named attributes" layout in §6.
pub type Item = HashMap<String, Value>;

/// Key-value store operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("item not found: {0}")]
    NotFound(String),

    #[error("conditional check failed: {0}")]
    ConditionalCheckFailed(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("backend error: {0}")]
    BackendError(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// An equality filter for `Scan`, e.g. `{ attribute: "sessionId", value: "..." }`.
#[derive(Debug, Clone)]
pub struct ScanFilter {
    pub attribute: String,
    pub value: String,
}

impl ScanFilter {
    pub fn new(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        ScanFilter {
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

/// Key-value store abstraction.
///
/// All backends (DynamoDB, in-memory) must implement this trait so the
/// per-entity repositories never couple to a specific SDK.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Writes `item` to `table`, unconditionally (used only at creation,
    /// when no row can already exist for the fresh id).
    async fn put_item(&self, table: &str, item: Item) -> StoreResult<()>;

    /// Fetches one item by its partition key.
    async fn get_item(&self, table: &str, key_name: &str, key_value: &str) -> StoreResult<Option<Item>>;

    /// Merges `updates` into the existing item, requiring
    /// `attribute_exists(id)` — every mutating operation after creation
    /// goes through this so a typo'd id can never create a stub row (§5).
    async fn update_item(
        &self,
        table: &str,
        key_name: &str,
        key_value: &str,
        updates: Item,
    ) -> StoreResult<()>;

    /// Deletes an item, requiring `attribute_exists(id)`.
    async fn delete_item(&self, table: &str, key_name: &str, key_value: &str) -> StoreResult<()>;

    /// Scans `table`, optionally filtering on a single attribute equality.
    /// No secondary indexes: acceptable at PoC scale, the first thing to
    /// replace under load (§9).
    async fn scan(&self, table: &str, filter: Option<ScanFilter>) -> StoreResult<Vec<Item>>;
}
