//! Persistence adapter: entity <-> record mapping on top of `ItemStore`.
//!
//! A generic `Repository<S>` does the serde round-trip (§6: "each entity is
//! stored as a flat record with attribute names as in §3"); the
//! entity-specific wrappers below (`DocumentStore`, `UploadSessionStore`,
//! `QueryStore`, `ResponseStore`) add the finder methods each component in
//! §4 actually needs (id-scan, session-filtered scan, query-id lookup).

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::traits::{Item, ItemStore, ScanFilter, StoreError, StoreResult};

fn item_from_value(value: Value) -> StoreResult<Item> {
    match value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        _ => Err(StoreError::Serialization(serde::de::Error::custom(
            "entity did not serialize to a JSON object",
        ))),
    }
}

/// Generic entity <-> record mapping over any `ItemStore` backend.
pub struct Repository<S: ItemStore + ?Sized> {
    store: Arc<S>,
    table: String,
}

impl<S: ItemStore + ?Sized> Repository<S> {
    pub fn new(store: Arc<S>, table: impl Into<String>) -> Self {
        Repository {
            store,
            table: table.into(),
        }
    }

    pub async fn put<T: Serialize>(&self, entity: &T) -> StoreResult<()> {
        let value = serde_json::to_value(entity)?;
        self.store.put_item(&self.table, item_from_value(value)?).await
    }

    pub async fn get<T: DeserializeOwned>(&self, id: &str) -> StoreResult<Option<T>> {
        self.get_by("id", id).await
    }

    pub async fn get_by<T: DeserializeOwned>(
        &self,
        key_name: &str,
        key_value: &str,
    ) -> StoreResult<Option<T>> {
        let item = self.store.get_item(&self.table, key_name, key_value).await?;
        item.map(|i| serde_json::from_value(Value::Object(i.into_iter().collect())))
            .transpose()
            .map_err(StoreError::from)
    }

    pub async fn update(&self, id: &str, updates: Item) -> StoreResult<()> {
        self.store.update_item(&self.table, "id", id, updates).await
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        self.store.delete_item(&self.table, "id", id).await
    }

    pub async fn scan<T: DeserializeOwned>(&self, filter: Option<ScanFilter>) -> StoreResult<Vec<T>> {
        let items = self.store.scan(&self.table, filter).await?;
        items
            .into_iter()
            .map(|i| serde_json::from_value(Value::Object(i.into_iter().collect())))
            .collect::<Result<Vec<T>, _>>()
            .map_err(StoreError::from)
    }
}

/// Convenience for building an `Item` of named-attribute updates without
/// constructing a `HashMap` literal at every call site.
#[macro_export]
macro_rules! updates {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut m = ::std::collections::HashMap::new();
        $(m.insert($key.to_string(), ::serde_json::json!($value));)*
        m
    }};
}
