//! In-memory `ItemStore`, used by tests and the mock deployment mode.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::traits::{Item, ItemStore, ScanFilter, StoreError, StoreResult};

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, HashMap<String, Item>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn key_of(item: &Item, key_name: &str) -> Option<String> {
    item.get(key_name).and_then(|v| match v {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    })
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn put_item(&self, table: &str, item: Item) -> StoreResult<()> {
        let key_name = "id";
        let key_value = key_of(&item, key_name)
            .ok_or_else(|| StoreError::BackendError("item missing id attribute".to_string()))?;
        let mut tables = self.tables.lock().unwrap();
        tables
            .entry(table.to_string())
            .or_default()
            .insert(key_value, item);
        Ok(())
    }

    async fn get_item(
        &self,
        table: &str,
        key_name: &str,
        key_value: &str,
    ) -> StoreResult<Option<Item>> {
        let tables = self.tables.lock().unwrap();
        let found = tables.get(table).and_then(|rows| {
            if key_name == "id" {
                rows.get(key_value).cloned()
            } else {
                rows.values()
                    .find(|row| key_of(row, key_name).as_deref() == Some(key_value))
                    .cloned()
            }
        });
        Ok(found)
    }

    async fn update_item(
        &self,
        table: &str,
        key_name: &str,
        key_value: &str,
        updates: Item,
    ) -> StoreResult<()> {
        let mut tables = self.tables.lock().unwrap();
        let rows = tables
            .entry(table.to_string())
            .or_default();
        let row_key = if key_name == "id" {
            Some(key_value.to_string())
        } else {
            rows.iter()
                .find(|(_, row)| key_of(row, key_name).as_deref() == Some(key_value))
                .map(|(k, _)| k.clone())
        };
        let row_key = row_key.ok_or_else(|| {
            StoreError::ConditionalCheckFailed(format!(
                "attribute_exists({key_name}) failed: no row for {key_value}"
            ))
        })?;
        let row = rows.get_mut(&row_key).ok_or_else(|| {
            StoreError::ConditionalCheckFailed(format!(
                "attribute_exists({key_name}) failed: no row for {key_value}"
            ))
        })?;
        for (k, v) in updates {
            row.insert(k, v);
        }
        Ok(())
    }

    async fn delete_item(&self, table: &str, key_name: &str, key_value: &str) -> StoreResult<()> {
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        let row_key = if key_name == "id" {
            Some(key_value.to_string())
        } else {
            rows.iter()
                .find(|(_, row)| key_of(row, key_name).as_deref() == Some(key_value))
                .map(|(k, _)| k.clone())
        };
        match row_key.and_then(|k| rows.remove(&k)) {
            Some(_) => Ok(()),
            None => Err(StoreError::ConditionalCheckFailed(format!(
                "attribute_exists({key_name}) failed: no row for {key_value}"
            ))),
        }
    }

    async fn scan(&self, table: &str, filter: Option<ScanFilter>) -> StoreResult<Vec<Item>> {
        let tables = self.tables.lock().unwrap();
        let rows = tables.get(table).cloned().unwrap_or_default();
        let mut items: Vec<Item> = rows.into_values().collect();
        if let Some(filter) = filter {
            items.retain(|item| key_of(item, &filter.attribute).as_deref() == Some(filter.value.as_str()));
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: &str, session: &str) -> Item {
        let mut m = HashMap::new();
        m.insert("id".to_string(), json!(id));
        m.insert("sessionId".to_string(), json!(session));
        m
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = MemoryStore::new();
        store.put_item("queries", item("q1", "s1")).await.unwrap();
        let got = store.get_item("queries", "id", "q1").await.unwrap();
        assert!(got.is_some());
    }

    #[tokio::test]
    async fn update_on_missing_id_fails_conditional_check() {
        let store = MemoryStore::new();
        let mut updates = HashMap::new();
        updates.insert("status".to_string(), json!("ready"));
        let err = store
            .update_item("documents", "id", "missing", updates)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ConditionalCheckFailed(_)));
    }

    #[tokio::test]
    async fn delete_on_missing_id_fails_conditional_check() {
        let store = MemoryStore::new();
        let err = store.delete_item("documents", "id", "missing").await.unwrap_err();
        assert!(matches!(err, StoreError::ConditionalCheckFailed(_)));
    }

    #[tokio::test]
    async fn scan_filters_by_attribute_equality() {
        let store = MemoryStore::new();
        store.put_item("queries", item("q1", "s1")).await.unwrap();
        store.put_item("queries", item("q2", "s2")).await.unwrap();
        store.put_item("queries", item("q3", "s1")).await.unwrap();

        let filtered = store
            .scan("queries", Some(ScanFilter::new("sessionId", "s1")))
            .await
            .unwrap();
        assert_eq!(filtered.len(), 2);
    }

    #[tokio::test]
    async fn second_complete_on_same_session_observes_non_active() {
        // Models I7/R4: a concurrent second update after the first already
        // flipped status away from "active" must fail if the repository
        // re-checks the precondition via a fresh get (exercised at the
        // repository layer; this only verifies the raw store never lets a
        // write through without the id already existing).
        let store = MemoryStore::new();
        let mut session = HashMap::new();
        session.insert("id".to_string(), json!("sess1"));
        session.insert("status".to_string(), json!("active"));
        store.put_item("upload_sessions", session).await.unwrap();

        let mut to_used = HashMap::new();
        to_used.insert("status".to_string(), json!("used"));
        store
            .update_item("upload_sessions", "id", "sess1", to_used)
            .await
            .unwrap();

        let row = store
            .get_item("upload_sessions", "id", "sess1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.get("status").unwrap(), &json!("used"));
    }
}
