//! DynamoDB-backed `ItemStore`.
//!
//! Conditional writes use `attribute_exists(id)` so a mistyped id can never
//! silently create a stub row (§5, §6); `Scan` uses a `FilterExpression`
//! against named expression attributes, matching the capability described
//! in §6 exactly.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use serde_json::{Number, Value};

use crate::traits::{Item, ItemStore, ScanFilter, StoreError, StoreResult};

pub struct DynamoDbStore {
    client: Client,
}

impl DynamoDbStore {
    pub fn new(client: Client) -> Self {
        DynamoDbStore { client }
    }

    /// Builds a client from the ambient AWS config (region/credentials
    /// resolved the same way as the rest of the workspace's `aws-sdk-*`
    /// integrations).
    pub async fn from_env() -> Self {
        let config = aws_config::load_from_env().await;
        DynamoDbStore::new(Client::new(&config))
    }
}

fn to_attribute_value(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(to_attribute_value).collect()),
        Value::Object(map) => {
            let mut out = HashMap::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k.clone(), to_attribute_value(v));
            }
            AttributeValue::M(out)
        }
    }
}

fn from_attribute_value(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::N(n) => n
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::L(items) => Value::Array(items.iter().map(from_attribute_value).collect()),
        AttributeValue::M(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k.clone(), from_attribute_value(v));
            }
            Value::Object(out)
        }
        _ => Value::Null,
    }
}

fn item_to_av_map(item: Item) -> HashMap<String, AttributeValue> {
    item.into_iter()
        .map(|(k, v)| (k, to_attribute_value(&v)))
        .collect()
}

fn av_map_to_item(map: HashMap<String, AttributeValue>) -> Item {
    map.into_iter()
        .map(|(k, v)| (k, from_attribute_value(&v)))
        .collect()
}

#[async_trait]
impl ItemStore for DynamoDbStore {
    async fn put_item(&self, table: &str, item: Item) -> StoreResult<()> {
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(item_to_av_map(item)))
            .send()
            .await
            .map_err(|e| StoreError::BackendError(e.to_string()))?;
        Ok(())
    }

    async fn get_item(
        &self,
        table: &str,
        key_name: &str,
        key_value: &str,
    ) -> StoreResult<Option<Item>> {
        let output = self
            .client
            .get_item()
            .table_name(table)
            .key(key_name, AttributeValue::S(key_value.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::BackendError(e.to_string()))?;

        Ok(output.item.map(av_map_to_item))
    }

    async fn update_item(
        &self,
        table: &str,
        key_name: &str,
        key_value: &str,
        updates: Item,
    ) -> StoreResult<()> {
        if updates.is_empty() {
            return Ok(());
        }

        let mut set_clauses = Vec::with_capacity(updates.len());
        let mut names: HashMap<String, String> = HashMap::new();
        let mut values: HashMap<String, AttributeValue> = HashMap::new();

        for (i, (attr, value)) in updates.into_iter().enumerate() {
            let name_placeholder = format!("#u{i}");
            let value_placeholder = format!(":u{i}");
            set_clauses.push(format!("{name_placeholder} = {value_placeholder}"));
            names.insert(name_placeholder, attr);
            values.insert(value_placeholder, to_attribute_value(&value));
        }
        names.insert("#id".to_string(), key_name.to_string());

        let update_expression = format!("SET {}", set_clauses.join(", "));

        self.client
            .update_item()
            .table_name(table)
            .key(key_name, AttributeValue::S(key_value.to_string()))
            .update_expression(update_expression)
            .condition_expression("attribute_exists(#id)")
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values))
            .send()
            .await
            .map_err(|e| {
                if e.to_string().contains("ConditionalCheckFailed") {
                    StoreError::ConditionalCheckFailed(format!(
                        "attribute_exists({key_name}) failed for {key_value}"
                    ))
                } else {
                    StoreError::BackendError(e.to_string())
                }
            })?;

        Ok(())
    }

    async fn delete_item(&self, table: &str, key_name: &str, key_value: &str) -> StoreResult<()> {
        let mut names = HashMap::new();
        names.insert("#id".to_string(), key_name.to_string());

        self.client
            .delete_item()
            .table_name(table)
            .key(key_name, AttributeValue::S(key_value.to_string()))
            .condition_expression("attribute_exists(#id)")
            .set_expression_attribute_names(Some(names))
            .send()
            .await
            .map_err(|e| {
                if e.to_string().contains("ConditionalCheckFailed") {
                    StoreError::ConditionalCheckFailed(format!(
                        "attribute_exists({key_name}) failed for {key_value}"
                    ))
                } else {
                    StoreError::BackendError(e.to_string())
                }
            })?;

        Ok(())
    }

    async fn scan(&self, table: &str, filter: Option<ScanFilter>) -> StoreResult<Vec<Item>> {
        let mut items = Vec::new();
        let mut exclusive_start_key = None;

        loop {
            let mut request = self.client.scan().table_name(table);

            if let Some(filter) = &filter {
                let mut names = HashMap::new();
                let mut values = HashMap::new();
                names.insert("#f".to_string(), filter.attribute.clone());
                values.insert(
                    ":fv".to_string(),
                    AttributeValue::S(filter.value.clone()),
                );
                request = request
                    .filter_expression("#f = :fv")
                    .set_expression_attribute_names(Some(names))
                    .set_expression_attribute_values(Some(values));
            }

            if let Some(key) = exclusive_start_key.take() {
                request = request.set_exclusive_start_key(Some(key));
            }

            let output = request
                .send()
                .await
                .map_err(|e| StoreError::BackendError(e.to_string()))?;

            if let Some(scanned) = output.items {
                items.extend(scanned.into_iter().map(av_map_to_item));
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => exclusive_start_key = Some(key),
                _ => break,
            }
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_scalar_and_nested_values() {
        let value = serde_json::json!({
            "s": "hello",
            "n": 3,
            "b": true,
            "nested": {"a": 1},
            "list": [1, 2, 3],
        });
        let av = to_attribute_value(&value);
        let back = from_attribute_value(&av);
        assert_eq!(back["s"], value["s"]);
        assert_eq!(back["b"], value["b"]);
        assert_eq!(back["nested"]["a"], value["nested"]["a"]);
        assert_eq!(back["list"].as_array().unwrap().len(), 3);
    }
}
