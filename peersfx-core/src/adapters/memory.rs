//! In-process data store
//!
//! Keeps every collection in memory. Used by the CLI session and tests in
//! place of the hosted backend. Nothing survives the process.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use crate::domain::result::{Error, Result};
use crate::ports::{DataStore, ListQuery, SortDirection};

/// Memory-backed [`DataStore`]
#[derive(Default)]
pub struct InMemoryDataStore {
    collections: Mutex<HashMap<String, Vec<JsonValue>>>,
    offline: AtomicBool,
}

impl InMemoryDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the backend being unreachable: every call fails while set
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, AtomicOrdering::SeqCst);
    }

    /// Number of records in a collection
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .map(|c| c.get(collection).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(AtomicOrdering::SeqCst) {
            return Err(Error::store("backend unavailable"));
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<JsonValue>>>> {
        self.collections
            .lock()
            .map_err(|e| Error::store(format!("Lock poisoned: {}", e)))
    }
}

fn record_id(record: &JsonValue) -> Option<&str> {
    record.get("id").and_then(JsonValue::as_str)
}

/// Order two field values: numbers numerically, timestamps chronologically,
/// decimal strings numerically, anything else as text. Missing sorts first.
fn compare_values(a: Option<&JsonValue>, b: Option<&JsonValue>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(JsonValue::Number(x)), Some(JsonValue::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(JsonValue::String(x)), Some(JsonValue::String(y))) => {
            if let (Ok(x), Ok(y)) = (x.parse::<DateTime<Utc>>(), y.parse::<DateTime<Utc>>()) {
                return x.cmp(&y);
            }
            if let (Ok(x), Ok(y)) = (Decimal::from_str(x), Decimal::from_str(y)) {
                return x.cmp(&y);
            }
            x.cmp(y)
        }
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

#[async_trait]
impl DataStore for InMemoryDataStore {
    async fn create(&self, collection: &str, record: JsonValue) -> Result<JsonValue> {
        self.check_online()?;
        let id = record_id(&record)
            .ok_or_else(|| Error::validation("record must carry a string id"))?
            .to_string();

        let mut collections = self.lock()?;
        let rows = collections.entry(collection.to_string()).or_default();
        if rows.iter().any(|r| record_id(r) == Some(id.as_str())) {
            return Err(Error::store(format!(
                "duplicate id {} in {}",
                id, collection
            )));
        }
        rows.push(record.clone());
        Ok(record)
    }

    async fn list(&self, collection: &str, query: &ListQuery) -> Result<Vec<JsonValue>> {
        self.check_online()?;
        let collections = self.lock()?;
        let mut rows: Vec<JsonValue> = collections
            .get(collection)
            .map(|rows| rows.iter().filter(|r| query.matches(r)).cloned().collect())
            .unwrap_or_default();

        if let Some((field, direction)) = &query.order_by {
            rows.sort_by(|a, b| {
                let ord = compare_values(a.get(field), b.get(field));
                match direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn update(&self, collection: &str, id: &str, patch: JsonValue) -> Result<()> {
        self.check_online()?;
        let JsonValue::Object(patch) = patch else {
            return Err(Error::validation("patch must be a JSON object"));
        };

        let mut collections = self.lock()?;
        let record = collections
            .get_mut(collection)
            .and_then(|rows| rows.iter_mut().find(|r| record_id(r) == Some(id)))
            .ok_or_else(|| Error::not_found(format!("{} {}", collection, id)))?;

        if let JsonValue::Object(fields) = record {
            for (key, value) in patch {
                fields.insert(key, value);
            }
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.check_online()?;
        let mut collections = self.lock()?;
        let rows = collections
            .get_mut(collection)
            .ok_or_else(|| Error::not_found(format!("{} {}", collection, id)))?;
        let before = rows.len();
        rows.retain(|r| record_id(r) != Some(id));
        if rows.len() == before {
            return Err(Error::not_found(format!("{} {}", collection, id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_filters_sorts_and_limits() {
        let store = InMemoryDataStore::new();
        for (id, status, created) in [
            ("a", "active", "2024-01-15T08:00:00Z"),
            ("b", "active", "2024-01-15T10:00:00Z"),
            ("c", "completed", "2024-01-15T11:00:00Z"),
            ("d", "active", "2024-01-15T09:00:00.500Z"),
        ] {
            store
                .create("orders", json!({"id": id, "status": status, "createdAt": created}))
                .await
                .unwrap();
        }

        let query = ListQuery::new()
            .filter("status", "active")
            .order_by("createdAt", SortDirection::Desc)
            .limit(2);
        let rows = store.list("orders", &query).await.unwrap();
        let ids: Vec<&str> = rows.iter().filter_map(record_id).collect();
        assert_eq!(ids, vec!["b", "d"]);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let store = InMemoryDataStore::new();
        store.create("orders", json!({"id": "x"})).await.unwrap();
        assert!(store.create("orders", json!({"id": "x"})).await.is_err());
        assert!(store.create("orders", json!({"noId": true})).await.is_err());
        assert_eq!(store.count("orders"), 1);
    }

    #[tokio::test]
    async fn test_update_merges_and_delete_removes() {
        let store = InMemoryDataStore::new();
        store
            .create("notifications", json!({"id": "n1", "isRead": false, "title": "t"}))
            .await
            .unwrap();

        store
            .update("notifications", "n1", json!({"isRead": true}))
            .await
            .unwrap();
        let rows = store.list("notifications", &ListQuery::new()).await.unwrap();
        assert_eq!(rows[0]["isRead"], true);
        assert_eq!(rows[0]["title"], "t");

        store.delete("notifications", "n1").await.unwrap();
        assert_eq!(store.count("notifications"), 0);
        assert!(matches!(
            store.delete("notifications", "n1").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_offline_fails_every_call() {
        let store = InMemoryDataStore::new();
        store.set_offline(true);
        assert!(store.list("orders", &ListQuery::new()).await.is_err());
        assert!(store.create("orders", json!({"id": "x"})).await.is_err());

        store.set_offline(false);
        assert!(store.list("orders", &ListQuery::new()).await.is_ok());
    }

    #[test]
    fn test_compare_decimal_strings() {
        let a = json!("1000");
        let b = json!("750.5");
        assert_eq!(compare_values(Some(&a), Some(&b)), Ordering::Greater);
    }
}
