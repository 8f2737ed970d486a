//! Data store port - generic document collections

use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::domain::result::{Error, Result};

pub const ORDERS: &str = "orders";
pub const NOTIFICATIONS: &str = "notifications";
pub const KYC_VERIFICATIONS: &str = "kycVerifications";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Filter/sort/limit options for `DataStore::list`
///
/// Filters are equality checks on top-level fields, all of which must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filters: Vec<(String, JsonValue)>,
    pub order_by: Option<(String, SortDirection)>,
    pub limit: Option<usize>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True if `record` satisfies every filter
    pub fn matches(&self, record: &JsonValue) -> bool {
        self.filters
            .iter()
            .all(|(field, expected)| record.get(field) == Some(expected))
    }
}

/// External document store
///
/// Records are JSON objects carrying a string `id` field. Use
/// [`Collection`] for a typed view.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Insert a record, returning it as stored
    async fn create(&self, collection: &str, record: JsonValue) -> Result<JsonValue>;

    /// List records matching the query
    async fn list(&self, collection: &str, query: &ListQuery) -> Result<Vec<JsonValue>>;

    /// Merge `patch` into the record with the given id
    async fn update(&self, collection: &str, id: &str, patch: JsonValue) -> Result<()>;

    /// Remove the record with the given id
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;
}

/// Typed view of one collection
pub struct Collection<'a, T> {
    store: &'a dyn DataStore,
    name: &'static str,
    _marker: PhantomData<T>,
}

impl<'a, T> Collection<'a, T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: &'a dyn DataStore, name: &'static str) -> Self {
        Self {
            store,
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub async fn create(&self, record: &T) -> Result<T> {
        let value = serde_json::to_value(record)?;
        let stored = self.store.create(self.name, value).await?;
        Ok(serde_json::from_value(stored)?)
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<T>> {
        let rows = self.store.list(self.name, query).await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(Error::from))
            .collect()
    }

    pub async fn update(&self, id: &str, patch: JsonValue) -> Result<()> {
        self.store.update(self.name, id, patch).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(self.name, id).await
    }
}
