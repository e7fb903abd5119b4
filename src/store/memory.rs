//! In-process store backend.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{DurableStore, Table};
use crate::Result;

/// Volatile [`DurableStore`] backed by a map. Contents die with the process.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<Table, HashMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn put(&self, table: Table, key: &str, value: Value) -> Result<()> {
        self.tables
            .write()
            .await
            .entry(table)
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn get(&self, table: Table, key: &str) -> Result<Option<Value>> {
        Ok(self
            .tables
            .read()
            .await
            .get(&table)
            .and_then(|t| t.get(key))
            .cloned())
    }

    async fn delete(&self, table: Table, key: &str) -> Result<bool> {
        Ok(self
            .tables
            .write()
            .await
            .get_mut(&table)
            .is_some_and(|t| t.remove(key).is_some()))
    }

    async fn clear(&self, table: Table) -> Result<()> {
        self.tables.write().await.remove(&table);
        Ok(())
    }

    async fn keys(&self, table: Table) -> Result<Vec<String>> {
        Ok(self
            .tables
            .read()
            .await
            .get(&table)
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
