//! In-memory storage backend
//!
//! Same contract as the SQLite store, nothing survives the process. Used by
//! tests and by sessions that must not touch the disk.

use super::{Filter, Storage, Table};
use crate::shared::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory key-value store with insertion-ordered tables
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tables: RwLock<HashMap<Table, Vec<(String, Value)>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn put(&self, table: Table, key: &str, record: &Value) -> Result<()> {
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table).or_default();

        match rows.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = record.clone(),
            None => rows.push((key.to_string(), record.clone())),
        }

        Ok(())
    }

    async fn get(&self, table: Table, key: &str) -> Result<Option<Value>> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(&table)
            .and_then(|rows| rows.iter().find(|(k, _)| k == key))
            .map(|(_, record)| record.clone()))
    }

    async fn get_all(&self, table: Table, filter: Option<Filter<'_>>) -> Result<Vec<Value>> {
        let tables = self.tables.read().await;
        let Some(rows) = tables.get(&table) else {
            return Ok(Vec::new());
        };

        Ok(rows
            .iter()
            .filter(|(_, record)| filter.map_or(true, |f| f.matches(record)))
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn delete(&self, table: Table, key: &str) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(&table) else {
            return Ok(false);
        };

        let before = rows.len();
        rows.retain(|(k, _)| k != key);
        Ok(rows.len() < before)
    }

    async fn count(&self, table: Table) -> Result<usize> {
        let tables = self.tables.read().await;
        Ok(tables.get(&table).map_or(0, Vec::len))
    }
}
