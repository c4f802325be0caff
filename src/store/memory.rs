use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::ops::Bound;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{BusDetailsStore, FetchPage, Filter};
use crate::models::{BusDetails, BusDetailsEntry, BusDetailsPatch};

/// Process-local store keyed by record key
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<String, BusDetails>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl BusDetailsStore for MemoryStore {
    async fn fetch(&self, filter: &Filter, limit: usize, last: Option<&str>) -> Result<FetchPage> {
        let records = self.records.read().await;
        let start = match last {
            Some(key) => Bound::Excluded(key.to_string()),
            None => Bound::Unbounded,
        };

        let mut matching = records
            .range((start, Bound::Unbounded))
            .filter(|(_, details)| filter.matches(details))
            .map(|(key, details)| BusDetailsEntry {
                key: key.clone(),
                details: details.clone(),
            });

        let items: Vec<BusDetailsEntry> = matching.by_ref().take(limit).collect();
        let last = if items.len() == limit && matching.next().is_some() {
            items.last().map(|entry| entry.key.clone())
        } else {
            None
        };

        tracing::debug!("Fetched {} records (filter: {:?})", items.len(), filter);
        Ok(FetchPage { items, last })
    }

    async fn put(&self, details: &BusDetails) -> Result<String> {
        let key = Uuid::new_v4().to_string();
        self.records
            .write()
            .await
            .insert(key.clone(), details.clone());

        tracing::debug!("Inserted record with key: {}", key);
        Ok(key)
    }

    async fn update(&self, key: &str, patch: &BusDetailsPatch) -> Result<()> {
        let mut records = self.records.write().await;
        let Some(details) = records.get_mut(key) else {
            bail!("Key '{}' not found", key);
        };
        patch.apply_to(details);

        tracing::debug!("Updated record with key: {}", key);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.records.write().await.remove(key);
        tracing::debug!("Deleted record with key: {}", key);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<BusDetailsEntry>> {
        Ok(self
            .records
            .read()
            .await
            .get(key)
            .map(|details| BusDetailsEntry {
                key: key.to_string(),
                details: details.clone(),
            }))
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
