pub mod memory;
pub mod spanner;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{Config, StoreBackend};
use crate::models::{BusDetails, BusDetailsEntry, BusDetailsPatch};

pub use memory::MemoryStore;
pub use spanner::SpannerStore;

/// How a filter constrains `date_field`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DateMatch {
    #[default]
    Any,
    Equals(String),
    /// Only records without a date. Records created through the API always
    /// carry one, so this matches nothing in practice.
    Missing,
}

/// Equality filter over `vehicle_id` and `date_field`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub vehicle_id: Option<i64>,
    pub date_field: DateMatch,
}

impl Filter {
    /// Unfiltered scan
    pub fn all() -> Self {
        Self::default()
    }

    pub fn vehicle(vehicle_id: i64) -> Self {
        Self {
            vehicle_id: Some(vehicle_id),
            date_field: DateMatch::Any,
        }
    }

    /// Narrow to an exact date when one is given
    pub fn on_date(mut self, date_field: Option<&str>) -> Self {
        if let Some(date) = date_field {
            self.date_field = DateMatch::Equals(date.to_string());
        }
        self
    }

    pub fn without_date(mut self) -> Self {
        self.date_field = DateMatch::Missing;
        self
    }

    pub fn matches(&self, details: &BusDetails) -> bool {
        if self.vehicle_id.is_some_and(|id| id != details.vehicle_id) {
            return false;
        }
        match &self.date_field {
            DateMatch::Any => true,
            DateMatch::Equals(date) => *date == details.date_field,
            DateMatch::Missing => false,
        }
    }
}

/// One page of a fetch, ordered by key
#[derive(Debug, Clone, Default)]
pub struct FetchPage {
    pub items: Vec<BusDetailsEntry>,
    /// Key to resume from when another page may follow
    pub last: Option<String>,
}

/// The managed record store behind the API
///
/// Records are addressed by an opaque key assigned on `put`. Nothing here is
/// transactional; callers that check then act can race with other writers.
#[async_trait]
pub trait BusDetailsStore: Send + Sync + 'static {
    /// Fetch up to `limit` matching records with keys after `last`
    async fn fetch(&self, filter: &Filter, limit: usize, last: Option<&str>) -> Result<FetchPage>;

    /// Insert a new record and return its assigned key
    async fn put(&self, details: &BusDetails) -> Result<String>;

    /// Merge the supplied fields onto an existing record. Fails if `key` is unknown.
    async fn update(&self, key: &str, patch: &BusDetailsPatch) -> Result<()>;

    /// Remove a record. Unknown keys are ignored.
    async fn delete(&self, key: &str) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<BusDetailsEntry>>;

    /// Cheap round trip proving the store is reachable
    async fn health_check(&self) -> Result<()>;
}

/// Open the store selected by the configuration
pub async fn connect(config: &Config) -> Result<Arc<dyn BusDetailsStore>> {
    match &config.store {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Spanner(spanner) => Ok(Arc::new(SpannerStore::from_config(spanner).await?)),
    }
}
