use anyhow::{Result, anyhow};
use async_trait::async_trait;
use axum::{Router, body::Body, http::Request, http::StatusCode};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tower::ServiceExt;

use crate::config::{Config, StoreBackend};
use crate::models::{BusDetails, BusDetailsEntry, BusDetailsPatch};
use crate::routes;
use crate::state::AppState;
use crate::store::{BusDetailsStore, FetchPage, Filter, MemoryStore};

/// Full router over the given store
pub fn setup_app_with_store(store: Arc<dyn BusDetailsStore>) -> Router {
    setup_app(store, 1000)
}

pub fn setup_app(store: Arc<dyn BusDetailsStore>, fetch_limit: usize) -> Router {
    let config = Config {
        store: StoreBackend::Memory,
        fetch_limit,
        service_port: 3000,
        service_host: "0.0.0.0".to_string(),
    };

    routes::router(AppState {
        store,
        config: Arc::new(config),
    })
}

/// Full router over a fresh in-memory store, plus a handle to that store
pub fn setup_test_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (setup_app_with_store(store.clone()), store)
}

/// A store whose every call fails, standing in for an unreachable database
pub struct FailingStore;

#[async_trait]
impl BusDetailsStore for FailingStore {
    async fn fetch(&self, _: &Filter, _: usize, _: Option<&str>) -> Result<FetchPage> {
        Err(anyhow!("store unreachable"))
    }

    async fn put(&self, _: &BusDetails) -> Result<String> {
        Err(anyhow!("store unreachable"))
    }

    async fn update(&self, _: &str, _: &BusDetailsPatch) -> Result<()> {
        Err(anyhow!("store unreachable"))
    }

    async fn delete(&self, _: &str) -> Result<()> {
        Err(anyhow!("store unreachable"))
    }

    async fn get(&self, _: &str) -> Result<Option<BusDetailsEntry>> {
        Err(anyhow!("store unreachable"))
    }

    async fn health_check(&self) -> Result<()> {
        Err(anyhow!("store unreachable"))
    }
}

/// Send one request and decode the JSON body (`Null` when there is none)
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);
    (status, json)
}

/// Creation body for the given vehicle and date
pub fn bus_details_body(vehicle_id: i64, date_field: &str) -> JsonValue {
    serde_json::json!({
        "vehicle_id": vehicle_id,
        "date_field": date_field,
        "trip": "A1",
        "front_door_entry": 5,
        "front_door_exit": 4,
        "back_door_entry": 2,
        "back_door_exit": 1,
        "trip_count": 1,
        "distress_count": 0
    })
}
