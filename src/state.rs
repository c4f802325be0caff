use crate::config::Config;
use crate::store::BusDetailsStore;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BusDetailsStore>,
    pub config: Arc<Config>,
}
