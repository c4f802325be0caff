use anyhow::{Context, Result, bail};
use std::env;

const DEFAULT_FETCH_LIMIT: usize = 1000;

/// Which store backend the service talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Spanner(SpannerConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannerConfig {
    pub emulator_host: Option<String>,
    pub project: String,
    pub instance: String,
    pub database: String,
}

impl SpannerConfig {
    pub fn database_path(&self) -> String {
        format!(
            "projects/{}/instances/{}/databases/{}",
            self.project, self.instance, self.database
        )
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreBackend,
    pub fetch_limit: usize,
    pub service_port: u16,
    pub service_host: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name).with_context(|| format!("{} environment variable is required", name))
        };

        let backend = lookup("STORE_BACKEND").unwrap_or_else(|| "spanner".to_string());
        let store = match backend.as_str() {
            "memory" => StoreBackend::Memory,
            "spanner" => StoreBackend::Spanner(SpannerConfig {
                emulator_host: lookup("SPANNER_EMULATOR_HOST"),
                project: required("SPANNER_PROJECT")?,
                instance: required("SPANNER_INSTANCE")?,
                database: required("SPANNER_DATABASE")?,
            }),
            other => bail!("STORE_BACKEND must be 'spanner' or 'memory', got '{}'", other),
        };

        let fetch_limit = match lookup("FETCH_LIMIT") {
            Some(raw) => raw
                .parse::<usize>()
                .context("FETCH_LIMIT must be a positive integer")?,
            None => DEFAULT_FETCH_LIMIT,
        };
        if fetch_limit == 0 {
            bail!("FETCH_LIMIT must be a positive integer, got 0");
        }

        let service_port = lookup("SERVICE_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .context("SERVICE_PORT must be a valid port number (0-65535)")?;

        let service_host = lookup("SERVICE_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        Ok(Config {
            store,
            fetch_limit,
            service_port,
            service_host,
        })
    }

    pub fn log_startup(&self) {
        tracing::info!("Configuration loaded:");
        match &self.store {
            StoreBackend::Memory => {
                tracing::info!("  Store backend: memory (records are lost on restart)");
            }
            StoreBackend::Spanner(spanner) => {
                tracing::info!("  Store backend: spanner");
                tracing::info!(
                    "  Spanner emulator: {}",
                    spanner
                        .emulator_host
                        .as_deref()
                        .unwrap_or("disabled (using production)")
                );
                tracing::info!("  Spanner database: {}", spanner.database_path());
            }
        }
        tracing::info!("  Fetch page size: {}", self.fetch_limit);
        tracing::info!(
            "  Service listening on: {}:{}",
            self.service_host,
            self.service_port
        );
    }
}
