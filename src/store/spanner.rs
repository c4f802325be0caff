use anyhow::{Context, Result};
use async_trait::async_trait;
use gcloud_gax::grpc::Code;
use gcloud_googleapis::spanner::admin::database::v1::{
    CreateDatabaseRequest, GetDatabaseDdlRequest, GetDatabaseRequest, UpdateDatabaseDdlRequest,
};
use gcloud_googleapis::spanner::admin::instance::v1::{
    CreateInstanceRequest, GetInstanceRequest, Instance,
};
use gcloud_spanner::admin::AdminClientConfig;
use gcloud_spanner::admin::client::Client as AdminClient;
use gcloud_spanner::client::{Client, ClientConfig};
use gcloud_spanner::key::Key;
use gcloud_spanner::mutation::{delete, insert, update};
use gcloud_spanner::row::Row;
use gcloud_spanner::statement::{Statement, ToKind};
use gcloud_spanner::value::CommitTimestamp;
use std::sync::Arc;
use uuid::Uuid;

use super::{BusDetailsStore, DateMatch, FetchPage, Filter};
use crate::config::SpannerConfig;
use crate::models::{BusDetails, BusDetailsEntry, BusDetailsPatch};

const TABLE: &str = "bus_details";

const SELECT_COLUMNS: &str = "record_key, vehicle_id, date_field, trip, \
     front_door_entry, front_door_exit, back_door_entry, back_door_exit, \
     trip_count, distress_count";

/// Bus details stored in a Cloud Spanner table
#[derive(Clone)]
pub struct SpannerStore {
    inner: Arc<Client>,
}

impl SpannerStore {
    /// Connect to the configured database
    ///
    /// The gcloud-spanner library picks up SPANNER_EMULATOR_HOST on its own
    /// and talks to the emulator when it is set. The instance, database and
    /// `bus_details` table are created first if they are missing.
    pub async fn from_config(config: &SpannerConfig) -> Result<Self> {
        auto_provision(config).await?;

        let database_path = config.database_path();

        match &config.emulator_host {
            Some(host) => tracing::info!("Connecting to Spanner emulator at: {}", host),
            None => tracing::info!("Connecting to production Spanner"),
        }

        let client = Client::new(&database_path, ClientConfig::default())
            .await
            .context("Failed to create Spanner client")?;

        tracing::info!(
            "Successfully connected to Spanner database: {}",
            database_path
        );

        Ok(Self {
            inner: Arc::new(client),
        })
    }

    async fn query(&self, statement: Statement) -> Result<Vec<BusDetailsEntry>> {
        let mut tx = self
            .inner
            .single()
            .await
            .context("Failed to create read transaction")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to query bus details from Spanner")?;

        let mut entries = Vec::new();
        while let Some(row) = result_set.next().await? {
            entries.push(entry_from_row(&row)?);
        }
        Ok(entries)
    }
}

fn entry_from_row(row: &Row) -> Result<BusDetailsEntry> {
    Ok(BusDetailsEntry {
        key: row.column_by_name("record_key")?,
        details: BusDetails {
            vehicle_id: row.column_by_name("vehicle_id")?,
            date_field: row.column_by_name("date_field")?,
            trip: row.column_by_name("trip")?,
            front_door_entry: row.column_by_name("front_door_entry")?,
            front_door_exit: row.column_by_name("front_door_exit")?,
            back_door_entry: row.column_by_name("back_door_entry")?,
            back_door_exit: row.column_by_name("back_door_exit")?,
            trip_count: row.column_by_name("trip_count")?,
            distress_count: row.column_by_name("distress_count")?,
        },
    })
}

/// Paged SELECT text for a filter. One extra row is requested so the
/// caller can tell whether another page follows.
fn fetch_sql(filter: &Filter, limit: usize, last: Option<&str>) -> String {
    let mut conditions = Vec::new();
    if filter.vehicle_id.is_some() {
        conditions.push("vehicle_id = @vehicle_id");
    }
    match filter.date_field {
        DateMatch::Any => {}
        DateMatch::Equals(_) => conditions.push("date_field = @date_field"),
        DateMatch::Missing => conditions.push("date_field IS NULL"),
    }
    if last.is_some() {
        conditions.push("record_key > @last");
    }

    let mut sql = format!("SELECT {} FROM {}", SELECT_COLUMNS, TABLE);
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(&format!(
        " ORDER BY record_key LIMIT {}",
        limit.saturating_add(1)
    ));
    sql
}

fn fetch_statement(filter: &Filter, limit: usize, last: Option<&str>) -> Statement {
    let mut statement = Statement::new(&fetch_sql(filter, limit, last));
    if let Some(vehicle_id) = filter.vehicle_id {
        statement.add_param("vehicle_id", &vehicle_id);
    }
    if let DateMatch::Equals(date) = &filter.date_field {
        statement.add_param("date_field", date);
    }
    if let Some(last) = last {
        statement.add_param("last", &last.to_string());
    }
    statement
}

#[async_trait]
impl BusDetailsStore for SpannerStore {
    async fn fetch(&self, filter: &Filter, limit: usize, last: Option<&str>) -> Result<FetchPage> {
        let mut items = self.query(fetch_statement(filter, limit, last)).await?;

        let last = if items.len() > limit {
            items.truncate(limit);
            items.last().map(|entry| entry.key.clone())
        } else {
            None
        };

        tracing::debug!("Fetched {} records (filter: {:?})", items.len(), filter);
        Ok(FetchPage { items, last })
    }

    async fn put(&self, details: &BusDetails) -> Result<String> {
        let key = Uuid::new_v4().to_string();

        let mutation = insert(
            TABLE,
            &[
                "record_key",
                "vehicle_id",
                "date_field",
                "trip",
                "front_door_entry",
                "front_door_exit",
                "back_door_entry",
                "back_door_exit",
                "trip_count",
                "distress_count",
                "created_at",
                "updated_at",
            ],
            &[
                &key,
                &details.vehicle_id,
                &details.date_field,
                &details.trip,
                &details.front_door_entry,
                &details.front_door_exit,
                &details.back_door_entry,
                &details.back_door_exit,
                &details.trip_count,
                &details.distress_count,
                &CommitTimestamp::new(),
                &CommitTimestamp::new(),
            ],
        );

        self.inner
            .apply(vec![mutation])
            .await
            .context("Failed to insert bus details into Spanner")?;

        tracing::debug!("Inserted record with key: {}", key);
        Ok(key)
    }

    async fn update(&self, key: &str, patch: &BusDetailsPatch) -> Result<()> {
        let key = key.to_string();
        let counts = patch.counts();
        let field_count = counts.len() + usize::from(patch.trip.is_some());

        let mutation = {
            let updated_at = CommitTimestamp::new();
            let mut columns: Vec<&str> = vec!["record_key", "updated_at"];
            let mut values: Vec<&dyn ToKind> = vec![&key, &updated_at];
            if let Some(trip) = &patch.trip {
                columns.push("trip");
                values.push(trip);
            }
            for (column, value) in &counts {
                columns.push(*column);
                values.push(value);
            }
            update(TABLE, &columns, &values)
        };

        // An update mutation on a missing row fails with NOT_FOUND
        self.inner
            .apply(vec![mutation])
            .await
            .with_context(|| format!("Failed to update bus details with key: {}", key))?;

        tracing::debug!("Updated record with key: {} ({} fields)", key, field_count);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        let mutation = delete(TABLE, Key::new(&key));

        self.inner
            .apply(vec![mutation])
            .await
            .with_context(|| format!("Failed to delete bus details with key: {}", key))?;

        tracing::debug!("Deleted record with key: {}", key);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<BusDetailsEntry>> {
        let mut statement = Statement::new(&format!(
            "SELECT {} FROM {} WHERE record_key = @key",
            SELECT_COLUMNS, TABLE
        ));
        statement.add_param("key", &key.to_string());

        let entry = self.query(statement).await?.into_iter().next();
        if entry.is_none() {
            tracing::debug!("Record not found with key: {}", key);
        }
        Ok(entry)
    }

    /// Run `SELECT 1` to prove the session pool can reach the database
    async fn health_check(&self) -> Result<()> {
        let statement = Statement::new("SELECT 1");

        let mut tx = self
            .inner
            .single()
            .await
            .context("Failed to create health check transaction")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to execute health check query")?;

        if result_set.next().await?.is_some() {
            tracing::debug!("Health check query succeeded");
            Ok(())
        } else {
            Err(anyhow::anyhow!("Health check query returned no results"))
        }
    }
}

/// Create the Spanner instance, database and table when they don't exist yet
async fn auto_provision(config: &SpannerConfig) -> Result<()> {
    tracing::info!("Starting auto-provisioning checks...");

    let admin_client = AdminClient::new(AdminClientConfig::default())
        .await
        .context("Failed to create Spanner admin client")?;

    let project_path = format!("projects/{}", config.project);
    let instance_path = format!("{}/instances/{}", project_path, config.instance);
    let database_path = config.database_path();

    ensure_instance_exists(&admin_client, config, &project_path, &instance_path).await?;
    ensure_database_exists(&admin_client, config, &instance_path, &database_path).await?;
    ensure_table_exists(&admin_client, &database_path).await?;

    tracing::info!("Auto-provisioning complete");
    Ok(())
}

async fn ensure_instance_exists(
    admin_client: &AdminClient,
    config: &SpannerConfig,
    project_path: &str,
    instance_path: &str,
) -> Result<()> {
    let get_request = GetInstanceRequest {
        name: instance_path.to_string(),
        field_mask: None,
    };

    match admin_client.instance().get_instance(get_request, None).await {
        Ok(_) => {
            tracing::info!("Instance already exists: {}", instance_path);
            Ok(())
        }
        Err(status) if status.code() == Code::NotFound => {
            tracing::info!("Instance not found, creating: {}", instance_path);

            let instance_config = if config.emulator_host.is_some() {
                format!("{}/instanceConfigs/emulator-config", project_path)
            } else {
                format!("{}/instanceConfigs/regional-us-central1", project_path)
            };

            let create_request = CreateInstanceRequest {
                parent: project_path.to_string(),
                instance_id: config.instance.clone(),
                instance: Some(Instance {
                    name: instance_path.to_string(),
                    config: instance_config,
                    display_name: format!("{} instance", config.instance),
                    node_count: 1,
                    ..Default::default()
                }),
            };

            let mut operation = admin_client
                .instance()
                .create_instance(create_request, None)
                .await
                .context("Failed to start instance creation")?;

            operation
                .wait(None)
                .await
                .context("Failed to create instance")?;

            tracing::info!("Instance created successfully: {}", instance_path);
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(
            "Failed to check instance existence: {}",
            e.message()
        )),
    }
}

async fn ensure_database_exists(
    admin_client: &AdminClient,
    config: &SpannerConfig,
    instance_path: &str,
    database_path: &str,
) -> Result<()> {
    let get_request = GetDatabaseRequest {
        name: database_path.to_string(),
    };

    match admin_client.database().get_database(get_request, None).await {
        Ok(_) => {
            tracing::info!("Database already exists: {}", database_path);
            Ok(())
        }
        Err(status) if status.code() == Code::NotFound => {
            tracing::info!("Database not found, creating: {}", database_path);

            let create_request = CreateDatabaseRequest {
                parent: instance_path.to_string(),
                create_statement: format!("CREATE DATABASE `{}`", config.database),
                extra_statements: vec![],
                encryption_config: None,
                database_dialect: 1, // Google Standard SQL
                proto_descriptors: vec![],
            };

            let mut operation = admin_client
                .database()
                .create_database(create_request, None)
                .await
                .context("Failed to start database creation")?;

            operation
                .wait(None)
                .await
                .context("Failed to create database")?;

            tracing::info!("Database created successfully: {}", database_path);
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(
            "Failed to check database existence: {}",
            e.message()
        )),
    }
}

async fn ensure_table_exists(admin_client: &AdminClient, database_path: &str) -> Result<()> {
    let get_ddl_request = GetDatabaseDdlRequest {
        database: database_path.to_string(),
    };

    let ddl_response = admin_client
        .database()
        .get_database_ddl(get_ddl_request, None)
        .await
        .context("Failed to get database DDL")?;

    let table_exists = ddl_response.into_inner().statements.iter().any(|stmt| {
        stmt.contains("CREATE TABLE bus_details") || stmt.contains("CREATE TABLE `bus_details`")
    });

    if table_exists {
        tracing::info!("Table '{}' already exists", TABLE);
        return Ok(());
    }

    tracing::info!("Table '{}' not found, creating...", TABLE);

    // No unique index on (vehicle_id, date_field): duplicates are only
    // rejected by the create handler's existence check.
    let create_table_ddl = r#"
CREATE TABLE bus_details (
    record_key STRING(36) NOT NULL,
    vehicle_id INT64 NOT NULL,
    date_field STRING(MAX) NOT NULL,
    trip STRING(MAX) NOT NULL,
    front_door_entry INT64 NOT NULL,
    front_door_exit INT64 NOT NULL,
    back_door_entry INT64 NOT NULL,
    back_door_exit INT64 NOT NULL,
    trip_count INT64 NOT NULL,
    distress_count INT64 NOT NULL,
    created_at TIMESTAMP NOT NULL OPTIONS (allow_commit_timestamp=true),
    updated_at TIMESTAMP NOT NULL OPTIONS (allow_commit_timestamp=true),
) PRIMARY KEY (record_key)
"#
    .trim()
    .to_string();

    let update_request = UpdateDatabaseDdlRequest {
        database: database_path.to_string(),
        statements: vec![create_table_ddl],
        operation_id: String::new(),
        proto_descriptors: vec![],
        throughput_mode: false,
    };

    let mut operation = admin_client
        .database()
        .update_database_ddl(update_request, None)
        .await
        .context("Failed to start table creation")?;

    operation
        .wait(None)
        .await
        .context("Failed to create table")?;

    tracing::info!("Table '{}' created successfully", TABLE);
    Ok(())
}
