//! SQL databases, including rename and bacpac import/export.

use std::collections::HashMap;
use std::sync::Arc;

use azfluent_core::fluent::{Appliable, Creatable, GroupableResource, Refreshable, Resource, TaggableUpdate};
use azfluent_core::resource_id::name_from_id;
use azfluent_core::types::{require, AzureError, AzureResult};
use azfluent_core::{async_trait, impl_groupable_resource, AzureClient};
use log::{debug, info};

use crate::servers::{server_id, server_url, SqlServer};
use crate::types::{
    AuthenticationType, CreateMode, DatabaseEdition, DatabaseInner, ImportExportDefinition,
    ImportExportOperationResult, ResourceMoveDefinition, SampleName, Sku, StorageKeyType,
};

// ─── REST operations ────────────────────────────────────────────────

fn database_url(client: &AzureClient, resource_group: &str, server: &str, database: &str, suffix: &str) -> AzureResult<String> {
    require("databaseName", database)?;
    server_url(client, resource_group, server, &format!("/databases/{database}{suffix}"))
}

pub async fn list_databases(client: &AzureClient, resource_group: &str, server: &str) -> AzureResult<Vec<DatabaseInner>> {
    let url = server_url(client, resource_group, server, "/databases")?;
    debug!("list_databases({}/{}) → {}", resource_group, server, url);
    client.get_all_pages(&url).await
}

pub async fn list_databases_by_elastic_pool(
    client: &AzureClient,
    resource_group: &str,
    server: &str,
    elastic_pool: &str,
) -> AzureResult<Vec<DatabaseInner>> {
    require("elasticPoolName", elastic_pool)?;
    let url = server_url(client, resource_group, server, &format!("/elasticPools/{elastic_pool}/databases"))?;
    debug!("list_databases_by_elastic_pool({}/{}/{}) → {}", resource_group, server, elastic_pool, url);
    client.get_all_pages(&url).await
}

pub async fn get_database(client: &AzureClient, resource_group: &str, server: &str, database: &str) -> AzureResult<DatabaseInner> {
    let url = database_url(client, resource_group, server, database, "")?;
    debug!("get_database({}/{}/{}) → {}", resource_group, server, database, url);
    client.get_json(&url).await
}

pub async fn create_or_update_database(
    client: &AzureClient,
    resource_group: &str,
    server: &str,
    database: &str,
    body: &DatabaseInner,
) -> AzureResult<DatabaseInner> {
    let url = database_url(client, resource_group, server, database, "")?;
    debug!("create_or_update_database({}/{}/{}) → {}", resource_group, server, database, url);
    client.put_json(&url, body).await
}

pub async fn delete_database(client: &AzureClient, resource_group: &str, server: &str, database: &str) -> AzureResult<()> {
    let url = database_url(client, resource_group, server, database, "")?;
    debug!("delete_database({}/{}/{}) → {}", resource_group, server, database, url);
    client.delete(&url).await
}

/// Renames by moving the database to a new id on the same server.
pub async fn rename_database(
    client: &AzureClient,
    resource_group: &str,
    server: &str,
    database: &str,
    new_name: &str,
) -> AzureResult<()> {
    require("newDatabaseName", new_name)?;
    let url = database_url(client, resource_group, server, database, "/move")?;
    let body = ResourceMoveDefinition {
        id: format!("{}/databases/{}", server_id(client, resource_group, server)?, new_name),
    };
    debug!("rename_database({}/{}/{} → {}) → {}", resource_group, server, database, new_name, url);
    let _: serde_json::Value = client.post_json(&url, &body).await?;
    Ok(())
}

pub async fn export_database(
    client: &AzureClient,
    resource_group: &str,
    server: &str,
    database: &str,
    body: &ImportExportDefinition,
) -> AzureResult<ImportExportOperationResult> {
    let url = database_url(client, resource_group, server, database, "/export")?;
    debug!("export_database({}/{}/{}) → {}", resource_group, server, database, url);
    client.post_json(&url, body).await
}

/// Imports a bacpac into an existing, empty database.
pub async fn import_database(
    client: &AzureClient,
    resource_group: &str,
    server: &str,
    database: &str,
    body: &ImportExportDefinition,
) -> AzureResult<ImportExportOperationResult> {
    let url = database_url(client, resource_group, server, database, "/import")?;
    debug!("import_database({}/{}/{}) → {}", resource_group, server, database, url);
    client.post_json(&url, body).await
}

fn edition_sku(edition: DatabaseEdition, service_objective: &str) -> Sku {
    Sku::new(service_objective, edition.as_str())
}

// ─── Import / export ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Import,
    Export,
}

/// Pending bacpac transfer between a database and a storage blob.
#[derive(Debug, Clone)]
pub struct SqlDatabaseTransferRequest {
    direction: Direction,
    resource_group: String,
    server: String,
    database: String,
    storage_uri: String,
    storage_key: Option<(StorageKeyType, String)>,
    login: Option<(AuthenticationType, String, String)>,
    client: Arc<AzureClient>,
}

impl SqlDatabaseTransferRequest {
    pub fn with_storage_access_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some((StorageKeyType::StorageAccessKey, key.into()));
        self
    }

    pub fn with_shared_access_key(mut self, sas: impl Into<String>) -> Self {
        self.storage_key = Some((StorageKeyType::SharedAccessKey, sas.into()));
        self
    }

    pub fn with_sql_administrator_login_and_password(mut self, login: impl Into<String>, password: impl Into<String>) -> Self {
        self.login = Some((AuthenticationType::Sql, login.into(), password.into()));
        self
    }

    pub fn with_active_directory_login_and_password(mut self, login: impl Into<String>, password: impl Into<String>) -> Self {
        self.login = Some((AuthenticationType::AdPassword, login.into(), password.into()));
        self
    }

    fn definition(&self) -> AzureResult<ImportExportDefinition> {
        require("storageUri", &self.storage_uri)?;
        let (key_type, key) = self.storage_key.clone().ok_or_else(|| AzureError::required("storageKey"))?;
        require("storageKey", &key)?;
        let (auth, login, password) = self.login.clone().ok_or_else(|| AzureError::required("administratorLogin"))?;
        require("administratorLogin", &login)?;
        require("administratorLoginPassword", &password)?;
        Ok(ImportExportDefinition {
            storage_key_type: key_type,
            storage_key: key,
            storage_uri: self.storage_uri.clone(),
            administrator_login: login,
            administrator_login_password: password,
            authentication_type: Some(auth),
        })
    }

    /// Runs the transfer and waits for it to finish.
    pub async fn execute(self) -> AzureResult<ImportExportOperationResult> {
        let body = self.definition()?;
        let result = match self.direction {
            Direction::Export => {
                export_database(&self.client, &self.resource_group, &self.server, &self.database, &body).await?
            }
            Direction::Import => {
                import_database(&self.client, &self.resource_group, &self.server, &self.database, &body).await?
            }
        };
        info!(
            "{:?} of SQL database {}/{}/{} via {} finished",
            self.direction, self.resource_group, self.server, self.database, self.storage_uri
        );
        Ok(result)
    }
}

// ─── Fluent wrapper ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SqlDatabase {
    inner: DatabaseInner,
    server: String,
    client: Arc<AzureClient>,
}

impl_groupable_resource!(SqlDatabase, DatabaseInner);

impl SqlDatabase {
    pub(crate) fn new(inner: DatabaseInner, server: String, client: Arc<AzureClient>) -> Self {
        Self { inner, server, client }
    }

    pub fn sql_server_name(&self) -> &str {
        &self.server
    }

    pub fn collation(&self) -> Option<&str> {
        self.inner.properties.collation.as_deref()
    }

    pub fn max_size_bytes(&self) -> Option<u64> {
        self.inner.properties.max_size_bytes
    }

    pub fn status(&self) -> Option<&str> {
        self.inner.properties.status.as_deref()
    }

    pub fn edition(&self) -> Option<&str> {
        self.inner.sku.as_ref().and_then(|s| s.tier.as_deref())
    }

    pub fn sku(&self) -> Option<&Sku> {
        self.inner.sku.as_ref()
    }

    pub fn current_service_objective_name(&self) -> Option<&str> {
        self.inner.properties.current_service_objective_name.as_deref()
    }

    pub fn creation_date(&self) -> Option<&str> {
        self.inner.properties.creation_date.as_deref()
    }

    pub fn database_id(&self) -> Option<&str> {
        self.inner.properties.database_id.as_deref()
    }

    pub fn default_secondary_location(&self) -> Option<&str> {
        self.inner.properties.default_secondary_location.as_deref()
    }

    pub fn elastic_pool_id(&self) -> Option<&str> {
        self.inner.properties.elastic_pool_id.as_deref()
    }

    pub fn elastic_pool_name(&self) -> Option<String> {
        self.elastic_pool_id().and_then(name_from_id)
    }

    pub fn is_in_elastic_pool(&self) -> bool {
        self.elastic_pool_id().is_some()
    }

    /// Renames the database and returns it under its new name.
    pub async fn rename(&self, new_name: &str) -> AzureResult<SqlDatabase> {
        let rg = self.resource_group_name();
        rename_database(&self.client, &rg, &self.server, self.name(), new_name).await?;
        info!("Renamed SQL database {}/{}/{} to {}", rg, self.server, self.name(), new_name);
        let inner = get_database(&self.client, &rg, &self.server, new_name).await?;
        Ok(SqlDatabase::new(inner, self.server.clone(), self.client.clone()))
    }

    pub fn export_to(&self, storage_uri: impl Into<String>) -> SqlDatabaseTransferRequest {
        self.transfer(Direction::Export, storage_uri.into())
    }

    pub fn import_bacpac(&self, storage_uri: impl Into<String>) -> SqlDatabaseTransferRequest {
        self.transfer(Direction::Import, storage_uri.into())
    }

    fn transfer(&self, direction: Direction, storage_uri: String) -> SqlDatabaseTransferRequest {
        SqlDatabaseTransferRequest {
            direction,
            resource_group: self.resource_group_name(),
            server: self.server.clone(),
            database: self.name().to_string(),
            storage_uri,
            storage_key: None,
            login: None,
            client: self.client.clone(),
        }
    }

    pub async fn delete(&self) -> AzureResult<()> {
        delete_database(&self.client, &self.resource_group_name(), &self.server, self.name()).await
    }

    pub fn update(&self) -> SqlDatabaseUpdate {
        SqlDatabaseUpdate {
            inner: self.inner.clone(),
            server: self.server.clone(),
            client: self.client.clone(),
        }
    }
}

#[async_trait]
impl Refreshable for SqlDatabase {
    async fn refresh(&mut self) -> AzureResult<()> {
        let rg = self.resource_group_name();
        let name = self.name().to_string();
        self.inner = get_database(&self.client, &rg, &self.server, &name).await?;
        Ok(())
    }
}

// ─── Definition ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SqlDatabaseDefinition {
    name: String,
    resource_group: Option<String>,
    server: Option<String>,
    region: Option<String>,
    elastic_pool: Option<String>,
    inner: DatabaseInner,
    client: Arc<AzureClient>,
}

impl SqlDatabaseDefinition {
    pub(crate) fn new(name: impl Into<String>, client: Arc<AzureClient>) -> Self {
        Self {
            name: name.into(),
            resource_group: None,
            server: None,
            region: None,
            elastic_pool: None,
            inner: DatabaseInner::default(),
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The database is placed in the server's region.
    pub fn with_existing_sql_server(
        mut self,
        resource_group: impl Into<String>,
        server: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        self.resource_group = Some(resource_group.into());
        self.server = Some(server.into());
        self.region = Some(region.into());
        self
    }

    pub fn with_existing_sql_server_of(self, server: &SqlServer) -> Self {
        let rg = server.resource_group_name();
        let region = server.region_name().to_string();
        self.with_existing_sql_server(rg, server.name(), region)
    }

    pub fn with_basic_edition(self) -> Self {
        self.with_edition(DatabaseEdition::Basic, "Basic")
    }

    /// Standard tier with a service objective such as `S0` or `S3`.
    pub fn with_standard_edition(self, service_objective: &str) -> Self {
        self.with_edition(DatabaseEdition::Standard, service_objective)
    }

    /// Premium tier with a service objective such as `P1`.
    pub fn with_premium_edition(self, service_objective: &str) -> Self {
        self.with_edition(DatabaseEdition::Premium, service_objective)
    }

    pub fn with_edition(mut self, edition: DatabaseEdition, service_objective: &str) -> Self {
        self.inner.sku = Some(edition_sku(edition, service_objective));
        self
    }

    pub fn with_sku(mut self, sku: Sku) -> Self {
        self.inner.sku = Some(sku);
        self
    }

    pub fn with_max_size_bytes(mut self, max_size_bytes: u64) -> Self {
        self.inner.properties.max_size_bytes = Some(max_size_bytes);
        self
    }

    pub fn with_collation(mut self, collation: impl Into<String>) -> Self {
        self.inner.properties.collation = Some(collation.into());
        self
    }

    /// Places the database in a pool on the same server; the pool decides its sku.
    pub fn with_existing_elastic_pool(mut self, pool_name: impl Into<String>) -> Self {
        self.elastic_pool = Some(pool_name.into());
        self
    }

    pub fn without_elastic_pool(mut self) -> Self {
        self.elastic_pool = None;
        self
    }

    pub fn from_sample(mut self, sample: SampleName) -> Self {
        self.inner.properties.sample_name = Some(sample);
        self
    }

    /// Copies `source_database_id` unless another create mode is set.
    pub fn with_source_database(mut self, source_database_id: impl Into<String>) -> Self {
        self.inner.properties.source_database_id = Some(source_database_id.into());
        if self.inner.properties.create_mode.is_none() {
            self.inner.properties.create_mode = Some(CreateMode::Copy);
        }
        self
    }

    pub fn with_mode(mut self, mode: CreateMode) -> Self {
        self.inner.properties.create_mode = Some(mode);
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.tags.insert(key.into(), value.into());
        self
    }

    pub fn elastic_pool_name(&self) -> Option<&str> {
        self.elastic_pool.as_deref()
    }

    pub fn inner(&self) -> &DatabaseInner {
        &self.inner
    }

    /// Used by a server definition creating its databases.
    pub(crate) fn with_parent(mut self, resource_group: &str, server: &str, region: &str) -> Self {
        self.resource_group = Some(resource_group.to_string());
        self.server = Some(server.to_string());
        self.region = Some(region.to_string());
        self
    }

    fn to_inner(&self, resource_group: &str, server: &str) -> AzureResult<DatabaseInner> {
        let props = &self.inner.properties;
        match props.create_mode {
            Some(CreateMode::Default) | None => {}
            Some(mode) if props.source_database_id.is_none() => {
                return Err(AzureError::validation(format!(
                    "Create mode {mode:?} requires a source database"
                )))
            }
            Some(_) => {}
        }
        if props.sample_name.is_some() && props.source_database_id.is_some() {
            return Err(AzureError::validation(
                "A database cannot be created both from a sample and from a source database",
            ));
        }
        let mut body = self.inner.clone();
        body.location = self.region.clone();
        if let Some(pool) = &self.elastic_pool {
            body.properties.elastic_pool_id = Some(format!(
                "{}/elasticPools/{}",
                server_id(&self.client, resource_group, server)?,
                pool
            ));
            body.sku = None;
        }
        Ok(body)
    }
}

#[async_trait]
impl Creatable for SqlDatabaseDefinition {
    type Output = SqlDatabase;

    async fn create(self) -> AzureResult<SqlDatabase> {
        require("databaseName", &self.name)?;
        let rg = self.resource_group.clone().ok_or_else(|| AzureError::required("resourceGroupName"))?;
        let server = self.server.clone().ok_or_else(|| AzureError::required("serverName"))?;
        if self.region.as_deref().map_or(true, |r| r.trim().is_empty()) {
            return Err(AzureError::required("location"));
        }
        let body = self.to_inner(&rg, &server)?;
        let inner = create_or_update_database(&self.client, &rg, &server, &self.name, &body).await?;
        info!("Created SQL database {}/{}/{}", rg, server, self.name);
        Ok(SqlDatabase::new(inner, server, self.client))
    }
}

// ─── Update ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SqlDatabaseUpdate {
    inner: DatabaseInner,
    server: String,
    client: Arc<AzureClient>,
}

impl SqlDatabaseUpdate {
    pub fn with_edition(mut self, edition: DatabaseEdition, service_objective: &str) -> Self {
        self.inner.sku = Some(edition_sku(edition, service_objective));
        self
    }

    pub fn with_sku(mut self, sku: Sku) -> Self {
        self.inner.sku = Some(sku);
        self
    }

    pub fn with_max_size_bytes(mut self, max_size_bytes: u64) -> Self {
        self.inner.properties.max_size_bytes = Some(max_size_bytes);
        self
    }

    /// Moves the database into a pool on the same server.
    pub fn with_existing_elastic_pool(mut self, pool_name: &str) -> Self {
        let id = self.inner.id.as_deref().unwrap_or_default();
        let server_id = id.split("/databases/").next().unwrap_or_default();
        self.inner.properties.elastic_pool_id = Some(format!("{server_id}/elasticPools/{pool_name}"));
        self.inner.sku = None;
        self
    }

    /// Takes the database out of its pool; pair with an edition.
    pub fn without_elastic_pool(mut self) -> Self {
        self.inner.properties.elastic_pool_id = None;
        self
    }
}

impl TaggableUpdate for SqlDatabaseUpdate {
    fn tags_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.inner.tags
    }
}

#[async_trait]
impl Appliable for SqlDatabaseUpdate {
    type Output = SqlDatabase;

    async fn apply(mut self) -> AzureResult<SqlDatabase> {
        if self.inner.properties.elastic_pool_id.is_none()
            && self.inner.sku.as_ref().map_or(true, |s| s.name == "ElasticPool")
        {
            return Err(AzureError::validation(
                "A database taken out of its elastic pool needs an edition",
            ));
        }
        let rg = azfluent_core::resource_id::resource_group_from_id(self.inner.id.as_deref().unwrap_or_default())
            .ok_or_else(AzureError::resource_group_required)?;
        let name = self.inner.name.clone().unwrap_or_default();
        // The create mode only applies on creation.
        self.inner.properties.create_mode = None;
        let inner = create_or_update_database(&self.client, &rg, &self.server, &name, &self.inner).await?;
        info!("Updated SQL database {}/{}/{}", rg, self.server, name);
        Ok(SqlDatabase::new(inner, self.server, self.client))
    }
}

// ─── Collection ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SqlDatabases {
    client: Arc<AzureClient>,
}

impl SqlDatabases {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    fn wrap(&self, inner: DatabaseInner, server: &str) -> SqlDatabase {
        SqlDatabase::new(inner, server.to_string(), self.client.clone())
    }

    pub fn define(&self, name: impl Into<String>) -> SqlDatabaseDefinition {
        SqlDatabaseDefinition::new(name, self.client.clone())
    }

    pub async fn list_by_sql_server(&self, resource_group: &str, server: &str) -> AzureResult<Vec<SqlDatabase>> {
        Ok(list_databases(&self.client, resource_group, server)
            .await?
            .into_iter()
            .map(|inner| self.wrap(inner, server))
            .collect())
    }

    pub async fn list_by_elastic_pool(
        &self,
        resource_group: &str,
        server: &str,
        elastic_pool: &str,
    ) -> AzureResult<Vec<SqlDatabase>> {
        Ok(list_databases_by_elastic_pool(&self.client, resource_group, server, elastic_pool)
            .await?
            .into_iter()
            .map(|inner| self.wrap(inner, server))
            .collect())
    }

    pub async fn get_by_sql_server(&self, resource_group: &str, server: &str, name: &str) -> AzureResult<SqlDatabase> {
        Ok(self.wrap(get_database(&self.client, resource_group, server, name).await?, server))
    }

    pub async fn delete_by_sql_server(&self, resource_group: &str, server: &str, name: &str) -> AzureResult<()> {
        delete_database(&self.client, resource_group, server, name).await?;
        info!("Deleted SQL database {}/{}/{}", resource_group, server, name);
        Ok(())
    }

    pub async fn rename(&self, resource_group: &str, server: &str, name: &str, new_name: &str) -> AzureResult<SqlDatabase> {
        rename_database(&self.client, resource_group, server, name, new_name).await?;
        info!("Renamed SQL database {}/{}/{} to {}", resource_group, server, name, new_name);
        self.get_by_sql_server(resource_group, server, new_name).await
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use azfluent_core::test_utils::mock_client;
    use azfluent_core::types::AzureErrorKind;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SERVER_ID: &str = "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Sql/servers/srv1";

    fn db_path(name: &str) -> String {
        format!("{SERVER_ID}/databases/{name}")
    }

    fn db_json(name: &str) -> serde_json::Value {
        json!({
            "id": db_path(name), "name": name, "location": "eastus",
            "sku": {"name": "S0", "tier": "Standard"},
            "properties": {"status": "Online", "collation": "SQL_Latin1_General_CP1_CI_AS", "maxSizeBytes": 268435456u64}
        })
    }

    #[tokio::test]
    async fn create_standard_edition() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(db_path("db1")))
            .and(body_json(json!({
                "location": "eastus",
                "sku": {"name": "S0", "tier": "Standard"},
                "properties": {"maxSizeBytes": 268435456u64, "collation": "SQL_Latin1_General_CP1_CI_AS"}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(db_json("db1")))
            .expect(1)
            .mount(&server)
            .await;

        let db = SqlDatabases::new(mock_client(&server))
            .define("db1")
            .with_existing_sql_server("rg1", "srv1", "eastus")
            .with_standard_edition("S0")
            .with_max_size_bytes(268_435_456)
            .with_collation("SQL_Latin1_General_CP1_CI_AS")
            .create()
            .await
            .unwrap();
        assert_eq!(db.edition(), Some("Standard"));
        assert_eq!(db.sql_server_name(), "srv1");
        assert_eq!(db.resource_group_name(), "rg1");
    }

    #[tokio::test]
    async fn elastic_pool_member_drops_sku() {
        let server = MockServer::start().await;
        let def = SqlDatabases::new(mock_client(&server))
            .define("db1")
            .with_existing_sql_server("rg1", "srv1", "eastus")
            .with_standard_edition("S1")
            .with_existing_elastic_pool("pool1");
        let body = def.to_inner("rg1", "srv1").unwrap();
        assert!(body.sku.is_none());
        assert_eq!(
            body.properties.elastic_pool_id.as_deref(),
            Some(format!("{SERVER_ID}/elasticPools/pool1").as_str())
        );
    }

    #[tokio::test]
    async fn restore_modes_need_source() {
        let server = MockServer::start().await;
        let err = SqlDatabases::new(mock_client(&server))
            .define("db1")
            .with_existing_sql_server("rg1", "srv1", "eastus")
            .with_mode(CreateMode::PointInTimeRestore)
            .create()
            .await
            .unwrap_err();
        assert_eq!(err.kind, AzureErrorKind::Validation);
        assert!(server.received_requests().await.unwrap().is_empty());

        let def = SqlDatabases::new(mock_client(&server))
            .define("copy1")
            .with_source_database(db_path("db1"));
        assert_eq!(def.inner().properties.create_mode, Some(CreateMode::Copy));
    }

    #[tokio::test]
    async fn rename_moves_and_rereads() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{}/move", db_path("db1"))))
            .and(body_json(json!({"id": db_path("db2")})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(db_path("db2")))
            .respond_with(ResponseTemplate::new(200).set_body_json(db_json("db2")))
            .mount(&server)
            .await;

        let db = SqlDatabases::new(mock_client(&server))
            .rename("rg1", "srv1", "db1", "db2")
            .await
            .unwrap();
        assert_eq!(db.name(), "db2");
    }

    #[tokio::test]
    async fn export_requires_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(db_path("db1")))
            .respond_with(ResponseTemplate::new(200).set_body_json(db_json("db1")))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("{}/export", db_path("db1"))))
            .and(body_partial_json(json!({
                "storageKeyType": "StorageAccessKey",
                "storageKey": "key==",
                "storageUri": "https://acct.blob.core.windows.net/bacpacs/db1.bacpac",
                "administratorLogin": "sqladmin",
                "authenticationType": "Sql"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "op1", "properties": {"requestType": "Export", "status": "Succeeded", "databaseName": "db1"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let db = SqlDatabases::new(mock_client(&server))
            .get_by_sql_server("rg1", "srv1", "db1")
            .await
            .unwrap();
        let uri = "https://acct.blob.core.windows.net/bacpacs/db1.bacpac";
        assert!(db.export_to(uri).with_storage_access_key("key==").execute().await.is_err());

        let result = db
            .export_to(uri)
            .with_storage_access_key("key==")
            .with_sql_administrator_login_and_password("sqladmin", "P@ssw0rd!")
            .execute()
            .await
            .unwrap();
        assert_eq!(result.properties.status.as_deref(), Some("Succeeded"));
    }

    #[tokio::test]
    async fn update_out_of_pool_needs_edition() {
        let server = MockServer::start().await;
        let mut pooled = db_json("db1");
        pooled["sku"] = json!({"name": "ElasticPool", "tier": "Standard"});
        pooled["properties"]["elasticPoolId"] = json!(format!("{SERVER_ID}/elasticPools/pool1"));
        Mock::given(method("GET"))
            .and(path(db_path("db1")))
            .respond_with(ResponseTemplate::new(200).set_body_json(pooled))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(db_path("db1")))
            .and(body_partial_json(json!({"sku": {"name": "S2", "tier": "Standard"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(db_json("db1")))
            .expect(1)
            .mount(&server)
            .await;

        let db = SqlDatabases::new(mock_client(&server))
            .get_by_sql_server("rg1", "srv1", "db1")
            .await
            .unwrap();
        assert_eq!(db.elastic_pool_name().as_deref(), Some("pool1"));
        assert!(db.update().without_elastic_pool().apply().await.is_err());

        let moved = db
            .update()
            .without_elastic_pool()
            .with_edition(DatabaseEdition::Standard, "S2")
            .apply()
            .await
            .unwrap();
        assert!(!moved.is_in_elastic_pool());
    }
}
