//! Elastic pools sharing DTU capacity between databases of one server.

use std::collections::HashMap;
use std::sync::Arc;

use azfluent_core::fluent::{Appliable, Creatable, GroupableResource, Refreshable, Resource, TaggableUpdate};
use azfluent_core::types::{require, AzureError, AzureResult};
use azfluent_core::{async_trait, impl_groupable_resource, AzureClient};
use log::{debug, info};

use crate::databases::{SqlDatabase, SqlDatabases};
use crate::servers::{server_url, SqlServer};
use crate::types::{DatabaseEdition, ElasticPoolInner, PerDatabaseSettings, Sku};

// ─── REST operations ────────────────────────────────────────────────

fn pool_url(client: &AzureClient, resource_group: &str, server: &str, pool: Option<&str>) -> AzureResult<String> {
    let child = match pool {
        Some(name) => {
            require("elasticPoolName", name)?;
            format!("/elasticPools/{name}")
        }
        None => "/elasticPools".to_string(),
    };
    server_url(client, resource_group, server, &child)
}

pub async fn list_elastic_pools(client: &AzureClient, resource_group: &str, server: &str) -> AzureResult<Vec<ElasticPoolInner>> {
    let url = pool_url(client, resource_group, server, None)?;
    debug!("list_elastic_pools({}/{}) → {}", resource_group, server, url);
    client.get_all_pages(&url).await
}

pub async fn get_elastic_pool(client: &AzureClient, resource_group: &str, server: &str, pool: &str) -> AzureResult<ElasticPoolInner> {
    let url = pool_url(client, resource_group, server, Some(pool))?;
    debug!("get_elastic_pool({}/{}/{}) → {}", resource_group, server, pool, url);
    client.get_json(&url).await
}

pub async fn create_or_update_elastic_pool(
    client: &AzureClient,
    resource_group: &str,
    server: &str,
    pool: &str,
    body: &ElasticPoolInner,
) -> AzureResult<ElasticPoolInner> {
    let url = pool_url(client, resource_group, server, Some(pool))?;
    debug!("create_or_update_elastic_pool({}/{}/{}) → {}", resource_group, server, pool, url);
    client.put_json(&url, body).await
}

/// Only an empty pool can be deleted.
pub async fn delete_elastic_pool(client: &AzureClient, resource_group: &str, server: &str, pool: &str) -> AzureResult<()> {
    let url = pool_url(client, resource_group, server, Some(pool))?;
    debug!("delete_elastic_pool({}/{}/{}) → {}", resource_group, server, pool, url);
    client.delete(&url).await
}

fn validate_per_database(settings: Option<&PerDatabaseSettings>) -> AzureResult<()> {
    if let Some(PerDatabaseSettings {
        min_capacity: Some(min),
        max_capacity: Some(max),
    }) = settings
    {
        if min > max {
            return Err(AzureError::validation(format!(
                "Per-database minimum capacity {min} exceeds maximum capacity {max}"
            )));
        }
    }
    Ok(())
}

// ─── Fluent wrapper ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SqlElasticPool {
    inner: ElasticPoolInner,
    server: String,
    client: Arc<AzureClient>,
}

impl_groupable_resource!(SqlElasticPool, ElasticPoolInner);

impl SqlElasticPool {
    pub(crate) fn new(inner: ElasticPoolInner, server: String, client: Arc<AzureClient>) -> Self {
        Self { inner, server, client }
    }

    pub fn sql_server_name(&self) -> &str {
        &self.server
    }

    pub fn edition(&self) -> Option<&str> {
        self.inner.sku.as_ref().and_then(|s| s.tier.as_deref())
    }

    /// Shared capacity in DTUs (or vCores for vCore skus).
    pub fn capacity(&self) -> Option<u32> {
        self.inner.sku.as_ref().and_then(|s| s.capacity)
    }

    pub fn state(&self) -> Option<&str> {
        self.inner.properties.state.as_deref()
    }

    pub fn creation_date(&self) -> Option<&str> {
        self.inner.properties.creation_date.as_deref()
    }

    pub fn max_size_bytes(&self) -> Option<u64> {
        self.inner.properties.max_size_bytes
    }

    pub fn database_dtu_min(&self) -> Option<f64> {
        self.inner.properties.per_database_settings.as_ref().and_then(|p| p.min_capacity)
    }

    pub fn database_dtu_max(&self) -> Option<f64> {
        self.inner.properties.per_database_settings.as_ref().and_then(|p| p.max_capacity)
    }

    pub async fn list_databases(&self) -> AzureResult<Vec<SqlDatabase>> {
        SqlDatabases::new(self.client.clone())
            .list_by_elastic_pool(&self.resource_group_name(), &self.server, self.name())
            .await
    }

    pub async fn delete(&self) -> AzureResult<()> {
        delete_elastic_pool(&self.client, &self.resource_group_name(), &self.server, self.name()).await
    }

    pub fn update(&self) -> SqlElasticPoolUpdate {
        SqlElasticPoolUpdate {
            inner: self.inner.clone(),
            server: self.server.clone(),
            client: self.client.clone(),
        }
    }
}

#[async_trait]
impl Refreshable for SqlElasticPool {
    async fn refresh(&mut self) -> AzureResult<()> {
        let rg = self.resource_group_name();
        let name = self.name().to_string();
        self.inner = get_elastic_pool(&self.client, &rg, &self.server, &name).await?;
        Ok(())
    }
}

// ─── Definition ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SqlElasticPoolDefinition {
    name: String,
    resource_group: Option<String>,
    server: Option<String>,
    edition: Option<DatabaseEdition>,
    inner: ElasticPoolInner,
    client: Arc<AzureClient>,
}

impl SqlElasticPoolDefinition {
    pub(crate) fn new(name: impl Into<String>, client: Arc<AzureClient>) -> Self {
        Self {
            name: name.into(),
            resource_group: None,
            server: None,
            edition: None,
            inner: ElasticPoolInner::default(),
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_existing_sql_server(
        mut self,
        resource_group: impl Into<String>,
        server: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        self.resource_group = Some(resource_group.into());
        self.server = Some(server.into());
        self.inner.location = Some(region.into());
        self
    }

    pub fn with_existing_sql_server_of(self, server: &SqlServer) -> Self {
        let rg = server.resource_group_name();
        let region = server.region_name().to_string();
        self.with_existing_sql_server(rg, server.name(), region)
    }

    pub fn with_edition(mut self, edition: DatabaseEdition) -> Self {
        self.edition = Some(edition);
        self
    }

    pub fn with_basic_pool(self) -> Self {
        self.with_edition(DatabaseEdition::Basic)
    }

    pub fn with_standard_pool(self) -> Self {
        self.with_edition(DatabaseEdition::Standard)
    }

    pub fn with_premium_pool(self) -> Self {
        self.with_edition(DatabaseEdition::Premium)
    }

    /// eDTUs shared by the pool.
    pub fn with_reserved_dtu(mut self, dtu: u32) -> Self {
        self.inner.sku.get_or_insert_with(Sku::default).capacity = Some(dtu);
        self
    }

    pub fn with_database_dtu_min(mut self, dtu: f64) -> Self {
        self.inner
            .properties
            .per_database_settings
            .get_or_insert_with(PerDatabaseSettings::default)
            .min_capacity = Some(dtu);
        self
    }

    pub fn with_database_dtu_max(mut self, dtu: f64) -> Self {
        self.inner
            .properties
            .per_database_settings
            .get_or_insert_with(PerDatabaseSettings::default)
            .max_capacity = Some(dtu);
        self
    }

    pub fn with_storage_capacity(mut self, max_size_bytes: u64) -> Self {
        self.inner.properties.max_size_bytes = Some(max_size_bytes);
        self
    }

    pub fn with_zone_redundancy(mut self) -> Self {
        self.inner.properties.zone_redundant = Some(true);
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.tags.insert(key.into(), value.into());
        self
    }

    pub(crate) fn with_parent(mut self, resource_group: &str, server: &str, region: &str) -> Self {
        self.resource_group = Some(resource_group.to_string());
        self.server = Some(server.to_string());
        self.inner.location = Some(region.to_string());
        self
    }

    pub(crate) fn to_inner(&self) -> AzureResult<ElasticPoolInner> {
        let edition = self.edition.ok_or_else(|| AzureError::required("sku.tier"))?;
        if self.inner.location.as_deref().map_or(true, |l| l.trim().is_empty()) {
            return Err(AzureError::required("location"));
        }
        validate_per_database(self.inner.properties.per_database_settings.as_ref())?;
        let mut body = self.inner.clone();
        let capacity = body.sku.as_ref().and_then(|s| s.capacity);
        body.sku = Some(Sku {
            capacity,
            ..Sku::new(edition.pool_sku_name(), edition.as_str())
        });
        Ok(body)
    }
}

#[async_trait]
impl Creatable for SqlElasticPoolDefinition {
    type Output = SqlElasticPool;

    async fn create(self) -> AzureResult<SqlElasticPool> {
        require("elasticPoolName", &self.name)?;
        let rg = self.resource_group.clone().ok_or_else(|| AzureError::required("resourceGroupName"))?;
        let server = self.server.clone().ok_or_else(|| AzureError::required("serverName"))?;
        let body = self.to_inner()?;
        let inner = create_or_update_elastic_pool(&self.client, &rg, &server, &self.name, &body).await?;
        info!("Created SQL elastic pool {}/{}/{}", rg, server, self.name);
        Ok(SqlElasticPool::new(inner, server, self.client))
    }
}

// ─── Update ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SqlElasticPoolUpdate {
    inner: ElasticPoolInner,
    server: String,
    client: Arc<AzureClient>,
}

impl SqlElasticPoolUpdate {
    pub fn with_reserved_dtu(mut self, dtu: u32) -> Self {
        self.inner.sku.get_or_insert_with(Sku::default).capacity = Some(dtu);
        self
    }

    pub fn with_database_dtu_min(mut self, dtu: f64) -> Self {
        self.inner
            .properties
            .per_database_settings
            .get_or_insert_with(PerDatabaseSettings::default)
            .min_capacity = Some(dtu);
        self
    }

    pub fn with_database_dtu_max(mut self, dtu: f64) -> Self {
        self.inner
            .properties
            .per_database_settings
            .get_or_insert_with(PerDatabaseSettings::default)
            .max_capacity = Some(dtu);
        self
    }

    pub fn with_storage_capacity(mut self, max_size_bytes: u64) -> Self {
        self.inner.properties.max_size_bytes = Some(max_size_bytes);
        self
    }
}

impl TaggableUpdate for SqlElasticPoolUpdate {
    fn tags_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.inner.tags
    }
}

#[async_trait]
impl Appliable for SqlElasticPoolUpdate {
    type Output = SqlElasticPool;

    async fn apply(self) -> AzureResult<SqlElasticPool> {
        validate_per_database(self.inner.properties.per_database_settings.as_ref())?;
        let rg = azfluent_core::resource_id::resource_group_from_id(self.inner.id.as_deref().unwrap_or_default())
            .ok_or_else(AzureError::resource_group_required)?;
        let name = self.inner.name.clone().unwrap_or_default();
        let inner = create_or_update_elastic_pool(&self.client, &rg, &self.server, &name, &self.inner).await?;
        info!("Updated SQL elastic pool {}/{}/{}", rg, self.server, name);
        Ok(SqlElasticPool::new(inner, self.server, self.client))
    }
}

// ─── Collection ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SqlElasticPools {
    client: Arc<AzureClient>,
}

impl SqlElasticPools {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    pub fn define(&self, name: impl Into<String>) -> SqlElasticPoolDefinition {
        SqlElasticPoolDefinition::new(name, self.client.clone())
    }

    pub async fn list_by_sql_server(&self, resource_group: &str, server: &str) -> AzureResult<Vec<SqlElasticPool>> {
        Ok(list_elastic_pools(&self.client, resource_group, server)
            .await?
            .into_iter()
            .map(|inner| SqlElasticPool::new(inner, server.to_string(), self.client.clone()))
            .collect())
    }

    pub async fn get_by_sql_server(&self, resource_group: &str, server: &str, name: &str) -> AzureResult<SqlElasticPool> {
        let inner = get_elastic_pool(&self.client, resource_group, server, name).await?;
        Ok(SqlElasticPool::new(inner, server.to_string(), self.client.clone()))
    }

    pub async fn delete_by_sql_server(&self, resource_group: &str, server: &str, name: &str) -> AzureResult<()> {
        delete_elastic_pool(&self.client, resource_group, server, name).await?;
        info!("Deleted SQL elastic pool {}/{}/{}", resource_group, server, name);
        Ok(())
    }

    pub async fn list_databases(&self, resource_group: &str, server: &str, name: &str) -> AzureResult<Vec<SqlDatabase>> {
        SqlDatabases::new(self.client.clone())
            .list_by_elastic_pool(resource_group, server, name)
            .await
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use azfluent_core::test_utils::mock_client;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const POOL_PATH: &str = "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Sql/servers/srv1/elasticPools/pool1";

    fn pool_json(dtu: u32) -> serde_json::Value {
        json!({
            "id": POOL_PATH, "name": "pool1", "location": "eastus",
            "sku": {"name": "StandardPool", "tier": "Standard", "capacity": dtu},
            "properties": {"state": "Ready", "perDatabaseSettings": {"minCapacity": 0.0, "maxCapacity": 50.0}}
        })
    }

    #[tokio::test]
    async fn create_standard_pool() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(POOL_PATH))
            .and(body_json(json!({
                "location": "eastus",
                "sku": {"name": "StandardPool", "tier": "Standard", "capacity": 100},
                "properties": {"perDatabaseSettings": {"minCapacity": 0.0, "maxCapacity": 50.0}}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(pool_json(100)))
            .expect(1)
            .mount(&server)
            .await;

        let pool = SqlElasticPools::new(mock_client(&server))
            .define("pool1")
            .with_existing_sql_server("rg1", "srv1", "eastus")
            .with_reserved_dtu(100)
            .with_standard_pool()
            .with_database_dtu_min(0.0)
            .with_database_dtu_max(50.0)
            .create()
            .await
            .unwrap();
        assert_eq!(pool.capacity(), Some(100));
        assert_eq!(pool.edition(), Some("Standard"));
        assert_eq!(pool.database_dtu_max(), Some(50.0));
    }

    #[tokio::test]
    async fn definition_checks() {
        let server = MockServer::start().await;
        let pools = SqlElasticPools::new(mock_client(&server));
        let no_edition = pools.define("pool1").with_existing_sql_server("rg1", "srv1", "eastus");
        assert!(no_edition.to_inner().is_err());
        let inverted = pools
            .define("pool1")
            .with_existing_sql_server("rg1", "srv1", "eastus")
            .with_basic_pool()
            .with_database_dtu_min(10.0)
            .with_database_dtu_max(5.0);
        assert!(inverted.create().await.is_err());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_and_list_databases() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(POOL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(pool_json(100)))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(POOL_PATH))
            .and(body_partial_json(json!({"sku": {"capacity": 200}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(pool_json(200)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{POOL_PATH}/databases")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"id": "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Sql/servers/srv1/databases/db1",
                           "name": "db1", "properties": {"elasticPoolId": POOL_PATH}}]
            })))
            .mount(&server)
            .await;

        let pool = SqlElasticPools::new(mock_client(&server))
            .get_by_sql_server("rg1", "srv1", "pool1")
            .await
            .unwrap();
        let pool = pool.update().with_reserved_dtu(200).apply().await.unwrap();
        assert_eq!(pool.capacity(), Some(200));

        let dbs = pool.list_databases().await.unwrap();
        assert_eq!(dbs.len(), 1);
        assert_eq!(dbs[0].elastic_pool_name().as_deref(), Some("pool1"));
    }
}
