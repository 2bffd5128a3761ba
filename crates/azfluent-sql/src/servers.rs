//! Azure SQL logical servers and the children created alongside them.

use std::collections::HashMap;
use std::sync::Arc;

use azfluent_core::fluent::{
    Appliable, Creatable, GroupableDefinition, GroupableResource, GroupableSpec, Refreshable, Resource,
    SupportsDeletingByResourceGroup, SupportsGettingByResourceGroup, SupportsListing,
    SupportsListingByResourceGroup, TaggableUpdate,
};
use azfluent_core::types::{require, AzureError, AzureResult, ManagedIdentity, NameAvailability};
use azfluent_core::{async_trait, impl_groupable_resource, AzureClient};
use log::{debug, info};
use serde_json::json;

use crate::databases::{SqlDatabase, SqlDatabaseDefinition, SqlDatabases};
use crate::elastic_pools::{SqlElasticPool, SqlElasticPoolDefinition, SqlElasticPools};
use crate::firewall_rules::{
    create_or_update_firewall_rule, default_rule_name, delete_firewall_rule, get_firewall_rule,
    validate_ip_range, SqlFirewallRule, SqlFirewallRules, ALLOW_ALL_AZURE_IPS, ANY_AZURE_IP,
};
use crate::types::{DatabaseEdition, SqlServerInner, SqlServerProperties, SqlServerUpdateParameters};

const DEFAULT_SERVER_VERSION: &str = "12.0";
const MAX_SERVER_NAME_LEN: usize = 63;

/// Lowercase letters, digits and hyphens; no leading or trailing hyphen.
pub fn validate_server_name(name: &str) -> AzureResult<()> {
    let valid = !name.is_empty()
        && name.len() <= MAX_SERVER_NAME_LEN
        && !name.starts_with('-')
        && !name.ends_with('-')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid {
        return Err(AzureError::validation(format!(
            "SQL server name '{name}' must be 1-{MAX_SERVER_NAME_LEN} lowercase letters, digits or hyphens and cannot start or end with a hyphen"
        )));
    }
    Ok(())
}

// ─── REST operations ────────────────────────────────────────────────

/// URL of `suffix` under a server, with the SQL api-version appended.
pub(crate) fn server_url(client: &AzureClient, resource_group: &str, server: &str, suffix: &str) -> AzureResult<String> {
    require("resourceGroupName", resource_group)?;
    require("serverName", server)?;
    client.resource_group_url(
        resource_group,
        &format!(
            "/providers/Microsoft.Sql/servers/{}{}?api-version={}",
            server,
            suffix,
            client.config().api_version_sql
        ),
    )
}

pub(crate) fn server_id(client: &AzureClient, resource_group: &str, server: &str) -> AzureResult<String> {
    Ok(format!(
        "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Sql/servers/{}",
        client.subscription_id()?,
        resource_group,
        server
    ))
}

pub async fn list_sql_servers(client: &AzureClient) -> AzureResult<Vec<SqlServerInner>> {
    let url = client.subscription_url(&format!(
        "/providers/Microsoft.Sql/servers?api-version={}",
        client.config().api_version_sql
    ))?;
    debug!("list_sql_servers → {}", url);
    client.get_all_pages(&url).await
}

pub async fn list_sql_servers_by_resource_group(client: &AzureClient, resource_group: &str) -> AzureResult<Vec<SqlServerInner>> {
    require("resourceGroupName", resource_group)?;
    let url = client.resource_group_url(
        resource_group,
        &format!("/providers/Microsoft.Sql/servers?api-version={}", client.config().api_version_sql),
    )?;
    debug!("list_sql_servers_by_resource_group({}) → {}", resource_group, url);
    client.get_all_pages(&url).await
}

pub async fn get_sql_server(client: &AzureClient, resource_group: &str, server: &str) -> AzureResult<SqlServerInner> {
    let url = server_url(client, resource_group, server, "")?;
    debug!("get_sql_server({}/{}) → {}", resource_group, server, url);
    client.get_json(&url).await
}

pub async fn create_or_update_sql_server(
    client: &AzureClient,
    resource_group: &str,
    server: &str,
    body: &SqlServerInner,
) -> AzureResult<SqlServerInner> {
    let url = server_url(client, resource_group, server, "")?;
    debug!("create_or_update_sql_server({}/{}) → {}", resource_group, server, url);
    client.put_json(&url, body).await
}

pub async fn update_sql_server(
    client: &AzureClient,
    resource_group: &str,
    server: &str,
    body: &SqlServerUpdateParameters,
) -> AzureResult<SqlServerInner> {
    let url = server_url(client, resource_group, server, "")?;
    debug!("update_sql_server({}/{}) → {}", resource_group, server, url);
    client.patch_json(&url, body).await
}

pub async fn delete_sql_server(client: &AzureClient, resource_group: &str, server: &str) -> AzureResult<()> {
    let url = server_url(client, resource_group, server, "")?;
    debug!("delete_sql_server({}/{}) → {}", resource_group, server, url);
    client.delete(&url).await
}

pub async fn check_name_availability(client: &AzureClient, name: &str) -> AzureResult<NameAvailability> {
    require("name", name)?;
    let url = client.subscription_url(&format!(
        "/providers/Microsoft.Sql/checkNameAvailability?api-version={}",
        client.config().api_version_sql
    ))?;
    debug!("check_name_availability({}) → {}", name, url);
    let body = json!({ "name": name, "type": "Microsoft.Sql/servers" });
    client.post_json(&url, &body).await
}

// ─── Fluent wrapper ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SqlServer {
    inner: SqlServerInner,
    client: Arc<AzureClient>,
}

impl_groupable_resource!(SqlServer, SqlServerInner);

impl SqlServer {
    pub(crate) fn new(inner: SqlServerInner, client: Arc<AzureClient>) -> Self {
        Self { inner, client }
    }

    pub fn fully_qualified_domain_name(&self) -> Option<&str> {
        self.inner.properties.fully_qualified_domain_name.as_deref()
    }

    pub fn administrator_login(&self) -> Option<&str> {
        self.inner.properties.administrator_login.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.inner.properties.version.as_deref()
    }

    pub fn state(&self) -> Option<&str> {
        self.inner.properties.state.as_deref()
    }

    pub fn kind(&self) -> Option<&str> {
        self.inner.kind.as_deref()
    }

    pub fn system_assigned_principal_id(&self) -> Option<&str> {
        self.inner.identity.as_ref().and_then(|i| i.principal_id.as_deref())
    }

    pub async fn firewall_rules(&self) -> AzureResult<Vec<SqlFirewallRule>> {
        SqlFirewallRules::new(self.client.clone())
            .list_by_sql_server(&self.resource_group_name(), self.name())
            .await
    }

    pub async fn databases(&self) -> AzureResult<Vec<SqlDatabase>> {
        SqlDatabases::new(self.client.clone())
            .list_by_sql_server(&self.resource_group_name(), self.name())
            .await
    }

    pub async fn elastic_pools(&self) -> AzureResult<Vec<SqlElasticPool>> {
        SqlElasticPools::new(self.client.clone())
            .list_by_sql_server(&self.resource_group_name(), self.name())
            .await
    }

    /// Adds the `AllowAllWindowsAzureIps` rule unless it already exists.
    pub async fn enable_access_from_azure_services(&self) -> AzureResult<SqlFirewallRule> {
        let rg = self.resource_group_name();
        let inner = match get_firewall_rule(&self.client, &rg, self.name(), ALLOW_ALL_AZURE_IPS).await {
            Ok(rule) => rule,
            Err(e) if e.is_not_found() => {
                create_or_update_firewall_rule(&self.client, &rg, self.name(), ALLOW_ALL_AZURE_IPS, ANY_AZURE_IP, ANY_AZURE_IP)
                    .await?
            }
            Err(e) => return Err(e),
        };
        Ok(SqlFirewallRule::new(inner, rg, self.name().to_string(), self.client.clone()))
    }

    pub async fn remove_access_from_azure_services(&self) -> AzureResult<()> {
        delete_firewall_rule(&self.client, &self.resource_group_name(), self.name(), ALLOW_ALL_AZURE_IPS).await
    }

    pub fn update(&self) -> SqlServerUpdate {
        SqlServerUpdate {
            resource_group: self.resource_group_name(),
            name: self.name().to_string(),
            tags: self.inner.tags.clone(),
            password: None,
            identity: None,
            new_rules: Vec::new(),
            removed_rules: Vec::new(),
            client: self.client.clone(),
        }
    }
}

#[async_trait]
impl Refreshable for SqlServer {
    async fn refresh(&mut self) -> AzureResult<()> {
        let rg = self.resource_group_name();
        let name = self.name().to_string();
        self.inner = get_sql_server(&self.client, &rg, &name).await?;
        Ok(())
    }
}

/// Firewall rule queued on a definition or update.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingRule {
    name: String,
    start: String,
    end: String,
}

impl PendingRule {
    fn new(name: Option<String>, start: String, end: String) -> Self {
        Self {
            name: name.unwrap_or_else(|| default_rule_name(&start, &end)),
            start,
            end,
        }
    }
}

fn push_rule(rules: &mut Vec<PendingRule>, rule: PendingRule) {
    rules.retain(|r| r.name != rule.name);
    rules.push(rule);
}

async fn create_rules(client: &AzureClient, resource_group: &str, server: &str, rules: &[PendingRule]) -> AzureResult<()> {
    for rule in rules {
        create_or_update_firewall_rule(client, resource_group, server, &rule.name, &rule.start, &rule.end).await?;
        info!("Created SQL firewall rule {}/{}/{}", resource_group, server, rule.name);
    }
    Ok(())
}

// ─── Definition ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SqlServerDefinition {
    spec: GroupableSpec,
    admin_login: Option<String>,
    admin_password: Option<String>,
    version: String,
    system_identity: bool,
    allow_azure_services: bool,
    firewall_rules: Vec<PendingRule>,
    elastic_pools: Vec<SqlElasticPoolDefinition>,
    databases: Vec<SqlDatabaseDefinition>,
    client: Arc<AzureClient>,
}

impl GroupableDefinition for SqlServerDefinition {
    fn spec_mut(&mut self) -> &mut GroupableSpec {
        &mut self.spec
    }
}

impl SqlServerDefinition {
    pub fn with_administrator_login(mut self, login: impl Into<String>) -> Self {
        self.admin_login = Some(login.into());
        self
    }

    pub fn with_administrator_password(mut self, password: impl Into<String>) -> Self {
        self.admin_password = Some(password.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_system_assigned_managed_service_identity(mut self) -> Self {
        self.system_identity = true;
        self
    }

    /// Skips the default `AllowAllWindowsAzureIps` rule.
    pub fn without_access_from_azure_services(mut self) -> Self {
        self.allow_azure_services = false;
        self
    }

    pub fn with_new_firewall_rule(mut self, ip: impl Into<String>) -> Self {
        let ip = ip.into();
        push_rule(&mut self.firewall_rules, PendingRule::new(None, ip.clone(), ip));
        self
    }

    pub fn with_new_firewall_rule_range(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        push_rule(&mut self.firewall_rules, PendingRule::new(None, start.into(), end.into()));
        self
    }

    pub fn with_new_named_firewall_rule(
        mut self,
        name: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        push_rule(
            &mut self.firewall_rules,
            PendingRule::new(Some(name.into()), start.into(), end.into()),
        );
        self
    }

    /// New database with default settings.
    pub fn with_new_database(self, name: impl Into<String>) -> Self {
        let def = SqlDatabases::new(self.client.clone()).define(name);
        self.with_new_database_definition(def)
    }

    /// Database definition created after the server and its elastic pools.
    pub fn with_new_database_definition(mut self, definition: SqlDatabaseDefinition) -> Self {
        self.databases.retain(|d| d.name() != definition.name());
        self.databases.push(definition);
        self
    }

    pub fn with_new_elastic_pool(self, name: impl Into<String>, edition: DatabaseEdition) -> Self {
        let def = SqlElasticPools::new(self.client.clone()).define(name).with_edition(edition);
        self.with_new_elastic_pool_definition(def)
    }

    pub fn with_new_elastic_pool_definition(mut self, definition: SqlElasticPoolDefinition) -> Self {
        self.elastic_pools.retain(|p| p.name() != definition.name());
        self.elastic_pools.push(definition);
        self
    }

    /// Rules that `create` will add, the Azure services rule included.
    pub fn firewall_rule_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.firewall_rules.iter().map(|r| r.name.as_str()).collect();
        if self.allow_azure_services && !names.contains(&ALLOW_ALL_AZURE_IPS) {
            names.insert(0, ALLOW_ALL_AZURE_IPS);
        }
        names
    }

    fn validate(&self) -> AzureResult<()> {
        self.spec.validate()?;
        validate_server_name(&self.spec.name)?;
        require("administratorLogin", self.admin_login.as_deref().unwrap_or_default())?;
        require("administratorLoginPassword", self.admin_password.as_deref().unwrap_or_default())?;
        for rule in &self.firewall_rules {
            require("firewallRuleName", &rule.name)?;
            validate_ip_range(&rule.start, &rule.end)?;
        }
        Ok(())
    }

    fn to_inner(&self) -> AzureResult<SqlServerInner> {
        Ok(SqlServerInner {
            location: Some(self.spec.region_name()?),
            tags: self.spec.tags.clone(),
            identity: self.system_identity.then(ManagedIdentity::system_assigned),
            properties: SqlServerProperties {
                administrator_login: self.admin_login.clone(),
                administrator_login_password: self.admin_password.clone(),
                version: Some(self.version.clone()),
                ..Default::default()
            },
            ..Default::default()
        })
    }
}

#[async_trait]
impl Creatable for SqlServerDefinition {
    type Output = SqlServer;

    /// Creates the server, then its firewall rules, elastic pools and
    /// databases in that order.
    async fn create(self) -> AzureResult<SqlServer> {
        self.validate()?;
        let body = self.to_inner()?;
        self.spec.ensure_resource_group(&self.client).await?;

        let rg = self.spec.resource_group()?.to_string();
        let name = self.spec.name.clone();
        let region = self.spec.region_name()?;
        let inner = create_or_update_sql_server(&self.client, &rg, &name, &body).await?;
        info!("Created SQL server {}/{}", rg, name);

        let mut rules = Vec::new();
        if self.allow_azure_services {
            rules.push(PendingRule::new(
                Some(ALLOW_ALL_AZURE_IPS.to_string()),
                ANY_AZURE_IP.to_string(),
                ANY_AZURE_IP.to_string(),
            ));
        }
        for rule in self.firewall_rules {
            push_rule(&mut rules, rule);
        }
        create_rules(&self.client, &rg, &name, &rules).await?;

        for pool in self.elastic_pools {
            pool.with_parent(&rg, &name, &region).create().await?;
        }
        for database in self.databases {
            database.with_parent(&rg, &name, &region).create().await?;
        }
        Ok(SqlServer::new(inner, self.client))
    }
}

// ─── Update ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SqlServerUpdate {
    resource_group: String,
    name: String,
    tags: HashMap<String, String>,
    password: Option<String>,
    identity: Option<ManagedIdentity>,
    new_rules: Vec<PendingRule>,
    removed_rules: Vec<String>,
    client: Arc<AzureClient>,
}

impl SqlServerUpdate {
    pub fn with_administrator_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_system_assigned_managed_service_identity(mut self) -> Self {
        self.identity = Some(ManagedIdentity::system_assigned());
        self
    }

    pub fn with_new_firewall_rule(mut self, ip: impl Into<String>) -> Self {
        let ip = ip.into();
        push_rule(&mut self.new_rules, PendingRule::new(None, ip.clone(), ip));
        self
    }

    pub fn with_new_firewall_rule_range(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        push_rule(&mut self.new_rules, PendingRule::new(None, start.into(), end.into()));
        self
    }

    pub fn with_new_named_firewall_rule(
        mut self,
        name: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        push_rule(&mut self.new_rules, PendingRule::new(Some(name.into()), start.into(), end.into()));
        self
    }

    pub fn without_firewall_rule(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.new_rules.retain(|r| r.name != name);
        self.removed_rules.push(name);
        self
    }
}

impl TaggableUpdate for SqlServerUpdate {
    fn tags_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.tags
    }
}

#[async_trait]
impl Appliable for SqlServerUpdate {
    type Output = SqlServer;

    async fn apply(self) -> AzureResult<SqlServer> {
        for rule in &self.new_rules {
            validate_ip_range(&rule.start, &rule.end)?;
        }
        if let Some(p) = &self.password {
            require("administratorLoginPassword", p)?;
        }
        let body = SqlServerUpdateParameters {
            tags: self.tags,
            identity: self.identity,
            properties: SqlServerProperties {
                administrator_login_password: self.password,
                ..Default::default()
            },
        };
        let inner = update_sql_server(&self.client, &self.resource_group, &self.name, &body).await?;
        create_rules(&self.client, &self.resource_group, &self.name, &self.new_rules).await?;
        for rule in &self.removed_rules {
            delete_firewall_rule(&self.client, &self.resource_group, &self.name, rule).await?;
            info!("Deleted SQL firewall rule {}/{}/{}", self.resource_group, self.name, rule);
        }
        info!("Updated SQL server {}/{}", self.resource_group, self.name);
        Ok(SqlServer::new(inner, self.client))
    }
}

// ─── Collection ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SqlServers {
    client: Arc<AzureClient>,
}

impl SqlServers {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    fn wrap(&self, inner: SqlServerInner) -> SqlServer {
        SqlServer::new(inner, self.client.clone())
    }

    pub fn define(&self, name: impl Into<String>) -> SqlServerDefinition {
        SqlServerDefinition {
            spec: GroupableSpec::new(name),
            admin_login: None,
            admin_password: None,
            version: DEFAULT_SERVER_VERSION.to_string(),
            system_identity: false,
            allow_azure_services: true,
            firewall_rules: Vec::new(),
            elastic_pools: Vec::new(),
            databases: Vec::new(),
            client: self.client.clone(),
        }
    }

    pub async fn check_name_availability(&self, name: &str) -> AzureResult<NameAvailability> {
        check_name_availability(&self.client, name).await
    }

    pub fn firewall_rules(&self) -> SqlFirewallRules {
        SqlFirewallRules::new(self.client.clone())
    }

    pub fn databases(&self) -> SqlDatabases {
        SqlDatabases::new(self.client.clone())
    }

    pub fn elastic_pools(&self) -> SqlElasticPools {
        SqlElasticPools::new(self.client.clone())
    }
}

#[async_trait]
impl SupportsListing for SqlServers {
    type Item = SqlServer;

    async fn list(&self) -> AzureResult<Vec<SqlServer>> {
        Ok(list_sql_servers(&self.client)
            .await?
            .into_iter()
            .map(|inner| self.wrap(inner))
            .collect())
    }
}

#[async_trait]
impl SupportsListingByResourceGroup for SqlServers {
    type Item = SqlServer;

    async fn list_by_resource_group(&self, resource_group: &str) -> AzureResult<Vec<SqlServer>> {
        Ok(list_sql_servers_by_resource_group(&self.client, resource_group)
            .await?
            .into_iter()
            .map(|inner| self.wrap(inner))
            .collect())
    }
}

#[async_trait]
impl SupportsGettingByResourceGroup for SqlServers {
    type Item = SqlServer;

    async fn get_by_resource_group(&self, resource_group: &str, name: &str) -> AzureResult<SqlServer> {
        Ok(self.wrap(get_sql_server(&self.client, resource_group, name).await?))
    }
}

#[async_trait]
impl SupportsDeletingByResourceGroup for SqlServers {
    async fn delete_by_resource_group(&self, resource_group: &str, name: &str) -> AzureResult<()> {
        delete_sql_server(&self.client, resource_group, name).await?;
        info!("Deleted SQL server {}/{}", resource_group, name);
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use azfluent_core::test_utils::mock_client;
    use azfluent_core::types::AzureErrorKind;
    use azfluent_core::Region;
    use wiremock::matchers::{body_json, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SERVER_PATH: &str = "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Sql/servers/srv1";

    fn server_json() -> serde_json::Value {
        json!({
            "id": SERVER_PATH, "name": "srv1", "location": "eastus", "kind": "v12.0",
            "properties": {"administratorLogin": "sqladmin", "version": "12.0", "state": "Ready",
                           "fullyQualifiedDomainName": "srv1.database.windows.net"}
        })
    }

    fn base_definition(server: &MockServer) -> SqlServerDefinition {
        SqlServers::new(mock_client(server))
            .define("srv1")
            .with_region(Region::US_EAST)
            .with_existing_resource_group("rg1")
            .with_administrator_login("sqladmin")
            .with_administrator_password("P@ssw0rd!")
    }

    #[test]
    fn server_names() {
        assert!(validate_server_name("my-sql-01").is_ok());
        assert!(validate_server_name("MySql").is_err());
        assert!(validate_server_name("-sql").is_err());
        assert!(validate_server_name(&"a".repeat(64)).is_err());
    }

    #[tokio::test]
    async fn requires_admin_credentials() {
        let server = MockServer::start().await;
        let err = SqlServers::new(mock_client(&server))
            .define("srv1")
            .with_region(Region::US_EAST)
            .with_existing_resource_group("rg1")
            .with_administrator_login("sqladmin")
            .create()
            .await
            .unwrap_err();
        assert_eq!(err.kind, AzureErrorKind::Validation);
        assert!(err.message.contains("administratorLoginPassword"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn default_rule_is_observable() {
        let server = MockServer::start().await;
        let def = base_definition(&server).with_new_firewall_rule("203.0.113.7");
        assert_eq!(def.firewall_rule_names(), vec![ALLOW_ALL_AZURE_IPS, "firewall_203_0_113_7"]);
        let def = def.without_access_from_azure_services();
        assert_eq!(def.firewall_rule_names(), vec!["firewall_203_0_113_7"]);
    }

    #[tokio::test]
    async fn create_runs_children_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(SERVER_PATH))
            .and(body_json(json!({
                "location": "eastus",
                "properties": {"administratorLogin": "sqladmin", "administratorLoginPassword": "P@ssw0rd!", "version": "12.0"}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(server_json()))
            .expect(1)
            .mount(&server)
            .await;
        for (rule, ip) in [(ALLOW_ALL_AZURE_IPS, "0.0.0.0"), ("office", "203.0.113.7")] {
            Mock::given(method("PUT"))
                .and(path(format!("{SERVER_PATH}/firewallRules/{rule}")))
                .and(body_json(json!({"properties": {"startIpAddress": ip, "endIpAddress": ip}})))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": rule})))
                .expect(1)
                .mount(&server)
                .await;
        }
        Mock::given(method("PUT"))
            .and(path(format!("{SERVER_PATH}/elasticPools/pool1")))
            .and(body_partial_json(json!({"location": "eastus", "sku": {"name": "StandardPool"}})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"name": "pool1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(format!("{SERVER_PATH}/databases/db1")))
            .and(body_partial_json(json!({
                "location": "eastus",
                "properties": {"elasticPoolId": format!("{SERVER_PATH}/elasticPools/pool1")}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"name": "db1"})))
            .expect(1)
            .mount(&server)
            .await;

        let db = SqlDatabases::new(mock_client(&server))
            .define("db1")
            .with_existing_elastic_pool("pool1");
        let created = base_definition(&server)
            .with_new_named_firewall_rule("office", "203.0.113.7", "203.0.113.7")
            .with_new_elastic_pool("pool1", DatabaseEdition::Standard)
            .with_new_database_definition(db)
            .create()
            .await
            .unwrap();
        assert_eq!(created.fully_qualified_domain_name(), Some("srv1.database.windows.net"));

        let methods: Vec<String> = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .map(|r| r.url.path().rsplit('/').next().unwrap_or_default().to_string())
            .collect();
        assert_eq!(methods, vec!["srv1", ALLOW_ALL_AZURE_IPS, "office", "pool1", "db1"]);
    }

    #[tokio::test]
    async fn update_patches_and_edits_rules() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SERVER_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(server_json()))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path(SERVER_PATH))
            .and(body_json(json!({
                "tags": {"env": "prod"},
                "properties": {"administratorLoginPassword": "N3w-P@ss"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(server_json()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(format!("{SERVER_PATH}/firewallRules/vpn")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "vpn"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("{SERVER_PATH}/firewallRules/{ALLOW_ALL_AZURE_IPS}")))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let servers = SqlServers::new(mock_client(&server));
        let srv = servers.get_by_resource_group("rg1", "srv1").await.unwrap();
        srv.update()
            .with_administrator_password("N3w-P@ss")
            .with_tag("env", "prod")
            .with_new_named_firewall_rule("vpn", "10.1.0.0", "10.1.0.255")
            .without_firewall_rule(ALLOW_ALL_AZURE_IPS)
            .apply()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn name_availability() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/subscriptions/sub1/providers/Microsoft.Sql/checkNameAvailability"))
            .and(body_json(json!({"name": "srv1", "type": "Microsoft.Sql/servers"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "srv1", "available": false, "reason": "AlreadyExists"
            })))
            .mount(&server)
            .await;

        let result = SqlServers::new(mock_client(&server)).check_name_availability("srv1").await.unwrap();
        assert!(!result.name_available);
        assert_eq!(result.reason.as_deref(), Some("AlreadyExists"));
    }

    #[tokio::test]
    async fn enable_azure_access_creates_missing_rule() {
        let server = MockServer::start().await;
        let rule_path = format!("{SERVER_PATH}/firewallRules/{ALLOW_ALL_AZURE_IPS}");
        Mock::given(method("GET"))
            .and(path(SERVER_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(server_json()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(rule_path.as_str()))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": "ResourceNotFound", "message": "not found"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(rule_path.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": ALLOW_ALL_AZURE_IPS, "properties": {"startIpAddress": "0.0.0.0", "endIpAddress": "0.0.0.0"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let srv = SqlServers::new(mock_client(&server)).get_by_resource_group("rg1", "srv1").await.unwrap();
        let rule = srv.enable_access_from_azure_services().await.unwrap();
        assert_eq!(rule.start_ip_address(), "0.0.0.0");
    }
}
