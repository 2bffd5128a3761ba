//! Server-level firewall rules.

use std::net::Ipv4Addr;
use std::sync::Arc;

use azfluent_core::fluent::{Appliable, Creatable, Refreshable};
use azfluent_core::types::{require, AzureError, AzureResult};
use azfluent_core::{async_trait, AzureClient};
use log::{debug, info};

use crate::servers::server_url;
use crate::types::{FirewallRuleInner, FirewallRuleProperties};

/// Rule that opens the server to other Azure services.
pub const ALLOW_ALL_AZURE_IPS: &str = "AllowAllWindowsAzureIps";
pub(crate) const ANY_AZURE_IP: &str = "0.0.0.0";

/// Both ends must be IPv4 addresses with `start <= end`.
pub fn validate_ip_range(start: &str, end: &str) -> AzureResult<()> {
    let parse = |ip: &str| {
        ip.trim()
            .parse::<Ipv4Addr>()
            .map_err(|_| AzureError::validation(format!("'{ip}' is not a valid IPv4 address")))
    };
    if parse(start)? > parse(end)? {
        return Err(AzureError::validation(format!(
            "Start IP address {start} is greater than end IP address {end}"
        )));
    }
    Ok(())
}

/// Name given to a rule added without one.
pub(crate) fn default_rule_name(start: &str, end: &str) -> String {
    if start == end {
        format!("firewall_{}", start.replace('.', "_"))
    } else {
        format!("firewall_{}-{}", start.replace('.', "_"), end.replace('.', "_"))
    }
}

// ─── REST operations ────────────────────────────────────────────────

fn rule_url(client: &AzureClient, resource_group: &str, server: &str, rule: Option<&str>) -> AzureResult<String> {
    let child = match rule {
        Some(name) => {
            require("firewallRuleName", name)?;
            format!("/firewallRules/{name}")
        }
        None => "/firewallRules".to_string(),
    };
    server_url(client, resource_group, server, &child)
}

pub async fn list_firewall_rules(client: &AzureClient, resource_group: &str, server: &str) -> AzureResult<Vec<FirewallRuleInner>> {
    let url = rule_url(client, resource_group, server, None)?;
    debug!("list_firewall_rules({}/{}) → {}", resource_group, server, url);
    client.get_all_pages(&url).await
}

pub async fn get_firewall_rule(
    client: &AzureClient,
    resource_group: &str,
    server: &str,
    rule: &str,
) -> AzureResult<FirewallRuleInner> {
    let url = rule_url(client, resource_group, server, Some(rule))?;
    debug!("get_firewall_rule({}/{}/{}) → {}", resource_group, server, rule, url);
    client.get_json(&url).await
}

pub async fn create_or_update_firewall_rule(
    client: &AzureClient,
    resource_group: &str,
    server: &str,
    rule: &str,
    start_ip: &str,
    end_ip: &str,
) -> AzureResult<FirewallRuleInner> {
    let url = rule_url(client, resource_group, server, Some(rule))?;
    let body = FirewallRuleInner {
        properties: FirewallRuleProperties {
            start_ip_address: start_ip.to_string(),
            end_ip_address: end_ip.to_string(),
        },
        ..Default::default()
    };
    debug!("create_or_update_firewall_rule({}/{}/{}) → {}", resource_group, server, rule, url);
    client.put_json(&url, &body).await
}

pub async fn delete_firewall_rule(client: &AzureClient, resource_group: &str, server: &str, rule: &str) -> AzureResult<()> {
    let url = rule_url(client, resource_group, server, Some(rule))?;
    debug!("delete_firewall_rule({}/{}/{}) → {}", resource_group, server, rule, url);
    client.delete(&url).await
}

// ─── Fluent wrapper ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SqlFirewallRule {
    inner: FirewallRuleInner,
    resource_group: String,
    server: String,
    client: Arc<AzureClient>,
}

impl SqlFirewallRule {
    pub(crate) fn new(inner: FirewallRuleInner, resource_group: String, server: String, client: Arc<AzureClient>) -> Self {
        Self {
            inner,
            resource_group,
            server,
            client,
        }
    }

    pub fn inner(&self) -> &FirewallRuleInner {
        &self.inner
    }

    pub fn id(&self) -> &str {
        self.inner.id.as_deref().unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.inner.name.as_deref().unwrap_or_default()
    }

    pub fn resource_group_name(&self) -> &str {
        &self.resource_group
    }

    pub fn sql_server_name(&self) -> &str {
        &self.server
    }

    pub fn start_ip_address(&self) -> &str {
        &self.inner.properties.start_ip_address
    }

    pub fn end_ip_address(&self) -> &str {
        &self.inner.properties.end_ip_address
    }

    pub async fn delete(&self) -> AzureResult<()> {
        delete_firewall_rule(&self.client, &self.resource_group, &self.server, self.name()).await
    }

    pub fn update(&self) -> SqlFirewallRuleUpdate {
        SqlFirewallRuleUpdate {
            resource_group: self.resource_group.clone(),
            server: self.server.clone(),
            name: self.name().to_string(),
            start_ip: self.start_ip_address().to_string(),
            end_ip: self.end_ip_address().to_string(),
            client: self.client.clone(),
        }
    }
}

#[async_trait]
impl Refreshable for SqlFirewallRule {
    async fn refresh(&mut self) -> AzureResult<()> {
        let name = self.name().to_string();
        self.inner = get_firewall_rule(&self.client, &self.resource_group, &self.server, &name).await?;
        Ok(())
    }
}

// ─── Definition ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SqlFirewallRuleDefinition {
    name: String,
    resource_group: Option<String>,
    server: Option<String>,
    start_ip: Option<String>,
    end_ip: Option<String>,
    client: Arc<AzureClient>,
}

impl SqlFirewallRuleDefinition {
    pub fn with_existing_sql_server(mut self, resource_group: impl Into<String>, server: impl Into<String>) -> Self {
        self.resource_group = Some(resource_group.into());
        self.server = Some(server.into());
        self
    }

    /// Single address; start and end are the same.
    pub fn with_ip_address(mut self, ip: impl Into<String>) -> Self {
        let ip = ip.into();
        self.start_ip = Some(ip.clone());
        self.end_ip = Some(ip);
        self
    }

    pub fn with_ip_address_range(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_ip = Some(start.into());
        self.end_ip = Some(end.into());
        self
    }

    pub fn start_ip_address(&self) -> Option<&str> {
        self.start_ip.as_deref()
    }

    pub fn end_ip_address(&self) -> Option<&str> {
        self.end_ip.as_deref()
    }
}

#[async_trait]
impl Creatable for SqlFirewallRuleDefinition {
    type Output = SqlFirewallRule;

    async fn create(self) -> AzureResult<SqlFirewallRule> {
        require("firewallRuleName", &self.name)?;
        let rg = self.resource_group.ok_or_else(|| AzureError::required("resourceGroupName"))?;
        let server = self.server.ok_or_else(|| AzureError::required("serverName"))?;
        let start = self.start_ip.ok_or_else(|| AzureError::required("startIpAddress"))?;
        let end = self.end_ip.ok_or_else(|| AzureError::required("endIpAddress"))?;
        validate_ip_range(&start, &end)?;

        let inner = create_or_update_firewall_rule(&self.client, &rg, &server, &self.name, &start, &end).await?;
        info!("Created SQL firewall rule {}/{}/{}", rg, server, self.name);
        Ok(SqlFirewallRule::new(inner, rg, server, self.client))
    }
}

// ─── Update ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SqlFirewallRuleUpdate {
    resource_group: String,
    server: String,
    name: String,
    start_ip: String,
    end_ip: String,
    client: Arc<AzureClient>,
}

impl SqlFirewallRuleUpdate {
    pub fn with_start_ip_address(mut self, ip: impl Into<String>) -> Self {
        self.start_ip = ip.into();
        self
    }

    pub fn with_end_ip_address(mut self, ip: impl Into<String>) -> Self {
        self.end_ip = ip.into();
        self
    }
}

#[async_trait]
impl Appliable for SqlFirewallRuleUpdate {
    type Output = SqlFirewallRule;

    async fn apply(self) -> AzureResult<SqlFirewallRule> {
        validate_ip_range(&self.start_ip, &self.end_ip)?;
        let inner = create_or_update_firewall_rule(
            &self.client,
            &self.resource_group,
            &self.server,
            &self.name,
            &self.start_ip,
            &self.end_ip,
        )
        .await?;
        info!("Updated SQL firewall rule {}/{}/{}", self.resource_group, self.server, self.name);
        Ok(SqlFirewallRule::new(inner, self.resource_group, self.server, self.client))
    }
}

// ─── Collection ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SqlFirewallRules {
    client: Arc<AzureClient>,
}

impl SqlFirewallRules {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    pub fn define(&self, name: impl Into<String>) -> SqlFirewallRuleDefinition {
        SqlFirewallRuleDefinition {
            name: name.into(),
            resource_group: None,
            server: None,
            start_ip: None,
            end_ip: None,
            client: self.client.clone(),
        }
    }

    pub async fn list_by_sql_server(&self, resource_group: &str, server: &str) -> AzureResult<Vec<SqlFirewallRule>> {
        Ok(list_firewall_rules(&self.client, resource_group, server)
            .await?
            .into_iter()
            .map(|inner| SqlFirewallRule::new(inner, resource_group.to_string(), server.to_string(), self.client.clone()))
            .collect())
    }

    pub async fn get_by_sql_server(&self, resource_group: &str, server: &str, name: &str) -> AzureResult<SqlFirewallRule> {
        let inner = get_firewall_rule(&self.client, resource_group, server, name).await?;
        Ok(SqlFirewallRule::new(inner, resource_group.to_string(), server.to_string(), self.client.clone()))
    }

    pub async fn delete_by_sql_server(&self, resource_group: &str, server: &str, name: &str) -> AzureResult<()> {
        delete_firewall_rule(&self.client, resource_group, server, name).await?;
        info!("Deleted SQL firewall rule {}/{}/{}", resource_group, server, name);
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
