//! Wire models of the `Microsoft.Sql` resource provider.

use std::collections::HashMap;

use azfluent_core::types::ManagedIdentity;
use serde::{Deserialize, Serialize};

// ─── Enums ──────────────────────────────────────────────────────────

/// How a database is created.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CreateMode {
    Default,
    Copy,
    Secondary,
    PointInTimeRestore,
    Restore,
    Recovery,
    RestoreExternalBackup,
    RestoreLongTermRetentionBackup,
    OnlineSecondary,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SampleName {
    #[serde(rename = "AdventureWorksLT")]
    AdventureWorksLt,
    WideWorldImportersStd,
    WideWorldImportersFull,
}

/// DTU editions shared by databases and elastic pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseEdition {
    Basic,
    Standard,
    Premium,
}

impl DatabaseEdition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Standard => "Standard",
            Self::Premium => "Premium",
        }
    }

    /// Sku name of an elastic pool in this edition.
    pub fn pool_sku_name(self) -> String {
        format!("{}Pool", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StorageKeyType {
    StorageAccessKey,
    SharedAccessKey,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AuthenticationType {
    Sql,
    #[serde(rename = "ADPassword")]
    AdPassword,
}

// ─── Shared ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Sku {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
}

impl Sku {
    pub fn new(name: impl Into<String>, tier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tier: Some(tier.into()),
            ..Default::default()
        }
    }
}

// ─── Server ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SqlServerInner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<ManagedIdentity>,
    #[serde(default)]
    pub properties: SqlServerProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SqlServerProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub administrator_login: Option<String>,
    /// Write-only; never returned by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub administrator_login_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing)]
    pub state: Option<String>,
    #[serde(default, skip_serializing)]
    pub fully_qualified_domain_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_network_access: Option<String>,
}

/// PATCH body of a server update.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SqlServerUpdateParameters {
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<ManagedIdentity>,
    pub properties: SqlServerProperties,
}

// ─── Database ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseInner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,
    #[serde(default)]
    pub properties: DatabaseProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_mode: Option<CreateMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_name: Option<SampleName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elastic_pool_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_database_id: Option<String>,
    #[serde(default, skip_serializing)]
    pub status: Option<String>,
    #[serde(default, skip_serializing)]
    pub database_id: Option<String>,
    #[serde(default, skip_serializing)]
    pub creation_date: Option<String>,
    #[serde(default, skip_serializing)]
    pub current_service_objective_name: Option<String>,
    #[serde(default, skip_serializing)]
    pub default_secondary_location: Option<String>,
}

/// Body of a database `move` (rename) request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceMoveDefinition {
    pub id: String,
}

/// Body of a database import or export request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportExportDefinition {
    pub storage_key_type: StorageKeyType,
    pub storage_key: String,
    pub storage_uri: String,
    pub administrator_login: String,
    pub administrator_login_password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication_type: Option<AuthenticationType>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportExportOperationResult {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: ImportExportOperationProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportExportOperationProperties {
    #[serde(default)]
    pub request_type: Option<String>,
    #[serde(default)]
    pub server_name: Option<String>,
    #[serde(default)]
    pub database_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub blob_uri: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

// ─── Firewall rule ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FirewallRuleInner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub properties: FirewallRuleProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FirewallRuleProperties {
    #[serde(default)]
    pub start_ip_address: String,
    #[serde(default)]
    pub end_ip_address: String,
}

// ─── Elastic pool ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElasticPoolInner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,
    #[serde(default)]
    pub properties: ElasticPoolProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElasticPoolProperties {
    #[serde(default, skip_serializing)]
    pub state: Option<String>,
    #[serde(default, skip_serializing)]
    pub creation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_database_settings: Option<PerDatabaseSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_redundant: Option<bool>,
}

/// Capacity bounds each database in a pool may use (DTUs or vCores).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerDatabaseSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_capacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_capacity: Option<f64>,
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn server_deserialize() {
        let s: SqlServerInner = serde_json::from_value(json!({
            "id": "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Sql/servers/srv1",
            "name": "srv1", "location": "eastus", "kind": "v12.0",
            "properties": {
                "fullyQualifiedDomainName": "srv1.database.windows.net",
                "state": "Ready", "administratorLogin": "admin1", "version": "12.0"
            }
        }))
        .unwrap();
        assert_eq!(s.properties.fully_qualified_domain_name.as_deref(), Some("srv1.database.windows.net"));
        assert_eq!(s.properties.administrator_login.as_deref(), Some("admin1"));
        assert!(s.properties.administrator_login_password.is_none());
    }

    #[test]
    fn database_read_only_fields_not_sent() {
        let db: DatabaseInner = serde_json::from_value(json!({
            "name": "db1",
            "sku": {"name": "S0", "tier": "Standard"},
            "properties": {"status": "Online", "collation": "SQL_Latin1_General_CP1_CI_AS",
                           "currentServiceObjectiveName": "S0", "sampleName": "AdventureWorksLT"}
        }))
        .unwrap();
        assert_eq!(db.properties.sample_name, Some(SampleName::AdventureWorksLt));
        let out = serde_json::to_value(&db).unwrap();
        assert!(out["properties"].get("status").is_none());
        assert!(out["properties"].get("currentServiceObjectiveName").is_none());
        assert_eq!(out["properties"]["collation"], "SQL_Latin1_General_CP1_CI_AS");
    }

    #[test]
    fn pool_sku_names() {
        assert_eq!(DatabaseEdition::Standard.pool_sku_name(), "StandardPool");
        assert_eq!(DatabaseEdition::Basic.as_str(), "Basic");
    }
}
