//! Wire models of the `Microsoft.ServiceFabric` resource provider.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Enums ──────────────────────────────────────────────────────────

/// Number of system service replicas the cluster keeps.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ReliabilityLevel {
    None,
    Bronze,
    Silver,
    Gold,
    Platinum,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum UpgradeMode {
    Automatic,
    Manual,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DurabilityLevel {
    Bronze,
    Silver,
    Gold,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum X509StoreName {
    AddressBook,
    AuthRoot,
    CertificateAuthority,
    Disallowed,
    My,
    Root,
    TrustedPeople,
    TrustedPublisher,
}

// ─── Cluster ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterInner {
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
    #[serde(default)]
    pub properties: ClusterProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterProperties {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub management_endpoint: String,
    #[serde(default)]
    pub node_types: Vec<NodeTypeDescription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reliability_level: Option<ReliabilityLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade_mode: Option<UpgradeMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_code_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<CertificateDescription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverse_proxy_certificate: Option<CertificateDescription>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub client_certificate_thumbprints: Vec<ClientCertificateThumbprint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub client_certificate_common_names: Vec<ClientCertificateCommonName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics_storage_account_config: Option<DiagnosticsStorageAccountConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fabric_settings: Vec<SettingsSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_active_directory: Option<AzureActiveDirectory>,
    #[serde(default, skip_serializing)]
    pub cluster_id: Option<String>,
    #[serde(default, skip_serializing)]
    pub cluster_state: Option<String>,
    #[serde(default, skip_serializing)]
    pub cluster_endpoint: Option<String>,
    #[serde(default, skip_serializing)]
    pub provisioning_state: Option<String>,
    #[serde(default, skip_serializing)]
    pub available_cluster_versions: Vec<ClusterVersionDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeTypeDescription {
    pub name: String,
    pub vm_instance_count: u32,
    pub client_connection_endpoint_port: u16,
    pub http_gateway_endpoint_port: u16,
    pub is_primary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub durability_level: Option<DurabilityLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_ports: Option<EndpointRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ephemeral_ports: Option<EndpointRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverse_proxy_endpoint_port: Option<u16>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub placement_properties: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub capacities: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EndpointRange {
    pub start_port: u16,
    pub end_port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CertificateDescription {
    pub thumbprint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbprint_secondary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x509_store_name: Option<X509StoreName>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientCertificateThumbprint {
    pub is_admin: bool,
    pub certificate_thumbprint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientCertificateCommonName {
    pub is_admin: bool,
    pub certificate_common_name: String,
    pub certificate_issuer_thumbprint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsStorageAccountConfig {
    pub storage_account_name: String,
    pub protected_account_key_name: String,
    pub blob_endpoint: String,
    pub queue_endpoint: String,
    pub table_endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettingsSection {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<SettingsParameter>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettingsParameter {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AzureActiveDirectory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_application: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_application: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterVersionDetails {
    #[serde(default)]
    pub code_version: Option<String>,
    #[serde(default)]
    pub support_expiry_utc: Option<DateTime<Utc>>,
    #[serde(default)]
    pub environment: Option<String>,
}

/// PATCH body of a cluster update; unset fields are left alone.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterUpdateParameters {
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, String>,
    pub properties: ClusterUpdateProperties,
}

#[derive(Debug, Clone, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterUpdateProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_types: Option<Vec<NodeTypeDescription>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reliability_level: Option<ReliabilityLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade_mode: Option<UpgradeMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_code_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<CertificateDescription>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverse_proxy_certificate: Option<CertificateDescription>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_certificate_thumbprints: Option<Vec<ClientCertificateThumbprint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_certificate_common_names: Option<Vec<ClientCertificateCommonName>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fabric_settings: Option<Vec<SettingsSection>>,
}

/// Entry of `locations/{location}/clusterVersions`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterCodeVersionsResult {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: ClusterVersionDetails,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn read_only_properties_stay_out_of_requests() {
        let inner: ClusterInner = serde_json::from_value(json!({
            "name": "sf1",
            "location": "westus",
            "properties": {
                "managementEndpoint": "https://sf1.westus.cloudapp.azure.com:19080",
                "nodeTypes": [],
                "clusterState": "Ready",
                "provisioningState": "Succeeded",
                "availableClusterVersions": [{"codeVersion": "8.0.514.9590", "environment": "Windows"}]
            }
        }))
        .unwrap();
        assert_eq!(inner.properties.cluster_state.as_deref(), Some("Ready"));
        assert_eq!(inner.properties.available_cluster_versions.len(), 1);

        let body = serde_json::to_value(&inner).unwrap();
        assert!(body["properties"].get("clusterState").is_none());
        assert!(body["properties"].get("availableClusterVersions").is_none());
    }

    #[test]
    fn version_expiry_parses_as_utc() {
        let v: ClusterCodeVersionsResult = serde_json::from_value(json!({
            "name": "8.0.514.9590",
            "properties": {"codeVersion": "8.0.514.9590", "supportExpiryUtc": "2026-12-31T00:00:00Z", "environment": "Linux"}
        }))
        .unwrap();
        let expiry = v.properties.support_expiry_utc.unwrap();
        assert_eq!(expiry.to_rfc3339(), "2026-12-31T00:00:00+00:00");
    }
}
