//! Wire models for Microsoft.Storage.

use std::collections::HashMap;
use std::fmt;

use azfluent_core::types::ManagedIdentity;
use serde::{Deserialize, Serialize};

// ─── Enums ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StorageSkuName {
    #[serde(rename = "Standard_LRS")]
    StandardLrs,
    #[serde(rename = "Standard_GRS")]
    StandardGrs,
    #[serde(rename = "Standard_RAGRS")]
    StandardRagrs,
    #[serde(rename = "Standard_ZRS")]
    StandardZrs,
    #[serde(rename = "Standard_GZRS")]
    StandardGzrs,
    #[serde(rename = "Standard_RAGZRS")]
    StandardRagzrs,
    #[serde(rename = "Premium_LRS")]
    PremiumLrs,
    #[serde(rename = "Premium_ZRS")]
    PremiumZrs,
}

impl fmt::Display for StorageSkuName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::StandardLrs => "Standard_LRS",
            Self::StandardGrs => "Standard_GRS",
            Self::StandardRagrs => "Standard_RAGRS",
            Self::StandardZrs => "Standard_ZRS",
            Self::StandardGzrs => "Standard_GZRS",
            Self::StandardRagzrs => "Standard_RAGZRS",
            Self::PremiumLrs => "Premium_LRS",
            Self::PremiumZrs => "Premium_ZRS",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StorageKind {
    Storage,
    StorageV2,
    BlobStorage,
    BlockBlobStorage,
    FileStorage,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AccessTier {
    Hot,
    Cool,
    Cold,
    Premium,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MinimumTlsVersion {
    #[serde(rename = "TLS1_0")]
    Tls1_0,
    #[serde(rename = "TLS1_1")]
    Tls1_1,
    #[serde(rename = "TLS1_2")]
    Tls1_2,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PublicAccess {
    None,
    Container,
    Blob,
}

// ─── Storage accounts ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountInner {
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
    pub sku: Option<StorageSku>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<StorageKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<ManagedIdentity>,
    #[serde(default)]
    pub properties: StorageAccountProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageSku {
    pub name: StorageSkuName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_endpoints: Option<Endpoints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_of_primary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_tier: Option<AccessTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supports_https_traffic_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_tls_version: Option<MinimumTlsVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_blob_public_access: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_hns_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_file_shares_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_domain: Option<CustomDomain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_acls: Option<NetworkRuleSet>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Endpoints {
    #[serde(default)]
    pub blob: Option<String>,
    #[serde(default)]
    pub queue: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub web: Option<String>,
    #[serde(default)]
    pub dfs: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CustomDomain {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_sub_domain_name: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRuleSet {
    /// Comma separated `AzureServices`, `Logging`, `Metrics` or `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bypass: Option<String>,
    pub default_action: String,
    #[serde(default)]
    pub ip_rules: Vec<IpRule>,
    #[serde(default)]
    pub virtual_network_rules: Vec<VirtualNetworkRule>,
}

impl Default for NetworkRuleSet {
    fn default() -> Self {
        Self {
            bypass: Some("AzureServices".into()),
            default_action: "Allow".into(),
            ip_rules: Vec::new(),
            virtual_network_rules: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct IpRule {
    /// A single address or a CIDR range.
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct VirtualNetworkRule {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// PATCH body of a storage account update.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountUpdateParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<StorageSku>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<ManagedIdentity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<StorageKind>,
    #[serde(skip_serializing_if = "StorageAccountProperties::is_empty")]
    pub properties: StorageAccountProperties,
}

impl StorageAccountProperties {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountKey {
    #[serde(default)]
    pub key_name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub permissions: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageAccountListKeysResult {
    #[serde(default)]
    pub keys: Vec<StorageAccountKey>,
}

// ─── Blob containers ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlobContainerInner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default)]
    pub properties: ContainerProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_access: Option<PublicAccess>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_immutability_policy: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_legal_hold: Option<bool>,
}

// ─── Lifecycle management ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManagementPolicyInner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub properties: ManagementPolicyProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManagementPolicyProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_time: Option<String>,
    #[serde(default)]
    pub policy: ManagementPolicySchema,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ManagementPolicySchema {
    #[serde(default)]
    pub rules: Vec<ManagementPolicyRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ManagementPolicyRule {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Always `Lifecycle`.
    #[serde(rename = "type")]
    pub rule_type: String,
    pub definition: ManagementPolicyDefinitionBody,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ManagementPolicyDefinitionBody {
    pub actions: ManagementPolicyAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<ManagementPolicyFilter>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManagementPolicyAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_blob: Option<ManagementPolicyBaseBlob>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<ManagementPolicySnapShot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManagementPolicyBaseBlob {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier_to_cool: Option<DateAfterModification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier_to_archive: Option<DateAfterModification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<DateAfterModification>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ManagementPolicySnapShot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<DateAfterCreation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DateAfterModification {
    pub days_after_modification_greater_than: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DateAfterCreation {
    pub days_after_creation_greater_than: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManagementPolicyFilter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prefix_match: Vec<String>,
    #[serde(default)]
    pub blob_types: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_properties_wire_names() {
        let json = r#"{
            "name": "acct1",
            "kind": "StorageV2",
            "sku": {"name": "Standard_RAGRS", "tier": "Standard"},
            "properties": {
                "supportsHttpsTrafficOnly": true,
                "minimumTlsVersion": "TLS1_2",
                "isHnsEnabled": true,
                "accessTier": "Cool",
                "primaryEndpoints": {"blob": "https://acct1.blob.core.windows.net/"},
                "networkAcls": {"defaultAction": "Deny", "bypass": "AzureServices, Logging",
                                "ipRules": [{"value": "1.2.3.4", "action": "Allow"}]}
            }
        }"#;
        let a: StorageAccountInner = serde_json::from_str(json).unwrap();
        assert_eq!(a.kind, Some(StorageKind::StorageV2));
        assert_eq!(a.sku.as_ref().unwrap().name, StorageSkuName::StandardRagrs);
        assert_eq!(a.properties.minimum_tls_version, Some(MinimumTlsVersion::Tls1_2));
        assert_eq!(a.properties.is_hns_enabled, Some(true));
        let acl = a.properties.network_acls.unwrap();
        assert_eq!(acl.default_action, "Deny");
        assert_eq!(acl.ip_rules[0].value, "1.2.3.4");
    }

    #[test]
    fn update_parameters_skip_empty_properties() {
        let p = StorageAccountUpdateParameters {
            kind: Some(StorageKind::StorageV2),
            ..Default::default()
        };
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v, serde_json::json!({"kind": "StorageV2"}));
    }

    #[test]
    fn policy_rule_wire_shape() {
        let rule = ManagementPolicyRule {
            name: "r1".into(),
            enabled: Some(true),
            rule_type: "Lifecycle".into(),
            definition: ManagementPolicyDefinitionBody {
                actions: ManagementPolicyAction {
                    base_blob: Some(ManagementPolicyBaseBlob {
                        delete: Some(DateAfterModification {
                            days_after_modification_greater_than: 90.0,
                        }),
                        ..Default::default()
                    }),
                    snapshot: None,
                },
                filters: Some(ManagementPolicyFilter {
                    prefix_match: vec!["logs/".into()],
                    blob_types: vec!["blockBlob".into()],
                }),
            },
        };
        let v = serde_json::to_value(&rule).unwrap();
        assert_eq!(v["type"], "Lifecycle");
        assert_eq!(
            v["definition"]["actions"]["baseBlob"]["delete"]["daysAfterModificationGreaterThan"],
            90.0
        );
        assert_eq!(v["definition"]["filters"]["prefixMatch"][0], "logs/");
    }
}
