//! Storage accounts: definition, PATCH updates, access keys and name checks.

use std::collections::HashMap;
use std::sync::Arc;

use azfluent_core::fluent::{
    Appliable, Creatable, GroupableDefinition, GroupableResource, GroupableSpec, Refreshable,
    Resource, SupportsDeletingByResourceGroup, SupportsGettingByResourceGroup, SupportsListing,
    SupportsListingByResourceGroup, TaggableUpdate,
};
use azfluent_core::types::{require, AzureError, AzureResult, ManagedIdentity, NameAvailability};
use azfluent_core::{async_trait, impl_groupable_resource, AzureClient};
use log::{debug, info};
use serde_json::json;

use crate::types::{
    AccessTier, CustomDomain, Endpoints, IpRule, MinimumTlsVersion, NetworkRuleSet, StorageAccountInner,
    StorageAccountKey, StorageAccountListKeysResult, StorageAccountProperties,
    StorageAccountUpdateParameters, StorageKind, StorageSku, StorageSkuName, VirtualNetworkRule,
};

/// 3–24 characters, lowercase letters and digits only.
pub fn validate_storage_account_name(name: &str) -> AzureResult<()> {
    let valid = (3..=24).contains(&name.len())
        && name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(AzureError::validation(format!(
            "Storage account name '{name}' must be between 3 and 24 characters in length and use numbers and lower-case letters only."
        )))
    }
}

// ─── REST operations ────────────────────────────────────────────────

fn account_url(client: &AzureClient, resource_group: &str, account_name: &str, suffix: &str) -> AzureResult<String> {
    require("resourceGroupName", resource_group)?;
    require("accountName", account_name)?;
    client.resource_group_url(
        resource_group,
        &format!(
            "/providers/Microsoft.Storage/storageAccounts/{}{}?api-version={}",
            account_name,
            suffix,
            client.config().api_version_storage
        ),
    )
}

pub async fn list_storage_accounts(client: &AzureClient) -> AzureResult<Vec<StorageAccountInner>> {
    let url = client.subscription_url(&format!(
        "/providers/Microsoft.Storage/storageAccounts?api-version={}",
        client.config().api_version_storage
    ))?;
    debug!("list_storage_accounts → {}", url);
    client.get_all_pages(&url).await
}

pub async fn list_storage_accounts_by_resource_group(
    client: &AzureClient,
    resource_group: &str,
) -> AzureResult<Vec<StorageAccountInner>> {
    let url = client.resource_group_url(
        resource_group,
        &format!(
            "/providers/Microsoft.Storage/storageAccounts?api-version={}",
            client.config().api_version_storage
        ),
    )?;
    debug!("list_storage_accounts_by_resource_group({}) → {}", resource_group, url);
    client.get_all_pages(&url).await
}

pub async fn get_storage_account(
    client: &AzureClient,
    resource_group: &str,
    account_name: &str,
) -> AzureResult<StorageAccountInner> {
    let url = account_url(client, resource_group, account_name, "")?;
    debug!("get_storage_account({}/{}) → {}", resource_group, account_name, url);
    client.get_json(&url).await
}

/// PUT; the service answers 202 and the client polls until the account exists.
pub async fn create_storage_account(
    client: &AzureClient,
    resource_group: &str,
    account_name: &str,
    parameters: &StorageAccountInner,
) -> AzureResult<StorageAccountInner> {
    let url = account_url(client, resource_group, account_name, "")?;
    debug!("create_storage_account({}/{}) → {}", resource_group, account_name, url);
    client.put_json(&url, parameters).await
}

pub async fn update_storage_account(
    client: &AzureClient,
    resource_group: &str,
    account_name: &str,
    parameters: &StorageAccountUpdateParameters,
) -> AzureResult<StorageAccountInner> {
    let url = account_url(client, resource_group, account_name, "")?;
    debug!("update_storage_account({}/{}) → {}", resource_group, account_name, url);
    client.patch_json(&url, parameters).await
}

pub async fn delete_storage_account(client: &AzureClient, resource_group: &str, account_name: &str) -> AzureResult<()> {
    let url = account_url(client, resource_group, account_name, "")?;
    debug!("delete_storage_account({}/{}) → {}", resource_group, account_name, url);
    client.delete(&url).await
}

pub async fn list_keys(
    client: &AzureClient,
    resource_group: &str,
    account_name: &str,
) -> AzureResult<Vec<StorageAccountKey>> {
    let url = account_url(client, resource_group, account_name, "/listKeys")?;
    debug!("list_keys({}/{}) → {}", resource_group, account_name, url);
    let result: StorageAccountListKeysResult = client.post_for_json(&url).await?;
    Ok(result.keys)
}

/// Regenerates `key1` or `key2`; returns the full key list.
pub async fn regenerate_key(
    client: &AzureClient,
    resource_group: &str,
    account_name: &str,
    key_name: &str,
) -> AzureResult<Vec<StorageAccountKey>> {
    require("keyName", key_name)?;
    let url = account_url(client, resource_group, account_name, "/regenerateKey")?;
    debug!("regenerate_key({}/{}, {}) → {}", resource_group, account_name, key_name, url);
    let result: StorageAccountListKeysResult = client.post_json(&url, &json!({ "keyName": key_name })).await?;
    Ok(result.keys)
}

pub async fn check_name_availability(client: &AzureClient, account_name: &str) -> AzureResult<NameAvailability> {
    require("accountName", account_name)?;
    let url = client.subscription_url(&format!(
        "/providers/Microsoft.Storage/checkNameAvailability?api-version={}",
        client.config().api_version_storage
    ))?;
    debug!("check_name_availability({}) → {}", account_name, url);
    let body = json!({ "name": account_name, "type": "Microsoft.Storage/storageAccounts" });
    client.post_json(&url, &body).await
}

// ─── Network rules ──────────────────────────────────────────────────

const BYPASS_AZURE_SERVICES: &str = "AzureServices";
const BYPASS_LOGGING: &str = "Logging";
const BYPASS_METRICS: &str = "Metrics";

fn bypass_set(rules: &NetworkRuleSet) -> Vec<String> {
    rules
        .bypass
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "None")
        .map(str::to_string)
        .collect()
}

fn set_bypass(rules: &mut NetworkRuleSet, entry: &str, enabled: bool) {
    let mut current = bypass_set(rules);
    current.retain(|e| e != entry);
    if enabled {
        current.push(entry.to_string());
    }
    rules.bypass = Some(if current.is_empty() {
        "None".to_string()
    } else {
        current.join(", ")
    });
}

/// Shared network rule editing for definitions and updates.
#[derive(Debug, Clone, Default, PartialEq)]
struct NetworkRulesEdit {
    rules: Option<NetworkRuleSet>,
}

impl NetworkRulesEdit {
    fn rules_mut(&mut self) -> &mut NetworkRuleSet {
        self.rules.get_or_insert_with(NetworkRuleSet::default)
    }

    fn add_ip_rule(&mut self, value: String) {
        let rules = self.rules_mut();
        if !rules.ip_rules.iter().any(|r| r.value == value) {
            rules.ip_rules.push(IpRule {
                value,
                action: Some("Allow".into()),
            });
        }
    }

    fn add_subnet(&mut self, subnet_id: String) {
        let rules = self.rules_mut();
        if !rules.virtual_network_rules.iter().any(|r| r.id.eq_ignore_ascii_case(&subnet_id)) {
            rules.virtual_network_rules.push(VirtualNetworkRule {
                id: subnet_id,
                action: Some("Allow".into()),
                state: None,
            });
        }
    }
}

// ─── Fluent wrapper ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct StorageAccount {
    inner: StorageAccountInner,
    client: Arc<AzureClient>,
}

impl_groupable_resource!(StorageAccount, StorageAccountInner);

impl StorageAccount {
    pub(crate) fn new(inner: StorageAccountInner, client: Arc<AzureClient>) -> Self {
        Self { inner, client }
    }

    fn props(&self) -> &StorageAccountProperties {
        &self.inner.properties
    }

    pub fn sku(&self) -> Option<StorageSkuName> {
        self.inner.sku.as_ref().map(|s| s.name)
    }

    pub fn kind(&self) -> Option<StorageKind> {
        self.inner.kind
    }

    pub fn access_tier(&self) -> Option<AccessTier> {
        self.props().access_tier
    }

    pub fn is_https_traffic_only(&self) -> bool {
        self.props().supports_https_traffic_only.unwrap_or(false)
    }

    pub fn minimum_tls_version(&self) -> Option<MinimumTlsVersion> {
        self.props().minimum_tls_version
    }

    pub fn is_hns_enabled(&self) -> bool {
        self.props().is_hns_enabled.unwrap_or(false)
    }

    pub fn is_large_file_shares_enabled(&self) -> bool {
        self.props().large_file_shares_state.as_deref() == Some("Enabled")
    }

    pub fn is_blob_public_access_allowed(&self) -> bool {
        self.props().allow_blob_public_access.unwrap_or(false)
    }

    pub fn endpoints(&self) -> Option<&Endpoints> {
        self.props().primary_endpoints.as_ref()
    }

    pub fn custom_domain(&self) -> Option<&CustomDomain> {
        self.props().custom_domain.as_ref()
    }

    pub fn provisioning_state(&self) -> Option<&str> {
        self.props().provisioning_state.as_deref()
    }

    pub fn creation_time(&self) -> Option<&str> {
        self.props().creation_time.as_deref()
    }

    pub fn system_assigned_principal_id(&self) -> Option<&str> {
        self.inner
            .identity
            .as_ref()
            .and_then(|i| i.principal_id.as_deref())
    }

    /// True unless network rules deny by default.
    pub fn is_access_allowed_from_all_networks(&self) -> bool {
        self.props()
            .network_acls
            .as_ref()
            .map_or(true, |n| n.default_action.eq_ignore_ascii_case("Allow"))
    }

    pub fn ip_rules(&self) -> Vec<&str> {
        self.props()
            .network_acls
            .as_ref()
            .map(|n| n.ip_rules.iter().map(|r| r.value.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn network_subnet_ids(&self) -> Vec<&str> {
        self.props()
            .network_acls
            .as_ref()
            .map(|n| n.virtual_network_rules.iter().map(|r| r.id.as_str()).collect())
            .unwrap_or_default()
    }

    fn bypasses(&self, entry: &str) -> bool {
        self.props()
            .network_acls
            .as_ref()
            .map_or(true, |n| bypass_set(n).iter().any(|b| b == entry))
    }

    pub fn can_access_from_azure_services(&self) -> bool {
        self.bypasses(BYPASS_AZURE_SERVICES)
    }

    pub fn can_read_log_entries_from_any_network(&self) -> bool {
        self.bypasses(BYPASS_LOGGING)
    }

    pub fn can_read_metrics_from_any_network(&self) -> bool {
        self.bypasses(BYPASS_METRICS)
    }

    pub async fn get_keys(&self) -> AzureResult<Vec<StorageAccountKey>> {
        list_keys(&self.client, &self.resource_group_name(), self.name()).await
    }

    pub async fn regenerate_key(&self, key_name: &str) -> AzureResult<Vec<StorageAccountKey>> {
        let keys = regenerate_key(&self.client, &self.resource_group_name(), self.name(), key_name).await?;
        info!("Regenerated {} of storage account {}", key_name, self.name());
        Ok(keys)
    }

    pub fn update(&self) -> StorageAccountUpdate {
        StorageAccountUpdate {
            resource_group: self.resource_group_name(),
            name: self.name().to_string(),
            params: StorageAccountUpdateParameters::default(),
            tags: self.inner.tags.clone(),
            tags_changed: false,
            network: NetworkRulesEdit {
                rules: None,
            },
            current_network: self.props().network_acls.clone(),
            client: self.client.clone(),
        }
    }
}

#[async_trait]
impl Refreshable for StorageAccount {
    async fn refresh(&mut self) -> AzureResult<()> {
        let rg = self.resource_group_name();
        let name = self.name().to_string();
        self.inner = get_storage_account(&self.client, &rg, &name).await?;
        Ok(())
    }
}

// ─── Definition ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct StorageAccountDefinition {
    spec: GroupableSpec,
    sku: StorageSkuName,
    kind: StorageKind,
    properties: StorageAccountProperties,
    identity: Option<ManagedIdentity>,
    network: NetworkRulesEdit,
    client: Arc<AzureClient>,
}

impl GroupableDefinition for StorageAccountDefinition {
    fn spec_mut(&mut self) -> &mut GroupableSpec {
        &mut self.spec
    }
}

impl StorageAccountDefinition {
    fn new(name: String, client: Arc<AzureClient>) -> Self {
        Self {
            spec: GroupableSpec::new(name),
            sku: StorageSkuName::StandardRagrs,
            kind: StorageKind::StorageV2,
            properties: StorageAccountProperties {
                supports_https_traffic_only: Some(true),
                minimum_tls_version: Some(MinimumTlsVersion::Tls1_2),
                ..Default::default()
            },
            identity: None,
            network: NetworkRulesEdit::default(),
            client,
        }
    }

    pub fn with_sku(mut self, sku: StorageSkuName) -> Self {
        self.sku = sku;
        self
    }

    pub fn with_general_purpose_account_kind_v2(mut self) -> Self {
        self.kind = StorageKind::StorageV2;
        self
    }

    pub fn with_general_purpose_account_kind(mut self) -> Self {
        self.kind = StorageKind::Storage;
        self
    }

    pub fn with_blob_storage_account_kind(mut self) -> Self {
        self.kind = StorageKind::BlobStorage;
        self
    }

    pub fn with_block_blob_storage_account_kind(mut self) -> Self {
        self.kind = StorageKind::BlockBlobStorage;
        self
    }

    pub fn with_file_storage_account_kind(mut self) -> Self {
        self.kind = StorageKind::FileStorage;
        self
    }

    pub fn with_access_tier(mut self, tier: AccessTier) -> Self {
        self.properties.access_tier = Some(tier);
        self
    }

    pub fn with_only_https_traffic(mut self) -> Self {
        self.properties.supports_https_traffic_only = Some(true);
        self
    }

    pub fn with_http_and_https_traffic(mut self) -> Self {
        self.properties.supports_https_traffic_only = Some(false);
        self
    }

    pub fn with_minimum_tls_version(mut self, version: MinimumTlsVersion) -> Self {
        self.properties.minimum_tls_version = Some(version);
        self
    }

    pub fn with_blob_public_access(mut self, allowed: bool) -> Self {
        self.properties.allow_blob_public_access = Some(allowed);
        self
    }

    pub fn with_hns_enabled(mut self, enabled: bool) -> Self {
        self.properties.is_hns_enabled = Some(enabled);
        self
    }

    pub fn with_large_file_shares(mut self, enabled: bool) -> Self {
        self.properties.large_file_shares_state =
            Some(if enabled { "Enabled" } else { "Disabled" }.to_string());
        self
    }

    pub fn with_custom_domain(mut self, name: impl Into<String>, use_sub_domain_name: bool) -> Self {
        self.properties.custom_domain = Some(CustomDomain {
            name: name.into(),
            use_sub_domain_name: Some(use_sub_domain_name),
        });
        self
    }

    pub fn with_system_assigned_managed_service_identity(mut self) -> Self {
        self.identity = Some(ManagedIdentity::system_assigned());
        self
    }

    /// Deny by default; only the listed IPs, ranges and subnets get in.
    pub fn with_access_from_selected_networks(mut self) -> Self {
        self.network.rules_mut().default_action = "Deny".into();
        self
    }

    pub fn with_access_from_all_networks(mut self) -> Self {
        self.network.rules_mut().default_action = "Allow".into();
        self
    }

    pub fn with_access_from_ip_address(mut self, ip: impl Into<String>) -> Self {
        self.network.add_ip_rule(ip.into());
        self
    }

    pub fn with_access_from_ip_address_range(mut self, cidr: impl Into<String>) -> Self {
        self.network.add_ip_rule(cidr.into());
        self
    }

    pub fn with_access_from_network_subnet(mut self, subnet_id: impl Into<String>) -> Self {
        self.network.add_subnet(subnet_id.into());
        self
    }

    pub fn with_access_from_azure_services(mut self, enabled: bool) -> Self {
        set_bypass(self.network.rules_mut(), BYPASS_AZURE_SERVICES, enabled);
        self
    }

    pub fn with_read_access_to_log_entries_from_any_network(mut self, enabled: bool) -> Self {
        set_bypass(self.network.rules_mut(), BYPASS_LOGGING, enabled);
        self
    }

    pub fn with_read_access_to_metrics_from_any_network(mut self, enabled: bool) -> Self {
        set_bypass(self.network.rules_mut(), BYPASS_METRICS, enabled);
        self
    }

    pub fn sku(&self) -> StorageSkuName {
        self.sku
    }

    pub fn kind(&self) -> StorageKind {
        self.kind
    }

    pub fn properties(&self) -> &StorageAccountProperties {
        &self.properties
    }

    pub fn network_rules(&self) -> Option<&NetworkRuleSet> {
        self.network.rules.as_ref()
    }
}

#[async_trait]
impl Creatable for StorageAccountDefinition {
    type Output = StorageAccount;

    async fn create(self) -> AzureResult<StorageAccount> {
        self.spec.validate()?;
        validate_storage_account_name(&self.spec.name)?;
        if self.properties.access_tier.is_some()
            && matches!(self.kind, StorageKind::Storage | StorageKind::FileStorage)
        {
            return Err(AzureError::validation(
                "Access tier can only be set on StorageV2, BlobStorage or BlockBlobStorage accounts",
            ));
        }
        self.spec.ensure_resource_group(&self.client).await?;

        let rg = self.spec.resource_group()?;
        let mut properties = self.properties.clone();
        properties.network_acls = self.network.rules.clone();
        let body = StorageAccountInner {
            location: Some(self.spec.region_name()?),
            tags: self.spec.tags.clone(),
            sku: Some(StorageSku {
                name: self.sku,
                tier: None,
            }),
            kind: Some(self.kind),
            identity: self.identity.clone(),
            properties,
            ..Default::default()
        };
        let inner = create_storage_account(&self.client, rg, &self.spec.name, &body).await?;
        info!("Created storage account {}/{}", rg, self.spec.name);
        Ok(StorageAccount::new(inner, self.client))
    }
}

// ─── Update ─────────────────────────────────────────────────────────

/// Collects changed settings and sends them as one PATCH.
#[derive(Debug, Clone)]
pub struct StorageAccountUpdate {
    resource_group: String,
    name: String,
    params: StorageAccountUpdateParameters,
    tags: HashMap<String, String>,
    tags_changed: bool,
    network: NetworkRulesEdit,
    current_network: Option<NetworkRuleSet>,
    client: Arc<AzureClient>,
}

impl StorageAccountUpdate {
    fn network_mut(&mut self) -> &mut NetworkRulesEdit {
        if self.network.rules.is_none() {
            self.network.rules = Some(self.current_network.clone().unwrap_or_default());
        }
        &mut self.network
    }

    pub fn with_sku(mut self, sku: StorageSkuName) -> Self {
        self.params.sku = Some(StorageSku { name: sku, tier: None });
        self
    }

    /// Converts a general purpose v1 account to StorageV2. Irreversible.
    pub fn upgrade_to_general_purpose_account_kind_v2(mut self) -> Self {
        self.params.kind = Some(StorageKind::StorageV2);
        self
    }

    pub fn with_access_tier(mut self, tier: AccessTier) -> Self {
        self.params.properties.access_tier = Some(tier);
        self
    }

    pub fn with_only_https_traffic(mut self) -> Self {
        self.params.properties.supports_https_traffic_only = Some(true);
        self
    }

    pub fn with_http_and_https_traffic(mut self) -> Self {
        self.params.properties.supports_https_traffic_only = Some(false);
        self
    }

    pub fn with_minimum_tls_version(mut self, version: MinimumTlsVersion) -> Self {
        self.params.properties.minimum_tls_version = Some(version);
        self
    }

    pub fn with_blob_public_access(mut self, allowed: bool) -> Self {
        self.params.properties.allow_blob_public_access = Some(allowed);
        self
    }

    pub fn with_large_file_shares(mut self, enabled: bool) -> Self {
        self.params.properties.large_file_shares_state =
            Some(if enabled { "Enabled" } else { "Disabled" }.to_string());
        self
    }

    pub fn with_custom_domain(mut self, name: impl Into<String>, use_sub_domain_name: bool) -> Self {
        self.params.properties.custom_domain = Some(CustomDomain {
            name: name.into(),
            use_sub_domain_name: Some(use_sub_domain_name),
        });
        self
    }

    pub fn with_system_assigned_managed_service_identity(mut self) -> Self {
        self.params.identity = Some(ManagedIdentity::system_assigned());
        self
    }

    pub fn with_access_from_selected_networks(mut self) -> Self {
        self.network_mut().rules_mut().default_action = "Deny".into();
        self
    }

    pub fn with_access_from_all_networks(mut self) -> Self {
        self.network_mut().rules_mut().default_action = "Allow".into();
        self
    }

    pub fn with_access_from_ip_address(mut self, ip: impl Into<String>) -> Self {
        self.network_mut().add_ip_rule(ip.into());
        self
    }

    pub fn with_access_from_ip_address_range(mut self, cidr: impl Into<String>) -> Self {
        self.network_mut().add_ip_rule(cidr.into());
        self
    }

    pub fn without_ip_address_access(mut self, ip_or_cidr: &str) -> Self {
        self.network_mut()
            .rules_mut()
            .ip_rules
            .retain(|r| r.value != ip_or_cidr);
        self
    }

    pub fn with_access_from_network_subnet(mut self, subnet_id: impl Into<String>) -> Self {
        self.network_mut().add_subnet(subnet_id.into());
        self
    }

    pub fn without_network_subnet_access(mut self, subnet_id: &str) -> Self {
        self.network_mut()
            .rules_mut()
            .virtual_network_rules
            .retain(|r| !r.id.eq_ignore_ascii_case(subnet_id));
        self
    }

    pub fn with_access_from_azure_services(mut self, enabled: bool) -> Self {
        set_bypass(self.network_mut().rules_mut(), BYPASS_AZURE_SERVICES, enabled);
        self
    }

    pub fn with_read_access_to_log_entries_from_any_network(mut self, enabled: bool) -> Self {
        set_bypass(self.network_mut().rules_mut(), BYPASS_LOGGING, enabled);
        self
    }

    pub fn with_read_access_to_metrics_from_any_network(mut self, enabled: bool) -> Self {
        set_bypass(self.network_mut().rules_mut(), BYPASS_METRICS, enabled);
        self
    }

    /// The PATCH body as it would be sent.
    pub fn parameters(&self) -> StorageAccountUpdateParameters {
        let mut params = self.params.clone();
        if self.tags_changed {
            params.tags = Some(self.tags.clone());
        }
        params.properties.network_acls = self.network.rules.clone();
        params
    }
}

impl TaggableUpdate for StorageAccountUpdate {
    fn tags_mut(&mut self) -> &mut HashMap<String, String> {
        self.tags_changed = true;
        &mut self.tags
    }
}

#[async_trait]
impl Appliable for StorageAccountUpdate {
    type Output = StorageAccount;

    async fn apply(self) -> AzureResult<StorageAccount> {
        let params = self.parameters();
        let inner = update_storage_account(&self.client, &self.resource_group, &self.name, &params).await?;
        info!("Updated storage account {}/{}", self.resource_group, self.name);
        Ok(StorageAccount::new(inner, self.client))
    }
}

// ─── Collection ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct StorageAccounts {
    client: Arc<AzureClient>,
}

impl StorageAccounts {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    fn wrap(&self, inner: StorageAccountInner) -> StorageAccount {
        StorageAccount::new(inner, self.client.clone())
    }

    pub fn define(&self, name: impl Into<String>) -> StorageAccountDefinition {
        StorageAccountDefinition::new(name.into(), self.client.clone())
    }

    pub async fn check_name_availability(&self, name: &str) -> AzureResult<NameAvailability> {
        check_name_availability(&self.client, name).await
    }

    pub async fn get_keys(&self, resource_group: &str, name: &str) -> AzureResult<Vec<StorageAccountKey>> {
        list_keys(&self.client, resource_group, name).await
    }

    pub async fn regenerate_key(
        &self,
        resource_group: &str,
        name: &str,
        key_name: &str,
    ) -> AzureResult<Vec<StorageAccountKey>> {
        regenerate_key(&self.client, resource_group, name, key_name).await
    }
}

#[async_trait]
impl SupportsListing for StorageAccounts {
    type Item = StorageAccount;

    async fn list(&self) -> AzureResult<Vec<StorageAccount>> {
        Ok(list_storage_accounts(&self.client)
            .await?
            .into_iter()
            .map(|inner| self.wrap(inner))
            .collect())
    }
}

#[async_trait]
impl SupportsListingByResourceGroup for StorageAccounts {
    type Item = StorageAccount;

    async fn list_by_resource_group(&self, resource_group: &str) -> AzureResult<Vec<StorageAccount>> {
        Ok(list_storage_accounts_by_resource_group(&self.client, resource_group)
            .await?
            .into_iter()
            .map(|inner| self.wrap(inner))
            .collect())
    }
}

#[async_trait]
impl SupportsGettingByResourceGroup for StorageAccounts {
    type Item = StorageAccount;

    async fn get_by_resource_group(&self, resource_group: &str, name: &str) -> AzureResult<StorageAccount> {
        Ok(self.wrap(get_storage_account(&self.client, resource_group, name).await?))
    }
}

#[async_trait]
impl SupportsDeletingByResourceGroup for StorageAccounts {
    async fn delete_by_resource_group(&self, resource_group: &str, name: &str) -> AzureResult<()> {
        delete_storage_account(&self.client, resource_group, name).await?;
        info!("Deleted storage account {}/{}", resource_group, name);
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
    use serde_json::json;
    use wiremock::matchers::{body_json, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ACCT_PATH: &str =
        "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Storage/storageAccounts/acct1";

    fn account_json() -> serde_json::Value {
        json!({
            "id": ACCT_PATH, "name": "acct1", "location": "westus",
            "kind": "Storage",
            "sku": {"name": "Standard_LRS"},
            "properties": {
                "provisioningState": "Succeeded",
                "supportsHttpsTrafficOnly": true,
                "networkAcls": {
                    "defaultAction": "Deny",
                    "bypass": "AzureServices",
                    "ipRules": [{"value": "10.0.0.1", "action": "Allow"}]
                }
            }
        })
    }

    #[test]
    fn name_rules() {
        assert!(validate_storage_account_name("abc123").is_ok());
        assert!(validate_storage_account_name("ab").is_err());
        assert!(validate_storage_account_name("Upper").is_err());
        assert!(validate_storage_account_name("with-dash").is_err());
        assert!(validate_storage_account_name(&"a".repeat(25)).is_err());
    }

    #[test]
    fn bypass_editing() {
        let mut rules = NetworkRuleSet::default();
        set_bypass(&mut rules, BYPASS_LOGGING, true);
        assert_eq!(rules.bypass.as_deref(), Some("AzureServices, Logging"));
        set_bypass(&mut rules, BYPASS_AZURE_SERVICES, false);
        set_bypass(&mut rules, BYPASS_LOGGING, false);
        assert_eq!(rules.bypass.as_deref(), Some("None"));
    }

    #[tokio::test]
    async fn invalid_name_rejected_before_request() {
        let server = MockServer::start().await;
        let err = StorageAccounts::new(mock_client(&server))
            .define("Bad_Name")
            .with_region(Region::US_WEST)
            .with_existing_resource_group("rg1")
            .create()
            .await
            .unwrap_err();
        assert_eq!(err.kind, AzureErrorKind::Validation);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_with_defaults_and_network_rules() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(ACCT_PATH))
            .and(body_partial_json(json!({
                "location": "westus",
                "kind": "StorageV2",
                "sku": {"name": "Standard_RAGRS"},
                "properties": {
                    "supportsHttpsTrafficOnly": true,
                    "minimumTlsVersion": "TLS1_2",
                    "isHnsEnabled": true,
                    "networkAcls": {
                        "defaultAction": "Deny",
                        "bypass": "AzureServices, Metrics",
                        "ipRules": [{"value": "10.0.0.0/24", "action": "Allow"}]
                    }
                }
            })))
            .respond_with(ResponseTemplate::new(202).insert_header(
                "Location",
                format!("{}/subscriptions/sub1/providers/Microsoft.Storage/operations/op1", server.uri()),
            ))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/subscriptions/sub1/providers/Microsoft.Storage/operations/op1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(account_json()))
            .mount(&server)
            .await;

        let def = StorageAccounts::new(mock_client(&server))
            .define("acct1")
            .with_region(Region::US_WEST)
            .with_existing_resource_group("rg1")
            .with_hns_enabled(true)
            .with_access_from_selected_networks()
            .with_access_from_ip_address_range("10.0.0.0/24")
            .with_read_access_to_metrics_from_any_network(true);
        assert_eq!(def.sku(), StorageSkuName::StandardRagrs);
        assert_eq!(def.network_rules().unwrap().default_action, "Deny");

        let account = def.create().await.unwrap();
        assert_eq!(account.name(), "acct1");
        assert!(!account.is_access_allowed_from_all_networks());
        assert!(account.can_access_from_azure_services());
        assert!(!account.can_read_log_entries_from_any_network());
        assert_eq!(account.ip_rules(), vec!["10.0.0.1"]);
    }

    #[tokio::test]
    async fn update_upgrades_kind_and_keeps_existing_ip_rules() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ACCT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(account_json()))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path(ACCT_PATH))
            .and(body_partial_json(json!({
                "kind": "StorageV2",
                "tags": {"env": "prod"},
                "properties": {
                    "accessTier": "Cool",
                    "networkAcls": {"ipRules": [
                        {"value": "10.0.0.1", "action": "Allow"},
                        {"value": "20.0.0.1", "action": "Allow"}
                    ]}
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(account_json()))
            .expect(1)
            .mount(&server)
            .await;

        let accounts = StorageAccounts::new(mock_client(&server));
        let account = accounts.get_by_resource_group("rg1", "acct1").await.unwrap();
        account
            .update()
            .upgrade_to_general_purpose_account_kind_v2()
            .with_access_tier(AccessTier::Cool)
            .with_access_from_ip_address("20.0.0.1")
            .with_tag("env", "prod")
            .apply()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn untouched_update_sends_empty_patch() {
        let server = MockServer::start().await;
        let account = StorageAccount::new(
            serde_json::from_value(account_json()).unwrap(),
            mock_client(&server),
        );
        let params = account.update().parameters();
        assert_eq!(serde_json::to_value(&params).unwrap(), json!({}));
    }

    #[tokio::test]
    async fn keys_and_regeneration() {
        let server = MockServer::start().await;
        let keys = json!({"keys": [
            {"keyName": "key1", "value": "AAA", "permissions": "FULL"},
            {"keyName": "key2", "value": "BBB", "permissions": "FULL"}
        ]});
        Mock::given(method("POST"))
            .and(path(format!("{ACCT_PATH}/listKeys")))
            .respond_with(ResponseTemplate::new(200).set_body_json(keys.clone()))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("{ACCT_PATH}/regenerateKey")))
            .and(body_json(json!({"keyName": "key1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(keys))
            .expect(1)
            .mount(&server)
            .await;

        let accounts = StorageAccounts::new(mock_client(&server));
        let listed = accounts.get_keys("rg1", "acct1").await.unwrap();
        assert_eq!(listed[1].value, "BBB");
        accounts.regenerate_key("rg1", "acct1", "key1").await.unwrap();
    }

    #[tokio::test]
    async fn name_availability() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/subscriptions/sub1/providers/Microsoft.Storage/checkNameAvailability"))
            .and(body_json(json!({"name": "taken1", "type": "Microsoft.Storage/storageAccounts"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "nameAvailable": false, "reason": "AlreadyExists", "message": "taken"
            })))
            .mount(&server)
            .await;

        let result = StorageAccounts::new(mock_client(&server))
            .check_name_availability("taken1")
            .await
            .unwrap();
        assert!(!result.name_available);
        assert_eq!(result.reason.as_deref(), Some("AlreadyExists"));
    }
}
