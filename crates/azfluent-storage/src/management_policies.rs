//! Lifecycle management policy of a storage account.
//!
//! Each account has at most one policy, always named `default`. A policy
//! holds named rules that move or delete blobs after a number of days.

use std::sync::Arc;

use azfluent_core::fluent::{Appliable, Creatable, Refreshable};
use azfluent_core::types::{require, AzureError, AzureResult};
use azfluent_core::{async_trait, AzureClient};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::types::{
    DateAfterCreation, DateAfterModification, ManagementPolicyAction, ManagementPolicyBaseBlob,
    ManagementPolicyDefinitionBody, ManagementPolicyFilter, ManagementPolicyInner,
    ManagementPolicyProperties, ManagementPolicyRule, ManagementPolicySchema, ManagementPolicySnapShot,
};

const POLICY_NAME: &str = "default";
const RULE_TYPE: &str = "Lifecycle";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BlobTypes {
    #[serde(rename = "blockBlob")]
    BlockBlob,
    #[serde(rename = "appendBlob")]
    AppendBlob,
}

impl BlobTypes {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlockBlob => "blockBlob",
            Self::AppendBlob => "appendBlob",
        }
    }
}

// ─── REST operations ────────────────────────────────────────────────

fn policy_url(client: &AzureClient, resource_group: &str, account_name: &str) -> AzureResult<String> {
    require("resourceGroupName", resource_group)?;
    require("accountName", account_name)?;
    client.resource_group_url(
        resource_group,
        &format!(
            "/providers/Microsoft.Storage/storageAccounts/{}/managementPolicies/{}?api-version={}",
            account_name,
            POLICY_NAME,
            client.config().api_version_storage
        ),
    )
}

pub async fn get_management_policy(
    client: &AzureClient,
    resource_group: &str,
    account_name: &str,
) -> AzureResult<ManagementPolicyInner> {
    let url = policy_url(client, resource_group, account_name)?;
    debug!("get_management_policy({}/{}) → {}", resource_group, account_name, url);
    client.get_json(&url).await
}

pub async fn create_or_update_management_policy(
    client: &AzureClient,
    resource_group: &str,
    account_name: &str,
    policy: &ManagementPolicySchema,
) -> AzureResult<ManagementPolicyInner> {
    let url = policy_url(client, resource_group, account_name)?;
    debug!("create_or_update_management_policy({}/{}) → {}", resource_group, account_name, url);
    let body = ManagementPolicyInner {
        properties: ManagementPolicyProperties {
            last_modified_time: None,
            policy: policy.clone(),
        },
        ..Default::default()
    };
    client.put_json(&url, &body).await
}

pub async fn delete_management_policy(client: &AzureClient, resource_group: &str, account_name: &str) -> AzureResult<()> {
    let url = policy_url(client, resource_group, account_name)?;
    debug!("delete_management_policy({}/{}) → {}", resource_group, account_name, url);
    client.delete(&url).await
}

// ─── Rules ──────────────────────────────────────────────────────────

/// Builder for one lifecycle rule.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyRule {
    name: String,
    enabled: bool,
    blob_types: Vec<BlobTypes>,
    prefixes: Vec<String>,
    base_blob: ManagementPolicyBaseBlob,
    snapshot: ManagementPolicySnapShot,
}

impl PolicyRule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            blob_types: Vec::new(),
            prefixes: Vec::new(),
            base_blob: ManagementPolicyBaseBlob::default(),
            snapshot: ManagementPolicySnapShot::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_blob_type_to_filter_for(mut self, blob_type: BlobTypes) -> Self {
        if !self.blob_types.contains(&blob_type) {
            self.blob_types.push(blob_type);
        }
        self
    }

    pub fn with_prefix_to_filter_for(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    pub fn without_prefixes_to_filter_for(mut self) -> Self {
        self.prefixes.clear();
        self
    }

    pub fn with_tier_to_cool_action(mut self, days_after_modification: f64) -> Self {
        self.base_blob.tier_to_cool = Some(after_modification(days_after_modification));
        self
    }

    pub fn with_tier_to_archive_action(mut self, days_after_modification: f64) -> Self {
        self.base_blob.tier_to_archive = Some(after_modification(days_after_modification));
        self
    }

    pub fn with_delete_action(mut self, days_after_modification: f64) -> Self {
        self.base_blob.delete = Some(after_modification(days_after_modification));
        self
    }

    pub fn with_snapshot_delete_action(mut self, days_after_creation: f64) -> Self {
        self.snapshot.delete = Some(DateAfterCreation {
            days_after_creation_greater_than: days_after_creation,
        });
        self
    }

    fn has_base_blob_action(&self) -> bool {
        self.base_blob != ManagementPolicyBaseBlob::default()
    }

    fn has_snapshot_action(&self) -> bool {
        self.snapshot != ManagementPolicySnapShot::default()
    }

    /// Wire form; a rule must carry at least one action. Blob types
    /// default to `blockBlob`.
    pub fn to_rule(&self) -> AzureResult<ManagementPolicyRule> {
        require("ruleName", &self.name)?;
        if !self.has_base_blob_action() && !self.has_snapshot_action() {
            return Err(AzureError::validation(format!(
                "Rule {} must define at least one action on the base blob or its snapshots",
                self.name
            )));
        }
        let blob_types = if self.blob_types.is_empty() {
            vec![BlobTypes::BlockBlob.as_str().to_string()]
        } else {
            self.blob_types.iter().map(|t| t.as_str().to_string()).collect()
        };
        Ok(ManagementPolicyRule {
            name: self.name.clone(),
            enabled: Some(self.enabled),
            rule_type: RULE_TYPE.into(),
            definition: ManagementPolicyDefinitionBody {
                actions: ManagementPolicyAction {
                    base_blob: self.has_base_blob_action().then(|| self.base_blob.clone()),
                    snapshot: self.has_snapshot_action().then(|| self.snapshot.clone()),
                },
                filters: Some(ManagementPolicyFilter {
                    prefix_match: self.prefixes.clone(),
                    blob_types,
                }),
            },
        })
    }
}

fn after_modification(days: f64) -> DateAfterModification {
    DateAfterModification {
        days_after_modification_greater_than: days,
    }
}

fn build_schema(rules: &[PolicyRule]) -> AzureResult<ManagementPolicySchema> {
    if rules.is_empty() {
        return Err(AzureError::validation("A management policy requires at least one rule"));
    }
    let mut built = Vec::with_capacity(rules.len());
    for rule in rules {
        if built.iter().any(|r: &ManagementPolicyRule| r.name == rule.name) {
            return Err(AzureError::validation(format!("Duplicate policy rule name {}", rule.name)));
        }
        built.push(rule.to_rule()?);
    }
    Ok(ManagementPolicySchema { rules: built })
}

// ─── Fluent wrapper ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ManagementPolicy {
    inner: ManagementPolicyInner,
    resource_group: String,
    account_name: String,
    client: Arc<AzureClient>,
}

impl ManagementPolicy {
    fn new(inner: ManagementPolicyInner, resource_group: String, account_name: String, client: Arc<AzureClient>) -> Self {
        Self {
            inner,
            resource_group,
            account_name,
            client,
        }
    }

    pub fn inner(&self) -> &ManagementPolicyInner {
        &self.inner
    }

    pub fn id(&self) -> &str {
        self.inner.id.as_deref().unwrap_or_default()
    }

    pub fn storage_account_name(&self) -> &str {
        &self.account_name
    }

    pub fn resource_group_name(&self) -> &str {
        &self.resource_group
    }

    pub fn last_modified_time(&self) -> Option<&str> {
        self.inner.properties.last_modified_time.as_deref()
    }

    pub fn rules(&self) -> &[ManagementPolicyRule] {
        &self.inner.properties.policy.rules
    }

    pub fn update(&self) -> ManagementPolicyUpdate {
        ManagementPolicyUpdate {
            resource_group: self.resource_group.clone(),
            account_name: self.account_name.clone(),
            rules: self.inner.properties.policy.rules.clone(),
            client: self.client.clone(),
        }
    }
}

#[async_trait]
impl Refreshable for ManagementPolicy {
    async fn refresh(&mut self) -> AzureResult<()> {
        self.inner = get_management_policy(&self.client, &self.resource_group, &self.account_name).await?;
        Ok(())
    }
}

// ─── Definition ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ManagementPolicyDefinition {
    resource_group: Option<String>,
    account_name: Option<String>,
    rules: Vec<PolicyRule>,
    client: Arc<AzureClient>,
}

impl ManagementPolicyDefinition {
    pub fn with_existing_storage_account(
        mut self,
        resource_group: impl Into<String>,
        account_name: impl Into<String>,
    ) -> Self {
        self.resource_group = Some(resource_group.into());
        self.account_name = Some(account_name.into());
        self
    }

    pub fn with_rule(mut self, rule: PolicyRule) -> Self {
        self.rules.push(rule);
        self
    }
}

#[async_trait]
impl Creatable for ManagementPolicyDefinition {
    type Output = ManagementPolicy;

    async fn create(self) -> AzureResult<ManagementPolicy> {
        let rg = self
            .resource_group
            .ok_or_else(|| AzureError::required("resourceGroupName"))?;
        let account = self.account_name.ok_or_else(|| AzureError::required("accountName"))?;
        let schema = build_schema(&self.rules)?;
        let inner = create_or_update_management_policy(&self.client, &rg, &account, &schema).await?;
        info!("Created management policy on {}/{} with {} rule(s)", rg, account, schema.rules.len());
        Ok(ManagementPolicy::new(inner, rg, account, self.client))
    }
}

// ─── Update ─────────────────────────────────────────────────────────

/// Rewrites the rule list and PUTs the whole policy back.
#[derive(Debug, Clone)]
pub struct ManagementPolicyUpdate {
    resource_group: String,
    account_name: String,
    rules: Vec<ManagementPolicyRule>,
    client: Arc<AzureClient>,
}

impl ManagementPolicyUpdate {
    /// Adds the rule, replacing one with the same name.
    pub fn with_rule(mut self, rule: &PolicyRule) -> AzureResult<Self> {
        let built = rule.to_rule()?;
        self.rules.retain(|r| r.name != built.name);
        self.rules.push(built);
        Ok(self)
    }

    pub fn without_rule(mut self, name: &str) -> Self {
        self.rules.retain(|r| r.name != name);
        self
    }
}

#[async_trait]
impl Appliable for ManagementPolicyUpdate {
    type Output = ManagementPolicy;

    async fn apply(self) -> AzureResult<ManagementPolicy> {
        if self.rules.is_empty() {
            return Err(AzureError::validation("A management policy requires at least one rule"));
        }
        let schema = ManagementPolicySchema { rules: self.rules };
        let inner =
            create_or_update_management_policy(&self.client, &self.resource_group, &self.account_name, &schema).await?;
        info!("Updated management policy on {}/{}", self.resource_group, self.account_name);
        Ok(ManagementPolicy::new(inner, self.resource_group, self.account_name, self.client))
    }
}

// ─── Collection ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ManagementPolicies {
    client: Arc<AzureClient>,
}

impl ManagementPolicies {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    pub fn define(&self) -> ManagementPolicyDefinition {
        ManagementPolicyDefinition {
            resource_group: None,
            account_name: None,
            rules: Vec::new(),
            client: self.client.clone(),
        }
    }

    pub async fn get(&self, resource_group: &str, account_name: &str) -> AzureResult<ManagementPolicy> {
        let inner = get_management_policy(&self.client, resource_group, account_name).await?;
        Ok(ManagementPolicy::new(
            inner,
            resource_group.to_string(),
            account_name.to_string(),
            self.client.clone(),
        ))
    }

    pub async fn delete(&self, resource_group: &str, account_name: &str) -> AzureResult<()> {
        delete_management_policy(&self.client, resource_group, account_name).await?;
        info!("Deleted management policy on {}/{}", resource_group, account_name);
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use azfluent_core::test_utils::mock_client;
    use azfluent_core::types::AzureErrorKind;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const POLICY_PATH: &str = "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Storage/storageAccounts/acct1/managementPolicies/default";

    fn archive_rule() -> PolicyRule {
        PolicyRule::new("archive-logs")
            .with_prefix_to_filter_for("logs/")
            .with_tier_to_cool_action(30.0)
            .with_tier_to_archive_action(90.0)
            .with_delete_action(365.0)
    }

    fn policy_json(rules: serde_json::Value) -> serde_json::Value {
        json!({
            "id": POLICY_PATH, "name": "DefaultManagementPolicy",
            "properties": {"lastModifiedTime": "2024-01-01T00:00:00Z", "policy": {"rules": rules}}
        })
    }

    #[test]
    fn rule_defaults_to_block_blobs() {
        let rule = archive_rule().to_rule().unwrap();
        assert_eq!(rule.rule_type, "Lifecycle");
        let filters = rule.definition.filters.unwrap();
        assert_eq!(filters.blob_types, vec!["blockBlob"]);
        assert_eq!(filters.prefix_match, vec!["logs/"]);
        assert!(rule.definition.actions.snapshot.is_none());
    }

    #[test]
    fn rule_without_actions_is_rejected() {
        let err = PolicyRule::new("empty")
            .with_blob_type_to_filter_for(BlobTypes::AppendBlob)
            .to_rule()
            .unwrap_err();
        assert_eq!(err.kind, AzureErrorKind::Validation);
    }

    #[test]
    fn duplicate_rule_names_rejected() {
        let err = build_schema(&[archive_rule(), archive_rule()]).unwrap_err();
        assert!(err.message.contains("Duplicate"));
    }

    #[tokio::test]
    async fn create_requires_rules() {
        let server = MockServer::start().await;
        let err = ManagementPolicies::new(mock_client(&server))
            .define()
            .with_existing_storage_account("rg1", "acct1")
            .create()
            .await
            .unwrap_err();
        assert_eq!(err.kind, AzureErrorKind::Validation);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_puts_policy() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(POLICY_PATH))
            .and(body_partial_json(json!({"properties": {"policy": {"rules": [{
                "name": "archive-logs",
                "enabled": true,
                "type": "Lifecycle",
                "definition": {
                    "actions": {"baseBlob": {
                        "tierToCool": {"daysAfterModificationGreaterThan": 30.0},
                        "tierToArchive": {"daysAfterModificationGreaterThan": 90.0},
                        "delete": {"daysAfterModificationGreaterThan": 365.0}
                    }},
                    "filters": {"prefixMatch": ["logs/"], "blobTypes": ["blockBlob"]}
                }
            }]}}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(policy_json(json!([]))))
            .expect(1)
            .mount(&server)
            .await;

        let policy = ManagementPolicies::new(mock_client(&server))
            .define()
            .with_existing_storage_account("rg1", "acct1")
            .with_rule(archive_rule())
            .create()
            .await
            .unwrap();
        assert_eq!(policy.last_modified_time(), Some("2024-01-01T00:00:00Z"));
    }

    #[tokio::test]
    async fn update_replaces_rule_by_name() {
        let server = MockServer::start().await;
        let existing = json!([{
            "name": "archive-logs", "enabled": true, "type": "Lifecycle",
            "definition": {"actions": {"baseBlob": {"delete": {"daysAfterModificationGreaterThan": 10.0}}}}
        }]);
        Mock::given(method("GET"))
            .and(path(POLICY_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(policy_json(existing)))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(POLICY_PATH))
            .and(body_partial_json(json!({"properties": {"policy": {"rules": [
                {"name": "archive-logs", "definition": {"actions": {"snapshot": {
                    "delete": {"daysAfterCreationGreaterThan": 7.0}
                }}}}
            ]}}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(policy_json(json!([]))))
            .expect(1)
            .mount(&server)
            .await;

        let policies = ManagementPolicies::new(mock_client(&server));
        let policy = policies.get("rg1", "acct1").await.unwrap();
        assert_eq!(policy.rules().len(), 1);
        policy
            .update()
            .with_rule(&PolicyRule::new("archive-logs").with_snapshot_delete_action(7.0))
            .unwrap()
            .apply()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_removing_last_rule_fails() {
        let server = MockServer::start().await;
        let policy = ManagementPolicy::new(
            serde_json::from_value(policy_json(json!([]))).unwrap(),
            "rg1".into(),
            "acct1".into(),
            mock_client(&server),
        );
        let err = policy.update().without_rule("archive-logs").apply().await.unwrap_err();
        assert_eq!(err.kind, AzureErrorKind::Validation);
    }
}
