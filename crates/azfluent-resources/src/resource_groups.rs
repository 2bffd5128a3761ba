//! Azure Resource Groups – list, get, contains, define/create, update tags,
//! delete, export template.

use std::collections::HashMap;
use std::sync::Arc;

use azfluent_core::fluent::{Appliable, Creatable, Refreshable, SupportsListing, TaggableUpdate};
use azfluent_core::types::{require, AzureError, AzureResult};
use azfluent_core::{async_trait, impl_groupable_resource, AzureClient, Region};
use log::{debug, info};
use serde_json::json;

use crate::types::{ExportTemplateResult, ResourceGroupInner};

// ─── REST operations ────────────────────────────────────────────────

fn group_url(client: &AzureClient, name: &str) -> AzureResult<String> {
    require("resourceGroupName", name)?;
    client.subscription_url(&format!(
        "/resourcegroups/{}?api-version={}",
        name,
        client.config().api_version_resources
    ))
}

/// List all resource groups in the subscription.
pub async fn list_resource_groups(client: &AzureClient) -> AzureResult<Vec<ResourceGroupInner>> {
    let url = client.subscription_url(&format!(
        "/resourcegroups?api-version={}",
        client.config().api_version_resources
    ))?;
    debug!("list_resource_groups → {}", url);
    client.get_all_pages(&url).await
}

/// Get a single resource group by name.
pub async fn get_resource_group(client: &AzureClient, name: &str) -> AzureResult<ResourceGroupInner> {
    let url = group_url(client, name)?;
    debug!("get_resource_group({}) → {}", name, url);
    client.get_json(&url).await
}

/// HEAD existence check.
pub async fn check_existence(client: &AzureClient, name: &str) -> AzureResult<bool> {
    let url = group_url(client, name)?;
    debug!("check_existence({}) → {}", name, url);
    client.head_exists(&url).await
}

/// Create or update a resource group.
pub async fn create_or_update_resource_group(
    client: &AzureClient,
    name: &str,
    parameters: &ResourceGroupInner,
) -> AzureResult<ResourceGroupInner> {
    let url = group_url(client, name)?;
    if parameters.location.as_deref().unwrap_or("").is_empty() {
        return Err(AzureError::required("parameters.location"));
    }
    debug!("create_or_update_resource_group({}) → {}", name, url);
    client.put_json(&url, parameters).await
}

/// Update resource group tags.
pub async fn update_resource_group_tags(
    client: &AzureClient,
    name: &str,
    tags: &HashMap<String, String>,
) -> AzureResult<ResourceGroupInner> {
    let url = group_url(client, name)?;
    debug!("update_resource_group_tags({}) → {}", name, url);
    client.patch_json(&url, &json!({ "tags": tags })).await
}

/// Delete a resource group (and all its resources).
pub async fn delete_resource_group(client: &AzureClient, name: &str) -> AzureResult<()> {
    let url = group_url(client, name)?;
    debug!("delete_resource_group({}) → {}", name, url);
    client.delete(&url).await
}

/// Export the ARM template for a resource group.
pub async fn export_template(client: &AzureClient, name: &str) -> AzureResult<ExportTemplateResult> {
    require("resourceGroupName", name)?;
    let url = client.subscription_url(&format!(
        "/resourcegroups/{}/exportTemplate?api-version={}",
        name,
        client.config().api_version_resources
    ))?;
    debug!("export_template({}) → {}", name, url);
    let body = json!({ "resources": ["*"], "options": "IncludeParameterDefaultValue" });
    client.post_json(&url, &body).await
}

// ─── Fluent wrapper ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ResourceGroup {
    inner: ResourceGroupInner,
    client: Arc<AzureClient>,
}

impl_groupable_resource!(ResourceGroup, ResourceGroupInner);

impl ResourceGroup {
    pub(crate) fn new(inner: ResourceGroupInner, client: Arc<AzureClient>) -> Self {
        Self { inner, client }
    }

    pub fn provisioning_state(&self) -> Option<&str> {
        self.inner
            .properties
            .as_ref()
            .and_then(|p| p.provisioning_state.as_deref())
    }

    pub fn managed_by(&self) -> Option<&str> {
        self.inner.managed_by.as_deref()
    }

    pub fn update(&self) -> ResourceGroupUpdate {
        ResourceGroupUpdate {
            name: self.inner.name.clone().unwrap_or_default(),
            tags: self.inner.tags.clone(),
            client: self.client.clone(),
        }
    }

    pub async fn export_template(&self) -> AzureResult<ExportTemplateResult> {
        export_template(&self.client, self.inner.name.as_deref().unwrap_or_default()).await
    }
}

#[async_trait]
impl Refreshable for ResourceGroup {
    async fn refresh(&mut self) -> AzureResult<()> {
        let name = self.inner.name.clone().unwrap_or_default();
        self.inner = get_resource_group(&self.client, &name).await?;
        Ok(())
    }
}

/// A resource group is its own placement, so it only takes a region and tags.
#[derive(Debug, Clone)]
pub struct ResourceGroupDefinition {
    name: String,
    region: Option<Region>,
    tags: HashMap<String, String>,
    client: Arc<AzureClient>,
}

impl ResourceGroupDefinition {
    pub fn with_region(mut self, region: impl Into<Region>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_tags(mut self, tags: HashMap<String, String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn region(&self) -> Option<&Region> {
        self.region.as_ref()
    }
}

#[async_trait]
impl Creatable for ResourceGroupDefinition {
    type Output = ResourceGroup;

    async fn create(self) -> AzureResult<ResourceGroup> {
        require("name", &self.name)?;
        let region = self.region.ok_or_else(|| AzureError::required("region"))?;
        let params = ResourceGroupInner {
            location: Some(region.name().to_string()),
            tags: self.tags,
            ..Default::default()
        };
        let inner = create_or_update_resource_group(&self.client, &self.name, &params).await?;
        info!("Created resource group {}", self.name);
        Ok(ResourceGroup::new(inner, self.client))
    }
}

#[derive(Debug, Clone)]
pub struct ResourceGroupUpdate {
    name: String,
    tags: HashMap<String, String>,
    client: Arc<AzureClient>,
}

impl TaggableUpdate for ResourceGroupUpdate {
    fn tags_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.tags
    }
}

#[async_trait]
impl Appliable for ResourceGroupUpdate {
    type Output = ResourceGroup;

    async fn apply(self) -> AzureResult<ResourceGroup> {
        let inner = update_resource_group_tags(&self.client, &self.name, &self.tags).await?;
        info!("Updated resource group {}", self.name);
        Ok(ResourceGroup::new(inner, self.client))
    }
}

// ─── Collection ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ResourceGroups {
    client: Arc<AzureClient>,
}

impl ResourceGroups {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    pub fn define(&self, name: impl Into<String>) -> ResourceGroupDefinition {
        ResourceGroupDefinition {
            name: name.into(),
            region: None,
            tags: HashMap::new(),
            client: self.client.clone(),
        }
    }

    pub async fn get(&self, name: &str) -> AzureResult<ResourceGroup> {
        let inner = get_resource_group(&self.client, name).await?;
        Ok(ResourceGroup::new(inner, self.client.clone()))
    }

    pub async fn contains(&self, name: &str) -> AzureResult<bool> {
        check_existence(&self.client, name).await
    }

    pub async fn delete(&self, name: &str) -> AzureResult<()> {
        delete_resource_group(&self.client, name).await?;
        info!("Deleted resource group {}", name);
        Ok(())
    }

    pub async fn export_template(&self, name: &str) -> AzureResult<ExportTemplateResult> {
        export_template(&self.client, name).await
    }
}

#[async_trait]
impl SupportsListing for ResourceGroups {
    type Item = ResourceGroup;

    async fn list(&self) -> AzureResult<Vec<ResourceGroup>> {
        let items = list_resource_groups(&self.client).await?;
        Ok(items
            .into_iter()
            .map(|inner| ResourceGroup::new(inner, self.client.clone()))
            .collect())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use azfluent_core::test_utils::mock_client;
    use azfluent_core::fluent::Resource;
    use azfluent_core::types::AzureErrorKind;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn rg_json(name: &str) -> serde_json::Value {
        json!({
            "id": format!("/subscriptions/sub1/resourceGroups/{name}"),
            "name": name,
            "type": "Microsoft.Resources/resourceGroups",
            "location": "westus",
            "tags": {"env": "dev"},
            "properties": {"provisioningState": "Succeeded"}
        })
    }

    #[tokio::test]
    async fn define_creates_group() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/subscriptions/sub1/resourcegroups/rg1"))
            .and(body_json(json!({"location": "westus", "tags": {"env": "dev"}})))
            .respond_with(ResponseTemplate::new(201).set_body_json(rg_json("rg1")))
            .expect(1)
            .mount(&server)
            .await;

        let groups = ResourceGroups::new(mock_client(&server));
        let rg = groups
            .define("rg1")
            .with_region("West US")
            .with_tag("env", "dev")
            .create()
            .await
            .unwrap();
        assert_eq!(rg.name(), "rg1");
        assert_eq!(rg.region(), Region::US_WEST);
        assert_eq!(rg.provisioning_state(), Some("Succeeded"));
    }

    #[tokio::test]
    async fn define_without_region_fails_before_network() {
        let server = MockServer::start().await;
        let groups = ResourceGroups::new(mock_client(&server));
        let err = groups.define("rg1").create().await.unwrap_err();
        assert_eq!(err.kind, AzureErrorKind::Validation);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let server = MockServer::start().await;
        let groups = ResourceGroups::new(mock_client(&server));
        let err = groups.get("").await.unwrap_err();
        assert_eq!(
            err.message,
            "Parameter resourceGroupName is required and cannot be null."
        );
    }

    #[tokio::test]
    async fn list_and_contains() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/subscriptions/sub1/resourcegroups"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [rg_json("a"), rg_json("b")]
            })))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/subscriptions/sub1/resourcegroups/a"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/subscriptions/sub1/resourcegroups/zz"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let groups = ResourceGroups::new(mock_client(&server));
        let all = groups.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].name(), "b");
        assert!(groups.contains("a").await.unwrap());
        assert!(!groups.contains("zz").await.unwrap());
    }

    #[tokio::test]
    async fn update_tags_patches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/subscriptions/sub1/resourcegroups/rg1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rg_json("rg1")))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/subscriptions/sub1/resourcegroups/rg1"))
            .and(body_json(json!({"tags": {"owner": "ops"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "/subscriptions/sub1/resourceGroups/rg1",
                "name": "rg1",
                "location": "westus",
                "tags": {"owner": "ops"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let groups = ResourceGroups::new(mock_client(&server));
        let rg = groups.get("rg1").await.unwrap();
        let updated = rg
            .update()
            .without_tag("env")
            .with_tag("owner", "ops")
            .apply()
            .await
            .unwrap();
        assert_eq!(updated.tags().get("owner").map(String::as_str), Some("ops"));
        assert!(!updated.tags().contains_key("env"));
    }

    #[tokio::test]
    async fn delete_waits_for_completion() {
        let server = MockServer::start().await;
        let monitor = format!("{}/operationresults/x", server.uri());
        Mock::given(method("DELETE"))
            .and(path("/subscriptions/sub1/resourcegroups/rg1"))
            .respond_with(ResponseTemplate::new(202).insert_header("Location", monitor.as_str()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/operationresults/x"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let groups = ResourceGroups::new(mock_client(&server));
        groups.delete("rg1").await.unwrap();
    }
}
