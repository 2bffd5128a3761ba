//! Generic resources – any ARM resource addressed by provider namespace,
//! resource type and name, with its properties kept as raw JSON.

use std::collections::HashMap;
use std::sync::Arc;

use azfluent_core::fluent::{
    Appliable, Creatable, GroupableDefinition, GroupableSpec, Refreshable, SupportsListing,
    SupportsListingByResourceGroup, TaggableUpdate,
};
use azfluent_core::types::{require, AzureError, AzureResult};
use azfluent_core::{async_trait, impl_groupable_resource, AzureClient, ResourceId};
use log::{debug, info};
use serde_json::Value;

use crate::providers::resolve_api_version;
use crate::types::{GenericResourceInner, Plan, ResourcesMoveInfo, Sku};

// ─── REST operations ────────────────────────────────────────────────

/// Coordinates of a resource below a resource group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceCoordinates {
    pub resource_group: String,
    pub provider_namespace: String,
    pub parent_resource_path: String,
    pub resource_type: String,
    pub name: String,
}

impl ResourceCoordinates {
    fn validate(&self) -> AzureResult<()> {
        require("resourceGroupName", &self.resource_group)?;
        require("resourceProviderNamespace", &self.provider_namespace)?;
        require("resourceType", &self.resource_type)?;
        require("resourceName", &self.name)
    }

    fn path(&self) -> String {
        let parent = self.parent_resource_path.trim_matches('/');
        if parent.is_empty() {
            format!(
                "/providers/{}/{}/{}",
                self.provider_namespace, self.resource_type, self.name
            )
        } else {
            format!(
                "/providers/{}/{}/{}/{}",
                self.provider_namespace, parent, self.resource_type, self.name
            )
        }
    }

    fn url(&self, client: &AzureClient, api_version: &str) -> AzureResult<String> {
        self.validate()?;
        require("apiVersion", api_version)?;
        client.resource_group_url(
            &self.resource_group,
            &format!("{}?api-version={}", self.path(), api_version),
        )
    }
}

fn id_url(client: &AzureClient, id: &str, api_version: &str) -> AzureResult<String> {
    require("resourceId", id)?;
    require("apiVersion", api_version)?;
    Ok(client.arm_url(&format!("{}?api-version={}", id, api_version)))
}

/// List all resources in the subscription.
pub async fn list_resources(client: &AzureClient) -> AzureResult<Vec<GenericResourceInner>> {
    let url = client.subscription_url(&format!(
        "/resources?api-version={}",
        client.config().api_version_resources
    ))?;
    debug!("list_resources → {}", url);
    client.get_all_pages(&url).await
}

/// List resources within a resource group.
pub async fn list_resources_by_resource_group(
    client: &AzureClient,
    resource_group: &str,
) -> AzureResult<Vec<GenericResourceInner>> {
    let url = client.resource_group_url(
        resource_group,
        &format!("/resources?api-version={}", client.config().api_version_resources),
    )?;
    debug!("list_resources_by_resource_group({}) → {}", resource_group, url);
    client.get_all_pages(&url).await
}

/// OData filter selecting resources by tag name and optional value.
pub fn tag_filter(tag_name: &str, tag_value: Option<&str>) -> String {
    match tag_value {
        Some(value) => format!("tagname eq '{tag_name}' and tagvalue eq '{value}'"),
        None => format!("tagname eq '{tag_name}'"),
    }
}

pub async fn list_resources_by_tag(
    client: &AzureClient,
    tag_name: &str,
    tag_value: Option<&str>,
) -> AzureResult<Vec<GenericResourceInner>> {
    require("tagName", tag_name)?;
    let base = client.subscription_url(&format!(
        "/resources?api-version={}",
        client.config().api_version_resources
    ))?;
    let url = AzureClient::with_query(&base, &[("$filter", &tag_filter(tag_name, tag_value))])?;
    debug!("list_resources_by_tag({}) → {}", tag_name, url);
    client.get_all_pages(&url).await
}

pub async fn get_resource(
    client: &AzureClient,
    at: &ResourceCoordinates,
    api_version: &str,
) -> AzureResult<GenericResourceInner> {
    let url = at.url(client, api_version)?;
    debug!("get_resource({}) → {}", at.name, url);
    client.get_json(&url).await
}

pub async fn get_resource_by_id(
    client: &AzureClient,
    id: &str,
    api_version: &str,
) -> AzureResult<GenericResourceInner> {
    let url = id_url(client, id, api_version)?;
    debug!("get_resource_by_id → {}", url);
    client.get_json(&url).await
}

pub async fn check_existence(
    client: &AzureClient,
    at: &ResourceCoordinates,
    api_version: &str,
) -> AzureResult<bool> {
    let url = at.url(client, api_version)?;
    client.head_exists(&url).await
}

pub async fn check_existence_by_id(client: &AzureClient, id: &str, api_version: &str) -> AzureResult<bool> {
    let url = id_url(client, id, api_version)?;
    client.head_exists(&url).await
}

pub async fn create_or_update_resource(
    client: &AzureClient,
    at: &ResourceCoordinates,
    api_version: &str,
    parameters: &GenericResourceInner,
) -> AzureResult<GenericResourceInner> {
    let url = at.url(client, api_version)?;
    debug!("create_or_update_resource({}) → {}", at.name, url);
    client.put_json(&url, parameters).await
}

pub async fn create_or_update_resource_by_id(
    client: &AzureClient,
    id: &str,
    api_version: &str,
    parameters: &GenericResourceInner,
) -> AzureResult<GenericResourceInner> {
    let url = id_url(client, id, api_version)?;
    debug!("create_or_update_resource_by_id → {}", url);
    client.put_json(&url, parameters).await
}

pub async fn delete_resource(
    client: &AzureClient,
    at: &ResourceCoordinates,
    api_version: &str,
) -> AzureResult<()> {
    let url = at.url(client, api_version)?;
    debug!("delete_resource({}) → {}", at.name, url);
    client.delete(&url).await
}

pub async fn delete_resource_by_id(client: &AzureClient, id: &str, api_version: &str) -> AzureResult<()> {
    let url = id_url(client, id, api_version)?;
    debug!("delete_resource_by_id → {}", url);
    client.delete(&url).await
}

/// Move resources from `source_resource_group` into another group
/// (given by full resource group id).
pub async fn move_resources(
    client: &AzureClient,
    source_resource_group: &str,
    info: &ResourcesMoveInfo,
) -> AzureResult<()> {
    require("sourceResourceGroupName", source_resource_group)?;
    require("targetResourceGroup", &info.target_resource_group)?;
    if info.resources.is_empty() {
        return Err(AzureError::required("resources"));
    }
    let url = client.resource_group_url(
        source_resource_group,
        &format!("/moveResources?api-version={}", client.config().api_version_resources),
    )?;
    debug!("move_resources({}) → {}", source_resource_group, url);
    let _: Value = client.post_json(&url, info).await?;
    Ok(())
}

// ─── Fluent wrapper ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GenericResource {
    inner: GenericResourceInner,
    api_version: String,
    client: Arc<AzureClient>,
}

impl_groupable_resource!(GenericResource, GenericResourceInner);

impl GenericResource {
    pub(crate) fn new(inner: GenericResourceInner, api_version: String, client: Arc<AzureClient>) -> Self {
        Self {
            inner,
            api_version,
            client,
        }
    }

    fn parsed_id(&self) -> Option<ResourceId> {
        self.inner.id.as_deref().and_then(|id| ResourceId::parse(id).ok())
    }

    pub fn resource_provider_namespace(&self) -> String {
        self.parsed_id()
            .and_then(|r| r.provider_namespace().map(str::to_string))
            .unwrap_or_default()
    }

    pub fn parent_resource_path(&self) -> String {
        self.parsed_id()
            .map(|r| r.parent_resource_path())
            .unwrap_or_default()
    }

    /// Leaf type segment, e.g. `sites`.
    pub fn resource_type_name(&self) -> String {
        self.parsed_id()
            .map(|r| r.resource_type().to_string())
            .unwrap_or_default()
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn properties(&self) -> Option<&Value> {
        self.inner.properties.as_ref()
    }

    pub fn plan(&self) -> Option<&Plan> {
        self.inner.plan.as_ref()
    }

    pub fn sku(&self) -> Option<&Sku> {
        self.inner.sku.as_ref()
    }

    pub fn kind(&self) -> Option<&str> {
        self.inner.kind.as_deref()
    }

    pub fn update(&self) -> GenericResourceUpdate {
        GenericResourceUpdate {
            inner: self.inner.clone(),
            api_version: self.api_version.clone(),
            client: self.client.clone(),
        }
    }
}

#[async_trait]
impl Refreshable for GenericResource {
    async fn refresh(&mut self) -> AzureResult<()> {
        let id = self.inner.id.clone().unwrap_or_default();
        self.inner = get_resource_by_id(&self.client, &id, &self.api_version).await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct GenericResourceDefinition {
    spec: GroupableSpec,
    provider_namespace: String,
    resource_type: String,
    parent_resource_path: String,
    api_version: Option<String>,
    properties: Option<Value>,
    plan: Option<Plan>,
    sku: Option<Sku>,
    kind: Option<String>,
    client: Arc<AzureClient>,
}

impl GroupableDefinition for GenericResourceDefinition {
    fn spec_mut(&mut self) -> &mut GroupableSpec {
        &mut self.spec
    }
}

impl GenericResourceDefinition {
    pub fn with_provider_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.provider_namespace = namespace.into();
        self
    }

    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = resource_type.into();
        self
    }

    pub fn with_parent_resource_path(mut self, path: impl Into<String>) -> Self {
        self.parent_resource_path = path.into();
        self
    }

    /// Skips the provider lookup that otherwise picks the api-version.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    pub fn with_properties(mut self, properties: Value) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn with_plan(
        mut self,
        name: impl Into<String>,
        publisher: impl Into<String>,
        product: impl Into<String>,
        promotion_code: Option<String>,
        version: Option<String>,
    ) -> Self {
        self.plan = Some(Plan {
            name: Some(name.into()),
            publisher: Some(publisher.into()),
            product: Some(product.into()),
            promotion_code,
            version,
        });
        self
    }

    pub fn with_sku(mut self, sku: Sku) -> Self {
        self.sku = Some(sku);
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn spec(&self) -> &GroupableSpec {
        &self.spec
    }

    fn coordinates(&self) -> AzureResult<ResourceCoordinates> {
        Ok(ResourceCoordinates {
            resource_group: self.spec.resource_group()?.to_string(),
            provider_namespace: self.provider_namespace.clone(),
            parent_resource_path: self.parent_resource_path.clone(),
            resource_type: self.resource_type.clone(),
            name: self.spec.name.clone(),
        })
    }
}

#[async_trait]
impl Creatable for GenericResourceDefinition {
    type Output = GenericResource;

    async fn create(self) -> AzureResult<GenericResource> {
        self.spec.validate()?;
        let at = self.coordinates()?;
        at.validate()?;
        let properties = self
            .properties
            .clone()
            .ok_or_else(|| AzureError::required("properties"))?;

        self.spec.ensure_resource_group(&self.client).await?;

        let api_version = match &self.api_version {
            Some(v) => v.clone(),
            None => {
                let sub = self.client.subscription_id()?;
                let candidate_id = format!(
                    "/subscriptions/{}/resourceGroups/{}{}",
                    sub,
                    at.resource_group,
                    at.path()
                );
                resolve_api_version(&self.client, &candidate_id).await?
            }
        };

        let params = GenericResourceInner {
            location: Some(self.spec.region_name()?),
            tags: self.spec.tags.clone(),
            kind: self.kind.clone(),
            plan: self.plan.clone(),
            sku: self.sku.clone(),
            properties: Some(properties),
            ..Default::default()
        };
        let inner = create_or_update_resource(&self.client, &at, &api_version, &params).await?;
        info!("Created {}/{} {}", at.provider_namespace, at.resource_type, at.name);
        Ok(GenericResource::new(inner, api_version, self.client))
    }
}

/// PUTs the whole modified model back.
#[derive(Debug, Clone)]
pub struct GenericResourceUpdate {
    inner: GenericResourceInner,
    api_version: String,
    client: Arc<AzureClient>,
}

impl GenericResourceUpdate {
    pub fn with_properties(mut self, properties: Value) -> Self {
        self.inner.properties = Some(properties);
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_sku(mut self, sku: Sku) -> Self {
        self.inner.sku = Some(sku);
        self
    }

    pub fn without_plan(mut self) -> Self {
        self.inner.plan = None;
        self
    }
}

impl TaggableUpdate for GenericResourceUpdate {
    fn tags_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.inner.tags
    }
}

#[async_trait]
impl Appliable for GenericResourceUpdate {
    type Output = GenericResource;

    async fn apply(self) -> AzureResult<GenericResource> {
        let id = self.inner.id.clone().unwrap_or_default();
        let inner =
            create_or_update_resource_by_id(&self.client, &id, &self.api_version, &self.inner).await?;
        info!("Updated resource {}", id);
        Ok(GenericResource::new(inner, self.api_version, self.client))
    }
}

// ─── Collection ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GenericResources {
    client: Arc<AzureClient>,
}

impl GenericResources {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    fn wrap(&self, inner: GenericResourceInner, api_version: &str) -> GenericResource {
        GenericResource::new(inner, api_version.to_string(), self.client.clone())
    }

    pub fn define(&self, name: impl Into<String>) -> GenericResourceDefinition {
        GenericResourceDefinition {
            spec: GroupableSpec::new(name),
            provider_namespace: String::new(),
            resource_type: String::new(),
            parent_resource_path: String::new(),
            api_version: None,
            properties: None,
            plan: None,
            sku: None,
            kind: None,
            client: self.client.clone(),
        }
    }

    pub async fn list_by_tag(&self, tag_name: &str, tag_value: Option<&str>) -> AzureResult<Vec<GenericResource>> {
        let api = self.client.config().api_version_resources.clone();
        Ok(list_resources_by_tag(&self.client, tag_name, tag_value)
            .await?
            .into_iter()
            .map(|inner| self.wrap(inner, &api))
            .collect())
    }

    pub async fn get(&self, at: &ResourceCoordinates, api_version: &str) -> AzureResult<GenericResource> {
        let inner = get_resource(&self.client, at, api_version).await?;
        Ok(self.wrap(inner, api_version))
    }

    /// Looks up the api-version through the provider first.
    pub async fn get_by_id(&self, id: &str) -> AzureResult<GenericResource> {
        let api_version = resolve_api_version(&self.client, id).await?;
        let inner = get_resource_by_id(&self.client, id, &api_version).await?;
        Ok(self.wrap(inner, &api_version))
    }

    pub async fn check_existence(&self, at: &ResourceCoordinates, api_version: &str) -> AzureResult<bool> {
        check_existence(&self.client, at, api_version).await
    }

    pub async fn check_existence_by_id(&self, id: &str) -> AzureResult<bool> {
        let api_version = resolve_api_version(&self.client, id).await?;
        check_existence_by_id(&self.client, id, &api_version).await
    }

    pub async fn delete(&self, at: &ResourceCoordinates, api_version: &str) -> AzureResult<()> {
        delete_resource(&self.client, at, api_version).await?;
        info!("Deleted resource {}", at.name);
        Ok(())
    }

    pub async fn delete_by_id(&self, id: &str) -> AzureResult<()> {
        let api_version = resolve_api_version(&self.client, id).await?;
        delete_resource_by_id(&self.client, id, &api_version).await?;
        info!("Deleted resource {}", id);
        Ok(())
    }

    /// Move `resource_ids` into `target_resource_group` (a group name in
    /// this subscription or a full resource group id).
    pub async fn move_resources(
        &self,
        source_resource_group: &str,
        target_resource_group: &str,
        resource_ids: Vec<String>,
    ) -> AzureResult<()> {
        let target = if target_resource_group.starts_with('/') {
            target_resource_group.to_string()
        } else {
            format!(
                "/subscriptions/{}/resourceGroups/{}",
                self.client.subscription_id()?,
                target_resource_group
            )
        };
        let info = ResourcesMoveInfo {
            resources: resource_ids,
            target_resource_group: target,
        };
        move_resources(&self.client, source_resource_group, &info).await?;
        info!("Moved resources from {} to {}", source_resource_group, target_resource_group);
        Ok(())
    }
}

#[async_trait]
impl SupportsListing for GenericResources {
    type Item = GenericResource;

    async fn list(&self) -> AzureResult<Vec<GenericResource>> {
        let api = self.client.config().api_version_resources.clone();
        Ok(list_resources(&self.client)
            .await?
            .into_iter()
            .map(|inner| self.wrap(inner, &api))
            .collect())
    }
}

#[async_trait]
impl SupportsListingByResourceGroup for GenericResources {
    type Item = GenericResource;

    async fn list_by_resource_group(&self, resource_group: &str) -> AzureResult<Vec<GenericResource>> {
        let api = self.client.config().api_version_resources.clone();
        Ok(list_resources_by_resource_group(&self.client, resource_group)
            .await?
            .into_iter()
            .map(|inner| self.wrap(inner, &api))
            .collect())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use azfluent_core::test_utils::mock_client;
    use azfluent_core::fluent::{GroupableResource, Resource};
    use azfluent_core::types::AzureErrorKind;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SITE_ID: &str =
        "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Web/sites/site1";

    fn web_provider() -> serde_json::Value {
        json!({
            "namespace": "Microsoft.Web",
            "resourceTypes": [{"resourceType": "sites", "apiVersions": ["2022-09-01", "2023-01-01"]}]
        })
    }

    #[test]
    fn coordinates_path_with_parent() {
        let at = ResourceCoordinates {
            resource_group: "rg".into(),
            provider_namespace: "Microsoft.Sql".into(),
            parent_resource_path: "servers/s1".into(),
            resource_type: "databases".into(),
            name: "db".into(),
        };
        assert_eq!(at.path(), "/providers/Microsoft.Sql/servers/s1/databases/db");
    }

    #[test]
    fn tag_filters() {
        assert_eq!(tag_filter("env", None), "tagname eq 'env'");
        assert_eq!(
            tag_filter("env", Some("prod")),
            "tagname eq 'env' and tagvalue eq 'prod'"
        );
    }

    #[tokio::test]
    async fn get_by_id_resolves_api_version() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/subscriptions/sub1/providers/Microsoft.Web"))
            .respond_with(ResponseTemplate::new(200).set_body_json(web_provider()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(SITE_ID))
            .and(query_param("api-version", "2023-01-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": SITE_ID, "name": "site1", "type": "Microsoft.Web/sites",
                "location": "westus", "kind": "app", "properties": {"state": "Running"}
            })))
            .mount(&server)
            .await;

        let resources = GenericResources::new(mock_client(&server));
        let r = resources.get_by_id(SITE_ID).await.unwrap();
        assert_eq!(r.name(), "site1");
        assert_eq!(r.api_version(), "2023-01-01");
        assert_eq!(r.resource_provider_namespace(), "Microsoft.Web");
        assert_eq!(r.resource_type_name(), "sites");
        assert_eq!(r.resource_group_name(), "rg1");
        assert_eq!(r.properties().unwrap()["state"], "Running");
    }

    #[tokio::test]
    async fn define_requires_properties() {
        let server = MockServer::start().await;
        let resources = GenericResources::new(mock_client(&server));
        let err = resources
            .define("site1")
            .with_region("westus")
            .with_existing_resource_group("rg1")
            .with_provider_namespace("Microsoft.Web")
            .with_resource_type("sites")
            .with_api_version("2023-01-01")
            .create()
            .await
            .unwrap_err();
        assert_eq!(err.kind, AzureErrorKind::Validation);
        assert!(err.message.contains("properties"));
    }

    #[tokio::test]
    async fn define_puts_resource() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(SITE_ID))
            .and(query_param("api-version", "2023-01-01"))
            .and(body_partial_json(json!({
                "location": "westus",
                "properties": {"serverFarmId": "farm"},
                "plan": {"name": "p1", "publisher": "pub", "product": "prod"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": SITE_ID, "name": "site1", "location": "westus",
                "properties": {"serverFarmId": "farm"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resources = GenericResources::new(mock_client(&server));
        let created = resources
            .define("site1")
            .with_region("westus")
            .with_existing_resource_group("rg1")
            .with_provider_namespace("Microsoft.Web")
            .with_resource_type("sites")
            .with_api_version("2023-01-01")
            .with_plan("p1", "pub", "prod", None, None)
            .with_properties(json!({"serverFarmId": "farm"}))
            .create()
            .await
            .unwrap();
        assert_eq!(created.id(), SITE_ID);
    }

    #[tokio::test]
    async fn move_resources_posts_target_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/subscriptions/sub1/resourceGroups/src/moveResources"))
            .and(body_partial_json(json!({
                "targetResourceGroup": "/subscriptions/sub1/resourceGroups/dst",
                "resources": [SITE_ID]
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let resources = GenericResources::new(mock_client(&server));
        resources
            .move_resources("src", "dst", vec![SITE_ID.to_string()])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn move_resources_requires_ids() {
        let server = MockServer::start().await;
        let resources = GenericResources::new(mock_client(&server));
        let err = resources.move_resources("src", "dst", vec![]).await.unwrap_err();
        assert!(err.message.contains("resources"));
    }
}
