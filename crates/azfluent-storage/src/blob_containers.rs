//! Blob containers under a storage account's default blob service.

use std::collections::HashMap;
use std::sync::Arc;

use azfluent_core::fluent::{Appliable, Creatable, Refreshable};
use azfluent_core::types::{require, AzureError, AzureResult};
use azfluent_core::{async_trait, AzureClient, ResourceId};
use log::{debug, info};
use serde_json::json;

use crate::types::{BlobContainerInner, ContainerProperties, PublicAccess};

// ─── REST operations ────────────────────────────────────────────────

fn containers_url(
    client: &AzureClient,
    resource_group: &str,
    account_name: &str,
    container: Option<&str>,
) -> AzureResult<String> {
    require("resourceGroupName", resource_group)?;
    require("accountName", account_name)?;
    let child = match container {
        Some(name) => {
            require("containerName", name)?;
            format!("/{name}")
        }
        None => String::new(),
    };
    client.resource_group_url(
        resource_group,
        &format!(
            "/providers/Microsoft.Storage/storageAccounts/{}/blobServices/default/containers{}?api-version={}",
            account_name,
            child,
            client.config().api_version_storage
        ),
    )
}

pub async fn list_blob_containers(
    client: &AzureClient,
    resource_group: &str,
    account_name: &str,
) -> AzureResult<Vec<BlobContainerInner>> {
    let url = containers_url(client, resource_group, account_name, None)?;
    debug!("list_blob_containers({}/{}) → {}", resource_group, account_name, url);
    client.get_all_pages(&url).await
}

pub async fn get_blob_container(
    client: &AzureClient,
    resource_group: &str,
    account_name: &str,
    container_name: &str,
) -> AzureResult<BlobContainerInner> {
    let url = containers_url(client, resource_group, account_name, Some(container_name))?;
    debug!("get_blob_container({}/{}/{}) → {}", resource_group, account_name, container_name, url);
    client.get_json(&url).await
}

pub async fn create_blob_container(
    client: &AzureClient,
    resource_group: &str,
    account_name: &str,
    container_name: &str,
    properties: &ContainerProperties,
) -> AzureResult<BlobContainerInner> {
    let url = containers_url(client, resource_group, account_name, Some(container_name))?;
    debug!("create_blob_container({}/{}/{}) → {}", resource_group, account_name, container_name, url);
    client.put_json(&url, &json!({ "properties": properties })).await
}

pub async fn update_blob_container(
    client: &AzureClient,
    resource_group: &str,
    account_name: &str,
    container_name: &str,
    properties: &ContainerProperties,
) -> AzureResult<BlobContainerInner> {
    let url = containers_url(client, resource_group, account_name, Some(container_name))?;
    debug!("update_blob_container({}/{}/{}) → {}", resource_group, account_name, container_name, url);
    client.patch_json(&url, &json!({ "properties": properties })).await
}

pub async fn delete_blob_container(
    client: &AzureClient,
    resource_group: &str,
    account_name: &str,
    container_name: &str,
) -> AzureResult<()> {
    let url = containers_url(client, resource_group, account_name, Some(container_name))?;
    debug!("delete_blob_container({}/{}/{}) → {}", resource_group, account_name, container_name, url);
    client.delete(&url).await
}

// ─── Fluent wrapper ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct BlobContainer {
    inner: BlobContainerInner,
    resource_group: String,
    account_name: String,
    client: Arc<AzureClient>,
}

impl BlobContainer {
    fn new(inner: BlobContainerInner, resource_group: String, account_name: String, client: Arc<AzureClient>) -> Self {
        Self {
            inner,
            resource_group,
            account_name,
            client,
        }
    }

    pub fn inner(&self) -> &BlobContainerInner {
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

    pub fn storage_account_name(&self) -> &str {
        &self.account_name
    }

    pub fn public_access(&self) -> PublicAccess {
        self.inner.properties.public_access.unwrap_or(PublicAccess::None)
    }

    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.inner.properties.metadata
    }

    pub fn etag(&self) -> Option<&str> {
        self.inner.etag.as_deref()
    }

    pub fn last_modified_time(&self) -> Option<&str> {
        self.inner.properties.last_modified_time.as_deref()
    }

    pub fn has_legal_hold(&self) -> bool {
        self.inner.properties.has_legal_hold.unwrap_or(false)
    }

    pub fn has_immutability_policy(&self) -> bool {
        self.inner.properties.has_immutability_policy.unwrap_or(false)
    }

    pub fn update(&self) -> BlobContainerUpdate {
        BlobContainerUpdate {
            resource_group: self.resource_group.clone(),
            account_name: self.account_name.clone(),
            name: self.name().to_string(),
            properties: ContainerProperties {
                public_access: self.inner.properties.public_access,
                metadata: self.inner.properties.metadata.clone(),
                ..Default::default()
            },
            client: self.client.clone(),
        }
    }
}

#[async_trait]
impl Refreshable for BlobContainer {
    async fn refresh(&mut self) -> AzureResult<()> {
        let name = self.name().to_string();
        self.inner = get_blob_container(&self.client, &self.resource_group, &self.account_name, &name).await?;
        Ok(())
    }
}

// ─── Definition ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct BlobContainerDefinition {
    name: String,
    resource_group: Option<String>,
    account_name: Option<String>,
    properties: ContainerProperties,
    client: Arc<AzureClient>,
}

impl BlobContainerDefinition {
    pub fn with_existing_storage_account(
        mut self,
        resource_group: impl Into<String>,
        account_name: impl Into<String>,
    ) -> Self {
        self.resource_group = Some(resource_group.into());
        self.account_name = Some(account_name.into());
        self
    }

    /// Parent taken from a storage account resource id.
    pub fn with_existing_storage_account_id(mut self, account_id: &str) -> AzureResult<Self> {
        let rid = ResourceId::parse(account_id)?;
        let rg = rid
            .resource_group_name()
            .ok_or_else(AzureError::resource_group_required)?;
        self.resource_group = Some(rg.to_string());
        self.account_name = Some(rid.name().to_string());
        Ok(self)
    }

    pub fn with_public_access(mut self, access: PublicAccess) -> Self {
        self.properties.public_access = Some(access);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_all_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.properties.metadata = metadata;
        self
    }
}

#[async_trait]
impl Creatable for BlobContainerDefinition {
    type Output = BlobContainer;

    async fn create(self) -> AzureResult<BlobContainer> {
        let rg = self
            .resource_group
            .ok_or_else(|| AzureError::required("resourceGroupName"))?;
        let account = self.account_name.ok_or_else(|| AzureError::required("accountName"))?;
        let inner = create_blob_container(&self.client, &rg, &account, &self.name, &self.properties).await?;
        info!("Created blob container {}/{}/{}", rg, account, self.name);
        Ok(BlobContainer::new(inner, rg, account, self.client))
    }
}

// ─── Update ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct BlobContainerUpdate {
    resource_group: String,
    account_name: String,
    name: String,
    properties: ContainerProperties,
    client: Arc<AzureClient>,
}

impl BlobContainerUpdate {
    pub fn with_public_access(mut self, access: PublicAccess) -> Self {
        self.properties.public_access = Some(access);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.metadata.insert(key.into(), value.into());
        self
    }

    pub fn without_metadata(mut self, key: &str) -> Self {
        self.properties.metadata.remove(key);
        self
    }
}

#[async_trait]
impl Appliable for BlobContainerUpdate {
    type Output = BlobContainer;

    async fn apply(self) -> AzureResult<BlobContainer> {
        let inner = update_blob_container(
            &self.client,
            &self.resource_group,
            &self.account_name,
            &self.name,
            &self.properties,
        )
        .await?;
        info!("Updated blob container {}/{}/{}", self.resource_group, self.account_name, self.name);
        Ok(BlobContainer::new(inner, self.resource_group, self.account_name, self.client))
    }
}

// ─── Collection ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct BlobContainers {
    client: Arc<AzureClient>,
}

impl BlobContainers {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    pub fn define(&self, name: impl Into<String>) -> BlobContainerDefinition {
        BlobContainerDefinition {
            name: name.into(),
            resource_group: None,
            account_name: None,
            properties: ContainerProperties::default(),
            client: self.client.clone(),
        }
    }

    pub async fn list(&self, resource_group: &str, account_name: &str) -> AzureResult<Vec<BlobContainer>> {
        Ok(list_blob_containers(&self.client, resource_group, account_name)
            .await?
            .into_iter()
            .map(|inner| {
                BlobContainer::new(inner, resource_group.to_string(), account_name.to_string(), self.client.clone())
            })
            .collect())
    }

    pub async fn get(&self, resource_group: &str, account_name: &str, name: &str) -> AzureResult<BlobContainer> {
        let inner = get_blob_container(&self.client, resource_group, account_name, name).await?;
        Ok(BlobContainer::new(
            inner,
            resource_group.to_string(),
            account_name.to_string(),
            self.client.clone(),
        ))
    }

    pub async fn delete(&self, resource_group: &str, account_name: &str, name: &str) -> AzureResult<()> {
        delete_blob_container(&self.client, resource_group, account_name, name).await?;
        info!("Deleted blob container {}/{}/{}", resource_group, account_name, name);
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use azfluent_core::test_utils::mock_client;
    use azfluent_core::types::AzureErrorKind;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CONTAINER_PATH: &str = "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Storage/storageAccounts/acct1/blobServices/default/containers/logs";

    fn container_json(access: &str) -> serde_json::Value {
        json!({
            "id": CONTAINER_PATH, "name": "logs", "etag": "\"0x1\"",
            "properties": {"publicAccess": access, "metadata": {"owner": "ops"}}
        })
    }

    #[tokio::test]
    async fn create_sends_access_and_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(CONTAINER_PATH))
            .and(body_json(json!({
                "properties": {"publicAccess": "Container", "metadata": {"owner": "ops"}}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(container_json("Container")))
            .expect(1)
            .mount(&server)
            .await;

        let container = BlobContainers::new(mock_client(&server))
            .define("logs")
            .with_existing_storage_account("rg1", "acct1")
            .with_public_access(PublicAccess::Container)
            .with_metadata("owner", "ops")
            .create()
            .await
            .unwrap();
        assert_eq!(container.public_access(), PublicAccess::Container);
        assert_eq!(container.storage_account_name(), "acct1");
        assert_eq!(container.metadata().get("owner").map(String::as_str), Some("ops"));
    }

    #[tokio::test]
    async fn create_without_account_fails() {
        let server = MockServer::start().await;
        let err = BlobContainers::new(mock_client(&server))
            .define("logs")
            .create()
            .await
            .unwrap_err();
        assert_eq!(err.kind, AzureErrorKind::Validation);
    }

    #[tokio::test]
    async fn parent_from_account_id() {
        let server = MockServer::start().await;
        let def = BlobContainers::new(mock_client(&server))
            .define("logs")
            .with_existing_storage_account_id(
                "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Storage/storageAccounts/acct1",
            )
            .unwrap();
        assert_eq!(def.account_name.as_deref(), Some("acct1"));
        assert_eq!(def.resource_group.as_deref(), Some("rg1"));
    }

    #[tokio::test]
    async fn update_patches_public_access() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(CONTAINER_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(container_json("Container")))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path(CONTAINER_PATH))
            .and(body_json(json!({"properties": {"publicAccess": "None"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(container_json("None")))
            .expect(1)
            .mount(&server)
            .await;

        let containers = BlobContainers::new(mock_client(&server));
        let container = containers.get("rg1", "acct1", "logs").await.unwrap();
        let updated = container
            .update()
            .with_public_access(PublicAccess::None)
            .without_metadata("owner")
            .apply()
            .await
            .unwrap();
        assert_eq!(updated.public_access(), PublicAccess::None);
    }

    #[tokio::test]
    async fn list_and_delete() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(
                "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Storage/storageAccounts/acct1/blobServices/default/containers",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": [container_json("Blob")]})))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(CONTAINER_PATH))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let containers = BlobContainers::new(mock_client(&server));
        let listed = containers.list("rg1", "acct1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].public_access(), PublicAccess::Blob);
        containers.delete("rg1", "acct1", "logs").await.unwrap();
    }
}
