//! Availability sets.

use std::collections::HashMap;
use std::sync::Arc;

use azfluent_core::fluent::{
    Appliable, Creatable, GroupableDefinition, GroupableResource, GroupableSpec, Refreshable,
    Resource, SupportsDeletingByResourceGroup, SupportsGettingByResourceGroup, SupportsListing,
    SupportsListingByResourceGroup, TaggableUpdate,
};
use azfluent_core::types::{require, AzureError, AzureResult};
use azfluent_core::{async_trait, impl_groupable_resource, AzureClient};
use log::{debug, info};

use crate::types::{AvailabilitySetInner, AvailabilitySetProperties, ComputeSku, VirtualMachineSize};

/// `Aligned` is required for VMs with managed disks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilitySetSkuType {
    Aligned,
    Classic,
}

impl AvailabilitySetSkuType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aligned => "Aligned",
            Self::Classic => "Classic",
        }
    }
}

// ─── REST operations ────────────────────────────────────────────────

fn availability_set_url(client: &AzureClient, resource_group: &str, name: &str, suffix: &str) -> AzureResult<String> {
    require("resourceGroupName", resource_group)?;
    require("availabilitySetName", name)?;
    client.resource_group_url(
        resource_group,
        &format!(
            "/providers/Microsoft.Compute/availabilitySets/{}{}?api-version={}",
            name,
            suffix,
            client.config().api_version_compute
        ),
    )
}

pub async fn list_availability_sets(client: &AzureClient) -> AzureResult<Vec<AvailabilitySetInner>> {
    let url = client.subscription_url(&format!(
        "/providers/Microsoft.Compute/availabilitySets?api-version={}",
        client.config().api_version_compute
    ))?;
    debug!("list_availability_sets → {}", url);
    client.get_all_pages(&url).await
}

pub async fn list_availability_sets_by_resource_group(
    client: &AzureClient,
    resource_group: &str,
) -> AzureResult<Vec<AvailabilitySetInner>> {
    let url = client.resource_group_url(
        resource_group,
        &format!(
            "/providers/Microsoft.Compute/availabilitySets?api-version={}",
            client.config().api_version_compute
        ),
    )?;
    debug!("list_availability_sets_by_resource_group({}) → {}", resource_group, url);
    client.get_all_pages(&url).await
}

pub async fn get_availability_set(
    client: &AzureClient,
    resource_group: &str,
    name: &str,
) -> AzureResult<AvailabilitySetInner> {
    let url = availability_set_url(client, resource_group, name, "")?;
    debug!("get_availability_set({}/{}) → {}", resource_group, name, url);
    client.get_json(&url).await
}

pub async fn create_or_update_availability_set(
    client: &AzureClient,
    resource_group: &str,
    name: &str,
    parameters: &AvailabilitySetInner,
) -> AzureResult<AvailabilitySetInner> {
    let url = availability_set_url(client, resource_group, name, "")?;
    debug!("create_or_update_availability_set({}/{}) → {}", resource_group, name, url);
    client.put_json(&url, parameters).await
}

pub async fn delete_availability_set(client: &AzureClient, resource_group: &str, name: &str) -> AzureResult<()> {
    let url = availability_set_url(client, resource_group, name, "")?;
    debug!("delete_availability_set({}/{}) → {}", resource_group, name, url);
    client.delete(&url).await
}

/// Sizes a VM in this availability set can use.
pub async fn list_availability_set_sizes(
    client: &AzureClient,
    resource_group: &str,
    name: &str,
) -> AzureResult<Vec<VirtualMachineSize>> {
    let url = availability_set_url(client, resource_group, name, "/vmSizes")?;
    debug!("list_availability_set_sizes({}/{}) → {}", resource_group, name, url);
    client.get_all_pages(&url).await
}

// ─── Fluent wrapper ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AvailabilitySet {
    inner: AvailabilitySetInner,
    client: Arc<AzureClient>,
}

impl_groupable_resource!(AvailabilitySet, AvailabilitySetInner);

impl AvailabilitySet {
    pub fn fault_domain_count(&self) -> Option<i32> {
        self.inner.properties.platform_fault_domain_count
    }

    pub fn update_domain_count(&self) -> Option<i32> {
        self.inner.properties.platform_update_domain_count
    }

    pub fn sku(&self) -> Option<&str> {
        self.inner.sku.as_ref().and_then(|s| s.name.as_deref())
    }

    pub fn virtual_machine_ids(&self) -> Vec<&str> {
        self.inner
            .properties
            .virtual_machines
            .iter()
            .map(|v| v.id.as_str())
            .collect()
    }

    pub async fn list_virtual_machine_sizes(&self) -> AzureResult<Vec<VirtualMachineSize>> {
        list_availability_set_sizes(&self.client, &self.resource_group_name(), self.name()).await
    }

    pub fn update(&self) -> AvailabilitySetUpdate {
        AvailabilitySetUpdate {
            inner: self.inner.clone(),
            client: self.client.clone(),
        }
    }
}

#[async_trait]
impl Refreshable for AvailabilitySet {
    async fn refresh(&mut self) -> AzureResult<()> {
        let rg = self.resource_group_name();
        let name = self.name().to_string();
        self.inner = get_availability_set(&self.client, &rg, &name).await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct AvailabilitySetDefinition {
    spec: GroupableSpec,
    fault_domain_count: Option<i32>,
    update_domain_count: Option<i32>,
    sku: AvailabilitySetSkuType,
    client: Arc<AzureClient>,
}

impl GroupableDefinition for AvailabilitySetDefinition {
    fn spec_mut(&mut self) -> &mut GroupableSpec {
        &mut self.spec
    }
}

impl AvailabilitySetDefinition {
    pub fn with_fault_domain_count(mut self, count: i32) -> Self {
        self.fault_domain_count = Some(count);
        self
    }

    pub fn with_update_domain_count(mut self, count: i32) -> Self {
        self.update_domain_count = Some(count);
        self
    }

    pub fn with_sku(mut self, sku: AvailabilitySetSkuType) -> Self {
        self.sku = sku;
        self
    }

    pub fn fault_domain_count(&self) -> Option<i32> {
        self.fault_domain_count
    }

    pub fn update_domain_count(&self) -> Option<i32> {
        self.update_domain_count
    }

    pub fn sku(&self) -> AvailabilitySetSkuType {
        self.sku
    }
}

#[async_trait]
impl Creatable for AvailabilitySetDefinition {
    type Output = AvailabilitySet;

    async fn create(self) -> AzureResult<AvailabilitySet> {
        self.spec.validate()?;
        if matches!(self.fault_domain_count, Some(n) if n < 1) {
            return Err(AzureError::validation("Fault domain count must be at least 1"));
        }
        if matches!(self.update_domain_count, Some(n) if n < 1) {
            return Err(AzureError::validation("Update domain count must be at least 1"));
        }
        self.spec.ensure_resource_group(&self.client).await?;

        let rg = self.spec.resource_group()?;
        let body = AvailabilitySetInner {
            location: Some(self.spec.region_name()?),
            tags: self.spec.tags.clone(),
            sku: Some(ComputeSku {
                name: Some(self.sku.as_str().into()),
                ..Default::default()
            }),
            properties: AvailabilitySetProperties {
                platform_fault_domain_count: self.fault_domain_count,
                platform_update_domain_count: self.update_domain_count,
                ..Default::default()
            },
            ..Default::default()
        };
        let inner = create_or_update_availability_set(&self.client, rg, &self.spec.name, &body).await?;
        info!("Created availability set {}/{}", rg, self.spec.name);
        Ok(AvailabilitySet {
            inner,
            client: self.client,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AvailabilitySetUpdate {
    inner: AvailabilitySetInner,
    client: Arc<AzureClient>,
}

impl AvailabilitySetUpdate {
    pub fn with_sku(mut self, sku: AvailabilitySetSkuType) -> Self {
        self.inner.sku = Some(ComputeSku {
            name: Some(sku.as_str().into()),
            ..Default::default()
        });
        self
    }
}

impl TaggableUpdate for AvailabilitySetUpdate {
    fn tags_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.inner.tags
    }
}

#[async_trait]
impl Appliable for AvailabilitySetUpdate {
    type Output = AvailabilitySet;

    async fn apply(mut self) -> AzureResult<AvailabilitySet> {
        let current = AvailabilitySet {
            inner: self.inner.clone(),
            client: self.client.clone(),
        };
        let rg = current.resource_group_name();
        let name = current.name().to_string();
        self.inner.properties.statuses.clear();
        let inner = create_or_update_availability_set(&self.client, &rg, &name, &self.inner).await?;
        info!("Updated availability set {}/{}", rg, name);
        Ok(AvailabilitySet {
            inner,
            client: self.client,
        })
    }
}

// ─── Collection ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AvailabilitySets {
    client: Arc<AzureClient>,
}

impl AvailabilitySets {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    fn wrap(&self, inner: AvailabilitySetInner) -> AvailabilitySet {
        AvailabilitySet {
            inner,
            client: self.client.clone(),
        }
    }

    pub fn define(&self, name: impl Into<String>) -> AvailabilitySetDefinition {
        AvailabilitySetDefinition {
            spec: GroupableSpec::new(name),
            fault_domain_count: None,
            update_domain_count: None,
            sku: AvailabilitySetSkuType::Aligned,
            client: self.client.clone(),
        }
    }
}

#[async_trait]
impl SupportsListing for AvailabilitySets {
    type Item = AvailabilitySet;

    async fn list(&self) -> AzureResult<Vec<AvailabilitySet>> {
        Ok(list_availability_sets(&self.client)
            .await?
            .into_iter()
            .map(|inner| self.wrap(inner))
            .collect())
    }
}

#[async_trait]
impl SupportsListingByResourceGroup for AvailabilitySets {
    type Item = AvailabilitySet;

    async fn list_by_resource_group(&self, resource_group: &str) -> AzureResult<Vec<AvailabilitySet>> {
        Ok(list_availability_sets_by_resource_group(&self.client, resource_group)
            .await?
            .into_iter()
            .map(|inner| self.wrap(inner))
            .collect())
    }
}

#[async_trait]
impl SupportsGettingByResourceGroup for AvailabilitySets {
    type Item = AvailabilitySet;

    async fn get_by_resource_group(&self, resource_group: &str, name: &str) -> AzureResult<AvailabilitySet> {
        Ok(self.wrap(get_availability_set(&self.client, resource_group, name).await?))
    }
}

#[async_trait]
impl SupportsDeletingByResourceGroup for AvailabilitySets {
    async fn delete_by_resource_group(&self, resource_group: &str, name: &str) -> AzureResult<()> {
        delete_availability_set(&self.client, resource_group, name).await?;
        info!("Deleted availability set {}/{}", resource_group, name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azfluent_core::test_utils::mock_client;
    use azfluent_core::Region;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const AS_PATH: &str = "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Compute/availabilitySets/as1";

    fn as_json() -> serde_json::Value {
        json!({
            "id": AS_PATH, "name": "as1", "location": "westus",
            "sku": {"name": "Aligned"},
            "properties": {
                "platformFaultDomainCount": 2,
                "platformUpdateDomainCount": 5,
                "virtualMachines": [{"id": "/vm/a"}]
            }
        })
    }

    #[tokio::test]
    async fn create_sends_domain_counts_and_sku() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(AS_PATH))
            .and(body_partial_json(json!({
                "location": "westus",
                "sku": {"name": "Aligned"},
                "properties": {"platformFaultDomainCount": 2, "platformUpdateDomainCount": 5}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(as_json()))
            .expect(1)
            .mount(&server)
            .await;

        let sets = AvailabilitySets::new(mock_client(&server));
        let def = sets
            .define("as1")
            .with_region(Region::US_WEST)
            .with_existing_resource_group("rg1")
            .with_fault_domain_count(2)
            .with_update_domain_count(5);
        assert_eq!(def.sku(), AvailabilitySetSkuType::Aligned);
        let set = def.create().await.unwrap();
        assert_eq!(set.fault_domain_count(), Some(2));
        assert_eq!(set.virtual_machine_ids(), vec!["/vm/a"]);
    }

    #[tokio::test]
    async fn zero_fault_domains_rejected() {
        let server = MockServer::start().await;
        let err = AvailabilitySets::new(mock_client(&server))
            .define("as1")
            .with_region(Region::US_WEST)
            .with_existing_resource_group("rg1")
            .with_fault_domain_count(0)
            .create()
            .await
            .unwrap_err();
        assert!(err.message.contains("Fault domain"));
    }

    #[tokio::test]
    async fn update_tags_and_list_sizes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(AS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(as_json()))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(AS_PATH))
            .and(body_partial_json(json!({"tags": {"team": "infra"}, "sku": {"name": "Classic"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(as_json()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{AS_PATH}/vmSizes")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"name": "Standard_A1"}]
            })))
            .mount(&server)
            .await;

        let sets = AvailabilitySets::new(mock_client(&server));
        let set = sets.get_by_resource_group("rg1", "as1").await.unwrap();
        set.update()
            .with_tag("team", "infra")
            .with_sku(AvailabilitySetSkuType::Classic)
            .apply()
            .await
            .unwrap();
        let sizes = set.list_virtual_machine_sizes().await.unwrap();
        assert_eq!(sizes[0].name, "Standard_A1");
    }
}
