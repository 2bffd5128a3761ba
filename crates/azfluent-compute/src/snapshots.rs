//! Disk snapshots.

use std::collections::HashMap;
use std::sync::Arc;

use azfluent_core::fluent::{
    Appliable, Creatable, GroupableDefinition, GroupableResource, GroupableSpec, Refreshable,
    Resource, SupportsDeletingByResourceGroup, SupportsGettingByResourceGroup, SupportsListing,
    SupportsListingByResourceGroup, TaggableUpdate,
};
use azfluent_core::types::{require, AzureError, AzureResult};
use azfluent_core::{async_trait, impl_groupable_resource, AzureClient, ResourceId};
use log::info;

use crate::disks::{
    delete_item, get_item, grant_item_access, list_items, list_items_by_resource_group, patch_body,
    patch_item, put_item, revoke_item_access, DiskCollection,
};
use crate::types::{
    create_option, AccessLevel, CreationData, DiskProperties, DiskSku, OperatingSystemType,
    SnapshotInner, StorageAccountType,
};

const KIND: DiskCollection = DiskCollection::Snapshots;

// ─── Fluent wrapper ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Snapshot {
    inner: SnapshotInner,
    client: Arc<AzureClient>,
}

impl_groupable_resource!(Snapshot, SnapshotInner);

impl Snapshot {
    pub fn size_in_gb(&self) -> Option<i32> {
        self.inner.properties.disk_size_gb
    }

    pub fn sku(&self) -> Option<StorageAccountType> {
        self.inner.sku.as_ref().and_then(|s| s.name)
    }

    pub fn os_type(&self) -> Option<OperatingSystemType> {
        self.inner.properties.os_type
    }

    pub fn is_incremental(&self) -> bool {
        self.inner.properties.incremental.unwrap_or(false)
    }

    pub fn source_resource_id(&self) -> Option<&str> {
        self.inner
            .properties
            .creation_data
            .as_ref()
            .and_then(|c| c.source_resource_id.as_deref())
    }

    pub fn provisioning_state(&self) -> Option<&str> {
        self.inner.properties.provisioning_state.as_deref()
    }

    pub async fn grant_access(&self, access: AccessLevel, duration_in_seconds: i32) -> AzureResult<String> {
        grant_item_access(
            &self.client,
            KIND,
            &self.resource_group_name(),
            self.name(),
            access,
            duration_in_seconds,
        )
        .await
    }

    pub async fn revoke_access(&self) -> AzureResult<()> {
        revoke_item_access(&self.client, KIND, &self.resource_group_name(), self.name()).await
    }

    pub fn update(&self) -> SnapshotUpdate {
        SnapshotUpdate {
            id: self.inner.id.clone().unwrap_or_default(),
            tags: self.inner.tags.clone(),
            sku: None,
            client: self.client.clone(),
        }
    }
}

#[async_trait]
impl Refreshable for Snapshot {
    async fn refresh(&mut self) -> AzureResult<()> {
        let rg = self.resource_group_name();
        let name = self.name().to_string();
        self.inner = get_item(&self.client, KIND, &rg, &name).await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotDefinition {
    spec: GroupableSpec,
    source_id: Option<String>,
    vhd: Option<(String, String)>,
    os_type: Option<OperatingSystemType>,
    incremental: bool,
    sku: Option<StorageAccountType>,
    size_gb: Option<i32>,
    client: Arc<AzureClient>,
}

impl GroupableDefinition for SnapshotDefinition {
    fn spec_mut(&mut self) -> &mut GroupableSpec {
        &mut self.spec
    }
}

impl SnapshotDefinition {
    /// Copy of a managed disk (or of another snapshot).
    pub fn with_data_from_disk(mut self, disk_id: impl Into<String>) -> Self {
        self.source_id = Some(disk_id.into());
        self.vhd = None;
        self
    }

    pub fn with_linux_from_disk(self, disk_id: impl Into<String>) -> Self {
        self.with_data_from_disk(disk_id).with_os_type(OperatingSystemType::Linux)
    }

    pub fn with_windows_from_disk(self, disk_id: impl Into<String>) -> Self {
        self.with_data_from_disk(disk_id).with_os_type(OperatingSystemType::Windows)
    }

    pub fn with_data_from_snapshot(self, snapshot_id: impl Into<String>) -> Self {
        self.with_data_from_disk(snapshot_id)
    }

    pub fn with_data_from_vhd(mut self, vhd_uri: impl Into<String>, storage_account_id: impl Into<String>) -> Self {
        self.vhd = Some((vhd_uri.into(), storage_account_id.into()));
        self.source_id = None;
        self
    }

    pub fn with_os_type(mut self, os_type: OperatingSystemType) -> Self {
        self.os_type = Some(os_type);
        self
    }

    pub fn with_incremental(mut self, incremental: bool) -> Self {
        self.incremental = incremental;
        self
    }

    /// `Standard_LRS`, `Premium_LRS` or `Standard_ZRS`.
    pub fn with_sku(mut self, sku: StorageAccountType) -> Self {
        self.sku = Some(sku);
        self
    }

    pub fn with_size_in_gb(mut self, size_gb: i32) -> Self {
        self.size_gb = Some(size_gb);
        self
    }

    pub fn is_incremental(&self) -> bool {
        self.incremental
    }

    pub fn sku(&self) -> Option<StorageAccountType> {
        self.sku
    }

    fn creation_data(&self) -> AzureResult<CreationData> {
        if let Some(source) = &self.source_id {
            require("sourceResourceId", source)?;
            return Ok(CreationData {
                create_option: create_option::COPY.into(),
                source_resource_id: Some(source.clone()),
                ..Default::default()
            });
        }
        if let Some((uri, account)) = &self.vhd {
            require("sourceUri", uri)?;
            require("storageAccountId", account)?;
            return Ok(CreationData {
                create_option: create_option::IMPORT.into(),
                source_uri: Some(uri.clone()),
                storage_account_id: Some(account.clone()),
                ..Default::default()
            });
        }
        Err(AzureError::required("sourceResourceId"))
    }
}

#[async_trait]
impl Creatable for SnapshotDefinition {
    type Output = Snapshot;

    async fn create(self) -> AzureResult<Snapshot> {
        self.spec.validate()?;
        let creation_data = self.creation_data()?;
        if let Some(sku) = self.sku {
            if !matches!(
                sku,
                StorageAccountType::StandardLrs | StorageAccountType::PremiumLrs | StorageAccountType::StandardZrs
            ) {
                return Err(AzureError::validation(format!("{sku} is not a valid snapshot sku")));
            }
        }
        self.spec.ensure_resource_group(&self.client).await?;

        let rg = self.spec.resource_group()?;
        let body = SnapshotInner {
            location: Some(self.spec.region_name()?),
            tags: self.spec.tags.clone(),
            sku: self.sku.map(|s| DiskSku {
                name: Some(s),
                tier: None,
            }),
            properties: DiskProperties {
                os_type: self.os_type,
                disk_size_gb: self.size_gb,
                creation_data: Some(creation_data),
                incremental: self.incremental.then_some(true),
                ..Default::default()
            },
            ..Default::default()
        };
        let inner = put_item(&self.client, KIND, rg, &self.spec.name, &body).await?;
        info!("Created snapshot {}/{}", rg, self.spec.name);
        Ok(Snapshot {
            inner,
            client: self.client,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotUpdate {
    id: String,
    tags: HashMap<String, String>,
    sku: Option<StorageAccountType>,
    client: Arc<AzureClient>,
}

impl SnapshotUpdate {
    pub fn with_sku(mut self, sku: StorageAccountType) -> Self {
        self.sku = Some(sku);
        self
    }
}

impl TaggableUpdate for SnapshotUpdate {
    fn tags_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.tags
    }
}

#[async_trait]
impl Appliable for SnapshotUpdate {
    type Output = Snapshot;

    async fn apply(self) -> AzureResult<Snapshot> {
        let rid = ResourceId::parse(&self.id)?;
        let rg = rid
            .resource_group_name()
            .ok_or_else(AzureError::resource_group_required)?;
        let body = patch_body(&self.tags, self.sku, None);
        let inner = patch_item(&self.client, KIND, rg, rid.name(), &body).await?;
        info!("Updated snapshot {}/{}", rg, rid.name());
        Ok(Snapshot {
            inner,
            client: self.client,
        })
    }
}

// ─── Collection ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Snapshots {
    client: Arc<AzureClient>,
}

impl Snapshots {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    fn wrap(&self, inner: SnapshotInner) -> Snapshot {
        Snapshot {
            inner,
            client: self.client.clone(),
        }
    }

    pub fn define(&self, name: impl Into<String>) -> SnapshotDefinition {
        SnapshotDefinition {
            spec: GroupableSpec::new(name),
            source_id: None,
            vhd: None,
            os_type: None,
            incremental: false,
            sku: None,
            size_gb: None,
            client: self.client.clone(),
        }
    }

    pub async fn grant_access(
        &self,
        resource_group: &str,
        name: &str,
        access: AccessLevel,
        duration_in_seconds: i32,
    ) -> AzureResult<String> {
        grant_item_access(&self.client, KIND, resource_group, name, access, duration_in_seconds).await
    }

    pub async fn revoke_access(&self, resource_group: &str, name: &str) -> AzureResult<()> {
        revoke_item_access(&self.client, KIND, resource_group, name).await
    }
}

#[async_trait]
impl SupportsListing for Snapshots {
    type Item = Snapshot;

    async fn list(&self) -> AzureResult<Vec<Snapshot>> {
        Ok(list_items(&self.client, KIND)
            .await?
            .into_iter()
            .map(|inner| self.wrap(inner))
            .collect())
    }
}

#[async_trait]
impl SupportsListingByResourceGroup for Snapshots {
    type Item = Snapshot;

    async fn list_by_resource_group(&self, resource_group: &str) -> AzureResult<Vec<Snapshot>> {
        Ok(list_items_by_resource_group(&self.client, KIND, resource_group)
            .await?
            .into_iter()
            .map(|inner| self.wrap(inner))
            .collect())
    }
}

#[async_trait]
impl SupportsGettingByResourceGroup for Snapshots {
    type Item = Snapshot;

    async fn get_by_resource_group(&self, resource_group: &str, name: &str) -> AzureResult<Snapshot> {
        Ok(self.wrap(get_item(&self.client, KIND, resource_group, name).await?))
    }
}

#[async_trait]
impl SupportsDeletingByResourceGroup for Snapshots {
    async fn delete_by_resource_group(&self, resource_group: &str, name: &str) -> AzureResult<()> {
        delete_item(&self.client, KIND, resource_group, name).await?;
        info!("Deleted snapshot {}/{}", resource_group, name);
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

    const SNAP_PATH: &str = "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Compute/snapshots/s1";
    const DISK_ID: &str = "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Compute/disks/d1";

    #[tokio::test]
    async fn incremental_snapshot_from_disk() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(SNAP_PATH))
            .and(body_partial_json(json!({
                "sku": {"name": "Standard_ZRS"},
                "properties": {
                    "osType": "Linux",
                    "incremental": true,
                    "creationData": {"createOption": "Copy", "sourceResourceId": DISK_ID}
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": SNAP_PATH, "name": "s1", "location": "eastus",
                "sku": {"name": "Standard_ZRS"},
                "properties": {
                    "incremental": true,
                    "creationData": {"createOption": "Copy", "sourceResourceId": DISK_ID}
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let snap = Snapshots::new(mock_client(&server))
            .define("s1")
            .with_region(Region::US_EAST)
            .with_existing_resource_group("rg1")
            .with_linux_from_disk(DISK_ID)
            .with_incremental(true)
            .with_sku(StorageAccountType::StandardZrs)
            .create()
            .await
            .unwrap();
        assert!(snap.is_incremental());
        assert_eq!(snap.source_resource_id(), Some(DISK_ID));
        assert_eq!(snap.sku(), Some(StorageAccountType::StandardZrs));
    }

    #[tokio::test]
    async fn snapshot_requires_source() {
        let server = MockServer::start().await;
        let err = Snapshots::new(mock_client(&server))
            .define("s1")
            .with_region(Region::US_EAST)
            .with_existing_resource_group("rg1")
            .create()
            .await
            .unwrap_err();
        assert!(err.message.contains("sourceResourceId"));
    }

    #[tokio::test]
    async fn ultra_ssd_sku_rejected_for_snapshots() {
        let server = MockServer::start().await;
        let err = Snapshots::new(mock_client(&server))
            .define("s1")
            .with_region(Region::US_EAST)
            .with_existing_resource_group("rg1")
            .with_data_from_disk(DISK_ID)
            .with_sku(StorageAccountType::UltraSsdLrs)
            .create()
            .await
            .unwrap_err();
        assert!(err.message.contains("UltraSSD_LRS"));
    }

    #[tokio::test]
    async fn delete_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(SNAP_PATH))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Snapshots::new(mock_client(&server))
            .delete_by_id(SNAP_PATH)
            .await
            .unwrap();
    }
}
