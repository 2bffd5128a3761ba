//! Managed disks.
//!
//! Snapshots share the wire model and most of the REST surface, so the
//! request helpers here are parameterised by [`DiskCollection`].

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
use serde_json::{json, Map, Value};

use crate::types::{
    create_option, AccessLevel, AccessUri, CreationData, DiskInner, DiskProperties, DiskSku,
    GrantAccessData, ImageDiskReference, OperatingSystemType, StorageAccountType,
};

// ─── REST operations ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DiskCollection {
    Disks,
    Snapshots,
}

impl DiskCollection {
    fn segment(self) -> &'static str {
        match self {
            Self::Disks => "disks",
            Self::Snapshots => "snapshots",
        }
    }

    fn name_param(self) -> &'static str {
        match self {
            Self::Disks => "diskName",
            Self::Snapshots => "snapshotName",
        }
    }
}

fn item_url(
    client: &AzureClient,
    kind: DiskCollection,
    resource_group: &str,
    name: &str,
    suffix: &str,
) -> AzureResult<String> {
    require("resourceGroupName", resource_group)?;
    require(kind.name_param(), name)?;
    client.resource_group_url(
        resource_group,
        &format!(
            "/providers/Microsoft.Compute/{}/{}{}?api-version={}",
            kind.segment(),
            name,
            suffix,
            client.config().api_version_disks
        ),
    )
}

pub(crate) async fn list_items(client: &AzureClient, kind: DiskCollection) -> AzureResult<Vec<DiskInner>> {
    let url = client.subscription_url(&format!(
        "/providers/Microsoft.Compute/{}?api-version={}",
        kind.segment(),
        client.config().api_version_disks
    ))?;
    debug!("list {} → {}", kind.segment(), url);
    client.get_all_pages(&url).await
}

pub(crate) async fn list_items_by_resource_group(
    client: &AzureClient,
    kind: DiskCollection,
    resource_group: &str,
) -> AzureResult<Vec<DiskInner>> {
    let url = client.resource_group_url(
        resource_group,
        &format!(
            "/providers/Microsoft.Compute/{}?api-version={}",
            kind.segment(),
            client.config().api_version_disks
        ),
    )?;
    debug!("list {} in {} → {}", kind.segment(), resource_group, url);
    client.get_all_pages(&url).await
}

pub(crate) async fn get_item(
    client: &AzureClient,
    kind: DiskCollection,
    resource_group: &str,
    name: &str,
) -> AzureResult<DiskInner> {
    let url = item_url(client, kind, resource_group, name, "")?;
    debug!("get {} {}/{} → {}", kind.segment(), resource_group, name, url);
    client.get_json(&url).await
}

pub(crate) async fn put_item(
    client: &AzureClient,
    kind: DiskCollection,
    resource_group: &str,
    name: &str,
    body: &DiskInner,
) -> AzureResult<DiskInner> {
    let url = item_url(client, kind, resource_group, name, "")?;
    debug!("put {} {}/{} → {}", kind.segment(), resource_group, name, url);
    client.put_json(&url, body).await
}

pub(crate) async fn patch_item(
    client: &AzureClient,
    kind: DiskCollection,
    resource_group: &str,
    name: &str,
    body: &Value,
) -> AzureResult<DiskInner> {
    let url = item_url(client, kind, resource_group, name, "")?;
    debug!("patch {} {}/{} → {}", kind.segment(), resource_group, name, url);
    client.patch_json(&url, body).await
}

pub(crate) async fn delete_item(
    client: &AzureClient,
    kind: DiskCollection,
    resource_group: &str,
    name: &str,
) -> AzureResult<()> {
    let url = item_url(client, kind, resource_group, name, "")?;
    debug!("delete {} {}/{} → {}", kind.segment(), resource_group, name, url);
    client.delete(&url).await
}

/// Returns the read / write SAS URI.
pub(crate) async fn grant_item_access(
    client: &AzureClient,
    kind: DiskCollection,
    resource_group: &str,
    name: &str,
    access: AccessLevel,
    duration_in_seconds: i32,
) -> AzureResult<String> {
    if duration_in_seconds <= 0 {
        return Err(AzureError::validation("Access duration must be positive"));
    }
    let url = item_url(client, kind, resource_group, name, "/beginGetAccess")?;
    debug!("grant_access {}/{} → {}", resource_group, name, url);
    let body = GrantAccessData {
        access,
        duration_in_seconds,
    };
    let uri: AccessUri = client.post_json(&url, &body).await?;
    uri.access_sas
        .ok_or_else(|| AzureError::validation("Service did not return an access SAS"))
}

pub(crate) async fn revoke_item_access(
    client: &AzureClient,
    kind: DiskCollection,
    resource_group: &str,
    name: &str,
) -> AzureResult<()> {
    let url = item_url(client, kind, resource_group, name, "/endGetAccess")?;
    debug!("revoke_access {}/{} → {}", resource_group, name, url);
    client.post_action(&url).await
}

/// PATCH body for sku, size and tag changes.
pub(crate) fn patch_body(
    tags: &HashMap<String, String>,
    sku: Option<StorageAccountType>,
    size_gb: Option<i32>,
) -> Value {
    let mut body = Map::new();
    body.insert("tags".into(), json!(tags));
    if let Some(sku) = sku {
        body.insert("sku".into(), json!({ "name": sku }));
    }
    if let Some(size) = size_gb {
        body.insert("properties".into(), json!({ "diskSizeGB": size }));
    }
    Value::Object(body)
}

// ─── Fluent wrapper ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Disk {
    inner: DiskInner,
    client: Arc<AzureClient>,
}

impl_groupable_resource!(Disk, DiskInner);

impl Disk {
    pub fn size_in_gb(&self) -> Option<i32> {
        self.inner.properties.disk_size_gb
    }

    pub fn sku(&self) -> Option<StorageAccountType> {
        self.inner.sku.as_ref().and_then(|s| s.name)
    }

    pub fn os_type(&self) -> Option<OperatingSystemType> {
        self.inner.properties.os_type
    }

    pub fn is_attached_to_virtual_machine(&self) -> bool {
        self.inner.managed_by.is_some()
    }

    pub fn virtual_machine_id(&self) -> Option<&str> {
        self.inner.managed_by.as_deref()
    }

    /// `Empty`, `Copy`, `FromImage`, `Import`, …
    pub fn creation_method(&self) -> Option<&str> {
        self.inner
            .properties
            .creation_data
            .as_ref()
            .map(|c| c.create_option.as_str())
    }

    pub fn source_resource_id(&self) -> Option<&str> {
        self.inner
            .properties
            .creation_data
            .as_ref()
            .and_then(|c| c.source_resource_id.as_deref())
    }

    pub fn disk_state(&self) -> Option<&str> {
        self.inner.properties.disk_state.as_deref()
    }

    pub fn availability_zones(&self) -> &[String] {
        &self.inner.zones
    }

    pub async fn grant_access(&self, access: AccessLevel, duration_in_seconds: i32) -> AzureResult<String> {
        let sas = grant_item_access(
            &self.client,
            DiskCollection::Disks,
            &self.resource_group_name(),
            self.name(),
            access,
            duration_in_seconds,
        )
        .await?;
        info!("Granted {:?} access to disk {}", access, self.name());
        Ok(sas)
    }

    pub async fn revoke_access(&self) -> AzureResult<()> {
        revoke_item_access(&self.client, DiskCollection::Disks, &self.resource_group_name(), self.name()).await?;
        info!("Revoked access to disk {}", self.name());
        Ok(())
    }

    pub fn update(&self) -> DiskUpdate {
        DiskUpdate {
            id: self.inner.id.clone().unwrap_or_default(),
            tags: self.inner.tags.clone(),
            sku: None,
            size_gb: None,
            client: self.client.clone(),
        }
    }
}

#[async_trait]
impl Refreshable for Disk {
    async fn refresh(&mut self) -> AzureResult<()> {
        let rg = self.resource_group_name();
        let name = self.name().to_string();
        self.inner = get_item(&self.client, DiskCollection::Disks, &rg, &name).await?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum DiskSource {
    Empty,
    Copy(String),
    Image { image_id: String, lun: Option<i32> },
    Import { vhd_uri: String, storage_account_id: String },
}

#[derive(Debug, Clone)]
pub struct DiskDefinition {
    spec: GroupableSpec,
    source: DiskSource,
    size_gb: Option<i32>,
    sku: Option<StorageAccountType>,
    os_type: Option<OperatingSystemType>,
    zone: Option<String>,
    client: Arc<AzureClient>,
}

impl GroupableDefinition for DiskDefinition {
    fn spec_mut(&mut self) -> &mut GroupableSpec {
        &mut self.spec
    }
}

impl DiskDefinition {
    /// Empty data disk; requires a size.
    pub fn with_data(mut self) -> Self {
        self.source = DiskSource::Empty;
        self.os_type = None;
        self
    }

    pub fn with_size_in_gb(mut self, size_gb: i32) -> Self {
        self.size_gb = Some(size_gb);
        self
    }

    pub fn with_sku(mut self, sku: StorageAccountType) -> Self {
        self.sku = Some(sku);
        self
    }

    pub fn from_snapshot(mut self, snapshot_id: impl Into<String>) -> Self {
        self.source = DiskSource::Copy(snapshot_id.into());
        self
    }

    pub fn from_disk(mut self, disk_id: impl Into<String>) -> Self {
        self.source = DiskSource::Copy(disk_id.into());
        self
    }

    /// OS disk from an image, or the data disk at `lun` of that image.
    pub fn from_image(mut self, image_id: impl Into<String>, lun: Option<i32>) -> Self {
        self.source = DiskSource::Image {
            image_id: image_id.into(),
            lun,
        };
        self
    }

    pub fn from_vhd(mut self, vhd_uri: impl Into<String>, storage_account_id: impl Into<String>) -> Self {
        self.source = DiskSource::Import {
            vhd_uri: vhd_uri.into(),
            storage_account_id: storage_account_id.into(),
        };
        self
    }

    pub fn with_os_type(mut self, os_type: OperatingSystemType) -> Self {
        self.os_type = Some(os_type);
        self
    }

    pub fn with_availability_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    pub fn size_in_gb(&self) -> Option<i32> {
        self.size_gb
    }

    pub fn sku(&self) -> Option<StorageAccountType> {
        self.sku
    }

    pub fn os_type(&self) -> Option<OperatingSystemType> {
        self.os_type
    }

    fn creation_data(&self) -> AzureResult<CreationData> {
        Ok(match &self.source {
            DiskSource::Empty => {
                if self.size_gb.map_or(true, |s| s <= 0) {
                    return Err(AzureError::validation("An empty disk requires a positive size in GB"));
                }
                CreationData {
                    create_option: create_option::EMPTY.into(),
                    ..Default::default()
                }
            }
            DiskSource::Copy(source) => {
                require("sourceResourceId", source)?;
                CreationData {
                    create_option: create_option::COPY.into(),
                    source_resource_id: Some(source.clone()),
                    ..Default::default()
                }
            }
            DiskSource::Image { image_id, lun } => {
                require("imageId", image_id)?;
                CreationData {
                    create_option: create_option::FROM_IMAGE.into(),
                    image_reference: Some(ImageDiskReference {
                        id: image_id.clone(),
                        lun: *lun,
                    }),
                    ..Default::default()
                }
            }
            DiskSource::Import {
                vhd_uri,
                storage_account_id,
            } => {
                require("sourceUri", vhd_uri)?;
                require("storageAccountId", storage_account_id)?;
                CreationData {
                    create_option: create_option::IMPORT.into(),
                    source_uri: Some(vhd_uri.clone()),
                    storage_account_id: Some(storage_account_id.clone()),
                    ..Default::default()
                }
            }
        })
    }
}

#[async_trait]
impl Creatable for DiskDefinition {
    type Output = Disk;

    async fn create(self) -> AzureResult<Disk> {
        self.spec.validate()?;
        let creation_data = self.creation_data()?;
        self.spec.ensure_resource_group(&self.client).await?;

        let rg = self.spec.resource_group()?;
        let body = DiskInner {
            location: Some(self.spec.region_name()?),
            tags: self.spec.tags.clone(),
            zones: self.zone.clone().into_iter().collect(),
            sku: self.sku.map(|s| DiskSku {
                name: Some(s),
                tier: None,
            }),
            properties: DiskProperties {
                os_type: self.os_type,
                disk_size_gb: self.size_gb,
                creation_data: Some(creation_data),
                ..Default::default()
            },
            ..Default::default()
        };
        let inner = put_item(&self.client, DiskCollection::Disks, rg, &self.spec.name, &body).await?;
        info!("Created disk {}/{}", rg, self.spec.name);
        Ok(Disk {
            inner,
            client: self.client,
        })
    }
}

/// PATCH of tags, sku and size. Disks can only grow.
#[derive(Debug, Clone)]
pub struct DiskUpdate {
    id: String,
    tags: HashMap<String, String>,
    sku: Option<StorageAccountType>,
    size_gb: Option<i32>,
    client: Arc<AzureClient>,
}

impl DiskUpdate {
    pub fn with_size_in_gb(mut self, size_gb: i32) -> Self {
        self.size_gb = Some(size_gb);
        self
    }

    pub fn with_sku(mut self, sku: StorageAccountType) -> Self {
        self.sku = Some(sku);
        self
    }
}

impl TaggableUpdate for DiskUpdate {
    fn tags_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.tags
    }
}

#[async_trait]
impl Appliable for DiskUpdate {
    type Output = Disk;

    async fn apply(self) -> AzureResult<Disk> {
        let rid = azfluent_core::ResourceId::parse(&self.id)?;
        let rg = rid
            .resource_group_name()
            .ok_or_else(AzureError::resource_group_required)?;
        let body = patch_body(&self.tags, self.sku, self.size_gb);
        let inner = patch_item(&self.client, DiskCollection::Disks, rg, rid.name(), &body).await?;
        info!("Updated disk {}/{}", rg, rid.name());
        Ok(Disk {
            inner,
            client: self.client,
        })
    }
}

// ─── Collection ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Disks {
    client: Arc<AzureClient>,
}

impl Disks {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    fn wrap(&self, inner: DiskInner) -> Disk {
        Disk {
            inner,
            client: self.client.clone(),
        }
    }

    pub fn define(&self, name: impl Into<String>) -> DiskDefinition {
        DiskDefinition {
            spec: GroupableSpec::new(name),
            source: DiskSource::Empty,
            size_gb: None,
            sku: None,
            os_type: None,
            zone: None,
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
        grant_item_access(&self.client, DiskCollection::Disks, resource_group, name, access, duration_in_seconds)
            .await
    }

    pub async fn revoke_access(&self, resource_group: &str, name: &str) -> AzureResult<()> {
        revoke_item_access(&self.client, DiskCollection::Disks, resource_group, name).await
    }
}

#[async_trait]
impl SupportsListing for Disks {
    type Item = Disk;

    async fn list(&self) -> AzureResult<Vec<Disk>> {
        Ok(list_items(&self.client, DiskCollection::Disks)
            .await?
            .into_iter()
            .map(|inner| self.wrap(inner))
            .collect())
    }
}

#[async_trait]
impl SupportsListingByResourceGroup for Disks {
    type Item = Disk;

    async fn list_by_resource_group(&self, resource_group: &str) -> AzureResult<Vec<Disk>> {
        Ok(list_items_by_resource_group(&self.client, DiskCollection::Disks, resource_group)
            .await?
            .into_iter()
            .map(|inner| self.wrap(inner))
            .collect())
    }
}

#[async_trait]
impl SupportsGettingByResourceGroup for Disks {
    type Item = Disk;

    async fn get_by_resource_group(&self, resource_group: &str, name: &str) -> AzureResult<Disk> {
        Ok(self.wrap(get_item(&self.client, DiskCollection::Disks, resource_group, name).await?))
    }
}

#[async_trait]
impl SupportsDeletingByResourceGroup for Disks {
    async fn delete_by_resource_group(&self, resource_group: &str, name: &str) -> AzureResult<()> {
        delete_item(&self.client, DiskCollection::Disks, resource_group, name).await?;
        info!("Deleted disk {}/{}", resource_group, name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azfluent_core::test_utils::mock_client;
    use azfluent_core::Region;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DISK_PATH: &str = "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Compute/disks/d1";

    fn disk_json(size: i32) -> serde_json::Value {
        json!({
            "id": DISK_PATH, "name": "d1", "location": "eastus",
            "sku": {"name": "Premium_LRS"},
            "managedBy": "/vm/a",
            "properties": {
                "diskSizeGB": size,
                "creationData": {"createOption": "Empty"},
                "diskState": "Attached"
            }
        })
    }

    #[tokio::test]
    async fn empty_disk_requires_size() {
        let server = MockServer::start().await;
        let err = Disks::new(mock_client(&server))
            .define("d1")
            .with_region(Region::US_EAST)
            .with_existing_resource_group("rg1")
            .with_data()
            .create()
            .await
            .unwrap_err();
        assert!(err.message.contains("size"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_empty_data_disk() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(DISK_PATH))
            .and(body_partial_json(json!({
                "location": "eastus",
                "zones": ["2"],
                "sku": {"name": "Premium_LRS"},
                "properties": {"diskSizeGB": 128, "creationData": {"createOption": "Empty"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(disk_json(128)))
            .expect(1)
            .mount(&server)
            .await;

        let disk = Disks::new(mock_client(&server))
            .define("d1")
            .with_region(Region::US_EAST)
            .with_existing_resource_group("rg1")
            .with_data()
            .with_size_in_gb(128)
            .with_sku(StorageAccountType::PremiumLrs)
            .with_availability_zone("2")
            .create()
            .await
            .unwrap();
        assert_eq!(disk.size_in_gb(), Some(128));
        assert_eq!(disk.sku(), Some(StorageAccountType::PremiumLrs));
        assert!(disk.is_attached_to_virtual_machine());
        assert_eq!(disk.creation_method(), Some("Empty"));
    }

    #[tokio::test]
    async fn copy_from_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(DISK_PATH))
            .and(body_partial_json(json!({
                "properties": {
                    "osType": "Linux",
                    "creationData": {"createOption": "Copy", "sourceResourceId": "/snap/s1"}
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(disk_json(30)))
            .expect(1)
            .mount(&server)
            .await;

        Disks::new(mock_client(&server))
            .define("d1")
            .with_region(Region::US_EAST)
            .with_existing_resource_group("rg1")
            .from_snapshot("/snap/s1")
            .with_os_type(OperatingSystemType::Linux)
            .create()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn grow_disk_via_patch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DISK_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(disk_json(128)))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path(DISK_PATH))
            .and(body_json(json!({
                "tags": {"tier": "gold"},
                "sku": {"name": "StandardSSD_LRS"},
                "properties": {"diskSizeGB": 256}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(disk_json(256)))
            .expect(1)
            .mount(&server)
            .await;

        let disks = Disks::new(mock_client(&server));
        let disk = disks.get_by_resource_group("rg1", "d1").await.unwrap();
        let updated = disk
            .update()
            .with_size_in_gb(256)
            .with_sku(StorageAccountType::StandardSsdLrs)
            .with_tag("tier", "gold")
            .apply()
            .await
            .unwrap();
        assert_eq!(updated.size_in_gb(), Some(256));
    }

    #[tokio::test]
    async fn grant_access_follows_location() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{DISK_PATH}/beginGetAccess")))
            .and(body_json(json!({"access": "Read", "durationInSeconds": 3600})))
            .respond_with(
                ResponseTemplate::new(202)
                    .insert_header("Location", format!("{}/diskops/1", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/diskops/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accessSAS": "https://md.blob/abcd?sig=x"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("{DISK_PATH}/endGetAccess")))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let disks = Disks::new(mock_client(&server));
        let sas = disks.grant_access("rg1", "d1", AccessLevel::Read, 3600).await.unwrap();
        assert!(sas.starts_with("https://md.blob/"));
        disks.revoke_access("rg1", "d1").await.unwrap();
    }

    #[tokio::test]
    async fn grant_access_rejects_non_positive_duration() {
        let server = MockServer::start().await;
        let disks = Disks::new(mock_client(&server));
        assert!(disks.grant_access("rg1", "d1", AccessLevel::Read, 0).await.is_err());
    }
}
