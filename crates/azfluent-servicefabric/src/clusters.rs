//! Service Fabric clusters: node types, certificates, upgrades and fabric settings.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use azfluent_core::fluent::{
    Appliable, Creatable, GroupableDefinition, GroupableResource, GroupableSpec, Refreshable, Resource,
    SupportsDeletingByResourceGroup, SupportsGettingByResourceGroup, SupportsListing,
    SupportsListingByResourceGroup, TaggableUpdate,
};
use azfluent_core::types::{require, AzureError, AzureResult};
use azfluent_core::{async_trait, impl_groupable_resource, AzureClient};
use log::{debug, info};

use crate::types::{
    AzureActiveDirectory, CertificateDescription, ClientCertificateCommonName, ClientCertificateThumbprint,
    ClusterCodeVersionsResult, ClusterInner, ClusterProperties, ClusterUpdateParameters, ClusterUpdateProperties,
    DiagnosticsStorageAccountConfig, DurabilityLevel, EndpointRange, NodeTypeDescription, ReliabilityLevel,
    SettingsParameter, SettingsSection, UpgradeMode, X509StoreName,
};

pub const DEFAULT_CLIENT_CONNECTION_PORT: u16 = 19000;
pub const DEFAULT_HTTP_GATEWAY_PORT: u16 = 19080;
const DIAGNOSTICS_KEY_NAME: &str = "StorageAccountKey1";

// ─── REST operations ────────────────────────────────────────────────

fn cluster_url(client: &AzureClient, resource_group: &str, cluster: Option<&str>) -> AzureResult<String> {
    require("resourceGroupName", resource_group)?;
    let path = match cluster {
        Some(c) => {
            require("clusterName", c)?;
            format!("/providers/Microsoft.ServiceFabric/clusters/{c}")
        }
        None => "/providers/Microsoft.ServiceFabric/clusters".to_string(),
    };
    client.resource_group_url(
        resource_group,
        &format!("{}?api-version={}", path, client.config().api_version_service_fabric),
    )
}

pub async fn list_clusters(client: &AzureClient) -> AzureResult<Vec<ClusterInner>> {
    let url = client.subscription_url(&format!(
        "/providers/Microsoft.ServiceFabric/clusters?api-version={}",
        client.config().api_version_service_fabric
    ))?;
    debug!("list_clusters → {}", url);
    client.get_all_pages(&url).await
}

pub async fn list_clusters_by_resource_group(client: &AzureClient, resource_group: &str) -> AzureResult<Vec<ClusterInner>> {
    let url = cluster_url(client, resource_group, None)?;
    debug!("list_clusters_by_resource_group({}) → {}", resource_group, url);
    client.get_all_pages(&url).await
}

pub async fn get_cluster(client: &AzureClient, resource_group: &str, cluster: &str) -> AzureResult<ClusterInner> {
    let url = cluster_url(client, resource_group, Some(cluster))?;
    debug!("get_cluster({}/{}) → {}", resource_group, cluster, url);
    client.get_json(&url).await
}

pub async fn create_cluster(
    client: &AzureClient,
    resource_group: &str,
    cluster: &str,
    body: &ClusterInner,
) -> AzureResult<ClusterInner> {
    let url = cluster_url(client, resource_group, Some(cluster))?;
    debug!("create_cluster({}/{}) → {}", resource_group, cluster, url);
    client.put_json(&url, body).await
}

pub async fn update_cluster(
    client: &AzureClient,
    resource_group: &str,
    cluster: &str,
    body: &ClusterUpdateParameters,
) -> AzureResult<ClusterInner> {
    let url = cluster_url(client, resource_group, Some(cluster))?;
    debug!("update_cluster({}/{}) → {}", resource_group, cluster, url);
    client.patch_json(&url, body).await
}

pub async fn delete_cluster(client: &AzureClient, resource_group: &str, cluster: &str) -> AzureResult<()> {
    let url = cluster_url(client, resource_group, Some(cluster))?;
    debug!("delete_cluster({}/{}) → {}", resource_group, cluster, url);
    client.delete(&url).await
}

/// Fabric runtime versions offered in `location`.
pub async fn list_cluster_code_versions(client: &AzureClient, location: &str) -> AzureResult<Vec<ClusterCodeVersionsResult>> {
    require("location", location)?;
    let url = client.subscription_url(&format!(
        "/providers/Microsoft.ServiceFabric/locations/{}/clusterVersions?api-version={}",
        location,
        client.config().api_version_service_fabric
    ))?;
    debug!("list_cluster_code_versions({}) → {}", location, url);
    client.get_all_pages(&url).await
}

// ─── Node types ─────────────────────────────────────────────────────

/// Builder of one node type; a cluster needs exactly one primary.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeType {
    description: NodeTypeDescription,
}

impl NodeType {
    pub fn new(name: impl Into<String>, instance_count: u32) -> Self {
        Self {
            description: NodeTypeDescription {
                name: name.into(),
                vm_instance_count: instance_count,
                client_connection_endpoint_port: DEFAULT_CLIENT_CONNECTION_PORT,
                http_gateway_endpoint_port: DEFAULT_HTTP_GATEWAY_PORT,
                is_primary: false,
                durability_level: Some(DurabilityLevel::Bronze),
                application_ports: None,
                ephemeral_ports: None,
                reverse_proxy_endpoint_port: None,
                placement_properties: HashMap::new(),
                capacities: HashMap::new(),
            },
        }
    }

    pub fn primary(name: impl Into<String>, instance_count: u32) -> Self {
        Self::new(name, instance_count).as_primary()
    }

    pub fn as_primary(mut self) -> Self {
        self.description.is_primary = true;
        self
    }

    pub fn with_client_connection_port(mut self, port: u16) -> Self {
        self.description.client_connection_endpoint_port = port;
        self
    }

    pub fn with_http_gateway_port(mut self, port: u16) -> Self {
        self.description.http_gateway_endpoint_port = port;
        self
    }

    pub fn with_reverse_proxy_port(mut self, port: u16) -> Self {
        self.description.reverse_proxy_endpoint_port = Some(port);
        self
    }

    pub fn with_durability_level(mut self, level: DurabilityLevel) -> Self {
        self.description.durability_level = Some(level);
        self
    }

    pub fn with_application_ports(mut self, start: u16, end: u16) -> Self {
        self.description.application_ports = Some(EndpointRange { start_port: start, end_port: end });
        self
    }

    pub fn with_ephemeral_ports(mut self, start: u16, end: u16) -> Self {
        self.description.ephemeral_ports = Some(EndpointRange { start_port: start, end_port: end });
        self
    }

    pub fn with_placement_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.description.placement_properties.insert(key.into(), value.into());
        self
    }

    pub fn with_capacity(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.description.capacities.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.description.name
    }

    pub fn description(&self) -> &NodeTypeDescription {
        &self.description
    }
}

fn validate_range(node_type: &str, label: &str, range: Option<&EndpointRange>) -> AzureResult<()> {
    match range {
        Some(r) if r.start_port > r.end_port => Err(AzureError::validation(format!(
            "Node type '{node_type}' {label} port range starts after it ends"
        ))),
        _ => Ok(()),
    }
}

fn validate_node_types(node_types: &[NodeTypeDescription]) -> AzureResult<()> {
    if node_types.is_empty() {
        return Err(AzureError::validation("A Service Fabric cluster requires at least one node type"));
    }
    let mut names = HashSet::new();
    for nt in node_types {
        require("nodeTypes.name", &nt.name)?;
        if !names.insert(nt.name.as_str()) {
            return Err(AzureError::validation(format!("Duplicate node type name '{}'", nt.name)));
        }
        if nt.vm_instance_count < 1 {
            return Err(AzureError::validation(format!(
                "Node type '{}' needs at least one instance",
                nt.name
            )));
        }
        validate_range(&nt.name, "application", nt.application_ports.as_ref())?;
        validate_range(&nt.name, "ephemeral", nt.ephemeral_ports.as_ref())?;
    }
    match node_types.iter().filter(|nt| nt.is_primary).count() {
        1 => Ok(()),
        n => Err(AzureError::validation(format!(
            "A Service Fabric cluster requires exactly one primary node type, found {n}"
        ))),
    }
}

fn validate_upgrade(mode: Option<UpgradeMode>, code_version: Option<&str>) -> AzureResult<()> {
    if mode == Some(UpgradeMode::Manual) && code_version.map_or(true, |v| v.trim().is_empty()) {
        return Err(AzureError::validation("Manual upgrade mode requires a cluster code version"));
    }
    Ok(())
}

fn set_fabric_setting(sections: &mut Vec<SettingsSection>, section: String, name: String, value: String) {
    let idx = match sections.iter().position(|s| s.name == section) {
        Some(i) => i,
        None => {
            sections.push(SettingsSection { name: section, parameters: Vec::new() });
            sections.len() - 1
        }
    };
    let params = &mut sections[idx].parameters;
    match params.iter_mut().find(|p| p.name == name) {
        Some(p) => p.value = value,
        None => params.push(SettingsParameter { name, value }),
    }
}

fn certificate(thumbprint: String, store: X509StoreName) -> CertificateDescription {
    CertificateDescription {
        thumbprint,
        thumbprint_secondary: None,
        x509_store_name: Some(store),
    }
}

// ─── Fluent wrapper ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ServiceFabricCluster {
    inner: ClusterInner,
    client: Arc<AzureClient>,
}

impl_groupable_resource!(ServiceFabricCluster, ClusterInner);

impl ServiceFabricCluster {
    pub(crate) fn new(inner: ClusterInner, client: Arc<AzureClient>) -> Self {
        Self { inner, client }
    }

    pub fn management_endpoint(&self) -> &str {
        &self.inner.properties.management_endpoint
    }

    pub fn cluster_endpoint(&self) -> Option<&str> {
        self.inner.properties.cluster_endpoint.as_deref()
    }

    pub fn cluster_id(&self) -> Option<&str> {
        self.inner.properties.cluster_id.as_deref()
    }

    pub fn cluster_state(&self) -> Option<&str> {
        self.inner.properties.cluster_state.as_deref()
    }

    pub fn provisioning_state(&self) -> Option<&str> {
        self.inner.properties.provisioning_state.as_deref()
    }

    pub fn node_types(&self) -> &[NodeTypeDescription] {
        &self.inner.properties.node_types
    }

    pub fn primary_node_type(&self) -> Option<&NodeTypeDescription> {
        self.inner.properties.node_types.iter().find(|nt| nt.is_primary)
    }

    pub fn reliability_level(&self) -> Option<ReliabilityLevel> {
        self.inner.properties.reliability_level
    }

    pub fn upgrade_mode(&self) -> Option<UpgradeMode> {
        self.inner.properties.upgrade_mode
    }

    pub fn cluster_code_version(&self) -> Option<&str> {
        self.inner.properties.cluster_code_version.as_deref()
    }

    pub fn vm_image(&self) -> Option<&str> {
        self.inner.properties.vm_image.as_deref()
    }

    pub fn certificate(&self) -> Option<&CertificateDescription> {
        self.inner.properties.certificate.as_ref()
    }

    pub fn fabric_settings(&self) -> &[SettingsSection] {
        &self.inner.properties.fabric_settings
    }

    pub fn available_code_versions(&self) -> Vec<&str> {
        self.inner
            .properties
            .available_cluster_versions
            .iter()
            .filter_map(|v| v.code_version.as_deref())
            .collect()
    }

    pub fn update(&self) -> ServiceFabricClusterUpdate {
        ServiceFabricClusterUpdate {
            resource_group: self.resource_group_name(),
            name: self.name().to_string(),
            tags: self.inner.tags.clone(),
            node_types: self.inner.properties.node_types.clone(),
            node_types_changed: false,
            pending_counts: Vec::new(),
            fabric_settings: self.inner.properties.fabric_settings.clone(),
            fabric_settings_changed: false,
            current_code_version: self.inner.properties.cluster_code_version.clone(),
            properties: ClusterUpdateProperties::default(),
            client: self.client.clone(),
        }
    }
}

#[async_trait]
impl Refreshable for ServiceFabricCluster {
    async fn refresh(&mut self) -> AzureResult<()> {
        let rg = self.resource_group_name();
        let name = self.name().to_string();
        self.inner = get_cluster(&self.client, &rg, &name).await?;
        Ok(())
    }
}

// ─── Definition ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ServiceFabricClusterDefinition {
    spec: GroupableSpec,
    properties: ClusterProperties,
    client: Arc<AzureClient>,
}

impl GroupableDefinition for ServiceFabricClusterDefinition {
    fn spec_mut(&mut self) -> &mut GroupableSpec {
        &mut self.spec
    }
}

impl ServiceFabricClusterDefinition {
    pub fn with_management_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.properties.management_endpoint = endpoint.into();
        self
    }

    /// Adds a node type, replacing one with the same name.
    pub fn with_node_type(mut self, node_type: NodeType) -> Self {
        self.properties.node_types.retain(|nt| nt.name != node_type.name());
        self.properties.node_types.push(node_type.description);
        self
    }

    pub fn with_reliability_level(mut self, level: ReliabilityLevel) -> Self {
        self.properties.reliability_level = Some(level);
        self
    }

    pub fn with_automatic_upgrades(mut self) -> Self {
        self.properties.upgrade_mode = Some(UpgradeMode::Automatic);
        self
    }

    /// Pins the runtime to `code_version`.
    pub fn with_manual_upgrades(mut self, code_version: impl Into<String>) -> Self {
        self.properties.upgrade_mode = Some(UpgradeMode::Manual);
        self.properties.cluster_code_version = Some(code_version.into());
        self
    }

    pub fn with_upgrade_mode(mut self, mode: UpgradeMode) -> Self {
        self.properties.upgrade_mode = Some(mode);
        self
    }

    pub fn with_cluster_code_version(mut self, code_version: impl Into<String>) -> Self {
        self.properties.cluster_code_version = Some(code_version.into());
        self
    }

    /// `Windows` or `Linux`.
    pub fn with_vm_image(mut self, image: impl Into<String>) -> Self {
        self.properties.vm_image = Some(image.into());
        self
    }

    pub fn with_certificate(mut self, thumbprint: impl Into<String>, store: X509StoreName) -> Self {
        self.properties.certificate = Some(certificate(thumbprint.into(), store));
        self
    }

    pub fn with_secondary_certificate(mut self, thumbprint: impl Into<String>) -> Self {
        let cert = self
            .properties
            .certificate
            .get_or_insert_with(|| certificate(String::new(), X509StoreName::My));
        cert.thumbprint_secondary = Some(thumbprint.into());
        self
    }

    pub fn with_reverse_proxy_certificate(mut self, thumbprint: impl Into<String>, store: X509StoreName) -> Self {
        self.properties.reverse_proxy_certificate = Some(certificate(thumbprint.into(), store));
        self
    }

    pub fn with_client_certificate_thumbprint(mut self, thumbprint: impl Into<String>, is_admin: bool) -> Self {
        self.properties.client_certificate_thumbprints.push(ClientCertificateThumbprint {
            is_admin,
            certificate_thumbprint: thumbprint.into(),
        });
        self
    }

    pub fn with_client_certificate_common_name(
        mut self,
        common_name: impl Into<String>,
        issuer_thumbprint: impl Into<String>,
        is_admin: bool,
    ) -> Self {
        self.properties.client_certificate_common_names.push(ClientCertificateCommonName {
            is_admin,
            certificate_common_name: common_name.into(),
            certificate_issuer_thumbprint: issuer_thumbprint.into(),
        });
        self
    }

    /// Public-cloud endpoints of `account_name` for support logs.
    pub fn with_diagnostics_storage_account(self, account_name: impl Into<String>) -> Self {
        let name = account_name.into();
        let config = DiagnosticsStorageAccountConfig {
            protected_account_key_name: DIAGNOSTICS_KEY_NAME.to_string(),
            blob_endpoint: format!("https://{name}.blob.core.windows.net/"),
            queue_endpoint: format!("https://{name}.queue.core.windows.net/"),
            table_endpoint: format!("https://{name}.table.core.windows.net/"),
            storage_account_name: name,
        };
        self.with_diagnostics_storage_account_config(config)
    }

    pub fn with_diagnostics_storage_account_config(mut self, config: DiagnosticsStorageAccountConfig) -> Self {
        self.properties.diagnostics_storage_account_config = Some(config);
        self
    }

    pub fn with_fabric_setting(
        mut self,
        section: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        set_fabric_setting(&mut self.properties.fabric_settings, section.into(), name.into(), value.into());
        self
    }

    pub fn with_azure_active_directory(
        mut self,
        tenant_id: impl Into<String>,
        cluster_application: impl Into<String>,
        client_application: impl Into<String>,
    ) -> Self {
        self.properties.azure_active_directory = Some(AzureActiveDirectory {
            tenant_id: Some(tenant_id.into()),
            cluster_application: Some(cluster_application.into()),
            client_application: Some(client_application.into()),
        });
        self
    }

    fn validate(&self) -> AzureResult<()> {
        self.spec.validate()?;
        require("managementEndpoint", &self.properties.management_endpoint)?;
        validate_node_types(&self.properties.node_types)?;
        validate_upgrade(
            self.properties.upgrade_mode,
            self.properties.cluster_code_version.as_deref(),
        )?;
        if let Some(cert) = &self.properties.certificate {
            require("certificate.thumbprint", &cert.thumbprint)?;
        }
        Ok(())
    }

    fn to_inner(&self) -> AzureResult<ClusterInner> {
        Ok(ClusterInner {
            location: Some(self.spec.region_name()?),
            tags: self.spec.tags.clone(),
            properties: self.properties.clone(),
            ..Default::default()
        })
    }
}

#[async_trait]
impl Creatable for ServiceFabricClusterDefinition {
    type Output = ServiceFabricCluster;

    async fn create(self) -> AzureResult<ServiceFabricCluster> {
        self.validate()?;
        let body = self.to_inner()?;
        self.spec.ensure_resource_group(&self.client).await?;

        let rg = self.spec.resource_group()?;
        let inner = create_cluster(&self.client, rg, &self.spec.name, &body).await?;
        info!("Created Service Fabric cluster {}/{}", rg, self.spec.name);
        Ok(ServiceFabricCluster::new(inner, self.client))
    }
}

// ─── Update ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ServiceFabricClusterUpdate {
    resource_group: String,
    name: String,
    tags: HashMap<String, String>,
    node_types: Vec<NodeTypeDescription>,
    node_types_changed: bool,
    pending_counts: Vec<(String, u32)>,
    fabric_settings: Vec<SettingsSection>,
    fabric_settings_changed: bool,
    current_code_version: Option<String>,
    properties: ClusterUpdateProperties,
    client: Arc<AzureClient>,
}

impl ServiceFabricClusterUpdate {
    pub fn with_node_type(mut self, node_type: NodeType) -> Self {
        self.node_types.retain(|nt| nt.name != node_type.name());
        self.node_types.push(node_type.description);
        self.node_types_changed = true;
        self
    }

    pub fn without_node_type(mut self, name: &str) -> Self {
        self.node_types.retain(|nt| nt.name != name);
        self.node_types_changed = true;
        self
    }

    /// Resized at apply time; an unknown name fails the update.
    pub fn with_node_type_instance_count(mut self, name: impl Into<String>, count: u32) -> Self {
        self.pending_counts.push((name.into(), count));
        self
    }

    pub fn with_reliability_level(mut self, level: ReliabilityLevel) -> Self {
        self.properties.reliability_level = Some(level);
        self
    }

    pub fn with_automatic_upgrades(mut self) -> Self {
        self.properties.upgrade_mode = Some(UpgradeMode::Automatic);
        self
    }

    pub fn with_manual_upgrades(mut self, code_version: impl Into<String>) -> Self {
        self.properties.upgrade_mode = Some(UpgradeMode::Manual);
        self.properties.cluster_code_version = Some(code_version.into());
        self
    }

    pub fn with_cluster_code_version(mut self, code_version: impl Into<String>) -> Self {
        self.properties.cluster_code_version = Some(code_version.into());
        self
    }

    pub fn with_certificate(mut self, thumbprint: impl Into<String>, store: X509StoreName) -> Self {
        self.properties.certificate = Some(certificate(thumbprint.into(), store));
        self
    }

    pub fn with_reverse_proxy_certificate(mut self, thumbprint: impl Into<String>, store: X509StoreName) -> Self {
        self.properties.reverse_proxy_certificate = Some(certificate(thumbprint.into(), store));
        self
    }

    pub fn with_client_certificate_thumbprints(mut self, thumbprints: Vec<ClientCertificateThumbprint>) -> Self {
        self.properties.client_certificate_thumbprints = Some(thumbprints);
        self
    }

    pub fn with_client_certificate_common_names(mut self, names: Vec<ClientCertificateCommonName>) -> Self {
        self.properties.client_certificate_common_names = Some(names);
        self
    }

    pub fn with_fabric_setting(
        mut self,
        section: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        set_fabric_setting(&mut self.fabric_settings, section.into(), name.into(), value.into());
        self.fabric_settings_changed = true;
        self
    }

    pub fn without_fabric_setting_section(mut self, section: &str) -> Self {
        self.fabric_settings.retain(|s| s.name != section);
        self.fabric_settings_changed = true;
        self
    }
}

impl TaggableUpdate for ServiceFabricClusterUpdate {
    fn tags_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.tags
    }
}

#[async_trait]
impl Appliable for ServiceFabricClusterUpdate {
    type Output = ServiceFabricCluster;

    async fn apply(mut self) -> AzureResult<ServiceFabricCluster> {
        for (name, count) in &self.pending_counts {
            let nt = self
                .node_types
                .iter_mut()
                .find(|nt| &nt.name == name)
                .ok_or_else(|| AzureError::validation(format!("Cannot find node type with the name '{name}'")))?;
            nt.vm_instance_count = *count;
            self.node_types_changed = true;
        }
        if self.node_types_changed {
            validate_node_types(&self.node_types)?;
            self.properties.node_types = Some(self.node_types);
        }
        if self.fabric_settings_changed {
            self.properties.fabric_settings = Some(self.fabric_settings);
        }
        let code_version = self
            .properties
            .cluster_code_version
            .as_deref()
            .or(self.current_code_version.as_deref());
        validate_upgrade(self.properties.upgrade_mode, code_version)?;

        let body = ClusterUpdateParameters {
            tags: self.tags,
            properties: self.properties,
        };
        let inner = update_cluster(&self.client, &self.resource_group, &self.name, &body).await?;
        info!("Updated Service Fabric cluster {}/{}", self.resource_group, self.name);
        Ok(ServiceFabricCluster::new(inner, self.client))
    }
}

// ─── Collection ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ServiceFabricClusters {
    client: Arc<AzureClient>,
}

impl ServiceFabricClusters {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    fn wrap(&self, inner: ClusterInner) -> ServiceFabricCluster {
        ServiceFabricCluster::new(inner, self.client.clone())
    }

    pub fn define(&self, name: impl Into<String>) -> ServiceFabricClusterDefinition {
        ServiceFabricClusterDefinition {
            spec: GroupableSpec::new(name),
            properties: ClusterProperties::default(),
            client: self.client.clone(),
        }
    }

    pub async fn list_cluster_code_versions(&self, location: &str) -> AzureResult<Vec<ClusterCodeVersionsResult>> {
        list_cluster_code_versions(&self.client, location).await
    }
}

#[async_trait]
impl SupportsListing for ServiceFabricClusters {
    type Item = ServiceFabricCluster;

    async fn list(&self) -> AzureResult<Vec<ServiceFabricCluster>> {
        Ok(list_clusters(&self.client)
            .await?
            .into_iter()
            .map(|inner| self.wrap(inner))
            .collect())
    }
}

#[async_trait]
impl SupportsListingByResourceGroup for ServiceFabricClusters {
    type Item = ServiceFabricCluster;

    async fn list_by_resource_group(&self, resource_group: &str) -> AzureResult<Vec<ServiceFabricCluster>> {
        Ok(list_clusters_by_resource_group(&self.client, resource_group)
            .await?
            .into_iter()
            .map(|inner| self.wrap(inner))
            .collect())
    }
}

#[async_trait]
impl SupportsGettingByResourceGroup for ServiceFabricClusters {
    type Item = ServiceFabricCluster;

    async fn get_by_resource_group(&self, resource_group: &str, name: &str) -> AzureResult<ServiceFabricCluster> {
        Ok(self.wrap(get_cluster(&self.client, resource_group, name).await?))
    }
}

#[async_trait]
impl SupportsDeletingByResourceGroup for ServiceFabricClusters {
    async fn delete_by_resource_group(&self, resource_group: &str, name: &str) -> AzureResult<()> {
        delete_cluster(&self.client, resource_group, name).await?;
        info!("Deleted Service Fabric cluster {}/{}", resource_group, name);
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
