//! Managed Kubernetes (AKS) clusters and their agent pools.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use azfluent_core::fluent::{
    Appliable, Creatable, GroupableDefinition, GroupableResource, GroupableSpec, Refreshable,
    Resource, SupportsDeletingByResourceGroup, SupportsGettingByResourceGroup, SupportsListing,
    SupportsListingByResourceGroup, TaggableUpdate,
};
use azfluent_core::types::{require, AzureError, AzureErrorKind, AzureResult, ManagedIdentity};
use azfluent_core::{async_trait, impl_groupable_resource, AzureClient};
use base64::Engine;
use log::{debug, info};

use crate::private_endpoint_connections::PrivateEndpointConnections;
use crate::types::{
    AgentPoolInner, AgentPoolMode, AgentPoolProfile, AgentPoolType, CredentialResults, LinuxProfile,
    ManagedClusterInner, ManagedClusterProperties, NetworkPlugin, NetworkProfile,
    OrchestratorVersionProfileListResult, OsType, ServicePrincipalProfile, SshConfiguration,
    SshPublicKey,
};

/// The orchestrators listing is only served at this api-version.
const ORCHESTRATORS_API_VERSION: &str = "2019-08-01";
const MAX_AGENT_POOL_NAME_LEN: usize = 12;

/// Agent pool names: 1 to 12 lowercase alphanumerics starting with a letter.
pub fn validate_agent_pool_name(name: &str) -> AzureResult<()> {
    let valid = !name.is_empty()
        && name.len() <= MAX_AGENT_POOL_NAME_LEN
        && name.starts_with(|c: char| c.is_ascii_lowercase())
        && name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    if !valid {
        return Err(AzureError::validation(format!(
            "Agent pool name '{name}' must be 1-{MAX_AGENT_POOL_NAME_LEN} lowercase letters or digits starting with a letter"
        )));
    }
    Ok(())
}

/// Numeric comparison of dotted versions (`1.9.0` < `1.10.0`).
fn compare_versions(a: &str, b: &str) -> Ordering {
    let parts = |v: &str| -> Vec<u64> { v.split('.').map(|p| p.parse().unwrap_or(0)).collect() };
    parts(a).cmp(&parts(b))
}

// ─── REST operations ────────────────────────────────────────────────

fn cluster_url(client: &AzureClient, resource_group: &str, name: &str, suffix: &str) -> AzureResult<String> {
    require("resourceGroupName", resource_group)?;
    require("resourceName", name)?;
    client.resource_group_url(
        resource_group,
        &format!(
            "/providers/Microsoft.ContainerService/managedClusters/{}{}?api-version={}",
            name,
            suffix,
            client.config().api_version_container_service
        ),
    )
}

pub async fn list_managed_clusters(client: &AzureClient) -> AzureResult<Vec<ManagedClusterInner>> {
    let url = client.subscription_url(&format!(
        "/providers/Microsoft.ContainerService/managedClusters?api-version={}",
        client.config().api_version_container_service
    ))?;
    debug!("list_managed_clusters → {}", url);
    client.get_all_pages(&url).await
}

pub async fn list_managed_clusters_by_resource_group(
    client: &AzureClient,
    resource_group: &str,
) -> AzureResult<Vec<ManagedClusterInner>> {
    let url = client.resource_group_url(
        resource_group,
        &format!(
            "/providers/Microsoft.ContainerService/managedClusters?api-version={}",
            client.config().api_version_container_service
        ),
    )?;
    debug!("list_managed_clusters_by_resource_group({}) → {}", resource_group, url);
    client.get_all_pages(&url).await
}

pub async fn get_managed_cluster(client: &AzureClient, resource_group: &str, name: &str) -> AzureResult<ManagedClusterInner> {
    let url = cluster_url(client, resource_group, name, "")?;
    debug!("get_managed_cluster({}/{}) → {}", resource_group, name, url);
    client.get_json(&url).await
}

pub async fn create_or_update_managed_cluster(
    client: &AzureClient,
    resource_group: &str,
    name: &str,
    cluster: &ManagedClusterInner,
) -> AzureResult<ManagedClusterInner> {
    let url = cluster_url(client, resource_group, name, "")?;
    debug!("create_or_update_managed_cluster({}/{}) → {}", resource_group, name, url);
    client.put_json(&url, cluster).await
}

pub async fn delete_managed_cluster(client: &AzureClient, resource_group: &str, name: &str) -> AzureResult<()> {
    let url = cluster_url(client, resource_group, name, "")?;
    debug!("delete_managed_cluster({}/{}) → {}", resource_group, name, url);
    client.delete(&url).await
}

pub async fn start_managed_cluster(client: &AzureClient, resource_group: &str, name: &str) -> AzureResult<()> {
    let url = cluster_url(client, resource_group, name, "/start")?;
    debug!("start_managed_cluster({}/{}) → {}", resource_group, name, url);
    client.post_action(&url).await
}

pub async fn stop_managed_cluster(client: &AzureClient, resource_group: &str, name: &str) -> AzureResult<()> {
    let url = cluster_url(client, resource_group, name, "/stop")?;
    debug!("stop_managed_cluster({}/{}) → {}", resource_group, name, url);
    client.post_action(&url).await
}

pub async fn list_cluster_admin_credentials(
    client: &AzureClient,
    resource_group: &str,
    name: &str,
) -> AzureResult<CredentialResults> {
    let url = cluster_url(client, resource_group, name, "/listClusterAdminCredential")?;
    debug!("list_cluster_admin_credentials({}/{}) → {}", resource_group, name, url);
    client.post_for_json(&url).await
}

pub async fn list_cluster_user_credentials(
    client: &AzureClient,
    resource_group: &str,
    name: &str,
) -> AzureResult<CredentialResults> {
    let url = cluster_url(client, resource_group, name, "/listClusterUserCredential")?;
    debug!("list_cluster_user_credentials({}/{}) → {}", resource_group, name, url);
    client.post_for_json(&url).await
}

pub async fn list_orchestrators(client: &AzureClient, location: &str) -> AzureResult<OrchestratorVersionProfileListResult> {
    require("location", location)?;
    let url = client.subscription_url(&format!(
        "/providers/Microsoft.ContainerService/locations/{}/orchestrators?api-version={}&resource-type=managedClusters",
        location, ORCHESTRATORS_API_VERSION
    ))?;
    debug!("list_orchestrators({}) → {}", location, url);
    client.get_json(&url).await
}

pub async fn list_agent_pools(client: &AzureClient, resource_group: &str, cluster: &str) -> AzureResult<Vec<AgentPoolInner>> {
    let url = cluster_url(client, resource_group, cluster, "/agentPools")?;
    debug!("list_agent_pools({}/{}) → {}", resource_group, cluster, url);
    client.get_all_pages(&url).await
}

pub async fn get_agent_pool(
    client: &AzureClient,
    resource_group: &str,
    cluster: &str,
    pool: &str,
) -> AzureResult<AgentPoolInner> {
    require("agentPoolName", pool)?;
    let url = cluster_url(client, resource_group, cluster, &format!("/agentPools/{pool}"))?;
    debug!("get_agent_pool({}/{}/{}) → {}", resource_group, cluster, pool, url);
    client.get_json(&url).await
}

pub async fn create_or_update_agent_pool(
    client: &AzureClient,
    resource_group: &str,
    cluster: &str,
    pool: &str,
    body: &AgentPoolInner,
) -> AzureResult<AgentPoolInner> {
    require("agentPoolName", pool)?;
    let url = cluster_url(client, resource_group, cluster, &format!("/agentPools/{pool}"))?;
    debug!("create_or_update_agent_pool({}/{}/{}) → {}", resource_group, cluster, pool, url);
    client.put_json(&url, body).await
}

pub async fn delete_agent_pool(client: &AzureClient, resource_group: &str, cluster: &str, pool: &str) -> AzureResult<()> {
    require("agentPoolName", pool)?;
    let url = cluster_url(client, resource_group, cluster, &format!("/agentPools/{pool}"))?;
    debug!("delete_agent_pool({}/{}/{}) → {}", resource_group, cluster, pool, url);
    client.delete(&url).await
}

/// Kubernetes versions offered in `location`, sorted as strings.
pub async fn list_kubernetes_versions(client: &AzureClient, location: &str) -> AzureResult<BTreeSet<String>> {
    let result = list_orchestrators(client, location).await?;
    Ok(result
        .properties
        .orchestrators
        .into_iter()
        .filter(|o| o.orchestrator_type == "Kubernetes")
        .map(|o| o.orchestrator_version)
        .collect())
}

/// Decoded content of the first kubeconfig, empty when none is returned.
fn first_kube_config(results: CredentialResults) -> AzureResult<Vec<u8>> {
    let Some(value) = results.kubeconfigs.into_iter().find_map(|k| k.value) else {
        return Ok(Vec::new());
    };
    base64::engine::general_purpose::STANDARD
        .decode(value.trim())
        .map_err(|e| AzureError::new(AzureErrorKind::Parse, format!("Invalid kubeconfig encoding: {e}")))
}

// ─── Agent pool builder ─────────────────────────────────────────────

/// Definition of one agent pool, attached with
/// [`KubernetesClusterDefinition::with_agent_pool`].
#[derive(Debug, Clone, PartialEq)]
pub struct AgentPool {
    profile: AgentPoolProfile,
}

impl AgentPool {
    /// Defaults to one Linux VMSS `User` node.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            profile: AgentPoolProfile {
                name: name.into(),
                count: Some(1),
                os_type: Some(OsType::Linux),
                pool_type: Some(AgentPoolType::VirtualMachineScaleSets),
                mode: Some(AgentPoolMode::User),
                ..Default::default()
            },
        }
    }

    pub fn from_profile(profile: AgentPoolProfile) -> Self {
        Self { profile }
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn profile(&self) -> &AgentPoolProfile {
        &self.profile
    }

    pub fn with_virtual_machine_size(mut self, vm_size: impl Into<String>) -> Self {
        self.profile.vm_size = Some(vm_size.into());
        self
    }

    pub fn with_agent_pool_virtual_machine_count(mut self, count: u32) -> Self {
        self.profile.count = Some(count);
        self
    }

    pub fn with_os_type(mut self, os_type: OsType) -> Self {
        self.profile.os_type = Some(os_type);
        self
    }

    pub fn with_os_disk_size_in_gb(mut self, size_gb: u32) -> Self {
        self.profile.os_disk_size_gb = Some(size_gb);
        self
    }

    pub fn with_max_pods_count(mut self, max_pods: u32) -> Self {
        self.profile.max_pods = Some(max_pods);
        self
    }

    pub fn with_mode(mut self, mode: AgentPoolMode) -> Self {
        self.profile.mode = Some(mode);
        self
    }

    pub fn with_agent_pool_type(mut self, pool_type: AgentPoolType) -> Self {
        self.profile.pool_type = Some(pool_type);
        self
    }

    /// Places nodes in `{virtual_network_id}/subnets/{subnet_name}`.
    pub fn with_virtual_network(mut self, virtual_network_id: &str, subnet_name: &str) -> Self {
        self.profile.vnet_subnet_id = Some(format!(
            "{}/subnets/{}",
            virtual_network_id.trim_end_matches('/'),
            subnet_name
        ));
        self
    }

    pub fn with_auto_scaling(mut self, min_count: u32, max_count: u32) -> Self {
        self.profile.enable_auto_scaling = Some(true);
        self.profile.min_count = Some(min_count);
        self.profile.max_count = Some(max_count);
        self
    }

    pub fn with_availability_zones(mut self, zones: Vec<String>) -> Self {
        self.profile.availability_zones = zones;
        self
    }

    pub fn with_node_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.profile.node_labels.insert(key.into(), value.into());
        self
    }

    pub fn validate(&self) -> AzureResult<()> {
        validate_agent_pool_name(&self.profile.name)?;
        if self.profile.vm_size.as_deref().unwrap_or_default().is_empty() {
            return Err(AzureError::required("vmSize"));
        }
        if self.profile.count == Some(0) {
            return Err(AzureError::validation(format!(
                "Agent pool '{}' needs at least one node",
                self.profile.name
            )));
        }
        if let (Some(min), Some(max)) = (self.profile.min_count, self.profile.max_count) {
            if min > max {
                return Err(AzureError::validation(format!(
                    "Agent pool '{}' minimum count exceeds maximum count",
                    self.profile.name
                )));
            }
        }
        Ok(())
    }
}

fn validate_agent_pools(pools: &[AgentPoolProfile]) -> AzureResult<()> {
    if pools.is_empty() {
        return Err(AzureError::validation("A Kubernetes cluster requires at least one agent pool"));
    }
    let mut names = BTreeSet::new();
    for p in pools {
        AgentPool::from_profile(p.clone()).validate()?;
        if !names.insert(p.name.as_str()) {
            return Err(AzureError::validation(format!("Duplicate agent pool name '{}'", p.name)));
        }
    }
    if !pools.iter().any(|p| p.mode == Some(AgentPoolMode::System)) {
        return Err(AzureError::validation(
            "A Kubernetes cluster requires at least one agent pool in System mode",
        ));
    }
    Ok(())
}

// ─── Fluent wrapper ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct KubernetesCluster {
    inner: ManagedClusterInner,
    client: Arc<AzureClient>,
}

impl_groupable_resource!(KubernetesCluster, ManagedClusterInner);

impl KubernetesCluster {
    pub(crate) fn new(inner: ManagedClusterInner, client: Arc<AzureClient>) -> Self {
        Self { inner, client }
    }

    fn props(&self) -> &ManagedClusterProperties {
        &self.inner.properties
    }

    pub fn provisioning_state(&self) -> Option<&str> {
        self.props().provisioning_state.as_deref()
    }

    pub fn power_state(&self) -> Option<&str> {
        self.props().power_state.as_ref().and_then(|p| p.code.as_deref())
    }

    pub fn dns_prefix(&self) -> Option<&str> {
        self.props().dns_prefix.as_deref()
    }

    pub fn fqdn(&self) -> Option<&str> {
        self.props().fqdn.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.props().kubernetes_version.as_deref()
    }

    pub fn node_resource_group(&self) -> Option<&str> {
        self.props().node_resource_group.as_deref()
    }

    pub fn linux_root_username(&self) -> Option<&str> {
        self.props().linux_profile.as_ref().map(|l| l.admin_username.as_str())
    }

    pub fn ssh_key(&self) -> Option<&str> {
        self.props()
            .linux_profile
            .as_ref()
            .and_then(|l| l.ssh.public_keys.first())
            .map(|k| k.key_data.as_str())
    }

    pub fn service_principal_client_id(&self) -> Option<&str> {
        self.props().service_principal_profile.as_ref().map(|s| s.client_id.as_str())
    }

    pub fn service_principal_secret(&self) -> Option<&str> {
        self.props()
            .service_principal_profile
            .as_ref()
            .and_then(|s| s.secret.as_deref())
    }

    pub fn system_assigned_principal_id(&self) -> Option<&str> {
        self.inner.identity.as_ref().and_then(|i| i.principal_id.as_deref())
    }

    pub fn is_rbac_enabled(&self) -> bool {
        self.props().enable_rbac.unwrap_or(false)
    }

    pub fn network_plugin(&self) -> Option<NetworkPlugin> {
        self.props().network_profile.as_ref().and_then(|n| n.network_plugin)
    }

    pub fn agent_pools(&self) -> Vec<AgentPool> {
        self.props()
            .agent_pool_profiles
            .iter()
            .cloned()
            .map(AgentPool::from_profile)
            .collect()
    }

    pub fn agent_pool(&self, name: &str) -> Option<AgentPool> {
        self.agent_pools().into_iter().find(|p| p.name() == name)
    }

    pub async fn admin_kube_config_content(&self) -> AzureResult<Vec<u8>> {
        let creds = list_cluster_admin_credentials(&self.client, &self.resource_group_name(), self.name()).await?;
        first_kube_config(creds)
    }

    pub async fn user_kube_config_content(&self) -> AzureResult<Vec<u8>> {
        let creds = list_cluster_user_credentials(&self.client, &self.resource_group_name(), self.name()).await?;
        first_kube_config(creds)
    }

    pub async fn start(&self) -> AzureResult<()> {
        start_managed_cluster(&self.client, &self.resource_group_name(), self.name()).await?;
        info!("Started Kubernetes cluster {}", self.name());
        Ok(())
    }

    pub async fn stop(&self) -> AzureResult<()> {
        stop_managed_cluster(&self.client, &self.resource_group_name(), self.name()).await?;
        info!("Stopped Kubernetes cluster {}", self.name());
        Ok(())
    }

    pub fn update(&self) -> KubernetesClusterUpdate {
        KubernetesClusterUpdate {
            inner: self.inner.clone(),
            pending_counts: Vec::new(),
            client: self.client.clone(),
        }
    }
}

#[async_trait]
impl Refreshable for KubernetesCluster {
    async fn refresh(&mut self) -> AzureResult<()> {
        let rg = self.resource_group_name();
        let name = self.name().to_string();
        self.inner = get_managed_cluster(&self.client, &rg, &name).await?;
        Ok(())
    }
}

// ─── Definition ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct KubernetesClusterDefinition {
    spec: GroupableSpec,
    version: Option<String>,
    use_latest_version: bool,
    root_username: Option<String>,
    ssh_key: Option<String>,
    sp_client_id: Option<String>,
    sp_secret: Option<String>,
    system_identity: bool,
    agent_pools: Vec<AgentPoolProfile>,
    dns_prefix: Option<String>,
    enable_rbac: Option<bool>,
    network_profile: Option<NetworkProfile>,
    client: Arc<AzureClient>,
}

impl GroupableDefinition for KubernetesClusterDefinition {
    fn spec_mut(&mut self) -> &mut GroupableSpec {
        &mut self.spec
    }
}

impl KubernetesClusterDefinition {
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self.use_latest_version = false;
        self
    }

    /// Resolves the newest version offered in the region at create time.
    pub fn with_latest_version(mut self) -> Self {
        self.version = None;
        self.use_latest_version = true;
        self
    }

    pub fn with_root_username(mut self, username: impl Into<String>) -> Self {
        self.root_username = Some(username.into());
        self
    }

    pub fn with_ssh_key(mut self, public_key: impl Into<String>) -> Self {
        self.ssh_key = Some(public_key.into());
        self
    }

    pub fn with_service_principal_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.sp_client_id = Some(client_id.into());
        self
    }

    pub fn with_service_principal_secret(mut self, secret: impl Into<String>) -> Self {
        self.sp_secret = Some(secret.into());
        self
    }

    pub fn with_system_assigned_managed_service_identity(mut self) -> Self {
        self.system_identity = true;
        self
    }

    /// Adds the pool, replacing one with the same name.
    pub fn with_agent_pool(mut self, pool: AgentPool) -> Self {
        self.agent_pools.retain(|p| p.name != pool.profile.name);
        self.agent_pools.push(pool.profile);
        self
    }

    pub fn with_dns_prefix(mut self, dns_prefix: impl Into<String>) -> Self {
        self.dns_prefix = Some(dns_prefix.into());
        self
    }

    pub fn with_rbac_enabled(mut self) -> Self {
        self.enable_rbac = Some(true);
        self
    }

    pub fn with_rbac_disabled(mut self) -> Self {
        self.enable_rbac = Some(false);
        self
    }

    pub fn with_network_plugin(mut self, plugin: NetworkPlugin) -> Self {
        self.network_profile.get_or_insert_with(NetworkProfile::default).network_plugin = Some(plugin);
        self
    }

    pub fn with_network_profile(mut self, profile: NetworkProfile) -> Self {
        self.network_profile = Some(profile);
        self
    }

    /// Explicit prefix, else `{name}-dns`.
    pub fn dns_prefix(&self) -> String {
        self.dns_prefix
            .clone()
            .unwrap_or_else(|| format!("{}-dns", self.spec.name))
    }

    pub fn agent_pools(&self) -> &[AgentPoolProfile] {
        &self.agent_pools
    }

    fn validate(&self) -> AzureResult<()> {
        self.spec.validate()?;
        validate_agent_pools(&self.agent_pools)?;
        require("linuxProfile.adminUsername", self.root_username.as_deref().unwrap_or_default())?;
        require("linuxProfile.ssh.publicKeys", self.ssh_key.as_deref().unwrap_or_default())?;
        let has_sp = self.sp_client_id.as_deref().is_some_and(|c| !c.trim().is_empty());
        if has_sp && self.sp_secret.as_deref().map_or(true, |s| s.trim().is_empty()) {
            return Err(AzureError::required("servicePrincipalProfile.secret"));
        }
        if !has_sp && !self.system_identity {
            return Err(AzureError::validation(
                "A Kubernetes cluster requires a service principal or a system-assigned identity",
            ));
        }
        if !self.use_latest_version && self.version.is_none() {
            return Err(AzureError::required("kubernetesVersion"));
        }
        Ok(())
    }

    pub(crate) fn to_inner(&self, version: String) -> AzureResult<ManagedClusterInner> {
        let properties = ManagedClusterProperties {
            kubernetes_version: Some(version),
            dns_prefix: Some(self.dns_prefix()),
            agent_pool_profiles: self.agent_pools.clone(),
            linux_profile: Some(LinuxProfile {
                admin_username: self.root_username.clone().unwrap_or_default(),
                ssh: SshConfiguration {
                    public_keys: vec![SshPublicKey {
                        key_data: self.ssh_key.clone().unwrap_or_default(),
                    }],
                },
            }),
            service_principal_profile: self.sp_client_id.as_ref().map(|id| ServicePrincipalProfile {
                client_id: id.clone(),
                secret: self.sp_secret.clone(),
            }),
            enable_rbac: self.enable_rbac,
            network_profile: self.network_profile.clone(),
            ..Default::default()
        };
        Ok(ManagedClusterInner {
            location: Some(self.spec.region_name()?),
            tags: self.spec.tags.clone(),
            identity: self.system_identity.then(ManagedIdentity::system_assigned),
            properties,
            ..Default::default()
        })
    }
}

#[async_trait]
impl Creatable for KubernetesClusterDefinition {
    type Output = KubernetesCluster;

    async fn create(self) -> AzureResult<KubernetesCluster> {
        self.validate()?;
        let version = match &self.version {
            Some(v) => v.clone(),
            None => {
                let region = self.spec.region_name()?;
                let versions = list_kubernetes_versions(&self.client, &region).await?;
                versions
                    .into_iter()
                    .max_by(|a, b| compare_versions(a, b))
                    .ok_or_else(|| AzureError::validation(format!("No Kubernetes versions are offered in {region}")))?
            }
        };
        let body = self.to_inner(version)?;
        self.spec.ensure_resource_group(&self.client).await?;

        let rg = self.spec.resource_group()?;
        let inner = create_or_update_managed_cluster(&self.client, rg, &self.spec.name, &body).await?;
        info!("Created Kubernetes cluster {}/{}", rg, self.spec.name);
        Ok(KubernetesCluster::new(inner, self.client))
    }
}

// ─── Update ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct KubernetesClusterUpdate {
    inner: ManagedClusterInner,
    pending_counts: Vec<(String, u32)>,
    client: Arc<AzureClient>,
}

impl KubernetesClusterUpdate {
    /// Resizes an existing pool; an unknown pool name fails at `apply`.
    pub fn with_agent_pool_virtual_machine_count(mut self, pool: impl Into<String>, count: u32) -> Self {
        self.pending_counts.push((pool.into(), count));
        self
    }

    pub fn with_agent_pool(mut self, pool: AgentPool) -> Self {
        let pools = &mut self.inner.properties.agent_pool_profiles;
        match pools.iter_mut().find(|p| p.name == pool.profile.name) {
            Some(existing) => *existing = pool.profile,
            None => pools.push(pool.profile),
        }
        self
    }

    pub fn without_agent_pool(mut self, name: &str) -> Self {
        self.inner.properties.agent_pool_profiles.retain(|p| p.name != name);
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.inner.properties.kubernetes_version = Some(version.into());
        self
    }

    pub fn with_rbac_enabled(mut self) -> Self {
        self.inner.properties.enable_rbac = Some(true);
        self
    }

    pub fn with_rbac_disabled(mut self) -> Self {
        self.inner.properties.enable_rbac = Some(false);
        self
    }
}

impl TaggableUpdate for KubernetesClusterUpdate {
    fn tags_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.inner.tags
    }
}

#[async_trait]
impl Appliable for KubernetesClusterUpdate {
    type Output = KubernetesCluster;

    async fn apply(mut self) -> AzureResult<KubernetesCluster> {
        for (name, count) in std::mem::take(&mut self.pending_counts) {
            let pool = self
                .inner
                .properties
                .agent_pool_profiles
                .iter_mut()
                .find(|p| p.name == name)
                .ok_or_else(|| AzureError::validation(format!("Cannot find agent pool with the name '{name}'")))?;
            pool.count = Some(count);
        }
        validate_agent_pools(&self.inner.properties.agent_pool_profiles)?;

        let rg = azfluent_core::resource_id::resource_group_from_id(self.inner.id.as_deref().unwrap_or_default())
            .ok_or_else(AzureError::resource_group_required)?;
        let name = self.inner.name.clone().unwrap_or_default();
        let inner = create_or_update_managed_cluster(&self.client, &rg, &name, &self.inner).await?;
        info!("Updated Kubernetes cluster {}/{}", rg, name);
        Ok(KubernetesCluster::new(inner, self.client))
    }
}

// ─── Collection ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct KubernetesClusters {
    client: Arc<AzureClient>,
}

impl KubernetesClusters {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    fn wrap(&self, inner: ManagedClusterInner) -> KubernetesCluster {
        KubernetesCluster::new(inner, self.client.clone())
    }

    pub fn define(&self, name: impl Into<String>) -> KubernetesClusterDefinition {
        KubernetesClusterDefinition {
            spec: GroupableSpec::new(name),
            version: None,
            use_latest_version: false,
            root_username: None,
            ssh_key: None,
            sp_client_id: None,
            sp_secret: None,
            system_identity: false,
            agent_pools: Vec::new(),
            dns_prefix: None,
            enable_rbac: None,
            network_profile: None,
            client: self.client.clone(),
        }
    }

    pub async fn list_kubernetes_versions(&self, region: &str) -> AzureResult<BTreeSet<String>> {
        list_kubernetes_versions(&self.client, region).await
    }

    pub async fn admin_kube_config_content(&self, resource_group: &str, name: &str) -> AzureResult<Vec<u8>> {
        first_kube_config(list_cluster_admin_credentials(&self.client, resource_group, name).await?)
    }

    pub async fn user_kube_config_content(&self, resource_group: &str, name: &str) -> AzureResult<Vec<u8>> {
        first_kube_config(list_cluster_user_credentials(&self.client, resource_group, name).await?)
    }

    pub async fn start(&self, resource_group: &str, name: &str) -> AzureResult<()> {
        start_managed_cluster(&self.client, resource_group, name).await?;
        info!("Started Kubernetes cluster {}/{}", resource_group, name);
        Ok(())
    }

    pub async fn stop(&self, resource_group: &str, name: &str) -> AzureResult<()> {
        stop_managed_cluster(&self.client, resource_group, name).await?;
        info!("Stopped Kubernetes cluster {}/{}", resource_group, name);
        Ok(())
    }

    pub async fn list_agent_pools(&self, resource_group: &str, cluster: &str) -> AzureResult<Vec<AgentPoolInner>> {
        list_agent_pools(&self.client, resource_group, cluster).await
    }

    pub fn private_endpoint_connections(&self) -> PrivateEndpointConnections {
        PrivateEndpointConnections::new(self.client.clone())
    }
}

#[async_trait]
impl SupportsListing for KubernetesClusters {
    type Item = KubernetesCluster;

    async fn list(&self) -> AzureResult<Vec<KubernetesCluster>> {
        Ok(list_managed_clusters(&self.client)
            .await?
            .into_iter()
            .map(|inner| self.wrap(inner))
            .collect())
    }
}

#[async_trait]
impl SupportsListingByResourceGroup for KubernetesClusters {
    type Item = KubernetesCluster;

    async fn list_by_resource_group(&self, resource_group: &str) -> AzureResult<Vec<KubernetesCluster>> {
        Ok(list_managed_clusters_by_resource_group(&self.client, resource_group)
            .await?
            .into_iter()
            .map(|inner| self.wrap(inner))
            .collect())
    }
}

#[async_trait]
impl SupportsGettingByResourceGroup for KubernetesClusters {
    type Item = KubernetesCluster;

    async fn get_by_resource_group(&self, resource_group: &str, name: &str) -> AzureResult<KubernetesCluster> {
        Ok(self.wrap(get_managed_cluster(&self.client, resource_group, name).await?))
    }
}

#[async_trait]
impl SupportsDeletingByResourceGroup for KubernetesClusters {
    async fn delete_by_resource_group(&self, resource_group: &str, name: &str) -> AzureResult<()> {
        delete_managed_cluster(&self.client, resource_group, name).await?;
        info!("Deleted Kubernetes cluster {}/{}", resource_group, name);
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
