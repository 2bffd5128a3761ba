//! # azfluent
//!
//! Fluent Azure Resource Manager client. One [`Azure`] value authenticates
//! once and hands out every collection:
//!
//! - **Resources** – resource groups, generic resources, deployments,
//!   subscriptions, providers, tags
//! - **Compute** – virtual machines, availability sets, disks, snapshots
//! - **Storage** – accounts, blob containers, management policies
//! - **Monitor** – action groups, metric alerts, autoscale, diagnostic settings,
//!   activity logs, metrics
//! - **Container Service** – managed Kubernetes clusters
//! - **SQL** – servers, databases, elastic pools, firewall rules
//! - **Service Fabric** – clusters
//!
//! Credentials come from code, the `AZURE_*` environment variables or an SDK
//! auth file. Tokens are acquired lazily on the first request and shared by
//! every collection.

use std::path::Path;
use std::sync::Arc;

use log::{debug, info};

pub use azfluent_compute as compute;
pub use azfluent_containerservice as containerservice;
pub use azfluent_core::{AuthFile, AzureClient, ResourceId};
pub use azfluent_monitor as monitor;
pub use azfluent_resources as resources;
pub use azfluent_servicefabric as servicefabric;
pub use azfluent_sql as sql;
pub use azfluent_storage as storage;

use azfluent_compute::{AvailabilitySets, ComputeManager, Disks, Snapshots, VirtualMachines};
use azfluent_containerservice::{ContainerServiceManager, KubernetesClusters};
use azfluent_core::{AzureConfig, AzureCredentials, AzureEnvironment, AzureResult};
use azfluent_monitor::{
    ActionGroups, ActivityLogs, AutoscaleSettings, DiagnosticSettings, MetricAlerts, MetricDefinitions,
    MonitorManager,
};
use azfluent_resources::{
    Deployments, GenericResources, Providers, ResourceGroups, ResourceManager, Subscriptions, Tags,
};
use azfluent_servicefabric::{ServiceFabricClusters, ServiceFabricManager};
use azfluent_sql::{SqlManager, SqlServers};
use azfluent_storage::{BlobContainers, ManagementPolicies, StorageAccounts, StorageManager};

/// Everything needed to drive the fluent API in one import.
pub mod prelude {
    pub use crate::{Azure, AzureConfigurable};
    pub use azfluent_core::{
        Appliable, AzureConfig, AzureCredentials, AzureEnvironment, AzureError, AzureErrorKind, AzureResult,
        Creatable, GroupableDefinition, GroupableResource, HasInner, Refreshable, Region, Resource,
        SupportsDeletingByResourceGroup, SupportsGettingByResourceGroup, SupportsListing,
        SupportsListingByResourceGroup, TaggableUpdate,
    };
}

/// Pre-authentication settings; see [`Azure::configure`].
#[derive(Debug, Clone, Default)]
pub struct AzureConfigurable {
    config: AzureConfig,
}

impl AzureConfigurable {
    pub fn with_config(mut self, config: AzureConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_environment(mut self, environment: AzureEnvironment) -> Self {
        self.config.environment = environment;
        self
    }

    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    pub fn authenticate(self, credentials: AzureCredentials) -> Azure {
        info!(
            "Authenticating against {} for subscription {}",
            self.config.environment.name, credentials.subscription_id
        );
        Azure::from_client(AzureClient::with_config(credentials, self.config))
    }

    /// Reads an SDK auth file; its endpoints replace the configured environment.
    pub fn authenticate_file(mut self, path: impl AsRef<Path>) -> AzureResult<Azure> {
        let file = AuthFile::load(path)?;
        self.config.environment = file.environment();
        Ok(self.authenticate(file.credentials()))
    }

    pub fn authenticate_from_env(self) -> AzureResult<Azure> {
        Ok(self.authenticate(AzureCredentials::from_env()?))
    }
}

/// Entry point holding one authenticated client for one subscription.
#[derive(Debug, Clone)]
pub struct Azure {
    client: Arc<AzureClient>,
    resources: ResourceManager,
    compute: ComputeManager,
    storage: StorageManager,
    monitor: MonitorManager,
    container_service: ContainerServiceManager,
    sql: SqlManager,
    service_fabric: ServiceFabricManager,
}

impl Azure {
    /// Default configuration; see [`Azure::configure`] to change it.
    pub fn authenticate(credentials: AzureCredentials) -> Azure {
        Self::configure().authenticate(credentials)
    }

    pub fn authenticate_file(path: impl AsRef<Path>) -> AzureResult<Azure> {
        Self::configure().authenticate_file(path)
    }

    pub fn authenticate_from_env() -> AzureResult<Azure> {
        Self::configure().authenticate_from_env()
    }

    pub fn configure() -> AzureConfigurable {
        AzureConfigurable::default()
    }

    pub fn from_client(client: impl Into<Arc<AzureClient>>) -> Azure {
        let client = client.into();
        Azure {
            resources: ResourceManager::new(client.clone()),
            compute: ComputeManager::new(client.clone()),
            storage: StorageManager::new(client.clone()),
            monitor: MonitorManager::new(client.clone()),
            container_service: ContainerServiceManager::new(client.clone()),
            sql: SqlManager::new(client.clone()),
            service_fabric: ServiceFabricManager::new(client.clone()),
            client,
        }
    }

    /// Same credentials and token cache, another subscription.
    pub fn with_subscription(&self, subscription_id: impl Into<String>) -> Azure {
        let subscription_id = subscription_id.into();
        debug!("Switching subscription to {}", subscription_id);
        Self::from_client(self.client.with_subscription(subscription_id))
    }

    pub fn subscription_id(&self) -> AzureResult<&str> {
        self.client.subscription_id()
    }

    pub fn client(&self) -> &Arc<AzureClient> {
        &self.client
    }

    pub async fn is_authenticated(&self) -> bool {
        self.client.is_authenticated().await
    }

    // ── Service managers ─────────────────────────────────────────────

    pub fn resource_manager(&self) -> &ResourceManager {
        &self.resources
    }

    pub fn compute_manager(&self) -> &ComputeManager {
        &self.compute
    }

    pub fn storage_manager(&self) -> &StorageManager {
        &self.storage
    }

    pub fn monitor_manager(&self) -> &MonitorManager {
        &self.monitor
    }

    pub fn container_service_manager(&self) -> &ContainerServiceManager {
        &self.container_service
    }

    pub fn sql_manager(&self) -> &SqlManager {
        &self.sql
    }

    pub fn service_fabric_manager(&self) -> &ServiceFabricManager {
        &self.service_fabric
    }

    // ── Resources ────────────────────────────────────────────────────

    pub fn resource_groups(&self) -> ResourceGroups {
        self.resources.resource_groups()
    }

    pub fn generic_resources(&self) -> GenericResources {
        self.resources.generic_resources()
    }

    pub fn deployments(&self) -> Deployments {
        self.resources.deployments()
    }

    pub fn subscriptions(&self) -> Subscriptions {
        self.resources.subscriptions()
    }

    pub fn providers(&self) -> Providers {
        self.resources.providers()
    }

    pub fn tags(&self) -> Tags {
        self.resources.tags()
    }

    // ── Compute ──────────────────────────────────────────────────────

    pub fn virtual_machines(&self) -> VirtualMachines {
        self.compute.virtual_machines()
    }

    pub fn availability_sets(&self) -> AvailabilitySets {
        self.compute.availability_sets()
    }

    pub fn disks(&self) -> Disks {
        self.compute.disks()
    }

    pub fn snapshots(&self) -> Snapshots {
        self.compute.snapshots()
    }

    // ── Storage ──────────────────────────────────────────────────────

    pub fn storage_accounts(&self) -> StorageAccounts {
        self.storage.storage_accounts()
    }

    pub fn blob_containers(&self) -> BlobContainers {
        self.storage.blob_containers()
    }

    pub fn management_policies(&self) -> ManagementPolicies {
        self.storage.management_policies()
    }

    // ── Monitor ──────────────────────────────────────────────────────

    pub fn action_groups(&self) -> ActionGroups {
        self.monitor.action_groups()
    }

    pub fn metric_alerts(&self) -> MetricAlerts {
        self.monitor.metric_alerts()
    }

    pub fn autoscale_settings(&self) -> AutoscaleSettings {
        self.monitor.autoscale_settings()
    }

    pub fn diagnostic_settings(&self) -> DiagnosticSettings {
        self.monitor.diagnostic_settings()
    }

    pub fn activity_logs(&self) -> ActivityLogs {
        self.monitor.activity_logs()
    }

    pub fn metric_definitions(&self) -> MetricDefinitions {
        self.monitor.metric_definitions()
    }

    // ── Container service, SQL, Service Fabric ───────────────────────

    pub fn kubernetes_clusters(&self) -> KubernetesClusters {
        self.container_service.kubernetes_clusters()
    }

    pub fn sql_servers(&self) -> SqlServers {
        self.sql.sql_servers()
    }

    pub fn service_fabric_clusters(&self) -> ServiceFabricClusters {
        self.service_fabric.clusters()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_switch_keeps_credentials() {
        let azure = Azure::authenticate(AzureCredentials::new("cid", "secret", "tid", "sub1"));
        assert_eq!(azure.subscription_id().unwrap(), "sub1");

        let other = azure.with_subscription("sub2");
        assert_eq!(other.subscription_id().unwrap(), "sub2");
        assert_eq!(other.client().credentials().client_id, "cid");
        assert_eq!(azure.subscription_id().unwrap(), "sub1");
    }

    #[test]
    fn configure_applies_environment() {
        let azure = Azure::configure()
            .with_environment(AzureEnvironment::azure_china())
            .with_max_retries(1)
            .authenticate(AzureCredentials::new("cid", "secret", "tid", "sub1"));
        assert_eq!(azure.client().config().environment, AzureEnvironment::azure_china());
        assert_eq!(azure.client().config().max_retries, 1);
    }

    #[test]
    fn missing_subscription_is_reported() {
        let azure = Azure::authenticate(AzureCredentials::new("cid", "secret", "tid", ""));
        assert!(azure.subscription_id().is_err());
    }
}
