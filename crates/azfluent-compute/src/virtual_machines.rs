//! Virtual machines: lifecycle actions, sizing, run-command and the
//! fluent definition / update builders.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use azfluent_core::fluent::{
    Appliable, Creatable, GroupableDefinition, GroupableResource, GroupableSpec, Refreshable,
    Resource, SupportsDeletingByResourceGroup, SupportsGettingByResourceGroup, SupportsListing,
    SupportsListingByResourceGroup, TaggableUpdate,
};
use azfluent_core::types::{require, AzureError, AzureResult, ManagedIdentity, SubResource};
use azfluent_core::{async_trait, impl_groupable_resource, AzureClient, Region};
use base64::Engine;
use log::{debug, info};

use crate::images::{ImageSource, KnownLinuxImage, KnownWindowsImage};
use crate::types::{
    create_option, BillingProfile, BootDiagnostics, CachingType, DataDisk, DiagnosticsProfile,
    HardwareProfile, ImageReference, LinuxConfiguration, ManagedDiskParameters, NetworkInterfaceReference,
    NetworkInterfaceReferenceProperties, NetworkProfile, OperatingSystemType, OsDisk, OsProfile,
    RunCommandInput, RunCommandInputParameter, RunCommandResult, SshConfiguration, SshPublicKey,
    StorageAccountType, StorageProfile, VirtualMachineInner, VirtualMachineInstanceView,
    VirtualMachineProperties, VirtualMachineSize, WindowsConfiguration,
};

// ─── REST operations ────────────────────────────────────────────────

fn vm_url(client: &AzureClient, resource_group: &str, vm_name: &str, action: &str) -> AzureResult<String> {
    require("resourceGroupName", resource_group)?;
    require("vmName", vm_name)?;
    client.resource_group_url(
        resource_group,
        &format!(
            "/providers/Microsoft.Compute/virtualMachines/{}{}?api-version={}",
            vm_name,
            action,
            client.config().api_version_compute
        ),
    )
}

/// List all VMs in the subscription.
pub async fn list_virtual_machines(client: &AzureClient) -> AzureResult<Vec<VirtualMachineInner>> {
    let url = client.subscription_url(&format!(
        "/providers/Microsoft.Compute/virtualMachines?api-version={}",
        client.config().api_version_compute
    ))?;
    debug!("list_virtual_machines → {}", url);
    client.get_all_pages(&url).await
}

/// List VMs in a specific resource group.
pub async fn list_virtual_machines_by_resource_group(
    client: &AzureClient,
    resource_group: &str,
) -> AzureResult<Vec<VirtualMachineInner>> {
    let url = client.resource_group_url(
        resource_group,
        &format!(
            "/providers/Microsoft.Compute/virtualMachines?api-version={}",
            client.config().api_version_compute
        ),
    )?;
    debug!("list_virtual_machines_by_resource_group({}) → {}", resource_group, url);
    client.get_all_pages(&url).await
}

/// Get a single VM with its instance view expanded.
pub async fn get_virtual_machine(
    client: &AzureClient,
    resource_group: &str,
    vm_name: &str,
) -> AzureResult<VirtualMachineInner> {
    let url = AzureClient::with_query(
        &vm_url(client, resource_group, vm_name, "")?,
        &[("$expand", "instanceView")],
    )?;
    debug!("get_virtual_machine({}/{}) → {}", resource_group, vm_name, url);
    client.get_json(&url).await
}

pub async fn get_instance_view(
    client: &AzureClient,
    resource_group: &str,
    vm_name: &str,
) -> AzureResult<VirtualMachineInstanceView> {
    let url = vm_url(client, resource_group, vm_name, "/instanceView")?;
    debug!("get_instance_view({}/{}) → {}", resource_group, vm_name, url);
    client.get_json(&url).await
}

pub async fn create_or_update_virtual_machine(
    client: &AzureClient,
    resource_group: &str,
    vm_name: &str,
    parameters: &VirtualMachineInner,
) -> AzureResult<VirtualMachineInner> {
    let url = vm_url(client, resource_group, vm_name, "")?;
    debug!("create_or_update_virtual_machine({}/{}) → {}", resource_group, vm_name, url);
    client.put_json(&url, parameters).await
}

pub async fn delete_virtual_machine(client: &AzureClient, resource_group: &str, vm_name: &str) -> AzureResult<()> {
    let url = vm_url(client, resource_group, vm_name, "")?;
    debug!("delete_virtual_machine({}/{}) → {}", resource_group, vm_name, url);
    client.delete(&url).await
}

async fn vm_action(client: &AzureClient, resource_group: &str, vm_name: &str, action: &str) -> AzureResult<()> {
    let url = vm_url(client, resource_group, vm_name, &format!("/{action}"))?;
    debug!("{}({}/{}) → {}", action, resource_group, vm_name, url);
    client.post_action(&url).await
}

pub async fn start_virtual_machine(client: &AzureClient, resource_group: &str, vm_name: &str) -> AzureResult<()> {
    vm_action(client, resource_group, vm_name, "start").await
}

/// Power off; the VM keeps its compute allocation (and billing).
pub async fn power_off_virtual_machine(client: &AzureClient, resource_group: &str, vm_name: &str) -> AzureResult<()> {
    vm_action(client, resource_group, vm_name, "powerOff").await
}

pub async fn restart_virtual_machine(client: &AzureClient, resource_group: &str, vm_name: &str) -> AzureResult<()> {
    vm_action(client, resource_group, vm_name, "restart").await
}

/// Stop and release compute resources.
pub async fn deallocate_virtual_machine(
    client: &AzureClient,
    resource_group: &str,
    vm_name: &str,
) -> AzureResult<()> {
    vm_action(client, resource_group, vm_name, "deallocate").await
}

/// The VM must be deallocated and sysprepped / waagent-deprovisioned first.
pub async fn generalize_virtual_machine(
    client: &AzureClient,
    resource_group: &str,
    vm_name: &str,
) -> AzureResult<()> {
    vm_action(client, resource_group, vm_name, "generalize").await
}

pub async fn redeploy_virtual_machine(client: &AzureClient, resource_group: &str, vm_name: &str) -> AzureResult<()> {
    vm_action(client, resource_group, vm_name, "redeploy").await
}

/// Sizes the VM can be resized to on its current hardware cluster.
pub async fn list_available_sizes(
    client: &AzureClient,
    resource_group: &str,
    vm_name: &str,
) -> AzureResult<Vec<VirtualMachineSize>> {
    let url = vm_url(client, resource_group, vm_name, "/vmSizes")?;
    debug!("list_available_sizes({}/{}) → {}", resource_group, vm_name, url);
    client.get_all_pages(&url).await
}

pub async fn list_sizes_by_region(client: &AzureClient, region: &str) -> AzureResult<Vec<VirtualMachineSize>> {
    require("location", region)?;
    let url = client.subscription_url(&format!(
        "/providers/Microsoft.Compute/locations/{}/vmSizes?api-version={}",
        region,
        client.config().api_version_compute
    ))?;
    debug!("list_sizes_by_region({}) → {}", region, url);
    client.get_all_pages(&url).await
}

/// Run a script inside the guest and wait for its output.
pub async fn run_command(
    client: &AzureClient,
    resource_group: &str,
    vm_name: &str,
    input: &RunCommandInput,
) -> AzureResult<RunCommandResult> {
    require("commandId", &input.command_id)?;
    let url = vm_url(client, resource_group, vm_name, "/runCommand")?;
    debug!("run_command({}/{}, {}) → {}", resource_group, vm_name, input.command_id, url);
    client.post_json(&url, input).await
}

/// Build a `RunShellScript` / `RunPowerShellScript` request.
pub fn script_input(
    os_type: OperatingSystemType,
    script_lines: Vec<String>,
    parameters: HashMap<String, String>,
) -> RunCommandInput {
    let command_id = match os_type {
        OperatingSystemType::Linux => "RunShellScript",
        OperatingSystemType::Windows => "RunPowerShellScript",
    };
    let mut parameters: Vec<RunCommandInputParameter> = parameters
        .into_iter()
        .map(|(name, value)| RunCommandInputParameter { name, value })
        .collect();
    parameters.sort_by(|a, b| a.name.cmp(&b.name));
    RunCommandInput {
        command_id: command_id.into(),
        script: script_lines,
        parameters,
    }
}

// ─── Power state ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PowerState {
    Starting,
    Running,
    Stopping,
    Stopped,
    Deallocating,
    Deallocated,
    Unknown(String),
}

impl PowerState {
    /// Parse a `PowerState/<state>` status code.
    pub fn from_status_code(code: &str) -> Option<Self> {
        let state = code.strip_prefix("PowerState/")?;
        Some(match state {
            "starting" => Self::Starting,
            "running" => Self::Running,
            "stopping" => Self::Stopping,
            "stopped" => Self::Stopped,
            "deallocating" => Self::Deallocating,
            "deallocated" => Self::Deallocated,
            other => Self::Unknown(other.to_string()),
        })
    }

    pub fn from_instance_view(view: &VirtualMachineInstanceView) -> Option<Self> {
        view.statuses
            .iter()
            .find_map(|s| Self::from_status_code(&s.code))
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Starting => f.write_str("starting"),
            Self::Running => f.write_str("running"),
            Self::Stopping => f.write_str("stopping"),
            Self::Stopped => f.write_str("stopped"),
            Self::Deallocating => f.write_str("deallocating"),
            Self::Deallocated => f.write_str("deallocated"),
            Self::Unknown(s) => f.write_str(s),
        }
    }
}

fn next_free_lun(disks: &[DataDisk]) -> i32 {
    let mut lun = 0;
    while disks.iter().any(|d| d.lun == lun) {
        lun += 1;
    }
    lun
}

fn empty_data_disk(lun: i32, size_gb: i32, caching: Option<CachingType>, sku: Option<StorageAccountType>) -> DataDisk {
    DataDisk {
        lun,
        create_option: Some(create_option::EMPTY.into()),
        disk_size_gb: Some(size_gb),
        caching,
        managed_disk: sku.map(|s| ManagedDiskParameters {
            id: None,
            storage_account_type: Some(s),
        }),
        ..Default::default()
    }
}

fn attached_data_disk(lun: i32, disk_id: &str) -> DataDisk {
    DataDisk {
        lun,
        create_option: Some(create_option::ATTACH.into()),
        managed_disk: Some(ManagedDiskParameters {
            id: Some(disk_id.into()),
            storage_account_type: None,
        }),
        ..Default::default()
    }
}

// ─── Fluent wrapper ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct VirtualMachine {
    inner: VirtualMachineInner,
    client: Arc<AzureClient>,
}

impl_groupable_resource!(VirtualMachine, VirtualMachineInner);

impl VirtualMachine {
    pub(crate) fn new(inner: VirtualMachineInner, client: Arc<AzureClient>) -> Self {
        Self { inner, client }
    }

    fn props(&self) -> &VirtualMachineProperties {
        &self.inner.properties
    }

    fn storage(&self) -> Option<&StorageProfile> {
        self.props().storage_profile.as_ref()
    }

    pub fn size(&self) -> Option<&str> {
        self.props()
            .hardware_profile
            .as_ref()
            .and_then(|h| h.vm_size.as_deref())
    }

    pub fn os_type(&self) -> Option<OperatingSystemType> {
        self.storage()
            .and_then(|s| s.os_disk.as_ref())
            .and_then(|d| d.os_type)
    }

    pub fn provisioning_state(&self) -> Option<&str> {
        self.props().provisioning_state.as_deref()
    }

    pub fn vm_id(&self) -> Option<&str> {
        self.props().vm_id.as_deref()
    }

    pub fn computer_name(&self) -> Option<&str> {
        self.props()
            .os_profile
            .as_ref()
            .and_then(|o| o.computer_name.as_deref())
    }

    /// Power state from the cached instance view; `None` until the VM has
    /// been fetched with its instance view.
    pub fn power_state(&self) -> Option<PowerState> {
        self.props()
            .instance_view
            .as_ref()
            .and_then(PowerState::from_instance_view)
    }

    pub fn instance_view(&self) -> Option<&VirtualMachineInstanceView> {
        self.props().instance_view.as_ref()
    }

    pub fn network_interface_ids(&self) -> Vec<&str> {
        self.props()
            .network_profile
            .as_ref()
            .map(|n| n.network_interfaces.iter().map(|nic| nic.id.as_str()).collect())
            .unwrap_or_default()
    }

    /// The NIC flagged primary, or the only NIC.
    pub fn primary_network_interface_id(&self) -> Option<&str> {
        let nics = &self.props().network_profile.as_ref()?.network_interfaces;
        nics.iter()
            .find(|n| n.properties.as_ref().and_then(|p| p.primary).unwrap_or(false))
            .or_else(|| if nics.len() == 1 { nics.first() } else { None })
            .map(|n| n.id.as_str())
    }

    pub fn data_disks(&self) -> &[DataDisk] {
        self.storage().map(|s| s.data_disks.as_slice()).unwrap_or_default()
    }

    pub fn os_disk_size_gb(&self) -> Option<i32> {
        self.storage()
            .and_then(|s| s.os_disk.as_ref())
            .and_then(|d| d.disk_size_gb)
    }

    pub fn os_disk_id(&self) -> Option<&str> {
        self.storage()
            .and_then(|s| s.os_disk.as_ref())
            .and_then(|d| d.managed_disk.as_ref())
            .and_then(|m| m.id.as_deref())
    }

    pub fn image_reference(&self) -> Option<&ImageReference> {
        self.storage().and_then(|s| s.image_reference.as_ref())
    }

    pub fn availability_set_id(&self) -> Option<&str> {
        self.props().availability_set.as_ref().map(|a| a.id.as_str())
    }

    pub fn availability_zones(&self) -> &[String] {
        &self.inner.zones
    }

    pub fn is_boot_diagnostics_enabled(&self) -> bool {
        self.props()
            .diagnostics_profile
            .as_ref()
            .and_then(|d| d.boot_diagnostics.as_ref())
            .and_then(|b| b.enabled)
            .unwrap_or(false)
    }

    pub fn system_assigned_principal_id(&self) -> Option<&str> {
        self.inner
            .identity
            .as_ref()
            .and_then(|i| i.principal_id.as_deref())
    }

    pub fn priority(&self) -> Option<&str> {
        self.props().priority.as_deref()
    }

    fn coordinates(&self) -> (String, String) {
        (self.resource_group_name(), self.name().to_string())
    }

    pub async fn start(&mut self) -> AzureResult<()> {
        let (rg, name) = self.coordinates();
        start_virtual_machine(&self.client, &rg, &name).await?;
        info!("Started VM {}/{}", rg, name);
        self.refresh().await
    }

    pub async fn power_off(&mut self) -> AzureResult<()> {
        let (rg, name) = self.coordinates();
        power_off_virtual_machine(&self.client, &rg, &name).await?;
        info!("Powered off VM {}/{}", rg, name);
        self.refresh().await
    }

    pub async fn restart(&mut self) -> AzureResult<()> {
        let (rg, name) = self.coordinates();
        restart_virtual_machine(&self.client, &rg, &name).await?;
        info!("Restarted VM {}/{}", rg, name);
        self.refresh().await
    }

    pub async fn deallocate(&mut self) -> AzureResult<()> {
        let (rg, name) = self.coordinates();
        deallocate_virtual_machine(&self.client, &rg, &name).await?;
        info!("Deallocated VM {}/{}", rg, name);
        self.refresh().await
    }

    pub async fn generalize(&self) -> AzureResult<()> {
        let (rg, name) = self.coordinates();
        generalize_virtual_machine(&self.client, &rg, &name).await?;
        info!("Generalized VM {}/{}", rg, name);
        Ok(())
    }

    pub async fn redeploy(&self) -> AzureResult<()> {
        let (rg, name) = self.coordinates();
        redeploy_virtual_machine(&self.client, &rg, &name).await?;
        info!("Redeployed VM {}/{}", rg, name);
        Ok(())
    }

    /// Fetch the instance view and cache it; returns the power state.
    pub async fn refresh_instance_view(&mut self) -> AzureResult<Option<PowerState>> {
        let (rg, name) = self.coordinates();
        let view = get_instance_view(&self.client, &rg, &name).await?;
        self.inner.properties.instance_view = Some(view);
        Ok(self.power_state())
    }

    pub async fn available_sizes(&self) -> AzureResult<Vec<VirtualMachineSize>> {
        let (rg, name) = self.coordinates();
        list_available_sizes(&self.client, &rg, &name).await
    }

    pub async fn run_command(&self, input: &RunCommandInput) -> AzureResult<RunCommandResult> {
        let (rg, name) = self.coordinates();
        run_command(&self.client, &rg, &name, input).await
    }

    pub async fn run_shell_script(
        &self,
        script_lines: Vec<String>,
        parameters: HashMap<String, String>,
    ) -> AzureResult<RunCommandResult> {
        self.run_command(&script_input(OperatingSystemType::Linux, script_lines, parameters))
            .await
    }

    pub async fn run_power_shell_script(
        &self,
        script_lines: Vec<String>,
        parameters: HashMap<String, String>,
    ) -> AzureResult<RunCommandResult> {
        self.run_command(&script_input(OperatingSystemType::Windows, script_lines, parameters))
            .await
    }

    pub fn update(&self) -> VirtualMachineUpdate {
        VirtualMachineUpdate {
            inner: self.inner.clone(),
            client: self.client.clone(),
        }
    }
}

#[async_trait]
impl Refreshable for VirtualMachine {
    async fn refresh(&mut self) -> AzureResult<()> {
        let (rg, name) = self.coordinates();
        self.inner = get_virtual_machine(&self.client, &rg, &name).await?;
        Ok(())
    }
}

// ─── Definition ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct VirtualMachineDefinition {
    spec: GroupableSpec,
    size: Option<String>,
    image: Option<ImageSource>,
    admin_username: Option<String>,
    admin_password: Option<String>,
    ssh_public_keys: Vec<String>,
    computer_name: Option<String>,
    custom_data: Option<String>,
    primary_nic_id: Option<String>,
    secondary_nic_ids: Vec<String>,
    os_disk_size_gb: Option<i32>,
    os_disk_caching: Option<CachingType>,
    os_disk_storage_type: Option<StorageAccountType>,
    os_disk_name: Option<String>,
    data_disks: Vec<DataDisk>,
    availability_set_id: Option<String>,
    zone: Option<String>,
    boot_diagnostics: Option<BootDiagnostics>,
    system_assigned_identity: bool,
    priority: Option<String>,
    eviction_policy: Option<String>,
    max_price: Option<f64>,
    client: Arc<AzureClient>,
}

impl GroupableDefinition for VirtualMachineDefinition {
    fn spec_mut(&mut self) -> &mut GroupableSpec {
        &mut self.spec
    }
}

impl VirtualMachineDefinition {
    fn new(name: String, client: Arc<AzureClient>) -> Self {
        Self {
            spec: GroupableSpec::new(name),
            size: None,
            image: None,
            admin_username: None,
            admin_password: None,
            ssh_public_keys: Vec::new(),
            computer_name: None,
            custom_data: None,
            primary_nic_id: None,
            secondary_nic_ids: Vec::new(),
            os_disk_size_gb: None,
            os_disk_caching: None,
            os_disk_storage_type: None,
            os_disk_name: None,
            data_disks: Vec::new(),
            availability_set_id: None,
            zone: None,
            boot_diagnostics: None,
            system_assigned_identity: false,
            priority: None,
            eviction_policy: None,
            max_price: None,
            client,
        }
    }

    // ── Network ──

    pub fn with_existing_primary_network_interface(mut self, nic_id: impl Into<String>) -> Self {
        self.primary_nic_id = Some(nic_id.into());
        self
    }

    pub fn with_existing_secondary_network_interface(mut self, nic_id: impl Into<String>) -> Self {
        self.secondary_nic_ids.push(nic_id.into());
        self
    }

    // ── Image ──

    pub fn with_popular_linux_image(mut self, image: KnownLinuxImage) -> Self {
        self.image = Some(ImageSource::Image(image.image_reference(), OperatingSystemType::Linux));
        self
    }

    pub fn with_popular_windows_image(mut self, image: KnownWindowsImage) -> Self {
        self.image = Some(ImageSource::Image(image.image_reference(), OperatingSystemType::Windows));
        self
    }

    /// `version` of `latest` picks the newest published version.
    pub fn with_latest_linux_image(self, publisher: &str, offer: &str, sku: &str) -> Self {
        self.with_specific_linux_image_version(ImageReference::marketplace(publisher, offer, sku, "latest"))
    }

    pub fn with_latest_windows_image(self, publisher: &str, offer: &str, sku: &str) -> Self {
        self.with_specific_windows_image_version(ImageReference::marketplace(publisher, offer, sku, "latest"))
    }

    pub fn with_specific_linux_image_version(mut self, image: ImageReference) -> Self {
        self.image = Some(ImageSource::Image(image, OperatingSystemType::Linux));
        self
    }

    pub fn with_specific_windows_image_version(mut self, image: ImageReference) -> Self {
        self.image = Some(ImageSource::Image(image, OperatingSystemType::Windows));
        self
    }

    pub fn with_linux_custom_image(mut self, image_id: impl Into<String>) -> Self {
        let id: String = image_id.into();
        self.image = Some(ImageSource::Image(ImageReference::custom(&id), OperatingSystemType::Linux));
        self
    }

    pub fn with_windows_custom_image(mut self, image_id: impl Into<String>) -> Self {
        let id: String = image_id.into();
        self.image = Some(ImageSource::Image(ImageReference::custom(&id), OperatingSystemType::Windows));
        self
    }

    /// Boot from an existing managed OS disk; no credentials are sent.
    pub fn with_specialized_os_disk(mut self, disk_id: impl Into<String>, os_type: OperatingSystemType) -> Self {
        self.image = Some(ImageSource::SpecializedDisk(disk_id.into(), os_type));
        self
    }

    // ── Credentials ──

    pub fn with_root_username(mut self, username: impl Into<String>) -> Self {
        self.admin_username = Some(username.into());
        self
    }

    pub fn with_root_password(mut self, password: impl Into<String>) -> Self {
        self.admin_password = Some(password.into());
        self
    }

    /// May be called more than once.
    pub fn with_ssh_key(mut self, public_key: impl Into<String>) -> Self {
        self.ssh_public_keys.push(public_key.into());
        self
    }

    pub fn with_admin_username(self, username: impl Into<String>) -> Self {
        self.with_root_username(username)
    }

    pub fn with_admin_password(self, password: impl Into<String>) -> Self {
        self.with_root_password(password)
    }

    pub fn with_computer_name(mut self, computer_name: impl Into<String>) -> Self {
        self.computer_name = Some(computer_name.into());
        self
    }

    /// Raw cloud-init / custom data; base64-encoded on the wire.
    pub fn with_custom_data(mut self, data: impl AsRef<[u8]>) -> Self {
        self.custom_data = Some(base64::engine::general_purpose::STANDARD.encode(data));
        self
    }

    // ── Hardware & disks ──

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_os_disk_size_in_gb(mut self, size_gb: i32) -> Self {
        self.os_disk_size_gb = Some(size_gb);
        self
    }

    pub fn with_os_disk_caching(mut self, caching: CachingType) -> Self {
        self.os_disk_caching = Some(caching);
        self
    }

    pub fn with_os_disk_storage_account_type(mut self, sku: StorageAccountType) -> Self {
        self.os_disk_storage_type = Some(sku);
        self
    }

    pub fn with_os_disk_name(mut self, name: impl Into<String>) -> Self {
        self.os_disk_name = Some(name.into());
        self
    }

    /// Empty data disk on the next free LUN.
    pub fn with_new_data_disk(mut self, size_gb: i32) -> Self {
        let lun = next_free_lun(&self.data_disks);
        self.data_disks.push(empty_data_disk(lun, size_gb, None, None));
        self
    }

    pub fn with_new_data_disk_at(
        mut self,
        size_gb: i32,
        lun: i32,
        caching: CachingType,
        sku: StorageAccountType,
    ) -> Self {
        self.data_disks.retain(|d| d.lun != lun);
        self.data_disks.push(empty_data_disk(lun, size_gb, Some(caching), Some(sku)));
        self
    }

    pub fn with_existing_data_disk(mut self, disk_id: impl Into<String>) -> Self {
        let lun = next_free_lun(&self.data_disks);
        self.data_disks.push(attached_data_disk(lun, &disk_id.into()));
        self
    }

    // ── Placement & extras ──

    pub fn with_existing_availability_set(mut self, availability_set_id: impl Into<String>) -> Self {
        self.availability_set_id = Some(availability_set_id.into());
        self
    }

    pub fn with_availability_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    /// `None` selects managed boot diagnostics storage.
    pub fn with_boot_diagnostics(mut self, storage_uri: Option<String>) -> Self {
        self.boot_diagnostics = Some(BootDiagnostics {
            enabled: Some(true),
            storage_uri,
        });
        self
    }

    pub fn with_system_assigned_managed_service_identity(mut self) -> Self {
        self.system_assigned_identity = true;
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Spot priority with the given eviction policy (`Deallocate` or `Delete`).
    pub fn with_spot_priority(mut self, eviction_policy: impl Into<String>) -> Self {
        self.priority = Some("Spot".into());
        self.eviction_policy = Some(eviction_policy.into());
        self
    }

    /// `-1` caps at the on-demand price.
    pub fn with_max_price(mut self, max_price: f64) -> Self {
        self.max_price = Some(max_price);
        self
    }

    // ── Accessors ──

    pub fn spec(&self) -> &GroupableSpec {
        &self.spec
    }

    pub fn size(&self) -> Option<&str> {
        self.size.as_deref()
    }

    pub fn os_type(&self) -> Option<OperatingSystemType> {
        self.image.as_ref().map(ImageSource::os_type)
    }

    pub fn data_disks(&self) -> &[DataDisk] {
        &self.data_disks
    }

    pub fn custom_data(&self) -> Option<&str> {
        self.custom_data.as_deref()
    }

    fn validate(&self) -> AzureResult<()> {
        self.spec.validate()?;
        if self.size.as_deref().map_or(true, |s| s.trim().is_empty()) {
            return Err(AzureError::required("vmSize"));
        }
        if self.primary_nic_id.is_none() {
            return Err(AzureError::required("primaryNetworkInterface"));
        }
        let image = self.image.as_ref().ok_or_else(|| AzureError::required("imageReference"))?;
        if let ImageSource::Image(_, os_type) = image {
            let user = self.admin_username.as_deref().unwrap_or_default();
            match os_type {
                OperatingSystemType::Linux => {
                    require("rootUsername", user)?;
                    if self.admin_password.is_none() && self.ssh_public_keys.is_empty() {
                        return Err(AzureError::validation(
                            "A root password or an SSH public key is required for a Linux virtual machine",
                        ));
                    }
                }
                OperatingSystemType::Windows => {
                    require("adminUsername", user)?;
                    require("adminPassword", self.admin_password.as_deref().unwrap_or_default())?;
                }
            }
        }
        if self.eviction_policy.is_some()
            && !matches!(self.priority.as_deref(), Some("Spot") | Some("Low"))
        {
            return Err(AzureError::validation(
                "An eviction policy can only be set on a Spot or Low priority virtual machine",
            ));
        }
        Ok(())
    }

    fn os_profile(&self, os_type: OperatingSystemType) -> OsProfile {
        let user = self.admin_username.clone().unwrap_or_default();
        let (linux, windows) = match os_type {
            OperatingSystemType::Linux => {
                let ssh = (!self.ssh_public_keys.is_empty()).then(|| SshConfiguration {
                    public_keys: self
                        .ssh_public_keys
                        .iter()
                        .map(|key| SshPublicKey {
                            path: Some(format!("/home/{user}/.ssh/authorized_keys")),
                            key_data: Some(key.clone()),
                        })
                        .collect(),
                });
                let linux = LinuxConfiguration {
                    disable_password_authentication: Some(self.admin_password.is_none()),
                    ssh,
                };
                (Some(linux), None)
            }
            OperatingSystemType::Windows => {
                let windows = WindowsConfiguration {
                    provision_vm_agent: Some(true),
                    enable_automatic_updates: Some(true),
                    time_zone: None,
                };
                (None, Some(windows))
            }
        };
        OsProfile {
            computer_name: Some(self.computer_name.clone().unwrap_or_else(|| self.spec.name.clone())),
            admin_username: Some(user),
            admin_password: self.admin_password.clone(),
            custom_data: self.custom_data.clone(),
            linux_configuration: linux,
            windows_configuration: windows,
        }
    }

    /// Assemble the PUT body.
    pub(crate) fn to_inner(&self) -> AzureResult<VirtualMachineInner> {
        let image = self.image.as_ref().ok_or_else(|| AzureError::required("imageReference"))?;
        let os_type = image.os_type();

        let (image_reference, os_disk, os_profile) = match image {
            ImageSource::Image(reference, _) => {
                let os_disk = OsDisk {
                    name: self.os_disk_name.clone(),
                    create_option: Some(create_option::FROM_IMAGE.into()),
                    disk_size_gb: self.os_disk_size_gb,
                    caching: self.os_disk_caching.or(Some(CachingType::ReadWrite)),
                    managed_disk: self.os_disk_storage_type.map(|s| ManagedDiskParameters {
                        id: None,
                        storage_account_type: Some(s),
                    }),
                    ..Default::default()
                };
                (Some(reference.clone()), os_disk, Some(self.os_profile(os_type)))
            }
            ImageSource::SpecializedDisk(disk_id, _) => {
                let os_disk = OsDisk {
                    os_type: Some(os_type),
                    create_option: Some(create_option::ATTACH.into()),
                    disk_size_gb: self.os_disk_size_gb,
                    caching: self.os_disk_caching,
                    managed_disk: Some(ManagedDiskParameters {
                        id: Some(disk_id.clone()),
                        storage_account_type: None,
                    }),
                    ..Default::default()
                };
                (None, os_disk, None)
            }
        };

        let primary = self
            .primary_nic_id
            .clone()
            .ok_or_else(|| AzureError::required("primaryNetworkInterface"))?;
        let nic = |id: String, primary: bool| NetworkInterfaceReference {
            id,
            properties: Some(NetworkInterfaceReferenceProperties { primary: Some(primary) }),
        };
        let mut nics = vec![nic(primary, true)];
        nics.extend(self.secondary_nic_ids.iter().cloned().map(|id| nic(id, false)));

        Ok(VirtualMachineInner {
            location: Some(self.spec.region_name()?),
            tags: self.spec.tags.clone(),
            zones: self.zone.clone().into_iter().collect(),
            identity: self.system_assigned_identity.then(ManagedIdentity::system_assigned),
            properties: VirtualMachineProperties {
                hardware_profile: Some(HardwareProfile { vm_size: self.size.clone() }),
                storage_profile: Some(StorageProfile {
                    image_reference,
                    os_disk: Some(os_disk),
                    data_disks: self.data_disks.clone(),
                }),
                os_profile,
                network_profile: Some(NetworkProfile { network_interfaces: nics }),
                availability_set: self.availability_set_id.clone().map(SubResource::new),
                diagnostics_profile: self.boot_diagnostics.clone().map(|b| DiagnosticsProfile {
                    boot_diagnostics: Some(b),
                }),
                priority: self.priority.clone(),
                eviction_policy: self.eviction_policy.clone(),
                billing_profile: self.max_price.map(|p| BillingProfile { max_price: Some(p) }),
                ..Default::default()
            },
            ..Default::default()
        })
    }
}

#[async_trait]
impl Creatable for VirtualMachineDefinition {
    type Output = VirtualMachine;

    async fn create(self) -> AzureResult<VirtualMachine> {
        self.validate()?;
        let body = self.to_inner()?;
        self.spec.ensure_resource_group(&self.client).await?;
        let rg = self.spec.resource_group()?;
        let inner = create_or_update_virtual_machine(&self.client, rg, &self.spec.name, &body).await?;
        info!("Created VM {}/{}", rg, self.spec.name);
        Ok(VirtualMachine::new(inner, self.client))
    }
}

// ─── Update ─────────────────────────────────────────────────────────

/// PUTs the modified model back.
#[derive(Debug, Clone)]
pub struct VirtualMachineUpdate {
    inner: VirtualMachineInner,
    client: Arc<AzureClient>,
}

impl VirtualMachineUpdate {
    fn storage_mut(&mut self) -> &mut StorageProfile {
        self.inner
            .properties
            .storage_profile
            .get_or_insert_with(StorageProfile::default)
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.inner.properties.hardware_profile = Some(HardwareProfile {
            vm_size: Some(size.into()),
        });
        self
    }

    pub fn with_new_data_disk(mut self, size_gb: i32) -> Self {
        let storage = self.storage_mut();
        let lun = next_free_lun(&storage.data_disks);
        storage.data_disks.push(empty_data_disk(lun, size_gb, None, None));
        self
    }

    pub fn with_existing_data_disk(mut self, disk_id: impl Into<String>) -> Self {
        let storage = self.storage_mut();
        let lun = next_free_lun(&storage.data_disks);
        storage.data_disks.push(attached_data_disk(lun, &disk_id.into()));
        self
    }

    /// Detach the disk at `lun`; the managed disk itself is kept.
    pub fn without_data_disk(mut self, lun: i32) -> Self {
        self.storage_mut().data_disks.retain(|d| d.lun != lun);
        self
    }

    pub fn with_boot_diagnostics(mut self, storage_uri: Option<String>) -> Self {
        self.inner.properties.diagnostics_profile = Some(DiagnosticsProfile {
            boot_diagnostics: Some(BootDiagnostics {
                enabled: Some(true),
                storage_uri,
            }),
        });
        self
    }

    pub fn without_boot_diagnostics(mut self) -> Self {
        self.inner.properties.diagnostics_profile = Some(DiagnosticsProfile {
            boot_diagnostics: Some(BootDiagnostics {
                enabled: Some(false),
                storage_uri: None,
            }),
        });
        self
    }

    pub fn with_system_assigned_managed_service_identity(mut self) -> Self {
        self.inner.identity = Some(ManagedIdentity::system_assigned());
        self
    }

    pub fn data_disks(&self) -> &[DataDisk] {
        self.inner
            .properties
            .storage_profile
            .as_ref()
            .map(|s| s.data_disks.as_slice())
            .unwrap_or_default()
    }
}

impl TaggableUpdate for VirtualMachineUpdate {
    fn tags_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.inner.tags
    }
}

#[async_trait]
impl Appliable for VirtualMachineUpdate {
    type Output = VirtualMachine;

    async fn apply(mut self) -> AzureResult<VirtualMachine> {
        let vm = VirtualMachine::new(self.inner.clone(), self.client.clone());
        let (rg, name) = vm.coordinates();
        // Read-only parts of the model are rejected on PUT.
        self.inner.properties.instance_view = None;
        self.inner.properties.provisioning_state = None;
        if let Some(os) = self.inner.properties.os_profile.as_mut() {
            os.custom_data = None;
        }
        let inner = create_or_update_virtual_machine(&self.client, &rg, &name, &self.inner).await?;
        info!("Updated VM {}/{}", rg, name);
        Ok(VirtualMachine::new(inner, self.client))
    }
}

// ─── Collection ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct VirtualMachines {
    client: Arc<AzureClient>,
}

impl VirtualMachines {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    fn wrap(&self, inner: VirtualMachineInner) -> VirtualMachine {
        VirtualMachine::new(inner, self.client.clone())
    }

    pub fn define(&self, name: impl Into<String>) -> VirtualMachineDefinition {
        VirtualMachineDefinition::new(name.into(), self.client.clone())
    }

    pub async fn start(&self, resource_group: &str, name: &str) -> AzureResult<()> {
        start_virtual_machine(&self.client, resource_group, name).await
    }

    pub async fn power_off(&self, resource_group: &str, name: &str) -> AzureResult<()> {
        power_off_virtual_machine(&self.client, resource_group, name).await
    }

    pub async fn restart(&self, resource_group: &str, name: &str) -> AzureResult<()> {
        restart_virtual_machine(&self.client, resource_group, name).await
    }

    pub async fn deallocate(&self, resource_group: &str, name: &str) -> AzureResult<()> {
        deallocate_virtual_machine(&self.client, resource_group, name).await
    }

    pub async fn generalize(&self, resource_group: &str, name: &str) -> AzureResult<()> {
        generalize_virtual_machine(&self.client, resource_group, name).await
    }

    pub async fn redeploy(&self, resource_group: &str, name: &str) -> AzureResult<()> {
        redeploy_virtual_machine(&self.client, resource_group, name).await
    }

    pub async fn instance_view(&self, resource_group: &str, name: &str) -> AzureResult<VirtualMachineInstanceView> {
        get_instance_view(&self.client, resource_group, name).await
    }

    pub async fn list_sizes_by_region(&self, region: &Region) -> AzureResult<Vec<VirtualMachineSize>> {
        list_sizes_by_region(&self.client, region.name()).await
    }

    pub async fn run_command(
        &self,
        resource_group: &str,
        name: &str,
        input: &RunCommandInput,
    ) -> AzureResult<RunCommandResult> {
        run_command(&self.client, resource_group, name, input).await
    }

    pub async fn run_shell_script(
        &self,
        resource_group: &str,
        name: &str,
        script_lines: Vec<String>,
        parameters: HashMap<String, String>,
    ) -> AzureResult<RunCommandResult> {
        let input = script_input(OperatingSystemType::Linux, script_lines, parameters);
        run_command(&self.client, resource_group, name, &input).await
    }

    pub async fn run_power_shell_script(
        &self,
        resource_group: &str,
        name: &str,
        script_lines: Vec<String>,
        parameters: HashMap<String, String>,
    ) -> AzureResult<RunCommandResult> {
        let input = script_input(OperatingSystemType::Windows, script_lines, parameters);
        run_command(&self.client, resource_group, name, &input).await
    }
}

#[async_trait]
impl SupportsListing for VirtualMachines {
    type Item = VirtualMachine;

    async fn list(&self) -> AzureResult<Vec<VirtualMachine>> {
        Ok(list_virtual_machines(&self.client)
            .await?
            .into_iter()
            .map(|inner| self.wrap(inner))
            .collect())
    }
}

#[async_trait]
impl SupportsListingByResourceGroup for VirtualMachines {
    type Item = VirtualMachine;

    async fn list_by_resource_group(&self, resource_group: &str) -> AzureResult<Vec<VirtualMachine>> {
        Ok(list_virtual_machines_by_resource_group(&self.client, resource_group)
            .await?
            .into_iter()
            .map(|inner| self.wrap(inner))
            .collect())
    }
}

#[async_trait]
impl SupportsGettingByResourceGroup for VirtualMachines {
    type Item = VirtualMachine;

    async fn get_by_resource_group(&self, resource_group: &str, name: &str) -> AzureResult<VirtualMachine> {
        Ok(self.wrap(get_virtual_machine(&self.client, resource_group, name).await?))
    }
}

#[async_trait]
impl SupportsDeletingByResourceGroup for VirtualMachines {
    async fn delete_by_resource_group(&self, resource_group: &str, name: &str) -> AzureResult<()> {
        delete_virtual_machine(&self.client, resource_group, name).await?;
        info!("Deleted VM {}/{}", resource_group, name);
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
