//! Entry point of the compute service family.

use std::sync::Arc;

use azfluent_core::AzureClient;

use crate::availability_sets::AvailabilitySets;
use crate::disks::Disks;
use crate::snapshots::Snapshots;
use crate::virtual_machines::VirtualMachines;

#[derive(Debug, Clone)]
pub struct ComputeManager {
    client: Arc<AzureClient>,
}

impl ComputeManager {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<AzureClient> {
        &self.client
    }

    pub fn virtual_machines(&self) -> VirtualMachines {
        VirtualMachines::new(self.client.clone())
    }

    pub fn availability_sets(&self) -> AvailabilitySets {
        AvailabilitySets::new(self.client.clone())
    }

    pub fn disks(&self) -> Disks {
        Disks::new(self.client.clone())
    }

    pub fn snapshots(&self) -> Snapshots {
        Snapshots::new(self.client.clone())
    }
}
