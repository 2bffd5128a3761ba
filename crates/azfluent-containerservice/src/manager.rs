//! Entry point of the container service family.

use std::sync::Arc;

use azfluent_core::AzureClient;

use crate::kubernetes_clusters::KubernetesClusters;
use crate::private_endpoint_connections::PrivateEndpointConnections;

#[derive(Debug, Clone)]
pub struct ContainerServiceManager {
    client: Arc<AzureClient>,
}

impl ContainerServiceManager {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<AzureClient> {
        &self.client
    }

    pub fn kubernetes_clusters(&self) -> KubernetesClusters {
        KubernetesClusters::new(self.client.clone())
    }

    pub fn private_endpoint_connections(&self) -> PrivateEndpointConnections {
        PrivateEndpointConnections::new(self.client.clone())
    }
}
