//! Entry point of the Service Fabric service family.

use std::sync::Arc;

use azfluent_core::AzureClient;

use crate::clusters::ServiceFabricClusters;

#[derive(Debug, Clone)]
pub struct ServiceFabricManager {
    client: Arc<AzureClient>,
}

impl ServiceFabricManager {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<AzureClient> {
        &self.client
    }

    pub fn clusters(&self) -> ServiceFabricClusters {
        ServiceFabricClusters::new(self.client.clone())
    }
}
