//! Entry point of the storage service family.

use std::sync::Arc;

use azfluent_core::AzureClient;

use crate::blob_containers::BlobContainers;
use crate::management_policies::ManagementPolicies;
use crate::storage_accounts::StorageAccounts;

#[derive(Debug, Clone)]
pub struct StorageManager {
    client: Arc<AzureClient>,
}

impl StorageManager {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<AzureClient> {
        &self.client
    }

    pub fn storage_accounts(&self) -> StorageAccounts {
        StorageAccounts::new(self.client.clone())
    }

    pub fn blob_containers(&self) -> BlobContainers {
        BlobContainers::new(self.client.clone())
    }

    pub fn management_policies(&self) -> ManagementPolicies {
        ManagementPolicies::new(self.client.clone())
    }
}
