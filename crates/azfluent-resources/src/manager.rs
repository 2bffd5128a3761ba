//! Entry point of the resources service family.

use std::sync::Arc;

use azfluent_core::AzureClient;

use crate::deployments::Deployments;
use crate::generic_resources::GenericResources;
use crate::providers::Providers;
use crate::resource_groups::ResourceGroups;
use crate::subscriptions::Subscriptions;
use crate::tags::Tags;

#[derive(Debug, Clone)]
pub struct ResourceManager {
    client: Arc<AzureClient>,
}

impl ResourceManager {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<AzureClient> {
        &self.client
    }

    pub fn resource_groups(&self) -> ResourceGroups {
        ResourceGroups::new(self.client.clone())
    }

    pub fn generic_resources(&self) -> GenericResources {
        GenericResources::new(self.client.clone())
    }

    pub fn deployments(&self) -> Deployments {
        Deployments::new(self.client.clone())
    }

    pub fn subscriptions(&self) -> Subscriptions {
        Subscriptions::new(self.client.clone())
    }

    pub fn providers(&self) -> Providers {
        Providers::new(self.client.clone())
    }

    pub fn tags(&self) -> Tags {
        Tags::new(self.client.clone())
    }
}
