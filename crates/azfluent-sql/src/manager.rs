//! Entry point of the SQL service family.

use std::sync::Arc;

use azfluent_core::AzureClient;

use crate::databases::SqlDatabases;
use crate::elastic_pools::SqlElasticPools;
use crate::firewall_rules::SqlFirewallRules;
use crate::servers::SqlServers;

#[derive(Debug, Clone)]
pub struct SqlManager {
    client: Arc<AzureClient>,
}

impl SqlManager {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<AzureClient> {
        &self.client
    }

    pub fn sql_servers(&self) -> SqlServers {
        SqlServers::new(self.client.clone())
    }

    pub fn databases(&self) -> SqlDatabases {
        SqlDatabases::new(self.client.clone())
    }

    pub fn elastic_pools(&self) -> SqlElasticPools {
        SqlElasticPools::new(self.client.clone())
    }

    pub fn firewall_rules(&self) -> SqlFirewallRules {
        SqlFirewallRules::new(self.client.clone())
    }
}
