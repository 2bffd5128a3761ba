//! # azfluent – sql
//!
//! - **Servers** – logical servers with admin credentials, identity and name checks
//! - **Firewall Rules** – IPv4 ranges plus the Azure services rule
//! - **Databases** – editions, elastic pool placement, samples, copies, rename,
//!   bacpac import and export
//! - **Elastic Pools** – DTU pools shared by databases on one server

pub mod types;
pub mod servers;
pub mod firewall_rules;
pub mod databases;
pub mod elastic_pools;
pub mod manager;

pub use databases::{SqlDatabase, SqlDatabaseDefinition, SqlDatabaseTransferRequest, SqlDatabaseUpdate, SqlDatabases};
pub use elastic_pools::{SqlElasticPool, SqlElasticPoolDefinition, SqlElasticPoolUpdate, SqlElasticPools};
pub use firewall_rules::{
    SqlFirewallRule, SqlFirewallRuleDefinition, SqlFirewallRuleUpdate, SqlFirewallRules, ALLOW_ALL_AZURE_IPS,
};
pub use manager::SqlManager;
pub use servers::{SqlServer, SqlServerDefinition, SqlServerUpdate, SqlServers};
pub use types::{AuthenticationType, CreateMode, DatabaseEdition, SampleName, Sku, StorageKeyType};
