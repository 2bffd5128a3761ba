//! # azfluent – servicefabric
//!
//! - **Clusters** – management endpoint, node types, reliability, upgrade policy,
//!   certificates, diagnostics storage, fabric settings and Azure AD
//! - **Cluster Versions** – runtime code versions offered per location

pub mod types;
pub mod clusters;
pub mod manager;

pub use clusters::{
    NodeType, ServiceFabricCluster, ServiceFabricClusterDefinition, ServiceFabricClusterUpdate,
    ServiceFabricClusters,
};
pub use manager::ServiceFabricManager;
pub use types::{DurabilityLevel, ReliabilityLevel, UpgradeMode, X509StoreName};
