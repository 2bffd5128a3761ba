//! # azfluent – container service
//!
//! - **Kubernetes clusters** – AKS create/update with agent pools, Linux profile and
//!   service principal or managed identity; start/stop; kubeconfig retrieval
//! - **Kubernetes versions** – versions offered per region
//! - **Agent pools** – per-cluster listing and CRUD
//! - **Private endpoint connections** – approve, reject, delete

pub mod types;
pub mod kubernetes_clusters;
pub mod private_endpoint_connections;
pub mod manager;

pub use kubernetes_clusters::{
    AgentPool, KubernetesCluster, KubernetesClusterDefinition, KubernetesClusterUpdate,
    KubernetesClusters,
};
pub use manager::ContainerServiceManager;
pub use private_endpoint_connections::PrivateEndpointConnections;
pub use types::{AgentPoolMode, AgentPoolType, NetworkPlugin, OsType, PrivateLinkServiceConnectionStatus};
