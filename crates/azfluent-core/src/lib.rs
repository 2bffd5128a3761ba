//! # azfluent – core
//!
//! Plumbing shared by every Azure Resource Manager service crate.
//!
//! ## Features
//!
//! - **OAuth2 Authentication** – client-credentials flow, shared token cache with refresh
//! - **HTTP client** – retries with backoff, `Retry-After`, `nextLink` pagination
//! - **Long-running operations** – `Azure-AsyncOperation`, `Location` and provisioning-state polling
//! - **Configuration** – cloud environments, timeouts, api-version table, env overrides
//! - **Resource ids** – ARM id parsing (`ResourceId`)
//! - **Fluent traits** – definitions, updates, collection capabilities
//! - **Helpers** – regions, ISO-8601 durations, generated names

pub mod types;
pub mod client;
pub mod auth;
pub mod lro;
pub mod resource_id;
pub mod fluent;
pub mod region;
pub mod iso8601;
pub mod naming;

pub use client::AzureClient;
pub use fluent::{
    create_all, Appliable, Creatable, GroupableDefinition, GroupableResource, GroupableSpec,
    HasInner, Refreshable, Resource, SupportsDeletingByResourceGroup,
    SupportsGettingByResourceGroup, SupportsListing, SupportsListingByResourceGroup,
    TaggableUpdate,
};
pub use region::Region;
pub use resource_id::ResourceId;
pub use types::{
    AuthFile, AzureConfig, AzureCredentials, AzureEnvironment, AzureError, AzureErrorKind, AzureResult,
    AzureToken, SubResource,
};

pub use async_trait::async_trait;

/// Wiremock-backed clients for unit tests of this crate and the service crates.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils {
    use std::sync::Arc;

    use wiremock::MockServer;

    use crate::client::AzureClient;
    use crate::types::{AzureConfig, AzureCredentials, AzureEnvironment, AzureToken};

    /// Config pointing every endpoint at the mock server with near-zero delays.
    pub fn mock_config(server: &MockServer) -> AzureConfig {
        let mut config = AzureConfig::new();
        config.environment = AzureEnvironment::custom(server.uri(), server.uri());
        config.retry_base_delay_ms = 1;
        config.lro_poll_interval_ms = 1;
        config.lro_timeout_secs = 5;
        config
    }

    /// Client for subscription `sub1` holding a pre-issued bearer token.
    pub fn mock_client(server: &MockServer) -> Arc<AzureClient> {
        let creds = AzureCredentials {
            subscription_id: "sub1".into(),
            ..Default::default()
        };
        Arc::new(
            AzureClient::with_config(creds, mock_config(server)).with_token(AzureToken::bearer("test-token")),
        )
    }
}
