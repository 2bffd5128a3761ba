//! Private endpoint connections of a managed cluster.

use std::sync::Arc;

use azfluent_core::types::{require, AzureResult};
use azfluent_core::AzureClient;
use log::{debug, info};

use crate::types::{PrivateEndpointConnectionInner, PrivateLinkServiceConnectionState, PrivateLinkServiceConnectionStatus};

// ─── REST operations ────────────────────────────────────────────────

fn connection_url(client: &AzureClient, resource_group: &str, cluster: &str, suffix: &str) -> AzureResult<String> {
    require("resourceGroupName", resource_group)?;
    require("resourceName", cluster)?;
    client.resource_group_url(
        resource_group,
        &format!(
            "/providers/Microsoft.ContainerService/managedClusters/{}/privateEndpointConnections{}?api-version={}",
            cluster,
            suffix,
            client.config().api_version_container_service
        ),
    )
}

pub async fn list_private_endpoint_connections(
    client: &AzureClient,
    resource_group: &str,
    cluster: &str,
) -> AzureResult<Vec<PrivateEndpointConnectionInner>> {
    let url = connection_url(client, resource_group, cluster, "")?;
    debug!("list_private_endpoint_connections({}/{}) → {}", resource_group, cluster, url);
    client.get_all_pages(&url).await
}

pub async fn get_private_endpoint_connection(
    client: &AzureClient,
    resource_group: &str,
    cluster: &str,
    name: &str,
) -> AzureResult<PrivateEndpointConnectionInner> {
    require("privateEndpointConnectionName", name)?;
    let url = connection_url(client, resource_group, cluster, &format!("/{name}"))?;
    debug!("get_private_endpoint_connection({}/{}/{}) → {}", resource_group, cluster, name, url);
    client.get_json(&url).await
}

pub async fn update_private_endpoint_connection(
    client: &AzureClient,
    resource_group: &str,
    cluster: &str,
    name: &str,
    connection: &PrivateEndpointConnectionInner,
) -> AzureResult<PrivateEndpointConnectionInner> {
    require("privateEndpointConnectionName", name)?;
    let url = connection_url(client, resource_group, cluster, &format!("/{name}"))?;
    debug!("update_private_endpoint_connection({}/{}/{}) → {}", resource_group, cluster, name, url);
    client.put_json(&url, connection).await
}

pub async fn delete_private_endpoint_connection(
    client: &AzureClient,
    resource_group: &str,
    cluster: &str,
    name: &str,
) -> AzureResult<()> {
    require("privateEndpointConnectionName", name)?;
    let url = connection_url(client, resource_group, cluster, &format!("/{name}"))?;
    debug!("delete_private_endpoint_connection({}/{}/{}) → {}", resource_group, cluster, name, url);
    client.delete(&url).await
}

// ─── Collection ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PrivateEndpointConnections {
    client: Arc<AzureClient>,
}

impl PrivateEndpointConnections {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self, resource_group: &str, cluster: &str) -> AzureResult<Vec<PrivateEndpointConnectionInner>> {
        list_private_endpoint_connections(&self.client, resource_group, cluster).await
    }

    pub async fn get(
        &self,
        resource_group: &str,
        cluster: &str,
        name: &str,
    ) -> AzureResult<PrivateEndpointConnectionInner> {
        get_private_endpoint_connection(&self.client, resource_group, cluster, name).await
    }

    /// Sets the connection state, e.g. approving a pending request.
    pub async fn update(
        &self,
        resource_group: &str,
        cluster: &str,
        name: &str,
        status: PrivateLinkServiceConnectionStatus,
        description: Option<&str>,
    ) -> AzureResult<PrivateEndpointConnectionInner> {
        let mut body = PrivateEndpointConnectionInner::default();
        body.properties.private_link_service_connection_state = PrivateLinkServiceConnectionState {
            status: Some(status),
            description: description.map(str::to_string),
        };
        let updated = update_private_endpoint_connection(&self.client, resource_group, cluster, name, &body).await?;
        info!("Set private endpoint connection {}/{}/{} to {:?}", resource_group, cluster, name, status);
        Ok(updated)
    }

    pub async fn approve(&self, resource_group: &str, cluster: &str, name: &str) -> AzureResult<PrivateEndpointConnectionInner> {
        self.update(resource_group, cluster, name, PrivateLinkServiceConnectionStatus::Approved, None)
            .await
    }

    pub async fn reject(&self, resource_group: &str, cluster: &str, name: &str) -> AzureResult<PrivateEndpointConnectionInner> {
        self.update(resource_group, cluster, name, PrivateLinkServiceConnectionStatus::Rejected, None)
            .await
    }

    pub async fn delete(&self, resource_group: &str, cluster: &str, name: &str) -> AzureResult<()> {
        delete_private_endpoint_connection(&self.client, resource_group, cluster, name).await?;
        info!("Deleted private endpoint connection {}/{}/{}", resource_group, cluster, name);
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use azfluent_core::test_utils::mock_client;
    use azfluent_core::types::AzureErrorKind;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PEC_PATH: &str = "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.ContainerService/managedClusters/aks1/privateEndpointConnections";

    #[tokio::test]
    async fn empty_names_rejected_locally() {
        let server = MockServer::start().await;
        let pecs = PrivateEndpointConnections::new(mock_client(&server));
        assert_eq!(pecs.get("rg1", "aks1", "").await.unwrap_err().kind, AzureErrorKind::Validation);
        assert!(pecs.list("", "aks1").await.is_err());
        assert!(pecs.delete("rg1", " ", "pe1").await.is_err());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn approve_sends_connection_state() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(format!("{PEC_PATH}/pe1")))
            .and(body_json(json!({
                "properties": {"privateLinkServiceConnectionState": {"status": "Approved"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "pe1",
                "properties": {
                    "provisioningState": "Succeeded",
                    "privateEndpoint": {"id": "/subscriptions/sub1/resourceGroups/rg2/providers/Microsoft.Network/privateEndpoints/pe"},
                    "privateLinkServiceConnectionState": {"status": "Approved"}
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let pec = PrivateEndpointConnections::new(mock_client(&server))
            .approve("rg1", "aks1", "pe1")
            .await
            .unwrap();
        assert_eq!(
            pec.properties.private_link_service_connection_state.status,
            Some(PrivateLinkServiceConnectionStatus::Approved)
        );
    }

    #[tokio::test]
    async fn list_and_delete() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PEC_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"name": "pe1", "properties": {"privateLinkServiceConnectionState": {"status": "Pending"}}}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("{PEC_PATH}/pe1")))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let pecs = PrivateEndpointConnections::new(mock_client(&server));
        let listed = pecs.list("rg1", "aks1").await.unwrap();
        assert_eq!(listed[0].name.as_deref(), Some("pe1"));
        pecs.delete("rg1", "aks1", "pe1").await.unwrap();
    }
}
