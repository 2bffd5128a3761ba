//! Resource providers – list, get, register, unregister and api-version
//! lookup for arbitrary resource types.

use std::sync::Arc;

use azfluent_core::fluent::SupportsListing;
use azfluent_core::types::{require, AzureError, AzureErrorKind, AzureResult};
use azfluent_core::{async_trait, AzureClient, ResourceId};
use log::{debug, info};

use crate::types::{ProviderInner, ProviderResourceType};

// ─── REST operations ────────────────────────────────────────────────

pub async fn list_providers(client: &AzureClient) -> AzureResult<Vec<ProviderInner>> {
    let url = client.subscription_url(&format!(
        "/providers?api-version={}",
        client.config().api_version_resources
    ))?;
    debug!("list_providers → {}", url);
    client.get_all_pages(&url).await
}

pub async fn get_provider(client: &AzureClient, namespace: &str) -> AzureResult<ProviderInner> {
    require("resourceProviderNamespace", namespace)?;
    let url = client.subscription_url(&format!(
        "/providers/{}?api-version={}",
        namespace,
        client.config().api_version_resources
    ))?;
    debug!("get_provider({}) → {}", namespace, url);
    client.get_json(&url).await
}

pub async fn register_provider(client: &AzureClient, namespace: &str) -> AzureResult<ProviderInner> {
    require("resourceProviderNamespace", namespace)?;
    let url = client.subscription_url(&format!(
        "/providers/{}/register?api-version={}",
        namespace,
        client.config().api_version_resources
    ))?;
    debug!("register_provider({}) → {}", namespace, url);
    client.post_for_json(&url).await
}

pub async fn unregister_provider(client: &AzureClient, namespace: &str) -> AzureResult<ProviderInner> {
    require("resourceProviderNamespace", namespace)?;
    let url = client.subscription_url(&format!(
        "/providers/{}/unregister?api-version={}",
        namespace,
        client.config().api_version_resources
    ))?;
    debug!("unregister_provider({}) → {}", namespace, url);
    client.post_for_json(&url).await
}

/// Preferred api-version of `resource_type` (e.g. `servers/databases`):
/// the newest stable version, else the newest preview.
pub fn default_api_version(provider: &ProviderInner, resource_type: &str) -> Option<String> {
    let entry: &ProviderResourceType = provider.resource_types.iter().find(|rt| {
        rt.resource_type
            .as_deref()
            .map(|t| t.eq_ignore_ascii_case(resource_type))
            .unwrap_or(false)
    })?;
    let mut versions: Vec<&String> = entry.api_versions.iter().collect();
    versions.sort_by(|a, b| b.cmp(a));
    versions
        .iter()
        .find(|v| !v.to_ascii_lowercase().contains("preview"))
        .or_else(|| versions.first())
        .map(|v| v.to_string())
}

/// Resolve the api-version for any resource id through its provider.
pub async fn resolve_api_version(client: &AzureClient, id: &str) -> AzureResult<String> {
    let rid = ResourceId::parse(id)?;
    let namespace = rid.provider_namespace().ok_or_else(|| {
        AzureError::new(
            AzureErrorKind::InvalidResourceId,
            format!("{id} does not name a provider resource"),
        )
    })?;
    let full = rid.full_resource_type();
    let type_path = full
        .split_once('/')
        .map(|(_, rest)| rest.to_string())
        .unwrap_or(full.clone());

    let provider = get_provider(client, namespace).await?;
    default_api_version(&provider, &type_path).ok_or_else(|| {
        AzureError::new(
            AzureErrorKind::NotFound,
            format!("Provider {namespace} does not list resource type {type_path}"),
        )
    })
}

// ─── Fluent wrapper ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Provider {
    inner: ProviderInner,
}

impl Provider {
    pub fn inner(&self) -> &ProviderInner {
        &self.inner
    }

    pub fn namespace(&self) -> &str {
        self.inner.namespace.as_deref().unwrap_or_default()
    }

    pub fn registration_state(&self) -> &str {
        self.inner.registration_state.as_deref().unwrap_or_default()
    }

    pub fn is_registered(&self) -> bool {
        self.registration_state().eq_ignore_ascii_case("Registered")
    }

    pub fn resource_types(&self) -> &[ProviderResourceType] {
        &self.inner.resource_types
    }

    pub fn api_version_for(&self, resource_type: &str) -> Option<String> {
        default_api_version(&self.inner, resource_type)
    }
}

// ─── Collection ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Providers {
    client: Arc<AzureClient>,
}

impl Providers {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    pub async fn get(&self, namespace: &str) -> AzureResult<Provider> {
        Ok(Provider {
            inner: get_provider(&self.client, namespace).await?,
        })
    }

    pub async fn register(&self, namespace: &str) -> AzureResult<Provider> {
        let inner = register_provider(&self.client, namespace).await?;
        info!("Registered provider {}", namespace);
        Ok(Provider { inner })
    }

    pub async fn unregister(&self, namespace: &str) -> AzureResult<Provider> {
        let inner = unregister_provider(&self.client, namespace).await?;
        info!("Unregistered provider {}", namespace);
        Ok(Provider { inner })
    }

    pub async fn api_version_for(&self, resource_id: &str) -> AzureResult<String> {
        resolve_api_version(&self.client, resource_id).await
    }
}

#[async_trait]
impl SupportsListing for Providers {
    type Item = Provider;

    async fn list(&self) -> AzureResult<Vec<Provider>> {
        Ok(list_providers(&self.client)
            .await?
            .into_iter()
            .map(|inner| Provider { inner })
            .collect())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use azfluent_core::test_utils::mock_client;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sql_provider() -> serde_json::Value {
        json!({
            "namespace": "Microsoft.Sql",
            "registrationState": "Registered",
            "resourceTypes": [
                {"resourceType": "servers", "apiVersions": ["2021-11-01", "2023-02-01-preview", "2014-04-01"]},
                {"resourceType": "servers/databases", "apiVersions": ["2022-05-01-preview"]}
            ]
        })
    }

    #[test]
    fn picks_newest_stable_version() {
        let p: ProviderInner = serde_json::from_value(sql_provider()).unwrap();
        assert_eq!(default_api_version(&p, "servers").as_deref(), Some("2021-11-01"));
        assert_eq!(
            default_api_version(&p, "SERVERS/databases").as_deref(),
            Some("2022-05-01-preview")
        );
        assert!(default_api_version(&p, "managedInstances").is_none());
    }

    #[tokio::test]
    async fn resolves_api_version_for_child_resource() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/subscriptions/sub1/providers/Microsoft.Sql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sql_provider()))
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let v = resolve_api_version(
            &client,
            "/subscriptions/sub1/resourceGroups/rg/providers/Microsoft.Sql/servers/s1/databases/d1",
        )
        .await
        .unwrap();
        assert_eq!(v, "2022-05-01-preview");
    }

    #[tokio::test]
    async fn register_posts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/subscriptions/sub1/providers/Microsoft.Sql/register"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sql_provider()))
            .expect(1)
            .mount(&server)
            .await;

        let providers = Providers::new(mock_client(&server));
        let p = providers.register("Microsoft.Sql").await.unwrap();
        assert!(p.is_registered());
        assert_eq!(p.namespace(), "Microsoft.Sql");
    }
}
