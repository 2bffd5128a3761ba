//! Subscriptions visible to the credentials and their locations.

use std::sync::Arc;

use azfluent_core::fluent::SupportsListing;
use azfluent_core::types::{require, AzureResult};
use azfluent_core::{async_trait, AzureClient};
use log::debug;

use crate::types::{LocationInner, SubscriptionInner};

// ─── REST operations ────────────────────────────────────────────────

pub async fn list_subscriptions(client: &AzureClient) -> AzureResult<Vec<SubscriptionInner>> {
    let url = client.arm_url(&format!(
        "/subscriptions?api-version={}",
        client.config().api_version_subscriptions
    ));
    debug!("list_subscriptions → {}", url);
    client.get_all_pages(&url).await
}

pub async fn get_subscription(client: &AzureClient, subscription_id: &str) -> AzureResult<SubscriptionInner> {
    require("subscriptionId", subscription_id)?;
    let url = client.arm_url(&format!(
        "/subscriptions/{}?api-version={}",
        subscription_id,
        client.config().api_version_subscriptions
    ));
    debug!("get_subscription({}) → {}", subscription_id, url);
    client.get_json(&url).await
}

pub async fn list_locations(client: &AzureClient, subscription_id: &str) -> AzureResult<Vec<LocationInner>> {
    require("subscriptionId", subscription_id)?;
    let url = client.arm_url(&format!(
        "/subscriptions/{}/locations?api-version={}",
        subscription_id,
        client.config().api_version_subscriptions
    ));
    debug!("list_locations({}) → {}", subscription_id, url);
    client.get_all_pages(&url).await
}

// ─── Fluent wrapper ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Subscription {
    inner: SubscriptionInner,
    client: Arc<AzureClient>,
}

impl Subscription {
    pub fn inner(&self) -> &SubscriptionInner {
        &self.inner
    }

    pub fn subscription_id(&self) -> &str {
        self.inner.subscription_id.as_deref().unwrap_or_default()
    }

    pub fn display_name(&self) -> &str {
        self.inner.display_name.as_deref().unwrap_or_default()
    }

    pub fn state(&self) -> &str {
        self.inner.state.as_deref().unwrap_or_default()
    }

    pub async fn list_locations(&self) -> AzureResult<Vec<LocationInner>> {
        list_locations(&self.client, self.subscription_id()).await
    }
}

// ─── Collection ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Subscriptions {
    client: Arc<AzureClient>,
}

impl Subscriptions {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    pub async fn get(&self, subscription_id: &str) -> AzureResult<Subscription> {
        Ok(Subscription {
            inner: get_subscription(&self.client, subscription_id).await?,
            client: self.client.clone(),
        })
    }
}

#[async_trait]
impl SupportsListing for Subscriptions {
    type Item = Subscription;

    async fn list(&self) -> AzureResult<Vec<Subscription>> {
        Ok(list_subscriptions(&self.client)
            .await?
            .into_iter()
            .map(|inner| Subscription {
                inner,
                client: self.client.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azfluent_core::test_utils::mock_client;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn list_subscriptions_and_locations() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/subscriptions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"subscriptionId": "sub1", "displayName": "Dev", "state": "Enabled"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/subscriptions/sub1/locations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"name": "westus", "displayName": "West US"}]
            })))
            .mount(&server)
            .await;

        let subs = Subscriptions::new(mock_client(&server));
        let all = subs.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].display_name(), "Dev");
        let locations = all[0].list_locations().await.unwrap();
        assert_eq!(locations[0].display_name.as_deref(), Some("West US"));
    }
}
