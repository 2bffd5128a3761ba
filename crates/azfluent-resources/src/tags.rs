//! Subscription-wide tag names and values.

use std::sync::Arc;

use azfluent_core::types::{require, AzureResult};
use azfluent_core::AzureClient;
use log::{debug, info};

use crate::types::{TagDetails, TagValue};

fn tags_url(client: &AzureClient, suffix: &str) -> AzureResult<String> {
    client.subscription_url(&format!(
        "/tagNames{}?api-version={}",
        suffix,
        client.config().api_version_resources
    ))
}

pub async fn list_tags(client: &AzureClient) -> AzureResult<Vec<TagDetails>> {
    let url = tags_url(client, "")?;
    debug!("list_tags → {}", url);
    client.get_all_pages(&url).await
}

pub async fn create_tag(client: &AzureClient, tag_name: &str) -> AzureResult<TagDetails> {
    require("tagName", tag_name)?;
    let url = tags_url(client, &format!("/{tag_name}"))?;
    debug!("create_tag({}) → {}", tag_name, url);
    client.put_json(&url, &serde_json::json!({})).await
}

pub async fn create_tag_value(client: &AzureClient, tag_name: &str, tag_value: &str) -> AzureResult<TagValue> {
    require("tagName", tag_name)?;
    require("tagValue", tag_value)?;
    let url = tags_url(client, &format!("/{tag_name}/tagValues/{tag_value}"))?;
    debug!("create_tag_value({}={}) → {}", tag_name, tag_value, url);
    client.put_json(&url, &serde_json::json!({})).await
}

/// The tag must not be in use on any resource.
pub async fn delete_tag(client: &AzureClient, tag_name: &str) -> AzureResult<()> {
    require("tagName", tag_name)?;
    let url = tags_url(client, &format!("/{tag_name}"))?;
    debug!("delete_tag({}) → {}", tag_name, url);
    client.delete(&url).await
}

pub async fn delete_tag_value(client: &AzureClient, tag_name: &str, tag_value: &str) -> AzureResult<()> {
    require("tagName", tag_name)?;
    require("tagValue", tag_value)?;
    let url = tags_url(client, &format!("/{tag_name}/tagValues/{tag_value}"))?;
    client.delete(&url).await
}

#[derive(Debug, Clone)]
pub struct Tags {
    client: Arc<AzureClient>,
}

impl Tags {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> AzureResult<Vec<TagDetails>> {
        list_tags(&self.client).await
    }

    pub async fn create(&self, tag_name: &str) -> AzureResult<TagDetails> {
        let tag = create_tag(&self.client, tag_name).await?;
        info!("Created tag {}", tag_name);
        Ok(tag)
    }

    pub async fn create_value(&self, tag_name: &str, tag_value: &str) -> AzureResult<TagValue> {
        create_tag_value(&self.client, tag_name, tag_value).await
    }

    pub async fn delete(&self, tag_name: &str) -> AzureResult<()> {
        delete_tag(&self.client, tag_name).await?;
        info!("Deleted tag {}", tag_name);
        Ok(())
    }

    pub async fn delete_value(&self, tag_name: &str, tag_value: &str) -> AzureResult<()> {
        delete_tag_value(&self.client, tag_name, tag_value).await
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
    async fn tag_lifecycle() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/subscriptions/sub1/tagNames/env"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "tagName": "env", "count": {"type": "Total", "value": 0}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/subscriptions/sub1/tagNames"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"tagName": "env", "values": [{"tagValue": "prod"}]}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/subscriptions/sub1/tagNames/env"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let tags = Tags::new(mock_client(&server));
        let created = tags.create("env").await.unwrap();
        assert_eq!(created.tag_name.as_deref(), Some("env"));
        let all = tags.list().await.unwrap();
        assert_eq!(all[0].values[0].tag_value.as_deref(), Some("prod"));
        tags.delete("env").await.unwrap();
    }

    #[tokio::test]
    async fn blank_tag_name_rejected() {
        let server = MockServer::start().await;
        let tags = Tags::new(mock_client(&server));
        assert!(tags.delete(" ").await.is_err());
    }
}
