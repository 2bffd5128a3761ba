//! Diagnostic settings route a resource's logs and metrics to storage,
//! Log Analytics or Event Hubs. They are addressed by the resource id
//! they hang off, not by resource group.

use std::sync::Arc;

use azfluent_core::fluent::{Appliable, Creatable, Refreshable};
use azfluent_core::iso8601::format_duration;
use azfluent_core::types::{require, AzureError, AzureResult};
use azfluent_core::{async_trait, AzureClient};
use chrono::Duration;
use log::{debug, info};

use crate::types::{
    DiagnosticSettingInner, DiagnosticSettingProperties, DiagnosticSettingsCategoryInner,
    LogSettings, MetricSettings, RetentionPolicy,
};

const SETTINGS_SEGMENT: &str = "/providers/microsoft.insights/diagnosticSettings/";

/// Splits a setting id into `(resource id, setting name)`.
pub fn split_setting_id(id: &str) -> AzureResult<(String, String)> {
    let lower = id.to_ascii_lowercase();
    let pos = lower
        .rfind(&SETTINGS_SEGMENT.to_ascii_lowercase())
        .ok_or_else(|| AzureError::validation(format!("'{id}' is not a diagnostic setting id")))?;
    let resource_id = &id[..pos];
    let name = &id[pos + SETTINGS_SEGMENT.len()..];
    if resource_id.is_empty() || name.is_empty() || name.contains('/') {
        return Err(AzureError::validation(format!("'{id}' is not a diagnostic setting id")));
    }
    Ok((resource_id.to_string(), name.to_string()))
}

fn retention(days: u32) -> RetentionPolicy {
    RetentionPolicy {
        enabled: days > 0,
        days,
    }
}

// ─── REST operations ────────────────────────────────────────────────

fn setting_url(client: &AzureClient, resource_id: &str, name: Option<&str>) -> AzureResult<String> {
    require("resourceUri", resource_id)?;
    let suffix = match name {
        Some(n) => {
            require("name", n)?;
            format!("{}{}", SETTINGS_SEGMENT, n)
        }
        None => SETTINGS_SEGMENT.trim_end_matches('/').to_string(),
    };
    Ok(client.arm_url(&format!(
        "{}{}?api-version={}",
        resource_id.trim_end_matches('/'),
        suffix,
        client.config().api_version_diagnostic_settings
    )))
}

pub async fn list_diagnostic_settings(client: &AzureClient, resource_id: &str) -> AzureResult<Vec<DiagnosticSettingInner>> {
    let url = setting_url(client, resource_id, None)?;
    debug!("list_diagnostic_settings({}) → {}", resource_id, url);
    client.get_all_pages(&url).await
}

pub async fn get_diagnostic_setting(
    client: &AzureClient,
    resource_id: &str,
    name: &str,
) -> AzureResult<DiagnosticSettingInner> {
    let url = setting_url(client, resource_id, Some(name))?;
    debug!("get_diagnostic_setting({}, {}) → {}", resource_id, name, url);
    client.get_json(&url).await
}

pub async fn create_or_update_diagnostic_setting(
    client: &AzureClient,
    resource_id: &str,
    name: &str,
    setting: &DiagnosticSettingInner,
) -> AzureResult<DiagnosticSettingInner> {
    let url = setting_url(client, resource_id, Some(name))?;
    debug!("create_or_update_diagnostic_setting({}, {}) → {}", resource_id, name, url);
    client.put_json(&url, setting).await
}

pub async fn delete_diagnostic_setting(client: &AzureClient, resource_id: &str, name: &str) -> AzureResult<()> {
    let url = setting_url(client, resource_id, Some(name))?;
    debug!("delete_diagnostic_setting({}, {}) → {}", resource_id, name, url);
    client.delete(&url).await
}

pub async fn list_diagnostic_settings_categories(
    client: &AzureClient,
    resource_id: &str,
) -> AzureResult<Vec<DiagnosticSettingsCategoryInner>> {
    require("resourceUri", resource_id)?;
    let url = client.arm_url(&format!(
        "{}/providers/microsoft.insights/diagnosticSettingsCategories?api-version={}",
        resource_id.trim_end_matches('/'),
        client.config().api_version_diagnostic_settings
    ));
    debug!("list_diagnostic_settings_categories({}) → {}", resource_id, url);
    client.get_all_pages(&url).await
}

// ─── Sink editing ───────────────────────────────────────────────────

fn validate_sinks(props: &DiagnosticSettingProperties) -> AzureResult<()> {
    if props.storage_account_id.is_none() && props.workspace_id.is_none() && props.event_hub_authorization_rule_id.is_none() {
        return Err(AzureError::validation(
            "A diagnostic setting requires a storage account, Log Analytics workspace or event hub",
        ));
    }
    Ok(())
}

fn upsert_metric(props: &mut DiagnosticSettingProperties, category: String, time_grain: Duration, retention_days: u32) {
    props.metrics.retain(|m| m.category != category);
    props.metrics.push(MetricSettings {
        time_grain: Some(format_duration(time_grain)),
        category,
        enabled: true,
        retention_policy: Some(retention(retention_days)),
    });
}

fn upsert_log(props: &mut DiagnosticSettingProperties, category: String, retention_days: u32) {
    props.logs.retain(|l| l.category != category);
    props.logs.push(LogSettings {
        category,
        enabled: true,
        retention_policy: Some(retention(retention_days)),
    });
}

fn add_categories(
    props: &mut DiagnosticSettingProperties,
    categories: &[DiagnosticSettingsCategoryInner],
    time_grain: Duration,
    retention_days: u32,
) {
    for c in categories {
        match c.properties.category_type.as_deref() {
            Some("Metrics") => upsert_metric(props, c.name.clone(), time_grain, retention_days),
            Some("Logs") => upsert_log(props, c.name.clone(), retention_days),
            _ => {}
        }
    }
}

// ─── Fluent wrapper ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DiagnosticSetting {
    inner: DiagnosticSettingInner,
    resource_id: String,
    client: Arc<AzureClient>,
}

impl DiagnosticSetting {
    pub(crate) fn new(inner: DiagnosticSettingInner, resource_id: String, client: Arc<AzureClient>) -> Self {
        Self {
            inner,
            resource_id,
            client,
        }
    }

    pub fn id(&self) -> &str {
        self.inner.id.as_deref().unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.inner.name.as_deref().unwrap_or_default()
    }

    /// Resource the setting is attached to.
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    pub fn storage_account_id(&self) -> Option<&str> {
        self.inner.properties.storage_account_id.as_deref()
    }

    pub fn workspace_id(&self) -> Option<&str> {
        self.inner.properties.workspace_id.as_deref()
    }

    pub fn event_hub_authorization_rule_id(&self) -> Option<&str> {
        self.inner.properties.event_hub_authorization_rule_id.as_deref()
    }

    pub fn event_hub_name(&self) -> Option<&str> {
        self.inner.properties.event_hub_name.as_deref()
    }

    pub fn metrics(&self) -> &[MetricSettings] {
        &self.inner.properties.metrics
    }

    pub fn logs(&self) -> &[LogSettings] {
        &self.inner.properties.logs
    }

    pub fn inner(&self) -> &DiagnosticSettingInner {
        &self.inner
    }

    pub fn update(&self) -> DiagnosticSettingUpdate {
        DiagnosticSettingUpdate {
            inner: self.inner.clone(),
            resource_id: self.resource_id.clone(),
            client: self.client.clone(),
        }
    }
}

#[async_trait]
impl Refreshable for DiagnosticSetting {
    async fn refresh(&mut self) -> AzureResult<()> {
        let name = self.name().to_string();
        self.inner = get_diagnostic_setting(&self.client, &self.resource_id, &name).await?;
        Ok(())
    }
}

// ─── Definition ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DiagnosticSettingDefinition {
    name: String,
    resource_id: Option<String>,
    properties: DiagnosticSettingProperties,
    client: Arc<AzureClient>,
}

impl DiagnosticSettingDefinition {
    pub fn with_resource(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    pub fn with_storage_account(mut self, storage_account_id: impl Into<String>) -> Self {
        self.properties.storage_account_id = Some(storage_account_id.into());
        self
    }

    pub fn with_log_analytics(mut self, workspace_id: impl Into<String>) -> Self {
        self.properties.workspace_id = Some(workspace_id.into());
        self
    }

    /// Streams to an event hub namespace; without a hub name one hub per
    /// category is created.
    pub fn with_event_hub(mut self, authorization_rule_id: impl Into<String>, event_hub_name: Option<String>) -> Self {
        self.properties.event_hub_authorization_rule_id = Some(authorization_rule_id.into());
        self.properties.event_hub_name = event_hub_name;
        self
    }

    /// Retention of `0` days keeps data indefinitely.
    pub fn with_metric(mut self, category: impl Into<String>, time_grain: Duration, retention_days: u32) -> Self {
        upsert_metric(&mut self.properties, category.into(), time_grain, retention_days);
        self
    }

    pub fn with_log(mut self, category: impl Into<String>, retention_days: u32) -> Self {
        upsert_log(&mut self.properties, category.into(), retention_days);
        self
    }

    /// Enables every category returned by
    /// [`DiagnosticSettings::list_categories_by_resource`].
    pub fn with_logs_and_metrics(
        mut self,
        categories: &[DiagnosticSettingsCategoryInner],
        time_grain: Duration,
        retention_days: u32,
    ) -> Self {
        add_categories(&mut self.properties, categories, time_grain, retention_days);
        self
    }
}

#[async_trait]
impl Creatable for DiagnosticSettingDefinition {
    type Output = DiagnosticSetting;

    async fn create(self) -> AzureResult<DiagnosticSetting> {
        require("name", &self.name)?;
        let resource_id = self.resource_id.clone().ok_or_else(|| AzureError::required("resourceUri"))?;
        validate_sinks(&self.properties)?;

        let body = DiagnosticSettingInner {
            properties: self.properties.clone(),
            ..Default::default()
        };
        let inner = create_or_update_diagnostic_setting(&self.client, &resource_id, &self.name, &body).await?;
        info!("Created diagnostic setting {} on {}", self.name, resource_id);
        Ok(DiagnosticSetting::new(inner, resource_id, self.client))
    }
}

// ─── Update ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DiagnosticSettingUpdate {
    inner: DiagnosticSettingInner,
    resource_id: String,
    client: Arc<AzureClient>,
}

impl DiagnosticSettingUpdate {
    pub fn with_storage_account(mut self, storage_account_id: impl Into<String>) -> Self {
        self.inner.properties.storage_account_id = Some(storage_account_id.into());
        self
    }

    pub fn without_storage_account(mut self) -> Self {
        self.inner.properties.storage_account_id = None;
        self
    }

    pub fn with_log_analytics(mut self, workspace_id: impl Into<String>) -> Self {
        self.inner.properties.workspace_id = Some(workspace_id.into());
        self
    }

    pub fn without_log_analytics(mut self) -> Self {
        self.inner.properties.workspace_id = None;
        self
    }

    pub fn with_event_hub(mut self, authorization_rule_id: impl Into<String>, event_hub_name: Option<String>) -> Self {
        self.inner.properties.event_hub_authorization_rule_id = Some(authorization_rule_id.into());
        self.inner.properties.event_hub_name = event_hub_name;
        self
    }

    pub fn without_event_hub(mut self) -> Self {
        self.inner.properties.event_hub_authorization_rule_id = None;
        self.inner.properties.event_hub_name = None;
        self
    }

    pub fn with_metric(mut self, category: impl Into<String>, time_grain: Duration, retention_days: u32) -> Self {
        upsert_metric(&mut self.inner.properties, category.into(), time_grain, retention_days);
        self
    }

    pub fn without_metric(mut self, category: &str) -> Self {
        self.inner.properties.metrics.retain(|m| m.category != category);
        self
    }

    pub fn with_log(mut self, category: impl Into<String>, retention_days: u32) -> Self {
        upsert_log(&mut self.inner.properties, category.into(), retention_days);
        self
    }

    pub fn without_log(mut self, category: &str) -> Self {
        self.inner.properties.logs.retain(|l| l.category != category);
        self
    }

    pub fn without_logs(mut self) -> Self {
        self.inner.properties.logs.clear();
        self
    }

    pub fn with_logs_and_metrics(
        mut self,
        categories: &[DiagnosticSettingsCategoryInner],
        time_grain: Duration,
        retention_days: u32,
    ) -> Self {
        add_categories(&mut self.inner.properties, categories, time_grain, retention_days);
        self
    }
}

#[async_trait]
impl Appliable for DiagnosticSettingUpdate {
    type Output = DiagnosticSetting;

    async fn apply(self) -> AzureResult<DiagnosticSetting> {
        validate_sinks(&self.inner.properties)?;
        let name = self.inner.name.clone().unwrap_or_default();
        let inner = create_or_update_diagnostic_setting(&self.client, &self.resource_id, &name, &self.inner).await?;
        info!("Updated diagnostic setting {} on {}", name, self.resource_id);
        Ok(DiagnosticSetting::new(inner, self.resource_id, self.client))
    }
}

// ─── Collection ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DiagnosticSettings {
    client: Arc<AzureClient>,
}

impl DiagnosticSettings {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    pub fn define(&self, name: impl Into<String>) -> DiagnosticSettingDefinition {
        DiagnosticSettingDefinition {
            name: name.into(),
            resource_id: None,
            properties: DiagnosticSettingProperties::default(),
            client: self.client.clone(),
        }
    }

    pub async fn list_by_resource(&self, resource_id: &str) -> AzureResult<Vec<DiagnosticSetting>> {
        Ok(list_diagnostic_settings(&self.client, resource_id)
            .await?
            .into_iter()
            .map(|inner| DiagnosticSetting::new(inner, resource_id.to_string(), self.client.clone()))
            .collect())
    }

    pub async fn get(&self, resource_id: &str, name: &str) -> AzureResult<DiagnosticSetting> {
        let inner = get_diagnostic_setting(&self.client, resource_id, name).await?;
        Ok(DiagnosticSetting::new(inner, resource_id.to_string(), self.client.clone()))
    }

    pub async fn get_by_id(&self, id: &str) -> AzureResult<DiagnosticSetting> {
        let (resource_id, name) = split_setting_id(id)?;
        self.get(&resource_id, &name).await
    }

    pub async fn delete(&self, resource_id: &str, name: &str) -> AzureResult<()> {
        delete_diagnostic_setting(&self.client, resource_id, name).await?;
        info!("Deleted diagnostic setting {} on {}", name, resource_id);
        Ok(())
    }

    pub async fn delete_by_id(&self, id: &str) -> AzureResult<()> {
        let (resource_id, name) = split_setting_id(id)?;
        self.delete(&resource_id, &name).await
    }

    pub async fn list_categories_by_resource(&self, resource_id: &str) -> AzureResult<Vec<DiagnosticSettingsCategoryInner>> {
        list_diagnostic_settings_categories(&self.client, resource_id).await
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use azfluent_core::test_utils::mock_client;
    use azfluent_core::types::AzureErrorKind;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VM_ID: &str = "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Compute/virtualMachines/vm1";
    const SA_ID: &str = "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Storage/storageAccounts/logs1";

    fn setting_path() -> String {
        format!("{VM_ID}/providers/microsoft.insights/diagnosticSettings/send-to-storage")
    }

    fn setting_json() -> serde_json::Value {
        json!({
            "id": setting_path(), "name": "send-to-storage",
            "properties": {
                "storageAccountId": SA_ID,
                "metrics": [{"category": "AllMetrics", "enabled": true, "timeGrain": "PT1M",
                             "retentionPolicy": {"enabled": true, "days": 7}}],
                "logs": [{"category": "Audit", "enabled": true,
                          "retentionPolicy": {"enabled": false, "days": 0}}]
            }
        })
    }

    #[test]
    fn setting_id_split() {
        let (rid, name) = split_setting_id(&setting_path()).unwrap();
        assert_eq!(rid, VM_ID);
        assert_eq!(name, "send-to-storage");

        let upper = format!("{VM_ID}/providers/Microsoft.Insights/DiagnosticSettings/s1");
        assert_eq!(split_setting_id(&upper).unwrap().1, "s1");
        assert!(split_setting_id(VM_ID).is_err());
    }

    #[test]
    fn categories_split_by_type() {
        let categories: Vec<DiagnosticSettingsCategoryInner> = serde_json::from_value(json!([
            {"name": "AllMetrics", "properties": {"categoryType": "Metrics"}},
            {"name": "Audit", "properties": {"categoryType": "Logs"}}
        ]))
        .unwrap();
        let mut props = DiagnosticSettingProperties::default();
        add_categories(&mut props, &categories, Duration::minutes(5), 30);
        assert_eq!(props.metrics[0].time_grain.as_deref(), Some("PT5M"));
        assert_eq!(props.logs[0].category, "Audit");
        assert_eq!(props.logs[0].retention_policy, Some(RetentionPolicy { enabled: true, days: 30 }));
    }

    #[tokio::test]
    async fn create_requires_a_sink() {
        let server = MockServer::start().await;
        let err = DiagnosticSettings::new(mock_client(&server))
            .define("nowhere")
            .with_resource(VM_ID)
            .with_log("Audit", 0)
            .create()
            .await
            .unwrap_err();
        assert_eq!(err.kind, AzureErrorKind::Validation);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_on_resource() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(setting_path()))
            .and(body_partial_json(json!({
                "properties": {
                    "storageAccountId": SA_ID,
                    "metrics": [{"category": "AllMetrics", "timeGrain": "PT1M", "retentionPolicy": {"enabled": true, "days": 7}}],
                    "logs": [{"category": "Audit", "retentionPolicy": {"enabled": false, "days": 0}}]
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(setting_json()))
            .expect(1)
            .mount(&server)
            .await;

        let setting = DiagnosticSettings::new(mock_client(&server))
            .define("send-to-storage")
            .with_resource(VM_ID)
            .with_storage_account(SA_ID)
            .with_metric("AllMetrics", Duration::minutes(1), 7)
            .with_log("Audit", 0)
            .create()
            .await
            .unwrap();
        assert_eq!(setting.resource_id(), VM_ID);
        assert_eq!(setting.storage_account_id(), Some(SA_ID));
    }

    #[tokio::test]
    async fn get_by_id_then_update() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(setting_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(setting_json()))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(setting_path()))
            .and(body_partial_json(json!({
                "properties": {
                    "workspaceId": "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.OperationalInsights/workspaces/ws1",
                    "logs": []
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(setting_json()))
            .expect(1)
            .mount(&server)
            .await;

        let settings = DiagnosticSettings::new(mock_client(&server));
        let setting = settings.get_by_id(&setting_path()).await.unwrap();
        setting
            .update()
            .with_log_analytics("/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.OperationalInsights/workspaces/ws1")
            .without_log("Audit")
            .apply()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn list_categories() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{VM_ID}/providers/microsoft.insights/diagnosticSettingsCategories")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"name": "AllMetrics", "properties": {"categoryType": "Metrics"}}]
            })))
            .mount(&server)
            .await;

        let categories = DiagnosticSettings::new(mock_client(&server))
            .list_categories_by_resource(VM_ID)
            .await
            .unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].properties.category_type.as_deref(), Some("Metrics"));
    }
}
