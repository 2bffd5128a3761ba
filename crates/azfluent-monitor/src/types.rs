//! Wire models of the `microsoft.insights` resource provider.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Location of every tenant-wide monitor resource.
pub const GLOBAL_LOCATION: &str = "global";

/// `{value, localizedValue}` pair used across metrics and the activity log.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LocalizableString {
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localized_value: Option<String>,
}

// ─── Action groups ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionGroupInner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub properties: ActionGroupProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionGroupProperties {
    #[serde(default)]
    pub group_short_name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub email_receivers: Vec<EmailReceiver>,
    #[serde(default)]
    pub sms_receivers: Vec<SmsReceiver>,
    #[serde(default)]
    pub webhook_receivers: Vec<WebhookReceiver>,
    #[serde(default)]
    pub itsm_receivers: Vec<ItsmReceiver>,
    #[serde(default)]
    pub azure_app_push_receivers: Vec<AzureAppPushReceiver>,
    #[serde(default)]
    pub automation_runbook_receivers: Vec<AutomationRunbookReceiver>,
    #[serde(default)]
    pub voice_receivers: Vec<VoiceReceiver>,
    #[serde(default)]
    pub logic_app_receivers: Vec<LogicAppReceiver>,
    #[serde(default)]
    pub azure_function_receivers: Vec<AzureFunctionReceiver>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmailReceiver {
    pub name: String,
    pub email_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_common_alert_schema: Option<bool>,
    /// `Enabled` or `Disabled`; read only.
    #[serde(default, skip_serializing)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SmsReceiver {
    pub name: String,
    pub country_code: String,
    pub phone_number: String,
    #[serde(default, skip_serializing)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoiceReceiver {
    pub name: String,
    pub country_code: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WebhookReceiver {
    pub name: String,
    pub service_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_common_alert_schema: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItsmReceiver {
    pub name: String,
    pub workspace_id: String,
    pub connection_id: String,
    pub ticket_configuration: String,
    pub region: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AzureAppPushReceiver {
    pub name: String,
    pub email_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AutomationRunbookReceiver {
    pub name: String,
    pub automation_account_id: String,
    pub runbook_name: String,
    pub webhook_resource_id: String,
    pub is_global_runbook: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_uri: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LogicAppReceiver {
    pub name: String,
    pub resource_id: String,
    pub callback_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AzureFunctionReceiver {
    pub name: String,
    pub function_app_resource_id: String,
    pub function_name: String,
    pub http_trigger_url: String,
}

// ─── Metric alerts ──────────────────────────────────────────────────

pub mod criteria_odata_type {
    pub const SINGLE_RESOURCE: &str = "Microsoft.Azure.Monitor.SingleResourceMultipleMetricCriteria";
    pub const MULTIPLE_RESOURCE: &str = "Microsoft.Azure.Monitor.MultipleResourceMultipleMetricCriteria";
}

pub mod criterion_type {
    pub const STATIC: &str = "StaticThresholdCriterion";
    pub const DYNAMIC: &str = "DynamicThresholdCriterion";
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricAlertInner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub properties: MetricAlertProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricAlertProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub severity: i32,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub evaluation_frequency: String,
    #[serde(default)]
    pub window_size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_resource_region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria: Option<MetricAlertCriteria>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_mitigate: Option<bool>,
    #[serde(default)]
    pub actions: Vec<MetricAlertAction>,
    #[serde(default, skip_serializing)]
    pub last_updated_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricAlertCriteria {
    #[serde(rename = "odata.type")]
    pub odata_type: String,
    #[serde(default)]
    pub all_of: Vec<MetricCriteria>,
}

/// One static or dynamic threshold criterion; `criterion_type` tells
/// which of the optional fields apply.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricCriteria {
    pub criterion_type: String,
    pub name: String,
    pub metric_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_namespace: Option<String>,
    pub time_aggregation: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<MetricDimension>,
    pub operator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_sensitivity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failing_periods: Option<DynamicThresholdFailingPeriods>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_data_before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_metric_validation: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct MetricDimension {
    pub name: String,
    /// `Include` or `Exclude`.
    pub operator: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DynamicThresholdFailingPeriods {
    pub number_of_evaluation_periods: u32,
    pub min_failing_periods_to_alert: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MetricAlertAction {
    pub action_group_id: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub web_hook_properties: HashMap<String, String>,
}

// ─── Autoscale ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AutoscaleSettingInner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub properties: AutoscaleSettingProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AutoscaleSettingProperties {
    #[serde(default)]
    pub profiles: Vec<AutoscaleProfileInner>,
    #[serde(default)]
    pub notifications: Vec<AutoscaleNotification>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub target_resource_uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AutoscaleProfileInner {
    pub name: String,
    #[serde(default)]
    pub capacity: ScaleCapacity,
    #[serde(default)]
    pub rules: Vec<ScaleRuleInner>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_date: Option<TimeWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
}

/// Instance counts are strings on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ScaleCapacity {
    #[serde(default)]
    pub minimum: String,
    #[serde(default)]
    pub maximum: String,
    #[serde(rename = "default", default)]
    pub default_count: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Recurrence {
    /// Always `Week` for schedules built here.
    pub frequency: String,
    pub schedule: RecurrentSchedule,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecurrentSchedule {
    pub time_zone: String,
    pub days: Vec<String>,
    pub hours: Vec<u32>,
    pub minutes: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScaleRuleInner {
    pub metric_trigger: MetricTrigger,
    pub scale_action: ScaleAction,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricTrigger {
    pub metric_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_namespace: Option<String>,
    pub metric_resource_uri: String,
    pub time_grain: String,
    pub statistic: String,
    pub time_window: String,
    pub time_aggregation: String,
    pub operator: String,
    pub threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ScaleAction {
    pub direction: String,
    #[serde(rename = "type")]
    pub scale_type: String,
    pub value: String,
    pub cooldown: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutoscaleNotification {
    /// Always `Scale`.
    pub operation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailNotification>,
    #[serde(default)]
    pub webhooks: Vec<WebhookNotification>,
}

impl Default for AutoscaleNotification {
    fn default() -> Self {
        Self {
            operation: "Scale".into(),
            email: None,
            webhooks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmailNotification {
    #[serde(default)]
    pub send_to_subscription_administrator: bool,
    #[serde(default)]
    pub send_to_subscription_co_administrators: bool,
    #[serde(default)]
    pub custom_emails: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WebhookNotification {
    pub service_uri: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub properties: HashMap<String, String>,
}

// ─── Diagnostic settings ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticSettingInner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub properties: DiagnosticSettingProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticSettingProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_hub_authorization_rule_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_hub_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub metrics: Vec<MetricSettings>,
    #[serde(default)]
    pub logs: Vec<LogSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MetricSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_grain: Option<String>,
    pub category: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_policy: Option<RetentionPolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LogSettings {
    pub category: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_policy: Option<RetentionPolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub enabled: bool,
    pub days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticSettingsCategoryInner {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub properties: DiagnosticSettingsCategoryProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticSettingsCategoryProperties {
    /// `Metrics` or `Logs`.
    #[serde(default)]
    pub category_type: Option<String>,
    #[serde(default)]
    pub category_groups: Vec<String>,
}

// ─── Activity log ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
    #[serde(default)]
    pub event_data_id: Option<String>,
    #[serde(default)]
    pub event_name: Option<LocalizableString>,
    #[serde(default)]
    pub category: Option<LocalizableString>,
    #[serde(default)]
    pub operation_name: Option<LocalizableString>,
    #[serde(default)]
    pub status: Option<LocalizableString>,
    #[serde(default)]
    pub sub_status: Option<LocalizableString>,
    #[serde(default)]
    pub resource_provider_name: Option<LocalizableString>,
    #[serde(default)]
    pub resource_type: Option<LocalizableString>,
    #[serde(default)]
    pub event_timestamp: Option<String>,
    #[serde(default)]
    pub submission_timestamp: Option<String>,
    #[serde(default)]
    pub caller: Option<String>,
    #[serde(default)]
    pub correlation_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub resource_group_name: Option<String>,
    #[serde(default)]
    pub resource_id: Option<String>,
    #[serde(default)]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
}

/// Properties that can be requested through `$select`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventDataPropertyName {
    Authorization,
    Claims,
    CorrelationId,
    Description,
    Level,
    ResourceGroupName,
    ResourceProviderName,
    ResourceId,
    Status,
    SubmissionTimestamp,
    SubStatus,
    SubscriptionId,
    Properties,
    EventName,
    OperationName,
    Caller,
    EventTimestamp,
    Category,
    EventDataId,
    OperationId,
    TenantId,
    HttpRequest,
}

impl EventDataPropertyName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authorization => "authorization",
            Self::Claims => "claims",
            Self::CorrelationId => "correlationId",
            Self::Description => "description",
            Self::Level => "level",
            Self::ResourceGroupName => "resourceGroupName",
            Self::ResourceProviderName => "resourceProviderName",
            Self::ResourceId => "resourceId",
            Self::Status => "status",
            Self::SubmissionTimestamp => "submissionTimestamp",
            Self::SubStatus => "subStatus",
            Self::SubscriptionId => "subscriptionId",
            Self::Properties => "properties",
            Self::EventName => "eventName",
            Self::OperationName => "operationName",
            Self::Caller => "caller",
            Self::EventTimestamp => "eventTimestamp",
            Self::Category => "category",
            Self::EventDataId => "eventDataId",
            Self::OperationId => "operationId",
            Self::TenantId => "tenantId",
            Self::HttpRequest => "httpRequest",
        }
    }
}

impl fmt::Display for EventDataPropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Metrics ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricDefinitionInner {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub resource_id: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub name: Option<LocalizableString>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub primary_aggregation_type: Option<String>,
    #[serde(default)]
    pub supported_aggregation_types: Vec<String>,
    #[serde(default)]
    pub metric_availabilities: Vec<MetricAvailability>,
    #[serde(default)]
    pub dimensions: Vec<LocalizableString>,
    #[serde(default)]
    pub is_dimension_required: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MetricAvailability {
    #[serde(default)]
    pub time_grain: Option<String>,
    #[serde(default)]
    pub retention: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    #[serde(default)]
    pub cost: Option<u64>,
    #[serde(default)]
    pub timespan: Option<String>,
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub resourceregion: Option<String>,
    #[serde(default)]
    pub value: Vec<Metric>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub metric_type: Option<String>,
    #[serde(default)]
    pub name: Option<LocalizableString>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub timeseries: Vec<TimeSeriesElement>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TimeSeriesElement {
    #[serde(default)]
    pub metadatavalues: Vec<MetadataValue>,
    #[serde(default)]
    pub data: Vec<MetricValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct MetadataValue {
    #[serde(default)]
    pub name: Option<LocalizableString>,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricValue {
    #[serde(default)]
    pub time_stamp: String,
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub average: Option<f64>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
    #[serde(default)]
    pub count: Option<f64>,
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_definition_deserialize() {
        let json = r#"{"id":"x","name":{"value":"Percentage CPU","localizedValue":"Percentage CPU"},"unit":"Percent","primaryAggregationType":"Average","metricAvailabilities":[{"timeGrain":"PT1M","retention":"P93D"}]}"#;
        let d: MetricDefinitionInner = serde_json::from_str(json).unwrap();
        assert_eq!(d.name.unwrap().value, "Percentage CPU");
        assert_eq!(d.unit.as_deref(), Some("Percent"));
        assert_eq!(d.metric_availabilities[0].time_grain.as_deref(), Some("PT1M"));
    }

    #[test]
    fn metric_response_deserialize() {
        let json = r#"{"cost":0,"timespan":"PT1H","interval":"PT5M","value":[{"id":"x","type":"Microsoft.Insights/metrics","name":{"value":"Percentage CPU","localizedValue":"Percentage CPU"},"unit":"Percent","timeseries":[{"metadatavalues":[],"data":[{"timeStamp":"2024-01-01T00:00:00Z","average":5.2}]}]}]}"#;
        let r: MetricsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(r.value.len(), 1);
        assert_eq!(r.value[0].name.as_ref().unwrap().value, "Percentage CPU");
        assert_eq!(r.value[0].timeseries[0].data[0].average, Some(5.2));
    }

    #[test]
    fn activity_log_entry_deserialize() {
        let json = r#"{"eventTimestamp":"2024-01-01T00:00:00Z","operationName":{"value":"Microsoft.Compute/virtualMachines/start/action","localizedValue":"Start VM"},"status":{"value":"Succeeded"},"caller":"user@example.com","level":"Informational"}"#;
        let entry: EventData = serde_json::from_str(json).unwrap();
        assert_eq!(entry.caller.as_deref(), Some("user@example.com"));
        assert!(entry.operation_name.unwrap().value.contains("start"));
    }

    #[test]
    fn capacity_uses_default_keyword() {
        let cap = ScaleCapacity {
            minimum: "1".into(),
            maximum: "5".into(),
            default_count: "2".into(),
        };
        let v = serde_json::to_value(&cap).unwrap();
        assert_eq!(v["default"], "2");
    }

    #[test]
    fn receiver_status_is_not_sent() {
        let r = EmailReceiver {
            name: "ops".into(),
            email_address: "ops@example.com".into(),
            use_common_alert_schema: None,
            status: Some("Enabled".into()),
        };
        let v = serde_json::to_value(&r).unwrap();
        assert!(v.get("status").is_none());
    }
}
