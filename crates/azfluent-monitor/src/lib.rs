//! # azfluent – monitor
//!
//! - **Action Groups** – email, SMS, voice, webhook, push, ITSM, runbook, logic app and
//!   function receivers grouped by name prefix
//! - **Metric Alerts** – static and dynamic threshold criteria over one or many resources
//! - **Autoscale** – capacity profiles, metric scale rules, schedules, notifications
//! - **Diagnostic Settings** – log and metric routing to storage, Log Analytics, Event Hubs
//! - **Activity Logs** – time-ranged event queries at subscription or tenant scope
//! - **Metrics** – metric definitions and time-series queries

pub mod types;
pub mod action_groups;
pub mod metric_alerts;
pub mod autoscale;
pub mod diagnostic_settings;
pub mod activity_logs;
pub mod metrics;
pub mod manager;

pub use action_groups::{
    ActionGroup, ActionGroupDefinition, ActionGroupUpdate, ActionGroups, ActionReceiver,
    FunctionSettings, ItsmSettings, RunbookSettings,
};
pub use activity_logs::{ActivityLogQuery, ActivityLogs};
pub use autoscale::{
    AutoscaleProfile, AutoscaleSetting, AutoscaleSettingDefinition, AutoscaleSettingUpdate,
    AutoscaleSettings, ComparisonOperationType, MetricStatisticType, ScaleDirection, ScaleRule,
    ScaleType, TimeAggregationType,
};
pub use diagnostic_settings::{
    DiagnosticSetting, DiagnosticSettingDefinition, DiagnosticSettingUpdate, DiagnosticSettings,
};
pub use manager::MonitorManager;
pub use metric_alerts::{
    DynamicCriterion, DynamicThresholdOperator, DynamicThresholdSensitivity, MetricAlert,
    MetricAlertDefinition, MetricAlertRuleCondition, MetricAlertRuleTimeAggregation,
    MetricAlertUpdate, MetricAlerts, StaticCriterion,
};
pub use metrics::{MetricDefinition, MetricDefinitions, MetricQuery, ResultType};
pub use types::EventDataPropertyName;
