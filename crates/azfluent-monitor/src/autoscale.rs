//! Autoscale settings: capacity profiles with metric rules and schedules
//! attached to a scalable resource.

use std::collections::HashMap;
use std::sync::Arc;

use azfluent_core::fluent::{
    Appliable, Creatable, GroupableDefinition, GroupableResource, GroupableSpec, Refreshable,
    Resource, SupportsDeletingByResourceGroup, SupportsGettingByResourceGroup, SupportsListing,
    SupportsListingByResourceGroup, TaggableUpdate,
};
use azfluent_core::iso8601::format_duration;
use azfluent_core::types::{require, AzureError, AzureResult};
use azfluent_core::{async_trait, impl_groupable_resource, AzureClient};
use chrono::{DateTime, Duration, Utc, Weekday};
use log::{debug, info};

use crate::types::{
    AutoscaleNotification, AutoscaleProfileInner, AutoscaleSettingInner,
    AutoscaleSettingProperties, EmailNotification, MetricTrigger, Recurrence, RecurrentSchedule,
    ScaleAction, ScaleCapacity, ScaleRuleInner, TimeWindow, WebhookNotification, GLOBAL_LOCATION,
};

const START_TIME_FORMAT_ERROR: &str =
    "Start time should have format of 'hh:mm' where hh is in 24-hour clock (AM/PM times are not supported).";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricStatisticType {
    Average,
    Min,
    Max,
    Sum,
}

impl MetricStatisticType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Average => "Average",
            Self::Min => "Min",
            Self::Max => "Max",
            Self::Sum => "Sum",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeAggregationType {
    Average,
    Minimum,
    Maximum,
    Total,
    Count,
    Last,
}

impl TimeAggregationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Average => "Average",
            Self::Minimum => "Minimum",
            Self::Maximum => "Maximum",
            Self::Total => "Total",
            Self::Count => "Count",
            Self::Last => "Last",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperationType {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl ComparisonOperationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "Equals",
            Self::NotEquals => "NotEquals",
            Self::GreaterThan => "GreaterThan",
            Self::GreaterThanOrEqual => "GreaterThanOrEqual",
            Self::LessThan => "LessThan",
            Self::LessThanOrEqual => "LessThanOrEqual",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleDirection {
    None,
    Increase,
    Decrease,
}

impl ScaleDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Increase => "Increase",
            Self::Decrease => "Decrease",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleType {
    ChangeCount,
    PercentChangeCount,
    ExactCount,
}

impl ScaleType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ChangeCount => "ChangeCount",
            Self::PercentChangeCount => "PercentChangeCount",
            Self::ExactCount => "ExactCount",
        }
    }
}

fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Parses `hh:mm` on a 24-hour clock.
pub fn parse_start_time(start_time: &str) -> AzureResult<(u32, u32)> {
    let invalid = || AzureError::validation(START_TIME_FORMAT_ERROR);
    let (hh, mm) = start_time.split_once(':').ok_or_else(invalid)?;
    let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hh) || !two_digits(mm) {
        return Err(invalid());
    }
    let hour: u32 = hh.parse().map_err(|_| invalid())?;
    let minute: u32 = mm.parse().map_err(|_| invalid())?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    Ok((hour, minute))
}

// ─── REST operations ────────────────────────────────────────────────

fn setting_url(client: &AzureClient, resource_group: &str, name: &str) -> AzureResult<String> {
    require("resourceGroupName", resource_group)?;
    require("autoscaleSettingName", name)?;
    client.resource_group_url(
        resource_group,
        &format!(
            "/providers/Microsoft.Insights/autoscalesettings/{}?api-version={}",
            name,
            client.config().api_version_autoscale
        ),
    )
}

pub async fn list_autoscale_settings(client: &AzureClient) -> AzureResult<Vec<AutoscaleSettingInner>> {
    let url = client.subscription_url(&format!(
        "/providers/Microsoft.Insights/autoscalesettings?api-version={}",
        client.config().api_version_autoscale
    ))?;
    debug!("list_autoscale_settings → {}", url);
    client.get_all_pages(&url).await
}

pub async fn list_autoscale_settings_by_resource_group(
    client: &AzureClient,
    resource_group: &str,
) -> AzureResult<Vec<AutoscaleSettingInner>> {
    let url = client.resource_group_url(
        resource_group,
        &format!(
            "/providers/Microsoft.Insights/autoscalesettings?api-version={}",
            client.config().api_version_autoscale
        ),
    )?;
    debug!("list_autoscale_settings_by_resource_group({}) → {}", resource_group, url);
    client.get_all_pages(&url).await
}

pub async fn get_autoscale_setting(
    client: &AzureClient,
    resource_group: &str,
    name: &str,
) -> AzureResult<AutoscaleSettingInner> {
    let url = setting_url(client, resource_group, name)?;
    debug!("get_autoscale_setting({}/{}) → {}", resource_group, name, url);
    client.get_json(&url).await
}

pub async fn create_or_update_autoscale_setting(
    client: &AzureClient,
    resource_group: &str,
    name: &str,
    setting: &AutoscaleSettingInner,
) -> AzureResult<AutoscaleSettingInner> {
    let url = setting_url(client, resource_group, name)?;
    debug!("create_or_update_autoscale_setting({}/{}) → {}", resource_group, name, url);
    client.put_json(&url, setting).await
}

pub async fn delete_autoscale_setting(client: &AzureClient, resource_group: &str, name: &str) -> AzureResult<()> {
    let url = setting_url(client, resource_group, name)?;
    debug!("delete_autoscale_setting({}/{}) → {}", resource_group, name, url);
    client.delete(&url).await
}

// ─── Scale rule ─────────────────────────────────────────────────────

/// Metric trigger plus the scale action it fires.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleRule {
    inner: ScaleRuleInner,
}

impl Default for ScaleRule {
    fn default() -> Self {
        Self::new()
    }
}

impl ScaleRule {
    pub fn new() -> Self {
        Self {
            inner: ScaleRuleInner {
                metric_trigger: MetricTrigger {
                    time_grain: "PT1M".into(),
                    statistic: MetricStatisticType::Average.as_str().into(),
                    time_window: "PT10M".into(),
                    time_aggregation: TimeAggregationType::Average.as_str().into(),
                    operator: ComparisonOperationType::GreaterThan.as_str().into(),
                    ..Default::default()
                },
                scale_action: ScaleAction::default(),
            },
        }
    }

    pub fn from_inner(inner: ScaleRuleInner) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &ScaleRuleInner {
        &self.inner
    }

    /// Resource whose metric drives the rule; usually the scaled resource.
    pub fn with_metric_source(mut self, resource_id: impl Into<String>) -> Self {
        self.inner.metric_trigger.metric_resource_uri = resource_id.into();
        self
    }

    pub fn with_metric_name(mut self, metric_name: impl Into<String>) -> Self {
        self.inner.metric_trigger.metric_name = metric_name.into();
        self
    }

    pub fn with_metric_name_and_namespace(mut self, metric_name: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.inner.metric_trigger.metric_name = metric_name.into();
        self.inner.metric_trigger.metric_namespace = Some(namespace.into());
        self
    }

    pub fn with_statistic(mut self, duration: Duration, time_grain: Duration, statistic: MetricStatisticType) -> Self {
        let trigger = &mut self.inner.metric_trigger;
        trigger.time_window = format_duration(duration);
        trigger.time_grain = format_duration(time_grain);
        trigger.statistic = statistic.as_str().into();
        self
    }

    pub fn with_condition(
        mut self,
        time_aggregation: TimeAggregationType,
        operator: ComparisonOperationType,
        threshold: f64,
    ) -> Self {
        let trigger = &mut self.inner.metric_trigger;
        trigger.time_aggregation = time_aggregation.as_str().into();
        trigger.operator = operator.as_str().into();
        trigger.threshold = threshold;
        self
    }

    pub fn with_scale_action(mut self, direction: ScaleDirection, scale_type: ScaleType, value: u32, cooldown: Duration) -> Self {
        self.inner.scale_action = ScaleAction {
            direction: direction.as_str().into(),
            scale_type: scale_type.as_str().into(),
            value: value.to_string(),
            cooldown: format_duration(cooldown),
        };
        self
    }

    fn validate(&self) -> AzureResult<()> {
        if self.inner.metric_trigger.metric_resource_uri.is_empty() {
            return Err(AzureError::required("metricResourceUri"));
        }
        if self.inner.metric_trigger.metric_name.is_empty() {
            return Err(AzureError::required("metricName"));
        }
        if self.inner.scale_action.direction.is_empty() {
            return Err(AzureError::required("scaleAction"));
        }
        Ok(())
    }
}

// ─── Profile ────────────────────────────────────────────────────────

/// One capacity profile: default, fixed-date or weekly recurring.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoscaleProfile {
    inner: AutoscaleProfileInner,
}

impl AutoscaleProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: AutoscaleProfileInner {
                name: name.into(),
                ..Default::default()
            },
        }
    }

    pub fn from_inner(inner: AutoscaleProfileInner) -> Self {
        Self { inner }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn inner(&self) -> &AutoscaleProfileInner {
        &self.inner
    }

    pub fn with_metric_based_scale(mut self, minimum: u32, maximum: u32, default_count: u32) -> Self {
        self.inner.capacity = ScaleCapacity {
            minimum: minimum.to_string(),
            maximum: maximum.to_string(),
            default_count: default_count.to_string(),
        };
        self
    }

    /// A fixed instance count for the profile's time window.
    pub fn with_schedule_based_scale(self, instance_count: u32) -> Self {
        self.with_metric_based_scale(instance_count, instance_count, instance_count)
    }

    /// Replaces any weekly recurrence.
    pub fn with_fixed_date_schedule(mut self, time_zone: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.inner.recurrence = None;
        self.inner.fixed_date = Some(TimeWindow {
            time_zone: Some(time_zone.into()),
            start: start.to_rfc3339(),
            end: end.to_rfc3339(),
        });
        self
    }

    /// Weekly recurrence starting at `start_time` (`hh:mm`) on each day.
    /// Replaces any fixed date window.
    pub fn with_recurrent_schedule(
        mut self,
        time_zone: impl Into<String>,
        start_time: &str,
        days: &[Weekday],
    ) -> AzureResult<Self> {
        let (hour, minute) = parse_start_time(start_time)?;
        if days.is_empty() {
            return Err(AzureError::required("dayOfWeek"));
        }
        self.inner.fixed_date = None;
        self.inner.recurrence = Some(Recurrence {
            frequency: "Week".into(),
            schedule: RecurrentSchedule {
                time_zone: time_zone.into(),
                days: days.iter().map(|d| day_name(*d).to_string()).collect(),
                hours: vec![hour],
                minutes: vec![minute],
            },
        });
        Ok(self)
    }

    pub fn with_rule(mut self, rule: ScaleRule) -> Self {
        self.inner.rules.push(rule.inner);
        self
    }

    pub fn without_rule(mut self, index: usize) -> Self {
        if index < self.inner.rules.len() {
            self.inner.rules.remove(index);
        }
        self
    }

    pub fn rules(&self) -> Vec<ScaleRule> {
        self.inner.rules.iter().cloned().map(ScaleRule::from_inner).collect()
    }

    fn validate(&self) -> AzureResult<()> {
        require("profileName", &self.inner.name)?;
        let count = |field: &str, value: &str| -> AzureResult<u32> {
            value
                .parse()
                .map_err(|_| AzureError::validation(format!("Profile '{}' has no valid {field} capacity", self.inner.name)))
        };
        let cap = &self.inner.capacity;
        let min = count("minimum", &cap.minimum)?;
        let max = count("maximum", &cap.maximum)?;
        let default = count("default", &cap.default_count)?;
        if !(min <= default && default <= max) {
            return Err(AzureError::validation(format!(
                "Profile '{}' capacity must satisfy minimum <= default <= maximum",
                self.inner.name
            )));
        }
        if self.inner.fixed_date.is_some() && self.inner.recurrence.is_some() {
            return Err(AzureError::validation(format!(
                "Profile '{}' cannot have both a fixed date and a recurrence",
                self.inner.name
            )));
        }
        self.rules().iter().try_for_each(ScaleRule::validate)
    }
}

fn validate_profiles(profiles: &[AutoscaleProfileInner]) -> AzureResult<()> {
    if profiles.is_empty() {
        return Err(AzureError::validation("An autoscale setting requires at least one profile"));
    }
    for p in profiles {
        AutoscaleProfile::from_inner(p.clone()).validate()?;
    }
    Ok(())
}

// ─── Notifications ──────────────────────────────────────────────────

/// The setting carries exactly one notification entry.
fn notification_mut(props: &mut AutoscaleSettingProperties) -> &mut AutoscaleNotification {
    if props.notifications.is_empty() {
        props.notifications.push(AutoscaleNotification::default());
    }
    &mut props.notifications[0]
}

fn email_mut(props: &mut AutoscaleSettingProperties) -> &mut EmailNotification {
    notification_mut(props).email.get_or_insert_with(EmailNotification::default)
}

fn add_webhook(props: &mut AutoscaleSettingProperties, service_uri: String) {
    let hooks = &mut notification_mut(props).webhooks;
    if !hooks.iter().any(|h| h.service_uri == service_uri) {
        hooks.push(WebhookNotification {
            service_uri,
            properties: HashMap::new(),
        });
    }
}

// ─── Fluent wrapper ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AutoscaleSetting {
    inner: AutoscaleSettingInner,
    client: Arc<AzureClient>,
}

impl_groupable_resource!(AutoscaleSetting, AutoscaleSettingInner);

impl AutoscaleSetting {
    pub(crate) fn new(inner: AutoscaleSettingInner, client: Arc<AzureClient>) -> Self {
        Self { inner, client }
    }

    pub fn target_resource_id(&self) -> &str {
        &self.inner.properties.target_resource_uri
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.properties.enabled
    }

    pub fn profiles(&self) -> Vec<AutoscaleProfile> {
        self.inner
            .properties
            .profiles
            .iter()
            .cloned()
            .map(AutoscaleProfile::from_inner)
            .collect()
    }

    fn email(&self) -> Option<&EmailNotification> {
        self.inner.properties.notifications.first().and_then(|n| n.email.as_ref())
    }

    pub fn admin_email_notification_enabled(&self) -> bool {
        self.email().is_some_and(|e| e.send_to_subscription_administrator)
    }

    pub fn coadmin_email_notification_enabled(&self) -> bool {
        self.email().is_some_and(|e| e.send_to_subscription_co_administrators)
    }

    pub fn custom_email_notifications(&self) -> &[String] {
        self.email().map(|e| e.custom_emails.as_slice()).unwrap_or_default()
    }

    pub fn webhook_notifications(&self) -> Vec<&str> {
        self.inner
            .properties
            .notifications
            .first()
            .map(|n| n.webhooks.iter().map(|w| w.service_uri.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn update(&self) -> AutoscaleSettingUpdate {
        AutoscaleSettingUpdate {
            inner: self.inner.clone(),
            client: self.client.clone(),
        }
    }
}

#[async_trait]
impl Refreshable for AutoscaleSetting {
    async fn refresh(&mut self) -> AzureResult<()> {
        let rg = self.resource_group_name();
        let name = self.name().to_string();
        self.inner = get_autoscale_setting(&self.client, &rg, &name).await?;
        Ok(())
    }
}

// ─── Definition ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AutoscaleSettingDefinition {
    spec: GroupableSpec,
    properties: AutoscaleSettingProperties,
    client: Arc<AzureClient>,
}

impl GroupableDefinition for AutoscaleSettingDefinition {
    fn spec_mut(&mut self) -> &mut GroupableSpec {
        &mut self.spec
    }
}

impl AutoscaleSettingDefinition {
    pub fn with_target_resource(mut self, resource_id: impl Into<String>) -> Self {
        self.properties.target_resource_uri = resource_id.into();
        self
    }

    pub fn with_autoscale_profile(mut self, profile: AutoscaleProfile) -> Self {
        self.properties.profiles.retain(|p| p.name != profile.inner.name);
        self.properties.profiles.push(profile.inner);
        self
    }

    pub fn with_admin_email_notification(mut self) -> Self {
        email_mut(&mut self.properties).send_to_subscription_administrator = true;
        self
    }

    pub fn with_coadmin_email_notification(mut self) -> Self {
        email_mut(&mut self.properties).send_to_subscription_co_administrators = true;
        self
    }

    pub fn with_custom_email_notification(mut self, email: impl Into<String>) -> Self {
        email_mut(&mut self.properties).custom_emails.push(email.into());
        self
    }

    pub fn with_webhook_notification(mut self, service_uri: impl Into<String>) -> Self {
        add_webhook(&mut self.properties, service_uri.into());
        self
    }

    pub fn with_autoscale_disabled(mut self) -> Self {
        self.properties.enabled = false;
        self
    }
}

#[async_trait]
impl Creatable for AutoscaleSettingDefinition {
    type Output = AutoscaleSetting;

    async fn create(self) -> AzureResult<AutoscaleSetting> {
        self.spec.validate_placement()?;
        require("targetResourceUri", &self.properties.target_resource_uri)?;
        validate_profiles(&self.properties.profiles)?;
        self.spec.ensure_resource_group(&self.client).await?;

        let rg = self.spec.resource_group()?;
        let mut properties = self.properties.clone();
        notification_mut(&mut properties);
        let body = AutoscaleSettingInner {
            location: Some(
                self.spec
                    .region
                    .as_ref()
                    .map(|r| r.name().to_string())
                    .unwrap_or_else(|| GLOBAL_LOCATION.into()),
            ),
            tags: self.spec.tags.clone(),
            properties,
            ..Default::default()
        };
        let inner = create_or_update_autoscale_setting(&self.client, rg, &self.spec.name, &body).await?;
        info!("Created autoscale setting {}/{}", rg, self.spec.name);
        Ok(AutoscaleSetting::new(inner, self.client))
    }
}

// ─── Update ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AutoscaleSettingUpdate {
    inner: AutoscaleSettingInner,
    client: Arc<AzureClient>,
}

impl AutoscaleSettingUpdate {
    pub fn with_autoscale_profile(mut self, profile: AutoscaleProfile) -> Self {
        let profiles = &mut self.inner.properties.profiles;
        match profiles.iter_mut().find(|p| p.name == profile.inner.name) {
            Some(existing) => *existing = profile.inner,
            None => profiles.push(profile.inner),
        }
        self
    }

    /// Edits an existing profile in place.
    pub fn update_autoscale_profile<F>(mut self, name: &str, edit: F) -> AzureResult<Self>
    where
        F: FnOnce(AutoscaleProfile) -> AzureResult<AutoscaleProfile>,
    {
        let slot = self
            .inner
            .properties
            .profiles
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| AzureError::validation(format!("Cannot find autoscale profile with the name '{name}'")))?;
        *slot = edit(AutoscaleProfile::from_inner(slot.clone()))?.inner;
        Ok(self)
    }

    pub fn without_autoscale_profile(mut self, name: &str) -> Self {
        self.inner.properties.profiles.retain(|p| p.name != name);
        self
    }

    pub fn with_autoscale_enabled(mut self) -> Self {
        self.inner.properties.enabled = true;
        self
    }

    pub fn with_autoscale_disabled(mut self) -> Self {
        self.inner.properties.enabled = false;
        self
    }

    pub fn with_admin_email_notification(mut self) -> Self {
        email_mut(&mut self.inner.properties).send_to_subscription_administrator = true;
        self
    }

    pub fn without_admin_email_notification(mut self) -> Self {
        email_mut(&mut self.inner.properties).send_to_subscription_administrator = false;
        self
    }

    pub fn with_coadmin_email_notification(mut self) -> Self {
        email_mut(&mut self.inner.properties).send_to_subscription_co_administrators = true;
        self
    }

    pub fn without_coadmin_email_notification(mut self) -> Self {
        email_mut(&mut self.inner.properties).send_to_subscription_co_administrators = false;
        self
    }

    pub fn with_custom_email_notification(mut self, email: impl Into<String>) -> Self {
        email_mut(&mut self.inner.properties).custom_emails.push(email.into());
        self
    }

    pub fn without_custom_email_notification(mut self, email: &str) -> Self {
        email_mut(&mut self.inner.properties).custom_emails.retain(|e| e != email);
        self
    }

    pub fn with_webhook_notification(mut self, service_uri: impl Into<String>) -> Self {
        add_webhook(&mut self.inner.properties, service_uri.into());
        self
    }

    pub fn without_webhook_notification(mut self, service_uri: &str) -> Self {
        notification_mut(&mut self.inner.properties)
            .webhooks
            .retain(|w| w.service_uri != service_uri);
        self
    }
}

impl TaggableUpdate for AutoscaleSettingUpdate {
    fn tags_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.inner.tags
    }
}

#[async_trait]
impl Appliable for AutoscaleSettingUpdate {
    type Output = AutoscaleSetting;

    async fn apply(self) -> AzureResult<AutoscaleSetting> {
        validate_profiles(&self.inner.properties.profiles)?;
        let rg = azfluent_core::resource_id::resource_group_from_id(self.inner.id.as_deref().unwrap_or_default())
            .ok_or_else(AzureError::resource_group_required)?;
        let name = self.inner.name.clone().unwrap_or_default();
        let inner = create_or_update_autoscale_setting(&self.client, &rg, &name, &self.inner).await?;
        info!("Updated autoscale setting {}/{}", rg, name);
        Ok(AutoscaleSetting::new(inner, self.client))
    }
}

// ─── Collection ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AutoscaleSettings {
    client: Arc<AzureClient>,
}

impl AutoscaleSettings {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    fn wrap(&self, inner: AutoscaleSettingInner) -> AutoscaleSetting {
        AutoscaleSetting::new(inner, self.client.clone())
    }

    pub fn define(&self, name: impl Into<String>) -> AutoscaleSettingDefinition {
        AutoscaleSettingDefinition {
            spec: GroupableSpec::new(name),
            properties: AutoscaleSettingProperties {
                enabled: true,
                ..Default::default()
            },
            client: self.client.clone(),
        }
    }
}

#[async_trait]
impl SupportsListing for AutoscaleSettings {
    type Item = AutoscaleSetting;

    async fn list(&self) -> AzureResult<Vec<AutoscaleSetting>> {
        Ok(list_autoscale_settings(&self.client)
            .await?
            .into_iter()
            .map(|inner| self.wrap(inner))
            .collect())
    }
}

#[async_trait]
impl SupportsListingByResourceGroup for AutoscaleSettings {
    type Item = AutoscaleSetting;

    async fn list_by_resource_group(&self, resource_group: &str) -> AzureResult<Vec<AutoscaleSetting>> {
        Ok(list_autoscale_settings_by_resource_group(&self.client, resource_group)
            .await?
            .into_iter()
            .map(|inner| self.wrap(inner))
            .collect())
    }
}

#[async_trait]
impl SupportsGettingByResourceGroup for AutoscaleSettings {
    type Item = AutoscaleSetting;

    async fn get_by_resource_group(&self, resource_group: &str, name: &str) -> AzureResult<AutoscaleSetting> {
        Ok(self.wrap(get_autoscale_setting(&self.client, resource_group, name).await?))
    }
}

#[async_trait]
impl SupportsDeletingByResourceGroup for AutoscaleSettings {
    async fn delete_by_resource_group(&self, resource_group: &str, name: &str) -> AzureResult<()> {
        delete_autoscale_setting(&self.client, resource_group, name).await?;
        info!("Deleted autoscale setting {}/{}", resource_group, name);
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use azfluent_core::test_utils::mock_client;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SETTING_PATH: &str =
        "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Insights/autoscalesettings/web-autoscale";
    const PLAN_ID: &str = "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Web/serverfarms/plan1";

    fn setting_json() -> serde_json::Value {
        json!({
            "id": SETTING_PATH, "name": "web-autoscale", "location": "global",
            "properties": {
                "enabled": true,
                "targetResourceUri": PLAN_ID,
                "profiles": [{
                    "name": "Default",
                    "capacity": {"minimum": "1", "maximum": "5", "default": "2"},
                    "rules": []
                }],
                "notifications": [{
                    "operation": "Scale",
                    "email": {"sendToSubscriptionAdministrator": true, "sendToSubscriptionCoAdministrators": false, "customEmails": []},
                    "webhooks": []
                }]
            }
        })
    }

    fn cpu_rule() -> ScaleRule {
        ScaleRule::new()
            .with_metric_source(PLAN_ID)
            .with_metric_name("CpuPercentage")
            .with_statistic(Duration::minutes(5), Duration::minutes(1), MetricStatisticType::Average)
            .with_condition(TimeAggregationType::Average, ComparisonOperationType::GreaterThan, 70.0)
            .with_scale_action(ScaleDirection::Increase, ScaleType::ChangeCount, 1, Duration::minutes(5))
    }

    #[test]
    fn start_time_parsing() {
        assert_eq!(parse_start_time("18:00").unwrap(), (18, 0));
        assert_eq!(parse_start_time("07:05").unwrap(), (7, 5));
        for bad in ["24:00", "12:60", "6pm", "12:00:00", ":30", "ab:cd", "9:05", "09:5", "9:5", "+9:05"] {
            let err = parse_start_time(bad).unwrap_err();
            assert_eq!(err.message, START_TIME_FORMAT_ERROR, "input {bad}");
        }
    }

    #[test]
    fn profile_capacity_ordering() {
        assert!(AutoscaleProfile::new("p").with_metric_based_scale(1, 5, 2).validate().is_ok());
        assert!(AutoscaleProfile::new("p").with_metric_based_scale(3, 5, 2).validate().is_err());
        assert!(AutoscaleProfile::new("p").with_schedule_based_scale(4).validate().is_ok());
        assert!(AutoscaleProfile::new("p").validate().is_err());
    }

    #[test]
    fn last_schedule_replaces_the_other() {
        let start = Utc::now();
        let profile = AutoscaleProfile::new("p")
            .with_schedule_based_scale(2)
            .with_fixed_date_schedule("UTC", start, start + Duration::hours(2))
            .with_recurrent_schedule("UTC", "09:00", &[Weekday::Mon])
            .unwrap();
        assert!(profile.inner.fixed_date.is_none());
        assert!(profile.inner.recurrence.is_some());
        assert!(profile.validate().is_ok());

        let profile = profile.with_fixed_date_schedule("UTC", start, start + Duration::hours(1));
        assert!(profile.inner.recurrence.is_none());
        assert!(profile.inner.fixed_date.is_some());
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn profile_with_both_schedules_is_rejected() {
        let mut inner = AutoscaleProfile::new("p")
            .with_schedule_based_scale(2)
            .with_recurrent_schedule("UTC", "09:00", &[Weekday::Mon])
            .unwrap()
            .inner;
        inner.fixed_date = Some(TimeWindow {
            time_zone: None,
            start: "2026-01-01T00:00:00Z".into(),
            end: "2026-01-02T00:00:00Z".into(),
        });
        let err = AutoscaleProfile::from_inner(inner).validate().unwrap_err();
        assert!(err.message.contains("both"));
    }

    #[test]
    fn rule_requires_metric_source() {
        let rule = ScaleRule::new().with_metric_name("CpuPercentage");
        let err = AutoscaleProfile::new("p")
            .with_metric_based_scale(1, 2, 1)
            .with_rule(rule)
            .validate()
            .unwrap_err();
        assert!(err.message.contains("metricResourceUri"));
    }

    #[tokio::test]
    async fn create_with_profile_rule_and_notifications() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(SETTING_PATH))
            .and(body_partial_json(json!({
                "location": "global",
                "properties": {
                    "enabled": true,
                    "targetResourceUri": PLAN_ID,
                    "profiles": [{
                        "name": "Default",
                        "capacity": {"minimum": "1", "maximum": "5", "default": "2"},
                        "rules": [{
                            "metricTrigger": {"metricName": "CpuPercentage", "timeWindow": "PT5M", "threshold": 70.0},
                            "scaleAction": {"direction": "Increase", "type": "ChangeCount", "value": "1", "cooldown": "PT5M"}
                        }]
                    }, {
                        "name": "Weekend",
                        "recurrence": {"frequency": "Week", "schedule": {"days": ["Saturday", "Sunday"], "hours": [8], "minutes": [30]}}
                    }],
                    "notifications": [{
                        "operation": "Scale",
                        "email": {"sendToSubscriptionAdministrator": true, "customEmails": ["ops@example.com"]},
                        "webhooks": [{"serviceUri": "https://example.com/scale"}]
                    }]
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(setting_json()))
            .expect(1)
            .mount(&server)
            .await;

        let setting = AutoscaleSettings::new(mock_client(&server))
            .define("web-autoscale")
            .with_existing_resource_group("rg1")
            .with_target_resource(PLAN_ID)
            .with_autoscale_profile(AutoscaleProfile::new("Default").with_metric_based_scale(1, 5, 2).with_rule(cpu_rule()))
            .with_autoscale_profile(
                AutoscaleProfile::new("Weekend")
                    .with_schedule_based_scale(1)
                    .with_recurrent_schedule("Pacific Standard Time", "08:30", &[Weekday::Sat, Weekday::Sun])
                    .unwrap(),
            )
            .with_admin_email_notification()
            .with_custom_email_notification("ops@example.com")
            .with_webhook_notification("https://example.com/scale")
            .create()
            .await
            .unwrap();
        assert!(setting.admin_email_notification_enabled());
        assert_eq!(setting.profiles().len(), 1);
    }

    #[tokio::test]
    async fn create_without_profiles_fails() {
        let server = MockServer::start().await;
        let err = AutoscaleSettings::new(mock_client(&server))
            .define("web-autoscale")
            .with_existing_resource_group("rg1")
            .with_target_resource(PLAN_ID)
            .create()
            .await
            .unwrap_err();
        assert!(err.message.contains("at least one profile"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_unknown_profile_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SETTING_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(setting_json()))
            .mount(&server)
            .await;
        let setting = AutoscaleSettings::new(mock_client(&server))
            .get_by_resource_group("rg1", "web-autoscale")
            .await
            .unwrap();
        let err = setting
            .update()
            .update_autoscale_profile("Nightly", Ok)
            .unwrap_err();
        assert_eq!(err.message, "Cannot find autoscale profile with the name 'Nightly'");
    }

    #[tokio::test]
    async fn update_edits_profile_and_disables() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SETTING_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(setting_json()))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(SETTING_PATH))
            .and(body_partial_json(json!({
                "properties": {
                    "enabled": false,
                    "profiles": [{"name": "Default", "capacity": {"minimum": "2", "maximum": "8", "default": "3"}}],
                    "notifications": [{"email": {"sendToSubscriptionAdministrator": false}}]
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(setting_json()))
            .expect(1)
            .mount(&server)
            .await;

        let setting = AutoscaleSettings::new(mock_client(&server))
            .get_by_resource_group("rg1", "web-autoscale")
            .await
            .unwrap();
        setting
            .update()
            .update_autoscale_profile("Default", |p| Ok(p.with_metric_based_scale(2, 8, 3)))
            .unwrap()
            .with_autoscale_disabled()
            .without_admin_email_notification()
            .apply()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_switches_fixed_date_profile_to_recurrence() {
        let server = MockServer::start().await;
        let mut existing = setting_json();
        existing["properties"]["profiles"][0]["fixedDate"] = json!({
            "timeZone": "UTC", "start": "2026-11-01T00:00:00Z", "end": "2026-11-02T00:00:00Z"
        });
        Mock::given(method("GET"))
            .and(path(SETTING_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(existing))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(SETTING_PATH))
            .and(body_partial_json(json!({
                "properties": {
                    "profiles": [{
                        "name": "Default",
                        "recurrence": {
                            "frequency": "Week",
                            "schedule": {"timeZone": "UTC", "days": ["Monday", "Friday"], "hours": [9], "minutes": [30]}
                        }
                    }]
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(setting_json()))
            .expect(1)
            .mount(&server)
            .await;

        let setting = AutoscaleSettings::new(mock_client(&server))
            .get_by_resource_group("rg1", "web-autoscale")
            .await
            .unwrap();
        let update = setting
            .update()
            .update_autoscale_profile("Default", |p| {
                p.with_recurrent_schedule("UTC", "09:30", &[Weekday::Mon, Weekday::Fri])
            })
            .unwrap();
        assert!(update.inner.properties.profiles[0].fixed_date.is_none());
        update.apply().await.unwrap();
    }
}
