//! Metric alert rules with static or dynamic threshold criteria.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use azfluent_core::fluent::{
    Appliable, Creatable, GroupableDefinition, GroupableResource, GroupableSpec, Refreshable,
    Resource, SupportsDeletingByResourceGroup, SupportsGettingByResourceGroup, SupportsListing,
    SupportsListingByResourceGroup, TaggableUpdate,
};
use azfluent_core::iso8601::{format_duration, parse_duration};
use azfluent_core::types::{require, AzureError, AzureResult};
use azfluent_core::{async_trait, impl_groupable_resource, AzureClient};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};

use crate::types::{
    criteria_odata_type, criterion_type, DynamicThresholdFailingPeriods, MetricAlertAction,
    MetricAlertCriteria, MetricAlertInner, MetricAlertProperties, MetricCriteria, MetricDimension,
    GLOBAL_LOCATION,
};

/// Comparison used by static thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricAlertRuleCondition {
    Equals,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl MetricAlertRuleCondition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "Equals",
            Self::GreaterThan => "GreaterThan",
            Self::GreaterThanOrEqual => "GreaterThanOrEqual",
            Self::LessThan => "LessThan",
            Self::LessThanOrEqual => "LessThanOrEqual",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricAlertRuleTimeAggregation {
    Average,
    Count,
    Minimum,
    Maximum,
    Total,
}

impl MetricAlertRuleTimeAggregation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Average => "Average",
            Self::Count => "Count",
            Self::Minimum => "Minimum",
            Self::Maximum => "Maximum",
            Self::Total => "Total",
        }
    }
}

/// Direction of deviation a dynamic threshold watches for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicThresholdOperator {
    GreaterThan,
    LessThan,
    GreaterOrLessThan,
}

impl DynamicThresholdOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GreaterThan => "GreaterThan",
            Self::LessThan => "LessThan",
            Self::GreaterOrLessThan => "GreaterOrLessThan",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicThresholdSensitivity {
    Low,
    Medium,
    High,
}

impl DynamicThresholdSensitivity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

// ─── REST operations ────────────────────────────────────────────────

fn alert_url(client: &AzureClient, resource_group: &str, name: &str) -> AzureResult<String> {
    require("resourceGroupName", resource_group)?;
    require("ruleName", name)?;
    client.resource_group_url(
        resource_group,
        &format!(
            "/providers/Microsoft.Insights/metricAlerts/{}?api-version={}",
            name,
            client.config().api_version_metric_alerts
        ),
    )
}

pub async fn list_metric_alerts(client: &AzureClient) -> AzureResult<Vec<MetricAlertInner>> {
    let url = client.subscription_url(&format!(
        "/providers/Microsoft.Insights/metricAlerts?api-version={}",
        client.config().api_version_metric_alerts
    ))?;
    debug!("list_metric_alerts → {}", url);
    client.get_all_pages(&url).await
}

pub async fn list_metric_alerts_by_resource_group(
    client: &AzureClient,
    resource_group: &str,
) -> AzureResult<Vec<MetricAlertInner>> {
    let url = client.resource_group_url(
        resource_group,
        &format!(
            "/providers/Microsoft.Insights/metricAlerts?api-version={}",
            client.config().api_version_metric_alerts
        ),
    )?;
    debug!("list_metric_alerts_by_resource_group({}) → {}", resource_group, url);
    client.get_all_pages(&url).await
}

pub async fn get_metric_alert(client: &AzureClient, resource_group: &str, name: &str) -> AzureResult<MetricAlertInner> {
    let url = alert_url(client, resource_group, name)?;
    debug!("get_metric_alert({}/{}) → {}", resource_group, name, url);
    client.get_json(&url).await
}

pub async fn create_or_update_metric_alert(
    client: &AzureClient,
    resource_group: &str,
    name: &str,
    alert: &MetricAlertInner,
) -> AzureResult<MetricAlertInner> {
    let url = alert_url(client, resource_group, name)?;
    debug!("create_or_update_metric_alert({}/{}) → {}", resource_group, name, url);
    client.put_json(&url, alert).await
}

pub async fn delete_metric_alert(client: &AzureClient, resource_group: &str, name: &str) -> AzureResult<()> {
    let url = alert_url(client, resource_group, name)?;
    debug!("delete_metric_alert({}/{}) → {}", resource_group, name, url);
    client.delete(&url).await
}

// ─── Criteria builders ──────────────────────────────────────────────

/// A fixed-threshold condition on one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticCriterion {
    name: String,
    metric_name: String,
    metric_namespace: Option<String>,
    condition: MetricAlertRuleCondition,
    aggregation: MetricAlertRuleTimeAggregation,
    threshold: f64,
    dimensions: Vec<MetricDimension>,
}

impl StaticCriterion {
    pub fn new(name: impl Into<String>, metric_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metric_name: metric_name.into(),
            metric_namespace: None,
            condition: MetricAlertRuleCondition::GreaterThan,
            aggregation: MetricAlertRuleTimeAggregation::Average,
            threshold: 0.0,
            dimensions: Vec::new(),
        }
    }

    pub fn with_metric_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.metric_namespace = Some(namespace.into());
        self
    }

    pub fn with_condition(
        mut self,
        aggregation: MetricAlertRuleTimeAggregation,
        condition: MetricAlertRuleCondition,
        threshold: f64,
    ) -> Self {
        self.aggregation = aggregation;
        self.condition = condition;
        self.threshold = threshold;
        self
    }

    /// Restricts the criterion to series whose dimension has one of `values`.
    pub fn with_dimension(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        let name = name.into();
        self.dimensions.retain(|d| d.name != name);
        self.dimensions.push(MetricDimension {
            name,
            operator: "Include".into(),
            values,
        });
        self
    }

    fn to_criteria(&self) -> MetricCriteria {
        MetricCriteria {
            criterion_type: criterion_type::STATIC.into(),
            name: self.name.clone(),
            metric_name: self.metric_name.clone(),
            metric_namespace: self.metric_namespace.clone(),
            time_aggregation: self.aggregation.as_str().into(),
            dimensions: self.dimensions.clone(),
            operator: self.condition.as_str().into(),
            threshold: Some(self.threshold),
            ..Default::default()
        }
    }
}

/// A condition whose threshold is learned from the metric's history.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicCriterion {
    name: String,
    metric_name: String,
    metric_namespace: Option<String>,
    operator: DynamicThresholdOperator,
    sensitivity: DynamicThresholdSensitivity,
    aggregation: MetricAlertRuleTimeAggregation,
    failing_periods: DynamicThresholdFailingPeriods,
    ignore_data_before: Option<DateTime<Utc>>,
    dimensions: Vec<MetricDimension>,
}

impl DynamicCriterion {
    pub fn new(name: impl Into<String>, metric_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metric_name: metric_name.into(),
            metric_namespace: None,
            operator: DynamicThresholdOperator::GreaterOrLessThan,
            sensitivity: DynamicThresholdSensitivity::Medium,
            aggregation: MetricAlertRuleTimeAggregation::Average,
            failing_periods: DynamicThresholdFailingPeriods {
                number_of_evaluation_periods: 4,
                min_failing_periods_to_alert: 4,
            },
            ignore_data_before: None,
            dimensions: Vec::new(),
        }
    }

    pub fn with_metric_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.metric_namespace = Some(namespace.into());
        self
    }

    pub fn with_condition(
        mut self,
        aggregation: MetricAlertRuleTimeAggregation,
        operator: DynamicThresholdOperator,
        sensitivity: DynamicThresholdSensitivity,
    ) -> Self {
        self.aggregation = aggregation;
        self.operator = operator;
        self.sensitivity = sensitivity;
        self
    }

    pub fn with_failing_periods(mut self, evaluation_periods: u32, min_failing_periods: u32) -> Self {
        self.failing_periods = DynamicThresholdFailingPeriods {
            number_of_evaluation_periods: evaluation_periods,
            min_failing_periods_to_alert: min_failing_periods,
        };
        self
    }

    pub fn with_ignore_data_before(mut self, at: DateTime<Utc>) -> Self {
        self.ignore_data_before = Some(at);
        self
    }

    pub fn with_dimension(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        let name = name.into();
        self.dimensions.retain(|d| d.name != name);
        self.dimensions.push(MetricDimension {
            name,
            operator: "Include".into(),
            values,
        });
        self
    }

    fn to_criteria(&self) -> AzureResult<MetricCriteria> {
        let fp = &self.failing_periods;
        if fp.min_failing_periods_to_alert == 0 || fp.min_failing_periods_to_alert > fp.number_of_evaluation_periods {
            return Err(AzureError::validation(
                "Failing periods must be between 1 and the number of evaluation periods",
            ));
        }
        Ok(MetricCriteria {
            criterion_type: criterion_type::DYNAMIC.into(),
            name: self.name.clone(),
            metric_name: self.metric_name.clone(),
            metric_namespace: self.metric_namespace.clone(),
            time_aggregation: self.aggregation.as_str().into(),
            dimensions: self.dimensions.clone(),
            operator: self.operator.as_str().into(),
            alert_sensitivity: Some(self.sensitivity.as_str().into()),
            failing_periods: Some(fp.clone()),
            ignore_data_before: self.ignore_data_before.map(|t| t.to_rfc3339()),
            ..Default::default()
        })
    }
}

/// Criteria keyed by name so output order is stable.
#[derive(Debug, Clone, Default, PartialEq)]
struct CriteriaSet {
    static_criteria: BTreeMap<String, MetricCriteria>,
    dynamic_criteria: BTreeMap<String, MetricCriteria>,
}

impl CriteriaSet {
    fn from_inner(criteria: Option<&MetricAlertCriteria>) -> Self {
        let mut set = Self::default();
        for c in criteria.map(|c| c.all_of.as_slice()).unwrap_or_default() {
            let target = if c.criterion_type == criterion_type::DYNAMIC {
                &mut set.dynamic_criteria
            } else {
                &mut set.static_criteria
            };
            target.insert(c.name.clone(), c.clone());
        }
        set
    }

    fn remove(&mut self, name: &str) {
        self.static_criteria.remove(name);
        self.dynamic_criteria.remove(name);
    }

    /// Picks the odata type from the target count and criterion kind.
    fn build(&self, multiple_targets: bool) -> AzureResult<MetricAlertCriteria> {
        if self.static_criteria.is_empty() && self.dynamic_criteria.is_empty() {
            return Err(AzureError::validation("Condition cannot be empty"));
        }
        if !self.static_criteria.is_empty() && !self.dynamic_criteria.is_empty() {
            return Err(AzureError::validation(
                "Static condition and dynamic condition cannot co-exist",
            ));
        }
        let single = !multiple_targets && self.dynamic_criteria.is_empty();
        let odata_type = if single {
            criteria_odata_type::SINGLE_RESOURCE
        } else {
            criteria_odata_type::MULTIPLE_RESOURCE
        };
        Ok(MetricAlertCriteria {
            odata_type: odata_type.into(),
            all_of: self
                .static_criteria
                .values()
                .chain(self.dynamic_criteria.values())
                .cloned()
                .collect(),
        })
    }
}

// ─── Fluent wrapper ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MetricAlert {
    inner: MetricAlertInner,
    client: Arc<AzureClient>,
}

impl_groupable_resource!(MetricAlert, MetricAlertInner);

impl MetricAlert {
    pub(crate) fn new(inner: MetricAlertInner, client: Arc<AzureClient>) -> Self {
        Self { inner, client }
    }

    pub fn description(&self) -> Option<&str> {
        self.inner.properties.description.as_deref()
    }

    pub fn severity(&self) -> i32 {
        self.inner.properties.severity
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.properties.enabled
    }

    pub fn scopes(&self) -> &[String] {
        &self.inner.properties.scopes
    }

    /// Window the criteria are evaluated over.
    pub fn window_size(&self) -> Option<Duration> {
        parse_duration(&self.inner.properties.window_size).ok()
    }

    pub fn evaluation_frequency(&self) -> Option<Duration> {
        parse_duration(&self.inner.properties.evaluation_frequency).ok()
    }

    pub fn auto_mitigate(&self) -> bool {
        self.inner.properties.auto_mitigate.unwrap_or(false)
    }

    pub fn action_group_ids(&self) -> Vec<&str> {
        self.inner
            .properties
            .actions
            .iter()
            .map(|a| a.action_group_id.as_str())
            .collect()
    }

    pub fn criteria(&self) -> &[MetricCriteria] {
        self.inner
            .properties
            .criteria
            .as_ref()
            .map(|c| c.all_of.as_slice())
            .unwrap_or_default()
    }

    pub fn last_updated_time(&self) -> Option<&str> {
        self.inner.properties.last_updated_time.as_deref()
    }

    pub fn update(&self) -> MetricAlertUpdate {
        MetricAlertUpdate {
            criteria: CriteriaSet::from_inner(self.inner.properties.criteria.as_ref()),
            inner: self.inner.clone(),
            client: self.client.clone(),
        }
    }
}

#[async_trait]
impl Refreshable for MetricAlert {
    async fn refresh(&mut self) -> AzureResult<()> {
        let rg = self.resource_group_name();
        let name = self.name().to_string();
        self.inner = get_metric_alert(&self.client, &rg, &name).await?;
        Ok(())
    }
}

fn set_action_groups(props: &mut MetricAlertProperties, ids: Vec<String>) {
    props.actions = ids
        .into_iter()
        .map(|id| MetricAlertAction {
            action_group_id: id,
            web_hook_properties: HashMap::new(),
        })
        .collect();
}

// ─── Definition ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MetricAlertDefinition {
    spec: GroupableSpec,
    properties: MetricAlertProperties,
    multiple_targets: bool,
    criteria: CriteriaSet,
    client: Arc<AzureClient>,
}

impl GroupableDefinition for MetricAlertDefinition {
    fn spec_mut(&mut self) -> &mut GroupableSpec {
        &mut self.spec
    }
}

impl MetricAlertDefinition {
    pub fn with_target_resource(mut self, resource_id: impl Into<String>) -> Self {
        self.properties.scopes = vec![resource_id.into()];
        self.properties.target_resource_type = None;
        self.properties.target_resource_region = None;
        self.multiple_targets = false;
        self
    }

    /// Targets several resources that share `resource_type` and `region`.
    pub fn with_multiple_target_resources(
        mut self,
        resource_ids: Vec<String>,
        resource_type: impl Into<String>,
        region: impl Into<String>,
    ) -> AzureResult<Self> {
        if resource_ids.is_empty() {
            return Err(AzureError::validation("Target resource cannot be empty"));
        }
        self.properties.scopes = resource_ids;
        self.properties.target_resource_type = Some(resource_type.into());
        self.properties.target_resource_region = Some(region.into());
        self.multiple_targets = true;
        Ok(self)
    }

    /// Same as [`Self::with_multiple_target_resources`], reading type and
    /// region from the resources themselves.
    pub fn with_multiple_target_resources_of<R: Resource>(self, resources: &[R]) -> AzureResult<Self> {
        let first = resources
            .first()
            .ok_or_else(|| AzureError::validation("Target resource cannot be empty"))?;
        let (ty, region) = (first.resource_type(), first.region_name());
        if resources
            .iter()
            .any(|r| !r.resource_type().eq_ignore_ascii_case(ty) || !r.region_name().eq_ignore_ascii_case(region))
        {
            return Err(AzureError::validation(
                "Target resource must be of same resource type and in same region",
            ));
        }
        let ids = resources.iter().map(|r| r.id().to_string()).collect();
        let (ty, region) = (ty.to_string(), region.to_string());
        self.with_multiple_target_resources(ids, ty, region)
    }

    pub fn with_period(mut self, window: Duration) -> Self {
        self.properties.window_size = format_duration(window);
        self
    }

    pub fn with_frequency(mut self, frequency: Duration) -> Self {
        self.properties.evaluation_frequency = format_duration(frequency);
        self
    }

    /// Severity runs from 0 (critical) to 4 (verbose).
    pub fn with_alert_details(mut self, severity: i32, description: impl Into<String>) -> Self {
        self.properties.severity = severity;
        self.properties.description = Some(description.into());
        self
    }

    pub fn with_action_groups(mut self, action_group_ids: Vec<String>) -> Self {
        set_action_groups(&mut self.properties, action_group_ids);
        self
    }

    pub fn with_alert_criteria(mut self, criterion: StaticCriterion) -> Self {
        self.criteria.static_criteria.insert(criterion.name.clone(), criterion.to_criteria());
        self
    }

    pub fn with_dynamic_alert_criteria(mut self, criterion: DynamicCriterion) -> AzureResult<Self> {
        let c = criterion.to_criteria()?;
        self.criteria.dynamic_criteria.insert(c.name.clone(), c);
        Ok(self)
    }

    pub fn with_auto_mitigation(mut self) -> Self {
        self.properties.auto_mitigate = Some(true);
        self
    }

    pub fn without_auto_mitigation(mut self) -> Self {
        self.properties.auto_mitigate = Some(false);
        self
    }

    pub(crate) fn to_inner(&self) -> AzureResult<MetricAlertInner> {
        if self.properties.scopes.is_empty() {
            return Err(AzureError::required("targetResource"));
        }
        if self.properties.window_size.is_empty() {
            return Err(AzureError::required("windowSize"));
        }
        if self.properties.evaluation_frequency.is_empty() {
            return Err(AzureError::required("evaluationFrequency"));
        }
        if !(0..=4).contains(&self.properties.severity) {
            return Err(AzureError::validation("Severity must be between 0 and 4"));
        }
        let mut properties = self.properties.clone();
        properties.criteria = Some(self.criteria.build(self.multiple_targets)?);
        Ok(MetricAlertInner {
            location: Some(GLOBAL_LOCATION.into()),
            tags: self.spec.tags.clone(),
            properties,
            ..Default::default()
        })
    }
}

#[async_trait]
impl Creatable for MetricAlertDefinition {
    type Output = MetricAlert;

    async fn create(self) -> AzureResult<MetricAlert> {
        self.spec.validate_placement()?;
        let body = self.to_inner()?;
        self.spec.ensure_resource_group(&self.client).await?;

        let rg = self.spec.resource_group()?;
        let inner = create_or_update_metric_alert(&self.client, rg, &self.spec.name, &body).await?;
        info!("Created metric alert {}/{}", rg, self.spec.name);
        Ok(MetricAlert::new(inner, self.client))
    }
}

// ─── Update ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MetricAlertUpdate {
    inner: MetricAlertInner,
    criteria: CriteriaSet,
    client: Arc<AzureClient>,
}

impl MetricAlertUpdate {
    pub fn with_rule_enabled(mut self) -> Self {
        self.inner.properties.enabled = true;
        self
    }

    pub fn with_rule_disabled(mut self) -> Self {
        self.inner.properties.enabled = false;
        self
    }

    pub fn with_period(mut self, window: Duration) -> Self {
        self.inner.properties.window_size = format_duration(window);
        self
    }

    pub fn with_frequency(mut self, frequency: Duration) -> Self {
        self.inner.properties.evaluation_frequency = format_duration(frequency);
        self
    }

    pub fn with_alert_details(mut self, severity: i32, description: impl Into<String>) -> Self {
        self.inner.properties.severity = severity;
        self.inner.properties.description = Some(description.into());
        self
    }

    pub fn with_action_groups(mut self, action_group_ids: Vec<String>) -> Self {
        set_action_groups(&mut self.inner.properties, action_group_ids);
        self
    }

    pub fn without_action_group(mut self, action_group_id: &str) -> Self {
        self.inner
            .properties
            .actions
            .retain(|a| !a.action_group_id.eq_ignore_ascii_case(action_group_id));
        self
    }

    /// Adds the criterion, replacing one with the same name.
    pub fn with_alert_criteria(mut self, criterion: StaticCriterion) -> Self {
        self.criteria.remove(&criterion.name);
        self.criteria.static_criteria.insert(criterion.name.clone(), criterion.to_criteria());
        self
    }

    pub fn with_dynamic_alert_criteria(mut self, criterion: DynamicCriterion) -> AzureResult<Self> {
        let c = criterion.to_criteria()?;
        self.criteria.remove(&c.name);
        self.criteria.dynamic_criteria.insert(c.name.clone(), c);
        Ok(self)
    }

    pub fn without_alert_criteria(mut self, name: &str) -> Self {
        self.criteria.remove(name);
        self
    }

    pub fn with_auto_mitigation(mut self, enabled: bool) -> Self {
        self.inner.properties.auto_mitigate = Some(enabled);
        self
    }
}

impl TaggableUpdate for MetricAlertUpdate {
    fn tags_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.inner.tags
    }
}

#[async_trait]
impl Appliable for MetricAlertUpdate {
    type Output = MetricAlert;

    async fn apply(mut self) -> AzureResult<MetricAlert> {
        let multiple = self.inner.properties.scopes.len() > 1
            || self.inner.properties.target_resource_type.is_some();
        self.inner.properties.criteria = Some(self.criteria.build(multiple)?);
        let rg = azfluent_core::resource_id::resource_group_from_id(self.inner.id.as_deref().unwrap_or_default())
            .ok_or_else(AzureError::resource_group_required)?;
        let name = self.inner.name.clone().unwrap_or_default();
        let inner = create_or_update_metric_alert(&self.client, &rg, &name, &self.inner).await?;
        info!("Updated metric alert {}/{}", rg, name);
        Ok(MetricAlert::new(inner, self.client))
    }
}

// ─── Collection ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MetricAlerts {
    client: Arc<AzureClient>,
}

impl MetricAlerts {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    fn wrap(&self, inner: MetricAlertInner) -> MetricAlert {
        MetricAlert::new(inner, self.client.clone())
    }

    pub fn define(&self, name: impl Into<String>) -> MetricAlertDefinition {
        MetricAlertDefinition {
            spec: GroupableSpec::new(name),
            properties: MetricAlertProperties {
                severity: 3,
                enabled: true,
                auto_mitigate: Some(true),
                ..Default::default()
            },
            multiple_targets: false,
            criteria: CriteriaSet::default(),
            client: self.client.clone(),
        }
    }
}

#[async_trait]
impl SupportsListing for MetricAlerts {
    type Item = MetricAlert;

    async fn list(&self) -> AzureResult<Vec<MetricAlert>> {
        Ok(list_metric_alerts(&self.client)
            .await?
            .into_iter()
            .map(|inner| self.wrap(inner))
            .collect())
    }
}

#[async_trait]
impl SupportsListingByResourceGroup for MetricAlerts {
    type Item = MetricAlert;

    async fn list_by_resource_group(&self, resource_group: &str) -> AzureResult<Vec<MetricAlert>> {
        Ok(list_metric_alerts_by_resource_group(&self.client, resource_group)
            .await?
            .into_iter()
            .map(|inner| self.wrap(inner))
            .collect())
    }
}

#[async_trait]
impl SupportsGettingByResourceGroup for MetricAlerts {
    type Item = MetricAlert;

    async fn get_by_resource_group(&self, resource_group: &str, name: &str) -> AzureResult<MetricAlert> {
        Ok(self.wrap(get_metric_alert(&self.client, resource_group, name).await?))
    }
}

#[async_trait]
impl SupportsDeletingByResourceGroup for MetricAlerts {
    async fn delete_by_resource_group(&self, resource_group: &str, name: &str) -> AzureResult<()> {
        delete_metric_alert(&self.client, resource_group, name).await?;
        info!("Deleted metric alert {}/{}", resource_group, name);
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
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ALERT_PATH: &str = "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Insights/metricAlerts/high-cpu";
    const VM_ID: &str = "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Compute/virtualMachines/vm1";

    fn alert_json() -> serde_json::Value {
        json!({
            "id": ALERT_PATH, "name": "high-cpu", "location": "global",
            "properties": {
                "severity": 3, "enabled": true,
                "scopes": [VM_ID],
                "evaluationFrequency": "PT1M", "windowSize": "PT5M",
                "autoMitigate": true,
                "criteria": {
                    "odata.type": criteria_odata_type::SINGLE_RESOURCE,
                    "allOf": [{
                        "criterionType": "StaticThresholdCriterion", "name": "cpu",
                        "metricName": "Percentage CPU", "timeAggregation": "Average",
                        "operator": "GreaterThan", "threshold": 80.0
                    }]
                },
                "actions": [{"actionGroupId": "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Insights/actionGroups/AG1"}]
            }
        })
    }

    fn cpu_criterion() -> StaticCriterion {
        StaticCriterion::new("cpu", "Percentage CPU").with_condition(
            MetricAlertRuleTimeAggregation::Average,
            MetricAlertRuleCondition::GreaterThan,
            80.0,
        )
    }

    #[test]
    fn criteria_validation() {
        let empty = CriteriaSet::default();
        assert_eq!(empty.build(false).unwrap_err().message, "Condition cannot be empty");

        let mut mixed = CriteriaSet::default();
        mixed.static_criteria.insert("a".into(), cpu_criterion().to_criteria());
        mixed.dynamic_criteria.insert(
            "b".into(),
            DynamicCriterion::new("b", "Percentage CPU").to_criteria().unwrap(),
        );
        assert!(mixed.build(false).unwrap_err().message.contains("cannot co-exist"));
    }

    #[test]
    fn odata_type_follows_targets_and_kind() {
        let mut set = CriteriaSet::default();
        set.static_criteria.insert("cpu".into(), cpu_criterion().to_criteria());
        assert_eq!(set.build(false).unwrap().odata_type, criteria_odata_type::SINGLE_RESOURCE);
        assert_eq!(set.build(true).unwrap().odata_type, criteria_odata_type::MULTIPLE_RESOURCE);

        let mut dynamic = CriteriaSet::default();
        dynamic.dynamic_criteria.insert(
            "d".into(),
            DynamicCriterion::new("d", "Percentage CPU").to_criteria().unwrap(),
        );
        assert_eq!(dynamic.build(false).unwrap().odata_type, criteria_odata_type::MULTIPLE_RESOURCE);
    }

    #[test]
    fn dynamic_failing_periods_are_checked() {
        let err = DynamicCriterion::new("d", "Percentage CPU")
            .with_failing_periods(2, 3)
            .to_criteria()
            .unwrap_err();
        assert_eq!(err.kind, AzureErrorKind::Validation);
    }

    #[tokio::test]
    async fn empty_multiple_targets_rejected() {
        let server = MockServer::start().await;
        let err = MetricAlerts::new(mock_client(&server))
            .define("multi")
            .with_multiple_target_resources(vec![], "Microsoft.Compute/virtualMachines", "westus")
            .unwrap_err();
        assert_eq!(err.message, "Target resource cannot be empty");
    }

    #[tokio::test]
    async fn create_static_alert() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(ALERT_PATH))
            .and(body_partial_json(json!({
                "location": "global",
                "properties": {
                    "severity": 2,
                    "description": "CPU above 80%",
                    "scopes": [VM_ID],
                    "evaluationFrequency": "PT1M",
                    "windowSize": "PT5M",
                    "criteria": {
                        "odata.type": criteria_odata_type::SINGLE_RESOURCE,
                        "allOf": [{"name": "cpu", "operator": "GreaterThan", "threshold": 80.0}]
                    }
                }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(alert_json()))
            .expect(1)
            .mount(&server)
            .await;

        let alert = MetricAlerts::new(mock_client(&server))
            .define("high-cpu")
            .with_existing_resource_group("rg1")
            .with_target_resource(VM_ID)
            .with_period(Duration::minutes(5))
            .with_frequency(Duration::minutes(1))
            .with_alert_details(2, "CPU above 80%")
            .with_alert_criteria(cpu_criterion())
            .create()
            .await
            .unwrap();
        assert_eq!(alert.window_size(), Some(Duration::minutes(5)));
        assert_eq!(alert.criteria().len(), 1);
    }

    #[tokio::test]
    async fn create_without_criteria_sends_nothing() {
        let server = MockServer::start().await;
        let err = MetricAlerts::new(mock_client(&server))
            .define("high-cpu")
            .with_existing_resource_group("rg1")
            .with_target_resource(VM_ID)
            .with_period(Duration::minutes(5))
            .with_frequency(Duration::minutes(1))
            .create()
            .await
            .unwrap_err();
        assert_eq!(err.message, "Condition cannot be empty");
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_disables_and_drops_action_group() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ALERT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(alert_json()))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(ALERT_PATH))
            .and(body_partial_json(json!({
                "properties": {
                    "enabled": false,
                    "actions": [],
                    "criteria": {"allOf": [{"name": "cpu", "threshold": 90.0}]}
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(alert_json()))
            .expect(1)
            .mount(&server)
            .await;

        let alerts = MetricAlerts::new(mock_client(&server));
        let alert = alerts.get_by_resource_group("rg1", "high-cpu").await.unwrap();
        alert
            .update()
            .with_rule_disabled()
            .without_action_group("/subscriptions/sub1/resourceGroups/rg1/providers/microsoft.insights/actiongroups/ag1")
            .with_alert_criteria(cpu_criterion().with_condition(
                MetricAlertRuleTimeAggregation::Average,
                MetricAlertRuleCondition::GreaterThan,
                90.0,
            ))
            .apply()
            .await
            .unwrap();
    }
}
