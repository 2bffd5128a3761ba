//! Azure Monitor – metric definitions and metric queries.

use std::sync::Arc;

use azfluent_core::iso8601::format_duration;
use azfluent_core::types::{require, AzureError, AzureResult};
use azfluent_core::AzureClient;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use log::debug;

use crate::types::{MetricDefinitionInner, MetricsResponse};

/// `resultType` of a metric query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultType {
    Data,
    Metadata,
}

impl ResultType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Data => "Data",
            Self::Metadata => "Metadata",
        }
    }
}

// ─── REST operations ────────────────────────────────────────────────

/// List available metric definitions for a resource.
/// `resource_id` is the full ARM resource ID (e.g. `/subscriptions/.../resourceGroups/.../providers/...`).
pub async fn list_metric_definitions(client: &AzureClient, resource_id: &str) -> AzureResult<Vec<MetricDefinitionInner>> {
    require("resourceUri", resource_id)?;
    let url = client.arm_url(&format!(
        "{}/providers/microsoft.insights/metricDefinitions?api-version={}",
        resource_id.trim_end_matches('/'),
        client.config().api_version_metrics
    ));
    debug!("list_metric_definitions({}) → {}", resource_id, url);
    client.get_all_pages(&url).await
}

/// Query metrics for a resource. `query` holds the raw parameters, e.g.
/// `("metricnames", "Percentage CPU")`, `("timespan", "start/end")`,
/// `("interval", "PT5M")`, `("aggregation", "Average,Maximum")`.
pub async fn query_metrics(
    client: &AzureClient,
    resource_id: &str,
    query: &[(&str, &str)],
) -> AzureResult<MetricsResponse> {
    require("resourceUri", resource_id)?;
    let url = client.arm_url(&format!(
        "{}/providers/microsoft.insights/metrics?api-version={}",
        resource_id.trim_end_matches('/'),
        client.config().api_version_metrics
    ));
    let url = AzureClient::with_query(&url, query)?;
    debug!("query_metrics({}) → {}", resource_id, url);
    client.get_json(&url).await
}

// ─── Metric definition ──────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MetricDefinition {
    inner: MetricDefinitionInner,
    resource_id: String,
    client: Arc<AzureClient>,
}

impl MetricDefinition {
    pub fn id(&self) -> Option<&str> {
        self.inner.id.as_deref()
    }

    /// Metric name as used by queries and alert criteria.
    pub fn name(&self) -> &str {
        self.inner.name.as_ref().map(|n| n.value.as_str()).unwrap_or_default()
    }

    pub fn localized_name(&self) -> Option<&str> {
        self.inner.name.as_ref().and_then(|n| n.localized_value.as_deref())
    }

    pub fn namespace(&self) -> Option<&str> {
        self.inner.namespace.as_deref()
    }

    pub fn unit(&self) -> Option<&str> {
        self.inner.unit.as_deref()
    }

    pub fn primary_aggregation_type(&self) -> Option<&str> {
        self.inner.primary_aggregation_type.as_deref()
    }

    pub fn supported_aggregation_types(&self) -> &[String] {
        &self.inner.supported_aggregation_types
    }

    pub fn dimension_names(&self) -> Vec<&str> {
        self.inner.dimensions.iter().map(|d| d.value.as_str()).collect()
    }

    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    pub fn inner(&self) -> &MetricDefinitionInner {
        &self.inner
    }

    pub fn define_query(&self) -> MetricQuery {
        MetricQuery {
            resource_id: self.resource_id.clone(),
            metric_name: self.name().to_string(),
            namespace: self.inner.namespace.clone(),
            start: None,
            end: None,
            interval: None,
            aggregation: None,
            filter: None,
            top: None,
            order_by: None,
            result_type: None,
            client: self.client.clone(),
        }
    }
}

// ─── Query builder ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MetricQuery {
    resource_id: String,
    metric_name: String,
    namespace: Option<String>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    interval: Option<Duration>,
    aggregation: Option<String>,
    filter: Option<String>,
    top: Option<u32>,
    order_by: Option<String>,
    result_type: Option<ResultType>,
    client: Arc<AzureClient>,
}

impl MetricQuery {
    pub fn start_time(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end_time(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Comma-separated aggregations, e.g. `Average,Maximum`.
    pub fn with_aggregation(mut self, aggregation: impl Into<String>) -> Self {
        self.aggregation = Some(aggregation.into());
        self
    }

    /// OData filter over dimensions, e.g. `LUN eq '0'`.
    pub fn with_odata_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn select_top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    pub fn with_result_type(mut self, result_type: ResultType) -> Self {
        self.result_type = Some(result_type);
        self
    }

    /// Query parameters in the order they are sent.
    pub fn parameters(&self) -> AzureResult<Vec<(&'static str, String)>> {
        let start = self.start.ok_or_else(|| AzureError::required("startTime"))?;
        let end = self.end.ok_or_else(|| AzureError::required("endTime"))?;
        if end <= start {
            return Err(AzureError::validation("End time must be after start time"));
        }
        let mut params = vec![
            ("metricnames", self.metric_name.clone()),
            (
                "timespan",
                format!(
                    "{}/{}",
                    start.to_rfc3339_opts(SecondsFormat::Secs, true),
                    end.to_rfc3339_opts(SecondsFormat::Secs, true)
                ),
            ),
        ];
        if let Some(ns) = &self.namespace {
            params.push(("metricnamespace", ns.clone()));
        }
        if let Some(i) = self.interval {
            params.push(("interval", format_duration(i)));
        }
        if let Some(a) = &self.aggregation {
            params.push(("aggregation", a.clone()));
        }
        if let Some(f) = &self.filter {
            params.push(("$filter", f.clone()));
        }
        if let Some(t) = self.top {
            params.push(("top", t.to_string()));
        }
        if let Some(o) = &self.order_by {
            params.push(("orderby", o.clone()));
        }
        if let Some(r) = self.result_type {
            params.push(("resultType", r.as_str().to_string()));
        }
        Ok(params)
    }

    pub async fn execute(self) -> AzureResult<MetricsResponse> {
        let params = self.parameters()?;
        let query: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        query_metrics(&self.client, &self.resource_id, &query).await
    }
}

// ─── Collection ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MetricDefinitions {
    client: Arc<AzureClient>,
}

impl MetricDefinitions {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    pub async fn list_by_resource(&self, resource_id: &str) -> AzureResult<Vec<MetricDefinition>> {
        Ok(list_metric_definitions(&self.client, resource_id)
            .await?
            .into_iter()
            .map(|inner| MetricDefinition {
                resource_id: inner.resource_id.clone().unwrap_or_else(|| resource_id.to_string()),
                inner,
                client: self.client.clone(),
            })
            .collect())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use azfluent_core::test_utils::mock_client;
    use chrono::TimeZone;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VM_ID: &str = "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Compute/virtualMachines/vm1";

    async fn cpu_definition(server: &MockServer) -> MetricDefinition {
        Mock::given(method("GET"))
            .and(path(format!("{VM_ID}/providers/microsoft.insights/metricDefinitions")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{
                    "id": format!("{VM_ID}/providers/microsoft.insights/metricdefinitions/Percentage CPU"),
                    "resourceId": VM_ID,
                    "namespace": "Microsoft.Compute/virtualMachines",
                    "name": {"value": "Percentage CPU", "localizedValue": "Percentage CPU"},
                    "unit": "Percent",
                    "primaryAggregationType": "Average",
                    "supportedAggregationTypes": ["Average", "Maximum"]
                }]
            })))
            .mount(server)
            .await;
        let mut defs = MetricDefinitions::new(mock_client(server)).list_by_resource(VM_ID).await.unwrap();
        defs.remove(0)
    }

    #[tokio::test]
    async fn definitions_listed() {
        let server = MockServer::start().await;
        let def = cpu_definition(&server).await;
        assert_eq!(def.name(), "Percentage CPU");
        assert_eq!(def.unit(), Some("Percent"));
        assert_eq!(def.supported_aggregation_types().len(), 2);
    }

    #[tokio::test]
    async fn query_requires_ordered_range() {
        let server = MockServer::start().await;
        let def = cpu_definition(&server).await;
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(def.define_query().start_time(t).parameters().is_err());
        assert!(def.define_query().start_time(t).end_time(t).parameters().is_err());
    }

    #[tokio::test]
    async fn query_sends_parameters() {
        let server = MockServer::start().await;
        let def = cpu_definition(&server).await;
        Mock::given(method("GET"))
            .and(path(format!("{VM_ID}/providers/microsoft.insights/metrics")))
            .and(query_param("metricnames", "Percentage CPU"))
            .and(query_param("timespan", "2024-01-01T00:00:00Z/2024-01-01T06:00:00Z"))
            .and(query_param("interval", "PT5M"))
            .and(query_param("aggregation", "Average,Maximum"))
            .and(query_param("top", "3"))
            .and(query_param("resultType", "Data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "timespan": "2024-01-01T00:00:00Z/2024-01-01T06:00:00Z",
                "interval": "PT5M",
                "value": [{
                    "name": {"value": "Percentage CPU"},
                    "unit": "Percent",
                    "timeseries": [{"data": [{"timeStamp": "2024-01-01T00:00:00Z", "average": 4.5, "maximum": 9.0}]}]
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let result = def
            .define_query()
            .start_time(start)
            .end_time(start + Duration::hours(6))
            .with_interval(Duration::minutes(5))
            .with_aggregation("Average,Maximum")
            .select_top(3)
            .with_result_type(ResultType::Data)
            .execute()
            .await
            .unwrap();
        assert_eq!(result.interval.as_deref(), Some("PT5M"));
        assert_eq!(result.value[0].timeseries[0].data[0].maximum, Some(9.0));
    }
}
