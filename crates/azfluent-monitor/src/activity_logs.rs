//! Azure Monitor – activity log queries.

use std::collections::BTreeSet;
use std::sync::Arc;

use azfluent_core::types::{require, AzureError, AzureResult};
use azfluent_core::AzureClient;
use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;

use crate::types::{EventData, EventDataPropertyName, LocalizableString};

const EVENTS_PATH: &str = "/providers/microsoft.insights/eventtypes/management/values";
const TENANT_CHANNELS: &str = "eventChannels eq 'Admin, Operation'";

// ─── REST operations ────────────────────────────────────────────────

/// List activity-log events for the subscription.
///
/// - `filter`: OData filter, e.g. `"eventTimestamp ge '2024-01-01T00:00:00Z'"`.
/// - `select`: optional comma-separated fields.
pub async fn list_activity_log(client: &AzureClient, filter: &str, select: Option<&str>) -> AzureResult<Vec<EventData>> {
    let url = client.subscription_url(&format!(
        "{}?api-version={}",
        EVENTS_PATH,
        client.config().api_version_activity_log
    ))?;
    let url = with_filter(&url, filter, select)?;
    debug!("list_activity_log → {}", url);
    client.get_all_pages(&url).await
}

/// Same as [`list_activity_log`] across every subscription of the tenant.
pub async fn list_tenant_activity_log(
    client: &AzureClient,
    filter: &str,
    select: Option<&str>,
) -> AzureResult<Vec<EventData>> {
    let url = client.arm_url(&format!(
        "{}?api-version={}",
        EVENTS_PATH,
        client.config().api_version_activity_log
    ));
    let url = with_filter(&url, filter, select)?;
    debug!("list_tenant_activity_log → {}", url);
    client.get_all_pages(&url).await
}

/// Categories an activity-log event can carry (`Administrative`, `Security`, ...).
pub async fn list_event_categories(client: &AzureClient) -> AzureResult<Vec<LocalizableString>> {
    let url = client.arm_url(&format!(
        "/providers/microsoft.insights/eventcategories?api-version={}",
        client.config().api_version_activity_log
    ));
    debug!("list_event_categories → {}", url);
    client.get_all_pages(&url).await
}

fn with_filter(url: &str, filter: &str, select: Option<&str>) -> AzureResult<String> {
    match select {
        Some(s) if !s.is_empty() => AzureClient::with_query(url, &[("$filter", filter), ("$select", s)]),
        _ => AzureClient::with_query(url, &[("$filter", filter)]),
    }
}

// ─── Query builder ──────────────────────────────────────────────────

/// Narrowing applied on top of the time range; only one is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ScopeFilter {
    None,
    ResourceGroup(String),
    Resource(String),
    ResourceProvider(String),
    CorrelationId(String),
}

#[derive(Debug, Clone)]
pub struct ActivityLogQuery {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    select: BTreeSet<&'static str>,
    scope: ScopeFilter,
    tenant_level: bool,
    client: Arc<AzureClient>,
}

impl ActivityLogQuery {
    pub fn start_time(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end_time(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_response_properties(mut self, properties: &[EventDataPropertyName]) -> Self {
        self.select = properties.iter().map(|p| p.as_str()).collect();
        self
    }

    /// Clears any `$select` so the service returns every property.
    pub fn with_all_properties_in_response(mut self) -> Self {
        self.select.clear();
        self
    }

    pub fn filter_by_resource_group(mut self, resource_group: impl Into<String>) -> Self {
        self.scope = ScopeFilter::ResourceGroup(resource_group.into());
        self
    }

    pub fn filter_by_resource(mut self, resource_id: impl Into<String>) -> Self {
        self.scope = ScopeFilter::Resource(resource_id.into());
        self
    }

    pub fn filter_by_resource_provider(mut self, namespace: impl Into<String>) -> Self {
        self.scope = ScopeFilter::ResourceProvider(namespace.into());
        self
    }

    pub fn filter_by_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.scope = ScopeFilter::CorrelationId(correlation_id.into());
        self
    }

    pub fn filter_at_tenant_level(mut self) -> Self {
        self.tenant_level = true;
        self
    }

    /// OData `$filter` for the configured range and scope.
    pub fn filter(&self) -> AzureResult<String> {
        let start = self.start.ok_or_else(|| AzureError::required("startTime"))?;
        let end = self.end.ok_or_else(|| AzureError::required("endTime"))?;
        if end <= start {
            return Err(AzureError::validation("End time must be after start time"));
        }
        let mut filter = format!(
            "eventTimestamp ge '{}' and eventTimestamp le '{}'",
            start.to_rfc3339_opts(SecondsFormat::Secs, true),
            end.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        let scope = match &self.scope {
            ScopeFilter::None => None,
            ScopeFilter::ResourceGroup(rg) => Some(("resourceGroupName", rg)),
            ScopeFilter::Resource(id) => Some(("resourceUri", id)),
            ScopeFilter::ResourceProvider(ns) => Some(("resourceProvider", ns)),
            ScopeFilter::CorrelationId(id) => Some(("correlationId", id)),
        };
        if let Some((field, value)) = scope {
            require(field, value)?;
            filter.push_str(&format!(" and {field} eq '{value}'"));
        }
        if self.tenant_level {
            filter.push_str(" and ");
            filter.push_str(TENANT_CHANNELS);
        }
        Ok(filter)
    }

    /// Comma-joined `$select`, `None` when every property is wanted.
    pub fn select(&self) -> Option<String> {
        if self.select.is_empty() {
            None
        } else {
            Some(self.select.iter().copied().collect::<Vec<_>>().join(","))
        }
    }

    pub async fn execute(self) -> AzureResult<Vec<EventData>> {
        let filter = self.filter()?;
        let select = self.select();
        if self.tenant_level {
            list_tenant_activity_log(&self.client, &filter, select.as_deref()).await
        } else {
            list_activity_log(&self.client, &filter, select.as_deref()).await
        }
    }
}

// ─── Collection ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ActivityLogs {
    client: Arc<AzureClient>,
}

impl ActivityLogs {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    pub fn define_query(&self) -> ActivityLogQuery {
        ActivityLogQuery {
            start: None,
            end: None,
            select: BTreeSet::new(),
            scope: ScopeFilter::None,
            tenant_level: false,
            client: self.client.clone(),
        }
    }

    pub async fn list_event_categories(&self) -> AzureResult<Vec<LocalizableString>> {
        list_event_categories(&self.client).await
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
