//! Entry point of the monitor service family.

use std::sync::Arc;

use azfluent_core::AzureClient;

use crate::action_groups::ActionGroups;
use crate::activity_logs::ActivityLogs;
use crate::autoscale::AutoscaleSettings;
use crate::diagnostic_settings::DiagnosticSettings;
use crate::metric_alerts::MetricAlerts;
use crate::metrics::MetricDefinitions;

#[derive(Debug, Clone)]
pub struct MonitorManager {
    client: Arc<AzureClient>,
}

impl MonitorManager {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<AzureClient> {
        &self.client
    }

    pub fn action_groups(&self) -> ActionGroups {
        ActionGroups::new(self.client.clone())
    }

    pub fn metric_alerts(&self) -> MetricAlerts {
        MetricAlerts::new(self.client.clone())
    }

    pub fn autoscale_settings(&self) -> AutoscaleSettings {
        AutoscaleSettings::new(self.client.clone())
    }

    pub fn diagnostic_settings(&self) -> DiagnosticSettings {
        DiagnosticSettings::new(self.client.clone())
    }

    pub fn activity_logs(&self) -> ActivityLogs {
        ActivityLogs::new(self.client.clone())
    }

    pub fn metric_definitions(&self) -> MetricDefinitions {
        MetricDefinitions::new(self.client.clone())
    }
}
