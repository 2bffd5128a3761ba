//! Action groups: named sets of notification receivers used by alerts.
//!
//! Receivers are grouped under a caller-chosen prefix. Every receiver of
//! a prefix is named `{prefix}_-{Kind}Action-`, so one prefix carries at
//! most one receiver of each kind and can be rebuilt or removed as a unit.

use std::collections::HashMap;
use std::sync::Arc;

use azfluent_core::fluent::{
    Appliable, Creatable, GroupableDefinition, GroupableResource, GroupableSpec, Refreshable,
    Resource, SupportsDeletingByResourceGroup, SupportsGettingByResourceGroup, SupportsListing,
    SupportsListingByResourceGroup, TaggableUpdate,
};
use azfluent_core::types::{require, AzureError, AzureResult};
use azfluent_core::{async_trait, impl_groupable_resource, AzureClient};
use log::{debug, info};
use serde_json::json;

use crate::types::{
    ActionGroupInner, ActionGroupProperties, AutomationRunbookReceiver, AzureAppPushReceiver,
    AzureFunctionReceiver, EmailReceiver, ItsmReceiver, LogicAppReceiver, SmsReceiver,
    VoiceReceiver, WebhookReceiver, GLOBAL_LOCATION,
};

pub const MAX_SHORT_NAME_LEN: usize = 12;

const EMAIL_SUFFIX: &str = "_-EmailAction-";
const SMS_SUFFIX: &str = "_-SMSAction-";
const VOICE_SUFFIX: &str = "_-VoiceAction-";
const WEBHOOK_SUFFIX: &str = "_-WebhookAction-";
const APP_PUSH_SUFFIX: &str = "_-AzureAppAction-";
const ITSM_SUFFIX: &str = "_-ITSMAction-";
const RUNBOOK_SUFFIX: &str = "_-AutomationRunbookAction-";
const LOGIC_APP_SUFFIX: &str = "_-LogicAppAction-";
const FUNCTION_SUFFIX: &str = "_-AzureFunctionAction-";

fn receiver_name(prefix: &str, suffix: &str) -> String {
    format!("{prefix}{suffix}")
}

// ─── REST operations ────────────────────────────────────────────────

fn group_url(client: &AzureClient, resource_group: &str, name: &str, suffix: &str) -> AzureResult<String> {
    require("resourceGroupName", resource_group)?;
    require("actionGroupName", name)?;
    client.resource_group_url(
        resource_group,
        &format!(
            "/providers/Microsoft.Insights/actionGroups/{}{}?api-version={}",
            name,
            suffix,
            client.config().api_version_action_groups
        ),
    )
}

pub async fn list_action_groups(client: &AzureClient) -> AzureResult<Vec<ActionGroupInner>> {
    let url = client.subscription_url(&format!(
        "/providers/Microsoft.Insights/actionGroups?api-version={}",
        client.config().api_version_action_groups
    ))?;
    debug!("list_action_groups → {}", url);
    client.get_all_pages(&url).await
}

pub async fn list_action_groups_by_resource_group(
    client: &AzureClient,
    resource_group: &str,
) -> AzureResult<Vec<ActionGroupInner>> {
    let url = client.resource_group_url(
        resource_group,
        &format!(
            "/providers/Microsoft.Insights/actionGroups?api-version={}",
            client.config().api_version_action_groups
        ),
    )?;
    debug!("list_action_groups_by_resource_group({}) → {}", resource_group, url);
    client.get_all_pages(&url).await
}

pub async fn get_action_group(client: &AzureClient, resource_group: &str, name: &str) -> AzureResult<ActionGroupInner> {
    let url = group_url(client, resource_group, name, "")?;
    debug!("get_action_group({}/{}) → {}", resource_group, name, url);
    client.get_json(&url).await
}

pub async fn create_or_update_action_group(
    client: &AzureClient,
    resource_group: &str,
    name: &str,
    group: &ActionGroupInner,
) -> AzureResult<ActionGroupInner> {
    let url = group_url(client, resource_group, name, "")?;
    debug!("create_or_update_action_group({}/{}) → {}", resource_group, name, url);
    client.put_json(&url, group).await
}

pub async fn delete_action_group(client: &AzureClient, resource_group: &str, name: &str) -> AzureResult<()> {
    let url = group_url(client, resource_group, name, "")?;
    debug!("delete_action_group({}/{}) → {}", resource_group, name, url);
    client.delete(&url).await
}

/// Re-enables an email or SMS receiver that opted out.
pub async fn enable_receiver(
    client: &AzureClient,
    resource_group: &str,
    name: &str,
    receiver_name: &str,
) -> AzureResult<()> {
    require("receiverName", receiver_name)?;
    let url = group_url(client, resource_group, name, "/subscribe")?;
    debug!("enable_receiver({}/{}, {}) → {}", resource_group, name, receiver_name, url);
    let _: serde_json::Value = client.post_json(&url, &json!({ "receiverName": receiver_name })).await?;
    Ok(())
}

// ─── Receivers ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItsmSettings {
    pub workspace_id: String,
    pub connection_id: String,
    pub ticket_configuration: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunbookSettings {
    pub automation_account_id: String,
    pub runbook_name: String,
    pub webhook_resource_id: String,
    pub is_global_runbook: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSettings {
    pub function_app_resource_id: String,
    pub function_name: String,
    pub http_trigger_url: String,
}

/// Every action attached to one receiver prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionReceiver {
    prefix: String,
    pub email: Option<String>,
    /// `(country code, phone number)`
    pub sms: Option<(String, String)>,
    pub voice: Option<(String, String)>,
    pub webhook: Option<String>,
    pub app_push_email: Option<String>,
    pub itsm: Option<ItsmSettings>,
    pub runbook: Option<RunbookSettings>,
    /// `(logic app resource id, callback url)`
    pub logic_app: Option<(String, String)>,
    pub function: Option<FunctionSettings>,
}

impl ActionReceiver {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn with_email(mut self, address: impl Into<String>) -> Self {
        self.email = Some(address.into());
        self
    }

    pub fn without_email(mut self) -> Self {
        self.email = None;
        self
    }

    pub fn with_sms(mut self, country_code: impl Into<String>, phone_number: impl Into<String>) -> Self {
        self.sms = Some((country_code.into(), phone_number.into()));
        self
    }

    pub fn without_sms(mut self) -> Self {
        self.sms = None;
        self
    }

    pub fn with_voice(mut self, country_code: impl Into<String>, phone_number: impl Into<String>) -> Self {
        self.voice = Some((country_code.into(), phone_number.into()));
        self
    }

    pub fn without_voice(mut self) -> Self {
        self.voice = None;
        self
    }

    pub fn with_webhook(mut self, service_uri: impl Into<String>) -> Self {
        self.webhook = Some(service_uri.into());
        self
    }

    pub fn without_webhook(mut self) -> Self {
        self.webhook = None;
        self
    }

    pub fn with_push_notification(mut self, email_address: impl Into<String>) -> Self {
        self.app_push_email = Some(email_address.into());
        self
    }

    pub fn without_push_notification(mut self) -> Self {
        self.app_push_email = None;
        self
    }

    pub fn with_itsm(mut self, settings: ItsmSettings) -> Self {
        self.itsm = Some(settings);
        self
    }

    pub fn without_itsm(mut self) -> Self {
        self.itsm = None;
        self
    }

    pub fn with_automation_runbook(mut self, settings: RunbookSettings) -> Self {
        self.runbook = Some(settings);
        self
    }

    pub fn without_automation_runbook(mut self) -> Self {
        self.runbook = None;
        self
    }

    pub fn with_logic_app(mut self, resource_id: impl Into<String>, callback_url: impl Into<String>) -> Self {
        self.logic_app = Some((resource_id.into(), callback_url.into()));
        self
    }

    pub fn without_logic_app(mut self) -> Self {
        self.logic_app = None;
        self
    }

    pub fn with_azure_function(mut self, settings: FunctionSettings) -> Self {
        self.function = Some(settings);
        self
    }

    pub fn without_azure_function(mut self) -> Self {
        self.function = None;
        self
    }

    fn is_empty(&self) -> bool {
        *self == Self::new(self.prefix.clone())
    }

    /// Adds this receiver's actions to `props`.
    fn write_into(&self, props: &mut ActionGroupProperties) {
        let p = &self.prefix;
        if let Some(address) = &self.email {
            props.email_receivers.push(EmailReceiver {
                name: receiver_name(p, EMAIL_SUFFIX),
                email_address: address.clone(),
                use_common_alert_schema: None,
                status: None,
            });
        }
        if let Some((cc, phone)) = &self.sms {
            props.sms_receivers.push(SmsReceiver {
                name: receiver_name(p, SMS_SUFFIX),
                country_code: cc.clone(),
                phone_number: phone.clone(),
                status: None,
            });
        }
        if let Some((cc, phone)) = &self.voice {
            props.voice_receivers.push(VoiceReceiver {
                name: receiver_name(p, VOICE_SUFFIX),
                country_code: cc.clone(),
                phone_number: phone.clone(),
            });
        }
        if let Some(uri) = &self.webhook {
            props.webhook_receivers.push(WebhookReceiver {
                name: receiver_name(p, WEBHOOK_SUFFIX),
                service_uri: uri.clone(),
                use_common_alert_schema: None,
            });
        }
        if let Some(address) = &self.app_push_email {
            props.azure_app_push_receivers.push(AzureAppPushReceiver {
                name: receiver_name(p, APP_PUSH_SUFFIX),
                email_address: address.clone(),
            });
        }
        if let Some(itsm) = &self.itsm {
            props.itsm_receivers.push(ItsmReceiver {
                name: receiver_name(p, ITSM_SUFFIX),
                workspace_id: itsm.workspace_id.clone(),
                connection_id: itsm.connection_id.clone(),
                ticket_configuration: itsm.ticket_configuration.clone(),
                region: itsm.region.clone(),
            });
        }
        if let Some(rb) = &self.runbook {
            props.automation_runbook_receivers.push(AutomationRunbookReceiver {
                name: receiver_name(p, RUNBOOK_SUFFIX),
                automation_account_id: rb.automation_account_id.clone(),
                runbook_name: rb.runbook_name.clone(),
                webhook_resource_id: rb.webhook_resource_id.clone(),
                is_global_runbook: rb.is_global_runbook,
                service_uri: None,
            });
        }
        if let Some((resource_id, callback)) = &self.logic_app {
            props.logic_app_receivers.push(LogicAppReceiver {
                name: receiver_name(p, LOGIC_APP_SUFFIX),
                resource_id: resource_id.clone(),
                callback_url: callback.clone(),
            });
        }
        if let Some(f) = &self.function {
            props.azure_function_receivers.push(AzureFunctionReceiver {
                name: receiver_name(p, FUNCTION_SUFFIX),
                function_app_resource_id: f.function_app_resource_id.clone(),
                function_name: f.function_name.clone(),
                http_trigger_url: f.http_trigger_url.clone(),
            });
        }
    }

    /// Rebuilds the receiver of `prefix` from an existing group.
    fn read_from(prefix: &str, props: &ActionGroupProperties) -> Self {
        let name_of = |suffix: &str| receiver_name(prefix, suffix);
        let mut r = Self::new(prefix);
        r.email = props
            .email_receivers
            .iter()
            .find(|e| e.name == name_of(EMAIL_SUFFIX))
            .map(|e| e.email_address.clone());
        r.sms = props
            .sms_receivers
            .iter()
            .find(|e| e.name == name_of(SMS_SUFFIX))
            .map(|e| (e.country_code.clone(), e.phone_number.clone()));
        r.voice = props
            .voice_receivers
            .iter()
            .find(|e| e.name == name_of(VOICE_SUFFIX))
            .map(|e| (e.country_code.clone(), e.phone_number.clone()));
        r.webhook = props
            .webhook_receivers
            .iter()
            .find(|e| e.name == name_of(WEBHOOK_SUFFIX))
            .map(|e| e.service_uri.clone());
        r.app_push_email = props
            .azure_app_push_receivers
            .iter()
            .find(|e| e.name == name_of(APP_PUSH_SUFFIX))
            .map(|e| e.email_address.clone());
        r.itsm = props
            .itsm_receivers
            .iter()
            .find(|e| e.name == name_of(ITSM_SUFFIX))
            .map(|e| ItsmSettings {
                workspace_id: e.workspace_id.clone(),
                connection_id: e.connection_id.clone(),
                ticket_configuration: e.ticket_configuration.clone(),
                region: e.region.clone(),
            });
        r.runbook = props
            .automation_runbook_receivers
            .iter()
            .find(|e| e.name == name_of(RUNBOOK_SUFFIX))
            .map(|e| RunbookSettings {
                automation_account_id: e.automation_account_id.clone(),
                runbook_name: e.runbook_name.clone(),
                webhook_resource_id: e.webhook_resource_id.clone(),
                is_global_runbook: e.is_global_runbook,
            });
        r.logic_app = props
            .logic_app_receivers
            .iter()
            .find(|e| e.name == name_of(LOGIC_APP_SUFFIX))
            .map(|e| (e.resource_id.clone(), e.callback_url.clone()));
        r.function = props
            .azure_function_receivers
            .iter()
            .find(|e| e.name == name_of(FUNCTION_SUFFIX))
            .map(|e| FunctionSettings {
                function_app_resource_id: e.function_app_resource_id.clone(),
                function_name: e.function_name.clone(),
                http_trigger_url: e.http_trigger_url.clone(),
            });
        r
    }
}

/// Drops every receiver named under `prefix`.
fn remove_prefix(props: &mut ActionGroupProperties, prefix: &str) {
    let marker = format!("{prefix}_-");
    let keep = |name: &str| !name.starts_with(&marker);
    props.email_receivers.retain(|r| keep(&r.name));
    props.sms_receivers.retain(|r| keep(&r.name));
    props.voice_receivers.retain(|r| keep(&r.name));
    props.webhook_receivers.retain(|r| keep(&r.name));
    props.azure_app_push_receivers.retain(|r| keep(&r.name));
    props.itsm_receivers.retain(|r| keep(&r.name));
    props.automation_runbook_receivers.retain(|r| keep(&r.name));
    props.logic_app_receivers.retain(|r| keep(&r.name));
    props.azure_function_receivers.retain(|r| keep(&r.name));
}

fn receiver_count(props: &ActionGroupProperties) -> usize {
    props.email_receivers.len()
        + props.sms_receivers.len()
        + props.voice_receivers.len()
        + props.webhook_receivers.len()
        + props.azure_app_push_receivers.len()
        + props.itsm_receivers.len()
        + props.automation_runbook_receivers.len()
        + props.logic_app_receivers.len()
        + props.azure_function_receivers.len()
}

fn validate_short_name(short_name: &str) -> AzureResult<()> {
    if short_name.chars().count() > MAX_SHORT_NAME_LEN {
        return Err(AzureError::validation(format!(
            "Action group short name '{short_name}' exceeds {MAX_SHORT_NAME_LEN} characters"
        )));
    }
    Ok(())
}

// ─── Fluent wrapper ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ActionGroup {
    inner: ActionGroupInner,
    client: Arc<AzureClient>,
}

impl_groupable_resource!(ActionGroup, ActionGroupInner);

impl ActionGroup {
    pub(crate) fn new(inner: ActionGroupInner, client: Arc<AzureClient>) -> Self {
        Self { inner, client }
    }

    pub fn short_name(&self) -> &str {
        &self.inner.properties.group_short_name
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.properties.enabled
    }

    pub fn email_receivers(&self) -> &[EmailReceiver] {
        &self.inner.properties.email_receivers
    }

    pub fn sms_receivers(&self) -> &[SmsReceiver] {
        &self.inner.properties.sms_receivers
    }

    pub fn voice_receivers(&self) -> &[VoiceReceiver] {
        &self.inner.properties.voice_receivers
    }

    pub fn webhook_receivers(&self) -> &[WebhookReceiver] {
        &self.inner.properties.webhook_receivers
    }

    pub fn push_notification_receivers(&self) -> &[AzureAppPushReceiver] {
        &self.inner.properties.azure_app_push_receivers
    }

    pub fn itsm_receivers(&self) -> &[ItsmReceiver] {
        &self.inner.properties.itsm_receivers
    }

    pub fn automation_runbook_receivers(&self) -> &[AutomationRunbookReceiver] {
        &self.inner.properties.automation_runbook_receivers
    }

    pub fn logic_app_receivers(&self) -> &[LogicAppReceiver] {
        &self.inner.properties.logic_app_receivers
    }

    pub fn azure_function_receivers(&self) -> &[AzureFunctionReceiver] {
        &self.inner.properties.azure_function_receivers
    }

    /// Current actions of one prefix, ready to be edited and passed back
    /// through [`ActionGroupUpdate::with_receiver`].
    pub fn receiver(&self, prefix: &str) -> ActionReceiver {
        ActionReceiver::read_from(prefix, &self.inner.properties)
    }

    pub async fn enable_receiver(&self, receiver_name: &str) -> AzureResult<()> {
        enable_receiver(&self.client, &self.resource_group_name(), self.name(), receiver_name).await
    }

    pub fn update(&self) -> ActionGroupUpdate {
        ActionGroupUpdate {
            inner: self.inner.clone(),
            client: self.client.clone(),
        }
    }
}

#[async_trait]
impl Refreshable for ActionGroup {
    async fn refresh(&mut self) -> AzureResult<()> {
        let rg = self.resource_group_name();
        let name = self.name().to_string();
        self.inner = get_action_group(&self.client, &rg, &name).await?;
        Ok(())
    }
}

// ─── Definition ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ActionGroupDefinition {
    spec: GroupableSpec,
    short_name: Option<String>,
    receivers: Vec<ActionReceiver>,
    client: Arc<AzureClient>,
}

impl GroupableDefinition for ActionGroupDefinition {
    fn spec_mut(&mut self) -> &mut GroupableSpec {
        &mut self.spec
    }
}

impl ActionGroupDefinition {
    pub fn with_short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = Some(short_name.into());
        self
    }

    /// Adds the actions of one prefix, replacing an earlier one with the
    /// same prefix.
    pub fn with_receiver(mut self, receiver: ActionReceiver) -> Self {
        self.receivers.retain(|r| r.prefix != receiver.prefix);
        self.receivers.push(receiver);
        self
    }

    /// Explicit short name, else the first 12 characters of the name.
    pub fn short_name(&self) -> String {
        match &self.short_name {
            Some(s) => s.clone(),
            None => self.spec.name.chars().take(MAX_SHORT_NAME_LEN).collect(),
        }
    }

    pub(crate) fn to_inner(&self) -> ActionGroupInner {
        let mut properties = ActionGroupProperties {
            group_short_name: self.short_name(),
            enabled: true,
            ..Default::default()
        };
        for receiver in &self.receivers {
            receiver.write_into(&mut properties);
        }
        ActionGroupInner {
            location: Some(GLOBAL_LOCATION.into()),
            tags: self.spec.tags.clone(),
            properties,
            ..Default::default()
        }
    }
}

#[async_trait]
impl Creatable for ActionGroupDefinition {
    type Output = ActionGroup;

    async fn create(self) -> AzureResult<ActionGroup> {
        self.spec.validate_placement()?;
        validate_short_name(&self.short_name())?;
        if self.receivers.iter().any(|r| r.prefix.trim().is_empty()) {
            return Err(AzureError::required("receiverNamePrefix"));
        }
        if self.receivers.iter().all(ActionReceiver::is_empty) {
            return Err(AzureError::validation("An action group requires at least one receiver"));
        }
        self.spec.ensure_resource_group(&self.client).await?;

        let rg = self.spec.resource_group()?;
        let body = self.to_inner();
        let inner = create_or_update_action_group(&self.client, rg, &self.spec.name, &body).await?;
        info!("Created action group {}/{}", rg, self.spec.name);
        Ok(ActionGroup::new(inner, self.client))
    }
}

// ─── Update ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ActionGroupUpdate {
    inner: ActionGroupInner,
    client: Arc<AzureClient>,
}

impl ActionGroupUpdate {
    pub fn with_short_name(mut self, short_name: impl Into<String>) -> Self {
        self.inner.properties.group_short_name = short_name.into();
        self
    }

    /// Replaces every action of the receiver's prefix.
    pub fn with_receiver(mut self, receiver: ActionReceiver) -> Self {
        remove_prefix(&mut self.inner.properties, &receiver.prefix);
        receiver.write_into(&mut self.inner.properties);
        self
    }

    pub fn without_receiver(mut self, prefix: &str) -> Self {
        remove_prefix(&mut self.inner.properties, prefix);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.inner.properties.enabled = enabled;
        self
    }

    pub fn properties(&self) -> &ActionGroupProperties {
        &self.inner.properties
    }
}

impl TaggableUpdate for ActionGroupUpdate {
    fn tags_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.inner.tags
    }
}

#[async_trait]
impl Appliable for ActionGroupUpdate {
    type Output = ActionGroup;

    async fn apply(self) -> AzureResult<ActionGroup> {
        validate_short_name(&self.inner.properties.group_short_name)?;
        if receiver_count(&self.inner.properties) == 0 {
            return Err(AzureError::validation("An action group requires at least one receiver"));
        }
        let rg = self.resource_group_name();
        let name = self.inner.name.clone().unwrap_or_default();
        let inner = create_or_update_action_group(&self.client, &rg, &name, &self.inner).await?;
        info!("Updated action group {}/{}", rg, name);
        Ok(ActionGroup::new(inner, self.client))
    }
}

impl ActionGroupUpdate {
    fn resource_group_name(&self) -> String {
        self.inner
            .id
            .as_deref()
            .and_then(azfluent_core::resource_id::resource_group_from_id)
            .unwrap_or_default()
    }
}

// ─── Collection ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ActionGroups {
    client: Arc<AzureClient>,
}

impl ActionGroups {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    fn wrap(&self, inner: ActionGroupInner) -> ActionGroup {
        ActionGroup::new(inner, self.client.clone())
    }

    pub fn define(&self, name: impl Into<String>) -> ActionGroupDefinition {
        ActionGroupDefinition {
            spec: GroupableSpec::new(name),
            short_name: None,
            receivers: Vec::new(),
            client: self.client.clone(),
        }
    }

    pub async fn enable_receiver(&self, resource_group: &str, name: &str, receiver_name: &str) -> AzureResult<()> {
        enable_receiver(&self.client, resource_group, name, receiver_name).await?;
        info!("Enabled receiver {} of action group {}/{}", receiver_name, resource_group, name);
        Ok(())
    }
}

#[async_trait]
impl SupportsListing for ActionGroups {
    type Item = ActionGroup;

    async fn list(&self) -> AzureResult<Vec<ActionGroup>> {
        Ok(list_action_groups(&self.client)
            .await?
            .into_iter()
            .map(|inner| self.wrap(inner))
            .collect())
    }
}

#[async_trait]
impl SupportsListingByResourceGroup for ActionGroups {
    type Item = ActionGroup;

    async fn list_by_resource_group(&self, resource_group: &str) -> AzureResult<Vec<ActionGroup>> {
        Ok(list_action_groups_by_resource_group(&self.client, resource_group)
            .await?
            .into_iter()
            .map(|inner| self.wrap(inner))
            .collect())
    }
}

#[async_trait]
impl SupportsGettingByResourceGroup for ActionGroups {
    type Item = ActionGroup;

    async fn get_by_resource_group(&self, resource_group: &str, name: &str) -> AzureResult<ActionGroup> {
        Ok(self.wrap(get_action_group(&self.client, resource_group, name).await?))
    }
}

#[async_trait]
impl SupportsDeletingByResourceGroup for ActionGroups {
    async fn delete_by_resource_group(&self, resource_group: &str, name: &str) -> AzureResult<()> {
        delete_action_group(&self.client, resource_group, name).await?;
        info!("Deleted action group {}/{}", resource_group, name);
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
