//! Template deployments – define, validate, what-if, cancel, export, list
//! operations.

use std::sync::Arc;

use azfluent_core::fluent::{
    Appliable, Creatable, GroupableDefinition, GroupableSpec, Refreshable,
    SupportsDeletingByResourceGroup, SupportsGettingByResourceGroup,
    SupportsListingByResourceGroup,
};
use azfluent_core::types::{require, AzureError, AzureResult};
use azfluent_core::{async_trait, impl_groupable_resource, AzureClient};
use log::{debug, info};
use serde_json::{json, Value};

use crate::types::{
    DeploymentInner, DeploymentMode, DeploymentOperationInner, DeploymentProperties,
    DeploymentValidateResult, ExportTemplateResult, ParametersLink, TemplateLink,
    WhatIfOperationResult,
};

// ─── REST operations ────────────────────────────────────────────────

fn deployment_url(client: &AzureClient, rg: &str, name: &str, action: &str) -> AzureResult<String> {
    require("resourceGroupName", rg)?;
    require("deploymentName", name)?;
    client.resource_group_url(
        rg,
        &format!(
            "/providers/Microsoft.Resources/deployments/{}{}?api-version={}",
            name,
            action,
            client.config().api_version_resources
        ),
    )
}

pub async fn list_deployments(client: &AzureClient, rg: &str) -> AzureResult<Vec<DeploymentInner>> {
    let url = client.resource_group_url(
        rg,
        &format!(
            "/providers/Microsoft.Resources/deployments?api-version={}",
            client.config().api_version_resources
        ),
    )?;
    debug!("list_deployments({}) → {}", rg, url);
    client.get_all_pages(&url).await
}

pub async fn get_deployment(client: &AzureClient, rg: &str, name: &str) -> AzureResult<DeploymentInner> {
    let url = deployment_url(client, rg, name, "")?;
    debug!("get_deployment({}/{}) → {}", rg, name, url);
    client.get_json(&url).await
}

pub async fn check_existence(client: &AzureClient, rg: &str, name: &str) -> AzureResult<bool> {
    let url = deployment_url(client, rg, name, "")?;
    client.head_exists(&url).await
}

pub async fn create_or_update_deployment(
    client: &AzureClient,
    rg: &str,
    name: &str,
    properties: &DeploymentProperties,
) -> AzureResult<DeploymentInner> {
    let url = deployment_url(client, rg, name, "")?;
    debug!("create_or_update_deployment({}/{}) → {}", rg, name, url);
    client.put_json(&url, &json!({ "properties": properties })).await
}

pub async fn delete_deployment(client: &AzureClient, rg: &str, name: &str) -> AzureResult<()> {
    let url = deployment_url(client, rg, name, "")?;
    debug!("delete_deployment({}/{}) → {}", rg, name, url);
    client.delete(&url).await
}

pub async fn cancel_deployment(client: &AzureClient, rg: &str, name: &str) -> AzureResult<()> {
    let url = deployment_url(client, rg, name, "/cancel")?;
    debug!("cancel_deployment({}/{}) → {}", rg, name, url);
    client.post_action(&url).await
}

pub async fn export_deployment_template(
    client: &AzureClient,
    rg: &str,
    name: &str,
) -> AzureResult<ExportTemplateResult> {
    let url = deployment_url(client, rg, name, "/exportTemplate")?;
    debug!("export_deployment_template({}/{}) → {}", rg, name, url);
    client.post_for_json(&url).await
}

pub async fn validate_deployment(
    client: &AzureClient,
    rg: &str,
    name: &str,
    properties: &DeploymentProperties,
) -> AzureResult<DeploymentValidateResult> {
    let url = deployment_url(client, rg, name, "/validate")?;
    debug!("validate_deployment({}/{}) → {}", rg, name, url);
    client.post_json(&url, &json!({ "properties": properties })).await
}

pub async fn what_if_deployment(
    client: &AzureClient,
    rg: &str,
    name: &str,
    properties: &DeploymentProperties,
) -> AzureResult<WhatIfOperationResult> {
    let url = deployment_url(client, rg, name, "/whatIf")?;
    debug!("what_if_deployment({}/{}) → {}", rg, name, url);
    client.post_json(&url, &json!({ "properties": properties })).await
}

pub async fn list_deployment_operations(
    client: &AzureClient,
    rg: &str,
    name: &str,
) -> AzureResult<Vec<DeploymentOperationInner>> {
    let url = deployment_url(client, rg, name, "/operations")?;
    debug!("list_deployment_operations({}/{}) → {}", rg, name, url);
    client.get_all_pages(&url).await
}

// ─── Fluent wrapper ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Deployment {
    inner: DeploymentInner,
    client: Arc<AzureClient>,
}

impl_groupable_resource!(Deployment, DeploymentInner);

impl Deployment {
    pub(crate) fn new(inner: DeploymentInner, client: Arc<AzureClient>) -> Self {
        Self { inner, client }
    }

    fn rg_and_name(&self) -> (String, String) {
        use azfluent_core::fluent::GroupableResource;
        (
            self.resource_group_name(),
            self.inner.name.clone().unwrap_or_default(),
        )
    }

    pub fn provisioning_state(&self) -> Option<&str> {
        self.inner.properties.provisioning_state.as_deref()
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.inner.properties.correlation_id.as_deref()
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.inner.properties.timestamp.as_deref()
    }

    pub fn outputs(&self) -> Option<&Value> {
        self.inner.properties.outputs.as_ref()
    }

    pub fn mode(&self) -> Option<DeploymentMode> {
        self.inner.properties.mode
    }

    pub fn template(&self) -> Option<&Value> {
        self.inner.properties.template.as_ref()
    }

    pub fn template_link(&self) -> Option<&TemplateLink> {
        self.inner.properties.template_link.as_ref()
    }

    pub fn parameters(&self) -> Option<&Value> {
        self.inner.properties.parameters.as_ref()
    }

    pub fn parameters_link(&self) -> Option<&ParametersLink> {
        self.inner.properties.parameters_link.as_ref()
    }

    pub async fn cancel(&self) -> AzureResult<()> {
        let (rg, name) = self.rg_and_name();
        cancel_deployment(&self.client, &rg, &name).await
    }

    pub async fn export_template(&self) -> AzureResult<ExportTemplateResult> {
        let (rg, name) = self.rg_and_name();
        export_deployment_template(&self.client, &rg, &name).await
    }

    pub async fn operations(&self) -> AzureResult<Vec<DeploymentOperationInner>> {
        let (rg, name) = self.rg_and_name();
        list_deployment_operations(&self.client, &rg, &name).await
    }

    pub fn update(&self) -> DeploymentUpdate {
        let (resource_group, name) = self.rg_and_name();
        DeploymentUpdate {
            resource_group,
            name,
            properties: DeploymentProperties {
                template: self.inner.properties.template.clone(),
                template_link: self.inner.properties.template_link.clone(),
                parameters: self.inner.properties.parameters.clone(),
                parameters_link: self.inner.properties.parameters_link.clone(),
                mode: self.inner.properties.mode,
                ..Default::default()
            },
            client: self.client.clone(),
        }
    }
}

#[async_trait]
impl Refreshable for Deployment {
    async fn refresh(&mut self) -> AzureResult<()> {
        let (rg, name) = self.rg_and_name();
        self.inner = get_deployment(&self.client, &rg, &name).await?;
        Ok(())
    }
}

/// Setters shared by the definition and the update.
macro_rules! template_setters {
    () => {
        pub fn with_template(mut self, template: Value) -> Self {
            self.properties.template = Some(template);
            self.properties.template_link = None;
            self
        }

        pub fn with_template_link(mut self, uri: impl Into<String>, content_version: impl Into<String>) -> Self {
            self.properties.template_link = Some(TemplateLink {
                uri: uri.into(),
                content_version: Some(content_version.into()),
            });
            self.properties.template = None;
            self
        }

        pub fn with_parameters(mut self, parameters: Value) -> Self {
            self.properties.parameters = Some(parameters);
            self.properties.parameters_link = None;
            self
        }

        pub fn with_parameters_link(mut self, uri: impl Into<String>, content_version: impl Into<String>) -> Self {
            self.properties.parameters_link = Some(ParametersLink {
                uri: uri.into(),
                content_version: Some(content_version.into()),
            });
            self.properties.parameters = None;
            self
        }

        pub fn with_mode(mut self, mode: DeploymentMode) -> Self {
            self.properties.mode = Some(mode);
            self
        }
    };
}

fn check_template(properties: &DeploymentProperties) -> AzureResult<()> {
    if properties.template.is_none() && properties.template_link.is_none() {
        return Err(AzureError::required("template"));
    }
    if properties.parameters.is_none() && properties.parameters_link.is_none() {
        return Err(AzureError::required("parameters"));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct DeploymentDefinition {
    spec: GroupableSpec,
    properties: DeploymentProperties,
    client: Arc<AzureClient>,
}

impl GroupableDefinition for DeploymentDefinition {
    fn spec_mut(&mut self) -> &mut GroupableSpec {
        &mut self.spec
    }
}

impl DeploymentDefinition {
    template_setters!();

    pub fn properties(&self) -> &DeploymentProperties {
        &self.properties
    }

    fn checked(&self) -> AzureResult<DeploymentProperties> {
        self.spec.validate_placement()?;
        check_template(&self.properties)?;
        let mut properties = self.properties.clone();
        properties.mode.get_or_insert(DeploymentMode::Incremental);
        Ok(properties)
    }

    /// Server-side validation without deploying.
    pub async fn validate(&self) -> AzureResult<DeploymentValidateResult> {
        let properties = self.checked()?;
        validate_deployment(&self.client, self.spec.resource_group()?, &self.spec.name, &properties).await
    }

    /// Predicted changes without deploying.
    pub async fn what_if(&self) -> AzureResult<WhatIfOperationResult> {
        let properties = self.checked()?;
        what_if_deployment(&self.client, self.spec.resource_group()?, &self.spec.name, &properties).await
    }
}

#[async_trait]
impl Creatable for DeploymentDefinition {
    type Output = Deployment;

    async fn create(self) -> AzureResult<Deployment> {
        let properties = self.checked()?;
        self.spec.ensure_resource_group(&self.client).await?;
        let rg = self.spec.resource_group()?;
        let inner = create_or_update_deployment(&self.client, rg, &self.spec.name, &properties).await?;
        info!("Deployment {} finished in {}", self.spec.name, rg);
        Ok(Deployment::new(inner, self.client))
    }
}

#[derive(Debug, Clone)]
pub struct DeploymentUpdate {
    resource_group: String,
    name: String,
    properties: DeploymentProperties,
    client: Arc<AzureClient>,
}

impl DeploymentUpdate {
    template_setters!();
}

#[async_trait]
impl Appliable for DeploymentUpdate {
    type Output = Deployment;

    async fn apply(self) -> AzureResult<Deployment> {
        check_template(&self.properties)?;
        let inner =
            create_or_update_deployment(&self.client, &self.resource_group, &self.name, &self.properties)
                .await?;
        info!("Redeployed {} in {}", self.name, self.resource_group);
        Ok(Deployment::new(inner, self.client))
    }
}

// ─── Collection ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Deployments {
    client: Arc<AzureClient>,
}

impl Deployments {
    pub fn new(client: Arc<AzureClient>) -> Self {
        Self { client }
    }

    pub fn define(&self, name: impl Into<String>) -> DeploymentDefinition {
        DeploymentDefinition {
            spec: GroupableSpec::new(name),
            properties: DeploymentProperties::default(),
            client: self.client.clone(),
        }
    }

    pub async fn check_existence(&self, resource_group: &str, name: &str) -> AzureResult<bool> {
        check_existence(&self.client, resource_group, name).await
    }

    pub async fn cancel(&self, resource_group: &str, name: &str) -> AzureResult<()> {
        cancel_deployment(&self.client, resource_group, name).await
    }

    pub async fn export_template(&self, resource_group: &str, name: &str) -> AzureResult<ExportTemplateResult> {
        export_deployment_template(&self.client, resource_group, name).await
    }

    pub async fn list_operations(
        &self,
        resource_group: &str,
        name: &str,
    ) -> AzureResult<Vec<DeploymentOperationInner>> {
        list_deployment_operations(&self.client, resource_group, name).await
    }
}

#[async_trait]
impl SupportsListingByResourceGroup for Deployments {
    type Item = Deployment;

    async fn list_by_resource_group(&self, resource_group: &str) -> AzureResult<Vec<Deployment>> {
        Ok(list_deployments(&self.client, resource_group)
            .await?
            .into_iter()
            .map(|inner| Deployment::new(inner, self.client.clone()))
            .collect())
    }
}

#[async_trait]
impl SupportsGettingByResourceGroup for Deployments {
    type Item = Deployment;

    async fn get_by_resource_group(&self, resource_group: &str, name: &str) -> AzureResult<Deployment> {
        let inner = get_deployment(&self.client, resource_group, name).await?;
        Ok(Deployment::new(inner, self.client.clone()))
    }
}

#[async_trait]
impl SupportsDeletingByResourceGroup for Deployments {
    async fn delete_by_resource_group(&self, resource_group: &str, name: &str) -> AzureResult<()> {
        delete_deployment(&self.client, resource_group, name).await?;
        info!("Deleted deployment {}/{}", resource_group, name);
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use azfluent_core::test_utils::mock_client;
    use azfluent_core::types::AzureErrorKind;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DEP_PATH: &str =
        "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.Resources/deployments/dep1";

    fn deployment_json(state: &str) -> Value {
        json!({
            "id": DEP_PATH,
            "name": "dep1",
            "properties": {
                "provisioningState": state,
                "mode": "Incremental",
                "templateLink": {"uri": "https://t/azuredeploy.json", "contentVersion": "1.0.0.0"},
                "outputs": {"fqdn": {"type": "String", "value": "x.example"}}
            }
        })
    }

    #[test]
    fn template_setters_are_exclusive() {
        let client = Arc::new(AzureClient::new(Default::default()));
        let d = Deployments::new(client)
            .define("dep1")
            .with_template(json!({"resources": []}))
            .with_template_link("https://t/azuredeploy.json", "1.0.0.0");
        assert!(d.properties().template.is_none());
        assert_eq!(
            d.properties().template_link.as_ref().map(|l| l.uri.as_str()),
            Some("https://t/azuredeploy.json")
        );
    }

    #[tokio::test]
    async fn create_requires_template_and_parameters() {
        let server = MockServer::start().await;
        let deployments = Deployments::new(mock_client(&server));
        let err = deployments
            .define("dep1")
            .with_existing_resource_group("rg1")
            .with_parameters(json!({}))
            .create()
            .await
            .unwrap_err();
        assert_eq!(err.kind, AzureErrorKind::Validation);
        assert!(err.message.contains("template"));

        let err = deployments
            .define("dep1")
            .with_existing_resource_group("rg1")
            .with_template(json!({}))
            .create()
            .await
            .unwrap_err();
        assert!(err.message.contains("parameters"));
    }

    #[tokio::test]
    async fn create_polls_until_succeeded() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(DEP_PATH))
            .and(body_partial_json(json!({"properties": {"mode": "Complete"}})))
            .respond_with(ResponseTemplate::new(201).set_body_json(deployment_json("Running")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(DEP_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(deployment_json("Succeeded")))
            .mount(&server)
            .await;

        let deployments = Deployments::new(mock_client(&server));
        let dep = deployments
            .define("dep1")
            .with_existing_resource_group("rg1")
            .with_template_link("https://t/azuredeploy.json", "1.0.0.0")
            .with_parameters(json!({"dnsLabel": {"value": "x"}}))
            .with_mode(DeploymentMode::Complete)
            .create()
            .await
            .unwrap();
        assert_eq!(dep.provisioning_state(), Some("Succeeded"));
        assert_eq!(dep.outputs().unwrap()["fqdn"]["value"], "x.example");
    }

    #[tokio::test]
    async fn cancel_and_operations() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DEP_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(deployment_json("Running")))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("{DEP_PATH}/cancel")))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{DEP_PATH}/operations")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{"operationId": "op1", "properties": {"provisioningState": "Running"}}]
            })))
            .mount(&server)
            .await;

        let deployments = Deployments::new(mock_client(&server));
        let dep = deployments.get_by_resource_group("rg1", "dep1").await.unwrap();
        dep.cancel().await.unwrap();
        let ops = dep.operations().await.unwrap();
        assert_eq!(ops[0].operation_id.as_deref(), Some("op1"));
    }

    #[tokio::test]
    async fn validate_posts_properties() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{DEP_PATH}/validate")))
            .and(body_partial_json(json!({"properties": {"mode": "Incremental"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "properties": {"provisioningState": "Succeeded"}
            })))
            .mount(&server)
            .await;

        let deployments = Deployments::new(mock_client(&server));
        let result = deployments
            .define("dep1")
            .with_existing_resource_group("rg1")
            .with_template(json!({"resources": []}))
            .with_parameters(json!({}))
            .validate()
            .await
            .unwrap();
        assert!(result.error.is_none());
    }
}
