//! Core types shared by every Azure Resource Manager service crate.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Error types ─────────────────────────────────────────────────────

/// Categorised error kinds for Azure operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AzureErrorKind {
    Auth,
    NotFound,
    Conflict,
    Forbidden,
    RateLimit,
    BadRequest,
    ServerError,
    Timeout,
    Network,
    Parse,
    Validation,
    Configuration,
    NotAuthenticated,
    SubscriptionNotSet,
    ResourceGroupRequired,
    InvalidResourceId,
    OperationFailed,
}

impl fmt::Display for AzureErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth => write!(f, "Authentication error"),
            Self::NotFound => write!(f, "Resource not found"),
            Self::Conflict => write!(f, "Resource conflict"),
            Self::Forbidden => write!(f, "Forbidden"),
            Self::RateLimit => write!(f, "Rate limit exceeded"),
            Self::BadRequest => write!(f, "Bad request"),
            Self::ServerError => write!(f, "Server error"),
            Self::Timeout => write!(f, "Request timeout"),
            Self::Network => write!(f, "Network error"),
            Self::Parse => write!(f, "Parse error"),
            Self::Validation => write!(f, "Validation error"),
            Self::Configuration => write!(f, "Configuration error"),
            Self::NotAuthenticated => write!(f, "Not authenticated"),
            Self::SubscriptionNotSet => write!(f, "Subscription ID not set"),
            Self::ResourceGroupRequired => write!(f, "Resource group required"),
            Self::InvalidResourceId => write!(f, "Invalid resource ID"),
            Self::OperationFailed => write!(f, "Long-running operation failed"),
        }
    }
}

/// Main error type for Azure operations.
///
/// Server-side rejections carry the HTTP status plus the `code` / `target`
/// fields of the ARM cloud-error body when the service supplied one.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("[{kind}] {message}")]
pub struct AzureError {
    pub kind: AzureErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl AzureError {
    pub fn new(kind: AzureErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
            code: None,
            target: None,
        }
    }

    pub fn with_status(kind: AzureErrorKind, message: impl Into<String>, status: u16) -> Self {
        Self {
            status_code: Some(status),
            ..Self::new(kind, message)
        }
    }

    /// Map a non-2xx response into an error, decoding the ARM cloud-error
    /// envelope when present.
    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = match status {
            400 => AzureErrorKind::BadRequest,
            401 => AzureErrorKind::Auth,
            403 => AzureErrorKind::Forbidden,
            404 => AzureErrorKind::NotFound,
            408 => AzureErrorKind::Timeout,
            409 => AzureErrorKind::Conflict,
            429 => AzureErrorKind::RateLimit,
            500..=599 => AzureErrorKind::ServerError,
            _ => AzureErrorKind::Network,
        };

        match serde_json::from_str::<CloudErrorResponse>(body) {
            Ok(CloudErrorResponse { error: Some(cloud) }) if !cloud.message.is_empty() => {
                let mut err = Self::with_status(kind, cloud.message, status);
                err.code = Some(cloud.code).filter(|c| !c.is_empty());
                err.target = cloud.target;
                err
            }
            _ if body.trim().is_empty() => {
                Self::with_status(kind, format!("HTTP {status} with empty body"), status)
            }
            _ => Self::with_status(kind, body.to_string(), status),
        }
    }

    /// Build the error for a long-running operation that ended in
    /// `Failed` or `Canceled`.
    pub fn operation_failed(status: &str, cloud: Option<CloudErrorBody>) -> Self {
        match cloud {
            Some(body) => {
                let mut err = Self::new(
                    AzureErrorKind::OperationFailed,
                    format!("Operation {status}: {}", body.message),
                );
                err.code = Some(body.code).filter(|c| !c.is_empty());
                err.target = body.target;
                err
            }
            None => Self::new(
                AzureErrorKind::OperationFailed,
                format!("Operation finished with status {status}"),
            ),
        }
    }

    pub fn not_authenticated() -> Self {
        Self::new(
            AzureErrorKind::NotAuthenticated,
            "Not authenticated — supply a client secret or a bearer token",
        )
    }

    pub fn subscription_not_set() -> Self {
        Self::new(AzureErrorKind::SubscriptionNotSet, "Subscription ID not configured")
    }

    pub fn resource_group_required() -> Self {
        Self::new(
            AzureErrorKind::ResourceGroupRequired,
            "Resource group name is required for this operation",
        )
    }

    /// A required parameter was missing or empty.
    pub fn required(param: &str) -> Self {
        Self::new(
            AzureErrorKind::Validation,
            format!("Parameter {param} is required and cannot be null."),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(AzureErrorKind::Validation, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == AzureErrorKind::NotFound
    }
}

pub type AzureResult<T> = Result<T, AzureError>;

/// Reject empty required string parameters before any request is issued.
pub fn require(param: &str, value: &str) -> AzureResult<()> {
    if value.trim().is_empty() {
        Err(AzureError::required(param))
    } else {
        Ok(())
    }
}

/// ARM error envelope: `{"error": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CloudErrorResponse {
    #[serde(default)]
    pub error: Option<CloudErrorBody>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CloudErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub details: Vec<CloudErrorBody>,
}

// ─── OAuth / Auth ────────────────────────────────────────────────────

/// Client credentials for Azure AD (service-principal or app-registration).
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct AzureCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub tenant_id: String,
    pub subscription_id: String,
}

impl fmt::Debug for AzureCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("tenant_id", &self.tenant_id)
            .field("subscription_id", &self.subscription_id)
            .finish()
    }
}

impl AzureCredentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        tenant_id: impl Into<String>,
        subscription_id: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            tenant_id: tenant_id.into(),
            subscription_id: subscription_id.into(),
        }
    }

    /// Read `AZURE_CLIENT_ID`, `AZURE_CLIENT_SECRET`, `AZURE_TENANT_ID`
    /// and `AZURE_SUBSCRIPTION_ID`.
    pub fn from_env() -> AzureResult<Self> {
        let read = |key: &str| {
            std::env::var(key).map_err(|_| {
                AzureError::new(
                    AzureErrorKind::Configuration,
                    format!("Environment variable {key} is not set"),
                )
            })
        };
        Ok(Self {
            client_id: read("AZURE_CLIENT_ID")?,
            client_secret: read("AZURE_CLIENT_SECRET")?,
            tenant_id: read("AZURE_TENANT_ID")?,
            subscription_id: read("AZURE_SUBSCRIPTION_ID")?,
        })
    }

    /// True when the client-credentials flow can be used to mint tokens.
    pub fn has_secret(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty() && !self.tenant_id.is_empty()
    }
}

/// Contents of an SDK auth file (`az ad sp create-for-rbac --sdk-auth`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AuthFile {
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    pub tenant_id: String,
    #[serde(default)]
    pub subscription_id: String,
    #[serde(default)]
    pub active_directory_endpoint_url: Option<String>,
    #[serde(default)]
    pub resource_manager_endpoint_url: Option<String>,
}

impl AuthFile {
    pub fn load(path: impl AsRef<Path>) -> AzureResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AzureError::new(
                AzureErrorKind::Configuration,
                format!("Cannot read auth file {}: {e}", path.display()),
            )
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            AzureError::new(AzureErrorKind::Parse, format!("Invalid auth file: {e}"))
        })
    }

    pub fn credentials(&self) -> AzureCredentials {
        AzureCredentials::new(
            self.client_id.clone(),
            self.client_secret.clone(),
            self.tenant_id.clone(),
            self.subscription_id.clone(),
        )
    }

    /// Public cloud unless the file overrides either endpoint.
    pub fn environment(&self) -> AzureEnvironment {
        let base = AzureEnvironment::azure();
        match (&self.resource_manager_endpoint_url, &self.active_directory_endpoint_url) {
            (None, None) => base,
            (rm, ad) => AzureEnvironment::custom(
                rm.clone().unwrap_or(base.resource_manager_endpoint),
                ad.clone().unwrap_or(base.authority_host),
            ),
        }
    }
}

/// Cached bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AzureToken {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resource: Option<String>,
}

impl AzureToken {
    /// A bearer token with no known expiry.
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "Bearer".into(),
            expires_at: None,
            resource: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_within(0)
    }

    pub fn expires_within(&self, seconds: i64) -> bool {
        match self.expires_at {
            Some(exp) => Utc::now() + chrono::Duration::seconds(seconds) >= exp,
            None => false,
        }
    }
}

/// Raw token endpoint response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub resource: Option<String>,
}

// ─── Azure Resource Manager common ──────────────────────────────────

/// Generic ARM list wrapper (`value` array with optional `nextLink`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ArmList<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(default)]
    pub next_link: Option<String>,
}

/// Reference to another ARM resource by id.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SubResource {
    #[serde(default)]
    pub id: String,
}

impl SubResource {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Managed service identity block shared by several resource types.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManagedIdentity {
    #[serde(rename = "type")]
    pub identity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

impl ManagedIdentity {
    pub fn system_assigned() -> Self {
        Self {
            identity_type: "SystemAssigned".into(),
            ..Default::default()
        }
    }
}

/// Result of a `checkNameAvailability` call.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NameAvailability {
    #[serde(default, alias = "available")]
    pub name_available: bool,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// ─── Cloud environments ─────────────────────────────────────────────

/// Endpoints of one Azure cloud.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AzureEnvironment {
    pub name: String,
    pub resource_manager_endpoint: String,
    pub authority_host: String,
}

impl AzureEnvironment {
    pub fn azure() -> Self {
        Self {
            name: "AzureCloud".into(),
            resource_manager_endpoint: ARM_BASE.into(),
            authority_host: "https://login.microsoftonline.com".into(),
        }
    }

    pub fn azure_china() -> Self {
        Self {
            name: "AzureChinaCloud".into(),
            resource_manager_endpoint: "https://management.chinacloudapi.cn".into(),
            authority_host: "https://login.chinacloudapi.cn".into(),
        }
    }

    pub fn azure_us_government() -> Self {
        Self {
            name: "AzureUSGovernment".into(),
            resource_manager_endpoint: "https://management.usgovcloudapi.net".into(),
            authority_host: "https://login.microsoftonline.us".into(),
        }
    }

    pub fn azure_germany() -> Self {
        Self {
            name: "AzureGermanCloud".into(),
            resource_manager_endpoint: "https://management.microsoftazure.de".into(),
            authority_host: "https://login.microsoftonline.de".into(),
        }
    }

    pub fn custom(
        resource_manager_endpoint: impl Into<String>,
        authority_host: impl Into<String>,
    ) -> Self {
        Self {
            name: "Custom".into(),
            resource_manager_endpoint: resource_manager_endpoint.into(),
            authority_host: authority_host.into(),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "azurecloud" | "azure" | "public" => Some(Self::azure()),
            "azurechinacloud" | "china" => Some(Self::azure_china()),
            "azureusgovernment" | "usgovernment" => Some(Self::azure_us_government()),
            "azuregermancloud" | "germany" => Some(Self::azure_germany()),
            _ => None,
        }
    }

    /// OAuth2 scope granting access to the resource manager.
    pub fn management_scope(&self) -> String {
        format!("{}/.default", self.resource_manager_endpoint.trim_end_matches('/'))
    }
}

impl Default for AzureEnvironment {
    fn default() -> Self {
        Self::azure()
    }
}

// ─── Configuration ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureConfig {
    pub environment: AzureEnvironment,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub lro_poll_interval_ms: u64,
    pub lro_timeout_secs: u64,
    pub user_agent: String,
    pub api_version_resources: String,
    pub api_version_subscriptions: String,
    pub api_version_compute: String,
    pub api_version_disks: String,
    pub api_version_storage: String,
    pub api_version_action_groups: String,
    pub api_version_metric_alerts: String,
    pub api_version_autoscale: String,
    pub api_version_diagnostic_settings: String,
    pub api_version_activity_log: String,
    pub api_version_metrics: String,
    pub api_version_container_service: String,
    pub api_version_sql: String,
    pub api_version_service_fabric: String,
}

impl AzureConfig {
    pub fn new() -> Self {
        Self {
            environment: AzureEnvironment::azure(),
            request_timeout_secs: 30,
            max_retries: 3,
            retry_base_delay_ms: 500,
            lro_poll_interval_ms: 5_000,
            lro_timeout_secs: 3_600,
            user_agent: format!("azfluent/{}", env!("CARGO_PKG_VERSION")),
            api_version_resources: api_versions::RESOURCES.into(),
            api_version_subscriptions: api_versions::SUBSCRIPTIONS.into(),
            api_version_compute: api_versions::COMPUTE.into(),
            api_version_disks: api_versions::DISKS.into(),
            api_version_storage: api_versions::STORAGE.into(),
            api_version_action_groups: api_versions::ACTION_GROUPS.into(),
            api_version_metric_alerts: api_versions::METRIC_ALERTS.into(),
            api_version_autoscale: api_versions::AUTOSCALE.into(),
            api_version_diagnostic_settings: api_versions::DIAGNOSTIC_SETTINGS.into(),
            api_version_activity_log: api_versions::ACTIVITY_LOG.into(),
            api_version_metrics: api_versions::METRICS.into(),
            api_version_container_service: api_versions::CONTAINER_SERVICE.into(),
            api_version_sql: api_versions::SQL.into(),
            api_version_service_fabric: api_versions::SERVICE_FABRIC.into(),
        }
    }

    /// Defaults overlaid with `AZURE_ENVIRONMENT`,
    /// `AZURE_RESOURCE_MANAGER_ENDPOINT`, `AZURE_AUTHORITY_HOST`,
    /// `AZURE_MAX_RETRIES` and `AZURE_REQUEST_TIMEOUT_SECS`.
    pub fn from_env() -> AzureResult<Self> {
        let mut config = Self::new();
        if let Ok(name) = std::env::var("AZURE_ENVIRONMENT") {
            config.environment = AzureEnvironment::from_name(&name).ok_or_else(|| {
                AzureError::new(
                    AzureErrorKind::Configuration,
                    format!("Unknown Azure environment '{name}'"),
                )
            })?;
        }
        if let Ok(endpoint) = std::env::var("AZURE_RESOURCE_MANAGER_ENDPOINT") {
            config.environment.name = "Custom".into();
            config.environment.resource_manager_endpoint = endpoint;
        }
        if let Ok(host) = std::env::var("AZURE_AUTHORITY_HOST") {
            config.environment.name = "Custom".into();
            config.environment.authority_host = host;
        }
        if let Ok(raw) = std::env::var("AZURE_MAX_RETRIES") {
            config.max_retries = parse_env_number("AZURE_MAX_RETRIES", &raw)?;
        }
        if let Ok(raw) = std::env::var("AZURE_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = parse_env_number("AZURE_REQUEST_TIMEOUT_SECS", &raw)?;
        }
        Ok(config)
    }

    pub fn with_environment(mut self, environment: AzureEnvironment) -> Self {
        self.environment = environment;
        self
    }
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_env_number<T: std::str::FromStr>(key: &str, raw: &str) -> AzureResult<T> {
    raw.trim().parse().map_err(|_| {
        AzureError::new(
            AzureErrorKind::Configuration,
            format!("{key} must be a non-negative integer, got '{raw}'"),
        )
    })
}

// ─── Azure API version constants ────────────────────────────────────

pub mod api_versions {
    pub const RESOURCES: &str = "2021-04-01";
    pub const SUBSCRIPTIONS: &str = "2022-12-01";
    pub const COMPUTE: &str = "2024-03-01";
    pub const DISKS: &str = "2023-10-02";
    pub const STORAGE: &str = "2023-05-01";
    pub const ACTION_GROUPS: &str = "2023-01-01";
    pub const METRIC_ALERTS: &str = "2018-03-01";
    pub const AUTOSCALE: &str = "2022-10-01";
    pub const DIAGNOSTIC_SETTINGS: &str = "2021-05-01-preview";
    pub const ACTIVITY_LOG: &str = "2015-04-01";
    pub const METRICS: &str = "2018-01-01";
    pub const CONTAINER_SERVICE: &str = "2024-02-01";
    pub const SQL: &str = "2021-11-01";
    pub const SERVICE_FABRIC: &str = "2021-06-01";
}

/// Azure management base URL.
pub const ARM_BASE: &str = "https://management.azure.com";

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let e = AzureError::new(AzureErrorKind::NotFound, "vm1 missing");
        assert_eq!(e.to_string(), "[Resource not found] vm1 missing");
    }

    #[test]
    fn error_from_status_parses_cloud_error() {
        let body = r#"{"error":{"code":"ResourceGroupNotFound","message":"Resource group 'rg9' could not be found.","target":"rg9"}}"#;
        let e = AzureError::from_status(404, body);
        assert_eq!(e.kind, AzureErrorKind::NotFound);
        assert_eq!(e.status_code, Some(404));
        assert_eq!(e.code.as_deref(), Some("ResourceGroupNotFound"));
        assert_eq!(e.target.as_deref(), Some("rg9"));
        assert!(e.message.contains("could not be found"));
    }

    #[test]
    fn error_from_status_falls_back_to_raw_body() {
        let e = AzureError::from_status(503, "upstream unavailable");
        assert_eq!(e.kind, AzureErrorKind::ServerError);
        assert_eq!(e.message, "upstream unavailable");
        assert!(e.code.is_none());
    }

    #[test]
    fn error_from_status_empty_body() {
        let e = AzureError::from_status(409, "");
        assert_eq!(e.kind, AzureErrorKind::Conflict);
        assert!(e.message.contains("409"));
    }

    #[test]
    fn error_kind_mapping() {
        assert_eq!(AzureError::from_status(400, "").kind, AzureErrorKind::BadRequest);
        assert_eq!(AzureError::from_status(401, "").kind, AzureErrorKind::Auth);
        assert_eq!(AzureError::from_status(403, "").kind, AzureErrorKind::Forbidden);
        assert_eq!(AzureError::from_status(429, "").kind, AzureErrorKind::RateLimit);
        assert_eq!(AzureError::from_status(502, "").kind, AzureErrorKind::ServerError);
        assert_eq!(AzureError::from_status(302, "").kind, AzureErrorKind::Network);
    }

    #[test]
    fn required_message() {
        let e = AzureError::required("resourceGroupName");
        assert_eq!(e.kind, AzureErrorKind::Validation);
        assert_eq!(
            e.message,
            "Parameter resourceGroupName is required and cannot be null."
        );
    }

    #[test]
    fn require_rejects_blank() {
        assert!(require("name", "  ").is_err());
        assert!(require("name", "vm1").is_ok());
    }

    #[test]
    fn operation_failed_carries_code() {
        let e = AzureError::operation_failed(
            "Failed",
            Some(CloudErrorBody {
                code: "QuotaExceeded".into(),
                message: "Not enough cores".into(),
                ..Default::default()
            }),
        );
        assert_eq!(e.kind, AzureErrorKind::OperationFailed);
        assert_eq!(e.code.as_deref(), Some("QuotaExceeded"));
        assert!(e.message.contains("Not enough cores"));
    }

    #[test]
    fn credentials_debug_redacts_secret() {
        let c = AzureCredentials::new("app", "hunter2", "tenant", "sub");
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn credentials_has_secret() {
        assert!(!AzureCredentials::default().has_secret());
        assert!(AzureCredentials::new("a", "b", "c", "").has_secret());
    }

    #[test]
    fn token_not_expired_when_no_expiry() {
        let t = AzureToken::bearer("tok");
        assert!(!t.is_expired());
        assert!(!t.expires_within(3600));
    }

    #[test]
    fn token_expired_in_past() {
        let t = AzureToken {
            access_token: "tok".into(),
            token_type: "Bearer".into(),
            expires_at: Some(Utc::now() - chrono::Duration::hours(1)),
            resource: None,
        };
        assert!(t.is_expired());
    }

    #[test]
    fn token_expires_within_window() {
        let t = AzureToken {
            access_token: "tok".into(),
            token_type: "Bearer".into(),
            expires_at: Some(Utc::now() + chrono::Duration::seconds(60)),
            resource: None,
        };
        assert!(!t.is_expired());
        assert!(t.expires_within(300));
    }

    #[test]
    fn auth_file_loads_and_maps_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        std::fs::write(
            &path,
            r#"{
                "clientId": "cid",
                "clientSecret": "secret",
                "subscriptionId": "sub",
                "tenantId": "tid",
                "activeDirectoryEndpointUrl": "https://login.chinacloudapi.cn",
                "resourceManagerEndpointUrl": "https://management.chinacloudapi.cn/"
            }"#,
        )
        .unwrap();

        let file = AuthFile::load(&path).unwrap();
        let creds = file.credentials();
        assert_eq!(creds.client_id, "cid");
        assert_eq!(creds.subscription_id, "sub");
        let env = file.environment();
        assert_eq!(env.authority_host, "https://login.chinacloudapi.cn");
        assert_eq!(
            env.management_scope(),
            "https://management.chinacloudapi.cn/.default"
        );
    }

    #[test]
    fn auth_file_missing_is_configuration_error() {
        let e = AuthFile::load("/definitely/not/here.json").unwrap_err();
        assert_eq!(e.kind, AzureErrorKind::Configuration);
    }

    #[test]
    fn auth_file_defaults_to_public_cloud() {
        let file: AuthFile =
            serde_json::from_str(r#"{"clientId":"a","tenantId":"b"}"#).unwrap();
        assert_eq!(file.environment(), AzureEnvironment::azure());
    }

    #[test]
    fn environment_lookup() {
        assert_eq!(
            AzureEnvironment::from_name("AzureChinaCloud"),
            Some(AzureEnvironment::azure_china())
        );
        assert!(AzureEnvironment::from_name("moon").is_none());
        assert_eq!(
            AzureEnvironment::azure().management_scope(),
            "https://management.azure.com/.default"
        );
    }

    #[test]
    fn config_defaults() {
        let c = AzureConfig::new();
        assert_eq!(c.max_retries, 3);
        assert_eq!(c.api_version_compute, api_versions::COMPUTE);
        assert_eq!(c.environment.resource_manager_endpoint, ARM_BASE);
        assert!(c.user_agent.starts_with("azfluent/"));
    }

    #[test]
    fn arm_list_deserialization() {
        let json = r#"{"value":[{"id":"1"},{"id":"2"}],"nextLink":"http://next"}"#;
        let list: ArmList<SubResource> = serde_json::from_str(json).unwrap();
        assert_eq!(list.value.len(), 2);
        assert_eq!(list.next_link.unwrap(), "http://next");
    }

    #[test]
    fn arm_list_missing_value() {
        let list: ArmList<SubResource> = serde_json::from_str("{}").unwrap();
        assert!(list.value.is_empty());
        assert!(list.next_link.is_none());
    }

    #[test]
    fn name_availability_accepts_both_spellings() {
        let a: NameAvailability = serde_json::from_str(r#"{"nameAvailable":true}"#).unwrap();
        let b: NameAvailability =
            serde_json::from_str(r#"{"available":false,"reason":"AlreadyExists"}"#).unwrap();
        assert!(a.name_available);
        assert!(!b.name_available);
        assert_eq!(b.reason.as_deref(), Some("AlreadyExists"));
    }
}
