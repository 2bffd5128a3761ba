//! HTTP client wrapper for Azure Resource Manager API.
//!
//! Handles bearer-token acquisition and refresh, rate-limit retries with
//! exponential backoff, pagination via `nextLink`, long-running operation
//! polling and standard ARM error extraction.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use reqwest::header::{HeaderMap, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::auth;
use crate::lro::FinalState;
use crate::types::{
    ArmList, AzureConfig, AzureCredentials, AzureError, AzureErrorKind, AzureResult, AzureToken,
};

/// Refresh tokens this many seconds before they expire.
const TOKEN_REFRESH_SKEW_SECS: i64 = 300;

/// HTTP client with Azure-specific auth and retry logic.
///
/// Clones share the token cache, so one authentication serves every
/// manager built from the same client.
#[derive(Clone)]
pub struct AzureClient {
    http: Client,
    credentials: AzureCredentials,
    config: AzureConfig,
    token: Arc<RwLock<Option<AzureToken>>>,
}

impl fmt::Debug for AzureClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureClient")
            .field("credentials", &self.credentials)
            .field("environment", &self.config.environment.name)
            .finish_non_exhaustive()
    }
}

impl AzureClient {
    pub fn new(credentials: AzureCredentials) -> Self {
        Self::with_config(credentials, AzureConfig::new())
    }

    pub fn with_config(credentials: AzureCredentials, config: AzureConfig) -> Self {
        Self {
            http: Client::builder()
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .user_agent(config.user_agent.clone())
                .build()
                .unwrap_or_default(),
            credentials,
            config,
            token: Arc::new(RwLock::new(None)),
        }
    }

    /// Seed the cache with a pre-obtained bearer token.
    pub fn with_token(mut self, token: AzureToken) -> Self {
        self.token = Arc::new(RwLock::new(Some(token)));
        self
    }

    /// Same credentials and token cache, different subscription.
    pub fn with_subscription(&self, subscription_id: impl Into<String>) -> Self {
        let mut other = self.clone();
        other.credentials.subscription_id = subscription_id.into();
        other
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &AzureConfig {
        &self.config
    }

    pub fn credentials(&self) -> &AzureCredentials {
        &self.credentials
    }

    pub async fn set_token(&self, token: AzureToken) {
        *self.token.write().await = Some(token);
    }

    pub async fn token(&self) -> Option<AzureToken> {
        self.token.read().await.clone()
    }

    pub async fn clear_token(&self) {
        *self.token.write().await = None;
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .await
            .as_ref()
            .map(|t| !t.access_token.is_empty() && !t.is_expired())
            .unwrap_or(false)
    }

    pub fn subscription_id(&self) -> AzureResult<&str> {
        Some(self.credentials.subscription_id.as_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(AzureError::subscription_not_set)
    }

    /// Inner reqwest client (for auth module direct use).
    pub fn http(&self) -> &Client {
        &self.http
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Resource manager endpoint without trailing slash.
    pub fn endpoint(&self) -> &str {
        self.config
            .environment
            .resource_manager_endpoint
            .trim_end_matches('/')
    }

    /// Build an ARM management URL: `{endpoint}{path}`. Absolute URLs
    /// (e.g. `nextLink` values) pass through untouched.
    pub fn arm_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.endpoint(), path)
        } else {
            format!("{}/{}", self.endpoint(), path)
        }
    }

    /// Subscription-scoped URL.
    pub fn subscription_url(&self, suffix: &str) -> AzureResult<String> {
        let sub = self.subscription_id()?;
        Ok(format!("{}/subscriptions/{}{}", self.endpoint(), sub, suffix))
    }

    /// Resource-group-scoped URL.
    pub fn resource_group_url(&self, rg: &str, suffix: &str) -> AzureResult<String> {
        if rg.trim().is_empty() {
            return Err(AzureError::resource_group_required());
        }
        let sub = self.subscription_id()?;
        Ok(format!(
            "{}/subscriptions/{}/resourceGroups/{}{}",
            self.endpoint(),
            sub,
            rg,
            suffix
        ))
    }

    /// Append URL-encoded query parameters.
    pub fn with_query(url: &str, query: &[(&str, &str)]) -> AzureResult<String> {
        let mut parsed = url::Url::parse(url).map_err(|e| {
            AzureError::new(AzureErrorKind::Validation, format!("Invalid URL {url}: {e}"))
        })?;
        {
            let mut pairs = parsed.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(parsed.into())
    }

    // ── Token handling ───────────────────────────────────────────────

    /// Return a usable access token, acquiring or refreshing it when it is
    /// missing or about to expire.
    pub async fn access_token(&self) -> AzureResult<String> {
        if let Some(tok) = self.cached_token(TOKEN_REFRESH_SKEW_SECS).await {
            return Ok(tok);
        }
        if !self.credentials.has_secret() {
            // static token: usable until it actually expires
            return self
                .cached_token(0)
                .await
                .ok_or_else(AzureError::not_authenticated);
        }

        let mut guard = self.token.write().await;
        if let Some(t) = guard.as_ref() {
            if !t.access_token.is_empty() && !t.expires_within(TOKEN_REFRESH_SKEW_SECS) {
                return Ok(t.access_token.clone());
            }
        }
        let fresh = auth::acquire_token(self, &self.credentials).await?;
        let access = fresh.access_token.clone();
        *guard = Some(fresh);
        Ok(access)
    }

    async fn cached_token(&self, skew_secs: i64) -> Option<String> {
        self.token
            .read()
            .await
            .as_ref()
            .filter(|t| !t.access_token.is_empty() && !t.expires_within(skew_secs))
            .map(|t| t.access_token.clone())
    }

    // ── Transport ────────────────────────────────────────────────────

    /// Send one authenticated request with the retry policy applied.
    /// Returns the response only when its status is 2xx.
    pub(crate) async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&[u8]>,
    ) -> AzureResult<Response> {
        let token = self.access_token().await?;
        let max_retries = self.config.max_retries;

        for attempt in 0..=max_retries {
            let mut req = self.http.request(method.clone(), url).bearer_auth(&token);
            if let Some(bytes) = body {
                req = req
                    .header(CONTENT_TYPE, "application/json")
                    .body(bytes.to_vec());
            }
            let resp = req.send().await.map_err(transport_error)?;

            let status = resp.status();
            if status.is_success() {
                return Ok(resp);
            }

            if should_retry(status.as_u16()) && attempt < max_retries {
                let delay = retry_after(resp.headers()).unwrap_or_else(|| {
                    Duration::from_millis(self.config.retry_base_delay_ms * 2u64.pow(attempt))
                });
                warn!(
                    "Azure {} {} → {} – retrying in {}ms",
                    method,
                    url,
                    status,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            let text = resp.text().await.unwrap_or_default();
            return Err(AzureError::from_status(status.as_u16(), &text));
        }

        Err(AzureError::new(AzureErrorKind::Network, "Max retries exceeded"))
    }

    /// GET returning the raw JSON document (`Null` for an empty body).
    pub(crate) async fn get_value(&self, url: &str) -> AzureResult<Value> {
        let resp = self.send(Method::GET, url, None).await?;
        read_json(resp).await
    }

    // ── Core HTTP verbs ──────────────────────────────────────────────

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> AzureResult<T> {
        debug!("GET {}", url);
        decode(self.get_value(url).await?)
    }

    /// GET that maps 404 to `None`.
    pub async fn get_optional_json<T: DeserializeOwned>(&self, url: &str) -> AzureResult<Option<T>> {
        match self.get_json(url).await {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// HEAD existence check: 2xx → true, 404 → false.
    pub async fn head_exists(&self, url: &str) -> AzureResult<bool> {
        debug!("HEAD {}", url);
        match self.send(Method::HEAD, url, None).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// PUT, waiting for the operation to finish; returns the final resource.
    pub async fn put_json<B, T>(&self, url: &str, body: &B) -> AzureResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("PUT {}", url);
        let payload = encode(body)?;
        let resp = self.send(Method::PUT, url, Some(&payload)).await?;
        decode(self.complete_operation(url, resp, FinalState::OriginalUri).await?)
    }

    /// PATCH, waiting for the operation to finish; returns the final resource.
    pub async fn patch_json<B, T>(&self, url: &str, body: &B) -> AzureResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("PATCH {}", url);
        let payload = encode(body)?;
        let resp = self.send(Method::PATCH, url, Some(&payload)).await?;
        decode(self.complete_operation(url, resp, FinalState::OriginalUri).await?)
    }

    /// POST with a JSON body; the result comes from the response or, for
    /// asynchronous operations, from the final `Location`.
    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> AzureResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST {}", url);
        let payload = encode(body)?;
        let resp = self.send(Method::POST, url, Some(&payload)).await?;
        decode(self.complete_operation(url, resp, FinalState::Location).await?)
    }

    /// POST without a body, ignoring any result.
    /// Used for actions like VM start/stop, provider registration, etc.
    pub async fn post_action(&self, url: &str) -> AzureResult<()> {
        debug!("POST action {}", url);
        let resp = self.send(Method::POST, url, Some(&[])).await?;
        self.complete_operation(url, resp, FinalState::Location)
            .await
            .map(|_| ())
    }

    /// POST without a body that returns a document (e.g. key listings).
    pub async fn post_for_json<T: DeserializeOwned>(&self, url: &str) -> AzureResult<T> {
        debug!("POST {}", url);
        let resp = self.send(Method::POST, url, Some(&[])).await?;
        decode(self.complete_operation(url, resp, FinalState::Location).await?)
    }

    pub async fn delete(&self, url: &str) -> AzureResult<()> {
        debug!("DELETE {}", url);
        let resp = self.send(Method::DELETE, url, None).await?;
        self.complete_operation(url, resp, FinalState::None)
            .await
            .map(|_| ())
    }

    // ── Pagination helper ────────────────────────────────────────────

    /// Follow `nextLink` to collect **all** items from a paginated ARM list endpoint.
    pub async fn get_all_pages<T: DeserializeOwned>(&self, initial_url: &str) -> AzureResult<Vec<T>> {
        let mut all: Vec<T> = Vec::new();
        let mut url = initial_url.to_string();

        loop {
            debug!("Azure paginate: {}", url);
            let page: ArmList<T> = decode(self.get_value(&url).await?)?;
            all.extend(page.value);
            match page.next_link {
                Some(next) if !next.is_empty() => url = self.arm_url(&next),
                _ => break,
            }
        }

        Ok(all)
    }

    /// POST unauthenticated form data (used by auth module for token exchange).
    pub async fn post_form_unauthenticated<T: DeserializeOwned>(
        &self,
        url: &str,
        form: &[(impl AsRef<str>, impl AsRef<str>)],
    ) -> AzureResult<T> {
        let form_pairs: Vec<(&str, &str)> = form
            .iter()
            .map(|(k, v)| (k.as_ref(), v.as_ref()))
            .collect();

        let resp = self
            .http
            .post(url)
            .form(&form_pairs)
            .send()
            .await
            .map_err(transport_error)?;

        if resp.status().is_success() {
            resp.json::<T>().await.map_err(|e| {
                AzureError::new(AzureErrorKind::Parse, format!("JSON parse: {e}"))
            })
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Err(AzureError::from_status(status, &body))
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

pub(crate) fn should_retry(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// `Retry-After` in delta-seconds form.
pub(crate) fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn transport_error(e: reqwest::Error) -> AzureError {
    if e.is_timeout() {
        AzureError::new(AzureErrorKind::Timeout, format!("{e}"))
    } else {
        AzureError::new(AzureErrorKind::Network, format!("{e}"))
    }
}

pub(crate) async fn read_json(resp: Response) -> AzureResult<Value> {
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| AzureError::new(AzureErrorKind::Network, format!("{e}")))?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes)
        .map_err(|e| AzureError::new(AzureErrorKind::Parse, format!("JSON parse: {e}")))
}

fn encode<B: Serialize + ?Sized>(body: &B) -> AzureResult<Vec<u8>> {
    serde_json::to_vec(body)
        .map_err(|e| AzureError::new(AzureErrorKind::Parse, format!("JSON encode: {e}")))
}

fn decode<T: DeserializeOwned>(value: Value) -> AzureResult<T> {
    serde_json::from_value(value)
        .map_err(|e| AzureError::new(AzureErrorKind::Parse, format!("JSON parse: {e}")))
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{mock_client, mock_config};
    use serde::Deserialize;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Named {
        name: String,
    }

    fn creds() -> AzureCredentials {
        AzureCredentials {
            subscription_id: "sub1".into(),
            ..Default::default()
        }
    }

    #[test]
    fn subscription_id_missing() {
        let c = AzureClient::new(AzureCredentials::default());
        assert_eq!(
            c.subscription_id().unwrap_err().kind,
            AzureErrorKind::SubscriptionNotSet
        );
    }

    #[test]
    fn subscription_id_present() {
        let c = AzureClient::new(creds());
        assert_eq!(c.subscription_id().unwrap(), "sub1");
    }

    #[test]
    fn arm_url_construction() {
        let c = AzureClient::new(creds());
        assert_eq!(
            c.arm_url("/subscriptions/abc"),
            "https://management.azure.com/subscriptions/abc"
        );
        assert_eq!(c.arm_url("https://other/x"), "https://other/x");
    }

    #[test]
    fn subscription_url_construction() {
        let c = AzureClient::new(creds());
        let url = c
            .subscription_url("/providers/Microsoft.Compute/virtualMachines")
            .unwrap();
        assert!(url.contains("/subscriptions/sub1/providers/Microsoft.Compute"));
    }

    #[test]
    fn resource_group_url_construction() {
        let c = AzureClient::new(creds());
        let url = c
            .resource_group_url("rg1", "/providers/Microsoft.Compute/virtualMachines")
            .unwrap();
        assert!(url.contains("/resourceGroups/rg1/providers"));
    }

    #[test]
    fn resource_group_url_requires_group() {
        let c = AzureClient::new(creds());
        let err = c.resource_group_url("", "/x").unwrap_err();
        assert_eq!(err.kind, AzureErrorKind::ResourceGroupRequired);
    }

    #[test]
    fn with_query_encodes() {
        let url = AzureClient::with_query(
            "https://management.azure.com/x?api-version=1",
            &[("$filter", "name eq 'a b'")],
        )
        .unwrap();
        assert!(url.starts_with("https://management.azure.com/x?api-version=1&%24filter="));
        assert!(!url.contains(' '));
    }

    #[test]
    fn with_subscription_keeps_credentials() {
        let c = AzureClient::new(AzureCredentials::new("id", "secret", "tenant", "sub1"));
        let other = c.with_subscription("sub2");
        assert_eq!(other.subscription_id().unwrap(), "sub2");
        assert_eq!(other.credentials().client_id, "id");
        assert_eq!(c.subscription_id().unwrap(), "sub1");
    }

    #[test]
    fn debug_hides_secret() {
        let c = AzureClient::new(AzureCredentials::new("id", "s3cr3t", "tenant", "sub"));
        assert!(!format!("{c:?}").contains("s3cr3t"));
    }

    #[test]
    fn should_retry_logic() {
        assert!(should_retry(429));
        assert!(should_retry(500));
        assert!(should_retry(502));
        assert!(should_retry(503));
        assert!(should_retry(504));
        assert!(!should_retry(400));
        assert!(!should_retry(401));
        assert!(!should_retry(404));
    }

    #[tokio::test]
    async fn clones_share_token_cache() {
        let c = AzureClient::new(creds());
        let c2 = c.clone();
        assert!(!c2.is_authenticated().await);
        c.set_token(AzureToken::bearer("abc")).await;
        assert!(c2.is_authenticated().await);
        c2.clear_token().await;
        assert!(!c.is_authenticated().await);
    }

    #[tokio::test]
    async fn static_token_without_secret() {
        let c = AzureClient::new(creds()).with_token(AzureToken::bearer("static"));
        assert_eq!(c.access_token().await.unwrap(), "static");
    }

    #[tokio::test]
    async fn no_token_no_secret_is_not_authenticated() {
        let c = AzureClient::new(creds());
        let err = c.access_token().await.unwrap_err();
        assert_eq!(err.kind, AzureErrorKind::NotAuthenticated);
    }

    #[tokio::test]
    async fn token_refreshed_when_near_expiry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tenant1/oauth2/v2.0/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = mock_config(&server);
        config.environment.authority_host = server.uri();
        let stale = AzureToken {
            access_token: "stale".into(),
            token_type: "Bearer".into(),
            expires_at: Some(chrono::Utc::now() + chrono::Duration::seconds(30)),
            resource: None,
        };
        let c = AzureClient::with_config(
            AzureCredentials::new("app", "secret", "tenant1", "sub1"),
            config,
        )
        .with_token(stale);

        assert_eq!(c.access_token().await.unwrap(), "fresh");
        // cached now
        assert_eq!(c.access_token().await.unwrap(), "fresh");
    }

    #[tokio::test]
    async fn get_json_sends_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/thing"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"name": "a"})))
            .mount(&server)
            .await;

        let c = mock_client(&server);
        let got: Named = c.get_json(&c.arm_url("/thing")).await.unwrap();
        assert_eq!(got.name, "a");
    }

    #[tokio::test]
    async fn retries_on_503_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"name": "ok"})))
            .mount(&server)
            .await;

        let c = mock_client(&server);
        let got: Named = c.get_json(&c.arm_url("/flaky")).await.unwrap();
        assert_eq!(got.name, "ok");
    }

    #[tokio::test]
    async fn error_body_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": {"code": "ResourceNotFound", "message": "gone"}
            })))
            .mount(&server)
            .await;

        let c = mock_client(&server);
        let err = c
            .get_json::<Named>(&c.arm_url("/missing"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, AzureErrorKind::NotFound);
        assert_eq!(err.status_code, Some(404));
        assert_eq!(err.code.as_deref(), Some("ResourceNotFound"));

        let none: Option<Named> = c.get_optional_json(&c.arm_url("/missing")).await.unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn head_exists_maps_404() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/yes"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/no"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let c = mock_client(&server);
        assert!(c.head_exists(&c.arm_url("/yes")).await.unwrap());
        assert!(!c.head_exists(&c.arm_url("/no")).await.unwrap());
    }

    #[tokio::test]
    async fn pagination_follows_next_link() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [{"name": "c"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [{"name": "a"}, {"name": "b"}],
                "nextLink": format!("{}/list?page=2", server.uri())
            })))
            .mount(&server)
            .await;

        let c = mock_client(&server);
        let all: Vec<Named> = c.get_all_pages(&c.arm_url("/list")).await.unwrap();
        let names: Vec<_> = all.into_iter().map(|n| n.name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn delete_accepts_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let c = mock_client(&server);
        c.delete(&c.arm_url("/gone")).await.unwrap();
    }
}
