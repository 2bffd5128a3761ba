//! Azure AD OAuth2 authentication.
//!
//! Supports client-credentials (service-principal) flow using the
//! Microsoft Identity Platform v2.0 token endpoint of the configured cloud.

use chrono::{Duration, Utc};
use log::debug;

use crate::client::AzureClient;
use crate::types::{
    AzureCredentials, AzureError, AzureErrorKind, AzureResult, AzureToken, TokenResponse,
};

/// Token endpoint URL for a given authority host and tenant.
fn token_url(authority_host: &str, tenant_id: &str) -> String {
    format!(
        "{}/{}/oauth2/v2.0/token",
        authority_host.trim_end_matches('/'),
        tenant_id
    )
}

/// Acquire a resource-manager token using client-credentials grant.
pub async fn acquire_token(
    client: &AzureClient,
    creds: &AzureCredentials,
) -> AzureResult<AzureToken> {
    let scope = client.config().environment.management_scope();
    acquire_token_for_scope(client, creds, &scope).await
}

/// Acquire a token for an arbitrary scope (e.g. a data-plane audience).
pub async fn acquire_token_for_scope(
    client: &AzureClient,
    creds: &AzureCredentials,
    scope: &str,
) -> AzureResult<AzureToken> {
    if !creds.has_secret() {
        return Err(AzureError::new(
            AzureErrorKind::Validation,
            "client_id, client_secret, and tenant_id are all required",
        ));
    }

    let url = token_url(&client.config().environment.authority_host, &creds.tenant_id);
    debug!("Azure token request → {} (scope {})", url, scope);

    let form: Vec<(&str, &str)> = vec![
        ("grant_type", "client_credentials"),
        ("client_id", &creds.client_id),
        ("client_secret", &creds.client_secret),
        ("scope", scope),
    ];

    let resp: TokenResponse = client
        .post_form_unauthenticated(&url, &form)
        .await
        .map_err(|e| match e.kind {
            AzureErrorKind::BadRequest | AzureErrorKind::Auth => AzureError {
                kind: AzureErrorKind::Auth,
                ..e
            },
            _ => e,
        })?;
    Ok(token_from_response(resp))
}

/// Convert the raw token endpoint response into our cached `AzureToken`.
fn token_from_response(resp: TokenResponse) -> AzureToken {
    let expires_at = resp
        .expires_in
        .map(|secs| Utc::now() + Duration::seconds(secs as i64));

    AzureToken {
        access_token: resp.access_token,
        token_type: resp.token_type,
        expires_at,
        resource: resp.resource,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::mock_config;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn token_url_construction() {
        let url = token_url("https://login.microsoftonline.com/", "my-tenant-123");
        assert_eq!(
            url,
            "https://login.microsoftonline.com/my-tenant-123/oauth2/v2.0/token"
        );
    }

    #[test]
    fn token_from_response_with_expiry() {
        let resp = TokenResponse {
            access_token: "tok123".into(),
            token_type: "Bearer".into(),
            expires_in: Some(3600),
            resource: Some("https://management.azure.com/".into()),
        };
        let t = token_from_response(resp);
        assert_eq!(t.access_token, "tok123");
        assert!(t.expires_at.is_some());
        assert!(!t.is_expired());
        assert_eq!(t.resource, Some("https://management.azure.com/".into()));
    }

    #[test]
    fn token_from_response_no_expiry() {
        let resp = TokenResponse {
            access_token: "x".into(),
            token_type: "Bearer".into(),
            expires_in: None,
            resource: None,
        };
        let t = token_from_response(resp);
        assert!(t.expires_at.is_none());
        assert!(!t.is_expired());
    }

    #[tokio::test]
    async fn acquire_token_validation() {
        let client = AzureClient::new(AzureCredentials::default());
        let creds = AzureCredentials::default();
        let e = acquire_token(&client, &creds).await.unwrap_err();
        assert_eq!(e.kind, AzureErrorKind::Validation);
    }

    #[tokio::test]
    async fn acquire_token_posts_client_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tid/oauth2/v2.0/token"))
            .and(body_string_contains("client_id=app"))
            .and(body_string_contains("scope="))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "minted",
                "token_type": "Bearer",
                "expires_in": 3599
            })))
            .mount(&server)
            .await;

        let mut config = mock_config(&server);
        config.environment.authority_host = server.uri();
        let creds = AzureCredentials::new("app", "pw", "tid", "sub");
        let client = AzureClient::with_config(creds.clone(), config);

        let token = acquire_token(&client, &creds).await.unwrap();
        assert_eq!(token.access_token, "minted");
        assert!(token.expires_within(3600));
    }

    #[tokio::test]
    async fn rejected_secret_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tid/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_client",
                "error_description": "AADSTS7000215: Invalid client secret provided."
            })))
            .mount(&server)
            .await;

        let mut config = mock_config(&server);
        config.environment.authority_host = server.uri();
        let creds = AzureCredentials::new("app", "wrong", "tid", "sub");
        let client = AzureClient::with_config(creds.clone(), config);

        let e = acquire_token(&client, &creds).await.unwrap_err();
        assert_eq!(e.kind, AzureErrorKind::Auth);
        assert!(e.message.contains("invalid_client"));
    }
}
