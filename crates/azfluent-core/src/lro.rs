//! ARM long-running operation polling.
//!
//! A mutating request may answer before the work is done. Three shapes are
//! recognised: an `Azure-AsyncOperation` status monitor, a `Location`
//! monitor answering 202 until completion, and a resource whose
//! `properties.provisioningState` has not reached a terminal value.

use std::time::Duration;

use log::{debug, warn};
use reqwest::header::{HeaderMap, LOCATION};
use reqwest::{Method, Response, StatusCode};
use serde_json::Value;
use tokio::time::Instant;

use crate::client::{read_json, retry_after, AzureClient};
use crate::types::{AzureError, AzureErrorKind, AzureResult, CloudErrorBody};

const ASYNC_OPERATION: &str = "azure-asyncoperation";

/// Where the final result of an asynchronous operation lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FinalState {
    /// PUT / PATCH: re-read the resource that was written.
    OriginalUri,
    /// POST: the `Location` monitor, if any, yields the result.
    Location,
    /// DELETE: nothing to fetch.
    None,
}

/// Terminal outcome of a status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    InProgress,
    Succeeded,
    Failed,
    Canceled,
}

impl OperationStatus {
    pub fn parse(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            "canceled" | "cancelled" => Self::Canceled,
            _ => Self::InProgress,
        }
    }

    pub fn is_terminal(self) -> bool {
        self != Self::InProgress
    }
}

/// `properties.provisioningState` of a resource document, if present.
pub fn provisioning_state(body: &Value) -> Option<&str> {
    body.get("properties")?.get("provisioningState")?.as_str()
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .filter(|s| !s.is_empty())
}

fn cloud_error(body: &Value) -> Option<CloudErrorBody> {
    body.get("error")
        .cloned()
        .and_then(|e| serde_json::from_value(e).ok())
}

impl AzureClient {
    /// Drive an initial mutating response to completion and return the
    /// final JSON document.
    pub(crate) async fn complete_operation(
        &self,
        original_url: &str,
        resp: Response,
        final_state: FinalState,
    ) -> AzureResult<Value> {
        let status = resp.status();
        let async_op = header_str(resp.headers(), ASYNC_OPERATION);
        let location = header_str(resp.headers(), LOCATION.as_str());
        let delay = retry_after(resp.headers());
        let body = read_json(resp).await?;

        if let Some(monitor) = async_op {
            self.poll_async_operation(&monitor, delay).await?;
            return match final_state {
                FinalState::OriginalUri => self.get_value(original_url).await,
                FinalState::Location => match location {
                    Some(loc) => self.get_value(&self.arm_url(&loc)).await,
                    None => Ok(body),
                },
                FinalState::None => Ok(Value::Null),
            };
        }

        if status == StatusCode::ACCEPTED {
            return match location {
                Some(loc) => self.poll_location(&self.arm_url(&loc), delay).await,
                None => Ok(body),
            };
        }

        if final_state == FinalState::OriginalUri {
            let pending = provisioning_state(&body)
                .map(|s| !OperationStatus::parse(s).is_terminal())
                .unwrap_or(false);
            if pending {
                return self.poll_provisioning_state(original_url, delay).await;
            }
        }

        Ok(body)
    }

    fn poll_interval(&self, hint: Option<Duration>) -> Duration {
        hint.unwrap_or_else(|| Duration::from_millis(self.config().lro_poll_interval_ms))
    }

    fn lro_deadline(&self) -> Instant {
        Instant::now() + Duration::from_secs(self.config().lro_timeout_secs)
    }

    fn lro_timeout(url: &str) -> AzureError {
        AzureError::new(
            AzureErrorKind::Timeout,
            format!("Long-running operation did not finish in time: {url}"),
        )
    }

    async fn poll_async_operation(&self, url: &str, first_delay: Option<Duration>) -> AzureResult<()> {
        let deadline = self.lro_deadline();
        let mut delay = self.poll_interval(first_delay);

        loop {
            if Instant::now() + delay > deadline {
                return Err(Self::lro_timeout(url));
            }
            tokio::time::sleep(delay).await;

            debug!("LRO poll {}", url);
            let resp = self.send(Method::GET, url, None).await?;
            delay = self.poll_interval(retry_after(resp.headers()));
            let body = read_json(resp).await?;

            let raw = body.get("status").and_then(Value::as_str).unwrap_or("");
            match OperationStatus::parse(raw) {
                OperationStatus::Succeeded => return Ok(()),
                OperationStatus::Failed | OperationStatus::Canceled => {
                    return Err(AzureError::operation_failed(raw, cloud_error(&body)));
                }
                OperationStatus::InProgress => {
                    if raw.is_empty() {
                        warn!("LRO monitor {} returned no status", url);
                    }
                }
            }
        }
    }

    async fn poll_location(&self, url: &str, first_delay: Option<Duration>) -> AzureResult<Value> {
        let deadline = self.lro_deadline();
        let mut delay = self.poll_interval(first_delay);
        let mut monitor = url.to_string();

        loop {
            if Instant::now() + delay > deadline {
                return Err(Self::lro_timeout(&monitor));
            }
            tokio::time::sleep(delay).await;

            debug!("LRO poll {}", monitor);
            let resp = self.send(Method::GET, &monitor, None).await?;
            if resp.status() != StatusCode::ACCEPTED {
                return read_json(resp).await;
            }
            delay = self.poll_interval(retry_after(resp.headers()));
            if let Some(next) = header_str(resp.headers(), LOCATION.as_str()) {
                monitor = self.arm_url(&next);
            }
        }
    }

    async fn poll_provisioning_state(
        &self,
        url: &str,
        first_delay: Option<Duration>,
    ) -> AzureResult<Value> {
        let deadline = self.lro_deadline();
        let delay = self.poll_interval(first_delay);

        loop {
            if Instant::now() + delay > deadline {
                return Err(Self::lro_timeout(url));
            }
            tokio::time::sleep(delay).await;

            debug!("LRO poll provisioningState {}", url);
            let body = self.get_value(url).await?;
            let state = provisioning_state(&body).unwrap_or("Succeeded");
            match OperationStatus::parse(state) {
                OperationStatus::Succeeded => return Ok(body),
                OperationStatus::Failed | OperationStatus::Canceled => {
                    let state = state.to_string();
                    return Err(AzureError::operation_failed(&state, cloud_error(&body)));
                }
                OperationStatus::InProgress => {}
            }
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::mock_client;
    use serde::Deserialize;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Thing {
        name: String,
    }

    #[test]
    fn status_parsing() {
        assert_eq!(OperationStatus::parse("Succeeded"), OperationStatus::Succeeded);
        assert_eq!(OperationStatus::parse("CANCELLED"), OperationStatus::Canceled);
        assert_eq!(OperationStatus::parse("Failed"), OperationStatus::Failed);
        assert_eq!(OperationStatus::parse("Creating"), OperationStatus::InProgress);
        assert!(!OperationStatus::parse("Updating").is_terminal());
    }

    #[test]
    fn provisioning_state_lookup() {
        let body = json!({"properties": {"provisioningState": "Creating"}});
        assert_eq!(provisioning_state(&body), Some("Creating"));
        assert_eq!(provisioning_state(&json!({})), None);
    }

    #[tokio::test]
    async fn put_follows_async_operation_header() {
        let server = MockServer::start().await;
        let monitor = format!("{}/operations/op1", server.uri());
        Mock::given(method("PUT"))
            .and(path("/things/t1"))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("Azure-AsyncOperation", monitor.as_str())
                    .set_body_json(json!({"name": "t1", "properties": {"provisioningState": "Creating"}})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/operations/op1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "InProgress"})))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/operations/op1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "Succeeded"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/things/t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "t1-final"})))
            .mount(&server)
            .await;

        let c = mock_client(&server);
        let got: Thing = c
            .put_json(&c.arm_url("/things/t1"), &json!({"location": "westus"}))
            .await
            .unwrap();
        assert_eq!(got.name, "t1-final");
    }

    #[tokio::test]
    async fn failed_async_operation_is_an_error() {
        let server = MockServer::start().await;
        let monitor = format!("{}/operations/bad", server.uri());
        Mock::given(method("PUT"))
            .and(path("/things/t2"))
            .respond_with(
                ResponseTemplate::new(201).insert_header("Azure-AsyncOperation", monitor.as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/operations/bad"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "Failed",
                "error": {"code": "QuotaExceeded", "message": "no cores left"}
            })))
            .mount(&server)
            .await;

        let c = mock_client(&server);
        let err = c
            .put_json::<_, Thing>(&c.arm_url("/things/t2"), &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.kind, AzureErrorKind::OperationFailed);
        assert_eq!(err.code.as_deref(), Some("QuotaExceeded"));
    }

    #[tokio::test]
    async fn delete_polls_location_until_done() {
        let server = MockServer::start().await;
        let monitor = format!("{}/monitors/del1", server.uri());
        Mock::given(method("DELETE"))
            .and(path("/things/t3"))
            .respond_with(ResponseTemplate::new(202).insert_header("Location", monitor.as_str()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/monitors/del1"))
            .respond_with(ResponseTemplate::new(202))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/monitors/del1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let c = mock_client(&server);
        c.delete(&c.arm_url("/things/t3")).await.unwrap();
    }

    #[tokio::test]
    async fn post_returns_location_result() {
        let server = MockServer::start().await;
        let monitor = format!("{}/monitors/run1", server.uri());
        Mock::given(method("POST"))
            .and(path("/things/t4/run"))
            .respond_with(ResponseTemplate::new(202).insert_header("Location", monitor.as_str()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/monitors/run1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "output"})))
            .mount(&server)
            .await;

        let c = mock_client(&server);
        let got: Thing = c
            .post_json(&c.arm_url("/things/t4/run"), &json!({"script": []}))
            .await
            .unwrap();
        assert_eq!(got.name, "output");
    }

    #[tokio::test]
    async fn put_polls_provisioning_state() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/things/t5"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "name": "t5", "properties": {"provisioningState": "Creating"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/things/t5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "t5", "properties": {"provisioningState": "Succeeded"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let c = mock_client(&server);
        let got: Thing = c.put_json(&c.arm_url("/things/t5"), &json!({})).await.unwrap();
        assert_eq!(got.name, "t5");
    }

    #[tokio::test]
    async fn synchronous_put_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/things/t6"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "t6", "properties": {"provisioningState": "Succeeded"}
            })))
            .mount(&server)
            .await;

        let c = mock_client(&server);
        let got: Thing = c.put_json(&c.arm_url("/things/t6"), &json!({})).await.unwrap();
        assert_eq!(got.name, "t6");
    }
}
