//! Full flows through the `Azure` entry point against a mocked ARM endpoint.

use azfluent::prelude::*;
use azfluent::sql::DatabaseEdition;
use azfluent_core::test_utils::mock_config;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN_PATH: &str = "/tid/oauth2/v2.0/token";

fn azure(server: &MockServer) -> Azure {
    Azure::configure()
        .with_config(mock_config(server))
        .authenticate(AzureCredentials::new("cid", "secret", "tid", "sub1"))
}

async fn mount_token(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "arm-token", "token_type": "Bearer", "expires_in": 3600
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn token_is_acquired_once_and_shared_across_subscriptions() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    for sub in ["sub1", "sub2"] {
        Mock::given(method("GET"))
            .and(path(format!("/subscriptions/{sub}/resourcegroups")))
            .and(header("authorization", "Bearer arm-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": [
                {"id": format!("/subscriptions/{sub}/resourceGroups/rg-{sub}"), "name": format!("rg-{sub}"), "location": "eastus"}
            ]})))
            .expect(1)
            .mount(&server)
            .await;
    }

    let azure = azure(&server);
    assert!(!azure.is_authenticated().await);
    let groups = azure.resource_groups().list().await.unwrap();
    assert_eq!(groups[0].name(), "rg-sub1");
    assert!(azure.is_authenticated().await);

    let other = azure.with_subscription("sub2");
    assert_eq!(other.subscription_id().unwrap(), "sub2");
    let groups = other.resource_groups().list().await.unwrap();
    assert_eq!(groups[0].name(), "rg-sub2");
}

#[tokio::test]
async fn rejected_credentials_surface_as_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_client", "error_description": "AADSTS7000215: Invalid client secret provided."
        })))
        .mount(&server)
        .await;

    let err = azure(&server).storage_accounts().list().await.unwrap_err();
    assert_eq!(err.kind, AzureErrorKind::Auth);
}

#[tokio::test]
async fn sql_server_with_pool_in_new_resource_group() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    let rg_path = "/subscriptions/sub1/resourceGroups/rg-data";
    let srv_path = format!("{rg_path}/providers/Microsoft.Sql/servers/orders-sql");

    Mock::given(method("PUT"))
        .and(path(rg_path))
        .and(body_json(json!({"location": "westus2"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"name": "rg-data", "location": "westus2"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(srv_path.as_str()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": srv_path, "name": "orders-sql", "location": "westus2",
            "properties": {"administratorLogin": "sqladmin", "fullyQualifiedDomainName": "orders-sql.database.windows.net"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("{srv_path}/firewallRules/AllowAllWindowsAzureIps")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "AllowAllWindowsAzureIps"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("{srv_path}/elasticPools/orders-pool")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"name": "orders-pool"})))
        .expect(1)
        .mount(&server)
        .await;

    let server_def = azure(&server)
        .sql_servers()
        .define("orders-sql")
        .with_region(Region::US_WEST2)
        .with_new_resource_group("rg-data")
        .with_administrator_login("sqladmin")
        .with_administrator_password("S3cure!pass")
        .with_new_elastic_pool("orders-pool", DatabaseEdition::Standard);
    let created = server_def.create().await.unwrap();
    assert_eq!(created.fully_qualified_domain_name(), Some("orders-sql.database.windows.net"));
    assert_eq!(created.resource_group_name(), "rg-data");
}

#[tokio::test]
async fn auth_file_points_at_its_own_cloud() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/subscriptions/sub-file/providers/Microsoft.ServiceFabric/clusters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": []})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("azure.auth");
    std::fs::write(
        &file,
        json!({
            "clientId": "cid", "clientSecret": "secret", "tenantId": "tid", "subscriptionId": "sub-file",
            "activeDirectoryEndpointUrl": server.uri(), "resourceManagerEndpointUrl": server.uri()
        })
        .to_string(),
    )
    .unwrap();

    let azure = Azure::configure()
        .with_config(mock_config(&server))
        .authenticate_file(&file)
        .unwrap();
    assert_eq!(azure.subscription_id().unwrap(), "sub-file");
    assert!(azure.service_fabric_clusters().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn validation_fails_before_any_request() {
    let server = MockServer::start().await;
    let azure = azure(&server);

    let err = azure
        .virtual_machines()
        .get_by_resource_group("", "vm1")
        .await
        .unwrap_err();
    assert_eq!(err.kind, AzureErrorKind::Validation);

    let err = azure.kubernetes_clusters().get_by_resource_group("rg1", "").await.unwrap_err();
    assert_eq!(err.kind, AzureErrorKind::Validation);
    assert!(server.received_requests().await.unwrap().is_empty());
}
