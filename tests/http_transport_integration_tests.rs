//! Integration Tests for the HTTP Transport
//!
//! UNIT UNDER TEST: HttpTransport, driven through OvpClient and RequestExecutor
//!
//! BUSINESS RESPONSIBILITY:
//!   - POST every action to its service/action endpoint with the protocol
//!     fields, the session token and a request id header
//!   - Map service exceptions to typed errors (not-found, authentication)
//!   - Map HTTP-level failures and malformed bodies to typed errors
//!   - Bound every request by the configured timeout
//!
//! TEST COVERAGE:
//!   - session.start request shape and token handling
//!   - Full create/fetch/delete/verify lifecycle over HTTP
//!   - Exception codes, 401/500 statuses, invalid JSON, empty bodies
//!   - Request timeout

mod common;

use common::*;
use ovp_client::error::OvpError;
use ovp_client::harness::{LifecycleScenario, LifecycleState, TestCase};
use ovp_client::services::UiConfService;
use ovp_client::transport::HttpTransport;
use ovp_client::{OvpClient, RequestExecutor};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helper Functions
// ============================================================================

fn create_http_case(mock_server: &MockServer, name: &str) -> TestCase {
    let config = create_test_harness_config(&mock_server.uri());
    let transport = HttpTransport::new(config.client.clone()).expect("valid transport config");
    TestCase::new(name, config, Arc::new(transport)).expect("valid harness config")
}

async fn mount_session_start(mock_server: &MockServer, ks: &str) {
    Mock::given(method("POST"))
        .and(path(action_path("session", "start")))
        .respond_with(json_response(json!(ks)))
        .mount(mock_server)
        .await;
}

fn create_session_client(mock_server: &MockServer) -> OvpClient {
    let client = OvpClient::with_http(create_test_client_config(&mock_server.uri()))
        .expect("valid client config");
    client.set_ks("ks-integration");
    client
}

// ============================================================================
// Request Shape Tests
// ============================================================================

#[tokio::test]
async fn test_session_start_sends_credentials_and_protocol_fields() {
    // Test that session.start carries the role's secret and the protocol
    // fields, and that the returned token is stored on the client

    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(action_path("session", "start")))
        .and(header("content-type", "application/json"))
        .and(header_exists("X-Request-Id"))
        .and(body_partial_json(json!({
            "secret": TEST_ADMIN_SECRET,
            "type": 2,
            "partnerId": TEST_PARTNER_ID,
            "userId": "integration-user",
            "format": 1,
            "apiVersion": "3.3.0",
            "clientTag": "rust:ovp-client-integration"
        })))
        .respond_with(json_response(json!("ks-from-server")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let case = create_http_case(&mock_server, "test_session_start");

    let ks = case.start_admin_session().await.expect("session should start");

    assert_eq!(ks, "ks-from-server");
    assert_eq!(case.client().ks().as_deref(), Some("ks-from-server"));
}

#[tokio::test]
async fn test_requests_carry_session_token() {
    let mock_server = MockServer::start().await;
    mount_session_start(&mock_server, "ks-abc").await;
    Mock::given(method("POST"))
        .and(path(action_path("uiconf", "get")))
        .and(body_partial_json(json!({ "ks": "ks-abc", "id": 5 })))
        .respond_with(json_response(ui_conf_body(5, "carried")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let case = create_http_case(&mock_server, "test_ks_carried");
    case.start_admin_session().await.unwrap();

    let fetched = case
        .executor()
        .execute(case.client(), UiConfService::get(5))
        .await
        .expect("get should succeed");

    assert_eq!(fetched.id, Some(5));
    assert_eq!(fetched.name.as_deref(), Some("carried"));
}

// ============================================================================
// Lifecycle Tests
// ============================================================================

#[tokio::test]
async fn test_lifecycle_over_http() {
    // Test the full create/fetch/delete/verify sequence against a mock
    // service; the second get answers with the not-found exception

    let mock_server = MockServer::start().await;
    mount_session_start(&mock_server, "ks-lifecycle").await;
    Mock::given(method("POST"))
        .and(path(action_path("uiconf", "add")))
        .and(body_partial_json(json!({
            "uiConf": {
                "objectType": "KalturaUiConf",
                "width": 750,
                "height": 373,
                "creationMode": 3,
                "confFile": "NON_EXISTING_CONF_FILE"
            }
        })))
        .respond_with(json_response(ui_conf_body(901, "lifecycle")))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(action_path("uiconf", "get")))
        .respond_with(json_response(ui_conf_body(901, "lifecycle")))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(action_path("uiconf", "get")))
        .respond_with(json_response(api_exception_body(
            "UICONF_ID_NOT_FOUND",
            "Ui conf id [901] not found",
        )))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(action_path("uiconf", "delete")))
        .and(body_partial_json(json!({ "id": 901 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let case = create_http_case(&mock_server, "test_lifecycle_http");
    case.start_admin_session().await.unwrap();
    let resources = case.resources();

    let report = LifecycleScenario::new(&resources, case.registry(), "lifecycle")
        .run()
        .await
        .expect("lifecycle should verify");

    assert_eq!(report.state, LifecycleState::Verified);
    assert_eq!(report.id, Some(901));
    let teardown = case.tear_down().await;
    assert!(teardown.drain.attempted.is_empty(), "Nothing left to clean up");
}

#[tokio::test]
async fn test_teardown_deletes_leftovers_over_http() {
    let mock_server = MockServer::start().await;
    mount_session_start(&mock_server, "ks-teardown").await;
    Mock::given(method("POST"))
        .and(path(action_path("uiconf", "add")))
        .respond_with(json_response(ui_conf_body(333, "leftover")))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(action_path("uiconf", "delete")))
        .and(body_partial_json(json!({ "id": 333, "ks": "ks-teardown" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let case = create_http_case(&mock_server, "test_teardown_http");
    case.start_admin_session().await.unwrap();
    case.add_ui_conf("leftover", |_| {});

    let report = case.tear_down().await;

    assert_eq!(report.drain.attempted, vec![333]);
    assert!(report.drain.failed.is_empty());
}

// ============================================================================
// Error Mapping Tests
// ============================================================================

#[tokio::test]
async fn test_not_found_exception_is_typed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(action_path("uiconf", "get")))
        .respond_with(json_response(api_exception_body(
            "UICONF_ID_NOT_FOUND",
            "Ui conf id [1] not found",
        )))
        .mount(&mock_server)
        .await;
    let client = create_session_client(&mock_server);
    let executor = RequestExecutor::for_client(&client).unwrap();

    let result = executor.execute(&client, UiConfService::get(1)).await;

    match result {
        Err(OvpError::NotFound { code, message }) => {
            assert_eq!(code, "UICONF_ID_NOT_FOUND");
            assert_eq!(message, "Ui conf id [1] not found");
        }
        other => panic!("Expected NotFound, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_ks_exception_is_authentication_failure() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(action_path("uiconf", "get")))
        .respond_with(json_response(api_exception_body("INVALID_KS", "Invalid KS")))
        .mount(&mock_server)
        .await;
    let client = create_session_client(&mock_server);
    let executor = RequestExecutor::for_client(&client).unwrap();

    let result = executor.execute(&client, UiConfService::get(1)).await;

    assert!(
        matches!(result, Err(OvpError::AuthenticationFailed { .. })),
        "Expected AuthenticationFailed, got: {result:?}"
    );
}

#[tokio::test]
async fn test_other_exception_keeps_code() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(action_path("uiconf", "add")))
        .respond_with(json_response(api_exception_body(
            "PROPERTY_VALIDATION_CANNOT_BE_NULL",
            "The property \"KalturaUiConf::creationMode\" cannot be null",
        )))
        .mount(&mock_server)
        .await;
    let client = create_session_client(&mock_server);
    let executor = RequestExecutor::for_client(&client).unwrap();

    let result = executor
        .execute(&client, UiConfService::add(&UiConfService::test_template("x")))
        .await;

    assert!(matches!(
        result,
        Err(OvpError::Api { ref code, .. }) if code == "PROPERTY_VALIDATION_CANNOT_BE_NULL"
    ));
}

#[tokio::test]
async fn test_http_status_errors() {
    // Test that 401 maps to an authentication failure and 500 to a request
    // failure

    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(action_path("uiconf", "get")))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(action_path("uiconf", "list")))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;
    let client = create_session_client(&mock_server);
    let executor = RequestExecutor::for_client(&client).unwrap();

    let unauthorized = executor.execute(&client, UiConfService::get(1)).await;
    let server_error = executor.execute(&client, UiConfService::list(None)).await;

    assert!(matches!(unauthorized, Err(OvpError::AuthenticationFailed { .. })));
    assert!(matches!(server_error, Err(OvpError::RequestFailed { .. })));
}

#[tokio::test]
async fn test_invalid_json_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(action_path("uiconf", "get")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;
    let client = create_session_client(&mock_server);
    let executor = RequestExecutor::for_client(&client).unwrap();

    let result = executor.execute(&client, UiConfService::get(1)).await;

    assert!(matches!(result, Err(OvpError::ResponseParsingError { .. })));
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(action_path("uiconf", "get")))
        .respond_with(
            json_response(ui_conf_body(1, "slow")).set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;
    let mut config = create_test_client_config(&mock_server.uri());
    config.request_timeout = Duration::from_millis(200);
    let client = OvpClient::with_http(config).unwrap();
    client.set_ks("ks-integration");
    let executor = RequestExecutor::for_client(&client).unwrap();

    let result = executor.execute(&client, UiConfService::get(1)).await;

    assert!(
        matches!(result, Err(OvpError::Timeout { .. })),
        "Expected Timeout, got: {result:?}"
    );
}

#[tokio::test]
async fn test_unreachable_service_is_request_failure() {
    // Nothing listens on this port
    let client = OvpClient::with_http(create_test_client_config("http://127.0.0.1:9")).unwrap();
    client.set_ks("ks-integration");
    let executor = RequestExecutor::for_client(&client).unwrap();

    let result = executor.execute(&client, UiConfService::get(1)).await;

    assert!(
        matches!(result, Err(OvpError::RequestFailed { .. }) | Err(OvpError::Timeout { .. })),
        "Expected a transport failure, got: {result:?}"
    );
}
