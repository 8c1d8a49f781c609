//! Test helper utilities for ovp-client integration tests
//!
//! This module provides reusable fixtures shared by the integration test
//! files: configurations, test cases over the in-memory service, and
//! wiremock response bodies in the service's wire format.
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

// Allow dead code in test utilities - functions are used across different test files
#![allow(dead_code)]

use ovp_client::config::{ClientConfig, HarnessConfig};
use ovp_client::harness::TestCase;
use ovp_client::transport::MemoryTransport;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::ResponseTemplate;

pub const TEST_PARTNER_ID: i64 = 4321;
pub const TEST_ADMIN_SECRET: &str = "integration-admin-secret";
pub const TEST_USER_SECRET: &str = "integration-user-secret";

/// Create a client configuration pointing at `service_url`
///
/// Both secrets are set and timeouts are short so a broken test fails fast.
pub fn create_test_client_config(service_url: &str) -> ClientConfig {
    ClientConfig {
        service_url: service_url.to_string(),
        partner_id: TEST_PARTNER_ID,
        admin_secret: Some(TEST_ADMIN_SECRET.to_string()),
        user_secret: Some(TEST_USER_SECRET.to_string()),
        user_id: "integration-user".to_string(),
        session_expiry: Duration::from_secs(3_600),
        client_tag: "rust:ovp-client-integration".to_string(),
        request_timeout: Duration::from_secs(2),
    }
}

/// Harness configuration with short gate and teardown bounds
pub fn create_test_harness_config(service_url: &str) -> HarnessConfig {
    HarnessConfig {
        client: create_test_client_config(service_url),
        do_cleanup: true,
        gate_timeout: Duration::from_secs(5),
        teardown_timeout: Duration::from_secs(5),
    }
}

pub fn create_memory_transport() -> Arc<MemoryTransport> {
    Arc::new(MemoryTransport::new(
        TEST_PARTNER_ID,
        TEST_ADMIN_SECRET,
        TEST_USER_SECRET,
    ))
}

/// Create a test case over a fresh in-memory service
///
/// Must be called inside a tokio runtime. The transport is returned as well
/// so tests can inspect what reached the service.
pub fn create_memory_test_case(name: &str) -> (TestCase, Arc<MemoryTransport>) {
    let transport = create_memory_transport();
    let case = TestCase::new(
        name,
        create_test_harness_config("http://localhost:8080"),
        transport.clone(),
    )
    .expect("test harness config should be valid");
    (case, transport)
}

// ============================================================================
// Wire Format Fixtures (for HTTP tests with wiremock)
// ============================================================================

/// UiConf object as the service returns it
pub fn ui_conf_body(id: i64, name: &str) -> Value {
    json!({
        "objectType": "KalturaUiConf",
        "id": id,
        "partnerId": TEST_PARTNER_ID,
        "name": name,
        "description": "Ui conf unit test",
        "width": 750,
        "height": 373,
        "confFile": "NON_EXISTING_CONF_FILE",
        "creationMode": 3,
        "version": "1",
        "createdAt": 1_790_000_000,
        "updatedAt": 1_790_000_000
    })
}

/// Service exception body
pub fn api_exception_body(code: &str, message: &str) -> Value {
    json!({
        "objectType": "KalturaAPIException",
        "code": code,
        "message": message,
        "args": []
    })
}

/// 200 response carrying a JSON body
pub fn json_response(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

/// Path of an action endpoint
pub fn action_path(service: &str, action: &str) -> String {
    format!("/api_v3/service/{service}/action/{action}")
}
