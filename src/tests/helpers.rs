// Test helper utilities shared by the unit test modules
//
// IMPORTANT: These helpers are test-only and should NEVER be used in production code.

#![allow(dead_code)]

use crate::config::{ClientConfig, HarnessConfig};
use crate::harness::TestCase;
use crate::transport::MemoryTransport;
use std::sync::Arc;
use std::time::Duration;

pub const TEST_PARTNER_ID: i64 = 1234;
pub const TEST_ADMIN_SECRET: &str = "test-admin-secret";
pub const TEST_USER_SECRET: &str = "test-user-secret";

/// Client configuration pointing at a placeholder URL, with both secrets set
pub fn create_test_client_config() -> ClientConfig {
    ClientConfig {
        service_url: "http://localhost:8080".to_string(),
        partner_id: TEST_PARTNER_ID,
        admin_secret: Some(TEST_ADMIN_SECRET.to_string()),
        user_secret: Some(TEST_USER_SECRET.to_string()),
        user_id: "harness-user".to_string(),
        session_expiry: Duration::from_secs(3_600),
        client_tag: "rust:ovp-client-tests".to_string(),
        request_timeout: Duration::from_secs(5),
    }
}

/// Harness configuration with short bounds so a broken chain fails fast
pub fn create_test_harness_config() -> HarnessConfig {
    HarnessConfig {
        client: create_test_client_config(),
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

/// Test case over a fresh in-memory service; returns the transport too so
/// tests can inspect what the service received
pub fn create_memory_test_case(name: &str) -> (TestCase, Arc<MemoryTransport>) {
    let transport = create_memory_transport();
    let case = TestCase::new(name, create_test_harness_config(), transport.clone())
        .expect("test harness config should be valid");
    (case, transport)
}
