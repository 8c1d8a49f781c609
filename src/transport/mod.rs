//! Transports carrying an [`ApiCall`] to the service
//!
//! - `http` - reqwest-backed transport speaking the service's JSON protocol
//! - `memory` - in-process UiConf service for offline runs and tests
//!
//! A transport returns the decoded JSON result of an action, or the
//! [`OvpError`](crate::OvpError) the service (or the wire) produced.

pub mod http;
pub mod memory;

use crate::error::OvpResult;
use crate::request::ApiCall;
use async_trait::async_trait;
use serde_json::Value;

pub use http::HttpTransport;
pub use memory::MemoryTransport;

/// Sends one call and returns its JSON result
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute the call
    ///
    /// # Errors
    ///
    /// Returns the service exception mapped to an [`OvpError`](crate::OvpError),
    /// or a transport-level failure.
    async fn send(&self, call: &ApiCall) -> OvpResult<Value>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}
