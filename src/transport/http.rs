//! HTTP transport for the service's JSON protocol
//!
//! Every action is a `POST {service_url}/api_v3/service/{service}/action/{action}`
//! with the parameters as a JSON object. Failures come back as a 200 response
//! whose body is an object with `"objectType": "KalturaAPIException"`.

use super::Transport;
use crate::config::ClientConfig;
use crate::error::{OvpError, OvpResult};
use crate::logging::{log_debug, log_trace};
use crate::request::ApiCall;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Instant;

/// API version advertised on every call
pub const API_VERSION: &str = "3.3.0";

/// Response format selector for JSON
const FORMAT_JSON: i64 = 1;

const API_EXCEPTION_TYPE: &str = "KalturaAPIException";

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpTransport {
    /// Create a transport for the configured service
    ///
    /// # Errors
    ///
    /// Returns [`OvpError::ConfigurationError`] if the configuration is invalid
    /// or the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig) -> OvpResult<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(Self::default_headers())
            .build()
            .map_err(|e| {
                OvpError::configuration_error(format!("Failed to build HTTP client: {e}"))
            })?;

        log_debug!(
            transport = "http",
            service_url = %config.service_url,
            request_timeout_ms = config.request_timeout.as_millis() as u64,
            "HTTP transport initialized"
        );

        Ok(Self { client, config })
    }

    pub fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Request body: action parameters plus the protocol fields
    pub fn request_body(call: &ApiCall) -> Value {
        let mut body = call.params.clone();
        body.insert("format".to_string(), Value::from(FORMAT_JSON));
        body.insert("apiVersion".to_string(), Value::from(API_VERSION));
        Value::Object(body)
    }

    fn map_send_error(&self, error: reqwest::Error) -> OvpError {
        if error.is_timeout() {
            return OvpError::timeout(self.config.request_timeout);
        }
        OvpError::request_failed(
            format!("HTTP request failed: {error}"),
            Some(Box::new(error)),
        )
    }
}

/// Decode a response body, turning service exceptions into errors
///
/// An empty body (void actions such as `delete`) decodes to `null`.
pub fn parse_response_body(status: StatusCode, body: &str) -> OvpResult<Value> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(OvpError::authentication_failed(format!("HTTP {status}: {body}")));
    }
    if !status.is_success() {
        return Err(OvpError::request_failed(
            format!("HTTP {status}: {body}"),
            None,
        ));
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }

    let value: Value = serde_json::from_str(trimmed)
        .map_err(|e| OvpError::response_parsing_error(format!("Invalid JSON body: {e}")))?;

    if let Some(object) = value.as_object() {
        if object.get("objectType").and_then(Value::as_str) == Some(API_EXCEPTION_TYPE) {
            let code = object
                .get("code")
                .and_then(Value::as_str)
                .unwrap_or("UNKNOWN");
            let message = object
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default();
            return Err(OvpError::api(code, message));
        }
    }

    Ok(value)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, call: &ApiCall) -> OvpResult<Value> {
        let url = self.config.action_url(&call.service, &call.action);
        let body = Self::request_body(call);

        log_trace!(
            request_id = %call.request_id,
            url = %url,
            body = %body,
            "Sending service request"
        );

        let started = Instant::now();
        let response = self
            .client
            .post(&url)
            .header("X-Request-Id", call.request_id.to_string())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.map_send_error(e))?;

        log_debug!(
            request_id = %call.request_id,
            endpoint = %call.endpoint(),
            status = status.as_u16(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Service response received"
        );

        parse_response_body(status, &text)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
