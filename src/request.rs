//! Request building and completion callbacks
//!
//! A [`RequestBuilder`] describes one service action and carries an optional
//! [`OnCompletion`] callback. Building it against an [`OvpClient`] captures
//! the session token and client tag and yields a type-erased [`BuiltRequest`]
//! that the [`RequestExecutor`](crate::executor::RequestExecutor) can queue.
//!
//! Every built request completes exactly once. Problems detected while
//! building (no session, unserializable parameters) do not stop the request
//! from being queued; they are delivered through the same callback instead.

use crate::client::OvpClient;
use crate::error::{OvpError, OvpResult};
use crate::logging::log_debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::marker::PhantomData;
use uuid::Uuid;

/// One-shot handler receiving either the decoded value or an error
pub type OnCompletion<T> = Box<dyn FnOnce(OvpResult<T>) + Send + 'static>;

/// Completion after type erasure, fed with the raw JSON result
pub(crate) type RawCompletion = Box<dyn FnOnce(OvpResult<Value>) + Send + 'static>;

/// A single service action as sent over a transport
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCall {
    pub request_id: Uuid,
    pub service: String,
    pub action: String,
    pub params: Map<String, Value>,
}

impl ApiCall {
    pub fn new(service: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            service: service.into(),
            action: action.into(),
            params: Map::new(),
        }
    }

    /// `service.action`, as used in logs
    pub fn endpoint(&self) -> String {
        format!("{}.{}", self.service, self.action)
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    pub fn ks(&self) -> Option<&str> {
        self.params.get("ks").and_then(Value::as_str)
    }
}

/// Typed description of a service action awaiting a client to build against
pub struct RequestBuilder<T> {
    service: String,
    action: String,
    params: Map<String, Value>,
    requires_session: bool,
    invalid_param: Option<String>,
    completion: Option<OnCompletion<T>>,
    _response: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for RequestBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("service", &self.service)
            .field("action", &self.action)
            .field("params", &self.params)
            .field("requires_session", &self.requires_session)
            .field("has_completion", &self.completion.is_some())
            .finish()
    }
}

impl<T> RequestBuilder<T>
where
    T: DeserializeOwned + Send + 'static,
{
    pub fn new(service: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            action: action.into(),
            params: Map::new(),
            requires_session: true,
            invalid_param: None,
            completion: None,
            _response: PhantomData,
        }
    }

    /// Add an action parameter. A value that cannot be serialized fails the
    /// request at completion time.
    pub fn param(mut self, key: &str, value: impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.params.insert(key.to_string(), value);
            }
            Err(e) => {
                self.invalid_param = Some(format!("parameter '{key}' could not be encoded: {e}"));
            }
        }
        self
    }

    /// Mark the action as callable without a session (e.g. `session.start`)
    pub fn without_session(mut self) -> Self {
        self.requires_session = false;
        self
    }

    /// Attach the completion callback, replacing any previous one
    pub fn set_completion<F>(mut self, completion: F) -> Self
    where
        F: FnOnce(OvpResult<T>) + Send + 'static,
    {
        self.completion = Some(Box::new(completion));
        self
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Bind the request to a client's session and erase its response type
    pub fn build(self, client: &OvpClient) -> BuiltRequest {
        let mut call = ApiCall::new(self.service, self.action);
        call.params = self.params;
        call.params.insert(
            "clientTag".to_string(),
            Value::String(client.config().client_tag.clone()),
        );

        let mut rejected = self.invalid_param.map(|message| {
            OvpError::configuration_error(format!("{}: {message}", call.endpoint()))
        });

        match client.ks() {
            Some(ks) => {
                call.params.insert("ks".to_string(), Value::String(ks));
            }
            None if self.requires_session && rejected.is_none() => {
                rejected = Some(OvpError::session_required(&call.service, &call.action));
            }
            None => {}
        }

        let completion = erase(call.request_id, self.completion);

        BuiltRequest {
            call,
            rejected,
            completion,
        }
    }
}

/// Wrap a typed completion so it can be fed the raw JSON result
fn erase<T>(request_id: Uuid, completion: Option<OnCompletion<T>>) -> RawCompletion
where
    T: DeserializeOwned + Send + 'static,
{
    Box::new(move |raw: OvpResult<Value>| {
        let typed = raw.and_then(|value| {
            serde_json::from_value::<T>(value).map_err(|e| {
                OvpError::response_parsing_error(format!(
                    "request {request_id}: unexpected response shape: {e}"
                ))
            })
        });

        match completion {
            Some(completion) => completion(typed),
            None => {
                log_debug!(
                    request_id = %request_id,
                    success = typed.is_ok(),
                    "Request completed without a completion handler"
                );
            }
        }
    })
}

/// A request bound to a session, ready to be queued
pub struct BuiltRequest {
    call: ApiCall,
    rejected: Option<OvpError>,
    completion: RawCompletion,
}

impl std::fmt::Debug for BuiltRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltRequest")
            .field("call", &self.call)
            .field("rejected", &self.rejected)
            .finish_non_exhaustive()
    }
}

impl BuiltRequest {
    pub fn call(&self) -> &ApiCall {
        &self.call
    }

    pub fn request_id(&self) -> Uuid {
        self.call.request_id
    }

    /// Error the request will complete with without reaching the transport
    pub fn rejection(&self) -> Option<&OvpError> {
        self.rejected.as_ref()
    }

    pub(crate) fn into_parts(self) -> (ApiCall, Option<OvpError>, RawCompletion) {
        (self.call, self.rejected, self.completion)
    }
}
