//! Error types for service calls and harness orchestration.
//!
//! [`OvpError`] covers both halves of the crate:
//! - API-level failures delivered through a completion result (service
//!   exceptions, not-found, authentication, transport problems)
//! - harness defects that would otherwise hang or hide a test outcome (gate
//!   timeouts, abandoned gates, failed lifecycle scenarios)
//!
//! # Error Handling Example
//!
//! ```rust
//! use ovp_client::{OvpError, error::ErrorCategory};
//!
//! fn describe(err: &OvpError) -> &'static str {
//!     if err.is_not_found() {
//!         return "resource is gone";
//!     }
//!     match err.category() {
//!         ErrorCategory::Transient => "try again later",
//!         ErrorCategory::Client => "fix the request",
//!         _ => "investigate",
//!     }
//! }
//! ```

use crate::logging::{log_error, log_info, log_warn};
use std::time::Duration;
use thiserror::Error;

/// Exception codes the service uses to reject a session
const AUTH_ERROR_CODES: &[&str] = &[
    "INVALID_KS",
    "EXPIRED_KS",
    "MISSING_KS",
    "SERVICE_FORBIDDEN",
    "START_SESSION_ERROR",
];

// ============================================================================
// Error categorization types
// ============================================================================

/// High-level categorization of errors for routing and handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Expected outcomes such as fetching a deleted resource.
    BusinessLogic,

    /// The remote service or the network had an issue.
    External,

    /// Harness or client defect (callback never fired, invariant broken).
    Internal,

    /// The caller can fix it: configuration, credentials, missing session.
    Client,

    /// Temporary failures such as timeouts.
    Transient,
}

/// Severity level for logging and alerting decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// A test run can no longer be trusted.
    Critical,
    /// Action failed but the harness is stable.
    Error,
    /// Unexpected but recoverable.
    Warning,
    /// Expected failure (e.g. not found).
    Info,
}

/// Convenient result type for client and harness operations.
///
/// This is the completion result handed to every callback: exactly one of a
/// value or an error.
pub type OvpResult<T> = std::result::Result<T, OvpError>;

/// Errors that can occur while talking to the service or orchestrating a test.
///
/// Use the constructor methods, which log the error at the matching level:
///
/// ```rust
/// use ovp_client::OvpError;
///
/// let err = OvpError::not_found("UICONF_ID_NOT_FOUND", "Ui conf id [42] not found");
/// assert!(err.is_not_found());
/// ```
///
/// | Variant | Category |
/// |---------|----------|
/// | `ConfigurationError` | Client |
/// | `RequestFailed` | External |
/// | `ResponseParsingError` | External |
/// | `Timeout` | Transient |
/// | `FlushTimeout` | Transient |
/// | `AuthenticationFailed` | Client |
/// | `SessionRequired` | Client |
/// | `Api` | External |
/// | `NotFound` | BusinessLogic |
/// | `GateTimeout` | Internal |
/// | `GateAbandoned` | Internal |
/// | `GateFailed` | BusinessLogic |
/// | `ScenarioFailed` | BusinessLogic |
#[derive(Error, Debug)]
pub enum OvpError {
    /// Client or harness configuration is invalid or incomplete.
    #[error("Configuration error: {message}")]
    ConfigurationError {
        /// Description of the configuration problem.
        message: String,
    },

    /// The HTTP exchange with the service failed.
    #[error("Request failed: {message}")]
    RequestFailed {
        /// Description of the failure.
        message: String,
        /// The underlying error, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The service answered but the body could not be decoded.
    #[error("Response parsing failed: {message}")]
    ResponseParsingError {
        /// Details about the parsing failure.
        message: String,
    },

    /// A single request exceeded its timeout.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout that was exceeded.
        timeout_ms: u64,
    },

    /// The executor was still running requests when a flush gave up.
    #[error("Executor flush timed out after {timeout_ms}ms with {pending} in flight")]
    FlushTimeout {
        /// Requests left running detached.
        pending: usize,
        /// The flush bound that elapsed.
        timeout_ms: u64,
    },

    /// The service rejected the credentials or the session.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// Details about the authentication failure.
        message: String,
    },

    /// A call needing a session was built before one was started.
    #[error("No active session for {service}.{action}")]
    SessionRequired {
        /// Service of the rejected call.
        service: String,
        /// Action of the rejected call.
        action: String,
    },

    /// The service returned an API exception.
    #[error("API exception {code}: {message}")]
    Api {
        /// Service error code, e.g. `INVALID_KS`.
        code: String,
        /// Human-readable message from the service.
        message: String,
    },

    /// The requested object does not exist (or was deleted).
    #[error("Not found ({code}): {message}")]
    NotFound {
        /// Service error code, e.g. `UICONF_ID_NOT_FOUND`.
        code: String,
        /// Human-readable message from the service.
        message: String,
    },

    /// A gate was not released before its wait bound.
    #[error("Completion gate '{label}' not released within {timeout_ms}ms")]
    GateTimeout {
        /// Gate label used in logs.
        label: String,
        /// The wait bound that elapsed.
        timeout_ms: u64,
    },

    /// The gate signal was dropped without being released, usually because a
    /// completion callback returned early or panicked.
    #[error("Completion gate '{label}' was abandoned without a release")]
    GateAbandoned {
        /// Gate label used in logs.
        label: String,
    },

    /// The chain signalled completion with a failure.
    #[error("Completion gate '{label}' failed: {reason}")]
    GateFailed {
        /// Gate label used in logs.
        label: String,
        /// Reason passed by the callback.
        reason: String,
    },

    /// A lifecycle scenario stopped before reaching its final state.
    #[error("Scenario failed after reaching {state}: {message}")]
    ScenarioFailed {
        /// Last state the scenario reached.
        state: String,
        /// What went wrong on the next transition.
        message: String,
    },
}

impl OvpError {
    /// Get the error category for routing and handling decisions.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigurationError { .. } => ErrorCategory::Client,
            Self::RequestFailed { .. } => ErrorCategory::External,
            Self::ResponseParsingError { .. } => ErrorCategory::External,
            Self::Timeout { .. } => ErrorCategory::Transient,
            Self::FlushTimeout { .. } => ErrorCategory::Transient,
            Self::AuthenticationFailed { .. } => ErrorCategory::Client,
            Self::SessionRequired { .. } => ErrorCategory::Client,
            Self::Api { .. } => ErrorCategory::External,
            Self::NotFound { .. } => ErrorCategory::BusinessLogic,
            Self::GateTimeout { .. } => ErrorCategory::Internal,
            Self::GateAbandoned { .. } => ErrorCategory::Internal,
            Self::GateFailed { .. } => ErrorCategory::BusinessLogic,
            Self::ScenarioFailed { .. } => ErrorCategory::BusinessLogic,
        }
    }

    /// Get the error severity for logging and alerting.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ConfigurationError { .. } => ErrorSeverity::Error,
            Self::RequestFailed { .. } => ErrorSeverity::Error,
            Self::ResponseParsingError { .. } => ErrorSeverity::Warning,
            Self::Timeout { .. } => ErrorSeverity::Warning,
            Self::FlushTimeout { .. } => ErrorSeverity::Warning,
            Self::AuthenticationFailed { .. } => ErrorSeverity::Error,
            Self::SessionRequired { .. } => ErrorSeverity::Error,
            Self::Api { .. } => ErrorSeverity::Warning,
            Self::NotFound { .. } => ErrorSeverity::Info,
            Self::GateTimeout { .. } => ErrorSeverity::Critical,
            Self::GateAbandoned { .. } => ErrorSeverity::Critical,
            Self::GateFailed { .. } => ErrorSeverity::Error,
            Self::ScenarioFailed { .. } => ErrorSeverity::Error,
        }
    }

    /// Whether this is the not-found class of error a fetch of a missing or
    /// deleted object produces.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether the error points at a harness defect rather than a service
    /// outcome.
    pub fn is_harness_defect(&self) -> bool {
        matches!(self.category(), ErrorCategory::Internal)
    }

    // =========================================================================
    // Constructor methods with automatic logging
    // =========================================================================

    pub fn configuration_error(message: impl Into<String>) -> Self {
        let message = message.into();
        log_error!(
            error_type = "configuration_error",
            message = %message,
            "Client configuration validation failed"
        );
        Self::ConfigurationError { message }
    }

    pub fn request_failed(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        let message = message.into();
        log_error!(
            error_type = "request_failed",
            message = %message,
            has_source = source.is_some(),
            "Service request failed"
        );
        Self::RequestFailed { message, source }
    }

    pub fn response_parsing_error(message: impl Into<String>) -> Self {
        let message = message.into();
        log_warn!(
            error_type = "response_parsing_error",
            message = %message,
            "Service response format invalid"
        );
        Self::ResponseParsingError { message }
    }

    pub fn timeout(timeout: Duration) -> Self {
        let timeout_ms = timeout.as_millis() as u64;
        log_warn!(
            error_type = "timeout",
            timeout_ms = timeout_ms,
            "Service request timed out"
        );
        Self::Timeout { timeout_ms }
    }

    pub fn flush_timeout(pending: usize, timeout: Duration) -> Self {
        let timeout_ms = timeout.as_millis() as u64;
        log_warn!(
            error_type = "flush_timeout",
            pending = pending,
            timeout_ms = timeout_ms,
            "Executor flush timed out with requests still in flight"
        );
        Self::FlushTimeout {
            pending,
            timeout_ms,
        }
    }

    pub fn authentication_failed(message: impl Into<String>) -> Self {
        let message = message.into();
        log_error!(
            error_type = "authentication_failed",
            message = %message,
            "Service authentication failed"
        );
        Self::AuthenticationFailed { message }
    }

    pub fn session_required(service: impl Into<String>, action: impl Into<String>) -> Self {
        let service = service.into();
        let action = action.into();
        log_error!(
            error_type = "session_required",
            service = %service,
            action = %action,
            "Request built without an active session"
        );
        Self::SessionRequired { service, action }
    }

    /// Create an API exception error. Codes ending in `_NOT_FOUND` are
    /// classified as [`OvpError::NotFound`] and session rejections as
    /// [`OvpError::AuthenticationFailed`].
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        let message = message.into();
        if code.ends_with("_NOT_FOUND") {
            return Self::not_found(code, message);
        }
        if AUTH_ERROR_CODES.contains(&code.as_str()) {
            return Self::authentication_failed(format!("{code}: {message}"));
        }
        log_warn!(
            error_type = "api_exception",
            code = %code,
            message = %message,
            "Service returned an API exception"
        );
        Self::Api { code, message }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        let message = message.into();
        log_info!(
            error_type = "not_found",
            code = %code,
            message = %message,
            "Requested object not found"
        );
        Self::NotFound { code, message }
    }

    pub fn gate_timeout(label: impl Into<String>, timeout_ms: u64) -> Self {
        let label = label.into();
        log_error!(
            error_type = "gate_timeout",
            gate = %label,
            timeout_ms = timeout_ms,
            "Completion gate never released; a callback did not fire"
        );
        Self::GateTimeout { label, timeout_ms }
    }

    pub fn gate_abandoned(label: impl Into<String>) -> Self {
        let label = label.into();
        log_error!(
            error_type = "gate_abandoned",
            gate = %label,
            "Completion gate signal dropped without release"
        );
        Self::GateAbandoned { label }
    }

    pub fn gate_failed(label: impl Into<String>, reason: impl Into<String>) -> Self {
        let label = label.into();
        let reason = reason.into();
        log_warn!(
            error_type = "gate_failed",
            gate = %label,
            reason = %reason,
            "Completion gate released with a failure"
        );
        Self::GateFailed { label, reason }
    }

    pub fn scenario_failed(state: impl Into<String>, message: impl Into<String>) -> Self {
        let state = state.into();
        let message = message.into();
        log_warn!(
            error_type = "scenario_failed",
            state = %state,
            message = %message,
            "Lifecycle scenario stopped early"
        );
        Self::ScenarioFailed { state, message }
    }
}
