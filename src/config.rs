use crate::error::{OvpError, OvpResult};
use crate::logging::log_debug;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Connection and credential settings for the service API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the service, without the `/api_v3` suffix
    pub service_url: String,
    pub partner_id: i64,
    /// Secret used to start admin sessions
    pub admin_secret: Option<String>,
    /// Secret used to start user sessions
    pub user_secret: Option<String>,
    pub user_id: String,
    /// Lifetime requested for new sessions
    pub session_expiry: Duration,
    /// Sent with every call so the server can attribute traffic
    pub client_tag: String,
    /// Timeout for a single HTTP exchange
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service_url: "https://www.kaltura.com".to_string(),
            partner_id: 0,
            admin_secret: None,
            user_secret: None,
            user_id: String::new(),
            session_expiry: Duration::from_secs(86_400),
            client_tag: "rust:ovp-client".to_string(),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl ClientConfig {
    /// Validate the configuration is complete
    ///
    /// # Errors
    ///
    /// Returns [`OvpError::ConfigurationError`] if:
    /// - The service URL is empty or not http(s)
    /// - The partner id is not positive
    /// - The request timeout is zero
    pub fn validate(&self) -> OvpResult<()> {
        if self.service_url.is_empty() {
            return Err(OvpError::configuration_error("Service URL is required"));
        }
        if !self.service_url.starts_with("http://") && !self.service_url.starts_with("https://")
        {
            return Err(OvpError::configuration_error(format!(
                "Service URL must be http(s): {}",
                self.service_url
            )));
        }
        if self.partner_id <= 0 {
            return Err(OvpError::configuration_error(
                "Partner id must be a positive integer",
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(OvpError::configuration_error(
                "Request timeout must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Endpoint for a service action
    pub fn action_url(&self, service: &str, action: &str) -> String {
        format!(
            "{}/api_v3/service/{}/action/{}",
            self.service_url.trim_end_matches('/'),
            service,
            action
        )
    }

    /// Load configuration from environment variables
    ///
    /// Reads `OVP_SERVICE_URL`, `OVP_PARTNER_ID`, `OVP_ADMIN_SECRET`,
    /// `OVP_USER_SECRET`, `OVP_USER_ID`, `OVP_CLIENT_TAG` and
    /// `OVP_REQUEST_TIMEOUT_SECS`; unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`OvpError::ConfigurationError`] if a numeric variable does not
    /// parse or the resulting configuration fails validation.
    pub fn from_env() -> OvpResult<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("OVP_SERVICE_URL") {
            config.service_url = url;
        }
        if let Some(partner_id) = parse_env::<i64>("OVP_PARTNER_ID")? {
            config.partner_id = partner_id;
        }
        config.admin_secret = std::env::var("OVP_ADMIN_SECRET").ok();
        config.user_secret = std::env::var("OVP_USER_SECRET").ok();
        if let Ok(user_id) = std::env::var("OVP_USER_ID") {
            config.user_id = user_id;
        }
        if let Ok(tag) = std::env::var("OVP_CLIENT_TAG") {
            config.client_tag = tag;
        }
        if let Some(secs) = parse_env::<u64>("OVP_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }

        config.validate()?;

        log_debug!(
            service_url = %config.service_url,
            partner_id = config.partner_id,
            has_admin_secret = config.admin_secret.is_some(),
            has_user_secret = config.user_secret.is_some(),
            "Client configuration loaded from environment"
        );

        Ok(config)
    }
}

/// Harness settings layered on top of the client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    pub client: ClientConfig,
    /// Delete leftover resources at teardown
    pub do_cleanup: bool,
    /// Upper bound for waiting on a completion gate
    pub gate_timeout: Duration,
    /// Upper bound for each teardown phase: flushing in-flight requests, then
    /// waiting on cleanup deletes
    pub teardown_timeout: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            do_cleanup: true,
            gate_timeout: Duration::from_secs(30),
            teardown_timeout: Duration::from_secs(30),
        }
    }
}

impl HarnessConfig {
    pub fn new(client: ClientConfig) -> Self {
        Self {
            client,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> OvpResult<()> {
        self.client.validate()?;
        if self.gate_timeout.is_zero() {
            return Err(OvpError::configuration_error(
                "Gate timeout must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Load harness configuration from environment variables
    ///
    /// Adds `OVP_DO_CLEANUP`, `OVP_GATE_TIMEOUT_SECS` and
    /// `OVP_TEARDOWN_TIMEOUT_SECS` to what [`ClientConfig::from_env`] reads.
    pub fn from_env() -> OvpResult<Self> {
        let mut config = Self::new(ClientConfig::from_env()?);

        if let Some(do_cleanup) = parse_env::<bool>("OVP_DO_CLEANUP")? {
            config.do_cleanup = do_cleanup;
        }
        if let Some(secs) = parse_env::<u64>("OVP_GATE_TIMEOUT_SECS")? {
            config.gate_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_env::<u64>("OVP_TEARDOWN_TIMEOUT_SECS")? {
            config.teardown_timeout = Duration::from_secs(secs);
        }

        config.validate()?;

        log_debug!(
            do_cleanup = config.do_cleanup,
            gate_timeout_ms = config.gate_timeout.as_millis() as u64,
            teardown_timeout_ms = config.teardown_timeout.as_millis() as u64,
            "Harness configuration loaded from environment"
        );

        Ok(config)
    }
}

/// Parse an optional environment variable, failing on malformed values
fn parse_env<T: FromStr>(key: &str) -> OvpResult<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            OvpError::configuration_error(format!("Invalid value for {key}: {raw}"))
        }),
        Err(_) => Ok(None),
    }
}
