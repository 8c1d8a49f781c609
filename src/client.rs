use crate::config::ClientConfig;
use crate::error::OvpResult;
use crate::logging::log_debug;
use crate::transport::{HttpTransport, Transport};
use parking_lot::RwLock;
use std::sync::Arc;

struct ClientInner {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    ks: RwLock<Option<String>>,
}

/// Session-holding handle to the service
///
/// Cloning is cheap and every clone shares the same session, so a completion
/// callback running on a worker thread sees the session the test started.
#[derive(Clone)]
pub struct OvpClient {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for OvpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OvpClient")
            .field("service_url", &self.inner.config.service_url)
            .field("partner_id", &self.inner.config.partner_id)
            .field("has_session", &self.has_session())
            .finish()
    }
}

impl OvpClient {
    /// Create a client over an explicit transport
    ///
    /// # Errors
    ///
    /// Returns [`OvpError::ConfigurationError`](crate::OvpError::ConfigurationError)
    /// if the configuration does not validate.
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> OvpResult<Self> {
        config.validate()?;

        log_debug!(
            service_url = %config.service_url,
            partner_id = config.partner_id,
            client_tag = %config.client_tag,
            "OvpClient created"
        );

        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                transport,
                ks: RwLock::new(None),
            }),
        })
    }

    /// Create a client that talks HTTP to `config.service_url`
    pub fn with_http(config: ClientConfig) -> OvpResult<Self> {
        let transport = HttpTransport::new(config.clone())?;
        Self::new(config, Arc::new(transport))
    }

    /// Create an HTTP client from environment variables
    pub fn from_env() -> OvpResult<Self> {
        Self::with_http(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.inner.transport)
    }

    /// Current session token, if a session was started
    pub fn ks(&self) -> Option<String> {
        self.inner.ks.read().clone()
    }

    pub fn has_session(&self) -> bool {
        self.inner.ks.read().is_some()
    }

    pub fn set_ks(&self, ks: impl Into<String>) {
        *self.inner.ks.write() = Some(ks.into());
    }

    pub fn clear_session(&self) {
        *self.inner.ks.write() = None;
    }
}
