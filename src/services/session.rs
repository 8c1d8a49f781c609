//! Session establishment

use crate::client::OvpClient;
use crate::error::{OvpError, OvpResult};
use crate::executor::RequestExecutor;
use crate::logging::log_info;
use crate::request::RequestBuilder;
use crate::types::SessionType;
use std::time::Duration;

pub struct SessionService;

impl SessionService {
    pub const SERVICE: &'static str = "session";

    /// `session.start`, resolving to the session token
    pub fn start(
        secret: &str,
        user_id: &str,
        session_type: SessionType,
        partner_id: i64,
        expiry: Duration,
        privileges: Option<&str>,
    ) -> RequestBuilder<String> {
        let mut builder = RequestBuilder::new(Self::SERVICE, "start")
            .without_session()
            .param("secret", secret)
            .param("userId", user_id)
            .param("type", session_type)
            .param("partnerId", partner_id)
            .param("expiry", expiry.as_secs());
        if let Some(privileges) = privileges {
            builder = builder.param("privileges", privileges);
        }
        builder
    }

    /// Start a session in `role` with the secret configured for that role
    /// and store the token on the client
    ///
    /// # Errors
    ///
    /// Returns [`OvpError::ConfigurationError`] if no secret is configured for
    /// the role, or the service error if the session is refused.
    pub async fn start_session(
        executor: &RequestExecutor,
        client: &OvpClient,
        role: SessionType,
    ) -> OvpResult<String> {
        let config = client.config();
        let secret = match role {
            SessionType::Admin => config.admin_secret.as_deref(),
            SessionType::User => config.user_secret.as_deref(),
        }
        .ok_or_else(|| {
            OvpError::configuration_error(format!("No secret configured for {role} sessions"))
        })?;

        let request = Self::start(
            secret,
            &config.user_id,
            role,
            config.partner_id,
            config.session_expiry,
            None,
        );
        let ks = executor.execute(client, request).await?;
        client.set_ks(ks.clone());

        log_info!(
            role = %role,
            partner_id = config.partner_id,
            "Session started"
        );

        Ok(ks)
    }
}
