//! Test case orchestration
//!
//! A [`TestCase`] bundles everything one integration test needs: a client
//! with its own session, an injected [`RequestExecutor`], and a
//! [`CleanupRegistry`]. Nothing is shared between cases, so cases can run in
//! parallel. [`TestCase::run`] executes a test body and tears down afterwards
//! no matter how the body ended.

use crate::client::OvpClient;
use crate::config::HarnessConfig;
use crate::error::{OvpError, OvpResult};
use crate::executor::RequestExecutor;
use crate::harness::cleanup::{CleanupRegistry, DrainReport};
use crate::harness::gate::{Gate, GateSignal};
use crate::logging::{log_debug, log_info, log_warn};
use crate::services::{SessionService, UiConfResources, UiConfService};
use crate::transport::{HttpTransport, Transport};
use crate::types::{SessionType, UiConf};
use chrono::Local;
use futures_util::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use uuid::Uuid;

/// `"<base> (<local timestamp>)"`, unique enough to tell runs apart
pub fn unique_name(base: &str) -> String {
    format!("{} ({})", base, Local::now().to_rfc2822())
}

/// Outcome of a teardown
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownReport {
    pub drain: DrainReport,
    /// Executor tasks joined while flushing
    pub flushed: usize,
    /// The flush hit its bound with requests still in flight
    pub flush_timed_out: bool,
}

#[derive(Debug, Clone)]
pub struct TestCase {
    name: String,
    config: HarnessConfig,
    client: OvpClient,
    executor: RequestExecutor,
    registry: CleanupRegistry,
}

impl TestCase {
    /// Create a case over an explicit transport
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(
        name: impl Into<String>,
        config: HarnessConfig,
        transport: Arc<dyn Transport>,
    ) -> OvpResult<Self> {
        config.validate()?;
        let client = OvpClient::new(config.client.clone(), transport)?;
        let executor = RequestExecutor::for_client(&client)?;
        let name = name.into();

        log_debug!(
            test = %name,
            do_cleanup = config.do_cleanup,
            "Test case created"
        );

        Ok(Self {
            name,
            config,
            client,
            executor,
            registry: CleanupRegistry::new(),
        })
    }

    /// Create an HTTP-backed case from [`HarnessConfig::from_env`]
    pub fn from_env(name: impl Into<String>) -> OvpResult<Self> {
        let config = HarnessConfig::from_env()?;
        let transport = HttpTransport::new(config.client.clone())?;
        Self::new(name, config, Arc::new(transport))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn client(&self) -> &OvpClient {
        &self.client
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    pub fn registry(&self) -> &CleanupRegistry {
        &self.registry
    }

    /// Awaitable UiConf operations bound to this case's session
    pub fn resources(&self) -> UiConfResources {
        UiConfResources::new(self.client.clone(), self.executor.clone())
    }

    /// This test's name with a timestamp appended
    pub fn unique_name(&self) -> String {
        unique_name(&self.name)
    }

    pub async fn start_admin_session(&self) -> OvpResult<String> {
        SessionService::start_session(&self.executor, &self.client, SessionType::Admin).await
    }

    pub async fn start_user_session(&self) -> OvpResult<String> {
        SessionService::start_session(&self.executor, &self.client, SessionType::User).await
    }

    /// New gate labelled with this test's name
    pub fn gate(&self, label: &str) -> (Gate, GateSignal) {
        Gate::new(format!("{}::{}", self.name, label))
    }

    /// Wait on a gate with the configured bound
    pub async fn await_gate(&self, gate: Gate) -> OvpResult<()> {
        gate.wait(self.config.gate_timeout).await
    }

    /// Queue `uiconf.add` for the test template and hand the result to
    /// `on_completion`
    ///
    /// A successful add registers the new id for cleanup before
    /// `on_completion` runs.
    pub fn add_ui_conf<F>(&self, name: &str, on_completion: F) -> Uuid
    where
        F: FnOnce(OvpResult<UiConf>) + Send + 'static,
    {
        let registry = self.registry.clone();
        let request = UiConfService::add(&UiConfService::test_template(name))
            .set_completion(move |result: OvpResult<UiConf>| {
                let result = result.and_then(|added| match added.id {
                    Some(id) => {
                        registry.register(id);
                        Ok(added)
                    }
                    None => Err(OvpError::response_parsing_error(
                        "uiconf.add returned an object without an id",
                    )),
                });
                on_completion(result);
            })
            .build(&self.client);

        self.executor.queue(request)
    }

    /// Wait for in-flight requests, then delete everything still registered
    ///
    /// Requests are flushed first so an add whose completion has not run yet
    /// still gets its id registered before the registry is drained. The
    /// flush and the drain each wait at most `teardown_timeout`. Never fails:
    /// cleanup problems are logged and reported.
    pub async fn tear_down(&self) -> TeardownReport {
        let mut report = TeardownReport::default();

        match self.executor.flush(self.config.teardown_timeout).await {
            Ok(flushed) => report.flushed = flushed,
            Err(e) => {
                log_warn!(test = %self.name, error = %e, "Teardown flush incomplete");
                report.flush_timed_out = true;
            }
        }

        report.drain = self
            .registry
            .drain(
                &self.resources(),
                self.config.do_cleanup,
                self.config.teardown_timeout,
            )
            .await;

        log_info!(
            test = %self.name,
            skipped = report.drain.skipped,
            deleted = report.drain.deleted(),
            failed = report.drain.failed.len(),
            pending = report.drain.pending.len(),
            flushed = report.flushed,
            "Test case torn down"
        );

        report
    }

    /// Run `body`, then always tear down
    ///
    /// The body's error is returned after teardown; a panic in the body is
    /// resumed after teardown.
    pub async fn run<F, Fut>(self, body: F) -> anyhow::Result<TeardownReport>
    where
        F: FnOnce(TestCase) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        let outcome = AssertUnwindSafe(body(self.clone())).catch_unwind().await;
        let report = self.tear_down().await;

        match outcome {
            Ok(Ok(())) => Ok(report),
            Ok(Err(e)) => Err(e.context(format!("test '{}' failed", self.name))),
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}
