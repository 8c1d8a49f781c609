//! Request execution context
//!
//! A [`RequestExecutor`] is created per client (per test case) and injected
//! wherever requests are queued; there is no process-wide instance. Queued
//! requests run as tokio tasks, and each one invokes its completion callback
//! exactly once on whichever worker thread finished the transport call.
//! In-flight tasks are tracked so teardown can [`flush`](RequestExecutor::flush)
//! them deterministically.

use crate::client::OvpClient;
use crate::error::{OvpError, OvpResult};
use crate::logging::{log_debug, log_error, log_warn};
use crate::request::{ApiCall, BuiltRequest, RequestBuilder};
use crate::transport::Transport;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinSet};
use uuid::Uuid;

struct ExecutorInner {
    transport: Arc<dyn Transport>,
    runtime: Handle,
    request_timeout: Duration,
    tasks: Mutex<JoinSet<()>>,
}

/// Queues built requests and drives them to completion
#[derive(Clone)]
pub struct RequestExecutor {
    inner: Arc<ExecutorInner>,
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("transport", &self.inner.transport.name())
            .field("request_timeout", &self.inner.request_timeout)
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

impl RequestExecutor {
    /// Create an executor bound to the current tokio runtime
    ///
    /// # Errors
    ///
    /// Returns [`OvpError::ConfigurationError`] when called outside a tokio
    /// runtime.
    pub fn new(transport: Arc<dyn Transport>, request_timeout: Duration) -> OvpResult<Self> {
        let runtime = Handle::try_current().map_err(|e| {
            OvpError::configuration_error(format!("RequestExecutor needs a tokio runtime: {e}"))
        })?;
        Ok(Self::with_runtime(transport, request_timeout, runtime))
    }

    /// Create an executor spawning onto an explicit runtime
    pub fn with_runtime(
        transport: Arc<dyn Transport>,
        request_timeout: Duration,
        runtime: Handle,
    ) -> Self {
        log_debug!(
            transport = transport.name(),
            request_timeout_ms = request_timeout.as_millis() as u64,
            "RequestExecutor created"
        );

        Self {
            inner: Arc::new(ExecutorInner {
                transport,
                runtime,
                request_timeout,
                tasks: Mutex::new(JoinSet::new()),
            }),
        }
    }

    /// Executor sharing the client's transport and request timeout
    pub fn for_client(client: &OvpClient) -> OvpResult<Self> {
        Self::new(client.transport(), client.config().request_timeout)
    }

    /// Enqueue a built request; its completion fires later on a worker thread
    pub fn queue(&self, request: BuiltRequest) -> Uuid {
        let request_id = request.request_id();
        let (call, rejected, completion) = request.into_parts();
        let transport = Arc::clone(&self.inner.transport);
        let request_timeout = self.inner.request_timeout;

        log_debug!(
            request_id = %request_id,
            endpoint = %call.endpoint(),
            rejected = rejected.is_some(),
            "Request queued"
        );

        let task = async move {
            let result = match rejected {
                Some(error) => Err(error),
                None => dispatch(transport.as_ref(), &call, request_timeout).await,
            };
            completion(result);
        };

        let mut tasks = self.inner.tasks.lock();
        while let Some(finished) = tasks.try_join_next() {
            report_join(finished);
        }
        tasks.spawn_on(task, &self.inner.runtime);

        request_id
    }

    /// Build, queue and await a request
    ///
    /// Any completion already attached to `builder` is replaced.
    pub async fn execute<T>(&self, client: &OvpClient, builder: RequestBuilder<T>) -> OvpResult<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let request = builder
            .set_completion(move |result| {
                let _ = tx.send(result);
            })
            .build(client);
        let request_id = self.queue(request);

        rx.await.map_err(|_| {
            OvpError::request_failed(
                format!("Request {request_id} was dropped before completing"),
                None,
            )
        })?
    }

    /// Number of queued requests whose tasks have not been reaped yet
    pub fn in_flight(&self) -> usize {
        self.inner.tasks.lock().len()
    }

    /// Wait for every queued request, including requests queued by
    /// completions while flushing
    ///
    /// Returns how many tasks were joined. On timeout the remaining tasks keep
    /// running detached.
    pub async fn flush(&self, timeout: Duration) -> OvpResult<usize> {
        let deadline = tokio::time::Instant::now() + timeout;
        let mut joined = 0;

        loop {
            let mut batch = std::mem::take(&mut *self.inner.tasks.lock());
            if batch.is_empty() {
                return Ok(joined);
            }

            loop {
                match tokio::time::timeout_at(deadline, batch.join_next()).await {
                    Ok(Some(finished)) => {
                        report_join(finished);
                        joined += 1;
                    }
                    Ok(None) => break,
                    Err(_) => {
                        let pending = batch.len();
                        batch.detach_all();
                        log_debug!(joined = joined, "Detached requests left by flush");
                        return Err(OvpError::flush_timeout(pending, timeout));
                    }
                }
            }
        }
    }
}

async fn dispatch(
    transport: &dyn Transport,
    call: &ApiCall,
    request_timeout: Duration,
) -> OvpResult<Value> {
    let started = Instant::now();
    let result = tokio::time::timeout(request_timeout, transport.send(call))
        .await
        .unwrap_or_else(|_| Err(OvpError::timeout(request_timeout)));

    log_debug!(
        request_id = %call.request_id,
        endpoint = %call.endpoint(),
        success = result.is_ok(),
        duration_ms = started.elapsed().as_millis() as u64,
        "Request dispatched"
    );

    result
}

fn report_join(finished: Result<(), JoinError>) {
    if let Err(e) = finished {
        if e.is_panic() {
            log_error!(error = %e, "Completion callback panicked");
        } else {
            log_warn!(error = %e, "Request task cancelled before completing");
        }
    }
}
