//! One-shot completion gate
//!
//! A test creates a [`Gate`] and moves the [`GateSignal`] into the last
//! completion callback of its chain. The signal is consumed by
//! [`release`](GateSignal::release) or [`fail`](GateSignal::fail); if it is
//! dropped instead (early return, `?`, panic inside the callback) the gate
//! resolves as abandoned. Either way the waiting side always wakes up, and
//! [`Gate::wait`] bounds the wait for the case where the signal is leaked or
//! the callback never runs.

use crate::error::{OvpError, OvpResult};
use crate::logging::{log_debug, log_warn};
use std::time::Duration;
use tokio::sync::oneshot;

#[derive(Debug)]
enum GateOutcome {
    Released,
    Failed(String),
}

/// Waiting half of a one-shot gate
#[derive(Debug)]
pub struct Gate {
    label: String,
    rx: oneshot::Receiver<GateOutcome>,
}

/// Releasing half of a one-shot gate
#[derive(Debug)]
pub struct GateSignal {
    label: String,
    tx: Option<oneshot::Sender<GateOutcome>>,
}

impl Gate {
    pub fn new(label: impl Into<String>) -> (Gate, GateSignal) {
        let label = label.into();
        let (tx, rx) = oneshot::channel();
        (
            Gate {
                label: label.clone(),
                rx,
            },
            GateSignal {
                label,
                tx: Some(tx),
            },
        )
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Wait until the signal fires, at most `timeout`
    ///
    /// # Errors
    ///
    /// - [`OvpError::GateTimeout`] if nothing happened within `timeout`
    /// - [`OvpError::GateAbandoned`] if the signal was dropped unreleased
    /// - [`OvpError::GateFailed`] if the chain reported a failure
    pub async fn wait(self, timeout: Duration) -> OvpResult<()> {
        let Gate { label, rx } = self;
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(GateOutcome::Released)) => {
                log_debug!(gate = %label, "Gate released");
                Ok(())
            }
            Ok(Ok(GateOutcome::Failed(reason))) => Err(OvpError::gate_failed(label, reason)),
            Ok(Err(_)) => Err(OvpError::gate_abandoned(label)),
            Err(_) => Err(OvpError::gate_timeout(label, timeout.as_millis() as u64)),
        }
    }
}

impl GateSignal {
    /// Release the gate successfully
    pub fn release(mut self) {
        self.send(GateOutcome::Released);
    }

    /// Release the gate with a failure the waiting test will see
    pub fn fail(mut self, reason: impl Into<String>) {
        self.send(GateOutcome::Failed(reason.into()));
    }

    /// Release according to a completion result
    pub fn complete<T>(self, result: &OvpResult<T>) {
        match result {
            Ok(_) => self.release(),
            Err(e) => self.fail(e.to_string()),
        }
    }

    fn send(&mut self, outcome: GateOutcome) {
        if let Some(tx) = self.tx.take() {
            // The waiter may have timed out already
            let _ = tx.send(outcome);
        }
    }
}

impl Drop for GateSignal {
    fn drop(&mut self) {
        if self.tx.is_some() {
            log_warn!(
                gate = %self.label,
                panicking = std::thread::panicking(),
                "Gate signal dropped without release"
            );
        }
    }
}
