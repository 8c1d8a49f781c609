//! Per-test registry of created resource ids
//!
//! Ids are appended when a create succeeds, removed when the test itself
//! deletes and verifies, and whatever is left is deleted at teardown. The
//! registry is cheap to clone so completion callbacks on worker threads can
//! register into it; it is never shared between test cases.

use crate::harness::resource::ResourceApi;
use crate::logging::{log_debug, log_info, log_warn};
use futures_util::stream::{FuturesUnordered, StreamExt};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct CleanupRegistry {
    ids: Arc<Mutex<Vec<i64>>>,
}

/// Outcome of draining a registry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Cleanup was disabled; nothing was issued
    pub skipped: bool,
    /// Ids a delete was issued for, in registration order
    pub attempted: Vec<i64>,
    /// Ids whose delete failed, with the error text
    pub failed: Vec<(i64, String)>,
    /// Ids whose delete was issued but had not answered when the drain bound
    /// elapsed
    pub pending: Vec<i64>,
}

impl DrainReport {
    /// Deletes that answered successfully within the bound
    pub fn deleted(&self) -> usize {
        self.attempted.len() - self.failed.len() - self.pending.len()
    }
}

impl CleanupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a freshly created id; registering the same id twice keeps one
    /// entry
    pub fn register(&self, id: i64) {
        let mut ids = self.ids.lock();
        if !ids.contains(&id) {
            ids.push(id);
            log_debug!(id = id, tracked = ids.len(), "Registered resource for cleanup");
        }
    }

    /// Stop tracking an id the test deleted itself; returns whether it was
    /// tracked
    pub fn unregister(&self, id: i64) -> bool {
        let mut ids = self.ids.lock();
        match ids.iter().position(|tracked| *tracked == id) {
            Some(index) => {
                ids.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.lock().contains(&id)
    }

    /// Snapshot of the tracked ids in registration order
    pub fn ids(&self) -> Vec<i64> {
        self.ids.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.ids.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.lock().is_empty()
    }

    /// Best-effort delete of every tracked id
    ///
    /// Deletes are issued concurrently and their failures are logged, never
    /// returned. Waiting stops once `bound` elapses: deletes that have not
    /// answered by then are left running and reported as pending. The
    /// registry is empty afterwards unless `enabled` is false, in which case
    /// nothing is issued and the ids stay.
    pub async fn drain<R: ResourceApi>(
        &self,
        api: &R,
        enabled: bool,
        bound: Duration,
    ) -> DrainReport {
        if !enabled {
            log_debug!(
                kind = api.kind(),
                tracked = self.len(),
                "Cleanup disabled, leaving resources in place"
            );
            return DrainReport {
                skipped: true,
                ..DrainReport::default()
            };
        }

        let ids = std::mem::take(&mut *self.ids.lock());
        if ids.is_empty() {
            return DrainReport::default();
        }

        log_info!(
            kind = api.kind(),
            count = ids.len(),
            "Cleaning up test entries after test"
        );

        let deadline = Instant::now() + bound;
        let mut deletes: FuturesUnordered<_> = ids
            .iter()
            .map(|&id| async move {
                log_debug!(kind = api.kind(), id = id, "Deleting test entry");
                (id, api.delete(id).await)
            })
            .collect();

        let mut report = DrainReport {
            attempted: ids.clone(),
            ..DrainReport::default()
        };
        let mut answered = Vec::with_capacity(ids.len());
        loop {
            match tokio::time::timeout_at(deadline, deletes.next()).await {
                Ok(Some((id, result))) => {
                    answered.push(id);
                    if let Err(e) = result {
                        log_warn!(
                            kind = api.kind(),
                            id = id,
                            error = %e,
                            "Cleanup delete failed"
                        );
                        report.failed.push((id, e.to_string()));
                    }
                }
                Ok(None) => break,
                Err(_) => {
                    report.pending = ids
                        .iter()
                        .copied()
                        .filter(|id| !answered.contains(id))
                        .collect();
                    log_warn!(
                        kind = api.kind(),
                        pending = report.pending.len(),
                        bound_ms = bound.as_millis() as u64,
                        "Cleanup deletes still unanswered at the drain bound"
                    );
                    break;
                }
            }
        }

        report
    }
}
