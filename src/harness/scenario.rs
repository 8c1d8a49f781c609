//! Create/fetch/delete lifecycle as an explicit state machine
//!
//! Each [`step`](LifecycleScenario::step) performs exactly one service call
//! and moves one state forward:
//!
//! ```text
//! Pending --create--> Created --fetch--> Fetched --delete--> Deleted --fetch--> Verified
//! ```
//!
//! Every step that must succeed is checked; only the last fetch expects an
//! error, and it has to be a not-found error. A failed check stops the
//! scenario with [`OvpError::ScenarioFailed`] naming the last state reached.

use crate::error::{OvpError, OvpResult};
use crate::harness::cleanup::CleanupRegistry;
use crate::harness::resource::ResourceApi;
use crate::logging::log_debug;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleState {
    Pending,
    Created,
    Fetched,
    Deleted,
    Verified,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Pending => "pending",
            LifecycleState::Created => "created",
            LifecycleState::Fetched => "fetched",
            LifecycleState::Deleted => "deleted",
            LifecycleState::Verified => "verified",
        };
        f.write_str(name)
    }
}

/// What a finished (or partially run) scenario observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    pub name: String,
    pub id: Option<i64>,
    pub state: LifecycleState,
    /// States entered, in order, starting after `Pending`
    pub transitions: Vec<LifecycleState>,
}

pub struct LifecycleScenario<'a, R: ResourceApi> {
    api: &'a R,
    registry: &'a CleanupRegistry,
    name: String,
    state: LifecycleState,
    id: Option<i64>,
    transitions: Vec<LifecycleState>,
}

impl<'a, R: ResourceApi> LifecycleScenario<'a, R> {
    pub fn new(api: &'a R, registry: &'a CleanupRegistry, name: impl Into<String>) -> Self {
        Self {
            api,
            registry,
            name: name.into(),
            state: LifecycleState::Pending,
            id: None,
            transitions: Vec::new(),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Id of the created resource, once `Created` was reached
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// Run all the way to `Verified`
    pub async fn run(self) -> OvpResult<ScenarioReport> {
        self.run_until(LifecycleState::Verified).await
    }

    /// Run until `target` is reached (or the scenario fails)
    pub async fn run_until(mut self, target: LifecycleState) -> OvpResult<ScenarioReport> {
        while self.state < target {
            self.step().await?;
        }
        Ok(self.report())
    }

    pub fn report(&self) -> ScenarioReport {
        ScenarioReport {
            name: self.name.clone(),
            id: self.id,
            state: self.state,
            transitions: self.transitions.clone(),
        }
    }

    /// Perform the next transition and return the state entered
    pub async fn step(&mut self) -> OvpResult<LifecycleState> {
        let next = match self.state {
            LifecycleState::Pending => self.create().await?,
            LifecycleState::Created => self.fetch_created().await?,
            LifecycleState::Fetched => self.delete_created().await?,
            LifecycleState::Deleted => self.verify_deleted().await?,
            LifecycleState::Verified => {
                return Err(self.fail("scenario already verified"));
            }
        };

        log_debug!(
            kind = self.api.kind(),
            scenario = %self.name,
            from = %self.state,
            to = %next,
            id = ?self.id,
            "Scenario transition"
        );

        self.state = next;
        self.transitions.push(next);
        Ok(next)
    }

    fn fail(&self, message: impl Into<String>) -> OvpError {
        OvpError::scenario_failed(self.state.to_string(), message)
    }

    fn created_id(&self) -> OvpResult<i64> {
        self.id.ok_or_else(|| self.fail("no id recorded for the created resource"))
    }

    async fn create(&mut self) -> OvpResult<LifecycleState> {
        let template = self.api.template(&self.name);
        let created = self
            .api
            .create(template)
            .await
            .map_err(|e| self.fail(format!("create failed: {e}")))?;
        let id = R::id_of(&created).ok_or_else(|| self.fail("created resource has no id"))?;

        self.registry.register(id);
        self.id = Some(id);
        Ok(LifecycleState::Created)
    }

    async fn fetch_created(&mut self) -> OvpResult<LifecycleState> {
        let id = self.created_id()?;
        let fetched = self
            .api
            .fetch(id)
            .await
            .map_err(|e| self.fail(format!("fetch of {id} failed: {e}")))?;

        match R::id_of(&fetched) {
            Some(fetched_id) if fetched_id == id => Ok(LifecycleState::Fetched),
            other => Err(self.fail(format!(
                "fetched id {other:?} does not match created id {id}"
            ))),
        }
    }

    async fn delete_created(&mut self) -> OvpResult<LifecycleState> {
        let id = self.created_id()?;
        self.api
            .delete(id)
            .await
            .map_err(|e| self.fail(format!("delete of {id} failed: {e}")))?;

        self.registry.unregister(id);
        Ok(LifecycleState::Deleted)
    }

    async fn verify_deleted(&mut self) -> OvpResult<LifecycleState> {
        let id = self.created_id()?;
        match self.api.fetch(id).await {
            Ok(resource) => Err(self.fail(format!(
                "fetching deleted resource {id} should fail, got {resource:?}"
            ))),
            Err(e) if e.is_not_found() => Ok(LifecycleState::Verified),
            Err(e) => Err(self.fail(format!(
                "fetching deleted resource {id} failed with an unexpected error: {e}"
            ))),
        }
    }
}
