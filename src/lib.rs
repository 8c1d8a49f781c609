//! # ovp-client
//!
//! Async client for the UiConf service of an online video platform API, and
//! the harness its integration tests run on.
//!
//! ## Key Features
//!
//! - **Completion callbacks**: every queued request completes exactly once
//!   with either a value or an error
//! - **Injected executor**: one [`RequestExecutor`] per test case, no global
//!   instance, deterministic flush at teardown
//! - **Bounded gates**: a test waiting on a callback chain always wakes up,
//!   including when a callback returns early or panics
//! - **Cleanup registry**: ids created during a test are deleted at
//!   teardown whether the test passed, failed or panicked
//! - **Lifecycle scenarios**: create/fetch/delete/verify as a state machine
//!   instead of nested callbacks
//!
//! ## Example
//!
//! ```rust,no_run
//! use ovp_client::harness::{LifecycleScenario, TestCase};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let case = TestCase::from_env("test_delete_ui_conf")?;
//! case.run(|case| async move {
//!     case.start_admin_session().await?;
//!     let resources = case.resources();
//!     let report = LifecycleScenario::new(&resources, case.registry(), case.unique_name())
//!         .run()
//!         .await?;
//!     assert!(report.id.is_some());
//!     anyhow::Ok(())
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

// Allow missing errors documentation - errors are self-documenting via type signatures
#![allow(clippy::missing_errors_doc)]

// Logging utilities (re-exports tracing with log_* naming) - internal only
pub(crate) mod logging;

pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod harness;
pub mod request;
pub mod services;
pub mod transport;
pub mod types;

#[cfg(test)]
pub mod tests;

// Re-export main types
pub use client::OvpClient;
pub use config::{ClientConfig, HarnessConfig};
pub use error::{OvpError, OvpResult};
pub use executor::RequestExecutor;
pub use request::{ApiCall, BuiltRequest, OnCompletion, RequestBuilder};
pub use services::{SessionService, UiConfResources, UiConfService};
pub use transport::{HttpTransport, MemoryTransport, Transport};
pub use types::{SessionType, UiConf, UiConfCreationMode, UiConfFilter, UiConfListResponse};
