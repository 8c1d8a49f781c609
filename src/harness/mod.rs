//! Integration-test harness for dependent async service calls
//!
//! ## Organization
//! - `gate` - one-shot completion gate with a bounded wait
//! - `cleanup` - per-test registry of created ids, drained at teardown
//! - `resource` - create/fetch/delete contract the harness drives
//! - `scenario` - create/fetch/delete/verify lifecycle as a state machine
//! - `case` - a test case owning session, executor and registry

pub mod case;
pub mod cleanup;
pub mod gate;
pub mod resource;
pub mod scenario;

pub use case::{unique_name, TeardownReport, TestCase};
pub use cleanup::{CleanupRegistry, DrainReport};
pub use gate::{Gate, GateSignal};
pub use resource::ResourceApi;
pub use scenario::{LifecycleScenario, LifecycleState, ScenarioReport};
