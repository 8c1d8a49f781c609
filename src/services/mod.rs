//! Service request builders
//!
//! - **session**: `session.start` and the helper that stores the token
//! - **uiconf**: `uiconf.{add,get,update,delete,list}` plus the
//!   [`ResourceApi`](crate::harness::ResourceApi) view used by scenarios

pub mod session;
pub mod uiconf;

pub use session::SessionService;
pub use uiconf::{UiConfResources, UiConfService};
