//! Domain types exchanged with the service
//!
//! ## Organization
//! - `uiconf` - UiConf objects, filters and list responses
//! - `session` - Session roles

pub mod session;
pub mod uiconf;

pub use session::SessionType;
pub use uiconf::{UiConf, UiConfCreationMode, UiConfFilter, UiConfListResponse};
