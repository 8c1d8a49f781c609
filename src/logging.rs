//! Logging utilities for ovp-client
//!
//! Re-exports tracing macros with log_* naming so call sites read the same
//! across the client, the executor and the test harness.

pub use tracing::{
    debug as log_debug,
    error as log_error,
    info as log_info,
    trace as log_trace,
    warn as log_warn,
};
