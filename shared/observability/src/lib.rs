//! Logging and request tracing for the subscription service.
//!
//! - [`init`]: installs the global `tracing` subscriber from a logging profile
//! - [`middleware`]: actix-web middleware logging each request with its duration
//! - [`trace_context`]: trace/request ids taken from incoming headers

pub mod init;
pub mod middleware;
pub mod trace_context;

pub use init::*;
pub use middleware::*;
pub use trace_context::*;

// Re-export tracing for convenience
pub use tracing::{debug, error, info, instrument, warn, Instrument};
