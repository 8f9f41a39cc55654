//! ARCADE Core - Fundamental types and primitives
//!
//! This crate defines the core types used throughout ARCADE:
//! - Identifiers (NodeId, ComponentId, PortId, ConnectorId, InvocationId, ...)
//! - Time primitives (Step, Timeline)
//! - Opaque call arguments
//! - The rule catalogue and violation reports
//! - The error type for operational failures

pub mod id;
pub mod time;
pub mod args;
pub mod rules;
pub mod error;

pub use id::*;
pub use time::*;
pub use args::*;
pub use rules::*;
pub use error::*;
