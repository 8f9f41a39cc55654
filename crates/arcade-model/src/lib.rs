//! ARCADE Model - the time-indexed architecture snapshot
//!
//! This crate holds the facts a validator reasons about:
//! - Topology: which node hosts which component, which link joins which nodes
//! - Deployment: which component uses which port
//! - Catalog: interfaces, their methods, and what each port requires/provides
//! - Connectors: static port wiring plus per-step invocation buffers
//! - Invocations: immutable call records with optional timestamps
//!
//! Per-step facts live in an arena of [`StepFacts`] indexed by [`arcade_core::Step`];
//! `prev`/`next` lookups are plain index arithmetic into that arena.

pub mod architecture;
pub mod catalog;
pub mod connector;
pub mod deployment;
pub mod fabric;
pub mod history;
pub mod invocation;
pub mod snapshot;
pub mod topology;

pub use architecture::*;
pub use catalog::*;
pub use connector::*;
pub use deployment::*;
pub use fabric::*;
pub use history::*;
pub use invocation::*;
pub use snapshot::*;
pub use topology::*;
