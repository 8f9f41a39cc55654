//! ARCADE Runtime - running the engine inside an application
//!
//! - [`RuntimeConfig`]: channel sizing, logging and validator settings,
//!   loadable from JSON
//! - [`init_logging`]: `tracing` subscriber setup
//! - [`load_history`]: JSON snapshot ingestion
//! - [`spawn_monitor`]: an [`arcade_engine::OnlineMonitor`] on a tokio task

pub mod config;
pub mod ingest;
pub mod observability;
pub mod task;

pub use config::*;
pub use ingest::*;
pub use observability::*;
pub use task::*;
