//! ARCADE Test Harness - building and breaking architecture histories
//!
//! This crate provides:
//! - The client/server shop scenario and its variants
//! - Seeded generation of valid histories of any size
//! - Fault injection that breaks one rule at a time

pub mod fault;
pub mod generator;
pub mod scenario;

pub use fault::*;
pub use generator::*;
pub use scenario::*;
