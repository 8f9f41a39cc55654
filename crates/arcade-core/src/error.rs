//! Error types for ARCADE
//!
//! Rule breaches are data ([`crate::Violation`]); these errors cover
//! operations that cannot proceed at all.

use thiserror::Error;

use crate::{ConnectorId, Entity, InvocationId, PortId, Report, Step};

/// Core ARCADE errors
#[derive(Error, Debug)]
pub enum ArcadeError {
    // Model errors
    #[error("Unknown entity: {0}")]
    UnknownEntity(Entity),

    #[error("Step {step} out of range for timeline of {len} steps")]
    StepOutOfRange { step: Step, len: u32 },

    #[error("Timeline must have at least one step")]
    EmptyTimeline,

    #[error("Invalid snapshot: {} structural violation(s)", .0.len())]
    InvalidSnapshot(Report),

    // Routing errors
    #[error("Port {0} is attached to no connector")]
    NoAttachedConnector(PortId),

    #[error("Port {port} is attached to {count} connectors")]
    AmbiguousConnector { port: PortId, count: usize },

    #[error("Invocation {0} has no caller")]
    NoCaller(InvocationId),

    #[error("Invocation {0} already issued")]
    AlreadyIssued(InvocationId),

    #[error("Invocation {0} not issued")]
    NotIssued(InvocationId),

    #[error("Invocation {0} already executed")]
    AlreadyExecuted(InvocationId),

    #[error("Invocation {invocation} cannot execute at {executed}, issued at {invoked}")]
    ExecuteBeforeInvoke {
        invocation: InvocationId,
        invoked: Step,
        executed: Step,
    },

    #[error("Invocation {invocation} cannot move to {connector} at {step}, last held at {held}")]
    NonMonotonicForward {
        invocation: InvocationId,
        connector: ConnectorId,
        step: Step,
        held: Step,
    },

    // Ingestion errors
    #[error("Ingestion failed: {0}")]
    Ingest(String),

    #[error("Monitor channel closed")]
    MonitorClosed,

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for ARCADE operations
pub type ArcadeResult<T> = Result<T, ArcadeError>;
