//! Invocations - reified call records
//!
//! An invocation is immutable once created apart from its two optional
//! timestamps, which drive the lifecycle:
//!
//! ```text
//! Unissued --invoked--> Pending --executed--> Completed
//! ```
//!
//! There is no cancellation; an invocation that is never executed stays
//! pending, which is a valid terminal state.

use std::collections::BTreeSet;

use arcade_core::{Args, InvocationId, MethodId, PortId, Step};
use serde::{Deserialize, Serialize};

/// Lifecycle state derived from the timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvocationState {
    Unissued,
    Pending,
    Completed,
}

/// A call record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub id: InvocationId,
    /// Invoked method (at most one)
    pub of: Option<MethodId>,
    /// Calling port (at most one)
    pub caller: Option<PortId>,
    pub receivers: BTreeSet<PortId>,
    #[serde(default)]
    pub args: Args,
    pub invoked: Option<Step>,
    pub executed: Option<Step>,
}

impl Invocation {
    pub fn new(id: InvocationId) -> Self {
        Invocation {
            id,
            of: None,
            caller: None,
            receivers: BTreeSet::new(),
            args: Args::none(),
            invoked: None,
            executed: None,
        }
    }

    /// A call from `caller` to `receivers`, not yet issued
    pub fn call(
        id: InvocationId,
        caller: PortId,
        receivers: impl IntoIterator<Item = PortId>,
        method: MethodId,
        args: Args,
    ) -> Self {
        Invocation {
            id,
            of: Some(method),
            caller: Some(caller),
            receivers: receivers.into_iter().collect(),
            args,
            invoked: None,
            executed: None,
        }
    }

    pub fn state(&self) -> InvocationState {
        match (self.invoked, self.executed) {
            (None, _) => InvocationState::Unissued,
            (Some(_), None) => InvocationState::Pending,
            (Some(_), Some(_)) => InvocationState::Completed,
        }
    }

    /// State as observed at `step`
    pub fn state_at(&self, step: Step) -> InvocationState {
        match (self.invoked, self.executed) {
            (Some(invoked), _) if step < invoked => InvocationState::Unissued,
            (None, _) => InvocationState::Unissued,
            (Some(_), Some(executed)) if step >= executed => InvocationState::Completed,
            (Some(_), _) => InvocationState::Pending,
        }
    }

    /// Whether `step` lies in `[invoked, executed]`; open-ended while pending
    pub fn is_active_at(&self, step: Step) -> bool {
        match (self.invoked, self.executed) {
            (Some(invoked), Some(executed)) => invoked <= step && step <= executed,
            (Some(invoked), None) => invoked <= step,
            (None, _) => false,
        }
    }

    pub fn targets(&self, receiver: PortId) -> bool {
        self.receivers.contains(&receiver)
    }
}
