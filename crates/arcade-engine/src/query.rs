//! Query layer: `Invoke`, `Invoked`, `Execute` and `TypeChecking`
//!
//! Queries read a history whose hosting and ownership are well-defined;
//! [`Queries::new`] refuses any other. Call arguments are opaque and never
//! take part in matching.
//!
//! The `Execute` query is stricter than the lifecycle's execute rule: the
//! connector buffering the invocation at the execute step must also reach
//! the named receiver.

use arcade_core::{
    ArcadeError, ArcadeResult, Args, ConnectorId, InvocationId, MethodId, PortId, Report, Rule,
    RuleSet, Severity, Step,
};
use arcade_model::{History, Invocation, InvocationState};

use crate::{type_checking, Validator, ValidatorConfig};

/// Create an invocation from `caller` to `receivers`, invoked at `step`.
///
/// A pure constructor: nothing is buffered and nothing is validated beyond
/// `step` lying on the timeline. Use a [`crate::Router`] to issue it.
pub fn invoke(
    history: &mut History,
    caller: PortId,
    receivers: impl IntoIterator<Item = PortId>,
    method: MethodId,
    args: Args,
    step: Step,
) -> ArcadeResult<InvocationId> {
    let id = history.next_invocation_id();
    let mut invocation = Invocation::call(id, caller, receivers, method, args);
    invocation.invoked = Some(step);
    history.add_invocation(invocation)
}

/// Read-only queries over a structurally sound history
pub struct Queries<'h> {
    history: &'h History,
}

impl<'h> Queries<'h> {
    /// Fails with [`ArcadeError::InvalidSnapshot`] when some component is not
    /// hosted by exactly one node, or some port not used by exactly one
    /// component, at some step
    pub fn new(history: &'h History) -> ArcadeResult<Self> {
        let gate = ValidatorConfig {
            rules: RuleSet::empty()
                .with(Rule::ComponentHosting)
                .with(Rule::PortOwnership),
            capability_is_fatal: false,
        };
        let report = Validator::new(gate).check_structure(history);
        if !report.is_empty() {
            return Err(ArcadeError::InvalidSnapshot(report));
        }
        Ok(Queries { history })
    }

    pub fn history(&self) -> &'h History {
        self.history
    }

    /// Invocations of `method` from `caller` that name `receiver`
    pub fn matching(
        &self,
        caller: PortId,
        receiver: PortId,
        method: MethodId,
    ) -> impl Iterator<Item = &'h Invocation> + '_ {
        self.history.invocations().filter(move |inv| {
            inv.of == Some(method) && inv.caller == Some(caller) && inv.targets(receiver)
        })
    }

    /// `Invoked`: some matching invocation was invoked at `step`
    pub fn invoked(
        &self,
        caller: PortId,
        receiver: PortId,
        method: MethodId,
        _args: &Args,
        step: Step,
    ) -> bool {
        self.matching(caller, receiver, method)
            .any(|inv| inv.invoked == Some(step))
    }

    /// `Execute`: some matching invocation was executed at `step` from a
    /// connector that reaches `receiver` at that step
    pub fn execute(
        &self,
        caller: PortId,
        receiver: PortId,
        method: MethodId,
        _args: &Args,
        step: Step,
    ) -> bool {
        self.matching(caller, receiver, method)
            .filter(|inv| inv.executed == Some(step))
            .any(|inv| self.delivering_connector(inv.id, receiver, step).is_some())
    }

    /// A connector buffering `invocation` at `step` that names `receiver`
    /// while some component uses it
    pub fn delivering_connector(
        &self,
        invocation: InvocationId,
        receiver: PortId,
        step: Step,
    ) -> Option<ConnectorId> {
        let facts = self.history.facts(step)?;
        if !facts.port_in_use(receiver) {
            return None;
        }
        let architecture = self.history.architecture();
        facts.holders(invocation).into_iter().find(|connector| {
            architecture
                .connector(*connector)
                .is_some_and(|spec| spec.references(receiver))
        })
    }

    /// `TypeChecking` findings, as warnings
    pub fn type_checking(&self) -> Report {
        let mut report = Report::new();
        report.extend(
            type_checking(self.history.catalog(), self.history.invocation_table())
                .into_iter()
                .map(|v| v.with_severity(Severity::Warning)),
        );
        report
    }

    /// Whether every receiver of every invoked invocation offers its method
    pub fn type_checks(&self) -> bool {
        self.type_checking().is_clean()
    }

    pub fn state(&self, invocation: InvocationId) -> Option<InvocationState> {
        self.history.invocation(invocation).map(Invocation::state)
    }
}
