//! Invocation lifecycle rules
//!
//! ```text
//! Unissued --(Setup at invoked)--> Pending --(Execute at executed)--> Completed
//! ```
//!
//! Setup: at `invoked`, the caller port is the inbound port of exactly one
//! connector and exactly that connector buffers the invocation, which it
//! did not hold at `invoked.prev`. Execute: `invoked <= executed`; at `executed` exactly
//! one connector buffers it, and that connector no longer holds it at
//! `executed.next`. Between the two the invocation must be held somewhere;
//! outside that window, nowhere.
//!
//! Each invocation is checked independently: a routing fault in one never
//! stops the others from being checked.

use std::collections::BTreeMap;

use arcade_core::{ConnectorId, InvocationId, Rule, Violation};
use arcade_model::{Architecture, Invocation, StepFacts};

use crate::{Findings, StepWindow};

/// Connectors the caller is attached to at a step: those taking calls in
/// at the caller port, while the port is in use by some component
pub fn attached_connectors(
    architecture: &Architecture,
    facts: &StepFacts,
    invocation: &Invocation,
) -> Vec<ConnectorId> {
    match invocation.caller {
        Some(port) if facts.port_in_use(port) => architecture.inbound_connectors(port),
        _ => Vec::new(),
    }
}

/// R-5: ordering of the two timestamps
pub fn check_static(invocations: &BTreeMap<InvocationId, Invocation>, out: &mut Findings) {
    if !out.enabled(Rule::ExecuteOrdering) {
        return;
    }
    for inv in invocations.values() {
        match (inv.invoked, inv.executed) {
            (None, Some(executed)) => out.push(Violation::timeless(
                Rule::ExecuteOrdering,
                inv.id,
                format!("executed at {} but never invoked", executed),
            )),
            (Some(invoked), Some(executed)) if executed < invoked => out.push(Violation::timeless(
                Rule::ExecuteOrdering,
                inv.id,
                format!("executed at {} before invoked at {}", executed, invoked),
            )),
            _ => {}
        }
    }
}

/// R-1..R-4 and R-6..R-9 at one step
pub fn check_step(window: &StepWindow<'_>, out: &mut Findings) {
    for inv in window.invocations.values() {
        check_invocation(window, inv, out);
    }
}

fn check_invocation(window: &StepWindow<'_>, inv: &Invocation, out: &mut Findings) {
    let step = window.step;
    let holders = window.current.holders(inv.id);

    let Some(invoked) = inv.invoked else {
        for connector in holders {
            out.push(Violation::at(
                Rule::UnissuedBuffered,
                step,
                inv.id,
                format!("never invoked but held by {}", connector),
            ));
        }
        return;
    };

    if step == invoked {
        check_setup(window, inv, &holders, out);
    }
    if inv.executed == Some(step) && holders.len() != 1 {
        out.push(Violation::at(
            Rule::ExecuteBuffering,
            step,
            inv.id,
            format!("buffered by {} connectors {:?} when executed", holders.len(), holders),
        ));
    }

    let retiring = retiring_connector(window, inv);
    if let Some(connector) = retiring {
        if window.current.holds(connector, inv.id) {
            out.push(Violation::at(
                Rule::ExecuteRetirement,
                step,
                inv.id,
                format!("still held by {} after executing", connector),
            ));
        }
    }

    if inv.is_active_at(step) {
        let boundary = step == invoked || inv.executed == Some(step);
        if holders.is_empty() && !boundary {
            out.push(Violation::at(
                Rule::PendingUnlocatable,
                step,
                inv.id,
                "pending but held by no connector",
            ));
        }
    } else {
        for connector in holders.into_iter().filter(|c| Some(*c) != retiring) {
            out.push(Violation::at(
                Rule::OutsideWindow,
                step,
                inv.id,
                format!("held by {} outside its active window", connector),
            ));
        }
    }
}

fn check_setup(window: &StepWindow<'_>, inv: &Invocation, holders: &[ConnectorId], out: &mut Findings) {
    let step = window.step;

    if holders.len() != 1 {
        out.push(Violation::at(
            Rule::SetupBuffering,
            step,
            inv.id,
            format!("buffered by {} connectors {:?} when invoked", holders.len(), holders),
        ));
    }

    let attached = attached_connectors(window.architecture, window.current, inv);
    match (attached.as_slice(), holders) {
        ([_], []) => {}
        ([attached], [holder]) if attached == holder => {}
        ([attached], [holder]) => out.push(Violation::at(
            Rule::SetupAttachment,
            step,
            inv.id,
            format!("buffered by {} but caller is attached to {}", holder, attached),
        )),
        ([_], _) => {}
        (_, _) => out.push(Violation::at(
            Rule::SetupAttachment,
            step,
            inv.id,
            match inv.caller {
                Some(port) => format!("caller {} attached to {} connectors", port, attached.len()),
                None => "invocation has no caller".to_string(),
            },
        )),
    }

    if let Some(prev) = window.prev {
        for holder in holders {
            if prev.holds(*holder, inv.id) {
                out.push(Violation::at(
                    Rule::SetupFreshness,
                    step,
                    inv.id,
                    format!("already held by {} at the previous step", holder),
                ));
            }
        }
    }
}

/// The connector that executed the invocation at `step.prev`, when exactly one did
fn retiring_connector(window: &StepWindow<'_>, inv: &Invocation) -> Option<ConnectorId> {
    let prev_step = window.prev_step()?;
    if inv.executed != Some(prev_step) || inv.invoked.is_none() {
        return None;
    }
    match window.prev?.holders(inv.id).as_slice() {
        [connector] => Some(*connector),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_core::{Args, ComponentId, MethodId, NodeId, PortId, RuleSet, Step};
    use arcade_model::{ConnectorSpec, History, PortSpec};

    const CALLER: PortId = PortId(1);
    const CALLEE: PortId = PortId(2);
    const WIRE: ConnectorId = ConnectorId(1);
    const SPARE: ConnectorId = ConnectorId(2);
    const INV: InvocationId = InvocationId(0);

    fn history(len: u32) -> History {
        let mut arch = Architecture::new();
        arch.add_node(NodeId(1));
        arch.add_component(ComponentId(1));
        arch.add_component(ComponentId(2));
        arch.add_port(CALLER, PortSpec::new());
        arch.add_port(CALLEE, PortSpec::new());
        arch.add_connector(WIRE, ConnectorSpec::between(CALLER, CALLEE)).unwrap();
        arch.add_connector(SPARE, ConnectorSpec::new(None, Some(CALLEE))).unwrap();

        let mut history = History::new(arch, len).unwrap();
        history.place(ComponentId(1), NodeId(1)).unwrap();
        history.place(ComponentId(2), NodeId(1)).unwrap();
        history.attach(CALLER, ComponentId(1)).unwrap();
        history.attach(CALLEE, ComponentId(2)).unwrap();
        history
    }

    fn call(history: &mut History, invoked: Option<u32>, executed: Option<u32>) {
        let mut inv = Invocation::call(INV, CALLER, [CALLEE], MethodId(1), Args::none());
        inv.invoked = invoked.map(Step);
        inv.executed = executed.map(Step);
        history.add_invocation(inv).unwrap();
    }

    fn buffer(history: &mut History, connector: ConnectorId, steps: impl IntoIterator<Item = u32>) {
        for s in steps {
            history.record_buffered(connector, INV, Step(s)).unwrap();
        }
    }

    fn rules(history: &History) -> Vec<(Rule, Option<Step>)> {
        let mut out = Findings::new(RuleSet::all());
        check_static(history.invocation_table(), &mut out);
        for step in history.timeline().iter() {
            check_step(&StepWindow::of(history, step).unwrap(), &mut out);
        }
        out.into_vec().into_iter().map(|v| (v.rule, v.step)).collect()
    }

    #[test]
    fn test_clean_lifecycle() {
        let mut h = history(5);
        call(&mut h, Some(1), Some(3));
        buffer(&mut h, WIRE, 1..=3);
        assert!(rules(&h).is_empty());
    }

    #[test]
    fn test_pending_forever_is_valid() {
        let mut h = history(4);
        call(&mut h, Some(1), None);
        buffer(&mut h, WIRE, 1..=3);
        assert!(rules(&h).is_empty());
    }

    #[test]
    fn test_double_enqueue_on_setup() {
        let mut h = history(3);
        call(&mut h, Some(0), None);
        buffer(&mut h, WIRE, 0..=2);
        buffer(&mut h, SPARE, [0]);
        let found = rules(&h);
        assert!(found.contains(&(Rule::SetupBuffering, Some(Step(0)))));
    }

    #[test]
    fn test_wrong_connector_on_setup() {
        let mut h = history(2);
        call(&mut h, Some(0), None);
        buffer(&mut h, SPARE, 0..=1);
        assert!(rules(&h).contains(&(Rule::SetupAttachment, Some(Step(0)))));
    }

    #[test]
    fn test_stale_enqueue() {
        let mut h = history(3);
        call(&mut h, Some(1), Some(2));
        buffer(&mut h, WIRE, 0..=2);
        let found = rules(&h);
        assert!(found.contains(&(Rule::SetupFreshness, Some(Step(1)))));
        assert!(found.contains(&(Rule::OutsideWindow, Some(Step(0)))));
    }

    #[test]
    fn test_missing_retirement() {
        let mut h = history(4);
        call(&mut h, Some(0), Some(1));
        buffer(&mut h, WIRE, 0..=2);
        let found = rules(&h);
        assert_eq!(found, vec![(Rule::ExecuteRetirement, Some(Step(2)))]);
    }

    #[test]
    fn test_execute_at_last_step_needs_no_retirement() {
        let mut h = history(2);
        call(&mut h, Some(0), Some(1));
        buffer(&mut h, WIRE, 0..=1);
        assert!(rules(&h).is_empty());
    }

    #[test]
    fn test_execute_before_invoke() {
        let mut h = history(3);
        call(&mut h, Some(2), Some(1));
        buffer(&mut h, WIRE, [2]);
        let found = rules(&h);
        assert!(found.contains(&(Rule::ExecuteOrdering, None)));
    }

    #[test]
    fn test_unissued_never_buffered() {
        let mut h = history(2);
        call(&mut h, None, None);
        buffer(&mut h, WIRE, [1]);
        assert_eq!(rules(&h), vec![(Rule::UnissuedBuffered, Some(Step(1)))]);
    }

    #[test]
    fn test_gap_while_pending() {
        let mut h = history(4);
        call(&mut h, Some(0), Some(3));
        buffer(&mut h, WIRE, [0, 1, 3]);
        assert_eq!(rules(&h), vec![(Rule::PendingUnlocatable, Some(Step(2)))]);
    }

    #[test]
    fn test_unattached_caller() {
        let mut h = history(2);
        h.detach_from(CALLER, ComponentId(1), Step(0)).unwrap();
        call(&mut h, Some(0), None);
        buffer(&mut h, WIRE, 0..=1);
        assert!(rules(&h).contains(&(Rule::SetupAttachment, Some(Step(0)))));
    }
}
