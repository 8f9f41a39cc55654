//! Structural rules: static cardinality facts
//!
//! A history breaking any of these is invalid as a whole; the validator
//! stops after this pass and queries refuse to run on it.

use std::collections::BTreeMap;

use arcade_core::{InvocationId, Rule, Violation};
use arcade_model::{Architecture, Invocation};

use crate::{Findings, StepWindow};

/// S-1 and S-2 at one step
pub fn check_step(window: &StepWindow<'_>, out: &mut Findings) {
    let step = window.step;
    let facts = window.current;

    if out.enabled(Rule::ComponentHosting) {
        for component in window.architecture.components() {
            let hosts = facts.topology.hosts_of(component);
            if hosts.len() != 1 {
                out.push(Violation::at(
                    Rule::ComponentHosting,
                    step,
                    component,
                    format!("hosted by {} nodes {:?}", hosts.len(), hosts),
                ));
            }
        }
    }

    if out.enabled(Rule::PortOwnership) {
        for port in window.architecture.ports() {
            let owners = facts.deployment.owners_of(port);
            if owners.len() != 1 {
                out.push(Violation::at(
                    Rule::PortOwnership,
                    step,
                    port,
                    format!("used by {} components {:?}", owners.len(), owners),
                ));
            }
        }
    }
}

/// S-3, S-4 and S-5: rules over static facts only
pub fn check_static(
    architecture: &Architecture,
    invocations: &BTreeMap<InvocationId, Invocation>,
    out: &mut Findings,
) {
    if out.enabled(Rule::InterfaceBinding) {
        let catalog = architecture.catalog();
        for interface in catalog.interfaces() {
            let requiring = catalog.requiring_ports(interface);
            let providing = catalog.providing_ports(interface);
            if requiring.len() != 1 || providing.len() != 1 {
                out.push(Violation::timeless(
                    Rule::InterfaceBinding,
                    interface,
                    format!(
                        "required by {} ports, provided by {} ports",
                        requiring.len(),
                        providing.len()
                    ),
                ));
            }
        }
    }

    if out.enabled(Rule::PortConnectorCoverage) {
        for port in architecture.ports() {
            let inbound = architecture.inbound_connectors(port).len();
            let outbound = architecture.outbound_connectors(port).len();
            if inbound != 1 || outbound != 1 {
                out.push(Violation::timeless(
                    Rule::PortConnectorCoverage,
                    port,
                    format!("inbound of {} connectors, outbound of {}", inbound, outbound),
                ));
            }
        }
    }

    if out.enabled(Rule::PortInvocationCoverage) {
        for port in architecture.ports() {
            let calling = count_invocations(invocations, |inv| inv.caller == Some(port));
            let receiving = count_invocations(invocations, |inv| inv.targets(port));
            if calling != 1 || receiving != 1 {
                out.push(Violation::timeless(
                    Rule::PortInvocationCoverage,
                    port,
                    format!("caller of {} invocations, receiver of {}", calling, receiving),
                ));
            }
        }
    }
}

fn count_invocations(
    invocations: &BTreeMap<InvocationId, Invocation>,
    pred: impl Fn(&Invocation) -> bool,
) -> usize {
    invocations.values().filter(|inv| pred(inv)).count()
}
