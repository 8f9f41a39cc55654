//! Connectivity rules: connectors must be backed by the physical topology

use std::collections::{BTreeMap, BTreeSet};

use arcade_core::{ComponentId, ConnectorId, NodeId, Rule, Step, Violation};
use arcade_model::{Architecture, History, StepFacts};

use crate::{Findings, StepWindow};

/// C-1 and C-2 at one step
pub fn check_step(window: &StepWindow<'_>, out: &mut Findings) {
    for (connector, spec) in window.architecture.connectors() {
        let connected = window.current.connects(spec);

        if out.enabled(Rule::ConnectorReachability) {
            for (a, b) in distinct_pairs(&connected) {
                if !window.current.topology.reachable(a, b) {
                    out.push(Violation::at(
                        Rule::ConnectorReachability,
                        window.step,
                        connector,
                        format!("connects {} and {} without a physical path", a, b),
                    ));
                }
            }
        }

        if spec.reliable && out.enabled(Rule::ReliableConnector) {
            if let (Some(prev), Some(prev_step)) = (window.prev, window.prev_step()) {
                for dropped in prev.connects(spec).difference(&connected) {
                    out.push(Violation::at(
                        Rule::ReliableConnector,
                        window.step,
                        connector,
                        format!("dropped {} connected at {}", dropped, prev_step),
                    ));
                }
            }
        }
    }
}

/// C-3 over a complete history: one finding per declared-local connector
/// with no fixed anchor node
pub fn check_local(history: &History, out: &mut Findings) {
    if !out.enabled(Rule::LocalConnector) {
        return;
    }
    let fabric = history.fabric();
    for (connector, spec) in history.architecture().connectors() {
        if spec.local && !fabric.is_local(connector) {
            out.push(Violation::timeless(
                Rule::LocalConnector,
                connector,
                "connected components do not share one fixed node",
            ));
        }
    }
}

fn distinct_pairs(set: &BTreeSet<ComponentId>) -> impl Iterator<Item = (ComponentId, ComponentId)> + '_ {
    set.iter()
        .enumerate()
        .flat_map(move |(i, &a)| set.iter().skip(i + 1).map(move |&b| (a, b)))
}

/// Incremental C-3 for the online monitor.
///
/// Each declared-local connector is anchored to the node hosting its
/// components the first time it connects anything; later steps must keep
/// every connected component on that node. A connector is reported once.
#[derive(Debug, Default, Clone)]
pub struct LocalAnchors {
    anchors: BTreeMap<ConnectorId, NodeId>,
    broken: BTreeSet<ConnectorId>,
}

impl LocalAnchors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchor(&self, connector: ConnectorId) -> Option<NodeId> {
        self.anchors.get(&connector).copied()
    }

    /// Evaluate one step. Returns the updated tracker rather than mutating,
    /// so the caller can commit it together with the rest of the step.
    pub fn observe(
        &self,
        architecture: &Architecture,
        step: Step,
        facts: &StepFacts,
        out: &mut Findings,
    ) -> LocalAnchors {
        let mut next = self.clone();
        if !out.enabled(Rule::LocalConnector) {
            return next;
        }
        for (connector, spec) in architecture.connectors() {
            if !spec.local || next.broken.contains(&connector) {
                continue;
            }
            let connected = facts.connects(spec);
            if connected.is_empty() {
                continue;
            }
            let anchor = match next.anchors.get(&connector) {
                Some(anchor) => Some(*anchor),
                None => connected
                    .iter()
                    .next()
                    .and_then(|c| facts.topology.host_of(*c)),
            };
            let holds = anchor.is_some_and(|node| {
                connected
                    .iter()
                    .all(|c| facts.topology.hosts_of(*c).contains(&node))
            });
            match (anchor, holds) {
                (Some(node), true) => {
                    next.anchors.insert(connector, node);
                }
                _ => {
                    next.broken.insert(connector);
                    out.push(Violation::at(
                        Rule::LocalConnector,
                        step,
                        connector,
                        match anchor {
                            Some(node) => format!("components left anchor {}", node),
                            None => "connected components have no common host".to_string(),
                        },
                    ));
                }
            }
        }
        next
    }
}
