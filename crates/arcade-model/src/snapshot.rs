//! Per-step snapshot of time-varying facts

use std::collections::BTreeSet;

use arcade_core::{ComponentId, ConnectorId, InvocationId, PortId};
use serde::{Deserialize, Serialize};

use crate::{Buffers, ConnectorSpec, Deployment, Topology};

/// Everything that may change from one step to the next
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFacts {
    pub topology: Topology,
    pub deployment: Deployment,
    pub buffers: Buffers,
}

impl StepFacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Components using the connector's inbound or outbound port
    pub fn connects(&self, spec: &ConnectorSpec) -> BTreeSet<ComponentId> {
        spec.ports()
            .flat_map(|port| self.deployment.owners_of(port))
            .collect()
    }

    /// Whether `port` is in use by some component at this step
    pub fn port_in_use(&self, port: PortId) -> bool {
        !self.deployment.owners_of(port).is_empty()
    }

    /// Connectors holding `invocation`
    pub fn holders(&self, invocation: InvocationId) -> Vec<ConnectorId> {
        self.buffers.holders(invocation)
    }

    pub fn holds(&self, connector: ConnectorId, invocation: InvocationId) -> bool {
        self.buffers.holds(connector, invocation)
    }
}
