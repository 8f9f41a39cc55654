//! Connectors - static port wiring and per-step invocation buffers

use std::collections::{BTreeMap, BTreeSet};

use arcade_core::{ConnectorId, InvocationId, PortId};
use serde::{Deserialize, Serialize};

/// Static description of a connector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorSpec {
    /// Inbound port (at most one)
    pub inbound: Option<PortId>,
    /// Outbound port (at most one)
    pub outbound: Option<PortId>,
    /// Declared reliable: never drops a component it connected
    #[serde(default)]
    pub reliable: bool,
    /// Declared local: everything it connects lives on one fixed node
    #[serde(default)]
    pub local: bool,
}

impl ConnectorSpec {
    pub fn new(inbound: Option<PortId>, outbound: Option<PortId>) -> Self {
        ConnectorSpec {
            inbound,
            outbound,
            reliable: false,
            local: false,
        }
    }

    /// Connector from `inbound` to `outbound`
    pub fn between(inbound: PortId, outbound: PortId) -> Self {
        Self::new(Some(inbound), Some(outbound))
    }

    pub fn reliable(mut self) -> Self {
        self.reliable = true;
        self
    }

    pub fn local(mut self) -> Self {
        self.local = true;
        self
    }

    /// Ports named by this connector
    pub fn ports(&self) -> impl Iterator<Item = PortId> {
        self.inbound.into_iter().chain(self.outbound)
    }

    /// Whether `port` is the inbound or outbound port
    pub fn references(&self, port: PortId) -> bool {
        self.inbound == Some(port) || self.outbound == Some(port)
    }
}

/// Connector buffers at a single step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buffers {
    held: BTreeMap<ConnectorId, BTreeSet<InvocationId>>,
}

impl Buffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, connector: ConnectorId, invocation: InvocationId) -> bool {
        self.held.entry(connector).or_default().insert(invocation)
    }

    pub fn remove(&mut self, connector: ConnectorId, invocation: InvocationId) -> bool {
        self.held
            .get_mut(&connector)
            .is_some_and(|held| held.remove(&invocation))
    }

    pub fn holds(&self, connector: ConnectorId, invocation: InvocationId) -> bool {
        self.held
            .get(&connector)
            .is_some_and(|held| held.contains(&invocation))
    }

    /// Contents of one connector's buffer
    pub fn of(&self, connector: ConnectorId) -> impl Iterator<Item = InvocationId> + '_ {
        self.held.get(&connector).into_iter().flatten().copied()
    }

    /// Connectors whose buffer contains `invocation`
    pub fn holders(&self, invocation: InvocationId) -> Vec<ConnectorId> {
        self.held
            .iter()
            .filter(|(_, held)| held.contains(&invocation))
            .map(|(connector, _)| *connector)
            .collect()
    }

    /// Every buffered invocation, with its connector
    pub fn iter(&self) -> impl Iterator<Item = (ConnectorId, InvocationId)> + '_ {
        self.held
            .iter()
            .flat_map(|(connector, held)| held.iter().map(move |inv| (*connector, *inv)))
    }

    /// Distinct buffered invocations
    pub fn invocations(&self) -> BTreeSet<InvocationId> {
        self.held.values().flatten().copied().collect()
    }
}
