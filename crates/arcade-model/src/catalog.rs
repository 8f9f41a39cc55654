//! Interface/method catalog
//!
//! Static facts: the methods each interface lists, and the interfaces each
//! port requires and provides.

use std::collections::{BTreeMap, BTreeSet};

use arcade_core::{InterfaceId, MethodId, PortId};
use serde::{Deserialize, Serialize};

/// What a port requires and provides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
    pub requires: BTreeSet<InterfaceId>,
    pub provides: BTreeSet<InterfaceId>,
}

impl PortSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requiring(mut self, interface: InterfaceId) -> Self {
        self.requires.insert(interface);
        self
    }

    pub fn providing(mut self, interface: InterfaceId) -> Self {
        self.provides.insert(interface);
        self
    }
}

/// Static interface catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    interfaces: BTreeMap<InterfaceId, BTreeSet<MethodId>>,
    ports: BTreeMap<PortId, PortSpec>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an interface with its methods
    pub fn add_interface(&mut self, interface: InterfaceId, methods: impl IntoIterator<Item = MethodId>) {
        self.interfaces.entry(interface).or_default().extend(methods);
    }

    /// Declare a port
    pub fn add_port(&mut self, port: PortId, spec: PortSpec) {
        self.ports.insert(port, spec);
    }

    pub fn has_interface(&self, interface: InterfaceId) -> bool {
        self.interfaces.contains_key(&interface)
    }

    pub fn has_port(&self, port: PortId) -> bool {
        self.ports.contains_key(&port)
    }

    pub fn port(&self, port: PortId) -> Option<&PortSpec> {
        self.ports.get(&port)
    }

    pub fn methods(&self, interface: InterfaceId) -> impl Iterator<Item = MethodId> + '_ {
        self.interfaces.get(&interface).into_iter().flatten().copied()
    }

    pub fn interfaces(&self) -> impl Iterator<Item = InterfaceId> + '_ {
        self.interfaces.keys().copied()
    }

    pub fn ports(&self) -> impl Iterator<Item = PortId> + '_ {
        self.ports.keys().copied()
    }

    /// Ports whose `requires` lists `interface`
    pub fn requiring_ports(&self, interface: InterfaceId) -> Vec<PortId> {
        self.ports
            .iter()
            .filter(|(_, spec)| spec.requires.contains(&interface))
            .map(|(port, _)| *port)
            .collect()
    }

    /// Ports whose `provides` lists `interface`
    pub fn providing_ports(&self, interface: InterfaceId) -> Vec<PortId> {
        self.ports
            .iter()
            .filter(|(_, spec)| spec.provides.contains(&interface))
            .map(|(port, _)| *port)
            .collect()
    }

    /// Whether `port` provides an interface listing `method`
    pub fn offers(&self, port: PortId, method: MethodId) -> bool {
        self.ports.get(&port).is_some_and(|spec| {
            spec.provides.iter().any(|interface| {
                self.interfaces
                    .get(interface)
                    .is_some_and(|methods| methods.contains(&method))
            })
        })
    }
}
