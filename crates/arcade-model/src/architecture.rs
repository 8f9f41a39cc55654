//! Architecture - the static part of a snapshot
//!
//! Declared entities, the interface catalog, and connector wiring. None of
//! this varies with time.

use std::collections::{BTreeMap, BTreeSet};

use arcade_core::{
    ArcadeError, ArcadeResult, ComponentId, ConnectorId, InterfaceId, LinkId, MethodId, NodeId, PortId,
};
use serde::{Deserialize, Serialize};

use crate::{Catalog, ConnectorSpec, PortSpec};

/// Static entities and wiring
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Architecture {
    nodes: BTreeSet<NodeId>,
    links: BTreeSet<LinkId>,
    components: BTreeSet<ComponentId>,
    catalog: Catalog,
    connectors: BTreeMap<ConnectorId, ConnectorSpec>,
}

impl Architecture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: NodeId) {
        self.nodes.insert(node);
    }

    pub fn add_link(&mut self, link: LinkId) {
        self.links.insert(link);
    }

    pub fn add_component(&mut self, component: ComponentId) {
        self.components.insert(component);
    }

    pub fn add_interface(&mut self, interface: InterfaceId, methods: impl IntoIterator<Item = MethodId>) {
        self.catalog.add_interface(interface, methods);
    }

    pub fn add_port(&mut self, port: PortId, spec: PortSpec) {
        self.catalog.add_port(port, spec);
    }

    /// Declare a connector. Its ports must already be declared.
    pub fn add_connector(&mut self, connector: ConnectorId, spec: ConnectorSpec) -> ArcadeResult<()> {
        for port in spec.ports() {
            self.require_port(port)?;
        }
        self.connectors.insert(connector, spec);
        Ok(())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    pub fn links(&self) -> impl Iterator<Item = LinkId> + '_ {
        self.links.iter().copied()
    }

    pub fn components(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.components.iter().copied()
    }

    pub fn ports(&self) -> impl Iterator<Item = PortId> + '_ {
        self.catalog.ports()
    }

    pub fn connector(&self, connector: ConnectorId) -> Option<&ConnectorSpec> {
        self.connectors.get(&connector)
    }

    pub fn connectors(&self) -> impl Iterator<Item = (ConnectorId, &ConnectorSpec)> {
        self.connectors.iter().map(|(id, spec)| (*id, spec))
    }

    /// Connectors naming `port` as inbound or outbound
    pub fn attached_connectors(&self, port: PortId) -> Vec<ConnectorId> {
        self.connectors
            .iter()
            .filter(|(_, spec)| spec.references(port))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Connectors naming `port` as inbound
    pub fn inbound_connectors(&self, port: PortId) -> Vec<ConnectorId> {
        self.connectors
            .iter()
            .filter(|(_, spec)| spec.inbound == Some(port))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Connectors naming `port` as outbound
    pub fn outbound_connectors(&self, port: PortId) -> Vec<ConnectorId> {
        self.connectors
            .iter()
            .filter(|(_, spec)| spec.outbound == Some(port))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn require_node(&self, node: NodeId) -> ArcadeResult<()> {
        if self.nodes.contains(&node) {
            Ok(())
        } else {
            Err(ArcadeError::UnknownEntity(node.into()))
        }
    }

    pub fn require_link(&self, link: LinkId) -> ArcadeResult<()> {
        if self.links.contains(&link) {
            Ok(())
        } else {
            Err(ArcadeError::UnknownEntity(link.into()))
        }
    }

    pub fn require_component(&self, component: ComponentId) -> ArcadeResult<()> {
        if self.components.contains(&component) {
            Ok(())
        } else {
            Err(ArcadeError::UnknownEntity(component.into()))
        }
    }

    pub fn require_port(&self, port: PortId) -> ArcadeResult<()> {
        if self.catalog.has_port(port) {
            Ok(())
        } else {
            Err(ArcadeError::UnknownEntity(port.into()))
        }
    }

    pub fn require_connector(&self, connector: ConnectorId) -> ArcadeResult<&ConnectorSpec> {
        self.connectors
            .get(&connector)
            .ok_or(ArcadeError::UnknownEntity(connector.into()))
    }
}
