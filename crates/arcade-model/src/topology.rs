//! Topology - the physical shape of the system at one step
//!
//! Nodes host components; links join nodes. Both relations are stored raw
//! so that a component hosted by zero or two nodes is representable and can
//! be reported, not silently lost.

use std::collections::{BTreeMap, BTreeSet};

use arcade_core::{ComponentId, LinkId, NodeId};
use serde::{Deserialize, Serialize};

/// Physical facts at a single step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    /// Node -> components it hosts
    hosts: BTreeMap<NodeId, BTreeSet<ComponentId>>,
    /// Link -> nodes it connects
    links: BTreeMap<LinkId, BTreeSet<NodeId>>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `node` hosts `component`
    pub fn host(&mut self, node: NodeId, component: ComponentId) {
        self.hosts.entry(node).or_default().insert(component);
    }

    /// Remove `component` from `node`
    pub fn unhost(&mut self, node: NodeId, component: ComponentId) {
        if let Some(hosted) = self.hosts.get_mut(&node) {
            hosted.remove(&component);
        }
    }

    /// Remove `component` from every node
    pub fn evict(&mut self, component: ComponentId) {
        for hosted in self.hosts.values_mut() {
            hosted.remove(&component);
        }
    }

    /// Record that `link` connects `node`
    pub fn attach_link(&mut self, link: LinkId, node: NodeId) {
        self.links.entry(link).or_default().insert(node);
    }

    /// Remove `link` entirely
    pub fn cut_link(&mut self, link: LinkId) {
        self.links.remove(&link);
    }

    /// Components hosted by `node`
    pub fn hosted_by(&self, node: NodeId) -> impl Iterator<Item = ComponentId> + '_ {
        self.hosts.get(&node).into_iter().flatten().copied()
    }

    /// Every node hosting `component`; a valid snapshot has exactly one
    pub fn hosts_of(&self, component: ComponentId) -> Vec<NodeId> {
        self.hosts
            .iter()
            .filter(|(_, hosted)| hosted.contains(&component))
            .map(|(node, _)| *node)
            .collect()
    }

    /// The hosting node, when there is exactly one
    pub fn host_of(&self, component: ComponentId) -> Option<NodeId> {
        match self.hosts_of(component).as_slice() {
            [node] => Some(*node),
            _ => None,
        }
    }

    /// Nodes joined by `link`
    pub fn link_nodes(&self, link: LinkId) -> impl Iterator<Item = NodeId> + '_ {
        self.links.get(&link).into_iter().flatten().copied()
    }

    /// Whether some link joins both nodes
    pub fn linked(&self, a: NodeId, b: NodeId) -> bool {
        self.links
            .values()
            .any(|nodes| nodes.contains(&a) && nodes.contains(&b))
    }

    /// Same node, or nodes sharing a link
    pub fn nodes_reachable(&self, a: NodeId, b: NodeId) -> bool {
        a == b || self.linked(a, b)
    }

    /// Whether two components can talk at this step.
    ///
    /// Requires both to resolve to exactly one hosting node; a component with
    /// no (or an ambiguous) host is unreachable.
    pub fn reachable(&self, a: ComponentId, b: ComponentId) -> bool {
        match (self.host_of(a), self.host_of(b)) {
            (Some(na), Some(nb)) => self.nodes_reachable(na, nb),
            _ => false,
        }
    }

    /// Iterate over hosting facts
    pub fn iter_hosts(&self) -> impl Iterator<Item = (NodeId, &BTreeSet<ComponentId>)> {
        self.hosts.iter().map(|(n, c)| (*n, c))
    }

    /// Iterate over link facts
    pub fn iter_links(&self) -> impl Iterator<Item = (LinkId, &BTreeSet<NodeId>)> {
        self.links.iter().map(|(l, n)| (*l, n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_nodes() -> Topology {
        let mut topology = Topology::new();
        topology.host(NodeId::new(1), ComponentId::new(10));
        topology.host(NodeId::new(2), ComponentId::new(20));
        topology
    }

    #[test]
    fn test_host_of_unique() {
        let topology = two_nodes();
        assert_eq!(topology.host_of(ComponentId::new(10)), Some(NodeId::new(1)));
        assert_eq!(topology.host_of(ComponentId::new(99)), None);
    }

    #[test]
    fn test_host_of_ambiguous() {
        let mut topology = two_nodes();
        topology.host(NodeId::new(2), ComponentId::new(10));
        assert_eq!(topology.hosts_of(ComponentId::new(10)).len(), 2);
        assert_eq!(topology.host_of(ComponentId::new(10)), None);
    }

    #[test]
    fn test_reachability_needs_link() {
        let mut topology = two_nodes();
        let a = ComponentId::new(10);
        let b = ComponentId::new(20);
        assert!(!topology.reachable(a, b));

        topology.attach_link(LinkId::new(5), NodeId::new(1));
        topology.attach_link(LinkId::new(5), NodeId::new(2));
        assert!(topology.linked(NodeId::new(1), NodeId::new(2)));
        assert!(topology.reachable(a, b));

        topology.cut_link(LinkId::new(5));
        assert!(!topology.reachable(a, b));
    }

    #[test]
    fn test_colocated_reachable() {
        let mut topology = two_nodes();
        topology.host(NodeId::new(1), ComponentId::new(11));
        assert!(topology.reachable(ComponentId::new(10), ComponentId::new(11)));
    }

    #[test]
    fn test_evict() {
        let mut topology = two_nodes();
        topology.evict(ComponentId::new(10));
        assert!(topology.hosts_of(ComponentId::new(10)).is_empty());
        assert_eq!(topology.hosted_by(NodeId::new(1)).count(), 0);
    }
}
