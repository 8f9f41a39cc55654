//! Deployment - which component uses which port at one step

use std::collections::{BTreeMap, BTreeSet};

use arcade_core::{ComponentId, PortId};
use serde::{Deserialize, Serialize};

/// Port usage facts at a single step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    /// Component -> ports it uses
    uses: BTreeMap<ComponentId, BTreeSet<PortId>>,
}

impl Deployment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `component` uses `port`
    pub fn attach(&mut self, component: ComponentId, port: PortId) {
        self.uses.entry(component).or_default().insert(port);
    }

    /// Remove `port` from `component`
    pub fn detach(&mut self, component: ComponentId, port: PortId) {
        if let Some(ports) = self.uses.get_mut(&component) {
            ports.remove(&port);
        }
    }

    /// Ports used by `component`
    pub fn ports_of(&self, component: ComponentId) -> impl Iterator<Item = PortId> + '_ {
        self.uses.get(&component).into_iter().flatten().copied()
    }

    /// Every component using `port`; a valid snapshot has exactly one
    pub fn owners_of(&self, port: PortId) -> Vec<ComponentId> {
        self.uses
            .iter()
            .filter(|(_, ports)| ports.contains(&port))
            .map(|(component, _)| *component)
            .collect()
    }

    /// The owning component, when there is exactly one
    pub fn owner_of(&self, port: PortId) -> Option<ComponentId> {
        match self.owners_of(port).as_slice() {
            [component] => Some(*component),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ComponentId, &BTreeSet<PortId>)> {
        self.uses.iter().map(|(c, p)| (*c, p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_of() {
        let mut deployment = Deployment::new();
        deployment.attach(ComponentId::new(1), PortId::new(100));
        deployment.attach(ComponentId::new(1), PortId::new(101));

        assert_eq!(deployment.owner_of(PortId::new(100)), Some(ComponentId::new(1)));
        assert_eq!(deployment.ports_of(ComponentId::new(1)).count(), 2);
        assert_eq!(deployment.owner_of(PortId::new(7)), None);
    }

    #[test]
    fn test_shared_port_has_no_single_owner() {
        let mut deployment = Deployment::new();
        deployment.attach(ComponentId::new(1), PortId::new(100));
        deployment.attach(ComponentId::new(2), PortId::new(100));
        assert_eq!(deployment.owners_of(PortId::new(100)).len(), 2);
        assert_eq!(deployment.owner_of(PortId::new(100)), None);

        deployment.detach(ComponentId::new(2), PortId::new(100));
        assert_eq!(deployment.owner_of(PortId::new(100)), Some(ComponentId::new(1)));
    }
}
