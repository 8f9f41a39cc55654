//! Identity types for ARCADE
//!
//! Every entity kind of the architecture model gets its own 64-bit newtype so
//! that a port can never be passed where a component is expected. The set of
//! kinds is closed; [`Entity`] names any one of them.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $debug:literal, $display:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            #[inline]
            pub fn new(id: u64) -> Self {
                $name(id)
            }

            #[inline]
            pub fn raw(self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($debug, "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($display, "#{}"), self.0)
            }
        }
    };
}

entity_id!(
    /// Physical device hosting components
    NodeId, "Node", "node"
);
entity_id!(
    /// Physical medium connecting nodes
    LinkId, "Link", "link"
);
entity_id!(
    /// Deployed runtime unit
    ComponentId, "Component", "component"
);
entity_id!(
    /// Grouping of required/provided interfaces
    PortId, "Port", "port"
);
entity_id!(
    /// Named set of methods
    InterfaceId, "Interface", "interface"
);
entity_id!(MethodId, "Method", "method");
entity_id!(
    /// Routes invocations between at most one inbound and one outbound port
    ConnectorId, "Connector", "connector"
);
entity_id!(
    /// Reified call record
    InvocationId, "Invocation", "invocation"
);

/// Any entity of the model, tagged by kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Entity {
    Node(NodeId),
    Link(LinkId),
    Component(ComponentId),
    Port(PortId),
    Interface(InterfaceId),
    Method(MethodId),
    Connector(ConnectorId),
    Invocation(InvocationId),
}

impl Entity {
    /// Kind name, as used in reports
    pub fn kind(&self) -> &'static str {
        match self {
            Entity::Node(_) => "node",
            Entity::Link(_) => "link",
            Entity::Component(_) => "component",
            Entity::Port(_) => "port",
            Entity::Interface(_) => "interface",
            Entity::Method(_) => "method",
            Entity::Connector(_) => "connector",
            Entity::Invocation(_) => "invocation",
        }
    }

    /// Raw numeric id, regardless of kind
    pub fn raw(&self) -> u64 {
        match *self {
            Entity::Node(id) => id.0,
            Entity::Link(id) => id.0,
            Entity::Component(id) => id.0,
            Entity::Port(id) => id.0,
            Entity::Interface(id) => id.0,
            Entity::Method(id) => id.0,
            Entity::Connector(id) => id.0,
            Entity::Invocation(id) => id.0,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind(), self.raw())
    }
}

macro_rules! entity_from {
    ($($id:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$id> for Entity {
                fn from(id: $id) -> Self {
                    Entity::$variant(id)
                }
            }
        )*
    };
}

entity_from! {
    NodeId => Node,
    LinkId => Link,
    ComponentId => Component,
    PortId => Port,
    InterfaceId => Interface,
    MethodId => Method,
    ConnectorId => Connector,
    InvocationId => Invocation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_formatting() {
        let port = PortId::new(7);
        assert_eq!(format!("{:?}", port), "Port(7)");
        assert_eq!(format!("{}", port), "port#7");
    }

    #[test]
    fn test_entity_kind_and_display() {
        let entity: Entity = ConnectorId::new(3).into();
        assert_eq!(entity.kind(), "connector");
        assert_eq!(entity.raw(), 3);
        assert_eq!(entity.to_string(), "connector#3");
    }

    #[test]
    fn test_entities_of_different_kinds_differ() {
        let a: Entity = NodeId::new(1).into();
        let b: Entity = ComponentId::new(1).into();
        assert_ne!(a, b);
    }
}
