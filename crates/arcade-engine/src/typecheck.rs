//! TypeChecking: every receiver of an invoked call offers the invoked method
//!
//! A history-wide check. It quantifies over invocations that were ever
//! invoked, not over steps, so it runs once per history.

use std::collections::BTreeMap;

use arcade_core::{InvocationId, Rule, Violation};
use arcade_model::{Catalog, Invocation};

/// Capability findings for every invoked invocation, at error severity.
/// Callers decide whether they count against the verdict.
pub fn type_checking(
    catalog: &Catalog,
    invocations: &BTreeMap<InvocationId, Invocation>,
) -> Vec<Violation> {
    let mut found = Vec::new();
    for inv in invocations.values().filter(|inv| inv.invoked.is_some()) {
        let Some(method) = inv.of else {
            found.push(Violation::timeless(
                Rule::Capability,
                inv.id,
                "invoked without a method",
            ));
            continue;
        };
        for receiver in &inv.receivers {
            if !catalog.offers(*receiver, method) {
                found.push(Violation::timeless(
                    Rule::Capability,
                    inv.id,
                    format!("receiver {} does not offer {}", receiver, method),
                ));
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_core::{Args, InterfaceId, MethodId, PortId, Step};
    use arcade_model::PortSpec;

    const SHOPPING: InterfaceId = InterfaceId(1);
    const BUY: MethodId = MethodId(1);
    const BROWSE: MethodId = MethodId(2);

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.add_interface(SHOPPING, [BUY]);
        catalog.add_port(PortId(1), PortSpec::new().requiring(SHOPPING));
        catalog.add_port(PortId(2), PortSpec::new().providing(SHOPPING));
        catalog.add_port(PortId(3), PortSpec::new());
        catalog
    }

    fn invoked(id: u64, receivers: &[u64], method: MethodId) -> (InvocationId, Invocation) {
        let mut inv = Invocation::call(
            InvocationId(id),
            PortId(1),
            receivers.iter().map(|r| PortId(*r)),
            method,
            Args::none(),
        );
        inv.invoked = Some(Step(0));
        (inv.id, inv)
    }

    #[test]
    fn test_offered_method_passes() {
        let table = BTreeMap::from([invoked(0, &[2], BUY)]);
        assert!(type_checking(&catalog(), &table).is_empty());
    }

    #[test]
    fn test_every_receiver_checked() {
        let table = BTreeMap::from([invoked(0, &[2, 3], BUY), invoked(1, &[2], BROWSE)]);
        let found = type_checking(&catalog(), &table);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|v| v.rule == Rule::Capability && v.step.is_none()));
    }

    #[test]
    fn test_unissued_ignored() {
        let (id, mut inv) = invoked(0, &[3], BUY);
        inv.invoked = None;
        let table = BTreeMap::from([(id, inv)]);
        assert!(type_checking(&catalog(), &table).is_empty());
    }

    #[test]
    fn test_missing_method() {
        let (id, mut inv) = invoked(0, &[2], BUY);
        inv.of = None;
        let table = BTreeMap::from([(id, inv)]);
        assert_eq!(type_checking(&catalog(), &table).len(), 1);
    }
}
