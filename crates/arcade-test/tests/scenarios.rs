//! Walkthroughs of the shop scenario and the model's testable properties

use arcade_core::{ArcadeError, Args, Entity, Rule, Step, ViolationClass};
use arcade_engine::{Queries, Router, Validator, ValidatorConfig};
use arcade_model::InvocationState;
use arcade_test::{
    buy, deliver, round_trip_history, ScenarioBuilder, BROWSER, BROWSER_APP, BUY, CHECKOUT, REPLY,
    SHOP, SHOP_APP,
};

#[test]
fn test_shop_walkthrough() {
    let mut history = ScenarioBuilder::new().build().unwrap();
    let order = buy(&mut history, Step(0)).unwrap();

    {
        let queries = Queries::new(&history).unwrap();
        assert!(queries.invoked(BROWSER, SHOP, BUY, &Args::none(), Step(0)));
        assert!(!queries.invoked(BROWSER, SHOP, BUY, &Args::none(), Step(1)));
        assert!(queries.type_checks());
        assert_eq!(queries.state(order), Some(InvocationState::Pending));
    }

    assert_eq!(deliver(&mut history, order, Step(1)).unwrap(), CHECKOUT);

    let queries = Queries::new(&history).unwrap();
    assert!(queries.execute(BROWSER, SHOP, BUY, &Args::none(), Step(1)));
    assert_eq!(queries.delivering_connector(order, SHOP, Step(1)), Some(CHECKOUT));
    assert_eq!(queries.state(order), Some(InvocationState::Completed));

    let report = Validator::new(ValidatorConfig::relaxed()).validate(&history);
    assert!(report.is_clean(), "{}", report);
}

#[test]
fn test_args_do_not_take_part_in_matching() {
    let mut history = ScenarioBuilder::new().build().unwrap();
    buy(&mut history, Step(0)).unwrap();

    let queries = Queries::new(&history).unwrap();
    let payload = Args::from_static(b"two apples");
    assert!(queries.invoked(BROWSER, SHOP, BUY, &payload, Step(0)));
}

#[test]
fn test_round_trip_satisfies_every_rule() {
    let history = round_trip_history().unwrap();
    let report = Validator::new(ValidatorConfig::strict()).validate(&history);
    assert!(report.is_clean(), "{}", report);
}

#[test]
fn test_missing_method_is_capability_violation() {
    let mut history = ScenarioBuilder::new().without_buy().build().unwrap();
    let order = buy(&mut history, Step(0)).unwrap();
    // keep it locatable so the capability finding stands alone
    Router::new(&mut history).hold(order, Step(3)).unwrap();

    let found = Queries::new(&history).unwrap().type_checking();
    assert_eq!(found.by_rule(Rule::Capability).count(), 1);
    assert_eq!(found.violations()[0].subject, Entity::Invocation(order));

    // a warning by default, an error when capability is fatal
    let report = Validator::new(ValidatorConfig::relaxed()).validate(&history);
    assert_eq!(report.len(), 1, "{}", report);
    assert!(report.has(Rule::Capability));
    assert!(report.passed());

    let strict = ValidatorConfig {
        capability_is_fatal: true,
        ..ValidatorConfig::relaxed()
    };
    assert!(!Validator::new(strict).validate(&history).passed());
}

#[test]
fn test_double_enqueue_is_routing_violation() {
    let mut history = ScenarioBuilder::new().round_trip().build().unwrap();
    let order = buy(&mut history, Step(0)).unwrap();
    history.record_buffered(REPLY, order, Step(0)).unwrap();

    let report = Validator::new(ValidatorConfig::relaxed()).validate(&history);
    let setup: Vec<_> = report.by_rule(Rule::SetupBuffering).collect();
    assert_eq!(setup.len(), 1);
    assert_eq!(setup[0].step, Some(Step(0)));
    assert_eq!(setup[0].class(), ViolationClass::Routing);
}

#[test]
fn test_deployment_totality() {
    let mut history = ScenarioBuilder::new().build().unwrap();
    history.step_mut(Step(2)).unwrap().topology.evict(SHOP_APP);

    let report = Validator::new(ValidatorConfig::relaxed()).validate(&history);
    let hosting: Vec<_> = report.by_rule(Rule::ComponentHosting).collect();
    assert_eq!(hosting.len(), 1);
    assert_eq!(hosting[0].step, Some(Step(2)));
    assert!(report.has_structural());

    assert!(matches!(
        Queries::new(&history),
        Err(ArcadeError::InvalidSnapshot(_))
    ));
}

#[test]
fn test_single_buffering_and_retirement() {
    let history = round_trip_history().unwrap();
    for inv in history.invocations() {
        let invoked = inv.invoked.unwrap();
        let executed = inv.executed.unwrap();
        let setup = history.step(invoked).unwrap().holders(inv.id);
        assert_eq!(setup.len(), 1);
        if let Some(before) = history.timeline().prev(invoked) {
            assert!(!history.step(before).unwrap().holds(setup[0], inv.id));
        }

        let done = history.step(executed).unwrap().holders(inv.id);
        assert_eq!(done.len(), 1);
        if let Some(after) = history.timeline().next(executed) {
            assert!(!history.step(after).unwrap().holds(done[0], inv.id));
        }
    }
}

#[test]
fn test_execute_never_precedes_invoke() {
    let mut history = ScenarioBuilder::new().build().unwrap();
    let order = buy(&mut history, Step(2)).unwrap();

    assert!(matches!(
        Router::new(&mut history).execute(order, Step(1)),
        Err(ArcadeError::ExecuteBeforeInvoke { .. })
    ));

    // written behind the router's back
    history.set_executed(order, Step(1)).unwrap();
    let report = Validator::new(ValidatorConfig::relaxed()).validate(&history);
    assert!(report.has(Rule::ExecuteOrdering));
}

#[test]
fn test_reliable_connector_keeps_its_components() {
    for reliable in [true, false] {
        let builder = if reliable {
            ScenarioBuilder::new()
        } else {
            ScenarioBuilder::new().unreliable()
        };
        let mut history = builder.build().unwrap();
        // the shop port changes hands at t2
        history.detach_from(SHOP, SHOP_APP, Step(2)).unwrap();
        history.attach_from(SHOP, BROWSER_APP, Step(2)).unwrap();

        assert_eq!(
            history.fabric().first_dropped(CHECKOUT),
            Some((Step(1), SHOP_APP))
        );
        let report = Validator::new(ValidatorConfig::relaxed()).validate(&history);
        assert_eq!(report.has(Rule::ReliableConnector), reliable, "{}", report);
    }
}

#[test]
fn test_unlinked_connector_unreachable() {
    let history = ScenarioBuilder::new().unlinked().build().unwrap();
    let report = Validator::new(ValidatorConfig::relaxed()).validate(&history);
    assert_eq!(
        report.by_rule(Rule::ConnectorReachability).count(),
        history.timeline().len() as usize
    );
}

#[test]
fn test_pending_at_end_is_valid() {
    let mut history = ScenarioBuilder::new().build().unwrap();
    let order = buy(&mut history, Step(1)).unwrap();
    Router::new(&mut history).hold(order, Step(3)).unwrap();

    let report = Validator::new(ValidatorConfig::relaxed()).validate(&history);
    assert!(report.is_clean(), "{}", report);
    let queries = Queries::new(&history).unwrap();
    assert_eq!(queries.state(order), Some(InvocationState::Pending));
}
