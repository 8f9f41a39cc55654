//! The shop scenario
//!
//! Two nodes, `client` and `server`, joined by one link. A browser
//! component on the client calls `buy` on a shop component on the server
//! through a reliable connector. The round-trip variant adds the reverse
//! direction (`receipt`, shop to browser) so that every coverage rule can
//! hold.

use arcade_core::{
    ArcadeResult, Args, ComponentId, ConnectorId, InterfaceId, InvocationId, LinkId, MethodId,
    NodeId, PortId, Step,
};
use arcade_engine::{invoke, Router};
use arcade_model::{Architecture, ConnectorSpec, History, PortSpec};

pub const CLIENT: NodeId = NodeId(1);
pub const SERVER: NodeId = NodeId(2);
pub const NETWORK: LinkId = LinkId(1);

pub const BROWSER_APP: ComponentId = ComponentId(1);
pub const SHOP_APP: ComponentId = ComponentId(2);

pub const BROWSER: PortId = PortId(1);
pub const SHOP: PortId = PortId(2);

pub const SHOPPING: InterfaceId = InterfaceId(1);
pub const RECEIPTS: InterfaceId = InterfaceId(2);
pub const BUY: MethodId = MethodId(1);
pub const RECEIPT: MethodId = MethodId(2);

/// Browser to shop
pub const CHECKOUT: ConnectorId = ConnectorId(1);
/// Shop to browser, round trip only
pub const REPLY: ConnectorId = ConnectorId(2);

/// Builder for shop scenario histories
#[derive(Clone, Debug)]
pub struct ScenarioBuilder {
    steps: u32,
    shop_offers_buy: bool,
    linked: bool,
    reliable: bool,
    round_trip: bool,
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        ScenarioBuilder {
            steps: 4,
            shop_offers_buy: true,
            linked: true,
            reliable: true,
            round_trip: false,
        }
    }
}

impl ScenarioBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    /// The shop port provides no interface listing `buy`
    pub fn without_buy(mut self) -> Self {
        self.shop_offers_buy = false;
        self
    }

    /// Client and server have no link
    pub fn unlinked(mut self) -> Self {
        self.linked = false;
        self
    }

    /// Checkout connector is not declared reliable
    pub fn unreliable(mut self) -> Self {
        self.reliable = false;
        self
    }

    /// Add the reply connector and the receipts interface
    pub fn round_trip(mut self) -> Self {
        self.round_trip = true;
        self
    }

    /// Architecture, placement and wiring; no invocations
    pub fn build(&self) -> ArcadeResult<History> {
        let mut arch = Architecture::new();
        arch.add_node(CLIENT);
        arch.add_node(SERVER);
        arch.add_link(NETWORK);
        arch.add_component(BROWSER_APP);
        arch.add_component(SHOP_APP);

        arch.add_interface(SHOPPING, [BUY]);
        let mut browser = PortSpec::new().requiring(SHOPPING);
        let mut shop = PortSpec::new();
        if self.shop_offers_buy {
            shop = shop.providing(SHOPPING);
        }
        if self.round_trip {
            arch.add_interface(RECEIPTS, [RECEIPT]);
            browser = browser.providing(RECEIPTS);
            shop = shop.requiring(RECEIPTS);
        }
        arch.add_port(BROWSER, browser);
        arch.add_port(SHOP, shop);

        let checkout = ConnectorSpec::between(BROWSER, SHOP);
        arch.add_connector(CHECKOUT, if self.reliable { checkout.reliable() } else { checkout })?;
        if self.round_trip {
            arch.add_connector(REPLY, ConnectorSpec::between(SHOP, BROWSER))?;
        }

        let mut history = History::new(arch, self.steps)?;
        history.place(BROWSER_APP, CLIENT)?;
        history.place(SHOP_APP, SERVER)?;
        if self.linked {
            history.link(NETWORK, [CLIENT, SERVER])?;
        }
        history.attach(BROWSER, BROWSER_APP)?;
        history.attach(SHOP, SHOP_APP)?;
        Ok(history)
    }
}

/// `Invoke(browser, {shop}, buy, none, at)` and enqueue it
pub fn buy(history: &mut History, at: Step) -> ArcadeResult<InvocationId> {
    call(history, BROWSER, SHOP, BUY, at)
}

/// `Invoke(shop, {browser}, receipt, none, at)` and enqueue it
pub fn receipt(history: &mut History, at: Step) -> ArcadeResult<InvocationId> {
    call(history, SHOP, BROWSER, RECEIPT, at)
}

/// Execute a pending invocation at `at`
pub fn deliver(history: &mut History, id: InvocationId, at: Step) -> ArcadeResult<ConnectorId> {
    Router::new(history).execute(id, at)
}

fn call(
    history: &mut History,
    caller: PortId,
    receiver: PortId,
    method: MethodId,
    at: Step,
) -> ArcadeResult<InvocationId> {
    let id = invoke(history, caller, [receiver], method, Args::none(), at)?;
    Router::new(history).issue(id)?;
    Ok(id)
}

/// The full round trip: `buy` at `t0` delivered at `t1`, `receipt` at `t1`
/// delivered at `t2`
pub fn round_trip_history() -> ArcadeResult<History> {
    let mut history = ScenarioBuilder::new().round_trip().build()?;
    let order = buy(&mut history, Step(0))?;
    deliver(&mut history, order, Step(1))?;
    let ack = receipt(&mut history, Step(1))?;
    deliver(&mut history, ack, Step(2))?;
    Ok(history)
}
