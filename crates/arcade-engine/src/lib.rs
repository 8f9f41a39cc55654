//! ARCADE Engine - temporal invariant engine and invocation query layer
//!
//! This crate implements the rules over a time-indexed architecture
//! snapshot and the operations built on them:
//! 1. Structural checks (hosting, ownership, coverage)
//! 2. Connectivity checks (reachability, reliable and local connectors)
//! 3. Invocation lifecycle checks (setup, execute, buffering window)
//! 4. TypeChecking (receivers offer the invoked method)
//! 5. Batch validation over a complete history
//! 6. Online monitoring with a one-step lookback window
//! 7. The router, the only programmatic writer of connector buffers
//! 8. The query layer: `Invoke`, `Invoked`, `Execute`, `TypeChecking`

pub mod config;
pub mod connectivity;
pub mod lifecycle;
pub mod monitor;
pub mod query;
pub mod router;
pub mod structural;
pub mod typecheck;
pub mod validator;
pub mod window;

pub use config::*;
pub use monitor::*;
pub use query::*;
pub use router::*;
pub use typecheck::*;
pub use validator::*;
pub use window::*;
