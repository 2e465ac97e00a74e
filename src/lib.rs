//! Navigation and view-state reconciliation engine.
//!
//! Decides which application section (passenger, driver, admin) is active,
//! which screen inside that section is rendered, how that pair survives a
//! restart, and how inconsistent persisted state is repaired.

pub mod config;
pub mod dispatch;
pub mod lifecycle;
pub mod loader;
pub mod observability;
pub mod reconcile;
pub mod routing;
pub mod session;
pub mod storage;

pub use config::schema::EngineConfig;
pub use dispatch::ViewKey;
pub use lifecycle::{CancelSignal, Shutdown};
pub use reconcile::{NavigateOptions, ReconcileOutcome, ReconciliationController};
pub use routing::RouteTable;
pub use session::{Section, Screen, SessionState};
