//! Reconciliation subsystem.
//!
//! # Data Flow
//! ```text
//! Boot / navigate / back / forward
//!     → history.rs (Navigation State: current pathname)
//!     → controller.rs
//!         → RouteTable lookup (unmatched → replace with `/`)
//!         → inference.rs (section from path markers)
//!         → repair section, then screen, then authenticated landing
//!         → DurableStateStore (per-slot writes)
//!         → dispatcher_for(section).resolve(screen)
//!     → ReconcileOutcome
//!
//! Async hosts:
//!     NavigationEvent → event_loop.rs (strictly in order) → outcome channel
//! ```
//!
//! # Design Decisions
//! - The path is authoritative over a stale persisted section
//! - One full pass per navigation; passes never overlap
//! - Persisted writes never trigger another pass
//! - Repairs are logged and counted, never surfaced as errors

pub mod controller;
pub mod event_loop;
pub mod history;
pub mod identity;
pub mod inference;

pub use controller::{
    LoadTicket, NavigateError, NavigateOptions, Phase, ReconcileOutcome, ReconciliationController,
    Repair,
};
pub use event_loop::{NavigationEvent, NavigationLoop};
pub use history::{History, HistoryEntry};
pub use identity::{IdentitySignal, KnownIdentities};
pub use inference::SectionMarkers;
