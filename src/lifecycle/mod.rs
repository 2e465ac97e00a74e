//! Lifecycle signals.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Host tears down → navigation loop drains current event → exits
//!
//! Cancellation (cancel.rs):
//!     Genuine path change → pending retry delays abort → stale loads discarded
//! ```
//!
//! # Design Decisions
//! - Both are broadcast channels so any number of tasks can listen
//! - Triggering with no listeners is not an error

pub mod cancel;
pub mod shutdown;

pub use cancel::CancelSignal;
pub use shutdown::Shutdown;
