//! Deferred view loading.
//!
//! # Data Flow
//! ```text
//! Dispatcher resolves a ViewKey
//!     → registry.rs (eager module, or deferred importer)
//!     → retry.rs (one retry per module per tab session)
//!         → marker store (volatile, tab-session scoped)
//!     → Mounted::Ready | Mounted::Failed(ErrorView) | Mounted::Discarded
//! ```
//!
//! # Design Decisions
//! - Bounded: at most two attempts per call, and only one retry per module
//!   until the tab session ends
//! - The retry delay aborts when the user navigates away
//! - A final failure becomes an error view offering a reload, never a panic

pub mod registry;
pub mod retry;

pub use registry::{ErrorView, ImportFuture, ModuleImporter, Mounted, ViewModule, ViewRegistry};
pub use retry::{BoxError, DeferredLoader, LoadError};
