//! Key-value storage subsystem.
//!
//! # Data Flow
//! ```text
//! Controller mutation (section / screen / payload)
//!     → durable.rs (slot naming, serialization, defensive reads)
//!     → KeyValueStore backend
//!         → file.rs   (survives restart)
//!         → memory.rs (volatile, tab-session scoped)
//! ```
//!
//! # Design Decisions
//! - Backends store strings only, like browser storage
//! - Writes are best-effort; callers above this layer never see write errors
//! - Corrupt values are treated as absent and removed on read

pub mod durable;
pub mod file;
pub mod memory;

use thiserror::Error;

pub use durable::{DurableStateStore, Slot};
pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A write would push the store past its quota.
    #[error("storage quota exceeded: {needed} bytes needed, quota is {quota} bytes")]
    QuotaExceeded { needed: usize, quota: usize },

    /// Storage has been switched off (private mode, user settings).
    #[error("storage is disabled")]
    Disabled,

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not a JSON object of strings.
    #[error("storage contents are not readable: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// A string key-value store.
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
