//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stdout / stderr (pretty or JSON)
//!     → Prometheus text rendering (CLI `--metrics`)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event (section, screen, path, key)
//! - Metrics are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
