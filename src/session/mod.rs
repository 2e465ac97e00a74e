//! Session vocabulary and persisted view state.
//!
//! # Data Flow
//! ```text
//! Durable store slots (section, screen, payload.*)
//!     → state.rs (SessionState, section payloads)
//!     → screen.rs (Section, Screen: closed per-section vocabularies)
//!     → dispatch (which view renders the screen)
//! ```
//!
//! # Design Decisions
//! - Screen identifiers are closed enums per section, never free strings
//! - Identifiers are unique across all vocabularies, so a persisted id
//!   always decodes to exactly one screen
//! - Neutral screens are valid under every section, including `none`

pub mod screen;
pub mod state;

pub use screen::{AdminScreen, DriverScreen, NeutralScreen, PassengerScreen, Screen, Section};
pub use state::{AdminPayload, DriverPayload, PassengerPayload, SectionPayloads, SessionState};
