//! The persisted (section, screen, payload) tuple.
//!
//! # Responsibilities
//! - Hold the one piece of view state that survives a restart
//! - Answer whether the current (section, screen) pair is consistent
//! - Carry per-section auxiliary payloads
//!
//! Fields are only mutable inside the crate. Screen changes go through a
//! section dispatcher, section changes through the reconciliation controller.

use serde::{Deserialize, Serialize};

use crate::session::screen::{Screen, Section};

/// Draft ride data kept by the passenger application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassengerPayload {
    pub pickup: Option<String>,
    pub destination: Option<String>,
    pub fare_estimate: Option<f64>,
}

impl PassengerPayload {
    pub fn is_well_formed(&self) -> bool {
        self.fare_estimate.map_or(true, f64::is_finite)
    }
}

/// Shift data kept by the driver application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverPayload {
    pub vehicle_id: Option<String>,
    pub online: bool,
    pub earnings_today: Option<f64>,
}

impl DriverPayload {
    pub fn is_well_formed(&self) -> bool {
        self.earnings_today.map_or(true, f64::is_finite)
    }
}

/// Console data kept by the admin application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminPayload {
    pub exchange_rate: Option<f64>,
    pub region: Option<String>,
}

impl AdminPayload {
    pub fn is_well_formed(&self) -> bool {
        self.exchange_rate.map_or(true, |rate| rate.is_finite() && rate > 0.0)
    }
}

/// Payloads for every section, each persisted in its own slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionPayloads {
    pub passenger: PassengerPayload,
    pub driver: DriverPayload,
    pub admin: AdminPayload,
}

/// The active section, the screen shown inside it and the section payloads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub(crate) section: Section,
    pub(crate) screen: Option<Screen>,
    pub(crate) payloads: SectionPayloads,
}

impl SessionState {
    /// State on a first visit: no section, no screen.
    pub fn initial() -> Self {
        Self::default()
    }

    /// Build a state from raw parts, as read back from storage.
    ///
    /// The result may violate the screen/section invariant; the
    /// reconciliation pass is what brings it back into shape.
    pub fn from_parts(section: Section, screen: Option<Screen>, payloads: SectionPayloads) -> Self {
        Self {
            section,
            screen,
            payloads,
        }
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn screen(&self) -> Option<Screen> {
        self.screen
    }

    pub fn payloads(&self) -> &SectionPayloads {
        &self.payloads
    }

    /// True when a screen is set and belongs to the section or the neutral set.
    pub fn is_consistent(&self) -> bool {
        self.screen
            .map_or(false, |screen| screen.is_valid_for(self.section))
    }
}
