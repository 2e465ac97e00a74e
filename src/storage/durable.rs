//! Durable session-state store.
//!
//! # Responsibilities
//! - Map the session state onto a fixed set of named slots
//! - Write individual slots as they change (best-effort)
//! - Read slots defensively: malformed values are removed and reported absent
//!
//! # Design Decisions
//! - Write failures are logged and counted, never returned
//! - The first write failure flips the store into degraded mode; the engine
//!   keeps working from memory
//! - A key that failed to decode is deleted so it is never re-read

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::observability::metrics;
use crate::session::{
    AdminPayload, DriverPayload, PassengerPayload, Screen, Section, SectionPayloads, SessionState,
};
use crate::storage::{KeyValueStore, StorageError};

/// The named slots owned by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Section,
    Screen,
    PassengerPayload,
    DriverPayload,
    AdminPayload,
}

impl Slot {
    pub const ALL: [Slot; 5] = [
        Slot::Section,
        Slot::Screen,
        Slot::PassengerPayload,
        Slot::DriverPayload,
        Slot::AdminPayload,
    ];

    fn suffix(self) -> &'static str {
        match self {
            Slot::Section => "section",
            Slot::Screen => "screen",
            Slot::PassengerPayload => "payload.passenger",
            Slot::DriverPayload => "payload.driver",
            Slot::AdminPayload => "payload.admin",
        }
    }
}

/// A value that can live in a slot.
pub trait SlotValue: Serialize + DeserializeOwned {
    /// Range checks beyond what deserialization enforces.
    fn is_well_formed(&self) -> bool {
        true
    }
}

impl SlotValue for Section {}
impl SlotValue for Screen {}

impl SlotValue for PassengerPayload {
    fn is_well_formed(&self) -> bool {
        PassengerPayload::is_well_formed(self)
    }
}

impl SlotValue for DriverPayload {
    fn is_well_formed(&self) -> bool {
        DriverPayload::is_well_formed(self)
    }
}

impl SlotValue for AdminPayload {
    fn is_well_formed(&self) -> bool {
        AdminPayload::is_well_formed(self)
    }
}

/// Session-state persistence over any [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct DurableStateStore {
    backend: Arc<dyn KeyValueStore>,
    namespace: String,
    degraded: Arc<AtomicBool>,
}

impl DurableStateStore {
    /// Store whose slot keys are prefixed with `namespace`.
    pub fn new(backend: Arc<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        Self {
            backend,
            namespace: namespace.into(),
            degraded: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Full storage key for a slot.
    pub fn key(&self, slot: Slot) -> String {
        format!("{}.{}", self.namespace, slot.suffix())
    }

    /// True once any write has failed during this run.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    /// Persist every slot of `state`.
    pub fn save(&self, state: &SessionState) {
        self.save_section(state.section());
        self.save_screen(state.screen());
        self.write_slot(Slot::PassengerPayload, &state.payloads().passenger);
        self.write_slot(Slot::DriverPayload, &state.payloads().driver);
        self.write_slot(Slot::AdminPayload, &state.payloads().admin);
    }

    /// Persist only the section slot.
    pub fn save_section(&self, section: Section) {
        self.write_slot(Slot::Section, &section);
    }

    /// Persist the screen slot. `None` removes it.
    pub fn save_screen(&self, screen: Option<Screen>) {
        match screen {
            Some(screen) => self.write_slot(Slot::Screen, &screen),
            None => self.remove_slot(Slot::Screen),
        }
    }

    /// Persist the payload slot belonging to `section`.
    pub fn save_payload(&self, section: Section, payloads: &SectionPayloads) {
        match section {
            Section::Passenger => self.write_slot(Slot::PassengerPayload, &payloads.passenger),
            Section::Driver => self.write_slot(Slot::DriverPayload, &payloads.driver),
            Section::Admin => self.write_slot(Slot::AdminPayload, &payloads.admin),
            Section::None => {}
        }
    }

    /// Read back the session state.
    ///
    /// Returns `None` when neither section nor screen is readable. Payload
    /// slots that are missing or malformed fall back to their defaults.
    pub fn load(&self) -> Option<SessionState> {
        let section = self.read_slot::<Section>(Slot::Section);
        let screen = self.read_slot::<Screen>(Slot::Screen);
        if section.is_none() && screen.is_none() {
            return None;
        }

        let payloads = SectionPayloads {
            passenger: self.read_slot(Slot::PassengerPayload).unwrap_or_default(),
            driver: self.read_slot(Slot::DriverPayload).unwrap_or_default(),
            admin: self.read_slot(Slot::AdminPayload).unwrap_or_default(),
        };

        Some(SessionState::from_parts(
            section.unwrap_or_default(),
            screen,
            payloads,
        ))
    }

    /// Defensive read of a single slot.
    pub fn read_slot<T: SlotValue>(&self, slot: Slot) -> Option<T> {
        let key = self.key(slot);
        let raw = match self.backend.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(StorageError::Corrupt(e)) => {
                // The backend itself is unreadable; removing resets it.
                self.drop_corrupt(&key, &e.to_string());
                return None;
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read persisted slot");
                metrics::record_storage_failure("read");
                return None;
            }
        };

        match serde_json::from_str::<T>(&raw) {
            Ok(value) if value.is_well_formed() => Some(value),
            Ok(_) => {
                self.drop_corrupt(&key, "field out of range");
                None
            }
            Err(e) => {
                self.drop_corrupt(&key, &e.to_string());
                None
            }
        }
    }

    /// Remove every slot. Used on logout and explicit reset.
    pub fn clear(&self) {
        for slot in Slot::ALL {
            self.remove_slot(slot);
        }
        tracing::info!(namespace = %self.namespace, "Persisted session state cleared");
    }

    fn write_slot<T: SlotValue>(&self, slot: Slot, value: &T) {
        let key = self.key(slot);
        if !value.is_well_formed() {
            tracing::warn!(key = %key, "Refusing to persist malformed value");
            return;
        }
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to serialize slot");
                return;
            }
        };
        if let Err(e) = self.backend.set(&key, &raw) {
            self.note_write_failure(&key, "write", &e);
        }
    }

    fn remove_slot(&self, slot: Slot) {
        let key = self.key(slot);
        if let Err(e) = self.backend.remove(&key) {
            self.note_write_failure(&key, "remove", &e);
        }
    }

    fn drop_corrupt(&self, key: &str, reason: &str) {
        tracing::warn!(key = %key, reason = %reason, "Dropping malformed persisted slot");
        metrics::record_corrupt_slot();
        if let Err(e) = self.backend.remove(key) {
            self.note_write_failure(key, "remove", &e);
        }
    }

    fn note_write_failure(&self, key: &str, op: &'static str, error: &dyn std::error::Error) {
        metrics::record_storage_failure(op);
        if !self.degraded.swap(true, Ordering::Relaxed) {
            tracing::warn!(
                key = %key,
                error = %error,
                "Persistence unavailable, continuing with in-memory state"
            );
        } else {
            tracing::debug!(key = %key, error = %error, "Persisted write skipped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{AdminScreen, PassengerScreen};
    use crate::storage::MemoryStore;

    fn store() -> (MemoryStore, DurableStateStore) {
        let backend = MemoryStore::new();
        let durable = DurableStateStore::new(Arc::new(backend.clone()), "nav");
        (backend, durable)
    }

    #[test]
    fn test_load_empty_is_none() {
        let (_, durable) = store();
        assert!(durable.load().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let (_, durable) = store();
        let mut payloads = SectionPayloads::default();
        payloads.admin.exchange_rate = Some(3.2);
        let state = SessionState::from_parts(
            Section::Admin,
            Some(Screen::Admin(AdminScreen::Settings)),
            payloads,
        );

        durable.save(&state);
        assert_eq!(durable.load(), Some(state));
    }

    #[test]
    fn test_non_numeric_value_is_dropped() {
        let (backend, durable) = store();
        backend
            .set("nav.payload.admin", r#"{"exchange_rate":"abc"}"#)
            .unwrap();

        assert!(durable.read_slot::<AdminPayload>(Slot::AdminPayload).is_none());
        assert!(backend.get("nav.payload.admin").unwrap().is_none());
    }

    #[test]
    fn test_out_of_range_value_is_dropped() {
        let (backend, durable) = store();
        backend
            .set("nav.payload.admin", r#"{"exchange_rate":-4.0}"#)
            .unwrap();

        assert!(durable.read_slot::<AdminPayload>(Slot::AdminPayload).is_none());
        assert!(backend.get("nav.payload.admin").unwrap().is_none());
    }

    #[test]
    fn test_corrupt_slot_does_not_discard_others() {
        let (backend, durable) = store();
        backend.set("nav.section", "\"passenger\"").unwrap();
        backend.set("nav.screen", "\"teleporter\"").unwrap();
        backend
            .set("nav.payload.passenger", r#"{"pickup":"Depot"}"#)
            .unwrap();

        let state = durable.load().unwrap();
        assert_eq!(state.section(), Section::Passenger);
        assert!(state.screen().is_none());
        assert_eq!(state.payloads().passenger.pickup.as_deref(), Some("Depot"));
        assert!(backend.get("nav.screen").unwrap().is_none());
    }

    #[test]
    fn test_unparseable_section_is_dropped() {
        let (backend, durable) = store();
        backend.set("nav.section", "{{{").unwrap();
        assert!(durable.load().is_none());
        assert!(backend.get("nav.section").unwrap().is_none());
    }

    #[test]
    fn test_write_failure_degrades_silently() {
        let (backend, durable) = store();
        backend.set_disabled(true);

        durable.save_screen(Some(Screen::Passenger(PassengerScreen::Map)));
        assert!(durable.is_degraded());

        backend.set_disabled(false);
        assert!(durable.load().is_none());
    }

    #[test]
    fn test_clear() {
        let (backend, durable) = store();
        durable.save(&SessionState::from_parts(
            Section::Passenger,
            Some(Screen::WELCOME),
            SectionPayloads::default(),
        ));
        assert!(!backend.is_empty());

        durable.clear();
        assert!(backend.is_empty());
    }
}
