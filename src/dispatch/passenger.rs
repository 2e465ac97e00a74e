//! Passenger application screens.

use crate::dispatch::{neutral_view, SectionDispatcher, ViewKey};
use crate::session::{PassengerScreen, Screen, Section};

/// Dispatcher for the passenger section.
///
/// Unauthenticated visits start at `passenger.login`; a known identity lands on
/// `passenger.map`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassengerDispatcher;

impl PassengerDispatcher {
    /// Exhaustive screen to view table.
    fn view(screen: PassengerScreen) -> ViewKey {
        match screen {
            PassengerScreen::Login => ViewKey::from_static("passenger.login"),
            PassengerScreen::Register => ViewKey::from_static("passenger.register"),
            PassengerScreen::Map => ViewKey::from_static("passenger.map"),
            PassengerScreen::RideRequest => ViewKey::from_static("passenger.ride-request"),
            PassengerScreen::RideTracking => ViewKey::from_static("passenger.ride-tracking"),
            PassengerScreen::RideHistory => ViewKey::from_static("passenger.ride-history"),
            PassengerScreen::Profile => ViewKey::from_static("passenger.profile"),
        }
    }
}

impl SectionDispatcher for PassengerDispatcher {
    fn section(&self) -> Section {
        Section::Passenger
    }

    fn entry_screen(&self) -> Screen {
        Screen::Passenger(PassengerScreen::Login)
    }

    fn landing_screen(&self) -> Option<Screen> {
        Some(Screen::Passenger(PassengerScreen::Map))
    }

    fn view_for(&self, screen: &Screen) -> Option<ViewKey> {
        match screen {
            Screen::Passenger(s) => Some(Self::view(*s)),
            Screen::Neutral(s) => Some(neutral_view(*s)),
            _ => None,
        }
    }

    fn entry_view(&self) -> ViewKey {
        Self::view(PassengerScreen::Login)
    }
}
