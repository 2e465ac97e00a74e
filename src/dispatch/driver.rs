//! Driver application screens.

use crate::dispatch::{neutral_view, SectionDispatcher, ViewKey};
use crate::session::{DriverScreen, Screen, Section};

/// Dispatcher for the driver section.
///
/// Unauthenticated visits start at `driver.login`; a known identity lands on
/// `driver.dashboard`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DriverDispatcher;

impl DriverDispatcher {
    /// Exhaustive screen to view table.
    fn view(screen: DriverScreen) -> ViewKey {
        match screen {
            DriverScreen::Login => ViewKey::from_static("driver.login"),
            DriverScreen::Register => ViewKey::from_static("driver.register"),
            DriverScreen::Dashboard => ViewKey::from_static("driver.dashboard"),
            DriverScreen::Trips => ViewKey::from_static("driver.trips"),
            DriverScreen::Earnings => ViewKey::from_static("driver.earnings"),
            DriverScreen::Vehicle => ViewKey::from_static("driver.vehicle"),
        }
    }
}

impl SectionDispatcher for DriverDispatcher {
    fn section(&self) -> Section {
        Section::Driver
    }

    fn entry_screen(&self) -> Screen {
        Screen::Driver(DriverScreen::Login)
    }

    fn landing_screen(&self) -> Option<Screen> {
        Some(Screen::Driver(DriverScreen::Dashboard))
    }

    fn view_for(&self, screen: &Screen) -> Option<ViewKey> {
        match screen {
            Screen::Driver(s) => Some(Self::view(*s)),
            Screen::Neutral(s) => Some(neutral_view(*s)),
            _ => None,
        }
    }

    fn entry_view(&self) -> ViewKey {
        Self::view(DriverScreen::Login)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{AdminScreen, SectionPayloads, SessionState};

    #[test]
    fn test_driver_transitions() {
        let d = DriverDispatcher;
        let mut state = SessionState::from_parts(
            Section::Driver,
            Some(d.entry_screen()),
            SectionPayloads::default(),
        );

        assert!(d.set_screen(&mut state, Screen::Driver(DriverScreen::Earnings)));
        assert_eq!(d.resolve(state.screen().as_ref()).as_str(), "driver.earnings");

        // Admin screens never leak into the driver app
        assert!(!d.set_screen(&mut state, Screen::Admin(AdminScreen::Settings)));
        assert_eq!(state.screen(), Some(Screen::Driver(DriverScreen::Earnings)));
    }
}
