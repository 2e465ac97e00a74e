//! Admin console screens.

use crate::dispatch::{neutral_view, SectionDispatcher, ViewKey};
use crate::session::{AdminScreen, Screen, Section};

/// Dispatcher for the admin section.
///
/// Unauthenticated visits start at `admin.login`; a known identity lands on
/// `admin.dashboard`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AdminDispatcher;

impl AdminDispatcher {
    /// Exhaustive screen to view table.
    fn view(screen: AdminScreen) -> ViewKey {
        match screen {
            AdminScreen::Login => ViewKey::from_static("admin.login"),
            AdminScreen::Dashboard => ViewKey::from_static("admin.dashboard"),
            AdminScreen::Settings => ViewKey::from_static("admin.settings"),
            AdminScreen::Diagnostic => ViewKey::from_static("admin.diagnostic"),
            AdminScreen::Drivers => ViewKey::from_static("admin.drivers"),
            AdminScreen::Rides => ViewKey::from_static("admin.rides"),
        }
    }
}

impl SectionDispatcher for AdminDispatcher {
    fn section(&self) -> Section {
        Section::Admin
    }

    fn entry_screen(&self) -> Screen {
        Screen::Admin(AdminScreen::Login)
    }

    fn landing_screen(&self) -> Option<Screen> {
        Some(Screen::Admin(AdminScreen::Dashboard))
    }

    fn view_for(&self, screen: &Screen) -> Option<ViewKey> {
        match screen {
            Screen::Admin(s) => Some(Self::view(*s)),
            Screen::Neutral(s) => Some(neutral_view(*s)),
            _ => None,
        }
    }

    fn entry_view(&self) -> ViewKey {
        Self::view(AdminScreen::Login)
    }
}
