//! Section dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Reconciled (section, screen)
//!     → dispatcher_for(section)
//!     → passenger.rs / driver.rs / admin.rs / LandingDispatcher
//!     → ViewKey of the screen, or the section's entry view
//!
//! Child screen requests a transition:
//!     → SectionDispatcher::set_screen (rejects foreign screens)
//! ```
//!
//! # Design Decisions
//! - Each dispatcher owns a closed, exhaustive screen → view table
//! - `resolve` never fails: unknown screens render the entry view
//! - `set_screen` is the single write path for screens, so the
//!   section/screen invariant is enforced where it is written

pub mod admin;
pub mod driver;
pub mod passenger;

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::observability::metrics;
use crate::session::{NeutralScreen, Screen, Section, SessionState};

pub use admin::AdminDispatcher;
pub use driver::DriverDispatcher;
pub use passenger::PassengerDispatcher;

/// Identifies a view component the host knows how to mount.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewKey(Cow<'static, str>);

impl ViewKey {
    pub const fn from_static(key: &'static str) -> Self {
        Self(Cow::Borrowed(key))
    }

    pub fn new(key: impl Into<String>) -> Self {
        Self(Cow::Owned(key.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// View for a screen shared by every section.
pub fn neutral_view(screen: NeutralScreen) -> ViewKey {
    match screen {
        NeutralScreen::Welcome => ViewKey::from_static("landing.welcome"),
    }
}

/// Per-section screen table and transition gate.
pub trait SectionDispatcher: Send + Sync + fmt::Debug {
    fn section(&self) -> Section;

    /// Screen shown when nothing valid is set (login or welcome).
    fn entry_screen(&self) -> Screen;

    /// Screen an already-authenticated identity lands on, if the section has one.
    fn landing_screen(&self) -> Option<Screen>;

    /// View for `screen`, or `None` when it is outside this section's table.
    /// Neutral screens are always inside.
    fn view_for(&self, screen: &Screen) -> Option<ViewKey>;

    fn entry_view(&self) -> ViewKey;

    fn accepts(&self, screen: &Screen) -> bool {
        self.view_for(screen).is_some()
    }

    /// View to mount for `screen`, falling back to the entry view.
    fn resolve(&self, screen: Option<&Screen>) -> ViewKey {
        match screen.and_then(|s| self.view_for(s)) {
            Some(view) => view,
            None => {
                tracing::debug!(
                    section = %self.section(),
                    screen = ?screen.map(Screen::id),
                    "Screen outside section table, using entry view"
                );
                self.entry_view()
            }
        }
    }

    /// Move `state` to `next` if this dispatcher owns both.
    ///
    /// Returns `false`, leaving `state` untouched, when `state` belongs to
    /// another section or `next` is outside this section's table.
    fn set_screen(&self, state: &mut SessionState, next: Screen) -> bool {
        if state.section() != self.section() || !self.accepts(&next) {
            tracing::warn!(
                section = %self.section(),
                active_section = %state.section(),
                screen = %next,
                "Rejected screen transition"
            );
            metrics::record_rejected_screen(self.section());
            return false;
        }
        tracing::debug!(section = %self.section(), screen = %next, "Screen transition");
        state.screen = Some(next);
        true
    }
}

/// Dispatcher for `Section::None`: only neutral screens.
#[derive(Debug, Default, Clone, Copy)]
pub struct LandingDispatcher;

impl SectionDispatcher for LandingDispatcher {
    fn section(&self) -> Section {
        Section::None
    }

    fn entry_screen(&self) -> Screen {
        Screen::WELCOME
    }

    fn landing_screen(&self) -> Option<Screen> {
        None
    }

    fn view_for(&self, screen: &Screen) -> Option<ViewKey> {
        match screen {
            Screen::Neutral(s) => Some(neutral_view(*s)),
            _ => None,
        }
    }

    fn entry_view(&self) -> ViewKey {
        neutral_view(NeutralScreen::Welcome)
    }
}

static PASSENGER: PassengerDispatcher = PassengerDispatcher;
static DRIVER: DriverDispatcher = DriverDispatcher;
static ADMIN: AdminDispatcher = AdminDispatcher;
static LANDING: LandingDispatcher = LandingDispatcher;

/// The dispatcher responsible for `section`.
pub fn dispatcher_for(section: Section) -> &'static dyn SectionDispatcher {
    match section {
        Section::Passenger => &PASSENGER,
        Section::Driver => &DRIVER,
        Section::Admin => &ADMIN,
        Section::None => &LANDING,
    }
}
