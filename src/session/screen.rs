//! Sections and their screen vocabularies.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// One of the independently developed top-level applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Passenger,
    Driver,
    Admin,
    /// First visit, or a path that names no section.
    #[default]
    None,
}

impl Section {
    /// Sections that own an application, in path-inference priority order.
    pub const APPS: [Section; 3] = [Section::Driver, Section::Admin, Section::Passenger];

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Passenger => "passenger",
            Section::Driver => "driver",
            Section::Admin => "admin",
            Section::None => "none",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "passenger" => Some(Section::Passenger),
            "driver" => Some(Section::Driver),
            "admin" => Some(Section::Admin),
            "none" => Some(Section::None),
            _ => None,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! screen_vocabulary {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $id:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stable identifier used in persisted state.
            pub fn id(self) -> &'static str {
                match self {
                    $($name::$variant => $id),+
                }
            }

            pub fn from_id(id: &str) -> Option<Self> {
                match id {
                    $($id => Some($name::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

screen_vocabulary! {
    /// Screens usable from any section.
    NeutralScreen {
        Welcome => "welcome",
    }
}

screen_vocabulary! {
    PassengerScreen {
        Login => "passenger-login",
        Register => "passenger-register",
        Map => "map",
        RideRequest => "ride-request",
        RideTracking => "ride-tracking",
        RideHistory => "ride-history",
        Profile => "passenger-profile",
    }
}

screen_vocabulary! {
    DriverScreen {
        Login => "driver-login",
        Register => "driver-register",
        Dashboard => "driver-dashboard",
        Trips => "driver-trips",
        Earnings => "driver-earnings",
        Vehicle => "driver-vehicle",
    }
}

screen_vocabulary! {
    AdminScreen {
        Login => "admin-login",
        Dashboard => "admin-dashboard",
        Settings => "admin-settings",
        Diagnostic => "admin-diagnostic",
        Drivers => "admin-drivers",
        Rides => "admin-rides",
    }
}

/// A screen tagged with the vocabulary it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Neutral(NeutralScreen),
    Passenger(PassengerScreen),
    Driver(DriverScreen),
    Admin(AdminScreen),
}

impl Screen {
    pub const WELCOME: Screen = Screen::Neutral(NeutralScreen::Welcome);

    pub fn id(&self) -> &'static str {
        match self {
            Screen::Neutral(s) => s.id(),
            Screen::Passenger(s) => s.id(),
            Screen::Driver(s) => s.id(),
            Screen::Admin(s) => s.id(),
        }
    }

    /// Decode a persisted identifier. Unknown identifiers yield `None`.
    pub fn from_id(id: &str) -> Option<Self> {
        NeutralScreen::from_id(id)
            .map(Screen::Neutral)
            .or_else(|| PassengerScreen::from_id(id).map(Screen::Passenger))
            .or_else(|| DriverScreen::from_id(id).map(Screen::Driver))
            .or_else(|| AdminScreen::from_id(id).map(Screen::Admin))
    }

    /// The section whose vocabulary owns this screen. Neutral screens report `None`.
    pub fn section(&self) -> Section {
        match self {
            Screen::Neutral(_) => Section::None,
            Screen::Passenger(_) => Section::Passenger,
            Screen::Driver(_) => Section::Driver,
            Screen::Admin(_) => Section::Admin,
        }
    }

    pub fn is_neutral(&self) -> bool {
        matches!(self, Screen::Neutral(_))
    }

    /// True when the screen may be shown while `section` is active.
    pub fn is_valid_for(&self, section: Section) -> bool {
        self.is_neutral() || self.section() == section
    }

    /// Every screen across all vocabularies.
    pub fn all() -> impl Iterator<Item = Screen> {
        NeutralScreen::ALL
            .iter()
            .copied()
            .map(Screen::Neutral)
            .chain(PassengerScreen::ALL.iter().copied().map(Screen::Passenger))
            .chain(DriverScreen::ALL.iter().copied().map(Screen::Driver))
            .chain(AdminScreen::ALL.iter().copied().map(Screen::Admin))
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl Serialize for Screen {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

impl<'de> Deserialize<'de> for Screen {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        Screen::from_id(&id).ok_or_else(|| de::Error::custom(format!("unknown screen id `{id}`")))
    }
}
