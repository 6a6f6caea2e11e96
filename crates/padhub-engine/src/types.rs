use std::fmt;

use serde::{Serialize, Serializer};

/// Identity the hardware layer assigns to a connected controller instance.
/// Unique among connected devices, not stable across reconnects.
pub type DeviceId = u32;

/// Enumeration index carried by a device-added event.
pub type DeviceIndex = u32;

/// Player number used to address commands at one controller.
///
/// `0` means unassigned, and in command contexts "every controller".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PlayerSlot(u8);

impl PlayerSlot {
    /// Unassigned slot, also used as the broadcast address.
    pub const UNASSIGNED: PlayerSlot = PlayerSlot(0);
    pub const BROADCAST: PlayerSlot = PlayerSlot(0);
    /// Highest assignable player number.
    pub const MAX: u8 = 7;

    /// Returns the slot for `player` if it lies in `0..=7`.
    pub const fn new(player: u8) -> Option<Self> {
        if player <= Self::MAX {
            Some(Self(player))
        } else {
            None
        }
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

impl TryFrom<i64> for PlayerSlot {
    type Error = ();

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value).ok().and_then(PlayerSlot::new).ok_or(())
    }
}

impl fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Addressee of a command: `0` reaches every controller, any other number
/// only the controller holding that slot. Numbers outside `1..=7` are kept
/// and simply match nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Target(i64);

impl Target {
    pub const ALL: Target = Target(0);

    pub const fn player(player: i64) -> Self {
        Self(player)
    }

    #[inline]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Whether a command addressed to `self` reaches a controller holding `slot`.
    #[inline]
    pub fn addresses(self, slot: PlayerSlot) -> bool {
        self.0 == 0 || self.0 == i64::from(slot.0)
    }
}

impl From<PlayerSlot> for Target {
    fn from(slot: PlayerSlot) -> Self {
        Self(i64::from(slot.0))
    }
}

/// Logical controller buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    A,
    B,
    X,
    Y,
    Back,
    Guide,
    Start,
    LeftStick,
    RightStick,
    LeftShoulder,
    RightShoulder,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
    Misc1,
    Paddle1,
    Paddle2,
    Paddle3,
    Paddle4,
    Touchpad,
}

impl Button {
    /// Canonical lower-case name, also used as the notification topic.
    pub const fn as_str(self) -> &'static str {
        match self {
            Button::A => "a",
            Button::B => "b",
            Button::X => "x",
            Button::Y => "y",
            Button::Back => "back",
            Button::Guide => "guide",
            Button::Start => "start",
            Button::LeftStick => "leftstick",
            Button::RightStick => "rightstick",
            Button::LeftShoulder => "leftshoulder",
            Button::RightShoulder => "rightshoulder",
            Button::DPadUp => "dpup",
            Button::DPadDown => "dpdown",
            Button::DPadLeft => "dpleft",
            Button::DPadRight => "dpright",
            Button::Misc1 => "misc1",
            Button::Paddle1 => "paddle1",
            Button::Paddle2 => "paddle2",
            Button::Paddle3 => "paddle3",
            Button::Paddle4 => "paddle4",
            Button::Touchpad => "touchpad",
        }
    }
}

/// Analog axes of a game controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    LeftX,
    LeftY,
    RightX,
    RightY,
    LeftTrigger,
    RightTrigger,
}

impl Axis {
    pub const fn as_str(self) -> &'static str {
        match self {
            Axis::LeftX => "leftx",
            Axis::LeftY => "lefty",
            Axis::RightX => "rightx",
            Axis::RightY => "righty",
            Axis::LeftTrigger => "lefttrigger",
            Axis::RightTrigger => "righttrigger",
        }
    }
}

/// Motion sensors a controller may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Gyroscope,
    Accelerometer,
    Unknown,
}

impl SensorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            SensorKind::Gyroscope => "gyroscope",
            SensorKind::Accelerometer => "accelerometer",
            SensorKind::Unknown => "unknown",
        }
    }
}

/// Phase of a touchpad contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    Down,
    Motion,
    Up,
}

impl TouchPhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            TouchPhase::Down => "down",
            TouchPhase::Motion => "motion",
            TouchPhase::Up => "up",
        }
    }
}

/// Battery state reported by the hardware layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatteryLevel {
    Empty,
    Low,
    Medium,
    Full,
    Wired,
    Max,
    Unknown,
}

impl BatteryLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            BatteryLevel::Empty => "empty",
            BatteryLevel::Low => "low",
            BatteryLevel::Medium => "medium",
            BatteryLevel::Full => "full",
            BatteryLevel::Wired => "wired",
            BatteryLevel::Max => "max",
            BatteryLevel::Unknown => "unknown",
        }
    }
}

/// Keyboard keys mapped onto face buttons when no controller is around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestKey {
    A,
    B,
    X,
    Y,
}

impl TestKey {
    pub const fn button(self) -> Button {
        match self {
            TestKey::A => Button::A,
            TestKey::B => Button::B,
            TestKey::X => Button::X,
            TestKey::Y => Button::Y,
        }
    }
}

/// Controller family, as far as the engine cares about it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerType {
    Ps5,
    #[default]
    Other,
}

macro_rules! serialize_as_str {
    ($($ty:ty),*) => {
        $(
            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.serialize_str(self.as_str())
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

serialize_as_str!(Button, Axis, SensorKind, TouchPhase, BatteryLevel);
