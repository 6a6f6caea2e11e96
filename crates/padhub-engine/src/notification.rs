use std::borrow::Cow;
use std::fmt;

use serde::{Serialize, Serializer};
use smallvec::{smallvec, SmallVec};

use crate::probe::DeviceDescriptor;
use crate::types::{
    Axis, BatteryLevel, Button, DeviceId, DeviceIndex, PlayerSlot, SensorKind, TouchPhase,
};

/// Topic names shared by several notifications.
pub mod topic {
    pub const SDL_INIT: &str = "sdl-init";
    pub const DEVICE_ADDED: &str = "controller-device-added";
    pub const DEVICE_REMOVED: &str = "controller-device-removed";
    pub const DEVICE_REMAPPED: &str = "controller-device-remapped";
    pub const AXIS_MOTION: &str = "controller-axis-motion";
    pub const BUTTON_DOWN: &str = "controller-button-down";
    pub const BUTTON_UP: &str = "controller-button-up";
    pub const TOUCHPAD_DOWN: &str = "controller-touchpad-down";
    pub const TOUCHPAD_MOTION: &str = "controller-touchpad-motion";
    pub const TOUCHPAD_UP: &str = "controller-touchpad-up";
    pub const SENSOR_UPDATE: &str = "controller-sensor-update";
    pub const BATTERY_UPDATE: &str = "controller-battery-update";
    pub const RUMBLED: &str = "rumbled";
    pub const RUMBLED_TRIGGERS: &str = "rumbled-triggers";
    pub const LED: &str = "led";
    pub const WARNING: &str = "warning";
    pub const ERROR: &str = "error";
}

/// A decoded occurrence handed to the host.
///
/// Serializes as a map tagged with `kind`, carrying the variant's fields
/// plus its `message`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(remote = "Self", tag = "kind", rename_all = "kebab-case")]
pub enum Notification {
    /// The hardware subsystem came up.
    SdlInit {
        compiled_against: String,
        linked_against: String,
        using_hints: Option<&'static str>,
    },
    DeviceAdded {
        which: DeviceIndex,
        id: DeviceId,
        player: PlayerSlot,
        /// `enumerate` when found at start-up, `hotplug` otherwise.
        operation: &'static str,
        #[serde(flatten)]
        descriptor: DeviceDescriptor,
    },
    DeviceRemoved {
        which: DeviceId,
    },
    DeviceRemapped {
        which: DeviceId,
    },
    AxisMotion {
        axis: Axis,
        value: i16,
        timestamp: u32,
        player: Option<PlayerSlot>,
    },
    Button {
        button: Button,
        pressed: bool,
        player: Option<PlayerSlot>,
    },
    Touchpad {
        phase: TouchPhase,
        touchpad: u32,
        finger: u32,
        x: f32,
        y: f32,
        pressure: f32,
    },
    Sensor {
        sensor: SensorKind,
        x: f32,
        y: f32,
        z: f32,
    },
    Battery {
        which: DeviceId,
        level: BatteryLevel,
        timestamp: u32,
        player: Option<PlayerSlot>,
    },
    /// A motion sensor was switched on or off.
    SensorState {
        sensor: SensorKind,
        enabled: bool,
        player: PlayerSlot,
    },
    Rumbled {
        player: PlayerSlot,
    },
    RumbledTriggers {
        player: PlayerSlot,
    },
    Led {
        player: PlayerSlot,
    },
    Warning {
        message: String,
    },
    /// The poll budget ran out with events still queued.
    SlowPoll {
        elapsed_ms: u64,
        events: usize,
        poll_number: u64,
    },
    Error {
        message: String,
        operation: &'static str,
        player: Option<PlayerSlot>,
    },
}

impl Notification {
    pub fn message(&self) -> Cow<'_, str> {
        let text = match self {
            Notification::SdlInit { .. } => "Hardware subsystem initialized",
            Notification::DeviceAdded { .. } => {
                "A new Game controller has been inserted into the system"
            }
            Notification::DeviceRemoved { .. } => "An opened Game controller has been removed",
            Notification::DeviceRemapped { .. } => "The controller mapping was updated",
            Notification::AxisMotion { .. } => "Game controller axis motion",
            Notification::Button { pressed: true, .. } => "Game controller button pressed",
            Notification::Button { pressed: false, .. } => "Game controller button released",
            Notification::Touchpad { phase, .. } => match phase {
                TouchPhase::Down => "Game controller touchpad was touched",
                TouchPhase::Motion => "Game controller touchpad finger was moved",
                TouchPhase::Up => "Game controller touchpad finger was lifted",
            },
            Notification::Sensor { .. } => "Game controller sensor was updated",
            Notification::Battery { .. } => "Game controller battery was updated",
            Notification::SensorState { enabled: true, .. } => "Sensor enabled",
            Notification::SensorState { enabled: false, .. } => "Sensor disabled",
            Notification::Rumbled { .. } => "Rumble started",
            Notification::RumbledTriggers { .. } => "Trigger rumble started",
            Notification::Led { .. } => "LED color set",
            Notification::SlowPoll { .. } => "Polling is taking too long.",
            Notification::Warning { message } | Notification::Error { message, .. } => {
                return Cow::Borrowed(message);
            }
        };
        Cow::Borrowed(text)
    }

    /// Topics this notification is emitted under, in emission order.
    pub fn topics(&self) -> SmallVec<[Cow<'static, str>; 3]> {
        match self {
            Notification::SdlInit { .. } => smallvec![topic::SDL_INIT.into()],
            Notification::DeviceAdded { .. } => smallvec![topic::DEVICE_ADDED.into()],
            Notification::DeviceRemoved { .. } => smallvec![topic::DEVICE_REMOVED.into()],
            Notification::DeviceRemapped { .. } => smallvec![topic::DEVICE_REMAPPED.into()],
            Notification::AxisMotion { axis, .. } => {
                smallvec![axis.as_str().into(), topic::AXIS_MOTION.into()]
            }
            Notification::Button {
                button, pressed, ..
            } => {
                let name = button.as_str();
                let (suffix, generic) = if *pressed {
                    ("down", topic::BUTTON_DOWN)
                } else {
                    ("up", topic::BUTTON_UP)
                };
                smallvec![
                    Cow::Owned(format!("{name}:{suffix}")),
                    name.into(),
                    generic.into()
                ]
            }
            Notification::Touchpad { phase, .. } => {
                let name = match phase {
                    TouchPhase::Down => topic::TOUCHPAD_DOWN,
                    TouchPhase::Motion => topic::TOUCHPAD_MOTION,
                    TouchPhase::Up => topic::TOUCHPAD_UP,
                };
                smallvec![name.into()]
            }
            Notification::Sensor { sensor, .. } => match sensor {
                SensorKind::Unknown => smallvec![topic::SENSOR_UPDATE.into()],
                known => smallvec![known.as_str().into(), topic::SENSOR_UPDATE.into()],
            },
            Notification::Battery { .. } => smallvec![topic::BATTERY_UPDATE.into()],
            Notification::SensorState {
                sensor, enabled, ..
            } => {
                let state = if *enabled { "enabled" } else { "disabled" };
                smallvec![Cow::Owned(format!("{}:{state}", sensor.as_str()))]
            }
            Notification::Rumbled { .. } => smallvec![topic::RUMBLED.into()],
            Notification::RumbledTriggers { .. } => smallvec![topic::RUMBLED_TRIGGERS.into()],
            Notification::Led { .. } => smallvec![topic::LED.into()],
            Notification::Warning { .. } | Notification::SlowPoll { .. } => {
                smallvec![topic::WARNING.into()]
            }
            Notification::Error { .. } => smallvec![topic::ERROR.into()],
        }
    }

    /// Player the notification is attributed to, if any.
    pub fn player(&self) -> Option<PlayerSlot> {
        match self {
            Notification::DeviceAdded { player, .. }
            | Notification::SensorState { player, .. }
            | Notification::Rumbled { player }
            | Notification::RumbledTriggers { player }
            | Notification::Led { player } => Some(*player),
            Notification::AxisMotion { player, .. }
            | Notification::Button { player, .. }
            | Notification::Battery { player, .. }
            | Notification::Error { player, .. } => *player,
            _ => None,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())?;
        match self {
            Notification::SdlInit {
                compiled_against,
                linked_against,
                using_hints,
            } => {
                write!(f, " compiled={compiled_against} linked={linked_against}")?;
                if let Some(hint) = using_hints {
                    write!(f, " hints={hint}")?;
                }
            }
            Notification::DeviceAdded {
                which,
                id,
                player,
                operation,
                descriptor,
            } => write!(
                f,
                " - {name} which={which} id={id} player={player} vid=0x{vid:04x} pid=0x{pid:04x} via={operation}",
                name = descriptor.name,
                vid = descriptor.vendor_id,
                pid = descriptor.product_id,
            )?,
            Notification::DeviceRemoved { which } | Notification::DeviceRemapped { which } => {
                write!(f, " which={which}")?;
            }
            Notification::AxisMotion {
                axis,
                value,
                timestamp,
                ..
            } => write!(f, " axis={axis} value={value} timestamp={timestamp}")?,
            Notification::Button { button, .. } => write!(f, " button={button}")?,
            Notification::Touchpad {
                touchpad,
                finger,
                x,
                y,
                pressure,
                ..
            } => write!(
                f,
                " touchpad={touchpad} finger={finger} x={x:.3} y={y:.3} pressure={pressure:.3}"
            )?,
            Notification::Sensor { sensor, x, y, z } => {
                write!(f, " sensor={sensor} x={x:.3} y={y:.3} z={z:.3}")?;
            }
            Notification::Battery {
                which,
                level,
                timestamp,
                ..
            } => write!(f, " which={which} level={level} timestamp={timestamp}")?,
            Notification::SensorState { sensor, .. } => write!(f, " sensor={sensor}")?,
            Notification::SlowPoll {
                elapsed_ms,
                events,
                poll_number,
            } => write!(f, " elapsed_ms={elapsed_ms} events={events} poll={poll_number}")?,
            Notification::Error { operation, .. } => write!(f, " operation={operation}")?,
            _ => {}
        }
        if let (Some(player), false) = (
            self.player(),
            matches!(self, Notification::DeviceAdded { .. }),
        ) {
            write!(f, " player={player}")?;
        }
        Ok(())
    }
}

impl Serialize for Notification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Body<'a>(&'a Notification);

        impl Serialize for Body<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                Notification::serialize(self.0, serializer)
            }
        }

        #[derive(Serialize)]
        struct Envelope<'a> {
            #[serde(flatten)]
            body: Body<'a>,
            #[serde(skip_serializing_if = "Option::is_none")]
            message: Option<Cow<'a, str>>,
        }

        // Warnings and errors already carry their message as a field.
        let message = match self {
            Notification::Warning { .. } | Notification::Error { .. } => None,
            _ => Some(self.message()),
        };
        Envelope {
            body: Body(self),
            message,
        }
        .serialize(serializer)
    }
}

/// Receiver of notifications. Called synchronously, once per topic.
pub trait Sink {
    fn emit(&mut self, topic: &str, notification: &Notification);
}

impl<F> Sink for F
where
    F: FnMut(&str, &Notification),
{
    fn emit(&mut self, topic: &str, notification: &Notification) {
        self(topic, notification);
    }
}

/// Emits `notification` under each of its topics.
pub(crate) fn publish<S: Sink + ?Sized>(sink: &mut S, notification: &Notification) {
    for topic in notification.topics() {
        sink.emit(&topic, notification);
    }
}
