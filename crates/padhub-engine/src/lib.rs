//! Game-controller registry and event-normalization engine.
//!
//! [`Engine::poll_events`] drains the hardware event queue within a time
//! budget and turns raw events into player-attributed [`Notification`]s.
//! The command methods (`rumble`, `set_leds`, ...) write to the controllers
//! a [`Target`] addresses.

mod backend;
mod dispatch;
pub mod effects;
mod engine;
mod error;
mod notification;
mod params;
mod probe;
mod registry;
mod slot;
mod types;

#[cfg(feature = "sdl2-backend")]
mod sdl;

#[cfg(test)]
mod mock;

pub use crate::backend::{Backend, Device, Hints, RawEvent, VersionInfo};
pub use crate::dispatch::{Operation, Outcome, Outcomes};
pub use crate::effects::{Ds5EffectsState, DS5_EFFECTS_LEN, TRIGGER_EFFECT_LEN, TRIGGER_EFFECT_OFF};
pub use crate::engine::{Engine, EngineConfig, PollStatus, DEFAULT_POLL_BUDGET, ROG_CHAKRAM_HINT};
pub use crate::error::{BackendError, Error, Result};
pub use crate::notification::{topic, Notification, Sink};
pub use crate::params::{
    Arg, LedParams, Parsed, RumbleParams, SensorParams, TriggerRumbleParams, DEFAULT_RUMBLE,
    DEFAULT_RUMBLE_MS,
};
pub use crate::probe::{probe, Capabilities, DeviceDescriptor, RUMBLE_PROBE_MAGNITUDE, RUMBLE_PROBE_MS};
pub use crate::registry::{ControllerRecord, Registry};
pub use crate::slot::next_slot;
pub use crate::types::{
    Axis, BatteryLevel, Button, ControllerType, DeviceId, DeviceIndex, PlayerSlot, SensorKind,
    Target, TestKey, TouchPhase,
};

#[cfg(feature = "sdl2-backend")]
pub use crate::sdl::{SdlBackend, SdlController};

/// Engine over the SDL2 backend.
#[cfg(feature = "sdl2-backend")]
pub type SdlEngine = Engine<SdlBackend>;
