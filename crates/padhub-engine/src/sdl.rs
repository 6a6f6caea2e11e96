//! SDL2-backed hardware layer.
//!
//! Controllers are driven through the safe `sdl2` API. Serial, controller
//! type, touchpad count, player index, haptic support and error clearing
//! have no safe wrapper and go through `sdl2::sys`. Battery events are read
//! from the raw event because the safe `Event` drops their payload.

use std::ffi::{c_int, CStr};
use std::mem::MaybeUninit;

use sdl2::controller::{Axis as SdlAxis, Button as SdlButton, GameController};
use sdl2::event::Event;
use sdl2::keyboard::Scancode;
use sdl2::sensor::SensorType;
use sdl2::sys;
use sdl2::{EventPump, GameControllerSubsystem, JoystickSubsystem, Sdl, VideoSubsystem};

use crate::backend::{Backend, Device, Hints, RawEvent, VersionInfo};
use crate::error::BackendError;
use crate::types::{
    Axis, BatteryLevel, Button, ControllerType, DeviceId, DeviceIndex, PlayerSlot, SensorKind,
    TestKey, TouchPhase,
};

/// Hints always applied before SDL starts.
const DEFAULT_HINTS: &[&str] = &[
    "SDL_JOYSTICK_HIDAPI_JOY_CONS",
    "SDL_JOYSTICK_HIDAPI_PS4_RUMBLE",
    "SDL_JOYSTICK_HIDAPI_PS5_RUMBLE",
    "SDL_JOYSTICK_ALLOW_BACKGROUND_EVENTS",
    "SDL_JOYSTICK_HIDAPI_SHIELD",
    "SDL_JOYSTICK_HIDAPI_XBOX_360",
    "SDL_JOYSTICK_HIDAPI_XBOX_360_PLAYER_LED",
    "SDL_JOYSTICK_HIDAPI_XBOX_360_WIRELESS",
    "SDL_JOYSTICK_HIDAPI_XBOX_ONE",
    "SDL_JOYSTICK_HIDAPI_XBOX_ONE_HOME_LED",
    "SDL_JOYSTICK_HIDAPI_WII_PLAYER_LED",
];

// Field order is drop order: the pump and subsystems go before the context.
struct Subsystems {
    pump: EventPump,
    controllers: GameControllerSubsystem,
    _joystick: JoystickSubsystem,
    _video: VideoSubsystem,
    _sdl: Sdl,
}

/// [`Backend`] over SDL2. Must stay on the thread that created it.
#[derive(Default)]
pub struct SdlBackend {
    subsystems: Option<Subsystems>,
}

impl SdlBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for SdlBackend {
    type Device = SdlController;

    fn init(&mut self, hints: &Hints) -> Result<VersionInfo, BackendError> {
        sdl2::hint::set("SDL_ACCELEROMETER_AS_JOYSTICK", "0");
        for name in DEFAULT_HINTS {
            sdl2::hint::set(name, "1");
        }
        if hints.rog_chakram {
            sdl2::hint::set("SDL_JOYSTICK_ROG_CHAKRAM", "1");
        }

        let sdl = sdl2::init().map_err(BackendError)?;
        let video = sdl.video().map_err(BackendError)?;
        let joystick = sdl.joystick().map_err(BackendError)?;
        let controllers = sdl.game_controller().map_err(BackendError)?;
        let pump = sdl.event_pump().map_err(BackendError)?;

        self.subsystems = Some(Subsystems {
            pump,
            controllers,
            _joystick: joystick,
            _video: video,
            _sdl: sdl,
        });

        Ok(VersionInfo {
            compiled: format!(
                "{}.{}.{}",
                sys::SDL_MAJOR_VERSION,
                sys::SDL_MINOR_VERSION,
                sys::SDL_PATCHLEVEL
            ),
            linked: sdl2::version::version().to_string(),
        })
    }

    fn controller_indices(&self) -> Vec<DeviceIndex> {
        let Some(subsystems) = &self.subsystems else {
            return Vec::new();
        };
        let count = subsystems.controllers.num_joysticks().unwrap_or(0);
        (0..count)
            .filter(|&index| subsystems.controllers.is_game_controller(index))
            .collect()
    }

    fn instance_id(&self, index: DeviceIndex) -> Result<DeviceId, BackendError> {
        let index = c_int::try_from(index)
            .map_err(|_| BackendError::new(format!("device index {index} out of range")))?;
        // SAFETY: plain lookup by device index; SDL validates the index.
        let id = unsafe { sys::SDL_JoystickGetDeviceInstanceID(index) };
        DeviceId::try_from(id).map_err(|_| BackendError(sdl2::get_error()))
    }

    fn open(&mut self, index: DeviceIndex) -> Result<SdlController, BackendError> {
        let subsystems = self
            .subsystems
            .as_ref()
            .ok_or_else(|| BackendError::new("SDL is not initialized"))?;
        let controller = subsystems
            .controllers
            .open(index)
            .map_err(|e| BackendError(e.to_string()))?;
        Ok(SdlController {
            id: controller.instance_id(),
            controller,
        })
    }

    fn poll_event(&mut self) -> Option<RawEvent> {
        let pump = &mut self.subsystems.as_mut()?.pump;
        next_raw_event(pump).map(map_raw_event)
    }
}

/// Pops one event off the SDL queue without converting it. Borrowing the
/// pump keeps the event subsystem alive for the call.
fn next_raw_event(_pump: &mut EventPump) -> Option<sys::SDL_Event> {
    let mut raw = MaybeUninit::<sys::SDL_Event>::uninit();
    // SAFETY: SDL fills `raw` whenever it reports a pending event.
    unsafe {
        if sys::SDL_PollEvent(raw.as_mut_ptr()) == 1 {
            Some(raw.assume_init())
        } else {
            None
        }
    }
}

fn map_raw_event(raw: sys::SDL_Event) -> RawEvent {
    // SAFETY: `type_` is the leading field of every event variant.
    let kind = unsafe { raw.type_ };
    if kind == sys::SDL_EventType::SDL_JOYBATTERYUPDATED as u32 {
        // SAFETY: the type tag selects the battery variant.
        let battery = unsafe { raw.jbattery };
        return match DeviceId::try_from(battery.which) {
            Ok(which) => RawEvent::BatteryUpdated {
                which,
                level: map_power_level(battery.level),
                timestamp: battery.timestamp,
            },
            Err(_) => RawEvent::Ignored,
        };
    }
    map_sdl_event(Event::from_ll(raw))
}

/// An open SDL game controller. Dropping it closes the device.
pub struct SdlController {
    id: DeviceId,
    controller: GameController,
}

impl SdlController {
    fn raw(&self) -> *mut sys::SDL_GameController {
        #[allow(clippy::cast_possible_wrap)]
        let id = self.id as sys::SDL_JoystickID;
        // SAFETY: `self.controller` keeps the device open, so the id resolves.
        unsafe { sys::SDL_GameControllerFromInstanceID(id) }
    }
}

fn sdl_error(e: impl ToString) -> BackendError {
    BackendError(e.to_string())
}

fn sensor_type(sensor: SensorKind) -> SensorType {
    match sensor {
        SensorKind::Gyroscope => SensorType::Gyroscope,
        SensorKind::Accelerometer => SensorType::Accelerometer,
        SensorKind::Unknown => SensorType::Unknown,
    }
}

// SAFETY (the `sys` calls below): `raw()` points at a controller this value
// keeps open; SDL checks the pointer itself.
impl Device for SdlController {
    fn name(&self) -> String {
        self.controller.name()
    }

    fn vendor_id(&self) -> u16 {
        self.controller.vendor_id().unwrap_or(0)
    }

    fn product_id(&self) -> u16 {
        self.controller.product_id().unwrap_or(0)
    }

    fn serial(&self) -> Option<String> {
        let ptr = unsafe { sys::SDL_GameControllerGetSerial(self.raw()) };
        if ptr.is_null() {
            return None;
        }
        let serial = unsafe { CStr::from_ptr(ptr) };
        Some(serial.to_string_lossy().into_owned())
    }

    fn controller_type(&self) -> ControllerType {
        let kind = unsafe { sys::SDL_GameControllerGetType(self.raw()) };
        if kind == sys::SDL_GameControllerType::SDL_CONTROLLER_TYPE_PS5 {
            ControllerType::Ps5
        } else {
            ControllerType::Other
        }
    }

    fn has_rumble_triggers(&self) -> bool {
        self.controller.has_rumble_triggers()
    }

    fn has_leds(&self) -> bool {
        self.controller.has_led()
    }

    fn num_touchpads(&self) -> u32 {
        let count = unsafe { sys::SDL_GameControllerGetNumTouchpads(self.raw()) };
        u32::try_from(count).unwrap_or(0)
    }

    fn has_sensor(&self, sensor: SensorKind) -> bool {
        self.controller.has_sensor(sensor_type(sensor))
    }

    fn is_haptic(&self) -> bool {
        unsafe {
            let joystick = sys::SDL_GameControllerGetJoystick(self.raw());
            sys::SDL_JoystickIsHaptic(joystick) == 1
        }
    }

    fn set_player_index(&mut self, slot: PlayerSlot) {
        let index = if slot.is_assigned() {
            c_int::from(slot.get())
        } else {
            -1
        };
        unsafe { sys::SDL_GameControllerSetPlayerIndex(self.raw(), index) };
    }

    fn send_effect(&mut self, data: &[u8]) -> Result<(), BackendError> {
        self.controller.send_effect(data).map_err(BackendError)
    }

    fn clear_error(&mut self) {
        unsafe { sys::SDL_ClearError() };
    }

    fn rumble(&mut self, low: u16, high: u16, duration_ms: u32) -> Result<(), BackendError> {
        self.controller
            .set_rumble(low, high, duration_ms)
            .map_err(sdl_error)
    }

    fn rumble_triggers(
        &mut self,
        left: u16,
        right: u16,
        duration_ms: u32,
    ) -> Result<(), BackendError> {
        self.controller
            .set_rumble_triggers(left, right, duration_ms)
            .map_err(sdl_error)
    }

    fn set_led(&mut self, red: u8, green: u8, blue: u8) -> Result<(), BackendError> {
        self.controller.set_led(red, green, blue).map_err(sdl_error)
    }

    fn set_sensor_enabled(
        &mut self,
        sensor: SensorKind,
        enabled: bool,
    ) -> Result<(), BackendError> {
        self.controller
            .sensor_set_enabled(sensor_type(sensor), enabled)
            .map_err(sdl_error)
    }
}

fn map_sdl_event(event: Event) -> RawEvent {
    match event {
        Event::ControllerDeviceAdded { which, .. } => RawEvent::DeviceAdded { index: which },
        Event::ControllerDeviceRemoved { which, .. } => RawEvent::DeviceRemoved { which },
        Event::ControllerDeviceRemapped { which, .. } => RawEvent::DeviceRemapped { which },
        Event::ControllerAxisMotion {
            which,
            axis,
            value,
            timestamp,
        } => RawEvent::AxisMotion {
            which,
            axis: map_sdl_axis(axis),
            value,
            timestamp,
        },
        Event::ControllerButtonDown {
            which,
            button,
            timestamp,
        } => RawEvent::ButtonDown {
            which,
            button: map_sdl_button(button),
            timestamp,
        },
        Event::ControllerButtonUp {
            which,
            button,
            timestamp,
        } => RawEvent::ButtonUp {
            which,
            button: map_sdl_button(button),
            timestamp,
        },
        Event::ControllerTouchpadDown {
            which,
            touchpad,
            finger,
            x,
            y,
            pressure,
            ..
        } => touch(which, TouchPhase::Down, touchpad, finger, x, y, pressure),
        Event::ControllerTouchpadMotion {
            which,
            touchpad,
            finger,
            x,
            y,
            pressure,
            ..
        } => touch(which, TouchPhase::Motion, touchpad, finger, x, y, pressure),
        Event::ControllerTouchpadUp {
            which,
            touchpad,
            finger,
            x,
            y,
            pressure,
            ..
        } => touch(which, TouchPhase::Up, touchpad, finger, x, y, pressure),
        Event::ControllerSensorUpdated {
            which,
            sensor,
            data,
            ..
        } => RawEvent::SensorUpdate {
            which,
            sensor: map_sdl_sensor(sensor),
            data,
        },
        Event::KeyDown {
            scancode: Some(scancode),
            ..
        } => map_test_key(scancode, true),
        Event::KeyUp {
            scancode: Some(scancode),
            ..
        } => map_test_key(scancode, false),
        _ => RawEvent::Ignored,
    }
}

fn touch(
    which: DeviceId,
    phase: TouchPhase,
    touchpad: u32,
    finger: u32,
    x: f32,
    y: f32,
    pressure: f32,
) -> RawEvent {
    RawEvent::Touchpad {
        which,
        phase,
        touchpad,
        finger,
        x,
        y,
        pressure,
    }
}

fn map_test_key(scancode: Scancode, pressed: bool) -> RawEvent {
    let key = match scancode {
        Scancode::A => TestKey::A,
        Scancode::B => TestKey::B,
        Scancode::X => TestKey::X,
        Scancode::Y => TestKey::Y,
        _ => return RawEvent::Ignored,
    };
    RawEvent::Key { key, pressed }
}

fn map_sdl_sensor(sensor: SensorType) -> SensorKind {
    match sensor {
        SensorType::Gyroscope => SensorKind::Gyroscope,
        SensorType::Accelerometer => SensorKind::Accelerometer,
        _ => SensorKind::Unknown,
    }
}

fn map_power_level(level: sys::SDL_JoystickPowerLevel) -> BatteryLevel {
    use sys::SDL_JoystickPowerLevel as Power;
    match level {
        Power::SDL_JOYSTICK_POWER_EMPTY => BatteryLevel::Empty,
        Power::SDL_JOYSTICK_POWER_LOW => BatteryLevel::Low,
        Power::SDL_JOYSTICK_POWER_MEDIUM => BatteryLevel::Medium,
        Power::SDL_JOYSTICK_POWER_FULL => BatteryLevel::Full,
        Power::SDL_JOYSTICK_POWER_WIRED => BatteryLevel::Wired,
        Power::SDL_JOYSTICK_POWER_MAX => BatteryLevel::Max,
        Power::SDL_JOYSTICK_POWER_UNKNOWN => BatteryLevel::Unknown,
    }
}

fn map_sdl_button(button: SdlButton) -> Button {
    match button {
        SdlButton::A => Button::A,
        SdlButton::B => Button::B,
        SdlButton::X => Button::X,
        SdlButton::Y => Button::Y,
        SdlButton::Back => Button::Back,
        SdlButton::Guide => Button::Guide,
        SdlButton::Start => Button::Start,
        SdlButton::LeftStick => Button::LeftStick,
        SdlButton::RightStick => Button::RightStick,
        SdlButton::LeftShoulder => Button::LeftShoulder,
        SdlButton::RightShoulder => Button::RightShoulder,
        SdlButton::DPadUp => Button::DPadUp,
        SdlButton::DPadDown => Button::DPadDown,
        SdlButton::DPadLeft => Button::DPadLeft,
        SdlButton::DPadRight => Button::DPadRight,
        SdlButton::Misc1 => Button::Misc1,
        SdlButton::Paddle1 => Button::Paddle1,
        SdlButton::Paddle2 => Button::Paddle2,
        SdlButton::Paddle3 => Button::Paddle3,
        SdlButton::Paddle4 => Button::Paddle4,
        SdlButton::Touchpad => Button::Touchpad,
    }
}

fn map_sdl_axis(axis: SdlAxis) -> Axis {
    match axis {
        SdlAxis::LeftX => Axis::LeftX,
        SdlAxis::LeftY => Axis::LeftY,
        SdlAxis::RightX => Axis::RightX,
        SdlAxis::RightY => Axis::RightY,
        SdlAxis::TriggerLeft => Axis::LeftTrigger,
        SdlAxis::TriggerRight => Axis::RightTrigger,
    }
}
