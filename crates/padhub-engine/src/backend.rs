use crate::error::BackendError;
use crate::types::{
    Axis, BatteryLevel, Button, ControllerType, DeviceId, DeviceIndex, PlayerSlot, SensorKind,
    TestKey, TouchPhase,
};

/// Hints applied before the hardware subsystem comes up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hints {
    /// Extended support for the ROG Chakram spin-wheel mouse.
    pub rog_chakram: bool,
}

/// Versions of the hardware library the backend was built against and runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    pub compiled: String,
    pub linked: String,
}

/// A hardware event as popped from the backend queue.
#[derive(Debug, Clone, PartialEq)]
pub enum RawEvent {
    DeviceAdded { index: DeviceIndex },
    DeviceRemoved { which: DeviceId },
    DeviceRemapped { which: DeviceId },
    AxisMotion { which: DeviceId, axis: Axis, value: i16, timestamp: u32 },
    ButtonDown { which: DeviceId, button: Button, timestamp: u32 },
    ButtonUp { which: DeviceId, button: Button, timestamp: u32 },
    Touchpad {
        which: DeviceId,
        phase: TouchPhase,
        touchpad: u32,
        finger: u32,
        x: f32,
        y: f32,
        pressure: f32,
    },
    SensorUpdate { which: DeviceId, sensor: SensorKind, data: [f32; 3] },
    BatteryUpdated { which: DeviceId, level: BatteryLevel, timestamp: u32 },
    Key { key: TestKey, pressed: bool },
    /// Anything the engine does not decode.
    Ignored,
}

/// The hardware subsystem the engine drives.
pub trait Backend {
    type Device: Device;

    /// Applies hints and initializes the subsystem.
    fn init(&mut self, hints: &Hints) -> Result<VersionInfo, BackendError>;

    /// Indices of attached devices that qualify as game controllers.
    fn controller_indices(&self) -> Vec<DeviceIndex>;

    /// Resolves an enumeration index to the instance identity.
    fn instance_id(&self, index: DeviceIndex) -> Result<DeviceId, BackendError>;

    /// Opens the device at `index`. Dropping the result closes it.
    fn open(&mut self, index: DeviceIndex) -> Result<Self::Device, BackendError>;

    /// Pops one event, `None` when the queue is empty.
    fn poll_event(&mut self) -> Option<RawEvent>;
}

/// One open controller session.
pub trait Device {
    fn name(&self) -> String;
    fn vendor_id(&self) -> u16;
    fn product_id(&self) -> u16;
    fn serial(&self) -> Option<String>;
    fn controller_type(&self) -> ControllerType;
    fn has_rumble_triggers(&self) -> bool;
    fn has_leds(&self) -> bool;
    fn num_touchpads(&self) -> u32;
    fn has_sensor(&self, sensor: SensorKind) -> bool;
    fn is_haptic(&self) -> bool;

    /// Pushes the player number to the controller's indicator, if it has one.
    fn set_player_index(&mut self, slot: PlayerSlot);

    /// Sends a raw, family-specific effect packet.
    fn send_effect(&mut self, data: &[u8]) -> Result<(), BackendError>;

    /// Resets the hardware layer's last-error state.
    fn clear_error(&mut self);

    fn rumble(&mut self, low: u16, high: u16, duration_ms: u32) -> Result<(), BackendError>;

    fn rumble_triggers(
        &mut self,
        left: u16,
        right: u16,
        duration_ms: u32,
    ) -> Result<(), BackendError>;

    fn set_led(&mut self, red: u8, green: u8, blue: u8) -> Result<(), BackendError>;

    fn set_sensor_enabled(
        &mut self,
        sensor: SensorKind,
        enabled: bool,
    ) -> Result<(), BackendError>;
}
