//! Scriptable in-memory backend for tests.

use std::cell::{RefCell, RefMut};
use std::collections::VecDeque;
use std::rc::Rc;

use ahash::AHashMap;

use crate::backend::{Backend, Device, Hints, RawEvent, VersionInfo};
use crate::error::BackendError;
use crate::notification::{Notification, Sink};
use crate::types::{ControllerType, DeviceId, DeviceIndex, PlayerSlot, SensorKind};

/// Static properties and scripted failures of a fake controller.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockPad {
    pub name: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub serial: Option<String>,
    pub controller_type: ControllerType,
    pub leds: bool,
    pub touchpads: u32,
    pub gyroscope: bool,
    pub accelerometer: bool,
    /// Every rumble/LED/sensor write fails with this message.
    pub write_error: Option<String>,
    pub effect_error: Option<String>,
}

/// A hardware write observed by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Write {
    Rumble { id: DeviceId, low: u16, high: u16, ms: u32 },
    RumbleTriggers { id: DeviceId, left: u16, right: u16, ms: u32 },
    Led { id: DeviceId, red: u8, green: u8, blue: u8 },
    Sensor { id: DeviceId, sensor: SensorKind, enabled: bool },
}

#[derive(Debug, Default)]
pub(crate) struct MockState {
    pub events: VecDeque<RawEvent>,
    pub devices: AHashMap<DeviceIndex, (DeviceId, MockPad)>,
    pub init_error: Option<String>,
    pub init_calls: usize,
    pub hints: Option<Hints>,
    pub open_error: Option<String>,
    pub writes: Vec<Write>,
    pub effects: Vec<Vec<u8>>,
    pub players: Vec<(DeviceId, PlayerSlot)>,
    pub errors_cleared: usize,
    /// Side-effecting device calls in the order they happened.
    pub calls: Vec<String>,
    /// Lifecycle log: `close <id>` per dropped device, `shutdown` for the backend.
    pub lifecycle: Vec<String>,
}

#[derive(Debug)]
pub(crate) struct MockBackend {
    state: Rc<RefCell<MockState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(MockState::default())),
        }
    }

    pub fn state(&self) -> RefMut<'_, MockState> {
        self.state.borrow_mut()
    }

    /// Shared handle to the state, usable after the backend moved into an engine.
    pub fn handle(&self) -> Rc<RefCell<MockState>> {
        Rc::clone(&self.state)
    }

    pub fn attach(&self, index: DeviceIndex, id: DeviceId, pad: MockPad) {
        self.state().devices.insert(index, (id, pad));
    }

    pub fn push(&self, event: RawEvent) {
        self.state().events.push_back(event);
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.state().lifecycle.push("shutdown".into());
    }
}

impl Backend for MockBackend {
    type Device = MockDevice;

    fn init(&mut self, hints: &Hints) -> Result<VersionInfo, BackendError> {
        let mut state = self.state();
        state.init_calls += 1;
        state.hints = Some(*hints);
        if let Some(err) = state.init_error.take() {
            return Err(BackendError(err));
        }
        Ok(VersionInfo {
            compiled: "2.30.0".into(),
            linked: "2.30.8".into(),
        })
    }

    fn controller_indices(&self) -> Vec<DeviceIndex> {
        let mut indices: Vec<_> = self.state().devices.keys().copied().collect();
        indices.sort_unstable();
        indices
    }

    fn instance_id(&self, index: DeviceIndex) -> Result<DeviceId, BackendError> {
        self.state()
            .devices
            .get(&index)
            .map(|(id, _)| *id)
            .ok_or_else(|| BackendError(format!("no device at index {index}")))
    }

    fn open(&mut self, index: DeviceIndex) -> Result<MockDevice, BackendError> {
        let state = self.state();
        if let Some(err) = &state.open_error {
            return Err(BackendError(err.clone()));
        }
        let (id, pad) = state
            .devices
            .get(&index)
            .cloned()
            .ok_or_else(|| BackendError(format!("no device at index {index}")))?;
        drop(state);
        Ok(MockDevice {
            id,
            pad,
            state: Rc::clone(&self.state),
        })
    }

    fn poll_event(&mut self) -> Option<RawEvent> {
        self.state().events.pop_front()
    }
}

#[derive(Debug)]
pub(crate) struct MockDevice {
    id: DeviceId,
    pad: MockPad,
    state: Rc<RefCell<MockState>>,
}

impl MockDevice {
    fn write(&mut self, write: Write) -> Result<(), BackendError> {
        let mut state = self.state.borrow_mut();
        if let Write::Rumble { id, .. } = write {
            state.calls.push(format!("rumble {id}"));
        }
        state.writes.push(write);
        match &self.pad.write_error {
            Some(err) => Err(BackendError(err.clone())),
            None => Ok(()),
        }
    }
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        self.state
            .borrow_mut()
            .lifecycle
            .push(format!("close {}", self.id));
    }
}

impl Device for MockDevice {
    fn name(&self) -> String {
        self.pad.name.clone()
    }

    fn vendor_id(&self) -> u16 {
        self.pad.vendor_id
    }

    fn product_id(&self) -> u16 {
        self.pad.product_id
    }

    fn serial(&self) -> Option<String> {
        self.pad.serial.clone()
    }

    fn controller_type(&self) -> ControllerType {
        self.pad.controller_type
    }

    fn has_rumble_triggers(&self) -> bool {
        self.pad.controller_type == ControllerType::Ps5
    }

    fn has_leds(&self) -> bool {
        self.pad.leds
    }

    fn num_touchpads(&self) -> u32 {
        self.pad.touchpads
    }

    fn has_sensor(&self, sensor: SensorKind) -> bool {
        match sensor {
            SensorKind::Gyroscope => self.pad.gyroscope,
            SensorKind::Accelerometer => self.pad.accelerometer,
            SensorKind::Unknown => false,
        }
    }

    fn is_haptic(&self) -> bool {
        false
    }

    fn set_player_index(&mut self, slot: PlayerSlot) {
        let mut state = self.state.borrow_mut();
        state.calls.push(format!("player {} {slot}", self.id));
        state.players.push((self.id, slot));
    }

    fn send_effect(&mut self, data: &[u8]) -> Result<(), BackendError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(format!("effect {}", self.id));
        state.effects.push(data.to_vec());
        match &self.pad.effect_error {
            Some(err) => Err(BackendError(err.clone())),
            None => Ok(()),
        }
    }

    fn clear_error(&mut self) {
        let mut state = self.state.borrow_mut();
        state.calls.push("clear_error".into());
        state.errors_cleared += 1;
    }

    fn rumble(&mut self, low: u16, high: u16, duration_ms: u32) -> Result<(), BackendError> {
        let id = self.id;
        self.write(Write::Rumble {
            id,
            low,
            high,
            ms: duration_ms,
        })
    }

    fn rumble_triggers(
        &mut self,
        left: u16,
        right: u16,
        duration_ms: u32,
    ) -> Result<(), BackendError> {
        let id = self.id;
        self.write(Write::RumbleTriggers {
            id,
            left,
            right,
            ms: duration_ms,
        })
    }

    fn set_led(&mut self, red: u8, green: u8, blue: u8) -> Result<(), BackendError> {
        let id = self.id;
        self.write(Write::Led {
            id,
            red,
            green,
            blue,
        })
    }

    fn set_sensor_enabled(
        &mut self,
        sensor: SensorKind,
        enabled: bool,
    ) -> Result<(), BackendError> {
        let id = self.id;
        self.write(Write::Sensor {
            id,
            sensor,
            enabled,
        })
    }
}

/// Sink that keeps every emission.
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    pub emitted: Vec<(String, Notification)>,
}

impl Recorder {
    pub fn topics(&self) -> Vec<&str> {
        self.emitted.iter().map(|(t, _)| t.as_str()).collect()
    }

    pub fn with_topic(&self, topic: &str) -> Vec<&Notification> {
        self.emitted
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, n)| n)
            .collect()
    }

    pub fn clear(&mut self) {
        self.emitted.clear();
    }
}

impl Sink for Recorder {
    fn emit(&mut self, topic: &str, notification: &Notification) {
        self.emitted.push((topic.to_string(), notification.clone()));
    }
}
