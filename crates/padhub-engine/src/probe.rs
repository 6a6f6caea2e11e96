use serde::Serialize;

use crate::backend::{Backend, Device};
use crate::effects::Ds5EffectsState;
use crate::error::{Error, Result};
use crate::types::{ControllerType, DeviceIndex, PlayerSlot, SensorKind};

/// Magnitude of the rumble used to detect rumble support.
/// Hardware accepts roughly `0x0200..=0xFFFC`.
pub const RUMBLE_PROBE_MAGNITUDE: u16 = 0x0200;
pub const RUMBLE_PROBE_MS: u32 = 250;

/// Features a controller reported when it was added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub has_rumble: bool,
    pub has_rumble_triggers: bool,
    pub has_leds: bool,
    pub has_accelerometer: bool,
    pub has_gyroscope: bool,
    pub num_touchpads: u32,
    pub is_haptic: bool,
}

/// Static description of a controller, captured once at add time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceDescriptor {
    pub name: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub serial: Option<String>,
    pub controller_type: ControllerType,
    #[serde(flatten)]
    pub capabilities: Capabilities,
    /// Whether the family-specific trigger reset was accepted.
    pub effects_supported: bool,
}

/// Opens the device at `index`, interrogates it and lights `player` on its
/// indicator.
///
/// Besides read-only queries this resets adaptive trigger effects on PS5
/// controllers and plays a short, faint rumble to find out whether rumble
/// commands are accepted. The player index is pushed before either write.
pub fn probe<B: Backend>(
    backend: &mut B,
    index: DeviceIndex,
    player: PlayerSlot,
) -> Result<(B::Device, DeviceDescriptor)> {
    let mut device = backend
        .open(index)
        .map_err(|e| Error::OpenFailed(e.0))?;

    let name = device.name();
    let vendor_id = device.vendor_id();
    let product_id = device.product_id();
    let controller_type = device.controller_type();
    let mut capabilities = Capabilities {
        has_rumble_triggers: device.has_rumble_triggers(),
        ..Capabilities::default()
    };
    let serial = device.serial();
    capabilities.has_leds = device.has_leds();
    capabilities.num_touchpads = device.num_touchpads();
    capabilities.has_accelerometer = device.has_sensor(SensorKind::Accelerometer);
    capabilities.has_gyroscope = device.has_sensor(SensorKind::Gyroscope);

    device.set_player_index(player);
    let effects_supported = clear_trigger_effects(&mut device);

    capabilities.is_haptic = device.is_haptic();
    device.clear_error();
    capabilities.has_rumble = device
        .rumble(RUMBLE_PROBE_MAGNITUDE, RUMBLE_PROBE_MAGNITUDE, RUMBLE_PROBE_MS)
        .is_ok();

    let descriptor = DeviceDescriptor {
        name,
        vendor_id,
        product_id,
        serial,
        controller_type,
        capabilities,
        effects_supported,
    };
    Ok((device, descriptor))
}

/// Turns off adaptive trigger effects a previous session may have left on.
/// Only PS5 controllers take this command; failures are swallowed.
fn clear_trigger_effects<D: Device>(device: &mut D) -> bool {
    if device.controller_type() != ControllerType::Ps5 {
        return false;
    }
    let packet = Ds5EffectsState::clear_triggers().to_bytes();
    let sent = device.send_effect(&packet).is_ok();
    device.clear_error();
    sent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::DS5_EFFECTS_LEN;
    use crate::mock::{MockBackend, MockPad, Write};

    #[test]
    fn open_failure_carries_hardware_message() {
        let mut backend = MockBackend::new();
        backend.state().open_error = Some("device busy".into());
        backend.attach(0, 100, MockPad::default());

        match probe(&mut backend, 0, PlayerSlot::UNASSIGNED) {
            Err(Error::OpenFailed(msg)) => assert_eq!(msg, "device busy"),
            other => panic!("expected OpenFailed, got {other:?}"),
        }
    }

    #[test]
    fn descriptor_reflects_capabilities() {
        let mut backend = MockBackend::new();
        backend.attach(
            0,
            100,
            MockPad {
                name: "Pad".into(),
                vendor_id: 0x054c,
                product_id: 0x0ce6,
                serial: Some("sn-1".into()),
                leds: true,
                touchpads: 1,
                gyroscope: true,
                ..MockPad::default()
            },
        );

        let (_, descriptor) = probe(&mut backend, 0, PlayerSlot::UNASSIGNED).unwrap();
        assert_eq!(descriptor.name, "Pad");
        assert_eq!(descriptor.vendor_id, 0x054c);
        assert_eq!(descriptor.serial.as_deref(), Some("sn-1"));
        assert!(descriptor.capabilities.has_leds);
        assert!(descriptor.capabilities.has_gyroscope);
        assert!(!descriptor.capabilities.has_accelerometer);
        assert_eq!(descriptor.capabilities.num_touchpads, 1);
        assert!(descriptor.capabilities.has_rumble);
        assert!(!descriptor.effects_supported);
    }

    #[test]
    fn rumble_probe_uses_faint_magnitude() {
        let mut backend = MockBackend::new();
        backend.attach(0, 7, MockPad::default());
        probe(&mut backend, 0, PlayerSlot::UNASSIGNED).unwrap();

        assert_eq!(
            backend.state().writes,
            vec![Write::Rumble { id: 7, low: 0x0200, high: 0x0200, ms: 250 }]
        );
    }

    #[test]
    fn rejected_rumble_probe_clears_has_rumble() {
        let mut backend = MockBackend::new();
        backend.attach(
            0,
            7,
            MockPad {
                write_error: Some("rumble not supported".into()),
                ..MockPad::default()
            },
        );
        let (_, descriptor) = probe(&mut backend, 0, PlayerSlot::UNASSIGNED).unwrap();
        assert!(!descriptor.capabilities.has_rumble);
    }

    #[test]
    fn ps5_gets_trigger_reset_packet() {
        let mut backend = MockBackend::new();
        backend.attach(
            0,
            9,
            MockPad {
                controller_type: ControllerType::Ps5,
                ..MockPad::default()
            },
        );
        let (_, descriptor) = probe(&mut backend, 0, PlayerSlot::UNASSIGNED).unwrap();
        assert!(descriptor.effects_supported);

        let state = backend.state();
        assert_eq!(state.effects.len(), 1);
        assert_eq!(state.effects[0].len(), DS5_EFFECTS_LEN);
        assert_eq!(state.effects[0][0], 0x0C);
    }

    #[test]
    fn failed_trigger_reset_is_not_fatal() {
        let mut backend = MockBackend::new();
        backend.attach(
            0,
            9,
            MockPad {
                controller_type: ControllerType::Ps5,
                effect_error: Some("unsupported".into()),
                ..MockPad::default()
            },
        );
        let (_, descriptor) = probe(&mut backend, 0, PlayerSlot::UNASSIGNED).unwrap();
        assert!(!descriptor.effects_supported);
        assert!(descriptor.capabilities.has_rumble);
        assert!(backend.state().errors_cleared >= 1);
    }

    #[test]
    fn player_index_is_set_before_any_write() {
        let mut backend = MockBackend::new();
        backend.attach(
            0,
            9,
            MockPad {
                controller_type: ControllerType::Ps5,
                ..MockPad::default()
            },
        );
        let player = PlayerSlot::new(3).unwrap();
        probe(&mut backend, 0, player).unwrap();

        let state = backend.state();
        assert_eq!(state.players, vec![(9, player)]);
        assert_eq!(
            state.calls,
            ["player 9 3", "effect 9", "clear_error", "clear_error", "rumble 9"]
        );
    }
}
