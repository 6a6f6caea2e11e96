use smallvec::SmallVec;

use crate::backend::{Backend, Device};
use crate::engine::Engine;
use crate::error::BackendError;
use crate::notification::{publish, Notification, Sink};
use crate::params::{Arg, LedParams, RumbleParams, SensorParams, TriggerRumbleParams};
use crate::types::{PlayerSlot, SensorKind, Target};

/// Controller commands, named as they appear in `error` notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Rumble,
    RumbleTriggers,
    SetLeds,
    EnableGyroscope,
    EnableAccelerometer,
}

impl Operation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Operation::Rumble => "rumble",
            Operation::RumbleTriggers => "rumbleTriggers",
            Operation::SetLeds => "setLeds",
            Operation::EnableGyroscope => "enableGyroscope",
            Operation::EnableAccelerometer => "enableAccelerometer",
        }
    }
}

/// Result of a command on one targeted controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success {
        player: PlayerSlot,
    },
    Failure {
        player: PlayerSlot,
        operation: Operation,
        error: BackendError,
    },
}

impl Outcome {
    pub fn player(&self) -> PlayerSlot {
        match self {
            Outcome::Success { player } | Outcome::Failure { player, .. } => *player,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}

/// One entry per targeted controller. Inline for the usual seven players.
pub type Outcomes = SmallVec<[Outcome; 8]>;

impl<B: Backend> Engine<B> {
    pub fn rumble<S: Sink + ?Sized>(&mut self, params: RumbleParams, sink: &mut S) -> Outcomes {
        self.dispatch(
            Operation::Rumble,
            params.player,
            sink,
            |device| device.rumble(params.low, params.high, params.duration_ms),
            |player| Notification::Rumbled { player },
        )
    }

    /// Rumbles the adaptive triggers of PS5-family controllers.
    pub fn rumble_triggers<S: Sink + ?Sized>(
        &mut self,
        params: TriggerRumbleParams,
        sink: &mut S,
    ) -> Outcomes {
        self.dispatch(
            Operation::RumbleTriggers,
            params.player,
            sink,
            |device| device.rumble_triggers(params.left, params.right, params.duration_ms),
            |player| Notification::RumbledTriggers { player },
        )
    }

    pub fn set_leds<S: Sink + ?Sized>(&mut self, params: LedParams, sink: &mut S) -> Outcomes {
        self.dispatch(
            Operation::SetLeds,
            params.player,
            sink,
            |device| device.set_led(params.red, params.green, params.blue),
            |player| Notification::Led { player },
        )
    }

    pub fn enable_gyroscope<S: Sink + ?Sized>(
        &mut self,
        params: SensorParams,
        sink: &mut S,
    ) -> Outcomes {
        self.toggle_sensor(SensorKind::Gyroscope, Operation::EnableGyroscope, params, sink)
    }

    pub fn enable_accelerometer<S: Sink + ?Sized>(
        &mut self,
        params: SensorParams,
        sink: &mut S,
    ) -> Outcomes {
        self.toggle_sensor(
            SensorKind::Accelerometer,
            Operation::EnableAccelerometer,
            params,
            sink,
        )
    }

    /// Positional form of [`Engine::rumble`]; malformed arguments are
    /// reported as warnings and replaced by defaults.
    pub fn rumble_args<S: Sink + ?Sized>(&mut self, args: &[Arg], sink: &mut S) -> Outcomes {
        let parsed = RumbleParams::from_args(args);
        emit_warnings(sink, parsed.warnings);
        self.rumble(parsed.params, sink)
    }

    pub fn rumble_triggers_args<S: Sink + ?Sized>(
        &mut self,
        args: &[Arg],
        sink: &mut S,
    ) -> Outcomes {
        let parsed = TriggerRumbleParams::from_args(args);
        emit_warnings(sink, parsed.warnings);
        self.rumble_triggers(parsed.params, sink)
    }

    pub fn set_leds_args<S: Sink + ?Sized>(&mut self, args: &[Arg], sink: &mut S) -> Outcomes {
        let parsed = LedParams::from_args(args);
        emit_warnings(sink, parsed.warnings);
        self.set_leds(parsed.params, sink)
    }

    pub fn enable_gyroscope_args<S: Sink + ?Sized>(
        &mut self,
        args: &[Arg],
        sink: &mut S,
    ) -> Outcomes {
        let parsed = SensorParams::from_args(args);
        emit_warnings(sink, parsed.warnings);
        self.enable_gyroscope(parsed.params, sink)
    }

    pub fn enable_accelerometer_args<S: Sink + ?Sized>(
        &mut self,
        args: &[Arg],
        sink: &mut S,
    ) -> Outcomes {
        let parsed = SensorParams::from_args(args);
        emit_warnings(sink, parsed.warnings);
        self.enable_accelerometer(parsed.params, sink)
    }

    fn toggle_sensor<S: Sink + ?Sized>(
        &mut self,
        sensor: SensorKind,
        operation: Operation,
        params: SensorParams,
        sink: &mut S,
    ) -> Outcomes {
        let enabled = params.enable;
        self.dispatch(
            operation,
            params.player,
            sink,
            |device| device.set_sensor_enabled(sensor, enabled),
            |player| Notification::SensorState {
                sensor,
                enabled,
                player,
            },
        )
    }

    /// Applies `write` to every controller `target` addresses and reports
    /// each result on its own. A failing controller does not stop the rest.
    fn dispatch<S, W, N>(
        &mut self,
        operation: Operation,
        target: Target,
        sink: &mut S,
        mut write: W,
        success: N,
    ) -> Outcomes
    where
        S: Sink + ?Sized,
        W: FnMut(&mut B::Device) -> Result<(), BackendError>,
        N: Fn(PlayerSlot) -> Notification,
    {
        let mut outcomes = Outcomes::new();
        for record in self.registry.targets_mut(target) {
            let player = record.slot();
            let outcome = match write(record.device_mut()) {
                Ok(()) => {
                    publish(sink, &success(player));
                    Outcome::Success { player }
                }
                Err(error) => {
                    publish(
                        sink,
                        &Notification::Error {
                            message: error.0.clone(),
                            operation: operation.as_str(),
                            player: Some(player),
                        },
                    );
                    Outcome::Failure {
                        player,
                        operation,
                        error,
                    }
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }
}

fn emit_warnings<S: Sink + ?Sized>(sink: &mut S, warnings: Vec<String>) {
    for message in warnings {
        publish(sink, &Notification::Warning { message });
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::engine::EngineConfig;
    use crate::mock::{MockBackend, MockPad, Recorder, Write};

    fn slot(n: u8) -> PlayerSlot {
        PlayerSlot::new(n).unwrap()
    }

    /// Initialized engine with one controller per pad, ids 100, 101, ...
    fn engine_with(pads: Vec<MockPad>) -> (Engine<MockBackend>, Recorder) {
        let backend = MockBackend::new();
        for (i, pad) in pads.into_iter().enumerate() {
            let i = i as u32;
            backend.attach(i, 100 + i, pad);
        }
        let mut engine = Engine::new(backend, EngineConfig::default());
        let mut sink = Recorder::default();
        engine.poll_events(&mut sink);
        sink.clear();
        (engine, sink)
    }

    fn writes(engine: &Engine<MockBackend>) -> Vec<Write> {
        engine.backend.handle().borrow().writes.clone()
    }

    fn players(outcomes: &Outcomes) -> BTreeSet<u8> {
        outcomes.iter().map(|o| o.player().get()).collect()
    }

    #[test]
    fn red_leds_reach_every_player() {
        let (mut engine, mut sink) = engine_with(vec![MockPad::default(); 2]);
        let outcomes = engine.set_leds(
            LedParams {
                red: 255,
                green: 0,
                blue: 0,
                player: Target::ALL,
            },
            &mut sink,
        );

        assert!(outcomes.iter().all(Outcome::is_success));
        assert_eq!(players(&outcomes), BTreeSet::from([1, 2]));
        assert_eq!(sink.topics(), ["led", "led"]);
        let mut written: Vec<_> = writes(&engine)
            .into_iter()
            .filter(|w| matches!(w, Write::Led { .. }))
            .collect();
        written.sort_by_key(|w| match w {
            Write::Led { id, .. } => *id,
            _ => 0,
        });
        assert_eq!(
            written,
            vec![
                Write::Led { id: 100, red: 255, green: 0, blue: 0 },
                Write::Led { id: 101, red: 255, green: 0, blue: 0 },
            ]
        );
    }

    #[test]
    fn default_rumble_hits_all_controllers_at_full_strength() {
        let (mut engine, mut sink) = engine_with(vec![MockPad::default(); 3]);
        let before = writes(&engine).len();
        let outcomes = engine.rumble(RumbleParams::default(), &mut sink);

        assert_eq!(outcomes.len(), 3);
        assert_eq!(sink.topics(), ["rumbled", "rumbled", "rumbled"]);
        let new_writes = &writes(&engine)[before..];
        assert!(new_writes.iter().all(|w| matches!(
            w,
            Write::Rumble { low: 0xFFFC, high: 0xFFFC, ms: 250, .. }
        )));
    }

    #[test]
    fn targeted_command_reaches_one_player() {
        let (mut engine, mut sink) = engine_with(vec![MockPad::default(); 3]);
        let outcomes = engine.rumble_triggers(
            TriggerRumbleParams {
                player: slot(2).into(),
                ..TriggerRumbleParams::default()
            },
            &mut sink,
        );

        assert_eq!(outcomes.as_slice(), [Outcome::Success { player: slot(2) }]);
        assert_eq!(sink.emitted[0].1, Notification::RumbledTriggers { player: slot(2) });
        assert!(writes(&engine)
            .iter()
            .any(|w| matches!(w, Write::RumbleTriggers { id: 101, .. })));
    }

    #[test]
    fn command_for_absent_player_does_nothing() {
        let (mut engine, mut sink) = engine_with(vec![MockPad::default(); 2]);
        let outcomes = engine.enable_gyroscope(
            SensorParams {
                enable: true,
                player: slot(3).into(),
            },
            &mut sink,
        );

        assert!(outcomes.is_empty());
        assert!(sink.emitted.is_empty());
    }

    #[test]
    fn commands_before_first_poll_do_nothing() {
        let backend = MockBackend::new();
        backend.attach(0, 100, MockPad::default());
        let mut engine = Engine::new(backend, EngineConfig::default());
        let mut sink = Recorder::default();

        assert!(engine.rumble(RumbleParams::default(), &mut sink).is_empty());
        assert!(sink.emitted.is_empty());
    }

    #[test]
    fn one_failure_does_not_hide_the_others() {
        let broken = MockPad {
            write_error: Some("Controller write failed".into()),
            ..MockPad::default()
        };
        let (mut engine, mut sink) = engine_with(vec![MockPad::default(), broken]);
        let outcomes = engine.set_leds(LedParams::default(), &mut sink);

        assert_eq!(outcomes.len(), 2);
        let failure = outcomes
            .iter()
            .find(|o| !o.is_success())
            .expect("one failure");
        assert_eq!(
            *failure,
            Outcome::Failure {
                player: slot(2),
                operation: Operation::SetLeds,
                error: BackendError::new("Controller write failed"),
            }
        );
        assert_eq!(sink.with_topic("led").len(), 1);
        assert_eq!(
            sink.with_topic("error"),
            [&Notification::Error {
                message: "Controller write failed".into(),
                operation: "setLeds",
                player: Some(slot(2)),
            }]
        );
    }

    #[test]
    fn sensor_toggles_use_sensor_topics() {
        let (mut engine, mut sink) = engine_with(vec![MockPad::default()]);
        engine.enable_gyroscope(SensorParams::default(), &mut sink);
        engine.enable_accelerometer(
            SensorParams {
                enable: false,
                ..SensorParams::default()
            },
            &mut sink,
        );

        assert_eq!(
            sink.topics(),
            ["gyroscope:enabled", "accelerometer:disabled"]
        );
        let toggles: Vec<_> = writes(&engine)
            .into_iter()
            .filter(|w| matches!(w, Write::Sensor { .. }))
            .collect();
        assert_eq!(
            toggles,
            vec![
                Write::Sensor { id: 100, sensor: SensorKind::Gyroscope, enabled: true },
                Write::Sensor { id: 100, sensor: SensorKind::Accelerometer, enabled: false },
            ]
        );
    }

    #[test]
    fn failed_sensor_toggle_names_the_operation() {
        let (mut engine, mut sink) = engine_with(vec![MockPad {
            write_error: Some("That operation is not supported".into()),
            ..MockPad::default()
        }]);
        engine.enable_accelerometer(SensorParams::default(), &mut sink);

        assert!(matches!(
            sink.emitted[0].1,
            Notification::Error { operation: "enableAccelerometer", .. }
        ));
    }

    #[test]
    fn args_warnings_precede_the_command() {
        let (mut engine, mut sink) = engine_with(vec![MockPad::default()]);
        let outcomes = engine.set_leds_args(
            &[Arg::Str("red".into()), Arg::Number(128.0), Arg::Number(300.0)],
            &mut sink,
        );

        assert_eq!(outcomes.len(), 1);
        assert_eq!(sink.topics(), ["warning", "warning", "led"]);
        assert_eq!(sink.emitted[0].1.message(), "wrong argument type: red");
        assert_eq!(sink.emitted[1].1.message(), "wrong argument type: blue");
        assert!(writes(&engine).contains(&Write::Led {
            id: 100,
            red: 0,
            green: 128,
            blue: 255
        }));
    }

    #[test]
    fn args_player_selects_target() {
        let (mut engine, mut sink) = engine_with(vec![MockPad::default(); 2]);
        let outcomes = engine.enable_gyroscope_args(&[Arg::Bool(false), Arg::Number(1.0)], &mut sink);

        assert_eq!(outcomes.as_slice(), [Outcome::Success { player: slot(1) }]);
        assert_eq!(sink.topics(), ["gyroscope:disabled"]);
    }

    #[test]
    fn args_player_outside_slot_range_reaches_nobody() {
        let (mut engine, mut sink) = engine_with(vec![MockPad::default(); 2]);
        let before = writes(&engine).len();

        let outcomes = engine.enable_gyroscope_args(&[Arg::Bool(true), Arg::Number(9.0)], &mut sink);
        assert!(outcomes.is_empty());

        let outcomes = engine.rumble_args(
            &[
                Arg::Number(1.0),
                Arg::Number(1.0),
                Arg::Number(10.0),
                Arg::Number(-1.0),
            ],
            &mut sink,
        );
        assert!(outcomes.is_empty());

        assert!(sink.emitted.is_empty());
        assert_eq!(writes(&engine).len(), before);
    }

    #[test]
    fn operation_names() {
        assert_eq!(Operation::Rumble.as_str(), "rumble");
        assert_eq!(Operation::RumbleTriggers.as_str(), "rumbleTriggers");
        assert_eq!(Operation::SetLeds.as_str(), "setLeds");
        assert_eq!(Operation::EnableGyroscope.as_str(), "enableGyroscope");
        assert_eq!(Operation::EnableAccelerometer.as_str(), "enableAccelerometer");
    }
}
