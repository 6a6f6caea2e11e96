use std::time::{Duration, Instant};

use crate::backend::{Backend, Hints, RawEvent};
use crate::notification::{publish, Notification, Sink};
use crate::probe::probe;
use crate::registry::Registry;
use crate::slot::next_slot;
use crate::types::DeviceIndex;

/// Default wall-clock budget of one [`Engine::poll_events`] call.
pub const DEFAULT_POLL_BUDGET: Duration = Duration::from_millis(100);

/// Hint name reported in `sdl-init` when the ROG Chakram hint is on.
pub const ROG_CHAKRAM_HINT: &str = "sdl_joystick_rog_chakram";

/// Construction-time configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Extended support for the ROG Chakram spin-wheel device.
    pub rog_chakram: bool,
    pub poll_budget: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rog_chakram: false,
            poll_budget: DEFAULT_POLL_BUDGET,
        }
    }
}

/// Result of one poll call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Ok,
    /// The hardware subsystem failed to start; the next call retries.
    Uninitialized,
}

impl PollStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            PollStatus::Ok => "OK",
            PollStatus::Uninitialized => "UNINITIALIZED",
        }
    }
}

/// How a device reached [`Engine::add_controller`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AddSource {
    Enumerate,
    Hotplug,
}

impl AddSource {
    const fn as_str(self) -> &'static str {
        match self {
            AddSource::Enumerate => "enumerate",
            AddSource::Hotplug => "hotplug",
        }
    }
}

/// Controller registry plus the poll loop that keeps it current.
///
/// All operations take `&mut self`; a host that shares the engine between
/// threads has to put it behind a single lock.
pub struct Engine<B: Backend> {
    pub(crate) registry: Registry<B::Device>,
    pub(crate) backend: B,
    config: EngineConfig,
    initialized: bool,
    poll_number: u64,
    /// Popped after the budget ran out.
    pending: Option<RawEvent>,
}

impl<B: Backend> Engine<B> {
    pub fn new(backend: B, config: EngineConfig) -> Self {
        Self {
            registry: Registry::new(),
            backend,
            config,
            initialized: false,
            poll_number: 0,
            pending: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Read-only view of the registered controllers.
    pub fn registry(&self) -> &Registry<B::Device> {
        &self.registry
    }

    /// Drains pending hardware events into `sink`.
    ///
    /// The first call brings the hardware subsystem up and reports every
    /// controller already attached. Draining stops once the poll budget is
    /// spent with events still waiting; those are handled on the next call.
    pub fn poll_events<S: Sink + ?Sized>(&mut self, sink: &mut S) -> PollStatus {
        let start = Instant::now();
        self.poll_number += 1;

        if !self.initialized && !self.initialize(sink) {
            return PollStatus::Uninitialized;
        }

        let budget = self.config.poll_budget;
        let mut processed = 0usize;
        loop {
            let Some(event) = self.pending.take().or_else(|| self.backend.poll_event()) else {
                break;
            };
            if processed > 0 {
                let elapsed = start.elapsed();
                if elapsed >= budget {
                    // Handled first thing on the next call.
                    self.pending = Some(event);
                    log::debug!("poll #{} out of budget after {processed} events", self.poll_number);
                    publish(
                        sink,
                        &Notification::SlowPoll {
                            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                            events: processed,
                            poll_number: self.poll_number,
                        },
                    );
                    break;
                }
            }
            self.handle_event(event, sink);
            processed += 1;
        }

        PollStatus::Ok
    }

    fn initialize<S: Sink + ?Sized>(&mut self, sink: &mut S) -> bool {
        let hints = Hints {
            rog_chakram: self.config.rog_chakram,
        };
        let versions = match self.backend.init(&hints) {
            Ok(v) => v,
            Err(e) => {
                publish(
                    sink,
                    &Notification::Error {
                        message: e.0,
                        operation: "init",
                        player: None,
                    },
                );
                return false;
            }
        };
        self.initialized = true;
        publish(
            sink,
            &Notification::SdlInit {
                compiled_against: versions.compiled,
                linked_against: versions.linked,
                using_hints: hints.rog_chakram.then_some(ROG_CHAKRAM_HINT),
            },
        );

        for index in self.backend.controller_indices() {
            self.add_controller(index, AddSource::Enumerate, sink);
        }
        true
    }

    fn handle_event<S: Sink + ?Sized>(&mut self, event: RawEvent, sink: &mut S) {
        let notification = match event {
            RawEvent::DeviceAdded { index } => {
                self.add_controller(index, AddSource::Hotplug, sink);
                return;
            }
            RawEvent::DeviceRemoved { which } => {
                if let Some(record) = self.registry.remove(which) {
                    log::debug!("controller {which} removed, player {} released", record.slot());
                }
                Notification::DeviceRemoved { which }
            }
            RawEvent::DeviceRemapped { which } => Notification::DeviceRemapped { which },
            RawEvent::AxisMotion {
                which,
                axis,
                value,
                timestamp,
            } => Notification::AxisMotion {
                axis,
                value,
                timestamp,
                player: self.registry.slot_of(which),
            },
            RawEvent::ButtonDown { which, button, .. } => Notification::Button {
                button,
                pressed: true,
                player: self.registry.slot_of(which),
            },
            RawEvent::ButtonUp { which, button, .. } => Notification::Button {
                button,
                pressed: false,
                player: self.registry.slot_of(which),
            },
            RawEvent::Touchpad {
                phase,
                touchpad,
                finger,
                x,
                y,
                pressure,
                ..
            } => Notification::Touchpad {
                phase,
                touchpad,
                finger,
                x,
                y,
                pressure,
            },
            RawEvent::SensorUpdate { sensor, data, .. } => Notification::Sensor {
                sensor,
                x: data[0],
                y: data[1],
                z: data[2],
            },
            RawEvent::BatteryUpdated {
                which,
                level,
                timestamp,
            } => Notification::Battery {
                which,
                level,
                timestamp,
                player: self.registry.slot_of(which),
            },
            RawEvent::Key { key, pressed } => Notification::Button {
                button: key.button(),
                pressed,
                player: None,
            },
            RawEvent::Ignored => return,
        };
        publish(sink, &notification);
    }

    fn add_controller<S: Sink + ?Sized>(
        &mut self,
        index: DeviceIndex,
        source: AddSource,
        sink: &mut S,
    ) {
        let id = match self.backend.instance_id(index) {
            Ok(id) => id,
            Err(e) => {
                publish(sink, &open_error(e.0));
                return;
            }
        };
        if self.registry.contains(id) {
            log::debug!("controller {id} already registered, add suppressed");
            return;
        }

        let player = next_slot(&self.registry);
        let (device, descriptor) = match probe(&mut self.backend, index, player) {
            Ok(probed) => probed,
            Err(e) => {
                publish(sink, &open_error(e.to_string()));
                return;
            }
        };
        if let Err(e) = self.registry.insert(id, device, player) {
            publish(sink, &open_error(e.to_string()));
            return;
        }
        log::debug!("controller {id} registered as player {player}");

        publish(
            sink,
            &Notification::DeviceAdded {
                which: index,
                id,
                player,
                operation: source.as_str(),
                descriptor,
            },
        );
    }
}

impl<B: Backend> Drop for Engine<B> {
    fn drop(&mut self) {
        // Sessions close before the backend shuts the subsystem down.
        self.registry.clear();
    }
}

fn open_error(message: String) -> Notification {
    Notification::Error {
        message,
        operation: "open",
        player: None,
    }
}
