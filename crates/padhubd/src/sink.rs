use ahash::AHashSet;
use colored::Colorize;
use padhub_engine::{topic, Notification, Sink};

use crate::{print_debug, print_error, print_info, print_warning};

/// How a topic is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
    /// High-rate input streams, only shown with `--verbose`.
    Debug,
}

/// Prints notifications through the logger, optionally limited to a set of
/// topics.
#[derive(Debug, Default)]
pub struct LogSink {
    allow: Option<AHashSet<String>>,
    printed: usize,
}

impl LogSink {
    /// An empty `topics` list prints everything.
    pub fn new(topics: &[String]) -> Self {
        let allow = (!topics.is_empty()).then(|| topics.iter().cloned().collect());
        Self { allow, printed: 0 }
    }

    pub fn accepts(&self, topic: &str) -> bool {
        self.allow
            .as_ref()
            .map_or(true, |allow| allow.contains(topic))
    }

    /// Number of notifications printed so far.
    pub fn printed(&self) -> usize {
        self.printed
    }
}

pub fn severity(topic: &str) -> Severity {
    match topic {
        topic::ERROR => Severity::Error,
        topic::WARNING => Severity::Warning,
        topic::SDL_INIT
        | topic::DEVICE_ADDED
        | topic::DEVICE_REMOVED
        | topic::DEVICE_REMAPPED
        | topic::BATTERY_UPDATE
        | topic::RUMBLED
        | topic::RUMBLED_TRIGGERS
        | topic::LED => Severity::Info,
        t if t.ends_with(":enabled") || t.ends_with(":disabled") => Severity::Info,
        _ => Severity::Debug,
    }
}

impl Sink for LogSink {
    fn emit(&mut self, topic: &str, notification: &Notification) {
        if !self.accepts(topic) {
            return;
        }
        self.printed += 1;
        match severity(topic) {
            Severity::Error => {
                print_error!("{topic}: {notification}");
            }
            Severity::Warning => {
                print_warning!("{topic}: {notification}");
            }
            Severity::Info => {
                print_info!("{topic}: {notification}");
            }
            Severity::Debug => {
                print_debug!("{topic}: {notification}");
            }
        }
    }
}
