//! Per-run context threaded through sources, engine and persister.
//!
//! Components never log through a global; they report observations to the
//! sink carried by [`RunContext`]. The CLI installs a sink that forwards to
//! its logger, tests install a [`RecordingSink`].

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub level: Level,
    pub message: String,
}

pub trait ObservationSink {
    fn observe(&mut self, level: Level, message: &str);
}

/// Discards everything.
pub struct NullSink;

impl ObservationSink for NullSink {
    fn observe(&mut self, _level: Level, _message: &str) {}
}

/// Keeps every observation in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub observations: Vec<Observation>,
}

impl RecordingSink {
    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.observations
            .iter()
            .filter(|o| o.level == Level::Warn)
            .map(|o| o.message.as_str())
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.observations.iter().any(|o| o.message.contains(needle))
    }
}

impl ObservationSink for RecordingSink {
    fn observe(&mut self, level: Level, message: &str) {
        self.observations.push(Observation {
            level,
            message: message.to_string(),
        });
    }
}

pub struct RunContext<'a> {
    sink: &'a mut dyn ObservationSink,
    run_at: DateTime<Utc>,
}

impl<'a> RunContext<'a> {
    pub fn new(sink: &'a mut dyn ObservationSink) -> Self {
        Self {
            sink,
            run_at: Utc::now(),
        }
    }

    /// Fixed timestamp, for reproducible output.
    pub fn at(sink: &'a mut dyn ObservationSink, run_at: DateTime<Utc>) -> Self {
        Self { sink, run_at }
    }

    pub fn run_at(&self) -> DateTime<Utc> {
        self.run_at
    }

    pub fn info(&mut self, message: impl AsRef<str>) {
        self.sink.observe(Level::Info, message.as_ref());
    }

    pub fn warn(&mut self, message: impl AsRef<str>) {
        self.sink.observe(Level::Warn, message.as_ref());
    }
}
