//! Progress sinks
//!
//! Sinks only observe; nothing they do feeds back into the operation.

use docket_core::{ProgressEvent, ProgressSink};
use tracing::info;

/// Forwards events to `tracing` at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn report(&mut self, event: ProgressEvent) {
        info!(target: "docket::lifecycle", "{}", event);
    }
}

/// Keeps every event in memory
#[derive(Debug, Default, Clone)]
pub struct RecordingProgress {
    events: Vec<ProgressEvent>,
}

impl RecordingProgress {
    /// Empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far, oldest first
    pub fn events(&self) -> &[ProgressEvent] {
        &self.events
    }

    /// Take the recorded events
    pub fn into_events(self) -> Vec<ProgressEvent> {
        self.events
    }
}

impl ProgressSink for RecordingProgress {
    fn report(&mut self, event: ProgressEvent) {
        self.events.push(event);
    }
}

/// Drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&mut self, _event: ProgressEvent) {}
}
