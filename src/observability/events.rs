use std::sync::{Arc, Mutex, PoisonError};
use serde_json::{Map, Value};

pub const PRICE_SOURCE_DONE: &str = "price_source_done";
pub const PRICE_ARBITRATION_DONE: &str = "price_arbitration_done";

/// Receiver of named structured events with key/value fields.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &str, fields: &Map<String, Value>);
}

/// Default sink: one `tracing` info record per event.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: &str, fields: &Map<String, Value>) {
        let fields = Value::Object(fields.clone());
        tracing::info!(target: "price_arbiter::events", event, %fields);
    }
}

/// In-memory sink, handy for tests and diagnostics.
#[derive(Clone, Debug, Default)]
pub struct RecordingEventSink {
    events: Arc<Mutex<Vec<(String, Map<String, Value>)>>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, Map<String, Value>)> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn named(&self, event: &str) -> Vec<Map<String, Value>> {
        self.events()
            .into_iter()
            .filter(|(name, _)| name == event)
            .map(|(_, fields)| fields)
            .collect()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: &str, fields: &Map<String, Value>) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((event.to_string(), fields.clone()));
    }
}

/// Merges `base` context under `extras`; event fields win on key clash.
pub fn with_context(base: &Map<String, Value>, extras: Map<String, Value>) -> Map<String, Value> {
    let mut merged = base.clone();
    merged.extend(extras);
    merged
}
