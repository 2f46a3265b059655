//! Tracing capture harness.
//!
//! Installs a recording subscriber for the duration of a closure so tests can
//! assert the level, message and structured fields of emitted events.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex},
};

use tracing::{
    Event,
    Level,
    Metadata,
    Subscriber,
    field::{Field, Visit},
    span::{Attributes, Id, Record},
};

#[derive(Clone, Default)]
struct RecordingSubscriber {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl RecordingSubscriber {
    fn take_events(&self) -> Vec<RecordedEvent> {
        let mut guard = match self.events.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::take(&mut *guard)
    }
}

/// One captured event.
#[derive(Debug, Clone)]
pub struct RecordedEvent {
    level: Level,
    target: String,
    fields: HashMap<String, String>,
    message: Option<String>,
}

impl RecordedEvent {
    /// Event level.
    #[must_use]
    pub const fn level(&self) -> Level { self.level }

    /// Module path the event was emitted from, e.g. `plcrpc::client`.
    #[must_use]
    pub fn target(&self) -> &str { &self.target }

    /// A structured field rendered as text.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// The formatted message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> { self.message.as_deref() }
}

#[derive(Default)]
struct FieldRecorder {
    fields: HashMap<String, String>,
    message: Option<String>,
}

impl FieldRecorder {
    fn record_value(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = Some(value);
        } else {
            self.fields.insert(field.name().to_owned(), value);
        }
    }
}

impl Visit for FieldRecorder {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record_value(field, format!("{value:?}"));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_value(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_value(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record_value(field, value.to_string());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_value(field, value.to_owned());
    }
}

impl Subscriber for RecordingSubscriber {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool { true }

    fn new_span(&self, _attrs: &Attributes<'_>) -> Id { Id::from_u64(1) }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let mut recorder = FieldRecorder::default();
        event.record(&mut recorder);
        let metadata = event.metadata();
        let record = RecordedEvent {
            level: *metadata.level(),
            target: metadata.target().to_owned(),
            fields: recorder.fields,
            message: recorder.message,
        };
        let mut guard = match self.events.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(record);
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

/// Run `f` with a recording subscriber and return its output with every
/// event it emitted, in order.
///
/// # Examples
/// ```
/// use test_util::tracing::capture_events;
///
/// let (value, events) = capture_events(|| {
///     tracing::info!(chunks = 2, "sent");
///     7
/// });
/// assert_eq!(value, 7);
/// assert_eq!(events.len(), 1);
/// ```
#[must_use]
pub fn capture_events<R>(f: impl FnOnce() -> R) -> (R, Vec<RecordedEvent>) {
    let subscriber = RecordingSubscriber::default();
    let dispatch = tracing::Dispatch::new(subscriber.clone());
    let output = tracing::dispatcher::with_default(&dispatch, f);
    (output, subscriber.take_events())
}

/// Events from `events` emitted under the module path `target`.
#[must_use]
pub fn from_target<'a>(events: &'a [RecordedEvent], target: &str) -> Vec<&'a RecordedEvent> {
    let nested = format!("{target}::");
    events
        .iter()
        .filter(|event| event.target == target || event.target.starts_with(&nested))
        .collect()
}

/// Capture the single event emitted by `f`.
///
/// # Panics
///
/// Panics unless exactly one event was emitted.
#[must_use]
pub fn capture_single_event(f: impl FnOnce()) -> RecordedEvent {
    let ((), events) = capture_events(f);
    let mut iter = events.into_iter();
    match (iter.next(), iter.next()) {
        (Some(event), None) => event,
        _ => panic!("expected exactly one tracing event"),
    }
}
