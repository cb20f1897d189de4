//! Construction events emitted by the decoder.

/// One decode transition, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructionEvent {
    /// A record introduced under identifier `id` starts here.
    Create { id: String },
    /// Plain attribute of the current record.
    Attribute { name: String, value: String },
    /// Link from the current record to the record named `target`.
    ///
    /// `target` is the raw identifier; it may be introduced later in the
    /// stream or never.
    Link { name: String, target: String },
    /// Document-level instruction.
    Instruction { text: String },
}

/// Receives construction events for the duration of one decode call.
pub trait Construct {
    /// Handles one event.
    fn apply(&mut self, event: ConstructionEvent);
}

impl<C: Construct + ?Sized> Construct for &mut C {
    fn apply(&mut self, event: ConstructionEvent) {
        (**self).apply(event);
    }
}

/// A collaborator that just records every event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<ConstructionEvent>,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far.
    pub fn events(&self) -> &[ConstructionEvent] {
        &self.events
    }

    /// Consumes the log, returning its events.
    pub fn into_events(self) -> Vec<ConstructionEvent> {
        self.events
    }

    /// Identifiers of all `Create` events, in order.
    pub fn created(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|event| match event {
            ConstructionEvent::Create { id } => Some(id.as_str()),
            _ => None,
        })
    }
}

impl Construct for EventLog {
    fn apply(&mut self, event: ConstructionEvent) {
        self.events.push(event);
    }
}
