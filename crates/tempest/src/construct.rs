//! Rebuilding a [`Graph`] from construction events.
//!
//! [`GraphConstructor`] is the collaborator used by
//! [`decode_graph`](crate::codec::decode_graph). It follows the events
//! literally: every field lands on the most recently created record, and
//! each record is tagged with the last instruction seen before it. Link
//! targets are collected as raw identifiers and resolved in
//! [`GraphConstructor::finish`], so forward references and cycles work.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::ResolveError;
use crate::model::{Construct, ConstructionEvent, Graph, Record, RecordKey};

#[derive(Debug, Clone)]
struct PendingLink {
    from: RecordKey,
    name: String,
    target: String,
}

/// Builds a [`Graph`] out of decoder events.
///
/// [`Construct::apply`] cannot fail, so the first inconsistency is kept and
/// reported by [`finish`](Self::finish). Events after it are ignored.
#[derive(Debug, Clone, Default)]
pub struct GraphConstructor {
    graph: Graph,
    keys: FxHashMap<String, RecordKey>,
    identifiers: Vec<String>,
    current: Option<RecordKey>,
    instruction: Option<String>,
    links: Vec<PendingLink>,
    error: Option<ResolveError>,
}

impl GraphConstructor {
    /// Creates an empty constructor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records created so far.
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    /// Returns true if no record has been created.
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Key of the record introduced under `id`, if it has been seen.
    pub fn key_of(&self, id: &str) -> Option<RecordKey> {
        self.keys.get(id).copied()
    }

    /// Identifier a record was introduced under.
    pub fn identifier_of(&self, key: RecordKey) -> Option<&str> {
        self.identifiers.get(key.index()).map(String::as_str)
    }

    /// The latest instruction seen, if any.
    pub fn instruction(&self) -> Option<&str> {
        self.instruction.as_deref()
    }

    /// Resolves all links and returns the graph.
    pub fn finish(self) -> Result<Graph, ResolveError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let mut graph = self.graph;
        for link in self.links {
            let Some(&target) = self.keys.get(&link.target) else {
                return Err(ResolveError::UnresolvedLink {
                    record: self
                        .identifiers
                        .get(link.from.index())
                        .cloned()
                        .unwrap_or_default(),
                    name: link.name,
                    target: link.target,
                });
            };
            if let Some(record) = graph.get_mut(link.from) {
                record.set_link(link.name, target);
            }
        }
        debug!(records = graph.len(), "graph reconstructed");
        Ok(graph)
    }

    fn current_record(&mut self, name: &str) -> Option<&mut Record> {
        match self.current {
            Some(key) => self.graph.get_mut(key),
            None => {
                self.error = Some(ResolveError::FieldOutsideRecord {
                    name: name.to_string(),
                });
                None
            }
        }
    }
}

impl Construct for GraphConstructor {
    fn apply(&mut self, event: ConstructionEvent) {
        if self.error.is_some() {
            return;
        }
        match event {
            ConstructionEvent::Create { id } => {
                if self.keys.contains_key(&id) {
                    self.error = Some(ResolveError::DuplicateIdentifier { id });
                    return;
                }
                let mut record = Record::new();
                record.set_instruction(self.instruction.clone());
                let key = self.graph.insert(record);
                self.keys.insert(id.clone(), key);
                self.identifiers.push(id);
                self.current = Some(key);
            }
            ConstructionEvent::Attribute { name, value } => {
                if let Some(record) = self.current_record(&name) {
                    record.set_attribute(name, value);
                }
            }
            ConstructionEvent::Link { name, target } => {
                if let Some(from) = self.current {
                    self.links.push(PendingLink { from, name, target });
                } else {
                    self.error = Some(ResolveError::FieldOutsideRecord { name });
                }
            }
            ConstructionEvent::Instruction { text } => {
                self.instruction = Some(text);
            }
        }
    }
}
