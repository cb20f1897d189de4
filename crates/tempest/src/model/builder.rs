//! Builder API for ergonomic graph construction.
//!
//! # Example
//!
//! ```rust
//! use tempest::model::builder::GraphBuilder;
//!
//! let mut builder = GraphBuilder::new();
//! let a = builder.record(|r| r.attribute("name", "A"));
//! let b = builder.record(|r| r.attribute("name", "B").link("prev", a));
//! builder.record(|r| r.attribute("name", "C").link("prev", b));
//! let graph = builder.build();
//! assert_eq!(graph.len(), 3);
//! ```

use crate::model::{Graph, Record, RecordKey};

/// Builder for a [`Graph`].
///
/// Records are added in document order. An instruction set with
/// [`GraphBuilder::instruction`] applies to every record added after it,
/// until replaced. A document has no way to clear an instruction, so
/// neither does the builder.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    graph: Graph,
    instruction: Option<String>,
}

impl GraphBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the instruction for subsequently added records.
    pub fn instruction(&mut self, instruction: impl Into<String>) -> &mut Self {
        self.instruction = Some(instruction.into());
        self
    }

    /// Adds a record built by `f` and returns its key.
    pub fn record<F>(&mut self, f: F) -> RecordKey
    where
        F: FnOnce(RecordBuilder) -> RecordBuilder,
    {
        let mut record = f(RecordBuilder::new()).build();
        record.set_instruction(self.instruction.clone());
        self.graph.insert(record)
    }

    /// Adds a record with no fields and returns its key.
    pub fn empty_record(&mut self) -> RecordKey {
        self.record(|r| r)
    }

    /// Links `from` to `to` under `name` after both have been added.
    ///
    /// Needed for cycles, where the target does not exist yet while the
    /// source is being built. Unknown `from` keys are ignored.
    pub fn link(&mut self, from: RecordKey, name: impl Into<String>, to: RecordKey) -> &mut Self {
        if let Some(record) = self.graph.get_mut(from) {
            record.set_link(name, to);
        }
        self
    }

    /// Finishes the graph.
    pub fn build(self) -> Graph {
        self.graph
    }
}

/// Builder for a single [`Record`].
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    /// Creates an empty record builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) an attribute.
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.record.set_attribute(name, value);
        self
    }

    /// Adds (or replaces) a link.
    pub fn link(mut self, name: impl Into<String>, target: RecordKey) -> Self {
        self.record.set_link(name, target);
        self
    }

    /// Finishes the record.
    pub fn build(self) -> Record {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_of_records() {
        let mut builder = GraphBuilder::new();
        let a = builder.record(|r| r.attribute("name", "A"));
        let b = builder.record(|r| r.attribute("name", "B").link("prev", a));
        let graph = builder.build();

        assert_eq!(graph.get(a).unwrap().attribute("name"), Some("A"));
        assert_eq!(graph.get(b).unwrap().link("prev"), Some(a));
        assert!(graph.get(a).unwrap().links().is_empty());
    }

    #[test]
    fn test_instruction_applies_to_following_records() {
        let mut builder = GraphBuilder::new();
        let plain = builder.empty_record();
        builder.instruction("GROUP0");
        let first = builder.empty_record();
        let second = builder.empty_record();
        builder.instruction("GROUP1");
        let third = builder.empty_record();
        let graph = builder.build();

        assert_eq!(graph.get(plain).unwrap().instruction(), None);
        assert_eq!(graph.get(first).unwrap().instruction(), Some("GROUP0"));
        assert_eq!(graph.get(second).unwrap().instruction(), Some("GROUP0"));
        assert_eq!(graph.get(third).unwrap().instruction(), Some("GROUP1"));
    }

    #[test]
    fn test_late_link_closes_cycle() {
        let mut builder = GraphBuilder::new();
        let a = builder.empty_record();
        let b = builder.record(|r| r.link("next", a));
        builder.link(a, "next", b);
        let graph = builder.build();

        assert_eq!(graph.get(a).unwrap().link("next"), Some(b));
        assert_eq!(graph.get(b).unwrap().link("next"), Some(a));
    }
}
