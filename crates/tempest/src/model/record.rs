//! Records and record graphs.
//!
//! The encoder only sees records through [`Writable`]. [`Graph`] is the
//! concrete implementation used by the document helpers and produced by
//! [`GraphConstructor`](crate::construct::GraphConstructor).

use std::hash::Hash;

/// Anything that can be written as one record of a document.
pub trait Writable {
    /// Stable key used to look up the identifier assigned to a record.
    type Key: Eq + Hash + Clone;

    /// Key of this record.
    fn key(&self) -> Self::Key;

    /// Attribute name/value pairs, in write order. Names are unique.
    fn attributes(&self) -> impl Iterator<Item = (&str, &str)>;

    /// Link name/target pairs, in write order. Names are unique.
    fn links(&self) -> impl Iterator<Item = (&str, Self::Key)>;
}

/// Index of a record inside its [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey(usize);

impl RecordKey {
    /// Position of the record in its graph.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A record with string attributes and named links to other records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    attributes: Vec<(String, String)>,
    links: Vec<(String, RecordKey)>,
    instruction: Option<String>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute, replacing any previous value under the same name.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Sets a link, replacing any previous target under the same name.
    pub fn set_link(&mut self, name: impl Into<String>, target: RecordKey) {
        let name = name.into();
        match self.links.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = target,
            None => self.links.push((name, target)),
        }
    }

    /// Sets the instruction this record was created under.
    pub fn set_instruction(&mut self, instruction: Option<String>) {
        self.instruction = instruction;
    }

    /// Looks up an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Looks up a link target.
    pub fn link(&self, name: &str) -> Option<RecordKey> {
        self.links.iter().find(|(n, _)| n == name).map(|(_, k)| *k)
    }

    /// The instruction in effect when this record was created, if any.
    pub fn instruction(&self) -> Option<&str> {
        self.instruction.as_deref()
    }

    /// All attributes in insertion order.
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// All links in insertion order.
    pub fn links(&self) -> &[(String, RecordKey)] {
        &self.links
    }
}

/// An ordered collection of records that may link to each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    records: Vec<Record>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record and returns its key.
    pub fn insert(&mut self, record: Record) -> RecordKey {
        let key = RecordKey(self.records.len());
        self.records.push(record);
        key
    }

    /// Returns the record for `key`.
    pub fn get(&self, key: RecordKey) -> Option<&Record> {
        self.records.get(key.0)
    }

    /// Returns the record for `key` mutably.
    pub fn get_mut(&mut self, key: RecordKey) -> Option<&mut Record> {
        self.records.get_mut(key.0)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the graph has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = RecordRef<'_>> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, record)| RecordRef {
                key: RecordKey(i),
                record,
            })
    }

    /// Keys of all records in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = RecordKey> + use<> {
        (0..self.records.len()).map(RecordKey)
    }
}

/// A record borrowed together with its key, as handed to the encoder.
#[derive(Debug, Clone, Copy)]
pub struct RecordRef<'a> {
    key: RecordKey,
    record: &'a Record,
}

impl<'a> RecordRef<'a> {
    /// The record's key.
    pub fn key(&self) -> RecordKey {
        self.key
    }

    /// The record itself.
    pub fn record(&self) -> &'a Record {
        self.record
    }
}

impl Writable for RecordRef<'_> {
    type Key = RecordKey;

    fn key(&self) -> RecordKey {
        self.key
    }

    fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.record
            .attributes
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_str()))
    }

    fn links(&self) -> impl Iterator<Item = (&str, RecordKey)> {
        self.record.links.iter().map(|(n, k)| (n.as_str(), *k))
    }
}
