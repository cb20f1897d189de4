//! Record and instruction encoding.
//!
//! An [`Encoder`] is one encode session: it owns the identifier generator,
//! the record -> identifier assignments and the instruction counter.

use std::hash::Hash;
use std::io::Write;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::codec::generator::JsonWriter;
use crate::config::{EncodeOptions, Indicators};
use crate::error::EncodeError;
use crate::model::{IdGenerator, Writable};
use crate::validate::validate_record;

#[derive(Debug, Clone)]
struct Assignment {
    id: String,
    written: bool,
}

/// Writes records and instructions into a [`JsonWriter`].
#[derive(Debug, Clone)]
pub struct Encoder<K> {
    indicators: Indicators,
    ids: IdGenerator,
    assigned: FxHashMap<K, Assignment>,
    instructions_written: u64,
    skip_validation: bool,
}

impl<K: Eq + Hash + Clone> Default for Encoder<K> {
    fn default() -> Self {
        Self::new(&EncodeOptions::default())
    }
}

impl<K: Eq + Hash + Clone> Encoder<K> {
    /// Starts a new session.
    pub fn new(options: &EncodeOptions) -> Self {
        Self {
            ids: IdGenerator::with_strategy(options.indicators.id(), options.id_strategy),
            indicators: options.indicators.clone(),
            assigned: FxHashMap::default(),
            instructions_written: 0,
            skip_validation: options.skip_validation,
        }
    }

    /// Assigns an identifier to `key` without writing it, so that records
    /// written earlier can link to it. Returns the (possibly existing)
    /// identifier.
    pub fn register(&mut self, key: K) -> &str {
        &self.assign(key).id
    }

    fn assign(&mut self, key: K) -> &mut Assignment {
        let ids = &mut self.ids;
        self.assigned.entry(key).or_insert_with(|| Assignment {
            id: ids.next_id(),
            written: false,
        })
    }

    /// Identifier assigned to `key`, if any.
    pub fn identifier(&self, key: &K) -> Option<&str> {
        self.assigned.get(key).map(|a| a.id.as_str())
    }

    /// Number of instructions written so far.
    pub fn instructions_written(&self) -> u64 {
        self.instructions_written
    }

    /// Writes one record.
    ///
    /// With `nested == false` the record becomes a standalone root object
    /// and receives no identifier. With `nested == true` it is written as a
    /// field of the currently open object, named by its identifier.
    ///
    /// Every link target must already have an identifier, either because it
    /// was written earlier in this session or because it was
    /// [registered](Self::register).
    pub fn write_record<R, W>(
        &mut self,
        record: &R,
        sink: &mut JsonWriter<W>,
        nested: bool,
    ) -> Result<(), EncodeError>
    where
        R: Writable<Key = K>,
        W: Write,
    {
        if !self.skip_validation {
            validate_record(record, &self.indicators)?;
        }

        let id = if nested {
            let key = record.key();
            let assignment = self.assign(key);
            if assignment.written {
                return Err(EncodeError::RecordWrittenTwice {
                    id: assignment.id.clone(),
                });
            }
            Some(assignment.id.clone())
        } else {
            None
        };

        let links = record
            .links()
            .map(|(name, target)| match self.assigned.get(&target) {
                Some(assignment) => Ok((name, assignment.id.as_str())),
                None => Err(EncodeError::UnassignedLink {
                    name: name.to_string(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        match &id {
            Some(id) => sink.begin_object_field(id)?,
            None => sink.begin_object()?,
        }
        for (name, value) in record.attributes() {
            sink.string_field(name, value)?;
        }
        for (name, target) in &links {
            sink.string_field(name, target)?;
        }
        sink.end_object()?;

        trace!(id = id.as_deref().unwrap_or("<root>"), links = links.len(), "record written");

        // Only a complete object counts, so a failed write can be retried.
        if nested {
            if let Some(assignment) = self.assigned.get_mut(&record.key()) {
                assignment.written = true;
            }
        }
        Ok(())
    }

    /// Writes an instruction field at the current level.
    ///
    /// Instruction fields are named by the instruction indicator followed
    /// by this session's counter, which starts at 0 and grows by one per
    /// successful call. The sink must be inside the document root and not
    /// inside a record.
    pub fn write_instruction<W: Write>(
        &mut self,
        sink: &mut JsonWriter<W>,
        instruction: &str,
    ) -> Result<(), EncodeError> {
        if sink.depth() > 1 {
            return Err(EncodeError::InstructionInsideRecord {
                depth: sink.depth(),
            });
        }
        let name = format!("{}{}", self.indicators.instruction(), self.instructions_written);
        sink.string_field(&name, instruction)?;
        self.instructions_written += 1;
        trace!(%name, "instruction written");
        Ok(())
    }
}
