//! Pre-encode validation.
//!
//! The decoder classifies fields purely by prefix, so a record whose data
//! happens to start with a reserved indicator would be read back as
//! something else. These checks reject such records before any byte is
//! written.

use crate::config::Indicators;
use crate::error::ValidationError;
use crate::model::{Graph, Writable};

/// Checks that a record's field names and attribute values are unambiguous.
///
/// - No field name may start with either indicator (it would read back as
///   a record introduction or an instruction).
/// - No attribute value may start with the ID indicator (it would read back
///   as a link).
pub fn validate_record<R: Writable>(record: &R, indicators: &Indicators) -> Result<(), ValidationError> {
    for (name, value) in record.attributes() {
        check_name(name, indicators)?;
        if indicators.is_identifier(value) {
            return Err(ValidationError::ReservedValue {
                name: name.to_string(),
                value: value.to_string(),
                prefix: indicators.id().to_string(),
            });
        }
    }
    for (name, _) in record.links() {
        check_name(name, indicators)?;
    }
    Ok(())
}

/// Validates every record of a graph, plus its instruction sequence.
pub fn validate_graph(graph: &Graph, indicators: &Indicators) -> Result<(), ValidationError> {
    graph
        .iter()
        .try_for_each(|record| validate_record(&record, indicators))?;
    validate_instructions(graph)
}

/// Checks that no record without an instruction follows one with an
/// instruction.
///
/// A decoder tags each record with the last instruction it has seen, and a
/// document cannot express "no instruction" once one was written.
pub fn validate_instructions(graph: &Graph) -> Result<(), ValidationError> {
    let mut seen = false;
    for record in graph.iter() {
        match record.record().instruction() {
            Some(_) => seen = true,
            None if seen => {
                return Err(ValidationError::ClearedInstruction {
                    index: record.key().index(),
                });
            }
            None => {}
        }
    }
    Ok(())
}

fn check_name(name: &str, indicators: &Indicators) -> Result<(), ValidationError> {
    let prefix = if indicators.is_identifier(name) {
        indicators.id()
    } else if indicators.is_instruction(name) {
        indicators.instruction()
    } else {
        return Ok(());
    };
    Err(ValidationError::ReservedName {
        name: name.to_string(),
        prefix: prefix.to_string(),
    })
}
