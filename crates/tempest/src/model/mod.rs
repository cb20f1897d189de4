//! Data model types.
//!
//! - Identifiers and their generator
//! - Records and graphs
//! - Construction events and the collaborator trait
//! - Builders (ergonomic construction)

pub mod builder;
pub mod event;
pub mod id;
pub mod record;

pub use builder::{GraphBuilder, RecordBuilder};
pub use event::{Construct, ConstructionEvent, EventLog};
pub use id::IdGenerator;
pub use record::{Graph, Record, RecordKey, RecordRef, Writable};
