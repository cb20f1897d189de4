//! tempest: object graphs as streaming JSON documents.
//!
//! Records become JSON objects, links between records become identifier
//! strings, and out-of-band instructions become specially named fields.
//! Everything is recognised by prefix alone, so documents can be written
//! and read in one pass without a schema.
//!
//! # Quick Start
//!
//! ```rust
//! use tempest::codec::{decode_graph, encode_graph};
//! use tempest::model::GraphBuilder;
//!
//! let mut builder = GraphBuilder::new();
//! builder.instruction("start-group");
//! let a = builder.record(|r| r.attribute("name", "A"));
//! builder.record(|r| r.attribute("name", "B").link("prev", a));
//! let graph = builder.build();
//!
//! let bytes = encode_graph(&graph).unwrap();
//! assert_eq!(
//!     std::str::from_utf8(&bytes).unwrap(),
//!     r#"{"%CHECK:0":"start-group","%ID:0":{"name":"A"},"%ID:1":{"name":"B","prev":"%ID:0"}}"#
//! );
//!
//! let decoded = decode_graph(&bytes).unwrap();
//! assert_eq!(decoded, graph);
//! ```
//!
//! # Modules
//!
//! - [`model`]: records, graphs, identifiers and construction events
//! - [`codec`]: tokenizer, generator, encoder, decoder and document helpers
//! - [`construct`]: rebuilding a graph from decoder events
//! - [`validate`]: pre-encode checks against reserved prefixes
//! - [`config`]: indicators and encode/decode options
//! - [`error`]: error types
//! - [`limits`]: limits enforced while reading
//!
//! # Wire Format
//!
//! ```text
//! {
//!   "%CHECK:0": "<instruction>",
//!   "%ID:0": { "<attribute>": "<value>", "<link>": "%ID:1" },
//!   "%ID:1": { ... }
//! }
//! ```
//!
//! Both prefixes are configurable through [`Indicators`]. Documents may be
//! zstd-compressed; the decoder detects this automatically.

pub mod codec;
pub mod config;
pub mod construct;
pub mod error;
pub mod limits;
pub mod model;
pub mod validate;

// Re-export commonly used types at crate root
pub use codec::{decode, decode_graph, encode_graph, encode_graph_compressed, Decoder, Encoder};
pub use config::{DecodeOptions, EncodeOptions, IdStrategy, Indicators, IntroductionPolicy};
pub use construct::GraphConstructor;
pub use error::{DecodeError, EncodeError, ErrorCode, ResolveError, ValidationError};
pub use model::{
    Construct, ConstructionEvent, EventLog, Graph, GraphBuilder, IdGenerator, Record, RecordKey,
    Writable,
};
pub use validate::{validate_graph, validate_instructions, validate_record};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
