//! Streaming JSON encoding/decoding of record documents.
//!
//! The layers, bottom-up:
//! - [`tokenizer`] / [`generator`]: JSON tokens in and out
//! - [`encoder`] / [`decoder`]: the record, link and instruction convention
//! - [`document`]: whole [`Graph`](crate::model::Graph)s, optionally compressed

pub mod decoder;
pub mod document;
pub mod encoder;
pub mod generator;
pub mod tokenizer;

pub use decoder::{decode, decode_reader, decode_slice, DecodeStats, Decoder, FieldKind, Step};
pub use document::{
    decode_graph, decode_graph_from_reader, decode_graph_with_options, decompress, encode_graph,
    encode_graph_compressed, encode_graph_compressed_with_options, encode_graph_to_writer,
    encode_graph_with_options, is_compressed,
};
pub use encoder::Encoder;
pub use generator::JsonWriter;
pub use tokenizer::{JsonReader, Scalar, Token, TokenSource};
