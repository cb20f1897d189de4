//! Whole-document encoding and decoding of [`Graph`]s.
//!
//! A document is one root object holding every record of the graph as an
//! identifier-named field. Whenever the instruction attached to the records
//! changes, an instruction field is written before the first record of the
//! new group.
//!
//! Documents can be zstd-compressed. The decoder detects compressed input
//! by the zstd frame magic; plain JSON can never start with those bytes.

use std::io::{BufRead, BufReader, Read, Write};

use tracing::{debug, warn};

use crate::codec::decoder::decode;
use crate::codec::encoder::Encoder;
use crate::codec::generator::JsonWriter;
use crate::codec::tokenizer::JsonReader;
use crate::config::{DecodeOptions, EncodeOptions};
use crate::construct::GraphConstructor;
use crate::error::{DecodeError, EncodeError, ValidationError};
use crate::limits::{MAX_DOCUMENT_SIZE, ZSTD_MAGIC};
use crate::model::{Graph, RecordKey};
use crate::validate::validate_graph;

/// Encodes a graph with default options.
pub fn encode_graph(graph: &Graph) -> Result<Vec<u8>, EncodeError> {
    encode_graph_with_options(graph, &EncodeOptions::default())
}

/// Encodes a graph with the given options.
pub fn encode_graph_with_options(graph: &Graph, options: &EncodeOptions) -> Result<Vec<u8>, EncodeError> {
    encode_graph_to_writer(graph, Vec::with_capacity(graph.len() * 48), options)
}

/// Encodes a graph into `writer` and returns the writer.
///
/// Unless validation is disabled, the whole graph is validated before the
/// first byte is written. A record without an instruction after one with an
/// instruction is rejected even then, since it cannot be represented. On failure the writer is still flushed; a flush
/// error at that point is logged and the original error returned.
pub fn encode_graph_to_writer<W: Write>(
    graph: &Graph,
    writer: W,
    options: &EncodeOptions,
) -> Result<W, EncodeError> {
    if !options.skip_validation {
        validate_graph(graph, &options.indicators)?;
    }

    let mut sink = JsonWriter::new(writer);
    match write_document(graph, &mut sink, options) {
        Ok(()) => {
            sink.flush()?;
            Ok(sink.into_inner())
        }
        Err(err) => {
            if let Err(flush_err) = sink.flush() {
                warn!(error = %flush_err, "flush failed after encode error");
            }
            Err(err)
        }
    }
}

fn write_document<W: Write>(
    graph: &Graph,
    sink: &mut JsonWriter<W>,
    options: &EncodeOptions,
) -> Result<(), EncodeError> {
    let mut encoder: Encoder<RecordKey> = Encoder::new(&EncodeOptions {
        skip_validation: true,
        ..options.clone()
    });
    // Every record gets its identifier up front so links may point forward.
    for key in graph.keys() {
        encoder.register(key);
    }

    sink.begin_object()?;
    let mut group = None;
    for record in graph.iter() {
        match record.record().instruction() {
            Some(instruction) if group != Some(instruction) => {
                encoder.write_instruction(sink, instruction)?;
                group = Some(instruction);
            }
            None if group.is_some() => {
                return Err(ValidationError::ClearedInstruction {
                    index: record.key().index(),
                }
                .into());
            }
            _ => {}
        }
        encoder.write_record(&record, sink, true)?;
    }
    sink.end_object()?;

    debug!(
        records = graph.len(),
        instructions = encoder.instructions_written(),
        "document encoded"
    );
    Ok(())
}

/// Encodes a graph and compresses it with zstd at `level`.
pub fn encode_graph_compressed(graph: &Graph, level: i32) -> Result<Vec<u8>, EncodeError> {
    encode_graph_compressed_with_options(graph, level, &EncodeOptions::default())
}

/// Encodes a graph with the given options and compresses it with zstd.
pub fn encode_graph_compressed_with_options(
    graph: &Graph,
    level: i32,
    options: &EncodeOptions,
) -> Result<Vec<u8>, EncodeError> {
    let plain = encode_graph_with_options(graph, options)?;
    let compressed = zstd::encode_all(plain.as_slice(), level)
        .map_err(|e| EncodeError::CompressionFailed(e.to_string()))?;
    debug!(plain = plain.len(), compressed = compressed.len(), level, "document compressed");
    Ok(compressed)
}

/// Returns true if `input` starts with a zstd frame.
pub fn is_compressed(input: &[u8]) -> bool {
    input.starts_with(&ZSTD_MAGIC)
}

/// Decompresses a zstd document, refusing output above the document limit.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let decoder =
        zstd::Decoder::new(input).map_err(|e| DecodeError::DecompressionFailed(e.to_string()))?;
    let mut out = Vec::with_capacity(input.len() * 4);
    decoder
        .take(MAX_DOCUMENT_SIZE as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| DecodeError::DecompressionFailed(e.to_string()))?;
    if out.len() > MAX_DOCUMENT_SIZE {
        return Err(DecodeError::LengthExceedsLimit {
            field: "document",
            len: out.len(),
            max: MAX_DOCUMENT_SIZE,
        });
    }
    Ok(out)
}

/// Decodes a plain or zstd-compressed document with default options.
pub fn decode_graph(input: &[u8]) -> Result<Graph, DecodeError> {
    decode_graph_with_options(input, &DecodeOptions::default())
}

/// Decodes a plain or zstd-compressed document.
pub fn decode_graph_with_options(input: &[u8], options: &DecodeOptions) -> Result<Graph, DecodeError> {
    if is_compressed(input) {
        let plain = decompress(input)?;
        return decode_plain(&mut JsonReader::from_slice(&plain), options);
    }
    if input.len() > MAX_DOCUMENT_SIZE {
        return Err(DecodeError::LengthExceedsLimit {
            field: "document",
            len: input.len(),
            max: MAX_DOCUMENT_SIZE,
        });
    }
    decode_plain(&mut JsonReader::from_slice(input), options)
}

/// Decodes a document from a stream without buffering it whole.
///
/// Compressed streams are decompressed on the fly; their output is cut off
/// at the document limit, which then surfaces as a truncated document.
pub fn decode_graph_from_reader<R: Read>(reader: R, options: &DecodeOptions) -> Result<Graph, DecodeError> {
    let mut reader = BufReader::new(reader);
    if is_compressed(reader.fill_buf()?) {
        let decoder = zstd::Decoder::with_buffer(reader)
            .map_err(|e| DecodeError::DecompressionFailed(e.to_string()))?;
        let limited = decoder.take(MAX_DOCUMENT_SIZE as u64);
        return decode_plain(&mut JsonReader::from_reader(limited), options);
    }
    decode_plain(&mut JsonReader::new(reader), options)
}

fn decode_plain<R: BufRead>(reader: &mut JsonReader<R>, options: &DecodeOptions) -> Result<Graph, DecodeError> {
    let mut constructor = GraphConstructor::new();
    decode(reader, &mut constructor, options)?;
    Ok(constructor.finish()?)
}
