//! Error types for encoding, decoding, validation and graph reconstruction.

use std::io;

use thiserror::Error;

/// Coarse classification of failures, matching how callers react to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E001: the underlying stream failed
    Transport,
    /// E002: the bytes are not well-formed JSON
    Syntax,
    /// E003: a configured limit was exceeded
    Limit,
    /// E004: well-formed JSON that breaks the record/link/instruction convention
    Convention,
    /// E005: the decoded events do not form a consistent graph
    Resolution,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "E001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::Transport => "E001",
            ErrorCode::Syntax => "E002",
            ErrorCode::Limit => "E003",
            ErrorCode::Convention => "E004",
            ErrorCode::Resolution => "E005",
        }
    }
}

/// Error while reading a document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    // === E001: transport ===
    #[error("[E001] I/O error while reading document: {0}")]
    Io(String),

    #[error("[E001] zstd decompression failed: {0}")]
    DecompressionFailed(String),

    // === E002: syntax ===
    #[error("[E002] unexpected end of input while reading {context}")]
    UnexpectedEof { context: &'static str },

    #[error("[E002] unexpected byte 0x{found:02x} at byte {position} while reading {context}")]
    UnexpectedByte {
        found: u8,
        position: u64,
        context: &'static str,
    },

    #[error("[E002] invalid string at byte {position}: {reason}")]
    InvalidString { position: u64, reason: String },

    #[error("[E002] invalid number {text:?} at byte {position}")]
    InvalidNumber { text: String, position: u64 },

    // === E003: limits ===
    #[error("[E003] {field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("[E003] nesting exceeds maximum depth {max}")]
    NestingTooDeep { max: usize },

    // === E004: convention ===
    #[error("[E004] document root must be an object")]
    RootNotObject,

    #[error("[E004] record introduction {id:?} is not followed by an object")]
    MalformedIntroduction { id: String },

    // === E005: resolution ===
    #[error("[E005] {0}")]
    Resolve(#[from] ResolveError),
}

impl DecodeError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            DecodeError::Io(_) | DecodeError::DecompressionFailed(_) => ErrorCode::Transport,
            DecodeError::UnexpectedEof { .. }
            | DecodeError::UnexpectedByte { .. }
            | DecodeError::InvalidString { .. }
            | DecodeError::InvalidNumber { .. } => ErrorCode::Syntax,
            DecodeError::LengthExceedsLimit { .. } | DecodeError::NestingTooDeep { .. } => {
                ErrorCode::Limit
            }
            DecodeError::RootNotObject | DecodeError::MalformedIntroduction { .. } => {
                ErrorCode::Convention
            }
            DecodeError::Resolve(_) => ErrorCode::Resolution,
        }
    }
}

impl From<io::Error> for DecodeError {
    fn from(err: io::Error) -> Self {
        DecodeError::Io(err.to_string())
    }
}

/// Error while writing a document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("I/O error while writing document: {0}")]
    Io(String),

    #[error("field {name:?} written outside of any object")]
    FieldOutsideObject { name: String },

    #[error("object started without a field name inside an open object (depth {depth})")]
    UnnamedObject { depth: usize },

    #[error("end of object written with no object open")]
    UnbalancedEnd,

    #[error("link {name:?} points to a record with no assigned identifier")]
    UnassignedLink { name: String },

    #[error("record {id:?} written twice in one session")]
    RecordWrittenTwice { id: String },

    #[error("instruction written while a record object is open (depth {depth})")]
    InstructionInsideRecord { depth: usize },

    #[error("zstd compression failed: {0}")]
    CompressionFailed(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<io::Error> for EncodeError {
    fn from(err: io::Error) -> Self {
        EncodeError::Io(err.to_string())
    }
}

/// Error raised before encoding when data would be misread by the decoder.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{which} indicator must not be empty")]
    EmptyIndicator { which: &'static str },

    #[error("indicators {id:?} and {instruction:?} overlap")]
    IndicatorCollision { id: String, instruction: String },

    #[error("attribute {name:?} has value {value:?} starting with reserved prefix {prefix:?}")]
    ReservedValue {
        name: String,
        value: String,
        prefix: String,
    },

    #[error("field name {name:?} starts with reserved prefix {prefix:?}")]
    ReservedName { name: String, prefix: String },

    #[error("record {index} has no instruction but follows a record that has one")]
    ClearedInstruction { index: usize },
}

/// Error while turning construction events into a graph.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("record {record:?} links {name:?} to unknown identifier {target:?}")]
    UnresolvedLink {
        record: String,
        name: String,
        target: String,
    },

    #[error("identifier {id:?} introduced more than once")]
    DuplicateIdentifier { id: String },

    #[error("field {name:?} appears outside of any record")]
    FieldOutsideRecord { name: String },
}
