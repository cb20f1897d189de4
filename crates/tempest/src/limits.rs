//! Security limits and wire constants.
//!
//! The tokenizer enforces these while reading so that untrusted input cannot
//! force unbounded allocation or recursion bookkeeping.

/// Default prefix of every record identifier.
pub const DEFAULT_ID_INDICATOR: &str = "%ID:";

/// Default prefix of every instruction field name.
pub const DEFAULT_INSTRUCTION_INDICATOR: &str = "%CHECK:";

/// Maximum nesting of objects and arrays accepted by the tokenizer.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Maximum length in bytes of a single string or number token.
pub const MAX_STRING_LEN: usize = 16 * 1024 * 1024;

/// Maximum size of a decompressed document.
pub const MAX_DOCUMENT_SIZE: usize = 256 * 1024 * 1024;

/// Leading bytes of a zstd frame, used to detect compressed documents.
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Default zstd level for compressed documents.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;
