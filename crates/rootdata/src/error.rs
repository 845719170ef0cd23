//! Error types for the ROOT reader.

use thiserror::Error;

/// Errors raised while scanning or decoding a ROOT file.
#[derive(Error, Debug)]
pub enum RootError {
    /// I/O error while opening, seeking or reading the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file does not start with the `root` magic.
    #[error("not a ROOT file (bad magic)")]
    BadMagic,

    /// A key record header is inconsistent or truncated.
    #[error("malformed key record at offset {offset}: {reason}")]
    MalformedKey {
        /// File offset of the record.
        offset: u64,
        /// What was wrong with it.
        reason: String,
    },

    /// A read ran past the end of a buffer.
    #[error("buffer underflow at offset {offset}: need {need} bytes, have {have}")]
    BufferUnderflow {
        /// Cursor position of the failed read.
        offset: usize,
        /// Bytes requested.
        need: usize,
        /// Bytes left in the buffer.
        have: usize,
    },

    /// Decompressed data did not match the declared sizes, or the codec failed.
    #[error("decompression error: {0}")]
    Decompression(String),

    /// The compression tag names an algorithm this reader does not handle.
    #[error("unsupported compression algorithm {0:?}")]
    UnsupportedCompression(String),

    /// A navigator target is not reachable from the current schema position.
    #[error("field '{field}' not reachable in schema of {class}")]
    SchemaFieldNotFound {
        /// Class whose schema was walked.
        class: String,
        /// Requested field.
        field: String,
    },

    /// No schema is registered for a class.
    #[error("no streamer info for class {0}")]
    MissingSchema(String),

    /// Unknown histogram, tree, branch or leaf.
    #[error("object not found: {0}")]
    KeyNotFound(String),

    /// An object selection or column specification could not be used.
    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    /// Generic deserialization failure.
    #[error("deserialization error: {0}")]
    Deserialization(String),
}

/// Result alias for ROOT reading operations.
pub type Result<T> = std::result::Result<T, RootError>;
