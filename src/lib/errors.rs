//! Custom error types for merge operations.

use bstr::BString;
use thiserror::Error;

/// Result type alias for merge operations
pub type Result<T> = std::result::Result<T, MergeError>;

/// Error type for merge operations
#[derive(Error, Debug)]
pub enum MergeError {
    /// The read name of a record could not be decoded for name-ordered merging
    #[error("Could not decode read name of record from stream '{stream}'")]
    NameUnavailable {
        /// Identity of the stream the record came from
        stream: BString,
    },

    /// Growing the merge structure failed
    #[error("Failed to grow merge structure holding {len} candidates")]
    Allocation {
        /// Number of candidates held when the allocation failed
        len: usize,
    },

    /// Two input streams share the same identity
    #[error("Input stream '{stream}' was given more than once")]
    DuplicateStream {
        /// The duplicated stream identity
        stream: BString,
    },

    /// Input files do not share the same reference sequence dictionary
    #[error("Reference sequences of '{path}' are incompatible: {reason}")]
    IncompatibleReferences {
        /// Path of the offending file
        path: String,
        /// Explanation of the mismatch
        reason: String,
    },

    /// Unknown merge order name
    #[error("Invalid merge order '{value}' (expected coordinate, queryname, or unsorted)")]
    InvalidMergeOrder {
        /// The value that failed to parse
        value: String,
    },

    /// A record could not be read from its stream
    #[error("Invalid record in stream '{stream}': {reason}")]
    InvalidRecord {
        /// Identity of the stream
        stream: BString,
        /// Explanation of the problem
        reason: String,
    },

    /// File format error
    #[error("Invalid {file_type} file '{path}': {reason}")]
    InvalidFileFormat {
        /// Type of file (e.g., "BAM")
        file_type: String,
        /// Path to the file
        path: String,
        /// Explanation of the problem
        reason: String,
    },

    /// Underlying I/O failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
