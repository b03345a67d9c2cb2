//! Error types for audiopipe
//!
//! Defines library-specific error types using thiserror for clear error propagation.

use std::time::Duration;
use thiserror::Error;

/// Main error type for audiopipe
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or misaligned raw bytes at a sample-format boundary
    #[error("Sample format error: {0}")]
    Format(String),

    /// Out-of-bounds frame indices or non-positive rates/targets
    #[error("Range error: {0}")]
    Range(String),

    /// Buffers with mismatched sample rate or channel count
    #[error("Incompatible buffers: {0}")]
    IncompatibleBuffer(String),

    /// Channel conversion outside the supported mono/multi cases
    #[error("Unsupported channel conversion: {from} -> {to} channels")]
    UnsupportedConversion {
        /// Source channel count
        from: u16,
        /// Requested channel count
        to: u16,
    },

    /// External codec tool failed while decoding
    #[error("Decode failed: {0}")]
    Decode(String),

    /// External codec tool failed while encoding
    #[error("Encode failed: {0}")]
    Encode(String),

    /// Stream inspection (ffprobe) failed or produced unusable output
    #[error("Probe failed: {0}")]
    Probe(String),

    /// External process unresponsive beyond the bounded wait
    ///
    /// The process is killed and reaped before this is returned.
    #[error("Codec tool timed out after {0:?}")]
    Timeout(Duration),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using the audiopipe Error
pub type Result<T> = std::result::Result<T, Error>;
