//! Commit store errors.

use std::io;
use strata_codec::HeaderCodecError;
use thiserror::Error;

/// Result type alias for commit store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors returned by the commit store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another commit already holds the attempted commit sequence
    #[error("Concurrency conflict on stream '{stream_id}': expected commit sequence {expected}, got {actual}")]
    ConcurrencyConflict {
        /// Stream the attempt targeted
        stream_id: String,
        /// Next free commit sequence
        expected: u64,
        /// Sequence carried by the attempt
        actual: u64,
    },

    /// The commit attempt is not well formed
    #[error("Invalid commit attempt: {0}")]
    InvalidAttempt(String),

    /// Header encoding or decoding failed
    #[error("Header codec error: {0}")]
    Codec(#[from] HeaderCodecError),

    /// A stored record could not be serialized or deserialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration could not be loaded or is incomplete
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<rmp_serde::encode::Error> for StoreError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for StoreError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}
