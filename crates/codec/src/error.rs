//! Header codec errors.

use crate::strategy::EncodingStrategy;
use strata_core::FieldNameError;
use thiserror::Error;

/// Result type alias for header codec operations
pub type Result<T> = std::result::Result<T, HeaderCodecError>;

/// Errors raised while encoding or decoding commit headers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderCodecError {
    /// A header key cannot be written as a document field name.
    ///
    /// Raised before any part of the fragment is produced, so the caller can
    /// reject the commit attempt without a partial write.
    #[error("Invalid header key '{key}': {reason}")]
    InvalidHeaderKey {
        /// The offending key
        key: String,
        /// Which field-name rule the key breaks
        reason: FieldNameError,
    },

    /// A stored document carries a field name the store should never have
    /// accepted.
    #[error("Corrupt header field '{field}': {reason}")]
    CorruptHeaderField {
        /// The stored field name
        field: String,
        /// Which field-name rule the name breaks
        reason: FieldNameError,
    },

    /// Encode or decode was called before a strategy was registered.
    #[error("No header encoding strategy registered")]
    NoStrategyRegistered,

    /// `register` was called while another strategy is active.
    #[error("Header encoding strategy already registered: {active}")]
    AlreadyRegistered {
        /// The strategy currently active
        active: EncodingStrategy,
    },

    /// A fragment does not have the shape the decoding strategy produces.
    #[error("Strategy mismatch: expected {expected} fragment, found {found}")]
    StrategyMismatch {
        /// Strategy used to decode
        expected: EncodingStrategy,
        /// What was found instead
        found: String,
    },

    /// The fragment has the right outer shape but broken contents.
    #[error("Malformed header fragment: {0}")]
    MalformedFragment(String),

    /// A strategy tag or configuration value is not recognized.
    #[error("Unknown header encoding strategy: {0}")]
    UnknownStrategy(String),
}
