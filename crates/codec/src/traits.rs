//! Header encoding trait definitions.

use crate::error::Result;
use crate::strategy::EncodingStrategy;
use strata_core::{HeaderMap, Value};

/// A single header encoding.
///
/// Implementations turn a header map into the document fragment stored in
/// the commit record, and back.
///
/// # Thread Safety
///
/// Encodings must be `Send + Sync` so the facade can be shared across
/// writer and reader threads.
pub trait HeaderEncoding: Send + Sync {
    /// Encode headers into a document fragment.
    ///
    /// All-or-nothing: on error no fragment is produced.
    fn encode(&self, headers: &HeaderMap) -> Result<Value>;

    /// Decode a fragment produced by this encoding.
    ///
    /// Fragments of the wrong shape fail with `StrategyMismatch`.
    fn decode(&self, fragment: &Value) -> Result<HeaderMap>;

    /// The strategy this encoding implements.
    fn strategy(&self) -> EncodingStrategy;
}
