//! Document-mapped header encoding.
//!
//! Each header key becomes a field of the fragment document:
//!
//! ```text
//! { "key": "value", "retries": 3 }
//! ```
//!
//! Field names must satisfy the store's [`FieldNameConstraint`]. Encoding
//! validates every key before building anything, so an illegal key fails the
//! whole encode with `InvalidHeaderKey` and nothing partial is produced.
//!
//! Decoding re-checks every stored field name. A name that breaks the rules
//! means something upstream wrote or mangled it, and is reported as
//! `CorruptHeaderField` instead of being passed through.

use crate::error::{HeaderCodecError, Result};
use crate::strategy::EncodingStrategy;
use crate::traits::HeaderEncoding;
use std::collections::HashMap;
use strata_core::{FieldNameConstraint, HeaderMap, Value};
use tracing::warn;

/// Encodes headers as document fields, subject to field-name rules.
#[derive(Debug, Clone, Default)]
pub struct DocumentMappedCodec {
    constraint: FieldNameConstraint,
}

impl DocumentMappedCodec {
    /// Create a codec that enforces the given field-name rules
    pub fn new(constraint: FieldNameConstraint) -> Self {
        Self { constraint }
    }

    /// The field-name rules this codec enforces
    pub fn constraint(&self) -> &FieldNameConstraint {
        &self.constraint
    }

    /// Check every key without encoding anything.
    ///
    /// Keys are visited in map order, so the first illegal key reported is
    /// deterministic.
    pub fn validate(&self, headers: &HeaderMap) -> Result<()> {
        for key in headers.keys() {
            self.constraint
                .check(key)
                .map_err(|reason| HeaderCodecError::InvalidHeaderKey {
                    key: key.clone(),
                    reason,
                })?;
        }
        Ok(())
    }
}

impl HeaderEncoding for DocumentMappedCodec {
    fn encode(&self, headers: &HeaderMap) -> Result<Value> {
        self.validate(headers)?;

        let fields: HashMap<String, Value> = headers
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Ok(Value::Object(fields))
    }

    fn decode(&self, fragment: &Value) -> Result<HeaderMap> {
        let fields = fragment
            .as_object()
            .ok_or_else(|| HeaderCodecError::StrategyMismatch {
                expected: EncodingStrategy::DocumentMapped,
                found: fragment.type_name().to_string(),
            })?;

        // Sorted, so the same corrupt document always reports the same field
        let mut names: Vec<&String> = fields.keys().collect();
        names.sort();

        let mut headers = HeaderMap::new();
        for name in names {
            if let Err(reason) = self.constraint.check(name) {
                warn!(
                    target: "strata::codec",
                    field = %name.escape_debug(),
                    reason = reason.reason_code(),
                    "Stored header document has an illegal field name"
                );
                return Err(HeaderCodecError::CorruptHeaderField {
                    field: name.clone(),
                    reason,
                });
            }
            headers.insert(name.clone(), fields[name].clone());
        }
        Ok(headers)
    }

    fn strategy(&self) -> EncodingStrategy {
        EncodingStrategy::DocumentMapped
    }
}
