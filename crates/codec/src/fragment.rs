//! Encoded header fragments.
//!
//! A fragment is what ends up in the header field of a stored commit. The
//! facade always writes tagged fragments:
//!
//! ```text
//! { "$strategy": "array_of_pairs", "$headers": [ ["key.1", "value"] ] }
//! ```
//!
//! Both marker fields start with `$`. Under the default field-name rules that
//! is the reserved prefix, so no legal header key can collide with them; a
//! store that overrides `reserved_prefix` loses that guarantee. Anything
//! without a `$strategy` marker is a legacy untagged fragment whose body is
//! the bare encoding. A document that carries `$strategy` but is not a
//! well-formed tagged fragment is reported as a corrupt `$strategy` field.

use crate::error::{HeaderCodecError, Result};
use crate::strategy::EncodingStrategy;
use std::collections::HashMap;
use strata_core::{FieldNameError, Value};
use tracing::warn;

/// Marker field carrying the strategy tag
pub const STRATEGY_FIELD: &str = "$strategy";

/// Marker field carrying the encoded headers
pub const HEADERS_FIELD: &str = "$headers";

/// Storage-ready header representation.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedHeaderFragment {
    strategy: Option<EncodingStrategy>,
    body: Value,
}

impl EncodedHeaderFragment {
    /// A fragment that records which strategy produced it
    pub fn tagged(strategy: EncodingStrategy, body: Value) -> Self {
        Self {
            strategy: Some(strategy),
            body,
        }
    }

    /// A legacy fragment with no strategy marker
    pub fn untagged(body: Value) -> Self {
        Self {
            strategy: None,
            body,
        }
    }

    /// Strategy recorded in the fragment, if any
    pub fn strategy(&self) -> Option<EncodingStrategy> {
        self.strategy
    }

    /// The bare encoding
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Whether the fragment records its strategy
    pub fn is_tagged(&self) -> bool {
        self.strategy.is_some()
    }

    /// Lay the fragment out as a document value for storage.
    pub fn into_document(self) -> Value {
        match self.strategy {
            Some(strategy) => {
                let mut doc = HashMap::with_capacity(2);
                doc.insert(
                    STRATEGY_FIELD.to_string(),
                    Value::String(strategy.as_str().to_string()),
                );
                doc.insert(HEADERS_FIELD.to_string(), self.body);
                Value::Object(doc)
            }
            None => self.body,
        }
    }

    /// Read a fragment back from its stored document value.
    ///
    /// A document carrying `$strategy` must carry exactly the two marker
    /// fields and a known tag. Anything else holding that field name is a
    /// corrupt document and fails with `CorruptHeaderField`.
    pub fn from_document(doc: Value) -> Result<Self> {
        let mut fields = match doc {
            Value::Object(fields) if fields.contains_key(STRATEGY_FIELD) => fields,
            other => return Ok(Self::untagged(other)),
        };

        if fields.len() != 2 || !fields.contains_key(HEADERS_FIELD) {
            let mut names: Vec<&str> = fields.keys().map(String::as_str).collect();
            names.sort_unstable();
            return Err(corrupt_marker(&format!(
                "expected fields {} and {}, found {:?}",
                STRATEGY_FIELD, HEADERS_FIELD, names
            )));
        }

        let strategy = match fields.remove(STRATEGY_FIELD) {
            Some(Value::String(tag)) => tag
                .parse::<EncodingStrategy>()
                .map_err(|e| corrupt_marker(&e.to_string()))?,
            other => {
                return Err(corrupt_marker(&format!(
                    "{} is a {}, expected String",
                    STRATEGY_FIELD,
                    other.as_ref().map_or("nothing", Value::type_name)
                )))
            }
        };

        let body = fields
            .remove(HEADERS_FIELD)
            .ok_or_else(|| corrupt_marker(&format!("no {} field", HEADERS_FIELD)))?;

        Ok(Self::tagged(strategy, body))
    }
}

fn corrupt_marker(detail: &str) -> HeaderCodecError {
    warn!(
        target: "strata::codec",
        field = STRATEGY_FIELD,
        detail,
        "Document carries a strategy marker but is not a tagged fragment"
    );
    HeaderCodecError::CorruptHeaderField {
        field: STRATEGY_FIELD.to_string(),
        reason: FieldNameError::ReservedPrefix { prefix: '$' },
    }
}
