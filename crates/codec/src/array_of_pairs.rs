//! Array-of-pairs header encoding.
//!
//! Headers are written as an ordered list of two-element records:
//!
//! ```text
//! [ ["key.1", "value"], ["$meta", 42] ]
//! ```
//!
//! Keys are stored as string values, never as field names, so every string
//! is representable. This is the encoding of record for keys the document
//! model would reject.
//!
//! Duplicate keys in a stored fragment resolve last-write-wins.

use crate::error::{HeaderCodecError, Result};
use crate::strategy::EncodingStrategy;
use crate::traits::HeaderEncoding;
use strata_core::{HeaderMap, Value};
use tracing::debug;

/// Encodes headers as a list of `[key, value]` records.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayOfPairsCodec;

impl HeaderEncoding for ArrayOfPairsCodec {
    fn encode(&self, headers: &HeaderMap) -> Result<Value> {
        let pairs = headers
            .iter()
            .map(|(key, value)| Value::Array(vec![Value::String(key.clone()), value.clone()]))
            .collect();
        Ok(Value::Array(pairs))
    }

    fn decode(&self, fragment: &Value) -> Result<HeaderMap> {
        let pairs = fragment
            .as_array()
            .ok_or_else(|| HeaderCodecError::StrategyMismatch {
                expected: EncodingStrategy::ArrayOfPairs,
                found: fragment.type_name().to_string(),
            })?;

        let mut headers = HeaderMap::new();
        for (index, pair) in pairs.iter().enumerate() {
            let (key, value) = split_pair(index, pair)?;
            if headers.insert(key.to_string(), value.clone()).is_some() {
                debug!(
                    target: "strata::codec",
                    key,
                    index,
                    "Duplicate header pair, later value wins"
                );
            }
        }
        Ok(headers)
    }

    fn strategy(&self) -> EncodingStrategy {
        EncodingStrategy::ArrayOfPairs
    }
}

fn split_pair(index: usize, pair: &Value) -> Result<(&str, &Value)> {
    match pair.as_array() {
        Some([Value::String(key), value]) => Ok((key.as_str(), value)),
        Some([other, _]) => Err(HeaderCodecError::MalformedFragment(format!(
            "pair {} has a {} key, expected String",
            index,
            other.type_name()
        ))),
        Some(items) => Err(HeaderCodecError::MalformedFragment(format!(
            "pair {} has {} elements, expected 2",
            index,
            items.len()
        ))),
        None => Err(HeaderCodecError::MalformedFragment(format!(
            "pair {} is a {}, expected Array",
            index,
            pair.type_name()
        ))),
    }
}
