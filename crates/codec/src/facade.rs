//! Header codec facade
//!
//! The single entry point the commit store uses. Writes go through the
//! registry's active strategy and always produce tagged fragments. Reads
//! follow the fragment's own tag when it has one, and fall back to the
//! active strategy (with shape validation) for legacy untagged fragments.

use crate::array_of_pairs::ArrayOfPairsCodec;
use crate::document_mapped::DocumentMappedCodec;
use crate::error::{HeaderCodecError, Result};
use crate::fragment::EncodedHeaderFragment;
use crate::registry::StrategyRegistry;
use crate::strategy::{EncodingStrategy, IllegalKeyPolicy};
use crate::traits::HeaderEncoding;
use std::sync::Arc;
use strata_core::{FieldNameConstraint, HeaderMap, Value};
use tracing::{debug, warn};

/// Encodes and decodes commit headers with the registered strategy.
///
/// # Example
///
/// ```
/// use strata_codec::{EncodingStrategy, HeaderCodec};
/// use strata_core::header_map;
///
/// let codec = HeaderCodec::with_strategy(EncodingStrategy::ArrayOfPairs);
/// let headers = header_map([("key.1", "value")]);
///
/// let fragment = codec.encode(&headers).unwrap();
/// assert_eq!(codec.decode(&fragment).unwrap(), headers);
/// ```
#[derive(Debug, Clone)]
pub struct HeaderCodec {
    registry: Arc<StrategyRegistry>,
    pairs: ArrayOfPairsCodec,
    document: DocumentMappedCodec,
    illegal_key_policy: IllegalKeyPolicy,
}

impl HeaderCodec {
    /// Create a facade over a shared registry and the store's field-name rules
    pub fn new(registry: Arc<StrategyRegistry>, constraint: FieldNameConstraint) -> Self {
        Self {
            registry,
            pairs: ArrayOfPairsCodec,
            document: DocumentMappedCodec::new(constraint),
            illegal_key_policy: IllegalKeyPolicy::default(),
        }
    }

    /// Create a facade with its own registry pinned to `strategy`
    pub fn with_strategy(strategy: EncodingStrategy) -> Self {
        Self::new(
            Arc::new(StrategyRegistry::with_strategy(strategy)),
            FieldNameConstraint::default(),
        )
    }

    /// Set what happens to keys the document model cannot hold
    pub fn with_illegal_key_policy(mut self, policy: IllegalKeyPolicy) -> Self {
        self.illegal_key_policy = policy;
        self
    }

    /// The registry this facade reads the active strategy from
    pub fn registry(&self) -> &Arc<StrategyRegistry> {
        &self.registry
    }

    /// The illegal-key policy in effect
    pub fn illegal_key_policy(&self) -> IllegalKeyPolicy {
        self.illegal_key_policy
    }

    /// The encoding implementing `strategy`
    pub fn encoding(&self, strategy: EncodingStrategy) -> &dyn HeaderEncoding {
        match strategy {
            EncodingStrategy::DocumentMapped => &self.document,
            EncodingStrategy::ArrayOfPairs => &self.pairs,
        }
    }

    /// Encode headers for writing.
    ///
    /// # Errors
    ///
    /// - `NoStrategyRegistered` if the registry is empty
    /// - `InvalidHeaderKey` under the document-mapped strategy when a key
    ///   breaks the field-name rules and the policy is `Reject`
    pub fn encode(&self, headers: &HeaderMap) -> Result<EncodedHeaderFragment> {
        let strategy = self.registry.require()?;

        match self.encoding(strategy).encode(headers) {
            Ok(body) => Ok(EncodedHeaderFragment::tagged(strategy, body)),
            Err(HeaderCodecError::InvalidHeaderKey { key, reason })
                if self.illegal_key_policy == IllegalKeyPolicy::FallbackToArrayOfPairs =>
            {
                debug!(
                    target: "strata::codec",
                    key = %key.escape_debug(),
                    reason = reason.reason_code(),
                    "Header key illegal as field name, encoding as array of pairs"
                );
                let body = self.pairs.encode(headers)?;
                Ok(EncodedHeaderFragment::tagged(
                    EncodingStrategy::ArrayOfPairs,
                    body,
                ))
            }
            Err(e) => {
                warn!(target: "strata::codec", strategy = %strategy, error = %e, "Header encode failed");
                Err(e)
            }
        }
    }

    /// Decode a stored fragment.
    ///
    /// # Errors
    ///
    /// - `NoStrategyRegistered` if the registry is empty
    /// - `StrategyMismatch` if an untagged fragment does not have the shape
    ///   of the active strategy
    /// - `CorruptHeaderField` if a document-mapped fragment carries an
    ///   illegal field name
    pub fn decode(&self, fragment: &EncodedHeaderFragment) -> Result<HeaderMap> {
        let active = self.registry.require()?;
        let strategy = match fragment.strategy() {
            Some(tagged) => {
                if tagged != active {
                    debug!(
                        target: "strata::codec",
                        tagged = %tagged,
                        active = %active,
                        "Decoding fragment with its recorded strategy"
                    );
                }
                tagged
            }
            None => active,
        };

        self.encoding(strategy).decode(fragment.body()).map_err(|e| {
            if let HeaderCodecError::StrategyMismatch { .. } = e {
                warn!(target: "strata::codec", strategy = %strategy, error = %e, "Untagged header fragment has wrong shape");
            }
            e
        })
    }

    /// Encode headers straight to the stored document value
    pub fn encode_document(&self, headers: &HeaderMap) -> Result<Value> {
        self.encode(headers).map(EncodedHeaderFragment::into_document)
    }

    /// Decode headers straight from a stored document value
    pub fn decode_document(&self, doc: Value) -> Result<HeaderMap> {
        let fragment = EncodedHeaderFragment::from_document(doc)?;
        self.decode(&fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use strata_core::header_map;

    fn unregistered() -> HeaderCodec {
        HeaderCodec::new(Arc::new(StrategyRegistry::new()), FieldNameConstraint::default())
    }

    #[test]
    fn test_encode_without_strategy_fails() {
        let codec = unregistered();
        assert_eq!(
            codec.encode(&header_map([("k", "v")])),
            Err(HeaderCodecError::NoStrategyRegistered)
        );
    }

    #[test]
    fn test_decode_without_strategy_fails() {
        let codec = unregistered();
        let fragment = EncodedHeaderFragment::tagged(
            EncodingStrategy::ArrayOfPairs,
            Value::Array(vec![]),
        );
        assert_eq!(
            codec.decode(&fragment),
            Err(HeaderCodecError::NoStrategyRegistered)
        );
    }

    #[test]
    fn test_fragments_are_tagged_with_active_strategy() {
        for strategy in EncodingStrategy::ALL {
            let codec = HeaderCodec::with_strategy(strategy);
            let fragment = codec.encode(&header_map([("k", "v")])).unwrap();
            assert_eq!(fragment.strategy(), Some(strategy));
        }
    }

    #[test]
    fn test_array_of_pairs_keeps_dotted_key() {
        let codec = HeaderCodec::with_strategy(EncodingStrategy::ArrayOfPairs);
        let headers = header_map([("key.1", "value")]);
        let decoded = codec.decode(&codec.encode(&headers).unwrap()).unwrap();
        assert_eq!(decoded.get("key.1"), Some(&Value::from("value")));
    }

    #[test]
    fn test_document_mapped_keeps_plain_key() {
        let codec = HeaderCodec::with_strategy(EncodingStrategy::DocumentMapped);
        let headers = header_map([("key", "value")]);
        let decoded = codec.decode(&codec.encode(&headers).unwrap()).unwrap();
        assert_eq!(decoded.get("key"), Some(&Value::from("value")));
    }

    #[test]
    fn test_document_mapped_rejects_dotted_key() {
        let codec = HeaderCodec::with_strategy(EncodingStrategy::DocumentMapped);
        let err = codec.encode(&header_map([("key.1", "value")])).unwrap_err();
        assert!(matches!(
            err,
            HeaderCodecError::InvalidHeaderKey { ref key, .. } if key == "key.1"
        ));
    }

    #[test]
    fn test_fallback_policy_switches_to_pairs() {
        let codec = HeaderCodec::with_strategy(EncodingStrategy::DocumentMapped)
            .with_illegal_key_policy(IllegalKeyPolicy::FallbackToArrayOfPairs);
        let headers = header_map([("key.1", "value"), ("plain", "x")]);
        let fragment = codec.encode(&headers).unwrap();
        assert_eq!(fragment.strategy(), Some(EncodingStrategy::ArrayOfPairs));
        assert_eq!(codec.decode(&fragment).unwrap(), headers);
    }

    #[test]
    fn test_fallback_policy_leaves_legal_maps_document_mapped() {
        let codec = HeaderCodec::with_strategy(EncodingStrategy::DocumentMapped)
            .with_illegal_key_policy(IllegalKeyPolicy::FallbackToArrayOfPairs);
        let fragment = codec.encode(&header_map([("plain", "x")])).unwrap();
        assert_eq!(fragment.strategy(), Some(EncodingStrategy::DocumentMapped));
    }

    #[test]
    fn test_tagged_fragment_decodes_under_other_active_strategy() {
        let writer = HeaderCodec::with_strategy(EncodingStrategy::DocumentMapped);
        let reader = HeaderCodec::with_strategy(EncodingStrategy::ArrayOfPairs);
        let headers = header_map([("key", "value")]);
        let fragment = writer.encode(&headers).unwrap();
        assert_eq!(reader.decode(&fragment).unwrap(), headers);
    }

    #[test]
    fn test_untagged_pairs_under_document_strategy_is_mismatch() {
        let pairs = HeaderCodec::with_strategy(EncodingStrategy::ArrayOfPairs);
        let legacy = EncodedHeaderFragment::untagged(
            pairs
                .encode(&header_map([("key.1", "value")]))
                .unwrap()
                .body()
                .clone(),
        );
        let codec = HeaderCodec::with_strategy(EncodingStrategy::DocumentMapped);
        assert!(matches!(
            codec.decode(&legacy),
            Err(HeaderCodecError::StrategyMismatch {
                expected: EncodingStrategy::DocumentMapped,
                ..
            })
        ));
    }

    #[test]
    fn test_untagged_document_under_document_strategy_decodes() {
        let mut fields = HashMap::new();
        fields.insert("key".to_string(), Value::from("value"));
        let legacy = EncodedHeaderFragment::untagged(Value::Object(fields));
        let codec = HeaderCodec::with_strategy(EncodingStrategy::DocumentMapped);
        assert_eq!(
            codec.decode(&legacy).unwrap(),
            header_map([("key", "value")])
        );
    }

    #[test]
    fn test_document_roundtrip_through_stored_value() {
        let codec = HeaderCodec::with_strategy(EncodingStrategy::ArrayOfPairs);
        let headers = header_map([("$meta", 1), ("a.b", 2)]);
        let doc = codec.encode_document(&headers).unwrap();
        assert_eq!(codec.decode_document(doc).unwrap(), headers);
    }

    #[test]
    fn test_shared_registry_switch_is_seen_by_facade() {
        let registry = Arc::new(StrategyRegistry::with_strategy(
            EncodingStrategy::DocumentMapped,
        ));
        let codec = HeaderCodec::new(Arc::clone(&registry), FieldNameConstraint::default());
        assert!(codec.encode(&header_map([("key.1", "v")])).is_err());

        registry.unregister();
        registry.register(EncodingStrategy::ArrayOfPairs).unwrap();
        assert!(codec.encode(&header_map([("key.1", "v")])).is_ok());
    }

    #[test]
    fn test_facade_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HeaderCodec>();
    }
}
