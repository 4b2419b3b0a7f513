//! Header encoding strategies and the illegal-key policy.

use crate::error::HeaderCodecError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the header map is laid out inside a commit document.
///
/// There is deliberately no `Default`: the choice is a configuration
/// decision the caller has to state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingStrategy {
    /// Each header key becomes a document field name.
    DocumentMapped,
    /// Headers become an ordered list of `[key, value]` records.
    ArrayOfPairs,
}

impl EncodingStrategy {
    /// Every strategy, in declaration order
    pub const ALL: [EncodingStrategy; 2] =
        [EncodingStrategy::DocumentMapped, EncodingStrategy::ArrayOfPairs];

    /// Stable tag written into configuration files and fragment markers
    pub fn as_str(&self) -> &'static str {
        match self {
            EncodingStrategy::DocumentMapped => "document_mapped",
            EncodingStrategy::ArrayOfPairs => "array_of_pairs",
        }
    }
}

impl fmt::Display for EncodingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EncodingStrategy {
    type Err = HeaderCodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EncodingStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| HeaderCodecError::UnknownStrategy(s.to_string()))
    }
}

/// What the facade does when a key cannot be written document-mapped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IllegalKeyPolicy {
    /// Fail the encode with `InvalidHeaderKey`.
    #[default]
    Reject,
    /// Encode that commit's headers as array-of-pairs instead. The fragment
    /// tag records the switch, so reads stay correct.
    FallbackToArrayOfPairs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_parse_back() {
        for strategy in EncodingStrategy::ALL {
            assert_eq!(strategy.as_str().parse::<EncodingStrategy>(), Ok(strategy));
        }
    }

    #[test]
    fn test_unknown_tag() {
        assert_eq!(
            "bson".parse::<EncodingStrategy>(),
            Err(HeaderCodecError::UnknownStrategy("bson".to_string()))
        );
    }

    #[test]
    fn test_serde_tag_matches_as_str() {
        for strategy in EncodingStrategy::ALL {
            let json = serde_json::to_string(&strategy).unwrap();
            assert_eq!(json, format!("\"{}\"", strategy.as_str()));
        }
    }

    #[test]
    fn test_default_policy_rejects() {
        assert_eq!(IllegalKeyPolicy::default(), IllegalKeyPolicy::Reject);
    }

    #[test]
    fn test_policy_serde() {
        let policy: IllegalKeyPolicy =
            serde_json::from_str("\"fallback_to_array_of_pairs\"").unwrap();
        assert_eq!(policy, IllegalKeyPolicy::FallbackToArrayOfPairs);
    }
}
