//! Commit header map
//!
//! Headers are the string-keyed metadata attached to a commit. Keys are
//! unique; iteration order is sorted by key, so every encoding that walks
//! the map sees the same order on every call.

use crate::value::Value;
use std::collections::BTreeMap;

/// String-keyed, loosely-typed metadata attached to a commit.
pub type HeaderMap = BTreeMap<String, Value>;

/// Build a header map from `(key, value)` pairs.
///
/// Later pairs overwrite earlier ones with the same key.
pub fn header_map<K, V, I>(pairs: I) -> HeaderMap
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
