//! Commit header encodings
//!
//! Commit headers are a string-keyed map persisted inside the commit
//! document. The document model restricts field names, so two encodings
//! exist:
//!
//! - [`DocumentMappedCodec`]: each key is a field name; keys must satisfy
//!   the store's [`FieldNameConstraint`](strata_core::FieldNameConstraint)
//! - [`ArrayOfPairsCodec`]: headers are an ordered list of `[key, value]`
//!   records; any key is representable
//!
//! The [`HeaderCodec`] facade picks the encoding from a [`StrategyRegistry`]
//! and tags every fragment it writes with the strategy used, so reads never
//! depend on the registry agreeing with the writer.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use strata_codec::{EncodingStrategy, HeaderCodec, StrategyRegistry};
//! use strata_core::{header_map, FieldNameConstraint};
//!
//! let registry = Arc::new(StrategyRegistry::new());
//! registry.register(EncodingStrategy::DocumentMapped).unwrap();
//!
//! let codec = HeaderCodec::new(registry, FieldNameConstraint::default());
//! let headers = header_map([("key", "value")]);
//! let doc = codec.encode_document(&headers).unwrap();
//! assert_eq!(codec.decode_document(doc).unwrap(), headers);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod array_of_pairs;
mod document_mapped;
mod error;
mod facade;
mod fragment;
mod registry;
mod strategy;
mod traits;

pub use array_of_pairs::ArrayOfPairsCodec;
pub use document_mapped::DocumentMappedCodec;
pub use error::{HeaderCodecError, Result};
pub use facade::HeaderCodec;
pub use fragment::{EncodedHeaderFragment, HEADERS_FIELD, STRATEGY_FIELD};
pub use registry::StrategyRegistry;
pub use strategy::{EncodingStrategy, IllegalKeyPolicy};
pub use traits::HeaderEncoding;
