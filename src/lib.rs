//! StrataDB commit headers
//!
//! Persists the header map of an event-store commit into a document-model
//! backend whose field names are restricted.
//!
//! # Quick Start
//!
//! ```
//! use stratadb_headers::{
//!     header_map, CommitAttempt, EncodingStrategy, EventMessage, InMemoryCommitStore,
//!     StoreConfig,
//! };
//!
//! let store = InMemoryCommitStore::open(&StoreConfig::new(EncodingStrategy::ArrayOfPairs));
//! let attempt = CommitAttempt::new(
//!     "orders-42",
//!     1,
//!     1,
//!     header_map([("key.1", "value")]),
//!     vec![EventMessage::new("created")],
//! );
//! store.commit(&attempt).unwrap();
//!
//! let record = store.get_from("orders-42", 0, u64::MAX).next().unwrap().unwrap();
//! assert!(record.headers.contains_key("key.1"));
//! ```
//!
//! # Architecture
//!
//! - `strata-core`: value model, header map, field-name rules
//! - `strata-codec`: the two header encodings, the strategy registry and the
//!   `HeaderCodec` facade
//! - `strata-store`: configuration and the commit store that uses the codec

pub use strata_codec::{
    ArrayOfPairsCodec, DocumentMappedCodec, EncodedHeaderFragment, EncodingStrategy, HeaderCodec,
    HeaderCodecError, HeaderEncoding, IllegalKeyPolicy, StrategyRegistry,
};
pub use strata_core::{header_map, is_legal, FieldNameConstraint, FieldNameError, HeaderMap, Value};
pub use strata_store::{
    CommitAttempt, CommitRecord, EventMessage, InMemoryCommitStore, StoreConfig, StoreError,
};
