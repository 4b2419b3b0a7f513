//! Core types for commit headers
//!
//! This crate defines the foundational types shared by the header codecs and
//! the commit store:
//! - Value: loosely-typed header value, also the document model
//! - HeaderMap: the header map attached to a commit
//! - FieldNameConstraint: the backing store's field-name rules

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod field_name;
pub mod headers;
pub mod value;

pub use field_name::{is_legal, FieldNameConstraint, FieldNameError, NULL_SENTINEL};
pub use headers::{header_map, HeaderMap};
pub use value::Value;
