//! Field-name validation for the document model
//!
//! Header keys written with the document-mapped encoding become document
//! field names, so they are subject to the backing store's naming rules.
//! This module is the single place those rules live; codecs and write-time
//! validation call into it rather than re-implementing the checks.
//!
//! ## Rules
//!
//! A field name is legal unless it:
//! - is empty
//! - starts with the reserved prefix character (default `$`)
//! - contains the path separator character (default `.`)
//! - equals one of the reserved names (default: the NUL sentinel `"\0"`)
//!
//! Everything else is accepted, including surrounding whitespace, unicode,
//! and numeric-looking strings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default path separator of the document model
pub const DEFAULT_SEPARATOR: char = '.';

/// Default reserved prefix of the document model (operator namespace)
pub const DEFAULT_RESERVED_PREFIX: char = '$';

/// Sentinel the document model uses for a null field name
pub const NULL_SENTINEL: &str = "\0";

/// The naming rules a backing store imposes on document field names.
///
/// The constraint is a property of the store, so it is injected into the
/// document-mapped codec instead of being hard-coded there.
///
/// # Examples
///
/// ```
/// use strata_core::FieldNameConstraint;
///
/// let rules = FieldNameConstraint::default();
/// assert!(rules.is_legal("key"));
/// assert!(!rules.is_legal("key.1"));
/// assert!(!rules.is_legal("$set"));
/// assert!(!rules.is_legal(""));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNameConstraint {
    /// Character that may not appear anywhere in a name
    pub separator: char,
    /// Character a name may not start with
    pub reserved_prefix: char,
    /// Names that are rejected outright
    pub reserved_names: Vec<String>,
}

impl Default for FieldNameConstraint {
    fn default() -> Self {
        FieldNameConstraint {
            separator: DEFAULT_SEPARATOR,
            reserved_prefix: DEFAULT_RESERVED_PREFIX,
            reserved_names: vec![NULL_SENTINEL.to_string()],
        }
    }
}

impl FieldNameConstraint {
    /// Validate a field name, reporting which rule it breaks.
    pub fn check(&self, name: &str) -> Result<(), FieldNameError> {
        // Rule 1: name cannot be empty
        if name.is_empty() {
            return Err(FieldNameError::Empty);
        }

        // Rule 2: name cannot be a reserved sentinel
        if self.reserved_names.iter().any(|r| r == name) {
            return Err(FieldNameError::ReservedName);
        }

        // Rule 3: name cannot start with the reserved prefix
        if name.starts_with(self.reserved_prefix) {
            return Err(FieldNameError::ReservedPrefix {
                prefix: self.reserved_prefix,
            });
        }

        // Rule 4: name cannot contain the separator
        if let Some(position) = name.find(self.separator) {
            return Err(FieldNameError::ContainsSeparator {
                separator: self.separator,
                position,
            });
        }

        Ok(())
    }

    /// Whether `name` may be used as a document field name.
    #[inline]
    pub fn is_legal(&self, name: &str) -> bool {
        self.check(name).is_ok()
    }
}

/// Check a name against the default document-model rules.
pub fn is_legal(name: &str) -> bool {
    FieldNameConstraint::default().is_legal(name)
}

/// Field-name validation errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldNameError {
    /// Name is empty
    #[error("field name cannot be empty")]
    Empty,

    /// Name starts with the reserved prefix
    #[error("field name cannot start with '{prefix}'")]
    ReservedPrefix {
        /// The reserved prefix character
        prefix: char,
    },

    /// Name contains the separator
    #[error("field name cannot contain '{separator}' (found at byte {position})")]
    ContainsSeparator {
        /// The separator character
        separator: char,
        /// Byte offset of the first occurrence
        position: usize,
    },

    /// Name equals a reserved sentinel
    #[error("field name is reserved")]
    ReservedName,
}

impl FieldNameError {
    /// Stable reason code for logs and error payloads
    pub fn reason_code(&self) -> &'static str {
        match self {
            FieldNameError::Empty => "empty_name",
            FieldNameError::ReservedPrefix { .. } => "reserved_prefix",
            FieldNameError::ContainsSeparator { .. } => "contains_separator",
            FieldNameError::ReservedName => "reserved_name",
        }
    }
}
