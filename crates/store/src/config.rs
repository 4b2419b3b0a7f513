//! Store configuration via `strata.toml`
//!
//! The header encoding is a startup-time pin for the store instance, like a
//! schema version. It has no default: a config that does not name one fails
//! to load, so every deployment states which layout it writes.

use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use strata_codec::{EncodingStrategy, IllegalKeyPolicy};
use strata_core::FieldNameConstraint;

/// Config file name placed in the store's data directory.
pub const CONFIG_FILE_NAME: &str = "strata.toml";

/// Commit store configuration loaded from `strata.toml`.
///
/// # Example
///
/// ```toml
/// header_encoding = "array_of_pairs"
/// illegal_key_policy = "reject"
///
/// [field_names]
/// separator = "."
/// reserved_prefix = "$"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Layout of the commit header field: `"document_mapped"` or `"array_of_pairs"`.
    pub header_encoding: EncodingStrategy,
    /// What to do with keys the document model cannot hold.
    #[serde(default)]
    pub illegal_key_policy: IllegalKeyPolicy,
    /// Field-name rules of the backing store.
    #[serde(default)]
    pub field_names: FieldNameConstraint,
}

impl StoreConfig {
    /// Config pinned to `header_encoding` with default policy and rules
    pub fn new(header_encoding: EncodingStrategy) -> Self {
        Self {
            header_encoding,
            illegal_key_policy: IllegalKeyPolicy::default(),
            field_names: FieldNameConstraint::default(),
        }
    }

    /// Builder-style override of the illegal-key policy
    pub fn with_illegal_key_policy(mut self, policy: IllegalKeyPolicy) -> Self {
        self.illegal_key_policy = policy;
        self
    }

    /// Returns the config template with comments.
    ///
    /// `header_encoding` is commented out, so the template does not load
    /// until someone picks a value.
    pub fn template_toml() -> &'static str {
        r#"# Commit store configuration
#
# Layout of the commit header field (required, no default):
#   "document_mapped" = each header key is a document field name;
#                       keys containing "." or starting with "$" are illegal
#   "array_of_pairs"  = headers stored as [key, value] records; any key works
# header_encoding = "array_of_pairs"

# What to do when a key is illegal under "document_mapped":
#   "reject"                     = fail the commit (default)
#   "fallback_to_array_of_pairs" = store that commit's headers as pairs
illegal_key_policy = "reject"

# Field-name rules of the backing store.
# [field_names]
# separator = "."
# reserved_prefix = "$"
"#
    }

    /// Parse config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the text is not valid TOML, names an unknown
    /// strategy, or omits `header_encoding`.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| StoreError::Config(format!("Failed to parse store config: {}", e)))
    }

    /// Read and parse config from a file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StoreError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            StoreError::Config(msg) => {
                StoreError::Config(format!("{} ({})", msg, path.display()))
            }
            other => other,
        })
    }

    /// Write the commented template if no config file exists yet.
    pub fn write_template_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::template_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| StoreError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
