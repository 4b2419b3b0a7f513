//! Commit store surface for Strata commit headers
//!
//! This crate is the consumer side of the header codec:
//! - [`StoreConfig`]: `strata.toml` configuration, including the required
//!   header encoding pin
//! - [`CommitAttempt`], [`CommitRecord`], [`EventMessage`]: commit types
//! - [`InMemoryCommitStore`]: `commit` and `get_from` over serialized
//!   commits whose header field goes through the codec

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod commit;
pub mod config;
pub mod error;
pub mod memory;

pub use commit::{CommitAttempt, CommitRecord, EventMessage};
pub use config::{StoreConfig, CONFIG_FILE_NAME};
pub use error::{Result, StoreError};
pub use memory::InMemoryCommitStore;
