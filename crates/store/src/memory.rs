//! In-memory commit store
//!
//! Commits are serialized to MessagePack with their header field already
//! encoded by the [`HeaderCodec`], so what sits in memory is exactly what a
//! document backend would hold. Reads deserialize and decode one record at a
//! time; a record whose headers fail to decode yields an error for that
//! record only.
//!
//! # Strategy transitions
//!
//! `switch_header_encoding` takes the transition lock for writing. Commits
//! and per-record decodes hold it for reading while they touch the codec, so
//! a switch waits for in-flight work and no call ever sees the registry
//! empty halfway through the swap. The registry is private to the store;
//! `header_encoding` is the only read and `switch_header_encoding` the only
//! write.

use crate::commit::{CommitAttempt, CommitRecord, EventMessage};
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use strata_codec::{EncodingStrategy, HeaderCodec, StrategyRegistry};
use strata_core::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Serialized form of a commit.
#[derive(Debug, Serialize, Deserialize)]
struct StoredCommit {
    stream_id: String,
    stream_revision: u64,
    commit_id: Uuid,
    commit_sequence: u64,
    commit_stamp: DateTime<Utc>,
    checkpoint: u64,
    headers: Value,
    events: Vec<EventMessage>,
}

/// One commit in a stream, with its revision range kept beside the bytes so
/// range queries never deserialize.
#[derive(Debug)]
struct Slot {
    first_revision: u64,
    last_revision: u64,
    bytes: Arc<[u8]>,
}

#[derive(Debug, Default)]
struct Inner {
    streams: HashMap<String, Vec<Slot>>,
    last_checkpoint: u64,
}

/// Commit store keeping serialized commits in memory.
#[derive(Debug)]
pub struct InMemoryCommitStore {
    codec: HeaderCodec,
    inner: RwLock<Inner>,
    transition: RwLock<()>,
}

impl InMemoryCommitStore {
    /// Open a store with the configured header encoding
    pub fn open(config: &StoreConfig) -> Self {
        let registry = Arc::new(StrategyRegistry::with_strategy(config.header_encoding));
        let codec = HeaderCodec::new(registry, config.field_names.clone())
            .with_illegal_key_policy(config.illegal_key_policy);
        info!(
            target: "strata::store",
            header_encoding = %config.header_encoding,
            illegal_key_policy = ?config.illegal_key_policy,
            "Opened in-memory commit store"
        );
        Self {
            codec,
            inner: RwLock::new(Inner::default()),
            transition: RwLock::new(()),
        }
    }

    /// The active header encoding
    pub fn header_encoding(&self) -> Option<EncodingStrategy> {
        self.codec.registry().current()
    }

    /// Re-pin the header encoding, returning the previous one.
    ///
    /// Commits already stored keep their own strategy tag and stay readable.
    pub fn switch_header_encoding(
        &self,
        strategy: EncodingStrategy,
    ) -> Result<Option<EncodingStrategy>> {
        let _quiesced = self.transition.write();
        let registry = self.codec.registry();
        let previous = registry.unregister();
        registry.register(strategy)?;
        info!(
            target: "strata::store",
            from = ?previous,
            to = %strategy,
            "Switched header encoding"
        );
        Ok(previous)
    }

    /// Append a commit.
    ///
    /// Headers are encoded before anything is written, so a header error
    /// leaves the stream untouched.
    ///
    /// # Errors
    ///
    /// - `InvalidAttempt` if the attempt is inconsistent
    /// - `Codec` if the headers cannot be encoded
    /// - `ConcurrencyConflict` if the commit sequence is not the next one
    pub fn commit(&self, attempt: &CommitAttempt) -> Result<CommitRecord> {
        attempt.validate()?;
        let headers_doc = {
            let _quiesced = self.transition.read();
            self.codec.encode_document(&attempt.headers)?
        };
        let checkpoint = self.append(attempt, headers_doc)?;
        Ok(CommitRecord {
            stream_id: attempt.stream_id.clone(),
            stream_revision: attempt.stream_revision,
            commit_id: attempt.commit_id,
            commit_sequence: attempt.commit_sequence,
            commit_stamp: attempt.commit_stamp,
            checkpoint,
            headers: attempt.headers.clone(),
            events: attempt.events.clone(),
        })
    }

    /// Append a commit whose header field was encoded elsewhere.
    ///
    /// `headers_document` is stored verbatim in place of the attempt's own
    /// headers. Used when importing records written by another store, which
    /// may be untagged legacy fragments. Returns the assigned checkpoint.
    pub fn import_commit(&self, attempt: &CommitAttempt, headers_document: Value) -> Result<u64> {
        attempt.validate()?;
        self.append(attempt, headers_document)
    }

    /// Read commits of a stream that overlap `[min_revision, max_revision]`.
    ///
    /// Records are deserialized and decoded lazily, one per item; a failed
    /// record does not stop the iteration.
    pub fn get_from(
        &self,
        stream_id: &str,
        min_revision: u64,
        max_revision: u64,
    ) -> impl Iterator<Item = Result<CommitRecord>> + '_ {
        let matching: Vec<Arc<[u8]>> = {
            let inner = self.inner.read();
            inner
                .streams
                .get(stream_id)
                .map(|slots| {
                    slots
                        .iter()
                        .filter(|s| s.last_revision >= min_revision && s.first_revision <= max_revision)
                        .map(|s| Arc::clone(&s.bytes))
                        .collect()
                })
                .unwrap_or_default()
        };
        debug!(
            target: "strata::store",
            stream_id,
            min_revision,
            max_revision,
            count = matching.len(),
            "Reading commits"
        );
        matching.into_iter().map(move |bytes| self.read_record(&bytes))
    }

    /// Number of commits stored in a stream
    pub fn commit_count(&self, stream_id: &str) -> usize {
        self.inner
            .read()
            .streams
            .get(stream_id)
            .map_or(0, Vec::len)
    }

    fn append(&self, attempt: &CommitAttempt, headers: Value) -> Result<u64> {
        let mut inner = self.inner.write();
        let expected = inner
            .streams
            .get(&attempt.stream_id)
            .map_or(1, |slots| slots.len() as u64 + 1);
        if attempt.commit_sequence != expected {
            warn!(
                target: "strata::store",
                stream_id = %attempt.stream_id,
                expected,
                actual = attempt.commit_sequence,
                "Commit sequence conflict"
            );
            return Err(StoreError::ConcurrencyConflict {
                stream_id: attempt.stream_id.clone(),
                expected,
                actual: attempt.commit_sequence,
            });
        }

        let first_revision = attempt.first_revision();
        let checkpoint = inner.last_checkpoint + 1;
        let stored = StoredCommit {
            stream_id: attempt.stream_id.clone(),
            stream_revision: attempt.stream_revision,
            commit_id: attempt.commit_id,
            commit_sequence: attempt.commit_sequence,
            commit_stamp: attempt.commit_stamp,
            checkpoint,
            headers,
            events: attempt.events.clone(),
        };
        let bytes = rmp_serde::to_vec_named(&stored)?;

        inner.last_checkpoint = checkpoint;
        inner
            .streams
            .entry(attempt.stream_id.clone())
            .or_default()
            .push(Slot {
                first_revision,
                last_revision: attempt.stream_revision,
                bytes: bytes.into(),
            });
        debug!(
            target: "strata::store",
            stream_id = %attempt.stream_id,
            commit_sequence = attempt.commit_sequence,
            checkpoint,
            "Commit appended"
        );
        Ok(checkpoint)
    }

    fn read_record(&self, bytes: &[u8]) -> Result<CommitRecord> {
        let stored: StoredCommit = rmp_serde::from_slice(bytes)?;
        let headers = {
            let _quiesced = self.transition.read();
            self.codec.decode_document(stored.headers)
        }
        .map_err(|e| {
            warn!(
                target: "strata::store",
                commit_id = %stored.commit_id,
                error = %e,
                "Failed to decode commit headers"
            );
            e
        })?;
        Ok(CommitRecord {
            stream_id: stored.stream_id,
            stream_revision: stored.stream_revision,
            commit_id: stored.commit_id,
            commit_sequence: stored.commit_sequence,
            commit_stamp: stored.commit_stamp,
            checkpoint: stored.checkpoint,
            headers,
            events: stored.events,
        })
    }
}
