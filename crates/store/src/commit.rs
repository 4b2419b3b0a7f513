//! Commit types
//!
//! A commit is an immutable batch of events appended to a stream, carrying a
//! header map. `CommitAttempt` is what a writer hands to the store;
//! `CommitRecord` is what a reader gets back.

use crate::error::{Result, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strata_core::{HeaderMap, Value};
use uuid::Uuid;

/// A single event inside a commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMessage {
    /// Per-event headers; stored as-is
    #[serde(default)]
    pub headers: HeaderMap,
    /// Event payload
    pub body: Value,
}

impl EventMessage {
    /// Event with an empty header map
    pub fn new(body: impl Into<Value>) -> Self {
        Self {
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

/// A commit a writer wants to append.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitAttempt {
    /// Stream the events belong to
    pub stream_id: String,
    /// Stream revision after this commit's last event
    pub stream_revision: u64,
    /// Caller-assigned commit identifier
    pub commit_id: Uuid,
    /// Position of this commit in the stream, starting at 1
    pub commit_sequence: u64,
    /// When the commit was made
    pub commit_stamp: DateTime<Utc>,
    /// Commit headers
    pub headers: HeaderMap,
    /// Events in the commit
    pub events: Vec<EventMessage>,
}

impl CommitAttempt {
    /// Build an attempt with a fresh commit id and the current time
    pub fn new(
        stream_id: impl Into<String>,
        stream_revision: u64,
        commit_sequence: u64,
        headers: HeaderMap,
        events: Vec<EventMessage>,
    ) -> Self {
        Self {
            stream_id: stream_id.into(),
            stream_revision,
            commit_id: Uuid::new_v4(),
            commit_sequence,
            commit_stamp: Utc::now(),
            headers,
            events,
        }
    }

    /// Check the attempt is internally consistent.
    pub fn validate(&self) -> Result<()> {
        if self.stream_id.is_empty() {
            return Err(StoreError::InvalidAttempt(
                "stream id cannot be empty".to_string(),
            ));
        }
        if self.events.is_empty() {
            return Err(StoreError::InvalidAttempt(
                "commit must carry at least one event".to_string(),
            ));
        }
        if self.commit_sequence == 0 {
            return Err(StoreError::InvalidAttempt(
                "commit sequence starts at 1".to_string(),
            ));
        }
        if self.stream_revision < self.events.len() as u64 {
            return Err(StoreError::InvalidAttempt(format!(
                "stream revision {} is lower than the {} events in the commit",
                self.stream_revision,
                self.events.len()
            )));
        }
        Ok(())
    }

    /// Revision of the first event in the commit.
    ///
    /// Only meaningful on a validated attempt.
    pub fn first_revision(&self) -> u64 {
        let span = (self.events.len() as u64).saturating_sub(1);
        self.stream_revision.saturating_sub(span)
    }
}

/// A persisted commit with its headers decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitRecord {
    /// Stream the events belong to
    pub stream_id: String,
    /// Stream revision after this commit's last event
    pub stream_revision: u64,
    /// Commit identifier
    pub commit_id: Uuid,
    /// Position of this commit in the stream
    pub commit_sequence: u64,
    /// When the commit was made
    pub commit_stamp: DateTime<Utc>,
    /// Store-wide, monotonically increasing position of the commit
    pub checkpoint: u64,
    /// Commit headers, reconstructed by the header codec
    pub headers: HeaderMap,
    /// Events in the commit
    pub events: Vec<EventMessage>,
}
