//! Commit header serialization tests
//!
//! These tests drive headers through the whole commit path:
//! - Dotted keys round-trip under array-of-pairs
//! - Plain keys round-trip under document-mapped
//! - Dotted keys are rejected under document-mapped before anything is written
//! - The fallback policy stores such commits as pairs instead
//! - Legacy untagged records and corrupt records fail per record only

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use strata_codec::{
    EncodingStrategy, HeaderCodecError, IllegalKeyPolicy, HEADERS_FIELD, STRATEGY_FIELD,
};
use strata_core::{header_map, HeaderMap, Value};
use strata_store::{
    CommitAttempt, CommitRecord, EventMessage, InMemoryCommitStore, StoreConfig, StoreError,
};
use uuid::Uuid;

fn open(strategy: EncodingStrategy) -> InMemoryCommitStore {
    InMemoryCommitStore::open(&StoreConfig::new(strategy))
}

fn some_domain_event() -> EventMessage {
    EventMessage::new(Value::from(serde_json::json!({"SomeProperty": "Test"})))
}

/// Attempt shaped like a first commit: revision 2, sequence 1, one event.
fn attempt(stream_id: &str, headers: HeaderMap) -> CommitAttempt {
    CommitAttempt::new(stream_id, 2, 1, headers, vec![some_domain_event()])
}

fn first_commit(store: &InMemoryCommitStore, stream_id: &str) -> CommitRecord {
    store
        .get_from(stream_id, 0, u64::MAX)
        .next()
        .expect("stream has a commit")
        .expect("commit decodes")
}

fn new_stream_id() -> String {
    Uuid::new_v4().to_string()
}

// ============================================================================
// Array of pairs
// ============================================================================

#[test]
fn array_of_pairs_header_with_period_is_deserialized() {
    let store = open(EncodingStrategy::ArrayOfPairs);
    let stream_id = new_stream_id();
    store
        .commit(&attempt(&stream_id, header_map([("key.1", "value")])))
        .unwrap();

    let persisted = first_commit(&store, &stream_id);
    assert!(persisted.headers.contains_key("key.1"));
    assert_eq!(persisted.headers["key.1"], Value::from("value"));
}

#[test]
fn array_of_pairs_keeps_reserved_prefix_keys() {
    let store = open(EncodingStrategy::ArrayOfPairs);
    let stream_id = new_stream_id();
    let headers = header_map([("$correlation", "abc"), ("", "empty"), ("a.b.c", "deep")]);
    store.commit(&attempt(&stream_id, headers.clone())).unwrap();
    assert_eq!(first_commit(&store, &stream_id).headers, headers);
}

// ============================================================================
// Document mapped
// ============================================================================

#[test]
fn document_mapped_valid_header_is_deserialized() {
    let store = open(EncodingStrategy::DocumentMapped);
    let stream_id = new_stream_id();
    store
        .commit(&attempt(&stream_id, header_map([("key", "value")])))
        .unwrap();

    let persisted = first_commit(&store, &stream_id);
    assert!(persisted.headers.contains_key("key"));
    assert_eq!(persisted.headers["key"], Value::from("value"));
}

#[test]
fn document_mapped_header_with_period_is_rejected_before_write() {
    let store = open(EncodingStrategy::DocumentMapped);
    let stream_id = new_stream_id();
    let thrown = store
        .commit(&attempt(&stream_id, header_map([("key.1", "value")])))
        .unwrap_err();

    assert!(thrown.to_string().contains("key.1"));
    assert!(matches!(
        thrown,
        StoreError::Codec(HeaderCodecError::InvalidHeaderKey { ref key, .. }) if key == "key.1"
    ));
    assert!(store.get_from(&stream_id, 0, u64::MAX).next().is_none());
}

#[test]
fn document_mapped_rejection_is_deterministic() {
    let store = open(EncodingStrategy::DocumentMapped);
    let stream_id = new_stream_id();
    for _ in 0..5 {
        let result = store.commit(&attempt(&stream_id, header_map([("key.1", "value")])));
        assert!(matches!(
            result,
            Err(StoreError::Codec(HeaderCodecError::InvalidHeaderKey { .. }))
        ));
    }
    assert_eq!(store.commit_count(&stream_id), 0);
}

#[test]
fn document_mapped_fallback_stores_period_key_as_pairs() {
    let config = StoreConfig::new(EncodingStrategy::DocumentMapped)
        .with_illegal_key_policy(IllegalKeyPolicy::FallbackToArrayOfPairs);
    let store = InMemoryCommitStore::open(&config);
    let stream_id = new_stream_id();
    store
        .commit(&attempt(&stream_id, header_map([("key.1", "value")])))
        .unwrap();

    let persisted = first_commit(&store, &stream_id);
    assert_eq!(persisted.headers, header_map([("key.1", "value")]));
}

// ============================================================================
// Legacy and corrupt records
// ============================================================================

#[test]
fn legacy_untagged_document_is_read_with_active_strategy() {
    let store = open(EncodingStrategy::DocumentMapped);
    let stream_id = new_stream_id();
    let mut legacy = HashMap::new();
    legacy.insert("key".to_string(), Value::from("value"));
    store
        .import_commit(&attempt(&stream_id, HeaderMap::new()), Value::Object(legacy))
        .unwrap();

    assert_eq!(
        first_commit(&store, &stream_id).headers,
        header_map([("key", "value")])
    );
}

#[test]
fn legacy_untagged_pairs_under_document_strategy_is_a_mismatch() {
    let store = open(EncodingStrategy::DocumentMapped);
    let stream_id = new_stream_id();
    let legacy = Value::Array(vec![Value::Array(vec![
        Value::from("key.1"),
        Value::from("value"),
    ])]);
    store
        .import_commit(&attempt(&stream_id, HeaderMap::new()), legacy)
        .unwrap();

    let result = store.get_from(&stream_id, 0, u64::MAX).next().unwrap();
    assert!(matches!(
        result,
        Err(StoreError::Codec(HeaderCodecError::StrategyMismatch { .. }))
    ));
}

#[test]
fn corrupt_record_does_not_poison_the_rest_of_the_read() {
    let store = open(EncodingStrategy::DocumentMapped);
    let stream_id = new_stream_id();

    store
        .commit(&CommitAttempt::new(
            &stream_id,
            1,
            1,
            header_map([("good", 1)]),
            vec![some_domain_event()],
        ))
        .unwrap();

    // A storage layer that tolerated an illegal field name
    let mut mangled = HashMap::new();
    mangled.insert("key.1".to_string(), Value::from("value"));
    let mut tagged = HashMap::new();
    tagged.insert(STRATEGY_FIELD.to_string(), Value::from("document_mapped"));
    tagged.insert(HEADERS_FIELD.to_string(), Value::Object(mangled));
    store
        .import_commit(
            &CommitAttempt::new(&stream_id, 2, 2, HeaderMap::new(), vec![some_domain_event()]),
            Value::Object(tagged),
        )
        .unwrap();

    store
        .commit(&CommitAttempt::new(
            &stream_id,
            3,
            3,
            header_map([("good", 3)]),
            vec![some_domain_event()],
        ))
        .unwrap();

    let results: Vec<_> = store.get_from(&stream_id, 0, u64::MAX).collect();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().headers, header_map([("good", 1)]));
    assert!(matches!(
        results[1],
        Err(StoreError::Codec(HeaderCodecError::CorruptHeaderField { ref field, .. }))
            if field == "key.1"
    ));
    assert_eq!(results[2].as_ref().unwrap().headers, header_map([("good", 3)]));
}

#[test]
fn legacy_document_with_marker_field_is_corrupt() {
    let store = open(EncodingStrategy::DocumentMapped);
    let stream_id = new_stream_id();
    let mut legacy = HashMap::new();
    legacy.insert(STRATEGY_FIELD.to_string(), Value::from("oops"));
    legacy.insert("key".to_string(), Value::from("v"));
    store
        .import_commit(&attempt(&stream_id, HeaderMap::new()), Value::Object(legacy))
        .unwrap();

    let result = store.get_from(&stream_id, 0, u64::MAX).next().unwrap();
    assert!(matches!(
        result,
        Err(StoreError::Codec(HeaderCodecError::CorruptHeaderField { ref field, .. }))
            if field == STRATEGY_FIELD
    ));
}

#[test]
fn commit_at_highest_revision_is_stored() {
    let store = open(EncodingStrategy::ArrayOfPairs);
    let stream_id = new_stream_id();
    let written = store
        .commit(&CommitAttempt::new(
            &stream_id,
            u64::MAX,
            1,
            header_map([("key.1", "value")]),
            vec![some_domain_event()],
        ))
        .unwrap();

    assert_eq!(first_commit(&store, &stream_id), written);
}

// ============================================================================
// Migration and concurrency
// ============================================================================

#[test]
fn stores_with_different_strategies_coexist_in_one_process() {
    let documents = open(EncodingStrategy::DocumentMapped);
    let pairs = open(EncodingStrategy::ArrayOfPairs);
    let stream_id = new_stream_id();

    documents
        .commit(&attempt(&stream_id, header_map([("key", "value")])))
        .unwrap();
    pairs
        .commit(&attempt(&stream_id, header_map([("key.1", "value")])))
        .unwrap();

    assert!(first_commit(&documents, &stream_id).headers.contains_key("key"));
    assert!(first_commit(&pairs, &stream_id).headers.contains_key("key.1"));
}

#[test]
fn concurrent_writers_and_readers_share_one_store() {
    let store = Arc::new(open(EncodingStrategy::ArrayOfPairs));
    let writers: Vec<_> = (0..4)
        .map(|w| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let stream_id = format!("stream-{}", w);
                for seq in 1..=25u64 {
                    let headers = header_map([("writer.id", w as i64), ("seq", seq as i64)]);
                    store
                        .commit(&CommitAttempt::new(
                            &stream_id,
                            seq,
                            seq,
                            headers,
                            vec![some_domain_event()],
                        ))
                        .unwrap();
                    for record in store.get_from(&stream_id, 0, u64::MAX) {
                        assert_eq!(record.unwrap().headers["writer.id"], Value::Int(w as i64));
                    }
                }
            })
        })
        .collect();
    for handle in writers {
        handle.join().unwrap();
    }
    for w in 0..4 {
        assert_eq!(store.commit_count(&format!("stream-{}", w)), 25);
    }
}

#[test]
fn switch_during_concurrent_reads_never_loses_the_strategy() {
    let store = Arc::new(open(EncodingStrategy::DocumentMapped));
    let stream_id = new_stream_id();
    store
        .commit(&attempt(&stream_id, header_map([("key", "value")])))
        .unwrap();

    let reader = {
        let store = Arc::clone(&store);
        let stream_id = stream_id.clone();
        thread::spawn(move || {
            for _ in 0..200 {
                let record = first_commit(&store, &stream_id);
                assert_eq!(record.headers, header_map([("key", "value")]));
            }
        })
    };
    for i in 0..50 {
        store
            .switch_header_encoding(EncodingStrategy::ALL[i % 2])
            .unwrap();
    }
    reader.join().unwrap();
}
