//! Key-ordered merge structures.
//!
//! Both [`PositionMerger`] and [`NameMerger`] keep their candidates in a
//! `BTreeMap` keyed by `(key, arrival)`. The arrival counter lets several
//! candidates share a key and makes the order among them deterministic: the
//! first one added is the first one taken.

use std::collections::BTreeMap;

use crate::errors::{MergeError, Result};
use crate::merge::keys::{MergeKey, NameKey, PositionKey};
use crate::merge::{Candidate, Merger};
use crate::record::{AlignmentRecord, StreamHandle};

/// Candidates ordered by a key derived from their record.
struct SortedCandidates<K, S, R> {
    entries: BTreeMap<(K, u64), Candidate<S, R>>,
    next_arrival: u64,
}

impl<K: MergeKey, S: StreamHandle, R: AlignmentRecord> SortedCandidates<K, S, R> {
    fn new() -> Self {
        Self { entries: BTreeMap::new(), next_arrival: 0 }
    }

    fn insert(&mut self, candidate: Candidate<S, R>) {
        let key = K::from_record(&candidate.record);
        self.entries.insert((key, self.next_arrival), candidate);
        self.next_arrival += 1;
    }

    fn first(&self) -> Option<&Candidate<S, R>> {
        self.entries.first_key_value().map(|(_, candidate)| candidate)
    }

    fn pop_first(&mut self) -> Option<Candidate<S, R>> {
        self.entries.pop_first().map(|(_, candidate)| candidate)
    }

    fn remove_by_stream(&mut self, stream: &S) -> Option<Candidate<S, R>> {
        let key = self
            .entries
            .iter()
            .find(|(_, candidate)| candidate.stream.same_stream(stream))
            .map(|(key, _)| key.clone())?;
        self.entries.remove(&key)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Merges records by `(reference ID, position)`, with unmapped records last.
pub struct PositionMerger<S, R> {
    candidates: SortedCandidates<PositionKey, S, R>,
}

impl<S: StreamHandle, R: AlignmentRecord> PositionMerger<S, R> {
    /// Create an empty merger.
    #[must_use]
    pub fn new() -> Self {
        Self { candidates: SortedCandidates::new() }
    }
}

impl<S: StreamHandle, R: AlignmentRecord> Default for PositionMerger<S, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StreamHandle, R: AlignmentRecord> Merger<S, R> for PositionMerger<S, R> {
    fn add(&mut self, candidate: Candidate<S, R>) -> Result<()> {
        self.candidates.insert(candidate);
        Ok(())
    }

    fn clear(&mut self) {
        self.candidates.clear();
    }

    fn first(&self) -> Option<&Candidate<S, R>> {
        self.candidates.first()
    }

    fn remove_by_stream(&mut self, stream: &S) -> Option<Candidate<S, R>> {
        self.candidates.remove_by_stream(stream)
    }

    fn len(&self) -> usize {
        self.candidates.len()
    }

    fn take_first(&mut self) -> Option<Candidate<S, R>> {
        self.candidates.pop_first()
    }
}

/// Merges records by read name, compared as bytes.
///
/// Read names are decoded on [`add`](Merger::add). A record whose name cannot
/// be decoded is rejected with [`MergeError::NameUnavailable`] and not held.
pub struct NameMerger<S, R> {
    candidates: SortedCandidates<NameKey, S, R>,
}

impl<S: StreamHandle, R: AlignmentRecord> NameMerger<S, R> {
    /// Create an empty merger.
    #[must_use]
    pub fn new() -> Self {
        Self { candidates: SortedCandidates::new() }
    }
}

impl<S: StreamHandle, R: AlignmentRecord> Default for NameMerger<S, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StreamHandle, R: AlignmentRecord> Merger<S, R> for NameMerger<S, R> {
    fn add(&mut self, mut candidate: Candidate<S, R>) -> Result<()> {
        if !candidate.record.materialize_name() {
            return Err(MergeError::NameUnavailable {
                stream: candidate.stream.identity().into(),
            });
        }
        self.candidates.insert(candidate);
        Ok(())
    }

    fn clear(&mut self) {
        self.candidates.clear();
    }

    fn first(&self) -> Option<&Candidate<S, R>> {
        self.candidates.first()
    }

    fn remove_by_stream(&mut self, stream: &S) -> Option<Candidate<S, R>> {
        self.candidates.remove_by_stream(stream)
    }

    fn len(&self) -> usize {
        self.candidates.len()
    }

    fn take_first(&mut self) -> Option<Candidate<S, R>> {
        self.candidates.pop_first()
    }
}
