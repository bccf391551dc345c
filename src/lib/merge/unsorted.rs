//! Arrival-order merge structure for inputs that are not sorted.

use std::collections::VecDeque;

use crate::errors::{MergeError, Result};
use crate::merge::{Candidate, Merger};
use crate::record::{AlignmentRecord, StreamHandle};

/// Returns candidates in the order they were added.
///
/// Used to concatenate unsorted inputs: with one candidate in flight per
/// stream, the output interleaves the streams round-robin in the order they
/// were first primed.
pub struct UnsortedMerger<S, R> {
    candidates: VecDeque<Candidate<S, R>>,
}

impl<S: StreamHandle, R: AlignmentRecord> UnsortedMerger<S, R> {
    /// Create an empty merger.
    #[must_use]
    pub fn new() -> Self {
        Self { candidates: VecDeque::new() }
    }
}

impl<S: StreamHandle, R: AlignmentRecord> Default for UnsortedMerger<S, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StreamHandle, R: AlignmentRecord> Merger<S, R> for UnsortedMerger<S, R> {
    fn add(&mut self, candidate: Candidate<S, R>) -> Result<()> {
        self.candidates
            .try_reserve(1)
            .map_err(|_| MergeError::Allocation { len: self.candidates.len() })?;
        self.candidates.push_back(candidate);
        Ok(())
    }

    fn clear(&mut self) {
        self.candidates.clear();
    }

    fn first(&self) -> Option<&Candidate<S, R>> {
        self.candidates.front()
    }

    fn remove_by_stream(&mut self, stream: &S) -> Option<Candidate<S, R>> {
        let index = self.candidates.iter().position(|c| c.stream.same_stream(stream))?;
        self.candidates.remove(index)
    }

    fn len(&self) -> usize {
        self.candidates.len()
    }

    fn take_first(&mut self) -> Option<Candidate<S, R>> {
        self.candidates.pop_front()
    }
}
