//! Ordering keys for the sorted merge structures.
//!
//! - [`PositionKey`]: reference ID then position, unmapped records last
//! - [`NameKey`]: read name, compared byte by byte
//!
//! Unlike the keys used when sorting a single file, these carry no tie-breaking
//! fields: records that compare equal are returned in the order they were
//! added.

use crate::record::{AlignmentRecord, UNMAPPED_REFERENCE_ID};
use std::cmp::Ordering;

/// A key derived from a record and used to order candidates.
pub trait MergeKey: Ord + Clone {
    /// Derive the key from a record.
    fn from_record<R: AlignmentRecord>(record: &R) -> Self;
}

/// Sort key for coordinate ordering.
///
/// Sort order: reference ID → position. Keys with reference ID -1 (unmapped)
/// sort after every mapped key and are all equivalent to each other,
/// whatever their position.
#[derive(Clone, Copy, Debug)]
pub struct PositionKey {
    /// Reference sequence ID, -1 for unmapped.
    pub reference_sequence_id: i32,
    /// 0-based position.
    pub position: i32,
}

impl PositionKey {
    /// Create a key for a mapped (or unmapped, if `reference_sequence_id` is -1) record.
    #[must_use]
    pub fn new(reference_sequence_id: i32, position: i32) -> Self {
        Self { reference_sequence_id, position }
    }

    /// Create a key for an unmapped record.
    #[must_use]
    pub fn unmapped() -> Self {
        Self { reference_sequence_id: UNMAPPED_REFERENCE_ID, position: -1 }
    }

    /// Returns true if the key belongs to the unmapped class.
    #[must_use]
    pub fn is_unmapped(&self) -> bool {
        self.reference_sequence_id == UNMAPPED_REFERENCE_ID
    }
}

impl Ord for PositionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_unmapped(), other.is_unmapped()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self
                .reference_sequence_id
                .cmp(&other.reference_sequence_id)
                .then_with(|| self.position.cmp(&other.position)),
        }
    }
}

impl PartialOrd for PositionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Equality follows the ordering so that all unmapped keys are equal.
impl PartialEq for PositionKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PositionKey {}

impl MergeKey for PositionKey {
    fn from_record<R: AlignmentRecord>(record: &R) -> Self {
        Self::new(record.reference_sequence_id(), record.position())
    }
}

/// Sort key for queryname ordering.
///
/// Names compare as unsigned bytes, lexicographically: "read_1" < "read_10" <
/// "read_2". There is no natural numeric ordering here; inputs must have been
/// sorted the same way.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct NameKey(pub Vec<u8>);

impl MergeKey for NameKey {
    fn from_record<R: AlignmentRecord>(record: &R) -> Self {
        Self(record.name().to_vec())
    }
}
