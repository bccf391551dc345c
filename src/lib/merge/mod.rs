//! Merge structures for combining sorted streams of alignment records.
//!
//! A merger holds one [`Candidate`] per active input stream and hands back the
//! next record of the merged output on [`Merger::take_first`]. The driving
//! loop (see [`crate::multi_reader`]) refills it from the stream the taken
//! candidate came from.
//!
//! # Merge Orders
//!
//! - [`PositionMerger`]: reference ID → position, unmapped records last
//! - [`NameMerger`]: read name, byte-lexicographic
//! - [`UnsortedMerger`]: arrival order
//!
//! [`MultiMerger`] selects one of the three at construction from a
//! [`MergeOrder`], so that callers can stay agnostic of the active order.
//!
//! # Example
//!
//! ```
//! use bammerge_lib::merge::{Candidate, MergeOrder, Merger, MultiMerger};
//! use bammerge_lib::record::RawRecord;
//!
//! let mut merger: MultiMerger<String, RawRecord> = MultiMerger::new(MergeOrder::ByPosition);
//! assert!(merger.is_empty());
//! assert!(merger.take_first().is_none());
//! ```

pub mod keys;
mod ordered;
mod unsorted;

use std::fmt;
use std::str::FromStr;

use noodles::sam::Header;
use noodles::sam::header::record::value::map::header::tag as header_tag;

use crate::errors::{MergeError, Result};
use crate::record::{AlignmentRecord, StreamHandle};

pub use keys::{MergeKey, NameKey, PositionKey};
pub use ordered::{NameMerger, PositionMerger};
pub use unsorted::UnsortedMerger;

/// A record together with the stream it was read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate<S, R> {
    /// The stream the record came from.
    pub stream: S,
    /// The record.
    pub record: R,
}

impl<S, R> Candidate<S, R> {
    /// Pair a record with its stream.
    pub fn new(stream: S, record: R) -> Self {
        Self { stream, record }
    }

    /// Split into `(stream, record)`.
    pub fn into_parts(self) -> (S, R) {
        (self.stream, self.record)
    }
}

/// Order in which merged records are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeOrder {
    /// Coordinate order: reference ID → position, unmapped last
    ByPosition,
    /// Queryname order: read name, byte-lexicographic
    ByName,
    /// Input order, no sorting
    #[default]
    Unsorted,
}

impl MergeOrder {
    /// Get the SAM header sort order tag value.
    #[must_use]
    pub fn header_so_tag(&self) -> &'static str {
        match self {
            Self::ByPosition => "coordinate",
            Self::ByName => "queryname",
            Self::Unsorted => "unsorted",
        }
    }

    /// Infer the merge order from the `@HD SO` field of a header.
    ///
    /// `coordinate` and `queryname` map to their orders; anything else,
    /// including a missing `@HD` line, is treated as unsorted.
    #[must_use]
    pub fn from_header(header: &Header) -> Self {
        let sort_order = header
            .header()
            .and_then(|hd| hd.other_fields().get(&header_tag::SORT_ORDER))
            .map(|value| value.as_slice());

        match sort_order {
            Some(b"coordinate") => Self::ByPosition,
            Some(b"queryname") => Self::ByName,
            _ => Self::Unsorted,
        }
    }
}

impl fmt::Display for MergeOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header_so_tag())
    }
}

impl FromStr for MergeOrder {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "coordinate" | "position" | "by-position" => Ok(Self::ByPosition),
            "queryname" | "name" | "by-name" => Ok(Self::ByName),
            "unsorted" => Ok(Self::Unsorted),
            _ => Err(MergeError::InvalidMergeOrder { value: s.to_string() }),
        }
    }
}

/// Operations shared by all merge structures.
///
/// `first` and `take_first` return `None` on an empty merger.
pub trait Merger<S: StreamHandle, R: AlignmentRecord> {
    /// Insert a candidate. Candidates with equal keys are all kept.
    ///
    /// On error the merger is left unchanged and the candidate is dropped.
    fn add(&mut self, candidate: Candidate<S, R>) -> Result<()>;

    /// Drop every held candidate.
    fn clear(&mut self);

    /// The candidate [`take_first`](Self::take_first) would return.
    fn first(&self) -> Option<&Candidate<S, R>>;

    /// Returns true if no candidates are held.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove at most one candidate whose stream has the same identity as
    /// `stream`, returning it.
    ///
    /// Only the first match is removed, so a stream must never have more than
    /// one candidate in flight if this is used to retire it.
    fn remove_by_stream(&mut self, stream: &S) -> Option<Candidate<S, R>>;

    /// Number of held candidates.
    fn len(&self) -> usize;

    /// Remove and return the next candidate in merge order.
    fn take_first(&mut self) -> Option<Candidate<S, R>>;
}

/// A merger whose order is chosen at runtime.
pub enum MultiMerger<S, R> {
    /// Coordinate-ordered merger
    Position(PositionMerger<S, R>),
    /// Queryname-ordered merger
    Name(NameMerger<S, R>),
    /// Arrival-ordered merger
    Unsorted(UnsortedMerger<S, R>),
}

macro_rules! dispatch {
    ($self:expr, $merger:ident => $body:expr) => {
        match $self {
            MultiMerger::Position($merger) => $body,
            MultiMerger::Name($merger) => $body,
            MultiMerger::Unsorted($merger) => $body,
        }
    };
}

impl<S: StreamHandle, R: AlignmentRecord> MultiMerger<S, R> {
    /// Create an empty merger for the given order.
    #[must_use]
    pub fn new(order: MergeOrder) -> Self {
        match order {
            MergeOrder::ByPosition => Self::Position(PositionMerger::new()),
            MergeOrder::ByName => Self::Name(NameMerger::new()),
            MergeOrder::Unsorted => Self::Unsorted(UnsortedMerger::new()),
        }
    }

    /// The order this merger produces.
    #[must_use]
    pub fn order(&self) -> MergeOrder {
        match self {
            Self::Position(_) => MergeOrder::ByPosition,
            Self::Name(_) => MergeOrder::ByName,
            Self::Unsorted(_) => MergeOrder::Unsorted,
        }
    }
}

impl<S: StreamHandle, R: AlignmentRecord> Merger<S, R> for MultiMerger<S, R> {
    fn add(&mut self, candidate: Candidate<S, R>) -> Result<()> {
        dispatch!(self, m => m.add(candidate))
    }

    fn clear(&mut self) {
        dispatch!(self, m => m.clear());
    }

    fn first(&self) -> Option<&Candidate<S, R>> {
        dispatch!(self, m => m.first())
    }

    fn remove_by_stream(&mut self, stream: &S) -> Option<Candidate<S, R>> {
        dispatch!(self, m => m.remove_by_stream(stream))
    }

    fn len(&self) -> usize {
        dispatch!(self, m => m.len())
    }

    fn take_first(&mut self) -> Option<Candidate<S, R>> {
        dispatch!(self, m => m.take_first())
    }
}
