//! Merged reading across several sorted record sources.
//!
//! [`MultiReader`] owns a set of [`AlignmentSource`]s and a [`MultiMerger`].
//! It keeps exactly one record per open source inside the merger: after each
//! record is taken, the next record of the same source replaces it. Sources
//! that run dry are closed and their handle retired from the merger.
//!
//! # Example
//!
//! ```
//! use bammerge_lib::merge::MergeOrder;
//! use bammerge_lib::multi_reader::{MemorySource, MultiReader};
//! use bammerge_lib::record::RawRecord;
//!
//! # fn main() -> bammerge_lib::errors::Result<()> {
//! let sources: Vec<MemorySource<RawRecord>> = Vec::new();
//! let mut reader = MultiReader::new(sources, MergeOrder::ByPosition)?;
//! assert!(reader.next_record()?.is_none());
//! # Ok(())
//! # }
//! ```

use std::collections::{HashSet, VecDeque};
use std::fmt;

use bstr::{BStr, BString};
use log::{debug, warn};

use crate::errors::{MergeError, Result};
use crate::merge::{Candidate, MergeOrder, Merger, MultiMerger};
use crate::record::{AlignmentRecord, StreamHandle};

/// A stream of records, each already in the order being merged.
pub trait AlignmentSource {
    /// Record type produced by the source.
    type Record: AlignmentRecord;

    /// Stable identity of the source, typically its path.
    fn identity(&self) -> &[u8];

    /// Read the next record, or `None` once the source is exhausted.
    fn next_record(&mut self) -> Result<Option<Self::Record>>;
}

/// Handle naming a source inside a [`MultiReader`].
///
/// Cheap to clone; equality and hashing go through the identity only.
#[derive(Clone, Debug)]
pub struct SourceId {
    index: usize,
    name: BString,
}

impl SourceId {
    /// Position of the source in the list given to [`MultiReader::new`].
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Identity of the source.
    #[must_use]
    pub fn name(&self) -> &BStr {
        self.name.as_ref()
    }
}

impl StreamHandle for SourceId {
    fn identity(&self) -> &[u8] {
        &self.name
    }
}

impl PartialEq for SourceId {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for SourceId {}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Counts collected while merging.
#[derive(Default, Debug, Clone)]
pub struct MergeStats {
    /// Records returned to the caller.
    pub records_merged: u64,
    /// Records returned per source, indexed like the input sources.
    pub records_per_source: Vec<u64>,
    /// Sources that reached their end.
    pub sources_exhausted: usize,
    /// Sources closed by the caller before their end.
    pub sources_closed: usize,
    /// Sources closed because reading or merging their next record failed.
    pub sources_failed: usize,
}

/// Merges the records of several sources into one ordered stream.
pub struct MultiReader<A: AlignmentSource> {
    sources: Vec<Option<A>>,
    ids: Vec<SourceId>,
    merger: MultiMerger<SourceId, A::Record>,
    stats: MergeStats,
    pending_error: Option<MergeError>,
}

impl<A: AlignmentSource> MultiReader<A> {
    /// Create a reader over `sources`, merged in `order`.
    ///
    /// Reads the first record of every source. Sources without records are
    /// closed straight away.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::DuplicateStream`] if two sources share an
    /// identity, or any error raised while reading or adding a first record.
    pub fn new(sources: Vec<A>, order: MergeOrder) -> Result<Self> {
        let mut seen = HashSet::with_capacity(sources.len());
        let mut ids = Vec::with_capacity(sources.len());
        for (index, source) in sources.iter().enumerate() {
            let name = BString::from(source.identity());
            if !seen.insert(name.clone()) {
                return Err(MergeError::DuplicateStream { stream: name });
            }
            ids.push(SourceId { index, name });
        }

        let stats =
            MergeStats { records_per_source: vec![0; sources.len()], ..MergeStats::default() };
        let mut reader = Self {
            sources: sources.into_iter().map(Some).collect(),
            ids,
            merger: MultiMerger::new(order),
            stats,
            pending_error: None,
        };

        for index in 0..reader.sources.len() {
            reader.refill(index)?;
        }

        debug!(
            "Merging {} source(s) in {} order, {} with records",
            reader.sources.len(),
            order,
            reader.merger.len()
        );
        Ok(reader)
    }

    /// The order records are produced in.
    #[must_use]
    pub fn order(&self) -> MergeOrder {
        self.merger.order()
    }

    /// Handles of every source, open or not.
    #[must_use]
    pub fn source_ids(&self) -> &[SourceId] {
        &self.ids
    }

    /// Number of sources that can still produce records.
    #[must_use]
    pub fn open_sources(&self) -> usize {
        self.sources.iter().filter(|s| s.is_some()).count()
    }

    /// Counts collected so far.
    #[must_use]
    pub fn stats(&self) -> &MergeStats {
        &self.stats
    }

    /// Read the next record in merge order, with the source it came from.
    ///
    /// If refilling from the record's source fails, that source is closed and
    /// the record is still returned; the error is returned by the following
    /// call. Records of the other sources remain available after that.
    ///
    /// # Errors
    ///
    /// Returns the error raised by the previous refill, if any.
    pub fn next_record(&mut self) -> Result<Option<(SourceId, A::Record)>> {
        if let Some(error) = self.pending_error.take() {
            return Err(error);
        }

        let Some(candidate) = self.merger.take_first() else {
            return Ok(None);
        };
        let (id, record) = candidate.into_parts();

        if let Err(error) = self.refill(id.index) {
            self.fail_source(id.index);
            self.pending_error = Some(error);
        }

        self.stats.records_merged += 1;
        self.stats.records_per_source[id.index] += 1;
        Ok(Some((id, record)))
    }

    /// Close a source before its end, discarding its pending record.
    ///
    /// Returns false if no open source has this identity.
    pub fn close_source(&mut self, identity: &[u8]) -> bool {
        let Some(id) = self.ids.iter().find(|id| id.identity() == identity).cloned() else {
            return false;
        };
        if self.sources[id.index].take().is_none() {
            return false;
        }

        self.merger.remove_by_stream(&id);
        self.stats.sources_closed += 1;
        debug!("Closed source {id}");
        true
    }

    /// Close every source and drop all pending records.
    pub fn close_all(&mut self) {
        for source in &mut self.sources {
            if source.take().is_some() {
                self.stats.sources_closed += 1;
            }
        }
        self.merger.clear();
    }

    /// Close source `index` after a failed refill.
    fn fail_source(&mut self, index: usize) {
        if self.sources[index].take().is_some() {
            self.merger.remove_by_stream(&self.ids[index]);
            self.stats.sources_failed += 1;
            warn!("Closed source {} after a read error", self.ids[index]);
        }
    }

    /// Read the next record of source `index` into the merger, closing the
    /// source if it has none left.
    fn refill(&mut self, index: usize) -> Result<()> {
        let Some(source) = self.sources[index].as_mut() else {
            return Ok(());
        };

        match source.next_record()? {
            Some(record) => self.merger.add(Candidate::new(self.ids[index].clone(), record)),
            None => {
                self.sources[index] = None;
                self.merger.remove_by_stream(&self.ids[index]);
                self.stats.sources_exhausted += 1;
                debug!("Source {} exhausted", self.ids[index]);
                Ok(())
            }
        }
    }
}

impl<A: AlignmentSource> Iterator for MultiReader<A> {
    type Item = Result<(SourceId, A::Record)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// A source backed by records held in memory.
pub struct MemorySource<R> {
    name: BString,
    records: VecDeque<R>,
}

impl<R: AlignmentRecord> MemorySource<R> {
    /// Create a source named `name` yielding `records` in order.
    pub fn new(name: impl Into<BString>, records: impl IntoIterator<Item = R>) -> Self {
        Self { name: name.into(), records: records.into_iter().collect() }
    }
}

impl<R: AlignmentRecord> AlignmentSource for MemorySource<R> {
    type Record = R;

    fn identity(&self) -> &[u8] {
        &self.name
    }

    fn next_record(&mut self) -> Result<Option<R>> {
        Ok(self.records.pop_front())
    }
}
