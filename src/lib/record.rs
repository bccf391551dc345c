//! Records and stream handles as seen by the merge structures.
//!
//! The mergers never look inside a record beyond the three fields they order
//! on, and never look at a stream beyond its identity. Those two views are the
//! [`AlignmentRecord`] and [`StreamHandle`] traits.
//!
//! [`RawRecord`] is the record type produced by BAM inputs: the encoded bytes
//! of one alignment, with the read name decoded only when a name-ordered merge
//! asks for it.
//!
//! # BAM Record Binary Layout
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  -----
//! 0-3     4     refID (i32) - reference sequence ID, -1 if unmapped
//! 4-7     4     pos (i32) - 0-based leftmost position
//! 8       1     l_read_name (u8) - length of read name + NUL
//! 9-31    23    mapq, bin, n_cigar_op, flag, l_seq, mate fields, tlen
//! 32+     var   read_name (l_read_name bytes, NUL-terminated), CIGAR, ...
//! ```

use bstr::{BStr, BString};
use noodles::sam::alignment::RecordBuf;
use std::ops::Range;
use std::rc::Rc;
use std::sync::Arc;

/// Reference sequence ID of records that are not placed on any reference.
pub const UNMAPPED_REFERENCE_ID: i32 = -1;

/// Size of the fixed-length section that precedes the read name.
pub const FIXED_SECTION_LEN: usize = 32;

/// Identity of an input stream.
///
/// Two handles denote the same stream iff their identities are equal. The
/// identity must not change while the stream is open.
pub trait StreamHandle {
    /// Stable identity of the stream, typically its file name.
    fn identity(&self) -> &[u8];

    /// Returns true if both handles denote the same stream.
    fn same_stream<H: StreamHandle + ?Sized>(&self, other: &H) -> bool {
        self.identity() == other.identity()
    }
}

impl StreamHandle for BString {
    fn identity(&self) -> &[u8] {
        self.as_slice()
    }
}

impl StreamHandle for BStr {
    fn identity(&self) -> &[u8] {
        self
    }
}

impl StreamHandle for String {
    fn identity(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl StreamHandle for str {
    fn identity(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl StreamHandle for Vec<u8> {
    fn identity(&self) -> &[u8] {
        self
    }
}

impl<H: StreamHandle + ?Sized> StreamHandle for &H {
    fn identity(&self) -> &[u8] {
        (**self).identity()
    }
}

impl<H: StreamHandle + ?Sized> StreamHandle for Rc<H> {
    fn identity(&self) -> &[u8] {
        (**self).identity()
    }
}

impl<H: StreamHandle + ?Sized> StreamHandle for Arc<H> {
    fn identity(&self) -> &[u8] {
        (**self).identity()
    }
}

/// The fields of an alignment record that merge orderings look at.
pub trait AlignmentRecord {
    /// Reference sequence ID, or [`UNMAPPED_REFERENCE_ID`] if unplaced.
    fn reference_sequence_id(&self) -> i32;

    /// 0-based leftmost position, -1 if unplaced.
    fn position(&self) -> i32;

    /// Read name without the NUL terminator.
    ///
    /// Records with a deferred name return an empty slice until
    /// [`materialize_name`](Self::materialize_name) has succeeded.
    fn name(&self) -> &[u8];

    /// Decodes the read name if that has not happened yet.
    ///
    /// Returns false if the name cannot be decoded.
    fn materialize_name(&mut self) -> bool;

    /// Returns true if the record is not placed on a reference sequence.
    fn is_unmapped(&self) -> bool {
        self.reference_sequence_id() == UNMAPPED_REFERENCE_ID
    }
}

/// An encoded BAM record with a lazily decoded read name.
///
/// The bytes are the record as stored in a BAM file, without the leading
/// 4-byte `block_size`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RawRecord {
    buf: Vec<u8>,
    name: Option<Range<usize>>,
}

impl RawRecord {
    /// Wraps encoded record bytes. The name is not decoded.
    #[must_use]
    pub fn new(buf: Vec<u8>) -> Self {
        Self { buf, name: None }
    }

    /// Returns the length of the record in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if the record has no bytes.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Returns true once the read name has been decoded.
    #[must_use]
    pub fn is_name_materialized(&self) -> bool {
        self.name.is_some()
    }

    /// Returns the record bytes, consuming the record.
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    /// Returns the BAM flags, or 0 for truncated records.
    #[must_use]
    pub fn flags(&self) -> u16 {
        if self.buf.len() < FIXED_SECTION_LEN {
            return 0;
        }
        u16::from_le_bytes([self.buf[14], self.buf[15]])
    }

    /// Locates the read name within the buffer.
    fn locate_name(&self) -> Option<Range<usize>> {
        let l_read_name = usize::from(*self.buf.get(8)?);
        if self.buf.len() < FIXED_SECTION_LEN || l_read_name == 0 {
            return None;
        }

        let end = FIXED_SECTION_LEN + l_read_name;
        let field = self.buf.get(FIXED_SECTION_LEN..end)?;
        match field.split_last() {
            Some((0, _)) => Some(FIXED_SECTION_LEN..end - 1),
            _ => None,
        }
    }

    fn read_i32(&self, offset: usize) -> Option<i32> {
        if self.buf.len() < FIXED_SECTION_LEN {
            return None;
        }
        let bytes = self.buf.get(offset..offset + 4)?;
        Some(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

impl AsRef<[u8]> for RawRecord {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.buf
    }
}

impl From<Vec<u8>> for RawRecord {
    #[inline]
    fn from(buf: Vec<u8>) -> Self {
        Self::new(buf)
    }
}

impl AlignmentRecord for RawRecord {
    fn reference_sequence_id(&self) -> i32 {
        self.read_i32(0).unwrap_or(UNMAPPED_REFERENCE_ID)
    }

    fn position(&self) -> i32 {
        self.read_i32(4).unwrap_or(-1)
    }

    fn name(&self) -> &[u8] {
        match &self.name {
            Some(range) => &self.buf[range.clone()],
            None => &[],
        }
    }

    fn materialize_name(&mut self) -> bool {
        if self.name.is_none() {
            self.name = self.locate_name();
        }
        self.name.is_some()
    }
}

impl AlignmentRecord for RecordBuf {
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn reference_sequence_id(&self) -> i32 {
        RecordBuf::reference_sequence_id(self).map_or(UNMAPPED_REFERENCE_ID, |id| id as i32)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn position(&self) -> i32 {
        self.alignment_start().map_or(-1, |start| usize::from(start) as i32 - 1)
    }

    fn name(&self) -> &[u8] {
        RecordBuf::name(self).map(|name| <_ as AsRef<[u8]>>::as_ref(name)).unwrap_or(&[])
    }

    fn materialize_name(&mut self) -> bool {
        RecordBuf::name(self).is_some()
    }
}
