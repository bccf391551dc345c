//! BAM file I/O for merging.
//!
//! Records are moved between files as raw bytes: [`BamSource`] reads the
//! header with noodles and then pulls `block_size`-prefixed records straight
//! off the BGZF stream, and [`RawBamWriter`] writes them back out the same way.
//! Nothing is decoded beyond what the merge key needs.

use anyhow::{Context, Result};
use bstr::{BStr, BString};
use noodles::bgzf::writer::{Builder as BgzfWriterBuilder, CompressionLevel};
use noodles::bgzf::{Reader as BgzfReader, Writer as BgzfWriter};
use noodles::sam::Header;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::errors::MergeError;
use crate::multi_reader::AlignmentSource;
use crate::record::RawRecord;

/// A BAM file read as a stream of raw records.
pub struct BamSource {
    identity: BString,
    header: Header,
    reader: BgzfReader<File>,
}

impl BamSource {
    /// Open a BAM file and read its header.
    ///
    /// The source identity is the path as given.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or its header cannot be read.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let file = File::open(path_ref)
            .with_context(|| format!("Failed to open input BAM: {}", path_ref.display()))?;

        let mut reader = noodles::bam::io::Reader::new(file);
        let header = reader
            .read_header()
            .with_context(|| format!("Failed to read header from: {}", path_ref.display()))?;

        Ok(Self {
            identity: BString::from(path_ref.to_string_lossy().as_bytes()),
            header,
            reader: reader.into_inner(),
        })
    }

    /// The header read when the file was opened.
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The path the source was opened from.
    #[must_use]
    pub fn path(&self) -> &BStr {
        self.identity.as_ref()
    }
}

impl AlignmentSource for BamSource {
    type Record = RawRecord;

    fn identity(&self) -> &[u8] {
        &self.identity
    }

    fn next_record(&mut self) -> crate::errors::Result<Option<RawRecord>> {
        read_raw_record(&mut self.reader).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                MergeError::InvalidRecord {
                    stream: self.identity.clone(),
                    reason: "file ends in the middle of a record".to_string(),
                }
            } else {
                MergeError::Io(e)
            }
        })
    }
}

/// Read one raw BAM record, without its `block_size` prefix.
///
/// Returns `None` at a clean end of stream.
///
/// # Errors
/// Returns an error if the reader fails or the stream ends mid-record.
pub fn read_raw_record<R: Read>(reader: &mut R) -> io::Result<Option<RawRecord>> {
    let Some(block_size) = read_block_size(reader)? else {
        return Ok(None);
    };

    let mut buf = vec![0; block_size];
    reader.read_exact(&mut buf)?;
    Ok(Some(RawRecord::new(buf)))
}

/// Read the 4-byte block size, or `None` if no bytes remain.
fn read_block_size<R: Read>(reader: &mut R) -> io::Result<Option<usize>> {
    let mut buf = [0u8; 4];

    loop {
        match reader.read(&mut buf[..1]) {
            Ok(0) => return Ok(None),
            Ok(_) => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    reader.read_exact(&mut buf[1..])?;

    let n = u32::from_le_bytes(buf);
    usize::try_from(n).map(Some).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Raw BAM writer for writing raw record bytes directly.
///
/// Writes records as:
/// - 4-byte `block_size` (little-endian)
/// - raw BAM record bytes
pub struct RawBamWriter<W: Write = File> {
    inner: BgzfWriter<W>,
}

impl<W: Write> RawBamWriter<W> {
    /// Create a new raw BAM writer from a BGZF writer.
    #[must_use]
    pub fn new(inner: BgzfWriter<W>) -> Self {
        Self { inner }
    }

    /// Write the BAM header.
    ///
    /// # Errors
    /// Returns an error if writing to the underlying writer fails.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn write_header(&mut self, header: &Header) -> io::Result<()> {
        self.inner.write_all(b"BAM\x01")?;

        // Header text (SAM header serialized using noodles)
        let mut sam_writer = noodles::sam::io::Writer::new(Vec::new());
        sam_writer.write_header(header)?;
        let header_bytes = sam_writer.into_inner();
        let l_text = header_bytes.len() as i32;
        self.inner.write_all(&l_text.to_le_bytes())?;
        self.inner.write_all(&header_bytes)?;

        let n_ref = header.reference_sequences().len() as i32;
        self.inner.write_all(&n_ref.to_le_bytes())?;

        for (name, map) in header.reference_sequences() {
            // l_name includes the NUL terminator
            let l_name = (name.len() + 1) as u32;
            self.inner.write_all(&l_name.to_le_bytes())?;
            self.inner.write_all(name)?;
            self.inner.write_all(&[0u8])?;

            let l_ref = map.length().get() as i32;
            self.inner.write_all(&l_ref.to_le_bytes())?;
        }

        Ok(())
    }

    /// Write a raw BAM record.
    ///
    /// The bytes should be the raw BAM record data (without the 4-byte `block_size` prefix).
    ///
    /// # Errors
    /// Returns an error if writing to the underlying writer fails.
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub fn write_raw_record(&mut self, record_bytes: &[u8]) -> io::Result<()> {
        let block_size = record_bytes.len() as u32;
        self.inner.write_all(&block_size.to_le_bytes())?;
        self.inner.write_all(record_bytes)
    }

    /// Flush pending data and write the BGZF end-of-file marker.
    ///
    /// # Errors
    /// Returns an error if finalizing the writer fails.
    pub fn finish(mut self) -> io::Result<()> {
        self.inner.flush()?;
        self.inner.try_finish()
    }
}

/// Create a raw BAM writer and write the header in one operation.
///
/// # Arguments
/// * `path` - Path for the output BAM file
/// * `header` - SAM header to write
/// * `compression_level` - BGZF compression level (0-9); out-of-range values
///   keep the library default
///
/// # Errors
/// Returns an error if the file cannot be created or the header cannot be written.
pub fn create_raw_bam_writer<P: AsRef<Path>>(
    path: P,
    header: &Header,
    compression_level: u32,
) -> Result<RawBamWriter> {
    let path_ref = path.as_ref();
    let output_file = File::create(path_ref)
        .with_context(|| format!("Failed to create output BAM: {}", path_ref.display()))?;

    let mut builder = BgzfWriterBuilder::default();
    if let Some(level) = u8::try_from(compression_level).ok().and_then(CompressionLevel::new) {
        builder = builder.set_compression_level(level);
    }

    let mut writer = RawBamWriter::new(builder.build_from_writer(output_file));
    writer
        .write_header(header)
        .with_context(|| format!("Failed to write header to: {}", path_ref.display()))?;
    Ok(writer)
}
