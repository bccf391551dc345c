#![deny(unsafe_code)]
// Clippy lint configuration for CI
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::needless_pass_by_value,
    clippy::uninlined_format_args
)]

//! # bammerge - Multi-way merging of BAM files
//!
//! This library merges several streams of alignment records, each already
//! sorted, into one stream in the same order.
//!
//! ## Overview
//!
//! ### Core Functionality
//!
//! - **[`merge`]** - The merge structures: by position, by read name, or unsorted
//! - **[`record`]** - The record and stream views the merge structures work on
//! - **[`multi_reader`]** - The driving loop that keeps one record per input in flight
//!
//! ### Utilities
//!
//! - **[`bam_io`]** - Raw BAM record reading and writing
//! - **[`header`]** - Merging input headers and adding `@PG` records
//! - **[`validation`]** - Input validation
//! - **[`progress`]** - Progress tracking and logging
//! - **[`logging`]** - Formatting helpers and merge summaries
//! - **[`errors`]** - Error types
//!
//! ## Quick Start
//!
//! ```no_run
//! use bammerge_lib::bam_io::{BamSource, create_raw_bam_writer};
//! use bammerge_lib::header::merge_headers;
//! use bammerge_lib::merge::MergeOrder;
//! use bammerge_lib::multi_reader::MultiReader;
//!
//! # fn main() -> anyhow::Result<()> {
//! let sources = vec![BamSource::open("a.bam")?, BamSource::open("b.bam")?];
//! let headers: Vec<_> =
//!     sources.iter().map(|s| (s.path().to_string(), s.header().clone())).collect();
//! let header = merge_headers(&headers, MergeOrder::ByPosition)?;
//!
//! let mut writer = create_raw_bam_writer("merged.bam", &header, 1)?;
//! for result in MultiReader::new(sources, MergeOrder::ByPosition)? {
//!     let (_source, record) = result?;
//!     writer.write_raw_record(record.as_ref())?;
//! }
//! writer.finish()?;
//! # Ok(())
//! # }
//! ```

pub mod bam_io;
pub mod errors;
pub mod header;
pub mod logging;
pub mod merge;
pub mod multi_reader;
pub mod progress;
pub mod record;
pub mod validation;
