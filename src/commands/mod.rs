//! CLI command implementations for bammerge.
//!
//! - [`merge`] - Merge sorted BAM files into one

#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

pub mod command;
pub mod common;
pub mod merge;
