//! Integration tests for bammerge.
//!
//! These tests merge real BAM files written with noodles, through both the
//! library and the `bammerge` binary.

mod helpers;
mod test_merger_properties;
mod test_multi_reader;
