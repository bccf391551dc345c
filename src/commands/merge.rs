//! Merge sorted BAM files into one.
//!
//! Every input holds one record in flight in a merge structure; the smallest
//! is written and replaced by the next record of the same input. Records are
//! copied as raw bytes and never re-encoded.

use anyhow::{Result, bail};
use bammerge_lib::bam_io::{BamSource, create_raw_bam_writer};
use bammerge_lib::header::{add_pg_record, infer_merge_order, merge_headers};
use bammerge_lib::logging::{OperationTimer, log_merge_summary};
use bammerge_lib::merge::MergeOrder;
use bammerge_lib::multi_reader::MultiReader;
use bammerge_lib::progress::ProgressTracker;
use bammerge_lib::validation::{
    validate_distinct_inputs, validate_file_exists, validate_output_not_input,
};
use clap::{Parser, ValueEnum};
use log::info;
use std::path::PathBuf;

use crate::commands::command::Command;
use crate::commands::common::CompressionOptions;

/// Merge order for the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MergeOrderArg {
    /// Coordinate order (reference → position, unmapped last)
    Coordinate,
    /// Queryname order (read name, byte-wise)
    Queryname,
    /// No order: inputs are interleaved
    Unsorted,
}

impl From<MergeOrderArg> for MergeOrder {
    fn from(arg: MergeOrderArg) -> Self {
        match arg {
            MergeOrderArg::Coordinate => MergeOrder::ByPosition,
            MergeOrderArg::Queryname => MergeOrder::ByName,
            MergeOrderArg::Unsorted => MergeOrder::Unsorted,
        }
    }
}

/// Merge several BAM files that share a reference sequence dictionary.
#[derive(Debug, Parser)]
#[command(
    name = "merge",
    about = "\x1b[38;5;72m[UTILITIES]\x1b[0m      \x1b[36mMerge sorted BAM files into a single BAM\x1b[0m",
    long_about = r#"
Merge several BAM files into one, keeping their sort order.

All inputs must share the same reference sequences, in the same order. Each
input must already be sorted in the merge order; records that compare equal
are written in the order they were read, so a record from one input can
follow an equal record that another input supplied earlier.

MERGE ORDERS:

  coordinate   Reference sequence, then position. Unmapped records last.

  queryname    Read name, compared byte by byte ("r1" < "r10" < "r2").

  unsorted     No ordering; records from all inputs are interleaved.

When --order is not given it is taken from the @HD SO tag of the inputs.
Inputs that disagree are merged as unsorted.

EXAMPLES:

  # Merge coordinate-sorted BAMs
  bammerge merge -i a.bam -i b.bam -o merged.bam

  # Merge queryname-sorted BAMs, stating the order explicitly
  bammerge merge -i a.bam b.bam -o merged.bam --order queryname
"#
)]
pub struct Merge {
    /// Input BAM files.
    #[arg(short = 'i', long = "input", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Output BAM file.
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// Merge order (default: taken from the input headers).
    #[arg(long = "order", value_enum)]
    pub order: Option<MergeOrderArg>,

    /// Compression options for output BAM.
    #[command(flatten)]
    pub compression: CompressionOptions,
}

impl Command for Merge {
    fn execute(&self, command_line: &str) -> Result<()> {
        if self.inputs.is_empty() {
            bail!("At least one input BAM is required");
        }
        for input in &self.inputs {
            validate_file_exists(input, "Input BAM")?;
        }
        validate_distinct_inputs(&self.inputs)?;
        validate_output_not_input(&self.output, &self.inputs)?;

        let timer = OperationTimer::new("Merging BAM files");

        let sources =
            self.inputs.iter().map(BamSource::open).collect::<Result<Vec<BamSource>>>()?;
        let headers: Vec<(String, _)> =
            sources.iter().map(|s| (s.path().to_string(), s.header().clone())).collect();

        let order = self.order.map_or_else(|| infer_merge_order(&headers), MergeOrder::from);

        info!("Starting Merge");
        info!("Inputs: {}", self.inputs.len());
        for input in &self.inputs {
            info!("  {}", input.display());
        }
        info!("Output: {}", self.output.display());
        info!("Merge order: {order}");

        let header = merge_headers(&headers, order)?;
        let header = add_pg_record(header, env!("CARGO_PKG_VERSION"), command_line)?;
        let mut writer =
            create_raw_bam_writer(&self.output, &header, self.compression.compression_level)?;

        let mut reader = MultiReader::new(sources, order)?;
        let mut progress = ProgressTracker::new("Merged records");
        while let Some((_, record)) = reader.next_record()? {
            writer.write_raw_record(record.as_ref())?;
            progress.record(1);
        }
        writer.finish()?;
        progress.log_final();

        log_merge_summary(reader.stats(), reader.source_ids());
        timer.log_completion(reader.stats().records_merged);
        Ok(())
    }
}
