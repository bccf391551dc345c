//! Formatting helpers for log output and merge summaries.

use std::time::{Duration, Instant};

use crate::multi_reader::{MergeStats, SourceId};

/// Formats a count with thousands separators.
///
/// # Examples
///
/// ```
/// use bammerge_lib::logging::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(1_234_567), "1,234,567");
/// ```
#[must_use]
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats a fraction (0.0-1.0) as a percentage.
///
/// # Examples
///
/// ```
/// use bammerge_lib::logging::format_percent;
///
/// assert_eq!(format_percent(0.9543, 2), "95.43%");
/// assert_eq!(format_percent(1.0, 0), "100%");
/// ```
#[must_use]
pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{:.decimals$}%", value * 100.0, decimals = decimals)
}

/// Formats a duration in human-readable form, e.g. "45s", "2m 15s", "1h 30m".
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        let mins = secs / 60;
        let remaining_secs = secs % 60;
        if remaining_secs == 0 { format!("{mins}m") } else { format!("{mins}m {remaining_secs}s") }
    } else {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        if mins == 0 { format!("{hours}h") } else { format!("{hours}h {mins}m") }
    }
}

/// Formats a record rate, e.g. "1,234 records/s" or "0.5 records/min".
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_rate(count: u64, duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 0.001 {
        return format!("{} records/s", format_count(count));
    }

    let rate = count as f64 / secs;
    if rate >= 1.0 {
        format!("{} records/s", format_count(rate as u64))
    } else {
        let per_min = count as f64 / (secs / 60.0);
        format!("{per_min:.1} records/min")
    }
}

/// Logs a per-source summary of a finished merge.
#[allow(clippy::cast_precision_loss)]
pub fn log_merge_summary(stats: &MergeStats, sources: &[SourceId]) {
    log::info!("Merge Summary:");
    log::info!("  Records merged: {}", format_count(stats.records_merged));
    log::info!("  Sources exhausted: {}/{}", stats.sources_exhausted, sources.len());
    if stats.sources_closed > 0 {
        log::info!("  Sources closed early: {}", stats.sources_closed);
    }
    if stats.sources_failed > 0 {
        log::info!("  Sources closed after errors: {}", stats.sources_failed);
    }

    for (source, &count) in sources.iter().zip(&stats.records_per_source) {
        let share = if stats.records_merged > 0 {
            format_percent(count as f64 / stats.records_merged as f64, 2)
        } else {
            format_percent(0.0, 2)
        };
        log::info!("  {source}: {} ({share})", format_count(count));
    }
}

/// Operation timing and summary helper.
///
/// ```no_run
/// use bammerge_lib::logging::OperationTimer;
///
/// let timer = OperationTimer::new("Merging BAM files");
/// // ... do work ...
/// timer.log_completion(10_000);
/// ```
pub struct OperationTimer {
    operation: String,
    start_time: Instant,
}

impl OperationTimer {
    /// Creates a new operation timer and logs the start.
    #[must_use]
    pub fn new(operation: &str) -> Self {
        log::info!("{operation} ...");
        Self { operation: operation.to_string(), start_time: Instant::now() }
    }

    /// Logs the completion with record count and rate.
    pub fn log_completion(&self, count: u64) {
        let duration = self.start_time.elapsed();
        log::info!(
            "{} completed: {} in {} ({})",
            self.operation,
            format_count(count),
            format_duration(duration),
            format_rate(count, duration)
        );
    }
}
