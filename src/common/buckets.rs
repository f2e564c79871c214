//! Bucket rows and ASCII table formatting for histogram output
//!
//! - [`BucketEntry`] represents one histogram bin with its range, count, and percentage
//! - [`format_bucket_table`] renders bins using the [`tabled`] crate

use crate::analysis::histogram::Histogram;
use tabled::{Table, Tabled};

/// Represents a single bucket with its range, count, and percentage
#[derive(Debug, Clone, Tabled)]
pub struct BucketEntry {
    /// Human-readable range description (e.g., "[0, 50)", "[450, 500]")
    #[tabled(rename = "Range")]
    pub range: String,
    /// Number of values in this bucket
    #[tabled(rename = "Count")]
    pub count: usize,
    /// Percentage of all values of the column in this bucket
    #[tabled(rename = "Percentage")]
    pub percentage: String,
}

impl BucketEntry {
    /// Creates a new bucket entry with formatted percentage
    pub fn new(range: String, count: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            "0.00%".to_string()
        } else {
            format!("{:.2}%", (count as f64 / total as f64) * 100.0)
        };

        Self {
            range,
            count,
            percentage,
        }
    }
}

/// Formats a bin edge compactly; whole numbers print without a fractional part.
fn format_edge(edge: f64) -> String {
    if edge.fract() == 0.0 && edge.abs() < 1e15 {
        format!("{:.0}", edge)
    } else {
        format!("{:.2}", edge)
    }
}

/// Converts a [`Histogram`] into bucket rows.
///
/// Percentages are relative to every value offered to the histogram, including the ones
/// that fell outside the bin edges.
pub fn histogram_buckets(histogram: &Histogram) -> Vec<BucketEntry> {
    let total = histogram.total();
    let last = histogram.counts.len().saturating_sub(1);

    histogram
        .bins()
        .enumerate()
        .map(|(index, (low, high, count))| {
            let closing = if index == last { ']' } else { ')' };
            let range = format!("[{}, {}{}", format_edge(low), format_edge(high), closing);
            BucketEntry::new(range, count, total)
        })
        .collect()
}

/// Formats bucket entries as an ASCII table using the [`tabled`] crate
///
/// # Arguments
/// * `buckets` - A slice of [`BucketEntry`] to format
/// * `title` - Optional title for the table
///
/// # Returns
/// A formatted ASCII table as a [`String`]
pub fn format_bucket_table(buckets: &[BucketEntry], title: Option<&str>) -> String {
    if buckets.is_empty() {
        return "No data available for bucketing".to_string();
    }

    let table = Table::new(buckets).to_string();

    if let Some(title) = title {
        format!("{}\n{}\n{}", title, "=".repeat(title.len()), table)
    } else {
        table
    }
}
