//! Analysis of the cleaned listings
//!
//! This module contains:
//! - Histogram binning
//! - Table previews and column summaries
//! - The per-column histogram report

pub mod histogram;
pub mod report;
pub mod summary;

// Re-export analysis functions for convenience
pub use histogram::{BinSpec, Histogram};
pub use report::{generate_histogram_report, ColumnHistogram};
pub use summary::{format_head, format_info};
