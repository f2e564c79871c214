//! # Listing Histograms
//! Cleaning and histogram analysis for rental listing CSV exports.
//!
//! The pipeline loads several exports into one [`common::ListingTable`], removes columns that
//! are always empty, normalizes the currency-formatted price column, and renders one
//! histogram per numeric column.

/// Analysis of the cleaned listings: binning, summaries, and the histogram report.
pub mod analysis;

/// Column pruning and price normalization.
pub mod cleaning;

/// Shared table model, bucket tables, and plotting.
pub mod common;

pub mod config;
pub mod parsing;
pub mod pipeline;

pub use config::PipelineConfig;
pub use pipeline::{run, PipelineError, PipelineSummary};
