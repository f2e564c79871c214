//! Common infrastructure modules shared across pipeline stages
//!
//! This module provides reusable infrastructure for:
//! - The in-memory listing table
//! - Bucket types and ASCII table formatting
//! - Plotting histogram charts

pub mod buckets;
pub mod plots;
pub mod table;

// Re-export commonly used items
pub use plots::PlotError;
pub use table::{ColumnKind, ListingTable, Value};
