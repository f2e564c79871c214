//! Cleaning stages applied to the loaded listings
//!
//! - Column and empty-row pruning
//! - Price normalization

pub mod price;
pub mod pruning;

pub use price::{normalize_price, normalize_price_column, PriceReport, SignPolicy};
pub use pruning::{drop_columns, drop_empty_rows, MissingColumnPolicy};
