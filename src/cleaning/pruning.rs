//! Column and row pruning
//!
//! Removes the drop-list columns (known to be always empty in the listing exports) and then
//! every row whose remaining fields are all missing.

use crate::common::table::ListingTable;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// What to do when a drop-list column is not present in the table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingColumnPolicy {
    /// Treat an absent column as a schema mismatch
    #[default]
    Error,
    /// Skip absent columns
    Ignore,
}

/// Errors that can occur while pruning columns
#[derive(Error, Debug, PartialEq)]
pub enum PruneError {
    #[error("Columns to drop are not present in the listings: {0:?}")]
    MissingColumns(Vec<String>),
}

type Result<T> = core::result::Result<T, PruneError>;

/// Removes the named columns from the table.
///
/// With [`MissingColumnPolicy::Error`] all names are checked up front, so a failing call
/// leaves the table untouched.
///
/// # Returns
/// * `Ok(usize)` - Number of columns removed
/// * `Err(PruneError)` - If a column is absent and the policy is [`MissingColumnPolicy::Error`]
pub fn drop_columns<S: AsRef<str>>(
    table: &mut ListingTable,
    names: &[S],
    policy: MissingColumnPolicy,
) -> Result<usize> {
    let absent: Vec<String> = names
        .iter()
        .map(|name| name.as_ref())
        .filter(|name| table.column_index(name).is_none())
        .map(str::to_string)
        .collect();

    if !absent.is_empty() {
        match policy {
            MissingColumnPolicy::Error => return Err(PruneError::MissingColumns(absent)),
            MissingColumnPolicy::Ignore => debug!("Skipping absent drop columns: {:?}", absent),
        }
    }

    let removed = names
        .iter()
        .map(|name| name.as_ref())
        .filter(|name| table.remove_column(name))
        .count();
    Ok(removed)
}

/// Removes every row in which all fields are missing, keeping the remaining rows in order.
///
/// # Returns
/// Number of rows removed
pub fn drop_empty_rows(table: &mut ListingTable) -> usize {
    table.retain_rows(|row| row.iter().any(|value| !value.is_missing()))
}

/// Number of rows in which every field is missing
pub fn count_empty_rows(table: &ListingTable) -> usize {
    table
        .rows()
        .iter()
        .filter(|row| row.iter().all(|value| value.is_missing()))
        .count()
}
