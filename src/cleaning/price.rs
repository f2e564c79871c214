//! Price normalization
//!
//! Converts currency-formatted price strings (e.g. `"$1,234.50"`, `"€200"`) to numbers by
//! discarding every character that is not an ASCII digit or a decimal point and parsing what
//! remains. Each row yields either a value or a [`PriceError`]; rows that fail are dropped
//! only after the whole column has been processed, so the failure counts cover every row.

use crate::common::table::{ListingTable, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use tabled::{Table, Tabled};
use thiserror::Error;
use tracing::debug;

static NON_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9.]").expect("price pattern is a valid regex"));

/// How a minus sign in front of the amount is treated
///
/// The stripping step removes `-` along with currency symbols, so by default a negative
/// amount silently becomes positive. The other policies make that decision explicit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignPolicy {
    /// Drop the sign along with every other non-numeric character (`"-$50"` → `50.0`)
    #[default]
    Strip,
    /// Treat a negative amount as a parse failure
    Reject,
    /// Keep the amount negative (`"-$50"` → `-50.0`)
    Keep,
}

impl FromStr for SignPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "strip" => Ok(SignPolicy::Strip),
            "reject" => Ok(SignPolicy::Reject),
            "keep" => Ok(SignPolicy::Keep),
            other => Err(format!(
                "unknown sign policy '{}' (expected strip, reject or keep)",
                other
            )),
        }
    }
}

/// Why a price could not be normalized
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PriceError {
    #[error("price is missing")]
    Missing,

    #[error("no digits left after stripping")]
    Empty,

    #[error("'{0}' is not a valid number")]
    Unparsable(String),

    #[error("'{0}' is too large to represent")]
    NonFinite(String),

    #[error("negative amount")]
    Negative,
}

impl PriceError {
    /// Short label used when aggregating failures
    pub fn reason(&self) -> &'static str {
        match self {
            PriceError::Missing => "missing",
            PriceError::Empty => "no digits",
            PriceError::Unparsable(_) => "unparsable",
            PriceError::NonFinite(_) => "non-finite",
            PriceError::Negative => "negative",
        }
    }
}

/// Errors that abort price cleaning as a whole
#[derive(Error, Debug, PartialEq)]
pub enum CleaningError {
    #[error("Price column '{0}' is not present in the listings")]
    MissingColumn(String),
}

/// Returns true when a `-` appears before the first digit of `raw`
fn has_leading_minus(raw: &str) -> bool {
    raw.chars()
        .take_while(|ch| !ch.is_ascii_digit())
        .any(|ch| ch == '-')
}

/// Normalizes one raw price string.
///
/// # Examples
/// - `"$1,234.56"` → `1234.56`
/// - `"N/A"` → [`PriceError::Empty`]
/// - `"1.234.56"` → [`PriceError::Unparsable`]
/// - `"-$50"` → `50.0` with [`SignPolicy::Strip`]
pub fn normalize_price(raw: &str, policy: SignPolicy) -> Result<f64, PriceError> {
    if raw.is_empty() {
        return Err(PriceError::Missing);
    }

    let stripped = NON_NUMERIC.replace_all(raw, "");
    if stripped.is_empty() {
        return Err(PriceError::Empty);
    }

    let value: f64 = stripped
        .parse()
        .map_err(|_| PriceError::Unparsable(stripped.to_string()))?;
    if !value.is_finite() {
        return Err(PriceError::NonFinite(stripped.to_string()));
    }

    match policy {
        SignPolicy::Strip => Ok(value),
        SignPolicy::Reject if has_leading_minus(raw) => Err(PriceError::Negative),
        SignPolicy::Keep if has_leading_minus(raw) => Ok(-value),
        SignPolicy::Reject | SignPolicy::Keep => Ok(value),
    }
}

/// A single row whose price could not be normalized
#[derive(Debug, Clone, PartialEq)]
pub struct PriceFailure {
    /// Row position in the table before failed rows were dropped
    pub row: usize,
    /// The raw cell contents
    pub raw: String,
    pub error: PriceError,
}

/// Outcome of normalizing a price column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceReport {
    /// Rows whose price was normalized successfully
    pub parsed: usize,
    /// Rows dropped because their price failed to normalize
    pub dropped: usize,
    /// Failure count per reason label
    pub reasons: BTreeMap<&'static str, usize>,
    /// The first few failures, in row order
    pub samples: Vec<PriceFailure>,
}

#[derive(Tabled)]
struct ReasonRow {
    #[tabled(rename = "Reason")]
    reason: &'static str,
    #[tabled(rename = "Rows")]
    rows: usize,
}

impl PriceReport {
    /// Formats the report as a short summary followed by a table of failure reasons
    pub fn format(&self) -> String {
        let mut output = format!(
            "Price normalization: {} parsed, {} dropped",
            self.parsed, self.dropped
        );

        if !self.reasons.is_empty() {
            let rows: Vec<ReasonRow> = self
                .reasons
                .iter()
                .map(|(reason, rows)| ReasonRow {
                    reason: *reason,
                    rows: *rows,
                })
                .collect();
            output.push('\n');
            output.push_str(&Table::new(rows).to_string());
        }

        for failure in &self.samples {
            output.push_str(&format!(
                "\n  row {}: {:?} ({})",
                failure.row, failure.raw, failure.error
            ));
        }

        output
    }
}

/// Normalizes every value of the price column in place, then drops the rows that failed.
///
/// # Arguments
/// * `table` - The listing table; the price column is rewritten to [`Value::Number`]
/// * `column` - Name of the price column
/// * `policy` - How to treat negative amounts
/// * `max_samples` - How many failures to keep as examples in the report
///
/// # Returns
/// * `Ok(PriceReport)` - Counts of parsed and dropped rows, with failure reasons
/// * `Err(CleaningError)` - If the price column does not exist
pub fn normalize_price_column(
    table: &mut ListingTable,
    column: &str,
    policy: SignPolicy,
    max_samples: usize,
) -> Result<PriceReport, CleaningError> {
    let index = table
        .column_index(column)
        .ok_or_else(|| CleaningError::MissingColumn(column.to_string()))?;

    let mut report = PriceReport::default();

    for row in 0..table.len() {
        let cell = table.cell_mut(row, index);
        let result = match cell {
            Value::Missing => Err(PriceError::Missing),
            Value::Text(raw) => normalize_price(raw, policy),
            Value::Number(value) if value.is_finite() => Ok(*value),
            Value::Number(value) => Err(PriceError::NonFinite(value.to_string())),
        };

        match result {
            Ok(value) => {
                *cell = Value::Number(value);
                report.parsed += 1;
            }
            Err(error) => {
                let raw = match &*cell {
                    Value::Text(text) => text.clone(),
                    Value::Number(value) => value.to_string(),
                    Value::Missing => String::new(),
                };
                debug!("Row {}: price {:?} rejected: {}", row, raw, error);
                *cell = Value::Missing;
                *report.reasons.entry(error.reason()).or_default() += 1;
                if report.samples.len() < max_samples {
                    report.samples.push(PriceFailure { row, raw, error });
                }
            }
        }
    }

    report.dropped = table.retain_rows(|row| !row[index].is_missing());
    Ok(report)
}
