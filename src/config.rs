//! Pipeline configuration
//!
//! [`PipelineConfig`] carries every input the pipeline needs. Defaults describe the standard
//! listing exports; a JSON file and command line flags can override any field.

use crate::analysis::histogram::{BinSpec, HistogramError};
use crate::cleaning::price::SignPolicy;
use crate::cleaning::pruning::MissingColumnPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Columns that are entirely empty in every listing export
pub const DEFAULT_DROP_COLUMNS: [&str; 21] = [
    "City",
    "Early Bird Discount",
    "Check-in Date (Search Input)",
    "Check-out Date (Search Input)",
    "# of Adults (Search Input)",
    "Subtitle",
    "Guests (Premium Data)",
    "Data as Of (Premium Data)",
    "Data Start Date (for 30 Day Intervals) (Premium Data)",
    "% Booked 1st 30 Days (Premium Data)",
    "% Booked Days 31-60 (Premium Data)",
    "% Booked Days 61-90 (Premium Data)",
    "Data Start Date (for Months) (Premium Data)",
    "Month 1 (Premium Data)",
    "% Booked in Month 1 (Premium Data)",
    "Month 2 (Premium Data)",
    "% Booked in Month 2 (Premium Data)",
    "Month 3 (Premium Data)",
    "% Booked in Month 3 (Premium Data)",
    "Data Start Date (for Reviews) (Premium Data)",
    "Past Year's # of Reviews (Premium Data)",
];

/// Column holding the currency-formatted nightly price
pub const DEFAULT_PRICE_COLUMN: &str = "Price";

/// Bin edges for the price histogram (10 bins of 50)
pub const DEFAULT_PRICE_BIN_EDGES: [f64; 11] = [
    0.0, 50.0, 100.0, 150.0, 200.0, 250.0, 300.0, 350.0, 400.0, 450.0, 500.0,
];

/// Bin count for every other numeric column
pub const DEFAULT_BIN_COUNT: usize = 20;

/// Errors that can occur while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("At least one input file is required")]
    NoInputs,

    #[error("Invalid price bins: {0}")]
    PriceBins(HistogramError),

    #[error("Invalid default bin count: {0}")]
    BinCount(HistogramError),

    #[error("Plot size {0}x{1} must be non-zero")]
    PlotSize(u32, u32),
}

type Result<T> = core::result::Result<T, ConfigError>;

/// Every setting of the listing pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// CSV exports to load, in order
    pub input_paths: Vec<PathBuf>,
    /// Columns removed before row cleaning
    pub drop_columns: Vec<String>,
    /// Skip drop-list columns that are absent instead of failing
    pub allow_missing_drop_columns: bool,
    /// Column holding the price strings
    pub price_column: String,
    /// How a leading minus on a price is treated
    pub sign_policy: SignPolicy,
    /// Bin edges for the price histogram
    pub price_bin_edges: Vec<f64>,
    /// Equal-width bin count for every other numeric column
    pub default_bin_count: usize,
    /// Directory receiving the histogram images
    pub output_dir: PathBuf,
    /// Whether histogram images are rendered at all
    pub render_plots: bool,
    /// Image size in pixels (width, height)
    pub plot_size: (u32, u32),
    /// Rows shown in the table previews
    pub preview_rows: usize,
    /// Price failures kept as examples in the report
    pub failure_samples: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_paths: (1..=4)
                .map(|index| PathBuf::from(format!("listing{}.csv", index)))
                .collect(),
            drop_columns: DEFAULT_DROP_COLUMNS.iter().map(|c| c.to_string()).collect(),
            allow_missing_drop_columns: false,
            price_column: DEFAULT_PRICE_COLUMN.to_string(),
            sign_policy: SignPolicy::default(),
            price_bin_edges: DEFAULT_PRICE_BIN_EDGES.to_vec(),
            default_bin_count: DEFAULT_BIN_COUNT,
            output_dir: PathBuf::from("plots"),
            render_plots: true,
            plot_size: (800, 500),
            preview_rows: 5,
            failure_samples: 10,
        }
    }
}

impl PipelineConfig {
    /// Loads a configuration from a JSON file. Fields absent from the file keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&contents).map_err(|source| ConfigError::JsonParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Checks that the configuration can drive a full run
    pub fn validate(&self) -> Result<()> {
        if self.input_paths.is_empty() {
            return Err(ConfigError::NoInputs);
        }

        self.price_bins()
            .validate()
            .map_err(ConfigError::PriceBins)?;
        self.default_bins()
            .validate()
            .map_err(ConfigError::BinCount)?;

        if self.plot_size.0 == 0 || self.plot_size.1 == 0 {
            return Err(ConfigError::PlotSize(self.plot_size.0, self.plot_size.1));
        }

        Ok(())
    }

    pub fn missing_column_policy(&self) -> MissingColumnPolicy {
        if self.allow_missing_drop_columns {
            MissingColumnPolicy::Ignore
        } else {
            MissingColumnPolicy::Error
        }
    }

    pub fn price_bins(&self) -> BinSpec {
        BinSpec::Edges(self.price_bin_edges.clone())
    }

    pub fn default_bins(&self) -> BinSpec {
        BinSpec::Count(self.default_bin_count)
    }

    /// Bin spec for a column: custom edges for the price column, equal-width bins otherwise
    pub fn bins_for(&self, column: &str) -> BinSpec {
        if column == self.price_column {
            self.price_bins()
        } else {
            self.default_bins()
        }
    }
}
