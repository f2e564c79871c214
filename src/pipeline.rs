//! End-to-end listing pipeline
//!
//! Runs load → prune → normalize → report as a straight sequence. Fatal errors abort the run;
//! rows with unusable data are dropped and counted.

use crate::analysis::report::{generate_histogram_report, ColumnHistogram, ReportError};
use crate::analysis::summary::{format_head, format_info};
use crate::cleaning::price::{normalize_price_column, CleaningError, PriceReport};
use crate::cleaning::pruning::{drop_columns, drop_empty_rows, PruneError};
use crate::common::table::ListingTable;
use crate::config::{ConfigError, PipelineConfig};
use crate::parsing::{parse_listings, ParsingError};
use thiserror::Error;
use tracing::info;

/// Errors that abort the pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Loading error: {0}")]
    Parsing(#[from] ParsingError),

    #[error("Pruning error: {0}")]
    Prune(#[from] PruneError),

    #[error("Cleaning error: {0}")]
    Cleaning(#[from] CleaningError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),
}

type Result<T> = core::result::Result<T, PipelineError>;

/// What the cleaning stages removed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleaningReport {
    pub columns_dropped: usize,
    pub empty_rows_dropped: usize,
    pub price: PriceReport,
}

/// Outcome of a full pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSummary {
    pub rows_loaded: usize,
    pub rows_remaining: usize,
    pub cleaning: CleaningReport,
    pub histograms: Vec<ColumnHistogram>,
}

/// Runs the pruning and price stages on an already loaded table
///
/// Drop-list columns are removed first, then fully empty rows, then the price column is
/// normalized and rows without a usable price are dropped.
pub fn clean_listings(table: &mut ListingTable, config: &PipelineConfig) -> Result<CleaningReport> {
    let columns_dropped = drop_columns(
        table,
        config.drop_columns.as_slice(),
        config.missing_column_policy(),
    )?;
    let empty_rows_dropped = drop_empty_rows(table);
    info!(
        "Dropped {} columns and {} empty rows",
        columns_dropped, empty_rows_dropped
    );

    let price = normalize_price_column(
        table,
        &config.price_column,
        config.sign_policy,
        config.failure_samples,
    )?;
    info!(
        "Normalized '{}': {} parsed, {} rows dropped",
        config.price_column, price.parsed, price.dropped
    );

    Ok(CleaningReport {
        columns_dropped,
        empty_rows_dropped,
        price,
    })
}

fn print_table_overview(heading: &str, table: &ListingTable, preview_rows: usize) {
    println!("{}", heading);
    println!("{}", format_head(table, preview_rows));
    println!("{}", format_info(table));
}

/// Runs the whole pipeline described by `config`
pub fn run(config: &PipelineConfig) -> Result<PipelineSummary> {
    config.validate()?;

    let mut table = parse_listings(&config.input_paths)?;
    let rows_loaded = table.len();
    info!(
        "Loaded {} rows from {} files",
        rows_loaded,
        config.input_paths.len()
    );
    print_table_overview("Original listings:", &table, config.preview_rows);

    let cleaning = clean_listings(&mut table, config)?;

    println!();
    println!("{}", cleaning.price.format());
    print_table_overview("\nListings after cleaning:", &table, config.preview_rows);

    let histograms = generate_histogram_report(&table, config)?;

    Ok(PipelineSummary {
        rows_loaded,
        rows_remaining: table.len(),
        cleaning,
        histograms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::pruning::count_empty_rows;
    use crate::common::table::Value;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir, inputs: Vec<PathBuf>) -> PipelineConfig {
        PipelineConfig {
            input_paths: inputs,
            drop_columns: vec!["City".to_string(), "Subtitle".to_string()],
            output_dir: dir.path().join("plots"),
            render_plots: false,
            ..Default::default()
        }
    }

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_clean_listings() {
        let mut table = ListingTable::new(vec![
            "Title".to_string(),
            "City".to_string(),
            "Price".to_string(),
            "Subtitle".to_string(),
        ]);
        for (title, price) in [("Loft", "$1,234.56"), ("", ""), ("Cabin", "N/A"), ("Hut", "-$50")] {
            table.push_row(vec![
                Value::from_field(title),
                Value::Missing,
                Value::from_field(price),
                Value::Missing,
            ]);
        }

        let config = PipelineConfig {
            drop_columns: vec!["City".to_string(), "Subtitle".to_string()],
            ..Default::default()
        };
        let report = clean_listings(&mut table, &config).unwrap();

        assert_eq!(report.columns_dropped, 2);
        assert_eq!(report.empty_rows_dropped, 1);
        assert_eq!(report.price.parsed, 2);
        assert_eq!(report.price.dropped, 1);
        assert_eq!(count_empty_rows(&table), 0);
        assert_eq!(table.columns(), &["Title", "Price"]);

        let prices: Vec<f64> = table.column_values(1).filter_map(Value::as_number).collect();
        assert_eq!(prices, vec![1234.56, 50.0]);
    }

    #[test]
    fn test_clean_listings_missing_drop_column() {
        let mut table = ListingTable::new(vec!["Price".to_string()]);
        let config = PipelineConfig::default();

        assert!(matches!(
            clean_listings(&mut table, &config),
            Err(PipelineError::Prune(_))
        ));
    }

    #[test]
    fn test_run_end_to_end() {
        let dir = TempDir::new().unwrap();
        let first = write(
            &dir,
            "listing1.csv",
            "Title,City,Price,Rating,Subtitle\nLoft,,\"$1,234.56\",4.5,\nStudio,,$80,4.0,\n,,,,\n",
        );
        let second = write(
            &dir,
            "listing2.csv",
            "Title,City,Price,Rating,Subtitle\nCabin,,N/A,3.9,\nHut,,$520,4.2,\n",
        );

        let config = test_config(&dir, vec![first, second]);
        let summary = run(&config).unwrap();

        assert_eq!(summary.rows_loaded, 5);
        assert_eq!(summary.cleaning.empty_rows_dropped, 1);
        assert_eq!(summary.cleaning.price.dropped, 1);
        assert_eq!(summary.rows_remaining, 3);

        let columns: Vec<&str> = summary
            .histograms
            .iter()
            .map(|h| h.column.as_str())
            .collect();
        assert_eq!(columns, vec!["Price", "Rating"]);

        let price = &summary.histograms[0].histogram;
        assert_eq!(price.binned(), 1);
        assert_eq!(price.excluded, 2);
    }

    #[test]
    fn test_run_rejects_schema_mismatch() {
        let dir = TempDir::new().unwrap();
        let first = write(&dir, "a.csv", "Title,City,Price,Subtitle\nLoft,,$10,\n");
        let second = write(&dir, "b.csv", "Title,Price,Subtitle\nHut,$20,\n");

        let config = test_config(&dir, vec![first, second]);
        assert!(matches!(
            run(&config),
            Err(PipelineError::Parsing(ParsingError::SchemaMismatch { .. }))
        ));
    }

    #[test]
    fn test_run_rejects_invalid_config() {
        let config = PipelineConfig {
            input_paths: vec![],
            ..Default::default()
        };
        assert!(matches!(run(&config), Err(PipelineError::Config(_))));
    }
}
