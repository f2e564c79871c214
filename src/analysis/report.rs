//! Histogram report generation
//!
//! For every numeric column of the cleaned listings this prints a bucket table and renders a
//! histogram image. The price column uses the configured bin edges; all other columns use
//! equal-width bins over their observed range.

use super::histogram::{Histogram, HistogramError};
use super::summary::numeric_columns;
use crate::common::buckets::{format_bucket_table, histogram_buckets};
use crate::common::plots::{create_histogram_plot, histogram_path};
use crate::common::table::{ColumnKind, ListingTable};
use crate::common::PlotError;
use crate::config::PipelineConfig;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur during report generation
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to bin column '{column}': {source}")]
    Histogram {
        column: String,
        #[source]
        source: HistogramError,
    },

    #[error("Failed to plot column '{column}': {source}")]
    Plot {
        column: String,
        #[source]
        source: PlotError,
    },
}

type Result<T> = core::result::Result<T, ReportError>;

/// Histogram produced for one column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnHistogram {
    pub column: String,
    pub histogram: Histogram,
    /// Rendered image, when plotting is enabled
    pub image: Option<PathBuf>,
}

/// Chart title for a column
pub fn histogram_title(column: &str) -> String {
    format!("Histogram of {}", column)
}

/// Bins every numeric column without rendering anything.
///
/// Columns with no values at all are skipped.
pub fn compute_histograms(
    table: &ListingTable,
    config: &PipelineConfig,
) -> Result<Vec<ColumnHistogram>> {
    let mut histograms = Vec::new();

    for (index, _) in numeric_columns(table) {
        let column = &table.columns()[index];
        let Some(values) = table.numeric_values(index) else {
            continue;
        };

        let histogram = Histogram::compute(&values, &config.bins_for(column)).map_err(|source| {
            ReportError::Histogram {
                column: column.clone(),
                source,
            }
        })?;

        histograms.push(ColumnHistogram {
            column: column.clone(),
            histogram,
            image: None,
        });
    }

    Ok(histograms)
}

/// Generate the histogram report for the cleaned listings
///
/// Prints one bucket table per numeric column and, unless plotting is disabled, renders one
/// PNG per column into the configured output directory. Charts are produced one after the
/// other in column order.
///
/// # Returns
/// * `Ok(Vec<ColumnHistogram>)` - The histograms, with image paths when rendered
/// * `Err(ReportError)` - If the output directory or a chart could not be written
pub fn generate_histogram_report(
    table: &ListingTable,
    config: &PipelineConfig,
) -> Result<Vec<ColumnHistogram>> {
    for (index, column) in table.columns().iter().enumerate() {
        if table.column_kind(index) == ColumnKind::Empty {
            warn!("Column '{}' has no values; skipping its histogram", column);
        }
    }

    let mut histograms = compute_histograms(table, config)?;
    if histograms.is_empty() {
        warn!("No numeric columns to plot");
        return Ok(histograms);
    }

    if config.render_plots {
        fs::create_dir_all(&config.output_dir).map_err(|source| ReportError::OutputDir {
            path: config.output_dir.clone(),
            source,
        })?;
    }

    let progress = ProgressBar::new(histograms.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}") {
        progress.set_style(style);
    }

    for entry in &mut histograms {
        let title = histogram_title(&entry.column);
        progress.set_message(entry.column.clone());

        let table_text = format_bucket_table(&histogram_buckets(&entry.histogram), Some(&title));
        progress.suspend(|| {
            println!("\n{}", table_text);
            if entry.histogram.excluded > 0 {
                println!(
                    "{} value(s) fell outside the bin edges",
                    entry.histogram.excluded
                );
            }
        });

        if config.render_plots {
            let path = histogram_path(&config.output_dir, &entry.column);
            create_histogram_plot(
                &entry.histogram,
                &title,
                &entry.column,
                &path,
                config.plot_size,
            )
            .map_err(|source| ReportError::Plot {
                column: entry.column.clone(),
                source,
            })?;
            info!("Saved {}", path.display());
            entry.image = Some(path);
        }

        progress.inc(1);
    }

    progress.finish_and_clear();
    Ok(histograms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::table::Value;
    use tempfile::TempDir;

    fn cleaned_table() -> ListingTable {
        let mut table = ListingTable::new(vec![
            "Title".to_string(),
            "Price".to_string(),
            "Rating".to_string(),
            "Notes".to_string(),
        ]);
        for (price, rating) in [(40.0, "4.1"), (120.0, "4.9"), (520.0, "3.7"), (500.0, "")] {
            table.push_row(vec![
                Value::from_field("Listing"),
                Value::Number(price),
                Value::from_field(rating),
                Value::Missing,
            ]);
        }
        table
    }

    #[test]
    fn test_histogram_title() {
        assert_eq!(histogram_title("Price"), "Histogram of Price");
    }

    #[test]
    fn test_compute_histograms_selects_numeric_columns() {
        let config = PipelineConfig::default();
        let histograms = compute_histograms(&cleaned_table(), &config).unwrap();

        let columns: Vec<&str> = histograms.iter().map(|h| h.column.as_str()).collect();
        assert_eq!(columns, vec!["Price", "Rating"]);

        let price = &histograms[0].histogram;
        assert_eq!(price.counts.len(), 10);
        assert_eq!(price.counts[0], 1);
        assert_eq!(price.counts[2], 1);
        assert_eq!(price.counts[9], 1); // 500 sits in the closed last bin
        assert_eq!(price.excluded, 1); // 520 is outside every bin

        let rating = &histograms[1].histogram;
        assert_eq!(rating.counts.len(), 20);
        assert_eq!(rating.binned(), 3);
        assert_eq!(rating.edges[0], 3.7);
        assert_eq!(rating.edges[20], 4.9);
    }

    #[test]
    fn test_report_without_plots_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig {
            output_dir: dir.path().join("plots"),
            render_plots: false,
            ..Default::default()
        };

        let histograms = generate_histogram_report(&cleaned_table(), &config).unwrap();
        assert_eq!(histograms.len(), 2);
        assert!(histograms.iter().all(|h| h.image.is_none()));
        assert!(!config.output_dir.exists());
    }

    #[test]
    #[ignore = "Font rendering not available in test environment"]
    fn test_report_renders_one_image_per_column() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };

        let histograms = generate_histogram_report(&cleaned_table(), &config).unwrap();
        assert!(dir.path().join("histogram_price.png").exists());
        assert!(dir.path().join("histogram_rating.png").exists());
        assert!(histograms.iter().all(|h| h.image.is_some()));
    }
}
