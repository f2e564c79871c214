//! Plotting infrastructure for histogram charts
//!
//! This module renders [`Histogram`]s as bar charts using the [`plotters`] crate.
//! Charts are saved as PNG files through the bitmap backend, so rendering works in headless
//! environments without a display.

use crate::analysis::histogram::Histogram;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during plot generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Failed to save plot to file: {0}")]
    FileSave(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

type Result<T> = core::result::Result<T, PlotError>;

/// Builds the output file name for a column's histogram.
///
/// The column name is lowercased and every run of non-alphanumeric characters becomes a
/// single `_`, e.g. `"% Booked (30 Days)"` becomes `histogram_booked_30_days.png`.
pub fn histogram_file_name(column: &str) -> String {
    let mut slug = String::with_capacity(column.len());
    for ch in column.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }

    let slug = slug.trim_end_matches('_');
    if slug.is_empty() {
        "histogram_column.png".to_string()
    } else {
        format!("histogram_{}.png", slug)
    }
}

/// Path of the histogram image for `column` inside `output_dir`
pub fn histogram_path(output_dir: &Path, column: &str) -> PathBuf {
    output_dir.join(histogram_file_name(column))
}

/// Creates a histogram bar chart and saves it as a PNG file
///
/// # Arguments
/// * `histogram` - Bin edges and counts to draw
/// * `title` - Chart title displayed at the top of the plot
/// * `x_label` - Label for the X-axis; the Y-axis is always labelled "Frequency"
/// * `output_path` - Path where the PNG file should be saved
/// * `size` - Image size in pixels (width, height)
///
/// # Chart Properties
/// * Bars: blue at 70% opacity, outlined in black
/// * Grid: Enabled
/// * Y-axis: 0 to just above the tallest bar
pub fn create_histogram_plot(
    histogram: &Histogram,
    title: &str,
    x_label: &str,
    output_path: &Path,
    size: (u32, u32),
) -> Result<()> {
    validate_histogram(histogram)?;

    if size.0 == 0 || size.1 == 0 {
        return Err(PlotError::InvalidData(format!(
            "Plot size {}x{} must be non-zero",
            size.0, size.1
        )));
    }

    let root = BitMapBackend::new(output_path, size);
    let drawing_area = root.into_drawing_area();

    drawing_area
        .fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let x_min = histogram.edges[0];
    let x_max = histogram.edges[histogram.edges.len() - 1];
    // Leave some headroom above the tallest bar; keep a visible axis for all-zero charts.
    let y_max = (histogram.max_count() as f64 * 1.05).max(1.0);

    let mut chart_context = ChartBuilder::on(&drawing_area)
        .caption(title, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart_context
        .configure_mesh()
        .x_desc(x_label)
        .y_desc("Frequency")
        .label_style(("sans-serif", 16))
        .y_label_formatter(&|y| format!("{:.0}", y))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    let bar_style = BLUE.mix(0.7).filled();
    chart_context
        .draw_series(histogram.bins().map(|(low, high, count)| {
            Rectangle::new([(low, 0.0), (high, count as f64)], bar_style)
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    // Outline each bar separately so adjacent bars stay distinguishable.
    chart_context
        .draw_series(histogram.bins().map(|(low, high, count)| {
            Rectangle::new([(low, 0.0), (high, count as f64)], BLACK.stroke_width(1))
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    drawing_area
        .present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

fn validate_histogram(histogram: &Histogram) -> Result<()> {
    if histogram.counts.is_empty() {
        return Err(PlotError::InvalidData(
            "Histogram must have at least one bin".to_string(),
        ));
    }

    if histogram.edges.len() != histogram.counts.len() + 1 {
        return Err(PlotError::InvalidData(format!(
            "Expected {} bin edges for {} bins, got {}",
            histogram.counts.len() + 1,
            histogram.counts.len(),
            histogram.edges.len()
        )));
    }

    Ok(())
}
