use argh::FromArgs;
use listing_histograms::cleaning::SignPolicy;
use listing_histograms::config::ConfigError;
use listing_histograms::{run, PipelineConfig, PipelineError};
use std::path::PathBuf;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Cleans rental listing CSV exports and renders a histogram per numeric column
#[derive(FromArgs, Debug)]
struct Args {
    /// path to a JSON config file whose fields override the built-in defaults
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// input CSV file (repeat for several files, loaded in order)
    #[argh(option, short = 'i')]
    input: Vec<PathBuf>,

    /// directory receiving the histogram images (default: plots)
    #[argh(option, short = 'o')]
    output_dir: Option<PathBuf>,

    /// name of the price column (default: Price)
    #[argh(option)]
    price_column: Option<String>,

    /// how a leading minus on a price is treated: strip, reject or keep (default: strip)
    #[argh(option)]
    sign_policy: Option<SignPolicy>,

    /// rows shown in the table previews (default: 5)
    #[argh(option)]
    preview_rows: Option<usize>,

    /// skip drop-list columns missing from the input instead of failing
    #[argh(switch)]
    allow_missing_drop_columns: bool,

    /// print the bucket tables only, without rendering images
    #[argh(switch)]
    no_plots: bool,

    /// print the effective configuration as JSON and exit
    #[argh(switch)]
    print_config: bool,
}

/// Errors that can occur in the command line tool
#[derive(Error, Debug)]
enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("{0}")]
    Pipeline(#[from] PipelineError),
}

type Result<T> = core::result::Result<T, CliError>;

/// Layers the config file and command line flags over the defaults
fn build_config(args: Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    if !args.input.is_empty() {
        config.input_paths = args.input;
    }
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(price_column) = args.price_column {
        config.price_column = price_column;
    }
    if let Some(sign_policy) = args.sign_policy {
        config.sign_policy = sign_policy;
    }
    if let Some(preview_rows) = args.preview_rows {
        config.preview_rows = preview_rows;
    }
    if args.allow_missing_drop_columns {
        config.allow_missing_drop_columns = true;
    }
    if args.no_plots {
        config.render_plots = false;
    }

    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args: Args = argh::from_env();
    let print_config = args.print_config;
    let config = build_config(args)?;

    if print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let summary = run(&config)?;

    println!("\nSummary");
    println!("=======");
    println!("Rows loaded: {}", summary.rows_loaded);
    println!(
        "Empty rows dropped: {}",
        summary.cleaning.empty_rows_dropped
    );
    println!("Rows without a usable price: {}", summary.cleaning.price.dropped);
    println!("Rows remaining: {}", summary.rows_remaining);
    println!("Histograms: {}", summary.histograms.len());
    for histogram in summary.histograms.iter().filter_map(|h| h.image.as_ref()) {
        println!("  {}", histogram.display());
    }

    Ok(())
}
