use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use tracing::info;

use price_aggregator::{
    export_html, run_ui, App, HtmlOptions, IngestConfig, Ingestor, OutputMode, DEFAULT_OUTPUT,
};

/// Aggregate price list CSVs, search them by name, export everything to HTML
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory with *price*.csv files
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// HTML export path
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Run these searches and exit instead of prompting
    #[arg(short, long = "query")]
    queries: Vec<String>,

    /// JSON file overriding synonym sets and file selection
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print search results as JSON
    #[arg(long)]
    json: bool,

    /// Do not escape names and file names in the HTML export
    #[arg(long)]
    raw_html: bool,

    /// Ingest files in parallel
    #[arg(long)]
    parallel: bool,

    /// Read "12,5" in numeric columns as 12.5
    #[arg(long)]
    decimal_comma: bool,

    /// Skip the HTML export
    #[arg(long)]
    no_export: bool,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let config = match &args.config {
        Some(path) => IngestConfig::from_json_file(path)?,
        None => IngestConfig::default(),
    };
    let parallel = args.parallel || config.parallel;
    let decimal_comma = args.decimal_comma || config.decimal_comma;
    let config = config
        .with_parallel(parallel)
        .with_decimal_comma(decimal_comma);

    // 1. Ingest
    let ingested = Ingestor::new(config)
        .ingest_dir(&args.dir)
        .with_context(|| format!("Failed to scan {}", args.dir.display()))?;
    let catalog = ingested.catalog;

    // 2. Search
    let mode = if args.json {
        OutputMode::Json
    } else {
        OutputMode::Table
    };
    let app = App::new(&catalog).with_mode(mode);

    if args.queries.is_empty() {
        run_ui(&app, io::stdin().lock(), io::stdout())?;
    } else {
        for query in &args.queries {
            println!("{}", app.answer(query)?);
        }
    }

    // 3. Export
    if !args.no_export {
        let options = HtmlOptions {
            escape: !args.raw_html,
        };
        export_html(&catalog, &args.output, options)?;
        info!(path = %args.output.display(), records = catalog.len(), "exported catalog");
    }

    Ok(())
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| anyhow::anyhow!("Invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    Ok(())
}
