//! Exports a document directory as a CSV catalog.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use disclosure_core::catalog::{catalog_directory, write_catalog};
use tracing::info;

/// Catalog downloaded disclosure documents.
///
/// Splits every `<code>_<company>_<title>_<timestamp>.txt` filename in the
/// directory into columns and writes them as CSV.
#[derive(Parser, Debug)]
#[command(name = "disclosure-catalog")]
#[command(author, version, about)]
struct Args {
    /// Directory of downloaded documents
    #[arg(default_value = "docs")]
    dir: PathBuf,

    /// CSV file to write
    #[arg(short, long, default_value = "df.csv")]
    output: PathBuf,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let entries = catalog_directory(&args.dir)
        .with_context(|| format!("failed to catalog {}", args.dir.display()))?;

    let file = File::create(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    write_catalog(BufWriter::new(file), &entries)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    info!(
        entries = entries.len(),
        output = %args.output.display(),
        "catalog written"
    );
    Ok(())
}
