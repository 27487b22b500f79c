//! CLI entry point for the disclosure downloader.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use disclosure_core::QueryCoordinator;
use disclosure_core::config::{FileConfig, load_file_config, resolve_default_config_path};
use tracing::{debug, info, warn};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let file_config = load_config_file(args.config.as_deref())?;
    let config = args
        .into_run_config(file_config)
        .context("invalid configuration")?;

    info!(
        terms = config.terms.len(),
        article_type = %config.search.article_type,
        search_field = %config.search.search_field,
        threads = config.threads,
        output_dir = %config.output_dir.display(),
        "disclosure-dl starting"
    );

    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| format!("failed to create {}", config.output_dir.display()))?;

    let started = Instant::now();
    let coordinator = QueryCoordinator::from_config(&config)?;
    let summary = coordinator.run(&config.terms, &config.search).await?;

    for term in &summary.failed_terms {
        warn!(term = %term, "query term did not finish; re-run it to resume");
    }

    let files_on_disk = count_documents(&config.output_dir).await;
    info!(
        terms = summary.terms,
        failed_terms = summary.failed_terms.len(),
        pages = summary.stats.pages,
        records = summary.stats.records,
        filtered_out = summary.stats.filtered_out,
        extraction_failures = summary.stats.extraction_failures,
        downloaded = summary.stats.downloaded,
        skipped = summary.stats.skipped,
        failed = summary.stats.failed,
        files_on_disk,
        elapsed_ms = started.elapsed().as_millis(),
        "Run complete"
    );

    Ok(())
}

/// Loads the explicit config file, or the default one if it exists.
fn load_config_file(explicit: Option<&Path>) -> Result<FileConfig> {
    if let Some(path) = explicit {
        return load_file_config(path)
            .with_context(|| format!("failed to load config file {}", path.display()));
    }

    match resolve_default_config_path() {
        Some(path) if path.is_file() => {
            debug!(path = %path.display(), "loading default config file");
            load_file_config(&path)
                .with_context(|| format!("failed to load config file {}", path.display()))
        }
        _ => Ok(FileConfig::default()),
    }
}

/// Counts `.txt` files in the output directory.
async fn count_documents(dir: &Path) -> usize {
    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return 0;
    };
    let mut count = 0;
    while let Ok(Some(entry)) = entries.next_entry().await {
        if entry.path().extension().is_some_and(|ext| ext == "txt") {
            count += 1;
        }
    }
    count
}
