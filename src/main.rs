use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use hostmapper::cli::Cli;
use hostmapper::config::{AppConfig, ConfigError};
use hostmapper::enrich::Enricher;
use hostmapper::{aggregate, export, extractor};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.init {
        let path = AppConfig::create_default_config()?;
        println!("✅ Created default configuration file at: {}", path.display());
        println!("   Edit this file to customize settings, then run hostmapper again.");
        return Ok(());
    }

    let mut config = match AppConfig::load() {
        Ok(config) => config,
        Err(ConfigError::FileNotFound(path)) => {
            debug!(
                "No configuration file at {}, using built-in defaults (run --init to create one)",
                path.display()
            );
            AppConfig::embedded_default()?
        }
        Err(e) => return Err(e.into()),
    };
    if let Some(top_domains) = cli.top_domains {
        config.enrichment.top_domains = top_domains;
    }
    if let Some(delay_ms) = cli.delay_ms {
        config.enrichment.inter_domain_delay_ms = delay_ms;
    }

    // required_unless_present on --init guarantees this is set here.
    let input = cli.input.context("no bookmark export file given")?;
    let html = fs::read_to_string(&input)
        .with_context(|| format!("failed to read bookmark export {}", input.display()))?;

    let bookmarks = extractor::extract_bookmarks(&html);
    info!("Extracted {} bookmarks from {}", bookmarks.len(), input.display());

    let domain_counts = aggregate::count_domains(&bookmarks);
    let folder_counts = aggregate::count_domains_by_folder(&bookmarks);
    info!("Found {} distinct domains", domain_counts.len());

    fs::create_dir_all(&cli.output_dir).with_context(|| {
        format!("failed to create output directory {}", cli.output_dir.display())
    })?;

    let bookmarks_path = cli.output_dir.join(&config.output.bookmarks_file);
    export::export_bookmarks_csv(&bookmarks, &bookmarks_path)
        .with_context(|| format!("failed to write {}", bookmarks_path.display()))?;
    println!("Saved: {}", bookmarks_path.display());

    let domains_path = cli.output_dir.join(&config.output.domains_file);
    export::export_domain_counts_csv(&domain_counts, &domains_path)
        .with_context(|| format!("failed to write {}", domains_path.display()))?;
    println!("Saved: {}", domains_path.display());

    let by_folder_path = cli.output_dir.join(&config.output.domains_by_folder_file);
    export::export_domain_folder_csv(&folder_counts, &by_folder_path)
        .with_context(|| format!("failed to write {}", by_folder_path.display()))?;
    println!("Saved: {}", by_folder_path.display());

    let enriched = if cli.skip_enrichment {
        info!("Skipping enrichment (--skip-enrichment)");
        None
    } else {
        let enricher = Enricher::from_config(&config)?;
        let records = enricher.enrich_domains(&domain_counts).await;

        let hostmap_path = cli.output_dir.join(&config.output.hostmap_file);
        export::export_hostmap_csv(&records, &hostmap_path)
            .with_context(|| format!("failed to write {}", hostmap_path.display()))?;
        println!("Saved: {}", hostmap_path.display());
        Some(records)
    };

    export::print_run_summary(&bookmarks, &domain_counts, enriched.as_deref());
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_directive = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive.into()),
        )
        .with_target(false)
        .init();
}
