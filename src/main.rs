//! seedcrawl main entry point
//!
//! This is the command-line interface for the seedcrawl document harvester.

use anyhow::{bail, Context, Result};
use clap::Parser;
use seedcrawl::config::{self, Config};
use seedcrawl::{Coordinator, CrawlResult};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// seedcrawl: a same-site document harvester
///
/// Crawls each seed URL, follows links on the same site up to a depth and
/// link budget, and collects the HTML and PDF documents it finds. Payloads,
/// redirects and failing URLs are cached between runs.
#[derive(Parser, Debug)]
#[command(name = "seedcrawl")]
#[command(version)]
#[command(about = "A same-site document harvester", long_about = None)]
struct Cli {
    /// Seed URLs to crawl; `http://` is assumed when no scheme is given
    #[arg(value_name = "SEED")]
    seeds: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Read additional seeds from a file, one per line
    #[arg(long, value_name = "FILE")]
    seeds_file: Option<PathBuf>,

    /// Override crawler.max-depth
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Override crawler.max-links
    #[arg(long, value_name = "N")]
    max_links: Option<usize>,

    /// Write every document to DIR/<seed-index>/<position>.html|pdf
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_effective_config(&cli)?;

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet, config.crawler.verbose);

    let seeds = collect_seeds(&cli, &config)?;
    config::validate_seeds(&seeds)?;
    config.seeds = seeds;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config, cli.output.as_deref()).await
}

/// Loads the configuration file (or defaults) and applies CLI overrides
fn load_effective_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => config::load_config(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => {
            let mut config = Config::default();
            config::apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
            config
        }
    };

    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(max_links) = cli.max_links {
        config.crawler.max_links = Some(max_links);
    }

    config::validate(&config)?;
    Ok(config)
}

/// Seeds from the command line and the seeds file win over the config file
fn collect_seeds(cli: &Cli, config: &Config) -> Result<Vec<String>> {
    let mut seeds = cli.seeds.clone();

    if let Some(path) = &cli.seeds_file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seeds file {}", path.display()))?;
        seeds.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_string),
        );
    }

    if seeds.is_empty() {
        seeds = config.seeds.clone();
    }

    if seeds.is_empty() {
        bail!("No seeds given: pass URLs, --seeds-file, or set `seeds` in the config file");
    }

    Ok(seeds)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool, config_verbose: bool) {
    let level = if config_verbose { verbose.max(1) } else { verbose };

    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match level {
            0 => EnvFilter::new("seedcrawl=info,warn"),
            1 => EnvFilter::new("seedcrawl=debug,info"),
            2 => EnvFilter::new("seedcrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration and seeds
fn handle_dry_run(config: &Config) {
    println!("=== seedcrawl Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    match config.crawler.max_links {
        Some(max_links) => println!("  Max links per seed: {}", max_links),
        None => println!("  Max links per seed: unlimited"),
    }
    println!("  Request timeout: {}s", config.crawler.request_timeout);
    println!("  Concurrent seeds: {}", config.crawler.concurrency);
    println!("  User agent: {}", config.crawler.user_agent);

    println!("\nStorage:");
    println!("  Backend: {}", config.storage.backend);
    println!("  Filesystem path: {}", config.storage.path.display());
    println!("  Database: {}", config.storage.database_path.display());

    println!("\nResults:");
    if config.results.cache_enabled {
        println!("  Result cache: {}", config.results.cache_path.display());
    } else {
        println!("  Result cache: disabled");
    }
    println!("  Keep results in memory: {}", config.results.append);

    println!("\nSeeds ({}):", config.seeds.len());
    for seed in &config.seeds {
        println!("  - {}", seedcrawl::ensure_scheme(seed));
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, output: Option<&Path>) -> Result<()> {
    let seeds = config.seeds.clone();
    tracing::info!(
        "Crawling {} seeds with {} backend",
        seeds.len(),
        config.storage.backend
    );

    let coordinator = Coordinator::new(config).context("Failed to initialize crawler")?;

    let mut write_failures = 0usize;
    let summary = coordinator
        .crawl_each(&seeds, |index, result| {
            print_seed_summary(index, &result);
            if let Some(dir) = output {
                if let Err(e) = write_documents(dir, index, &result) {
                    tracing::error!("Failed to write documents of {}: {:#}", result.seed, e);
                    write_failures += 1;
                }
            }
        })
        .await;

    println!(
        "\n{} seeds, {} documents ({} failed, {} from result cache)",
        summary.seeds, summary.documents, summary.failed, summary.cached
    );

    if write_failures > 0 {
        bail!("Writing documents failed for {} seeds", write_failures);
    }

    Ok(())
}

fn print_seed_summary(index: usize, result: &CrawlResult) {
    let pdfs = result.documents.iter().filter(|d| d.is_pdf()).count();
    println!(
        "[{}] {}: {} documents, {} bytes, {} PDFs",
        index + 1,
        result.seed,
        result.documents.len(),
        result.total_bytes(),
        pdfs
    );
}

/// Writes a seed's documents to `<dir>/<index>/<position>.html|pdf`
fn write_documents(dir: &Path, index: usize, result: &CrawlResult) -> Result<()> {
    let seed_dir = dir.join(index.to_string());
    std::fs::create_dir_all(&seed_dir)
        .with_context(|| format!("Failed to create {}", seed_dir.display()))?;

    for (position, document) in result.documents.iter().enumerate() {
        let extension = if document.is_pdf() { "pdf" } else { "html" };
        let path = seed_dir.join(format!("{}.{}", position, extension));
        std::fs::write(&path, &document.body)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(())
}
