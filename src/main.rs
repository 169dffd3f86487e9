//! Canton crawler main entry point
//!
//! This is the command-line interface for crawling the site and for the
//! batch extraction pass over saved pages.

use anyhow::{Context, Result};
use canton_crawler::config::{load_config_with_hash, load_sections, Config};
use canton_crawler::crawler::crawl;
use canton_crawler::output::{discover_files, extract_batch, print_statistics, write_results, OutputFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Canton crawler: crawls one site and extracts clean page text
///
/// The crawler follows links breadth-first from a list of sections, stores
/// linked documents with content-based deduplication and writes per-section
/// text. The extractor turns saved HTML pages into a single text, markdown
/// or JSON Lines file.
#[derive(Parser, Debug)]
#[command(name = "canton-crawler")]
#[command(version = "1.0.0")]
#[command(about = "Single-site crawler and content extractor", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the site described by a TOML configuration file
    Crawl {
        /// Path to TOML configuration file
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Cap the number of visited links at N and write under test_results/
        #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
        test: Option<u64>,

        /// Validate config and show what would be crawled without crawling
        #[arg(long)]
        dry_run: bool,
    },

    /// Extract main content from saved HTML files into one output file
    Extract {
        /// Input directory
        #[arg(long = "in", value_name = "DIR")]
        input_dir: PathBuf,

        /// Output file path
        #[arg(long, value_name = "FILE")]
        out_file: PathBuf,

        /// Glob pattern for input files, relative to the input directory
        #[arg(long, default_value = "**/*.html")]
        glob: String,

        /// Output format: txt, md or jsonl
        #[arg(long, default_value = "txt")]
        format: OutputFormat,

        /// Encoding of the input files
        #[arg(long, default_value = "utf-8")]
        encoding: String,

        /// Number of extraction threads (defaults to the number of CPUs)
        #[arg(long)]
        workers: Option<usize>,

        /// Enable debug logging
        #[arg(long)]
        debug: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Crawl {
            config,
            test,
            dry_run,
        } => {
            setup_logging(cli.verbose, cli.quiet);
            handle_crawl(config, test, dry_run).await
        }
        Command::Extract {
            input_dir,
            out_file,
            glob,
            format,
            encoding,
            workers,
            debug,
        } => {
            let verbose = if debug { cli.verbose.max(1) } else { cli.verbose };
            setup_logging(verbose, cli.quiet && !debug);

            let workers = workers.unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            });
            tokio::task::spawn_blocking(move || {
                handle_extract(input_dir, out_file, &glob, format, &encoding, workers)
            })
            .await
            .context("Extraction task panicked")?
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("canton_crawler=info,warn"),
            1 => EnvFilter::new("canton_crawler=debug,info"),
            2 => EnvFilter::new("canton_crawler=trace,debug"),
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

/// Handles the crawl subcommand
async fn handle_crawl(config_path: PathBuf, test: Option<u64>, dry_run: bool) -> Result<()> {
    tracing::info!("Loading configuration from: {}", config_path.display());
    let (mut config, hash) = load_config_with_hash(&config_path)
        .with_context(|| format!("Failed to load configuration {}", config_path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if let Some(max_links) = test {
        config = config.into_test_mode(max_links as usize);
        tracing::info!(
            "Test mode: visiting at most {} links, writing under {}",
            max_links,
            config.output.root.display()
        );
    }

    if dry_run {
        return handle_dry_run(&config);
    }

    let stats = crawl(config).await.context("Crawl failed")?;
    print_statistics(&stats);
    Ok(())
}

/// Handles --dry-run: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> Result<()> {
    let sections = load_sections(&config.crawler.sections_file).with_context(|| {
        format!(
            "Failed to read sections file {}",
            config.crawler.sections_file.display()
        )
    })?;

    println!("=== Canton Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", config.crawler.base_url);
    println!("  Workers: {}", config.crawler.max_workers);
    match config.crawler.max_links {
        Some(max) => println!("  Max links: {}", max),
        None => println!("  Max links: unlimited"),
    }
    println!("  Same host only: {}", config.crawler.same_host_only);
    println!(
        "  Document extensions: {}",
        config.crawler.document_extensions.join(", ")
    );

    println!("\nFetch:");
    println!("  User agent: {}", config.fetch.user_agent);
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!(
        "  Attempts: {} (base delay {}ms)",
        config.fetch.retries, config.fetch.base_delay_ms
    );

    if let Some(auth) = &config.auth {
        println!("\nLogin:");
        println!("  URL: {}", auth.login_url);
        println!("  Credentials: {}", auth.credentials_path.display());
    }

    println!("\nOutput:");
    println!("  Documents: {}", config.output.documents_path().display());
    println!("  Texts: {}", config.output.texts_path().display());
    if let Some(pages) = config.output.pages_path() {
        println!("  Pages: {}", pages.display());
    }

    println!("\nSections ({}):", sections.len());
    for section in &sections {
        println!("  - {}", section);
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the extract subcommand
fn handle_extract(
    input_dir: PathBuf,
    out_file: PathBuf,
    pattern: &str,
    format: OutputFormat,
    encoding: &str,
    workers: usize,
) -> Result<()> {
    let files = discover_files(&input_dir, pattern)
        .with_context(|| format!("Failed to list {}", input_dir.display()))?;
    if files.is_empty() {
        tracing::info!("No files found for pattern {}", pattern);
        return Ok(());
    }

    tracing::info!("Extracting {} files with {} workers", files.len(), workers);
    let mut results = extract_batch(files, encoding, workers)?;

    write_results(&mut results, &out_file, format)
        .with_context(|| format!("Failed to write {}", out_file.display()))?;
    tracing::info!("Wrote {} entries to {}", results.len(), out_file.display());
    Ok(())
}
