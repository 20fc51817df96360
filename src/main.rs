//! DisamWiki main entry point
//!
//! This is the command-line interface for the DisamWiki disambiguation crawler.

use clap::Parser;
use disamwiki::config::{load_config_with_hash, validate, Config};
use disamwiki::crawler::{crawl, CrawlOutcome};
use disamwiki::output::write_output;
use disamwiki::{DisamError, HttpWikiApi};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// DisamWiki: a Wikipedia disambiguation crawler
///
/// Starting from "<TERM> (disambiguation)", DisamWiki follows the links of every
/// page breadth-first down to a fixed number of levels and writes each page's
/// plain text into a folder hierarchy that mirrors the links followed.
#[derive(Parser, Debug)]
#[command(name = "disamwiki")]
#[command(version)]
#[command(about = "Crawl a Wikipedia disambiguation page into a folder tree", long_about = None)]
struct Cli {
    /// Term whose disambiguation page is crawled
    #[arg(value_name = "TERM")]
    term: String,

    /// Levels to descend below the disambiguation page [default: 2]
    #[arg(short = 'l', long, value_name = "N")]
    num_levels: Option<usize>,

    /// Links to follow from the disambiguation page [default: all]
    #[arg(short = 'd', long, value_name = "N")]
    num_disambig_links: Option<usize>,

    /// Links to follow from every other page [default: 5]
    #[arg(short = 'p', long, value_name = "N")]
    num_page_links: Option<usize>,

    /// Replace files that already exist
    #[arg(short, long)]
    overwrite: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory to write the page hierarchy under [default: .]
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Number of concurrent fetch workers [default: 15]
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Also write a Graphviz rendering of the tree to FILE
    #[arg(long, value_name = "FILE")]
    graph: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress progress and non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(code) => code,
        Err(DisamError::FileCollision { path }) => {
            eprintln!("File exists: {}", path.display());
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
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
            0 => EnvFilter::new("disamwiki=warn"),
            1 => EnvFilter::new("disamwiki=info,warn"),
            2 => EnvFilter::new("disamwiki=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the effective configuration: file (or defaults) overridden by flags
fn load_settings(cli: &Cli) -> Result<Config, DisamError> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(levels) = cli.num_levels {
        config.crawler.max_depth = levels;
    }
    if let Some(links) = cli.num_disambig_links {
        config.crawler.disambig_links = Some(links);
    }
    if let Some(links) = cli.num_page_links {
        config.crawler.page_links = links;
    }
    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.clone();
    }
    if let Some(graph) = &cli.graph {
        config.output.graph_path = Some(graph.clone());
    }
    if cli.overwrite {
        config.output.overwrite = true;
    }
    if cli.quiet {
        config.crawler.progress = false;
    }

    validate(&config)?;
    Ok(config)
}

/// Handles the main crawl operation
async fn run(cli: Cli) -> Result<ExitCode, DisamError> {
    let config = load_settings(&cli)?;
    let api = Arc::new(HttpWikiApi::new(&config)?);

    match crawl(&config, api, &cli.term).await? {
        CrawlOutcome::NotFound { term } => {
            println!("No disambiguation page was found for {}", term);
            Ok(ExitCode::SUCCESS)
        }
        CrawlOutcome::Completed { tree, .. } => {
            let files = write_output(&tree, &config.output)?;
            tracing::info!("Crawl of '{}' written to {} files", cli.term, files.len());
            Ok(ExitCode::SUCCESS)
        }
    }
}
