//! Lemma-Search main entry point
//!
//! This is the command-line interface for the Lemma-Search site indexer.

use clap::{Parser, Subcommand};
use lemma_search::config::{load_config_with_hash, Config};
use lemma_search::output::{
    collect_statistics, print_search_results, print_site_reports, print_statistics,
};
use lemma_search::storage::open_storage;
use lemma_search::{IndexingService, Lemmatizer, SearchQuery, SharedStorage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Lemma-Search: a site crawler and lemma-based search engine
///
/// Lemma-Search crawls the configured sites, indexes the dictionary forms
/// of the words on every page, and answers ranked free-text queries.
#[derive(Parser, Debug)]
#[command(name = "lemma-search")]
#[command(version = "1.0.0")]
#[command(about = "A site crawler and lemma-based search engine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Re-index every configured site (Ctrl-C stops the run)
    Index,

    /// Fetch and re-index a single page of a configured site
    IndexPage {
        /// Absolute URL of the page
        url: String,
    },

    /// Search the index
    Search {
        /// Query text
        query: String,

        /// Restrict the search to one site
        #[arg(long)]
        site: Option<String>,

        /// Number of results to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Maximum number of results (defaults to the configured limit)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show statistics from the database and exit
    Stats,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Arc::new(cfg)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let storage = open_storage(Path::new(&config.storage.database_path))?;
    let lemmatizer = Lemmatizer::from_config(&config.lemmatizer)?;

    match cli.command {
        Command::Index => handle_index(config, storage, lemmatizer).await?,
        Command::IndexPage { url } => handle_index_page(config, storage, lemmatizer, &url).await?,
        Command::Search {
            query,
            site,
            offset,
            limit,
        } => {
            let limit = limit.unwrap_or(config.search.default_limit);
            handle_search(config, storage, lemmatizer, query, site, offset, limit)?
        }
        Command::Stats => handle_stats(&config, &storage)?,
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("lemma_search=info,warn"),
            1 => EnvFilter::new("lemma_search=debug,info"),
            2 => EnvFilter::new("lemma_search=trace,debug"),
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

/// Handles the index command: runs a full indexing run
async fn handle_index(
    config: Arc<Config>,
    storage: SharedStorage,
    lemmatizer: Lemmatizer,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Indexing {} configured sites", config.sites.len());

    let service = IndexingService::new(config, storage, lemmatizer)?;
    let run = service.start_indexing()?;

    let stopper = service.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping indexing");
            if let Err(e) = stopper.stop_indexing() {
                tracing::warn!("Could not stop indexing: {}", e);
            }
        }
    });

    let reports = run.wait().await?;
    print_site_reports(&reports);

    Ok(())
}

/// Handles the index-page command
async fn handle_index_page(
    config: Arc<Config>,
    storage: SharedStorage,
    lemmatizer: Lemmatizer,
    url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = IndexingService::new(config, storage, lemmatizer)?;

    match service.index_single_page(url).await {
        Ok(()) => {
            println!("✓ Indexed {}", url);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Failed to index {}: {}", url, e);
            Err(e.into())
        }
    }
}

/// Handles the search command
fn handle_search(
    config: Arc<Config>,
    storage: SharedStorage,
    lemmatizer: Lemmatizer,
    text: String,
    site: Option<String>,
    offset: usize,
    limit: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = IndexingService::new(config, storage, lemmatizer)?.search_engine();
    let query = SearchQuery {
        text,
        offset,
        limit,
        site,
    };

    let response = engine.search(&query)?;
    print_search_results(&response, offset);

    Ok(())
}

/// Handles the stats command: shows statistics from the database
fn handle_stats(config: &Config, storage: &SharedStorage) -> Result<(), Box<dyn std::error::Error>> {
    println!("Database: {}\n", config.storage.database_path);

    let stats = collect_statistics(&*storage.lock(), config, false)?;
    print_statistics(&stats);

    Ok(())
}
