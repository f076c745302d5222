//! Spidey main entry point
//!
//! This is the command-line interface for the Spidey breadth-first crawler.

use anyhow::Context;
use clap::Parser;
use spidey::config::{load_config_with_hash, validate_seed_url, Config};
use spidey::crawler::{AlwaysContinue, Continuation, CrawlEngine, EngineSettings, StopAfter};
use spidey::fetcher::HttpFetcher;
use spidey::output::{load_statistics, print_pages, print_report, print_statistics};
use spidey::storage::{open_store, CrawlStore};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Spidey: a resumable breadth-first web crawler
///
/// Spidey crawls outward from a seed URL, records the most frequent words of
/// every page it visits, and checkpoints its progress to SQLite so that the
/// next run picks up where the last one stopped.
#[derive(Parser, Debug)]
#[command(name = "spidey")]
#[command(version = "1.0.0")]
#[command(about = "A resumable breadth-first web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Override the seed URL from the configuration file
    #[arg(long, value_name = "URL")]
    seed: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Discard the stored frontier and page records before crawling
    #[arg(long)]
    fresh: bool,

    /// Never ask at checkpoints; crawl until the frontier is exhausted
    #[arg(short, long, conflicts_with = "stop_after")]
    yes: bool,

    /// Pause at the first checkpoint after this many pages
    #[arg(long, value_name = "PAGES", conflicts_with = "yes")]
    stop_after: Option<u64>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["stats", "search"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "search"])]
    stats: bool,

    /// List stored pages whose keywords include WORD and exit
    #[arg(long, value_name = "WORD", conflicts_with_all = ["dry_run", "stats"])]
    search: Option<String>,
}

/// Continuation chosen on the command line
enum CliContinuation {
    Prompt,
    Always(AlwaysContinue),
    StopAfter(StopAfter),
}

impl CliContinuation {
    fn from_cli(cli: &Cli) -> Self {
        match (cli.yes, cli.stop_after) {
            (true, _) => Self::Always(AlwaysContinue),
            (false, Some(limit)) => Self::StopAfter(StopAfter::new(limit)),
            (false, None) => Self::Prompt,
        }
    }
}

impl Continuation for CliContinuation {
    fn should_continue(&mut self, pages_crawled: u64) -> bool {
        match self {
            Self::Always(c) => c.should_continue(pages_crawled),
            Self::StopAfter(c) => c.should_continue(pages_crawled),
            Self::Prompt => tokio::task::block_in_place(|| prompt_continue(pages_crawled)),
        }
    }
}

/// Asks on stdin whether to keep crawling; end of input means stop
fn prompt_continue(pages_crawled: u64) -> bool {
    print!("{} pages crawled and saved. Continue? [Y/n] ", pages_crawled);
    if std::io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    match std::io::stdin().read_line(&mut answer) {
        Ok(0) | Err(_) => false,
        Ok(_) => !matches!(answer.trim().to_ascii_lowercase().as_str(), "n" | "no"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(seed) = &cli.seed {
        validate_seed_url(seed).context("Invalid --seed")?;
        tracing::info!("Seed overridden on the command line: {}", seed);
        config.crawler.seed_url = seed.clone();
    }

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if let Some(word) = &cli.search {
        handle_search(&config, word)?;
    } else {
        let continuation = CliContinuation::from_cli(&cli);
        handle_crawl(config, config_hash, cli.fresh, continuation).await?;
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
            0 => EnvFilter::new("spidey=info,warn"),
            1 => EnvFilter::new("spidey=debug,info"),
            2 => EnvFilter::new("spidey=trace,debug"),
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

fn database_path(config: &Config) -> &Path {
    Path::new(&config.output.database_path)
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Spidey Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Seed URL: {}", config.crawler.seed_url);
    println!("  Checkpoint interval: {} pages", config.crawler.checkpoint_interval);
    println!("  Keywords per page: {}", config.crawler.keyword_count);
    println!("  Fetch timeout: {}s", config.crawler.fetch_timeout_secs);
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    println!("  Identity policy: {}", config.crawler.identity.as_str());

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.user_agent_string());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    let path = database_path(config);
    if path.exists() {
        let store = open_store(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        println!(
            "\n✓ Would resume: {} URLs queued, {} pages already visited",
            store.count_queued()?,
            store.count_pages()?
        );
    } else {
        println!("\n✓ Would start a new crawl from {}", config.crawler.seed_url);
    }

    println!("✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let path = database_path(config);
    println!("Database: {}\n", path.display());

    let store =
        open_store(path).with_context(|| format!("Failed to open database {}", path.display()))?;
    let stats = load_statistics(&store).context("Failed to load statistics")?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --search mode: lists pages carrying a keyword
fn handle_search(config: &Config, word: &str) -> anyhow::Result<()> {
    let path = database_path(config);
    let store =
        open_store(path).with_context(|| format!("Failed to open database {}", path.display()))?;

    let pages = store
        .find_pages_by_keyword(word)
        .with_context(|| format!("Failed to search for '{}'", word))?;
    print_pages(&format!("Pages with keyword '{}'", word), &pages);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    config_hash: String,
    fresh: bool,
    continuation: CliContinuation,
) -> anyhow::Result<()> {
    let path = database_path(&config);
    let mut store =
        open_store(path).with_context(|| format!("Failed to open database {}", path.display()))?;

    if fresh {
        tracing::info!("Starting fresh crawl (discarding previous state)");
        store.reset().context("Failed to clear previous crawl state")?;
    } else {
        tracing::info!("Starting crawl (will resume from the last checkpoint)");
    }

    let fetcher = HttpFetcher::from_config(&config).context("Failed to build HTTP client")?;
    let settings = EngineSettings::from_config(&config, config_hash);
    let mut engine = CrawlEngine::new(fetcher, store, continuation, settings);

    // Ctrl-C pauses at the next batch boundary instead of killing the process
    let stop = engine.stop_signal();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, pausing after the current batch");
            stop.trigger();
        }
    });

    match engine.run().await {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl aborted: {}", e);
            Err(e).context("Crawl aborted")
        }
    }
}
