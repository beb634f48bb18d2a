use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use librakeeper_client::{FindbookConfig, FindbookFetcher};
use librakeeper_core::config::MongoSection;
use librakeeper_core::models::{BookListing, RequestStatus};
use librakeeper_core::retry::RetryPolicy;
use librakeeper_core::telemetry::{LogFormat, init_tracing};
use librakeeper_core::traits::{ListingFetcher, SearchRequestStore};
use librakeeper_core::{AppError, FileConfig};
use librakeeper_db::{Database, MongoConfig};
use librakeeper_searcher::{SearchOutcome, SearcherHandle};

const DEFAULT_SEARCHER_ADDR: &str = "http://127.0.0.1:44044";
const DEFAULT_SCRAPE_TIMEOUT_SECS: u64 = 20;

#[derive(Parser)]
#[command(name = "librakeeper", version, about = "Librakeeper ISBN search tools")]
struct Cli {
    /// TOML config file; flags and environment variables override it
    #[arg(long, global = true, env = "CONFIG_PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape shop listings for an ISBN directly, bypassing the queue
    Scrape {
        /// ISBN to look up
        #[arg(short, long)]
        isbn: String,

        /// Aggregator base URL [default: https://www.findbook.ru]
        #[arg(long, env = "FINDBOOK_BASE_URL")]
        base_url: Option<String>,

        /// Ceiling for the whole scrape, in seconds [default: 20]
        #[arg(long, env = "SCRAPE_TIMEOUT_SECS")]
        timeout_secs: Option<u64>,

        /// Parse rate-limited pages as served instead of retrying them
        #[arg(long, default_value_t = false)]
        no_retry: bool,
    },

    /// Ask the searcher service for an ISBN
    Search {
        /// ISBN to look up
        #[arg(short, long)]
        isbn: String,

        /// gRPC address of the searcher [default: http://127.0.0.1:44044]
        #[arg(long, env = "SEARCHER_ADDR")]
        searcher_addr: Option<String>,

        /// Keep polling until the search succeeds or fails
        #[arg(short, long, default_value_t = false)]
        wait: bool,

        /// Seconds between polls with --wait
        #[arg(long, default_value_t = 2)]
        poll_interval_secs: u64,

        /// Give up waiting after this many seconds
        #[arg(long, default_value_t = 60)]
        max_wait_secs: u64,
    },

    /// Show the stored search request for an ISBN (needs MONGO_URL or a [mongo] section)
    Status {
        /// ISBN to look up
        #[arg(short, long)]
        isbn: String,
    },
}

/// JSON printed on stdout. `status` is null when nothing is stored.
#[derive(Serialize)]
struct SearchReport<'a> {
    isbn: &'a str,
    status: Option<&'static str>,
    books: &'a [BookListing],
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    init_tracing(LogFormat::Pretty, "librakeeper")?;

    let cli = Cli::parse();
    let file = FileConfig::load_optional(cli.config.as_deref())?;

    match cli.command {
        Commands::Scrape {
            isbn,
            base_url,
            timeout_secs,
            no_retry,
        } => {
            let mut config = FindbookConfig::default().with_timeout(Duration::from_secs(
                timeout_secs
                    .or(file.agent.scrape_timeout_secs)
                    .unwrap_or(DEFAULT_SCRAPE_TIMEOUT_SECS),
            ));
            if let Some(base_url) = base_url.or(file.agent.findbook_base_url) {
                config = config.with_base_url(base_url);
            }
            if no_retry {
                config = config.with_retry_policy(RetryPolicy::none());
            }
            cmd_scrape(&isbn, config).await?
        }
        Commands::Search {
            isbn,
            searcher_addr,
            wait,
            poll_interval_secs,
            max_wait_secs,
        } => {
            let searcher_addr = searcher_addr
                .or(file.server.searcher_addr)
                .unwrap_or_else(|| DEFAULT_SEARCHER_ADDR.to_string());
            let handle = SearcherHandle::connect_lazy(&searcher_addr, Duration::from_secs(10))?;
            let outcome = if wait {
                poll_until_terminal(
                    || handle.search(&isbn),
                    Duration::from_secs(poll_interval_secs),
                    Duration::from_secs(max_wait_secs),
                )
                .await?
            } else {
                handle.search(&isbn).await?
            };
            print_report(&isbn, Some(outcome.status), &outcome.listings)?;
        }
        Commands::Status { isbn } => cmd_status(&isbn, &file.mongo).await?,
    }

    Ok(())
}

async fn cmd_scrape(isbn: &str, config: FindbookConfig) -> Result<()> {
    let fetcher = FindbookFetcher::with_config(config).context("Failed to create HTTP client")?;

    let listings = fetcher.fetch_listings(isbn).await?;
    tracing::info!(%isbn, listings = listings.len(), "Scrape complete");

    print_report(isbn, Some(RequestStatus::Success), &listings)
}

async fn cmd_status(isbn: &str, mongo: &MongoSection) -> Result<()> {
    let db = Database::connect(&MongoConfig::resolve(mongo)?)
        .await
        .context("Failed to connect to MongoDB")?;

    match db.search_repo().get_request(isbn).await? {
        Some(request) => {
            tracing::info!(
                id = %request.id,
                created_at = %request.created_at,
                updated_at = %request.updated_at,
                "Stored search request"
            );
            print_report(isbn, Some(request.status), &request.listings)
        }
        None => {
            tracing::warn!(%isbn, "No search request stored");
            print_report(isbn, None, &[])
        }
    }
}

fn print_report(isbn: &str, status: Option<RequestStatus>, books: &[BookListing]) -> Result<()> {
    println!("{}", render_report(isbn, status, books)?);
    Ok(())
}

fn render_report(
    isbn: &str,
    status: Option<RequestStatus>,
    books: &[BookListing],
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&SearchReport {
        isbn,
        status: status.as_ref().map(RequestStatus::as_str),
        books,
    })
}

/// Call `search` until it reports a terminal status or `max_wait` elapses.
///
/// On timeout the last (pending) outcome is returned with a warning rather
/// than an error: pending is a legitimate answer.
async fn poll_until_terminal<F, Fut>(
    mut search: F,
    interval: Duration,
    max_wait: Duration,
) -> Result<SearchOutcome, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<SearchOutcome, AppError>>,
{
    let deadline = tokio::time::Instant::now() + max_wait;
    loop {
        let outcome = search().await?;
        if outcome.status.is_terminal() {
            return Ok(outcome);
        }
        if tokio::time::Instant::now() + interval > deadline {
            tracing::warn!(waited = ?max_wait, "Search still pending, giving up");
            return Ok(outcome);
        }
        tracing::info!("Search pending, polling again in {interval:?}");
        tokio::time::sleep(interval).await;
    }
}
