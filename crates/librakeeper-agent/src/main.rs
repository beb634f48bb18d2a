use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use librakeeper_client::{FindbookConfig, FindbookFetcher};
use librakeeper_core::job::{AckMode, WorkerConfig};
use librakeeper_core::telemetry::{LogFormat, init_tracing};
use librakeeper_core::{
    FileConfig, SearchJobHandler, TracingWorkerReporter, WorkerService, shutdown_signal,
};
use librakeeper_db::{Database, MongoConfig};
use librakeeper_queue::{RabbitConfig, RabbitConnection};

const DEFAULT_SCRAPE_TIMEOUT_SECS: u64 = 20;

#[derive(Parser)]
#[command(name = "searcher-agent", version, about = "Scrapes queued ISBN searches")]
struct Args {
    /// TOML config file; flags and environment variables override it
    #[arg(long, env = "CONFIG_PATH")]
    config: Option<PathBuf>,

    /// When the broker may forget a job: on-delivery or after-handling [default: on-delivery]
    #[arg(long, env = "ACK_MODE")]
    ack_mode: Option<AckMode>,

    /// Aggregator base URL [default: https://www.findbook.ru]
    #[arg(long, env = "FINDBOOK_BASE_URL")]
    findbook_base_url: Option<String>,

    /// Ceiling for one whole scrape, in seconds [default: 20]
    #[arg(long, env = "SCRAPE_TIMEOUT_SECS")]
    scrape_timeout_secs: Option<u64>,

    /// Worker ID (defaults to a random one)
    #[arg(long, env = "WORKER_ID")]
    worker_id: Option<String>,

    /// Deployment environment; `local` logs human-readable output
    #[arg(long, env = "APP_ENV")]
    env: Option<String>,

    /// Log output: pretty or json [default: by environment]
    #[arg(long, env = "LOG_FORMAT")]
    log_format: Option<LogFormat>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    let file = FileConfig::load_optional(args.config.as_deref())?;

    let env = file.environment(args.env);
    init_tracing(file.resolve_log_format(args.log_format, &env), "searcher_agent")?;

    let agent = file.agent;
    let ack_mode = args.ack_mode.or(agent.ack_mode).unwrap_or_default();

    let mut worker_config = WorkerConfig::default();
    if let Some(id) = args.worker_id.or(agent.worker_id) {
        worker_config = worker_config.with_worker_id(id);
    }

    let mut fetcher_config = FindbookConfig::default().with_timeout(Duration::from_secs(
        args.scrape_timeout_secs
            .or(agent.scrape_timeout_secs)
            .unwrap_or(DEFAULT_SCRAPE_TIMEOUT_SECS),
    ));
    if let Some(base_url) = args.findbook_base_url.or(agent.findbook_base_url) {
        fetcher_config = fetcher_config.with_base_url(base_url);
    }
    let fetcher = FindbookFetcher::with_config(fetcher_config)?;

    let db = Database::connect(&MongoConfig::resolve(&file.mongo)?)
        .await
        .context("Failed to connect to MongoDB")?;
    let store = db.search_repo();

    let rabbit = RabbitConnection::connect(&RabbitConfig::resolve(&file.rabbit)?)
        .await
        .context("Failed to connect to RabbitMQ")?;
    let consumer = rabbit
        .consumer(ack_mode, &worker_config.worker_id)
        .await
        .context("Failed to start consuming")?;

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_cancel.cancel();
    });

    let handler = SearchJobHandler::new(fetcher, store);
    let mut worker = WorkerService::new(consumer, handler, worker_config);
    let outcome = worker.run(cancel, &TracingWorkerReporter).await;

    if rabbit.is_connected()
        && let Err(e) = rabbit.close().await
    {
        tracing::warn!(error = %e, "Failed to close RabbitMQ connection cleanly");
    }

    outcome.context("Worker stopped on a broken delivery stream")
}
