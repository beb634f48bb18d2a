use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tonic::transport::Server;

use librakeeper_core::{FileConfig, SearchService};
use librakeeper_core::shutdown_signal;
use librakeeper_core::telemetry::{LogFormat, init_tracing};
use librakeeper_db::{Database, MongoConfig};
use librakeeper_queue::{RabbitConfig, RabbitConnection};
use librakeeper_searcher::SearcherGrpc;
use librakeeper_searcher::proto::searcher_server::SearcherServer;

const DEFAULT_GRPC_PORT: u16 = 44044;
const DEFAULT_GRPC_TIMEOUT_SECS: u64 = 10;

#[derive(Parser)]
#[command(name = "searcher", version, about = "gRPC ISBN search service")]
struct Args {
    /// TOML config file; flags and environment variables override it
    #[arg(long, env = "CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Port to serve gRPC on [default: 44044]
    #[arg(long, env = "GRPC_PORT")]
    port: Option<u16>,

    /// Per-request deadline in seconds [default: 10]
    #[arg(long, env = "GRPC_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

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
    init_tracing(file.resolve_log_format(args.log_format, &env), "searcher")?;

    let port = args.port.or(file.grpc.port).unwrap_or(DEFAULT_GRPC_PORT);
    let timeout_secs = args
        .timeout_secs
        .or(file.grpc.timeout_secs)
        .unwrap_or(DEFAULT_GRPC_TIMEOUT_SECS);

    let db = Database::connect(&MongoConfig::resolve(&file.mongo)?)
        .await
        .context("Failed to connect to MongoDB")?;
    let store = db.search_repo();
    store
        .ensure_indexes()
        .await
        .context("Failed to create store indexes")?;

    let rabbit = RabbitConnection::connect(&RabbitConfig::resolve(&file.rabbit)?)
        .await
        .context("Failed to connect to RabbitMQ")?;
    let publisher = rabbit
        .publisher()
        .await
        .context("Failed to open publishing channel")?;

    let searcher = SearcherGrpc::new(SearchService::new(store, publisher));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, queue = %rabbit.queue_name(), "Starting gRPC server");

    Server::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .trace_fn(|request| tracing::info_span!("grpc", path = %request.uri().path()))
        .add_service(SearcherServer::new(searcher))
        .serve_with_shutdown(addr, shutdown_signal())
        .await
        .context("gRPC server failed")?;

    if rabbit.is_connected()
        && let Err(e) = rabbit.close().await
    {
        tracing::warn!(error = %e, "Failed to close RabbitMQ connection cleanly");
    }
    tracing::info!("Searcher stopped");
    Ok(())
}
