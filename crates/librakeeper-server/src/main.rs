use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use librakeeper_core::{FileConfig, shutdown_signal};
use librakeeper_core::telemetry::{LogFormat, init_tracing};
use librakeeper_searcher::SearcherHandle;
use librakeeper_server::routes;
use librakeeper_server::state::AppState;

const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_SEARCHER_ADDR: &str = "http://127.0.0.1:44044";
const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 5;

#[derive(Parser)]
#[command(name = "librakeeper-server", version, about = "HTTP gateway for ISBN search")]
struct Args {
    /// TOML config file; flags and environment variables override it
    #[arg(long, env = "CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Port to listen on [default: 3000]
    #[arg(long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// gRPC address of the searcher [default: http://127.0.0.1:44044]
    #[arg(long, env = "SEARCHER_ADDR")]
    searcher_addr: Option<String>,

    /// Deadline for one searcher call, in seconds [default: 5]
    #[arg(long, env = "SEARCH_TIMEOUT_SECS")]
    search_timeout_secs: Option<u64>,

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
    init_tracing(file.resolve_log_format(args.log_format, &env), "librakeeper_server")?;

    let server = file.server;
    let port = args.port.or(server.port).unwrap_or(DEFAULT_SERVER_PORT);
    let searcher_addr = args
        .searcher_addr
        .or(server.searcher_addr)
        .unwrap_or_else(|| DEFAULT_SEARCHER_ADDR.to_string());
    let search_timeout_secs = args
        .search_timeout_secs
        .or(server.search_timeout_secs)
        .unwrap_or(DEFAULT_SEARCH_TIMEOUT_SECS);

    let searcher =
        SearcherHandle::connect_lazy(&searcher_addr, Duration::from_secs(search_timeout_secs))?;
    let state = Arc::new(AppState::new(searcher));

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(searcher = %searcher_addr, "Starting server on {addr}");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
