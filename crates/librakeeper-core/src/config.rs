use std::path::Path;

use serde::Deserialize;

use crate::error::AppError;
use crate::job::AckMode;
use crate::telemetry::LogFormat;

pub const DEFAULT_ENV: &str = "local";

/// Settings read from a TOML file given by `--config` / `CONFIG_PATH`.
///
/// Every binary reads the same file shape and picks the sections it needs,
/// so one file can describe a whole deployment. Each value is optional:
/// environment variables and command-line flags override it, and built-in
/// defaults fill whatever is left.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub env: Option<String>,
    pub log_format: Option<LogFormat>,
    pub grpc: GrpcSection,
    pub agent: AgentSection,
    pub server: ServerSection,
    pub mongo: MongoSection,
    pub rabbit: RabbitSection,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrpcSection {
    pub port: Option<u16>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentSection {
    pub ack_mode: Option<AckMode>,
    pub worker_id: Option<String>,
    pub findbook_base_url: Option<String>,
    pub scrape_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub port: Option<u16>,
    pub searcher_addr: Option<String>,
    pub search_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MongoSection {
    pub url: Option<String>,
    pub database: Option<String>,
    pub collection: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RabbitSection {
    pub url: Option<String>,
    pub queue_name: Option<String>,
}

impl FileConfig {
    /// Deployment environment: flag or `APP_ENV`, then the file, then `local`.
    pub fn environment(&self, cli: Option<String>) -> String {
        cli.or_else(|| self.env.clone())
            .unwrap_or_else(|| DEFAULT_ENV.to_string())
    }

    /// Log format: flag or `LOG_FORMAT`, then the file, then whatever suits
    /// the environment.
    pub fn resolve_log_format(&self, cli: Option<LogFormat>, env: &str) -> LogFormat {
        cli.or(self.log_format)
            .unwrap_or_else(|| LogFormat::for_environment(env))
    }

    /// Load the file at `path`, or an empty config when no path was given.
    pub fn load_optional(path: Option<&Path>) -> Result<Self, AppError> {
        match path {
            Some(path) => load_config(path),
            None => Ok(Self::default()),
        }
    }
}

/// Read, parse and validate a config file.
pub fn load_config(path: &Path) -> Result<FileConfig, AppError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AppError::ConfigError(format!("Failed to read config file {}: {e}", path.display()))
    })?;

    let config: FileConfig = toml::from_str(&content).map_err(|e| {
        AppError::ConfigError(format!("Invalid config file {}: {e}", path.display()))
    })?;

    validate(&config)?;
    tracing::debug!(path = %path.display(), "Loaded config file");
    Ok(config)
}

fn validate(config: &FileConfig) -> Result<(), AppError> {
    let ports = [
        ("grpc.port", config.grpc.port),
        ("server.port", config.server.port),
    ];
    for (key, port) in ports {
        if port == Some(0) {
            return Err(AppError::ConfigError(format!("{key} must be greater than 0")));
        }
    }

    let timeouts = [
        ("grpc.timeout_secs", config.grpc.timeout_secs),
        ("agent.scrape_timeout_secs", config.agent.scrape_timeout_secs),
        ("server.search_timeout_secs", config.server.search_timeout_secs),
    ];
    for (key, secs) in timeouts {
        if secs == Some(0) {
            return Err(AppError::ConfigError(format!("{key} must be greater than 0")));
        }
    }

    let strings = [
        ("env", config.env.as_deref()),
        ("agent.worker_id", config.agent.worker_id.as_deref()),
        ("agent.findbook_base_url", config.agent.findbook_base_url.as_deref()),
        ("server.searcher_addr", config.server.searcher_addr.as_deref()),
        ("mongo.url", config.mongo.url.as_deref()),
        ("mongo.database", config.mongo.database.as_deref()),
        ("mongo.collection", config.mongo.collection.as_deref()),
        ("rabbit.url", config.rabbit.url.as_deref()),
        ("rabbit.queue_name", config.rabbit.queue_name.as_deref()),
    ];
    for (key, value) in strings {
        if value.is_some_and(|v| v.trim().is_empty()) {
            return Err(AppError::ConfigError(format!("{key} must not be empty")));
        }
    }

    Ok(())
}

/// Resolve one setting: environment variable first, then the file value.
///
/// An environment variable set to an empty string is an error rather than
/// a silent fallback.
pub fn env_or_file(
    lookup: impl Fn(&str) -> Option<String>,
    var: &str,
    file_value: Option<&str>,
) -> Result<Option<String>, AppError> {
    match lookup(var) {
        Some(raw) if raw.trim().is_empty() => {
            Err(AppError::ConfigError(format!("{var} must not be empty")))
        }
        Some(raw) => Ok(Some(raw)),
        None => Ok(file_value.map(str::to_string)),
    }
}

/// Process environment lookup for [`env_or_file`].
pub fn process_env(var: &str) -> Option<String> {
    std::env::var(var).ok()
}
