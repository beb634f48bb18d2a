use std::str::FromStr;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

use crate::error::AppError;

/// Output format of the process-wide tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, for local runs.
    Pretty,
    /// One JSON object per line, for log shippers.
    Json,
}

impl LogFormat {
    /// Pick the format for a deployment environment name (`APP_ENV`).
    ///
    /// `local` gets pretty output; every other environment logs JSON.
    pub fn for_environment(env: &str) -> Self {
        if env.eq_ignore_ascii_case("local") {
            LogFormat::Pretty
        } else {
            LogFormat::Json
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` is honoured; on top of it our crates and `binary_target`
/// (the binary's own crate name) log at `info`.
pub fn init_tracing(format: LogFormat, binary_target: &str) -> Result<(), AppError> {
    let filter = build_filter(binary_target)?;

    let result = match format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };

    result.map_err(|e| AppError::ConfigError(format!("Failed to install tracing subscriber: {e}")))
}

fn build_filter(binary_target: &str) -> Result<EnvFilter, AppError> {
    let mut filter = EnvFilter::from_default_env();
    for directive in ["librakeeper=info".to_string(), format!("{binary_target}=info")] {
        let directive = directive
            .parse::<Directive>()
            .map_err(|e| AppError::ConfigError(format!("Invalid log directive '{directive}': {e}")))?;
        filter = filter.add_directive(directive);
    }
    Ok(filter)
}
