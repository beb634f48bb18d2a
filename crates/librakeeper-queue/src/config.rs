use librakeeper_core::AppError;
use librakeeper_core::config::{RabbitSection, env_or_file, process_env};

pub const DEFAULT_QUEUE_NAME: &str = "searcher";

/// Broker location and the queue both sides of the pipeline declare.
#[derive(Debug, Clone)]
pub struct RabbitConfig {
    pub url: String,
    pub queue_name: String,
}

impl RabbitConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            queue_name: DEFAULT_QUEUE_NAME.to_string(),
        }
    }

    pub fn with_queue_name(mut self, queue_name: impl Into<String>) -> Self {
        self.queue_name = queue_name.into();
        self
    }

    /// Environment variables over the `[rabbit]` section of the config file.
    ///
    /// - `RABBIT_URL` / `rabbit.url` (required)
    /// - `QUEUE_NAME` / `rabbit.queue_name` (defaults to `searcher`)
    pub fn resolve(file: &RabbitSection) -> Result<Self, AppError> {
        Self::resolve_with(process_env, file)
    }

    fn resolve_with(
        lookup: impl Fn(&str) -> Option<String>,
        file: &RabbitSection,
    ) -> Result<Self, AppError> {
        let url = env_or_file(&lookup, "RABBIT_URL", file.url.as_deref())?.ok_or_else(|| {
            AppError::ConfigError(
                "RABBIT_URL not set and no rabbit.url in the config file. Required for the job queue."
                    .into(),
            )
        })?;
        let queue_name = env_or_file(&lookup, "QUEUE_NAME", file.queue_name.as_deref())?
            .unwrap_or_else(|| DEFAULT_QUEUE_NAME.to_string());

        Ok(Self { url, queue_name })
    }
}
