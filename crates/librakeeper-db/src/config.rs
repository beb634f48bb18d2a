use librakeeper_core::AppError;
use librakeeper_core::config::{MongoSection, env_or_file, process_env};

pub const DEFAULT_DATABASE: &str = "librakeeper";
pub const DEFAULT_COLLECTION: &str = "requests";

/// Where search requests are stored.
#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub url: String,
    pub database: String,
    pub collection: String,
}

impl MongoConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: DEFAULT_DATABASE.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }

    /// Environment variables over the `[mongo]` section of the config file.
    ///
    /// - `MONGO_URL` / `mongo.url` (required)
    /// - `MONGO_DATABASE` / `mongo.database` (defaults to `librakeeper`)
    /// - `MONGO_COLLECTION` / `mongo.collection` (defaults to `requests`)
    pub fn resolve(file: &MongoSection) -> Result<Self, AppError> {
        Self::resolve_with(process_env, file)
    }

    fn resolve_with(
        lookup: impl Fn(&str) -> Option<String>,
        file: &MongoSection,
    ) -> Result<Self, AppError> {
        let url = env_or_file(&lookup, "MONGO_URL", file.url.as_deref())?.ok_or_else(|| {
            AppError::ConfigError(
                "MONGO_URL not set and no mongo.url in the config file. Required for the search store."
                    .into(),
            )
        })?;

        Ok(Self {
            url,
            database: env_or_file(&lookup, "MONGO_DATABASE", file.database.as_deref())?
                .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            collection: env_or_file(&lookup, "MONGO_COLLECTION", file.collection.as_deref())?
                .unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
        })
    }
}
