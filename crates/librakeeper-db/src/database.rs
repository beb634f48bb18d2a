use librakeeper_core::AppError;
use mongodb::bson::doc;
use mongodb::{Client, Collection};

use crate::config::MongoConfig;
use crate::search_repository::{SearchRequestDocument, SearchRequestRepository};

/// Central database facade: owns the client and vends repository instances.
#[derive(Clone)]
pub struct Database {
    client: Client,
    config: MongoConfig,
}

impl Database {
    /// Connect to MongoDB and verify the deployment answers a ping.
    pub async fn connect(config: &MongoConfig) -> Result<Self, AppError> {
        let client = Client::with_uri_str(&config.url)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {e}")))?;

        let database = Self {
            client,
            config: config.clone(),
        };
        database.health_check().await?;
        Ok(database)
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database(&self.config.database)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| AppError::DatabaseError(format!("Ping failed: {e}")))?;
        Ok(())
    }

    /// Get a [`SearchRequestRepository`] over the configured collection.
    pub fn search_repo(&self) -> SearchRequestRepository {
        SearchRequestRepository::new(self.collection())
    }

    fn collection(&self) -> Collection<SearchRequestDocument> {
        self.client
            .database(&self.config.database)
            .collection(&self.config.collection)
    }
}
