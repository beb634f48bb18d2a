use thiserror::Error;

/// Application-wide error types for Librakeeper.
#[derive(Error, Debug)]
pub enum AppError {
    /// The caller supplied an unusable argument (e.g. an empty ISBN).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// HTTP request failed (fetching a page).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The fetched page could not be turned into listings.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Message broker operation failed.
    #[error("Queue error: {0}")]
    QueueError(String),

    /// A queued job payload could not be decoded.
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Returns true if the error was caused by the caller's input rather than
    /// by this service or one of its dependencies.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::InvalidArgument(_))
    }

    /// Returns true if the error comes from infrastructure we talk to
    /// (store, broker, network) rather than from the request itself.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            AppError::DatabaseError(_)
                | AppError::QueueError(_)
                | AppError::NetworkError(_)
                | AppError::Timeout(_)
        )
    }
}
