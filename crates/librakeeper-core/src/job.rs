use std::fmt;
use std::str::FromStr;

use prost::Message;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;

/// Queue payload for one ISBN search job.
///
/// Protobuf-encoded (`string isbn = 1`) so producers and consumers written
/// against the `.proto` definition can share the queue.
#[derive(Clone, PartialEq, Message)]
pub struct IsbnMessage {
    #[prost(string, tag = "1")]
    pub isbn: String,
}

impl IsbnMessage {
    pub fn new(isbn: impl Into<String>) -> Self {
        Self { isbn: isbn.into() }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.encode_to_vec()
    }

    /// Decode a queue payload. A message without an ISBN is rejected.
    pub fn from_bytes(payload: &[u8]) -> Result<Self, AppError> {
        let message =
            IsbnMessage::decode(payload).map_err(|e| AppError::DecodeError(e.to_string()))?;
        if message.isbn.is_empty() {
            return Err(AppError::DecodeError(
                "job message carries no isbn".to_string(),
            ));
        }
        Ok(message)
    }
}

/// When a consumed job is acknowledged to the broker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AckMode {
    /// The broker forgets the message as soon as it is delivered. A job
    /// whose handling fails is lost.
    #[default]
    #[serde(alias = "auto")]
    OnDelivery,
    /// Ack after successful handling; reject (without requeue) on failure so
    /// a dead-letter exchange configured on the queue can pick it up.
    #[serde(alias = "manual")]
    AfterHandling,
}

impl AckMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AckMode::OnDelivery => "on-delivery",
            AckMode::AfterHandling => "after-handling",
        }
    }
}

impl fmt::Display for AckMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AckMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "on-delivery" | "auto" => Ok(AckMode::OnDelivery),
            "after-handling" | "manual" => Ok(AckMode::AfterHandling),
            _ => Err(format!("Unknown ack mode: {}", s)),
        }
    }
}

/// Configuration for a worker process.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub worker_id: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            worker_id: format!("agent-{}", &Uuid::new_v4().to_string()[..8]),
        }
    }
}

impl WorkerConfig {
    pub fn with_worker_id(mut self, id: impl Into<String>) -> Self {
        self.worker_id = id.into();
        self
    }
}
