pub mod config;
pub mod connection;
pub mod consumer;
pub mod publisher;

pub use config::RabbitConfig;
pub use connection::RabbitConnection;
pub use consumer::{RabbitConsumer, RabbitDelivery};
pub use publisher::RabbitPublisher;

/// Content type set on every published job.
pub const JOB_CONTENT_TYPE: &str = "application/x-protobuf";
