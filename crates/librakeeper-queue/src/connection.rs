use librakeeper_core::AppError;
use librakeeper_core::job::AckMode;
use lapin::options::{BasicConsumeOptions, BasicQosOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{Channel, Connection, ConnectionProperties};

use crate::config::RabbitConfig;
use crate::consumer::RabbitConsumer;
use crate::publisher::RabbitPublisher;

/// One AMQP connection; vends publishers and consumers on their own channels.
pub struct RabbitConnection {
    connection: Connection,
    queue_name: String,
}

impl RabbitConnection {
    pub async fn connect(config: &RabbitConfig) -> Result<Self, AppError> {
        let connection = Connection::connect(&config.url, ConnectionProperties::default())
            .await
            .map_err(|e| AppError::QueueError(format!("Failed to connect: {e}")))?;

        tracing::info!(queue = %config.queue_name, "Connected to RabbitMQ");
        Ok(Self {
            connection,
            queue_name: config.queue_name.clone(),
        })
    }

    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    /// Open a channel with the job queue declared on it.
    async fn open_channel(&self) -> Result<Channel, AppError> {
        let channel = self
            .connection
            .create_channel()
            .await
            .map_err(|e| AppError::QueueError(format!("Failed to open a channel: {e}")))?;

        // Both sides declare the same non-durable queue, so either may start first.
        channel
            .queue_declare(
                &self.queue_name,
                QueueDeclareOptions {
                    durable: false,
                    exclusive: false,
                    auto_delete: false,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| {
                AppError::QueueError(format!("Failed to declare queue '{}': {e}", self.queue_name))
            })?;

        Ok(channel)
    }

    pub async fn publisher(&self) -> Result<RabbitPublisher, AppError> {
        let channel = self.open_channel().await?;
        Ok(RabbitPublisher::new(channel, self.queue_name.clone()))
    }

    /// Register a consumer on the job queue.
    ///
    /// With [`AckMode::AfterHandling`] the broker hands out one unacked job at
    /// a time.
    pub async fn consumer(
        &self,
        ack_mode: AckMode,
        consumer_tag: &str,
    ) -> Result<RabbitConsumer, AppError> {
        let channel = self.open_channel().await?;

        if ack_mode == AckMode::AfterHandling {
            channel
                .basic_qos(1, BasicQosOptions::default())
                .await
                .map_err(|e| AppError::QueueError(format!("Failed to set prefetch: {e}")))?;
        }

        let consumer = channel
            .basic_consume(
                &self.queue_name,
                consumer_tag,
                BasicConsumeOptions {
                    no_ack: ack_mode == AckMode::OnDelivery,
                    ..BasicConsumeOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| AppError::QueueError(format!("Failed to register a consumer: {e}")))?;

        tracing::info!(queue = %self.queue_name, %ack_mode, %consumer_tag, "Consumer registered");
        Ok(RabbitConsumer::new(consumer, ack_mode))
    }

    pub fn is_connected(&self) -> bool {
        self.connection.status().connected()
    }

    /// Close the connection, ending every consumer opened on it.
    pub async fn close(&self) -> Result<(), AppError> {
        self.connection
            .close(200, "shutting down")
            .await
            .map_err(|e| AppError::QueueError(format!("Failed to close connection: {e}")))
    }
}
