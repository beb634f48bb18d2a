use librakeeper_core::AppError;
use librakeeper_core::job::IsbnMessage;
use librakeeper_core::traits::JobPublisher;
use lapin::options::BasicPublishOptions;
use lapin::{BasicProperties, Channel};

use crate::JOB_CONTENT_TYPE;

/// Publishes ISBN jobs to the default exchange, routed by queue name.
///
/// No publisher confirms: a publish that returns `Ok` was handed to the
/// broker connection, not necessarily enqueued.
#[derive(Clone)]
pub struct RabbitPublisher {
    channel: Channel,
    queue_name: String,
}

impl RabbitPublisher {
    pub fn new(channel: Channel, queue_name: String) -> Self {
        Self {
            channel,
            queue_name,
        }
    }
}

impl JobPublisher for RabbitPublisher {
    async fn publish(&self, isbn: &str) -> Result<(), AppError> {
        let payload = IsbnMessage::new(isbn).to_bytes();

        self.channel
            .basic_publish(
                "",
                &self.queue_name,
                BasicPublishOptions::default(),
                &payload,
                BasicProperties::default().with_content_type(JOB_CONTENT_TYPE.into()),
            )
            .await
            .map_err(|e| AppError::QueueError(format!("Failed to publish job for {isbn}: {e}")))?;

        tracing::info!(%isbn, queue = %self.queue_name, "Job published");
        Ok(())
    }
}
