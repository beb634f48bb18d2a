use futures::StreamExt;
use librakeeper_core::AppError;
use librakeeper_core::job::AckMode;
use librakeeper_core::traits::{JobConsumer, JobDelivery};
use lapin::Consumer;
use lapin::message::Delivery;
use lapin::options::{BasicAckOptions, BasicRejectOptions};

pub struct RabbitConsumer {
    consumer: Consumer,
    ack_mode: AckMode,
}

impl RabbitConsumer {
    pub fn new(consumer: Consumer, ack_mode: AckMode) -> Self {
        Self { consumer, ack_mode }
    }
}

impl JobConsumer for RabbitConsumer {
    type Delivery = RabbitDelivery;

    async fn next_delivery(&mut self) -> Option<Result<RabbitDelivery, AppError>> {
        let next = self.consumer.next().await?;
        Some(
            next.map(|delivery| RabbitDelivery {
                delivery,
                ack_mode: self.ack_mode,
            })
            .map_err(|e| AppError::QueueError(format!("Delivery failed: {e}"))),
        )
    }
}

/// A received job. Acks and rejects are no-ops when the broker already
/// forgot the message on delivery.
pub struct RabbitDelivery {
    delivery: Delivery,
    ack_mode: AckMode,
}

impl JobDelivery for RabbitDelivery {
    fn payload(&self) -> &[u8] {
        &self.delivery.data
    }

    async fn ack(self) -> Result<(), AppError> {
        if self.ack_mode == AckMode::OnDelivery {
            return Ok(());
        }
        self.delivery
            .acker
            .ack(BasicAckOptions::default())
            .await
            .map_err(|e| AppError::QueueError(format!("Failed to ack: {e}")))
    }

    async fn reject(self) -> Result<(), AppError> {
        if self.ack_mode == AckMode::OnDelivery {
            return Ok(());
        }
        self.delivery
            .acker
            .reject(BasicRejectOptions { requeue: false })
            .await
            .map_err(|e| AppError::QueueError(format!("Failed to reject: {e}")))
    }
}
