use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::handler::SearchJobHandler;
use crate::job::WorkerConfig;
use crate::traits::{JobConsumer, JobDelivery, ListingFetcher, SearchRequestStore};

/// Events emitted by the worker for monitoring/logging.
#[derive(Debug, Clone)]
pub enum WorkerEvent<'a> {
    Started {
        worker_id: &'a str,
    },
    MessageReceived {
        bytes: usize,
    },
    JobCompleted {
        isbn: &'a str,
        listings_found: usize,
    },
    JobFailed {
        isbn: Option<&'a str>,
        error: &'a str,
        infrastructure: bool,
    },
    DeliveryError {
        error: &'a str,
    },
    ShuttingDown {
        worker_id: &'a str,
        jobs_completed: u64,
        jobs_failed: u64,
    },
    Stopped {
        worker_id: &'a str,
    },
}

/// Trait for receiving worker events (decoupled logging).
pub trait WorkerReporter: Send + Sync {
    fn report(&self, event: WorkerEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingWorkerReporter;

impl WorkerReporter for TracingWorkerReporter {
    fn report(&self, event: WorkerEvent<'_>) {
        match event {
            WorkerEvent::Started { worker_id } => {
                tracing::info!(%worker_id, "Worker started, waiting for jobs");
            }
            WorkerEvent::MessageReceived { bytes } => {
                tracing::debug!(%bytes, "Received a message");
            }
            WorkerEvent::JobCompleted {
                isbn,
                listings_found,
            } => {
                tracing::info!(%isbn, %listings_found, "Job completed");
            }
            WorkerEvent::JobFailed {
                isbn,
                error,
                infrastructure,
            } => {
                let isbn = isbn.unwrap_or("<undecodable>");
                if infrastructure {
                    tracing::error!(%isbn, %error, "Job failed on a dependency");
                } else {
                    tracing::warn!(%isbn, %error, "Job failed");
                }
            }
            WorkerEvent::DeliveryError { error } => {
                tracing::error!(%error, "Delivery stream failed");
            }
            WorkerEvent::ShuttingDown {
                worker_id,
                jobs_completed,
                jobs_failed,
            } => {
                tracing::info!(%worker_id, %jobs_completed, %jobs_failed, "Worker shutting down");
            }
            WorkerEvent::Stopped { worker_id } => {
                tracing::info!(%worker_id, "Worker stopped");
            }
        }
    }
}

/// Worker that consumes ISBN jobs one at a time and runs them through a
/// [`SearchJobHandler`].
pub struct WorkerService<C, F, S>
where
    C: JobConsumer,
    F: ListingFetcher,
    S: SearchRequestStore,
{
    consumer: C,
    handler: SearchJobHandler<F, S>,
    config: WorkerConfig,
}

impl<C, F, S> WorkerService<C, F, S>
where
    C: JobConsumer,
    F: ListingFetcher,
    S: SearchRequestStore,
{
    pub fn new(consumer: C, handler: SearchJobHandler<F, S>, config: WorkerConfig) -> Self {
        Self {
            consumer,
            handler,
            config,
        }
    }

    /// Run the consume loop until cancellation or until the delivery stream
    /// ends.
    ///
    /// A failing job does not stop the loop. A broken delivery stream does:
    /// its error is returned so the process can exit.
    pub async fn run<WR: WorkerReporter>(
        &mut self,
        cancel_token: CancellationToken,
        reporter: &WR,
    ) -> Result<(), AppError> {
        reporter.report(WorkerEvent::Started {
            worker_id: &self.config.worker_id,
        });

        let mut jobs_completed = 0u64;
        let mut jobs_failed = 0u64;
        let mut outcome = Ok(());

        loop {
            let next = tokio::select! {
                biased;
                () = cancel_token.cancelled() => break,
                next = self.consumer.next_delivery() => next,
            };

            match next {
                Some(Ok(delivery)) => {
                    if self.process_delivery(delivery, reporter).await {
                        jobs_completed += 1;
                    } else {
                        jobs_failed += 1;
                    }
                }
                Some(Err(e)) => {
                    let error_msg = e.to_string();
                    reporter.report(WorkerEvent::DeliveryError { error: &error_msg });
                    outcome = Err(e);
                    break;
                }
                None => break,
            }
        }

        reporter.report(WorkerEvent::ShuttingDown {
            worker_id: &self.config.worker_id,
            jobs_completed,
            jobs_failed,
        });
        reporter.report(WorkerEvent::Stopped {
            worker_id: &self.config.worker_id,
        });

        outcome
    }

    /// Returns whether the job completed.
    async fn process_delivery<WR: WorkerReporter>(
        &self,
        delivery: C::Delivery,
        reporter: &WR,
    ) -> bool {
        reporter.report(WorkerEvent::MessageReceived {
            bytes: delivery.payload().len(),
        });

        match self.handler.handle(delivery.payload()).await {
            Ok(handled) => {
                reporter.report(WorkerEvent::JobCompleted {
                    isbn: &handled.isbn,
                    listings_found: handled.listings_found,
                });
                if let Err(e) = delivery.ack().await {
                    tracing::error!(isbn = %handled.isbn, error = %e, "Failed to ack message");
                }
                true
            }
            Err(failed) => {
                let error_msg = failed.error.to_string();
                reporter.report(WorkerEvent::JobFailed {
                    isbn: failed.isbn.as_deref(),
                    error: &error_msg,
                    infrastructure: failed.error.is_infrastructure(),
                });
                if let Err(e) = delivery.reject().await {
                    tracing::error!(isbn = ?failed.isbn, error = %e, "Failed to reject message");
                }
                false
            }
        }
    }
}
