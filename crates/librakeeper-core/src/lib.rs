pub mod config;
pub mod error;
pub mod handler;
pub mod job;
pub mod models;
pub mod retry;
pub mod search;
pub mod shutdown;
pub mod telemetry;
#[cfg(any(test, feature = "testutil"))]
pub mod testutil;
pub mod traits;
pub mod worker;

pub use config::FileConfig;
pub use error::AppError;
pub use handler::{FailedJob, HandledJob, SearchJobHandler};
pub use job::{AckMode, IsbnMessage, WorkerConfig};
pub use models::{BookListing, PLACEHOLDER_COVER_PATH, RequestStatus, SearchRequest};
pub use retry::RetryPolicy;
pub use search::SearchService;
pub use shutdown::shutdown_signal;
pub use traits::{JobConsumer, JobDelivery, JobPublisher, ListingFetcher, SearchRequestStore};
pub use worker::{TracingWorkerReporter, WorkerReporter, WorkerService};
