use std::future::Future;

use crate::error::AppError;
use crate::models::{BookListing, SearchRequest};

/// Looks up shop listings for an ISBN on an external catalog.
pub trait ListingFetcher: Send + Sync + Clone {
    fn fetch_listings(
        &self,
        isbn: &str,
    ) -> impl Future<Output = Result<Vec<BookListing>, AppError>> + Send;
}

/// Persists ISBN search requests and their outcome.
///
/// `find_or_create` must be a single atomic operation against the store so
/// concurrent first-time searches for one ISBN create exactly one record.
/// The terminal writes are unconditional (last write wins).
pub trait SearchRequestStore: Send + Sync + Clone {
    /// Return the record for `isbn`, inserting a pending one if none exists.
    ///
    /// The boolean is `true` when this call created the record.
    fn find_or_create(
        &self,
        isbn: &str,
    ) -> impl Future<Output = Result<(SearchRequest, bool), AppError>> + Send;

    /// Mark the request successful and store its listings (order preserved).
    fn complete_request(
        &self,
        isbn: &str,
        listings: &[BookListing],
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Mark the request failed. Listings already stored are left untouched.
    fn reject_request(&self, isbn: &str) -> impl Future<Output = Result<(), AppError>> + Send;

    fn get_request(
        &self,
        isbn: &str,
    ) -> impl Future<Output = Result<Option<SearchRequest>, AppError>> + Send;
}

/// Hands ISBN search jobs to the worker fleet.
pub trait JobPublisher: Send + Sync + Clone {
    fn publish(&self, isbn: &str) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// One job received from the queue.
pub trait JobDelivery: Send {
    fn payload(&self) -> &[u8];

    /// Tell the broker the job was handled.
    fn ack(self) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Tell the broker the job failed and must not be redelivered.
    fn reject(self) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Source of queued jobs, consumed one at a time.
pub trait JobConsumer: Send {
    type Delivery: JobDelivery;

    /// Wait for the next delivery. `None` means the stream has ended.
    fn next_delivery(
        &mut self,
    ) -> impl Future<Output = Option<Result<Self::Delivery, AppError>>> + Send;
}
