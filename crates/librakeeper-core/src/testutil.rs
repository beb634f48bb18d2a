//! Test utilities: mock implementations of all core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::error::AppError;
use crate::models::{BookListing, RequestStatus, SearchRequest};
use crate::traits::{JobConsumer, JobDelivery, JobPublisher, ListingFetcher, SearchRequestStore};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher that returns the same listings for every ISBN.
#[derive(Clone)]
pub struct MockFetcher {
    listings: Arc<Mutex<Vec<BookListing>>>,
    /// Returned (once) instead of the listings.
    error: Arc<Mutex<Option<AppError>>>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new(listings: Vec<BookListing>) -> Self {
        Self {
            listings: Arc::new(Mutex::new(listings)),
            error: Arc::new(Mutex::new(None)),
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_error(error: AppError) -> Self {
        Self {
            listings: Arc::new(Mutex::new(Vec::new())),
            error: Arc::new(Mutex::new(Some(error))),
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// ISBNs this fetcher was asked about, in call order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl ListingFetcher for MockFetcher {
    async fn fetch_listings(&self, isbn: &str) -> Result<Vec<BookListing>, AppError> {
        self.requested.lock().unwrap().push(isbn.to_string());
        if let Some(e) = self.error.lock().unwrap().take() {
            return Err(e);
        }
        Ok(self.listings.lock().unwrap().clone())
    }
}

// ---------------------------------------------------------------------------
// MockStore
// ---------------------------------------------------------------------------

/// In-memory search request store.
///
/// `find_or_create` runs under a single lock, so it is atomic like the real
/// upsert.
#[derive(Clone, Default)]
pub struct MockStore {
    records: Arc<Mutex<HashMap<String, SearchRequest>>>,
    next_id: Arc<Mutex<u64>>,
    find_error: Arc<Mutex<Option<AppError>>>,
    write_error: Arc<Mutex<Option<AppError>>>,
    writes: Arc<Mutex<usize>>,
}

impl MockStore {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Store already holding a pending request for `isbn`.
    pub fn with_pending(isbn: &str) -> Self {
        let store = Self::default();
        store.insert_pending(isbn);
        store
    }

    /// Store whose next `find_or_create` fails.
    pub fn with_error(error: AppError) -> Self {
        let store = Self::default();
        *store.find_error.lock().unwrap() = Some(error);
        store
    }

    pub fn insert_pending(&self, isbn: &str) {
        let id = self.allocate_id();
        self.records
            .lock()
            .unwrap()
            .insert(isbn.to_string(), SearchRequest::pending(id, isbn));
    }

    /// Make the next `complete_request`/`reject_request` fail.
    pub fn fail_next_write(&self, error: AppError) {
        *self.write_error.lock().unwrap() = Some(error);
    }

    pub fn get(&self, isbn: &str) -> Option<SearchRequest> {
        self.records.lock().unwrap().get(isbn).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of terminal writes that succeeded.
    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    fn allocate_id(&self) -> String {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        format!("mock-{}", *next)
    }

    fn update(
        &self,
        isbn: &str,
        apply: impl FnOnce(&mut SearchRequest),
    ) -> Result<(), AppError> {
        if let Some(e) = self.write_error.lock().unwrap().take() {
            return Err(e);
        }
        if let Some(record) = self.records.lock().unwrap().get_mut(isbn) {
            apply(record);
            record.updated_at = Utc::now();
        }
        *self.writes.lock().unwrap() += 1;
        Ok(())
    }
}

impl SearchRequestStore for MockStore {
    async fn find_or_create(&self, isbn: &str) -> Result<(SearchRequest, bool), AppError> {
        if let Some(e) = self.find_error.lock().unwrap().take() {
            return Err(e);
        }
        let mut records = self.records.lock().unwrap();
        if let Some(existing) = records.get(isbn) {
            return Ok((existing.clone(), false));
        }
        let request = SearchRequest::pending(self.allocate_id(), isbn);
        records.insert(isbn.to_string(), request.clone());
        Ok((request, true))
    }

    async fn complete_request(&self, isbn: &str, listings: &[BookListing]) -> Result<(), AppError> {
        let listings = listings.to_vec();
        self.update(isbn, |record| {
            record.status = RequestStatus::Success;
            record.listings = listings;
        })
    }

    async fn reject_request(&self, isbn: &str) -> Result<(), AppError> {
        self.update(isbn, |record| record.status = RequestStatus::Failed)
    }

    async fn get_request(&self, isbn: &str) -> Result<Option<SearchRequest>, AppError> {
        Ok(self.get(isbn))
    }
}

// ---------------------------------------------------------------------------
// MockPublisher
// ---------------------------------------------------------------------------

/// Mock publisher that records every published ISBN.
#[derive(Clone, Default)]
pub struct MockPublisher {
    published: Arc<Mutex<Vec<String>>>,
    error: Arc<Mutex<Option<AppError>>>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publisher whose next publish fails.
    pub fn with_error(error: AppError) -> Self {
        Self {
            published: Arc::new(Mutex::new(Vec::new())),
            error: Arc::new(Mutex::new(Some(error))),
        }
    }

    pub fn published(&self) -> Vec<String> {
        self.published.lock().unwrap().clone()
    }
}

impl JobPublisher for MockPublisher {
    async fn publish(&self, isbn: &str) -> Result<(), AppError> {
        if let Some(e) = self.error.lock().unwrap().take() {
            return Err(e);
        }
        self.published.lock().unwrap().push(isbn.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockConsumer
// ---------------------------------------------------------------------------

/// What the worker told the broker about a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Acked,
    Rejected,
}

pub struct MockDelivery {
    payload: Vec<u8>,
    outcomes: Arc<Mutex<Vec<DeliveryOutcome>>>,
}

impl JobDelivery for MockDelivery {
    fn payload(&self) -> &[u8] {
        &self.payload
    }

    async fn ack(self) -> Result<(), AppError> {
        self.outcomes.lock().unwrap().push(DeliveryOutcome::Acked);
        Ok(())
    }

    async fn reject(self) -> Result<(), AppError> {
        self.outcomes.lock().unwrap().push(DeliveryOutcome::Rejected);
        Ok(())
    }
}

/// Mock consumer that replays a fixed list of deliveries.
pub struct MockConsumer {
    deliveries: VecDeque<Result<Vec<u8>, AppError>>,
    /// Wait forever instead of ending the stream once the list is drained.
    idle_when_drained: bool,
    pub outcomes: Arc<Mutex<Vec<DeliveryOutcome>>>,
}

impl MockConsumer {
    pub fn with_payloads(payloads: Vec<Vec<u8>>) -> Self {
        Self::with_deliveries(payloads.into_iter().map(Ok).collect())
    }

    pub fn with_deliveries(deliveries: Vec<Result<Vec<u8>, AppError>>) -> Self {
        Self {
            deliveries: deliveries.into(),
            idle_when_drained: false,
            outcomes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A consumer on an empty queue: never yields, never ends.
    pub fn idle() -> Self {
        Self {
            deliveries: VecDeque::new(),
            idle_when_drained: true,
            outcomes: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl JobConsumer for MockConsumer {
    type Delivery = MockDelivery;

    async fn next_delivery(&mut self) -> Option<Result<MockDelivery, AppError>> {
        match self.deliveries.pop_front() {
            Some(Ok(payload)) => Some(Ok(MockDelivery {
                payload,
                outcomes: self.outcomes.clone(),
            })),
            Some(Err(e)) => Some(Err(e)),
            None if self.idle_when_drained => std::future::pending().await,
            None => None,
        }
    }
}

// ---------------------------------------------------------------------------
// MockReporter
// ---------------------------------------------------------------------------

/// Mock worker reporter that records events.
#[derive(Default)]
pub struct MockReporter {
    pub events: Arc<Mutex<Vec<String>>>,
    /// `(isbn, infrastructure)` of every failed job.
    pub failures: Arc<Mutex<Vec<(Option<String>, bool)>>>,
    /// `(completed, failed)` from the shutdown event.
    pub totals: Arc<Mutex<Option<(u64, u64)>>>,
}

impl MockReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl crate::worker::WorkerReporter for MockReporter {
    fn report(&self, event: crate::worker::WorkerEvent<'_>) {
        let label = match &event {
            crate::worker::WorkerEvent::Started { .. } => "Started",
            crate::worker::WorkerEvent::MessageReceived { .. } => "MessageReceived",
            crate::worker::WorkerEvent::JobCompleted { .. } => "JobCompleted",
            crate::worker::WorkerEvent::JobFailed { .. } => "JobFailed",
            crate::worker::WorkerEvent::DeliveryError { .. } => "DeliveryError",
            crate::worker::WorkerEvent::ShuttingDown { .. } => "ShuttingDown",
            crate::worker::WorkerEvent::Stopped { .. } => "Stopped",
        };
        match event {
            crate::worker::WorkerEvent::JobFailed {
                isbn,
                infrastructure,
                ..
            } => self
                .failures
                .lock()
                .unwrap()
                .push((isbn.map(str::to_string), infrastructure)),
            crate::worker::WorkerEvent::ShuttingDown {
                jobs_completed,
                jobs_failed,
                ..
            } => *self.totals.lock().unwrap() = Some((jobs_completed, jobs_failed)),
            _ => {}
        }
        self.events.lock().unwrap().push(label.to_string());
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// A listing with every field filled in.
pub fn make_test_listing(title: &str, shop_name: &str) -> BookListing {
    BookListing {
        title: title.to_string(),
        author: "Test Author".to_string(),
        publisher: "Test House, 2024".to_string(),
        cover_url: "https://covers.example/test.jpg".to_string(),
        shop_name: shop_name.to_string(),
    }
}
