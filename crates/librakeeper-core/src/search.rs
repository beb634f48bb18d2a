use crate::error::AppError;
use crate::models::SearchRequest;
use crate::traits::{JobPublisher, SearchRequestStore};

/// Entry point for ISBN searches.
///
/// The first search for an ISBN records a pending request and queues a
/// scrape job; every later search just reports what the store holds. Callers
/// poll until the returned status is terminal.
pub struct SearchService<S, P>
where
    S: SearchRequestStore,
    P: JobPublisher,
{
    store: S,
    publisher: P,
}

impl<S, P> SearchService<S, P>
where
    S: SearchRequestStore,
    P: JobPublisher,
{
    pub fn new(store: S, publisher: P) -> Self {
        Self { store, publisher }
    }

    /// Look up (or start) the search for `isbn`.
    ///
    /// Exactly one job is published per newly created request. Publishing is
    /// not transactional with the store write: if it fails the request is
    /// still returned, and stays pending.
    pub async fn search_by_isbn(&self, isbn: &str) -> Result<SearchRequest, AppError> {
        if isbn.is_empty() {
            return Err(AppError::InvalidArgument("isbn cannot be empty".to_string()));
        }

        let (request, created) = self.store.find_or_create(isbn).await?;

        if created {
            tracing::info!(%isbn, id = %request.id, "New search request, queueing scrape job");
            if let Err(e) = self.publisher.publish(isbn).await {
                tracing::error!(
                    %isbn,
                    error = %e,
                    "Failed to queue scrape job, request will stay pending"
                );
            }
        } else {
            tracing::debug!(%isbn, status = %request.status, "Search request already known");
        }

        Ok(request)
    }
}
