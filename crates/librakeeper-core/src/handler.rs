use crate::error::AppError;
use crate::job::IsbnMessage;
use crate::traits::{ListingFetcher, SearchRequestStore};

/// Summary of a job that was handled successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandledJob {
    pub isbn: String,
    pub listings_found: usize,
}

/// A job that could not be handled.
///
/// `isbn` is `None` when the payload did not decode.
#[derive(Debug)]
pub struct FailedJob {
    pub isbn: Option<String>,
    pub error: AppError,
}

impl FailedJob {
    fn new(isbn: Option<String>, error: AppError) -> Self {
        Self { isbn, error }
    }
}

/// Turns one queued ISBN job into a terminal search-request status.
///
/// decode → scrape → complete (on success, including "no listings") or
/// reject (on scrape failure).
pub struct SearchJobHandler<F, S>
where
    F: ListingFetcher,
    S: SearchRequestStore,
{
    fetcher: F,
    store: S,
}

impl<F, S> SearchJobHandler<F, S>
where
    F: ListingFetcher,
    S: SearchRequestStore,
{
    pub fn new(fetcher: F, store: S) -> Self {
        Self { fetcher, store }
    }

    /// Handle one raw queue payload.
    ///
    /// A payload that does not decode is returned as an error without
    /// touching the store. A scrape failure marks the request failed and
    /// returns the scrape error; a failure to record that is only logged.
    pub async fn handle(&self, payload: &[u8]) -> Result<HandledJob, FailedJob> {
        let isbn = IsbnMessage::from_bytes(payload)
            .map_err(|e| FailedJob::new(None, e))?
            .isbn;

        tracing::info!(%isbn, "Scraping listings");
        let listings = match self.fetcher.fetch_listings(&isbn).await {
            Ok(listings) => listings,
            Err(scrape_err) => {
                tracing::warn!(%isbn, error = %scrape_err, "Scrape failed, rejecting request");
                if let Err(e) = self.store.reject_request(&isbn).await {
                    tracing::error!(%isbn, error = %e, "Failed to mark request failed");
                }
                return Err(FailedJob::new(Some(isbn), scrape_err));
            }
        };

        if let Err(e) = self.store.complete_request(&isbn, &listings).await {
            return Err(FailedJob::new(Some(isbn), e));
        }
        tracing::info!(%isbn, listings = listings.len(), "Search request completed");

        Ok(HandledJob {
            isbn,
            listings_found: listings.len(),
        })
    }
}
