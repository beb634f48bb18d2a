use futures::future::BoxFuture;
use librakeeper_core::error::AppError;
use librakeeper_searcher::{SearchOutcome, SearcherHandle};

/// The upstream the gateway forwards searches to.
pub trait IsbnSearcher: Send + Sync + 'static {
    fn search<'a>(&'a self, isbn: &'a str) -> BoxFuture<'a, Result<SearchOutcome, AppError>>;

    fn health_check(&self) -> BoxFuture<'_, Result<(), AppError>>;
}

impl IsbnSearcher for SearcherHandle {
    fn search<'a>(&'a self, isbn: &'a str) -> BoxFuture<'a, Result<SearchOutcome, AppError>> {
        Box::pin(SearcherHandle::search(self, isbn))
    }

    fn health_check(&self) -> BoxFuture<'_, Result<(), AppError>> {
        Box::pin(SearcherHandle::health_check(self))
    }
}
