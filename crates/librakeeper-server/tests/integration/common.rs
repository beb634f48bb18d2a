use std::sync::{Arc, Mutex};

use axum::Router;
use futures::future::BoxFuture;
use librakeeper_core::error::AppError;
use librakeeper_searcher::SearchOutcome;
use librakeeper_server::routes;
use librakeeper_server::searcher::IsbnSearcher;
use librakeeper_server::state::AppState;

/// Searcher that answers every call with a fixed result.
#[derive(Clone)]
pub struct MockSearcher {
    answer: Arc<dyn Fn() -> Result<SearchOutcome, AppError> + Send + Sync>,
    healthy: bool,
    pub requested: Arc<Mutex<Vec<String>>>,
}

impl MockSearcher {
    pub fn answering(outcome: SearchOutcome) -> Self {
        Self {
            answer: Arc::new(move || Ok(outcome.clone())),
            healthy: true,
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fails every search with a fresh error from `make`.
    pub fn failing(make: impl Fn() -> AppError + Send + Sync + 'static) -> Self {
        Self {
            answer: Arc::new(move || Err(make())),
            healthy: false,
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl IsbnSearcher for MockSearcher {
    fn search<'a>(&'a self, isbn: &'a str) -> BoxFuture<'a, Result<SearchOutcome, AppError>> {
        self.requested.lock().unwrap().push(isbn.to_string());
        let answer = (self.answer)();
        Box::pin(async move { answer })
    }

    fn health_check(&self) -> BoxFuture<'_, Result<(), AppError>> {
        let healthy = self.healthy;
        Box::pin(async move {
            if healthy {
                Ok(())
            } else {
                Err(AppError::NetworkError("connection refused".into()))
            }
        })
    }
}

pub fn setup_test_app(searcher: MockSearcher) -> Router {
    routes::router(Arc::new(AppState::new(searcher)))
}
