use std::sync::Arc;

use crate::searcher::IsbnSearcher;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub searcher: Arc<dyn IsbnSearcher>,
}

impl AppState {
    pub fn new(searcher: impl IsbnSearcher) -> Self {
        Self {
            searcher: Arc::new(searcher),
        }
    }
}
