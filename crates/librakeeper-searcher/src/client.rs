use std::time::Duration;

use librakeeper_core::error::AppError;
use librakeeper_core::models::{BookListing, RequestStatus};
use tonic::Code;
use tonic::transport::{Channel, Endpoint};

use crate::proto::SearchByIsbnRequest;
use crate::proto::searcher_client::SearcherClient;

/// What a searcher call reports for one ISBN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub status: RequestStatus,
    pub listings: Vec<BookListing>,
}

/// Typed client for a running `searcher`.
///
/// The channel connects lazily, so constructing one never fails because the
/// searcher is down; calls do.
#[derive(Clone)]
pub struct SearcherHandle {
    endpoint: Endpoint,
    client: SearcherClient<Channel>,
    timeout: Duration,
}

impl SearcherHandle {
    pub fn connect_lazy(addr: &str, timeout: Duration) -> Result<Self, AppError> {
        let endpoint = Endpoint::from_shared(addr.to_string())
            .map_err(|e| AppError::ConfigError(format!("Invalid searcher address '{addr}': {e}")))?
            .connect_timeout(timeout);
        let client = SearcherClient::new(endpoint.connect_lazy());

        Ok(Self {
            endpoint,
            client,
            timeout,
        })
    }

    pub async fn search(&self, isbn: &str) -> Result<SearchOutcome, AppError> {
        let mut request = tonic::Request::new(SearchByIsbnRequest {
            isbn: isbn.to_string(),
        });
        request.set_timeout(self.timeout);

        let response = self
            .client
            .clone()
            .search_by_isbn(request)
            .await
            .map_err(|status| self.map_status(status))?
            .into_inner();

        Ok(SearchOutcome {
            status: response.status().into(),
            listings: response.books.into_iter().map(BookListing::from).collect(),
        })
    }

    /// Open a fresh connection to prove the searcher is reachable.
    pub async fn health_check(&self) -> Result<(), AppError> {
        self.endpoint
            .connect()
            .await
            .map(|_| ())
            .map_err(|e| AppError::NetworkError(format!("Searcher unreachable: {e}")))
    }

    fn map_status(&self, status: tonic::Status) -> AppError {
        match status.code() {
            Code::InvalidArgument => AppError::InvalidArgument(status.message().to_string()),
            Code::DeadlineExceeded => AppError::Timeout(self.timeout.as_secs()),
            Code::Unavailable => {
                AppError::NetworkError(format!("Searcher unavailable: {}", status.message()))
            }
            code => AppError::Generic(format!("Searcher error ({code:?}): {}", status.message())),
        }
    }
}
