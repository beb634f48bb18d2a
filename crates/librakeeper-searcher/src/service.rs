use std::sync::Arc;

use librakeeper_core::search::SearchService;
use librakeeper_core::traits::{JobPublisher, SearchRequestStore};
use tonic::{Request, Response, Status};

use crate::convert::to_status;
use crate::proto::searcher_server::Searcher;
use crate::proto::{SearchByIsbnRequest, SearchByIsbnResponse};

/// tonic adapter over [`SearchService`].
pub struct SearcherGrpc<S, P>
where
    S: SearchRequestStore,
    P: JobPublisher,
{
    service: Arc<SearchService<S, P>>,
}

impl<S, P> SearcherGrpc<S, P>
where
    S: SearchRequestStore,
    P: JobPublisher,
{
    pub fn new(service: SearchService<S, P>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

#[tonic::async_trait]
impl<S, P> Searcher for SearcherGrpc<S, P>
where
    S: SearchRequestStore + 'static,
    P: JobPublisher + 'static,
{
    async fn search_by_isbn(
        &self,
        request: Request<SearchByIsbnRequest>,
    ) -> Result<Response<SearchByIsbnResponse>, Status> {
        let isbn = request.into_inner().isbn;

        let search = self.service.search_by_isbn(&isbn).await.map_err(|e| {
            if !e.is_client_error() {
                tracing::error!(%isbn, error = %e, "Search failed");
            }
            to_status(e)
        })?;

        tracing::info!(
            %isbn,
            status = %search.status,
            books = search.listings.len(),
            "Search answered"
        );
        Ok(Response::new(search.into()))
    }
}
