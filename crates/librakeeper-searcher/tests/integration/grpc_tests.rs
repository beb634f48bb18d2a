use std::net::{SocketAddr, TcpListener};
use std::time::Duration;

use librakeeper_core::models::RequestStatus;
use librakeeper_core::testutil::{MockPublisher, MockStore, make_test_listing};
use librakeeper_core::{AppError, SearchRequestStore, SearchService};
use librakeeper_searcher::proto::searcher_server::SearcherServer;
use librakeeper_searcher::{SearcherGrpc, SearcherHandle};
use tokio_util::sync::CancellationToken;

/// Serve a searcher over real TCP; returns its address and a stop handle.
async fn spawn_searcher(store: MockStore, publisher: MockPublisher) -> (String, CancellationToken) {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind a free port");
        listener.local_addr().expect("No local addr").port()
    };
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    let stop = CancellationToken::new();
    let stopped = stop.clone();
    let service = SearcherServer::new(SearcherGrpc::new(SearchService::new(store, publisher)));
    tokio::spawn(async move {
        tonic::transport::Server::builder()
            .add_service(service)
            .serve_with_shutdown(addr, stopped.cancelled_owned())
            .await
            .expect("gRPC server failed");
    });

    // Wait until the listener accepts connections.
    let uri = format!("http://{addr}");
    let handle = SearcherHandle::connect_lazy(&uri, Duration::from_secs(2)).unwrap();
    for _ in 0..50 {
        if handle.health_check().await.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    (uri, stop)
}

#[tokio::test]
async fn pending_then_success_over_the_wire() {
    let store = MockStore::empty();
    let publisher = MockPublisher::new();
    let (uri, stop) = spawn_searcher(store.clone(), publisher.clone()).await;
    let handle = SearcherHandle::connect_lazy(&uri, Duration::from_secs(5)).unwrap();

    let first = handle.search("9785446120581").await.unwrap();
    assert_eq!(first.status, RequestStatus::Pending);
    assert!(first.listings.is_empty());
    assert_eq!(publisher.published(), vec!["9785446120581".to_string()]);

    let listings = vec![make_test_listing("Foo", "X"), make_test_listing("Foo", "Y")];
    store.complete_request("9785446120581", &listings).await.unwrap();

    let second = handle.search("9785446120581").await.unwrap();
    assert_eq!(second.status, RequestStatus::Success);
    assert_eq!(second.listings, listings);
    assert_eq!(publisher.published().len(), 1);

    stop.cancel();
}

#[tokio::test]
async fn failed_search_is_reported_as_failed() {
    let store = MockStore::with_pending("123");
    store.reject_request("123").await.unwrap();
    let (uri, stop) = spawn_searcher(store, MockPublisher::new()).await;
    let handle = SearcherHandle::connect_lazy(&uri, Duration::from_secs(5)).unwrap();

    let outcome = handle.search("123").await.unwrap();
    assert_eq!(outcome.status, RequestStatus::Failed);

    stop.cancel();
}

#[tokio::test]
async fn empty_isbn_comes_back_as_invalid_argument() {
    let store = MockStore::empty();
    let (uri, stop) = spawn_searcher(store.clone(), MockPublisher::new()).await;
    let handle = SearcherHandle::connect_lazy(&uri, Duration::from_secs(5)).unwrap();

    let err = handle.search("").await.unwrap_err();

    assert!(matches!(err, AppError::InvalidArgument(_)), "got {err:?}");
    assert!(store.is_empty());

    stop.cancel();
}
