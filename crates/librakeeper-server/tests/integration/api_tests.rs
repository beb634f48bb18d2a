use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use librakeeper_core::error::AppError;
use librakeeper_core::models::{BookListing, RequestStatus};
use librakeeper_searcher::SearchOutcome;
use tower::ServiceExt;

use crate::integration::common::{MockSearcher, setup_test_app};

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

fn outcome(status: RequestStatus, listings: Vec<BookListing>) -> SearchOutcome {
    SearchOutcome { status, listings }
}

#[tokio::test]
async fn pending_search_returns_empty_books() {
    let searcher = MockSearcher::answering(outcome(RequestStatus::Pending, vec![]));
    let requested = searcher.requested.clone();
    let app = setup_test_app(searcher);

    let (status, json) = get_json(app, "/v1/search?isbn=9785446120581").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "pending");
    assert_eq!(json["books"], serde_json::json!([]));
    assert_eq!(*requested.lock().unwrap(), vec!["9785446120581".to_string()]);
}

#[tokio::test]
async fn successful_search_lists_books_in_order() {
    let listings = vec![
        BookListing {
            title: "Грокаем алгоритмы".into(),
            author: "Бхаргава А.".into(),
            publisher: "Питер, 2024".into(),
            cover_url: "https://covers.test/1.jpg".into(),
            shop_name: "Shop A".into(),
        },
        BookListing {
            title: "Грокаем алгоритмы".into(),
            shop_name: "Shop B".into(),
            ..Default::default()
        },
    ];
    let app = setup_test_app(MockSearcher::answering(outcome(RequestStatus::Success, listings)));

    let (status, json) = get_json(app, "/v1/search?isbn=9785446120581").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "success");
    let books = json["books"].as_array().unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0]["isbn"], "9785446120581");
    assert_eq!(books[0]["publishing"], "Питер, 2024");
    assert_eq!(books[0]["cover_image"], "https://covers.test/1.jpg");
    assert_eq!(books[0]["shop_name"], "Shop A");
    assert_eq!(books[1]["shop_name"], "Shop B");
    assert_eq!(books[1]["cover_image"], "");
}

#[tokio::test]
async fn failed_search_is_reported() {
    let app = setup_test_app(MockSearcher::answering(outcome(RequestStatus::Failed, vec![])));

    let (status, json) = get_json(app, "/v1/search?isbn=123").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "failed");
}

#[tokio::test]
async fn missing_isbn_is_a_validation_error() {
    let searcher = MockSearcher::answering(outcome(RequestStatus::Pending, vec![]));
    let requested = searcher.requested.clone();
    let app = setup_test_app(searcher);

    let (status, json) = get_json(app, "/v1/search").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
    assert!(requested.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_isbn_is_a_validation_error() {
    let app = setup_test_app(MockSearcher::answering(outcome(RequestStatus::Pending, vec![])));

    let (status, json) = get_json(app, "/v1/search?isbn=").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn unreachable_searcher_is_bad_gateway() {
    let app = setup_test_app(MockSearcher::failing(|| {
        AppError::NetworkError("Searcher unavailable: connection refused".into())
    }));

    let (status, json) = get_json(app, "/v1/search?isbn=123").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"], "upstream_error");
}

#[tokio::test]
async fn slow_searcher_is_gateway_timeout() {
    let app = setup_test_app(MockSearcher::failing(|| AppError::Timeout(5)));

    let (status, json) = get_json(app, "/v1/search?isbn=123").await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(json["error"], "timeout");
}

#[tokio::test]
async fn health_reports_reachable_searcher() {
    let app = setup_test_app(MockSearcher::answering(outcome(RequestStatus::Pending, vec![])));

    let (status, json) = get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["searcher"], "ok");
}

#[tokio::test]
async fn health_reports_unreachable_searcher() {
    let app = setup_test_app(MockSearcher::failing(|| AppError::NetworkError("down".into())));

    let (status, json) = get_json(app, "/health").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], "unhealthy");
    assert_eq!(json["searcher"], "error");
}

#[tokio::test]
async fn openapi_document_lists_search_route() {
    let app = setup_test_app(MockSearcher::answering(outcome(RequestStatus::Pending, vec![])));

    let (status, json) = get_json(app, "/api-docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/v1/search"].is_object());
    assert!(json["paths"]["/health"].is_object());
}
