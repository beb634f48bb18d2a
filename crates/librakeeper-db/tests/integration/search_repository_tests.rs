use librakeeper_core::models::{BookListing, RequestStatus};
use librakeeper_core::traits::SearchRequestStore;

use crate::integration::common::setup_test_repo;

fn listing(title: &str, shop: &str) -> BookListing {
    BookListing {
        title: title.to_string(),
        author: "Бхаргава А.".to_string(),
        publisher: "Питер, 2024".to_string(),
        cover_url: String::new(),
        shop_name: shop.to_string(),
    }
}

#[tokio::test]
async fn first_lookup_creates_pending_request() {
    let (repo, _container) = setup_test_repo().await;

    let (request, created) = repo.find_or_create("9785446120581").await.unwrap();

    assert!(created);
    assert_eq!(request.isbn, "9785446120581");
    assert_eq!(request.status, RequestStatus::Pending);
    assert!(request.listings.is_empty());
    assert!(!request.id.is_empty());
}

#[tokio::test]
async fn second_lookup_returns_existing_request() {
    let (repo, _container) = setup_test_repo().await;

    let (first, created_first) = repo.find_or_create("123").await.unwrap();
    let (second, created_second) = repo.find_or_create("123").await.unwrap();

    assert!(created_first);
    assert!(!created_second);
    assert_eq!(first.id, second.id);
    assert_eq!(first.created_at, second.created_at);
}

#[tokio::test]
async fn concurrent_lookups_create_exactly_one_record() {
    let (repo, _container) = setup_test_repo().await;

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.find_or_create("9785206000344").await })
        })
        .collect();

    let mut ids = Vec::new();
    let mut creations = 0;
    for handle in handles {
        let (request, created) = handle.await.unwrap().unwrap();
        ids.push(request.id);
        if created {
            creations += 1;
        }
    }

    assert_eq!(creations, 1);
    ids.dedup();
    assert_eq!(ids.len(), 1);
}

#[tokio::test]
async fn complete_stores_listings_in_order() {
    let (repo, _container) = setup_test_repo().await;
    repo.find_or_create("123").await.unwrap();

    let listings = vec![listing("Foo", "Shop A"), listing("Foo", "Shop B")];
    repo.complete_request("123", &listings).await.unwrap();

    let stored = repo.get_request("123").await.unwrap().unwrap();
    assert_eq!(stored.status, RequestStatus::Success);
    assert_eq!(stored.listings, listings);
    assert!(stored.updated_at >= stored.created_at);
}

#[tokio::test]
async fn complete_with_no_listings_is_success() {
    let (repo, _container) = setup_test_repo().await;
    repo.find_or_create("123").await.unwrap();

    repo.complete_request("123", &[]).await.unwrap();

    let stored = repo.get_request("123").await.unwrap().unwrap();
    assert_eq!(stored.status, RequestStatus::Success);
    assert!(stored.listings.is_empty());
}

#[tokio::test]
async fn reject_marks_failed() {
    let (repo, _container) = setup_test_repo().await;
    repo.find_or_create("123").await.unwrap();

    repo.reject_request("123").await.unwrap();

    let (stored, created) = repo.find_or_create("123").await.unwrap();
    assert!(!created);
    assert_eq!(stored.status, RequestStatus::Failed);
}

#[tokio::test]
async fn reject_twice_stays_failed_and_keeps_listings() {
    let (repo, _container) = setup_test_repo().await;
    repo.find_or_create("123").await.unwrap();
    repo.complete_request("123", &[listing("Foo", "Shop A")])
        .await
        .unwrap();

    repo.reject_request("123").await.unwrap();
    repo.reject_request("123").await.unwrap();

    let stored = repo.get_request("123").await.unwrap().unwrap();
    assert_eq!(stored.status, RequestStatus::Failed);
    assert_eq!(stored.listings, vec![listing("Foo", "Shop A")]);
}

#[tokio::test]
async fn get_unknown_isbn_is_none() {
    let (repo, _container) = setup_test_repo().await;

    assert!(repo.get_request("0000000000").await.unwrap().is_none());
}

#[tokio::test]
async fn ensure_indexes_is_idempotent() {
    let (repo, _container) = setup_test_repo().await;

    repo.ensure_indexes().await.unwrap();
}
