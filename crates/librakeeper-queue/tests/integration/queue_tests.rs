use std::time::Duration;

use librakeeper_core::job::{AckMode, IsbnMessage};
use librakeeper_core::traits::{JobConsumer, JobDelivery, JobPublisher};
use librakeeper_queue::RabbitConsumer;

use crate::integration::common::setup_test_broker;

async fn next_isbn(consumer: &mut RabbitConsumer) -> (String, librakeeper_queue::RabbitDelivery) {
    let delivery = tokio::time::timeout(Duration::from_secs(10), consumer.next_delivery())
        .await
        .expect("No delivery within 10s")
        .expect("Delivery stream ended")
        .expect("Delivery failed");
    let isbn = IsbnMessage::from_bytes(delivery.payload())
        .expect("Payload should decode")
        .isbn;
    (isbn, delivery)
}

#[tokio::test]
async fn published_job_reaches_consumer() {
    let (connection, _container) = setup_test_broker("searcher-publish").await;
    let publisher = connection.publisher().await.unwrap();
    let mut consumer = connection
        .consumer(AckMode::OnDelivery, "agent-test")
        .await
        .unwrap();

    publisher.publish("9785446120581").await.unwrap();

    let (isbn, delivery) = next_isbn(&mut consumer).await;
    assert_eq!(isbn, "9785446120581");
    delivery.ack().await.unwrap();
}

#[tokio::test]
async fn jobs_arrive_in_publish_order() {
    let (connection, _container) = setup_test_broker("searcher-order").await;
    let publisher = connection.publisher().await.unwrap();
    let mut consumer = connection
        .consumer(AckMode::AfterHandling, "agent-test")
        .await
        .unwrap();

    for isbn in ["111", "222", "333"] {
        publisher.publish(isbn).await.unwrap();
    }

    for expected in ["111", "222", "333"] {
        let (isbn, delivery) = next_isbn(&mut consumer).await;
        assert_eq!(isbn, expected);
        delivery.ack().await.unwrap();
    }
}

#[tokio::test]
async fn rejected_job_is_not_redelivered() {
    let (connection, _container) = setup_test_broker("searcher-reject").await;
    let publisher = connection.publisher().await.unwrap();
    let mut consumer = connection
        .consumer(AckMode::AfterHandling, "agent-test")
        .await
        .unwrap();

    publisher.publish("poison").await.unwrap();
    let (isbn, delivery) = next_isbn(&mut consumer).await;
    assert_eq!(isbn, "poison");
    delivery.reject().await.unwrap();

    publisher.publish("healthy").await.unwrap();
    let (isbn, delivery) = next_isbn(&mut consumer).await;
    assert_eq!(isbn, "healthy");
    delivery.ack().await.unwrap();
}

#[tokio::test]
async fn closing_the_connection_ends_the_delivery_stream() {
    let (connection, _container) = setup_test_broker("searcher-close").await;
    let mut consumer = connection
        .consumer(AckMode::OnDelivery, "agent-test")
        .await
        .unwrap();
    assert!(connection.is_connected());

    connection.close().await.unwrap();

    let next = tokio::time::timeout(Duration::from_secs(10), consumer.next_delivery())
        .await
        .expect("Stream should end promptly after close");
    assert!(!matches!(next, Some(Ok(_))));
}
