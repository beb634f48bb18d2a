use librakeeper_queue::{RabbitConfig, RabbitConnection};
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage};

/// Spins up a RabbitMQ broker and connects to it.
///
/// Each test gets its own queue name so deliveries never leak between
/// tests sharing a broker.
pub async fn setup_test_broker(
    queue_name: &str,
) -> (RabbitConnection, ContainerAsync<GenericImage>) {
    let container = GenericImage::new("rabbitmq", "3")
        .with_exposed_port(ContainerPort::Tcp(5672))
        .with_wait_for(WaitFor::message_on_stdout("Server startup complete"))
        .start()
        .await
        .expect("Failed to start RabbitMQ container");

    let host = container.get_host().await.expect("Failed to get host");
    let port = container
        .get_host_port_ipv4(5672)
        .await
        .expect("Failed to get port");

    let config = RabbitConfig::new(format!("amqp://guest:guest@{host}:{port}/%2f"))
        .with_queue_name(queue_name);

    const MAX_RETRIES: u32 = 30;
    let mut retries = 0;
    let connection = loop {
        match RabbitConnection::connect(&config).await {
            Ok(connection) => break connection,
            Err(e) => {
                retries += 1;
                if retries >= MAX_RETRIES {
                    panic!("Failed to connect to RabbitMQ after {MAX_RETRIES} retries: {e}");
                }
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            }
        }
    };

    (connection, container)
}
