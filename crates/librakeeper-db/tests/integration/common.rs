use librakeeper_db::{Database, MongoConfig, SearchRequestRepository};
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage};

/// Spins up a MongoDB container and returns a repository with its indexes
/// in place.
///
/// The `ContainerAsync` must be kept in scope for the test duration;
/// dropping it stops the container.
pub async fn setup_test_repo() -> (SearchRequestRepository, ContainerAsync<GenericImage>) {
    let container = GenericImage::new("mongo", "7")
        .with_exposed_port(ContainerPort::Tcp(27017))
        .with_wait_for(WaitFor::message_on_stdout("Waiting for connections"))
        .start()
        .await
        .expect("Failed to start MongoDB container");

    let host = container.get_host().await.expect("Failed to get host");
    let port = container
        .get_host_port_ipv4(27017)
        .await
        .expect("Failed to get port");

    let mut config = MongoConfig::new(format!("mongodb://{host}:{port}"));
    config.database = "librakeeper_test".to_string();

    // Retry connection until the server accepts commands
    const MAX_RETRIES: u32 = 30;
    let mut retries = 0;
    let database = loop {
        match Database::connect(&config).await {
            Ok(database) => break database,
            Err(e) => {
                retries += 1;
                if retries >= MAX_RETRIES {
                    panic!("Failed to connect to MongoDB after {MAX_RETRIES} retries: {e}");
                }
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            }
        }
    };

    let repo = database.search_repo();
    repo.ensure_indexes()
        .await
        .expect("Failed to create indexes");

    (repo, container)
}
