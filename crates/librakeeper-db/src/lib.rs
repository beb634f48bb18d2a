pub mod config;
pub mod database;
pub mod search_repository;

pub use config::MongoConfig;
pub use database::Database;
pub use search_repository::SearchRequestRepository;
