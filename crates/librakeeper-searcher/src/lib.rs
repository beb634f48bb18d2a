//! gRPC front of the ISBN search pipeline.
//!
//! [`SearcherGrpc`] serves [`SearchService`](librakeeper_core::SearchService)
//! over tonic; [`SearcherHandle`] is the typed client the HTTP gateway and the
//! operator CLI use to reach it.

pub mod client;
pub mod convert;
pub mod service;

pub mod proto {
    tonic::include_proto!("searcher");
}

pub use client::{SearchOutcome, SearcherHandle};
pub use service::SearcherGrpc;
