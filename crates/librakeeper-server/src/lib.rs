//! REST gateway: routes, DTOs, and OpenAPI documentation in front of the
//! gRPC searcher.

pub mod dto;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod searcher;
pub mod state;
