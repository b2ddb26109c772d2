//! HTTP surface: request validation, status mapping, and the axum server.

pub mod http;
pub mod types;

pub use http::HttpServer;
pub use types::SearchResponse;
