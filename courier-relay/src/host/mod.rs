//! Host APIs for Courier relay transports.
//!
//! - [`http`] - HTTP client with tracing

pub mod http;

pub use http::HttpClient;
