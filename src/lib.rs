//! OpenAI-compatible relay for NVIDIA NIM chat completions.
//!
//! Accepts OpenAI-style requests, fills in the provider's required defaults,
//! forwards them with the configured bearer credential and relays the reply,
//! streamed or buffered, back to the caller.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod translate;
pub mod upstream;

pub use config::RelayConfig;
pub use error::RelayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
