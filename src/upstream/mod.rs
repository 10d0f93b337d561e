//! Upstream provider access.
//!
//! # Data Flow
//! ```text
//! handler
//!     → UpstreamClient (client.rs): bearer auth, x-request-id
//!     → provider /models or /chat/completions
//!     → UpstreamReply (buffered JSON) or reqwest::Response (streamed body)
//! ```

pub mod client;

pub use client::{UpstreamClient, UpstreamReply};
