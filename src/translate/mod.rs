//! Request translation between the OpenAI schema and the upstream schema.
//!
//! # Data Flow
//! ```text
//! POST /v1/chat/completions body
//!     → InboundChatRequest (inbound.rs)
//!     → OutboundChatRequest::from_inbound (defaults applied)
//!
//! POST /v1/completions body
//!     → LegacyCompletionRequest (inbound.rs)
//!     → OutboundCompletionRequest::from_legacy (prompt wrapped as a user turn)
//! ```
//!
//! # Design Decisions
//! - No validation beyond JSON types; the upstream owns semantic checks
//! - Optional fields are omitted, never serialized as null

pub mod inbound;
pub mod outbound;

pub use inbound::{ChatMessage, InboundChatRequest, LegacyCompletionRequest};
pub use outbound::{OutboundChatRequest, OutboundCompletionRequest};
