//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and the stream relay produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every span and the upstream call
//! - The credential is never logged

pub mod logging;
pub mod metrics;
