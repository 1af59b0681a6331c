//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (`resource`, `method`, `request_id`) on every event
//! - Request ID flows from the request-id layer into adapter logs
//! - Metric updates are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
