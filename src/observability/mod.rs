//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and the management client produce:
//!     → logging.rs (structured log events, one span per HTTP request)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape, off by default)
//! ```

pub mod logging;
pub mod metrics;
