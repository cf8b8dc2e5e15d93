//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher and middleware produce:
//!     → tracing events (dispatch, failures, chain stages)
//!     → metrics.rs (counters, histograms) via the record_metrics stage
//!
//! Consumers:
//!     → logging.rs installs a subscriber (binaries only)
//!     → any `metrics` recorder the host application installs
//! ```
//!
//! # Design Decisions
//! - The library only emits; installing subscribers/recorders is the host's job
//! - Structured fields (method, url, status) on every event
//! - Metrics are cheap no-ops when no recorder is installed

pub mod logging;
pub mod metrics;
