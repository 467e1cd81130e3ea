//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Resolver, retries, prober, harness produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (attempt and probe counters)
//! ```
//!
//! # Design Decisions
//! - Structured fields (origin, attempt, kind, delay_ms) for machine parsing
//! - Each harness run carries a run ID span

pub mod logging;
pub mod metrics;
