//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! probe.rs:
//!     GET {origin}/health with per-call timeout
//!     → success: report.rs parses the body (lenient)
//!     → failure: resilience::classify
//! ```
//!
//! # Design Decisions
//! - Reports are transient: built per probe, never cached
//! - Probing never retries on its own

pub mod probe;
pub mod report;

pub use probe::HealthProber;
pub use report::{DatabaseHealth, DatabaseStatus, HealthReport, HealthStatus};
