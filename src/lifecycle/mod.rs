//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Cancellation (cancellation.rs):
//!     Cancellation::cancel() → every CancelToken observes it
//!     → Retrier aborts the in-flight attempt, schedules no further retries
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Cancellation::cancel()
//! ```
//!
//! # Design Decisions
//! - Level-triggered: a token created after cancel still observes it
//! - Cancellation is explicit and passed down, never ambient

pub mod cancellation;
pub mod signals;

pub use cancellation::{CancelToken, Cancellation};
