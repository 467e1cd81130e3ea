//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Guarded call:
//!     → retries.rs (invoke operation, one attempt at a time)
//!     → timeouts.rs (each attempt bounded by its own deadline)
//!     → On failure: classify.rs (map to ErrorKind + message)
//!     → retries.rs (predicate says retry? sleep backoff.rs delay, try again)
//!     → On exhaustion: NormalizedError surfaces to the caller
//! ```
//!
//! # Design Decisions
//! - Classification is computed from the failure value, never from error type identity
//! - All kinds retry unless a caller predicate marks them terminal
//! - Backoff sleeps are cooperative (tokio timers), never thread-blocking
//! - No circuit breaking and no shared retry budget: state is per call

pub mod backoff;
pub mod classify;
pub mod retries;
pub mod timeouts;

pub use classify::{classify, ErrorKind, NormalizedError};
pub use retries::{retry, AttemptLog, AttemptOutcome, PolicyError, Retrier, RetryError, RetryPolicy};
