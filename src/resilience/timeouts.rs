//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap a single attempt with its own deadline
//! - Cancel the attempt cleanly when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; dropping the future aborts in-flight I/O
//! - Deadlines are per attempt, never per retry sequence

use std::future::Future;
use std::time::Duration;

use crate::transport::TransportFailure;

/// Run `fut` with a deadline of `limit`.
///
/// An elapsed deadline yields a failure with `deadline_exceeded` set.
pub async fn with_timeout<T, E, Fut>(limit: Duration, fut: Fut) -> Result<T, TransportFailure>
where
    Fut: Future<Output = Result<T, E>>,
    E: Into<TransportFailure>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(TransportFailure::timeout(format!(
            "operation exceeded its {} ms deadline",
            limit.as_millis()
        ))),
    }
}
