//! Metrics collection.
//!
//! # Metrics
//! - `api_request_attempts_total` (counter): attempts by outcome (`success` or error kind)
//! - `api_retry_exhausted_total` (counter): guarded calls that ran out of retries
//! - `api_health_probes_total` (counter): health probes by reported status
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; no exporter is installed here,
//!   a host application may install its own recorder

use crate::health::HealthStatus;
use crate::resilience::ErrorKind;

pub fn record_attempt(kind: Option<ErrorKind>) {
    let outcome = kind.map_or("success", |k| k.as_str());
    metrics::counter!("api_request_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_retry_exhausted() {
    metrics::counter!("api_retry_exhausted_total").increment(1);
}

/// `None` records a probe whose request failed.
pub fn record_health_probe(status: Option<HealthStatus>) {
    let label = status.map_or("unreachable", |s| s.as_str());
    metrics::counter!("api_health_probes_total", "status" => label).increment(1);
}
