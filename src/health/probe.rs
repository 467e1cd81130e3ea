//! Health probing.
//!
//! # Responsibilities
//! - Issue one bounded GET to `{origin}/health`
//! - Parse the body into a `HealthReport`
//! - Classify request failures
//!
//! # Design Decisions
//! - No internal retries; callers compose with `Retrier` explicitly
//! - Unexpected payloads degrade to `status: error` instead of failing

use std::time::Duration;

use crate::environment::BackendOrigin;
use crate::health::report::HealthReport;
use crate::observability::metrics;
use crate::resilience::{classify, NormalizedError};
use crate::transport::HttpTransport;

pub const DEFAULT_HEALTH_PATH: &str = "/health";

#[derive(Debug, Clone)]
pub struct HealthProber {
    transport: HttpTransport,
    path: String,
}

impl HealthProber {
    pub fn new(transport: HttpTransport) -> Self {
        Self {
            transport,
            path: DEFAULT_HEALTH_PATH.to_string(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub async fn probe(
        &self,
        origin: &BackendOrigin,
        timeout: Duration,
    ) -> Result<HealthReport, NormalizedError> {
        let url = origin.join(&self.path);

        match self.transport.get(&url, timeout).await {
            Ok(response) => {
                let report = HealthReport::parse(&response.body);
                metrics::record_health_probe(Some(report.status));
                tracing::info!(
                    origin = %origin,
                    status = %report.status,
                    database = %report.database.status,
                    "Health probe answered"
                );
                Ok(report)
            }
            Err(failure) => {
                let error = classify(failure);
                metrics::record_health_probe(None);
                tracing::warn!(
                    origin = %origin,
                    kind = %error.kind,
                    error = %error,
                    "Health probe failed"
                );
                Err(error)
            }
        }
    }

    /// True iff the health endpoint answered 2xx within `timeout`.
    pub async fn is_available(&self, origin: &BackendOrigin, timeout: Duration) -> bool {
        self.probe(origin, timeout).await.is_ok()
    }
}
