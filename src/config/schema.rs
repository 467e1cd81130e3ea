//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! connectivity layer and its verification harness.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::resilience::retries::RetryPolicy;

/// Production deployment the harness verifies by default.
pub const DEFAULT_PRODUCTION_ORIGIN: &str = "https://studentlifemanagementsystem.onrender.com";

/// Local backend started with its default port.
pub const DEFAULT_DEVELOPMENT_ORIGIN: &str = "http://localhost:5000";

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ConnectivityConfig {
    /// Backend origins per runtime mode.
    pub origins: OriginConfig,

    /// Retry policy applied by guarded calls.
    pub retry: RetryConfig,

    /// Per-attempt timeouts.
    pub timeouts: TimeoutConfig,

    /// Verification harness settings.
    pub harness: HarnessConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Backend origins. An empty string counts as "not configured".
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Origin used in production mode.
    pub production: Option<String>,

    /// Origin used in development mode.
    pub development: Option<String>,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            production: Some(DEFAULT_PRODUCTION_ORIGIN.to_string()),
            development: Some(DEFAULT_DEVELOPMENT_ORIGIN.to_string()),
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the initial attempt.
    pub max_retries: u32,

    /// Delay before the first retry in milliseconds.
    pub initial_delay_ms: u64,

    /// Multiplier applied to the delay after each retry.
    pub factor: f64,

    /// Upper bound on a single delay in milliseconds (0 = uncapped).
    pub max_delay_ms: u64,

    /// Random extra delay as a fraction of the computed delay (0.0 = none).
    pub jitter_ratio: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay_ms: 500,
            factor: 2.0,
            max_delay_ms: 0,
            jitter_ratio: 0.0,
        }
    }
}

impl RetryConfig {
    /// Build the policy described by this table.
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_delay_ms: self.initial_delay_ms,
            factor: self.factor,
            max_delay_ms: (self.max_delay_ms > 0).then_some(self.max_delay_ms),
            jitter_ratio: self.jitter_ratio,
        }
    }
}

/// Timeouts in milliseconds. Each applies to a single attempt.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Health probe timeout in development mode.
    pub health_ms: u64,

    /// Health probe timeout in production mode (cold starts are slow).
    pub production_health_ms: u64,

    /// Timeout for the unauthenticated protected-endpoint probe.
    pub auth_probe_ms: u64,

    /// Timeout for the connection-refused probe.
    pub refused_probe_ms: u64,

    /// Timeout for each attempt of the retry probe.
    pub retry_probe_ms: u64,

    /// Deliberately tiny timeout used to provoke a deadline failure.
    pub timeout_probe_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            health_ms: 5_000,
            production_health_ms: 10_000,
            auth_probe_ms: 5_000,
            refused_probe_ms: 2_000,
            retry_probe_ms: 1_000,
            timeout_probe_ms: 1,
        }
    }
}

/// Verification harness configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Origin with nothing listening, used by the failure scenarios.
    pub unreachable_origin: String,

    /// Protected endpoint expected to answer 401 without credentials.
    pub protected_path: String,

    /// Health endpoint path.
    pub health_path: String,

    /// Origin a production run must resolve to.
    pub expected_production_origin: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            unreachable_origin: "http://localhost:9999".to_string(),
            protected_path: "/admin/dashboard".to_string(),
            health_path: "/health".to_string(),
            expected_production_origin: DEFAULT_PRODUCTION_ORIGIN.to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "api_connectivity=info".to_string(),
            json: false,
        }
    }
}
