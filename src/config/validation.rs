//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (delays > 0, factor >= 1, timeouts > 0)
//! - Check that configured origins are well formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ConnectivityConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::ConnectivityConfig;
use crate::environment::BackendOrigin;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &ConnectivityConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let retry = &config.retry;
    if retry.initial_delay_ms == 0 {
        errors.push(ValidationError::new("retry.initial_delay_ms", "must be positive"));
    }
    if !retry.factor.is_finite() || retry.factor < 1.0 {
        errors.push(ValidationError::new("retry.factor", "must be a finite number >= 1"));
    }
    if !(0.0..=1.0).contains(&retry.jitter_ratio) {
        errors.push(ValidationError::new("retry.jitter_ratio", "must be within [0, 1]"));
    }

    let timeouts = &config.timeouts;
    for (field, value) in [
        ("timeouts.health_ms", timeouts.health_ms),
        ("timeouts.production_health_ms", timeouts.production_health_ms),
        ("timeouts.auth_probe_ms", timeouts.auth_probe_ms),
        ("timeouts.refused_probe_ms", timeouts.refused_probe_ms),
        ("timeouts.retry_probe_ms", timeouts.retry_probe_ms),
        ("timeouts.timeout_probe_ms", timeouts.timeout_probe_ms),
    ] {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be positive"));
        }
    }

    for (field, value) in [
        ("origins.production", config.origins.production.as_deref()),
        ("origins.development", config.origins.development.as_deref()),
        ("harness.unreachable_origin", Some(config.harness.unreachable_origin.as_str())),
        (
            "harness.expected_production_origin",
            Some(config.harness.expected_production_origin.as_str()),
        ),
    ] {
        // Empty origins mean "not configured"; resolution reports those.
        if let Some(raw) = value.filter(|s| !s.trim().is_empty()) {
            if let Err(e) = BackendOrigin::parse(raw) {
                errors.push(ValidationError::new(field, e.to_string()));
            }
        }
    }
    for (field, value) in [
        ("harness.unreachable_origin", &config.harness.unreachable_origin),
        (
            "harness.expected_production_origin",
            &config.harness.expected_production_origin,
        ),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::new(field, "must not be empty"));
        }
    }

    for (field, path) in [
        ("harness.health_path", &config.harness.health_path),
        ("harness.protected_path", &config.harness.protected_path),
    ] {
        if !path.starts_with('/') {
            errors.push(ValidationError::new(field, "must start with '/'"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
