//! Runtime mode and base URL resolution.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::schema::OriginConfig;
use crate::environment::origin::BackendOrigin;

/// Deployment mode the process is running in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    Development,
    #[default]
    Production,
}

impl RuntimeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeMode::Development => "development",
            RuntimeMode::Production => "production",
        }
    }
}

impl fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuntimeMode {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(RuntimeMode::Development),
            "prod" | "production" => Ok(RuntimeMode::Production),
            other => Err(ConfigurationError::UnknownMode(other.to_string())),
        }
    }
}

/// Setup defects detected while resolving an origin. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// No override and no configured origin for the requested mode.
    #[error("no backend origin configured for {mode} mode")]
    MissingOrigin { mode: RuntimeMode },

    /// Origin string is not a well-formed http(s) origin.
    #[error("invalid backend origin '{value}': {reason}")]
    InvalidOrigin { value: String, reason: String },

    /// Mode name not recognised.
    #[error("unknown runtime mode '{0}'")]
    UnknownMode(String),
}

/// Resolve the backend origin for `mode`.
///
/// A non-empty `override_origin` wins unconditionally. Otherwise the origin
/// configured for the mode is used; an empty or absent entry is a
/// [`ConfigurationError::MissingOrigin`].
pub fn resolve_base_url(
    mode: RuntimeMode,
    override_origin: Option<&str>,
    origins: &OriginConfig,
) -> Result<BackendOrigin, ConfigurationError> {
    if let Some(raw) = override_origin.filter(|s| !s.trim().is_empty()) {
        return BackendOrigin::parse(raw);
    }

    let configured = match mode {
        RuntimeMode::Production => origins.production.as_deref(),
        RuntimeMode::Development => origins.development.as_deref(),
    };

    match configured.filter(|s| !s.trim().is_empty()) {
        Some(raw) => BackendOrigin::parse(raw),
        None => Err(ConfigurationError::MissingOrigin { mode }),
    }
}
