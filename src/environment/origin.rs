//! Validated backend origin.

use std::fmt;

use url::Url;

use crate::environment::resolver::ConfigurationError;

/// Scheme + host (+ port) of a backend deployment, without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackendOrigin(String);

impl BackendOrigin {
    /// Parse and normalize an origin string.
    ///
    /// Accepts `http` and `https` origins, optionally with a path prefix.
    /// Trailing slashes are stripped so that joining paths never produces `//`.
    pub fn parse(raw: &str) -> Result<Self, ConfigurationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ConfigurationError::InvalidOrigin {
                value: raw.to_string(),
                reason: "origin is empty".to_string(),
            });
        }

        let url = Url::parse(trimmed).map_err(|e| ConfigurationError::InvalidOrigin {
            value: raw.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigurationError::InvalidOrigin {
                value: raw.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        if url.host_str().is_none() {
            return Err(ConfigurationError::InvalidOrigin {
                value: raw.to_string(),
                reason: "missing host".to_string(),
            });
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(ConfigurationError::InvalidOrigin {
                value: raw.to_string(),
                reason: "query and fragment are not allowed".to_string(),
            });
        }

        let normalized = url.as_str().trim_end_matches('/').to_string();
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build a full URL for `path` under this origin.
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }
}

impl fmt::Display for BackendOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
