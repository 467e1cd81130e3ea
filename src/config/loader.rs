//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ConnectivityConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides the production origin.
pub const PRODUCTION_ORIGIN_VAR: &str = "API_PRODUCTION_ORIGIN";

/// Overrides the development origin.
pub const DEVELOPMENT_ORIGIN_VAR: &str = "API_DEVELOPMENT_ORIGIN";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Origin overrides captured from the process environment.
///
/// Read once at the binary edge and handed to [`load_config`], so library
/// code never consults ambient process state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub production_origin: Option<String>,
    pub development_origin: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            production_origin: std::env::var(PRODUCTION_ORIGIN_VAR).ok(),
            development_origin: std::env::var(DEVELOPMENT_ORIGIN_VAR).ok(),
        }
    }

    fn apply(&self, config: &mut ConnectivityConfig) {
        if let Some(origin) = &self.production_origin {
            config.origins.production = Some(origin.clone());
        }
        if let Some(origin) = &self.development_origin {
            config.origins.development = Some(origin.clone());
        }
    }
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str, env: &EnvOverrides) -> Result<ConnectivityConfig, ConfigError> {
    let mut config: ConnectivityConfig = toml::from_str(content)?;
    env.apply(&mut config);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load configuration from an optional TOML file, then apply environment overrides.
pub fn load_config(path: Option<&Path>, env: &EnvOverrides) -> Result<ConnectivityConfig, ConfigError> {
    let content = match path {
        Some(path) => fs::read_to_string(path)?,
        None => String::new(),
    };

    parse_config(&content, env)
}
