//! Everything a scenario needs, resolved once per run.

use std::time::Duration;

use thiserror::Error;

use crate::config::ConnectivityConfig;
use crate::environment::{resolve_base_url, BackendOrigin, ConfigurationError, RuntimeMode};
use crate::health::HealthProber;
use crate::lifecycle::CancelToken;
use crate::transport::HttpTransport;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Inputs shared by all scenarios of one run.
///
/// Development and production runs differ only in the values held here.
#[derive(Debug, Clone)]
pub struct HarnessContext {
    pub mode: RuntimeMode,
    pub origin: BackendOrigin,
    /// An explicit origin override is in force.
    pub overridden: bool,
    pub unreachable: BackendOrigin,
    pub config: ConnectivityConfig,
    pub transport: HttpTransport,
    pub prober: HealthProber,
    pub cancel: CancelToken,
}

impl HarnessContext {
    pub fn new(
        mode: RuntimeMode,
        override_origin: Option<&str>,
        config: ConnectivityConfig,
        cancel: CancelToken,
    ) -> Result<Self, HarnessError> {
        let transport = HttpTransport::new()?;
        Self::with_transport(mode, override_origin, config, cancel, transport)
    }

    pub fn with_transport(
        mode: RuntimeMode,
        override_origin: Option<&str>,
        config: ConnectivityConfig,
        cancel: CancelToken,
        transport: HttpTransport,
    ) -> Result<Self, HarnessError> {
        let origin = resolve_base_url(mode, override_origin, &config.origins)?;
        let unreachable = BackendOrigin::parse(&config.harness.unreachable_origin)?;
        let overridden = override_origin.is_some_and(|s| !s.trim().is_empty());
        let prober = HealthProber::new(transport.clone()).with_path(config.harness.health_path.clone());

        Ok(Self {
            mode,
            origin,
            overridden,
            unreachable,
            config,
            transport,
            prober,
            cancel,
        })
    }

    /// Health probe timeout for the current mode.
    pub fn health_timeout(&self) -> Duration {
        let ms = match self.mode {
            RuntimeMode::Development => self.config.timeouts.health_ms,
            RuntimeMode::Production => self.config.timeouts.production_health_ms,
        };
        Duration::from_millis(ms)
    }
}
