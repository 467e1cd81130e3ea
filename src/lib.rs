//! Resilient API connectivity layer.

pub mod config;
pub mod environment;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod transport;
pub mod verify;

pub use config::schema::ConnectivityConfig;
pub use environment::{resolve_base_url, BackendOrigin, ConfigurationError, RuntimeMode};
pub use health::{HealthProber, HealthReport};
pub use resilience::{classify, retry, ErrorKind, NormalizedError, Retrier, RetryError, RetryPolicy};
