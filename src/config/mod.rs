//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, apply env overrides)
//!     → validation.rs (semantic checks)
//!     → ConnectivityConfig (validated, immutable)
//!     → passed by reference to resolver, prober and harness
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Environment variables are captured once, at the binary edge

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError, EnvOverrides};
pub use schema::ConnectivityConfig;
pub use schema::OriginConfig;
pub use schema::RetryConfig;
pub use schema::TimeoutConfig;
