//! Backend origin resolution.
//!
//! # Data Flow
//! ```text
//! RuntimeMode + optional override + OriginConfig
//!     → resolver.rs (override > mode default)
//!     → origin.rs (parse & normalize)
//!     → BackendOrigin (immutable, held for process lifetime)
//! ```
//!
//! # Design Decisions
//! - Resolution is a pure function of its arguments; no process environment
//!   or global state is read here
//! - A missing origin is a configuration error, never a silent fallback

pub mod origin;
pub mod resolver;

pub use origin::BackendOrigin;
pub use resolver::{resolve_base_url, ConfigurationError, RuntimeMode};
