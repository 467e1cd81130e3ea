//! HTTP transport seam.
//!
//! # Responsibilities
//! - Issue GET requests with a per-attempt deadline
//! - Turn every failure (connect, deadline, non-2xx) into a `TransportFailure`
//!   that records only its observable shape
//!
//! # Design Decisions
//! - Non-2xx responses are failures, mirroring common HTTP client behaviour
//! - Classification happens elsewhere (resilience::classify); this module
//!   never decides retry vs. propagate

pub mod client;
pub mod failure;

pub use client::{ApiClient, ApiResponse, HttpTransport};
pub use failure::{ConnectionCause, TransportFailure};
