//! Failure classification.
//!
//! Rules are checked in order; the first match wins:
//! 1. no response + connection problem → `NetworkUnreachable`
//! 2. deadline exceeded → `Timeout`
//! 3. HTTP 401 → `AuthenticationRequired`
//! 4. any other HTTP status → `HttpStatusError`
//! 5. everything else → `Unknown`

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::transport::TransportFailure;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    NetworkUnreachable,
    Timeout,
    HttpStatusError,
    AuthenticationRequired,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NetworkUnreachable => "network_unreachable",
            ErrorKind::Timeout => "timeout",
            ErrorKind::HttpStatusError => "http_status_error",
            ErrorKind::AuthenticationRequired => "authentication_required",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct NormalizedError {
    pub kind: ErrorKind,
    /// Human-readable, never empty.
    pub message: String,
    /// Set for `HttpStatusError` and `AuthenticationRequired`.
    pub http_status: Option<u16>,
    /// The failure as observed by the transport.
    pub cause: TransportFailure,
}

/// Map a transport failure to exactly one [`ErrorKind`]. Never fails.
pub fn classify(failure: TransportFailure) -> NormalizedError {
    let detail = if failure.message.trim().is_empty() {
        "no further detail".to_string()
    } else {
        failure.message.clone()
    };

    let (kind, message, http_status) = match (failure.status, failure.connection) {
        (None, Some(cause)) => (
            ErrorKind::NetworkUnreachable,
            format!("Unable to reach the server ({}): {}", cause, detail),
            None,
        ),
        _ if failure.deadline_exceeded => (
            ErrorKind::Timeout,
            format!("Request timed out: {}", detail),
            None,
        ),
        (Some(401), _) => (
            ErrorKind::AuthenticationRequired,
            "Authentication required (HTTP 401)".to_string(),
            Some(401),
        ),
        (Some(code), _) => (
            ErrorKind::HttpStatusError,
            format!("Server responded with HTTP {}: {}", code, detail),
            Some(code),
        ),
        (None, None) => (ErrorKind::Unknown, format!("Unexpected error: {}", detail), None),
    };

    NormalizedError {
        kind,
        message,
        http_status,
        cause: failure,
    }
}

impl From<TransportFailure> for NormalizedError {
    fn from(failure: TransportFailure) -> Self {
        classify(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ConnectionCause;

    #[test]
    fn test_connection_failures_are_unreachable() {
        for cause in [
            ConnectionCause::Refused,
            ConnectionCause::Reset,
            ConnectionCause::Dns,
            ConnectionCause::Unreachable,
        ] {
            let err = classify(TransportFailure::connection(cause, "tcp connect error"));
            assert_eq!(err.kind, ErrorKind::NetworkUnreachable);
            assert_eq!(err.http_status, None);
            assert!(err.message.contains(cause.as_str()));
        }
    }

    #[test]
    fn test_deadline_is_timeout() {
        let err = classify(TransportFailure::timeout("operation timed out"));
        assert_eq!(err.kind, ErrorKind::Timeout);
        assert!(err.message.contains("timed out"));
    }

    #[test]
    fn test_unreachable_takes_precedence_over_timeout() {
        let mut failure = TransportFailure::connection(ConnectionCause::Refused, "refused");
        failure.deadline_exceeded = true;
        assert_eq!(classify(failure).kind, ErrorKind::NetworkUnreachable);
    }

    #[test]
    fn test_timeout_takes_precedence_over_status() {
        let mut failure = TransportFailure::status(503, "body read stalled");
        failure.deadline_exceeded = true;
        assert_eq!(classify(failure).kind, ErrorKind::Timeout);
    }

    #[test]
    fn test_401_is_authentication_required() {
        let err = classify(TransportFailure::status(401, "unauthorized"));
        assert_eq!(err.kind, ErrorKind::AuthenticationRequired);
        assert_eq!(err.http_status, Some(401));
    }

    #[test]
    fn test_other_statuses_carry_code() {
        for code in [400, 403, 404, 429, 500, 502, 503] {
            let err = classify(TransportFailure::status(code, "failed"));
            assert_eq!(err.kind, ErrorKind::HttpStatusError);
            assert_eq!(err.http_status, Some(code));
        }
    }

    #[test]
    fn test_response_with_connection_cause_is_http_error() {
        let mut failure = TransportFailure::status(500, "reset while reading body");
        failure.connection = Some(ConnectionCause::Reset);
        assert_eq!(classify(failure).kind, ErrorKind::HttpStatusError);
    }

    #[test]
    fn test_unknown_keeps_original_message() {
        let err = classify(TransportFailure::other("builder error: relative URL"));
        assert_eq!(err.kind, ErrorKind::Unknown);
        assert!(err.message.contains("builder error: relative URL"));
        assert_eq!(err.cause.message, "builder error: relative URL");
    }

    #[test]
    fn test_message_never_empty() {
        let err = classify(TransportFailure::other(""));
        assert_eq!(err.kind, ErrorKind::Unknown);
        assert!(!err.message.is_empty());
        assert_eq!(err.to_string(), err.message);
    }
}
