//! Observable shape of a failed request.

use std::error::Error as StdError;
use std::fmt;
use std::io;

/// Why a connection could not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionCause {
    Refused,
    Reset,
    Dns,
    Unreachable,
}

impl ConnectionCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionCause::Refused => "connection refused",
            ConnectionCause::Reset => "connection reset",
            ConnectionCause::Dns => "DNS resolution failed",
            ConnectionCause::Unreachable => "host unreachable",
        }
    }

    fn from_io_kind(kind: io::ErrorKind) -> Option<Self> {
        match kind {
            io::ErrorKind::ConnectionRefused => Some(ConnectionCause::Refused),
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => Some(ConnectionCause::Reset),
            io::ErrorKind::NotConnected | io::ErrorKind::AddrNotAvailable => {
                Some(ConnectionCause::Unreachable)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ConnectionCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed request, reduced to the facts a classifier may look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    /// Status code when the server answered.
    pub status: Option<u16>,
    /// OS-level connection problem, when one was observed.
    pub connection: Option<ConnectionCause>,
    /// The attempt ran past its deadline.
    pub deadline_exceeded: bool,
    /// Raw description from the transport.
    pub message: String,
}

impl TransportFailure {
    pub fn connection(cause: ConnectionCause, message: impl Into<String>) -> Self {
        Self {
            status: None,
            connection: Some(cause),
            deadline_exceeded: false,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            status: None,
            connection: None,
            deadline_exceeded: true,
            message: message.into(),
        }
    }

    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(code),
            connection: None,
            deadline_exceeded: false,
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self {
            status: None,
            connection: None,
            deadline_exceeded: false,
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for TransportFailure {}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        let deadline_exceeded = err.is_timeout();
        let message = error_chain(&err);

        // A connect that timed out is a deadline problem, not a refusal.
        let connection = if deadline_exceeded {
            None
        } else {
            connection_cause(&err).or_else(|| {
                err.is_connect().then(|| {
                    if looks_like_dns(&message) {
                        ConnectionCause::Dns
                    } else {
                        ConnectionCause::Unreachable
                    }
                })
            })
        };

        Self {
            status: err.status().map(|s| s.as_u16()),
            connection,
            deadline_exceeded,
            message,
        }
    }
}

fn connection_cause(err: &(dyn StdError + 'static)) -> Option<ConnectionCause> {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = source {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            if let Some(cause) = ConnectionCause::from_io_kind(io_err.kind()) {
                return Some(cause);
            }
        }
        source = e.source();
    }
    None
}

fn looks_like_dns(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("dns error")
        || lower.contains("failed to lookup address")
        || lower.contains("name or service not known")
        || lower.contains("no such host")
}

/// Join an error and its sources into one line.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(e) = source {
        let text = e.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = e.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Wrapper(io::Error);

    impl fmt::Display for Wrapper {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "client error (Connect)")
        }
    }

    impl StdError for Wrapper {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_cause_found_in_source_chain() {
        let err = Wrapper(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        assert_eq!(connection_cause(&err), Some(ConnectionCause::Refused));
        assert_eq!(error_chain(&err), "client error (Connect): refused");

        let err = Wrapper(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"));
        assert_eq!(connection_cause(&err), Some(ConnectionCause::Reset));

        let err = Wrapper(io::Error::new(io::ErrorKind::Other, "weird"));
        assert_eq!(connection_cause(&err), None);
    }

    #[test]
    fn test_dns_detection() {
        assert!(looks_like_dns("error sending request: dns error: failed to lookup address information"));
        assert!(!looks_like_dns("tcp connect error: Connection refused"));
    }
}
