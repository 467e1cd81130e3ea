//! Health report parsing.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Overall status reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Degraded,
    Error,
}

impl HealthStatus {
    /// Unrecognised values count as `Error`.
    fn from_field(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "ok" => HealthStatus::Ok,
            "degraded" => HealthStatus::Degraded,
            _ => HealthStatus::Error,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Ok => "ok",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Error => "error",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data store connectivity as seen by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseStatus {
    Connected,
    Disconnected,
    /// Any other value the backend sent.
    Other(String),
    /// Field absent or not a string.
    Unknown,
}

impl DatabaseStatus {
    fn from_field(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "connected" => DatabaseStatus::Connected,
            "disconnected" => DatabaseStatus::Disconnected,
            _ => DatabaseStatus::Other(value.to_string()),
        }
    }
}

impl fmt::Display for DatabaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseStatus::Connected => f.write_str("connected"),
            DatabaseStatus::Disconnected => f.write_str("disconnected"),
            DatabaseStatus::Other(s) => f.write_str(s),
            DatabaseStatus::Unknown => f.write_str("unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseHealth {
    pub status: DatabaseStatus,
}

/// Parsed `/health` body. Built fresh per probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub database: DatabaseHealth,
}

impl HealthReport {
    /// Parse a health body leniently.
    ///
    /// Invalid JSON or a missing/non-string `status` yields `HealthStatus::Error`;
    /// a missing `database.status` yields `DatabaseStatus::Unknown`.
    pub fn parse(body: &str) -> Self {
        let value: Value = serde_json::from_str(body).unwrap_or(Value::Null);
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Self {
        let status = value
            .get("status")
            .and_then(Value::as_str)
            .map_or(HealthStatus::Error, HealthStatus::from_field);

        let database = value
            .get("database")
            .and_then(|db| db.get("status"))
            .and_then(Value::as_str)
            .map_or(DatabaseStatus::Unknown, DatabaseStatus::from_field);

        Self {
            status,
            database: DatabaseHealth { status: database },
        }
    }

    /// Overall `ok` with a connected database.
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Ok && self.database.status == DatabaseStatus::Connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_healthy() {
        let report = HealthReport::parse(
            r#"{"status":"ok","database":{"status":"connected"},"uptime":12.5}"#,
        );
        assert_eq!(report.status, HealthStatus::Ok);
        assert_eq!(report.database.status, DatabaseStatus::Connected);
        assert!(report.is_healthy());
    }

    #[test]
    fn test_parse_degraded() {
        let report = HealthReport::parse(r#"{"status":"degraded","database":{"status":"disconnected"}}"#);
        assert_eq!(report.status, HealthStatus::Degraded);
        assert_eq!(report.database.status, DatabaseStatus::Disconnected);
        assert!(!report.is_healthy());
    }

    #[test]
    fn test_unexpected_shapes_degrade_to_error() {
        for body in ["", "not json", "[]", r#"{"status":42}"#, r#"{"database":{}}"#] {
            let report = HealthReport::parse(body);
            assert_eq!(report.status, HealthStatus::Error, "body: {}", body);
            assert_eq!(report.database.status, DatabaseStatus::Unknown, "body: {}", body);
        }
    }

    #[test]
    fn test_unknown_values_preserved() {
        let report = HealthReport::parse(r#"{"status":"starting","database":{"status":"connecting"}}"#);
        assert_eq!(report.status, HealthStatus::Error);
        assert_eq!(report.database.status, DatabaseStatus::Other("connecting".to_string()));
    }
}
