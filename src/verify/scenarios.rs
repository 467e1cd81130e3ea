//! Behavioural scenarios run against a resolved origin.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use crate::environment::BackendOrigin;
use crate::resilience::{classify, ErrorKind, Retrier, RetryError};
use crate::verify::context::HarnessContext;
use crate::verify::outcome::ScenarioOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    ApiConnection,
    ApiAvailability,
    ConnectionRefused,
    RetryMechanism,
    TimeoutHandling,
    ProductionBaseUrl,
    Authentication,
}

impl Scenario {
    /// Run in every mode.
    pub const GENERAL: [Scenario; 5] = [
        Scenario::ApiConnection,
        Scenario::ApiAvailability,
        Scenario::ConnectionRefused,
        Scenario::RetryMechanism,
        Scenario::TimeoutHandling,
    ];

    /// Run only against production.
    pub const PRODUCTION: [Scenario; 2] = [Scenario::ProductionBaseUrl, Scenario::Authentication];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::ApiConnection => "api_connection",
            Scenario::ApiAvailability => "api_availability",
            Scenario::ConnectionRefused => "connection_refused",
            Scenario::RetryMechanism => "retry_mechanism",
            Scenario::TimeoutHandling => "timeout_handling",
            Scenario::ProductionBaseUrl => "production_base_url",
            Scenario::Authentication => "authentication",
        }
    }

    pub async fn run(self, ctx: &HarnessContext) -> ScenarioOutcome {
        tracing::info!(scenario = self.name(), origin = %ctx.origin, "Running scenario");

        if ctx.cancel.is_cancelled() {
            return ScenarioOutcome::failed(self.name(), "Cancelled before start");
        }

        let work = async {
            match self {
                Scenario::ApiConnection => api_connection(ctx).await,
                Scenario::ApiAvailability => api_availability(ctx).await,
                Scenario::ConnectionRefused => connection_refused(ctx).await,
                Scenario::RetryMechanism => retry_mechanism(ctx).await,
                Scenario::TimeoutHandling => timeout_handling(ctx).await,
                Scenario::ProductionBaseUrl => production_base_url(ctx),
                Scenario::Authentication => authentication(ctx).await,
            }
        };

        // Dropping `work` aborts whatever request is in flight.
        let outcome = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => ScenarioOutcome::failed(self.name(), "Cancelled while running"),
            outcome = work => outcome,
        };

        if outcome.success() {
            tracing::info!(scenario = outcome.name, status = %outcome.status, message = %outcome.message, "Scenario finished");
        } else {
            tracing::error!(scenario = outcome.name, message = %outcome.message, "Scenario failed");
        }
        outcome
    }
}

/// Health endpoint answers with `status: ok` and a connected database.
pub async fn api_connection(ctx: &HarnessContext) -> ScenarioOutcome {
    const NAME: &str = "api_connection";

    match ctx.prober.probe(&ctx.origin, ctx.health_timeout()).await {
        Ok(report) if report.is_healthy() => {
            ScenarioOutcome::passed(NAME, "API connection successful")
                .with_detail("status", report.status.as_str())
                .with_detail("database", report.database.status.to_string())
        }
        Ok(report) => ScenarioOutcome::failed(
            NAME,
            format!(
                "API reachable but reports status '{}' with database '{}'",
                report.status, report.database.status
            ),
        )
        .with_detail("status", report.status.as_str())
        .with_detail("database", report.database.status.to_string()),
        Err(error) => ScenarioOutcome::failed(NAME, error.message)
            .with_detail("kind", error.kind.as_str()),
    }
}

/// The boolean availability check completes and reports its answer.
pub async fn api_availability(ctx: &HarnessContext) -> ScenarioOutcome {
    let available = ctx.prober.is_available(&ctx.origin, ctx.health_timeout()).await;
    let message = if available {
        "API is available"
    } else {
        "API is not available"
    };
    ScenarioOutcome::passed("api_availability", message).with_detail("available", available)
}

/// A request to an origin with nothing listening is classified as unreachable.
pub async fn connection_refused(ctx: &HarnessContext) -> ScenarioOutcome {
    const NAME: &str = "connection_refused";
    let timeout = Duration::from_millis(ctx.config.timeouts.refused_probe_ms);

    match ctx.transport.get(&ctx.unreachable.join("/"), timeout).await {
        Ok(_) => ScenarioOutcome::failed(NAME, "Expected connection to fail but it succeeded"),
        Err(failure) => {
            let error = classify(failure);
            if error.kind == ErrorKind::NetworkUnreachable {
                ScenarioOutcome::passed(NAME, "Connection refused error handled correctly")
                    .with_detail("error", error.message)
            } else {
                ScenarioOutcome::failed(NAME, "Error not correctly identified as unreachable")
                    .with_detail("kind", error.kind.as_str())
                    .with_detail("error", error.message)
            }
        }
    }
}

/// An always-failing call is attempted exactly `max_retries + 1` times.
pub async fn retry_mechanism(ctx: &HarnessContext) -> ScenarioOutcome {
    const NAME: &str = "retry_mechanism";
    let policy = ctx.config.retry.to_policy();
    let expected = policy.total_attempts();
    let timeout = Duration::from_millis(ctx.config.timeouts.retry_probe_ms);
    let url = ctx.unreachable.join("/");
    let calls = AtomicU32::new(0);

    let counter = &calls;
    let transport = &ctx.transport;
    let target = url.as_str();
    let retrier = Retrier::new(policy).with_cancellation(ctx.cancel.clone());
    let (result, log) = retrier
        .run_logged(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            tracing::info!(attempt = n, "Retry probe attempt");
            transport.get(target, timeout)
        })
        .await;

    let attempts = calls.load(Ordering::SeqCst);
    match result {
        Ok(_) => ScenarioOutcome::failed(NAME, "Expected all retries to fail but request succeeded")
            .with_detail("attempts", attempts),
        Err(RetryError::Cancelled { .. }) => {
            ScenarioOutcome::failed(NAME, "Cancelled before retries completed").with_detail("attempts", attempts)
        }
        Err(err) if attempts == expected && log.attempts() == expected => {
            ScenarioOutcome::passed(NAME, "Retry mechanism worked correctly")
                .with_detail("attempts", attempts)
                .with_detail("kind", err.kind().map_or("none", |k| k.as_str()))
        }
        Err(_) => ScenarioOutcome::failed(
            NAME,
            format!("Expected {} attempts but {} were made", expected, attempts),
        )
        .with_detail("attempts", attempts),
    }
}

/// A request with a near-zero deadline is classified as a timeout.
///
/// An origin that answers inside the deadline makes the result inconclusive.
pub async fn timeout_handling(ctx: &HarnessContext) -> ScenarioOutcome {
    const NAME: &str = "timeout_handling";
    let timeout = Duration::from_millis(ctx.config.timeouts.timeout_probe_ms);
    let url = ctx.origin.join(&ctx.config.harness.health_path);

    match ctx.transport.get(&url, timeout).await {
        Ok(_) => ScenarioOutcome::inconclusive(
            NAME,
            format!("Origin answered within {} ms; timeout not exercised", timeout.as_millis()),
        ),
        Err(failure) => {
            let error = classify(failure);
            if error.kind == ErrorKind::Timeout {
                ScenarioOutcome::passed(NAME, "Timeout error handled correctly")
            } else {
                ScenarioOutcome::failed(NAME, "Error not correctly identified as timeout")
                    .with_detail("kind", error.kind.as_str())
                    .with_detail("error", error.message)
            }
        }
    }
}

/// The origin in use is the deployment a production run must target.
pub fn production_base_url(ctx: &HarnessContext) -> ScenarioOutcome {
    const NAME: &str = "production_base_url";

    if ctx.overridden {
        return ScenarioOutcome::inconclusive(NAME, "Origin override in force; production origin not checked")
            .with_detail("url", ctx.origin.as_str());
    }

    match BackendOrigin::parse(&ctx.config.harness.expected_production_origin) {
        Ok(expected) if expected == ctx.origin => {
            ScenarioOutcome::passed(NAME, "API base URL is correctly set to production")
                .with_detail("url", ctx.origin.as_str())
        }
        Ok(expected) => ScenarioOutcome::failed(NAME, "API base URL is not set to production")
            .with_detail("actual", ctx.origin.as_str())
            .with_detail("expected", expected.as_str()),
        Err(e) => ScenarioOutcome::failed(NAME, e.to_string()),
    }
}

/// The protected endpoint refuses unauthenticated access with 401.
pub async fn authentication(ctx: &HarnessContext) -> ScenarioOutcome {
    const NAME: &str = "authentication";
    let timeout = Duration::from_millis(ctx.config.timeouts.auth_probe_ms);
    let url = ctx.origin.join(&ctx.config.harness.protected_path);

    match ctx.transport.get(&url, timeout).await {
        Ok(_) => ScenarioOutcome::failed(NAME, "Authentication not required for protected endpoint"),
        Err(failure) => {
            let error = classify(failure);
            if error.kind == ErrorKind::AuthenticationRequired {
                ScenarioOutcome::passed(NAME, "Authentication required for protected endpoint")
                    .with_detail("status", 401)
            } else {
                ScenarioOutcome::failed(NAME, "Unexpected error when testing authentication")
                    .with_detail("kind", error.kind.as_str())
                    .with_detail("error", error.message)
            }
        }
    }
}
