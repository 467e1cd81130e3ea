//! Retry orchestration.
//!
//! # Responsibilities
//! - Invoke an operation up to `max_retries + 1` times
//! - Classify every failure and decide retry vs. propagate
//! - Sleep with exponential backoff between attempts without blocking the runtime
//! - Stop immediately when the caller's cancellation signal fires
//!
//! # Design Decisions
//! - Every kind is retried unless a caller-supplied predicate says otherwise
//! - Policy and attempt log are scoped to one invocation; nothing is shared
//! - Timeouts belong to the operation (one fresh window per attempt)

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Instant;

use crate::lifecycle::CancelToken;
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;
use crate::resilience::classify::{classify, ErrorKind, NormalizedError};
use crate::transport::TransportFailure;

/// Retry parameters for one guarded call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay_ms: u64,
    /// Delay multiplier, at least 1.
    pub factor: f64,
    /// Optional cap on a single delay.
    pub max_delay_ms: Option<u64>,
    /// Random extra delay as a fraction of the computed delay.
    pub jitter_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    #[error("initial delay must be positive")]
    ZeroInitialDelay,

    #[error("backoff factor must be a finite number >= 1, got {0}")]
    InvalidFactor(f64),

    #[error("jitter ratio must be within [0, 1], got {0}")]
    InvalidJitter(f64),
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay_ms: u64, factor: f64) -> Result<Self, PolicyError> {
        let policy = Self {
            max_retries,
            initial_delay_ms,
            factor,
            max_delay_ms: None,
            jitter_ratio: 0.0,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.initial_delay_ms == 0 {
            return Err(PolicyError::ZeroInitialDelay);
        }
        if !self.factor.is_finite() || self.factor < 1.0 {
            return Err(PolicyError::InvalidFactor(self.factor));
        }
        if !(0.0..=1.0).contains(&self.jitter_ratio) {
            return Err(PolicyError::InvalidJitter(self.jitter_ratio));
        }
        Ok(())
    }

    /// Initial try plus every retry.
    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay slept after failed attempt number `attempt` (0-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        calculate_backoff(
            attempt,
            self.initial_delay_ms,
            self.factor,
            self.max_delay_ms,
            self.jitter_ratio,
        )
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay_ms: 500,
            factor: 2.0,
            max_delay_ms: None,
            jitter_ratio: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Succeeded,
    Failed {
        kind: ErrorKind,
        message: String,
        /// Backoff slept afterwards; `None` when no retry followed.
        delay: Option<Duration>,
    },
    /// Abandoned in flight when the run was cancelled.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    /// 1-based attempt number.
    pub attempt: u32,
    pub outcome: AttemptOutcome,
    pub elapsed: Duration,
}

/// Ordered, append-only record of one invocation's attempts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttemptLog {
    records: Vec<AttemptRecord>,
}

impl AttemptLog {
    fn push(&mut self, outcome: AttemptOutcome, elapsed: Duration) {
        let attempt = self.records.len() as u32 + 1;
        self.records.push(AttemptRecord {
            attempt,
            outcome,
            elapsed,
        });
    }

    pub fn attempts(&self) -> u32 {
        self.records.len() as u32
    }

    pub fn records(&self) -> &[AttemptRecord] {
        &self.records
    }

    pub fn failures(&self) -> impl Iterator<Item = ErrorKind> + '_ {
        self.records.iter().filter_map(|r| match r.outcome {
            AttemptOutcome::Failed { kind, .. } => Some(kind),
            AttemptOutcome::Succeeded | AttemptOutcome::Cancelled => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetryError {
    /// Every allowed attempt failed.
    #[error("{error} (gave up after {attempts} attempts)")]
    Exhausted { error: NormalizedError, attempts: u32 },

    /// The predicate marked the failure as not worth retrying.
    #[error("{error} (not retried)")]
    Aborted { error: NormalizedError, attempts: u32 },

    /// The caller's cancellation signal fired.
    #[error("operation cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },
}

impl RetryError {
    /// The last classified failure, if the call ended on one.
    pub fn normalized(&self) -> Option<&NormalizedError> {
        match self {
            RetryError::Exhausted { error, .. } | RetryError::Aborted { error, .. } => Some(error),
            RetryError::Cancelled { .. } => None,
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        self.normalized().map(|e| e.kind)
    }

    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. }
            | RetryError::Aborted { attempts, .. }
            | RetryError::Cancelled { attempts } => *attempts,
        }
    }
}

type RetryPredicate = Arc<dyn Fn(ErrorKind) -> bool + Send + Sync>;

/// Runs operations under a [`RetryPolicy`].
#[derive(Clone)]
pub struct Retrier {
    policy: RetryPolicy,
    retryable: Option<RetryPredicate>,
    cancel: CancelToken,
}

impl fmt::Debug for Retrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retrier")
            .field("policy", &self.policy)
            .field("predicate", &self.retryable.is_some())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl Retrier {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            retryable: None,
            cancel: CancelToken::never(),
        }
    }

    /// Only retry kinds for which `predicate` returns true.
    pub fn with_predicate<P>(mut self, predicate: P) -> Self
    where
        P: Fn(ErrorKind) -> bool + Send + Sync + 'static,
    {
        self.retryable = Some(Arc::new(predicate));
        self
    }

    /// Abort the in-flight attempt and skip further retries once `token` fires.
    pub fn with_cancellation(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn run<T, E, F, Fut>(&self, operation: F) -> Result<T, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<TransportFailure>,
    {
        self.run_logged(operation).await.0
    }

    /// Like [`Retrier::run`], also returning the per-attempt log.
    pub async fn run_logged<T, E, F, Fut>(&self, mut operation: F) -> (Result<T, RetryError>, AttemptLog)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<TransportFailure>,
    {
        let mut log = AttemptLog::default();
        let mut attempt: u32 = 0;

        loop {
            if self.cancel.is_cancelled() {
                tracing::info!(attempts = attempt, "Cancelled before next attempt");
                return (Err(RetryError::Cancelled { attempts: attempt }), log);
            }

            let started = Instant::now();
            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                result = operation() => Some(result),
            };

            let Some(result) = result else {
                log.push(AttemptOutcome::Cancelled, started.elapsed());
                tracing::info!(attempt = attempt + 1, "Cancelled during attempt");
                return (Err(RetryError::Cancelled { attempts: attempt + 1 }), log);
            };

            let error = match result {
                Ok(value) => {
                    log.push(AttemptOutcome::Succeeded, started.elapsed());
                    metrics::record_attempt(None);
                    tracing::debug!(attempt = attempt + 1, "Attempt succeeded");
                    return (Ok(value), log);
                }
                Err(e) => classify(e.into()),
            };
            metrics::record_attempt(Some(error.kind));

            if let Some(retryable) = &self.retryable {
                if !retryable(error.kind) {
                    log.push(failed(&error, None), started.elapsed());
                    tracing::warn!(
                        attempt = attempt + 1,
                        kind = %error.kind,
                        error = %error,
                        "Attempt failed, not retryable"
                    );
                    return (
                        Err(RetryError::Aborted {
                            error,
                            attempts: attempt + 1,
                        }),
                        log,
                    );
                }
            }

            if attempt >= self.policy.max_retries {
                log.push(failed(&error, None), started.elapsed());
                metrics::record_retry_exhausted();
                tracing::warn!(
                    attempts = attempt + 1,
                    kind = %error.kind,
                    error = %error,
                    "Retries exhausted"
                );
                return (
                    Err(RetryError::Exhausted {
                        error,
                        attempts: attempt + 1,
                    }),
                    log,
                );
            }

            let delay = self.policy.delay_for_attempt(attempt);
            log.push(failed(&error, Some(delay)), started.elapsed());
            tracing::warn!(
                attempt = attempt + 1,
                max_attempts = self.policy.total_attempts(),
                kind = %error.kind,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Attempt failed, retrying"
            );

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::info!(attempts = attempt + 1, "Cancelled during backoff");
                    return (Err(RetryError::Cancelled { attempts: attempt + 1 }), log);
                }
                _ = tokio::time::sleep(delay) => {}
            }

            attempt += 1;
        }
    }
}

fn failed(error: &NormalizedError, delay: Option<Duration>) -> AttemptOutcome {
    AttemptOutcome::Failed {
        kind: error.kind,
        message: error.message.clone(),
        delay,
    }
}

/// Run `operation` under `policy` with every kind retryable.
pub async fn retry<T, E, F, Fut>(operation: F, policy: &RetryPolicy) -> Result<T, RetryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<TransportFailure>,
{
    Retrier::new(policy.clone()).run(operation).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Cancellation;
    use crate::transport::ConnectionCause;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn refused() -> TransportFailure {
        TransportFailure::connection(ConnectionCause::Refused, "tcp connect error: Connection refused")
    }

    fn policy() -> RetryPolicy {
        RetryPolicy::new(2, 500, 2.0).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_makes_exactly_three_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let started = Instant::now();

        let result: Result<(), _> = retry(
            || {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err(refused())
                }
            },
            &policy(),
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let err = result.unwrap_err();
        assert_eq!(err.attempts(), 3);
        assert_eq!(err.kind(), Some(ErrorKind::NetworkUnreachable));
        assert!(matches!(err, RetryError::Exhausted { .. }));
        // 500 ms + 1000 ms of backoff
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(1500), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(1600), "elapsed {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_second_call() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();

        let (result, log) = Retrier::new(policy())
            .run_logged(|| {
                let c = c.clone();
                async move {
                    if c.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(TransportFailure::timeout("deadline"))
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(log.attempts(), 2);
        assert_eq!(log.failures().collect::<Vec<_>>(), vec![ErrorKind::Timeout]);
        assert_eq!(log.records()[1].outcome, AttemptOutcome::Succeeded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_is_single_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let policy = RetryPolicy::new(0, 100, 1.0).unwrap();

        let result: Result<(), _> = retry(
            || {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err(TransportFailure::status(503, "unavailable"))
                }
            },
            &policy,
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.unwrap_err().kind(), Some(ErrorKind::HttpStatusError));
    }

    #[tokio::test(start_paused = true)]
    async fn test_authentication_retried_by_default() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();

        let result: Result<(), _> = retry(
            || {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err(TransportFailure::status(401, "unauthorized"))
                }
            },
            &policy(),
        )
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.unwrap_err().kind(), Some(ErrorKind::AuthenticationRequired));
    }

    #[tokio::test(start_paused = true)]
    async fn test_predicate_stops_terminal_kinds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();

        let retrier = Retrier::new(policy())
            .with_predicate(|kind| kind != ErrorKind::AuthenticationRequired);
        let (result, log): (Result<(), _>, _) = retrier
            .run_logged(|| {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err(TransportFailure::status(401, "unauthorized"))
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(log.attempts(), 1);
        let err = result.unwrap_err();
        assert!(matches!(err, RetryError::Aborted { attempts: 1, .. }));
        assert_eq!(err.normalized().and_then(|e| e.http_status), Some(401));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_delays_recorded() {
        let (result, log): (Result<(), _>, _) = Retrier::new(RetryPolicy::new(3, 100, 3.0).unwrap())
            .run_logged(|| async { Err(refused()) })
            .await;

        assert!(result.is_err());
        let delays: Vec<_> = log
            .records()
            .iter()
            .map(|r| match &r.outcome {
                AttemptOutcome::Failed { delay, .. } => *delay,
                AttemptOutcome::Succeeded | AttemptOutcome::Cancelled => None,
            })
            .collect();
        assert_eq!(
            delays,
            vec![
                Some(Duration::from_millis(100)),
                Some(Duration::from_millis(300)),
                Some(Duration::from_millis(900)),
                None,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_during_backoff_stops_retries() {
        let cancellation = Cancellation::new();
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();

        let retrier = Retrier::new(RetryPolicy::new(5, 1_000, 2.0).unwrap())
            .with_cancellation(cancellation.token());

        let canceller = async {
            tokio::time::sleep(Duration::from_millis(1_500)).await;
            cancellation.cancel();
        };
        let run = retrier.run(|| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(refused())
            }
        });

        let (result, _) = tokio::join!(run, canceller);

        // attempt 1 at t=0, attempt 2 at t=1000, cancelled while waiting 2000
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(result.unwrap_err(), RetryError::Cancelled { attempts: 2 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_aborts_in_flight_attempt() {
        let cancellation = Cancellation::new();
        let retrier = Retrier::new(policy()).with_cancellation(cancellation.token());

        let canceller = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancellation.cancel();
        };
        let run = retrier.run(|| async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, TransportFailure>(())
        });

        let started = Instant::now();
        let (result, _) = tokio::join!(run, canceller);
        assert_eq!(result.unwrap_err(), RetryError::Cancelled { attempts: 1 });
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_log_records_attempt_cancelled_in_flight() {
        let cancellation = Cancellation::new();
        let retrier = Retrier::new(RetryPolicy::new(3, 100, 2.0).unwrap())
            .with_cancellation(cancellation.token());
        let calls = AtomicU32::new(0);

        let canceller = async {
            // attempt 1 fails at t=0, attempt 2 starts at t=100 and hangs
            tokio::time::sleep(Duration::from_millis(150)).await;
            cancellation.cancel();
        };
        let run = retrier.run_logged(|| {
            let call = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if call == 0 {
                    return Err(refused());
                }
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            }
        });

        let ((result, log), _) = tokio::join!(run, canceller);
        let err = result.unwrap_err();
        assert_eq!(err, RetryError::Cancelled { attempts: 2 });
        assert_eq!(log.attempts(), err.attempts());
        assert_eq!(log.records()[1].attempt, 2);
        assert_eq!(log.records()[1].outcome, AttemptOutcome::Cancelled);
        assert_eq!(log.failures().collect::<Vec<_>>(), vec![ErrorKind::NetworkUnreachable]);
    }

    #[tokio::test]
    async fn test_already_cancelled_makes_no_attempt() {
        let cancellation = Cancellation::new();
        cancellation.cancel();
        let calls = AtomicU32::new(0);

        let result = Retrier::new(policy())
            .with_cancellation(cancellation.token())
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, TransportFailure>(()) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(result.unwrap_err(), RetryError::Cancelled { attempts: 0 });
    }

    #[test]
    fn test_policy_validation() {
        assert_eq!(RetryPolicy::new(1, 0, 2.0), Err(PolicyError::ZeroInitialDelay));
        assert!(matches!(RetryPolicy::new(1, 10, 0.5), Err(PolicyError::InvalidFactor(_))));
        assert!(matches!(RetryPolicy::new(1, 10, f64::NAN), Err(PolicyError::InvalidFactor(_))));
        assert_eq!(RetryPolicy::default().total_attempts(), 3);
    }
}
