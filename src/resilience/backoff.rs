//! Exponential backoff with optional cap and jitter.

use std::time::Duration;
use rand::Rng;

/// Delay before retry number `attempt + 1`: `initial_ms * factor^attempt`.
///
/// `max_ms` caps the delay and `jitter_ratio` adds up to that fraction of the
/// capped delay at random. With no cap and zero jitter the result is exact.
pub fn calculate_backoff(
    attempt: u32,
    initial_ms: u64,
    factor: f64,
    max_ms: Option<u64>,
    jitter_ratio: f64,
) -> Duration {
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    let raw = initial_ms as f64 * factor.max(1.0).powi(exponent);
    let delay_ms = if raw.is_finite() && raw < u64::MAX as f64 {
        raw.round() as u64
    } else {
        u64::MAX
    };
    let capped_delay = max_ms.map_or(delay_ms, |max| delay_ms.min(max));

    let jitter_range = (capped_delay as f64 * jitter_ratio.clamp(0.0, 1.0)) as u64;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..=jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay.saturating_add(jitter))
}
