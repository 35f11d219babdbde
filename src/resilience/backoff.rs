//! Capped exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

/// Delay before poll number `attempt` (zero-based).
///
/// Doubles from `base_ms` each attempt, never exceeds `max_ms` before
/// jitter, and adds up to 10% jitter on top.
pub fn poll_delay(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    let factor = 1u64.checked_shl(attempt.min(32)).unwrap_or(u64::MAX);
    let capped = base_ms.saturating_mul(factor).min(max_ms.max(base_ms));

    let jitter_range = capped / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped + jitter)
}
