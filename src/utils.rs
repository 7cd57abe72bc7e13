use std::time::Duration;
use tokio::time::Instant;

/// Render a duration for log fields with two decimals, e.g. `150.00ms`.
pub fn fmt_duration(d: Duration) -> String {
    format!("{d:.2?}")
}

/// Emit a warning naming `label` when more than `threshold` has passed since `start`.
///
/// Takes tokio's `Instant`, so paused test clocks measure fetches consistently.
pub fn log_if_slow(start: Instant, threshold: Duration, label: &str) {
    let elapsed = start.elapsed();
    if elapsed > threshold {
        tracing::warn!(
            duration = fmt_duration(elapsed),
            threshold = fmt_duration(threshold),
            "{label} was slow"
        );
    }
}

/// Saturating conversion to whole milliseconds.
pub fn as_millis_u64(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmt_duration_scales_units() {
        assert_eq!(fmt_duration(Duration::from_millis(1500)), "1.50s");
        assert_eq!(fmt_duration(Duration::from_micros(2500)), "2.50ms");
    }

    #[test]
    fn as_millis_saturates() {
        assert_eq!(as_millis_u64(Duration::from_millis(42)), 42);
        assert_eq!(as_millis_u64(Duration::MAX), u64::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn log_if_slow_follows_paused_clock() {
        let start = Instant::now();
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(start.elapsed(), Duration::from_secs(2));
        log_if_slow(start, Duration::from_secs(1), "enrollment fetch");
    }
}
