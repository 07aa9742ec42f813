//! Fixed-interval transmission plan.
//!
//! Throttle mode ignores the device's prompt. The first line of a download is
//! dropped (it is the section header or a placeholder) and the rest go out
//! one interval apart, all scheduled at once.

use std::time::Duration;

use crate::config::MAX_DELAY;

/// Offsets from the start of the download for each line to transmit.
///
/// Line `i` of the result (zero-based, after the first input line is
/// discarded) is due at `i * interval`. Offsets are non-decreasing. The
/// interval is clamped to [`MAX_DELAY`].
pub fn plan(lines: impl IntoIterator<Item = String>, interval: Duration) -> Vec<(Duration, String)> {
    let interval = interval.min(MAX_DELAY);
    lines
        .into_iter()
        .skip(1)
        .enumerate()
        .map(|(i, line)| (interval.saturating_mul(u32::try_from(i).unwrap_or(u32::MAX)), line))
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn lines(l: &[&str]) -> Vec<String> {
        l.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn header_dropped_rest_spaced() {
        let plan = plan(lines(&["HDR", "L1", "L2", "L3"]), Duration::from_millis(100));
        assert_eq!(
            plan,
            vec![
                (Duration::ZERO, "L1".to_string()),
                (Duration::from_millis(100), "L2".to_string()),
                (Duration::from_millis(200), "L3".to_string()),
            ]
        );
    }

    #[test]
    fn single_line_plans_nothing() {
        assert!(plan(lines(&["only"]), Duration::from_millis(5)).is_empty());
        assert!(plan(Vec::new(), Duration::from_millis(5)).is_empty());
    }

    #[test]
    fn zero_interval_sends_together() {
        let plan = plan(lines(&["h", "a", "b"]), Duration::ZERO);
        assert!(plan.iter().all(|(at, _)| at.is_zero()));
    }

    #[test]
    fn oversized_interval_clamped() {
        let input: Vec<String> = (0..4).map(|i| i.to_string()).collect();
        let plan = plan(input, Duration::MAX);
        assert_eq!(plan.last().map(|(at, _)| *at), Some(MAX_DELAY * 2));
    }

    proptest! {
        #[test]
        fn offsets_non_decreasing(n in 0usize..64, ms in 0u64..10_000) {
            let input: Vec<String> = (0..n).map(|i| i.to_string()).collect();
            let plan = plan(input, Duration::from_millis(ms));

            prop_assert_eq!(plan.len(), n.saturating_sub(1));
            for pair in plan.windows(2) {
                prop_assert!(pair[0].0 <= pair[1].0);
            }
        }
    }
}
