//! Interval arithmetic against store timestamps.
//!
//! The store stamps last-liquidation-check times in microseconds; both
//! service loops gate repeat work on whether a waterfall interval has
//! elapsed since that stamp.

use crate::types::TimestampMicros;
use std::time::Duration;

/// True when at least `interval` has elapsed since `last_check`.
pub fn is_interval_passed_micros(last_check: TimestampMicros, interval: Duration) -> bool {
    let now = TimestampMicros::now().as_micros();
    let passed = now - last_check.as_micros();
    passed >= interval.as_micros() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seven_seconds_beats_a_six_second_interval() {
        let last_check = TimestampMicros::from_micros(TimestampMicros::now().as_micros() - 7_000_000);
        assert!(is_interval_passed_micros(last_check, Duration::from_secs(6)));
    }

    #[test]
    fn one_second_does_not() {
        let last_check = TimestampMicros::from_micros(TimestampMicros::now().as_micros() - 1_000_000);
        assert!(!is_interval_passed_micros(last_check, Duration::from_secs(6)));
    }

    #[test]
    fn zero_interval_always_passes() {
        let last_check = TimestampMicros::now();
        assert!(is_interval_passed_micros(last_check, Duration::ZERO));
    }
}
