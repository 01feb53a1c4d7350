use crate::TimeSource;
use std::time::{SystemTime, UNIX_EPOCH};

/// Reads [`SystemTime::now`] on every call.
///
/// This follows the host's wall clock exactly, including NTP steps backwards.
/// Generators absorb a backwards step by continuing from their last
/// timestamp, so IDs stay unique, but their timestamps run ahead of the clock
/// until it catches up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since) => i64::try_from(since.as_millis()).unwrap_or(i64::MAX),
            // clocks set before 1970 report negative millis
            Err(err) => i64::try_from(err.duration().as_millis()).map_or(i64::MIN, |ms| -ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CUSTOM_EPOCH;

    #[test]
    fn reports_time_after_the_custom_epoch() {
        assert!(SystemClock.current_millis() > CUSTOM_EPOCH);
    }
}
