use std::sync::Arc;

/// Custom epoch: Wednesday, January 1, 2025 00:00:00 UTC
pub const CUSTOM_EPOCH: i64 = 1_735_689_600_000;

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
pub const TWITTER_EPOCH: i64 = 1_288_834_974_657;

/// A source of wall-clock time in milliseconds since the Unix epoch.
///
/// Generators sample it once per ID. Plug in [`SystemClock`] or
/// [`MonotonicClock`] for production, or a fixed value in tests.
///
/// The epoch subtraction happens inside the generator, so implementations
/// must return absolute Unix time, not time relative to a custom epoch.
///
/// # Example
///
/// ```
/// use tickflake::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> i64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
///
/// [`SystemClock`]: crate::SystemClock
/// [`MonotonicClock`]: crate::MonotonicClock
pub trait TimeSource {
    /// Returns the current time in milliseconds since 1970-01-01 UTC.
    fn current_millis(&self) -> i64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> i64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_millis(&self) -> i64 {
        (**self).current_millis()
    }
}
