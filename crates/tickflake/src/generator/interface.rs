use crate::{IdLayout, IdParser};

/// The common capability of every generator: hand out the next ID.
///
/// Callers choose the implementation that matches their threading model:
///
/// - [`SequentialGenerator`]: one caller at a time, no synchronization
/// - [`ConcurrentGenerator`]: any number of threads sharing one instance
///
/// Both produce the same bit layout and both are non-blocking. When the
/// sequence space for the current millisecond runs out, the generator moves
/// its own logical clock one millisecond ahead instead of waiting for the
/// real clock. IDs stay unique and ordered at the cost of timestamps that can
/// briefly run ahead of wall time after a burst.
///
/// # Example
/// ```
/// use tickflake::{ConcurrentGenerator, IdSource, SequentialGenerator, SnowflakeConfig};
///
/// fn mint(source: &impl IdSource) -> u64 {
///     source.next_id()
/// }
///
/// let config = SnowflakeConfig::default();
/// let a = mint(&SequentialGenerator::new(&config, 1)?);
/// let b = mint(&ConcurrentGenerator::new(&config, 2)?);
/// assert_ne!(a, b);
/// # Ok::<(), tickflake::ConfigError>(())
/// ```
///
/// [`SequentialGenerator`]: crate::SequentialGenerator
/// [`ConcurrentGenerator`]: crate::ConcurrentGenerator
pub trait IdSource {
    /// Returns the next ID. Never blocks and never fails.
    fn next_id(&self) -> u64;

    /// The machine ID encoded into every ID from this source.
    fn machine_id(&self) -> u64;

    /// The bit layout of IDs from this source.
    fn layout(&self) -> IdLayout;

    /// The epoch, in Unix milliseconds, subtracted from timestamps before
    /// packing.
    fn epoch(&self) -> i64;

    /// A parser that exactly inverts this source's encoding.
    fn parser(&self) -> IdParser {
        IdParser::from_layout(self.layout(), self.epoch())
    }
}
