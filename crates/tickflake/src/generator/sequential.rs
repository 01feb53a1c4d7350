use core::cell::Cell;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    IdLayout, Result, SnowflakeConfig, SystemClock, TimeSource,
    generator::{IdEncoder, IdSource},
};

/// The most recently used `(timestamp, sequence)` pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Cursor {
    timestamp: i64,
    sequence: u64,
}

/// A non-concurrent ID generator for single-threaded callers.
///
/// The cursor lives in a [`Cell`], so the generator is `Send` but not
/// `Sync`: it can move between threads, but it can never be shared by two of
/// them at once. Use [`ConcurrentGenerator`] when that is needed.
///
/// This variant measures timestamps from `epoch_start` alone and ignores
/// `epoch_offset`.
///
/// ## Features
/// - ❌ Thread-safe
/// - ✅ Never blocks, never fails
/// - ✅ Fastest variant
///
/// ## See Also
/// - [`ConcurrentGenerator`]
///
/// [`ConcurrentGenerator`]: crate::ConcurrentGenerator
pub struct SequentialGenerator<T = SystemClock>
where
    T: TimeSource,
{
    cursor: Cell<Cursor>,
    encoder: IdEncoder,
    time: T,
}

impl SequentialGenerator<SystemClock> {
    /// Creates a generator reading [`SystemClock`].
    ///
    /// # Errors
    ///
    /// - Any error from [`SnowflakeConfig::validate`]
    /// - [`ConfigError::NegativeMachineId`] if `machine_id < 0`
    /// - [`ConfigError::MachineIdTooLarge`] if `machine_id` does not fit in
    ///   `machine_id_bits`
    ///
    /// # Example
    /// ```
    /// use tickflake::{SequentialGenerator, SnowflakeConfig};
    ///
    /// let generator = SequentialGenerator::new(&SnowflakeConfig::default(), 1)?;
    /// let first = generator.next_id();
    /// let second = generator.next_id();
    /// assert!(second > first);
    /// # Ok::<(), tickflake::ConfigError>(())
    /// ```
    ///
    /// [`ConfigError::NegativeMachineId`]: crate::ConfigError::NegativeMachineId
    /// [`ConfigError::MachineIdTooLarge`]: crate::ConfigError::MachineIdTooLarge
    pub fn new(config: &SnowflakeConfig, machine_id: i64) -> Result<Self> {
        Self::with_clock(config, machine_id, SystemClock)
    }
}

impl<T> SequentialGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator reading the given [`TimeSource`].
    ///
    /// # Errors
    ///
    /// Same as [`SequentialGenerator::new`].
    pub fn with_clock(config: &SnowflakeConfig, machine_id: i64, time: T) -> Result<Self> {
        let encoder = IdEncoder::new(config, machine_id, config.epoch_start)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            machine_id,
            epoch = encoder.epoch(),
            layout = ?encoder.layout(),
            "built sequential generator"
        );

        Ok(Self {
            cursor: Cell::new(Cursor::default()),
            encoder,
            time,
        })
    }

    /// Generates the next ID.
    ///
    /// 1. If the clock has moved past the cursor, the cursor jumps to it. The
    ///    sequence carries over unchanged; it only starts at zero because the
    ///    cursor does.
    /// 2. Otherwise, if the sequence has room, it is incremented.
    /// 3. Otherwise the cursor moves one millisecond ahead of itself and the
    ///    sequence restarts at zero.
    ///
    /// A clock that reads behind the cursor (after a burst, or after a
    /// backwards step) is treated like step 2 or 3.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> u64 {
        let now = self.time.current_millis();
        let mut cursor = self.cursor.get();

        if cursor.timestamp < now {
            cursor.timestamp = now;
        } else if cursor.sequence < self.encoder.max_sequence() {
            cursor.sequence += 1;
        } else {
            cursor = Self::cold_drift_forward(cursor);
        }

        self.cursor.set(cursor);
        self.encoder.encode(cursor.timestamp, cursor.sequence)
    }

    #[cold]
    #[inline(never)]
    fn cold_drift_forward(cursor: Cursor) -> Cursor {
        #[cfg(feature = "tracing")]
        tracing::trace!(timestamp = cursor.timestamp, "sequence exhausted, drifting forward");

        Cursor {
            timestamp: cursor.timestamp + 1,
            sequence: 0,
        }
    }
}

impl<T> IdSource for SequentialGenerator<T>
where
    T: TimeSource,
{
    fn next_id(&self) -> u64 {
        self.next_id()
    }

    fn machine_id(&self) -> u64 {
        self.encoder.machine_id()
    }

    fn layout(&self) -> IdLayout {
        self.encoder.layout()
    }

    fn epoch(&self) -> i64 {
        self.encoder.epoch()
    }
}
