use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    IdLayout, Result, SnowflakeConfig, SystemClock, TimeSource,
    generator::{IdEncoder, IdSource, Mutex, lock},
};

/// A millisecond and the sequence values handed out for it so far.
#[derive(Debug)]
struct Tick {
    timestamp: i64,
    sequence: AtomicU64,
}

impl Tick {
    fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            sequence: AtomicU64::new(0),
        }
    }
}

/// What the critical section decided.
enum Step {
    /// Reuse the current tick with a freshly claimed sequence value.
    Claimed { timestamp: i64, sequence: u64 },
    /// Publish a new tick at this timestamp with sequence zero.
    Publish { timestamp: i64 },
}

/// A thread-safe ID generator shared by any number of callers.
///
/// State is a single [`Tick`] owned by the instance behind a [`Mutex`]. The
/// lock is held only to decide whether the current tick can still be used
/// and, if not, to swap in a new one. Sequence values on a live tick are
/// claimed with an atomic increment, and the ID itself is packed after the
/// lock is released.
///
/// Every call observes a distinct `(timestamp, sequence)` pair: only one
/// thread at a time can see a tick as exhausted or stale and replace it, and
/// the atomic increment hands each thread sharing a live tick its own value.
///
/// Unlike [`SequentialGenerator`], this variant honours `epoch_offset`:
/// timestamps are measured from `epoch_start + epoch_offset`.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Never blocks on the clock, never fails
/// - ✅ Multiple instances with different configurations can coexist
///
/// ## See Also
/// - [`SequentialGenerator`]
///
/// [`SequentialGenerator`]: crate::SequentialGenerator
pub struct ConcurrentGenerator<T = SystemClock>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    current: crossbeam_utils::CachePadded<Mutex<Option<Tick>>>,
    #[cfg(not(feature = "cache-padded"))]
    current: Mutex<Option<Tick>>,
    encoder: IdEncoder,
    time: T,
}

impl ConcurrentGenerator<SystemClock> {
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
    /// use std::thread;
    /// use tickflake::{ConcurrentGenerator, SnowflakeConfig};
    ///
    /// let generator = ConcurrentGenerator::new(&SnowflakeConfig::default(), 7)?;
    ///
    /// let ids: Vec<u64> = thread::scope(|s| {
    ///     let handles: Vec<_> = (0..4).map(|_| s.spawn(|| generator.next_id())).collect();
    ///     handles.into_iter().map(|h| h.join().unwrap()).collect()
    /// });
    /// assert_eq!(ids.len(), 4);
    /// # Ok::<(), tickflake::ConfigError>(())
    /// ```
    ///
    /// [`ConfigError::NegativeMachineId`]: crate::ConfigError::NegativeMachineId
    /// [`ConfigError::MachineIdTooLarge`]: crate::ConfigError::MachineIdTooLarge
    pub fn new(config: &SnowflakeConfig, machine_id: i64) -> Result<Self> {
        Self::with_clock(config, machine_id, SystemClock)
    }
}

impl<T> ConcurrentGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator reading the given [`TimeSource`].
    ///
    /// # Errors
    ///
    /// Same as [`ConcurrentGenerator::new`].
    pub fn with_clock(config: &SnowflakeConfig, machine_id: i64, time: T) -> Result<Self> {
        let encoder = IdEncoder::new(config, machine_id, config.effective_epoch())?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            machine_id,
            epoch = encoder.epoch(),
            layout = ?encoder.layout(),
            "built concurrent generator"
        );

        Ok(Self {
            #[cfg(feature = "cache-padded")]
            current: crossbeam_utils::CachePadded::new(Mutex::new(None)),
            #[cfg(not(feature = "cache-padded"))]
            current: Mutex::new(None),
            encoder,
            time,
        })
    }

    /// Generates the next ID.
    ///
    /// Under the lock:
    /// - no tick yet, or the clock moved past it: publish a tick at the clock
    ///   reading, sequence `0`
    /// - the tick has sequence room: claim the next sequence value
    /// - the tick is exhausted: publish a tick one millisecond after it,
    ///   sequence `0`
    ///
    /// The lock is held for a bounded amount of work regardless of how many
    /// threads are waiting, and the clock is never waited on.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> u64 {
        let now = self.time.current_millis();

        let (timestamp, sequence) = {
            let mut current = lock(self.tick_slot());

            let step = match current.as_ref() {
                Some(tick) if tick.timestamp >= now => {
                    if tick.sequence.load(Ordering::Relaxed) < self.encoder.max_sequence() {
                        Step::Claimed {
                            timestamp: tick.timestamp,
                            sequence: tick.sequence.fetch_add(1, Ordering::Relaxed) + 1,
                        }
                    } else {
                        Self::cold_drift_forward(tick.timestamp)
                    }
                }
                _ => Step::Publish { timestamp: now },
            };

            match step {
                Step::Claimed {
                    timestamp,
                    sequence,
                } => (timestamp, sequence),
                Step::Publish { timestamp } => {
                    *current = Some(Tick::new(timestamp));
                    (timestamp, 0)
                }
            }
        };

        self.encoder.encode(timestamp, sequence)
    }

    #[cold]
    #[inline(never)]
    fn cold_drift_forward(timestamp: i64) -> Step {
        #[cfg(feature = "tracing")]
        tracing::trace!(timestamp, "sequence exhausted, drifting forward");

        Step::Publish {
            timestamp: timestamp + 1,
        }
    }

    fn tick_slot(&self) -> &Mutex<Option<Tick>> {
        &self.current
    }
}

impl<T> IdSource for ConcurrentGenerator<T>
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
