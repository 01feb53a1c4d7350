use crate::{SystemClock, TimeSource};
use core::time::Duration;
use std::{
    sync::{
        Arc, OnceLock,
        atomic::{AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
    time::Instant,
};

/// Shared ticker thread that updates every millisecond.
#[derive(Debug)]
struct SharedTickerInner {
    elapsed: AtomicU64,
    _handle: OnceLock<JoinHandle<()>>,
}

/// A wall-clock-anchored time source that never goes backwards.
///
/// At construction the clock records the current Unix time once, then a
/// background thread advances an atomic counter by the elapsed monotonic
/// time (`Instant`) every millisecond. Reads are a single atomic load plus
/// the anchor, with no syscall on the hot path.
///
/// Clones share the ticker thread. The thread exits once the last clone is
/// dropped.
///
/// Because the anchor is sampled once, later NTP corrections of the system
/// clock are not observed. Use [`SystemClock`] to follow the wall clock
/// exactly.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    inner: Arc<SharedTickerInner>,
    anchor: i64, // unix millis at construction
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    /// Starts a new ticker thread anchored to the current wall-clock time.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use tickflake::{MonotonicClock, TimeSource};
    ///
    /// let clock = MonotonicClock::new();
    /// let before = clock.current_millis();
    /// std::thread::sleep(Duration::from_millis(5));
    ///
    /// // Timer alignment may leave the counter a tick behind, but it never
    /// // goes backward.
    /// assert!(clock.current_millis() >= before);
    /// ```
    pub fn new() -> Self {
        let start = Instant::now();
        let anchor = SystemClock.current_millis();

        let inner = Arc::new(SharedTickerInner {
            elapsed: AtomicU64::new(0),
            _handle: OnceLock::new(),
        });

        let weak_inner = Arc::downgrade(&inner);
        let handle = thread::spawn(move || {
            let mut tick = 0;

            loop {
                let Some(inner_ref) = weak_inner.upgrade() else {
                    break;
                };

                // Sleep until the absolute target of the next tick
                let target = start + Duration::from_millis(tick);
                let now = Instant::now();
                if now < target {
                    thread::sleep(target - now);
                }

                let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                inner_ref.elapsed.store(now_ms, Ordering::Relaxed);

                tick = now_ms + 1;
            }
        });

        let _ = inner._handle.set(handle);

        Self { inner, anchor }
    }
}

impl TimeSource for MonotonicClock {
    fn current_millis(&self) -> i64 {
        self.anchor
            .saturating_add_unsigned(self.inner.elapsed.load(Ordering::Relaxed))
    }
}
