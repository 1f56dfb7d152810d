//! Event counters for the barrier paths. Counting is off unless the `barrier_stats` option is set.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A named counter that mutator threads bump concurrently.
pub struct EventCounter {
    name: &'static str,
    count: AtomicU64,
}

impl EventCounter {
    pub const fn new(name: &'static str) -> Self {
        EventCounter {
            name,
            count: AtomicU64::new(0),
        }
    }

    #[inline(always)]
    pub fn inc(&self) {
        self.inc_by(1);
    }

    #[inline(always)]
    pub fn inc_by(&self, value: u64) {
        self.count.fetch_add(value, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn reset(&self) {
        self.count.store(0, Ordering::Relaxed);
    }
}

/// Barrier counters shared by every mutator of an instance.
pub struct BarrierStats {
    enabled: bool,
    /// Scalar field barrier checks.
    pub putfield_fast: EventCounter,
    /// Array field barrier checks.
    pub aastore_fast: EventCounter,
    /// Entries into a logging slow path.
    pub slow: EventCounter,
    /// Words pushed to the buffers by the slow paths.
    pub words_logged: EventCounter,
}

impl BarrierStats {
    pub fn new(enabled: bool) -> Self {
        BarrierStats {
            enabled,
            putfield_fast: EventCounter::new("barrier.putfield.fast"),
            aastore_fast: EventCounter::new("barrier.aastore.fast"),
            slow: EventCounter::new("barrier.slow"),
            words_logged: EventCounter::new("barrier.words_logged"),
        }
    }

    #[inline(always)]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn counters(&self) -> [&EventCounter; 4] {
        [
            &self.putfield_fast,
            &self.aastore_fast,
            &self.slow,
            &self.words_logged,
        ]
    }

    pub fn reset(&self) {
        self.counters().iter().for_each(|c| c.reset());
    }
}

impl fmt::Display for BarrierStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for c in self.counters() {
            write!(f, "{}={} ", c.name(), c.get())?;
        }
        Ok(())
    }
}
