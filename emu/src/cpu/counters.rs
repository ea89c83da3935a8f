//! # Performance Counters
//!
//! Monotonic event counters written by the execution thread and sampled
//! by the telemetry timer and by state dumps. All access is Relaxed:
//! the readers only ever produce display output, so stale or torn
//! cross-field views are acceptable. The counters are shared as an
//! `Arc` so readers survive the `Cpu` moving into its thread.

use std::sync::atomic::{AtomicU64, Ordering};

/// One countable event class.
///
/// The class-level counters (everything from `SkippedCondition` down)
/// are only reported with the `count-class-ops` feature and `Cycles`
/// only with `count-cycles`, but the slots always exist so the decoder
/// does not need feature-dependent code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    /// Instructions retired.
    Instructions = 0,
    /// Instructions run through the decoder (decode-cache misses).
    Decodes,
    /// Translations that missed the fast path in the MMU.
    SlowMmuTranslates,
    /// Exceptions delivered.
    Exceptions,
    /// Emulated cycles.
    Cycles,
    Nop,
    SkippedCondition,
    Load,
    Store,
    DataProcessing,
    Mul,
    Branch,
    Misc,
}

pub const COUNTER_SLOTS: usize = Counter::Misc as usize + 1;

#[derive(Default)]
pub struct PerfCounters {
    counts: [AtomicU64; COUNTER_SLOTS],
}

impl PerfCounters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn inc(&self, counter: Counter) {
        self.counts[counter as usize].fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add(&self, counter: Counter, n: u64) {
        self.counts[counter as usize].fetch_add(n, Ordering::Relaxed);
    }

    #[must_use]
    pub fn get(&self, counter: Counter) -> u64 {
        self.counts[counter as usize].load(Ordering::Relaxed)
    }

    /// Sample every counter. Not atomic across slots; display only.
    #[must_use]
    pub fn sample(&self) -> [u64; COUNTER_SLOTS] {
        std::array::from_fn(|i| self.counts[i].load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inc_and_add() {
        let counters = PerfCounters::new();
        counters.inc(Counter::Instructions);
        counters.inc(Counter::Instructions);
        counters.add(Counter::Cycles, 7);

        assert_eq!(counters.get(Counter::Instructions), 2);
        assert_eq!(counters.get(Counter::Cycles), 7);
        assert_eq!(counters.get(Counter::Exceptions), 0);
    }

    #[test]
    fn sample_is_indexed_by_counter() {
        let counters = PerfCounters::new();
        counters.inc(Counter::Exceptions);
        let sample = counters.sample();
        assert_eq!(sample[Counter::Exceptions as usize], 1);
        assert_eq!(sample[Counter::Instructions as usize], 0);
    }
}
