//! Work counters for the DP engine.
//!
//! Each `SwResult` carries the counters of one invocation. A worker folds
//! them into a thread-local `SwMetrics` with `update` and periodically
//! merges that into the process-wide `SharedSwMetrics`.

use std::ops::AddAssign;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::result::SwResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwCounters {
    pub sws: u64,        // # DP problems solved
    pub swcups: u64,     // # DP cell updates
    pub swrows: u64,     // # DP row updates
    pub swskiprows: u64, // # DP rows skipped because no valid alignment can pass through
    pub swskip: u64,     // # DP problems skipped by the score bound
    pub swsucc: u64,     // # DP problems resulting in an alignment
    pub swfail: u64,     // # DP problems not resulting in an alignment
    pub swbts: u64,      // # DP backtrace steps
}

impl SwCounters {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl AddAssign<&SwCounters> for SwCounters {
    fn add_assign(&mut self, r: &SwCounters) {
        self.sws += r.sws;
        self.swcups += r.swcups;
        self.swrows += r.swrows;
        self.swskiprows += r.swskiprows;
        self.swskip += r.swskip;
        self.swsucc += r.swsucc;
        self.swfail += r.swfail;
        self.swbts += r.swbts;
    }
}

/// Running totals across many DP problems.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwMetrics {
    pub counters: SwCounters,
    pub rshit: u64, // # DP problems avoided because the seed hit was redundant
}

impl SwMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.counters.reset();
        self.rshit = 0;
    }

    /// Set every counter, e.g. when restoring a saved snapshot.
    #[allow(clippy::too_many_arguments)]
    pub fn init(
        &mut self,
        sws: u64,
        swcups: u64,
        swrows: u64,
        swskiprows: u64,
        swskip: u64,
        swsucc: u64,
        swfail: u64,
        swbts: u64,
        rshit: u64,
    ) {
        self.counters = SwCounters {
            sws,
            swcups,
            swrows,
            swskiprows,
            swskip,
            swsucc,
            swfail,
            swbts,
        };
        self.rshit = rshit;
    }

    /// Add one invocation's counters.
    pub fn update(&mut self, r: &SwResult) {
        self.counters += &r.counters;
    }

    /// Add another aggregator's totals. Exclusive access is guaranteed by
    /// `&mut self`, so no lock is taken here.
    pub fn merge(&mut self, r: &SwMetrics) {
        self.counters += &r.counters;
        self.rshit += r.rshit;
    }

    pub fn record_redundant_seed(&mut self) {
        self.rshit += 1;
    }

    pub fn is_zero(&self) -> bool {
        self.counters.is_zero() && self.rshit == 0
    }
}

/// `SwMetrics` shared by all worker threads.
#[derive(Debug, Default)]
pub struct SharedSwMetrics {
    inner: Mutex<SwMetrics>,
}

impl SharedSwMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lock. Callers that already hold the guard merge through it
    /// directly rather than calling [`SharedSwMetrics::merge`] again.
    pub fn lock(&self) -> MutexGuard<'_, SwMetrics> {
        // Counters stay meaningful even if a holder panicked mid-add
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add `r` into the shared totals, serialized with other mergers.
    pub fn merge(&self, r: &SwMetrics) {
        self.lock().merge(r);
    }

    pub fn reset(&self) {
        self.lock().reset();
    }

    pub fn snapshot(&self) -> SwMetrics {
        *self.lock()
    }
}
