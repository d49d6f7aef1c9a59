#![forbid(unsafe_code)]

//! Feedback-loop breaker.
//!
//! Repairing the track is itself a change, so the engine's own writes can
//! re-trigger detection indefinitely. The guard counts repair cycles
//! inside a sliding window; when the count exceeds the configured ceiling
//! it trips, and tripping is a one-way latch. Elapsed time never clears
//! it; only an explicit [`LoopGuard::reset`] from the host does.
//!
//! Tripping degrades rather than stops the engine: overlap repair keeps
//! running, only automatic gap filling is switched off.

use serde::Serialize;

/// Outcome of recording one completed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Cycle rate is acceptable.
    Continue,
    /// The ceiling was exceeded; the guard is now (or already was) latched.
    Tripped,
}

/// Cycle-rate circuit breaker.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoopGuard {
    last_cycle_ms: Option<u64>,
    cycles_in_window: u32,
    tripped: bool,
}

impl LoopGuard {
    /// Create an untripped guard with empty counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed cycle at `now_ms`.
    ///
    /// Consecutive cycles closer together than `window_ms` accumulate;
    /// a quieter cycle resets the count to 1. Exceeding `max_cycles`
    /// latches the guard. A `window_ms` of 0 never accumulates, so loop
    /// detection is effectively disabled.
    pub fn record_cycle(&mut self, now_ms: u64, window_ms: u64, max_cycles: u32) -> GuardDecision {
        if self.tripped {
            return GuardDecision::Tripped;
        }

        let rapid = self
            .last_cycle_ms
            .is_some_and(|last| now_ms.saturating_sub(last) < window_ms);
        self.cycles_in_window = if rapid { self.cycles_in_window + 1 } else { 1 };
        self.last_cycle_ms = Some(now_ms);

        if self.cycles_in_window > max_cycles {
            self.tripped = true;
            GuardDecision::Tripped
        } else {
            GuardDecision::Continue
        }
    }

    /// Whether the guard is latched.
    #[must_use]
    pub fn is_tripped(&self) -> bool {
        self.tripped
    }

    /// Cycles recorded in the current window.
    #[must_use]
    pub fn cycles_in_window(&self) -> u32 {
        self.cycles_in_window
    }

    /// Clear the latch and all counters. The explicit host re-enable path.
    pub fn reset(&mut self) {
        self.last_cycle_ms = None;
        self.cycles_in_window = 0;
        self.tripped = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_guard_is_untripped() {
        let guard = LoopGuard::new();
        assert!(!guard.is_tripped());
        assert_eq!(guard.cycles_in_window(), 0);
    }

    #[test]
    fn spaced_cycles_never_trip() {
        let mut guard = LoopGuard::new();
        for i in 0..10 {
            let decision = guard.record_cycle(i * 10_000, 3000, 2);
            assert_eq!(decision, GuardDecision::Continue);
            assert_eq!(guard.cycles_in_window(), 1);
        }
    }

    #[test]
    fn rapid_cycles_trip_after_the_ceiling() {
        let mut guard = LoopGuard::new();
        assert_eq!(guard.record_cycle(0, 3000, 2), GuardDecision::Continue);
        assert_eq!(guard.record_cycle(100, 3000, 2), GuardDecision::Continue);
        assert_eq!(guard.record_cycle(200, 3000, 2), GuardDecision::Tripped);
        assert!(guard.is_tripped());
    }

    #[test]
    fn trip_is_a_one_way_latch() {
        let mut guard = LoopGuard::new();
        for t in [0, 100, 200] {
            guard.record_cycle(t, 3000, 2);
        }
        assert!(guard.is_tripped());
        // Hours later, still tripped.
        assert_eq!(
            guard.record_cycle(10_000_000, 3000, 2),
            GuardDecision::Tripped
        );
        assert!(guard.is_tripped());
    }

    #[test]
    fn reset_clears_the_latch_and_counters() {
        let mut guard = LoopGuard::new();
        for t in [0, 100, 200] {
            guard.record_cycle(t, 3000, 2);
        }
        guard.reset();
        assert!(!guard.is_tripped());
        assert_eq!(guard.cycles_in_window(), 0);
        assert_eq!(guard.record_cycle(300, 3000, 2), GuardDecision::Continue);
    }

    #[test]
    fn quiet_period_resets_the_count() {
        let mut guard = LoopGuard::new();
        guard.record_cycle(0, 3000, 2);
        guard.record_cycle(100, 3000, 2);
        assert_eq!(guard.cycles_in_window(), 2);
        // A cycle after the window starts a fresh count.
        guard.record_cycle(5000, 3000, 2);
        assert_eq!(guard.cycles_in_window(), 1);
        assert!(!guard.is_tripped());
    }

    #[test]
    fn zero_window_disables_detection() {
        let mut guard = LoopGuard::new();
        for t in 0..100 {
            assert_eq!(guard.record_cycle(t, 0, 2), GuardDecision::Continue);
        }
        assert!(!guard.is_tripped());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            /// Whatever the cycle timing, a trip never clears on its own.
            #[test]
            fn latch_is_monotone(
                deltas in proptest::collection::vec(0u64..5000, 1..40),
                window_ms in 1u64..5000,
                max_cycles in 1u32..5,
            ) {
                let mut guard = LoopGuard::new();
                let mut now = 0u64;
                let mut seen_trip = false;
                for delta in deltas {
                    now += delta;
                    let decision = guard.record_cycle(now, window_ms, max_cycles);
                    if seen_trip {
                        prop_assert_eq!(decision, GuardDecision::Tripped);
                        prop_assert!(guard.is_tripped());
                    }
                    if decision == GuardDecision::Tripped {
                        seen_trip = true;
                    }
                }
            }
        }
    }
}
