#![forbid(unsafe_code)]

//! Overlap detection over a block snapshot.
//!
//! A pairwise scan reports every pair of blocks whose overlap exceeds a
//! configured threshold. Quadratic by design: tracks carry tens of blocks,
//! not thousands, and the simple scan keeps the reporting order tied to
//! the host's enumeration order rather than track position.

use serde::{Deserialize, Serialize};

use crate::geometry::Interval;

/// Two overlapping blocks, with the overlap measured both ways.
///
/// Derived and ephemeral: pairs are recomputed from a fresh snapshot on
/// every detection pass, never held across cycles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlapPair {
    /// Block enumerated first by the host.
    pub a: Interval,
    /// Block enumerated second by the host.
    pub b: Interval,
    /// Overlap as a percentage of the smaller block's width.
    pub overlap_pct: f64,
    /// Raw overlap width in percent of the track.
    pub overlap_width: f64,
}

/// Report every pair `(i, j)` with `i < j`, in input order, whose overlap
/// magnitude strictly exceeds `threshold_pct`.
///
/// A block may appear in several reported pairs. Empty input yields empty
/// output. Pure query; no side effects.
pub fn detect(intervals: &[Interval], threshold_pct: f64) -> Vec<OverlapPair> {
    let mut pairs = Vec::new();
    for i in 0..intervals.len() {
        for j in (i + 1)..intervals.len() {
            let a = intervals[i];
            let b = intervals[j];
            if !a.overlaps(&b) {
                continue;
            }
            let overlap_pct = a.overlap_magnitude(&b);
            if overlap_pct > threshold_pct {
                pairs.push(OverlapPair {
                    a,
                    b,
                    overlap_pct,
                    overlap_width: a.overlap_width(&b),
                });
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(detect(&[], 0.1).is_empty());
    }

    #[test]
    fn single_block_has_no_pairs() {
        let blocks = [Interval::new(1, 0.0, 50.0)];
        assert!(detect(&blocks, 0.1).is_empty());
    }

    #[test]
    fn disjoint_blocks_report_nothing() {
        let blocks = [Interval::new(1, 0.0, 20.0), Interval::new(2, 30.0, 50.0)];
        assert!(detect(&blocks, 0.1).is_empty());
    }

    #[test]
    fn overlapping_pair_is_reported_with_magnitudes() {
        let blocks = [Interval::new(1, 0.0, 30.0), Interval::new(2, 20.0, 30.0)];
        let pairs = detect(&blocks, 0.1);
        assert_eq!(pairs.len(), 1);
        let pair = &pairs[0];
        assert_eq!(pair.a.id, 1);
        assert_eq!(pair.b.id, 2);
        assert_eq!(pair.overlap_width, 10.0);
        // 10 of the smaller width 30 → 33.3…%
        assert!((pair.overlap_pct - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn overlap_at_threshold_is_not_reported() {
        // Raw overlap 0.05 of smaller width 50 → exactly 0.1%.
        let blocks = [Interval::new(1, 0.0, 50.0), Interval::new(2, 49.95, 50.0)];
        assert!(detect(&blocks, 0.1).is_empty());
    }

    #[test]
    fn overlap_just_above_threshold_is_reported() {
        let blocks = [Interval::new(1, 0.0, 50.0), Interval::new(2, 49.9, 50.0)];
        assert_eq!(detect(&blocks, 0.1).len(), 1);
    }

    #[test]
    fn block_may_appear_in_multiple_pairs() {
        // One wide block overlapping two narrow ones.
        let blocks = [
            Interval::new(1, 0.0, 80.0),
            Interval::new(2, 10.0, 20.0),
            Interval::new(3, 50.0, 20.0),
        ];
        let pairs = detect(&blocks, 0.1);
        assert_eq!(pairs.len(), 2);
        assert!(pairs.iter().all(|p| p.a.id == 1));
    }

    #[test]
    fn pairs_follow_input_order_not_track_order() {
        // Host enumerates the right-most block first.
        let blocks = [Interval::new(9, 40.0, 30.0), Interval::new(4, 0.0, 50.0)];
        let pairs = detect(&blocks, 0.1);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].a.id, 9);
        assert_eq!(pairs[0].b.id, 4);
    }
}
