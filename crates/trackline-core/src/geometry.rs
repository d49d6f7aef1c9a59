#![forbid(unsafe_code)]

//! Geometric primitives for the programme track.

use serde::{Deserialize, Serialize};

/// Opaque identifier for a programme block, assigned by the host.
pub type BlockId = u64;

/// Timeline length used to convert programme minutes to percent, in minutes.
pub const DEFAULT_TIMELINE_MINUTES: f64 = 240.0;

/// A programme block's horizontal placement on a 0–100 percent track.
///
/// Values may transiently leave the `[0, 100]` range while the host is
/// mid-edit; the model never clamps. `right` is derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Host-assigned block identifier.
    pub id: BlockId,
    /// Left edge in percent of the track.
    pub left: f64,
    /// Width in percent of the track.
    pub width: f64,
}

impl Interval {
    /// Create a new interval.
    #[inline]
    pub const fn new(id: BlockId, left: f64, width: f64) -> Self {
        Self { id, left, width }
    }

    /// Right edge in percent (exclusive).
    #[inline]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Check whether two intervals intersect.
    #[inline]
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.left < other.right() && other.left < self.right()
    }

    /// Raw width of the intersection, in percent of the track.
    ///
    /// Returns `0.0` when the intervals are disjoint.
    pub fn overlap_width(&self, other: &Interval) -> f64 {
        if !self.overlaps(other) {
            return 0.0;
        }
        self.right().min(other.right()) - self.left.max(other.left)
    }

    /// Overlap expressed as a percentage of the *smaller* interval's width.
    ///
    /// Returns `0.0` when disjoint or when the smaller width is not a
    /// positive finite number (a zero-width block cannot meaningfully be
    /// covered).
    pub fn overlap_magnitude(&self, other: &Interval) -> f64 {
        let overlap = self.overlap_width(other);
        if overlap <= 0.0 {
            return 0.0;
        }
        let smaller = self.width.min(other.width);
        if !(smaller > 0.0) || !smaller.is_finite() {
            return 0.0;
        }
        (overlap / smaller) * 100.0
    }
}

/// Stable ascending sort by left edge.
///
/// Blocks sharing a left edge keep their input order.
pub fn sorted_by_left(intervals: &[Interval]) -> Vec<Interval> {
    let mut sorted = intervals.to_vec();
    sorted.sort_by(|a, b| a.left.total_cmp(&b.left));
    sorted
}

/// Width in percent for a programme of `minutes` on a track spanning
/// `timeline_minutes`.
pub fn width_pct_for_duration(minutes: f64, timeline_minutes: f64) -> f64 {
    (minutes / timeline_minutes) * 100.0
}

/// Left edge in percent for a programme starting at `minutes` into a track
/// spanning `timeline_minutes`.
pub fn left_pct_for_start(minutes: f64, timeline_minutes: f64) -> f64 {
    (minutes / timeline_minutes) * 100.0
}
