#![forbid(unsafe_code)]

//! Gap detection and the slide plan that closes gaps.
//!
//! A gap is an unoccupied span between two left-sorted adjacent blocks.
//! Open track ends are not gaps: nothing is reported before the first
//! block or after the last one.
//!
//! The fill plan slides blocks leftward. Only blocks that sit after a
//! reported gap move; every block, moved or not, advances a running
//! cursor by its own width plus the configured padding. Padding is in
//! percent, the same unit as `left` and `width`.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::geometry::{Interval, sorted_by_left};
use crate::resolve::GeometryPatch;

/// An unoccupied span between two adjacent blocks.
///
/// Derived from a left-sorted scan; ephemeral like [`crate::OverlapPair`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    /// Left edge of the empty span (the preceding block's right edge).
    pub start: f64,
    /// Right edge of the empty span (the following block's left edge).
    pub end: f64,
    /// Span width in percent.
    pub duration: f64,
    /// Block immediately before the gap.
    pub before: Interval,
    /// Block immediately after the gap.
    pub after: Interval,
}

/// Find every gap between left-sorted adjacent blocks.
pub fn find_gaps(intervals: &[Interval]) -> Vec<Gap> {
    let sorted = sorted_by_left(intervals);
    let mut gaps = Vec::new();
    for pair in sorted.windows(2) {
        let (cur, next) = (pair[0], pair[1]);
        if next.left > cur.right() {
            gaps.push(Gap {
                start: cur.right(),
                end: next.left,
                duration: next.left - cur.right(),
                before: cur,
                after: next,
            });
        }
    }
    gaps
}

/// Plan the leftward slide that closes the reported gaps.
///
/// Blocks referenced as `after` by any gap are repositioned to the running
/// cursor; all other blocks stay where they are. The cursor advances past
/// every block (moved or not) by `width + padding_pct`, so a nonzero
/// padding leaves that much separation in front of each moved block.
///
/// Returns one patch per moved block; widths are never changed.
pub fn plan_gap_fill(
    intervals: &[Interval],
    gaps: &[Gap],
    padding_pct: f64,
) -> Vec<GeometryPatch> {
    if gaps.is_empty() {
        return Vec::new();
    }

    let movers: FxHashSet<_> = gaps.iter().map(|gap| gap.after.id).collect();

    let mut patches = Vec::new();
    let mut cursor = 0.0;
    for block in sorted_by_left(intervals) {
        let left = if movers.contains(&block.id) {
            patches.push(GeometryPatch {
                id: block.id,
                left: cursor,
                width: block.width,
            });
            cursor
        } else {
            block.left
        };
        cursor = left + block.width + padding_pct;
    }
    patches
}
