#![forbid(unsafe_code)]

//! Corrective geometry for an overlapping pair.
//!
//! The policy is per-pair and position-resetting: the pair is packed
//! against the left edge of the track, side by side. When the combined
//! width fits the track, both widths are kept; otherwise both are scaled
//! by the same ratio so the pair exactly fills it, preserving their
//! relative proportions.
//!
//! Pairs are resolved independently. When two reported pairs share a
//! block within one detection pass, the later fix overwrites the earlier
//! one (last write wins); the detector runs again on the next cycle and
//! converges from the host's then-current snapshot.

use serde::{Deserialize, Serialize};

use crate::detect::OverlapPair;
use crate::geometry::BlockId;

/// Full track span in percent.
pub const TIMELINE_SPAN_PCT: f64 = 100.0;

/// One geometry write destined for the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryPatch {
    /// Block to rewrite.
    pub id: BlockId,
    /// New left edge in percent.
    pub left: f64,
    /// New width in percent.
    pub width: f64,
}

/// Which corrective strategy produced a fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FixKind {
    /// Both blocks fit side by side; only positions change.
    Reposition,
    /// Combined width exceeds the track; both widths are scaled.
    Compress {
        /// Scale factor applied to both widths.
        ratio: f64,
    },
}

/// Corrective geometry for one overlapping pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairFix {
    /// Strategy used.
    pub kind: FixKind,
    /// Patch for the pair's first block.
    pub first: GeometryPatch,
    /// Patch for the pair's second block.
    pub second: GeometryPatch,
}

/// Compute the fix for an overlapping pair.
///
/// - `a.width + b.width <= 100`: reposition. `a` moves to the left edge,
///   `b` starts where `a` ends; widths are unchanged.
/// - otherwise: compress. Both widths scale by `100 / (a.width + b.width)`
///   and the pair packs the track edge to edge. The width ratio `a / b`
///   is preserved.
pub fn resolve_pair(pair: &OverlapPair) -> PairFix {
    let total = pair.a.width + pair.b.width;

    if total <= TIMELINE_SPAN_PCT {
        PairFix {
            kind: FixKind::Reposition,
            first: GeometryPatch {
                id: pair.a.id,
                left: 0.0,
                width: pair.a.width,
            },
            second: GeometryPatch {
                id: pair.b.id,
                left: pair.a.width,
                width: pair.b.width,
            },
        }
    } else {
        let ratio = TIMELINE_SPAN_PCT / total;
        let first_width = pair.a.width * ratio;
        PairFix {
            kind: FixKind::Compress { ratio },
            first: GeometryPatch {
                id: pair.a.id,
                left: 0.0,
                width: first_width,
            },
            second: GeometryPatch {
                id: pair.b.id,
                left: first_width,
                width: pair.b.width * ratio,
            },
        }
    }
}
