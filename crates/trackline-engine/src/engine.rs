#![forbid(unsafe_code)]

//! One repair cycle: detect → resolve → optionally fill.
//!
//! A cycle is synchronous and self-contained. It snapshots the host's
//! geometry, fixes every reported overlap pair independently, and, when
//! allowed, re-snapshots and slides blocks left to close gaps. No state
//! survives a cycle except what the caller keeps (the loop guard's
//! counters live in the monitor, not here).
//!
//! A block that disappears from the host mid-cycle only skips its own
//! pair; the remaining pairs are still fixed.

use serde::Serialize;
use trackline_core::{
    BlockId, EngineConfig, FixKind, GeometryPatch, detect, find_gaps, plan_gap_fill, resolve_pair,
};

use crate::host::HostAdapter;

/// One fix that was fully applied to the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AppliedFix {
    /// First block of the pair.
    pub a: BlockId,
    /// Second block of the pair.
    pub b: BlockId,
    /// Strategy used.
    pub kind: FixKind,
}

/// Summary of one completed cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CycleReport {
    /// Overlapping pairs reported by the detector.
    pub overlaps_found: usize,
    /// Pairs whose both patches landed in the host.
    pub fixes_applied: usize,
    /// Patches skipped because a block had disappeared.
    pub fixes_skipped: usize,
    /// Gaps reported by the fill stage (0 when the stage did not run).
    pub gaps_found: usize,
    /// Blocks moved by the fill stage.
    pub blocks_moved: usize,
    /// Whether the fill stage ran at all.
    pub fill_ran: bool,
    /// The fixes applied, in application order.
    pub fixes: Vec<AppliedFix>,
}

/// Run one full repair cycle against the host's current snapshot.
///
/// `fill_allowed` gates the gap-fill stage; the caller derives it from
/// `auto_fill_gaps`, `preserve_time_positions`, and the loop guard.
pub fn run_cycle<H: HostAdapter + ?Sized>(
    host: &mut H,
    config: &EngineConfig,
    fill_allowed: bool,
) -> CycleReport {
    let mut report = CycleReport::default();

    let snapshot = host.list_intervals();
    let pairs = detect(&snapshot, config.overlap_threshold_pct);
    report.overlaps_found = pairs.len();

    if !pairs.is_empty() {
        tracing::debug!(overlaps = pairs.len(), "overlapping blocks detected");
    }

    for pair in &pairs {
        let fix = resolve_pair(pair);
        match apply_patch(host, &fix.first) {
            Ok(()) => {}
            Err(id) => {
                report.fixes_skipped += 1;
                tracing::warn!(block = id, "skipping overlap fix, block removed");
                continue;
            }
        }
        match apply_patch(host, &fix.second) {
            Ok(()) => {
                report.fixes_applied += 1;
                report.fixes.push(AppliedFix {
                    a: pair.a.id,
                    b: pair.b.id,
                    kind: fix.kind,
                });
                tracing::debug!(a = pair.a.id, b = pair.b.id, kind = ?fix.kind, "applied overlap fix");
            }
            Err(id) => {
                // First write already landed; the next cycle re-detects
                // from the host's then-current snapshot.
                report.fixes_skipped += 1;
                tracing::warn!(block = id, "skipping overlap fix, block removed");
            }
        }
    }

    if fill_allowed {
        report.fill_ran = true;
        let snapshot = host.list_intervals();
        let gaps = find_gaps(&snapshot);
        report.gaps_found = gaps.len();

        if !gaps.is_empty() {
            tracing::debug!(gaps = gaps.len(), "filling gaps by sliding blocks");
            for patch in plan_gap_fill(&snapshot, &gaps, config.padding_pct) {
                match apply_patch(host, &patch) {
                    Ok(()) => report.blocks_moved += 1,
                    Err(id) => {
                        tracing::warn!(block = id, "skipping gap fill move, block removed");
                    }
                }
            }
            host.refresh_presentation();
        }
    }

    report
}

fn apply_patch<H: HostAdapter + ?Sized>(host: &mut H, patch: &GeometryPatch) -> Result<(), BlockId> {
    host.set_geometry(patch.id, patch.left, patch.width)
        .map_err(|_| patch.id)
}
