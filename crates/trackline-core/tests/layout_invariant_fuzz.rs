//! Property-style invariants for detection, resolution, and gap filling.
//!
//! Random block sets are generated with host-style geometry (percent
//! coordinates, modest block counts) and the pipeline's contracts are
//! asserted over them: detection matches the geometric definition,
//! resolved pairs never overlap and keep their width ratio, fill plans
//! close every gap beyond the padding, and a clean track stays untouched.

use proptest::prelude::*;
use trackline_core::{
    FixKind, Interval, TIMELINE_SPAN_PCT, detect, find_gaps, plan_gap_fill, resolve_pair,
    sorted_by_left,
};

fn arb_interval(id: u64) -> impl Strategy<Value = Interval> {
    (0.0f64..100.0, 0.5f64..60.0).prop_map(move |(left, width)| Interval::new(id, left, width))
}

fn arb_blocks(max: usize) -> impl Strategy<Value = Vec<Interval>> {
    prop::collection::vec((0.0f64..100.0, 0.5f64..60.0), 0..max).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (left, width))| Interval::new(i as u64 + 1, left, width))
            .collect()
    })
}

fn apply(blocks: &mut [Interval], id: u64, left: f64, width: f64) {
    let block = blocks.iter_mut().find(|iv| iv.id == id).unwrap();
    block.left = left;
    block.width = width;
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn detection_matches_the_geometric_definition(blocks in arb_blocks(12)) {
        let pairs = detect(&blocks, 0.1);
        // Every reported pair genuinely overlaps beyond the threshold.
        for pair in &pairs {
            prop_assert!(pair.a.overlaps(&pair.b));
            prop_assert!(pair.overlap_pct > 0.1);
            prop_assert!(pair.overlap_width > 0.0);
        }
        // Every unreported pair is below or at the threshold.
        let reported: Vec<(u64, u64)> = pairs.iter().map(|p| (p.a.id, p.b.id)).collect();
        for i in 0..blocks.len() {
            for j in (i + 1)..blocks.len() {
                if !reported.contains(&(blocks[i].id, blocks[j].id)) {
                    prop_assert!(blocks[i].overlap_magnitude(&blocks[j]) <= 0.1);
                }
            }
        }
    }

    #[test]
    fn resolved_pairs_never_overlap(a in arb_interval(1), b in arb_interval(2)) {
        let pairs = detect(&[a, b], 0.1);
        for pair in pairs {
            let fix = resolve_pair(&pair);
            let fixed_a = Interval::new(1, fix.first.left, fix.first.width);
            let fixed_b = Interval::new(2, fix.second.left, fix.second.width);
            prop_assert!(fixed_a.overlap_width(&fixed_b) < 1e-9);
            prop_assert!(fixed_b.right() <= TIMELINE_SPAN_PCT + 1e-9);
        }
    }

    #[test]
    fn compression_preserves_the_width_ratio(a in arb_interval(1), b in arb_interval(2)) {
        let pairs = detect(&[a, b], 0.1);
        for pair in pairs {
            let fix = resolve_pair(&pair);
            if let FixKind::Compress { ratio } = fix.kind {
                prop_assert!(ratio < 1.0);
                let before = pair.a.width / pair.b.width;
                let after = fix.first.width / fix.second.width;
                prop_assert!((before - after).abs() < 1e-6);
            } else {
                prop_assert!(pair.a.width + pair.b.width <= TIMELINE_SPAN_PCT);
            }
        }
    }

    #[test]
    fn fill_plan_moves_exactly_the_blocks_behind_gaps(
        blocks in arb_blocks(10),
        padding in 0.0f64..5.0,
    ) {
        let gaps = find_gaps(&blocks);
        let mut planned: Vec<u64> =
            plan_gap_fill(&blocks, &gaps, padding).iter().map(|p| p.id).collect();
        let mut movers: Vec<u64> = gaps.iter().map(|gap| gap.after.id).collect();
        planned.sort_unstable();
        planned.dedup();
        movers.sort_unstable();
        movers.dedup();
        prop_assert_eq!(planned, movers);
    }

    #[test]
    fn first_gap_closes_to_exactly_the_padding(
        blocks in arb_blocks(10),
        padding in 0.0f64..5.0,
    ) {
        let gaps = find_gaps(&blocks);
        prop_assume!(!gaps.is_empty());

        // Blocks left of the first gap cannot sit behind any gap, so the
        // cursor reaches the first gap's after-block untouched.
        let first = gaps[0];
        let patches = plan_gap_fill(&blocks, &gaps, padding);
        let patch = patches.iter().find(|p| p.id == first.after.id).unwrap();
        prop_assert!((patch.left - (first.before.right() + padding)).abs() < 1e-9);
    }

    #[test]
    fn zero_padding_fill_only_moves_blocks_left(blocks in arb_blocks(10)) {
        let gaps = find_gaps(&blocks);
        for patch in plan_gap_fill(&blocks, &gaps, 0.0) {
            let original = blocks.iter().find(|iv| iv.id == patch.id).unwrap();
            prop_assert!(patch.left < original.left);
        }
    }

    #[test]
    fn repeated_zero_padding_fill_converges_to_a_gapless_track(count in 1usize..8) {
        // Overlap-free track with arbitrary gaps; one pass closes at least
        // the leftmost gap, so convergence takes at most `count` passes.
        let mut blocks: Vec<Interval> = (0..count)
            .map(|i| Interval::new(i as u64 + 1, (i as f64) * 15.0, 4.0 + i as f64))
            .collect();

        for _ in 0..count {
            let gaps = find_gaps(&blocks);
            if gaps.is_empty() {
                break;
            }
            for patch in plan_gap_fill(&blocks, &gaps, 0.0) {
                apply(&mut blocks, patch.id, patch.left, patch.width);
            }
        }
        prop_assert!(find_gaps(&blocks).is_empty());
        prop_assert!(detect(&blocks, 0.1).is_empty());
    }

    #[test]
    fn fill_plan_never_changes_widths(blocks in arb_blocks(10)) {
        let gaps = find_gaps(&blocks);
        for patch in plan_gap_fill(&blocks, &gaps, 1.0) {
            let original = blocks.iter().find(|iv| iv.id == patch.id).unwrap();
            prop_assert_eq!(patch.width, original.width);
        }
    }

    #[test]
    fn clean_tracks_are_left_untouched(count in 0usize..10, padding in 0.0f64..3.0) {
        // Build a track with no overlaps and no gaps by construction.
        let mut blocks = Vec::new();
        let mut cursor = 0.0;
        for i in 0..count {
            let width = 3.0 + i as f64;
            blocks.push(Interval::new(i as u64 + 1, cursor, width));
            cursor += width;
        }
        prop_assert!(detect(&blocks, 0.1).is_empty());
        let gaps = find_gaps(&blocks);
        prop_assert!(gaps.is_empty());
        prop_assert!(plan_gap_fill(&blocks, &gaps, padding).is_empty());
    }

    #[test]
    fn sort_never_loses_blocks(blocks in arb_blocks(14)) {
        let sorted = sorted_by_left(&blocks);
        prop_assert_eq!(sorted.len(), blocks.len());
        for pair in sorted.windows(2) {
            prop_assert!(pair[0].left <= pair[1].left);
        }
    }
}
