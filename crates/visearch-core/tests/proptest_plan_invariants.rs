//! Property-based invariant tests for trial planning.
//!
//! 1.  Generator output is always in [0, 1) for any seed
//! 2.  Shuffle returns a permutation and takes len - 1 draws
//! 3.  Balanced indices have the requested length and spread ≤ 1
//! 4.  Latin square labels follow participant_number mod 3
//! 5.  Every block has practice + measured trials, practice first
//! 6.  Every trial has 8 distinct ids and exactly one matching item
//! 7.  Measured marginals are near-even in every condition
//! 8.  Planning is deterministic
//! 9.  Extras rotate across participants instead of sticking to a few categories

use std::collections::{BTreeSet, HashSet};

use proptest::prelude::*;
use visearch_core::balance::index_counts;
use visearch_core::{
    BlockParams, Color, Condition, GRID_SIZE, PlanConfig, SeededRandom, Shape,
    assert_balanced_targets, build_balanced_indices, extra_categories, generate_block_plan,
    latin_square_order, order_to_label, shuffle, target_counts,
};

// ── Helpers ──────────────────────────────────────────────────────────

fn any_condition() -> impl Strategy<Value = Condition> {
    prop_oneof![
        Just(Condition::ColorOnly),
        Just(Condition::ShapeOnly),
        Just(Condition::Combined),
    ]
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Generator range
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn generator_stays_in_unit_interval(seed in any::<i64>()) {
        let rng = SeededRandom::new(seed);
        prop_assert!((1..i64::from(i32::MAX)).contains(&rng.state()));
        for value in rng.take(64) {
            prop_assert!((0.0..1.0).contains(&value), "seed {} gave {}", seed, value);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Shuffle permutation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn shuffle_is_a_permutation(items in prop::collection::vec(any::<u16>(), 0..40), seed in any::<i64>()) {
        let mut rng = SeededRandom::new(seed);
        let shuffled = shuffle(&items, &mut rng);
        prop_assert_eq!(rng.draws(), items.len().saturating_sub(1) as u64);
        let mut a = items.clone();
        let mut b = shuffled;
        a.sort_unstable();
        b.sort_unstable();
        prop_assert_eq!(a, b);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Balanced indices
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn balanced_indices_are_near_even(
        categories in 1usize..16,
        samples in 0usize..80,
        seed in any::<i64>(),
    ) {
        let mut rng = SeededRandom::new(seed);
        let indices = build_balanced_indices(categories, samples, &mut rng);
        prop_assert_eq!(indices.len(), samples);
        prop_assert!(indices.iter().all(|&i| i < categories));
        let counts = index_counts(&indices, categories);
        let max = counts.iter().copied().max().unwrap_or(0);
        let min = counts.iter().copied().min().unwrap_or(0);
        prop_assert!(max - min <= 1, "counts {:?}", counts);
        if samples % categories == 0 {
            prop_assert_eq!(max, min);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Latin square
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn latin_square_label_tracks_mod_three(n in 0i64..1_000_000_000) {
        let label = order_to_label(&latin_square_order(n));
        let expected = ["ABC", "BCA", "CAB"][(n % 3) as usize];
        prop_assert_eq!(label, expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5–8. Block invariants
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn block_invariants_hold(
        participant in 0i64..10_000_000,
        block_index in 0usize..3,
        condition in any_condition(),
    ) {
        let params = BlockParams::new(participant, block_index, block_index + 1, condition);
        let plan = generate_block_plan(&params).expect("planning never fails");

        // 5
        prop_assert_eq!(plan.trials.len(), 13);
        prop_assert_eq!(plan.practice().count(), 3);
        prop_assert!(plan.trials.iter().take(3).all(|t| t.is_practice));

        // 6
        for trial in &plan.trials {
            prop_assert_eq!(trial.items.len(), GRID_SIZE);
            let ids: HashSet<&str> = trial.items.iter().map(|i| i.id.as_str()).collect();
            prop_assert_eq!(ids.len(), GRID_SIZE);
            let hits: Vec<&str> = trial
                .items
                .iter()
                .filter(|item| trial.matches(item))
                .map(|item| item.id.as_str())
                .collect();
            prop_assert_eq!(hits, vec![trial.correct_item_id.as_str()]);
        }

        // 7
        let report = assert_balanced_targets(&plan.trials);
        prop_assert!(report.is_balanced(), "{:?}", report);

        // 8
        let again = generate_block_plan(&params).expect("planning never fails");
        prop_assert_eq!(again, plan);
    }

    #[test]
    fn custom_counts_keep_marginals_even(
        participant in 0i64..1_000_000,
        practice in 0usize..6,
        measured in 1usize..40,
    ) {
        let config = PlanConfig::new(practice, measured);
        let params = BlockParams::with_config(participant, 1, 2, Condition::Combined, config);
        let plan = generate_block_plan(&params).expect("planning never fails");
        prop_assert_eq!(plan.trials.len(), practice + measured);
        let counts = target_counts(&plan.trials);
        prop_assert_eq!(counts.colors.values().sum::<usize>(), measured);
        // With fewer measured trials than categories, absent categories have count 0.
        if measured >= GRID_SIZE {
            prop_assert!(counts.color_spread() <= 1);
            prop_assert!(counts.shape_spread() <= 1);
        } else {
            prop_assert!(counts.colors.values().all(|&c| c == 1));
            prop_assert!(counts.shapes.values().all(|&c| c == 1));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 9. Extras rotate
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn extras_cover_many_categories_over_two_hundred_participants() {
    let mut colors: BTreeSet<Color> = BTreeSet::new();
    let mut shapes: BTreeSet<Shape> = BTreeSet::new();
    for participant in 1_000..1_200 {
        let color_plan =
            generate_block_plan(&BlockParams::new(participant, 0, 1, Condition::ColorOnly))
                .expect("color plan");
        let counts = target_counts(&color_plan.trials);
        let extras = extra_categories(&counts.colors, GRID_SIZE);
        assert_eq!(extras.len(), 2, "participant {participant}");
        colors.extend(extras);

        let shape_plan =
            generate_block_plan(&BlockParams::new(participant, 1, 2, Condition::ShapeOnly))
                .expect("shape plan");
        let counts = target_counts(&shape_plan.trials);
        let extras = extra_categories(&counts.shapes, GRID_SIZE);
        assert_eq!(extras.len(), 2, "participant {participant}");
        shapes.extend(extras);
    }
    assert!(colors.len() > 2, "color extras stuck on {colors:?}");
    assert!(shapes.len() > 2, "shape extras stuck on {shapes:?}");
}

#[test]
fn example_combined_block_matches_documented_shape() {
    let params = BlockParams {
        participant_number: 123_456,
        block_index: 0,
        block_order: 1,
        condition: Condition::Combined,
        practice_trials: 3,
        measured_trials: 10,
    };
    let plan = generate_block_plan(&params).expect("example plan");
    assert_eq!(plan.trials.len(), 13);
    assert_eq!(plan.practice().count(), 3);
    assert_eq!(plan.measured().count(), 10);
    let report = assert_balanced_targets(&plan.trials);
    assert!(report.max_color_diff <= 1 && report.max_shape_diff <= 1);
}
