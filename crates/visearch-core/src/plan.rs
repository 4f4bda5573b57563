#![forbid(unsafe_code)]

//! Block and session planning.
//!
//! A block is generated from one block seed and one seed per trial:
//!
//! 1. `block_seed(participant, block_index, block_order)` seeds a single
//!    generator that draws four balanced index sequences, strictly in this
//!    order: practice colors, practice shapes, measured colors, measured
//!    shapes.
//! 2. Practice and measured sequences are concatenated per attribute, giving
//!    the target color and target shape index for every trial position.
//! 3. Each trial position `t` gets a fresh generator seeded with
//!    `trial_seed(participant, block_index, t)` for its grid shuffle, so grid
//!    layouts never depend on the balancing draws or on each other.
//!
//! Balancing practice and measured trials separately keeps the measured
//! marginals near-even on their own, which is what analysis relies on.

use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, error};

use crate::balance::build_balanced_indices;
use crate::catalog::{Color, Condition, GRID_SIZE, Shape};
use crate::config::PlanConfig;
use crate::counterbalance::{latin_square_order, order_to_label};
use crate::error::Result;
use crate::rng::SeededRandom;
use crate::stimulus::{StimulusItem, Target, locate_target, synthesize_items};

/// Seed for the balancing draws of one block.
#[must_use]
pub fn block_seed(participant_number: i64, block_index: usize, block_order: usize) -> i64 {
    participant_number
        .wrapping_mul(1_000)
        .wrapping_add((block_index as i64).wrapping_mul(77))
        .wrapping_add((block_order as i64).wrapping_mul(19))
}

/// Seed for the grid shuffle of trial position `trial_index` within a block.
#[must_use]
pub fn trial_seed(participant_number: i64, block_index: usize, trial_index: usize) -> i64 {
    participant_number
        .wrapping_mul(100_000)
        .wrapping_add((block_index as i64).wrapping_mul(1_000))
        .wrapping_add((trial_index as i64).wrapping_mul(17))
        .wrapping_add(3)
}

/// Inputs for [`generate_block_plan`].
///
/// Field names are camelCase on the wire to match the browser session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockParams {
    pub participant_number: i64,
    pub block_index: usize,
    pub block_order: usize,
    pub condition: Condition,
    #[serde(default = "default_practice_trials")]
    pub practice_trials: usize,
    #[serde(default = "default_measured_trials")]
    pub measured_trials: usize,
}

fn default_practice_trials() -> usize {
    PlanConfig::default().practice_trials
}

fn default_measured_trials() -> usize {
    PlanConfig::default().measured_trials
}

impl BlockParams {
    /// Params with the default trial counts.
    #[must_use]
    pub fn new(
        participant_number: i64,
        block_index: usize,
        block_order: usize,
        condition: Condition,
    ) -> Self {
        Self::with_config(
            participant_number,
            block_index,
            block_order,
            condition,
            PlanConfig::default(),
        )
    }

    #[must_use]
    pub fn with_config(
        participant_number: i64,
        block_index: usize,
        block_order: usize,
        condition: Condition,
        config: PlanConfig,
    ) -> Self {
        Self {
            participant_number,
            block_index,
            block_order,
            condition,
            practice_trials: config.practice_trials,
            measured_trials: config.measured_trials,
        }
    }
}

/// One planned trial. Built once by the planner and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialPlan {
    pub block_index: usize,
    pub block_order: usize,
    pub condition: Condition,
    /// Zero-based position within the block, practice trials first.
    pub trial_index: usize,
    pub is_practice: bool,
    pub target: Target,
    pub prompt: String,
    pub correct_item_id: String,
    /// Seed used for this trial's grid shuffle.
    pub seed: i64,
    pub items: Vec<StimulusItem>,
}

impl TrialPlan {
    /// The item the participant is expected to select.
    #[must_use]
    pub fn correct_item(&self) -> Option<&StimulusItem> {
        self.items.iter().find(|item| item.id == self.correct_item_id)
    }

    /// True when `item` satisfies this trial's target criterion.
    #[must_use]
    pub fn matches(&self, item: &StimulusItem) -> bool {
        self.target.matches(self.condition, item)
    }
}

/// All trials of one condition block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockPlan {
    pub participant_number: i64,
    pub block_index: usize,
    pub block_order: usize,
    pub condition: Condition,
    /// Seed of the balancing draws.
    pub seed: i64,
    pub practice_trials: usize,
    pub measured_trials: usize,
    /// Practice trials first, then measured trials.
    pub trials: Vec<TrialPlan>,
}

impl BlockPlan {
    pub fn practice(&self) -> impl Iterator<Item = &TrialPlan> {
        self.trials.iter().filter(|t| t.is_practice)
    }

    pub fn measured(&self) -> impl Iterator<Item = &TrialPlan> {
        self.trials.iter().filter(|t| !t.is_practice)
    }

    #[must_use]
    pub fn trial(&self, trial_index: usize) -> Option<&TrialPlan> {
        self.trials.get(trial_index)
    }
}

/// Plan one block.
///
/// Fails when either trial count exceeds
/// [`MAX_TRIALS_PER_BLOCK`](crate::config::MAX_TRIALS_PER_BLOCK), or when a
/// synthesized grid does not contain its target exactly once, which
/// indicates a generator defect.
pub fn generate_block_plan(params: &BlockParams) -> Result<BlockPlan> {
    let BlockParams {
        participant_number,
        block_index,
        block_order,
        condition,
        practice_trials,
        measured_trials,
    } = *params;
    PlanConfig::new(practice_trials, measured_trials).check_limits()?;

    let _span = debug_span!(
        "plan.block",
        participant_number,
        block_index,
        block_order,
        condition = condition.as_str()
    )
    .entered();

    let seed = block_seed(participant_number, block_index, block_order);
    let mut rng = SeededRandom::new(seed);

    // Draw order is part of the reproducibility contract.
    let practice_colors = build_balanced_indices(GRID_SIZE, practice_trials, &mut rng);
    let practice_shapes = build_balanced_indices(GRID_SIZE, practice_trials, &mut rng);
    let measured_colors = build_balanced_indices(GRID_SIZE, measured_trials, &mut rng);
    let measured_shapes = build_balanced_indices(GRID_SIZE, measured_trials, &mut rng);
    debug!(seed, balance_draws = rng.draws(), "plan.block.balanced");

    let color_indices = practice_colors.into_iter().chain(measured_colors);
    let shape_indices = practice_shapes.into_iter().chain(measured_shapes);

    let mut trials = Vec::with_capacity(practice_trials + measured_trials);
    for (trial_index, (color_idx, shape_idx)) in color_indices.zip(shape_indices).enumerate() {
        let target = target_for(condition, color_idx, shape_idx);
        let grid_seed = trial_seed(participant_number, block_index, trial_index);
        let mut grid_rng = SeededRandom::new(grid_seed);
        let items = synthesize_items(condition, target, &mut grid_rng);
        let correct_item_id = locate_target(condition, target, &items, trial_index)
            .inspect_err(|err| error!(%err, grid_seed, "plan.block.integrity"))?;

        trials.push(TrialPlan {
            block_index,
            block_order,
            condition,
            trial_index,
            is_practice: trial_index < practice_trials,
            target,
            prompt: target.prompt(condition),
            correct_item_id,
            seed: grid_seed,
            items,
        });
    }

    debug!(trials = trials.len(), "plan.block.done");
    Ok(BlockPlan {
        participant_number,
        block_index,
        block_order,
        condition,
        seed,
        practice_trials,
        measured_trials,
        trials,
    })
}

fn target_for(condition: Condition, color_idx: usize, shape_idx: usize) -> Target {
    let color = Color::CATEGORIES[color_idx % GRID_SIZE];
    let shape = Shape::CATEGORIES[shape_idx % GRID_SIZE];
    match condition {
        Condition::ColorOnly => Target::new(color, Shape::NEUTRAL),
        Condition::ShapeOnly => Target::new(Color::NEUTRAL, shape),
        Condition::Combined => Target::new(color, shape),
    }
}

/// The three blocks of one participant's session, in presentation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPlan {
    pub participant_number: i64,
    pub order: [Condition; 3],
    /// `ABC`, `BCA` or `CAB`.
    pub order_label: String,
    pub blocks: Vec<BlockPlan>,
}

/// Assign the participant's condition order and plan every block.
///
/// The block at position `i` uses `block_index = i` and `block_order = i + 1`.
pub fn generate_session_plan(participant_number: i64, config: PlanConfig) -> Result<SessionPlan> {
    config.validate()?;
    let order = latin_square_order(participant_number);
    let blocks = order
        .iter()
        .enumerate()
        .map(|(position, &condition)| {
            generate_block_plan(&BlockParams::with_config(
                participant_number,
                position,
                position + 1,
                condition,
                config,
            ))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(SessionPlan {
        participant_number,
        order,
        order_label: order_to_label(&order),
        blocks,
    })
}
