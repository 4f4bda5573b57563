#![forbid(unsafe_code)]

//! Balance verification over generated plans.
//!
//! Only measured trials count toward balance; practice trials are
//! excluded from analysis and balanced separately.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::catalog::{Color, Condition, GRID_SIZE, Shape};
use crate::config::PlanConfig;
use crate::error::Result;
use crate::plan::{BlockPlan, TrialPlan, generate_session_plan};

/// Measured-trial target counts per category.
///
/// Only categories that occur as a target appear in the maps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetCounts {
    pub colors: BTreeMap<Color, usize>,
    pub shapes: BTreeMap<Shape, usize>,
}

impl TargetCounts {
    #[must_use]
    pub fn color_spread(&self) -> usize {
        spread(&self.colors)
    }

    #[must_use]
    pub fn shape_spread(&self) -> usize {
        spread(&self.shapes)
    }
}

/// Spread (max − min) of measured target counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceReport {
    pub max_color_diff: usize,
    pub max_shape_diff: usize,
}

impl BalanceReport {
    /// True when both marginals are near-even.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.max_color_diff <= 1 && self.max_shape_diff <= 1
    }
}

fn spread<K>(counts: &BTreeMap<K, usize>) -> usize {
    let max = counts.values().copied().max().unwrap_or(0);
    let min = counts.values().copied().min().unwrap_or(0);
    max - min
}

/// Count measured-trial targets per color and per shape.
#[must_use]
pub fn target_counts(trials: &[TrialPlan]) -> TargetCounts {
    let mut counts = TargetCounts::default();
    for trial in trials.iter().filter(|t| !t.is_practice) {
        *counts.colors.entry(trial.target.color).or_default() += 1;
        *counts.shapes.entry(trial.target.shape).or_default() += 1;
    }
    counts
}

/// Spread of measured target counts per color and per shape.
#[must_use]
pub fn assert_balanced_targets(trials: &[TrialPlan]) -> BalanceReport {
    let counts = target_counts(trials);
    BalanceReport {
        max_color_diff: counts.color_spread(),
        max_shape_diff: counts.shape_spread(),
    }
}

/// Categories that received more than the floor allocation.
///
/// `category_count` is the size of the category set the counts were
/// balanced over.
#[must_use]
pub fn extra_categories<K: Copy + Ord>(
    counts: &BTreeMap<K, usize>,
    category_count: usize,
) -> Vec<K> {
    if category_count == 0 {
        return Vec::new();
    }
    let total: usize = counts.values().sum();
    let floor = total / category_count;
    counts
        .iter()
        .filter(|&(_, &count)| count > floor)
        .map(|(&key, _)| key)
        .collect()
}

/// Result of auditing every session over a participant range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub first_participant: i64,
    pub participants: usize,
    pub blocks_checked: usize,
    pub trials_checked: usize,
    /// How often each color received an extra measured occurrence.
    pub color_extras: BTreeMap<Color, usize>,
    /// How often each shape received an extra measured occurrence.
    pub shape_extras: BTreeMap<Shape, usize>,
    pub violations: Vec<String>,
}

impl AuditReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Plan every session for `count` participants starting at `first` and
/// check the structural and balance invariants of each block.
///
/// Integrity failures from the planner propagate as errors; invariant
/// breaches are collected as violations.
pub fn audit_participants(first: i64, count: usize, config: PlanConfig) -> Result<AuditReport> {
    let mut report = AuditReport {
        first_participant: first,
        participants: count,
        ..AuditReport::default()
    };

    for offset in 0..count {
        let participant = first.wrapping_add(offset as i64);
        let session = generate_session_plan(participant, config)?;
        for block in &session.blocks {
            audit_block(block, config, &mut report);
        }
    }

    if report.is_clean() {
        info!(
            first,
            count,
            blocks = report.blocks_checked,
            "audit.clean"
        );
    } else {
        warn!(
            first,
            count,
            violations = report.violations.len(),
            "audit.violations"
        );
    }
    Ok(report)
}

fn audit_block(block: &BlockPlan, config: PlanConfig, report: &mut AuditReport) {
    let label = format!(
        "participant {} block {} ({})",
        block.participant_number, block.block_index, block.condition
    );
    let mut violate = |message: String| report.violations.push(format!("{label}: {message}"));

    if block.trials.len() != config.total_trials() {
        violate(format!(
            "expected {} trials, got {}",
            config.total_trials(),
            block.trials.len()
        ));
    }
    let practice = block.practice().count();
    if practice != config.practice_trials {
        violate(format!(
            "expected {} practice trials, got {practice}",
            config.practice_trials
        ));
    }

    for trial in &block.trials {
        let ids: HashSet<&str> = trial.items.iter().map(|i| i.id.as_str()).collect();
        if trial.items.len() != GRID_SIZE || ids.len() != GRID_SIZE {
            violate(format!(
                "trial {} has {} items with {} distinct ids",
                trial.trial_index,
                trial.items.len(),
                ids.len()
            ));
        }
        let hits: Vec<&str> = trial
            .items
            .iter()
            .filter(|item| trial.matches(item))
            .map(|item| item.id.as_str())
            .collect();
        if hits != [trial.correct_item_id.as_str()] {
            violate(format!(
                "trial {} target matches {hits:?}, expected [{}]",
                trial.trial_index, trial.correct_item_id
            ));
        }
    }

    let counts = target_counts(&block.trials);
    let balance = BalanceReport {
        max_color_diff: counts.color_spread(),
        max_shape_diff: counts.shape_spread(),
    };
    if !balance.is_balanced() {
        violate(format!("unbalanced measured targets: {balance:?}"));
    }

    if block.condition != Condition::ShapeOnly {
        for color in extra_categories(&counts.colors, GRID_SIZE) {
            *report.color_extras.entry(color).or_default() += 1;
        }
    }
    if block.condition != Condition::ColorOnly {
        for shape in extra_categories(&counts.shapes, GRID_SIZE) {
            *report.shape_extras.entry(shape).or_default() += 1;
        }
    }

    report.blocks_checked += 1;
    report.trials_checked += block.trials.len();
}
