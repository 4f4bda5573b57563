#![forbid(unsafe_code)]

//! Trial grid synthesis.
//!
//! Each condition turns a target into an 8-item grid that contains the
//! target exactly once:
//!
//! - **color-only**: all eight colors in shuffled order, every item a circle.
//! - **shape-only**: all eight shapes in shuffled order, every item black.
//! - **combined**: the target pair plus seven pairs built by zipping the
//!   shuffled remaining colors with the shuffled remaining shapes, then the
//!   whole list shuffled. Each non-target color and shape appears once, so no
//!   other item can carry the full target pair.
//!
//! [`locate_target`] re-checks the result and is the only place the
//! correct item id is derived.

use serde::{Deserialize, Serialize};

use crate::catalog::{Color, Condition, GRID_SIZE, Shape};
use crate::error::{PlanError, Result};
use crate::rng::{RandomSource, shuffle};

/// One clickable grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StimulusItem {
    /// `item_1` .. `item_8`, in grid order.
    pub id: String,
    pub color: Color,
    pub shape: Shape,
}

impl StimulusItem {
    fn new(ordinal: usize, color: Color, shape: Shape) -> Self {
        Self {
            id: item_id(ordinal),
            color,
            shape,
        }
    }
}

/// Identifier of the item at zero-based grid position `ordinal`.
#[must_use]
pub fn item_id(ordinal: usize) -> String {
    format!("item_{}", ordinal + 1)
}

/// The prompted target of one trial.
///
/// Both attributes are always set; the condition decides which of them
/// participate in matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub color: Color,
    pub shape: Shape,
}

impl Target {
    #[must_use]
    pub const fn new(color: Color, shape: Shape) -> Self {
        Self { color, shape }
    }

    /// True when `item` satisfies this target under `condition`.
    #[must_use]
    pub fn matches(&self, condition: Condition, item: &StimulusItem) -> bool {
        match condition {
            Condition::ColorOnly => item.color == self.color,
            Condition::ShapeOnly => item.shape == self.shape,
            Condition::Combined => item.color == self.color && item.shape == self.shape,
        }
    }

    /// Instruction shown to the participant.
    #[must_use]
    pub fn prompt(&self, condition: Condition) -> String {
        match condition {
            Condition::ColorOnly => format!("Select the {} circle", self.color),
            Condition::ShapeOnly => format!("Select the {}", self.shape),
            Condition::Combined => format!("Select the {} {}", self.color, self.shape),
        }
    }

    /// Short human description used in errors and logs.
    #[must_use]
    pub fn describe(&self, condition: Condition) -> String {
        match condition {
            Condition::ColorOnly => self.color.to_string(),
            Condition::ShapeOnly => self.shape.to_string(),
            Condition::Combined => format!("{} {}", self.color, self.shape),
        }
    }
}

/// Build the 8-item grid for `target` under `condition`.
///
/// Draws taken from `rand`: 7 for color-only and shape-only; 6 + 6 + 7 for
/// combined (remaining colors, remaining shapes, final placement).
pub fn synthesize_items<R: RandomSource + ?Sized>(
    condition: Condition,
    target: Target,
    rand: &mut R,
) -> Vec<StimulusItem> {
    match condition {
        Condition::ColorOnly => shuffle(&Color::CATEGORIES, rand)
            .into_iter()
            .enumerate()
            .map(|(idx, color)| StimulusItem::new(idx, color, Shape::NEUTRAL))
            .collect(),
        Condition::ShapeOnly => shuffle(&Shape::CATEGORIES, rand)
            .into_iter()
            .enumerate()
            .map(|(idx, shape)| StimulusItem::new(idx, Color::NEUTRAL, shape))
            .collect(),
        Condition::Combined => synthesize_combined(target, rand),
    }
}

fn synthesize_combined<R: RandomSource + ?Sized>(target: Target, rand: &mut R) -> Vec<StimulusItem> {
    let other_colors: Vec<Color> = Color::CATEGORIES
        .into_iter()
        .filter(|&c| c != target.color)
        .collect();
    let other_shapes: Vec<Shape> = Shape::CATEGORIES
        .into_iter()
        .filter(|&s| s != target.shape)
        .collect();
    let other_colors = shuffle(&other_colors, rand);
    let other_shapes = shuffle(&other_shapes, rand);

    let mut pairs = Vec::with_capacity(GRID_SIZE);
    pairs.push((target.color, target.shape));
    pairs.extend(
        other_colors
            .into_iter()
            .zip(other_shapes)
            .take(GRID_SIZE - 1),
    );

    shuffle(&pairs, rand)
        .into_iter()
        .enumerate()
        .map(|(idx, (color, shape))| StimulusItem::new(idx, color, shape))
        .collect()
}

/// Return the id of the single item matching `target`.
///
/// Fails with [`PlanError::TargetNotFound`] when nothing matches and
/// [`PlanError::AmbiguousTarget`] when more than one item does.
pub fn locate_target(
    condition: Condition,
    target: Target,
    items: &[StimulusItem],
    trial_index: usize,
) -> Result<String> {
    let mut matching = items.iter().filter(|item| target.matches(condition, item));
    let Some(first) = matching.next() else {
        return Err(PlanError::TargetNotFound {
            condition,
            trial_index,
            target: target.describe(condition),
        });
    };
    let extra = matching.count();
    if extra > 0 {
        return Err(PlanError::AmbiguousTarget {
            condition,
            trial_index,
            target: target.describe(condition),
            matches: extra + 1,
        });
    }
    Ok(first.id.clone())
}
