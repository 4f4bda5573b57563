#![forbid(unsafe_code)]

//! Latin square assignment of condition orders.

use crate::catalog::Condition;
use crate::error::{PlanError, Result};

/// The three condition orders. Each condition appears once per position.
pub const LATIN_SQUARE: [[Condition; 3]; 3] = [
    [Condition::ColorOnly, Condition::ShapeOnly, Condition::Combined],
    [Condition::ShapeOnly, Condition::Combined, Condition::ColorOnly],
    [Condition::Combined, Condition::ColorOnly, Condition::ShapeOnly],
];

/// Condition order for a participant, selected by `participant_number mod 3`.
///
/// Negative numbers use the Euclidean remainder so they still map into the square.
#[must_use]
pub fn latin_square_order(participant_number: i64) -> [Condition; 3] {
    LATIN_SQUARE[participant_number.rem_euclid(3) as usize]
}

/// Persisted label for an order: `color → A`, `shape → B`, `combined → C`.
#[must_use]
pub fn order_to_label(order: &[Condition]) -> String {
    order.iter().map(|c| c.letter()).collect()
}

/// Parse a persisted label back into an order.
///
/// Accepts only three-letter permutations of `ABC`.
pub fn label_to_order(label: &str) -> Result<[Condition; 3]> {
    let invalid = || PlanError::InvalidLabel {
        label: label.to_string(),
    };
    let letters: Vec<char> = label.trim().chars().collect();
    let [a, b, c] = letters.as_slice() else {
        return Err(invalid());
    };
    let order = [
        Condition::from_letter(*a).ok_or_else(invalid)?,
        Condition::from_letter(*b).ok_or_else(invalid)?,
        Condition::from_letter(*c).ok_or_else(invalid)?,
    ];
    if order[0] == order[1] || order[1] == order[2] || order[0] == order[2] {
        return Err(invalid());
    }
    Ok(order)
}
