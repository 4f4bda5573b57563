#![forbid(unsafe_code)]

//! Platform-independent JSON bridge over `visearch-core`.
//!
//! No JS/WASM types here. Errors are returned as display strings, which
//! the wasm layer throws as JS exceptions.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;
use visearch_core::{
    BlockParams, Color, Condition, MAX_TRIALS_PER_BLOCK, PlanConfig, Shape, TrialPlan,
    assert_balanced_targets, generate_block_plan, generate_session_plan, latin_square_order,
    order_to_label,
};

/// Largest integer a JS number represents exactly (`Number.MAX_SAFE_INTEGER`).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Convert a JS number to a participant number.
pub fn participant_from_f64(value: f64) -> Result<i64, String> {
    if !value.is_finite() || value.fract() != 0.0 || value.abs() > MAX_SAFE_INTEGER {
        return Err(format!("participant number must be a safe integer, got {value}"));
    }
    Ok(value as i64)
}

fn count_from_f64(name: &str, value: f64) -> Result<usize, String> {
    if !value.is_finite() || value.fract() != 0.0 || value < 0.0 {
        return Err(format!("{name} must be a non-negative integer, got {value}"));
    }
    if value > MAX_TRIALS_PER_BLOCK as f64 {
        return Err(format!(
            "{name} must be at most {MAX_TRIALS_PER_BLOCK}, got {value}"
        ));
    }
    Ok(value as usize)
}

/// Condition order as short names (`color`, `shape`, `combined`).
#[must_use]
pub fn latin_square_order_names(participant_number: i64) -> Vec<&'static str> {
    latin_square_order(participant_number)
        .iter()
        .map(|c| c.short_name())
        .collect()
}

/// Label for a three-condition order given as names (short or wire form).
pub fn order_label(names: &[String]) -> Result<String, String> {
    if names.len() != 3 {
        return Err(format!(
            "condition order must list 3 conditions, got {}",
            names.len()
        ));
    }
    let order = names
        .iter()
        .map(|name| name.parse::<Condition>().map_err(|e| e.to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(order_to_label(&order))
}

/// Plan one block from camelCase params JSON; returns the plan as JSON.
pub fn block_plan_json(params_json: &str) -> Result<String, String> {
    let params: BlockParams = serde_json::from_str(params_json)
        .map_err(|e| format!("invalid block params: {e}"))?;
    PlanConfig::new(params.practice_trials, params.measured_trials)
        .validate()
        .map_err(|e| e.to_string())?;
    let plan = generate_block_plan(&params).map_err(|e| {
        warn!(%e, "bridge.block_plan.failed");
        e.to_string()
    })?;
    serde_json::to_string(&plan).map_err(|e| e.to_string())
}

/// Plan a full session; returns the plan as JSON.
pub fn session_plan_json(
    participant_number: f64,
    practice_trials: f64,
    measured_trials: f64,
) -> Result<String, String> {
    let participant = participant_from_f64(participant_number)?;
    let config = PlanConfig::new(
        count_from_f64("practiceTrials", practice_trials)?,
        count_from_f64("measuredTrials", measured_trials)?,
    );
    let session = generate_session_plan(participant, config).map_err(|e| e.to_string())?;
    serde_json::to_string(&session).map_err(|e| e.to_string())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TrialsInput {
    Trials(Vec<TrialPlan>),
    Block { trials: Vec<TrialPlan> },
}

/// Balance spread for a trial array or a block plan object.
pub fn balance_report_json(trials_json: &str) -> Result<String, String> {
    let input: TrialsInput =
        serde_json::from_str(trials_json).map_err(|e| format!("invalid trials: {e}"))?;
    let trials = match input {
        TrialsInput::Trials(trials) | TrialsInput::Block { trials } => trials,
    };
    serde_json::to_string(&assert_balanced_targets(&trials)).map_err(|e| e.to_string())
}

#[derive(Serialize)]
struct ColorEntry {
    name: &'static str,
    hex: &'static str,
}

#[derive(Serialize)]
struct ShapeEntry {
    name: &'static str,
    glyph: &'static str,
}

fn color_entry(color: Color) -> ColorEntry {
    ColorEntry {
        name: color.name(),
        hex: color.hex(),
    }
}

fn shape_entry(shape: Shape) -> ShapeEntry {
    ShapeEntry {
        name: shape.name(),
        glyph: shape.glyph(),
    }
}

/// Category tables the UI uses to render item colors and glyphs.
#[must_use]
pub fn catalog_value() -> Value {
    json!({
        "colors": Color::CATEGORIES.map(color_entry),
        "shapes": Shape::CATEGORIES.map(shape_entry),
        "neutral_color": color_entry(Color::NEUTRAL),
        "neutral_shape": shape_entry(Shape::NEUTRAL),
    })
}
