//! End-to-end command tests: parse argv, execute, emit.

use clap::Parser;
use serde_json::Value;
use visearch_cli::cli::{Cli, emit, execute};
use visearch_cli::CliError;

fn run_json(argv: &[&str]) -> Result<Value, CliError> {
    let cli = Cli::try_parse_from(argv).expect("argv should parse");
    let rendered = execute(&cli.command)?;
    let mut out = Vec::new();
    emit(&rendered, true, &mut out)?;
    Ok(serde_json::from_slice(&out).expect("emitted JSON should parse"))
}

#[test]
fn block_plan_json_is_reproducible() {
    let argv = [
        "visearch",
        "block",
        "--participant",
        "123456",
        "--block-index",
        "0",
        "--block-order",
        "1",
        "--condition",
        "combined",
        "--practice",
        "3",
        "--measured",
        "10",
    ];
    let first = run_json(&argv).expect("block plan");
    let second = run_json(&argv).expect("block plan");
    assert_eq!(first, second);
    let trials = first["trials"].as_array().expect("trials array");
    assert_eq!(trials.len(), 13);
    let practice = trials
        .iter()
        .filter(|t| t["is_practice"] == Value::Bool(true))
        .count();
    assert_eq!(practice, 3);
}

#[test]
fn session_json_lists_blocks_in_latin_square_order() {
    let value = run_json(&["visearch", "session", "--participant", "7"]).expect("session");
    assert_eq!(value["order_label"], "BCA");
    let conditions: Vec<&str> = value["blocks"]
        .as_array()
        .expect("blocks array")
        .iter()
        .map(|b| b["condition"].as_str().expect("condition string"))
        .collect();
    assert_eq!(conditions, ["shape-only", "combined", "color-only"]);
}

#[test]
fn audit_json_reports_extras_across_categories() {
    let value = run_json(&["visearch", "audit", "--from", "100", "--count", "60"]).expect("audit");
    assert_eq!(value["participants"], 60);
    let color_extras = value["color_extras"].as_object().expect("color extras");
    let shape_extras = value["shape_extras"].as_object().expect("shape extras");
    assert!(color_extras.len() > 2, "{color_extras:?}");
    assert!(shape_extras.len() > 2, "{shape_extras:?}");
}

#[test]
fn zero_count_audit_is_rejected_by_parser() {
    assert!(Cli::try_parse_from(["visearch", "audit", "--count", "0"]).is_err());
}
