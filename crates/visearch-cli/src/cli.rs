use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::info;
use visearch_core::{
    AuditReport, BlockParams, BlockPlan, Condition, PlanConfig, SessionPlan, audit_participants,
    generate_block_plan, generate_session_plan, latin_square_order, order_to_label,
};

use crate::error::{CliError, Result};

#[derive(Debug, Parser)]
#[command(
    name = "visearch",
    about = "Trial plans, condition orders, and balance audits for the visual search experiment",
    version
)]
pub struct Cli {
    /// Emit pretty-printed JSON instead of a text summary.
    #[arg(long, global = true)]
    pub json: bool,

    /// Format log records (stderr) as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the counterbalanced condition order for a participant.
    Order(OrderArgs),

    /// Plan a single condition block.
    Block(BlockArgs),

    /// Plan all three blocks of a participant's session.
    Session(SessionArgs),

    /// Plan sessions for a participant range and check balance invariants.
    Audit(AuditArgs),
}

#[derive(Debug, Clone, Args)]
pub struct OrderArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub participant: i64,
}

/// Trial-count flags shared by planning commands. Unset flags fall back to
/// `VISEARCH_PRACTICE_TRIALS` / `VISEARCH_MEASURED_TRIALS`, then defaults.
#[derive(Debug, Clone, Default, Args)]
pub struct TrialCountArgs {
    #[arg(long)]
    pub practice: Option<usize>,

    #[arg(long)]
    pub measured: Option<usize>,
}

impl TrialCountArgs {
    #[must_use]
    pub fn resolve(&self) -> PlanConfig {
        PlanConfig::from_env().with_overrides(self.practice, self.measured)
    }
}

#[derive(Debug, Clone, Args)]
pub struct BlockArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub participant: i64,

    #[arg(long = "block-index", default_value_t = 0)]
    pub block_index: usize,

    #[arg(long = "block-order", default_value_t = 1)]
    pub block_order: usize,

    /// `color-only`, `shape-only` or `combined` (short forms accepted).
    #[arg(long)]
    pub condition: Condition,

    #[command(flatten)]
    pub counts: TrialCountArgs,
}

#[derive(Debug, Clone, Args)]
pub struct SessionArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub participant: i64,

    #[command(flatten)]
    pub counts: TrialCountArgs,

    /// Write the session plan as JSON to this file.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct AuditArgs {
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub from: i64,

    #[arg(long, default_value_t = 300, value_parser = clap::value_parser!(u64).range(1..))]
    pub count: u64,

    #[command(flatten)]
    pub counts: TrialCountArgs,
}

/// Command result in both output forms.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub json: Value,
    pub text: String,
}

pub fn run(cli: Cli) -> Result<()> {
    let rendered = execute(&cli.command)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    emit(&rendered, cli.json, &mut out)?;
    if let Commands::Audit(_) = cli.command {
        let violations = rendered.json["violations"]
            .as_array()
            .map_or(0, Vec::len);
        if violations > 0 {
            return Err(CliError::AuditFailed { violations });
        }
    }
    Ok(())
}

/// Run a command without printing.
pub fn execute(command: &Commands) -> Result<Rendered> {
    match command {
        Commands::Order(args) => Ok(render_order(args.participant)),
        Commands::Block(args) => run_block(args),
        Commands::Session(args) => run_session(args),
        Commands::Audit(args) => run_audit(args),
    }
}

pub fn emit(rendered: &Rendered, as_json: bool, out: &mut impl Write) -> Result<()> {
    if as_json {
        serde_json::to_writer_pretty(&mut *out, &rendered.json)?;
        writeln!(out)?;
    } else {
        out.write_all(rendered.text.as_bytes())?;
    }
    Ok(())
}

fn to_value<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn render_order(participant: i64) -> Rendered {
    let order = latin_square_order(participant);
    let label = order_to_label(&order);
    let names: Vec<&str> = order.iter().map(|c| c.as_str()).collect();
    Rendered {
        json: json!({
            "participant_number": participant,
            "order": names,
            "order_label": label,
        }),
        text: format!("participant {participant}: {label} ({})\n", names.join(", ")),
    }
}

fn run_block(args: &BlockArgs) -> Result<Rendered> {
    let config = args.counts.resolve();
    config.validate()?;
    let params = BlockParams::with_config(
        args.participant,
        args.block_index,
        args.block_order,
        args.condition,
        config,
    );
    let plan = generate_block_plan(&params)?;
    info!(
        participant = args.participant,
        condition = args.condition.as_str(),
        trials = plan.trials.len(),
        "cli.block"
    );
    Ok(Rendered {
        json: to_value(&plan)?,
        text: block_text(&plan),
    })
}

fn block_text(plan: &BlockPlan) -> String {
    let mut text = format!(
        "block {} (order {}) {}: seed {}, {} practice + {} measured\n",
        plan.block_index,
        plan.block_order,
        plan.condition,
        plan.seed,
        plan.practice_trials,
        plan.measured_trials
    );
    for trial in &plan.trials {
        let marker = if trial.is_practice { 'P' } else { 'M' };
        text.push_str(&format!(
            "  [{marker}] {:>2} {:<28} -> {}\n",
            trial.trial_index, trial.prompt, trial.correct_item_id
        ));
    }
    text
}

fn run_session(args: &SessionArgs) -> Result<Rendered> {
    let config = args.counts.resolve();
    let session = generate_session_plan(args.participant, config)?;
    let json = to_value(&session)?;
    if let Some(path) = &args.output {
        write_json_file(path, &json)?;
        info!(path = %path.display(), "cli.session.written");
    }
    Ok(Rendered {
        text: session_text(&session, args.output.as_deref()),
        json,
    })
}

fn session_text(session: &SessionPlan, output: Option<&Path>) -> String {
    let mut text = format!(
        "participant {}: order {}\n",
        session.participant_number, session.order_label
    );
    for block in &session.blocks {
        text.push_str(&block_text(block));
    }
    if let Some(path) = output {
        text.push_str(&format!("written to {}\n", path.display()));
    }
    text
}

fn write_json_file(path: &Path, value: &Value) -> Result<()> {
    if path.as_os_str().is_empty() || path.is_dir() {
        return Err(CliError::OutputPath {
            path: path.to_path_buf(),
        });
    }
    let mut body = serde_json::to_string_pretty(value)?;
    body.push('\n');
    std::fs::write(path, body)?;
    Ok(())
}

fn run_audit(args: &AuditArgs) -> Result<Rendered> {
    let config = args.counts.resolve();
    config.validate()?;
    let count = usize::try_from(args.count)
        .map_err(|_| CliError::invalid(format!("participant count too large: {}", args.count)))?;
    let report = audit_participants(args.from, count, config)?;
    Ok(Rendered {
        json: to_value(&report)?,
        text: audit_text(&report),
    })
}

fn audit_text(report: &AuditReport) -> String {
    let status = if report.is_clean() { "ok" } else { "FAILED" };
    let mut text = format!(
        "audit {status}: participants {}..{} ({} blocks, {} trials)\n",
        report.first_participant,
        report
            .first_participant
            .saturating_add(i64::try_from(report.participants).unwrap_or(i64::MAX)),
        report.blocks_checked,
        report.trials_checked
    );
    text.push_str("color extras:");
    for (color, count) in &report.color_extras {
        text.push_str(&format!(" {color}={count}"));
    }
    text.push_str("\nshape extras:");
    for (shape, count) in &report.shape_extras {
        text.push_str(&format!(" {shape}={count}"));
    }
    text.push('\n');
    for violation in &report.violations {
        text.push_str(&format!("  violation: {violation}\n"));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn counts(practice: usize, measured: usize) -> TrialCountArgs {
        TrialCountArgs {
            practice: Some(practice),
            measured: Some(measured),
        }
    }

    #[test]
    fn order_command_reports_label() {
        let rendered = execute(&Commands::Order(OrderArgs { participant: 5 })).unwrap();
        assert_eq!(rendered.json["order_label"], "CAB");
        assert_eq!(
            rendered.text,
            "participant 5: CAB (combined, color-only, shape-only)\n"
        );
    }

    #[test]
    fn block_command_emits_plan_json() {
        let rendered = execute(&Commands::Block(BlockArgs {
            participant: 123_456,
            block_index: 0,
            block_order: 1,
            condition: Condition::Combined,
            counts: counts(3, 10),
        }))
        .unwrap();
        let trials = rendered.json["trials"].as_array().unwrap();
        assert_eq!(trials.len(), 13);
        assert_eq!(rendered.json["seed"], 123_456_019);
        assert_eq!(rendered.text.lines().count(), 14);
        assert!(rendered.text.lines().nth(1).unwrap().contains("[P]"));
    }

    #[test]
    fn block_command_rejects_empty_block() {
        let error = execute(&Commands::Block(BlockArgs {
            participant: 1,
            block_index: 0,
            block_order: 1,
            condition: Condition::ColorOnly,
            counts: counts(0, 0),
        }))
        .unwrap_err();
        assert!(matches!(error, CliError::Plan(_)));
    }

    #[test]
    fn session_command_writes_output_file() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("session.json");
        let rendered = execute(&Commands::Session(SessionArgs {
            participant: 2,
            counts: counts(3, 10),
            output: Some(path.clone()),
        }))
        .unwrap();
        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("json");
        assert_eq!(written, rendered.json);
        assert_eq!(written["order_label"], "CAB");
        assert!(rendered.text.ends_with(&format!("written to {}\n", path.display())));
    }

    #[test]
    fn session_command_rejects_directory_output() {
        let temp = tempdir().expect("tempdir");
        let error = execute(&Commands::Session(SessionArgs {
            participant: 2,
            counts: counts(3, 10),
            output: Some(temp.path().to_path_buf()),
        }))
        .unwrap_err();
        assert!(matches!(error, CliError::OutputPath { .. }));
    }

    #[test]
    fn audit_command_is_clean_for_default_counts() {
        let rendered = execute(&Commands::Audit(AuditArgs {
            from: 0,
            count: 30,
            counts: counts(3, 10),
        }))
        .unwrap();
        assert!(rendered.text.starts_with("audit ok: participants 0..30"));
        assert_eq!(rendered.json["violations"], json!([]));
        assert_eq!(rendered.json["blocks_checked"], 90);
    }

    #[test]
    fn audit_at_participant_range_end_does_not_overflow() {
        let rendered = execute(&Commands::Audit(AuditArgs {
            from: i64::MAX,
            count: 1,
            counts: counts(3, 10),
        }))
        .unwrap();
        assert!(
            rendered
                .text
                .starts_with(&format!("audit ok: participants {0}..{0}", i64::MAX)),
            "{}",
            rendered.text
        );
    }

    #[test]
    fn block_command_rejects_overflowing_counts() {
        let error = execute(&Commands::Block(BlockArgs {
            participant: 1,
            block_index: 0,
            block_order: 1,
            condition: Condition::Combined,
            counts: counts(usize::MAX, 1),
        }))
        .unwrap_err();
        assert!(matches!(error, CliError::Plan(_)));
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn emit_switches_between_text_and_json() {
        let rendered = render_order(0);
        let mut text = Vec::new();
        emit(&rendered, false, &mut text).unwrap();
        assert_eq!(String::from_utf8(text).unwrap(), rendered.text);

        let mut json_out = Vec::new();
        emit(&rendered, true, &mut json_out).unwrap();
        let parsed: Value = serde_json::from_slice(&json_out).unwrap();
        assert_eq!(parsed, rendered.json);
    }

    #[test]
    fn cli_parses_short_condition_and_negative_participant() {
        let cli = Cli::try_parse_from([
            "visearch",
            "--json",
            "block",
            "--participant",
            "-4",
            "--condition",
            "shape",
        ])
        .unwrap();
        assert!(cli.json);
        let Commands::Block(args) = cli.command else {
            panic!("expected block command");
        };
        assert_eq!(args.participant, -4);
        assert_eq!(args.condition, Condition::ShapeOnly);
        assert_eq!(args.block_order, 1);
    }

    #[test]
    fn cli_rejects_unknown_condition() {
        let result = Cli::try_parse_from([
            "visearch",
            "block",
            "--participant",
            "1",
            "--condition",
            "texture",
        ]);
        assert!(result.is_err());
    }
}
