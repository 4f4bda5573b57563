#![forbid(unsafe_code)]

//! Deterministic trial generation for the visual search experiment.
//!
//! The experiment is a within-subjects design with three encoding
//! conditions (color-only, shape-only, combined). For every participant
//! this crate decides the condition order, and for every block it builds
//! a reproducible list of trials whose targets are balanced across the
//! color and shape categories.
//!
//! # Pipeline
//!
//! ```text
//! participant number ─► Latin square order ─► block seed ─► balanced targets
//!                                                  │
//!                                                  └─► trial seed ─► 8-item grid
//! ```
//!
//! Every stage is a pure function of its integer inputs. Two calls with the
//! same participant, block index and block order produce identical plans,
//! down to the order of the items in each grid.
//!
//! # How it fits in the system
//! The browser UI (through `visearch-wasm`) and the operator tooling
//! (`visearch-cli`) both consume [`BlockPlan`] and [`SessionPlan`] values
//! produced here. Nothing in this crate performs I/O.

pub mod balance;
pub mod catalog;
pub mod config;
pub mod counterbalance;
pub mod error;
pub mod plan;
pub mod rng;
pub mod stimulus;
pub mod verify;

pub use balance::build_balanced_indices;
pub use catalog::{Color, Condition, GRID_SIZE, Shape};
pub use config::{MAX_TRIALS_PER_BLOCK, PlanConfig};
pub use counterbalance::{LATIN_SQUARE, label_to_order, latin_square_order, order_to_label};
pub use error::{PlanError, Result};
pub use plan::{
    BlockParams, BlockPlan, SessionPlan, TrialPlan, block_seed, generate_block_plan,
    generate_session_plan, trial_seed,
};
pub use rng::{SeededRandom, shuffle};
pub use stimulus::{StimulusItem, Target, synthesize_items};
pub use verify::{
    AuditReport, BalanceReport, TargetCounts, assert_balanced_targets, audit_participants,
    extra_categories, target_counts,
};
