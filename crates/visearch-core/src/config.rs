#![forbid(unsafe_code)]

//! Trial-count configuration.
//!
//! Defaults come from the experiment protocol (3 practice + 10 measured
//! trials per block). Deployments can override them through environment
//! variables; explicit values (CLI flags, bridge parameters) win over both.

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};

/// Default number of practice trials per block.
pub const DEFAULT_PRACTICE_TRIALS: usize = 3;

/// Default number of measured trials per block.
pub const DEFAULT_MEASURED_TRIALS: usize = 10;

/// Upper bound on either trial count of a single block.
pub const MAX_TRIALS_PER_BLOCK: usize = 1_000;

/// Environment override for [`PlanConfig::practice_trials`].
pub const ENV_PRACTICE_TRIALS: &str = "VISEARCH_PRACTICE_TRIALS";

/// Environment override for [`PlanConfig::measured_trials`].
pub const ENV_MEASURED_TRIALS: &str = "VISEARCH_MEASURED_TRIALS";

/// Per-block trial counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    pub practice_trials: usize,
    pub measured_trials: usize,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            practice_trials: DEFAULT_PRACTICE_TRIALS,
            measured_trials: DEFAULT_MEASURED_TRIALS,
        }
    }
}

impl PlanConfig {
    #[must_use]
    pub const fn new(practice_trials: usize, measured_trials: usize) -> Self {
        Self {
            practice_trials,
            measured_trials,
        }
    }

    /// Defaults with environment overrides applied. Unparseable values are ignored.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides read through `lookup`.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).and_then(|v| v.trim().parse::<usize>().ok());
        let defaults = Self::default();
        Self {
            practice_trials: read(ENV_PRACTICE_TRIALS).unwrap_or(defaults.practice_trials),
            measured_trials: read(ENV_MEASURED_TRIALS).unwrap_or(defaults.measured_trials),
        }
    }

    /// Replace counts with any explicitly provided values.
    #[must_use]
    pub fn with_overrides(self, practice: Option<usize>, measured: Option<usize>) -> Self {
        Self {
            practice_trials: practice.unwrap_or(self.practice_trials),
            measured_trials: measured.unwrap_or(self.measured_trials),
        }
    }

    /// Practice plus measured trials, saturating at `usize::MAX`.
    #[must_use]
    pub const fn total_trials(&self) -> usize {
        self.practice_trials.saturating_add(self.measured_trials)
    }

    /// Reject configurations that would produce an empty or oversized block.
    pub fn validate(&self) -> Result<()> {
        let total = self
            .practice_trials
            .checked_add(self.measured_trials)
            .ok_or_else(|| PlanError::invalid_config("trial counts overflow"))?;
        if total == 0 {
            return Err(PlanError::invalid_config(
                "a block needs at least one practice or measured trial",
            ));
        }
        self.check_limits()
    }

    /// Reject counts above [`MAX_TRIALS_PER_BLOCK`]. Empty blocks pass.
    pub fn check_limits(&self) -> Result<()> {
        for (kind, count) in [
            ("practice", self.practice_trials),
            ("measured", self.measured_trials),
        ] {
            if count > MAX_TRIALS_PER_BLOCK {
                return Err(PlanError::invalid_config(format!(
                    "{count} {kind} trials exceeds the per-block limit of {MAX_TRIALS_PER_BLOCK}"
                )));
            }
        }
        Ok(())
    }
}
