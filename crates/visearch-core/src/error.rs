use thiserror::Error;

use crate::catalog::Condition;

pub type Result<T> = std::result::Result<T, PlanError>;

/// Errors raised while planning trials.
///
/// `TargetNotFound` and `AmbiguousTarget` are integrity failures: the
/// synthesizer guarantees exactly one matching item, so either one means
/// the generator itself is broken. They are returned to the caller and
/// never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("target {target} not found among items ({condition}, trial {trial_index})")]
    TargetNotFound {
        condition: Condition,
        trial_index: usize,
        target: String,
    },

    #[error("target {target} matched {matches} items ({condition}, trial {trial_index})")]
    AmbiguousTarget {
        condition: Condition,
        trial_index: usize,
        target: String,
        matches: usize,
    },

    #[error("invalid condition order label: {label:?}")]
    InvalidLabel { label: String },

    #[error("unknown condition: {value:?}")]
    InvalidCondition { value: String },

    #[error("invalid plan config: {message}")]
    InvalidConfig { message: String },
}

impl PlanError {
    /// True for errors that indicate a defect in the generator rather than bad input.
    #[must_use]
    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            Self::TargetNotFound { .. } | Self::AmbiguousTarget { .. }
        )
    }

    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
