//! Module: governor
//! Responsibility: turning state memory estimates into continue/spill/abort decisions.
//! Does not own: state memory accounting itself, or how the engine spills.
//! Boundary: policy lives here, outside state containers, so limits stay
//! centralized and states only ever report.

#[cfg(test)]
mod tests;

use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    obs::sink::{self, DecisionKind, MetricsEvent},
    state::HyperLogLogState,
};
use thiserror::Error as ThisError;

///
/// GovernorError
///
/// Typed memory-policy failure surface. Keeps limit breaches explicit instead
/// of degrading them into generic internal errors.
///

#[derive(Debug, ThisError)]
pub enum GovernorError {
    #[error("aggregation memory limit exceeded ({resource}): attempted={attempted}, limit={limit}")]
    MemoryLimitExceeded {
        resource: &'static str,
        attempted: u64,
        limit: u64,
    },

    #[error("{0}")]
    Internal(#[from] InternalError),
}

impl From<GovernorError> for InternalError {
    fn from(err: GovernorError) -> Self {
        match err {
            GovernorError::Internal(inner) => inner,
            limit @ GovernorError::MemoryLimitExceeded { .. } => Self::new(
                ErrorClass::ResourceExhausted,
                ErrorOrigin::Governor,
                limit.to_string(),
            ),
        }
    }
}

///
/// MemoryConfig
///
/// Hard limits selected by the engine for one aggregation. Estimates at or
/// below `spill_threshold` continue; above it up to `hard_limit` spill; above
/// `hard_limit` abort.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MemoryConfig {
    spill_threshold: u64,
    hard_limit: u64,
}

impl MemoryConfig {
    /// Build one limit pair. A threshold above the hard limit is clamped down.
    #[must_use]
    pub const fn with_limits(spill_threshold: u64, hard_limit: u64) -> Self {
        let spill_threshold = if spill_threshold > hard_limit {
            hard_limit
        } else {
            spill_threshold
        };

        Self {
            spill_threshold,
            hard_limit,
        }
    }

    /// Build one configuration that never spills or aborts.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self::with_limits(u64::MAX, u64::MAX)
    }

    #[must_use]
    pub const fn spill_threshold(&self) -> u64 {
        self.spill_threshold
    }

    #[must_use]
    pub const fn hard_limit(&self) -> u64 {
        self.hard_limit
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self::unbounded()
    }
}

///
/// MemoryDecision
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MemoryDecision {
    Continue,
    Spill,
}

///
/// MemoryGovernor
///
/// Polls state estimates between batches. Checks are O(1) because states
/// keep their size as running totals.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MemoryGovernor {
    config: MemoryConfig,
}

impl MemoryGovernor {
    #[must_use]
    pub const fn new(config: MemoryConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Decide for one state's current estimate.
    pub fn check<S>(
        &self,
        state: &(impl HyperLogLogState<S> + ?Sized),
    ) -> Result<MemoryDecision, GovernorError> {
        self.check_bytes(state.estimated_size())
    }

    /// Decide for an already-summed estimate, e.g. across all aggregates of
    /// one operator.
    pub fn check_bytes(&self, estimated_bytes: u64) -> Result<MemoryDecision, GovernorError> {
        let decision = if estimated_bytes > self.config.hard_limit() {
            DecisionKind::LimitExceeded
        } else if estimated_bytes > self.config.spill_threshold() {
            DecisionKind::Spill
        } else {
            DecisionKind::Continue
        };
        sink::record(MetricsEvent::GovernorDecision {
            decision,
            estimated_bytes,
        });

        match decision {
            DecisionKind::Continue => Ok(MemoryDecision::Continue),
            DecisionKind::Spill => Ok(MemoryDecision::Spill),
            DecisionKind::LimitExceeded => Err(GovernorError::MemoryLimitExceeded {
                resource: "estimated_bytes",
                attempted: estimated_bytes,
                limit: self.config.hard_limit(),
            }),
        }
    }
}
