use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;
use wheel_core::{ErrorInfo, WheelError};

/// Lifecycle stage of a single configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// Enumerated, not yet touched.
    Configured,
    /// Constraints are being folded.
    Solving,
    /// Wheels built without conflict.
    Solved,
    /// Two constraints disagreed on a slot.
    Conflicted,
    /// An anchor implied a forbidden zero key.
    Illegal,
    /// Plaintext and coverage computed.
    Derived,
    /// Not evaluated because the time budget ran out.
    Skipped,
    /// Outcome recorded. Terminal.
    Reported,
}

impl Stage {
    /// Whether `self -> next` is a legal transition.
    pub fn can_advance_to(self, next: Stage) -> bool {
        use Stage::*;
        matches!(
            (self, next),
            (Configured, Solving)
                | (Configured, Skipped)
                | (Solving, Solved | Conflicted | Illegal)
                | (Solved, Derived | Reported)
                | (Derived | Conflicted | Illegal | Skipped, Reported)
        )
    }

    /// True once no further transition is possible.
    pub fn is_terminal(self) -> bool {
        self == Stage::Reported
    }
}

/// Rejected stage transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal stage transition {from:?} -> {to:?}")]
pub struct TransitionError {
    /// Stage the lifecycle was in.
    pub from: Stage,
    /// Requested stage.
    pub to: Stage,
}

impl From<TransitionError> for WheelError {
    fn from(err: TransitionError) -> Self {
        WheelError::Config(
            ErrorInfo::new("illegal-transition", err.to_string())
                .with_context("from", format!("{:?}", err.from))
                .with_context("to", format!("{:?}", err.to)),
        )
    }
}

/// Stage tracker for one configuration, keeping the path it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lifecycle {
    history: Vec<Stage>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    /// Starts in [`Stage::Configured`].
    pub fn new() -> Self {
        Self {
            history: vec![Stage::Configured],
        }
    }

    /// Current stage.
    pub fn stage(&self) -> Stage {
        // history is never empty
        self.history[self.history.len() - 1]
    }

    /// Moves to `next`, rejecting transitions the lifecycle does not allow.
    pub fn advance(&mut self, next: Stage) -> Result<(), TransitionError> {
        let from = self.stage();
        if !from.can_advance_to(next) {
            return Err(TransitionError { from, to: next });
        }
        trace!(?from, to = ?next, "stage transition");
        self.history.push(next);
        Ok(())
    }

    /// Every stage visited, in order.
    pub fn history(&self) -> &[Stage] {
        &self.history
    }

    /// Consumes the tracker, returning the visited stages.
    pub fn into_history(self) -> Vec<Stage> {
        self.history
    }
}
