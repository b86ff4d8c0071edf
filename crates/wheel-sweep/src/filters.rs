use serde::{Deserialize, Serialize};

use crate::report::{ConfigOutcome, Status};

/// Acceptance criteria applied to every outcome before ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeFilter {
    /// Minimum number of determined positions.
    #[serde(default)]
    pub min_determined: usize,
    /// Whether the derived plaintext must be fully determined.
    #[serde(default)]
    pub require_closure: bool,
    /// Statuses that may pass.
    #[serde(default = "OutcomeFilter::default_statuses")]
    pub statuses: Vec<Status>,
}

impl OutcomeFilter {
    fn default_statuses() -> Vec<Status> {
        vec![Status::Solved]
    }

    /// Applies the filter to an outcome.
    pub fn evaluate(&self, outcome: &ConfigOutcome) -> FilterDecision {
        let closed = outcome.coverage.as_ref().is_some_and(|c| c.closed);
        FilterDecision {
            status: self.statuses.contains(&outcome.status),
            determined: outcome.determined() >= self.min_determined,
            closure: !self.require_closure || closed,
        }
    }
}

impl Default for OutcomeFilter {
    fn default() -> Self {
        Self {
            min_determined: 0,
            require_closure: false,
            statuses: Self::default_statuses(),
        }
    }
}

/// Per-predicate filter results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterDecision {
    /// Status is whitelisted.
    pub status: bool,
    /// Enough positions determined.
    pub determined: bool,
    /// Closure predicate result.
    pub closure: bool,
}

impl FilterDecision {
    /// Returns true when all predicates succeed.
    pub fn passes(&self) -> bool {
        self.status && self.determined && self.closure
    }
}
