use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::report::{ConfigOutcome, Status};

const FRACTION_BINS: usize = 10;

/// Deterministic histogram descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// Bin edges (inclusive of the left edge, exclusive of the right edge except the last bin).
    pub edges: Vec<f64>,
    /// Counts recorded per bin.
    pub counts: Vec<u64>,
}

/// Aggregate statistics over a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSummary {
    /// Number of outcomes.
    pub total: usize,
    /// Outcome counts keyed by status label.
    pub status_counts: BTreeMap<String, usize>,
    /// Outcomes passing the filters.
    pub passing: usize,
    /// Highest determined count among solved outcomes.
    pub best_determined: Option<usize>,
    /// Median determined count among solved outcomes.
    pub median_determined: Option<f64>,
    /// Distribution of the determined fraction over solved outcomes.
    pub determined_fraction: Histogram,
}

impl SweepSummary {
    /// Builds the summary for `outcomes`.
    pub fn from_outcomes(outcomes: &[ConfigOutcome]) -> Self {
        let mut status_counts = BTreeMap::new();
        for status in [
            Status::Solved,
            Status::Conflicted,
            Status::Illegal,
            Status::Skipped,
        ] {
            status_counts.insert(status.label().to_string(), 0);
        }
        for outcome in outcomes {
            *status_counts
                .entry(outcome.status.label().to_string())
                .or_insert(0) += 1;
        }

        let solved: Vec<&ConfigOutcome> = outcomes
            .iter()
            .filter(|o| o.status == Status::Solved)
            .collect();
        let mut determined: Vec<f64> = solved.iter().map(|o| o.determined() as f64).collect();
        determined.sort_by(f64::total_cmp);
        let fractions: Vec<f64> = solved
            .iter()
            .filter_map(|o| o.coverage.as_ref().map(|c| c.determined_fraction()))
            .collect();

        Self {
            total: outcomes.len(),
            status_counts,
            passing: outcomes.iter().filter(|o| o.filters.passes()).count(),
            best_determined: solved.iter().map(|o| o.determined()).max(),
            median_determined: percentile(&determined, 0.5),
            determined_fraction: histogram(&fractions, 0.0, 1.0, FRACTION_BINS),
        }
    }

    /// Count for one status.
    pub fn count(&self, status: Status) -> usize {
        self.status_counts
            .get(status.label())
            .copied()
            .unwrap_or(0)
    }
}

fn histogram(values: &[f64], start: f64, end: f64, bins: usize) -> Histogram {
    let step = (end - start) / bins as f64;
    let edges = (0..=bins).map(|idx| start + idx as f64 * step).collect();
    let mut counts = vec![0u64; bins];
    for value in values {
        let bin = ((value - start) / step).floor();
        let bin = if bin < 0.0 { 0 } else { (bin as usize).min(bins - 1) };
        counts[bin] += 1;
    }
    Histogram { edges, counts }
}

fn percentile(sorted: &[f64], quantile: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = quantile * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        Some(sorted[lower])
    } else {
        let weight = position - lower as f64;
        Some(sorted[lower] * (1.0 - weight) + sorted[upper] * weight)
    }
}
