use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use wheel_core::{Ciphertext, ErrorInfo, RunProvenance, SchemaVersion, WheelError};
use wheel_solve::{
    ciphertext_hash, from_json_slice, to_canonical_json_bytes, CoverageReport, DerivedPlaintext,
    SolveError, Wheels,
};

use crate::enumerate::ConfigPoint;
use crate::filters::FilterDecision;
use crate::state::Stage;
use crate::stat::SweepSummary;

/// Schema of serialized sweep reports.
pub const REPORT_SCHEMA: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// Final status of one configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    /// Solved; wheels, plaintext and coverage are attached.
    Solved,
    /// Constraints conflicted.
    Conflicted,
    /// An anchor violated the zero-key rule.
    Illegal,
    /// Not evaluated within the time budget.
    Skipped,
}

impl Status {
    /// Stable lowercase name.
    pub fn label(self) -> &'static str {
        match self {
            Status::Solved => "solved",
            Status::Conflicted => "conflicted",
            Status::Illegal => "illegal",
            Status::Skipped => "skipped",
        }
    }
}

/// Result of evaluating one point against one constraint set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigOutcome {
    /// Enumeration index.
    pub index: usize,
    /// Configuration evaluated.
    pub point: ConfigPoint,
    /// Label of the constraint set.
    pub constraint_set: String,
    /// Final status.
    pub status: Status,
    /// Stages visited.
    pub stages: Vec<Stage>,
    /// Solved wheels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wheels: Option<Wheels>,
    /// Derived plaintext.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived: Option<DerivedPlaintext>,
    /// Coverage of the derived plaintext.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<CoverageReport>,
    /// Why the solve failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<SolveError>,
    /// Filter decisions.
    #[serde(default)]
    pub filters: FilterDecision,
}

impl ConfigOutcome {
    /// Determined positions; zero unless solved.
    pub fn determined(&self) -> usize {
        self.coverage.as_ref().map_or(0, |c| c.determined)
    }

    /// Additional constraints needed for closure, when solved.
    pub fn min_additional(&self) -> Option<usize> {
        self.coverage.as_ref().map(|c| c.min_additional_constraints)
    }
}

/// Canonical report for a whole sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Hash of the plan that produced the report.
    pub plan_hash: String,
    /// One outcome per enumerated point, in index order.
    pub outcomes: Vec<ConfigOutcome>,
    /// Aggregate statistics.
    pub summary: SweepSummary,
    /// True when `max_configurations` dropped points.
    pub truncated: bool,
    /// Provenance metadata.
    pub provenance: RunProvenance,
}

impl SweepReport {
    /// Assembles a report and stamps provenance.
    pub fn new(
        plan_hash: String,
        ciphertext: &Ciphertext,
        outcomes: Vec<ConfigOutcome>,
        truncated: bool,
    ) -> Self {
        let summary = SweepSummary::from_outcomes(&outcomes);
        let provenance = provenance(&plan_hash, ciphertext);
        Self {
            plan_hash,
            outcomes,
            summary,
            truncated,
            provenance,
        }
    }

    /// Outcomes passing the filters, best first: most determined positions,
    /// then fewest additional constraints, then enumeration order.
    pub fn ranked(&self) -> Vec<&ConfigOutcome> {
        let mut ranked: Vec<&ConfigOutcome> = self
            .outcomes
            .iter()
            .filter(|outcome| outcome.filters.passes())
            .collect();
        ranked.sort_by(|a, b| {
            b.determined()
                .cmp(&a.determined())
                .then_with(|| {
                    let a = a.min_additional().unwrap_or(usize::MAX);
                    let b = b.min_additional().unwrap_or(usize::MAX);
                    a.cmp(&b)
                })
                .then(a.index.cmp(&b.index))
        });
        ranked
    }

    /// Outcomes with the given status.
    pub fn with_status(&self, status: Status) -> impl Iterator<Item = &ConfigOutcome> {
        self.outcomes
            .iter()
            .filter(move |outcome| outcome.status == status)
    }

    /// Canonical JSON encoding.
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, WheelError> {
        to_canonical_json_bytes(self)
    }

    /// Writes the canonical JSON encoding to `path`.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), WheelError> {
        let bytes = self.to_canonical_json_bytes()?;
        fs::write(path, bytes)
            .map_err(|err| WheelError::Serde(ErrorInfo::new("report_write", err.to_string())))
    }
}

/// Loads a report previously written with [`SweepReport::write_json`].
pub fn load_report<P: AsRef<Path>>(path: P) -> Result<SweepReport, WheelError> {
    let bytes = fs::read(path)
        .map_err(|err| WheelError::Serde(ErrorInfo::new("report_read", err.to_string())))?;
    from_json_slice(&bytes)
}

fn provenance(plan_hash: &str, ciphertext: &Ciphertext) -> RunProvenance {
    let mut versions = BTreeMap::new();
    versions.insert(
        "wheel-sweep".to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    );
    RunProvenance {
        schema_version: REPORT_SCHEMA,
        input_hash: plan_hash.to_string(),
        ciphertext_hash: ciphertext_hash(ciphertext),
        created_at: Utc::now().to_rfc3339(),
        tool_versions: versions,
    }
}
