#![deny(missing_docs)]
#![doc = "Configuration sweeps for the key-wheel engine: plans, enumeration, parallel dispatch, filtering and reports."]

/// Parallel evaluation of enumerated jobs.
pub mod dispatch;
/// Expansion of plan axes into jobs.
pub mod enumerate;
/// Outcome filters.
pub mod filters;
/// Tracing subscriber setup.
pub mod logging;
/// Sweep plans and YAML loading.
pub mod plan;
/// Outcomes and sweep reports.
pub mod report;
/// Aggregate statistics over outcomes.
pub mod stat;
/// Per-configuration lifecycle.
pub mod state;

pub use dispatch::{run_sweep, run_sweep_from_path, Evaluator};
pub use enumerate::{
    build_constraint_sets, enumerate, ConfigPoint, Enumeration, NamedConstraintSet, SweepJob,
    GRID_LIMIT,
};
pub use filters::{FilterDecision, OutcomeFilter};
pub use plan::{
    load_plan, ConstraintSetSpec, FamilyAxis, PeriodAxis, PhaseAxis, Scenario, Scheduler,
    SweepPlan, SweepStrategy,
};
pub use report::{load_report, ConfigOutcome, Status, SweepReport, REPORT_SCHEMA};
pub use stat::{Histogram, SweepSummary};
pub use state::{Lifecycle, Stage, TransitionError};
