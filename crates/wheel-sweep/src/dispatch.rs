use std::path::Path;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info, warn};
use wheel_core::{Ciphertext, ErrorInfo, WheelError};
use wheel_solve::{coverage, derive, solve, LegalityPolicy, Region, SolveContext, SolveError};

use crate::enumerate::{enumerate, NamedConstraintSet, SweepJob};
use crate::filters::OutcomeFilter;
use crate::plan::{load_plan, SweepPlan};
use crate::report::{ConfigOutcome, Status, SweepReport};
use crate::state::{Lifecycle, Stage};

/// Shared, read-only inputs for evaluating jobs.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    /// Ciphertext under attack.
    pub ciphertext: &'a Ciphertext,
    /// Constraint sets referenced by job indices.
    pub constraint_sets: &'a [NamedConstraintSet],
    /// Spans reported on in coverage.
    pub regions: &'a [Region],
    /// Zero-key rule.
    pub policy: LegalityPolicy,
    /// Filter applied to each outcome.
    pub filter: &'a OutcomeFilter,
}

impl Evaluator<'_> {
    fn constraint_set(&self, job: &SweepJob) -> Result<&NamedConstraintSet, WheelError> {
        self.constraint_sets.get(job.constraint_set).ok_or_else(|| {
            WheelError::Config(
                ErrorInfo::new("unknown-constraint-set", "job references a missing constraint set")
                    .with_context("index", job.index)
                    .with_context("constraint_set", job.constraint_set),
            )
        })
    }

    /// Solves, derives and measures one job. Conflicts and illegal anchors
    /// become outcomes; configuration defects abort.
    pub fn evaluate(&self, job: &SweepJob) -> Result<ConfigOutcome, WheelError> {
        let set = self.constraint_set(job)?;
        let mut life = Lifecycle::new();
        life.advance(Stage::Solving)?;
        let ctx = SolveContext::new(self.ciphertext, &job.point.classing, &job.point.schedule)
            .with_policy(self.policy);
        let mut outcome = match solve(&ctx, &set.constraints)? {
            Ok(wheels) => {
                life.advance(Stage::Solved)?;
                let derived = derive(self.ciphertext, &job.point.classing, &wheels);
                let report = coverage(&job.point.classing, &wheels, &derived, self.regions);
                life.advance(Stage::Derived)?;
                life.advance(Stage::Reported)?;
                let mut outcome = self.outcome(job, set, Status::Solved, life);
                outcome.wheels = Some(wheels);
                outcome.derived = Some(derived);
                outcome.coverage = Some(report);
                outcome
            }
            Err(failure) => {
                let (stage, status) = match failure {
                    SolveError::Conflict(_) => (Stage::Conflicted, Status::Conflicted),
                    SolveError::Illegal(_) => (Stage::Illegal, Status::Illegal),
                };
                life.advance(stage)?;
                life.advance(Stage::Reported)?;
                let mut outcome = self.outcome(job, set, status, life);
                outcome.failure = Some(failure);
                outcome
            }
        };
        outcome.filters = self.filter.evaluate(&outcome);
        debug!(
            index = job.index,
            status = outcome.status.label(),
            determined = outcome.determined(),
            "point evaluated"
        );
        Ok(outcome)
    }

    /// Records a job that was not evaluated.
    pub fn skip(&self, job: &SweepJob) -> Result<ConfigOutcome, WheelError> {
        let set = self.constraint_set(job)?;
        let mut life = Lifecycle::new();
        life.advance(Stage::Skipped)?;
        life.advance(Stage::Reported)?;
        let mut outcome = self.outcome(job, set, Status::Skipped, life);
        outcome.filters = self.filter.evaluate(&outcome);
        Ok(outcome)
    }

    fn outcome(
        &self,
        job: &SweepJob,
        set: &NamedConstraintSet,
        status: Status,
        life: Lifecycle,
    ) -> ConfigOutcome {
        ConfigOutcome {
            index: job.index,
            point: job.point.clone(),
            constraint_set: set.label.clone(),
            status,
            stages: life.into_history(),
            wheels: None,
            derived: None,
            coverage: None,
            failure: None,
            filters: Default::default(),
        }
    }
}

/// Enumerates `plan` and evaluates every job on a bounded rayon pool.
pub fn run_sweep(plan: &SweepPlan) -> Result<SweepReport, WheelError> {
    let plan_hash = plan.plan_hash()?;
    let enumeration = enumerate(plan)?;
    let parallelism = plan.scheduler.parallelism.max(1);
    info!(
        plan = %plan_hash,
        jobs = enumeration.jobs.len(),
        parallelism,
        "sweep start"
    );
    if enumeration.truncated {
        warn!(
            kept = enumeration.jobs.len(),
            "enumeration truncated by max_configurations"
        );
    }

    let regions = plan.scenario.report_regions();
    let evaluator = Evaluator {
        ciphertext: &plan.scenario.ciphertext,
        constraint_sets: &enumeration.constraint_sets,
        regions: &regions,
        policy: plan.policy,
        filter: &plan.filters,
    };
    let deadline = plan
        .scheduler
        .time_budget_ms
        .map(|ms| Instant::now() + Duration::from_millis(ms));

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(parallelism)
        .build()
        .map_err(|err| WheelError::Config(ErrorInfo::new("thread_pool", err.to_string())))?;
    let results: Result<Vec<ConfigOutcome>, WheelError> = pool.install(|| {
        enumeration
            .jobs
            .par_iter()
            .map(|job| match deadline {
                Some(deadline) if Instant::now() >= deadline => evaluator.skip(job),
                _ => evaluator.evaluate(job),
            })
            .collect()
    });
    let mut outcomes = results?;
    outcomes.sort_by_key(|outcome| outcome.index);

    let report = SweepReport::new(
        plan_hash,
        &plan.scenario.ciphertext,
        outcomes,
        enumeration.truncated,
    );
    let skipped = report.summary.count(Status::Skipped);
    if skipped > 0 {
        warn!(skipped, "time budget exhausted before every point ran");
    }
    info!(
        total = report.summary.total,
        solved = report.summary.count(Status::Solved),
        passing = report.summary.passing,
        "sweep complete"
    );
    Ok(report)
}

/// Loads a plan from YAML and runs it.
pub fn run_sweep_from_path(path: &Path) -> Result<SweepReport, WheelError> {
    let plan = load_plan(path)?;
    run_sweep(&plan)
}
