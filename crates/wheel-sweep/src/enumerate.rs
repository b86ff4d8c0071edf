use std::ops::ControlFlow;

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;
use wheel_core::{ErrorInfo, WheelError};
use wheel_solve::{
    validate_classing, ClassAssignment, Classing, ConstraintSet, Family, KeySchedule, WheelSpec,
};

use crate::plan::{
    ConstraintSetSpec, FamilyAxis, PeriodAxis, PhaseAxis, Scenario, SweepPlan, SweepStrategy,
};

/// Grids larger than this must set `scheduler.max_configurations`.
pub const GRID_LIMIT: usize = 1_000_000;

fn axis_error(code: &str, message: &str, axis: &str) -> WheelError {
    WheelError::Config(ErrorInfo::new(code, message).with_context("axis", axis))
}

/// One classing together with a wheel spec per class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigPoint {
    /// Position-to-class assignment.
    pub classing: Classing,
    /// Per-class wheel specs.
    pub schedule: KeySchedule,
}

impl ConfigPoint {
    /// Compact label such as `mod-2 additive/5@0 beaufort/7@3`.
    pub fn label(&self) -> String {
        let wheels: Vec<String> = self
            .schedule
            .specs()
            .iter()
            .map(|spec| format!("{}/{}@{}", spec.family, spec.period, spec.phase))
            .collect();
        format!("{} {}", self.classing.label(), wheels.join(" "))
    }
}

/// A constraint set together with the label used in outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedConstraintSet {
    /// `anchors`, `anchors+tail` or `without-<anchor>`.
    pub label: String,
    /// The constraints.
    pub constraints: ConstraintSet,
}

/// A point paired with the constraint set it is solved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepJob {
    /// Enumeration index; outcomes are reported in this order.
    pub index: usize,
    /// Configuration.
    pub point: ConfigPoint,
    /// Index into [`Enumeration::constraint_sets`].
    pub constraint_set: usize,
}

/// Everything a sweep will evaluate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enumeration {
    /// Distinct constraint sets referenced by the jobs.
    pub constraint_sets: Vec<NamedConstraintSet>,
    /// Jobs in enumeration order.
    pub jobs: Vec<SweepJob>,
    /// True when `max_configurations` cut the enumeration short.
    pub truncated: bool,
}

/// Expands the requested constraint set variants for `scenario`.
pub fn build_constraint_sets(
    scenario: &Scenario,
    specs: &[ConstraintSetSpec],
) -> Result<Vec<NamedConstraintSet>, WheelError> {
    if specs.is_empty() {
        return Err(axis_error(
            "empty-axis",
            "at least one constraint set is required",
            "constraint_sets",
        ));
    }
    let n = scenario.ciphertext.len();
    let mut sets = Vec::new();
    for spec in specs {
        match spec {
            ConstraintSetSpec::AnchorsOnly => sets.push(NamedConstraintSet {
                label: "anchors".to_string(),
                constraints: ConstraintSet::from_anchors(&scenario.anchors, n)?,
            }),
            ConstraintSetSpec::AnchorsAndTail => {
                let tail = scenario.tail.as_ref().ok_or_else(|| {
                    WheelError::Config(
                        ErrorInfo::new("missing-tail", "anchors-and-tail needs a tail record")
                            .with_hint("add scenario.tail or drop the anchors-and-tail set"),
                    )
                })?;
                sets.push(NamedConstraintSet {
                    label: "anchors+tail".to_string(),
                    constraints: ConstraintSet::from_anchors(&scenario.anchors, n)?
                        .with_tail(tail, n)?,
                });
            }
            ConstraintSetSpec::LeaveOneOut => {
                for (skip, anchor) in scenario.anchors.iter().enumerate() {
                    let kept: Vec<_> = scenario
                        .anchors
                        .iter()
                        .enumerate()
                        .filter(|(idx, _)| *idx != skip)
                        .map(|(_, anchor)| anchor.clone())
                        .collect();
                    let mut constraints = ConstraintSet::from_anchors(&kept, n)?;
                    if let Some(tail) = &scenario.tail {
                        constraints = constraints.with_tail(tail, n)?;
                    }
                    sets.push(NamedConstraintSet {
                        label: format!("without-{}", anchor.label),
                        constraints,
                    });
                }
            }
        }
    }
    if sets.is_empty() {
        return Err(WheelError::Config(
            ErrorInfo::new("empty-axis", "constraint set variants expanded to nothing")
                .with_context("axis", "constraint_sets")
                .with_hint("leave-one-out needs at least one anchor"),
        ));
    }
    Ok(sets)
}

/// Expands `plan` into jobs, honouring the strategy and `max_configurations`.
pub fn enumerate(plan: &SweepPlan) -> Result<Enumeration, WheelError> {
    let n = plan.scenario.ciphertext.len();
    if plan.classings.is_empty() {
        return Err(axis_error(
            "empty-axis",
            "at least one classing is required",
            "classings",
        ));
    }
    check_family_axis(&plan.families)?;
    check_period_axis(&plan.periods)?;
    for classing in &plan.classings {
        validate_classing(classing, n)?;
        check_explicit_arity(plan, classing.num_classes())?;
    }
    let constraint_sets = build_constraint_sets(&plan.scenario, &plan.constraint_sets)?;

    let limit = plan.scheduler.max_configurations;
    let (jobs, truncated) = match &plan.strategy {
        SweepStrategy::Grid => grid(plan, constraint_sets.len(), limit)?,
        SweepStrategy::Random { samples, seed } => {
            random(plan, constraint_sets.len(), *samples, *seed, limit)?
        }
    };
    debug!(jobs = jobs.len(), truncated, "enumeration complete");
    Ok(Enumeration {
        constraint_sets,
        jobs,
        truncated,
    })
}

fn check_family_axis(axis: &FamilyAxis) -> Result<(), WheelError> {
    let empty = match axis {
        FamilyAxis::Uniform { families } | FamilyAxis::PerClass { families } => families.is_empty(),
        FamilyAxis::Explicit { assignments } => assignments.is_empty(),
    };
    if empty {
        return Err(axis_error("empty-axis", "family axis has no values", "families"));
    }
    Ok(())
}

fn check_period_axis(axis: &PeriodAxis) -> Result<(), WheelError> {
    match *axis {
        PeriodAxis::Uniform { min, max } | PeriodAxis::PerClass { min, max } => {
            if min == 0 {
                return Err(axis_error("zero-period", "periods must be positive", "periods"));
            }
            if min > max {
                return Err(WheelError::Config(
                    ErrorInfo::new("period-range-inverted", "period min exceeds max")
                        .with_context("min", min)
                        .with_context("max", max),
                ));
            }
        }
        PeriodAxis::Explicit { ref assignments } => {
            if assignments.is_empty() {
                return Err(axis_error("empty-axis", "period axis has no values", "periods"));
            }
            if let Some(row) = assignments.iter().position(|a| a.contains(&0)) {
                return Err(WheelError::Config(
                    ErrorInfo::new("zero-period", "periods must be positive")
                        .with_context("axis", "periods")
                        .with_context("assignment", row),
                ));
            }
        }
    }
    Ok(())
}

fn check_explicit_arity(plan: &SweepPlan, k: usize) -> Result<(), WheelError> {
    if let FamilyAxis::Explicit { assignments } = &plan.families {
        if let Some(bad) = assignments.iter().find(|a| a.len() != k) {
            return Err(arity_error("families", k, bad.len()));
        }
    }
    if let PeriodAxis::Explicit { assignments } = &plan.periods {
        if let Some(bad) = assignments.iter().find(|a| a.len() != k) {
            return Err(arity_error("periods", k, bad.len()));
        }
    }
    Ok(())
}

fn arity_error(axis: &str, expected: usize, found: usize) -> WheelError {
    WheelError::Config(
        ErrorInfo::new("axis-arity-mismatch", "explicit assignment must cover every class")
            .with_context("axis", axis)
            .with_context("num_classes", expected)
            .with_context("values", found),
    )
}

fn family_choices(
    axis: &FamilyAxis,
    k: usize,
) -> Result<Box<dyn Iterator<Item = Vec<Family>> + '_>, WheelError> {
    Ok(match axis {
        FamilyAxis::Uniform { families } => Box::new(families.iter().map(move |&f| vec![f; k])),
        FamilyAxis::PerClass { families } => Box::new(
            Odometer::new(vec![families.len(); k])
                .map(move |digits| digits.into_iter().map(|d| families[d]).collect()),
        ),
        FamilyAxis::Explicit { assignments } => {
            for assignment in assignments {
                if assignment.len() != k {
                    return Err(arity_error("families", k, assignment.len()));
                }
            }
            Box::new(assignments.iter().cloned())
        }
    })
}

fn period_choices(
    axis: &PeriodAxis,
    k: usize,
) -> Result<Box<dyn Iterator<Item = Vec<usize>> + '_>, WheelError> {
    Ok(match *axis {
        PeriodAxis::Uniform { min, max } => Box::new((min..=max).map(move |period| vec![period; k])),
        PeriodAxis::PerClass { min, max } => Box::new(
            Odometer::new(vec![max - min + 1; k])
                .map(move |digits| digits.into_iter().map(|d| min + d).collect()),
        ),
        PeriodAxis::Explicit { ref assignments } => {
            for assignment in assignments {
                if assignment.len() != k {
                    return Err(arity_error("periods", k, assignment.len()));
                }
            }
            Box::new(assignments.iter().cloned())
        }
    })
}

fn phase_choices(axis: PhaseAxis, periods: &[usize]) -> Box<dyn Iterator<Item = Vec<usize>>> {
    let k = periods.len();
    match axis {
        PhaseAxis::Zero => Box::new(std::iter::once(vec![0; k])),
        PhaseAxis::All => {
            let shortest = periods.iter().copied().min().unwrap_or(0);
            Box::new((0..shortest).map(move |phase| vec![phase; k]))
        }
        PhaseAxis::PerClass => Box::new(Odometer::new(periods.to_vec())),
    }
}

fn schedule(families: &[Family], periods: &[usize], phases: &[usize]) -> KeySchedule {
    KeySchedule::new(
        families
            .iter()
            .zip(periods)
            .zip(phases)
            .map(|((&family, &period), &phase)| WheelSpec::new(family, period).with_phase(phase))
            .collect(),
    )
}

/// Visits every grid point in enumeration order until `visit` breaks.
fn walk_grid(
    plan: &SweepPlan,
    visit: &mut dyn FnMut(ConfigPoint) -> ControlFlow<()>,
) -> Result<(), WheelError> {
    for classing in &plan.classings {
        let k = classing.num_classes();
        for family in family_choices(&plan.families, k)? {
            for periods in period_choices(&plan.periods, k)? {
                for phases in phase_choices(plan.phases, &periods) {
                    let point = ConfigPoint {
                        classing: *classing,
                        schedule: schedule(&family, &periods, &phases),
                    };
                    if visit(point).is_break() {
                        return Ok(());
                    }
                }
            }
        }
    }
    Ok(())
}

fn grid(
    plan: &SweepPlan,
    sets: usize,
    limit: Option<usize>,
) -> Result<(Vec<SweepJob>, bool), WheelError> {
    let cap = match limit {
        Some(cap) => cap,
        None => {
            let mut count = 0usize;
            walk_grid(plan, &mut |_| {
                count += sets;
                if count > GRID_LIMIT {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })?;
            if count > GRID_LIMIT {
                return Err(WheelError::Config(
                    ErrorInfo::new("grid-too-large", "grid exceeds the enumeration limit")
                        .with_context("limit", GRID_LIMIT)
                        .with_hint("set scheduler.max_configurations or use the random strategy"),
                ));
            }
            count
        }
    };

    let mut jobs = Vec::new();
    let mut truncated = false;
    walk_grid(plan, &mut |point| {
        for constraint_set in 0..sets {
            if jobs.len() == cap {
                truncated = true;
                return ControlFlow::Break(());
            }
            jobs.push(SweepJob {
                index: jobs.len(),
                point: point.clone(),
                constraint_set,
            });
        }
        ControlFlow::Continue(())
    })?;
    Ok((jobs, truncated))
}

fn random(
    plan: &SweepPlan,
    sets: usize,
    samples: usize,
    seed: u64,
    limit: Option<usize>,
) -> Result<(Vec<SweepJob>, bool), WheelError> {
    let count = limit.map_or(samples, |limit| samples.min(limit));
    let mut jobs = Vec::with_capacity(count);
    for index in 0..count {
        let mut rng = StdRng::seed_from_u64(derive_seed(seed, index as u64));
        let classing = plan.classings[rng.gen_range(0..plan.classings.len())];
        let k = classing.num_classes();
        let families = sample_families(&plan.families, k, &mut rng)?;
        let periods = sample_periods(&plan.periods, k, &mut rng)?;
        let phases: Vec<usize> = match plan.phases {
            PhaseAxis::Zero => vec![0; k],
            PhaseAxis::All => {
                let shortest = periods.iter().copied().min().unwrap_or(1);
                vec![rng.gen_range(0..shortest); k]
            }
            PhaseAxis::PerClass => periods.iter().map(|&p| rng.gen_range(0..p)).collect(),
        };
        jobs.push(SweepJob {
            index,
            point: ConfigPoint {
                classing,
                schedule: schedule(&families, &periods, &phases),
            },
            constraint_set: rng.gen_range(0..sets),
        });
    }
    Ok((jobs, count < samples))
}

fn sample_families(
    axis: &FamilyAxis,
    k: usize,
    rng: &mut StdRng,
) -> Result<Vec<Family>, WheelError> {
    Ok(match axis {
        FamilyAxis::Uniform { families } => vec![families[rng.gen_range(0..families.len())]; k],
        FamilyAxis::PerClass { families } => (0..k)
            .map(|_| families[rng.gen_range(0..families.len())])
            .collect(),
        FamilyAxis::Explicit { assignments } => {
            let pick = &assignments[rng.gen_range(0..assignments.len())];
            if pick.len() != k {
                return Err(arity_error("families", k, pick.len()));
            }
            pick.clone()
        }
    })
}

fn sample_periods(axis: &PeriodAxis, k: usize, rng: &mut StdRng) -> Result<Vec<usize>, WheelError> {
    Ok(match *axis {
        PeriodAxis::Uniform { min, max } => vec![rng.gen_range(min..=max); k],
        PeriodAxis::PerClass { min, max } => (0..k).map(|_| rng.gen_range(min..=max)).collect(),
        PeriodAxis::Explicit { ref assignments } => {
            let pick = &assignments[rng.gen_range(0..assignments.len())];
            if pick.len() != k {
                return Err(arity_error("periods", k, pick.len()));
            }
            pick.clone()
        }
    })
}

fn derive_seed(seed: u64, index: u64) -> u64 {
    seed ^ index.wrapping_add(1).wrapping_mul(0x9e37_79b9_7f4a_7c15)
}

/// Mixed-radix counter over `0..radices[0] x 0..radices[1] x ...`, last digit
/// fastest.
struct Odometer {
    radices: Vec<usize>,
    next: Option<Vec<usize>>,
}

impl Odometer {
    fn new(radices: Vec<usize>) -> Self {
        let next = if radices.iter().any(|&r| r == 0) {
            None
        } else {
            Some(vec![0; radices.len()])
        };
        Self { radices, next }
    }
}

impl Iterator for Odometer {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let current = self.next.take()?;
        let mut digits = current.clone();
        for idx in (0..digits.len()).rev() {
            digits[idx] += 1;
            if digits[idx] < self.radices[idx] {
                self.next = Some(digits);
                return Some(current);
            }
            digits[idx] = 0;
        }
        Some(current)
    }
}
