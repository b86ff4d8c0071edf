use std::fs;
use std::path::Path;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use wheel_core::{Ciphertext, ErrorInfo, WheelError};
use wheel_solve::{stable_hash_string, Anchor, Classing, Family, LegalityPolicy, Region, Tail};

use crate::filters::OutcomeFilter;

fn serde_error(code: &str, err: impl ToString) -> WheelError {
    WheelError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Serializes a value into YAML.
pub fn to_yaml_string<T: Serialize>(value: &T) -> Result<String, WheelError> {
    serde_yaml::to_string(value).map_err(|err| serde_error("yaml_serialize", err))
}

/// Deserializes a YAML payload into the requested type.
pub fn from_yaml_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, WheelError> {
    serde_yaml::from_slice(data).map_err(|err| serde_error("yaml_deserialize", err))
}

/// The fixed inputs every configuration is evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Ciphertext under attack.
    pub ciphertext: Ciphertext,
    /// Designated anchors.
    #[serde(default)]
    pub anchors: Vec<Anchor>,
    /// Known trailing plaintext.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tail: Option<Tail>,
    /// Extra spans reported on in coverage. Anchors are always reported.
    #[serde(default)]
    pub regions: Vec<Region>,
}

impl Scenario {
    /// Anchor spans followed by the caller's regions.
    pub fn report_regions(&self) -> Vec<Region> {
        self.anchors
            .iter()
            .map(|anchor| Region::new(anchor.label.clone(), anchor.start, anchor.end))
            .chain(self.regions.iter().cloned())
            .collect()
    }
}

/// Per-class family choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FamilyAxis {
    /// Every class shares one family per point.
    Uniform {
        /// Candidate families.
        families: Vec<Family>,
    },
    /// Cartesian product of `families` over the classes.
    PerClass {
        /// Candidate families for each class.
        families: Vec<Family>,
    },
    /// Fixed per-class assignments; each entry must have one family per class.
    Explicit {
        /// Per-class family vectors.
        assignments: Vec<Vec<Family>>,
    },
}

impl Default for FamilyAxis {
    fn default() -> Self {
        FamilyAxis::Uniform {
            families: vec![Family::Additive],
        }
    }
}

/// Per-class period choices. Ranges are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PeriodAxis {
    /// Every class shares one period per point.
    Uniform {
        /// Smallest period.
        min: usize,
        /// Largest period.
        max: usize,
    },
    /// Cartesian product of `min..=max` over the classes.
    PerClass {
        /// Smallest period.
        min: usize,
        /// Largest period.
        max: usize,
    },
    /// Fixed per-class periods; each entry must have one period per class.
    Explicit {
        /// Per-class period vectors.
        assignments: Vec<Vec<usize>>,
    },
}

/// Per-class phase choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseAxis {
    /// Phase zero on every wheel.
    #[default]
    Zero,
    /// One shared phase, below the shortest period of the point.
    All,
    /// Cartesian product of `0..L_c` over the classes.
    PerClass,
}

/// Which constraints a point is solved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstraintSetSpec {
    /// Anchors only.
    AnchorsOnly,
    /// Anchors plus the tail.
    AnchorsAndTail,
    /// One set per anchor with that anchor dropped; the tail is kept when
    /// the scenario has one.
    LeaveOneOut,
}

/// How points are drawn from the parameter space.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SweepStrategy {
    /// Exhaustive enumeration in deterministic order.
    #[default]
    Grid,
    /// Uniform sampling with a seeded generator.
    Random {
        /// Number of points to draw.
        samples: usize,
        /// Master seed.
        seed: u64,
    },
}

/// Execution settings for a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scheduler {
    /// Worker threads in the sweep pool.
    #[serde(default = "Scheduler::default_parallelism")]
    pub parallelism: usize,
    /// Upper bound on enumerated points; extra points are dropped and the
    /// report is flagged as truncated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_configurations: Option<usize>,
    /// Wall-clock budget; points reached after it are recorded as skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_budget_ms: Option<u64>,
}

impl Scheduler {
    const fn default_parallelism() -> usize {
        1
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            parallelism: Self::default_parallelism(),
            max_configurations: None,
            time_budget_ms: None,
        }
    }
}

/// A complete sweep description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepPlan {
    /// Ciphertext, anchors, tail and regions.
    pub scenario: Scenario,
    /// Classing variants to try.
    pub classings: Vec<Classing>,
    /// Family axis.
    #[serde(default)]
    pub families: FamilyAxis,
    /// Period axis.
    pub periods: PeriodAxis,
    /// Phase axis.
    #[serde(default)]
    pub phases: PhaseAxis,
    /// Constraint set variants.
    #[serde(default = "SweepPlan::default_constraint_sets")]
    pub constraint_sets: Vec<ConstraintSetSpec>,
    /// Point selection strategy.
    #[serde(default)]
    pub strategy: SweepStrategy,
    /// Zero-key rule applied to anchors.
    #[serde(default)]
    pub policy: LegalityPolicy,
    /// Execution settings.
    #[serde(default)]
    pub scheduler: Scheduler,
    /// Filters used when ranking outcomes.
    #[serde(default)]
    pub filters: OutcomeFilter,
}

impl SweepPlan {
    fn default_constraint_sets() -> Vec<ConstraintSetSpec> {
        vec![ConstraintSetSpec::AnchorsOnly]
    }

    /// Creates a grid plan with default axes apart from the required ones.
    pub fn new(scenario: Scenario, classings: Vec<Classing>, periods: PeriodAxis) -> Self {
        Self {
            scenario,
            classings,
            families: FamilyAxis::default(),
            periods,
            phases: PhaseAxis::default(),
            constraint_sets: Self::default_constraint_sets(),
            strategy: SweepStrategy::default(),
            policy: LegalityPolicy::default(),
            scheduler: Scheduler::default(),
            filters: OutcomeFilter::default(),
        }
    }

    /// Deterministic hash of the plan contents.
    pub fn plan_hash(&self) -> Result<String, WheelError> {
        stable_hash_string(self)
    }

    /// YAML rendering of the plan.
    pub fn to_yaml_string(&self) -> Result<String, WheelError> {
        to_yaml_string(self)
    }

    /// Writes the plan as YAML.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), WheelError> {
        let yaml = self.to_yaml_string()?;
        fs::write(path, yaml).map_err(|err| serde_error("plan_write", err))
    }
}

/// Loads a plan from a YAML file.
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<SweepPlan, WheelError> {
    let bytes = fs::read(path.as_ref()).map_err(|err| serde_error("plan_read", err))?;
    from_yaml_slice(&bytes)
}
