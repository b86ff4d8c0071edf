use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};
use wheel_core::{Ciphertext, ErrorInfo, Symbol, WheelError};

use crate::classing::{validate_classing, ClassAssignment};
use crate::constraint::{Constraint, ConstraintSet};
use crate::family::{Family, LegalityPolicy};
use crate::wheel::{KeySchedule, Wheels};

/// Two constraints demanded different residues for the same `(class, slot)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error(
    "class {class} slot {slot}: position {position} requires {required} \
     but position {earlier_position} fixed {existing}"
)]
pub struct ConflictError {
    /// Position whose constraint could not be applied.
    pub position: usize,
    /// Position whose constraint fixed the slot first.
    pub earlier_position: usize,
    /// Class of both positions.
    pub class: usize,
    /// Slot shared by both positions.
    pub slot: usize,
    /// Residue already stored.
    pub existing: Symbol,
    /// Residue the rejected constraint implies.
    pub required: Symbol,
}

/// An anchor implied a zero key on a wheel whose family forbids it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("anchor `{label}` implies key A at position {position} (class {class}, slot {slot}, {family})")]
pub struct LegalityError {
    /// Offending position.
    pub position: usize,
    /// Anchor label.
    pub label: String,
    /// Class of the position.
    pub class: usize,
    /// Slot of the position.
    pub slot: usize,
    /// Family of the class wheel.
    pub family: Family,
}

/// Why a single solve failed. Recoverable at the sweep level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum SolveError {
    /// Inconsistent residues.
    #[error("conflict: {0}")]
    Conflict(ConflictError),
    /// Zero-key anchor.
    #[error("illegal: {0}")]
    Illegal(LegalityError),
}

/// Everything the solver needs apart from the constraints.
#[derive(Debug)]
pub struct SolveContext<'a, C: ClassAssignment + ?Sized> {
    /// Ciphertext under attack.
    pub ciphertext: &'a Ciphertext,
    /// Position-to-class assignment.
    pub classing: &'a C,
    /// One wheel spec per class.
    pub schedule: &'a KeySchedule,
    /// Zero-key rule in force.
    pub policy: LegalityPolicy,
}

impl<C: ClassAssignment + ?Sized> Clone for SolveContext<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: ClassAssignment + ?Sized> Copy for SolveContext<'_, C> {}

impl<'a, C: ClassAssignment + ?Sized> SolveContext<'a, C> {
    /// Bundles solver inputs with the default legality policy.
    pub fn new(ciphertext: &'a Ciphertext, classing: &'a C, schedule: &'a KeySchedule) -> Self {
        Self {
            ciphertext,
            classing,
            schedule,
            policy: LegalityPolicy::default(),
        }
    }

    /// Overrides the legality policy.
    pub fn with_policy(mut self, policy: LegalityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Checks classing and schedule against the ciphertext length.
    pub fn validate(&self) -> Result<(), WheelError> {
        validate_classing(self.classing, self.ciphertext.len())?;
        self.schedule.validate(self.classing)
    }
}

/// Folds `constraints` into a fresh set of wheels.
///
/// The outer `Result` carries configuration defects, which abort the caller.
/// The inner `Result` carries conflicts and legality violations, which only
/// fail this configuration. Constraint order never changes the outcome:
/// legality is checked for every constraint before any residue is stored,
/// and residues are then folded in canonical order.
pub fn solve<C: ClassAssignment + ?Sized>(
    ctx: &SolveContext<'_, C>,
    constraints: &ConstraintSet,
) -> Result<Result<Wheels, SolveError>, WheelError> {
    ctx.validate()?;
    let ordered = constraints.canonical();
    let n = ctx.ciphertext.len();
    let mut located = Vec::with_capacity(ordered.len());
    for constraint in &ordered {
        if constraint.position >= n {
            return Err(WheelError::Config(
                ErrorInfo::new("constraint-out-of-range", "constraint lies past the ciphertext")
                    .with_context("position", constraint.position)
                    .with_context("length", n),
            ));
        }
        located.push(locate(ctx, constraint));
    }

    for step in &located {
        if let Some(err) = legality(ctx.policy, step) {
            debug!(position = err.position, class = err.class, "anchor implies zero key");
            return Ok(Err(SolveError::Illegal(err)));
        }
    }

    let mut wheels = Wheels::empty(ctx.schedule);
    for step in &located {
        trace!(
            position = step.constraint.position,
            class = step.class,
            slot = step.slot,
            residue = %step.residue,
            "fold constraint"
        );
        let wheel = wheels.wheel_mut(step.class);
        if let Err((existing, earlier_position)) =
            wheel.assign(step.slot, step.residue, step.constraint.position)
        {
            let err = ConflictError {
                position: step.constraint.position,
                earlier_position,
                class: step.class,
                slot: step.slot,
                existing,
                required: step.residue,
            };
            debug!(%err, "constraint conflict");
            return Ok(Err(SolveError::Conflict(err)));
        }
    }
    debug!(
        constraints = located.len(),
        resolved = wheels.resolved_slots(),
        "solve complete"
    );
    Ok(Ok(wheels))
}

struct Located<'c> {
    constraint: &'c Constraint,
    class: usize,
    slot: usize,
    family: Family,
    residue: Symbol,
}

fn locate<'c, C: ClassAssignment + ?Sized>(
    ctx: &SolveContext<'_, C>,
    constraint: &'c Constraint,
) -> Located<'c> {
    let class = ctx.classing.class_of(constraint.position);
    // validate() guarantees one spec per class and an in-range position
    let spec = ctx.schedule.specs()[class];
    let ciphertext = ctx.ciphertext.symbols()[constraint.position];
    Located {
        constraint,
        class,
        slot: spec.slot_of(constraint.position),
        family: spec.family,
        residue: spec.family.solve_key(constraint.plaintext, ciphertext),
    }
}

fn legality(policy: LegalityPolicy, step: &Located<'_>) -> Option<LegalityError> {
    let label = step.constraint.origin.label()?;
    if step.residue.is_zero() && policy.forbids_zero_key(step.family) {
        Some(LegalityError {
            position: step.constraint.position,
            label: label.to_string(),
            class: step.class,
            slot: step.slot,
            family: step.family,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classing::Classing;
    use crate::constraint::Origin;
    use crate::wheel::WheelSpec;

    fn sym(letter: char) -> Symbol {
        Symbol::from_letter(letter).unwrap()
    }

    #[test]
    fn manual_constraints_skip_legality() {
        let ct = Ciphertext::parse("QQQQ").unwrap();
        let classing = Classing::Modular { k: 1 };
        let schedule = KeySchedule::uniform(1, WheelSpec::new(Family::Additive, 4));
        let ctx = SolveContext::new(&ct, &classing, &schedule);
        let set = ConstraintSet::new(vec![Constraint::new(0, sym('Q'), Origin::Manual)]);
        let wheels = solve(&ctx, &set).unwrap().unwrap();
        assert_eq!(wheels.wheel(0).unwrap().residue(0), Some(Symbol::ZERO));

        let anchored = ConstraintSet::new(vec![Constraint::new(
            0,
            sym('Q'),
            Origin::Anchor("Q".into()),
        )]);
        assert!(matches!(
            solve(&ctx, &anchored).unwrap(),
            Err(SolveError::Illegal(_))
        ));
        let relaxed = ctx.with_policy(LegalityPolicy::Off);
        assert!(solve(&relaxed, &anchored).unwrap().is_ok());
    }

    #[test]
    fn out_of_range_constraint_is_a_configuration_error() {
        let ct = Ciphertext::parse("ABC").unwrap();
        let classing = Classing::Modular { k: 1 };
        let schedule = KeySchedule::uniform(1, WheelSpec::new(Family::Beaufort, 2));
        let ctx = SolveContext::new(&ct, &classing, &schedule);
        let set = ConstraintSet::new(vec![Constraint::new(3, sym('A'), Origin::Manual)]);
        let err = solve(&ctx, &set).unwrap_err();
        assert_eq!(err.info().code, "constraint-out-of-range");
    }
}
