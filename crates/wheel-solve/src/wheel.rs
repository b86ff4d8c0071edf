use serde::{Deserialize, Serialize};
use wheel_core::{ErrorInfo, Symbol, WheelError};

use crate::classing::ClassAssignment;
use crate::family::Family;

/// Configuration of one class's wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WheelSpec {
    /// Cipher family applied on this class.
    pub family: Family,
    /// Number of slots `L`.
    pub period: usize,
    /// Offset `φ` so that `slot = (position - φ) mod L`.
    #[serde(default)]
    pub phase: usize,
}

impl WheelSpec {
    /// Creates a spec with phase zero.
    pub fn new(family: Family, period: usize) -> Self {
        Self {
            family,
            period,
            phase: 0,
        }
    }

    /// Returns a copy with the given phase.
    pub fn with_phase(mut self, phase: usize) -> Self {
        self.phase = phase;
        self
    }

    /// Slot index for `position`.
    pub fn slot_of(&self, position: usize) -> usize {
        let period = self.period;
        (position % period + period - self.phase % period) % period
    }

    fn validate(&self, class: usize) -> Result<(), WheelError> {
        if self.period == 0 {
            return Err(WheelError::Config(
                ErrorInfo::new("zero-period", "wheel period must be positive")
                    .with_context("class", class),
            ));
        }
        if self.phase >= self.period {
            return Err(WheelError::Config(
                ErrorInfo::new("phase-out-of-range", "wheel phase must be below its period")
                    .with_context("class", class)
                    .with_context("phase", self.phase)
                    .with_context("period", self.period),
            ));
        }
        Ok(())
    }
}

/// Ordered per-class wheel specs; index `c` configures class `c`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeySchedule {
    specs: Vec<WheelSpec>,
}

impl KeySchedule {
    /// Wraps per-class specs.
    pub fn new(specs: Vec<WheelSpec>) -> Self {
        Self { specs }
    }

    /// The same spec for each of `k` classes.
    pub fn uniform(k: usize, spec: WheelSpec) -> Self {
        Self {
            specs: vec![spec; k],
        }
    }

    /// Spec for `class`.
    pub fn spec(&self, class: usize) -> Option<&WheelSpec> {
        self.specs.get(class)
    }

    /// Replaces the spec of one class.
    pub fn set(&mut self, class: usize, spec: WheelSpec) {
        if let Some(slot) = self.specs.get_mut(class) {
            *slot = spec;
        }
    }

    /// All specs in class order.
    pub fn specs(&self) -> &[WheelSpec] {
        &self.specs
    }

    /// Number of classes configured.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// True when no class is configured.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Checks the schedule against a classing: one spec per class, each with
    /// a positive period and an in-range phase.
    pub fn validate<C: ClassAssignment + ?Sized>(&self, classing: &C) -> Result<(), WheelError> {
        if self.specs.len() != classing.num_classes() {
            return Err(WheelError::Config(
                ErrorInfo::new(
                    "schedule-class-mismatch",
                    "key schedule must configure exactly one wheel per class",
                )
                .with_context("wheels", self.specs.len())
                .with_context("num_classes", classing.num_classes()),
            ));
        }
        for (class, spec) in self.specs.iter().enumerate() {
            spec.validate(class)?;
        }
        Ok(())
    }
}

/// Key residues of one class, indexed by slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Wheel {
    spec: WheelSpec,
    residues: Vec<Option<Symbol>>,
    witnesses: Vec<Option<usize>>,
}

impl Wheel {
    pub(crate) fn empty(spec: WheelSpec) -> Self {
        Self {
            spec,
            residues: vec![None; spec.period],
            witnesses: vec![None; spec.period],
        }
    }

    /// The spec this wheel was built from.
    pub fn spec(&self) -> &WheelSpec {
        &self.spec
    }

    /// Cipher family of the wheel.
    pub fn family(&self) -> Family {
        self.spec.family
    }

    /// Number of slots.
    pub fn period(&self) -> usize {
        self.spec.period
    }

    /// Phase offset.
    pub fn phase(&self) -> usize {
        self.spec.phase
    }

    /// Slot index for `position`.
    pub fn slot_of(&self, position: usize) -> usize {
        self.spec.slot_of(position)
    }

    /// Residue at `slot`, `None` while unresolved.
    pub fn residue(&self, slot: usize) -> Option<Symbol> {
        self.residues.get(slot).copied().flatten()
    }

    /// Residue governing `position`.
    pub fn residue_at(&self, position: usize) -> Option<Symbol> {
        self.residue(self.slot_of(position))
    }

    /// Position of the constraint that first fixed `slot`.
    pub fn witness(&self, slot: usize) -> Option<usize> {
        self.witnesses.get(slot).copied().flatten()
    }

    /// All slots in order.
    pub fn residues(&self) -> &[Option<Symbol>] {
        &self.residues
    }

    /// Number of resolved slots.
    pub fn resolved(&self) -> usize {
        self.residues.iter().filter(|r| r.is_some()).count()
    }

    /// True when every slot is resolved.
    pub fn is_closed(&self) -> bool {
        self.residues.iter().all(Option::is_some)
    }

    /// Renders the wheel as letters with `?` for unresolved slots.
    pub fn render(&self) -> String {
        self.residues
            .iter()
            .map(|r| r.map_or('?', Symbol::letter))
            .collect()
    }

    /// Stores `residue` at `slot` if the slot is empty; otherwise returns the
    /// existing residue and its witness when they disagree.
    pub(crate) fn assign(
        &mut self,
        slot: usize,
        residue: Symbol,
        position: usize,
    ) -> Result<(), (Symbol, usize)> {
        match self.residues[slot] {
            None => {
                self.residues[slot] = Some(residue);
                self.witnesses[slot] = Some(position);
                Ok(())
            }
            Some(existing) if existing == residue => Ok(()),
            Some(existing) => Err((existing, self.witnesses[slot].unwrap_or(position))),
        }
    }
}

/// The frozen set of wheels produced by one solve.
///
/// There is no public mutation API; wheels are only filled by
/// [`crate::solver::solve`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Wheels {
    wheels: Vec<Wheel>,
}

impl Wheels {
    pub(crate) fn empty(schedule: &KeySchedule) -> Self {
        Self {
            wheels: schedule.specs().iter().copied().map(Wheel::empty).collect(),
        }
    }

    pub(crate) fn wheel_mut(&mut self, class: usize) -> &mut Wheel {
        &mut self.wheels[class]
    }

    /// Wheel of `class`.
    pub fn wheel(&self, class: usize) -> Option<&Wheel> {
        self.wheels.get(class)
    }

    /// All wheels in class order.
    pub fn iter(&self) -> impl Iterator<Item = &Wheel> {
        self.wheels.iter()
    }

    /// Number of wheels (equals the number of classes).
    pub fn len(&self) -> usize {
        self.wheels.len()
    }

    /// True when there are no wheels.
    pub fn is_empty(&self) -> bool {
        self.wheels.is_empty()
    }

    /// `(class, slot)` of `position` under `classing`.
    pub fn locate<C: ClassAssignment + ?Sized>(
        &self,
        classing: &C,
        position: usize,
    ) -> Option<(usize, usize)> {
        let class = classing.class_of(position);
        self.wheels
            .get(class)
            .map(|wheel| (class, wheel.slot_of(position)))
    }

    /// Resolved key residue for `position`, if any.
    pub fn key_at<C: ClassAssignment + ?Sized>(
        &self,
        classing: &C,
        position: usize,
    ) -> Option<Symbol> {
        let (class, slot) = self.locate(classing, position)?;
        self.wheels[class].residue(slot)
    }

    /// Resolved key residue for every position in `0..n`.
    pub fn keystream<C: ClassAssignment + ?Sized>(
        &self,
        classing: &C,
        n: usize,
    ) -> Vec<Option<Symbol>> {
        (0..n).map(|position| self.key_at(classing, position)).collect()
    }

    /// Total number of resolved slots across all wheels.
    pub fn resolved_slots(&self) -> usize {
        self.wheels.iter().map(Wheel::resolved).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classing::Classing;

    #[test]
    fn slot_respects_phase() {
        let spec = WheelSpec::new(Family::Additive, 7).with_phase(3);
        assert_eq!(spec.slot_of(3), 0);
        assert_eq!(spec.slot_of(0), 4);
        assert_eq!(spec.slot_of(10), 0);
    }

    #[test]
    fn schedule_validation() {
        let classing = Classing::Modular { k: 2 };
        let ok = KeySchedule::uniform(2, WheelSpec::new(Family::Beaufort, 5));
        assert!(ok.validate(&classing).is_ok());

        let short = KeySchedule::uniform(1, WheelSpec::new(Family::Beaufort, 5));
        assert_eq!(
            short.validate(&classing).unwrap_err().info().code,
            "schedule-class-mismatch"
        );

        let zero = KeySchedule::uniform(2, WheelSpec::new(Family::Beaufort, 0));
        assert_eq!(zero.validate(&classing).unwrap_err().info().code, "zero-period");

        let phased = KeySchedule::uniform(2, WheelSpec::new(Family::Beaufort, 5).with_phase(5));
        assert_eq!(
            phased.validate(&classing).unwrap_err().info().code,
            "phase-out-of-range"
        );
    }

    #[test]
    fn consistent_overwrite_is_a_no_op() {
        let mut wheel = Wheel::empty(WheelSpec::new(Family::Additive, 3));
        let e = Symbol::from_letter('E').unwrap();
        assert!(wheel.assign(1, e, 4).is_ok());
        assert!(wheel.assign(1, e, 7).is_ok());
        assert_eq!(wheel.witness(1), Some(4));
        let err = wheel.assign(1, Symbol::ZERO, 10).unwrap_err();
        assert_eq!(err, (e, 4));
        assert_eq!(wheel.render(), "?E?");
    }
}
