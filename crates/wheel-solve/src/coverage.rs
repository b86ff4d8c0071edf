use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::classing::ClassAssignment;
use crate::derive::DerivedPlaintext;
use crate::wheel::Wheels;

/// A labelled inclusive span reported on separately, e.g. an anchor or the
/// gap between two anchors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    /// Label used as the report key.
    pub label: String,
    /// First position.
    pub start: usize,
    /// Last position (inclusive).
    pub end: usize,
}

impl Region {
    /// Creates a region.
    pub fn new(label: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            label: label.into(),
            start,
            end,
        }
    }
}

/// Determined counts for one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCoverage {
    /// Class id.
    pub class: usize,
    /// Positions assigned to the class.
    pub positions: usize,
    /// Positions that decoded.
    pub determined: usize,
    /// Wheel period.
    pub period: usize,
    /// Slots with a residue.
    pub resolved_slots: usize,
}

/// Determined counts for one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionCoverage {
    /// Region label.
    pub label: String,
    /// Positions inside the region (clipped to the ciphertext).
    pub positions: usize,
    /// Positions that decoded.
    pub determined: usize,
}

/// A `(class, slot)` pair with no residue that governs at least one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotRef {
    /// Class id.
    pub class: usize,
    /// Slot within the class wheel.
    pub slot: usize,
}

/// How much of the ciphertext a set of wheels decodes, and what it would
/// take to decode the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Ciphertext length.
    pub total: usize,
    /// Decoded positions.
    pub determined: usize,
    /// Positions left unknown.
    pub undetermined: usize,
    /// Per-class breakdown in class order.
    pub classes: Vec<ClassCoverage>,
    /// Per-region breakdown in the order regions were supplied.
    pub regions: Vec<RegionCoverage>,
    /// Unknown positions, ascending.
    pub undetermined_positions: Vec<usize>,
    /// Distinct unresolved pairs governing the unknown positions, ascending.
    pub unresolved: Vec<SlotRef>,
    /// Smallest number of additional constraints that yields closure.
    pub min_additional_constraints: usize,
    /// One position per unresolved pair (the lowest); constraining exactly
    /// these positions yields closure.
    pub suggested_positions: Vec<usize>,
    /// True when every position decodes.
    pub closed: bool,
}

impl CoverageReport {
    /// Fraction of positions decoded, in `[0, 1]`.
    pub fn determined_fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.determined as f64 / self.total as f64
        }
    }
}

/// Builds the coverage report for `derived` under `classing` and `wheels`.
///
/// Every undetermined position is governed by exactly one unresolved
/// `(class, slot)` pair and one constraint resolves a whole pair, so the
/// minimal cover is the number of distinct pairs.
pub fn coverage<C: ClassAssignment + ?Sized>(
    classing: &C,
    wheels: &Wheels,
    derived: &DerivedPlaintext,
    regions: &[Region],
) -> CoverageReport {
    let total = derived.len();
    let mut classes: Vec<ClassCoverage> = wheels
        .iter()
        .enumerate()
        .map(|(class, wheel)| ClassCoverage {
            class,
            positions: 0,
            determined: 0,
            period: wheel.period(),
            resolved_slots: wheel.resolved(),
        })
        .collect();

    let mut first_position: BTreeMap<SlotRef, usize> = BTreeMap::new();
    let mut undetermined_positions = Vec::new();
    for position in 0..total {
        let determined = derived.is_determined(position);
        if let Some((class, slot)) = wheels.locate(classing, position) {
            let entry = &mut classes[class];
            entry.positions += 1;
            if determined {
                entry.determined += 1;
            } else {
                first_position
                    .entry(SlotRef { class, slot })
                    .or_insert(position);
            }
        }
        if !determined {
            undetermined_positions.push(position);
        }
    }

    let regions = regions
        .iter()
        .map(|region| {
            let end = region.end.min(total.saturating_sub(1));
            let span = if region.start > end || total == 0 {
                0..0
            } else {
                region.start..end + 1
            };
            RegionCoverage {
                label: region.label.clone(),
                positions: span.len(),
                determined: span.filter(|&p| derived.is_determined(p)).count(),
            }
        })
        .collect();

    let unresolved: Vec<SlotRef> = first_position.keys().copied().collect();
    let mut suggested_positions: Vec<usize> = first_position.values().copied().collect();
    suggested_positions.sort_unstable();
    let determined = total - undetermined_positions.len();

    CoverageReport {
        total,
        determined,
        undetermined: undetermined_positions.len(),
        classes,
        regions,
        undetermined_positions,
        min_additional_constraints: unresolved.len(),
        unresolved,
        suggested_positions,
        closed: determined == total,
    }
}

