#![deny(missing_docs)]
#![doc = "Key-wheel reconstruction: classing, cipher families, constraint solving, plaintext derivation and coverage analysis."]

/// Position-to-class assignments.
pub mod classing;
/// Known-plaintext constraints, anchors and tails.
pub mod constraint;
/// Exact coverage and set-cover analysis.
pub mod coverage;
/// Plaintext derivation from solved wheels.
pub mod derive;
/// Cipher families and the zero-key legality policy.
pub mod family;
/// Canonical hashing helpers.
pub mod hash;
/// Canonical JSON serde helpers.
pub mod serde;
/// Constraint propagation into wheels.
pub mod solver;
/// Wheel specs, schedules and solved wheels.
pub mod wheel;

pub use classing::{validate_classing, ClassAssignment, Classing};
pub use constraint::{Anchor, Constraint, ConstraintSet, Origin, Tail};
pub use coverage::{coverage, ClassCoverage, CoverageReport, Region, RegionCoverage, SlotRef};
pub use derive::{derive, DerivedPlaintext};
pub use family::{Family, LegalityPolicy};
pub use hash::{canonical_wheels_hash, ciphertext_hash, stable_hash_string};
pub use crate::serde::{from_json_slice, to_canonical_json_bytes};
pub use solver::{solve, ConflictError, LegalityError, SolveContext, SolveError};
pub use wheel::{KeySchedule, Wheel, WheelSpec, Wheels};
