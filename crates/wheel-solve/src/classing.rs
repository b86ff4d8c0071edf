use serde::{Deserialize, Serialize};
use wheel_core::{ErrorInfo, WheelError};

/// Assigns every ciphertext position to one of `num_classes()` tracks.
///
/// Implementations must be pure: the same position always lands in the same
/// class. Ids outside `0..num_classes()` are rejected by
/// [`validate_classing`], not by the solver.
pub trait ClassAssignment: Send + Sync {
    /// Number of classes `K`.
    fn num_classes(&self) -> usize;

    /// Class id for `position`.
    fn class_of(&self, position: usize) -> usize;

    /// Rejects parameterizations under which `class_of` is undefined.
    fn check_parameters(&self) -> Result<(), WheelError> {
        Ok(())
    }
}

/// Named classing variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Classing {
    /// `((i mod a) * b) + (i mod b)` over `a * b` classes.
    MixedRadix {
        /// Outer modulus.
        a: usize,
        /// Inner modulus, also the outer multiplier.
        b: usize,
    },
    /// `i mod k`.
    Modular {
        /// Number of classes.
        k: usize,
    },
    /// `(i / step) mod k`: runs of `step` consecutive positions share a class.
    Stepped {
        /// Number of classes.
        k: usize,
        /// Run length.
        step: usize,
    },
    /// `(i * step) mod k`.
    Strided {
        /// Number of classes.
        k: usize,
        /// Multiplier applied to the position.
        step: usize,
    },
}

impl Classing {
    /// The six-track `((i mod 2) * 3) + (i mod 3)` classing.
    pub const fn parity_triad() -> Self {
        Classing::MixedRadix { a: 2, b: 3 }
    }

    /// Short stable label used in reports.
    pub fn label(&self) -> String {
        match self {
            Classing::MixedRadix { a, b } => format!("mixed-radix-{a}x{b}"),
            Classing::Modular { k } => format!("mod-{k}"),
            Classing::Stepped { k, step } => format!("stepped-{k}-by-{step}"),
            Classing::Strided { k, step } => format!("strided-{k}-by-{step}"),
        }
    }

    /// Number of positions in each class over `0..n`.
    pub fn class_sizes(&self, n: usize) -> Vec<usize> {
        class_sizes(self, n)
    }
}

impl ClassAssignment for Classing {
    fn num_classes(&self) -> usize {
        match *self {
            Classing::MixedRadix { a, b } => a.saturating_mul(b),
            Classing::Modular { k } | Classing::Stepped { k, .. } | Classing::Strided { k, .. } => k,
        }
    }

    fn class_of(&self, position: usize) -> usize {
        match *self {
            Classing::MixedRadix { a, b } => (position % a) * b + (position % b),
            Classing::Modular { k } => position % k,
            Classing::Stepped { k, step } => (position / step) % k,
            Classing::Strided { k, step } => (position.wrapping_mul(step)) % k,
        }
    }

    fn check_parameters(&self) -> Result<(), WheelError> {
        let zero = match *self {
            Classing::MixedRadix { a, b } => a == 0 || b == 0,
            Classing::Modular { k } => k == 0,
            Classing::Stepped { k, step } | Classing::Strided { k, step } => k == 0 || step == 0,
        };
        if zero {
            return Err(WheelError::Config(
                ErrorInfo::new("classing-zero-parameter", "classing parameters must be positive")
                    .with_context("classing", self.label()),
            ));
        }
        if let Classing::MixedRadix { a, b } = *self {
            if a.checked_mul(b).is_none() {
                return Err(WheelError::Config(
                    ErrorInfo::new("classing-overflow", "class count a * b overflows")
                        .with_context("a", a)
                        .with_context("b", b),
                ));
            }
        }
        Ok(())
    }
}

fn class_sizes<C: ClassAssignment + ?Sized>(assignment: &C, n: usize) -> Vec<usize> {
    let mut sizes = vec![0; assignment.num_classes()];
    for position in 0..n {
        if let Some(size) = sizes.get_mut(assignment.class_of(position)) {
            *size += 1;
        }
    }
    sizes
}

/// Checks that `assignment` partitions `0..n` into exactly `K` non-empty
/// classes with every id in `0..K`.
pub fn validate_classing<C: ClassAssignment + ?Sized>(
    assignment: &C,
    n: usize,
) -> Result<(), WheelError> {
    assignment.check_parameters()?;
    let k = assignment.num_classes();
    if k == 0 {
        return Err(WheelError::config(
            "classing-no-classes",
            "classing must define at least one class",
        ));
    }
    if k > n {
        return Err(WheelError::Config(
            ErrorInfo::new("class-empty", "classing leaves a class without positions")
                .with_context("num_classes", k)
                .with_context("positions", n)
                .with_hint("use fewer classes or a longer ciphertext"),
        ));
    }
    let mut sizes = vec![0usize; k];
    for position in 0..n {
        let class = assignment.class_of(position);
        match sizes.get_mut(class) {
            Some(size) => *size += 1,
            None => {
                return Err(WheelError::Config(
                    ErrorInfo::new("class-out-of-range", "classing produced an unknown class id")
                        .with_context("position", position)
                        .with_context("class", class)
                        .with_context("num_classes", k),
                ))
            }
        }
    }
    if let Some(empty) = sizes.iter().position(|&size| size == 0) {
        return Err(WheelError::Config(
            ErrorInfo::new("class-empty", "classing leaves a class without positions")
                .with_context("class", empty)
                .with_context("num_classes", k)
                .with_context("positions", n)
                .with_hint("use fewer classes or a longer ciphertext"),
        ));
    }
    Ok(())
}
