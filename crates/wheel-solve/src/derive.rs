use std::fmt;

use serde::{Deserialize, Serialize};
use wheel_core::{Ciphertext, Symbol};

use crate::classing::ClassAssignment;
use crate::constraint::ConstraintSet;
use crate::wheel::Wheels;

/// Plaintext recovered from a set of wheels; `None` where the governing slot
/// is unresolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DerivedPlaintext {
    symbols: Vec<Option<Symbol>>,
}

impl DerivedPlaintext {
    /// Per-position symbols.
    pub fn symbols(&self) -> &[Option<Symbol>] {
        &self.symbols
    }

    /// Symbol at `position`.
    pub fn get(&self, position: usize) -> Option<Symbol> {
        self.symbols.get(position).copied().flatten()
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True when there are no positions.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// True when `position` decoded.
    pub fn is_determined(&self, position: usize) -> bool {
        self.get(position).is_some()
    }

    /// Number of decoded positions.
    pub fn determined_count(&self) -> usize {
        self.symbols.iter().filter(|s| s.is_some()).count()
    }

    /// Positions that did not decode, ascending.
    pub fn undetermined(&self) -> Vec<usize> {
        self.symbols
            .iter()
            .enumerate()
            .filter_map(|(position, s)| s.is_none().then_some(position))
            .collect()
    }

    /// Renders with `unknown` standing in for undetermined positions.
    pub fn render(&self, unknown: char) -> String {
        self.symbols
            .iter()
            .map(|s| s.map_or(unknown, Symbol::letter))
            .collect()
    }

    /// True when every constrained position decodes to its constrained letter.
    pub fn agrees_with(&self, constraints: &ConstraintSet) -> bool {
        constraints
            .constraints()
            .iter()
            .all(|c| self.get(c.position) == Some(c.plaintext))
    }
}

impl fmt::Display for DerivedPlaintext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render('?'))
    }
}

/// Decodes every position whose `(class, slot)` is resolved.
pub fn derive<C: ClassAssignment + ?Sized>(
    ciphertext: &Ciphertext,
    classing: &C,
    wheels: &Wheels,
) -> DerivedPlaintext {
    let symbols = ciphertext
        .symbols()
        .iter()
        .enumerate()
        .map(|(position, &c)| {
            let wheel = wheels.wheel(classing.class_of(position))?;
            let key = wheel.residue_at(position)?;
            Some(wheel.family().decrypt(c, key))
        })
        .collect();
    DerivedPlaintext { symbols }
}
