use serde::{Deserialize, Serialize};
use wheel_core::{parse_symbols, ErrorInfo, Symbol, WheelError};

/// Where a constraint came from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "label", rename_all = "kebab-case")]
pub enum Origin {
    /// A designated anchor; subject to the zero-key rule.
    Anchor(String),
    /// The known trailing region.
    Tail,
    /// Added by the caller outside any anchor, e.g. a coverage suggestion.
    Manual,
}

impl Origin {
    /// True for anchor-origin constraints.
    pub fn is_anchor(&self) -> bool {
        matches!(self, Origin::Anchor(_))
    }

    /// The anchor label, if any.
    pub fn label(&self) -> Option<&str> {
        match self {
            Origin::Anchor(label) => Some(label),
            Origin::Tail | Origin::Manual => None,
        }
    }
}

/// A single known plaintext letter.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Constraint {
    /// Ciphertext position.
    pub position: usize,
    /// Plaintext letter at that position.
    pub plaintext: Symbol,
    /// Provenance of the constraint.
    pub origin: Origin,
}

impl Constraint {
    /// Creates a constraint.
    pub fn new(position: usize, plaintext: Symbol, origin: Origin) -> Self {
        Self {
            position,
            plaintext,
            origin,
        }
    }
}

/// A ciphertext span whose plaintext is known or assumed. `end` is inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Anchor {
    /// Name used in reports and leave-one-out labels.
    pub label: String,
    /// First covered position.
    pub start: usize,
    /// Last covered position.
    pub end: usize,
    /// Plaintext letters for `start..=end`.
    pub text: String,
}

impl Anchor {
    /// Creates an anchor whose span is derived from the text length.
    pub fn at(label: impl Into<String>, start: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        let letters = text.chars().filter(|c| !c.is_whitespace()).count();
        Self {
            label: label.into(),
            start,
            end: (start + letters).saturating_sub(1),
            text,
        }
    }

    /// Expands the anchor into per-position constraints, checking the span
    /// against the text and the ciphertext length `n`.
    pub fn constraints(&self, n: usize) -> Result<Vec<Constraint>, WheelError> {
        let symbols = parse_symbols(&self.text)?;
        let span = self.end.checked_sub(self.start).map(|d| d + 1);
        if span != Some(symbols.len()) {
            return Err(WheelError::Config(
                ErrorInfo::new("anchor-span-mismatch", "anchor span does not match its text")
                    .with_context("label", &self.label)
                    .with_context("start", self.start)
                    .with_context("end", self.end)
                    .with_context("letters", symbols.len()),
            ));
        }
        if self.end >= n {
            return Err(WheelError::Config(
                ErrorInfo::new("anchor-out-of-range", "anchor extends past the ciphertext")
                    .with_context("label", &self.label)
                    .with_context("end", self.end)
                    .with_context("length", n),
            ));
        }
        Ok(symbols
            .into_iter()
            .enumerate()
            .map(|(offset, plaintext)| {
                Constraint::new(
                    self.start + offset,
                    plaintext,
                    Origin::Anchor(self.label.clone()),
                )
            })
            .collect())
    }
}

/// Known plaintext running from `start` to the end of the ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tail {
    /// First covered position.
    pub start: usize,
    /// Plaintext letters for `start..n`.
    pub text: String,
}

impl Tail {
    /// Expands the tail into constraints; the text must end exactly at `n`.
    pub fn constraints(&self, n: usize) -> Result<Vec<Constraint>, WheelError> {
        let symbols = parse_symbols(&self.text)?;
        if self.start + symbols.len() != n {
            return Err(WheelError::Config(
                ErrorInfo::new("tail-length-mismatch", "tail text must reach the last position")
                    .with_context("start", self.start)
                    .with_context("letters", symbols.len())
                    .with_context("length", n),
            ));
        }
        Ok(symbols
            .into_iter()
            .enumerate()
            .map(|(offset, plaintext)| Constraint::new(self.start + offset, plaintext, Origin::Tail))
            .collect())
    }
}

/// An unordered collection of constraints handed to the solver.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConstraintSet {
    constraints: Vec<Constraint>,
}

impl ConstraintSet {
    /// Wraps raw constraints.
    pub fn new(constraints: Vec<Constraint>) -> Self {
        Self { constraints }
    }

    /// Constraints from every anchor.
    pub fn from_anchors(anchors: &[Anchor], n: usize) -> Result<Self, WheelError> {
        let mut constraints = Vec::new();
        for anchor in anchors {
            constraints.extend(anchor.constraints(n)?);
        }
        Ok(Self { constraints })
    }

    /// Adds the tail region.
    pub fn with_tail(mut self, tail: &Tail, n: usize) -> Result<Self, WheelError> {
        self.constraints.extend(tail.constraints(n)?);
        Ok(self)
    }

    /// Adds one constraint.
    pub fn push(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Constraints in insertion order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Number of constraints.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// True when empty.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Constraints in canonical `(position, plaintext, origin)` order with
    /// exact duplicates removed.
    pub fn canonical(&self) -> Vec<Constraint> {
        let mut sorted = self.constraints.clone();
        sorted.sort();
        sorted.dedup();
        sorted
    }
}

impl FromIterator<Constraint> for ConstraintSet {
    fn from_iter<I: IntoIterator<Item = Constraint>>(iter: I) -> Self {
        Self {
            constraints: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_expands_inclusive_span() {
        let anchor = Anchor::at("EAST", 21, "EAST");
        assert_eq!(anchor.end, 24);
        let constraints = anchor.constraints(97).unwrap();
        let positions: Vec<_> = constraints.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![21, 22, 23, 24]);
        assert!(constraints.iter().all(|c| c.origin.is_anchor()));
        assert_eq!(constraints[0].origin.label(), Some("EAST"));
    }

    #[test]
    fn anchor_span_must_match_text() {
        let anchor = Anchor {
            label: "bad".into(),
            start: 10,
            end: 12,
            text: "NORTH".into(),
        };
        let err = anchor.constraints(100).unwrap_err();
        assert_eq!(err.info().code, "anchor-span-mismatch");
        let err = Anchor::at("late", 8, "ABC").constraints(10).unwrap_err();
        assert_eq!(err.info().code, "anchor-out-of-range");
    }

    #[test]
    fn tail_must_reach_end() {
        let tail = Tail {
            start: 6,
            text: "XYZ".into(),
        };
        assert!(tail.constraints(9).is_ok());
        assert_eq!(
            tail.constraints(10).unwrap_err().info().code,
            "tail-length-mismatch"
        );
    }
}
