//! The 26-letter modular alphabet.

use std::fmt;
use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, WheelError};

/// Number of symbols in the alphabet.
pub const ALPHABET_LEN: u8 = 26;

/// A letter of the alphabet as a residue modulo 26 (`A = 0`, `Z = 25`).
///
/// Serialized as its letter so reports stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct Symbol(u8);

impl Symbol {
    /// The zero residue, `A`.
    pub const ZERO: Symbol = Symbol(0);

    /// Builds a symbol from any integer, reducing it modulo 26.
    pub fn from_residue(value: i64) -> Self {
        Self(value.rem_euclid(i64::from(ALPHABET_LEN)) as u8)
    }

    /// Builds a symbol from a value already known to lie in `0..26`.
    pub fn new(value: u8) -> Option<Self> {
        (value < ALPHABET_LEN).then_some(Self(value))
    }

    /// Maps an ASCII letter of either case to its symbol.
    pub fn from_letter(letter: char) -> Option<Self> {
        if letter.is_ascii_alphabetic() {
            Some(Self(letter.to_ascii_uppercase() as u8 - b'A'))
        } else {
            None
        }
    }

    /// Returns the canonical upper-case letter.
    pub fn letter(self) -> char {
        (b'A' + self.0) as char
    }

    /// Returns the residue in `0..26`.
    pub fn value(self) -> u8 {
        self.0
    }

    /// True for the zero residue.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Add for Symbol {
    type Output = Symbol;

    fn add(self, rhs: Symbol) -> Symbol {
        Symbol((self.0 + rhs.0) % ALPHABET_LEN)
    }
}

impl Sub for Symbol {
    type Output = Symbol;

    fn sub(self, rhs: Symbol) -> Symbol {
        Symbol((self.0 + ALPHABET_LEN - rhs.0) % ALPHABET_LEN)
    }
}

impl Neg for Symbol {
    type Output = Symbol;

    fn neg(self) -> Symbol {
        Symbol::ZERO - self
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl TryFrom<char> for Symbol {
    type Error = String;

    fn try_from(letter: char) -> Result<Self, Self::Error> {
        Symbol::from_letter(letter).ok_or_else(|| format!("`{letter}` is not a letter"))
    }
}

impl From<Symbol> for char {
    fn from(symbol: Symbol) -> char {
        symbol.letter()
    }
}

/// Parses letters into symbols, skipping whitespace.
///
/// Any other character is rejected with its offset in the input.
pub fn parse_symbols(text: &str) -> Result<Vec<Symbol>, WheelError> {
    let mut symbols = Vec::with_capacity(text.len());
    for (offset, ch) in text.char_indices() {
        if ch.is_whitespace() {
            continue;
        }
        let symbol = Symbol::from_letter(ch).ok_or_else(|| {
            WheelError::Input(
                ErrorInfo::new("invalid-letter", "text contains a non-alphabetic character")
                    .with_context("offset", offset)
                    .with_context("char", ch),
            )
        })?;
        symbols.push(symbol);
    }
    Ok(symbols)
}

/// Renders symbols back into upper-case text.
pub fn render_symbols(symbols: &[Symbol]) -> String {
    symbols.iter().map(|s| s.letter()).collect()
}

/// Immutable fixed-length ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ciphertext {
    symbols: Box<[Symbol]>,
}

impl Ciphertext {
    /// Wraps an owned symbol sequence.
    pub fn from_symbols(symbols: impl Into<Vec<Symbol>>) -> Self {
        Self {
            symbols: symbols.into().into_boxed_slice(),
        }
    }

    /// Parses ciphertext text; see [`parse_symbols`].
    pub fn parse(text: &str) -> Result<Self, WheelError> {
        Ok(Self::from_symbols(parse_symbols(text)?))
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True when the ciphertext has no positions.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbol at `position`, if in range.
    pub fn get(&self, position: usize) -> Option<Symbol> {
        self.symbols.get(position).copied()
    }

    /// All symbols in order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }
}

impl fmt::Display for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_symbols(&self.symbols))
    }
}

impl TryFrom<String> for Ciphertext {
    type Error = WheelError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Ciphertext::parse(&text)
    }
}

impl From<Ciphertext> for String {
    fn from(ciphertext: Ciphertext) -> String {
        ciphertext.to_string()
    }
}
