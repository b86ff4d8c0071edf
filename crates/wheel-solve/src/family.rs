use std::fmt;

use serde::{Deserialize, Serialize};
use wheel_core::Symbol;

/// Modular relation between plaintext `P`, ciphertext `C` and key `K`.
///
/// | family    | encrypt       | solve key     | decrypt       |
/// |-----------|---------------|---------------|---------------|
/// | additive  | `C = P + K`   | `K = C - P`   | `P = C - K`   |
/// | beaufort  | `C = K - P`   | `K = P + C`   | `P = K - C`   |
/// | variant   | `C = P - K`   | `K = P - C`   | `P = C + K`   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Family {
    /// Vigenère-style addition.
    Additive,
    /// Subtractive Beaufort.
    Beaufort,
    /// Subtractive variant Beaufort.
    Variant,
}

impl Family {
    /// Every family, in declaration order.
    pub const ALL: [Family; 3] = [Family::Additive, Family::Beaufort, Family::Variant];

    /// Enciphers `plaintext` under `key`.
    pub fn encrypt(self, plaintext: Symbol, key: Symbol) -> Symbol {
        match self {
            Family::Additive => plaintext + key,
            Family::Beaufort => key - plaintext,
            Family::Variant => plaintext - key,
        }
    }

    /// Deciphers `ciphertext` under `key`.
    pub fn decrypt(self, ciphertext: Symbol, key: Symbol) -> Symbol {
        match self {
            Family::Additive => ciphertext - key,
            Family::Beaufort => key - ciphertext,
            Family::Variant => ciphertext + key,
        }
    }

    /// The key residue that maps `plaintext` to `ciphertext`.
    pub fn solve_key(self, plaintext: Symbol, ciphertext: Symbol) -> Symbol {
        match self {
            Family::Additive => ciphertext - plaintext,
            Family::Beaufort => plaintext + ciphertext,
            Family::Variant => plaintext - ciphertext,
        }
    }

    /// Whether the stored residue is the literal key letter a clerk would
    /// have written down. Beaufort stores a tableau offset instead.
    pub fn exposes_literal_key(self) -> bool {
        matches!(self, Family::Additive | Family::Variant)
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Family::Additive => "additive",
            Family::Beaufort => "beaufort",
            Family::Variant => "variant",
        };
        f.write_str(name)
    }
}

/// Which families are subject to the zero-key anchor rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LegalityPolicy {
    /// Every family exposing a literal key (additive and variant).
    #[default]
    AdditiveAndVariant,
    /// Additive wheels only.
    AdditiveOnly,
    /// No legality checks.
    Off,
}

impl LegalityPolicy {
    /// True when an anchor on a `family` wheel may not imply residue 0.
    pub fn forbids_zero_key(self, family: Family) -> bool {
        match self {
            LegalityPolicy::AdditiveAndVariant => family.exposes_literal_key(),
            LegalityPolicy::AdditiveOnly => family == Family::Additive,
            LegalityPolicy::Off => false,
        }
    }
}
